//! Request and response schema for the four external operations.
//!
//! Explicit, validated bodies instead of ad hoc JSON objects. Binary fields
//! (bodies, keys) travel as standard base64 strings. Index and key are always
//! separate fields.

use std::fmt;

use pasteburn_crypto::KEY_SIZE;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    document::{Document, Share, check_key},
    error::DocumentError,
    service::SecretStore,
};

/// Body of a create-document request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDocumentRequest {
    /// Plaintext to protect
    #[serde(with = "base64_bytes")]
    pub body: Vec<u8>,
    /// 32-byte AES key chosen by the caller
    #[serde(with = "base64_bytes")]
    pub key: Vec<u8>,
}

impl CreateDocumentRequest {
    /// Reject malformed fields before any crypto or storage runs.
    pub fn validate(&self) -> Result<(), DocumentError> {
        check_key(&self.key)
    }

    /// Validate and run against `store`.
    pub fn execute(&self, store: &impl SecretStore) -> Result<DocumentResponse, DocumentError> {
        self.validate()?;
        let document = store.create_document(&self.body, &self.key)?;
        Ok(DocumentResponse::from(&document))
    }
}

/// Query of a read-document request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadDocumentRequest {
    /// Document id returned at creation
    pub id: Uuid,
    /// The key the document was created with
    #[serde(with = "base64_bytes")]
    pub key: Vec<u8>,
}

impl ReadDocumentRequest {
    /// Reject malformed fields before the document is consumed.
    pub fn validate(&self) -> Result<(), DocumentError> {
        check_key(&self.key)
    }

    /// Validate and run against `store`.
    pub fn execute(&self, store: &impl SecretStore) -> Result<DocumentResponse, DocumentError> {
        self.validate()?;
        let document = store.read_document(self.id, &self.key)?;
        Ok(DocumentResponse::from(&document))
    }
}

/// Body of a create-multi-document request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMultiDocumentRequest {
    /// Plaintext to fan out
    #[serde(with = "base64_bytes")]
    pub body: Vec<u8>,
    /// Number of recipients, 1 to 255
    pub recipients: u8,
}

impl CreateMultiDocumentRequest {
    /// Reject a zero recipient count.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.recipients == 0 {
            return Err(DocumentError::InvalidRecipientCount { count: self.recipients });
        }
        Ok(())
    }

    /// Validate and run against `store`.
    pub fn execute(
        &self,
        store: &impl SecretStore,
    ) -> Result<MultiDocumentResponse, DocumentError> {
        self.validate()?;
        let (id, shares) = store.create_multi_document(&self.body, self.recipients)?;
        Ok(MultiDocumentResponse::new(id, &shares))
    }
}

/// Query of a read-multi-document request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadMultiDocumentRequest {
    /// Group id returned at creation
    pub id: Uuid,
    /// Recipient index
    pub index: u8,
    /// That recipient's key
    #[serde(with = "base64_bytes")]
    pub key: Vec<u8>,
}

impl ReadMultiDocumentRequest {
    /// Reject malformed fields before the share is consumed.
    pub fn validate(&self) -> Result<(), DocumentError> {
        check_key(&self.key)
    }

    /// Validate and run against `store`.
    pub fn execute(&self, store: &impl SecretStore) -> Result<DocumentResponse, DocumentError> {
        self.validate()?;
        let body = store.read_multi_document(self.id, self.index, &self.key)?;
        Ok(DocumentResponse { id: self.id, body, encrypted: false })
    }
}

/// A document as returned to callers.
///
/// After creation `body` is `iv || ciphertext` and `encrypted` is true; after a
/// read it is the plaintext.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResponse {
    /// Document (or group) id
    pub id: Uuid,
    /// Contents
    #[serde(with = "base64_bytes")]
    pub body: Vec<u8>,
    /// Whether `body` is ciphertext
    pub encrypted: bool,
}

impl From<&Document> for DocumentResponse {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id(),
            body: document.contents().to_vec(),
            encrypted: document.is_encrypted(),
        }
    }
}

/// Result of a create-multi-document request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiDocumentResponse {
    /// Group id
    pub id: Uuid,
    /// One share per recipient, ordered by index
    pub shares: Vec<ShareResponse>,
}

impl MultiDocumentResponse {
    /// Build from the shares returned by the store.
    pub fn new(id: Uuid, shares: &[Share]) -> Self {
        Self {
            id,
            shares: shares
                .iter()
                .map(|share| ShareResponse { index: share.index, key: share.key.as_bytes().to_vec() })
                .collect(),
        }
    }
}

/// One recipient's index and key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareResponse {
    /// Recipient index
    pub index: u8,
    /// Key for that index
    #[serde(with = "base64_bytes")]
    pub key: Vec<u8>,
}

impl fmt::Debug for CreateDocumentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateDocumentRequest")
            .field("body_len", &self.body.len())
            .field("key", &Redacted(self.key.len()))
            .finish()
    }
}

impl fmt::Debug for ReadDocumentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadDocumentRequest")
            .field("id", &self.id)
            .field("key", &Redacted(self.key.len()))
            .finish()
    }
}

impl fmt::Debug for CreateMultiDocumentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateMultiDocumentRequest")
            .field("body_len", &self.body.len())
            .field("recipients", &self.recipients)
            .finish()
    }
}

impl fmt::Debug for ReadMultiDocumentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadMultiDocumentRequest")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("key", &Redacted(self.key.len()))
            .finish()
    }
}

impl fmt::Debug for DocumentResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentResponse")
            .field("id", &self.id)
            .field("body_len", &self.body.len())
            .field("encrypted", &self.encrypted)
            .finish()
    }
}

impl fmt::Debug for ShareResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareResponse")
            .field("index", &self.index)
            .field("key", &Redacted(self.key.len()))
            .finish()
    }
}

/// Debug stand-in for key bytes.
struct Redacted(usize);

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == KEY_SIZE {
            f.write_str("[REDACTED]")
        } else {
            write!(f, "[REDACTED; {} bytes]", self.0)
        }
    }
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{service::DocumentService, storage::MemoryStorage};

    const KEY: &[u8; 32] = b"11112222333344445555666677778888";

    #[test]
    fn create_request_parses_base64_fields() {
        let json = r#"{"body":"c2VjcmV0","key":"MTExMTIyMjIzMzMzNDQ0NDU1NTU2NjY2Nzc3Nzg4ODg="}"#;
        let request: CreateDocumentRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.body, b"secret");
        assert_eq!(request.key, KEY);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_unknown_fields() {
        let json = r#"{"body":"c2VjcmV0","key":"","extra":1}"#;
        assert!(serde_json::from_str::<CreateDocumentRequest>(json).is_err());
    }

    #[test]
    fn create_request_rejects_missing_key() {
        let json = r#"{"body":"c2VjcmV0"}"#;
        assert!(serde_json::from_str::<CreateDocumentRequest>(json).is_err());
    }

    #[test]
    fn create_request_rejects_invalid_base64() {
        let json = r#"{"body":"not base64!!","key":""}"#;
        assert!(serde_json::from_str::<CreateDocumentRequest>(json).is_err());
    }

    #[test]
    fn short_key_fails_validation() {
        let request = CreateDocumentRequest { body: b"secret".to_vec(), key: b"short".to_vec() };
        assert_eq!(
            request.validate(),
            Err(DocumentError::InvalidKeyLength { expected: 32, actual: 5 })
        );
    }

    #[test]
    fn zero_recipients_fails_validation() {
        let request = CreateMultiDocumentRequest { body: b"secret".to_vec(), recipients: 0 };
        assert_eq!(request.validate(), Err(DocumentError::InvalidRecipientCount { count: 0 }));
    }

    #[test]
    fn read_multi_request_keeps_index_and_key_separate() {
        let json = r#"{"id":"00000000-0000-0000-0000-000000000007","index":2,"key":"AAAA"}"#;
        let request: ReadMultiDocumentRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.id, Uuid::from_u128(7));
        assert_eq!(request.index, 2);
        assert_eq!(request.key, vec![0, 0, 0]);
    }

    #[test]
    fn debug_never_prints_keys() {
        let request = ReadDocumentRequest { id: Uuid::nil(), key: KEY.to_vec() };
        let printed = format!("{request:?}");

        assert!(!printed.contains("49"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn execute_create_then_read() {
        let service = DocumentService::new(MemoryStorage::new());

        let created = CreateDocumentRequest { body: b"secret".to_vec(), key: KEY.to_vec() }
            .execute(&service)
            .unwrap();
        assert!(created.encrypted);

        let read = ReadDocumentRequest { id: created.id, key: KEY.to_vec() }
            .execute(&service)
            .unwrap();
        assert_eq!(read.body, b"secret");
        assert!(!read.encrypted);

        let again = ReadDocumentRequest { id: created.id, key: KEY.to_vec() }.execute(&service);
        assert!(again.unwrap_err().is_not_found());
    }

    #[test]
    fn execute_multi_create_then_read() {
        let service = DocumentService::new(MemoryStorage::new());

        let created = CreateMultiDocumentRequest { body: b"secret".to_vec(), recipients: 2 }
            .execute(&service)
            .unwrap();
        assert_eq!(created.shares.len(), 2);

        let share = &created.shares[0];
        let read = ReadMultiDocumentRequest {
            id: created.id,
            index: share.index,
            key: share.key.clone(),
        }
        .execute(&service)
        .unwrap();
        assert_eq!(read.body, b"secret");
    }

    #[test]
    fn response_serializes_body_as_base64() {
        let response =
            DocumentResponse { id: Uuid::nil(), body: b"secret".to_vec(), encrypted: false };
        let json = serde_json::to_string(&response).unwrap();

        assert_eq!(
            json,
            r#"{"id":"00000000-0000-0000-0000-000000000000","body":"c2VjcmV0","encrypted":false}"#
        );
    }
}
