//! Document service: the create/read façade over cipher, model and storage.
//!
//! # Data flow
//!
//! ```text
//! post_document(p, k) ─► Document::create ─► Storage::save ─► id
//! get_document(id, k) ─► Storage::load_and_delete ─► decrypt ─► plaintext
//! ```
//!
//! The service holds a long-lived storage handle and nothing else. It never
//! caches a decrypted document: retaining a copy would defeat the one-time
//! read.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    document::{Document, Share, check_key},
    env::{Environment, SystemEnv},
    error::DocumentError,
    sharing,
    storage::Storage,
};

/// The external surface consumed by a transport layer.
///
/// Every method is synchronous request/response against durable storage.
/// Cancellation and timeouts belong to the caller.
pub trait SecretStore {
    /// Encrypt and persist a single-reader secret.
    fn create_document(&self, plaintext: &[u8], key: &[u8]) -> Result<Document, DocumentError>;

    /// Consume and decrypt a single-reader secret.
    ///
    /// Fails with `NotFound` if the document was already read or never
    /// existed.
    fn read_document(&self, id: Uuid, key: &[u8]) -> Result<Document, DocumentError>;

    /// Encrypt and persist one copy per recipient; returns the group id and
    /// the per-recipient shares.
    fn create_multi_document(
        &self,
        plaintext: &[u8],
        recipients: u8,
    ) -> Result<(Uuid, Vec<Share>), DocumentError>;

    /// Consume and decrypt one recipient's copy.
    fn read_multi_document(
        &self,
        group_id: Uuid,
        index: u8,
        key: &[u8],
    ) -> Result<Vec<u8>, DocumentError>;
}

/// Orchestrates the cipher engine, document model and storage.
///
/// Cheap to clone when the storage is (all provided backends are Arc-backed),
/// so one instance can be shared by every request handler.
#[derive(Clone)]
pub struct DocumentService<S: Storage, E: Environment = SystemEnv> {
    storage: S,
    env: E,
}

impl<S: Storage> DocumentService<S> {
    /// Create a service over `storage` using OS randomness.
    pub fn new(storage: S) -> Self {
        Self::with_env(storage, SystemEnv::new())
    }
}

impl<S: Storage, E: Environment> DocumentService<S, E> {
    /// Create a service with an explicit environment.
    pub fn with_env(storage: S, env: E) -> Self {
        Self { storage, env }
    }

    /// Underlying storage handle.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Encrypt `plaintext` under `key` and persist it.
    ///
    /// Returns the encrypted document; its id is what the reader needs. On
    /// any failure nothing is written.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength`: key is not 32 bytes
    /// - `Randomness`: entropy source failed
    /// - `Storage`: the write transaction failed
    pub fn post_document(&self, plaintext: &[u8], key: &[u8]) -> Result<Document, DocumentError> {
        let document = Document::create(plaintext, key, &self.env)?;
        self.storage.save(document.id(), document.contents())?;

        info!(id = %document.id(), len = plaintext.len(), "stored document");
        Ok(document)
    }

    /// Consume the stored copy of `id` and decrypt it under `key`.
    ///
    /// If nothing is stored (already read, or never written) this returns a
    /// document with empty contents instead of attempting decryption.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength`: key is not 32 bytes (checked first; nothing is
    ///   consumed)
    /// - `CorruptCiphertext`: stored bytes are malformed or the key is wrong
    ///   (the stored copy is consumed either way)
    /// - `Storage`: the read-and-delete transaction failed
    pub fn get_document(&self, id: Uuid, key: &[u8]) -> Result<Document, DocumentError> {
        Ok(self.consume(id, key)?.unwrap_or_else(|| Document::consumed(id)))
    }

    /// Split `plaintext` across `recipients` independently keyed copies.
    pub fn post_multi_doc(
        &self,
        plaintext: &[u8],
        recipients: u8,
    ) -> Result<(Uuid, Vec<Share>), DocumentError> {
        sharing::split(&self.storage, &self.env, plaintext, recipients)
    }

    /// Consume and decrypt the copy at `index` within `group_id`.
    pub fn get_multi_doc(
        &self,
        group_id: Uuid,
        index: u8,
        key: &[u8],
    ) -> Result<Vec<u8>, DocumentError> {
        sharing::resolve(&self.storage, group_id, index, key)
    }
}

impl<S: Storage, E: Environment> DocumentService<S, E> {
    /// Read-and-delete then decrypt. `None` when nothing was stored.
    fn consume(&self, id: Uuid, key: &[u8]) -> Result<Option<Document>, DocumentError> {
        check_key(key)?;

        let contents = self.storage.load_and_delete(id)?;
        if contents.is_empty() {
            debug!(%id, "document already consumed");
            return Ok(None);
        }

        let document = Document::from_ciphertext(id, contents).decrypt(key).inspect_err(|e| {
            warn!(%id, error = %e, "stored document failed to decrypt");
        })?;

        debug!(%id, "document consumed");
        Ok(Some(document))
    }
}

impl<S: Storage, E: Environment> SecretStore for DocumentService<S, E> {
    fn create_document(&self, plaintext: &[u8], key: &[u8]) -> Result<Document, DocumentError> {
        self.post_document(plaintext, key)
    }

    fn read_document(&self, id: Uuid, key: &[u8]) -> Result<Document, DocumentError> {
        self.consume(id, key)?.ok_or(DocumentError::NotFound { id })
    }

    fn create_multi_document(
        &self,
        plaintext: &[u8],
        recipients: u8,
    ) -> Result<(Uuid, Vec<Share>), DocumentError> {
        self.post_multi_doc(plaintext, recipients)
    }

    fn read_multi_document(
        &self,
        group_id: Uuid,
        index: u8,
        key: &[u8],
    ) -> Result<Vec<u8>, DocumentError> {
        self.get_multi_doc(group_id, index, key)
    }
}
