//! Document model: one secret, plaintext or ciphertext, plus its identity.
//!
//! A [`Document`] is either fully plaintext (`encrypted == false`) or fully
//! `iv || ciphertext` (`encrypted == true`). Documents are write-once; there is
//! no update.

use std::fmt;

use pasteburn_crypto::{KEY_SIZE, SecretKey, decrypt, encrypt_with_iv};
use uuid::Uuid;

use crate::{env::Environment, error::DocumentError};

/// A single secret and its identifier.
///
/// `Debug` prints the length of the contents, never the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    id: Uuid,
    contents: Vec<u8>,
    encrypted: bool,
}

impl Document {
    /// Encrypt `plaintext` under `key` with a freshly generated identifier.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength`: key is not 32 bytes (checked before any
    ///   randomness is drawn)
    /// - `Randomness`: the environment could not supply an id or IV
    pub fn create<E: Environment>(
        plaintext: &[u8],
        key: &[u8],
        env: &E,
    ) -> Result<Self, DocumentError> {
        check_key(key)?;
        let id = env.random_uuid()?;
        Self::create_with_id(id, plaintext, key, env)
    }

    /// Encrypt `plaintext` under `key` with a caller-supplied identifier.
    ///
    /// Used when the identifier is pre-allocated, e.g. every entry of a
    /// [`MultiDoc`] carries the group id.
    pub fn create_with_id<E: Environment>(
        id: Uuid,
        plaintext: &[u8],
        key: &[u8],
        env: &E,
    ) -> Result<Self, DocumentError> {
        check_key(key)?;
        let iv = env.random_iv()?;
        let contents = encrypt_with_iv(plaintext, key, iv)?;

        Ok(Self { id, contents, encrypted: true })
    }

    /// Wrap `iv || ciphertext` loaded from storage.
    pub fn from_ciphertext(id: Uuid, contents: Vec<u8>) -> Self {
        Self { id, contents, encrypted: true }
    }

    /// A document whose stored copy was already consumed (or never existed).
    ///
    /// Contents are empty. Callers treat this as "not available", distinct
    /// from a decryption failure.
    pub fn consumed(id: Uuid) -> Self {
        Self { id, contents: Vec::new(), encrypted: false }
    }

    /// Decrypt into a plaintext document.
    ///
    /// A document that is already plaintext is returned unchanged.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength`: key is not 32 bytes
    /// - `CorruptCiphertext`: contents are malformed or the key is wrong
    pub fn decrypt(self, key: &[u8]) -> Result<Self, DocumentError> {
        if !self.encrypted {
            return Ok(self);
        }

        let plaintext = decrypt(&self.contents, key)?;
        Ok(Self { id: self.id, contents: plaintext, encrypted: false })
    }

    /// Document identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Raw contents: plaintext or `iv || ciphertext` depending on
    /// [`Self::is_encrypted`].
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Take ownership of the contents.
    pub fn into_contents(self) -> Vec<u8> {
        self.contents
    }

    /// Whether contents hold ciphertext.
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// True for a consumed document (nothing to read).
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("len", &self.contents.len())
            .field("encrypted", &self.encrypted)
            .finish()
    }
}

/// One recipient's share of a [`MultiDoc`]: its index and the key that
/// decrypts its copy. Handed to the recipient out-of-band.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Share {
    /// Recipient index within the group
    pub index: u8,
    /// Key for this recipient's copy only
    pub key: SecretKey,
}

/// The same plaintext encrypted once per recipient, each under its own key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiDoc {
    id: Uuid,
    documents: Vec<Document>,
}

impl MultiDoc {
    /// Encrypt `plaintext` `recipients` times under independent random keys.
    ///
    /// Returns the group and one [`Share`] per recipient index `0..recipients`.
    ///
    /// # Errors
    ///
    /// - `InvalidRecipientCount`: `recipients` is zero
    /// - `Randomness`: the environment could not supply an id, key or IV
    pub fn create<E: Environment>(
        plaintext: &[u8],
        recipients: u8,
        env: &E,
    ) -> Result<(Self, Vec<Share>), DocumentError> {
        if recipients == 0 {
            return Err(DocumentError::InvalidRecipientCount { count: recipients });
        }

        let id = env.random_uuid()?;
        let mut documents = Vec::with_capacity(usize::from(recipients));
        let mut shares = Vec::with_capacity(usize::from(recipients));

        for index in 0..recipients {
            let key = env.random_key()?;
            documents.push(Document::create_with_id(id, plaintext, key.as_bytes(), env)?);
            shares.push(Share { index, key });
        }

        debug_assert_eq!(documents.len(), usize::from(recipients));
        Ok((Self { id, documents }, shares))
    }

    /// Group identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Per-recipient ciphertexts, ordered by index.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// `(index, iv || ciphertext)` pairs ready for storage.
    pub fn entries(&self) -> Vec<(u8, &[u8])> {
        self.documents
            .iter()
            .enumerate()
            .map(|(index, document)| (index as u8, document.contents()))
            .collect()
    }
}

pub(crate) fn check_key(key: &[u8]) -> Result<(), DocumentError> {
    if key.len() == KEY_SIZE {
        Ok(())
    } else {
        Err(DocumentError::InvalidKeyLength { expected: KEY_SIZE, actual: key.len() })
    }
}
