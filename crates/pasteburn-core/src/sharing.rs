//! Multi-recipient secret sharing.
//!
//! One plaintext is fanned out to N recipients. Each recipient gets their own
//! ciphertext under their own key, stored at their own index, so reading
//! index `i` never consumes index `j`. Contrast with a single document, where
//! the first reader burns the only copy.

use pasteburn_crypto::decrypt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    document::{MultiDoc, Share, check_key},
    env::Environment,
    error::DocumentError,
    storage::Storage,
};

/// Encrypt `plaintext` once per recipient and persist every copy under a new
/// group id.
///
/// Returns the group id and one `(index, key)` share per recipient. Keys are
/// never persisted.
///
/// # Errors
///
/// - `InvalidRecipientCount`: `recipients` is zero
/// - `Randomness`: entropy source failed
/// - `Storage`: the group could not be written (nothing is persisted)
pub fn split<S: Storage, E: Environment>(
    storage: &S,
    env: &E,
    plaintext: &[u8],
    recipients: u8,
) -> Result<(Uuid, Vec<Share>), DocumentError> {
    let (multi, shares) = MultiDoc::create(plaintext, recipients, env)?;
    let group_id = multi.id();

    storage.save_group(group_id, &multi.entries())?;

    info!(%group_id, recipients, "stored multi-recipient document");
    Ok((group_id, shares))
}

/// Consume and decrypt one recipient's copy.
///
/// The key length is checked before touching storage, so a malformed request
/// does not burn the share.
///
/// # Errors
///
/// - `InvalidKeyLength`: key is not 32 bytes (share left intact)
/// - `ShareNotFound`: the share was already read or never existed
/// - `CorruptCiphertext`: stored bytes are malformed or the key is wrong (the
///   share is consumed either way)
/// - `Storage`: the transaction failed
pub fn resolve<S: Storage>(
    storage: &S,
    group_id: Uuid,
    index: u8,
    key: &[u8],
) -> Result<Vec<u8>, DocumentError> {
    check_key(key)?;

    let contents = storage.load_and_delete_indexed(group_id, index)?;
    if contents.is_empty() {
        debug!(%group_id, index, "share already consumed");
        return Err(DocumentError::ShareNotFound { group_id, index });
    }

    let plaintext = decrypt(&contents, key)?;

    debug!(%group_id, index, "share consumed");
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{env::SystemEnv, storage::MemoryStorage};

    #[test]
    fn split_then_resolve_each_index() {
        let storage = MemoryStorage::new();
        let (group_id, shares) = split(&storage, &SystemEnv, b"secret", 3).unwrap();

        for share in &shares {
            let plaintext = resolve(&storage, group_id, share.index, share.key.as_bytes()).unwrap();
            assert_eq!(plaintext, b"secret");
        }

        assert_eq!(storage.group_len(group_id).unwrap(), 0);
    }

    #[test]
    fn resolve_twice_reports_already_read() {
        let storage = MemoryStorage::new();
        let (group_id, shares) = split(&storage, &SystemEnv, b"secret", 2).unwrap();
        let key = shares[1].key.as_bytes();

        assert_eq!(resolve(&storage, group_id, 1, key).unwrap(), b"secret");
        assert_eq!(
            resolve(&storage, group_id, 1, key),
            Err(DocumentError::ShareNotFound { group_id, index: 1 })
        );
        assert_eq!(storage.group_len(group_id).unwrap(), 1);
    }

    #[test]
    fn resolve_with_short_key_keeps_share() {
        let storage = MemoryStorage::new();
        let (group_id, shares) = split(&storage, &SystemEnv, b"secret", 1).unwrap();

        let result = resolve(&storage, group_id, 0, b"short");
        assert!(matches!(result, Err(DocumentError::InvalidKeyLength { .. })));

        assert_eq!(resolve(&storage, group_id, 0, shares[0].key.as_bytes()).unwrap(), b"secret");
    }

    #[test]
    fn resolve_with_another_recipients_key_fails() {
        let storage = MemoryStorage::new();
        let (group_id, shares) = split(&storage, &SystemEnv, b"secret", 2).unwrap();

        // Key for index 0 used on index 1
        match resolve(&storage, group_id, 1, shares[0].key.as_bytes()) {
            Err(DocumentError::CorruptCiphertext { .. }) => {},
            Ok(plaintext) => assert_ne!(plaintext, b"secret"),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn split_rejects_zero_recipients_without_writing() {
        let storage = MemoryStorage::new();
        let result = split(&storage, &SystemEnv, b"secret", 0);

        assert_eq!(result, Err(DocumentError::InvalidRecipientCount { count: 0 }));
    }
}
