//! Storage abstraction for Pasteburn documents
//!
//! Trait-based abstraction over a transactional byte-mapping store. The trait
//! is synchronous (no async): every operation is one bounded transaction
//! against an embedded store.
//!
//! # Layout
//!
//! - One namespace for single documents: `id -> iv || ciphertext`
//! - One namespace per multi-recipient group: `index (u8) -> iv || ciphertext`

mod chaotic;
mod error;
mod memory;
mod redb;

pub use chaotic::ChaoticStorage;
pub use error::StorageError;
pub use memory::MemoryStorage;
use uuid::Uuid;

pub use self::redb::RedbStorage;

/// Storage abstraction for one-time documents and recipient groups
///
/// Must be Clone (shared by every request handler), Send + Sync (thread-safe),
/// and synchronous. Implementations share internal state via Arc, so clones
/// access the same underlying storage.
///
/// # Destructive reads
///
/// `load_and_delete` and `load_and_delete_indexed` read and remove in the same
/// transaction. Two concurrent callers for the same key MUST NOT both observe
/// the value: exactly one gets the bytes, the other gets an empty vector.
/// Implementations delegate this to the store's transaction atomicity; callers
/// add no locking of their own.
pub trait Storage: Clone + Send + Sync + 'static {
    /// Persist `contents` under `id`.
    ///
    /// # Invariants
    ///
    /// - Pre: `contents` is non-empty and `id` holds no value
    /// - Post: a concurrent `load_and_delete(id)` sees all of `contents` or
    ///   nothing, never a partial write
    fn save(&self, id: Uuid, contents: &[u8]) -> Result<(), StorageError>;

    /// Atomically read and remove the value under `id`.
    ///
    /// Returns an empty vector if `id` was never written or was already
    /// consumed.
    fn load_and_delete(&self, id: Uuid) -> Result<Vec<u8>, StorageError>;

    /// Persist one entry per recipient index under a new group namespace.
    ///
    /// # Invariants
    ///
    /// - Pre: `entries` is non-empty, indices are distinct, every value is
    ///   non-empty, and the group holds no entries
    /// - Post: all entries are visible or none are
    fn save_group(&self, group_id: Uuid, entries: &[(u8, &[u8])]) -> Result<(), StorageError>;

    /// Atomically read and remove the entry at `index` within a group.
    ///
    /// Other indices are untouched. Returns an empty vector if the entry was
    /// never written or was already consumed.
    fn load_and_delete_indexed(&self, group_id: Uuid, index: u8) -> Result<Vec<u8>, StorageError>;
}
