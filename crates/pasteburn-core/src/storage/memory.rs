use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard},
};

use uuid::Uuid;

use super::{Storage, StorageError};

/// In-memory storage implementation for testing and simulation
///
/// All state is wrapped in Arc<Mutex<>> to allow Clone and concurrent access.
/// The single mutex plays the role of the store's write transaction: every
/// operation, including read-and-remove, runs under one lock acquisition.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryStorageInner>>,
}

#[derive(Default)]
struct MemoryStorageInner {
    /// Single documents, `id -> iv || ciphertext`
    documents: HashMap<Uuid, Vec<u8>>,

    /// Recipient groups, `group_id -> index -> iv || ciphertext`
    groups: HashMap<Uuid, BTreeMap<u8, Vec<u8>>>,
}

impl MemoryStorage {
    /// Create a new empty `MemoryStorage`
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unread single documents.
    pub fn document_count(&self) -> Result<usize, StorageError> {
        Ok(self.lock()?.documents.len())
    }

    /// Number of unread entries in a group.
    pub fn group_len(&self, group_id: Uuid) -> Result<usize, StorageError> {
        Ok(self.lock()?.groups.get(&group_id).map_or(0, BTreeMap::len))
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryStorageInner>, StorageError> {
        self.inner.lock().map_err(|_| StorageError::Io("memory storage mutex poisoned".to_string()))
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: Uuid, contents: &[u8]) -> Result<(), StorageError> {
        if contents.is_empty() {
            return Err(StorageError::EmptyValue { id });
        }

        let mut inner = self.lock()?;
        if inner.documents.contains_key(&id) {
            return Err(StorageError::AlreadyExists { id });
        }
        inner.documents.insert(id, contents.to_vec());

        Ok(())
    }

    fn load_and_delete(&self, id: Uuid) -> Result<Vec<u8>, StorageError> {
        Ok(self.lock()?.documents.remove(&id).unwrap_or_default())
    }

    fn save_group(&self, group_id: Uuid, entries: &[(u8, &[u8])]) -> Result<(), StorageError> {
        if entries.is_empty() || entries.iter().any(|(_, contents)| contents.is_empty()) {
            return Err(StorageError::EmptyValue { id: group_id });
        }

        let mut group = BTreeMap::new();
        for (index, contents) in entries {
            if group.insert(*index, contents.to_vec()).is_some() {
                return Err(StorageError::AlreadyExists { id: group_id });
            }
        }

        let mut inner = self.lock()?;
        if inner.groups.contains_key(&group_id) {
            return Err(StorageError::AlreadyExists { id: group_id });
        }
        inner.groups.insert(group_id, group);

        Ok(())
    }

    fn load_and_delete_indexed(&self, group_id: Uuid, index: u8) -> Result<Vec<u8>, StorageError> {
        let mut inner = self.lock()?;

        let Some(group) = inner.groups.get_mut(&group_id) else {
            return Ok(Vec::new());
        };

        let value = group.remove(&index).unwrap_or_default();
        if group.is_empty() {
            inner.groups.remove(&group_id);
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_storage_is_empty() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.document_count().unwrap(), 0);
        assert_eq!(storage.group_len(Uuid::nil()).unwrap(), 0);
    }

    #[test]
    fn test_load_and_delete_consumes() {
        let storage = MemoryStorage::new();
        let id = Uuid::from_u128(1);

        storage.save(id, b"bytes").unwrap();
        assert_eq!(storage.load_and_delete(id).unwrap(), b"bytes");
        assert!(storage.load_and_delete(id).unwrap().is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let storage = MemoryStorage::new();
        let clone = storage.clone();
        let id = Uuid::from_u128(1);

        storage.save(id, b"bytes").unwrap();
        assert_eq!(clone.load_and_delete(id).unwrap(), b"bytes");
        assert_eq!(storage.document_count().unwrap(), 0);
    }

    #[test]
    fn test_save_is_write_once() {
        let storage = MemoryStorage::new();
        let id = Uuid::from_u128(1);

        storage.save(id, b"first").unwrap();
        assert_eq!(storage.save(id, b"second"), Err(StorageError::AlreadyExists { id }));
    }

    #[test]
    fn test_group_indices_independent() {
        let storage = MemoryStorage::new();
        let group = Uuid::from_u128(9);

        storage.save_group(group, &[(0, b"a".as_slice()), (1, b"b"), (2, b"c")]).unwrap();

        assert_eq!(storage.load_and_delete_indexed(group, 1).unwrap(), b"b");
        assert_eq!(storage.group_len(group).unwrap(), 2);
        assert!(storage.load_and_delete_indexed(group, 1).unwrap().is_empty());
        assert_eq!(storage.load_and_delete_indexed(group, 0).unwrap(), b"a");
        assert_eq!(storage.load_and_delete_indexed(group, 2).unwrap(), b"c");
        assert_eq!(storage.group_len(group).unwrap(), 0);
    }

    #[test]
    fn test_save_group_duplicate_index_rejected() {
        let storage = MemoryStorage::new();
        let group = Uuid::from_u128(9);

        let result = storage.save_group(group, &[(3, b"a".as_slice()), (3, b"b")]);

        assert_eq!(result, Err(StorageError::AlreadyExists { id: group }));
        assert_eq!(storage.group_len(group).unwrap(), 0);
    }
}
