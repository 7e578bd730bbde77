//! Redb-backed durable storage implementation.
//!
//! Uses Redb's ACID transactions with Copy-on-Write for crash safety. Redb
//! serializes write transactions, which is what makes `load_and_delete` a
//! single atomic read-and-remove.

use std::{path::Path, sync::Arc};

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition, TableError};
use uuid::Uuid;

use super::{Storage, StorageError};

/// Table: documents
/// Key: document id as raw UUID bytes [16 bytes]
/// Value: iv || ciphertext
const DOCUMENTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("documents");

/// Prefix for per-group tables. Full name is `group/<hyphenated uuid>`.
const GROUP_TABLE_PREFIX: &str = "group/";

/// Durable storage backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc). Open
/// once at startup and share the handle; transactions are scoped to each
/// call and released on every exit path.
#[derive(Clone)]
pub struct RedbStorage {
    db: Arc<Database>,
}

impl RedbStorage {
    /// Open or create a Redb database at the given path.
    ///
    /// Creates the DOCUMENTS table if it doesn't exist. Group tables are
    /// created on demand.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(io)?;

        let txn = db.begin_write().map_err(io)?;
        {
            let _ = txn.open_table(DOCUMENTS).map_err(io)?;
        }
        txn.commit().map_err(io)?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Number of unread single documents.
    pub fn document_count(&self) -> Result<u64, StorageError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(DOCUMENTS).map_err(io)?;

        table.len().map_err(io)
    }

    /// Number of unread entries in a group. Zero once the group is drained.
    pub fn group_len(&self, group_id: Uuid) -> Result<u64, StorageError> {
        let name = group_table_name(group_id);
        let txn = self.db.begin_read().map_err(io)?;

        match txn.open_table(group_table(&name)) {
            Ok(table) => table.len().map_err(io),
            Err(TableError::TableDoesNotExist(_)) => Ok(0),
            Err(e) => Err(io(e)),
        }
    }
}

impl Storage for RedbStorage {
    fn save(&self, id: Uuid, contents: &[u8]) -> Result<(), StorageError> {
        if contents.is_empty() {
            return Err(StorageError::EmptyValue { id });
        }

        let txn = self.db.begin_write().map_err(io)?;

        {
            let mut table = txn.open_table(DOCUMENTS).map_err(io)?;
            let key = id.as_bytes();

            if table.get(key.as_slice()).map_err(io)?.is_some() {
                return Err(StorageError::AlreadyExists { id });
            }

            table.insert(key.as_slice(), contents).map_err(io)?;
        }

        txn.commit().map_err(io)?;

        Ok(())
    }

    fn load_and_delete(&self, id: Uuid) -> Result<Vec<u8>, StorageError> {
        let txn = self.db.begin_write().map_err(io)?;

        let value = {
            let mut table = txn.open_table(DOCUMENTS).map_err(io)?;
            let removed = table.remove(id.as_bytes().as_slice()).map_err(io)?;
            removed.map(|guard| guard.value().to_vec()).unwrap_or_default()
        };

        txn.commit().map_err(io)?;

        Ok(value)
    }

    fn save_group(&self, group_id: Uuid, entries: &[(u8, &[u8])]) -> Result<(), StorageError> {
        if entries.is_empty() || entries.iter().any(|(_, contents)| contents.is_empty()) {
            return Err(StorageError::EmptyValue { id: group_id });
        }

        let name = group_table_name(group_id);
        let txn = self.db.begin_write().map_err(io)?;

        {
            let mut table = txn.open_table(group_table(&name)).map_err(io)?;

            if !table.is_empty().map_err(io)? {
                return Err(StorageError::AlreadyExists { id: group_id });
            }

            for (index, contents) in entries {
                if table.insert(*index, *contents).map_err(io)?.is_some() {
                    // Duplicate index in the batch; dropping txn aborts it
                    return Err(StorageError::AlreadyExists { id: group_id });
                }
            }
        }

        txn.commit().map_err(io)?;

        Ok(())
    }

    fn load_and_delete_indexed(&self, group_id: Uuid, index: u8) -> Result<Vec<u8>, StorageError> {
        let name = group_table_name(group_id);
        let txn = self.db.begin_write().map_err(io)?;

        let (value, drained) = {
            let mut table = txn.open_table(group_table(&name)).map_err(io)?;
            let value =
                table.remove(index).map_err(io)?.map(|guard| guard.value().to_vec()).unwrap_or_default();
            let drained = table.is_empty().map_err(io)?;
            (value, drained)
        };

        // Last share consumed (or group never existed): drop the namespace
        if drained {
            txn.delete_table(group_table(&name)).map_err(io)?;
        }

        txn.commit().map_err(io)?;

        Ok(value)
    }
}

fn group_table_name(group_id: Uuid) -> String {
    format!("{GROUP_TABLE_PREFIX}{}", group_id.as_hyphenated())
}

fn group_table(name: &str) -> TableDefinition<'_, u8, &'static [u8]> {
    TableDefinition::new(name)
}

#[allow(clippy::needless_pass_by_value)]
fn io(err: impl std::fmt::Display) -> StorageError {
    StorageError::Io(err.to_string())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn open_temp() -> (tempfile::TempDir, RedbStorage) {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("test.redb")).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_group_table_name() {
        let id = Uuid::from_u128(0x1234_5678_9ABC_DEF0_FEDC_BA98_7654_3210);
        assert_eq!(group_table_name(id), "group/12345678-9abc-def0-fedc-ba9876543210");
    }

    #[test]
    fn test_save_then_load_and_delete() {
        let (_dir, storage) = open_temp();
        let id = Uuid::from_u128(100);

        storage.save(id, b"ciphertext").unwrap();
        assert_eq!(storage.document_count().unwrap(), 1);

        assert_eq!(storage.load_and_delete(id).unwrap(), b"ciphertext");
        assert_eq!(storage.document_count().unwrap(), 0);
    }

    #[test]
    fn test_second_load_is_empty() {
        let (_dir, storage) = open_temp();
        let id = Uuid::from_u128(100);

        storage.save(id, b"ciphertext").unwrap();
        storage.load_and_delete(id).unwrap();

        assert!(storage.load_and_delete(id).unwrap().is_empty());
    }

    #[test]
    fn test_load_never_written_is_empty() {
        let (_dir, storage) = open_temp();
        assert!(storage.load_and_delete(Uuid::from_u128(999)).unwrap().is_empty());
    }

    #[test]
    fn test_save_is_write_once() {
        let (_dir, storage) = open_temp();
        let id = Uuid::from_u128(100);

        storage.save(id, b"first").unwrap();
        let result = storage.save(id, b"second");

        assert_eq!(result, Err(StorageError::AlreadyExists { id }));
        assert_eq!(storage.load_and_delete(id).unwrap(), b"first");
    }

    #[test]
    fn test_save_rejects_empty_value() {
        let (_dir, storage) = open_temp();
        let id = Uuid::from_u128(1);

        assert_eq!(storage.save(id, b""), Err(StorageError::EmptyValue { id }));
        assert_eq!(storage.document_count().unwrap(), 0);
    }

    #[test]
    fn test_group_entries_are_independent() {
        let (_dir, storage) = open_temp();
        let group = Uuid::from_u128(7);

        storage
            .save_group(group, &[(0, b"zero".as_slice()), (1, b"one"), (2, b"two")])
            .unwrap();
        assert_eq!(storage.group_len(group).unwrap(), 3);

        assert_eq!(storage.load_and_delete_indexed(group, 1).unwrap(), b"one");
        assert!(storage.load_and_delete_indexed(group, 1).unwrap().is_empty());
        assert_eq!(storage.group_len(group).unwrap(), 2);

        assert_eq!(storage.load_and_delete_indexed(group, 0).unwrap(), b"zero");
        assert_eq!(storage.load_and_delete_indexed(group, 2).unwrap(), b"two");
    }

    #[test]
    fn test_drained_group_table_is_removed() {
        let (_dir, storage) = open_temp();
        let group = Uuid::from_u128(7);

        storage.save_group(group, &[(0, b"only".as_slice())]).unwrap();
        storage.load_and_delete_indexed(group, 0).unwrap();

        assert_eq!(storage.group_len(group).unwrap(), 0);

        // Namespace is gone, so the same id can be used again
        storage.save_group(group, &[(0, b"again".as_slice())]).unwrap();
        assert_eq!(storage.load_and_delete_indexed(group, 0).unwrap(), b"again");
    }

    #[test]
    fn test_load_from_unknown_group_is_empty() {
        let (_dir, storage) = open_temp();
        let group = Uuid::from_u128(55);

        assert!(storage.load_and_delete_indexed(group, 3).unwrap().is_empty());
        assert_eq!(storage.group_len(group).unwrap(), 0);
    }

    #[test]
    fn test_save_group_is_write_once() {
        let (_dir, storage) = open_temp();
        let group = Uuid::from_u128(7);

        storage.save_group(group, &[(0, b"a".as_slice())]).unwrap();
        let result = storage.save_group(group, &[(1, b"b".as_slice())]);

        assert_eq!(result, Err(StorageError::AlreadyExists { id: group }));
        assert_eq!(storage.group_len(group).unwrap(), 1);
    }

    #[test]
    fn test_save_group_duplicate_index_aborts() {
        let (_dir, storage) = open_temp();
        let group = Uuid::from_u128(7);

        let result = storage.save_group(group, &[(0, b"a".as_slice()), (0, b"b")]);

        assert_eq!(result, Err(StorageError::AlreadyExists { id: group }));
        assert_eq!(storage.group_len(group).unwrap(), 0);
    }

    #[test]
    fn test_save_group_rejects_empty() {
        let (_dir, storage) = open_temp();
        let group = Uuid::from_u128(7);

        assert_eq!(storage.save_group(group, &[]), Err(StorageError::EmptyValue { id: group }));
        assert_eq!(
            storage.save_group(group, &[(0, b"a".as_slice()), (1, b"")]),
            Err(StorageError::EmptyValue { id: group })
        );
    }

    #[test]
    fn test_documents_and_groups_do_not_collide() {
        let (_dir, storage) = open_temp();
        let id = Uuid::from_u128(42);

        storage.save(id, b"single").unwrap();
        storage.save_group(id, &[(0, b"shared".as_slice())]).unwrap();

        assert_eq!(storage.load_and_delete_indexed(id, 0).unwrap(), b"shared");
        assert_eq!(storage.load_and_delete(id).unwrap(), b"single");
    }
}
