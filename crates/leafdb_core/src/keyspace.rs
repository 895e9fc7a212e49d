//! Keyspace contract and the redb-backed implementation.

use crate::database::{keyspace_table, EngineHandle};
use crate::error::{CoreError, CoreResult};
use crate::view::{ReadView, WriteView};
use redb::{
    ReadTransaction, ReadableTable, ReadableTableMetadata, TableHandle, WriteTransaction,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A handle to one named partition of the database.
///
/// Each operation opens its own read or write transaction against the
/// engine, scoped to this partition, and commits or aborts it before
/// returning. Grouping multiple mutations into one transaction requires
/// [`Keyspace::write_tx`].
pub trait Keyspace {
    /// Returns the name of the keyspace.
    fn name(&self) -> &str;

    /// Sets `key` to `value`, overwriting any existing entry.
    fn insert(&self, key: &[u8], value: &[u8]) -> CoreResult<()>;

    /// Overwrites the value associated with `key`.
    ///
    /// Deliberately identical to [`Keyspace::insert`]: there is no
    /// must-already-exist check. Callers wanting strict update-only
    /// semantics can combine this with [`Keyspace::contains`].
    fn update(&self, key: &[u8], value: &[u8]) -> CoreResult<()> {
        self.insert(key, value)
    }

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyNotFound`] if the key is absent; a missing
    /// key is never reported as an empty value.
    fn get(&self, key: &[u8]) -> CoreResult<Vec<u8>>;

    /// Removes `key` from the keyspace.
    ///
    /// Removing an absent key is not an error.
    fn delete(&self, key: &[u8]) -> CoreResult<()>;

    /// Returns the number of entries in the keyspace.
    ///
    /// Sourced from the engine's own table statistics, not a scan.
    fn size(&self) -> CoreResult<u64>;

    /// Returns whether `key` exists in the keyspace.
    ///
    /// Equivalent to "[`Keyspace::get`] succeeds", but reports existence
    /// as a boolean instead of surfacing [`CoreError::KeyNotFound`].
    fn contains(&self, key: &[u8]) -> CoreResult<bool>;

    /// Visits, in ascending key order, every entry whose key is in `keys`.
    ///
    /// Requested keys absent from the keyspace are silently skipped, and
    /// duplicates in the request fire the handler once. The scan is bounded
    /// to the range spanned by the requested keys, so clustered requests
    /// never pay for a full-partition scan.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyKeyList`] if `keys` is empty; the handler
    /// is not invoked in that case.
    fn list<K, F>(&self, keys: &[K], handler: F) -> CoreResult<()>
    where
        K: AsRef<[u8]>,
        F: FnMut(&[u8], &[u8]);

    /// Visits every entry in the keyspace in ascending key order.
    ///
    /// A handler error stops the iteration and becomes the overall result.
    fn for_each<F>(&self, handler: F) -> CoreResult<()>
    where
        F: FnMut(&[u8], &[u8]) -> CoreResult<()>;

    /// Runs `f` with read access to the partition inside one read
    /// transaction.
    ///
    /// Escape hatch for read operations not covered by the standard
    /// surface. The view observes a consistent snapshot as of transaction
    /// start.
    fn read_tx<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&ReadView) -> CoreResult<T>;

    /// Runs `f` with write access to the partition inside one write
    /// transaction.
    ///
    /// Escape hatch for grouping multiple mutations atomically. The
    /// transaction commits if `f` returns `Ok` and aborts on `Err`, on
    /// every exit path.
    fn write_tx<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut WriteView<'_>) -> CoreResult<T>;
}

/// [`Keyspace`] implementation backed by one redb table.
///
/// Holds the partition name and a non-owning handle to the database's
/// engine; the partition itself may be deleted independently of this
/// object, after which operations fail with [`CoreError::KeyspaceMissing`].
pub struct RedbKeyspace {
    /// Partition name, immutable for the life of the handle.
    name: String,
    /// Engine handle shared with the owning database.
    handle: Arc<EngineHandle>,
}

impl RedbKeyspace {
    pub(crate) fn new(name: &str, handle: Arc<EngineHandle>) -> Self {
        Self {
            name: name.to_string(),
            handle,
        }
    }

    /// Runs `f` inside one read transaction.
    fn read_with<T>(&self, f: impl FnOnce(&ReadTransaction) -> CoreResult<T>) -> CoreResult<T> {
        self.handle.with_engine(|engine| {
            let tx = engine.begin_read()?;
            f(&tx)
        })
    }

    /// Runs `f` inside one write transaction, committing on `Ok` and
    /// aborting on `Err` without masking the original error.
    fn write_with<T>(&self, f: impl FnOnce(&WriteTransaction) -> CoreResult<T>) -> CoreResult<T> {
        self.handle.with_engine(|engine| {
            let tx = engine.begin_write()?;
            match f(&tx) {
                Ok(value) => {
                    tx.commit()?;
                    Ok(value)
                }
                Err(e) => {
                    let _ = tx.abort();
                    Err(e)
                }
            }
        })
    }

    fn open_read_table(
        &self,
        tx: &ReadTransaction,
    ) -> CoreResult<redb::ReadOnlyTable<&'static [u8], &'static [u8]>> {
        tx.open_table(keyspace_table(&self.name))
            .map_err(|e| CoreError::from_table_error(&self.name, e))
    }

    /// Opens the partition's table for writing.
    ///
    /// The existence check comes first: a write-transaction `open_table`
    /// would otherwise silently re-create a deleted partition.
    fn open_write_table<'tx>(
        &self,
        tx: &'tx WriteTransaction,
    ) -> CoreResult<redb::Table<'tx, &'static [u8], &'static [u8]>> {
        let exists = tx.list_tables()?.any(|t| t.name() == self.name);
        if !exists {
            return Err(CoreError::keyspace_missing(&self.name));
        }
        tx.open_table(keyspace_table(&self.name))
            .map_err(|e| CoreError::from_table_error(&self.name, e))
    }
}

impl Keyspace for RedbKeyspace {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert(&self, key: &[u8], value: &[u8]) -> CoreResult<()> {
        self.write_with(|tx| {
            let mut table = self.open_write_table(tx)?;
            table.insert(key, value)?;
            Ok(())
        })
    }

    fn get(&self, key: &[u8]) -> CoreResult<Vec<u8>> {
        self.read_with(|tx| {
            let table = self.open_read_table(tx)?;
            match table.get(key)? {
                Some(value) => Ok(value.value().to_vec()),
                None => Err(CoreError::key_not_found(&self.name, key)),
            }
        })
    }

    fn delete(&self, key: &[u8]) -> CoreResult<()> {
        self.write_with(|tx| {
            let mut table = self.open_write_table(tx)?;
            table.remove(key)?;
            Ok(())
        })
    }

    fn size(&self) -> CoreResult<u64> {
        self.read_with(|tx| {
            let table = self.open_read_table(tx)?;
            Ok(table.len()?)
        })
    }

    fn contains(&self, key: &[u8]) -> CoreResult<bool> {
        self.read_with(|tx| {
            let table = self.open_read_table(tx)?;
            Ok(table.get(key)?.is_some())
        })
    }

    fn list<K, F>(&self, keys: &[K], mut handler: F) -> CoreResult<()>
    where
        K: AsRef<[u8]>,
        F: FnMut(&[u8], &[u8]),
    {
        if keys.is_empty() {
            return Err(CoreError::EmptyKeyList);
        }

        // Sorted and deduplicated; the first and last members bound the scan.
        let requested: BTreeSet<&[u8]> = keys.iter().map(AsRef::as_ref).collect();
        let (Some(&first), Some(&last)) = (requested.first(), requested.last()) else {
            return Err(CoreError::EmptyKeyList);
        };

        self.read_with(|tx| {
            let table = self.open_read_table(tx)?;
            for entry in table.range(first..=last)? {
                let (key, value) = entry?;
                if requested.contains(key.value()) {
                    handler(key.value(), value.value());
                }
            }
            Ok(())
        })
    }

    fn for_each<F>(&self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(&[u8], &[u8]) -> CoreResult<()>,
    {
        self.read_with(|tx| {
            let table = self.open_read_table(tx)?;
            for entry in table.iter()? {
                let (key, value) = entry?;
                handler(key.value(), value.value())?;
            }
            Ok(())
        })
    }

    fn read_tx<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&ReadView) -> CoreResult<T>,
    {
        self.read_with(|tx| {
            let view = ReadView::new(self.open_read_table(tx)?);
            f(&view)
        })
    }

    fn write_tx<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut WriteView<'_>) -> CoreResult<T>,
    {
        self.write_with(|tx| {
            let mut view = WriteView::new(self.open_write_table(tx)?);
            f(&mut view)
        })
    }
}

impl std::fmt::Debug for RedbKeyspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbKeyspace")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
