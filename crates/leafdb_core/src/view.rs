//! Scoped partition views for the raw transaction escape hatches.
//!
//! [`crate::Keyspace::read_tx`] and [`crate::Keyspace::write_tx`] hand these
//! views to caller callbacks instead of exposing the engine's transaction or
//! table types. The surrounding call owns the transaction boundary: commit
//! or abort happens on every exit path once the callback returns.

use crate::error::CoreResult;
use redb::{ReadableTable, ReadableTableMetadata};

type KeyspaceReadTable = redb::ReadOnlyTable<&'static [u8], &'static [u8]>;
type KeyspaceWriteTable<'tx> = redb::Table<'tx, &'static [u8], &'static [u8]>;

/// Read access to one partition inside a single read transaction.
///
/// Observes a consistent snapshot of the partition as of transaction start.
pub struct ReadView {
    table: KeyspaceReadTable,
}

impl ReadView {
    pub(crate) fn new(table: KeyspaceReadTable) -> Self {
        Self { table }
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &[u8]) -> CoreResult<Option<Vec<u8>>> {
        Ok(self.table.get(key)?.map(|v| v.value().to_vec()))
    }

    /// Returns whether `key` exists in the partition.
    pub fn contains(&self, key: &[u8]) -> CoreResult<bool> {
        Ok(self.table.get(key)?.is_some())
    }

    /// Returns the number of entries in the partition.
    pub fn len(&self) -> CoreResult<u64> {
        Ok(self.table.len()?)
    }

    /// Returns whether the partition is empty.
    pub fn is_empty(&self) -> CoreResult<bool> {
        Ok(self.table.is_empty()?)
    }

    /// Returns the first entry in key order, if any.
    pub fn first(&self) -> CoreResult<Option<(Vec<u8>, Vec<u8>)>> {
        Ok(self
            .table
            .first()?
            .map(|(k, v)| (k.value().to_vec(), v.value().to_vec())))
    }

    /// Returns the last entry in key order, if any.
    pub fn last(&self) -> CoreResult<Option<(Vec<u8>, Vec<u8>)>> {
        Ok(self
            .table
            .last()?
            .map(|(k, v)| (k.value().to_vec(), v.value().to_vec())))
    }

    /// Visits every entry in ascending key order.
    ///
    /// A handler error stops the iteration and becomes the overall result.
    pub fn for_each<F>(&self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(&[u8], &[u8]) -> CoreResult<()>,
    {
        for entry in self.table.iter()? {
            let (key, value) = entry?;
            handler(key.value(), value.value())?;
        }
        Ok(())
    }
}

/// Read/write access to one partition inside a single write transaction.
///
/// Mutations become durable only if the enclosing
/// [`crate::Keyspace::write_tx`] callback returns `Ok`; any `Err` aborts
/// the whole transaction.
pub struct WriteView<'tx> {
    table: KeyspaceWriteTable<'tx>,
}

impl<'tx> WriteView<'tx> {
    pub(crate) fn new(table: KeyspaceWriteTable<'tx>) -> Self {
        Self { table }
    }

    /// Returns the value stored under `key`, if any.
    ///
    /// Sees mutations already made through this view.
    pub fn get(&self, key: &[u8]) -> CoreResult<Option<Vec<u8>>> {
        Ok(self.table.get(key)?.map(|v| v.value().to_vec()))
    }

    /// Returns whether `key` exists in the partition.
    pub fn contains(&self, key: &[u8]) -> CoreResult<bool> {
        Ok(self.table.get(key)?.is_some())
    }

    /// Returns the number of entries in the partition.
    pub fn len(&self) -> CoreResult<u64> {
        Ok(self.table.len()?)
    }

    /// Returns whether the partition is empty.
    pub fn is_empty(&self) -> CoreResult<bool> {
        Ok(self.table.is_empty()?)
    }

    /// Sets `key` to `value`, overwriting any existing entry.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> CoreResult<()> {
        self.table.insert(key, value)?;
        Ok(())
    }

    /// Removes `key`, returning the previous value if one existed.
    pub fn remove(&mut self, key: &[u8]) -> CoreResult<Option<Vec<u8>>> {
        Ok(self.table.remove(key)?.map(|v| v.value().to_vec()))
    }

    /// Visits every entry in ascending key order.
    pub fn for_each<F>(&self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(&[u8], &[u8]) -> CoreResult<()>,
    {
        for entry in self.table.iter()? {
            let (key, value) = entry?;
            handler(key.value(), value.value())?;
        }
        Ok(())
    }
}
