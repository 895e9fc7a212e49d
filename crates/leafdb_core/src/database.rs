//! Database handle and keyspace lifecycle.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::keyspace::{Keyspace, RedbKeyspace};
use parking_lot::RwLock;
use redb::{TableDefinition, TableHandle};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Returns the engine table definition for a named keyspace.
///
/// Each keyspace maps to one redb table keyed and valued by raw bytes;
/// the engine's native `&[u8]` ordering is the keyspace ordering.
pub(crate) fn keyspace_table(name: &str) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
    TableDefinition::new(name)
}

/// Shared, close-aware handle to the storage engine.
///
/// The `Database` owns the engine; keyspaces hold this handle and look the
/// engine up on every call. Closing the database replaces the engine with
/// `None`, which invalidates every outstanding keyspace at once without
/// reference-counting the engine itself.
pub(crate) struct EngineHandle {
    engine: RwLock<Option<redb::Database>>,
}

impl EngineHandle {
    fn new(engine: redb::Database) -> Self {
        Self {
            engine: RwLock::new(Some(engine)),
        }
    }

    /// Runs `f` against the engine, failing if the database is closed.
    ///
    /// The read side of the lock is held for the duration of `f`, so a
    /// concurrent `close()` waits for in-flight operations to finish.
    pub(crate) fn with_engine<T>(
        &self,
        f: impl FnOnce(&redb::Database) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let guard = self.engine.read();
        match guard.as_ref() {
            Some(engine) => f(engine),
            None => Err(CoreError::DatabaseClosed),
        }
    }

    fn close(&self) {
        let mut guard = self.engine.write();
        *guard = None;
    }

    fn is_open(&self) -> bool {
        self.engine.read().is_some()
    }
}

/// Access to multiple named keyspaces within one database.
///
/// Every operation opens and commits (or aborts) exactly one engine
/// transaction; nothing here spans multiple transactions.
pub trait KeyValueDatabase {
    /// The keyspace handle type produced by this database.
    type Keyspace: Keyspace;

    /// Returns a keyspace handle, creating the underlying partition if absent.
    ///
    /// Idempotent: repeated calls with the same name never fail because the
    /// partition already exists.
    fn get_or_create_keyspace(&self, name: &str) -> CoreResult<Self::Keyspace>;

    /// Removes a keyspace and all of its entries.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyspaceMissing`] if no partition with that
    /// name exists.
    fn delete_keyspace(&self, name: &str) -> CoreResult<()>;

    /// Closes the database connection.
    ///
    /// Idempotent. After closing, every operation through any keyspace
    /// obtained from this database fails with [`CoreError::DatabaseClosed`].
    fn close(&self) -> CoreResult<()>;
}

/// The main database handle.
///
/// `Database` owns the connection to the storage engine and is the single
/// entry point for obtaining keyspaces. Dropping the database closes it.
///
/// # Example
///
/// ```rust,ignore
/// use leafdb_core::{Database, KeyValueDatabase, Keyspace};
///
/// let db = Database::open(Path::new("leaf.redb"))?;
/// let users = db.get_or_create_keyspace("users")?;
/// users.insert(b"user1", b"1")?;
/// assert_eq!(users.get(b"user1")?, b"1");
/// db.close()?;
/// ```
pub struct Database {
    /// Configuration.
    config: Config,
    /// Engine handle, shared with every keyspace obtained from this database.
    handle: Arc<EngineHandle>,
}

impl Database {
    /// Opens or creates a database file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Engine`] if the engine cannot open the file.
    pub fn open(path: &Path) -> CoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a database file with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Engine`] if the file does not exist and
    /// `create_if_missing` is false, or if the engine cannot open it.
    pub fn open_with_config(path: &Path, config: Config) -> CoreResult<Self> {
        let mut builder = redb::Database::builder();
        if let Some(cache_size) = config.cache_size {
            builder.set_cache_size(cache_size);
        }

        let engine = if config.create_if_missing {
            builder.create(path)?
        } else {
            builder.open(path)?
        };

        debug!(path = %path.display(), "opened database");
        Ok(Self {
            config,
            handle: Arc::new(EngineHandle::new(engine)),
        })
    }

    /// Opens a fresh in-memory database.
    ///
    /// Non-persistent; data is lost when the database is closed. Intended
    /// for tests.
    pub fn open_in_memory() -> CoreResult<Self> {
        let engine = redb::Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())?;
        Ok(Self {
            config: Config::default(),
            handle: Arc::new(EngineHandle::new(engine)),
        })
    }

    /// Returns the names of all existing keyspaces, sorted.
    pub fn keyspace_names(&self) -> CoreResult<Vec<String>> {
        self.handle.with_engine(|engine| {
            let tx = engine.begin_read()?;
            let mut names: Vec<String> = tx.list_tables()?.map(|t| t.name().to_string()).collect();
            names.sort();
            Ok(names)
        })
    }

    /// Checks if the database is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.handle.is_open()
    }

    /// Returns the database configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl KeyValueDatabase for Database {
    type Keyspace = RedbKeyspace;

    fn get_or_create_keyspace(&self, name: &str) -> CoreResult<RedbKeyspace> {
        self.handle.with_engine(|engine| {
            let tx = engine.begin_write()?;
            // open_table creates the table if it doesn't exist yet.
            let opened = tx.open_table(keyspace_table(name)).map(drop);
            match opened {
                Ok(()) => {
                    tx.commit()?;
                    Ok(())
                }
                Err(e) => {
                    let _ = tx.abort();
                    Err(CoreError::from_table_error(name, e))
                }
            }
        })?;

        debug!(keyspace = name, "ensured keyspace exists");
        Ok(RedbKeyspace::new(name, Arc::clone(&self.handle)))
    }

    fn delete_keyspace(&self, name: &str) -> CoreResult<()> {
        self.handle.with_engine(|engine| {
            let tx = engine.begin_write()?;
            match tx.delete_table(keyspace_table(name)) {
                Ok(true) => {
                    tx.commit()?;
                    debug!(keyspace = name, "deleted keyspace");
                    Ok(())
                }
                Ok(false) => {
                    let _ = tx.abort();
                    Err(CoreError::keyspace_missing(name))
                }
                Err(e) => {
                    let _ = tx.abort();
                    Err(CoreError::from_table_error(name, e))
                }
            }
        })
    }

    fn close(&self) -> CoreResult<()> {
        self.handle.close();
        debug!("closed database");
        Ok(())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("is_open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        self.handle.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn open_in_memory() {
        let db = create_db();
        assert!(db.is_open());
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let db = create_db();

        let first = db.get_or_create_keyspace("users").unwrap();
        first.insert(b"user1", b"1").unwrap();

        // The second handle addresses the same partition.
        let second = db.get_or_create_keyspace("users").unwrap();
        assert_eq!(second.get(b"user1").unwrap(), b"1");
        assert_eq!(second.size().unwrap(), 1);
    }

    #[test]
    fn delete_keyspace_removes_entries() {
        let db = create_db();
        let ks = db.get_or_create_keyspace("users").unwrap();
        ks.insert(b"user1", b"1").unwrap();

        db.delete_keyspace("users").unwrap();

        // Re-creating yields an empty partition.
        let ks = db.get_or_create_keyspace("users").unwrap();
        assert_eq!(ks.size().unwrap(), 0);
    }

    #[test]
    fn delete_missing_keyspace_fails() {
        let db = create_db();
        let result = db.delete_keyspace("absent");
        assert!(matches!(result, Err(CoreError::KeyspaceMissing { .. })));
    }

    #[test]
    fn keyspace_names_are_sorted() {
        let db = create_db();
        db.get_or_create_keyspace("banana").unwrap();
        db.get_or_create_keyspace("apple").unwrap();
        db.get_or_create_keyspace("cherry").unwrap();

        assert_eq!(db.keyspace_names().unwrap(), ["apple", "banana", "cherry"]);
    }

    #[test]
    fn close_invalidates_keyspaces() {
        let db = create_db();
        let ks = db.get_or_create_keyspace("users").unwrap();
        ks.insert(b"user1", b"1").unwrap();

        db.close().unwrap();
        assert!(!db.is_open());

        let result = ks.get(b"user1");
        assert!(matches!(result, Err(CoreError::DatabaseClosed)));

        let result = db.get_or_create_keyspace("other");
        assert!(matches!(result, Err(CoreError::DatabaseClosed)));
    }

    #[test]
    fn close_is_idempotent() {
        let db = create_db();
        db.close().unwrap();
        db.close().unwrap();
    }

    #[test]
    fn drop_invalidates_keyspaces() {
        let db = create_db();
        let ks = db.get_or_create_keyspace("users").unwrap();
        drop(db);

        let result = ks.insert(b"user1", b"1");
        assert!(matches!(result, Err(CoreError::DatabaseClosed)));
    }
}
