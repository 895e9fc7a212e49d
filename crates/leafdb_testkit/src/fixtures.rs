//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and pre-populated keyspaces.

use leafdb_core::{Database, KeyValueDatabase, Keyspace, RedbKeyspace};
use std::path::PathBuf;
use tempfile::TempDir;

/// A test database with automatic cleanup.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates a new in-memory test database.
    pub fn memory() -> Self {
        Self {
            db: Database::open_in_memory().expect("Failed to open in-memory database"),
            _temp_dir: None,
        }
    }

    /// Creates a new file-based test database.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db =
            Database::open(&temp_dir.path().join("test.leafdb")).expect("Failed to open database");

        Self {
            db,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the database path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir.as_ref().map(|d| d.path().join("test.leafdb"))
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

impl std::ops::DerefMut for TestDatabase {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.db
    }
}

/// Runs a test with a temporary in-memory database.
///
/// # Example
///
/// ```rust,ignore
/// use leafdb_testkit::with_temp_db;
///
/// #[test]
/// fn my_test() {
///     with_temp_db(|db| {
///         let ks = db.get_or_create_keyspace("test").unwrap();
///         // ... test operations
///     });
/// }
/// ```
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::memory();
    f(&test_db.db)
}

/// Runs a test with a temporary file-based database.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database, &std::path::Path) -> R,
{
    let test_db = TestDatabase::file();
    let path = test_db.path().expect("File database should have a path");
    f(&test_db.db, &path)
}

/// Creates an in-memory database with a keyspace pre-populated with
/// `entry_count` entries keyed `key0000`, `key0001`, ... in order.
pub fn populated_keyspace(entry_count: usize) -> (TestDatabase, RedbKeyspace) {
    let test_db = TestDatabase::memory();
    let ks = test_db
        .db
        .get_or_create_keyspace("fixture")
        .expect("Failed to create keyspace");

    for i in 0..entry_count {
        ks.insert(
            format!("key{i:04}").as_bytes(),
            format!("value{i}").as_bytes(),
        )
        .expect("Failed to insert fixture entry");
    }

    (test_db, ks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_fixture_works() {
        with_temp_db(|db| {
            let ks = db.get_or_create_keyspace("test").unwrap();
            ks.insert(b"key", b"value").unwrap();
            assert_eq!(ks.get(b"key").unwrap(), b"value");
        });
    }

    #[test]
    fn file_fixture_works() {
        with_file_db(|db, path| {
            assert!(path.exists());
            let ks = db.get_or_create_keyspace("test").unwrap();
            ks.insert(b"key", b"value").unwrap();
            assert_eq!(ks.get(b"key").unwrap(), b"value");
        });
    }

    #[test]
    fn populated_fixture_has_expected_entries() {
        let (_db, ks) = populated_keyspace(5);
        assert_eq!(ks.size().unwrap(), 5);
        assert_eq!(ks.get(b"key0003").unwrap(), b"value3");
    }
}
