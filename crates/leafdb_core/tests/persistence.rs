//! File-backed lifecycle tests.

use leafdb_core::{Config, CoreError, Database, KeyValueDatabase, Keyspace};
use tempfile::TempDir;

#[test]
fn reopen_preserves_entries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("leaf.redb");

    {
        let db = Database::open(&path).unwrap();
        let users = db.get_or_create_keyspace("users").unwrap();
        users.insert(b"user1", b"1").unwrap();
        users.insert(b"user2", b"2").unwrap();
        db.close().unwrap();
    }

    let db = Database::open(&path).unwrap();
    let users = db.get_or_create_keyspace("users").unwrap();
    assert_eq!(users.get(b"user1").unwrap(), b"1");
    assert_eq!(users.get(b"user2").unwrap(), b"2");
    assert_eq!(users.size().unwrap(), 2);
}

#[test]
fn open_missing_without_create_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.redb");

    let config = Config::new().create_if_missing(false);
    let result = Database::open_with_config(&path, config);
    assert!(matches!(result, Err(CoreError::Engine(_))));
}

#[test]
fn keyspaces_are_independent() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(&dir.path().join("leaf.redb")).unwrap();

    let users = db.get_or_create_keyspace("users").unwrap();
    let sessions = db.get_or_create_keyspace("sessions").unwrap();

    users.insert(b"shared-key", b"from-users").unwrap();
    sessions.insert(b"shared-key", b"from-sessions").unwrap();

    assert_eq!(users.get(b"shared-key").unwrap(), b"from-users");
    assert_eq!(sessions.get(b"shared-key").unwrap(), b"from-sessions");

    db.delete_keyspace("users").unwrap();
    assert_eq!(sessions.get(b"shared-key").unwrap(), b"from-sessions");
}

#[test]
fn write_tx_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("leaf.redb");

    {
        let db = Database::open(&path).unwrap();
        let users = db.get_or_create_keyspace("users").unwrap();
        users
            .write_tx(|view| {
                view.insert(b"user1", b"1")?;
                view.insert(b"user2", b"2")?;
                Ok(())
            })
            .unwrap();
        db.close().unwrap();
    }

    let db = Database::open(&path).unwrap();
    let users = db.get_or_create_keyspace("users").unwrap();
    assert_eq!(users.size().unwrap(), 2);
}

#[test]
fn deleted_keyspace_stays_deleted_after_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("leaf.redb");

    {
        let db = Database::open(&path).unwrap();
        let users = db.get_or_create_keyspace("users").unwrap();
        users.insert(b"user1", b"1").unwrap();
        db.get_or_create_keyspace("sessions").unwrap();
        db.delete_keyspace("users").unwrap();
        db.close().unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.keyspace_names().unwrap(), ["sessions"]);
}
