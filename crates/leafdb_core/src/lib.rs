//! # LeafDB Core
//!
//! Keyspace and transaction layer over an embedded ordered key-value engine.
//!
//! This crate provides:
//! - Named keyspaces: independent logical partitions within one storage file
//! - Per-operation transaction scoping with commit-or-abort on every path
//! - Sorted bulk lookup bounded to the range of the requested keys
//! - Full-partition iteration and raw transaction escape hatches behind
//!   scoped view types
//!
//! Durability, crash recovery, and concurrency control belong to the
//! underlying engine (redb); this layer only performs correct transaction
//! scoping against it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use leafdb_core::{Database, KeyValueDatabase, Keyspace};
//!
//! let db = Database::open_in_memory()?;
//! let users = db.get_or_create_keyspace("users")?;
//! users.insert(b"user1", b"alice")?;
//! assert_eq!(users.get(b"user1")?, b"alice");
//! db.close()?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod keyspace;
mod view;

pub use config::Config;
pub use database::{Database, KeyValueDatabase};
pub use error::{CoreError, CoreResult};
pub use keyspace::{Keyspace, RedbKeyspace};
pub use view::{ReadView, WriteView};
