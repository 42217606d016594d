//! # storage-adapters
//!
//! SQLite implementation of the `domains` storage ports. This module owns
//! the data mapping between the relational model and the domain structs:
//! UUIDs travel as 16-byte BLOBs, grant histories as JSON text columns.

mod sqlite;

pub use sqlite::SqliteStore;
