//! # domains
//!
//! The central domain logic and interface definitions for the Plugdex
//! reputation engine: the vote ledger and the badge/reward aggregation
//! that feed the directory's vendor ranking.

pub mod error;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
