//! # services
//!
//! Use-case orchestration for the reputation engine. Each service holds a
//! port from `domains` behind dynamic dispatch and exposes the operations
//! the bot/admin backends call. Every public operation is one logical
//! transaction against the store: no shared in-process state, no internal
//! retries, no background tasks. Retry policy belongs to the caller.

pub mod reputation;
pub mod votes;

pub use reputation::RewardAggregator;
pub use votes::VoteLedger;
