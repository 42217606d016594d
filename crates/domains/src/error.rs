//! # EngineError
//!
//! Centralized error handling for the reputation engine.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;
use uuid::Uuid;

/// The primary error type for all reputation-engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The (voter, target) pair already has a ledger entry. An expected,
    /// user-facing outcome ("you already voted"), not an infrastructure fault.
    #[error("duplicate vote: voter {voter_id} already voted for target {target_id}")]
    DuplicateVote { voter_id: String, target_id: Uuid },

    /// The referenced vendor profile does not exist (deleted or mistyped).
    #[error("target not found with ID {0}")]
    TargetNotFound(Uuid),

    /// Validation failure (e.g., empty voter id, nil target id)
    #[error("validation error: {0}")]
    Validation(String),

    /// A concurrent writer updated the same record first (stale revision).
    /// Retryable by the caller; the engine never retries internally.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., store down, write timed out)
    #[error("persistence error: {0}")]
    Persistence(String),
}

/// A specialized Result type for reputation-engine logic.
pub type Result<T> = std::result::Result<T, EngineError>;
