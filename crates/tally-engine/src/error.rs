//! Error types for the ledger engine.
//!
//! [`EngineError`] is the engine's whole failure taxonomy. Callers map the
//! variants onto their own surfaces (the HTTP layer turns them into 400,
//! 404, 409, and 503 responses) without inspecting message text.

/// Failure modes of engine operations.
///
/// Every variant leaves the stores untouched: an operation either applies
/// completely or reports one of these without any partial write.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The request is malformed (non-positive amount, empty name,
    /// duplicate identifier on an explicit creation).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An id-addressed operation referenced an unknown event, point type,
    /// or user.
    #[error("not found: {0}")]
    NotFound(String),

    /// A concurrent update was detected and internal retries were
    /// exhausted. The serializing write guard cannot produce this itself;
    /// the variant is the contract point where a store backed by
    /// compare-and-swap would surface a transient conflict.
    #[error("concurrent update conflict: {0}")]
    ConflictRace(String),

    /// The underlying store is unreachable. Fatal for the in-flight
    /// request only; the process keeps serving.
    #[error("store unavailable: {0}")]
    StorageUnavailable(String),
}

impl EngineError {
    /// Convenience constructor for [`EngineError::InvalidInput`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Convenience constructor for [`EngineError::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}
