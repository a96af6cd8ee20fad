use crate::types::DbId;

/// Domain-level error type shared across the repository and API layers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The targeted violation is already in a terminal state. Carries its
    /// own machine-readable code (`ALREADY_RESOLVED`) so operators can
    /// distinguish a double-action from a generic conflict.
    #[error("Violation {id} is already resolved or dismissed")]
    AlreadyResolved { id: DbId },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
