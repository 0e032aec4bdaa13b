use thiserror::Error;

/// Error types for the relation layer
#[derive(Error, Debug)]
pub enum RelationError {
    /// An identifier that does not match the store's identifier format.
    /// Raised before any store access is attempted.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A well-formed identifier that resolves to no entity.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A structurally valid request the relation rules forbid,
    /// e.g. a user following itself.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl RelationError {
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        RelationError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Type alias for Result with RelationError
pub type Result<T> = std::result::Result<T, RelationError>;
