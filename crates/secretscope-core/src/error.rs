use thiserror::Error;

/// Errors returned by secret stores and passed through by the service
#[derive(Debug, Error)]
pub enum SecretError {
    /// A scoped lookup had no match
    #[error("Secret '{name}' not found in {scope} scope")]
    NotFound { scope: String, name: String },

    /// Underlying persistence failure
    #[error("Secret store failure: {0}")]
    StoreFailure(String),

    /// A secret with this name is already declared in the scope
    #[error("Secret '{name}' already exists in {scope} scope")]
    AlreadyExists { scope: String, name: String },

    /// Record failed validation
    #[error("Invalid secret {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// An update tried to move a secret to another scope
    #[error("Secret scope cannot change (stored in {expected}, got {found})")]
    ScopeMismatch { expected: String, found: String },
}

impl SecretError {
    /// Create a not-found error
    pub fn not_found(scope: impl ToString, name: impl Into<String>) -> Self {
        Self::NotFound {
            scope: scope.to_string(),
            name: name.into(),
        }
    }

    /// Create a store failure error
    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreFailure(message.into())
    }

    /// Create an already-exists error
    pub fn already_exists(scope: impl ToString, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            scope: scope.to_string(),
            name: name.into(),
        }
    }

    /// Create a validation error
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this is a `NotFound` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, SecretError>;
