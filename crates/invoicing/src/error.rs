//! Error kinds surfaced to intake callers.

use thiserror::Error;

use intake_core::DomainError;

/// Failure of one invoice intake call.
///
/// `Validation` and `InvalidValue` are raised before any write happens.
/// `UnresolvedReference` and `Unexpected` are raised inside the transaction
/// scope, which is rolled back before the error reaches the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntakeError {
    /// A required field is missing or structurally wrong.
    #[error("{0}")]
    Validation(String),

    /// A field is present but its content cannot be interpreted.
    #[error("Invalid value provided: {0}")]
    InvalidValue(String),

    /// A referenced record (currency, partner, product) does not exist.
    #[error("{0}")]
    UnresolvedReference(String),

    /// Any other failure, including the record store's.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl IntakeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unresolved(msg: impl Into<String>) -> Self {
        Self::UnresolvedReference(msg.into())
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            IntakeError::Validation(_) => "validation_error",
            IntakeError::InvalidValue(_) => "invalid_value",
            IntakeError::UnresolvedReference(_) => "unresolved_reference",
            IntakeError::Unexpected(_) => "unexpected_error",
        }
    }

    /// Whether the caller can fix the request and resubmit.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, IntakeError::Unexpected(_))
    }
}

impl From<DomainError> for IntakeError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => IntakeError::Validation(msg),
            DomainError::InvalidValue(msg) | DomainError::InvalidId(msg) => {
                IntakeError::InvalidValue(msg)
            }
        }
    }
}
