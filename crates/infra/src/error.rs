//! Error taxonomy for collaborators and the services that coordinate them.
//!
//! - `ProviderError`: identity-provider failures
//! - `StoreError`: directory-store failures
//! - `ServiceError`: what callers of the lifecycle / directory services (and the
//!   authorization guard) see

use thiserror::Error;

use warden_auth::PolicyResult;
use warden_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("credential rejected")]
    Unauthorized,

    #[error("reset token is invalid or expired")]
    InvalidOrExpiredToken,

    #[error("identity not found")]
    NotFound,

    #[error("identity conflict: {0}")]
    Conflict(String),

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid record: {0}")]
    Invalid(String),

    #[error("directory store unavailable: {0}")]
    Unavailable(String),
}

/// Service-level error.
///
/// Policy failures carry the full [`PolicyResult`] so callers can render the
/// violations next to the password field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("reset token is invalid or expired")]
    InvalidOrExpiredToken,

    #[error("password does not meet policy")]
    PolicyViolation(PolicyResult),

    #[error("password confirmation does not match")]
    ConfirmationMismatch,

    #[error("not found")]
    NotFound,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("identity provider failure: {0}")]
    ProviderFailure(String),

    #[error("directory store failure: {0}")]
    Store(String),

    /// One half of a multi-step operation was applied and the other was not.
    #[error("inconsistent state: {0}")]
    InconsistentState(String),
}

impl ServiceError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::InconsistentState(msg.into())
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(msg),
            DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::NotFound => Self::NotFound,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            StoreError::Conflict(msg) | StoreError::Invalid(msg) => Self::Validation(msg),
            StoreError::Unavailable(msg) => Self::Store(msg),
        }
    }
}

impl From<ProviderError> for ServiceError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unauthorized => Self::Unauthenticated,
            ProviderError::InvalidOrExpiredToken => Self::InvalidOrExpiredToken,
            ProviderError::NotFound => Self::NotFound,
            ProviderError::Conflict(msg) => Self::Validation(msg),
            ProviderError::Unavailable(msg) => Self::ProviderFailure(msg),
        }
    }
}
