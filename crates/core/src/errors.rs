use thiserror::Error;

use crate::{paging::TokenError, subscription::TimeParseError};

/// Failure reported by a persistence backend behind one of the store traits.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    SubscriptionTime(#[from] TimeParseError),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<StoreError> for ApplicationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Backend(message) => Self::Persistence(message),
        }
    }
}

/// Errors crossing the chat interface boundary. The correlation code is what
/// an admin sees in the error report and what the log line carries.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_code: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_code: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_code: String },
}

impl InterfaceError {
    pub fn correlation_code(&self) -> &str {
        match self {
            Self::BadRequest { correlation_code, .. }
            | Self::ServiceUnavailable { correlation_code, .. }
            | Self::Internal { correlation_code, .. } => correlation_code,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::ServiceUnavailable { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_code: impl Into<String>) -> InterfaceError {
        let correlation_code = correlation_code.into();
        match self {
            Self::Domain(error) => {
                InterfaceError::BadRequest { message: error.to_string(), correlation_code }
            }
            Self::Persistence(message) | Self::Integration(message) => {
                InterfaceError::ServiceUnavailable { message, correlation_code }
            }
            Self::Configuration(message) => InterfaceError::Internal { message, correlation_code },
        }
    }
}
