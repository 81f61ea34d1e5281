//! Errors raised while requesting transitions and saving records.

use crate::builder::DefinitionError;
use crate::runtime::record::ValidationErrors;
use thiserror::Error;

/// Boxed error produced by a host's storage layer.
pub type StorageError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur at runtime.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("event '{event}' is not defined for '{attribute}'")]
    UndefinedEvent { attribute: String, event: String },

    #[error("no state machine is defined for '{attribute}'")]
    UndefinedMachine { attribute: String },

    #[error("{event} does not transition from {state}; defined are {defined}")]
    TransitionNotFound {
        event: String,
        state: String,
        defined: String,
    },

    #[error("Validation failed: {errors}")]
    RecordInvalid { errors: ValidationErrors },

    #[error("storage operation failed: {0}")]
    Storage(#[source] StorageError),

    #[error("callback failed: {0}")]
    Callback(String),

    /// The lifecycle hooks were driven out of order.
    #[error("callback ordering violated: {0}")]
    OrderingViolation(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn storage(err: impl Into<StorageError>) -> Self {
        Error::Storage(err.into())
    }

    pub fn callback(message: impl Into<String>) -> Self {
        Error::Callback(message.into())
    }
}
