use thiserror::Error;

/// Errors surfaced by the discovery engine
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DiscoveryError {
    /// The request or a coordinate handed to the engine is malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// A data-access collaborator failed; the whole request may be retried
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
}

impl DiscoveryError {
    pub fn validation(message: impl Into<String>) -> Self {
        DiscoveryError::Validation(message.into())
    }

    pub fn data_unavailable(message: impl Into<String>) -> Self {
        DiscoveryError::DataUnavailable(message.into())
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
