use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Static configuration that cannot describe a drivable route.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("Malformed position payload {payload:?}: {reason}")]
    ParseError { payload: String, reason: String },

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl DomainError {
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        DomainError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub fn parse(payload: &str, reason: impl Into<String>) -> Self {
        DomainError::ParseError {
            payload: payload.to_string(),
            reason: reason.into(),
        }
    }

    /// Errors the owning loop may log and skip instead of terminating.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DomainError::ParseError { .. })
    }
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Task failed: {0}")]
    Task(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
