use thiserror::Error;

/// Service Layer and configuration errors
#[derive(Error, Debug)]
pub enum ServiceLayerError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Request Error: {0}")]
    RequestError(String),

    #[error("Parsing Error: {0}")]
    ParsingError(String),

    #[error("HTTP Error: {status_code} - {message}")]
    HttpError { status_code: u16, message: String },
}

impl ServiceLayerError {
    /// Status code reported by the Service Layer, if the error came from a non-2xx response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ServiceLayerError::HttpError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Result type for Service Layer operations
pub type CoreResult<T> = Result<T, ServiceLayerError>;
