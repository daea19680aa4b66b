//! Data collaborator error types.

use std::fmt;

use super::convert::ConversionError;

/// Errors from fetching reference data or statistics.
///
/// A missing resource is not an error: fetches report it as `Ok(None)`.
#[derive(Debug)]
pub enum DataError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// Server returned an error status code
    ApiError { status: u16, message: String },

    /// Rate limited by the server
    RateLimited,

    /// Invalid API key or unauthorized
    Unauthorized,

    /// Payload decoded but failed validation
    Conversion(ConversionError),

    /// Local file could not be read (mock data)
    Io { path: String, message: String },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Http(e) => write!(f, "HTTP error: {e}"),
            DataError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            DataError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            DataError::RateLimited => write!(f, "rate limited by data server"),
            DataError::Unauthorized => write!(f, "unauthorized (invalid API key)"),
            DataError::Conversion(e) => write!(f, "invalid data: {e}"),
            DataError::Io { path, message } => write!(f, "failed to read {path}: {message}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Http(e) => Some(e),
            DataError::Conversion(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        DataError::Http(err)
    }
}

impl From<ConversionError> for DataError {
    fn from(err: ConversionError) -> Self {
        DataError::Conversion(err)
    }
}
