//! Error types for rendering operations

use thiserror::Error;

/// Rendering specific errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// Backend did not answer within the submit deadline
    #[error("Render timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Backend answered but reported no usable result
    #[error("Render failed: {0}")]
    Failure(String),

    /// Backend process is unavailable or unhealthy
    #[error("Backend error: {0}")]
    Backend(String),

    /// Template asset missing or unreadable
    #[error("Template error: {0}")]
    Template(String),

    /// Image decode or compositing error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Base64 payload could not be decoded
    #[error("Encode error: {0}")]
    Encode(#[from] base64::DecodeError),

    /// I/O error talking to the backend process
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RenderError::Timeout { seconds: 5 };
        assert_eq!(err.to_string(), "Render timed out after 5s");

        let err = RenderError::Failure("no result in response".to_string());
        assert_eq!(err.to_string(), "Render failed: no result in response");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: RenderError = io.into();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
