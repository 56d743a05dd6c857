use thiserror::Error;

/// Type alias for Result with AssistantError
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Error types for the email assistant
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Gmail API returned an error
    #[error("Gmail API error: {0}")]
    ApiError(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Network-related error (connection issues, timeouts, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server returned 5xx error
    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Resource not found (404)
    #[error("Message not found: {0}")]
    MessageNotFound(String),

    /// Bad request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden (403)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Invalid message format or parsing error
    #[error("Invalid message format: {0}")]
    InvalidMessageFormat(String),

    /// Generation service transport or server failure
    #[error("Generation error: {0}")]
    GenerationError(String),

    /// No stored draft exists for the given identifier
    #[error("Draft not found: {0}")]
    DraftNotFound(String),

    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Record store (CSV) error
    #[error("Record store error: {0}")]
    RecordStoreError(#[from] csv::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic catch-all error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<google_gmail1::Error> for AssistantError {
    fn from(error: google_gmail1::Error) -> Self {
        match error {
            // HTTP response with status code (non-success responses)
            google_gmail1::Error::Failure(ref response) => {
                let status = response.status();
                let status_code = status.as_u16();
                let message = format!(
                    "HTTP {}: {}",
                    status_code,
                    status.canonical_reason().unwrap_or("Unknown")
                );

                match status_code {
                    404 => AssistantError::MessageNotFound("Resource not found".to_string()),
                    400 => AssistantError::BadRequest(message),
                    403 => AssistantError::Forbidden(message),
                    500..=599 => AssistantError::ServerError {
                        status: status_code,
                        message,
                    },
                    _ => AssistantError::ApiError(message),
                }
            }
            // BadRequest variant (request not understood by server)
            google_gmail1::Error::BadRequest(ref err) => {
                AssistantError::BadRequest(format!("{}", err))
            }
            // Network/connection errors
            google_gmail1::Error::HttpError(ref err) => {
                AssistantError::NetworkError(format!("Connection error: {}", err))
            }
            google_gmail1::Error::Io(err) => AssistantError::NetworkError(err.to_string()),
            // All other errors
            _ => AssistantError::ApiError(error.to_string()),
        }
    }
}
