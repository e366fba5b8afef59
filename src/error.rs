use std::fmt;

#[derive(Debug)]
pub enum StudioError {
    ConfigError(String),
    ValidationError(String),
    Timeout,
    ConnectionFailed(String),
    RemoteMisconfigured(String),
    RemoteError { status: u16, message: String },
    NoImagePayload,
    EmptyPayload,
    StorageFailed(String),
    ImageError(String),
    SerializationError(String),
    InternalError(String),
}

impl fmt::Display for StudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudioError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            StudioError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            StudioError::Timeout => write!(
                f,
                "Connection Timeout: The image generation took too long (over 5 minutes). Please try again or check the workflow logs."
            ),
            StudioError::ConnectionFailed(msg) => write!(f, "Connection Failed: {}", msg),
            StudioError::RemoteMisconfigured(msg) => write!(f, "Workflow config error: {}", msg),
            StudioError::RemoteError { status, message } => {
                write!(f, "Server Error ({}): {}", status, message)
            }
            StudioError::NoImagePayload => write!(
                f,
                "Workflow completed, but no image payload was found. Check the workflow's respond node output."
            ),
            StudioError::EmptyPayload => write!(f, "The server returned an empty binary file."),
            StudioError::StorageFailed(msg) => write!(f, "Storage error: {}", msg),
            StudioError::ImageError(msg) => write!(f, "Image error: {}", msg),
            StudioError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            StudioError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for StudioError {}

pub type Result<T> = std::result::Result<T, StudioError>;
