//! Error types for form-relay.

/// Errors a request handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Board error: {0}")]
    Board(#[from] BoardError),
}

/// Configuration-related errors. Reported at startup, before serving.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Problems with an inbound submission. Nothing is sent to the board.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid webhook data: missing formResponse")]
    MissingFormResponse,

    #[error("Invalid request body: {0}")]
    MalformedBody(String),

    #[error("No task name found in form submission")]
    MissingTaskName,

    #[error("Task name is required")]
    TaskNameRequired,
}

/// Failures talking to the remote board API.
///
/// `Api` carries the upstream message verbatim so it can be relayed to the
/// webhook caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("{0}")]
    Api(String),

    #[error("Board API request failed: {0}")]
    Transport(String),

    #[error("Invalid response from board API: {0}")]
    InvalidResponse(String),

    #[error("Failed to encode column values: {0}")]
    Encode(#[from] serde_json::Error),
}
