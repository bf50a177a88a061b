//! Error types for the server layer.

use uastack_core::StatusCode;

/// Errors that can occur while accepting and routing connections.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no server registered for endpoint URL \"{0}\"")]
    EndpointUrlInvalid(String),
}

impl ServerError {
    /// The status code reported to the peer before closing the connection.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Io(_) => StatusCode::BAD_COMMUNICATION_ERROR,
            ServerError::EndpointUrlInvalid(_) => StatusCode::BAD_TCP_ENDPOINT_URL_INVALID,
        }
    }
}
