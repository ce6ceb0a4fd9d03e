//! Error types for calls to the query service.

/// Failure of a single remote call.
///
/// None of these are fatal: the dashboard fanout maps them to empty results
/// and the chat session turns them into a transcript entry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteError {
    /// The request never produced a response (connect, DNS, timeout, ...).
    #[error("Network error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Service returned {status}: {}", message.as_deref().unwrap_or("no error message"))]
    Status { status: u16, message: Option<String> },

    /// The response body could not be decoded at all.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl RemoteError {
    /// The human-readable message the service supplied, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            RemoteError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
