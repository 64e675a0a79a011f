//! Error types for transport and controller operations

use thiserror::Error;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Which transport operation failed, used to pick the user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Update,
}

/// Errors that can occur while talking to the profile endpoint
#[derive(Debug, Error)]
pub enum TransportError {
    /// No response reached the client
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-2xx status
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// Body was present but could not be decoded as a profile
    #[error("Failed to decode profile: {0}")]
    Decode(String),

    /// Server answered 2xx without a body
    #[error("Empty response body")]
    EmptyBody,

    /// The HTTP client or request could not be built
    #[error("Failed to build request: {0}")]
    Client(String),
}

impl TransportError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "NETWORK_ERROR",
            Self::Http { .. } => "HTTP_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::EmptyBody => "EMPTY_BODY",
            Self::Client(_) => "CLIENT_ERROR",
        }
    }

    /// Collapse the error into the single message shown to the user.
    ///
    /// A response that arrived but carried no usable profile is reported as a
    /// data failure; everything else as a request failure.
    #[must_use]
    pub fn user_message(&self, op: Operation) -> String {
        let data_failure = matches!(self, Self::Decode(_) | Self::EmptyBody);
        match (op, data_failure) {
            (Operation::Fetch, false) => "Failed to retrieve profile",
            (Operation::Fetch, true) => "Failed to load profile data",
            (Operation::Update, false) => "Failed to update profile",
            (Operation::Update, true) => "Failed to update profile data",
        }
        .to_string()
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Errors returned to the caller when the controller refuses an operation.
///
/// None of these change the published state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    /// Another fetch or update is still in flight
    #[error("Another profile operation is already in progress")]
    Busy,

    /// No successful fetch has produced a profile id yet
    #[error("No profile loaded yet; fetch the profile before updating")]
    NoProfileLoaded,

    /// The controller was shut down
    #[error("Profile controller has been shut down")]
    Closed,

    /// The operation task was cancelled by its runtime before finishing
    #[error("Profile operation was interrupted")]
    Interrupted,
}

impl ControllerError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Busy => "BUSY",
            Self::NoProfileLoaded => "NO_PROFILE",
            Self::Closed => "CLOSED",
            Self::Interrupted => "INTERRUPTED",
        }
    }
}
