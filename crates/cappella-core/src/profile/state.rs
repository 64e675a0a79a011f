//! Published sync state

use super::types::Profile;

/// What the presentation layer should render
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncState {
    /// An operation is in flight
    #[default]
    Loading,
    /// Latest server-confirmed profile
    Success(Profile),
    /// Human-readable failure description
    Error(String),
}

impl SyncState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, SyncState::Loading)
    }

    /// The profile, if the last operation succeeded
    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            SyncState::Success(profile) => Some(profile),
            _ => None,
        }
    }

    /// The failure message, if the last operation failed
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            SyncState::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncState::Loading => write!(f, "loading"),
            SyncState::Success(profile) => write!(f, "success ({})", profile.id),
            SyncState::Error(message) => write!(f, "error: {message}"),
        }
    }
}
