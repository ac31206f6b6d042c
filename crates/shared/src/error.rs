use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad classification of an upstream fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The request never produced an HTTP response.
    Transport,
    /// The upstream answered with a non-success status.
    Status,
    /// The response body could not be decoded into the domain payload.
    Decode,
    /// No upstream is configured or reachable for the domain.
    Unavailable,
}

/// A per-domain fetch failure. Captured in the failing domain's slice and
/// surfaced to presentation; never fatal to other domains.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Transport, message)
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Status, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Decode, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Unavailable, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = FetchError::status("rents returned 503");
        assert_eq!(err.to_string(), "Status: rents returned 503");
    }

    #[test]
    fn survives_serde_round_trip() {
        let err = FetchError::decode("unexpected envelope");
        let json = serde_json::to_string(&err).expect("serialize");
        let back: FetchError = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, err);
    }
}
