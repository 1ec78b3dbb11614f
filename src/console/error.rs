//! Error taxonomy for console operations. Backend failures collapse into three
//! kinds (network, authorization, validation) so the view can decide between
//! "show a retry message" and "treat the session as expired" without looking at
//! transport details.

use std::fmt;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    /// Transport-level failure with no interpretable response.
    #[error("Network error: {0}")]
    Network(String),
    /// The backend rejected the session token (or none was available).
    #[error("Not authorized ({status})")]
    Authorization { status: u16 },
    /// Malformed request, either rejected by the backend or caught locally.
    #[error("Request rejected: {0}")]
    Validation(String),
    #[error("Session storage error: {0}")]
    Session(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl ConsoleError {
    /// Status used when an authenticated call is attempted without any token.
    pub const MISSING_TOKEN_STATUS: u16 = 401;

    #[must_use]
    pub const fn missing_token() -> Self {
        Self::Authorization {
            status: Self::MISSING_TOKEN_STATUS,
        }
    }

    #[must_use]
    pub const fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization { .. })
    }
}

/// Roster operation that produced an error, used to scope user-facing messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Block,
    Unblock,
    Delete,
}

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Block => "block",
            Self::Unblock => "unblock",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A recoverable failure tagged with the operation that triggered it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{operation} users: {source}")]
pub struct ActionError {
    pub operation: Operation,
    #[source]
    pub source: ConsoleError,
}

impl ActionError {
    #[must_use]
    pub const fn new(operation: Operation, source: ConsoleError) -> Self {
        Self { operation, source }
    }

    /// Message shown to the operator; identical for every failure kind.
    #[must_use]
    pub fn user_message(&self) -> String {
        format!("Failed to {} users. Please try again.", self.operation)
    }

    #[must_use]
    pub const fn is_authorization(&self) -> bool {
        self.source.is_authorization()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_is_scoped_to_operation() {
        let cases = [
            (Operation::Fetch, "Failed to fetch users. Please try again."),
            (Operation::Block, "Failed to block users. Please try again."),
            (Operation::Unblock, "Failed to unblock users. Please try again."),
            (Operation::Delete, "Failed to delete users. Please try again."),
        ];
        for (operation, expected) in cases {
            let err = ActionError::new(operation, ConsoleError::Network("down".to_string()));
            assert_eq!(err.user_message(), expected);
        }
    }

    #[test]
    fn user_message_hides_failure_kind() {
        let network = ActionError::new(Operation::Block, ConsoleError::Network("x".into()));
        let validation = ActionError::new(Operation::Block, ConsoleError::Validation("y".into()));
        assert_eq!(network.user_message(), validation.user_message());
    }

    #[test]
    fn authorization_is_detected_through_action_error() {
        let err = ActionError::new(Operation::Fetch, ConsoleError::missing_token());
        assert!(err.is_authorization());
        assert!(
            !ActionError::new(Operation::Fetch, ConsoleError::Network("x".into()))
                .is_authorization()
        );
    }
}
