use std::fmt;

use thiserror::Error;

/// Coarse view of the suggestion lifecycle, used in errors and the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Generating,
    Visible,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Generating => "generating",
            Self::Visible => "visible",
        })
    }
}

/// Store operations that are only legal from one particular phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    RequestSuggestion,
    Accept,
    Reject,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RequestSuggestion => "request a suggestion",
            Self::Accept => "accept a suggestion",
            Self::Reject => "reject a suggestion",
        })
    }
}

/// Contract violations raised by the suggestion store.
///
/// These indicate an integration bug in the caller. The store is left
/// untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuggestError {
    #[error("cannot {operation} while the suggestion is {state}")]
    InvalidTransition { operation: Operation, state: Phase },
}

/// Failures of the external generation service.
///
/// All of these are recovered locally: the store goes back to idle and the
/// user sees "no suggestion available".
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid generation response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("generation service unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message_names_operation_and_state() {
        let err = SuggestError::InvalidTransition {
            operation: Operation::Accept,
            state: Phase::Idle,
        };
        assert_eq!(err.to_string(), "cannot accept a suggestion while the suggestion is idle");
    }

    #[test]
    fn test_status_error_message() {
        let err = GenerationError::Status {
            status: 503,
            body: "busy".to_string(),
        };
        assert_eq!(err.to_string(), "generation service returned 503: busy");
    }
}
