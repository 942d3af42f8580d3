//! Error types for automaton operations.
//!
//! Two classes are kept apart. [`AutomatonError`] covers conditions that
//! depend on caller data (a conflicting transition table, a truncated
//! buffer, an unreachable state) and is returned as an ordinary `Err`.
//! [`InvariantViolation`] covers misuse of the API itself; those are never
//! returned, the detecting operation panics with the violation's message.

use thiserror::Error;

/// Recoverable errors reported by validation, conversion and decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    #[error("state {state:?} has non-deterministic transition on symbol {symbol:?}")]
    NonDeterministic { state: String, symbol: String },

    #[error("state {state:?} has a transition on symbol {symbol:?} with an empty destination")]
    EmptyDestination { state: String, symbol: String },

    #[error("{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error("{field}: {message}")]
    Decode { field: String, message: String },

    #[error("malformed transition: {0}")]
    TransitionFormat(String),

    #[error("join requires at least one transition from the first automaton to the second")]
    EmptyJoin,

    #[error("DFA state limit exceeded: {states} states (max: {max})")]
    StateLimitExceeded { states: usize, max: usize },
}

impl AutomatonError {
    pub(crate) fn decode(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Prefix the field path of a decode error, so nested records report
    /// where they sit in the outer structure.
    pub(crate) fn within(self, parent: &str) -> Self {
        match self {
            Self::Decode { field, message } => Self::Decode {
                field: format!("{parent}{field}"),
                message,
            },
            other => other,
        }
    }
}

/// Result type for automaton operations
pub type Result<T> = std::result::Result<T, AutomatonError>;

/// Caller errors that leave an automaton unusable if execution continued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("invariant violation: state {0:?} does not exist")]
    UnknownState(String),

    #[error("invariant violation: state {state:?} is still the target of a transition from {from:?}")]
    StillReferenced { state: String, from: String },

    #[error("invariant violation: renamed state {0:?} collides with an existing state")]
    NameCollision(String),

    #[error("invariant violation: no start state is set")]
    NoStartState,

    #[error("invariant violation: move_set on the epsilon symbol; use epsilon_closure for epsilon moves")]
    EpsilonMove,
}

/// Abort the current operation on an invariant violation.
#[cold]
#[track_caller]
pub(crate) fn violated(violation: InvariantViolation) -> ! {
    log::error!("{violation}");
    panic!("{violation}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_joins_problems() {
        let err = AutomatonError::Validation(vec!["one".into(), "two".into()]);
        assert_eq!(err.to_string(), "one\ntwo");
    }

    #[test]
    fn test_decode_within_prefixes_field() {
        let err = AutomatonError::decode(".value", "not enough bytes").within(".states[A]");
        assert_eq!(err.to_string(), ".states[A].value: not enough bytes");
    }

    #[test]
    #[should_panic(expected = "state \"Q\" does not exist")]
    fn test_violated_panics_with_message() {
        violated(InvariantViolation::UnknownState("Q".into()));
    }
}
