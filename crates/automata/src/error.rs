//! Error types shared by construction, conversion and minimization.

use crate::automaton::Kind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AutomatonError>;

/// Failures surfaced by the automaton core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// A structural invariant of the automaton does not hold.
    #[error("invalid automaton: {reason}")]
    InvalidAutomaton {
        /// Which invariant was violated.
        reason: InvalidReason,
    },

    /// The operation needs an automaton of another kind.
    #[error("expected a {expected} automaton, got a {found} one")]
    WrongKind {
        /// Kind the operation accepts.
        expected: Kind,
        /// Kind it was given.
        found: Kind,
    },
}

/// The invariant an automaton description violates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("start state {0:?} is not one of the states")]
    UnknownStart(String),

    #[error("accepting state {0:?} is not one of the states")]
    AcceptingOutsideStates(String),

    #[error("transition {from:?} --{symbol:?}--> {to:?} references unknown state {state:?}")]
    UnknownTransitionState {
        from: String,
        symbol: String,
        to: String,
        state: String,
    },

    #[error("transition from {from:?} uses symbol {symbol:?}, which is not in the alphabet")]
    UnknownSymbol { from: String, symbol: String },

    #[error("the alphabet contains the epsilon symbol")]
    EpsilonInAlphabet,

    #[error("deterministic automaton has an epsilon transition from {from:?}")]
    EpsilonInDeterministic { from: String },

    #[error(
        "deterministic automaton maps ({from:?}, {symbol:?}) to both {first:?} and {second:?}"
    )]
    MultipleDestinations {
        from: String,
        symbol: String,
        first: String,
        second: String,
    },
}

impl From<InvalidReason> for AutomatonError {
    fn from(reason: InvalidReason) -> Self {
        AutomatonError::InvalidAutomaton { reason }
    }
}
