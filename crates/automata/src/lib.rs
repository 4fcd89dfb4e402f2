//! Finite automata: subset construction, minimization, simulation and
//! equivalence checking.
//!
//! ```
//! use automata_engine::{Automaton, Kind, convert, minimize};
//!
//! let nfa = Automaton::builder(Kind::Nondeterministic)
//!     .states(["q0", "q1", "q2"])
//!     .alphabet(["a", "b"])
//!     .start("q0")
//!     .accepting("q2")
//!     .transition("q0", "a", "q0")
//!     .transition("q0", "a", "q1")
//!     .transition("q1", "b", "q2")
//!     .build()?;
//!
//! let (dfa, _) = convert(&nfa)?;
//! let (min, _) = minimize(&dfa)?;
//! assert!(min.accepts_str("aab"));
//! assert!(!min.accepts_str("aba"));
//! # Ok::<(), automata_engine::AutomatonError>(())
//! ```

pub mod automaton;
pub mod closure;
pub mod config;
pub mod convert;
pub mod equivalence;
pub mod error;
pub mod minimize;
pub mod simulate;
pub mod trace;

pub use automaton::{
    Automaton, AutomatonBuilder, AutomatonDescription, EPSILON, Kind, StateId, StateSet, SymbolId,
    Targets,
};
pub use config::{ConvertOptions, MinimizeOptions};
pub use convert::{convert, convert_with};
pub use equivalence::{equivalent, language_equivalent};
pub use error::{AutomatonError, InvalidReason, Result};
pub use minimize::{minimize, minimize_with};
pub use simulate::{DfaSimulator, NfaSimulator, Simulate};
pub use trace::{ConversionStep, ConversionTrace, PartitionStep, PartitionTrace};
