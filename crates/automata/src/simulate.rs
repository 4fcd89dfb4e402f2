//! Acceptance checking for deterministic and nondeterministic automata.

use crate::automaton::{Automaton, StateId, StateSet};
use crate::closure;

/// Step-by-step acceptance checking of an automaton run.
pub trait Simulate {
    /// Returns whether the automaton accepts the input fed so far.
    fn is_accepting(&self) -> bool;

    /// Returns whether some continuation of the input fed so far could still be
    /// accepted as far as the simulator can tell.
    fn is_alive(&self) -> bool;

    /// Feeds a single symbol and returns whether the run is still alive. A
    /// symbol outside the alphabet kills the run.
    fn feed(&mut self, symbol: &str) -> bool;

    /// Returns to the start configuration.
    fn reset(&mut self);

    /// Feeds an entire input and returns whether it is accepted. Stops at the
    /// first symbol that kills the run.
    fn run<I, S>(mut self, input: I) -> bool
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for symbol in input {
            if !self.feed(symbol.as_ref()) {
                return false;
            }
        }
        self.is_accepting()
    }
}

/// Walks a deterministic automaton one state at a time.
pub struct DfaSimulator<'a> {
    dfa: &'a Automaton,
    /// `None` once a symbol had no transition.
    current: Option<StateId>,
}

impl<'a> DfaSimulator<'a> {
    /// Create a simulator positioned at the start state.
    pub fn new(dfa: &'a Automaton) -> Self {
        Self {
            dfa,
            current: Some(dfa.start_id()),
        }
    }

    /// Label of the current state, if the run is alive.
    pub fn current(&self) -> Option<&'a str> {
        self.current.and_then(|state| self.dfa.state_label(state))
    }
}

impl Simulate for DfaSimulator<'_> {
    fn is_accepting(&self) -> bool {
        self.current
            .is_some_and(|state| self.dfa.accepting_set().contains(state))
    }

    fn is_alive(&self) -> bool {
        self.current.is_some()
    }

    fn feed(&mut self, symbol: &str) -> bool {
        self.current = match (self.current, self.dfa.symbol_id(symbol)) {
            (Some(state), Some(symbol)) => self.dfa.step(state, symbol),
            _ => None,
        };
        self.current.is_some()
    }

    fn reset(&mut self) {
        self.current = Some(self.dfa.start_id());
    }
}

/// Tracks the set of states a nondeterministic automaton can be in.
pub struct NfaSimulator<'a> {
    nfa: &'a Automaton,
    current: StateSet,
}

impl<'a> NfaSimulator<'a> {
    /// Create a simulator positioned at the epsilon closure of the start state.
    pub fn new(nfa: &'a Automaton) -> Self {
        Self {
            nfa,
            current: Self::initial(nfa),
        }
    }

    fn initial(nfa: &Automaton) -> StateSet {
        closure::epsilon_closure(
            nfa,
            &StateSet::singleton(nfa.start_id(), nfa.num_states()),
        )
    }

    /// Labels of the states the run is currently in.
    pub fn current(&self) -> Vec<&'a str> {
        self.current
            .iter()
            .filter_map(|state| self.nfa.state_label(state))
            .collect()
    }
}

impl Simulate for NfaSimulator<'_> {
    fn is_accepting(&self) -> bool {
        self.current.intersects(self.nfa.accepting_set())
    }

    fn is_alive(&self) -> bool {
        !self.current.is_empty()
    }

    fn feed(&mut self, symbol: &str) -> bool {
        self.current = match self.nfa.symbol_id(symbol) {
            Some(symbol) => {
                let moved = closure::move_on_symbol(self.nfa, &self.current, symbol);
                closure::epsilon_closure(self.nfa, &moved)
            }
            None => StateSet::default(),
        };
        !self.current.is_empty()
    }

    fn reset(&mut self) {
        self.current = Self::initial(self.nfa);
    }
}
