//! Finite automaton model.
//!
//! An [`Automaton`] is an immutable value describing either a deterministic or a
//! nondeterministic automaton. State and symbol labels are interned into dense
//! ids ([`StateId`], [`SymbolId`]) in ascending lexical order; the algorithms in
//! this crate work on ids and only translate back to labels at their edges.
//!
//! Automata are only created through validation ([`Automaton::new`],
//! [`AutomatonBuilder::build`] or deserialization), so every value upholds:
//! - the start state and every accepting state are states;
//! - every transition endpoint is a state and every symbol is in the alphabet
//!   (or is epsilon, for nondeterministic automata);
//! - a deterministic automaton has no epsilon edges and at most one destination
//!   per `(state, symbol)` pair.

mod state;
mod symbol;

pub use state::{StateId, StateSet};
pub use symbol::{EPSILON, EPSILON_LABEL, SymbolId, is_epsilon, is_epsilon_label};

use crate::closure;
use crate::error::{InvalidReason, Result};
use crate::simulate::{DfaSimulator, NfaSimulator, Simulate};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Whether an automaton is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Deterministic,
    Nondeterministic,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Deterministic => f.write_str("deterministic"),
            Kind::Nondeterministic => f.write_str("nondeterministic"),
        }
    }
}

/// Transition relation, represented according to the automaton's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Transitions {
    /// (source, symbol) -> destination
    Deterministic(BTreeMap<(StateId, SymbolId), StateId>),
    /// (source, symbol or EPSILON) -> set of destinations
    Nondeterministic(BTreeMap<(StateId, SymbolId), StateSet>),
}

/// Result of [`Automaton::transitions_from`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targets<'a> {
    Deterministic(Option<&'a str>),
    Nondeterministic(BTreeSet<&'a str>),
}

/// A finite automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AutomatonDescription", into = "AutomatonDescription")]
pub struct Automaton {
    kind: Kind,
    /// State labels, sorted; the position of a label is its `StateId`.
    states: IndexSet<String>,
    /// Symbol labels (without epsilon), sorted; the position is the `SymbolId`.
    alphabet: IndexSet<String>,
    start: StateId,
    accepting: StateSet,
    transitions: Transitions,
    description: Option<String>,
}

/// Plain, label-based form of an automaton.
///
/// This is what file-handling collaborators produce and consume. Turning it into
/// an [`Automaton`] validates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonDescription {
    pub kind: Kind,
    pub states: Vec<String>,
    pub alphabet: Vec<String>,
    pub start: String,
    pub accepting: Vec<String>,
    /// `(from, symbol, to)` triples; the empty symbol is epsilon.
    pub transitions: Vec<(String, String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Automaton {
    /// Validate and build an automaton.
    ///
    /// Each transition is a `(from, symbol, to)` triple; the empty symbol is
    /// epsilon. Repeating a triple is harmless, but in a deterministic automaton
    /// two triples with the same source and symbol must agree on the destination.
    pub fn new<Q, A>(
        kind: Kind,
        states: impl IntoIterator<Item = Q>,
        alphabet: impl IntoIterator<Item = A>,
        start: impl Into<String>,
        accepting: impl IntoIterator<Item = Q>,
        transitions: impl IntoIterator<Item = (Q, A, Q)>,
    ) -> Result<Self>
    where
        Q: Into<String>,
        A: Into<String>,
    {
        Self::from_description(AutomatonDescription {
            kind,
            states: states.into_iter().map(Into::into).collect(),
            alphabet: alphabet.into_iter().map(Into::into).collect(),
            start: start.into(),
            accepting: accepting.into_iter().map(Into::into).collect(),
            transitions: transitions
                .into_iter()
                .map(|(from, symbol, to)| (from.into(), symbol.into(), to.into()))
                .collect(),
            description: None,
        })
    }

    /// Start an incremental builder.
    pub fn builder(kind: Kind) -> AutomatonBuilder {
        AutomatonBuilder::new(kind)
    }

    /// Validate a description and build the automaton it describes.
    pub fn from_description(description: AutomatonDescription) -> Result<Self> {
        let AutomatonDescription {
            kind,
            states,
            alphabet,
            start,
            accepting,
            transitions: triples,
            description,
        } = description;

        if alphabet.iter().any(|symbol| is_epsilon_label(symbol)) {
            return Err(InvalidReason::EpsilonInAlphabet.into());
        }

        let states: IndexSet<String> =
            states.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        let alphabet: IndexSet<String> =
            alphabet.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        let num_states = states.len();

        let start = match states.get_index_of(&start) {
            Some(idx) => idx as StateId,
            None => return Err(InvalidReason::UnknownStart(start).into()),
        };

        let mut accepting_set = StateSet::with_capacity(num_states);
        for label in accepting {
            match states.get_index_of(&label) {
                Some(idx) => {
                    accepting_set.insert(idx as StateId);
                }
                None => return Err(InvalidReason::AcceptingOutsideStates(label).into()),
            }
        }

        let mut transitions = match kind {
            Kind::Deterministic => Transitions::Deterministic(BTreeMap::new()),
            Kind::Nondeterministic => Transitions::Nondeterministic(BTreeMap::new()),
        };

        for (from, symbol, to) in triples {
            let unknown = [&from, &to]
                .into_iter()
                .find(|label| !states.contains(label.as_str()))
                .cloned();
            if let Some(state) = unknown {
                return Err(InvalidReason::UnknownTransitionState {
                    from,
                    symbol,
                    to,
                    state,
                }
                .into());
            }
            // Both endpoints were just checked.
            let source = states.get_index_of(&from).unwrap_or_default() as StateId;
            let destination = states.get_index_of(&to).unwrap_or_default() as StateId;

            let symbol_id = if is_epsilon_label(&symbol) {
                if kind == Kind::Deterministic {
                    return Err(InvalidReason::EpsilonInDeterministic { from }.into());
                }
                EPSILON
            } else {
                match alphabet.get_index_of(&symbol) {
                    Some(idx) => idx as SymbolId,
                    None => return Err(InvalidReason::UnknownSymbol { from, symbol }.into()),
                }
            };

            match &mut transitions {
                Transitions::Deterministic(map) => {
                    if let Some(&existing) = map.get(&(source, symbol_id)) {
                        if existing != destination {
                            return Err(InvalidReason::MultipleDestinations {
                                first: states[existing as usize].clone(),
                                from,
                                symbol,
                                second: to,
                            }
                            .into());
                        }
                    }
                    map.insert((source, symbol_id), destination);
                }
                Transitions::Nondeterministic(map) => {
                    map.entry((source, symbol_id))
                        .or_insert_with(|| StateSet::with_capacity(num_states))
                        .insert(destination);
                }
            }
        }

        Ok(Self {
            kind,
            states,
            alphabet,
            start,
            accepting: accepting_set,
            transitions,
            description,
        })
    }

    /// Re-check the structural invariants on the interned representation.
    pub fn validate(&self) -> Result<()> {
        let num_states = self.states.len();
        let num_symbols = self.alphabet.len();

        if self.start as usize >= num_states {
            return Err(InvalidReason::UnknownStart(format!("#{}", self.start)).into());
        }
        if let Some(state) = self.accepting.iter().find(|&s| s as usize >= num_states) {
            return Err(InvalidReason::AcceptingOutsideStates(format!("#{state}")).into());
        }
        if self.alphabet.iter().any(|symbol| is_epsilon_label(symbol)) {
            return Err(InvalidReason::EpsilonInAlphabet.into());
        }

        for (from, symbol, to) in self.edges() {
            let from_label = self.state_label(from).unwrap_or_default().to_owned();
            if from as usize >= num_states || to as usize >= num_states {
                return Err(InvalidReason::UnknownTransitionState {
                    from: from_label,
                    symbol: self.symbol_label(symbol).unwrap_or_default().to_owned(),
                    to: self.state_label(to).unwrap_or_default().to_owned(),
                    state: format!("#{}", from.max(to)),
                }
                .into());
            }
            if is_epsilon(symbol) {
                if self.kind == Kind::Deterministic {
                    return Err(InvalidReason::EpsilonInDeterministic { from: from_label }.into());
                }
            } else if symbol as usize >= num_symbols {
                return Err(InvalidReason::UnknownSymbol {
                    from: from_label,
                    symbol: format!("#{symbol}"),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Get the kind of the automaton.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Check if the automaton is deterministic.
    pub fn is_deterministic(&self) -> bool {
        self.kind == Kind::Deterministic
    }

    /// Get the state labels in ascending order.
    pub fn states(&self) -> impl Iterator<Item = &str> + '_ {
        self.states.iter().map(String::as_str)
    }

    /// Get the alphabet (all symbols except epsilon) in ascending order.
    pub fn alphabet(&self) -> impl Iterator<Item = &str> + '_ {
        self.alphabet.iter().map(String::as_str)
    }

    /// Get the start state.
    pub fn start(&self) -> &str {
        &self.states[self.start as usize]
    }

    /// Get the accepting states in ascending order.
    pub fn accepting(&self) -> impl Iterator<Item = &str> + '_ {
        self.accepting.iter().map(|id| self.states[id as usize].as_str())
    }

    /// Check if `state` is an accepting state; unknown labels are not.
    pub fn is_accepting(&self, state: &str) -> bool {
        self.state_id(state)
            .is_some_and(|id| self.accepting.contains(id))
    }

    /// Check if `state` is one of the states.
    pub fn contains_state(&self, state: &str) -> bool {
        self.states.contains(state)
    }

    /// Free-text description of the language, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Return a copy carrying the given description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Get the number of states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Number of `(from, symbol, to)` edges.
    pub fn num_transitions(&self) -> usize {
        match &self.transitions {
            Transitions::Deterministic(map) => map.len(),
            Transitions::Nondeterministic(map) => map.values().map(StateSet::len).sum(),
        }
    }

    /// Get all transitions as label triples, ordered by source and symbol.
    /// Epsilon edges carry the empty symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, &str, &str)> + '_ {
        self.edges().map(|(from, symbol, to)| {
            (
                self.states[from as usize].as_str(),
                self.symbol_label(symbol).unwrap_or(EPSILON_LABEL),
                self.states[to as usize].as_str(),
            )
        })
    }

    /// Destinations of `state` on `symbol` (the empty symbol asks for epsilon
    /// edges). Returns `None` if the state or the symbol is unknown.
    pub fn transitions_from(&self, state: &str, symbol: &str) -> Option<Targets<'_>> {
        let state = self.state_id(state)?;
        let symbol = if is_epsilon_label(symbol) {
            match self.kind {
                Kind::Deterministic => return None,
                Kind::Nondeterministic => EPSILON,
            }
        } else {
            self.symbol_id(symbol)?
        };

        let targets = match &self.transitions {
            Transitions::Deterministic(map) => Targets::Deterministic(
                map.get(&(state, symbol))
                    .map(|&dst| self.states[dst as usize].as_str()),
            ),
            Transitions::Nondeterministic(_) => Targets::Nondeterministic(
                self.destinations(state, symbol)
                    .map(|dst| self.states[dst as usize].as_str())
                    .collect(),
            ),
        };
        Some(targets)
    }

    /// Epsilon closure of a set of states. Unknown labels are ignored; for a
    /// deterministic automaton this is the set itself.
    pub fn epsilon_closure<'a, I>(&self, states: I) -> BTreeSet<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let seed: StateSet = states
            .into_iter()
            .filter_map(|label| self.state_id(label))
            .collect();
        self.labels(&closure::epsilon_closure(self, &seed))
    }

    /// States reachable from the start state over any edge.
    pub fn reachable_states(&self) -> BTreeSet<&str> {
        self.labels(&closure::reachable(self))
    }

    /// States from which some accepting state can be reached.
    pub fn useful_states(&self) -> BTreeSet<&str> {
        self.labels(&closure::useful(self))
    }

    /// Check if the automaton accepts no string at all.
    pub fn is_empty(&self) -> bool {
        !closure::reachable(self).intersects(&self.accepting)
    }

    /// Check whether the automaton accepts the given symbol sequence.
    ///
    /// Symbols outside the alphabet reject the input.
    pub fn accepts<I, S>(&self, input: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match self.kind {
            Kind::Deterministic => DfaSimulator::new(self).run(input),
            Kind::Nondeterministic => NfaSimulator::new(self).run(input),
        }
    }

    /// Like [`Automaton::accepts`], reading every `char` as one symbol.
    pub fn accepts_str(&self, input: &str) -> bool {
        self.accepts(input.chars().map(String::from))
    }

    /// A simulator for step-by-step feeding.
    pub fn simulator(&self) -> Box<dyn Simulate + '_> {
        match self.kind {
            Kind::Deterministic => Box::new(DfaSimulator::new(self)),
            Kind::Nondeterministic => Box::new(NfaSimulator::new(self)),
        }
    }

    // Id-level queries used by the algorithms.

    pub(crate) fn state_id(&self, label: &str) -> Option<StateId> {
        self.states.get_index_of(label).map(|idx| idx as StateId)
    }

    pub(crate) fn state_label(&self, state: StateId) -> Option<&str> {
        self.states.get_index(state as usize).map(String::as_str)
    }

    pub(crate) fn symbol_id(&self, label: &str) -> Option<SymbolId> {
        self.alphabet.get_index_of(label).map(|idx| idx as SymbolId)
    }

    /// Label of a symbol id; `None` for epsilon and unknown ids.
    pub(crate) fn symbol_label(&self, symbol: SymbolId) -> Option<&str> {
        self.alphabet.get_index(symbol as usize).map(String::as_str)
    }

    /// Symbol ids in ascending lexical order of their labels (epsilon excluded).
    pub(crate) fn symbol_ids(&self) -> impl Iterator<Item = SymbolId> + use<> {
        0..self.alphabet.len() as SymbolId
    }

    pub(crate) fn num_symbols(&self) -> usize {
        self.alphabet.len()
    }

    pub(crate) fn start_id(&self) -> StateId {
        self.start
    }

    pub(crate) fn accepting_set(&self) -> &StateSet {
        &self.accepting
    }

    /// Destinations of one `(state, symbol)` pair, for either kind.
    pub(crate) fn destinations(
        &self,
        state: StateId,
        symbol: SymbolId,
    ) -> impl Iterator<Item = StateId> + '_ {
        let (single, many) = match &self.transitions {
            Transitions::Deterministic(map) => (map.get(&(state, symbol)).copied(), None),
            Transitions::Nondeterministic(map) => (None, map.get(&(state, symbol))),
        };
        single
            .into_iter()
            .chain(many.into_iter().flat_map(|set| set.iter()))
    }

    /// Single-destination step of a deterministic automaton. Always `None` for
    /// a nondeterministic one; use `destinations` there.
    pub(crate) fn step(&self, state: StateId, symbol: SymbolId) -> Option<StateId> {
        match &self.transitions {
            Transitions::Deterministic(map) => map.get(&(state, symbol)).copied(),
            Transitions::Nondeterministic(_) => None,
        }
    }

    /// Outgoing `(symbol, destination)` edges of a state, epsilon last.
    pub(crate) fn edges_from(
        &self,
        state: StateId,
    ) -> Box<dyn Iterator<Item = (SymbolId, StateId)> + '_> {
        let range = (state, 0)..=(state, EPSILON);
        match &self.transitions {
            Transitions::Deterministic(map) => {
                Box::new(map.range(range).map(|(&(_, symbol), &dst)| (symbol, dst)))
            }
            Transitions::Nondeterministic(map) => Box::new(
                map.range(range)
                    .flat_map(|(&(_, symbol), dsts)| dsts.iter().map(move |dst| (symbol, dst))),
            ),
        }
    }

    /// Every edge, ordered by source and symbol.
    pub(crate) fn edges(&self) -> Box<dyn Iterator<Item = (StateId, SymbolId, StateId)> + '_> {
        match &self.transitions {
            Transitions::Deterministic(map) => {
                Box::new(map.iter().map(|(&(src, sym), &dst)| (src, sym, dst)))
            }
            Transitions::Nondeterministic(map) => Box::new(
                map.iter()
                    .flat_map(|(&(src, sym), dsts)| dsts.iter().map(move |dst| (src, sym, dst))),
            ),
        }
    }

    pub(crate) fn labels(&self, set: &StateSet) -> BTreeSet<&str> {
        set.iter()
            .filter_map(|id| self.state_label(id))
            .collect()
    }

    pub(crate) fn label_vec(&self, set: &StateSet) -> Vec<String> {
        set.iter()
            .filter_map(|id| self.state_label(id))
            .map(str::to_owned)
            .collect()
    }
}

impl TryFrom<AutomatonDescription> for Automaton {
    type Error = crate::error::AutomatonError;

    fn try_from(description: AutomatonDescription) -> Result<Self> {
        Self::from_description(description)
    }
}

impl From<Automaton> for AutomatonDescription {
    fn from(automaton: Automaton) -> Self {
        AutomatonDescription {
            kind: automaton.kind,
            transitions: automaton
                .transitions()
                .map(|(from, symbol, to)| (from.to_owned(), symbol.to_owned(), to.to_owned()))
                .collect(),
            start: automaton.start().to_owned(),
            accepting: automaton.accepting().map(str::to_owned).collect(),
            states: automaton.states.into_iter().collect(),
            alphabet: automaton.alphabet.into_iter().collect(),
            description: automaton.description,
        }
    }
}

/// Incremental construction of an [`Automaton`]; validation happens in
/// [`AutomatonBuilder::build`].
#[derive(Debug, Clone)]
pub struct AutomatonBuilder {
    description: AutomatonDescription,
}

impl AutomatonBuilder {
    /// Create an empty builder for an automaton of the given kind.
    pub fn new(kind: Kind) -> Self {
        Self {
            description: AutomatonDescription {
                kind,
                states: Vec::new(),
                alphabet: Vec::new(),
                start: String::new(),
                accepting: Vec::new(),
                transitions: Vec::new(),
                description: None,
            },
        }
    }

    /// Add a state.
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.description.states.push(state.into());
        self
    }

    /// Add several states.
    pub fn states<S: Into<String>>(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.description
            .states
            .extend(states.into_iter().map(Into::into));
        self
    }

    /// Add a symbol to the alphabet.
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.description.alphabet.push(symbol.into());
        self
    }

    /// Add several symbols to the alphabet.
    pub fn alphabet<S: Into<String>>(mut self, symbols: impl IntoIterator<Item = S>) -> Self {
        self.description
            .alphabet
            .extend(symbols.into_iter().map(Into::into));
        self
    }

    /// Set the start state.
    pub fn start(mut self, state: impl Into<String>) -> Self {
        self.description.start = state.into();
        self
    }

    /// Add an accepting state.
    pub fn accepting(mut self, state: impl Into<String>) -> Self {
        self.description.accepting.push(state.into());
        self
    }

    /// Add a transition; the empty symbol is epsilon.
    pub fn transition(
        mut self,
        from: impl Into<String>,
        symbol: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.description
            .transitions
            .push((from.into(), symbol.into(), to.into()));
        self
    }

    /// Add an epsilon transition.
    pub fn epsilon(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.transition(from, EPSILON_LABEL, to)
    }

    /// Set the free-text description of the language.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description.description = Some(description.into());
        self
    }

    /// Validate the collected parts and build the automaton.
    pub fn build(self) -> Result<Automaton> {
        Automaton::from_description(self.description)
    }
}
