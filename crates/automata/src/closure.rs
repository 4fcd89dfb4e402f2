//! Epsilon closure, forward reachability and backward usefulness.
//!
//! All functions here are pure queries over an [`Automaton`]'s id-level
//! representation. Epsilon edges are followed by every traversal; in a
//! deterministic automaton there are none, so the closure is the identity.

use crate::automaton::{Automaton, EPSILON, StateId, StateSet, SymbolId};
use std::collections::VecDeque;

/// Compute the epsilon closure of a set of states using DFS.
///
/// The closure only ever grows and is bounded by the state count, so this
/// terminates even on epsilon cycles and self-loops.
pub fn epsilon_closure(automaton: &Automaton, states: &StateSet) -> StateSet {
    let mut closure = StateSet::with_capacity(automaton.num_states());
    let mut stack: Vec<StateId> = states.iter().collect();

    while let Some(state) = stack.pop() {
        if !closure.insert(state) {
            continue;
        }
        stack.extend(
            automaton
                .destinations(state, EPSILON)
                .filter(|dest| !closure.contains(*dest)),
        );
    }

    closure
}

/// Epsilon closure of every single state, indexed by state id.
pub fn epsilon_closures(automaton: &Automaton) -> Vec<StateSet> {
    let capacity = automaton.num_states();
    (0..capacity as StateId)
        .map(|state| epsilon_closure(automaton, &StateSet::singleton(state, capacity)))
        .collect()
}

/// Union of the precomputed closures of every member of `states`.
pub fn closure_from_cache(closures: &[StateSet], states: &StateSet) -> StateSet {
    let mut closure = StateSet::with_capacity(closures.len());
    for state in states.iter() {
        if let Some(cached) = closures.get(state as usize) {
            closure.union_with(cached);
        }
    }
    closure
}

/// Get the states reachable from a set of states in one step on `symbol`,
/// without taking the epsilon closure of the result.
pub fn move_on_symbol(automaton: &Automaton, states: &StateSet, symbol: SymbolId) -> StateSet {
    let mut reached = StateSet::with_capacity(automaton.num_states());
    for state in states.iter() {
        reached.extend(automaton.destinations(state, symbol));
    }
    reached
}

/// Find all states reachable from the start state, over symbol and epsilon
/// edges alike.
pub fn reachable(automaton: &Automaton) -> StateSet {
    let mut reachable = StateSet::with_capacity(automaton.num_states());
    let mut queue = VecDeque::from([automaton.start_id()]);

    while let Some(state) = queue.pop_front() {
        if !reachable.insert(state) {
            continue;
        }
        for (_, next) in automaton.edges_from(state) {
            if !reachable.contains(next) {
                queue.push_back(next);
            }
        }
    }

    reachable
}

/// Find all states from which an accepting state can be reached, by walking
/// the reversed transition relation backwards from the accepting states.
pub fn useful(automaton: &Automaton) -> StateSet {
    let num_states = automaton.num_states();
    let mut predecessors: Vec<Vec<StateId>> = vec![Vec::new(); num_states];
    for (src, _, dst) in automaton.edges() {
        predecessors[dst as usize].push(src);
    }

    let mut useful = StateSet::with_capacity(num_states);
    let mut queue: VecDeque<StateId> = automaton.accepting_set().iter().collect();

    while let Some(state) = queue.pop_front() {
        if !useful.insert(state) {
            continue;
        }
        for &pred in &predecessors[state as usize] {
            if !useful.contains(pred) {
                queue.push_back(pred);
            }
        }
    }

    useful
}
