//! Subset construction algorithm for converting ε-NFA to DFA.
//!
//! Source states that cannot reach acceptance are dropped before the
//! construction, so composites only ever hold useful states. Afterwards,
//! generated states that are non-accepting and cannot leave themselves are
//! removed along with the edges into them.

use crate::automaton::{Automaton, Kind, StateId, StateSet};
use crate::closure;
use crate::config::ConvertOptions;
use crate::error::Result;
use crate::trace::{ConversionStep, ConversionTrace};
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, trace};

/// Name given to the composite holding no source state.
pub const EMPTY_COMPOSITE: &str = "∅";

/// Canonical name of a composite from its member labels in ascending order:
/// the sole member for a singleton, `{a,b,...}` otherwise, [`EMPTY_COMPOSITE`]
/// for the empty set.
pub fn composite_name<'a>(members: impl IntoIterator<Item = &'a str>) -> String {
    let members: Vec<&str> = members.into_iter().collect();
    match members.as_slice() {
        [] => EMPTY_COMPOSITE.to_owned(),
        [single] => (*single).to_owned(),
        many => format!("{{{}}}", many.join(",")),
    }
}

/// Convert an automaton to an equivalent deterministic one, with default
/// options.
///
/// A deterministic input is treated as the NFA it trivially is.
pub fn convert(nfa: &Automaton) -> Result<(Automaton, ConversionTrace)> {
    convert_with(nfa, &ConvertOptions::default())
}

/// Convert an automaton to an equivalent deterministic one using the powerset
/// construction.
pub fn convert_with(
    nfa: &Automaton,
    options: &ConvertOptions,
) -> Result<(Automaton, ConversionTrace)> {
    nfa.validate()?;

    let num_states = nfa.num_states();
    let useful = if options.prune_useless {
        closure::useful(nfa)
    } else {
        StateSet::full(num_states)
    };

    let mut construction = Construction {
        nfa,
        closures: closure::epsilon_closures(nfa),
        useful,
        composites: IndexMap::new(),
        names: HashSet::new(),
        trace: ConversionTrace::default(),
    };

    for state in StateSet::full(num_states)
        .difference(&construction.useful)
        .iter()
    {
        let state = nfa.state_label(state).unwrap_or_default().to_owned();
        trace!(%state, "dropping useless state");
        construction
            .trace
            .push(ConversionStep::UselessPruned { state });
    }

    construction.expand();

    let removed = if options.prune_sinks {
        construction.prune_sinks()
    } else {
        vec![false; construction.composites.len()]
    };

    let dfa = construction.build(&removed)?;
    debug!(
        nfa_states = num_states,
        composites = construction.composites.len(),
        dfa_states = dfa.num_states(),
        "subset construction done"
    );
    Ok((dfa, construction.trace))
}

/// A DFA state under construction.
struct Composite {
    members: StateSet,
    name: String,
    accepting: bool,
    /// Destination composite per symbol id, filled in when expanded.
    row: Vec<Option<usize>>,
}

struct Construction<'a> {
    nfa: &'a Automaton,
    closures: Vec<StateSet>,
    useful: StateSet,
    /// Keyed by the sorted member ids; the index is the composite's position in
    /// the table.
    composites: IndexMap<Vec<StateId>, Composite>,
    names: HashSet<String>,
    trace: ConversionTrace,
}

impl Construction<'_> {
    /// Epsilon closure restricted to useful states.
    fn close(&self, states: &StateSet) -> StateSet {
        let mut closure = closure::closure_from_cache(&self.closures, states);
        closure.intersect_with(&self.useful);
        closure
    }

    /// Look up a composite, creating it if it is new. Returns its index and
    /// whether it was created.
    fn intern(&mut self, members: StateSet) -> (usize, bool) {
        let key = members.to_vec();
        if let Some(index) = self.composites.get_index_of(&key) {
            return (index, false);
        }

        let mut name = composite_name(self.nfa.labels(&members));
        // Labels containing braces or commas could spell another composite.
        while self.names.contains(&name) {
            name.push('\'');
        }
        self.names.insert(name.clone());

        let accepting = members.intersects(self.nfa.accepting_set());
        let (index, _) = self.composites.insert_full(
            key,
            Composite {
                members,
                name,
                accepting,
                row: Vec::new(),
            },
        );
        (index, true)
    }

    fn expand(&mut self) {
        let nfa = self.nfa;
        let start = self.close(&StateSet::singleton(nfa.start_id(), nfa.num_states()));
        let (start, _) = self.intern(start);
        let composite = &self.composites[start];
        self.trace.push(ConversionStep::StartComposite {
            name: composite.name.clone(),
            members: nfa.label_vec(&composite.members),
            accepting: composite.accepting,
        });

        let mut worklist = VecDeque::from([start]);

        while let Some(current) = worklist.pop_front() {
            let members = self.composites[current].members.clone();
            let from = self.composites[current].name.clone();
            let mut row = Vec::with_capacity(nfa.num_symbols());

            // Symbol ids ascend with their labels, which keeps names and the
            // trace reproducible.
            for symbol in nfa.symbol_ids() {
                let symbol_label = nfa.symbol_label(symbol).unwrap_or_default().to_owned();
                let next = self.close(&closure::move_on_symbol(nfa, &members, symbol));

                if next.is_empty() {
                    self.trace.push(ConversionStep::TransitionAbsent {
                        from: from.clone(),
                        symbol: symbol_label,
                    });
                    row.push(None);
                    continue;
                }

                let (next, created) = self.intern(next);
                let composite = &self.composites[next];
                if created {
                    trace!(name = %composite.name, "discovered composite");
                    self.trace.push(ConversionStep::StateDiscovered {
                        name: composite.name.clone(),
                        members: nfa.label_vec(&composite.members),
                        accepting: composite.accepting,
                    });
                    worklist.push_back(next);
                }
                self.trace.push(ConversionStep::TransitionDerived {
                    from: from.clone(),
                    symbol: symbol_label,
                    to: composite.name.clone(),
                });
                row.push(Some(next));
            }

            self.composites[current].row = row;
        }
    }

    /// Mark non-accepting composites whose every edge is absent, a self-loop or
    /// into an already removed composite, until none is left. The start
    /// composite always stays.
    fn prune_sinks(&mut self) -> Vec<bool> {
        let mut removed = vec![false; self.composites.len()];

        loop {
            let mut changed = false;
            for (index, composite) in self.composites.values().enumerate().skip(1) {
                if removed[index] || composite.accepting {
                    continue;
                }
                let sink = composite.row.iter().all(|target| match *target {
                    None => true,
                    Some(target) => target == index || removed[target],
                });
                if sink {
                    trace!(name = %composite.name, "pruning sink");
                    self.trace.push(ConversionStep::SinkPruned {
                        state: composite.name.clone(),
                    });
                    removed[index] = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        removed
    }

    fn build(&mut self, removed: &[bool]) -> Result<Automaton> {
        let nfa = self.nfa;
        let mut builder = Automaton::builder(Kind::Deterministic)
            .alphabet(nfa.alphabet())
            .start(self.composites[0].name.clone());
        if let Some(description) = nfa.description() {
            builder = builder.description(description);
        }

        for (index, composite) in self.composites.values().enumerate() {
            if removed[index] {
                continue;
            }
            builder = builder.state(composite.name.clone());
            if composite.accepting {
                builder = builder.accepting(composite.name.clone());
            }
            for (symbol, target) in nfa.symbol_ids().zip(&composite.row) {
                let Some(target) = *target else { continue };
                if removed[target] {
                    continue;
                }
                builder = builder.transition(
                    composite.name.clone(),
                    nfa.symbol_label(symbol).unwrap_or_default(),
                    self.composites[target].name.clone(),
                );
            }
            self.trace
                .map_state(composite.name.clone(), nfa.label_vec(&composite.members));
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Targets;

    fn all_strings(alphabet: &[&str], max_len: usize) -> Vec<Vec<String>> {
        let mut strings = vec![Vec::new()];
        let mut frontier = vec![Vec::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for prefix in &frontier {
                for symbol in alphabet {
                    let mut word: Vec<String> = prefix.clone();
                    word.push((*symbol).to_owned());
                    next.push(word);
                }
            }
            strings.extend(next.iter().cloned());
            frontier = next;
        }
        strings
    }

    fn assert_same_language(a: &Automaton, b: &Automaton, alphabet: &[&str], max_len: usize) {
        for word in all_strings(alphabet, max_len) {
            assert_eq!(a.accepts(&word), b.accepts(&word), "disagree on {word:?}");
        }
    }

    #[test]
    fn test_composite_names() {
        assert_eq!(composite_name(Vec::<&str>::new()), "∅");
        assert_eq!(composite_name(["q1"]), "q1");
        assert_eq!(composite_name(["q0", "q1", "q2"]), "{q0,q1,q2}");
    }

    #[test]
    fn test_subset_construction_basic() {
        // NFA: 0 -a-> 1, 0 -a-> 2, 1 -b-> 3(final), 2 -b-> 3(final)
        let nfa = Automaton::builder(Kind::Nondeterministic)
            .states(["0", "1", "2", "3"])
            .alphabet(["a", "b"])
            .start("0")
            .accepting("3")
            .transition("0", "a", "1")
            .transition("0", "a", "2")
            .transition("1", "b", "3")
            .transition("2", "b", "3")
            .build()
            .unwrap();

        let (dfa, trace) = convert(&nfa).unwrap();

        assert_eq!(dfa.kind(), Kind::Deterministic);
        assert_eq!(dfa.states().collect::<Vec<_>>(), ["0", "3", "{1,2}"]);
        assert_eq!(dfa.start(), "0");
        assert_eq!(dfa.accepting().collect::<Vec<_>>(), ["3"]);
        assert_eq!(
            dfa.transitions().collect::<Vec<_>>(),
            [("0", "a", "{1,2}"), ("{1,2}", "b", "3")]
        );
        assert_eq!(trace.discovered().collect::<Vec<_>>(), ["0", "{1,2}", "3"]);
        assert_eq!(trace.state_mapping()["{1,2}"], ["1", "2"]);
        assert_same_language(&nfa, &dfa, &["a", "b"], 4);
    }

    #[test]
    fn test_subset_construction_with_epsilon() {
        // NFA: 0 -ε-> 1 -a-> 2(final)
        let nfa = Automaton::builder(Kind::Nondeterministic)
            .states(["0", "1", "2"])
            .alphabet(["a"])
            .start("0")
            .accepting("2")
            .epsilon("0", "1")
            .transition("1", "a", "2")
            .build()
            .unwrap();

        let (dfa, trace) = convert(&nfa).unwrap();

        // Initial DFA state is {0, 1}, the epsilon closure of {0}.
        assert_eq!(dfa.start(), "{0,1}");
        assert_eq!(
            dfa.transitions_from("{0,1}", "a"),
            Some(Targets::Deterministic(Some("2")))
        );
        assert!(dfa.accepts_str("a"));
        assert!(!dfa.accepts_str(""));
        assert!(!dfa.accepts_str("aa"));
        assert!(matches!(
            &trace.steps()[0],
            ConversionStep::StartComposite { name, accepting: false, .. } if name == "{0,1}"
        ));
    }

    #[test]
    fn test_absent_transitions_are_traced() {
        let nfa = Automaton::builder(Kind::Nondeterministic)
            .states(["p", "q"])
            .alphabet(["a", "b"])
            .start("p")
            .accepting("q")
            .transition("p", "a", "q")
            .build()
            .unwrap();

        let (dfa, trace) = convert(&nfa).unwrap();
        assert_eq!(dfa.num_transitions(), 1);
        assert!(trace.steps().contains(&ConversionStep::TransitionAbsent {
            from: "p".into(),
            symbol: "b".into(),
        }));
        assert!(trace.steps().contains(&ConversionStep::TransitionAbsent {
            from: "q".into(),
            symbol: "a".into(),
        }));
    }

    #[test]
    fn test_useless_states_are_dropped() {
        // s -a-> f (final); s -b-> d1 -a-> d2 -a-> d1 never reach f
        let nfa = Automaton::builder(Kind::Nondeterministic)
            .states(["d1", "d2", "f", "s"])
            .alphabet(["a", "b"])
            .start("s")
            .accepting("f")
            .transition("s", "a", "f")
            .transition("s", "b", "d1")
            .transition("d1", "a", "d2")
            .transition("d2", "a", "d1")
            .build()
            .unwrap();

        let (dfa, trace) = convert(&nfa).unwrap();
        assert_eq!(dfa.states().collect::<Vec<_>>(), ["f", "s"]);
        assert_eq!(trace.pruned_useless().collect::<Vec<_>>(), ["d1", "d2"]);
        assert_eq!(trace.pruned_sinks().count(), 0);

        // Without the usefulness filter, the sink pass cannot see through the
        // dead cycle.
        let options = ConvertOptions {
            prune_useless: false,
            prune_sinks: true,
        };
        let (unfiltered, trace) = convert_with(&nfa, &options).unwrap();
        assert_eq!(unfiltered.num_states(), 4);
        assert_eq!(trace.pruned_sinks().count(), 0);
        assert_same_language(&dfa, &unfiltered, &["a", "b"], 5);
    }

    #[test]
    fn test_sink_pass_without_filter() {
        // s -b-> trap, trap loops on a and b; s -a-> f (final)
        let nfa = Automaton::builder(Kind::Nondeterministic)
            .states(["f", "s", "trap"])
            .alphabet(["a", "b"])
            .start("s")
            .accepting("f")
            .transition("s", "a", "f")
            .transition("s", "b", "trap")
            .transition("trap", "a", "trap")
            .transition("trap", "b", "trap")
            .build()
            .unwrap();

        let options = ConvertOptions {
            prune_useless: false,
            prune_sinks: true,
        };
        let (dfa, trace) = convert_with(&nfa, &options).unwrap();
        assert_eq!(trace.pruned_sinks().collect::<Vec<_>>(), ["trap"]);
        assert_eq!(dfa.states().collect::<Vec<_>>(), ["f", "s"]);
        assert_eq!(
            dfa.transitions_from("s", "b"),
            Some(Targets::Deterministic(None))
        );

        let keep_all = ConvertOptions {
            prune_useless: false,
            prune_sinks: false,
        };
        let (dfa, _) = convert_with(&nfa, &keep_all).unwrap();
        assert_eq!(dfa.num_states(), 3);
    }

    #[test]
    fn test_sink_pass_repeats_until_stable() {
        // s -a-> x -a-> y, y loops: removing y turns x into a sink too
        let nfa = Automaton::builder(Kind::Nondeterministic)
            .states(["f", "s", "x", "y"])
            .alphabet(["a", "b"])
            .start("s")
            .accepting("f")
            .transition("s", "a", "x")
            .transition("s", "b", "f")
            .transition("x", "a", "y")
            .transition("y", "a", "y")
            .build()
            .unwrap();

        let options = ConvertOptions {
            prune_useless: false,
            prune_sinks: true,
        };
        let (dfa, trace) = convert_with(&nfa, &options).unwrap();
        assert_eq!(trace.pruned_sinks().collect::<Vec<_>>(), ["y", "x"]);
        assert_eq!(dfa.states().collect::<Vec<_>>(), ["f", "s"]);
    }

    #[test]
    fn test_empty_language_keeps_start() {
        let nfa = Automaton::builder(Kind::Nondeterministic)
            .states(["0", "1"])
            .alphabet(["a"])
            .start("0")
            .accepting("1")
            .transition("0", "a", "0")
            .build()
            .unwrap();

        let (dfa, trace) = convert(&nfa).unwrap();
        assert_eq!(dfa.states().collect::<Vec<_>>(), [EMPTY_COMPOSITE]);
        assert_eq!(dfa.start(), EMPTY_COMPOSITE);
        assert_eq!(dfa.num_transitions(), 0);
        assert!(dfa.is_empty());
        assert_eq!(trace.pruned_useless().collect::<Vec<_>>(), ["0"]);
    }

    #[test]
    fn test_reproducible() {
        let nfa = Automaton::builder(Kind::Nondeterministic)
            .states(["a", "b", "c", "d"])
            .alphabet(["x", "y"])
            .start("a")
            .accepting("d")
            .transition("a", "x", "b")
            .transition("a", "x", "c")
            .transition("b", "y", "d")
            .transition("c", "x", "d")
            .epsilon("c", "a")
            .transition("d", "y", "a")
            .build()
            .unwrap();

        let (first, first_trace) = convert(&nfa).unwrap();
        let (second, second_trace) = convert(&nfa).unwrap();
        assert_eq!(first, second);
        assert_eq!(first_trace, second_trace);
        assert_same_language(&nfa, &first, &["x", "y"], 6);
    }

    #[test]
    fn test_description_carried_over() {
        let nfa = Automaton::builder(Kind::Nondeterministic)
            .states(["0"])
            .alphabet(["a"])
            .start("0")
            .accepting("0")
            .transition("0", "a", "0")
            .description("a*")
            .build()
            .unwrap();

        let (dfa, _) = convert(&nfa).unwrap();
        assert_eq!(dfa.description(), Some("a*"));
        assert!(dfa.accepts_str("aaa"));
    }
}
