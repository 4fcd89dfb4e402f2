//! Language equivalence of automata.
//!
//! [`equivalent`] compares canonical forms: the minimal DFA restricted to
//! states that can reach acceptance is unique up to state renaming, so two
//! automata accept the same language exactly when those forms are isomorphic.
//! [`language_equivalent`] walks the product of the two DFAs instead and serves
//! as an independent check.

use crate::automaton::{Automaton, StateId, StateSet};
use crate::convert::convert;
use crate::error::Result;
use crate::minimize::minimize;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::debug;

/// Check whether two automata of any kind accept the same language.
///
/// Symbols are matched by label. Alphabet symbols that neither language uses
/// do not matter, so automata over different alphabets can be equivalent.
///
/// Both inputs go through [`convert`] and [`minimize`], which revalidate them;
/// an error from either is passed on, which for a validated automaton does not
/// happen. The signature matches theirs so the three compose with `?`.
pub fn equivalent(a: &Automaton, b: &Automaton) -> Result<bool> {
    let a = canonical(a)?;
    let b = canonical(b)?;
    let result = isomorphic(&a, &b);
    debug!(
        left = a.num_states(),
        right = b.num_states(),
        result,
        "compared canonical automata"
    );
    Ok(result)
}

/// Check whether two automata accept the same language by exploring every
/// reachable pair of states of their determinized forms. A missing transition
/// leads to an implicit rejecting sink, as does a symbol missing from one
/// alphabet.
///
/// Fails only if revalidating or converting an input fails, like
/// [`equivalent`].
pub fn language_equivalent(a: &Automaton, b: &Automaton) -> Result<bool> {
    let a = deterministic(a)?;
    let b = deterministic(b)?;
    let symbols: BTreeSet<&str> = a.alphabet().chain(b.alphabet()).collect();

    let mut seen: HashSet<(Option<StateId>, Option<StateId>)> = HashSet::new();
    let mut queue = VecDeque::from([(Some(a.start_id()), Some(b.start_id()))]);

    while let Some((p, q)) = queue.pop_front() {
        if !seen.insert((p, q)) {
            continue;
        }
        let p_accepts = p.is_some_and(|p| a.accepting_set().contains(p));
        let q_accepts = q.is_some_and(|q| b.accepting_set().contains(q));
        if p_accepts != q_accepts {
            return Ok(false);
        }
        if p.is_none() && q.is_none() {
            continue;
        }

        for &symbol in &symbols {
            let next_p = p.and_then(|p| a.symbol_id(symbol).and_then(|s| a.step(p, s)));
            let next_q = q.and_then(|q| b.symbol_id(symbol).and_then(|s| b.step(q, s)));
            queue.push_back((next_p, next_q));
        }
    }

    Ok(true)
}

fn deterministic(automaton: &Automaton) -> Result<Cow<'_, Automaton>> {
    if automaton.is_deterministic() {
        automaton.validate()?;
        Ok(Cow::Borrowed(automaton))
    } else {
        Ok(Cow::Owned(convert(automaton)?.0))
    }
}

/// Minimal DFA without states that cannot reach acceptance (the start state
/// aside). Conversion drops those states, including for deterministic input,
/// so partial and complete DFAs end up alike.
fn canonical(automaton: &Automaton) -> Result<Automaton> {
    let (trimmed, _) = convert(automaton)?;
    let (minimal, _) = minimize(&trimmed)?;
    Ok(minimal)
}

/// Find a bijection between the states of two DFAs that preserves the start
/// state, acceptance and labelled transitions. Both automata must have every
/// state reachable from the start state, so pairing from the start states
/// is forced.
fn isomorphic(a: &Automaton, b: &Automaton) -> bool {
    if a.num_states() != b.num_states() {
        return false;
    }

    let mut pairing: Vec<Option<StateId>> = vec![None; a.num_states()];
    let mut paired = StateSet::with_capacity(b.num_states());
    pairing[a.start_id() as usize] = Some(b.start_id());
    paired.insert(b.start_id());
    let mut queue = VecDeque::from([(a.start_id(), b.start_id())]);

    while let Some((p, q)) = queue.pop_front() {
        if a.accepting_set().contains(p) != b.accepting_set().contains(q) {
            return false;
        }
        if a.edges_from(p).count() != b.edges_from(q).count() {
            return false;
        }

        for (symbol, p_next) in a.edges_from(p) {
            let q_next = a
                .symbol_label(symbol)
                .and_then(|label| b.symbol_id(label))
                .and_then(|symbol| b.step(q, symbol));
            let Some(q_next) = q_next else {
                return false;
            };

            match pairing[p_next as usize] {
                Some(existing) if existing == q_next => {}
                Some(_) => return false,
                None => {
                    if !paired.insert(q_next) {
                        return false;
                    }
                    pairing[p_next as usize] = Some(q_next);
                    queue.push_back((p_next, q_next));
                }
            }
        }
    }

    pairing.iter().all(Option::is_some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Kind;

    /// Strings over {a, b} ending in `ab`, as an NFA.
    fn ends_in_ab_nfa() -> Automaton {
        Automaton::builder(Kind::Nondeterministic)
            .states(["q0", "q1", "q2"])
            .alphabet(["a", "b"])
            .start("q0")
            .accepting("q2")
            .transition("q0", "a", "q0")
            .transition("q0", "b", "q0")
            .transition("q0", "a", "q1")
            .transition("q1", "b", "q2")
            .build()
            .unwrap()
    }

    /// The same language as a complete DFA.
    fn ends_in_ab_dfa() -> Automaton {
        Automaton::new(
            Kind::Deterministic,
            ["s0", "s1", "s2"],
            ["a", "b"],
            "s0",
            ["s2"],
            [
                ("s0", "a", "s1"),
                ("s0", "b", "s0"),
                ("s1", "a", "s1"),
                ("s1", "b", "s2"),
                ("s2", "a", "s1"),
                ("s2", "b", "s0"),
            ],
        )
        .unwrap()
    }

    fn exactly_ab(trap: bool) -> Automaton {
        let mut builder = Automaton::builder(Kind::Deterministic)
            .states(["0", "1", "2"])
            .alphabet(["a", "b"])
            .start("0")
            .accepting("2")
            .transition("0", "a", "1")
            .transition("1", "b", "2");
        if trap {
            builder = builder
                .state("dead")
                .transition("0", "b", "dead")
                .transition("1", "a", "dead")
                .transition("2", "a", "dead")
                .transition("2", "b", "dead")
                .transition("dead", "a", "dead")
                .transition("dead", "b", "dead");
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_nfa_and_dfa_equivalent() {
        let nfa = ends_in_ab_nfa();
        let dfa = ends_in_ab_dfa();
        assert!(equivalent(&nfa, &dfa).unwrap());
        assert!(language_equivalent(&nfa, &dfa).unwrap());
    }

    #[test]
    fn test_partial_and_complete_dfa_equivalent() {
        let partial = exactly_ab(false);
        let complete = exactly_ab(true);
        assert!(equivalent(&partial, &complete).unwrap());
        assert!(language_equivalent(&partial, &complete).unwrap());
    }

    #[test]
    fn test_different_languages() {
        let nfa = ends_in_ab_nfa();
        let ab = exactly_ab(false);
        assert!(!equivalent(&nfa, &ab).unwrap());
        assert!(!language_equivalent(&nfa, &ab).unwrap());
    }

    #[test]
    fn test_unused_symbols_do_not_matter() {
        let ab = exactly_ab(false);
        let wider = Automaton::new(
            Kind::Deterministic,
            ["x", "y", "z"],
            ["a", "b", "c"],
            "x",
            ["z"],
            [("x", "a", "y"), ("y", "b", "z")],
        )
        .unwrap();
        assert!(equivalent(&ab, &wider).unwrap());
        assert!(language_equivalent(&ab, &wider).unwrap());
    }

    #[test]
    fn test_empty_languages_equivalent() {
        let none = Automaton::builder(Kind::Nondeterministic)
            .states(["0", "1"])
            .alphabet(["a"])
            .start("0")
            .accepting("1")
            .transition("0", "a", "0")
            .build()
            .unwrap();
        let reject_all = Automaton::new(
            Kind::Deterministic,
            ["p"],
            ["b"],
            "p",
            Vec::<&str>::new(),
            [("p", "b", "p")],
        )
        .unwrap();
        assert!(equivalent(&none, &reject_all).unwrap());
        assert!(language_equivalent(&none, &reject_all).unwrap());
        assert!(!equivalent(&none, &exactly_ab(false)).unwrap());
    }

    #[test]
    fn test_different_alphabets_compare_languages() {
        fn a_star(alphabet: &[&str]) -> Automaton {
            Automaton::new(
                Kind::Deterministic,
                ["s"],
                alphabet.iter().copied(),
                "s",
                ["s"],
                [("s", "a", "s")],
            )
            .unwrap()
        }

        let narrow = a_star(&["a"]);
        let wide = a_star(&["a", "b"]);
        assert!(equivalent(&narrow, &wide).unwrap());
        assert!(language_equivalent(&narrow, &wide).unwrap());

        let any_word = Automaton::new(
            Kind::Deterministic,
            ["s"],
            ["a", "b"],
            "s",
            ["s"],
            [("s", "a", "s"), ("s", "b", "s")],
        )
        .unwrap();
        assert!(!equivalent(&narrow, &any_word).unwrap());
        assert!(!language_equivalent(&narrow, &any_word).unwrap());
    }

    #[test]
    fn test_empty_string_distinguishes() {
        let star = Automaton::new(
            Kind::Deterministic,
            ["s"],
            ["a"],
            "s",
            ["s"],
            [("s", "a", "s")],
        )
        .unwrap();
        let plus = Automaton::new(
            Kind::Deterministic,
            ["s", "t"],
            ["a"],
            "s",
            ["t"],
            [("s", "a", "t"), ("t", "a", "t")],
        )
        .unwrap();
        assert!(!equivalent(&star, &plus).unwrap());
        assert!(!language_equivalent(&star, &plus).unwrap());
    }
}
