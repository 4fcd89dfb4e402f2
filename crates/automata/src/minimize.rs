//! DFA minimization by partition refinement.

use crate::automaton::{Automaton, Kind, StateId, StateSet};
use crate::closure;
use crate::config::MinimizeOptions;
use crate::error::{AutomatonError, Result};
use crate::trace::{Blocks, PartitionStep, PartitionTrace};
use indexmap::IndexMap;
use tracing::{debug, trace};

/// Minimize a DFA with default options.
pub fn minimize(dfa: &Automaton) -> Result<(Automaton, PartitionTrace)> {
    minimize_with(dfa, &MinimizeOptions::default())
}

/// Minimize a DFA, merging states that no input string can tell apart.
///
/// Each merged block is named after its smallest member, so an automaton that
/// is already minimal comes back unchanged. States that cannot reach
/// acceptance are kept: dropping them would change the transition table, not
/// the language.
pub fn minimize_with(
    dfa: &Automaton,
    options: &MinimizeOptions,
) -> Result<(Automaton, PartitionTrace)> {
    if !dfa.is_deterministic() {
        return Err(AutomatonError::WrongKind {
            expected: Kind::Deterministic,
            found: dfa.kind(),
        });
    }
    dfa.validate()?;

    let num_states = dfa.num_states();
    let mut trace = PartitionTrace::default();

    let kept = if options.prune_unreachable {
        closure::reachable(dfa)
    } else {
        StateSet::full(num_states)
    };
    for state in StateSet::full(num_states).difference(&kept).iter() {
        let state = dfa.state_label(state).unwrap_or_default().to_owned();
        trace!(%state, "pruning unreachable state");
        trace.push(PartitionStep::UnreachablePruned { state });
    }

    let mut partition = Partition::initial(dfa, &kept);
    trace.push_round(partition.labelled(dfa));

    let mut round = 0;
    loop {
        round += 1;
        let refined = partition.refine(dfa, round, &mut trace);
        if refined == partition {
            break;
        }
        trace!(round, blocks = refined.blocks.len(), "refined partition");
        partition = refined;
        trace.push_round(partition.labelled(dfa));
    }

    let minimized = partition.build(dfa, &mut trace)?;
    debug!(
        states = num_states,
        kept = kept.len(),
        minimized = minimized.num_states(),
        rounds = trace.rounds().len(),
        "minimization done"
    );
    Ok((minimized, trace))
}

/// One round of the refinement: disjoint blocks covering the kept states.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Partition {
    /// Non-empty blocks ordered by their smallest member.
    blocks: Vec<StateSet>,
    /// Block index of each state; `None` for states outside the partition.
    block_of: Vec<Option<usize>>,
}

impl Partition {
    fn from_blocks(blocks: impl IntoIterator<Item = StateSet>, num_states: usize) -> Self {
        let mut blocks: Vec<StateSet> = blocks.into_iter().filter(|b| !b.is_empty()).collect();
        blocks.sort_by_key(StateSet::first);

        let mut block_of = vec![None; num_states];
        for (index, block) in blocks.iter().enumerate() {
            for state in block.iter() {
                block_of[state as usize] = Some(index);
            }
        }

        Self { blocks, block_of }
    }

    /// Accepting and non-accepting states of `kept`.
    fn initial(dfa: &Automaton, kept: &StateSet) -> Self {
        let accepting = kept.intersection(dfa.accepting_set());
        let rejecting = kept.difference(dfa.accepting_set());
        Self::from_blocks([accepting, rejecting], dfa.num_states())
    }

    /// Target block of every symbol in ascending order, `None` where there is
    /// no transition.
    fn signature(&self, dfa: &Automaton, state: StateId) -> Vec<Option<usize>> {
        dfa.symbol_ids()
            .map(|symbol| {
                dfa.step(state, symbol)
                    .and_then(|target| self.block_of[target as usize])
            })
            .collect()
    }

    /// Split every block by signature. Reads only `self`, so the whole round
    /// sees the previous partition.
    fn refine(&self, dfa: &Automaton, round: usize, trace: &mut PartitionTrace) -> Self {
        let num_states = dfa.num_states();
        let mut blocks = Vec::with_capacity(self.blocks.len());

        for block in &self.blocks {
            // Members are visited in ascending order, so groups come out ordered
            // by their smallest member.
            let mut groups: IndexMap<Vec<Option<usize>>, StateSet> = IndexMap::new();
            for state in block.iter() {
                groups
                    .entry(self.signature(dfa, state))
                    .or_insert_with(|| StateSet::with_capacity(num_states))
                    .insert(state);
            }

            if groups.len() > 1 {
                trace.push(PartitionStep::BlockSplit {
                    round,
                    block: dfa.label_vec(block),
                    into: groups.values().map(|group| dfa.label_vec(group)).collect(),
                });
            }
            blocks.extend(groups.into_values());
        }

        Self::from_blocks(blocks, num_states)
    }

    fn labelled(&self, dfa: &Automaton) -> Blocks {
        self.blocks.iter().map(|block| dfa.label_vec(block)).collect()
    }

    /// Label of the representative of the block holding `state`.
    fn representative<'a>(&self, dfa: &'a Automaton, state: StateId) -> Option<&'a str> {
        let block = self.block_of.get(state as usize).copied().flatten()?;
        self.blocks[block]
            .first()
            .and_then(|representative| dfa.state_label(representative))
    }

    fn build(&self, dfa: &Automaton, trace: &mut PartitionTrace) -> Result<Automaton> {
        // The start state is reachable, so it always has a block.
        let start = self.representative(dfa, dfa.start_id()).unwrap_or_default();

        let mut builder = Automaton::builder(Kind::Deterministic)
            .alphabet(dfa.alphabet())
            .start(start);
        if let Some(description) = dfa.description() {
            builder = builder.description(description);
        }

        for block in &self.blocks {
            let Some(representative) = block.first() else {
                continue;
            };
            let label = dfa.state_label(representative).unwrap_or_default();

            if block.len() > 1 {
                trace!(representative = label, members = block.len(), "merging block");
                trace.push(PartitionStep::Merged {
                    representative: label.to_owned(),
                    members: dfa.label_vec(block),
                });
            }

            builder = builder.state(label);
            // Blocks never mix accepting and rejecting states.
            if dfa.accepting_set().contains(representative) {
                builder = builder.accepting(label);
            }
            for (symbol, target) in dfa.edges_from(representative) {
                if let Some(target) = self.representative(dfa, target) {
                    builder = builder.transition(
                        label,
                        dfa.symbol_label(symbol).unwrap_or_default(),
                        target,
                    );
                }
            }
        }

        builder.build()
    }
}
