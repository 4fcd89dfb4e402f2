//! Step logs recorded by the converter and the minimizer.
//!
//! Traces hold labels only and are never read back by the algorithms; they
//! exist for presentation layers (reports, tables, diagrams).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One step of the subset construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ConversionStep {
    /// A source state that cannot reach acceptance was left out.
    UselessPruned { state: String },
    /// The start composite, the epsilon closure of the source start state.
    StartComposite {
        name: String,
        members: Vec<String>,
        accepting: bool,
    },
    /// A new composite was reached and queued.
    StateDiscovered {
        name: String,
        members: Vec<String>,
        accepting: bool,
    },
    TransitionDerived {
        from: String,
        symbol: String,
        to: String,
    },
    /// No useful source state is reachable on `symbol`.
    TransitionAbsent { from: String, symbol: String },
    /// A generated non-accepting state with no way out was removed.
    SinkPruned { state: String },
}

/// Log of a conversion, plus the source states behind every resulting state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionTrace {
    steps: Vec<ConversionStep>,
    state_mapping: IndexMap<String, Vec<String>>,
}

impl ConversionTrace {
    pub(crate) fn push(&mut self, step: ConversionStep) {
        self.steps.push(step);
    }

    pub(crate) fn map_state(&mut self, name: String, members: Vec<String>) {
        self.state_mapping.insert(name, members);
    }

    pub fn steps(&self) -> &[ConversionStep] {
        &self.steps
    }

    /// Resulting state name -> source states it stands for, in discovery order.
    pub fn state_mapping(&self) -> &IndexMap<String, Vec<String>> {
        &self.state_mapping
    }

    /// Names of the composites in discovery order, start first.
    pub fn discovered(&self) -> impl Iterator<Item = &str> + '_ {
        self.steps.iter().filter_map(|step| match step {
            ConversionStep::StartComposite { name, .. }
            | ConversionStep::StateDiscovered { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn pruned_useless(&self) -> impl Iterator<Item = &str> + '_ {
        self.steps.iter().filter_map(|step| match step {
            ConversionStep::UselessPruned { state } => Some(state.as_str()),
            _ => None,
        })
    }

    pub fn pruned_sinks(&self) -> impl Iterator<Item = &str> + '_ {
        self.steps.iter().filter_map(|step| match step {
            ConversionStep::SinkPruned { state } => Some(state.as_str()),
            _ => None,
        })
    }
}

/// A partition round: blocks of state labels, each block sorted, blocks
/// ordered by their smallest member.
pub type Blocks = Vec<Vec<String>>;

/// One step of partition refinement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PartitionStep {
    UnreachablePruned { state: String },
    InitialPartition { blocks: Blocks },
    /// `block` from the previous round was split by signature.
    BlockSplit {
        round: usize,
        block: Vec<String>,
        into: Blocks,
    },
    Round { round: usize, blocks: Blocks },
    /// Members of one final block were merged into `representative`.
    Merged {
        representative: String,
        members: Vec<String>,
    },
}

/// Log of a minimization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionTrace {
    steps: Vec<PartitionStep>,
    rounds: Vec<Blocks>,
}

impl PartitionTrace {
    pub(crate) fn push(&mut self, step: PartitionStep) {
        self.steps.push(step);
    }

    pub(crate) fn push_round(&mut self, blocks: Blocks) {
        let step = if self.rounds.is_empty() {
            PartitionStep::InitialPartition {
                blocks: blocks.clone(),
            }
        } else {
            PartitionStep::Round {
                round: self.rounds.len(),
                blocks: blocks.clone(),
            }
        };
        self.steps.push(step);
        self.rounds.push(blocks);
    }

    pub fn steps(&self) -> &[PartitionStep] {
        &self.steps
    }

    /// Every distinct partition, from the initial one to the fixpoint.
    pub fn rounds(&self) -> &[Blocks] {
        &self.rounds
    }

    /// The fixpoint partition (empty for an automaton with no reachable state,
    /// which cannot happen for a valid automaton).
    pub fn final_partition(&self) -> &[Vec<String>] {
        self.rounds.last().map(Vec::as_slice).unwrap_or_default()
    }

    /// `(representative, members)` of every block with more than one member.
    pub fn merges(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.steps.iter().filter_map(|step| match step {
            PartitionStep::Merged {
                representative,
                members,
            } => Some((representative.as_str(), members.as_slice())),
            _ => None,
        })
    }

    pub fn pruned_unreachable(&self) -> impl Iterator<Item = &str> + '_ {
        self.steps.iter().filter_map(|step| match step {
            PartitionStep::UnreachablePruned { state } => Some(state.as_str()),
            _ => None,
        })
    }
}
