//! Options for conversion and minimization.
//!
//! Every option defaults to the full algorithm. The structs deserialize with
//! missing fields filled from [`Default`], so presentation layers can load
//! them from any serde format.

use serde::{Deserialize, Serialize};

/// Options for [`crate::convert_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Drop source states that cannot reach an accepting state before the
    /// subset construction starts.
    pub prune_useless: bool,
    /// Remove generated non-accepting states whose edges are all absent or
    /// self-loops once the construction is done.
    pub prune_sinks: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            prune_useless: true,
            prune_sinks: true,
        }
    }
}

/// Options for [`crate::minimize_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimizeOptions {
    /// Remove states unreachable from the start state before refinement. When
    /// disabled they are refined and kept like every other state.
    pub prune_unreachable: bool,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            prune_unreachable: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let options: ConvertOptions = serde_json::from_str(r#"{"prune_sinks":false}"#).unwrap();
        assert!(options.prune_useless);
        assert!(!options.prune_sinks);

        let options: MinimizeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, MinimizeOptions::default());
    }
}
