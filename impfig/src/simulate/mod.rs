//! The coalescent collaborator. It mirrors the three calls the figure needs from a
//! population-genetics simulator: ancestry, mutations on top of it, and a variant iterator.
use definitions::Mutation;
use serde::{Deserialize, Serialize};
pub mod ancestry;
pub mod mutations;
pub mod variants;
pub use ancestry::simulate_ancestry;
pub use mutations::simulate_mutations;
pub use variants::variants;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AncestryConfig {
    /// Number of haploid samples (ploidy = 1).
    pub num_samples: usize,
    /// Length of the discrete genome in base pairs.
    pub sequence_length: u64,
    /// Effective population size.
    pub population_size: f64,
    /// Per base pair, per generation.
    pub recombination_rate: f64,
    pub seed: u64,
}

impl AncestryConfig {
    pub fn new(
        num_samples: usize,
        sequence_length: u64,
        population_size: f64,
        recombination_rate: f64,
        seed: u64,
    ) -> Self {
        Self {
            num_samples,
            sequence_length,
            population_size,
            recombination_rate,
            seed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutationConfig {
    /// Per base pair, per generation.
    pub rate: f64,
    pub seed: u64,
}

impl MutationConfig {
    pub fn new(rate: f64, seed: u64) -> Self {
        Self { rate, seed }
    }
}

/// Walk up the marginal tree from `node` and return the state of the first mutation
/// older than `time`. On a single branch the youngest such mutation wins.
pub(crate) fn nearest_state_above<'a, I>(
    node: usize,
    time: f64,
    mutations: I,
    parents: &[Option<usize>],
) -> Option<u8>
where
    I: Iterator<Item = &'a Mutation> + Clone,
{
    let mut current = Some(node);
    while let Some(u) = current {
        let youngest = mutations
            .clone()
            .filter(|m| m.node == u && time < m.time)
            .min_by(|a, b| a.time.total_cmp(&b.time));
        if let Some(m) = youngest {
            return Some(m.derived_state);
        }
        current = parents[u];
    }
    None
}
