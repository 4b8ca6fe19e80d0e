//! Jukes-Cantor mutations dropped on the branches of a genealogy.
use super::{nearest_state_above, MutationConfig};
use crate::errors::{FigureError, Result};
use definitions::{Mutation, Site, TreeSequence, NUCLEOTIDES};
use log::*;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::{Distribution, Poisson};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::BTreeMap;

/// Pick one of the three nucleotides different from `state`.
fn mutate_base<R: Rng>(rng: &mut R, state: u8) -> u8 {
    let others: Vec<u8> = NUCLEOTIDES.iter().copied().filter(|&b| b != state).collect();
    others[rng.gen_range(0..others.len())]
}

/// Place mutations on `ts` and return a copy carrying the site and mutation tables.
/// Existing sites and mutations of `ts` are discarded.
pub fn simulate_mutations(ts: &TreeSequence, config: &MutationConfig) -> Result<TreeSequence> {
    if !config.rate.is_finite() || config.rate < 0f64 {
        return Err(FigureError::ConfigError(format!(
            "mutation_rate must be non-negative, got {}",
            config.rate
        )));
    }
    let mut rng: Xoshiro256PlusPlus = SeedableRng::seed_from_u64(config.seed);
    // position -> (node, time)
    let mut placed: BTreeMap<u64, Vec<(usize, f64)>> = BTreeMap::new();
    for edge in ts.edges.iter() {
        let (lower, upper) = (ts.nodes[edge.child].time, ts.nodes[edge.parent].time);
        let mean = config.rate * edge.span() as f64 * (upper - lower);
        if mean <= 0f64 || !mean.is_finite() {
            continue;
        }
        let poisson =
            Poisson::new(mean).map_err(|why| FigureError::ConfigError(format!("{why:?}")))?;
        let count = poisson.sample(&mut rng) as usize;
        for _ in 0..count {
            let position = rng.gen_range(edge.left..edge.right);
            let time = rng.gen_range(lower..upper);
            placed.entry(position).or_default().push((edge.child, time));
        }
    }
    let mut sites = Vec::with_capacity(placed.len());
    let mut mutations: Vec<Mutation> = vec![];
    for (site_idx, (position, mut muts)) in placed.into_iter().enumerate() {
        let ancestral_state = NUCLEOTIDES[rng.gen_range(0..NUCLEOTIDES.len())];
        sites.push(Site {
            position,
            ancestral_state,
        });
        // Oldest first so that the state above each mutation is already known.
        muts.sort_by(|a, b| b.1.total_cmp(&a.1));
        let parents = ts.parents_at(position);
        let start = mutations.len();
        for (node, time) in muts {
            let state_above =
                nearest_state_above(node, time, mutations[start..].iter(), &parents)
                    .unwrap_or(ancestral_state);
            mutations.push(Mutation {
                site: site_idx,
                node,
                time,
                derived_state: mutate_base(&mut rng, state_above),
            });
        }
    }
    debug!("MUTATIONS\tSites\t{}\t{}", sites.len(), mutations.len());
    Ok(TreeSequence {
        sites,
        mutations,
        ..ts.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate::{simulate_ancestry, AncestryConfig};
    #[test]
    fn mutate_base_changes_state() {
        let mut rng: Xoshiro256PlusPlus = SeedableRng::seed_from_u64(3);
        for &base in NUCLEOTIDES.iter() {
            for _ in 0..20 {
                let new = mutate_base(&mut rng, base);
                assert_ne!(new, base);
                assert!(NUCLEOTIDES.contains(&new));
            }
        }
    }
    #[test]
    fn mutations_change_the_state_above() {
        let ancestry = AncestryConfig::new(10, 20_000, 1_000f64, 1e-7, 11);
        let ts = simulate_ancestry(&ancestry).unwrap();
        let ts = simulate_mutations(&ts, &MutationConfig::new(1e-6, 12)).unwrap();
        assert!(!ts.sites.is_empty());
        assert!(ts.sites.windows(2).all(|w| w[0].position < w[1].position));
        for (idx, site) in ts.sites.iter().enumerate() {
            let parents = ts.parents_at(site.position);
            let muts: Vec<_> = ts.mutations.iter().filter(|m| m.site == idx).collect();
            assert!(!muts.is_empty());
            for m in muts.iter() {
                let child = ts.nodes[m.node].time;
                let parent = parents[m.node].map(|p| ts.nodes[p].time).unwrap();
                assert!(child <= m.time && m.time < parent);
                let above = nearest_state_above(m.node, m.time, muts.iter().copied(), &parents)
                    .unwrap_or(site.ancestral_state);
                assert_ne!(above, m.derived_state);
            }
        }
    }
    #[test]
    fn zero_rate_has_no_sites() {
        let ancestry = AncestryConfig::new(5, 1_000, 100f64, 0f64, 1);
        let ts = simulate_ancestry(&ancestry).unwrap();
        let ts = simulate_mutations(&ts, &MutationConfig::new(0f64, 2)).unwrap();
        assert!(ts.sites.is_empty());
        assert!(ts.mutations.is_empty());
        assert!(simulate_mutations(&ts, &MutationConfig::new(-1f64, 2)).is_err());
    }
}
