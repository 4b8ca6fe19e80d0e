use super::nearest_state_above;
use definitions::{Mutation, Site, TreeSequence, Variant};
use rayon::prelude::*;

/// Decode the genotype of every sample at every site, in position order.
pub fn variants(ts: &TreeSequence) -> Vec<Variant> {
    let samples = ts.samples();
    let mut by_site: Vec<Vec<&Mutation>> = vec![vec![]; ts.sites.len()];
    for mutation in ts.mutations.iter() {
        by_site[mutation.site].push(mutation);
    }
    ts.sites
        .par_iter()
        .zip(by_site.par_iter())
        .map(|(site, muts)| decode_site(ts, &samples, site, muts))
        .collect()
}

fn decode_site(ts: &TreeSequence, samples: &[usize], site: &Site, muts: &[&Mutation]) -> Variant {
    let parents = ts.parents_at(site.position);
    let mut alleles = vec![site.ancestral_state];
    for m in muts.iter() {
        if !alleles.contains(&m.derived_state) {
            alleles.push(m.derived_state);
        }
    }
    let genotypes = samples
        .iter()
        .map(|&sample| {
            let state = nearest_state_above(
                sample,
                f64::NEG_INFINITY,
                muts.iter().copied(),
                &parents,
            )
            .unwrap_or(site.ancestral_state);
            alleles.iter().position(|&a| a == state).unwrap_or(0) as u8
        })
        .collect();
    Variant {
        position: site.position,
        alleles,
        genotypes,
    }
}
