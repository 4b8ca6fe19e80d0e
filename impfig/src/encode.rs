//! Turn 0/1 haplotypes into nucleotide letters.
use definitions::{AlleleMatrix, BasePair, SelectedSites};
use log::*;
use rand::Rng;

/// Draw one base pair per column, uniformly and independently.
pub fn assign_base_pairs<R: Rng>(rng: &mut R, num_columns: usize) -> Vec<BasePair> {
    (0..num_columns)
        .map(|_| BasePair::ALL[rng.gen_range(0..BasePair::ALL.len())])
        .collect()
}

pub trait Encode {
    /// 0 becomes the first base of the column's pair, 1 the second.
    fn encode(&self, pairs: &[BasePair]) -> AlleleMatrix;
}

impl Encode for SelectedSites {
    fn encode(&self, pairs: &[BasePair]) -> AlleleMatrix {
        assert_eq!(pairs.len(), self.num_columns());
        let rows: Vec<Vec<u8>> = self
            .haplotypes
            .iter()
            .map(|hap| {
                hap.iter()
                    .zip(pairs.iter())
                    .map(|(&g, pair)| pair.letter(g))
                    .collect()
            })
            .collect();
        trace!("ENCODE\t{}\t{}", rows.len(), pairs.len());
        AlleleMatrix { rows }
    }
}
