//! Pick the biallelic sites and rank them by minor-allele frequency.
use crate::errors::{FigureError, Result};
use definitions::{GenotypeMatrix, SelectedSites, Variant};
use log::*;

#[derive(Debug, Clone, Copy)]
pub struct SelectionConfig {
    /// How many columns would we take?
    num_sites: usize,
}

impl SelectionConfig {
    pub fn new(num_sites: usize) -> Self {
        Self { num_sites }
    }
}

/// Keep the sites with at least two alleles whose genotypes are all 0 or 1.
/// Every kept site must carry exactly `expected_samples` genotypes.
pub fn biallelic_matrix(variants: &[Variant], expected_samples: usize) -> Result<GenotypeMatrix> {
    let mut matrix = GenotypeMatrix {
        num_samples: expected_samples,
        ..Default::default()
    };
    for variant in variants.iter() {
        if variant.alleles.len() < 2 || variant.genotypes.iter().any(|&g| 1 < g) {
            continue;
        }
        if variant.genotypes.len() != expected_samples {
            return Err(FigureError::WidthMismatch {
                found: variant.genotypes.len(),
                expected: expected_samples,
            });
        }
        matrix.positions.push(variant.position);
        matrix.rows.push(variant.genotypes.clone());
    }
    debug!(
        "EXTRACT\tBiallelic\t{}\t{}",
        matrix.num_sites(),
        variants.len()
    );
    Ok(matrix)
}

/// min(count, n - count) / n, where count is the number of 1s.
pub fn minor_allele_frequency(row: &[u8], num_samples: usize) -> f64 {
    let count = row.iter().filter(|&&g| g == 1).count();
    count.min(num_samples - count) as f64 / num_samples as f64
}

pub trait SelectVariants {
    fn select_top_maf(&self, config: &SelectionConfig) -> Result<SelectedSites>;
}

impl SelectVariants for GenotypeMatrix {
    fn select_top_maf(&self, config: &SelectionConfig) -> Result<SelectedSites> {
        if self.num_sites() < config.num_sites {
            return Err(FigureError::TooFewSites {
                found: self.num_sites(),
                required: config.num_sites,
            });
        }
        let maf: Vec<f64> = self
            .rows
            .iter()
            .map(|row| minor_allele_frequency(row, self.num_samples))
            .collect();
        let mut order: Vec<usize> = (0..self.num_sites()).collect();
        // Stable: equal MAF keeps the simulation order.
        order.sort_by(|&i, &j| maf[j].total_cmp(&maf[i]));
        order.truncate(config.num_sites);
        let haplotypes: Vec<Vec<u8>> = (0..self.num_samples)
            .map(|hap| order.iter().map(|&site| self.rows[site][hap]).collect())
            .collect();
        let selected = SelectedSites {
            positions: order.iter().map(|&i| self.positions[i]).collect(),
            maf: order.iter().map(|&i| maf[i]).collect(),
            haplotypes,
        };
        if let (Some(first), Some(last)) = (selected.maf.first(), selected.maf.last()) {
            debug!("EXTRACT\tMAF\t{:.3}\t{:.3}", first, last);
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn variant(position: u64, alleles: &[u8], genotypes: &[u8]) -> Variant {
        Variant {
            position,
            alleles: alleles.to_vec(),
            genotypes: genotypes.to_vec(),
        }
    }
    #[test]
    fn biallelic_filter() {
        let variants = vec![
            variant(1, b"AC", &[0, 1, 1, 0]),
            variant(2, b"ACG", &[0, 1, 2, 0]),
            variant(3, b"ACG", &[0, 2, 2, 0]),
            variant(4, b"ACG", &[1, 1, 0, 0]),
            variant(5, b"A", &[0, 0, 0, 0]),
        ];
        let matrix = biallelic_matrix(&variants, 4).unwrap();
        assert_eq!(matrix.positions, vec![1, 4]);
        assert_eq!(matrix.rows[1], vec![1, 1, 0, 0]);
    }
    #[test]
    fn width_mismatch() {
        let variants = vec![variant(1, b"AC", &[0, 1, 1])];
        match biallelic_matrix(&variants, 4) {
            Err(FigureError::WidthMismatch { found, expected }) => {
                assert_eq!((found, expected), (3, 4))
            }
            other => panic!("{:?}", other),
        }
    }
    #[test]
    fn maf() {
        assert!((minor_allele_frequency(&[0, 1, 1, 1], 4) - 0.25).abs() < 1e-12);
        assert!((minor_allele_frequency(&[0, 1, 1, 0], 4) - 0.5).abs() < 1e-12);
        assert_eq!(minor_allele_frequency(&[0, 0, 0, 0], 4), 0f64);
    }
    #[test]
    fn top_maf_is_stable_and_descending() {
        let rows = vec![
            vec![1, 0, 0, 0],
            vec![1, 1, 0, 0],
            vec![1, 1, 1, 0],
            vec![0, 1, 1, 0],
            vec![1, 0, 0, 0],
        ];
        let matrix = GenotypeMatrix {
            num_samples: 4,
            positions: vec![10, 20, 30, 40, 50],
            rows,
        };
        let selected = matrix.select_top_maf(&SelectionConfig::new(4)).unwrap();
        assert_eq!(selected.positions, vec![20, 40, 10, 30]);
        assert_eq!(selected.maf, vec![0.5, 0.5, 0.25, 0.25]);
        assert_eq!(selected.num_rows(), 4);
        assert_eq!(selected.haplotypes[0], vec![1, 0, 1, 1]);
        assert_eq!(selected.haplotypes[3], vec![0, 0, 0, 0]);
    }
    #[test]
    fn too_few_sites() {
        let matrix = GenotypeMatrix {
            num_samples: 2,
            positions: vec![1],
            rows: vec![vec![0, 1]],
        };
        match matrix.select_top_maf(&SelectionConfig::new(20)) {
            Err(FigureError::TooFewSites { found, required }) => {
                assert_eq!((found, required), (1, 20))
            }
            other => panic!("{:?}", other),
        }
    }
}
