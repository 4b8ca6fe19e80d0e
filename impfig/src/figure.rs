//! The figure pipeline: simulate, select, encode, mask.
use crate::encode::{assign_base_pairs, Encode};
use crate::errors::Result;
use crate::extract::{biallelic_matrix, SelectVariants, SelectionConfig};
use crate::masking::{Masking, MaskingConfig};
use crate::panel;
use crate::simulate::{self, AncestryConfig, MutationConfig};
use definitions::{AlleleMatrix, BasePair};
use log::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// The configuration of the figure.
/// Every field has a default, so a profile only needs to list what it changes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FigureConfig {
    /// Number of haplotypes, i.e., rows of each panel.
    pub num_samples: usize,
    pub sequence_length: u64,
    pub population_size: f64,
    pub mutation_rate: f64,
    pub recombination_rate: f64,
    pub ancestry_seed: u64,
    pub mutation_seed: u64,
    /// Seed of the pair assignment and of all masking draws.
    pub figure_seed: u64,
    /// Number of columns of each panel.
    pub num_sites: usize,
    pub reference_rows: usize,
    pub known_columns: usize,
    pub missing_fraction: f64,
}

impl std::default::Default for FigureConfig {
    fn default() -> Self {
        Self {
            num_samples: 20,
            sequence_length: 200_000,
            population_size: 10_000f64,
            mutation_rate: 1e-8,
            recombination_rate: 1e-8,
            ancestry_seed: 20251010,
            mutation_seed: 20251011,
            figure_seed: 20251010,
            num_sites: 20,
            reference_rows: 10,
            known_columns: 6,
            missing_fraction: 0.8,
        }
    }
}

impl FigureConfig {
    pub fn ancestry(&self) -> AncestryConfig {
        AncestryConfig::new(
            self.num_samples,
            self.sequence_length,
            self.population_size,
            self.recombination_rate,
            self.ancestry_seed,
        )
    }
    pub fn mutation(&self) -> MutationConfig {
        MutationConfig::new(self.mutation_rate, self.mutation_seed)
    }
    pub fn masking(&self) -> MaskingConfig {
        MaskingConfig::new(self.reference_rows, self.known_columns, self.missing_fraction)
    }
}

/// Everything the figure shows, plus the parameters that produced it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Figure {
    pub config: FigureConfig,
    pub positions: Vec<u64>,
    pub maf: Vec<f64>,
    pub pairs: Vec<BasePair>,
    /// Columns kept in the target block of Case 1.
    pub known_columns: Vec<usize>,
    pub complete: AlleleMatrix,
    pub snp_chip: AlleleMatrix,
    pub low_coverage: AlleleMatrix,
    pub no_reference: AlleleMatrix,
}

impl Figure {
    pub fn generate(config: &FigureConfig) -> Result<Self> {
        config
            .masking()
            .validate(config.num_samples, config.num_sites)?;
        let ts = simulate::simulate_ancestry(&config.ancestry())?;
        let ts = simulate::simulate_mutations(&ts, &config.mutation())?;
        let variants = simulate::variants(&ts);
        info!("FIGURE\tVariants\t{}", variants.len());
        let genotypes = biallelic_matrix(&variants, config.num_samples)?;
        let selected = genotypes.select_top_maf(&SelectionConfig::new(config.num_sites))?;
        let mut rng: Xoshiro256PlusPlus = SeedableRng::seed_from_u64(config.figure_seed);
        let pairs = assign_base_pairs(&mut rng, selected.num_columns());
        let complete = selected.encode(&pairs);
        let masking = config.masking();
        let (snp_chip, known_columns) = complete.mask_snp_chip(&mut rng, &masking);
        let low_coverage = complete.mask_low_coverage(&mut rng, &masking);
        let no_reference = complete.mask_everywhere(&mut rng, &masking);
        Ok(Self {
            config: config.clone(),
            positions: selected.positions,
            maf: selected.maf,
            pairs,
            known_columns,
            complete,
            snp_chip,
            low_coverage,
            no_reference,
        })
    }
    /// The four panels as one text document.
    pub fn render(&self) -> String {
        let c = &self.config;
        let titles = panel::case_titles(c.num_sites, c.known_columns, c.missing_fraction);
        let matrices = [
            &self.complete,
            &self.snp_chip,
            &self.low_coverage,
            &self.no_reference,
        ];
        let panels: Vec<(&str, &AlleleMatrix)> = titles
            .iter()
            .map(|t| t.as_str())
            .zip(matrices.iter().copied())
            .collect();
        panel::render_document(&panels, c.reference_rows)
    }
    pub fn summary(&self) -> Vec<String> {
        panel::summary_lines(&self.pairs, &self.maf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FigureError;
    #[test]
    fn profile_defaults() {
        let config: FigureConfig = toml::from_str("num_sites = 12\nfigure_seed = 3").unwrap();
        assert_eq!(config.num_sites, 12);
        assert_eq!(config.figure_seed, 3);
        assert_eq!(config.num_samples, 20);
        assert_eq!(config.sequence_length, 200_000);
    }
    #[test]
    fn tiny_region_has_too_few_sites() {
        let config = FigureConfig {
            sequence_length: 100,
            ..Default::default()
        };
        match Figure::generate(&config) {
            Err(FigureError::TooFewSites { required, .. }) => assert_eq!(required, 20),
            other => panic!("{:?}", other.map(|f| f.pairs)),
        }
    }
    #[test]
    fn invalid_masking() {
        let config = FigureConfig {
            known_columns: 30,
            ..Default::default()
        };
        assert!(matches!(
            Figure::generate(&config),
            Err(FigureError::ConfigError(_))
        ));
    }
}
