//! Three ways of hiding genotype calls. Rows below `reference_rows` are the target block.
use crate::errors::{FigureError, Result};
use definitions::{AlleleMatrix, MISSING};
use log::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MaskingConfig {
    /// Rows `0..reference_rows` form the reference panel.
    pub reference_rows: usize,
    /// Columns typed by the SNP chip in the target block.
    pub known_columns: usize,
    /// Fraction of cells hidden in a low-coverage row.
    pub missing_fraction: f64,
}

impl MaskingConfig {
    pub fn new(reference_rows: usize, known_columns: usize, missing_fraction: f64) -> Self {
        Self {
            reference_rows,
            known_columns,
            missing_fraction,
        }
    }
    pub fn validate(&self, rows: usize, columns: usize) -> Result<()> {
        if rows < self.reference_rows {
            return Err(FigureError::ConfigError(format!(
                "reference_rows ({}) exceeds the number of haplotypes ({})",
                self.reference_rows, rows
            )));
        }
        if columns < self.known_columns {
            return Err(FigureError::ConfigError(format!(
                "known_columns ({}) exceeds the number of sites ({})",
                self.known_columns, columns
            )));
        }
        if !(0f64..=1f64).contains(&self.missing_fraction) {
            return Err(FigureError::ConfigError(format!(
                "missing_fraction must be in [0,1], got {}",
                self.missing_fraction
            )));
        }
        Ok(())
    }
    /// ceil(missing_fraction * columns).
    pub fn masked_per_row(&self, columns: usize) -> usize {
        let masked = (self.missing_fraction * columns as f64).ceil() as usize;
        masked.min(columns)
    }
}

/// Overwrite `masked_per_row` distinct, uniformly chosen cells of each row in `rows`.
fn mask_rows_at_random<R: Rng>(
    rng: &mut R,
    matrix: &AlleleMatrix,
    rows: std::ops::Range<usize>,
    masked_per_row: usize,
) -> AlleleMatrix {
    let mut masked = matrix.clone();
    let columns = matrix.num_columns();
    for row in rows {
        for col in rand::seq::index::sample(rng, columns, masked_per_row).into_iter() {
            masked.rows[row][col] = MISSING;
        }
    }
    masked
}

pub trait Masking {
    /// Case 1: target rows keep `known_columns` random columns and lose the rest.
    /// Returns the kept columns in draw order as well.
    fn mask_snp_chip<R: Rng>(
        &self,
        rng: &mut R,
        config: &MaskingConfig,
    ) -> (AlleleMatrix, Vec<usize>);
    /// Case 2: each target row loses its own random subset of columns.
    fn mask_low_coverage<R: Rng>(&self, rng: &mut R, config: &MaskingConfig) -> AlleleMatrix;
    /// Case 3: as Case 2, but on every row.
    fn mask_everywhere<R: Rng>(&self, rng: &mut R, config: &MaskingConfig) -> AlleleMatrix;
}

impl Masking for AlleleMatrix {
    fn mask_snp_chip<R: Rng>(
        &self,
        rng: &mut R,
        config: &MaskingConfig,
    ) -> (AlleleMatrix, Vec<usize>) {
        let columns = self.num_columns();
        let keep = rand::seq::index::sample(rng, columns, config.known_columns).into_vec();
        let mut masked = self.clone();
        for row in masked.rows.iter_mut().skip(config.reference_rows) {
            for (col, cell) in row.iter_mut().enumerate() {
                if !keep.contains(&col) {
                    *cell = MISSING;
                }
            }
        }
        debug!("MASK\tSnpChip\t{:?}", keep);
        (masked, keep)
    }
    fn mask_low_coverage<R: Rng>(&self, rng: &mut R, config: &MaskingConfig) -> AlleleMatrix {
        let per_row = config.masked_per_row(self.num_columns());
        let target = config.reference_rows..self.num_rows();
        let masked = mask_rows_at_random(rng, self, target, per_row);
        debug!("MASK\tLowCoverage\t{}", masked.missing_count());
        masked
    }
    fn mask_everywhere<R: Rng>(&self, rng: &mut R, config: &MaskingConfig) -> AlleleMatrix {
        let per_row = config.masked_per_row(self.num_columns());
        let masked = mask_rows_at_random(rng, self, 0..self.num_rows(), per_row);
        debug!("MASK\tEverywhere\t{}", masked.missing_count());
        masked
    }
}
