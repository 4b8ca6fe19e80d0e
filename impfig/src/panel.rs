//! Text rendering of the allele matrices.
use definitions::{AlleleMatrix, BasePair};

pub const FIGURE_TITLE: &str = "IMPUTATION METHODS FIGURE (coalescent simulation)";

/// One line per row. The row at `reference_rows - 1` is followed by a blank line.
pub fn format_panel(matrix: &AlleleMatrix, reference_rows: usize) -> Vec<String> {
    (0..matrix.num_rows())
        .map(|i| {
            let row = matrix.row_string(i);
            if i + 1 == reference_rows {
                row + "\n"
            } else {
                row
            }
        })
        .collect()
}

fn underline(title: &str) -> String {
    "=".repeat(title.chars().count())
}

/// Titles of Case 0 to Case 3.
pub fn case_titles(num_sites: usize, known_columns: usize, missing_fraction: f64) -> [String; 4] {
    [
        format!("CASE 0: Complete Genotype Data (Top-{num_sites} MAF SNPs)"),
        format!(
            "CASE 1: Reference Panel + SNP Chip ({known_columns} columns known in lower panel)"
        ),
        format!(
            "CASE 2: Reference Panel + Low Coverage Sequencing ({:.1}X)",
            1f64 - missing_fraction
        ),
        format!(
            "CASE 3: All Individuals with {:.0}% Missing Data (no reference)",
            missing_fraction * 100f64
        ),
    ]
}

/// The whole text artifact: a figure header, then every panel under its own title.
pub fn render_document(panels: &[(&str, &AlleleMatrix)], reference_rows: usize) -> String {
    let mut lines = vec![
        FIGURE_TITLE.to_string(),
        underline(FIGURE_TITLE),
        String::new(),
    ];
    for (i, (title, matrix)) in panels.iter().enumerate() {
        lines.push(title.to_string());
        lines.push(underline(title));
        lines.extend(format_panel(matrix, reference_rows));
        if i + 1 < panels.len() {
            lines.push(String::new());
        }
    }
    lines.join("\n") + "\n"
}

/// `Col 01: A vs T (MAF=0.50)` for each column.
pub fn summary_lines(pairs: &[BasePair], maf: &[f64]) -> Vec<String> {
    pairs
        .iter()
        .zip(maf.iter())
        .enumerate()
        .map(|(j, (pair, maf))| format!("Col {:02}: {} (MAF={:.2})", j + 1, pair, maf))
        .collect()
}
