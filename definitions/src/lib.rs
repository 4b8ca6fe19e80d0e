//! Definitions -- A tiny interface for the imputation figure.
//! Every stage of the figure pipeline passes one of the plain structures below to the next one.
//! They are all serde-ready so that any intermediate can be dumped as JSON.

use serde::{Deserialize, Serialize};

/// The placeholder for an unobserved genotype call.
pub const MISSING: u8 = b'?';

/// The four nucleotides, in the order used to encode allelic states.
pub const NUCLEOTIDES: [u8; 4] = *b"ACGT";

/// Tables of a simulated genealogy.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TreeSequence {
    pub sequence_length: u64,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub sites: Vec<Site>,
    pub mutations: Vec<Mutation>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Time in generations before present.
    pub time: f64,
    pub is_sample: bool,
}

/// `parent` is the parent of `child` over the half-open interval `[left, right)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Edge {
    pub left: u64,
    pub right: u64,
    pub parent: usize,
    pub child: usize,
}

impl Edge {
    pub fn span(&self) -> u64 {
        self.right - self.left
    }
    pub fn contains(&self, position: u64) -> bool {
        self.left <= position && position < self.right
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Site {
    pub position: u64,
    /// One of A,C,G,T.
    pub ancestral_state: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Mutation {
    /// Index into the site table.
    pub site: usize,
    /// The mutation sits on the branch above this node.
    pub node: usize,
    pub time: f64,
    pub derived_state: u8,
}

impl TreeSequence {
    pub fn num_samples(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_sample).count()
    }
    /// Sample node ids, in the order they were created.
    pub fn samples(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, n)| n.is_sample.then_some(idx))
            .collect()
    }
    /// The parent of each node in the marginal tree at `position`.
    pub fn parents_at(&self, position: u64) -> Vec<Option<usize>> {
        let mut parents = vec![None; self.nodes.len()];
        for edge in self.edges.iter().filter(|e| e.contains(position)) {
            parents[edge.child] = Some(edge.parent);
        }
        parents
    }
    /// Number of marginal trees, i.e., distinct intervals between edge breakpoints.
    pub fn num_trees(&self) -> usize {
        let mut breakpoints: Vec<_> = self
            .edges
            .iter()
            .flat_map(|e| [e.left, e.right])
            .chain([0, self.sequence_length])
            .collect();
        breakpoints.sort_unstable();
        breakpoints.dedup();
        breakpoints.len().saturating_sub(1)
    }
}

/// Genotypes of all samples at one site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variant {
    pub position: u64,
    /// The ancestral allele first, then derived alleles in order of first appearance.
    pub alleles: Vec<u8>,
    /// Index into `alleles`, one per sample.
    pub genotypes: Vec<u8>,
}

/// Biallelic 0/1 sites. Rows are sites, columns are haploid samples.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenotypeMatrix {
    pub num_samples: usize,
    pub positions: Vec<u64>,
    pub rows: Vec<Vec<u8>>,
}

impl GenotypeMatrix {
    pub fn num_sites(&self) -> usize {
        self.rows.len()
    }
}

/// The highest-MAF sites, transposed. Rows are haplotypes, columns are sites.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SelectedSites {
    pub positions: Vec<u64>,
    pub maf: Vec<f64>,
    pub haplotypes: Vec<Vec<u8>>,
}

impl SelectedSites {
    pub fn num_rows(&self) -> usize {
        self.haplotypes.len()
    }
    pub fn num_columns(&self) -> usize {
        self.maf.len()
    }
}

/// An unordered pair of bases assigned to a column. 0 is the first base, 1 the second.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BasePair {
    AT,
    AC,
    AG,
    CG,
    CT,
    GT,
}

impl BasePair {
    pub const ALL: [BasePair; 6] = [
        BasePair::AT,
        BasePair::AC,
        BasePair::AG,
        BasePair::CG,
        BasePair::CT,
        BasePair::GT,
    ];
    pub fn bases(&self) -> (u8, u8) {
        match self {
            BasePair::AT => (b'A', b'T'),
            BasePair::AC => (b'A', b'C'),
            BasePair::AG => (b'A', b'G'),
            BasePair::CG => (b'C', b'G'),
            BasePair::CT => (b'C', b'T'),
            BasePair::GT => (b'G', b'T'),
        }
    }
    pub fn letter(&self, genotype: u8) -> u8 {
        let (first, second) = self.bases();
        match genotype {
            0 => first,
            _ => second,
        }
    }
}

impl std::fmt::Display for BasePair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (first, second) = self.bases();
        write!(f, "{} vs {}", first as char, second as char)
    }
}

/// A matrix of nucleotide letters, possibly with [MISSING] cells.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AlleleMatrix {
    pub rows: Vec<Vec<u8>>,
}

impl AlleleMatrix {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
    pub fn num_columns(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }
    pub fn row_string(&self, row: usize) -> String {
        String::from_utf8_lossy(&self.rows[row]).to_string()
    }
    pub fn missing_in_row(&self, row: usize) -> usize {
        self.rows[row].iter().filter(|&&x| x == MISSING).count()
    }
    pub fn missing_count(&self) -> usize {
        (0..self.num_rows()).map(|i| self.missing_in_row(i)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn base_pair_letters() {
        assert_eq!(BasePair::CT.letter(0), b'C');
        assert_eq!(BasePair::CT.letter(1), b'T');
        assert_eq!(format!("{}", BasePair::AG), "A vs G");
    }
    #[test]
    fn num_trees() {
        let node = Node {
            time: 0f64,
            is_sample: true,
        };
        let ts = TreeSequence {
            sequence_length: 100,
            nodes: vec![node; 3],
            edges: vec![
                Edge {
                    left: 0,
                    right: 40,
                    parent: 2,
                    child: 0,
                },
                Edge {
                    left: 0,
                    right: 100,
                    parent: 2,
                    child: 1,
                },
            ],
            ..Default::default()
        };
        assert_eq!(ts.num_trees(), 2);
        assert_eq!(ts.parents_at(10), vec![Some(2), Some(2), None]);
        assert_eq!(ts.parents_at(40), vec![None, Some(2), None]);
    }
    #[test]
    fn missing_counts() {
        let m = AlleleMatrix {
            rows: vec![b"A?C".to_vec(), b"??T".to_vec()],
        };
        assert_eq!(m.num_columns(), 3);
        assert_eq!(m.missing_in_row(1), 2);
        assert_eq!(m.missing_count(), 3);
        assert_eq!(m.row_string(0), "A?C");
    }
}
