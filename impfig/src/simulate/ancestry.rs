//! Hudson's coalescent with recombination on a discrete genome.
use super::AncestryConfig;
use crate::errors::{FigureError, Result};
use definitions::{Edge, Node, TreeSequence};
use log::*;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    left: u64,
    right: u64,
    node: usize,
}

/// Ancestral material carried by one lineage, sorted and non-overlapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Lineage {
    segments: Vec<Segment>,
}

impl Lineage {
    /// Number of recombination points between the first and the last ancestral base.
    fn links(&self) -> u64 {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => last.right - first.left - 1,
            _ => 0,
        }
    }
    fn leftmost(&self) -> u64 {
        self.segments.first().map(|s| s.left).unwrap_or(0)
    }
    fn covering(&self, position: u64) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| s.left <= position && position < s.right)
    }
    /// Split into the material left of `breakpoint` and the material right of it.
    fn split_at(self, breakpoint: u64) -> (Lineage, Lineage) {
        let (mut left, mut right) = (vec![], vec![]);
        for seg in self.segments {
            if seg.right <= breakpoint {
                left.push(seg);
            } else if breakpoint <= seg.left {
                right.push(seg);
            } else {
                left.push(Segment {
                    right: breakpoint,
                    ..seg
                });
                right.push(Segment {
                    left: breakpoint,
                    ..seg
                });
            }
        }
        (Lineage { segments: left }, Lineage { segments: right })
    }
}

/// How many extant lineages carry each interval. Key -> count over `[key, next key)`.
#[derive(Debug, Clone)]
struct AncestralCount {
    counts: BTreeMap<u64, usize>,
}

impl AncestralCount {
    fn new(num_samples: usize, sequence_length: u64) -> Self {
        let mut counts = BTreeMap::new();
        counts.insert(0, num_samples);
        counts.insert(sequence_length, 0);
        Self { counts }
    }
    fn split(&mut self, position: u64) {
        if !self.counts.contains_key(&position) {
            let count = self
                .counts
                .range(..position)
                .next_back()
                .map(|(_, &c)| c)
                .unwrap_or(0);
            self.counts.insert(position, count);
        }
    }
    fn breakpoints(&self, start: u64, end: u64) -> impl Iterator<Item = u64> + '_ {
        self.counts.range(start..=end).map(|(&k, _)| k)
    }
    /// Decrement the count of `[left, right)`, which must lie inside one interval of the map.
    /// Return the new count.
    fn decrement(&mut self, left: u64, right: u64) -> usize {
        self.split(left);
        self.split(right);
        match self.counts.get_mut(&left) {
            Some(count) => {
                *count = count.saturating_sub(1);
                if *count == 1 {
                    *count = 0;
                    1
                } else {
                    *count
                }
            }
            None => 0,
        }
    }
}

struct Simulator {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    lineages: Vec<Lineage>,
    counts: AncestralCount,
    coalescence: usize,
    recombination: usize,
}

impl Simulator {
    fn new(num_samples: usize, sequence_length: u64) -> Self {
        let nodes = vec![
            Node {
                time: 0f64,
                is_sample: true,
            };
            num_samples
        ];
        let lineages = (0..num_samples)
            .map(|node| Lineage {
                segments: vec![Segment {
                    left: 0,
                    right: sequence_length,
                    node,
                }],
            })
            .collect();
        Self {
            nodes,
            edges: vec![],
            lineages,
            counts: AncestralCount::new(num_samples, sequence_length),
            coalescence: 0,
            recombination: 0,
        }
    }
    fn recombine(&mut self, mut target: u64) {
        let idx = self
            .lineages
            .iter()
            .position(|lineage| {
                let links = lineage.links();
                if target < links {
                    true
                } else {
                    target -= links;
                    false
                }
            })
            .unwrap_or(self.lineages.len() - 1);
        let lineage = self.lineages.remove(idx);
        let breakpoint = lineage.leftmost() + 1 + target;
        let (left, right) = lineage.split_at(breakpoint);
        self.lineages.push(left);
        self.lineages.push(right);
        self.recombination += 1;
    }
    fn coalesce(&mut self, i: usize, j: usize, time: f64) {
        let (i, j) = (i.min(j), i.max(j));
        let b = self.lineages.remove(j);
        let a = self.lineages.remove(i);
        let start = a.leftmost().min(b.leftmost());
        let end = a
            .segments
            .iter()
            .chain(b.segments.iter())
            .map(|s| s.right)
            .max()
            .unwrap_or(start);
        let mut breakpoints: Vec<u64> = a
            .segments
            .iter()
            .chain(b.segments.iter())
            .flat_map(|s| [s.left, s.right])
            .chain(self.counts.breakpoints(start, end))
            .collect();
        breakpoints.sort_unstable();
        breakpoints.dedup();
        let mut parent = None;
        let mut merged: Vec<Segment> = vec![];
        for window in breakpoints.windows(2) {
            let (left, right) = (window[0], window[1]);
            let segment = match (a.covering(left), b.covering(left)) {
                (Some(x), Some(y)) => {
                    let (x, y) = (x.node, y.node);
                    let p = match parent {
                        Some(p) => p,
                        None => {
                            self.nodes.push(Node {
                                time,
                                is_sample: false,
                            });
                            parent = Some(self.nodes.len() - 1);
                            self.nodes.len() - 1
                        }
                    };
                    for child in [x, y] {
                        self.edges.push(Edge {
                            left,
                            right,
                            parent: p,
                            child,
                        });
                    }
                    match self.counts.decrement(left, right) {
                        1 => None,
                        _ => Some(Segment {
                            left,
                            right,
                            node: p,
                        }),
                    }
                }
                (Some(x), None) | (None, Some(x)) => Some(Segment { left, right, ..*x }),
                (None, None) => None,
            };
            if let Some(seg) = segment {
                match merged.last_mut() {
                    Some(last) if last.right == seg.left && last.node == seg.node => {
                        last.right = seg.right
                    }
                    _ => merged.push(seg),
                }
            }
        }
        if !merged.is_empty() {
            self.lineages.push(Lineage { segments: merged });
        }
        self.coalescence += 1;
    }
    /// Merge abutting edges and sort them by parent time.
    fn finalize(self, sequence_length: u64) -> TreeSequence {
        let Simulator {
            nodes, mut edges, ..
        } = self;
        edges.sort_by_key(|e| (e.parent, e.child, e.left));
        let mut squashed: Vec<Edge> = Vec::with_capacity(edges.len());
        for edge in edges {
            match squashed.last_mut() {
                Some(last)
                    if last.parent == edge.parent
                        && last.child == edge.child
                        && last.right == edge.left =>
                {
                    last.right = edge.right
                }
                _ => squashed.push(edge),
            }
        }
        squashed.sort_by(|a, b| {
            let (ta, tb) = (nodes[a.parent].time, nodes[b.parent].time);
            ta.total_cmp(&tb)
                .then(a.parent.cmp(&b.parent))
                .then(a.child.cmp(&b.child))
                .then(a.left.cmp(&b.left))
        });
        TreeSequence {
            sequence_length,
            nodes,
            edges: squashed,
            sites: vec![],
            mutations: vec![],
        }
    }
}

fn validate(config: &AncestryConfig) -> Result<()> {
    if config.num_samples == 0 {
        return Err(FigureError::ConfigError("num_samples must be positive".into()));
    }
    if config.sequence_length == 0 {
        return Err(FigureError::ConfigError(
            "sequence_length must be positive".into(),
        ));
    }
    if !config.population_size.is_finite() || config.population_size <= 0f64 {
        return Err(FigureError::ConfigError(format!(
            "population_size must be positive, got {}",
            config.population_size
        )));
    }
    if !config.recombination_rate.is_finite() || config.recombination_rate < 0f64 {
        return Err(FigureError::ConfigError(format!(
            "recombination_rate must be non-negative, got {}",
            config.recombination_rate
        )));
    }
    Ok(())
}

/// Simulate the genealogy of `num_samples` haploid genomes in a population of constant size.
pub fn simulate_ancestry(config: &AncestryConfig) -> Result<TreeSequence> {
    validate(config)?;
    let mut rng: Xoshiro256PlusPlus = SeedableRng::seed_from_u64(config.seed);
    let mut sim = Simulator::new(config.num_samples, config.sequence_length);
    let mut time = 0f64;
    while 1 < sim.lineages.len() {
        let k = sim.lineages.len();
        let coal_rate = (k * (k - 1) / 2) as f64 / config.population_size;
        let total_links: u64 = sim.lineages.iter().map(Lineage::links).sum();
        let rec_rate = config.recombination_rate * total_links as f64;
        let total_rate = coal_rate + rec_rate;
        let waiting = Exp::new(total_rate)
            .map_err(|why| FigureError::ConfigError(format!("{why:?}")))?
            .sample(&mut rng);
        time += waiting;
        if 0 < total_links && rng.gen::<f64>() * total_rate < rec_rate {
            sim.recombine(rng.gen_range(0..total_links));
        } else {
            let pair = rand::seq::index::sample(&mut rng, k, 2);
            sim.coalesce(pair.index(0), pair.index(1), time);
        }
    }
    debug!(
        "SIMULATE\tEvents\t{}\t{}",
        sim.coalescence, sim.recombination
    );
    let ts = sim.finalize(config.sequence_length);
    debug!(
        "SIMULATE\tNodes\t{}\tEdges\t{}\tTrees\t{}",
        ts.nodes.len(),
        ts.edges.len(),
        ts.num_trees()
    );
    Ok(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    fn roots_at(ts: &TreeSequence, position: u64) -> Vec<usize> {
        let parents = ts.parents_at(position);
        let mut roots: Vec<_> = ts
            .samples()
            .into_iter()
            .map(|mut u| {
                while let Some(p) = parents[u] {
                    u = p;
                }
                u
            })
            .collect();
        roots.sort_unstable();
        roots.dedup();
        roots
    }
    #[test]
    fn split_lineage() {
        let lineage = Lineage {
            segments: vec![
                Segment {
                    left: 0,
                    right: 10,
                    node: 0,
                },
                Segment {
                    left: 20,
                    right: 30,
                    node: 1,
                },
            ],
        };
        assert_eq!(lineage.links(), 29);
        let (left, right) = lineage.clone().split_at(5);
        assert_eq!(left.segments.len(), 1);
        assert_eq!(left.segments[0].right, 5);
        assert_eq!(right.segments.len(), 2);
        assert_eq!(right.segments[0].left, 5);
        let (left, right) = lineage.split_at(15);
        assert_eq!(left.segments.len(), 1);
        assert_eq!(right.segments.len(), 1);
        assert_eq!(right.segments[0].left, 20);
    }
    #[test]
    fn count_decrement() {
        let mut counts = AncestralCount::new(3, 100);
        assert_eq!(counts.decrement(10, 20), 2);
        assert_eq!(counts.decrement(10, 20), 1);
        let keys: Vec<_> = counts.breakpoints(0, 100).collect();
        assert_eq!(keys, vec![0, 10, 20, 100]);
        assert_eq!(counts.counts[&10], 0);
        assert_eq!(counts.counts[&20], 3);
    }
    #[test]
    fn single_tree_without_recombination() {
        let config = AncestryConfig::new(8, 1_000, 100f64, 0f64, 4);
        let ts = simulate_ancestry(&config).unwrap();
        assert_eq!(ts.num_samples(), 8);
        assert_eq!(ts.num_trees(), 1);
        // Binary tree: n - 1 internal nodes, 2(n - 1) edges.
        assert_eq!(ts.nodes.len(), 15);
        assert_eq!(ts.edges.len(), 14);
        assert_eq!(roots_at(&ts, 0).len(), 1);
    }
    #[test]
    fn every_tree_has_one_root() {
        let config = AncestryConfig::new(10, 10_000, 1_000f64, 1e-6, 42);
        let ts = simulate_ancestry(&config).unwrap();
        assert!(1 < ts.num_trees());
        for edge in ts.edges.iter() {
            assert!(ts.nodes[edge.child].time < ts.nodes[edge.parent].time);
            assert!(edge.left < edge.right && edge.right <= ts.sequence_length);
            assert_eq!(roots_at(&ts, edge.left).len(), 1);
        }
    }
    #[test]
    fn reproducible() {
        let config = AncestryConfig::new(6, 5_000, 500f64, 1e-6, 7);
        let ts1 = simulate_ancestry(&config).unwrap();
        let ts2 = simulate_ancestry(&config).unwrap();
        assert_eq!(ts1.edges, ts2.edges);
        assert_eq!(ts1.nodes, ts2.nodes);
    }
    #[test]
    fn invalid_config() {
        let config = AncestryConfig::new(0, 5_000, 500f64, 1e-6, 7);
        assert!(simulate_ancestry(&config).is_err());
        let config = AncestryConfig::new(4, 5_000, 0f64, 1e-6, 7);
        assert!(simulate_ancestry(&config).is_err());
        let config = AncestryConfig::new(4, 5_000, 10f64, -1f64, 7);
        assert!(simulate_ancestry(&config).is_err());
    }
}
