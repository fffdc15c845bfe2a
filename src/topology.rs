//! A cost model for the physical interconnect, used by [`crate::qap`] to
//! judge how good a given rank assignment is.
//!
//! `TopologyMatrix` is ported from `Laik_TopologyMatrix`
//! (`topology/topology.c`): an n×n matrix of inter-node distances. The
//! SuperMUC-NG probe (`laik_top_Topology_from_sng`) parses `iNNrNNcNNsNN`
//! location strings and derives distances from how many leading segments two
//! locations share. Only the "global matrix" loop from the original is
//! ported — the commented-out "local matrix" block computed the same thing
//! relative to a single node and was dead code there too.

/// Per-hop-count weights for the SuperMUC-NG probe, in order of
/// increasing locality: same rack, same cell, same row, same island, other.
const HOP_WEIGHTS: [u64; 5] = [2, 10, 10, 10, 40];

/// A physical cost matrix between locations.
#[derive(Clone)]
pub struct TopologyMatrix {
    nodecount: usize,
    matrix: Vec<u64>,
}

impl TopologyMatrix {
    pub fn new(nodecount: usize) -> Self {
        TopologyMatrix {
            nodecount,
            matrix: vec![0u64; nodecount * nodecount],
        }
    }

    pub fn nodecount(&self) -> usize {
        self.nodecount
    }

    fn idx(&self, a: usize, b: usize) -> usize {
        a * self.nodecount + b
    }

    pub fn get(&self, a: usize, b: usize) -> u64 {
        self.matrix[self.idx(a, b)]
    }

    pub fn set(&mut self, a: usize, b: usize, weight: u64) {
        let ia = self.idx(a, b);
        let ib = self.idx(b, a);
        self.matrix[ia] = weight;
        self.matrix[ib] = weight;
    }

    /// Build a topology matrix from per-task location strings using the
    /// SuperMUC-NG `iNNrNNcNNsNN` probe, or `None` if any location doesn't
    /// conform to that format.
    pub fn from_sng_locations(locations: &[String]) -> Option<TopologyMatrix> {
        for loc in locations {
            if loc.len() < 10
                || loc.as_bytes()[0] != b'i'
                || loc.as_bytes()[3] != b'r'
                || loc.as_bytes()[6] != b'c'
                || loc.as_bytes()[9] != b's'
            {
                return None;
            }
        }

        let n = locations.len();
        let mut mat = TopologyMatrix::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let shared = common_prefix_len(&locations[i], &locations[j]);
                let weight = match shared {
                    0..=2 => HOP_WEIGHTS[4],
                    3..=5 => HOP_WEIGHTS[3],
                    6..=8 => HOP_WEIGHTS[2],
                    9..=11 => HOP_WEIGHTS[1],
                    12 => HOP_WEIGHTS[0],
                    _ => 0,
                };
                mat.set(i, j, weight);
            }
        }
        Some(mat)
    }
}

/// The length of the shared leading substring of `a` and `b`.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}

/// The full topology: either a dense cost matrix or a graph. QAP remapping
/// (§ [`crate::qap`]) only operates on the matrix variant; a graph topology
/// makes the remapper report `None` rather than attempting a cost
/// computation it isn't built to do.
pub enum Topology {
    Matrix(TopologyMatrix),
    Graph,
}

impl Topology {
    pub fn as_matrix(&self) -> Option<&TopologyMatrix> {
        match self {
            Topology::Matrix(m) => Some(m),
            Topology::Graph => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_conforming_locations() {
        let locs = vec!["i01r02c03s04".to_string(), "notaloc".to_string()];
        assert!(TopologyMatrix::from_sng_locations(&locs).is_none());
    }

    #[test]
    fn identical_prefixes_yield_lowest_weight() {
        let locs = vec!["i01r02c03s04".to_string(), "i01r02c03s05".to_string()];
        let mat = TopologyMatrix::from_sng_locations(&locs).unwrap();
        assert_eq!(mat.get(0, 1), HOP_WEIGHTS[0]);
        assert_eq!(mat.get(1, 0), HOP_WEIGHTS[0]);
    }

    #[test]
    fn disjoint_islands_yield_highest_weight() {
        let locs = vec!["i01r02c03s04".to_string(), "i99r88c77s66".to_string()];
        let mat = TopologyMatrix::from_sng_locations(&locs).unwrap();
        assert_eq!(mat.get(0, 1), HOP_WEIGHTS[4]);
    }

    #[test]
    fn matrix_is_symmetric_and_zero_diagonal() {
        let locs = vec![
            "i01r02c03s04".to_string(),
            "i01r02c03s09".to_string(),
            "i01r09c01s01".to_string(),
        ];
        let mat = TopologyMatrix::from_sng_locations(&locs).unwrap();
        for a in 0..3 {
            assert_eq!(mat.get(a, a), 0);
            for b in 0..3 {
                assert_eq!(mat.get(a, b), mat.get(b, a));
            }
        }
    }

    #[test]
    fn graph_topology_has_no_matrix_view() {
        assert!(Topology::Graph.as_matrix().is_none());
    }
}
