use itertools::Itertools;

use crate::evidence::Evidence;


/// Weighted conflict graph over evidenced contigs: two contigs are connected
/// iff they share at least one aligned protein, and the edge weight is the
/// number of shared proteins. Contigs sharing proteins are likely allelic
/// copies, so the optimizer is penalized for placing them on the same
/// haplotype.
///
/// The graph carries the contig declaration order explicitly; encoding and
/// decoding both index into it, so an order mismatch between the two is
/// structurally impossible.
pub struct ConflictGraph {
    contigs: Vec<String>,
    edges: Vec<(usize, usize, u64)>,
}


impl ConflictGraph {

    /// Builds the graph by intersecting the protein sets of every unordered
    /// pair of evidenced contigs. Quadratic in the number of evidenced
    /// contigs, which is inherent to the pairwise model.
    pub fn from_evidence(evidence: &Evidence) -> ConflictGraph {
        let mut edges = Vec::new();
        for (i, j) in (0..evidence.len()).tuple_combinations() {
            let shared = evidence.protein_set(i)
                .intersection(evidence.protein_set(j))
                .count() as u64;
            if shared > 0 {
                edges.push((i, j, shared));
            }
        }
        ConflictGraph { contigs: evidence.contigs().to_vec(), edges }
    }

    /// Number of vertices (evidenced contigs).
    pub fn order(&self) -> usize {
        self.contigs.len()
    }

    /// Number of edges.
    pub fn size(&self) -> usize {
        self.edges.len()
    }

    /// Contig names in declaration order.
    pub fn contigs(&self) -> &[String] {
        &self.contigs
    }

    /// Edges as `(i, j, weight)` with `i < j` and `weight > 0`.
    pub fn edges(&self) -> &[(usize, usize, u64)] {
        &self.edges
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::ProteinAlignment;
    use std::str::FromStr;

    fn evidence_from(hits: &[(&str, &str)]) -> Evidence {
        let records = hits.iter().map(|(protein, contig)| {
            let line = format!("{protein}\t100\t0\t100\t+\t{contig}\t5000\t100\t400\t90\t300\t60");
            ProteinAlignment::from_str(&line).unwrap()
        }).collect_vec();
        Evidence::from_alignments(&records)
    }

    #[test]
    fn shared_protein_counts() {
        // protA hits c1,c2 and protB hits c2,c3
        let evidence = evidence_from(&[
            ("protA", "c1"), ("protA", "c2"),
            ("protB", "c2"), ("protB", "c3"),
        ]);
        let graph = ConflictGraph::from_evidence(&evidence);
        assert_eq!(graph.contigs(), &["c1", "c2", "c3"]);
        assert_eq!(graph.edges(), &[(0, 1, 1), (1, 2, 1)]);
    }

    #[test]
    fn edges_are_canonical_and_irreflexive() {
        let evidence = evidence_from(&[
            ("protA", "c1"), ("protA", "c2"), ("protA", "c3"),
            ("protB", "c1"), ("protB", "c3"),
        ]);
        let graph = ConflictGraph::from_evidence(&evidence);
        for &(i, j, w) in graph.edges() {
            assert!(i < j);
            assert!(w > 0);
        }
        // each unordered pair appears at most once
        let pairs: ahash::AHashSet<(usize, usize)> = graph.edges().iter().map(|&(i, j, _)| (i, j)).collect();
        assert_eq!(pairs.len(), graph.size());
        // (c1,c3) share two proteins, the others one
        assert_eq!(graph.edges(), &[(0, 1, 1), (0, 2, 2), (1, 2, 1)]);
    }

    #[test]
    fn disjoint_evidence_yields_no_edges() {
        let evidence = evidence_from(&[("protA", "c1"), ("protB", "c2")]);
        let graph = ConflictGraph::from_evidence(&evidence);
        assert_eq!(graph.order(), 2);
        assert_eq!(graph.size(), 0);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let hits = [
            ("protA", "c2"), ("protA", "c1"),
            ("protB", "c1"), ("protB", "c3"), ("protC", "c2"), ("protC", "c3"),
        ];
        let first = ConflictGraph::from_evidence(&evidence_from(&hits));
        let second = ConflictGraph::from_evidence(&evidence_from(&hits));
        assert_eq!(first.contigs(), second.contigs());
        assert_eq!(first.edges(), second.edges());
    }
}
