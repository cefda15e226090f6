//! Node deduplication and focal classification

use citescope_common::models::{CitationEdge, GraphPayload, PaperNode};
use std::collections::HashSet;
use tracing::debug;

/// Deduplicated neighbourhood around one focal paper
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGraph {
    /// Unique nodes in first-seen order
    pub nodes: Vec<PaperNode>,

    /// Edges exactly as received, dangling endpoints included
    pub edges: Vec<CitationEdge>,

    /// Id of the requested paper
    pub focal_id: String,

    /// Number of later duplicates that were dropped
    pub duplicates_dropped: usize,
}

impl NormalizedGraph {
    /// Whether `node` is the focal paper
    pub fn is_focal(&self, node: &PaperNode) -> bool {
        node.id == self.focal_id
    }

    /// Whether the focal paper is among the nodes
    pub fn contains_focal(&self) -> bool {
        self.nodes.iter().any(|n| self.is_focal(n))
    }

    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&PaperNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Number of nodes other than the focal one
    pub fn neighbour_count(&self) -> usize {
        self.nodes.iter().filter(|n| !self.is_focal(n)).count()
    }
}

/// Drop duplicate node ids (first occurrence wins) and record the focal id.
///
/// Total over its input: never fails, never inspects edges.
pub fn normalize(payload: GraphPayload, focal_id: &str) -> NormalizedGraph {
    let GraphPayload { nodes: raw, edges } = payload;
    let raw_len = raw.len();

    let mut seen: HashSet<String> = HashSet::with_capacity(raw_len);
    let mut nodes = Vec::with_capacity(raw_len);

    for node in raw {
        if seen.insert(node.id.clone()) {
            nodes.push(node);
        }
    }

    let duplicates_dropped = raw_len - nodes.len();
    if duplicates_dropped > 0 {
        debug!(focal_id, duplicates_dropped, "Dropped duplicate graph nodes");
    }

    for node in &nodes {
        let reported = node.is_center.unwrap_or(false);
        if reported != (node.id == focal_id) {
            debug!(
                focal_id,
                node_id = %node.id,
                reported_center = reported,
                "Backend center flag disagrees with requested paper"
            );
        }
    }

    NormalizedGraph {
        nodes,
        edges,
        focal_id: focal_id.to_string(),
        duplicates_dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::Rng;

    fn ids(graph: &NormalizedGraph) -> Vec<&str> {
        graph.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    fn payload(nodes: Vec<PaperNode>) -> GraphPayload {
        GraphPayload { nodes, edges: vec![] }
    }

    #[test]
    fn test_first_occurrence_wins() {
        let graph = normalize(
            payload(vec![
                PaperNode::new("A").with_label("first A"),
                PaperNode::new("B"),
                PaperNode::new("A").with_label("second A"),
                PaperNode::new("C"),
            ]),
            "A",
        );

        assert_eq!(ids(&graph), ["A", "B", "C"]);
        assert_eq!(graph.nodes[0].label_text(), "first A");
        assert_eq!(graph.duplicates_dropped, 1);
        assert!(graph.contains_focal());
        assert_eq!(graph.neighbour_count(), 2);
    }

    #[test]
    fn test_dedup_idempotent() {
        let once = normalize(
            payload(vec![PaperNode::new("A"), PaperNode::new("B"), PaperNode::new("B")]),
            "A",
        );
        let twice = normalize(payload(once.nodes.clone()), "A");

        assert_eq!(once.nodes, twice.nodes);
        assert_eq!(twice.duplicates_dropped, 0);
    }

    #[test]
    fn test_injected_duplicates_do_not_change_sequence() {
        let mut rng = rand::thread_rng();
        let unique: Vec<PaperNode> = (0..20)
            .map(|i| PaperNode::new(format!("p{}", i)).with_label(format!("Paper {}", i)))
            .collect();
        let baseline = normalize(payload(unique.clone()), "p0");

        for _ in 0..50 {
            // Duplicates may only appear after their first occurrence
            let mut noisy = unique.clone();
            for _ in 0..rng.gen_range(1..30) {
                let pos = rng.gen_range(0..noisy.len());
                let source = noisy[..=pos].choose(&mut rng).cloned().unwrap();
                noisy.insert(pos + 1, source.with_label("shadow"));
            }

            let graph = normalize(payload(noisy), "p0");
            assert_eq!(graph.nodes, baseline.nodes);
        }
    }

    #[test]
    fn test_edges_pass_through_unchanged() {
        let edges = vec![
            CitationEdge::new("A", "B"),
            CitationEdge::new("A", "B"),
            CitationEdge::new("A", "Z"),
        ];
        let graph = normalize(
            GraphPayload {
                nodes: vec![PaperNode::new("A"), PaperNode::new("B")],
                edges: edges.clone(),
            },
            "A",
        );
        assert_eq!(graph.edges, edges);
    }

    #[test]
    fn test_focal_by_id_not_flag() {
        let mut flagged = PaperNode::new("B");
        flagged.is_center = Some(true);

        let graph = normalize(payload(vec![PaperNode::new("A"), flagged]), "A");
        assert!(graph.is_focal(&graph.nodes[0]));
        assert!(!graph.is_focal(&graph.nodes[1]));
    }

    #[test]
    fn test_empty_payload() {
        let graph = normalize(GraphPayload::default(), "A");
        assert!(graph.nodes.is_empty());
        assert!(!graph.contains_focal());
    }
}
