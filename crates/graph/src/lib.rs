//! Citescope Graph Pipeline
//!
//! Turns a raw citation payload into a render graph in three pure stages:
//! - `normalize`: drop duplicate nodes, record the focal paper
//! - `layout`: place the focal paper at the center, neighbours on a circle
//! - `render`: attach labels and focal/neutral styling

pub mod layout;
pub mod normalize;
pub mod render;

pub use layout::{Point, PositionedNode, RadialLayoutEngine};
pub use normalize::{normalize, NormalizedGraph};
pub use render::{EdgeStyle, NodeStyle, RenderEdge, RenderGraph, RenderGraphBuilder, RenderNode};

use citescope_common::config::{LayoutConfig, RenderConfig};
use citescope_common::models::GraphPayload;
use tracing::debug;

/// The three stages wired together with fixed configuration
#[derive(Debug, Clone, Default)]
pub struct GraphPipeline {
    layout: RadialLayoutEngine,
    builder: RenderGraphBuilder,
}

/// Render graph plus what the stages observed along the way
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub graph: RenderGraph,
    pub duplicates_dropped: usize,
}

impl GraphPipeline {
    pub fn new(layout: LayoutConfig, render: RenderConfig) -> Self {
        Self {
            layout: RadialLayoutEngine::new(layout),
            builder: RenderGraphBuilder::new(render),
        }
    }

    /// Normalize, lay out, and style a payload around `focal_id`
    pub fn run(&self, payload: GraphPayload, focal_id: &str) -> PipelineOutput {
        let normalized = normalize(payload, focal_id);
        let positioned = self.layout.place(&normalized);
        let graph = self.builder.build(positioned, &normalized.edges);

        let dangling = graph.dangling_edges().len();
        if dangling > 0 {
            debug!(focal_id, dangling, "Graph has edges to papers outside the payload");
        }

        PipelineOutput {
            graph,
            duplicates_dropped: normalized.duplicates_dropped,
        }
    }
}

/// One-shot pipeline with default geometry and styling
pub fn build_render_graph(payload: GraphPayload, focal_id: &str) -> RenderGraph {
    GraphPipeline::default().run(payload, focal_id).graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use citescope_common::models::{CitationEdge, PaperNode};
    use std::f64::consts::PI;

    #[test]
    fn test_end_to_end_scenario() {
        let mut a = PaperNode::new("A");
        a.is_center = Some(true);
        let payload = GraphPayload {
            nodes: vec![a, PaperNode::new("B"), PaperNode::new("B"), PaperNode::new("C")],
            edges: vec![CitationEdge::new("A", "B"), CitationEdge::new("A", "Z")],
        };

        let pipeline = GraphPipeline::default();
        let output = pipeline.run(payload, "A");
        let graph = &output.graph;

        assert_eq!(output.duplicates_dropped, 1);
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);

        let layout = LayoutConfig::default();
        let a = graph.node("A").unwrap();
        assert!(a.is_focal);
        assert_eq!(a.style, NodeStyle::FOCAL);
        assert_eq!(a.position, Point { x: layout.center_x, y: layout.center_y });

        // B at angle 0, C at angle π
        let b = graph.node("B").unwrap();
        assert!((b.position.x - (layout.center_x + layout.radius)).abs() < 1e-9);
        assert!((b.position.y - layout.center_y).abs() < 1e-9);
        let c = graph.node("C").unwrap();
        assert!((c.position.x - (layout.center_x + layout.radius * PI.cos())).abs() < 1e-9);
        assert!((c.position.y - (layout.center_y + layout.radius * PI.sin())).abs() < 1e-9);

        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[1].target, "Z");
        assert_eq!(graph.dangling_edges().len(), 1);
    }

    #[test]
    fn test_empty_payload_yields_empty_graph() {
        let graph = build_render_graph(GraphPayload::default(), "A");
        assert!(graph.is_empty());
        assert_eq!(graph.stats_line(), "0 papers · 0 connections");
    }
}
