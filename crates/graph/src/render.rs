//! Render model: styled, labelled nodes and edges for the view layer
//!
//! Purely cosmetic mapping. No deduplication and no coordinate work happens
//! here; the only input to styling is whether a node is focal.

use citescope_common::config::RenderConfig;
use citescope_common::models::CitationEdge;
use serde::Serialize;
use std::collections::HashSet;

use crate::layout::{Point, PositionedNode};

/// Visual attributes of a node box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeStyle {
    pub background: &'static str,
    pub color: &'static str,
    pub label_color: &'static str,
    pub border: &'static str,
    pub border_radius: &'static str,
    pub box_shadow: &'static str,
    pub font_weight: &'static str,
}

impl NodeStyle {
    /// Accent style for the focal paper
    pub const FOCAL: NodeStyle = NodeStyle {
        background: "#00ff9d",
        color: "#000",
        label_color: "#000",
        border: "1px solid #333",
        border_radius: "8px",
        box_shadow: "0 0 15px rgba(0,255,157,0.4)",
        font_weight: "bold",
    };

    /// Neutral dark style for every other paper
    pub const NEUTRAL: NodeStyle = NodeStyle {
        background: "#111",
        color: "#ccc",
        label_color: "#fff",
        border: "1px solid #333",
        border_radius: "8px",
        box_shadow: "none",
        font_weight: "normal",
    };

    pub fn for_node(is_focal: bool) -> NodeStyle {
        if is_focal {
            NodeStyle::FOCAL
        } else {
            NodeStyle::NEUTRAL
        }
    }
}

/// Uniform edge stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeStyle {
    pub stroke: &'static str,
    pub stroke_width: u32,
}

impl EdgeStyle {
    pub const CITATION: EdgeStyle = EdgeStyle {
        stroke: "#444",
        stroke_width: 1,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub position: Point,
    pub width: u32,
    pub is_focal: bool,
    pub style: NodeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub animated: bool,
    pub style: EdgeStyle,
}

/// Fully positioned and styled graph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

impl RenderGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn focal(&self) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.is_focal)
    }

    /// Header line, e.g. `3 papers · 2 connections`
    pub fn stats_line(&self) -> String {
        format!("{} papers · {} connections", self.nodes.len(), self.edges.len())
    }

    /// Edges with at least one endpoint missing from the node list
    pub fn dangling_edges(&self) -> Vec<&RenderEdge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
            .collect()
    }
}

/// Turns positioned nodes and raw edges into a [`RenderGraph`]
#[derive(Debug, Clone, Default)]
pub struct RenderGraphBuilder {
    config: RenderConfig,
}

impl RenderGraphBuilder {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, nodes: Vec<PositionedNode>, edges: &[CitationEdge]) -> RenderGraph {
        let nodes = nodes.into_iter().map(|p| self.render_node(p)).collect();

        let edges = edges
            .iter()
            .enumerate()
            .map(|(i, edge)| RenderEdge {
                id: format!("e{}", i),
                source: edge.source.clone(),
                target: edge.target.clone(),
                animated: true,
                style: EdgeStyle::CITATION,
            })
            .collect();

        RenderGraph { nodes, edges }
    }

    fn render_node(&self, positioned: PositionedNode) -> RenderNode {
        let PositionedNode {
            node,
            position,
            is_focal,
            ..
        } = positioned;

        RenderNode {
            label: truncate_label(node.label_text(), self.config.label_max_chars, &self.config.ellipsis),
            subtitle: subtitle(node.year.as_deref(), node.category.as_deref()),
            id: node.id,
            position,
            width: self.config.node_width,
            is_focal,
            style: NodeStyle::for_node(is_focal),
        }
    }
}

/// Keep at most `max_chars` characters, appending `ellipsis` when cut
pub fn truncate_label(label: &str, max_chars: usize, ellipsis: &str) -> String {
    match label.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &label[..cut], ellipsis),
        None => label.to_string(),
    }
}

fn subtitle(year: Option<&str>, category: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [year, category]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" · "))
    }
}
