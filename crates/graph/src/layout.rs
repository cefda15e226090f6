//! Radial layout around the focal paper
//!
//! The focal node sits at the configured center; every other node lies on a
//! circle of fixed radius at equally spaced angles, in normalized order.

use citescope_common::config::LayoutConfig;
use citescope_common::models::PaperNode;
use serde::Serialize;
use std::collections::HashMap;
use std::f64::consts::TAU;
use tracing::warn;

use crate::normalize::NormalizedGraph;

/// Point in layout space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A normalized node with its coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub node: PaperNode,
    pub position: Point,
    pub is_focal: bool,
    /// Angle on the circle; `None` for the focal node
    pub angle: Option<f64>,
}

/// Places nodes on a circle around the focal paper
#[derive(Debug, Clone)]
pub struct RadialLayoutEngine {
    config: LayoutConfig,
}

impl RadialLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.config.center_x,
            y: self.config.center_y,
        }
    }

    pub fn radius(&self) -> f64 {
        self.config.radius
    }

    /// Position every node, preserving the normalized order
    pub fn place(&self, graph: &NormalizedGraph) -> Vec<PositionedNode> {
        let neighbours = graph.neighbour_count();
        if !graph.contains_focal() && !graph.nodes.is_empty() {
            warn!(focal_id = %graph.focal_id, "Focal paper missing from graph payload");
        }

        let center = self.center();
        let mut rank = 0usize;

        graph
            .nodes
            .iter()
            .map(|node| {
                if graph.is_focal(node) {
                    return PositionedNode {
                        node: node.clone(),
                        position: center,
                        is_focal: true,
                        angle: None,
                    };
                }

                // neighbours >= 1 here: this node is one of them
                let angle = TAU * rank as f64 / neighbours as f64;
                rank += 1;

                PositionedNode {
                    node: node.clone(),
                    position: Point {
                        x: center.x + self.config.radius * angle.cos(),
                        y: center.y + self.config.radius * angle.sin(),
                    },
                    is_focal: false,
                    angle: Some(angle),
                }
            })
            .collect()
    }

    /// Id to coordinate mapping
    pub fn positions(&self, graph: &NormalizedGraph) -> HashMap<String, Point> {
        self.place(graph)
            .into_iter()
            .map(|p| (p.node.id, p.position))
            .collect()
    }
}

impl Default for RadialLayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}
