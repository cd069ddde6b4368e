use eframe::egui::{Pos2, Rect, Vec2};

use crate::layout::LayoutSimulator;
use crate::model::GraphModel;

#[derive(Clone, Debug, PartialEq)]
pub struct FrameNode {
    pub identity: String,
    pub position: Pos2,
    pub half_size: Vec2,
    pub display_label: String,
    pub type_like: bool,
}

impl FrameNode {
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, self.half_size * 2.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameEdge {
    pub source: Pos2,
    pub destination: Pos2,
    pub label_position: Pos2,
    pub label: String,
}

/// What the renderer draws for one tick, nodes in draw order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub nodes: Vec<FrameNode>,
    pub edges: Vec<FrameEdge>,
}

impl Frame {
    /// Snapshot of every synced body. Model entities that have no body yet
    /// are left out until the next sync.
    pub fn capture(model: &GraphModel, simulator: &LayoutSimulator) -> Self {
        let nodes = simulator
            .bodies()
            .filter_map(|(identity, body)| {
                let node = model.node(identity)?;
                Some(FrameNode {
                    identity: node.identity.clone(),
                    position: body.position,
                    half_size: body.half_size,
                    display_label: node.display_label().to_owned(),
                    type_like: model.is_type_like(identity),
                })
            })
            .collect();

        let edges = simulator
            .constraints()
            .filter_map(|constraint| {
                let source = simulator.body_at(constraint.source)?;
                let destination = simulator.body_at(constraint.destination)?;
                Some(FrameEdge {
                    source: source.position,
                    destination: destination.position,
                    label_position: constraint.anchor.position,
                    label: constraint.edge.display_label().to_owned(),
                })
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn regions(&self) -> impl DoubleEndedIterator<Item = (&str, Rect)> {
        self.nodes
            .iter()
            .map(|node| (node.identity.as_str(), node.bounds()))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
