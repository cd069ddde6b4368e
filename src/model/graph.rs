use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::util::local_name;

use super::batch::{Batch, EdgeEntry, NodeAttributes, NodeEntry, present};

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub identity: String,
    pub attributes: NodeAttributes,
}

impl Node {
    pub fn display_label(&self) -> &str {
        present(self.attributes.primary_label.as_deref())
            .or_else(|| present(self.attributes.secondary_label.as_deref()))
            .unwrap_or_else(|| local_name(&self.identity))
    }
}

/// An edge is its own key: the ordered (source, label, destination) triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub source: String,
    pub label: String,
    pub destination: String,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        label: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            label: label.into(),
            destination: destination.into(),
        }
    }

    pub fn display_label(&self) -> &str {
        local_name(&self.label)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub nodes_added: usize,
    pub edges_added: usize,
    pub dropped: usize,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        self.nodes_added > 0 || self.edges_added > 0
    }

    fn absorb(&mut self, other: MergeReport) {
        self.nodes_added += other.nodes_added;
        self.edges_added += other.edges_added;
        self.dropped += other.dropped;
    }
}

/// Append-only, deduplicated node and edge sets.
///
/// Nodes are keyed by identity and edges by their triple. Nothing is ever
/// removed short of [`GraphModel::reset`], which lets the layout reconcile
/// incrementally against [`GraphModel::revision`].
#[derive(Debug, Default)]
pub struct GraphModel {
    nodes: Vec<Node>,
    node_index: HashMap<String, usize>,
    edges: Vec<Edge>,
    edge_index: HashSet<Edge>,
    type_like: HashSet<String>,
    revision: u64,
    generation: u64,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, batch: Batch) -> MergeReport {
        let mut report = self.merge_nodes(batch.nodes);
        report.absorb(self.merge_edges(batch.edges));
        report
    }

    pub fn merge_nodes(&mut self, batch: impl IntoIterator<Item = NodeEntry>) -> MergeReport {
        let mut report = MergeReport::default();

        for entry in batch {
            let Some(identity) = present(entry.identity.as_deref()) else {
                warn!("dropping node entry without identity");
                report.dropped += 1;
                continue;
            };

            if entry.type_like {
                self.type_like.insert(identity.to_owned());
            }
            if self.insert_node(identity, entry.attributes) {
                report.nodes_added += 1;
            }
        }

        self.finish_merge(report)
    }

    pub fn merge_edges(&mut self, batch: impl IntoIterator<Item = EdgeEntry>) -> MergeReport {
        let mut report = MergeReport::default();

        for entry in batch {
            let EdgeEntry {
                source,
                label,
                destination,
                source_hints,
                destination_hints,
            } = entry;

            let (Some(source), Some(label), Some(destination)) = (
                present(source.as_deref()),
                present(label.as_deref()),
                present(destination.as_deref()),
            ) else {
                warn!(?source, ?label, ?destination, "dropping incomplete edge entry");
                report.dropped += 1;
                continue;
            };

            if self.insert_node(source, source_hints.unwrap_or_default()) {
                report.nodes_added += 1;
            }
            if self.insert_node(destination, destination_hints.unwrap_or_default()) {
                report.nodes_added += 1;
            }

            if label == RDF_TYPE {
                self.type_like.insert(destination.to_owned());
            }

            let edge = Edge::new(source, label, destination);
            if !self.edge_index.contains(&edge) {
                self.edge_index.insert(edge.clone());
                self.edges.push(edge);
                report.edges_added += 1;
            }
        }

        self.finish_merge(report)
    }

    fn insert_node(&mut self, identity: &str, attributes: NodeAttributes) -> bool {
        if self.node_index.contains_key(identity) {
            return false;
        }

        self.node_index.insert(identity.to_owned(), self.nodes.len());
        self.nodes.push(Node {
            identity: identity.to_owned(),
            attributes,
        });
        true
    }

    fn finish_merge(&mut self, report: MergeReport) -> MergeReport {
        if report.changed() {
            self.revision = self.revision.wrapping_add(1);
            debug!(
                nodes_added = report.nodes_added,
                edges_added = report.edges_added,
                nodes = self.nodes.len(),
                edges = self.edges.len(),
                "merged batch"
            );
        }
        report
    }

    /// Drops every node and edge. Only used when switching to an unrelated graph.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.node_index.clear();
        self.edges.clear();
        self.edge_index.clear();
        self.type_like.clear();
        self.revision = self.revision.wrapping_add(1);
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn nodes(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    pub fn node(&self, identity: &str) -> Option<&Node> {
        self.node_index
            .get(identity)
            .and_then(|&index| self.nodes.get(index))
    }

    pub fn contains_node(&self, identity: &str) -> bool {
        self.node_index.contains_key(identity)
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edge_index.contains(edge)
    }

    pub fn is_type_like(&self, identity: &str) -> bool {
        self.type_like.contains(identity)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
