mod batch;
mod graph;

pub use batch::{Batch, EdgeEntry, NodeAttributes, NodeEntry};
pub use graph::{Edge, GraphModel, MergeReport, Node, RDF_TYPE};
