//! Data sources that answer fetch requests with node and edge batches, and
//! the feeder that runs them off the UI thread.

mod command;
mod dataset;
mod feeder;
mod parse;

use std::fmt;

use crate::error::SourceError;
use crate::model::Batch;

pub use command::CommandSource;
pub use dataset::DatasetSource;
pub use feeder::{DataFeeder, FetchOutcome};
pub use parse::parse_batch;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpandKind {
    /// Outgoing relations of the node.
    Relations,
    /// Instances whose type is the node.
    Members,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandRequest {
    pub identity: String,
    pub sample_limit: usize,
    pub kind: ExpandKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchRequest {
    Expand(ExpandRequest),
    /// Every class known to the source, as a starting point without a subject.
    Classes,
}

impl FetchRequest {
    pub fn relations(identity: impl Into<String>, sample_limit: usize) -> Self {
        Self::Expand(ExpandRequest {
            identity: identity.into(),
            sample_limit,
            kind: ExpandKind::Relations,
        })
    }

    pub fn members(identity: impl Into<String>, sample_limit: usize) -> Self {
        Self::Expand(ExpandRequest {
            identity: identity.into(),
            sample_limit,
            kind: ExpandKind::Members,
        })
    }
}

impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expand(ExpandRequest {
                identity,
                sample_limit,
                kind: ExpandKind::Relations,
            }) => write!(f, "relations of {identity} (limit {sample_limit})"),
            Self::Expand(ExpandRequest {
                identity,
                sample_limit,
                kind: ExpandKind::Members,
            }) => write!(f, "members of {identity} (limit {sample_limit})"),
            Self::Classes => f.write_str("classes"),
        }
    }
}

/// Answers fetch requests. Implementations may block; the feeder calls them
/// on worker threads.
pub trait DataSource: Send + Sync {
    fn fetch(&self, request: &FetchRequest) -> Result<Batch, SourceError>;
}
