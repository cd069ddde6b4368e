//! Incremental entity-relationship graph exploration: an append-only graph
//! model fed by on-demand fetches, laid out by a force simulation that keeps
//! settled positions as new data arrives.

pub mod config;
pub mod error;
pub mod explorer;
pub mod frame;
pub mod hit;
pub mod layout;
pub mod model;
pub mod source;
pub mod util;

pub use config::Config;
pub use error::SourceError;
pub use explorer::{Explorer, OutcomeStatus};
pub use frame::{Frame, FrameEdge, FrameNode};
pub use hit::HitTester;
pub use layout::LayoutSimulator;
pub use model::{Batch, EdgeEntry, GraphModel, NodeAttributes, NodeEntry};
pub use source::{DataFeeder, DataSource, FetchOutcome, FetchRequest};
