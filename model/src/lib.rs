//! Domain model for requirements graphs.
//!
//! Nodes live in a [`Graph`] and refer to each other by [`NodeId`]. Each node has ordered `up` and
//! `down` adjacency lists; commitable kinds additionally form a change chain through
//! `change_parent`/`change_child` and can be committed, after which they no longer accept edits.
//!
//! Loading and saving is blocking work. [`GraphSource`]s list and fetch [`GraphDocument`]s and are
//! meant to be driven from a [`ThreadPool`], with results sent back over a channel to whichever
//! thread owns the graph.

mod document;
mod error;
mod graph;
mod id;
mod kind;
mod node;
pub mod pool;
mod source;

pub use document::GraphDocument;
pub use error::ModelError;
pub use graph::Graph;
pub use id::NodeId;
pub use kind::NodeKind;
pub use node::Node;
pub use pool::{Submitter, Task, ThreadPool};
pub use source::{DirectorySource, GraphLocation, GraphSource, MemorySource};
