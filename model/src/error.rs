//! Errors for the domain model and its collaborators.

use crate::id::NodeId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// Text that should have been a node id was not a uuid.
    #[error("invalid node id: '{text}'")]
    InvalidId { text: String },

    /// The node is not in the graph.
    #[error("node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// The node has been committed and can no longer be edited.
    #[error("node {id} is committed")]
    Committed { id: NodeId },

    /// The node is locked against field edits.
    #[error("node {id} is locked")]
    Locked { id: NodeId },

    /// The node kind does not have the named field.
    #[error("node {id} has no field '{field}'")]
    NoSuchField { id: NodeId, field: String },

    /// A graph document does not contain its own root.
    #[error("graph document is missing its root node {root}")]
    MissingRoot { root: NodeId },

    /// No graph is available at the requested location.
    #[error("no graph at '{address}'")]
    GraphNotFound { address: String },

    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("json error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The worker pool has been shut down and no longer accepts tasks.
    #[error("thread pool is shut down")]
    PoolShutDown,
}
