//! Errors.

use crate::window::WindowId;
use reqgraph_model::ModelError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Window tree errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A parent already has a child under this key.
    #[error("window {key} already exists in child list")]
    DuplicateChild { key: String },

    /// A window already has a widget under this key.
    #[error("widget {key} already exists in window {window}")]
    DuplicateWidget { key: String, window: String },

    #[error("no such window: {0:?}")]
    NoSuchWindow(WindowId),

    /// A node window came out of init without a node.
    #[error("{name} window has no node")]
    Unbound { name: String },
}

/// Editor errors.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("couldn't read config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigFormat(#[from] serde_json::Error),
}
