//! Places graphs can be listed and loaded from.

use crate::document::GraphDocument;
use crate::error::ModelError;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One graph a source can load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphLocation {
    /// Root node id of the graph, as text.
    pub uuid: String,
    pub title: String,
    /// Where the source finds the graph; opaque outside of the source.
    pub address: String,
}

/// A listing-and-loading backend. Calls block, so they belong on a worker thread.
pub trait GraphSource: Send + Sync {
    /// Lists the graphs available at `address`.
    fn locate(&self, address: &str) -> Result<Vec<GraphLocation>, ModelError>;

    /// Loads a listed graph.
    fn fetch(&self, location: &GraphLocation) -> Result<GraphDocument, ModelError>;
}

/// Serves every `*.json` graph document in a directory. The address is the directory path.
#[derive(Debug, Default)]
pub struct DirectorySource;

impl DirectorySource {
    pub fn new() -> DirectorySource {
        DirectorySource
    }

    fn location_for(path: &Path) -> Result<GraphLocation, ModelError> {
        let doc = GraphDocument::read_json(path)?;
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(GraphLocation {
            uuid: doc.root.to_string(),
            title: doc.title().map(str::to_owned).unwrap_or(stem),
            address: path.to_string_lossy().into_owned(),
        })
    }
}

impl GraphSource for DirectorySource {
    fn locate(&self, address: &str) -> Result<Vec<GraphLocation>, ModelError> {
        let dir = PathBuf::from(address);
        let entries = fs::read_dir(&dir).map_err(|source| ModelError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ModelError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut locations = Vec::with_capacity(paths.len());
        for path in paths {
            // one unreadable file shouldn’t hide the rest of the directory
            match DirectorySource::location_for(&path) {
                Ok(location) => locations.push(location),
                Err(err) => warn!("skipping {}: {}", path.display(), err),
            }
        }
        debug!("located {} graphs in {}", locations.len(), dir.display());
        Ok(locations)
    }

    fn fetch(&self, location: &GraphLocation) -> Result<GraphDocument, ModelError> {
        GraphDocument::read_json(Path::new(&location.address))
    }
}

/// Serves documents from memory, keyed by address.
#[derive(Debug, Default)]
pub struct MemorySource {
    documents: Mutex<BTreeMap<String, GraphDocument>>,
}

impl MemorySource {
    pub fn new() -> MemorySource {
        MemorySource::default()
    }

    pub fn insert(&self, address: &str, document: GraphDocument) {
        self.documents.lock().insert(address.to_owned(), document);
    }
}

impl GraphSource for MemorySource {
    /// Lists every document whose address starts with `address`.
    fn locate(&self, address: &str) -> Result<Vec<GraphLocation>, ModelError> {
        let documents = self.documents.lock();
        Ok(documents
            .iter()
            .filter(|(key, _)| key.starts_with(address))
            .map(|(key, doc)| GraphLocation {
                uuid: doc.root.to_string(),
                title: doc.title().unwrap_or(key).to_owned(),
                address: key.clone(),
            })
            .collect())
    }

    fn fetch(&self, location: &GraphLocation) -> Result<GraphDocument, ModelError> {
        self.documents
            .lock()
            .get(&location.address)
            .cloned()
            .ok_or_else(|| ModelError::GraphNotFound {
                address: location.address.clone(),
            })
    }
}
