//! Editor configuration.

use crate::anchor::AnchorStyle;
use crate::error::EditorError;
use crate::grid::GridStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Editor settings. Every field has a default, so a config file only needs the ones it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Number of threads loading and saving graphs.
    pub worker_threads: usize,

    /// Whether new node windows start out editable.
    pub default_editable: bool,

    /// Whether new node windows show the editing checkbox.
    pub display_editable_checkbox: bool,

    pub anchor: AnchorStyle,
    pub grid: GridStyle,

    /// Where the locator looks for graphs.
    pub graph_directory: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> EditorConfig {
        EditorConfig {
            worker_threads: 4,
            default_editable: false,
            display_editable_checkbox: true,
            anchor: AnchorStyle::default(),
            grid: GridStyle::default(),
            graph_directory: None,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<EditorConfig, EditorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON config file.
    pub fn load(path: &Path) -> Result<EditorConfig, EditorError> {
        let json = fs::read_to_string(path).map_err(|source| EditorError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        EditorConfig::from_json_str(&json)
    }

    /// The address the locator starts out with.
    pub fn default_address(&self) -> String {
        self.graph_directory
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = EditorConfig::from_json_str(
            r#"{ "default_editable": true, "anchor": { "radius": 8.0 } }"#,
        )
        .unwrap();
        assert!(config.default_editable);
        assert_eq!(config.anchor.radius, 8.);
        assert_eq!(config.anchor.hover_color, Color::RED);
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.grid, GridStyle::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "worker_threads": 2, "graph_directory": "/srv/graphs" }}"#).unwrap();
        let config = EditorConfig::load(file.path()).unwrap();
        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.default_address(), "/srv/graphs");
    }

    #[test]
    fn test_bad_config_is_an_error() {
        assert!(EditorConfig::from_json_str("{ \"worker_threads\": \"many\" }").is_err());
        assert!(EditorConfig::load(Path::new("/nonexistent/reqgraph.json")).is_err());
    }
}
