//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid document.
//! The history store has no implicit location: it is only configured when
//! the document names a `root`.
//!
//! ```json
//! {
//!   "spatial": { "border": "replicate", "parallel_threshold": 4096 },
//!   "history": { "root": "/var/tmp/session-42", "max_items": 50 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filters::spatial::SpatialOptions;
use crate::history::HistoryConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Border policy and parallelism for neighborhood filters and the Laplacian.
    pub spatial: SpatialOptions,
    /// Backing store for the edit history, if any.
    pub history: Option<HistoryConfig>,
}

impl EngineConfig {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(Error::Config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::storage(path, e))?;
        let config = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            border = ?config.spatial.border,
            history = config.history.is_some(),
            "loaded engine configuration"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::spatial::BorderPolicy;
    use crate::filters::PARALLEL_THRESHOLD;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.spatial.border, BorderPolicy::Retain);
        assert_eq!(config.spatial.parallel_threshold, PARALLEL_THRESHOLD);
        assert!(config.history.is_none());
    }

    #[test]
    fn test_full_document() {
        let config = EngineConfig::from_json_str(
            r#"{
                "spatial": { "border": "replicate" },
                "history": { "root": "/tmp/edits", "max_items": 3 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.spatial.border, BorderPolicy::Replicate);
        assert_eq!(config.spatial.parallel_threshold, PARALLEL_THRESHOLD);
        let history = config.history.unwrap();
        assert_eq!(history.root, Path::new("/tmp/edits"));
        assert_eq!(history.max_items, Some(3));
    }

    #[test]
    fn test_malformed_document() {
        let err = EngineConfig::from_json_str(r#"{"spatial": {"border": "wrap"}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(!err.is_storage());
    }

    #[test]
    fn test_from_missing_file() {
        let err = EngineConfig::from_json_file("/nonexistent/engine.json").unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"spatial": {"parallel_threshold": 1}}"#).unwrap();
        let config = EngineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.spatial.parallel_threshold, 1);
    }
}
