use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;

/// Longest description fragment kept in a snapshot file name.
const MAX_NAME_LEN: usize = 48;

/// One snapshot in the edit history.
///
/// The pixel data is owned by the item; handing it out always copies.
#[derive(Debug, Clone)]
pub struct HistoryItem {
    description: String,
    timestamp: DateTime<Utc>,
    filepath: Option<PathBuf>,
    image: PixelBuffer,
}

impl HistoryItem {
    pub(crate) fn new(image: PixelBuffer, description: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        HistoryItem {
            description: description.into(),
            timestamp,
            filepath: None,
            image,
        }
    }

    pub(crate) fn restore(entry: IndexEntry, filepath: PathBuf, image: PixelBuffer) -> Self {
        HistoryItem {
            description: entry.description,
            timestamp: entry.timestamp,
            filepath: Some(filepath),
            image,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Backing file, or `None` when the snapshot exists only in memory
    /// because writing it failed.
    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    pub fn image(&self) -> &PixelBuffer {
        &self.image
    }

    pub(crate) fn set_filepath(&mut self, path: PathBuf) {
        self.filepath = Some(path);
    }

    /// `history_<unix-micros>_<description>.png`
    pub(crate) fn file_name(&self) -> String {
        format!(
            "history_{}_{}.png",
            self.timestamp.timestamp_micros(),
            sanitize_description(&self.description)
        )
    }

    pub(crate) fn to_entry(&self) -> IndexEntry {
        IndexEntry {
            description: self.description.clone(),
            timestamp: self.timestamp,
            filepath: self.filepath.clone(),
        }
    }
}

/// Make a description safe to embed in a file name.
///
/// ASCII letters, digits, `-` and `_` are kept, everything else becomes `_`.
pub fn sanitize_description(description: &str) -> String {
    let name: String = description
        .chars()
        .take(MAX_NAME_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if name.is_empty() {
        "edit".to_string()
    } else {
        name
    }
}

/// On-disk index, `history.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct IndexFile {
    /// -1 when the history is empty.
    pub current_index: i64,
    pub items: Vec<IndexEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct IndexEntry {
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub filepath: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ChannelMode;
    use chrono::TimeZone;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_description("Power (gamma=0.5)"), "Power__gamma_0_5_");
        assert_eq!(sanitize_description("mean-3x3_ok"), "mean-3x3_ok");
        assert_eq!(sanitize_description("../../etc/passwd"), "______etc_passwd");
        assert_eq!(sanitize_description(""), "edit");
        assert_eq!(sanitize_description("Negação"), "Nega__o");
        assert_eq!(sanitize_description(&"x".repeat(100)).len(), MAX_NAME_LEN);
    }

    #[test]
    fn test_file_name() {
        let ts = Utc.timestamp_opt(1_700_000_000, 123_000).unwrap();
        let item = HistoryItem::new(PixelBuffer::zeros(1, 1, ChannelMode::Gray8), "Open image", ts);
        assert_eq!(item.file_name(), "history_1700000000000123_Open_image.png");
        assert!(item.filepath().is_none());
    }

    #[test]
    fn test_index_json_shape() {
        let index = IndexFile {
            current_index: -1,
            items: Vec::new(),
        };
        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(json, r#"{"current_index":-1,"items":[]}"#);
    }
}
