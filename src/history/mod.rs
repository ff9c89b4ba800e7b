//! Persistent, linear edit history with undo and redo.
//!
//! The history is an ordered list of snapshots plus a cursor. Navigating
//! moves the cursor and keeps every snapshot; adding a snapshot while the
//! cursor is not at the end first discards everything after it.
//!
//! Every snapshot is written to a PNG file under the configured root and the
//! list itself to `history.json`, so a session can be reopened. Storage
//! failures never corrupt the in-memory history: the call reports
//! [`Error::Storage`](crate::error::Error::Storage) (or a related storage
//! variant) and the manager stays usable.
//!
//! The manager is not synchronized; callers sharing one across threads must
//! serialize mutating calls themselves.

mod item;
mod store;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

pub use item::{sanitize_description, HistoryItem};

use item::IndexFile;
use store::HistoryStore;

/// Where and how much history is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Session directory holding the index and snapshot files.
    pub root: PathBuf,
    /// Oldest snapshots are evicted beyond this many; `None` keeps all.
    #[serde(default)]
    pub max_items: Option<usize>,
}

impl HistoryConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        HistoryConfig {
            root: root.into(),
            max_items: None,
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }
}

#[derive(Debug)]
pub struct HistoryManager {
    config: HistoryConfig,
    store: HistoryStore,
    items: Vec<HistoryItem>,
    current: Option<usize>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl HistoryManager {
    /// Open the session at `config.root`, restoring any saved history.
    ///
    /// Never fails: an unreadable or corrupt index yields an empty history
    /// and snapshots whose files are missing are dropped.
    pub fn open(config: HistoryConfig) -> Self {
        let store = HistoryStore::new(config.root.clone());
        let mut manager = HistoryManager {
            config,
            store,
            items: Vec::new(),
            current: None,
            last_timestamp: None,
        };
        manager.load();
        manager
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    /// Cursor position, `None` when the history is empty.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_item(&self) -> Option<&HistoryItem> {
        self.current.and_then(|i| self.items.get(i))
    }

    /// Copy of the current snapshot.
    pub fn current_image(&self) -> Option<PixelBuffer> {
        self.current_item().map(|item| item.image().clone())
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.current, Some(i) if i > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.current, Some(i) if i + 1 < self.items.len())
    }

    /// Record a new snapshot and make it current.
    ///
    /// Snapshots after the cursor are discarded first, along with their
    /// files. Returns the index of the new snapshot.
    ///
    /// # Errors
    /// A storage error when the snapshot or the index could not be written.
    /// The snapshot is still added and current in that case.
    pub fn add_item(&mut self, image: PixelBuffer, description: &str) -> Result<usize> {
        self.truncate_after_cursor();

        let mut item = HistoryItem::new(image, description, self.next_timestamp());
        let mut failure = match self.store.write_image(&item.file_name(), item.image()) {
            Ok(path) => {
                item.set_filepath(path);
                None
            }
            Err(e) => {
                tracing::warn!(description, error = %e, "history snapshot kept in memory only");
                Some(e)
            }
        };

        self.items.push(item);
        self.current = Some(self.items.len() - 1);
        self.evict_overflow();

        if let Err(e) = self.persist() {
            failure.get_or_insert(e);
        }

        tracing::debug!(description, len = self.items.len(), "history item added");

        match failure {
            Some(e) => Err(e),
            None => Ok(self.items.len() - 1),
        }
    }

    /// Move the cursor without discarding anything.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] when `index` is out of range; nothing
    /// changes. A storage error when the cursor moved but could not be saved.
    pub fn go_to(&mut self, index: usize) -> Result<()> {
        if index >= self.items.len() {
            return Err(Error::invalid(format!(
                "history index {index} out of range, {} items",
                self.items.len()
            )));
        }
        self.current = Some(index);
        tracing::debug!(index, "history cursor moved");
        self.persist()
    }

    /// Step back one snapshot. Returns whether the cursor moved.
    pub fn undo(&mut self) -> Result<bool> {
        match self.current {
            Some(i) if i > 0 => self.go_to(i - 1).map(|_| true),
            _ => Ok(false),
        }
    }

    /// Step forward one snapshot. Returns whether the cursor moved.
    pub fn redo(&mut self) -> Result<bool> {
        match self.current {
            Some(i) if i + 1 < self.items.len() => self.go_to(i + 1).map(|_| true),
            _ => Ok(false),
        }
    }

    /// Drop every snapshot and its file. Used when a new base image is opened.
    pub fn clear(&mut self) -> Result<()> {
        for item in self.items.drain(..) {
            if let Some(path) = item.filepath() {
                self.store.remove(path);
            }
        }
        self.current = None;
        tracing::info!(root = %self.store.root().display(), "history cleared");
        self.persist()
    }

    fn truncate_after_cursor(&mut self) {
        let keep = self.current.map_or(0, |i| i + 1);
        if keep >= self.items.len() {
            return;
        }
        for item in self.items.drain(keep..) {
            if let Some(path) = item.filepath() {
                self.store.remove(path);
            }
        }
    }

    fn evict_overflow(&mut self) {
        let Some(max) = self.config.max_items else {
            return;
        };
        let max = max.max(1);
        if self.items.len() <= max {
            return;
        }

        let excess = self.items.len() - max;
        for item in self.items.drain(..excess) {
            if let Some(path) = item.filepath() {
                self.store.remove(path);
            }
        }
        self.current = self.current.map(|i| i.saturating_sub(excess));
        tracing::debug!(evicted = excess, max, "history trimmed");
    }

    /// Strictly increasing at microsecond resolution within this manager, so
    /// file names never collide.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let ts = strictly_after(self.last_timestamp, Utc::now());
        self.last_timestamp = Some(ts);
        ts
    }

    fn persist(&self) -> Result<()> {
        let index = IndexFile {
            current_index: self.current.map_or(-1, |i| i as i64),
            items: self.items.iter().map(HistoryItem::to_entry).collect(),
        };
        self.store.write_index(&index).inspect_err(|e| {
            tracing::warn!(error = %e, "failed to save history index");
        })
    }

    fn load(&mut self) {
        let index = match self.store.read_index() {
            Ok(Some(index)) => index,
            Ok(None) => {
                tracing::info!(root = %self.store.root().display(), "starting new history");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "history index unreadable, starting empty");
                return;
            }
        };

        let recorded = index.items.len();
        let mut surviving_before_cursor = 0usize;
        let mut relocated = 0usize;

        for (i, entry) in index.items.into_iter().enumerate() {
            let Some(path) = entry.filepath.as_deref().and_then(|p| self.store.resolve(p)) else {
                tracing::warn!(description = %entry.description, "history snapshot missing, dropped");
                continue;
            };
            match self.store.read_image(&path) {
                Ok(image) => {
                    if i as i64 <= index.current_index {
                        surviving_before_cursor += 1;
                    }
                    if entry.filepath.as_deref() != Some(path.as_path()) {
                        relocated += 1;
                    }
                    self.items.push(HistoryItem::restore(entry, path, image));
                }
                Err(e) => {
                    tracing::warn!(description = %entry.description, error = %e, "history snapshot unreadable, dropped");
                }
            }
        }

        self.current = if self.items.is_empty() {
            None
        } else {
            Some(surviving_before_cursor.saturating_sub(1))
        };
        self.last_timestamp = self.items.iter().map(HistoryItem::timestamp).max();

        let dropped = recorded - self.items.len();
        tracing::info!(
            items = self.items.len(),
            dropped,
            current = ?self.current,
            "history loaded"
        );

        let before = self.items.len();
        self.evict_overflow();
        if dropped > 0 || relocated > 0 || self.items.len() != before {
            // Best effort; the warning is already logged.
            let _ = self.persist();
        }
    }
}

/// `now`, or one microsecond past `last` when `now` does not fall in a later
/// microsecond.
fn strictly_after(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match last {
        Some(last) if now.timestamp_micros() <= last.timestamp_micros() => {
            last + Duration::microseconds(1)
        }
        _ => now,
    }
}
