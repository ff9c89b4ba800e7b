//! Filesystem layout of a history session.
//!
//! ```text
//! <root>/
//!   history.json
//!   history_<unix-micros>_<description>.png
//!   ...
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::error::{LimitError, LimitErrorKind};
use image::{ColorType, DynamicImage, GenericImageView, ImageError};

use crate::buffer::{ChannelMode, PixelBuffer};
use crate::error::{Error, Result};

use super::item::IndexFile;

const INDEX_FILE: &str = "history.json";

#[derive(Debug, Clone)]
pub(crate) struct HistoryStore {
    root: PathBuf,
}

impl HistoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        HistoryStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| Error::storage(&self.root, e))
    }

    /// Locate a snapshot referenced by the index.
    ///
    /// Only the file of the same name inside the root is accepted. A moved
    /// or copied session therefore loads its own files and never adopts
    /// snapshots of the directory it was copied from.
    pub fn resolve(&self, recorded: &Path) -> Option<PathBuf> {
        let local = self.root.join(recorded.file_name()?);
        local.is_file().then_some(local)
    }

    /// True for paths directly inside the root.
    pub fn owns(&self, path: &Path) -> bool {
        path.parent() == Some(self.root.as_path())
    }

    pub fn write_image(&self, file_name: &str, image: &PixelBuffer) -> Result<PathBuf> {
        self.ensure_root()?;
        let path = self.root.join(file_name);

        let (width, height) = match (u32::try_from(image.width()), u32::try_from(image.height())) {
            (Ok(width), Ok(height)) => (width, height),
            _ => {
                return Err(Error::Encode {
                    path,
                    source: ImageError::Limits(LimitError::from_kind(LimitErrorKind::DimensionError)),
                })
            }
        };
        let color = match image.mode() {
            ChannelMode::Gray8 => ColorType::L8,
            ChannelMode::Rgb8 => ColorType::Rgb8,
            ChannelMode::Rgba8 => ColorType::Rgba8,
        };

        image::save_buffer(&path, &image.to_bytes(), width, height, color).map_err(|source| {
            Error::Encode {
                path: path.clone(),
                source,
            }
        })?;
        Ok(path)
    }

    pub fn read_image(&self, path: &Path) -> Result<PixelBuffer> {
        let decoded = image::open(path).map_err(|source| Error::Encode {
            path: path.to_path_buf(),
            source,
        })?;

        let (width, height) = decoded.dimensions();
        let (width, height) = (width as usize, height as usize);
        let (mode, bytes) = match decoded {
            DynamicImage::ImageLuma8(buf) => (ChannelMode::Gray8, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (ChannelMode::Rgb8, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (ChannelMode::Rgba8, buf.into_raw()),
            other => (ChannelMode::Rgba8, other.into_rgba8().into_raw()),
        };
        PixelBuffer::new(width, height, mode, bytes)
    }

    /// Missing files are not an error; other failures are logged.
    /// Paths outside the root are never touched.
    pub fn remove(&self, path: &Path) {
        if !self.owns(path) {
            tracing::warn!(path = %path.display(), root = %self.root.display(), "refusing to remove file outside history root");
            return;
        }
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove history file"),
        }
    }

    /// `Ok(None)` when no index has been written yet.
    pub fn read_index(&self) -> Result<Option<IndexFile>> {
        let path = self.index_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::storage(path, e)),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Replace the index atomically: write a sibling temp file, then rename.
    pub fn write_index(&self, index: &IndexFile) -> Result<()> {
        self.ensure_root()?;
        let path = self.index_path();
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(index)?;
        fs::write(&tmp, json).map_err(|e| Error::storage(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| Error::storage(&path, e))
    }
}
