//! Shared helpers for integration tests.

#![allow(dead_code)]

use imagestag_edit::{ChannelMode, HistoryConfig, HistoryManager, PixelBuffer};
use tempfile::TempDir;

/// Fresh session directory and a manager opened on it.
pub fn open_session() -> (TempDir, HistoryManager) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let manager = HistoryManager::open(HistoryConfig::new(dir.path()));
    (dir, manager)
}

/// Reopen the session stored under `dir`.
pub fn reopen(dir: &TempDir) -> HistoryManager {
    HistoryManager::open(HistoryConfig::new(dir.path()))
}

pub fn solid_gray(value: u8) -> PixelBuffer {
    PixelBuffer::new(3, 2, ChannelMode::Gray8, vec![value; 6]).expect("valid gray buffer")
}

/// Small RGBA gradient with a varying alpha channel.
pub fn gradient_rgba(width: usize, height: usize) -> PixelBuffer {
    let mut bytes = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let v = ((x + y) * 255 / (width + height).max(1)) as u8;
            bytes.extend_from_slice(&[v, 255 - v, v / 2, (x * 17 % 256) as u8]);
        }
    }
    PixelBuffer::new(width, height, ChannelMode::Rgba8, bytes).expect("valid rgba buffer")
}

pub fn descriptions(manager: &HistoryManager) -> Vec<String> {
    manager
        .items()
        .iter()
        .map(|item| item.description().to_string())
        .collect()
}
