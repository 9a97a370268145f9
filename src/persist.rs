//! Saved floater rectangles keyed by a stable name.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::geometry::Rect;

pub trait RectStore {
    fn get_rect(&self, key: &str) -> Option<Rect>;
    fn set_rect(&mut self, key: &str, rect: Rect);

    /// Persists buffered writes. In-memory stores have nothing to do.
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRectStore {
    rects: HashMap<String, Rect>,
}

impl MemoryRectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RectStore for MemoryRectStore {
    fn get_rect(&self, key: &str) -> Option<Rect> {
        self.rects.get(key).copied()
    }

    fn set_rect(&mut self, key: &str, rect: Rect) {
        self.rects.insert(key.to_string(), rect);
    }
}

/// A JSON file of `{ "key": { "left": .., "top": .., ... } }`.
///
/// Writes are buffered; call [`RectStore::flush`] to persist them.
#[derive(Debug)]
pub struct JsonRectStore {
    path: PathBuf,
    rects: BTreeMap<String, Rect>,
    dirty: bool,
}

impl JsonRectStore {
    /// Opens the store, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let rects = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            rects,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl RectStore for JsonRectStore {
    fn get_rect(&self, key: &str) -> Option<Rect> {
        self.rects.get(key).copied()
    }

    fn set_rect(&mut self, key: &str, rect: Rect) {
        if self.rects.get(key) != Some(&rect) {
            self.rects.insert(key.to_string(), rect);
            self.dirty = true;
        }
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        let text = serde_json::to_string_pretty(&self.rects)?;
        fs::write(&self.path, text)?;
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), count = self.rects.len(), "rect store flushed");
        Ok(())
    }
}
