//! Watermark definition records.
//!
//! The engine only ever *reads* definitions, through the [`WatermarkStore`]
//! trait, and only by name filtered to active records. Everything else
//! here is CRUD glue for the CLI: a flat JSON manifest ([`JsonStore`])
//! holding the records, with `date_updated` refreshed on every mutation so
//! the cache staleness check picks changes up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("store parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no watermark named {0:?}")]
    UnknownName(String),
}

/// A named watermark image, as the engine sees it: immutable for the
/// duration of one compositing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkDefinition {
    pub id: u64,
    pub name: String,
    /// Path to the mark's source image.
    pub image: PathBuf,
    pub is_active: bool,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

/// Read-side lookup contract the engine depends on.
pub trait WatermarkStore {
    /// The active definition with this exact name, if any.
    fn find_active(&self, name: &str) -> Option<&WatermarkDefinition>;
}

/// JSON-file-backed store of watermark definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonStore {
    next_id: u64,
    watermarks: Vec<WatermarkDefinition>,
}

impl JsonStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from `path`. A missing file is an empty store; a corrupt one
    /// is an error rather than a silent wipe.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::empty()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Register a watermark image under `name`. An existing record with
    /// the same name keeps its id but gets the new image and a fresh
    /// `date_updated` (which invalidates its cached variants).
    pub fn add(&mut self, name: &str, image: PathBuf, is_active: bool) -> &WatermarkDefinition {
        let now = Utc::now();
        if let Some(idx) = self.position(name) {
            let record = &mut self.watermarks[idx];
            record.image = image;
            record.is_active = is_active;
            record.date_updated = now;
            return &self.watermarks[idx];
        }
        self.next_id += 1;
        self.watermarks.push(WatermarkDefinition {
            id: self.next_id,
            name: name.to_string(),
            image,
            is_active,
            date_created: now,
            date_updated: now,
        });
        self.watermarks.last().expect("just pushed")
    }

    /// Flip the active flag, refreshing `date_updated`.
    pub fn set_active(&mut self, name: &str, is_active: bool) -> Result<(), StoreError> {
        let idx = self
            .position(name)
            .ok_or_else(|| StoreError::UnknownName(name.to_string()))?;
        self.watermarks[idx].is_active = is_active;
        self.watermarks[idx].date_updated = Utc::now();
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<WatermarkDefinition, StoreError> {
        let idx = self
            .position(name)
            .ok_or_else(|| StoreError::UnknownName(name.to_string()))?;
        Ok(self.watermarks.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &WatermarkDefinition> {
        self.watermarks.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.watermarks.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.watermarks.iter().position(|w| w.name == name)
    }
}

impl WatermarkStore for JsonStore {
    fn find_active(&self, name: &str) -> Option<&WatermarkDefinition> {
        self.watermarks.iter().find(|w| w.name == name && w.is_active)
    }
}
