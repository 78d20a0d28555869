//! Engine configuration.
//!
//! Framework-level defaults (output quality, name obscuring, random-once
//! positioning) live in an explicit [`EngineConfig`] handed to the engine
//! at construction, not in process-wide state. Config files are TOML and
//! sparse: override just the values you want. Unknown keys are rejected
//! to catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! quality = 85                # JPEG encoding quality (1-100)
//! obscure_original = true     # hash-only output filenames
//! random_position_once = true # stable cache path for random positions
//!
//! # Optional URL-to-filesystem mapping for URL-style locators
//! [media]
//! url_prefix = "/media/"
//! root = "/srv/media"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Maps URL-style locators onto the filesystem and back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaMap {
    /// Locator prefix that marks a URL, e.g. `/media/`.
    pub url_prefix: String,
    /// Filesystem directory the prefix maps to.
    pub root: PathBuf,
}

/// Engine defaults, overridable per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// JPEG encoding quality (1-100).
    pub quality: u8,
    /// Derive output filenames purely from the parameter hash.
    pub obscure_original: bool,
    /// Key randomly positioned variants symbolically so repeated requests
    /// converge on one cached file.
    pub random_position_once: bool,
    /// Optional URL-to-filesystem locator mapping.
    pub media: Option<MediaMap>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quality: 85,
            obscure_original: true,
            random_position_once: true,
            media: None,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Translate a locator to a filesystem path. Locators under the media
    /// URL prefix land inside the media root; anything else is already a
    /// path.
    pub fn to_filesystem(&self, locator: &str) -> PathBuf {
        if let Some(media) = &self.media
            && let Some(rest) = locator.strip_prefix(&media.url_prefix)
        {
            return media.root.join(rest);
        }
        PathBuf::from(locator)
    }

    /// Translate a filesystem path back into the caller's locator space.
    pub fn to_locator(&self, path: &Path) -> String {
        if let Some(media) = &self.media
            && let Ok(rest) = path.strip_prefix(&media.root)
        {
            let rest = rest
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            return format!("{}{}", media.url_prefix, rest);
        }
        path.to_string_lossy().into_owned()
    }
}
