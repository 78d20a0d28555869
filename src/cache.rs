//! Deterministic output paths and staleness checks for watermarked images.
//!
//! A watermarked variant is cached on the filesystem next to its source
//! image, under a `watermarked/` directory. The path is a pure function of
//! the resolved request: the canonical parameter name is hashed with
//! SHA-256, and the digest either becomes the filename itself (obscured)
//! or a directory bucket that still exposes the original basename.
//!
//! # Canonical name
//!
//! Built by concatenating, in fixed order:
//!
//! ```text
//! {basename}_wm_w{id}_o{opacity%}_gs{0|1}_r{degrees}_p{position}[_s{pct}][_tiled]{ext}
//! ```
//!
//! The scale component appears only when the resolved scale differs from
//! the mark's native size, and the tile component only when tiling is on.
//! Two calls with identical resolved parameters therefore derive the
//! identical path, and changing any one parameter changes it.
//!
//! # Staleness
//!
//! An existing file is reused iff its mtime is at least the owning
//! watermark definition's `date_updated`. Anything else (missing file,
//! older file) means recomposite and overwrite. The cache never deletes;
//! invalidation is the record store's concern.

use crate::params::ResolvedParams;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache directory, created alongside the source image.
pub const WATERMARKED_DIR: &str = "watermarked";

/// Build the canonical parameter name for a watermarked variant.
pub fn canonical_name(
    basename: &str,
    ext: &str,
    watermark_id: u64,
    params: &ResolvedParams,
) -> String {
    let mut parts = vec![
        basename.to_string(),
        "wm".to_string(),
        format!("w{watermark_id}"),
        format!("o{}", (params.opacity * 100.0).round() as u32),
        format!("gs{}", params.greyscale as u8),
        format!("r{}", params.rotation),
        format!("p{}", params.position_key),
    ];
    if let Some(pct) = params.scale_percent() {
        parts.push(format!("s{pct}"));
    }
    if params.tile {
        parts.push("tiled".to_string());
    }
    format!("{}{}", parts.join("_"), ext)
}

/// Derive the output path for a watermarked copy of `source`.
///
/// With `obscure` the canonical name's digest becomes the filename and the
/// original basename disappears from the path. Without it the digest is a
/// directory bucket and the original basename is kept.
pub fn output_path(
    source: &Path,
    watermark_id: u64,
    params: &ResolvedParams,
    obscure: bool,
) -> PathBuf {
    let basename = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let name = canonical_name(basename, &ext, watermark_id, params);
    let digest = Sha256::digest(name.as_bytes());
    let hash = format!("{digest:x}");

    let basedir = source.parent().unwrap_or(Path::new("")).join(WATERMARKED_DIR);
    if obscure {
        basedir.join(format!("{hash}{ext}"))
    } else {
        basedir.join(hash).join(format!("{basename}{ext}"))
    }
}

/// Create the parent directory of `path`. Idempotent: an existing
/// directory is success, any other filesystem error propagates.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => std::fs::create_dir_all(parent),
        None => Ok(()),
    }
}

/// Whether the cached file at `path` is still valid against a definition
/// last updated at `updated`: it exists and its mtime is >= `updated`.
pub fn is_valid(path: &Path, updated: DateTime<Utc>) -> bool {
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(mtime) => DateTime::<Utc>::from(mtime) >= updated,
        Err(_) => false,
    }
}
