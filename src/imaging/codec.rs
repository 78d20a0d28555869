//! Image decode and encode by path.
//!
//! Decoders for JPEG, PNG, TIFF and WebP are compiled in. Output format is
//! inferred from the destination extension; JPEG honors the quality knob
//! and gets its alpha channel flattened, everything else keeps alpha and
//! encodes at the codec's default settings.

use image::{DynamicImage, ImageReader};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
    #[error("unsupported output format: {0:?}")]
    UnsupportedFormat(String),
}

/// Load and decode an image from disk.
pub fn load_image(path: &Path) -> Result<DynamicImage, CodecError> {
    ImageReader::open(path)
        .map_err(CodecError::Io)?
        .decode()
        .map_err(|e| CodecError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Encode `img` to `path`, choosing the codec from the extension.
pub fn save_image(img: &DynamicImage, path: &Path, quality: u8) -> Result<(), CodecError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let encode_err = |e: image::ImageError| CodecError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    match ext.as_str() {
        "jpg" | "jpeg" => {
            let file = std::fs::File::create(path).map_err(CodecError::Io)?;
            let writer = BufWriter::new(file);
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);
            // JPEG has no alpha channel
            img.to_rgb8().write_with_encoder(encoder).map_err(encode_err)
        }
        "png" | "webp" | "tif" | "tiff" => img.save(path).map_err(encode_err),
        other => Err(CodecError::UnsupportedFormat(other.to_string())),
    }
}
