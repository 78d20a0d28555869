//! Pixel work, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** (JPEG, PNG, TIFF, WebP) | `image::ImageReader` |
//! | **Resample** | `image::imageops::resize` with `Lanczos3` |
//! | **Rotate** | `imageproc::geometric_transformations::rotate_about_center` |
//! | **Paste / blend** | `image::imageops::{replace, overlay}` |
//! | **Encode** | `image` codecs, JPEG with quality |
//!
//! The module is split into:
//! - **Codec**: decode-by-path and encode-with-quality ([`codec`])
//! - **Compose**: the compositing algorithm itself ([`compose`])

pub mod codec;
pub mod compose;

pub use codec::{CodecError, load_image, save_image};
pub use compose::composite;
