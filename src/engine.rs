//! The watermarking engine.
//!
//! [`Watermarker`] wires the pipeline together, one call per
//! (target, watermark) pair:
//!
//! ```text
//! resolve spec -> look up definition -> resolve geometry (randomness
//! drawn once) -> derive cache path -> valid? return it : composite,
//! save, return it
//! ```
//!
//! A missing or inactive watermark is not an error: watermarking is
//! best-effort decoration, so the call logs and returns the original
//! locator untouched. Decode and filesystem failures are fatal and
//! surface as-is; nothing is retried, since silently serving a wrong or
//! stale image would be worse than failing loudly.

use crate::cache;
use crate::config::EngineConfig;
use crate::geometry;
use crate::imaging::{CodecError, codec, compose};
use crate::params::{
    InvalidParameter, Position, PositionKey, ResolvedParams, Rotation, WatermarkSpec,
};
use crate::store::{StoreError, WatermarkStore};
use image::DynamicImage;
use rand::Rng;
use tracing::{debug, info};

#[derive(thiserror::Error, Debug)]
pub enum WatermarkError {
    #[error(transparent)]
    Parameter(#[from] InvalidParameter),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The orchestrator. Construct once with the engine defaults, call per
/// image. Calls share nothing but the filesystem cache directory, whose
/// writes are idempotent, so a `Watermarker` is safe to use from
/// parallel workers.
#[derive(Debug, Clone, Default)]
pub struct Watermarker {
    config: EngineConfig,
}

impl Watermarker {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Watermark the image at `locator` and return a locator to the
    /// result. Randomness comes from `thread_rng`; use
    /// [`apply_with_rng`](Self::apply_with_rng) to inject a seeded source.
    pub fn apply(
        &self,
        store: &impl WatermarkStore,
        locator: &str,
        spec: &WatermarkSpec,
    ) -> Result<String, WatermarkError> {
        self.apply_with_rng(store, locator, spec, &mut rand::thread_rng())
    }

    /// Like [`apply`](Self::apply), with an explicit random source. All
    /// randomness (rotation, position) is drawn from `rng` exactly once,
    /// before the caching decision, and treated as fixed afterwards.
    pub fn apply_with_rng(
        &self,
        store: &impl WatermarkStore,
        locator: &str,
        spec: &WatermarkSpec,
        rng: &mut impl Rng,
    ) -> Result<String, WatermarkError> {
        let Some(definition) = store.find_active(&spec.name) else {
            info!(name = %spec.name, "no active watermark with this name, returning original");
            return Ok(locator.to_string());
        };

        let target_path = self.config.to_filesystem(locator);
        let target = codec::load_image(&target_path)?;
        let mark = codec::load_image(&definition.image)?;

        let resolved = self.resolve(spec, &target, &mark, rng);
        debug!(?resolved, "resolved watermark parameters");

        let obscure = spec.obscure.unwrap_or(self.config.obscure_original);
        let out_path = cache::output_path(&target_path, definition.id, &resolved, obscure);

        if cache::is_valid(&out_path, definition.date_updated) {
            debug!(path = %out_path.display(), "cached variant is current, skipping composite");
            return Ok(self.config.to_locator(&out_path));
        }

        cache::ensure_parent_dir(&out_path)?;
        let composed = compose::composite(&target, &mark, &resolved);
        codec::save_image(
            &DynamicImage::ImageRgba8(composed),
            &out_path,
            resolved.quality,
        )?;
        debug!(path = %out_path.display(), "wrote watermarked image");

        Ok(self.config.to_locator(&out_path))
    }

    /// Make every knob concrete. The paste position is resolved against
    /// the post-scale, post-rotate mark dimensions, and random draws
    /// happen here and nowhere else.
    fn resolve(
        &self,
        spec: &WatermarkSpec,
        target: &DynamicImage,
        mark: &DynamicImage,
        rng: &mut impl Rng,
    ) -> ResolvedParams {
        let target_dims = (target.width(), target.height());
        let native = (mark.width(), mark.height());

        let scale = geometry::scale_dimensions(spec.scale, target_dims, native);

        let rotation = match spec.rotation {
            Rotation::Degrees(deg) => deg,
            Rotation::Random => rng.gen_range(0..360),
        };

        // rotation pads the mark canvas, which shifts valid offsets
        let effective = if rotation != 0 {
            geometry::rotated_canvas(scale)
        } else {
            scale
        };

        let position = spec.position.unwrap_or(Position::Random);
        let (left, top) = geometry::resolve_position(position, target_dims, effective, rng);

        let random_once = spec
            .random_position_once
            .unwrap_or(self.config.random_position_once);
        let position_key = if position == Position::Random && random_once {
            PositionKey::Random
        } else {
            PositionKey::Fixed(left, top)
        };

        ResolvedParams {
            left,
            top,
            scale,
            native,
            rotation,
            opacity: spec.opacity,
            greyscale: spec.greyscale,
            tile: spec.tile,
            quality: spec.quality.unwrap_or(self.config.quality),
            position_key,
        }
    }
}
