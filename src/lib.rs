//! # Aquamark
//!
//! Overlay a named watermark image onto a target image and get back a
//! stable, cache-friendly path to the composited result. Repeated requests
//! with the same parameters reuse the file already on disk; editing the
//! watermark definition invalidates its cached variants via a timestamp
//! comparison, with no bookkeeping beyond the filesystem itself.
//!
//! # Architecture: One-Way Pipeline
//!
//! A call flows through five stages, each a pure function of the previous
//! stage's output:
//!
//! ```text
//! request string -> WatermarkSpec -> ResolvedParams -> cache path
//!                                         |                |
//!                                         v                v
//!                                    composite        reuse-or-write
//! ```
//!
//! Randomness (random position, random rotation) is drawn exactly once,
//! up front, into [`params::ResolvedParams`]; every later stage, including
//! cache-key derivation, sees only concrete values. This keeps the
//! pipeline testable (inject a seeded generator) and the cache key
//! deterministic.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`params`] | Request parsing and validation; the resolved-parameter types |
//! | [`geometry`] | Pure placement and sizing math (corners, percent axes, fit scaling) |
//! | [`imaging`] | Pixel work: decode/encode, opacity, greyscale, rotation, tiling, blending |
//! | [`cache`] | Canonical names, hashed output paths, mtime staleness |
//! | [`store`] | Watermark definition records and the JSON store |
//! | [`engine`] | The orchestrator tying the stages together |
//! | [`config`] | Engine defaults, TOML-loadable |
//!
//! # Example
//!
//! ```no_run
//! use aquamark::config::EngineConfig;
//! use aquamark::engine::Watermarker;
//! use aquamark::params::WatermarkSpec;
//! use aquamark::store::JsonStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = JsonStore::load("watermarks.json".as_ref())?;
//! let engine = Watermarker::new(EngineConfig::default());
//!
//! let spec = WatermarkSpec::parse("brand,position=br,opacity=60%")?;
//! let out = engine.apply(&store, "photos/pic.jpg", &spec)?;
//! println!("{out}");
//! # Ok(())
//! # }
//! ```
//!
//! # Design Decisions
//!
//! ## Best-Effort Decoration
//!
//! A request naming a watermark that does not exist (or is inactive)
//! returns the original locator instead of an error. Watermarking
//! decorates an image; a missing decoration should never take the image
//! itself down with it. Everything else fails loudly: decode and
//! filesystem errors propagate, and nothing is retried, because quietly
//! serving a wrong or stale composite is the worse failure mode.
//!
//! ## Filesystem as Cache
//!
//! There is no cache index. The output path *is* the cache key: a SHA-256
//! digest of every resolved parameter, so any knob change lands on a new
//! path and a repeat request finds its old file by construction. Staleness
//! is a single mtime-versus-`date_updated` comparison against the owning
//! definition. Concurrent callers racing on the same path both write the
//! same bytes, so the race is harmless.
//!
//! ## Pure-Rust Imaging
//!
//! Compositing uses the `image` and `imageproc` crates end to end: no
//! ImageMagick, no system libraries, a fully self-contained binary.

pub mod cache;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod imaging;
pub mod params;
pub mod store;
