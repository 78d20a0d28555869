//! End-to-end pipeline scenarios: real files on disk, real PNG decode and
//! encode, through the public `Watermarker` API.

use aquamark::config::EngineConfig;
use aquamark::engine::Watermarker;
use aquamark::params::WatermarkSpec;
use aquamark::store::{JsonStore, WatermarkDefinition, WatermarkStore};
use chrono::{Duration, Utc};
use image::{Rgba, RgbaImage};
use std::path::Path;
use tempfile::TempDir;

const BLACK: [u8; 4] = [0, 0, 0, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

fn write_png(path: &Path, width: u32, height: u32, rgba: [u8; 4]) {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
        .save(path)
        .unwrap();
}

/// An 800x600 black target plus a 100x50 red mark registered as "brand".
fn fixture(tmp: &TempDir) -> (String, JsonStore) {
    let target = tmp.path().join("photo.png");
    write_png(&target, 800, 600, BLACK);

    let mark = tmp.path().join("brand.png");
    write_png(&mark, 100, 50, RED);

    let mut store = JsonStore::empty();
    store.add("brand", mark, true);
    (target.to_string_lossy().into_owned(), store)
}

/// Store double with a pinned `date_updated`, for staleness scenarios
/// that must not depend on wall-clock or filesystem timestamp granularity.
struct FixedStore(WatermarkDefinition);

impl WatermarkStore for FixedStore {
    fn find_active(&self, name: &str) -> Option<&WatermarkDefinition> {
        (self.0.name == name && self.0.is_active).then_some(&self.0)
    }
}

fn pinned_store(tmp: &TempDir, updated_offset: Duration) -> FixedStore {
    let now = Utc::now();
    FixedStore(WatermarkDefinition {
        id: 1,
        name: "brand".to_string(),
        image: tmp.path().join("brand.png"),
        is_active: true,
        date_created: now,
        date_updated: now + updated_offset,
    })
}

fn spec(args: &str) -> WatermarkSpec {
    WatermarkSpec::parse(args).unwrap()
}

#[test]
fn bottom_right_mark_lands_at_700_550() {
    let tmp = TempDir::new().unwrap();
    let (target, store) = fixture(&tmp);

    let engine = Watermarker::default();
    let out = engine
        .apply(&store, &target, &spec("brand,position=br,opacity=100%"))
        .unwrap();

    let composed = image::open(&out).unwrap().to_rgba8();
    assert_eq!(composed.get_pixel(700, 550).0, RED);
    assert_eq!(composed.get_pixel(799, 599).0, RED);
    assert_eq!(composed.get_pixel(699, 550).0, BLACK);
    assert_eq!(composed.get_pixel(0, 0).0, BLACK);
}

#[test]
fn percent_pair_position_lands_at_350_275() {
    let tmp = TempDir::new().unwrap();
    let (target, store) = fixture(&tmp);

    let engine = Watermarker::default();
    let out = engine
        .apply(&store, &target, &spec("brand,position=50%x50%,opacity=100%"))
        .unwrap();

    let composed = image::open(&out).unwrap().to_rgba8();
    assert_eq!(composed.get_pixel(350, 275).0, RED);
    assert_eq!(composed.get_pixel(449, 324).0, RED);
    assert_eq!(composed.get_pixel(349, 275).0, BLACK);
}

#[test]
fn fit_scale_maximizes_without_overflow() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("photo.png");
    write_png(&target, 800, 600, BLACK);
    // 400x100 mark: width ratio 2.0 binds, so the mark becomes 800x200
    let mark = tmp.path().join("wide.png");
    write_png(&mark, 400, 100, RED);

    let mut store = JsonStore::empty();
    store.add("wide", mark, true);

    let engine = Watermarker::default();
    let out = engine
        .apply(
            &store,
            &target.to_string_lossy(),
            &spec("wide,position=tl,scale=fit,opacity=100%"),
        )
        .unwrap();

    let composed = image::open(&out).unwrap().to_rgba8();
    assert_eq!(composed.get_pixel(799, 199).0, RED);
    assert_eq!(composed.get_pixel(0, 200).0, BLACK);
}

#[test]
fn current_cache_entry_is_reused() {
    let tmp = TempDir::new().unwrap();
    let (target, _) = fixture(&tmp);
    let store = pinned_store(&tmp, Duration::hours(-1));

    let engine = Watermarker::default();
    let request = spec("brand,position=c");
    let out = engine.apply(&store, &target, &request).unwrap();

    // a marker overwrite survives the second call iff the cache was reused
    std::fs::write(&out, b"marker").unwrap();
    let again = engine.apply(&store, &target, &request).unwrap();
    assert_eq!(again, out);
    assert_eq!(std::fs::read(&again).unwrap(), b"marker");
}

#[test]
fn updated_definition_forces_recomposite() {
    let tmp = TempDir::new().unwrap();
    let (target, _) = fixture(&tmp);

    let engine = Watermarker::default();
    let request = spec("brand,position=br");
    let original = pinned_store(&tmp, Duration::hours(-1));
    let out = engine.apply(&original, &target, &request).unwrap();

    // clobber the cached file, then move the definition's update time
    // past the file's mtime
    std::fs::write(&out, b"stale bytes").unwrap();
    let updated = pinned_store(&tmp, Duration::hours(1));

    let again = engine.apply(&updated, &target, &request).unwrap();
    assert_eq!(again, out);
    // the stale bytes were replaced by a real image
    assert!(image::open(&again).is_ok());
}

#[test]
fn unknown_watermark_returns_input_and_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let (target, store) = fixture(&tmp);

    let engine = Watermarker::default();
    let out = engine.apply(&store, &target, &spec("nope")).unwrap();
    assert_eq!(out, target);
    assert!(!tmp.path().join("watermarked").exists());
}

#[test]
fn unobscured_output_keeps_basename_under_hash_dir() {
    let tmp = TempDir::new().unwrap();
    let (target, store) = fixture(&tmp);

    let engine = Watermarker::new(EngineConfig {
        obscure_original: false,
        ..EngineConfig::default()
    });
    let out = engine
        .apply(&store, &target, &spec("brand,position=br"))
        .unwrap();

    let out = Path::new(&out);
    assert!(out.exists());
    assert_eq!(out.file_name().unwrap(), "photo.png");
    let bucket = out.parent().unwrap().file_name().unwrap().to_str().unwrap();
    assert_eq!(bucket.len(), 64);
    assert!(bucket.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn tiled_greyscale_rotated_request_covers_target() {
    let tmp = TempDir::new().unwrap();
    let (target, store) = fixture(&tmp);

    let engine = Watermarker::default();
    let out = engine
        .apply(
            &store,
            &target,
            &spec("brand,position=tl,tile=1,greyscale=1,rotation=30,opacity=100%"),
        )
        .unwrap();

    let composed = image::open(&out).unwrap().to_rgba8();
    assert_eq!(composed.dimensions(), (800, 600));
    // greyscale mark: any painted pixel has equal channels and some must
    // differ from the pure black target
    let painted = composed
        .pixels()
        .filter(|p| p.0 != BLACK)
        .collect::<Vec<_>>();
    assert!(!painted.is_empty());
    assert!(painted.iter().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
}
