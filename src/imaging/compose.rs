//! The compositing algorithm.
//!
//! [`composite`] applies a resolved watermark request to a target image:
//! opacity reduction, resampling, greyscale conversion, padded rotation,
//! then a single or tiled paste onto a transparent layer that is
//! alpha-blended over the target. No hidden state: the same inputs produce
//! pixel-identical output.

use crate::geometry;
use crate::params::ResolvedParams;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};

/// Composite `mark` onto `target` according to `params`.
///
/// `params` must carry the fully resolved geometry: the paste offset is
/// expected to have been computed against the post-scale, post-rotate mark
/// dimensions ([`geometry::rotated_canvas`] when rotation is nonzero).
pub fn composite(target: &DynamicImage, mark: &DynamicImage, params: &ResolvedParams) -> RgbaImage {
    let mut mark = mark.to_rgba8();

    if params.opacity < 1.0 {
        reduce_opacity(&mut mark, params.opacity);
    }

    if mark.dimensions() != params.scale {
        mark = imageops::resize(&mark, params.scale.0, params.scale.1, FilterType::Lanczos3);
    }

    if params.greyscale {
        mark = greyscale(&mark);
    }

    if params.rotation != 0 {
        mark = rotate(&mark, params.rotation);
    }

    let (target_w, target_h) = (target.width(), target.height());
    let mut layer = RgbaImage::from_pixel(target_w, target_h, Rgba([0, 0, 0, 0]));
    if params.tile {
        paste_tiled(&mut layer, &mark, params.left, params.top);
    } else {
        imageops::replace(&mut layer, &mark, params.left as i64, params.top as i64);
    }

    let mut out = target.to_rgba8();
    imageops::overlay(&mut out, &layer, 0, 0);
    out
}

/// Multiply the alpha channel by `opacity`.
fn reduce_opacity(mark: &mut RgbaImage, opacity: f64) {
    for pixel in mark.pixels_mut() {
        pixel.0[3] = (pixel.0[3] as f64 * opacity).round() as u8;
    }
}

/// Convert to luminance while keeping the alpha channel.
fn greyscale(mark: &RgbaImage) -> RgbaImage {
    let la = DynamicImage::ImageRgba8(mark.clone()).to_luma_alpha8();
    DynamicImage::ImageLumaA8(la).to_rgba8()
}

/// Rotate the mark on a 1.5x transparent canvas so its corners survive.
///
/// Positive degrees turn counter-clockwise. Bilinear interpolation,
/// transparent fill for the uncovered canvas regions.
fn rotate(mark: &RgbaImage, degrees: u16) -> RgbaImage {
    let (canvas_w, canvas_h) = geometry::rotated_canvas(mark.dimensions());
    let mut canvas = RgbaImage::from_pixel(canvas_w, canvas_h, Rgba([0, 0, 0, 0]));
    imageops::replace(
        &mut canvas,
        mark,
        ((canvas_w - mark.width()) / 2) as i64,
        ((canvas_h - mark.height()) / 2) as i64,
    );

    let theta = -(degrees as f32).to_radians();
    rotate_about_center(&canvas, theta, Interpolation::Bilinear, Rgba([0, 0, 0, 0]))
}

/// Paste copies of the mark so that one copy lands exactly at
/// `(left, top)` and the grid covers the whole layer. The first column and
/// row start at the largest offsets <= 0 congruent to the anchor modulo
/// the mark dimensions.
fn paste_tiled(layer: &mut RgbaImage, mark: &RgbaImage, left: u32, top: u32) {
    let (mark_w, mark_h) = (mark.width() as i64, mark.height() as i64);
    let (layer_w, layer_h) = (layer.width() as i64, layer.height() as i64);

    let first_x = left as i64 % mark_w - mark_w;
    let first_y = top as i64 % mark_h - mark_h;

    let mut y = first_y;
    while y < layer_h {
        let mut x = first_x;
        while x < layer_w {
            imageops::replace(layer, mark, x, y);
            x += mark_w;
        }
        y += mark_h;
    }
}
