//! Request parameter parsing and validation.
//!
//! A watermark request arrives as a single argument string in the form
//! `"name,key=value,key=value,..."`, e.g. `"brand,position=br,opacity=60%"`.
//! [`WatermarkSpec::parse`] is the single validation boundary: unknown keys
//! and malformed values are rejected here, before any I/O happens, with an
//! [`InvalidParameter`] naming the offending field.
//!
//! The engine later resolves a spec into [`ResolvedParams`]: every knob made
//! concrete, all randomness drawn exactly once. Resolved values are what the
//! compositor consumes and what the cache key encodes.

use std::fmt;
use thiserror::Error;

/// A knob value that failed validation. Carries the field name so callers
/// can report which part of the request string was malformed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid watermark parameter `{field}`: {value:?}")]
pub struct InvalidParameter {
    pub field: &'static str,
    pub value: String,
}

impl InvalidParameter {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

/// One of the four target corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A single axis of an `X x Y` position pair: an absolute pixel offset or a
/// percentage of the maximum offset on that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coord {
    Absolute(i64),
    /// Fraction in [0, 1] of the maximum offset.
    Percent(f64),
}

/// Where to place the mark on the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Corner(Corner),
    Center,
    Random,
    /// Per-axis placement; the axes may mix absolute and percent forms.
    Pair { x: Coord, y: Coord },
}

impl Position {
    /// Parse a position spec.
    ///
    /// Accepted forms (case-insensitive):
    /// - corners: `tl`, `tr`, `bl`, `br`, or the long forms `top-left`,
    ///   `top-right`, `bottom-left`, `bottom-right`
    /// - `c` / `center`
    /// - `r` / `random`
    /// - axis pairs: `50%x50%`, `50%x100`, `30x40`
    pub fn parse(s: &str) -> Result<Self, InvalidParameter> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "tl" | "top-left" => return Ok(Self::Corner(Corner::TopLeft)),
            "tr" | "top-right" => return Ok(Self::Corner(Corner::TopRight)),
            "bl" | "bottom-left" => return Ok(Self::Corner(Corner::BottomLeft)),
            "br" | "bottom-right" => return Ok(Self::Corner(Corner::BottomRight)),
            "c" | "center" => return Ok(Self::Center),
            "r" | "random" => return Ok(Self::Random),
            _ => {}
        }
        if let Some((x, y)) = lower.split_once('x') {
            return Ok(Self::Pair {
                x: parse_coord(x).ok_or_else(|| InvalidParameter::new("position", s))?,
                y: parse_coord(y).ok_or_else(|| InvalidParameter::new("position", s))?,
            });
        }
        Err(InvalidParameter::new("position", s))
    }
}

fn parse_coord(s: &str) -> Option<Coord> {
    if let Some(pct) = s.strip_suffix('%') {
        let pct: i64 = pct.parse().ok()?;
        Some(Coord::Percent(pct as f64 / 100.0))
    } else {
        s.parse().ok().map(Coord::Absolute)
    }
}

/// How to size the mark relative to its native dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// Multiply both mark axes by a fixed factor.
    Multiplier(f64),
    /// Largest aspect-preserving size that does not overflow the target.
    /// May upscale a small mark.
    Fit,
    /// Exact output dimensions, aspect ratio not preserved.
    Explicit(u32, u32),
}

impl Default for Scale {
    fn default() -> Self {
        Self::Multiplier(1.0)
    }
}

impl Scale {
    /// Parse a scale spec: a positive float (`"1.5"`), `fit`/`f`
    /// (case-insensitive), a percent of the mark's native size (`"75%"`),
    /// or an explicit `WxH` pixel pair (`"120x40"`).
    pub fn parse(s: &str) -> Result<Self, InvalidParameter> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("f") || trimmed.eq_ignore_ascii_case("fit") {
            return Ok(Self::Fit);
        }
        if let Some(pct) = trimmed.strip_suffix('%') {
            let pct: u32 = pct
                .parse()
                .ok()
                .filter(|&p| p > 0)
                .ok_or_else(|| InvalidParameter::new("scale", s))?;
            return Ok(Self::Multiplier(pct as f64 / 100.0));
        }
        if let Some((w, h)) = trimmed.split_once('x') {
            let parse_side = |side: &str| {
                side.parse::<u32>()
                    .ok()
                    .filter(|&px| px > 0)
                    .ok_or_else(|| InvalidParameter::new("scale", s))
            };
            return Ok(Self::Explicit(parse_side(w)?, parse_side(h)?));
        }
        match trimmed.parse::<f64>() {
            Ok(m) if m > 0.0 && m.is_finite() => Ok(Self::Multiplier(m)),
            _ => Err(InvalidParameter::new("scale", s)),
        }
    }
}

/// Rotation knob: a fixed number of degrees or a fresh uniform draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Degrees in [0, 359]. Negative inputs are normalized on parse.
    Degrees(u16),
    Random,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::Degrees(0)
    }
}

impl Rotation {
    /// Parse a rotation spec: an integer degree count (negatives wrap, so
    /// `-45` becomes `315`) or `r`/`random` (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, InvalidParameter> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("r") || trimmed.eq_ignore_ascii_case("random") {
            return Ok(Self::Random);
        }
        trimmed
            .parse::<i64>()
            .map(|deg| Self::Degrees(deg.rem_euclid(360) as u16))
            .map_err(|_| InvalidParameter::new("rotation", s))
    }
}

/// Parse an opacity value: an integer percent with or without a trailing
/// `%` (`"50%"` and `"50"` both mean 0.5). Values outside [0, 100] are
/// rejected.
pub fn parse_opacity(s: &str) -> Result<f64, InvalidParameter> {
    s.trim()
        .strip_suffix('%')
        .unwrap_or(s.trim())
        .parse::<u32>()
        .ok()
        .filter(|&pct| pct <= 100)
        .map(|pct| pct as f64 / 100.0)
        .ok_or_else(|| InvalidParameter::new("opacity", s))
}

fn parse_bool(field: &'static str, s: &str) -> Result<bool, InvalidParameter> {
    match s.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(InvalidParameter::new(field, s)),
    }
}

fn parse_quality(s: &str) -> Result<u8, InvalidParameter> {
    s.trim()
        .parse::<u8>()
        .ok()
        .filter(|&q| (1..=100).contains(&q))
        .ok_or_else(|| InvalidParameter::new("quality", s))
}

/// A fully validated watermark request.
///
/// `position` defaults to a random placement when omitted. `obscure`,
/// `quality` and `random_position_once` stay `None` unless the request
/// overrides them, in which case they win over the engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSpec {
    pub name: String,
    pub position: Option<Position>,
    pub opacity: f64,
    pub scale: Scale,
    pub tile: bool,
    pub greyscale: bool,
    pub rotation: Rotation,
    pub obscure: Option<bool>,
    pub quality: Option<u8>,
    pub random_position_once: Option<bool>,
}

impl WatermarkSpec {
    /// A spec with default knobs for the named watermark.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: None,
            opacity: 0.5,
            scale: Scale::default(),
            tile: false,
            greyscale: false,
            rotation: Rotation::default(),
            obscure: None,
            quality: None,
            random_position_once: None,
        }
    }

    /// Parse a request string: the watermark name followed by
    /// comma-separated `key=value` options.
    ///
    /// ```
    /// # use aquamark::params::{Position, Corner, WatermarkSpec};
    /// let spec = WatermarkSpec::parse("brand,position=br,opacity=60%").unwrap();
    /// assert_eq!(spec.name, "brand");
    /// assert_eq!(spec.position, Some(Position::Corner(Corner::BottomRight)));
    /// assert_eq!(spec.opacity, 0.6);
    /// ```
    pub fn parse(args: &str) -> Result<Self, InvalidParameter> {
        let mut parts = args.split(',');
        let name = parts
            .next()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| InvalidParameter::new("name", args))?;

        let mut spec = Self::new(name);
        for part in parts {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (key, value) = part
                .split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .ok_or_else(|| InvalidParameter::new("option", part))?;
            match key {
                "position" => spec.position = Some(Position::parse(value)?),
                "opacity" => spec.opacity = parse_opacity(value)?,
                "scale" => spec.scale = Scale::parse(value)?,
                "tile" => spec.tile = parse_bool("tile", value)?,
                "greyscale" => spec.greyscale = parse_bool("greyscale", value)?,
                "rotation" => spec.rotation = Rotation::parse(value)?,
                "obscure" => spec.obscure = Some(parse_bool("obscure", value)?),
                "quality" => spec.quality = Some(parse_quality(value)?),
                "random_position_once" => {
                    spec.random_position_once = Some(parse_bool("random_position_once", value)?)
                }
                _ => return Err(InvalidParameter::new("option", key)),
            }
        }
        Ok(spec)
    }
}

/// How the resolved position is encoded into the cache key.
///
/// `Fixed` bakes the concrete offset in. `Random` keeps the symbolic token
/// so that repeated random-once requests converge on one cached file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionKey {
    Fixed(u32, u32),
    Random,
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(left, top) => write!(f, "{left}x{top}"),
            Self::Random => write!(f, "r"),
        }
    }
}

/// A request with every knob made concrete.
///
/// Produced once per call by the engine, after all randomness has been
/// drawn. These values feed both the compositor and the cache key, so a
/// `ResolvedParams` is immutable for the rest of the call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    /// Paste offset, resolved against the post-scale, post-rotate mark.
    pub left: u32,
    pub top: u32,
    /// Mark dimensions after scale resolution, before rotation padding.
    pub scale: (u32, u32),
    /// The mark's native dimensions.
    pub native: (u32, u32),
    /// Degrees in [0, 359].
    pub rotation: u16,
    pub opacity: f64,
    pub greyscale: bool,
    pub tile: bool,
    pub quality: u8,
    pub position_key: PositionKey,
}

impl ResolvedParams {
    /// Scale as a percent of the mark's native width, present only when the
    /// resolved size differs from the native size.
    pub fn scale_percent(&self) -> Option<u32> {
        if self.scale == self.native {
            None
        } else {
            Some((self.scale.0 as f64 / self.native.0 as f64 * 100.0) as u32)
        }
    }
}
