//! Intrinsic size resolution for vector fragments.
//!
//! Explicit `width`/`height` attributes win when both are present and usable; otherwise a
//! `viewBox` declaration supplies the size. The root tag is consulted first, then the whole
//! document, so legacy inputs with misplaced size attributes still resolve.

use crate::markup;
use crate::utils::fmt_length;
use crate::{Error, Result};
use regex::Regex;

fn width_attr_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:^|[\s<])width\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
    })
}

fn height_attr_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:^|[\s<])height\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
    })
}

fn viewbox_attr_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:^|[\s<])viewBox\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width that keeps the aspect ratio at `target_height`, rounded half away from zero.
    pub fn width_at_height(&self, target_height: f64) -> f64 {
        (self.width * target_height / self.height).round()
    }

    pub fn height_at_width(&self, target_width: f64) -> f64 {
        (self.height * target_width / self.width).round()
    }

    fn usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A parsed `viewBox="min-x min-y width height"` value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn new(min_x: f64, min_y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
        }
    }

    /// Parses a viewBox value; numbers may be separated by whitespace and/or commas.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut it = raw
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<f64>().ok());
        let min_x = it.next()??;
        let min_y = it.next()??;
        let width = it.next()??;
        let height = it.next()??;
        if it.next().is_some() {
            return None;
        }
        let vb = Self::new(min_x, min_y, width, height);
        vb.is_usable().then_some(vb)
    }

    /// Finite origin and a positive, finite size.
    pub fn is_usable(&self) -> bool {
        self.size().usable() && self.min_x.is_finite() && self.min_y.is_finite()
    }

    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

impl std::fmt::Display for ViewBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            fmt_length(self.min_x),
            fmt_length(self.min_y),
            fmt_length(self.width),
            fmt_length(self.height)
        )
    }
}

fn first_capture<'a>(re: &Regex, markup: &'a str) -> Option<&'a str> {
    let caps = re.captures(markup)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Parses a size attribute value, tolerating unit suffixes such as `px`.
///
/// Every character outside `[0-9.-]` is dropped before parsing. Relative sizes (`%`) carry no
/// intrinsic size and are rejected.
pub fn parse_length(raw: &str) -> Option<f64> {
    if raw.trim_end().ends_with('%') {
        return None;
    }
    let numeric: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let value = numeric.parse::<f64>().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Size declared by explicit `width`/`height` attributes, if both are usable.
pub fn explicit_dimensions(markup: &str) -> Option<Dimensions> {
    let width = parse_length(first_capture(width_attr_regex(), markup)?)?;
    let height = parse_length(first_capture(height_attr_regex(), markup)?)?;
    Some(Dimensions::new(width, height))
}

/// The first `viewBox` declared anywhere in the document.
pub fn find_viewbox(markup: &str) -> Option<ViewBox> {
    ViewBox::parse(first_capture(viewbox_attr_regex(), markup)?)
}

fn root_dimensions(text: &str) -> Option<Dimensions> {
    let root = markup::root_tag(text).ok().flatten()?;
    let explicit = root
        .get("width")
        .and_then(parse_length)
        .zip(root.get("height").and_then(parse_length))
        .map(|(w, h)| Dimensions::new(w, h));
    explicit.or_else(|| root.get("viewBox").and_then(ViewBox::parse).map(|vb| vb.size()))
}

pub fn resolve_dimensions(markup: &str) -> Result<Dimensions> {
    if let Some(dims) = root_dimensions(markup) {
        return Ok(dims);
    }
    if let Some(dims) = explicit_dimensions(markup) {
        return Ok(dims);
    }
    if let Some(vb) = find_viewbox(markup) {
        tracing::trace!(width = vb.width, height = vb.height, "dimensions from viewBox");
        return Ok(vb.size());
    }
    Err(Error::MissingDimensions)
}

pub fn width_from_height(target_height: f64, markup: &str) -> Result<f64> {
    Ok(resolve_dimensions(markup)?.width_at_height(target_height))
}

pub fn height_from_width(target_width: f64, markup: &str) -> Result<f64> {
    Ok(resolve_dimensions(markup)?.height_at_width(target_width))
}

/// Width for a raster image of `pixel_width`×`pixel_height` scaled to `target_height`.
pub fn width_from_pixels(target_height: f64, pixel_width: u32, pixel_height: u32) -> Result<f64> {
    let dims = Dimensions::new(f64::from(pixel_width), f64::from(pixel_height));
    if !dims.usable() {
        return Err(Error::MissingDimensions);
    }
    Ok(dims.width_at_height(target_height))
}
