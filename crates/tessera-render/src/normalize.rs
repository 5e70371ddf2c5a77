//! Conversion of uploaded images into canonical badge fragments.
//!
//! Every fragment produced here has an outer `<svg>` root with pixel `width`/`height`, a
//! `viewBox`, and a rounded-corner clip path named after the badge. The height is always the
//! normalization height, so rendering only ever needs to rewrite the root size.

use crate::probe::SizeProbe;
use base64::Engine as _;
use std::fmt::Write as _;
use tessera_core::markup::{
    self, expand_internal_entities, strip_comments, strip_doctype, strip_processing_instructions,
};
use tessera_core::utils::{escape_attr, escape_id, fmt_length};
use tessera_core::{
    BadgeConfig, Error, Result, SVG_NAMESPACE, SourceAsset, SourceKind, VectorFragment, ViewBox,
    resolve_dimensions,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOptions {
    /// Intrinsic height of the emitted fragment.
    pub height: f64,
    /// Clip corner radius in the same units as `height`.
    pub corner_radius: f64,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::from_config(&BadgeConfig::default())
    }
}

impl NormalizeOptions {
    pub fn from_config(config: &BadgeConfig) -> Self {
        Self {
            height: config.normalization_height,
            corner_radius: config.corner_radius,
        }
    }
}

/// Clip path identifier for a badge. Distinct trimmed names map to distinct identifiers.
pub fn clip_id_for(unique_name: &str) -> String {
    format!("clip-{}", escape_id(unique_name.trim()))
}

pub fn normalize(
    asset: &SourceAsset,
    unique_name: &str,
    options: &NormalizeOptions,
    probe: &dyn SizeProbe,
) -> Result<VectorFragment> {
    let clip_id = clip_id_for(unique_name);
    let fragment = match asset.kind {
        SourceKind::Jpeg | SourceKind::Png => {
            normalize_raster(asset.kind, &asset.bytes, &clip_id, options, probe)?
        }
        SourceKind::Svg => normalize_vector(&asset.bytes, &clip_id, options, probe)?,
    };
    tracing::debug!(
        name = unique_name,
        kind = ?asset.kind,
        width = fragment.width(),
        height = fragment.height(),
        "normalized badge"
    );
    Ok(fragment)
}

fn normalize_raster(
    kind: SourceKind,
    bytes: &[u8],
    clip_id: &str,
    options: &NormalizeOptions,
    probe: &dyn SizeProbe,
) -> Result<VectorFragment> {
    let (px_w, px_h) = probe.raster_size(kind, bytes)?;
    let height = options.height;
    let width = tessera_core::width_from_pixels(height, px_w, px_h)?;
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);

    let w = fmt_length(width);
    let h = fmt_length(height);
    let rx = fmt_length(options.corner_radius);
    let clip = escape_attr(clip_id);

    let mut out = String::with_capacity(payload.len() + 512);
    let _ = write!(
        out,
        r#"<svg xmlns="{SVG_NAMESPACE}" width="{w}px" height="{h}px" viewBox="0 0 {w} {h}" x="0" y="0">"#
    );
    out.push('\n');
    let _ = writeln!(
        out,
        r#"  <defs><clipPath id="{clip}"><rect width="{w}" height="{h}" rx="{rx}"/></clipPath></defs>"#
    );
    let _ = writeln!(
        out,
        r#"  <image href="data:{mime};base64,{payload}" width="{w}" height="{h}" clip-path="url(#{clip})" preserveAspectRatio="xMidYMid meet"/>"#,
        mime = kind.mime_type(),
    );
    out.push_str("</svg>");

    VectorFragment::parse(out)
}

fn normalize_vector(
    bytes: &[u8],
    clip_id: &str,
    options: &NormalizeOptions,
    probe: &dyn SizeProbe,
) -> Result<VectorFragment> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::MalformedMarkup {
        message: format!("SVG source is not valid UTF-8: {e}"),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let prolog_free = strip_processing_instructions(&strip_comments(text));
    let cleaned = strip_doctype(&expand_internal_entities(&prolog_free)?);
    let cleaned = cleaned.trim();

    let Some(mut root) = markup::root_tag(cleaned)? else {
        return Err(Error::MalformedMarkup {
            message: "SVG source has no root element".to_string(),
        });
    };
    if root.name != "svg" {
        return Err(Error::MalformedMarkup {
            message: format!("root element is <{}>, expected <svg>", root.name),
        });
    }

    // Size is resolved before the viewBox is detached from the inner root.
    let mut estimated = None;
    let intrinsic = match resolve_dimensions(cleaned) {
        Ok(dims) => dims,
        Err(Error::MissingDimensions) => {
            let bounds = probe
                .estimate_vector_size(cleaned)
                .filter(ViewBox::is_usable)
                .ok_or(Error::MissingDimensions)?;
            estimated = Some(bounds);
            bounds.size()
        }
        Err(err) => return Err(err),
    };

    let height = options.height;
    let width = intrinsic.width_at_height(height);

    let viewbox = root
        .remove("viewBox")
        .and_then(|raw| ViewBox::parse(&raw))
        .or(estimated)
        .unwrap_or_else(|| ViewBox::new(0.0, 0.0, intrinsic.width, intrinsic.height));
    let aspect = root.remove("preserveAspectRatio");

    if !root.has("clip-path") {
        root.set("clip-path", format!("url(#{clip_id})"));
    }
    root.set_all(&[("width", "100%"), ("height", "100%")]);
    let inner = root.splice_into(cleaned);

    let w = fmt_length(width);
    let h = fmt_length(height);
    let rx = fmt_length(options.corner_radius * viewbox.height / height);
    let clip = escape_attr(clip_id);

    let mut out = String::with_capacity(inner.len() + 512);
    let _ = write!(
        out,
        r#"<svg xmlns="{SVG_NAMESPACE}" width="{w}px" height="{h}px" viewBox="{viewbox}" x="0" y="0""#
    );
    if let Some(aspect) = aspect {
        let _ = write!(out, r#" preserveAspectRatio="{}""#, escape_attr(&aspect));
    }
    out.push_str(">\n");
    let _ = writeln!(
        out,
        r#"  <defs><clipPath id="{clip}"><rect x="{x}" y="{y}" width="{vw}" height="{vh}" rx="{rx}"/></clipPath></defs>"#,
        x = fmt_length(viewbox.min_x),
        y = fmt_length(viewbox.min_y),
        vw = fmt_length(viewbox.width),
        vh = fmt_length(viewbox.height),
    );
    out.push_str(&inner);
    out.push_str("\n</svg>");

    VectorFragment::parse(out)
}
