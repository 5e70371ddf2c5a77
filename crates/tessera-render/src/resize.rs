//! Root-element size and position rewrites.
//!
//! Fragments carry a `viewBox`, so rewriting the root `width`/`height` scales the whole badge;
//! nested clip paths and images are never touched.

use tessera_core::markup;
use tessera_core::utils::fmt_length;
use tessera_core::{Result, VectorFragment};

pub fn resize(markup: &str, width: f64, height: f64) -> Result<String> {
    let width = format!("{}px", fmt_length(width));
    let height = format!("{}px", fmt_length(height));
    markup::set_attributes(markup, &[("width", &width), ("height", &height)])
}

/// Sets the root `x`/`y` used when the fragment is nested inside a composite canvas.
pub fn position(markup: &str, x: f64, y: f64) -> Result<String> {
    let x = fmt_length(x);
    let y = fmt_length(y);
    markup::set_attributes(markup, &[("x", &x), ("y", &y)])
}

/// Makes the root fill its parent viewport.
pub fn fill_parent(markup: &str) -> Result<String> {
    markup::set_attributes(markup, &[("width", "100%"), ("height", "100%")])
}

pub fn resize_fragment(
    fragment: &VectorFragment,
    width: f64,
    height: f64,
) -> Result<VectorFragment> {
    VectorFragment::parse(resize(fragment.markup(), width, height)?)
}

pub fn position_fragment(fragment: &VectorFragment, x: f64, y: f64) -> Result<VectorFragment> {
    VectorFragment::parse(position(fragment.markup(), x, y)?)
}
