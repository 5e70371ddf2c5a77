#![forbid(unsafe_code)]

//! Badge normalization and grid composition.
//!
//! `normalize` turns an uploaded PNG, JPEG or SVG into a canonical fragment; `grid` composes
//! canonical fragments into one rendered document.

pub mod grid;
pub mod normalize;
pub mod probe;
pub mod resize;

pub use grid::{CompositeLayout, LayoutOptions, layout, render_single, resolve_shape};
pub use normalize::{NormalizeOptions, clip_id_for, normalize};
pub use probe::{ImageSizeProbe, SizeProbe};
pub use resize::{fill_parent, position, position_fragment, resize, resize_fragment};

#[cfg(test)]
mod tests;
