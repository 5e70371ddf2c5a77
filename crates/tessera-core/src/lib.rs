#![forbid(unsafe_code)]

//! Markup accessor, dimension resolver and data model for composite SVG badges.
//!
//! Everything in this crate is a pure function over strings or plain data; nothing blocks
//! and nothing holds shared mutable state, so calls from concurrent requests never interfere.

pub mod config;
pub mod dimensions;
pub mod error;
pub mod markup;
pub mod model;
pub mod store;
pub mod utils;

pub use config::{BadgeConfig, DEFAULT_SCOPE};
pub use dimensions::{
    Dimensions, ViewBox, height_from_width, resolve_dimensions, width_from_height,
    width_from_pixels,
};
pub use error::{Error, Result};
pub use model::{
    BadgeReference, GridSpec, SVG_MEDIA_TYPE, SVG_NAMESPACE, SourceAsset, SourceKind,
    VectorFragment,
};
pub use store::{BadgeStore, MemoryBadgeStore, StoredBadge, resolve_badge, resolve_fragments};

#[cfg(test)]
mod tests;
