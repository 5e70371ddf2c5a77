#![forbid(unsafe_code)]

//! `tessera` normalizes uploaded badge images into canonical SVG fragments and composes
//! stored badges into a single grid document.
//!
//! # Features
//!
//! - `raster`: estimate the size of vector inputs that declare neither `width`/`height` nor a
//!   `viewBox` by parsing them with `usvg`

pub use tessera_core::*;
pub use tessera_render::{
    CompositeLayout, ImageSizeProbe, LayoutOptions, NormalizeOptions, SizeProbe, clip_id_for,
};

pub mod request;
pub mod upload;

#[cfg(feature = "raster")]
pub mod raster;

pub use request::BadgeRequest;

use std::sync::Arc;

/// The probe used when none is supplied: `usvg`-backed with the `raster` feature, header-only
/// otherwise.
pub fn default_probe() -> Arc<dyn SizeProbe> {
    #[cfg(feature = "raster")]
    {
        Arc::new(raster::UsvgSizeProbe::default())
    }
    #[cfg(not(feature = "raster"))]
    {
        Arc::new(ImageSizeProbe)
    }
}

/// Bundles configuration and a size probe for upload-time normalization and request-time
/// rendering.
///
/// All work is CPU-bound and synchronous; share one renderer across threads behind an `Arc`.
#[derive(Clone)]
pub struct BadgeRenderer {
    pub config: BadgeConfig,
    pub probe: Arc<dyn SizeProbe>,
}

impl Default for BadgeRenderer {
    fn default() -> Self {
        Self {
            config: BadgeConfig::default(),
            probe: default_probe(),
        }
    }
}

impl std::fmt::Debug for BadgeRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BadgeRenderer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BadgeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: BadgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn SizeProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions::from_config(&self.config)
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions::from_config(&self.config)
    }

    pub fn normalize(&self, asset: &SourceAsset, unique_name: &str) -> Result<VectorFragment> {
        tessera_render::normalize(
            asset,
            unique_name,
            &self.normalize_options(),
            self.probe.as_ref(),
        )
    }

    /// Renders one badge at row height, or several badges as a grid.
    pub fn render(&self, fragments: &[VectorFragment], grid: &GridSpec) -> Result<String> {
        let options = self.layout_options();
        match fragments {
            [] => Err(Error::NoFragments),
            [single] => tessera_render::render_single(single, &options),
            many => tessera_render::layout(many, grid, &options),
        }
    }

    pub fn render_references(
        &self,
        store: &dyn BadgeStore,
        references: &[BadgeReference],
        grid: &GridSpec,
    ) -> Result<String> {
        let fragments = resolve_fragments(store, references, &self.config)?;
        self.render(&fragments, grid)
    }

    pub fn render_request(&self, store: &dyn BadgeStore, request: &BadgeRequest) -> Result<String> {
        self.render_references(store, &request.references, &request.grid)
    }

    /// Validates, normalizes and persists a new badge for `owner`.
    pub fn upload(
        &self,
        store: &dyn BadgeStore,
        owner: &str,
        name: &str,
        asset: &SourceAsset,
    ) -> Result<VectorFragment> {
        upload::check_new_badge(store, &self.config, owner, name)?;
        let name = name.trim();
        let fragment = self.normalize(asset, name)?;
        store.put(owner.trim(), name, fragment.markup())?;
        tracing::info!(owner, name, kind = ?asset.kind, "stored badge");
        Ok(fragment)
    }
}
