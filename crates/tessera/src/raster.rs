use tessera_core::{Result, SourceKind, ViewBox};
use tessera_render::{ImageSizeProbe, SizeProbe};

/// Reads raster headers with [`ImageSizeProbe`] and estimates unsized vector inputs by
/// parsing them with `usvg`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsvgSizeProbe {
    raster: ImageSizeProbe,
}

impl SizeProbe for UsvgSizeProbe {
    fn raster_size(&self, kind: SourceKind, bytes: &[u8]) -> Result<(u32, u32)> {
        self.raster.raster_size(kind, bytes)
    }

    fn estimate_vector_size(&self, markup: &str) -> Option<ViewBox> {
        let tree = match usvg::Tree::from_str(markup, &usvg::Options::default()) {
            Ok(tree) => tree,
            Err(err) => {
                tracing::debug!(%err, "usvg could not parse vector input");
                return None;
            }
        };

        // Content bounds first: unsized documents get a 100x100 canvas from usvg.
        let bbox = tree.root().abs_stroke_bounding_box();
        let bounds = ViewBox::new(
            f64::from(bbox.x()),
            f64::from(bbox.y()),
            f64::from(bbox.width()),
            f64::from(bbox.height()),
        );
        if bounds.is_usable() {
            return Some(bounds);
        }
        let size = tree.size();
        let canvas = ViewBox::new(0.0, 0.0, f64::from(size.width()), f64::from(size.height()));
        canvas.is_usable().then_some(canvas)
    }
}
