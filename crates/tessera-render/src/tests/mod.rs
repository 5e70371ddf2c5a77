
use tessera_core::VectorFragment;

/// A canonical fragment of `width`×`height` units, the shape normalization emits.
pub(crate) fn badge(name: &str, width: f64, height: f64) -> VectorFragment {
    VectorFragment::parse(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}px" height="{height}px" viewBox="0 0 {width} {height}" x="0" y="0"><defs><clipPath id="clip-{name}"><rect width="{width}" height="{height}" rx="8"/></clipPath></defs><rect width="{width}" height="{height}" clip-path="url(#clip-{name})"/></svg>"#
    ))
    .unwrap()
}
