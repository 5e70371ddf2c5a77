use std::io::Cursor;
use std::path::PathBuf;
use tessera_core::{GridSpec, SourceAsset, SourceKind, VectorFragment, width_from_height};
use tessera_render::{ImageSizeProbe, LayoutOptions, NormalizeOptions, layout, normalize, resize};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture(name: &str) -> SourceAsset {
    let path = workspace_root().join("fixtures").join("badges").join(name);
    let bytes = std::fs::read(&path).expect("fixture");
    SourceAsset::from_file_name(name, bytes).expect("supported extension")
}

fn png(width: u32, height: u32) -> SourceAsset {
    let mut bytes = Vec::new();
    image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]))
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode png");
    SourceAsset::new(SourceKind::Png, bytes)
}

fn normalized(asset: &SourceAsset, name: &str) -> VectorFragment {
    normalize(asset, name, &NormalizeOptions::default(), &ImageSizeProbe).expect("normalize ok")
}

#[test]
fn fixtures_normalize_to_well_formed_fragments() {
    let cases = [
        ("inkscape.svg", 200.0),
        ("viewbox-only.svg", 100.0),
        ("doctype.svg", 300.0),
        ("illustrator.svg", 200.0),
    ];
    for (name, width) in cases {
        let fragment = normalized(&fixture(name), name.trim_end_matches(".svg"));
        assert_eq!(fragment.height(), 100.0, "{name}");
        assert_eq!(fragment.width(), width, "{name}");

        let doc = roxmltree::Document::parse(fragment.markup())
            .unwrap_or_else(|e| panic!("{name} is not well-formed: {e}"));
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "svg");
        assert_eq!(root.attribute("x"), Some("0"));
        assert_eq!(root.attribute("y"), Some("0"));
        assert!(
            doc.descendants()
                .any(|n| n.has_tag_name("clipPath") && n.attribute("id") == fragment.clip_id())
        );
    }
}

#[test]
fn illustrator_namespace_entities_survive_normalization() {
    let fragment = normalized(&fixture("illustrator.svg"), "html5");
    assert!(!fragment.markup().contains("&ns_"));

    let doc = roxmltree::Document::parse(fragment.markup()).expect("well-formed");
    let svg_ns = Some("http://www.w3.org/2000/svg");
    let inner = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name("svg"))
        .expect("inner root");
    assert_eq!(inner.tag_name().namespace(), svg_ns);
    assert_eq!(inner.lookup_namespace_uri(Some("xlink")), Some("http://www.w3.org/1999/xlink"));
    assert!(
        doc.descendants()
            .filter(|n| n.has_tag_name("rect") || n.has_tag_name("path"))
            .all(|n| n.tag_name().namespace() == svg_ns)
    );
}

#[test]
fn mixed_sources_compose_into_one_document() {
    let fragments = vec![
        normalized(&png(250, 100), "wide"),
        normalized(&fixture("viewbox-only.svg"), "clock"),
        normalized(&fixture("inkscape.svg"), "stack"),
        normalized(&png(50, 100), "narrow"),
    ];
    let out = layout(
        &fragments,
        &GridSpec::from_hints(Some(2), None, None),
        &LayoutOptions::default(),
    )
    .expect("layout ok");

    let doc = roxmltree::Document::parse(&out).expect("well-formed composite");
    let root = doc.root_element();
    // Columns: max(100, 80) and max(40, 20), rows of 40 with a gap of 5.
    assert_eq!(root.attribute("width"), Some("145"));
    assert_eq!(root.attribute("height"), Some("85"));

    let cells: Vec<_> = root.children().filter(|n| n.is_element()).collect();
    assert_eq!(cells.len(), 4);
    let origins: Vec<_> = cells
        .iter()
        .map(|n| (n.attribute("x").unwrap(), n.attribute("y").unwrap()))
        .collect();
    assert_eq!(origins, vec![("0", "0"), ("105", "0"), ("0", "45"), ("105", "45")]);
    for cell in &cells {
        assert_eq!(cell.attribute("height"), Some("40px"));
    }
}

#[test]
fn cell_width_is_independent_of_current_height() {
    let fragment = normalized(&fixture("inkscape.svg"), "stack");
    let expected = width_from_height(40.0, fragment.markup()).unwrap();
    for h in [1.0, 40.0, 100.0, 333.0] {
        let w = width_from_height(h, fragment.markup()).unwrap();
        let scaled = resize(fragment.markup(), w, h).unwrap();
        assert_eq!(width_from_height(40.0, &scaled).unwrap(), expected, "h = {h}");
    }
}

#[test]
fn raster_badges_scale_to_row_height() {
    let fragment = normalized(&png(250, 100), "wide");
    assert_eq!(fragment.width_at_height(40.0), 100.0);
    let out = layout(&[fragment], &GridSpec::default(), &LayoutOptions::default()).unwrap();
    assert!(out.contains(r#"width="100px" height="40px""#));
}
