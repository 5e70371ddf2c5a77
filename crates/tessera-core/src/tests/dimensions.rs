use crate::dimensions::*;
use crate::Error;

#[test]
fn explicit_size_attributes_win_over_viewbox() {
    let svg = r#"<svg width="250px" height="100px" viewBox="0 0 50 20"></svg>"#;
    assert_eq!(resolve_dimensions(svg).unwrap(), Dimensions::new(250.0, 100.0));
}

#[test]
fn size_attributes_are_found_outside_the_root_tag() {
    let svg = r#"<svg><rect width="30" height="12"/></svg>"#;
    assert_eq!(resolve_dimensions(svg).unwrap(), Dimensions::new(30.0, 12.0));
}

#[test]
fn stroke_width_is_not_a_width() {
    let svg = r#"<svg viewBox="0 0 24 12"><path stroke-width="2" d="M0 0"/></svg>"#;
    assert_eq!(resolve_dimensions(svg).unwrap(), Dimensions::new(24.0, 12.0));
}

#[test]
fn viewbox_accepts_comma_separators() {
    let svg = r#"<svg viewBox="0,0, 48,16"></svg>"#;
    assert_eq!(resolve_dimensions(svg).unwrap(), Dimensions::new(48.0, 16.0));
}

#[test]
fn percentage_sizes_fall_back_to_viewbox() {
    let svg = r#"<svg width="100%" height="100%" viewBox="0 0 300 100"></svg>"#;
    assert_eq!(resolve_dimensions(svg).unwrap(), Dimensions::new(300.0, 100.0));
}

#[test]
fn missing_size_is_an_error() {
    let err = resolve_dimensions(r#"<svg width="10"></svg>"#).unwrap_err();
    assert!(matches!(err, Error::MissingDimensions));
    let err = resolve_dimensions(r#"<svg viewBox="0 0 0 10"></svg>"#).unwrap_err();
    assert!(matches!(err, Error::MissingDimensions));
}

#[test]
fn parse_length_strips_units() {
    assert_eq!(parse_length("40px"), Some(40.0));
    assert_eq!(parse_length(" 12.5pt "), Some(12.5));
    assert_eq!(parse_length("auto"), None);
    assert_eq!(parse_length("50%"), None);
    assert_eq!(parse_length("-3"), None);
}

#[test]
fn width_from_height_rounds_half_away_from_zero() {
    // 5 * 25 / 10 = 12.5
    let svg = r#"<svg width="5" height="10"></svg>"#;
    assert_eq!(width_from_height(25.0, svg).unwrap(), 13.0);
    assert_eq!(width_from_height(40.0, r#"<svg width="250px" height="100px"/>"#).unwrap(), 100.0);
}

#[test]
fn height_from_width_is_the_inverse_scale() {
    let svg = r#"<svg width="250px" height="100px"/>"#;
    assert_eq!(height_from_width(100.0, svg).unwrap(), 40.0);
}

#[test]
fn width_from_pixels_scales_raster_size() {
    assert_eq!(width_from_pixels(100.0, 640, 480).unwrap(), 133.0);
    assert_eq!(width_from_pixels(100.0, 3, 2).unwrap(), 150.0);
    assert!(matches!(
        width_from_pixels(100.0, 10, 0).unwrap_err(),
        Error::MissingDimensions
    ));
}

#[test]
fn viewbox_display_round_trips_through_parse() {
    let vb = ViewBox::parse("-1.5 0 24 24").unwrap();
    assert_eq!(vb.to_string(), "-1.5 0 24 24");
    assert_eq!(ViewBox::parse("0 0 24"), None);
    assert_eq!(ViewBox::parse("0 0 24 24 1"), None);
}

#[test]
fn root_viewbox_wins_over_nested_sizes() {
    let svg = r#"<svg viewBox="0 0 24 24"><rect width="18" height="6"/></svg>"#;
    assert_eq!(resolve_dimensions(svg).unwrap(), Dimensions::new(24.0, 24.0));
}
