#![cfg(feature = "render")]

use regiochart::render::{HeadlessRenderer, SvgRenderOptions, render_svg_str};
use std::path::PathBuf;

fn fixture_text(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(path).expect("fixture")
}

#[test]
fn headless_renderer_produces_parseable_svg() {
    let renderer = HeadlessRenderer::new().with_svg_options(SvgRenderOptions {
        diagram_id: Some("wanderung".to_string()),
        ..SvgRenderOptions::default()
    });
    let svg = renderer
        .render_svg_str(&fixture_text("stacked_mixed_sign.json"))
        .expect("svg");
    let doc = roxmltree::Document::parse(&svg).expect("well-formed SVG");
    assert_eq!(doc.root_element().attribute("id"), Some("wanderung"));
    let bars = doc
        .descendants()
        .filter(|n| n.tag_name().name() == "rect")
        .filter(|n| n.attribute("class").is_some_and(|c| c.contains("bar")))
        .count();
    assert_eq!(bars, 2);
}

#[test]
fn effective_config_palette_reaches_the_svg() {
    let cfg = serde_json::json!({
        "themeVariables": { "chart": { "barPalette": "#123456" } }
    });
    let renderer = HeadlessRenderer::new().with_effective_config(&cfg);
    let svg = renderer
        .render_svg_str(&fixture_text("grouped_pairs.json"))
        .expect("svg");
    assert!(svg.contains("#123456"));
}

#[test]
fn empty_categories_render_the_placeholder() {
    let svg = render_svg_str(
        &fixture_text("empty_categories.json"),
        &Default::default(),
        &SvgRenderOptions::default(),
    )
    .expect("svg");
    assert!(svg.contains(regiochart::render::DEFAULT_NO_DATA_TEXT));
}
