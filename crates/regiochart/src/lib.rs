#![forbid(unsafe_code)]

//! `regiochart` is a headless chart engine for regional real-estate market reports.
//!
//! It turns a loosely-typed request (categories plus bar and line series) into a deterministic
//! description of a combined bar/line chart. Rendering never fails on bad values: unusable
//! scalars become absent points, and a request without usable data yields a no-data result.
//!
//! # Features
//!
//! - `render`: enable layout, geometry and SVG output (`regiochart::render`)
//! - `raster`: enable PNG output via pure-Rust SVG rasterization

pub use regiochart_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use regiochart_render::format::{
        ABSENT_PLACEHOLDER, DefaultFormatter, FormatContext, ValueFormatter, truncate_label,
    };
    pub use regiochart_render::model::{ChartGeometry, ChartRender, DrawInstruction};
    pub use regiochart_render::svg::{DEFAULT_NO_DATA_TEXT, SvgRenderOptions};
    pub use regiochart_render::config::LayoutConstants;
    pub use regiochart_render::theme::Palette;
    pub use regiochart_render::{RenderOptions, render, render_normalized, render_to_json_value};

    #[cfg(feature = "raster")]
    pub mod raster;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Request(#[from] regiochart_core::Error),
        #[error(transparent)]
        Render(#[from] regiochart_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Converts an arbitrary string into a conservative SVG `id` token.
    ///
    /// The root id prefixes the internal `<title>` id, so two charts inlined in one page need
    /// distinct ids. Unsupported characters become `-` and the id always starts with a letter.
    pub fn sanitize_svg_id(raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return "chart-untitled".to_string();
        }

        let mut out = String::with_capacity(raw.len() + 6);
        for ch in raw.chars() {
            let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.';
            out.push(if ok { ch } else { '-' });
        }

        if !out.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            out.insert_str(0, "chart-");
        }

        while out.contains("--") {
            out = out.replace("--", "-");
        }
        let out = out.trim_matches('-');
        if out.is_empty() || out == "chart" {
            return "chart-untitled".to_string();
        }
        out.to_string()
    }

    /// Parses a JSON request and returns its geometry as JSON (`{"noData": true}` when empty).
    pub fn layout_json(text: &str, options: &RenderOptions) -> Result<serde_json::Value> {
        let request = regiochart_core::ChartRequest::from_json_str(text)?;
        let result = render(&request, options);
        Ok(render_to_json_value(&result)?)
    }

    /// Parses a JSON request and renders it to an SVG document.
    pub fn render_svg_str(
        text: &str,
        options: &RenderOptions,
        svg_options: &SvgRenderOptions,
    ) -> Result<String> {
        let request = regiochart_core::ChartRequest::from_json_str(text)?;
        Ok(regiochart_render::render_svg(&request, options, svg_options))
    }

    /// Bundles render and SVG options for callers that render many charts the same way.
    #[derive(Debug, Clone, Default)]
    pub struct HeadlessRenderer {
        pub options: RenderOptions,
        pub svg: SvgRenderOptions,
    }

    impl HeadlessRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_effective_config(mut self, effective_config: &serde_json::Value) -> Self {
            self.options = RenderOptions::from_effective_config(effective_config);
            self
        }

        pub fn with_svg_options(mut self, svg: SvgRenderOptions) -> Self {
            self.svg = svg;
            self
        }

        pub fn render(&self, request: &regiochart_core::ChartRequest) -> ChartRender {
            render(request, &self.options)
        }

        pub fn render_svg(&self, request: &regiochart_core::ChartRequest) -> String {
            regiochart_render::render_svg(request, &self.options, &self.svg)
        }

        pub fn render_svg_str(&self, text: &str) -> Result<String> {
            render_svg_str(text, &self.options, &self.svg)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn sanitize_svg_id_produces_safe_tokens() {
            assert_eq!(sanitize_svg_id("  "), "chart-untitled");
            assert_eq!(sanitize_svg_id("preise 2023"), "preise-2023");
            assert_eq!(sanitize_svg_id("2023/Q1"), "chart-2023-Q1");
            assert_eq!(sanitize_svg_id("a<>b"), "a-b");
            assert_eq!(sanitize_svg_id("###"), "chart-untitled");
        }

        #[test]
        fn layout_json_reports_no_data() {
            let v = layout_json(r#"{"categories": []}"#, &RenderOptions::default()).unwrap();
            assert_eq!(v, serde_json::json!({ "noData": true }));
        }

        #[test]
        fn malformed_request_is_a_request_error() {
            let err = layout_json(r#"{"categories": 3}"#, &RenderOptions::default()).unwrap_err();
            assert!(matches!(err, HeadlessError::Request(_)));
        }
    }
}
