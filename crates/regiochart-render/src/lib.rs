#![forbid(unsafe_code)]

//! Chart layout engine for regional market report charts.
//!
//! The pipeline is four pure stages: normalize (`regiochart-core`), domain (`regiochart-core`),
//! [`layout::plan_layout`], and [`emit::emit_geometry`]. [`render`] runs all of them; nothing is
//! cached between calls, so identical input always yields identical geometry.

pub mod config;
pub mod emit;
pub mod format;
pub mod layout;
pub mod model;
pub mod svg;
pub mod theme;

use crate::config::LayoutConstants;
use crate::format::{DefaultFormatter, ValueFormatter};
use crate::model::ChartRender;
use crate::theme::Palette;
use regiochart_core::{ChartConfig, ChartRequest, NormalizedChart, compute_domain, normalize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] regiochart_core::Error),
    #[error("geometry JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct RenderOptions {
    pub formatter: Arc<dyn ValueFormatter + Send + Sync>,
    pub constants: LayoutConstants,
    pub palette: Palette,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            formatter: Arc::new(DefaultFormatter),
            constants: LayoutConstants::default(),
            palette: Palette::default(),
        }
    }
}

impl std::fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOptions")
            .field("constants", &self.constants)
            .field("palette", &self.palette)
            .finish_non_exhaustive()
    }
}

impl RenderOptions {
    /// Options with constants and palette read from an effective config object.
    pub fn from_effective_config(effective_config: &Value) -> Self {
        Self {
            constants: LayoutConstants::from_effective_config(effective_config),
            palette: Palette::from_effective_config(effective_config),
            ..Self::default()
        }
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn ValueFormatter + Send + Sync>) -> Self {
        self.formatter = formatter;
        self
    }
}

/// Runs the whole pipeline for one request.
pub fn render(request: &ChartRequest, options: &RenderOptions) -> ChartRender {
    let chart = normalize(request);
    render_normalized(&chart, &request.config, options)
}

pub fn render_normalized(
    chart: &NormalizedChart,
    config: &ChartConfig,
    options: &RenderOptions,
) -> ChartRender {
    if !chart.has_data() {
        tracing::debug!(
            categories = chart.categories.len(),
            "chart has no data; skipping layout"
        );
        return ChartRender::NoData;
    }
    let config = config.sanitized();

    let domain = compute_domain(
        &chart.bars,
        &chart.lines,
        config.stacked,
        chart.categories.len(),
    );
    let layout = layout::plan_layout(
        chart.categories.len(),
        chart.bars.len(),
        config.stacked,
        config.viewport_width,
        config.viewport_height,
        &options.constants,
    );
    ChartRender::Chart(emit::emit_geometry(chart, &config, domain, layout, options))
}

/// Decodes a JSON request document and renders it.
pub fn render_json(text: &str, options: &RenderOptions) -> Result<ChartRender> {
    let request = ChartRequest::from_json_str(text)?;
    Ok(render(&request, options))
}

/// Renders straight to an SVG document, using the placeholder document for the no-data case.
pub fn render_svg(
    request: &ChartRequest,
    options: &RenderOptions,
    svg_options: &svg::SvgRenderOptions,
) -> String {
    match render(request, options) {
        ChartRender::Chart(geometry) => svg::render_chart_svg(&geometry, svg_options),
        ChartRender::NoData => {
            let config = request.config.sanitized();
            svg::render_no_data_svg(config.viewport_width, config.viewport_height, svg_options)
        }
    }
}

/// JSON view of a render result: the geometry, or `{"noData": true}`.
pub fn render_to_json_value(result: &ChartRender) -> Result<Value> {
    Ok(match result {
        ChartRender::Chart(geometry) => serde_json::to_value(geometry)?,
        ChartRender::NoData => serde_json::json!({ "noData": true }),
    })
}
