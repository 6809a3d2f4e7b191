use regiochart_core::config::config_color_list;
use regiochart_core::{Series, SeriesKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const FALLBACK_COLOR: &str = "currentColor";

fn default_bar_palette() -> Vec<String> {
    "#1F4E79,#5B9BD5,#A5C8E4,#F4B183,#C55A11,#7F7F7F"
        .split(',')
        .map(|s| s.trim().to_string())
        .collect()
}

fn default_line_palette() -> Vec<String> {
    "#C00000,#2E7D32,#6A1B9A,#EF6C00"
        .split(',')
        .map(|s| s.trim().to_string())
        .collect()
}

/// Colors used for series that do not carry their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub bar: Vec<String>,
    pub line: Vec<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bar: default_bar_palette(),
            line: default_line_palette(),
        }
    }
}

impl Palette {
    /// Reads `themeVariables.chart.barPalette` / `linePalette` overrides.
    pub fn from_effective_config(effective_config: &Value) -> Self {
        let base = Self::default();
        Self {
            bar: config_color_list(effective_config, &["themeVariables", "chart", "barPalette"])
                .unwrap_or(base.bar),
            line: config_color_list(
                effective_config,
                &["themeVariables", "chart", "linePalette"],
            )
            .unwrap_or(base.line),
        }
    }

    /// Palette color for the `series_index`-th series of `kind`, cycling through the palette.
    pub fn default_color(&self, series_index: usize, kind: SeriesKind) -> String {
        let palette = match kind {
            SeriesKind::Bar => &self.bar,
            SeriesKind::Line => &self.line,
        };
        if palette.is_empty() {
            return FALLBACK_COLOR.to_string();
        }
        palette[series_index % palette.len()].clone()
    }

    /// The series' own color if it has one, otherwise the palette color.
    pub fn resolve(&self, series: &Series, series_index: usize, kind: SeriesKind) -> String {
        series
            .color
            .clone()
            .unwrap_or_else(|| self.default_color(series_index, kind))
    }
}
