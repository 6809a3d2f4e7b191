use regiochart_core::config::config_f64;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed engine constants, in unscaled layout units (paddings are in pixels).
///
/// Horizontal bar/gap values are multiplied by the layout scale factor; paddings and label
/// offsets are not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConstants {
    pub stacked_bar_width: f64,
    pub grouped_bar_width: f64,
    pub grouped_bar_min_width: f64,
    pub bar_shrink_per_series: f64,
    pub bar_gap: f64,
    pub group_gap: f64,
    pub padding_left: f64,
    pub padding_right: f64,
    pub padding_top: f64,
    pub padding_bottom: f64,
    pub label_max_chars: usize,
    pub category_label_offset: f64,
    pub value_label_offset: f64,
    pub line_stroke_width: f64,
    pub point_radius: f64,
}

impl Default for LayoutConstants {
    fn default() -> Self {
        Self {
            stacked_bar_width: 30.0,
            grouped_bar_width: 30.0,
            grouped_bar_min_width: 18.0,
            bar_shrink_per_series: 2.0,
            bar_gap: 8.0,
            group_gap: 26.0,
            padding_left: 48.0,
            padding_right: 12.0,
            padding_top: 16.0,
            padding_bottom: 36.0,
            label_max_chars: 10,
            category_label_offset: 16.0,
            value_label_offset: 6.0,
            line_stroke_width: 2.0,
            point_radius: 3.0,
        }
    }
}

fn non_negative(cfg: &Value, key: &str, fallback: f64) -> f64 {
    config_f64(cfg, &["chart", key])
        .filter(|v| *v >= 0.0)
        .unwrap_or(fallback)
}

impl LayoutConstants {
    /// Reads overrides from `chart.*` in an effective config object.
    pub fn from_effective_config(effective_config: &Value) -> Self {
        let base = Self::default();
        let cfg = effective_config;
        let grouped_bar_min_width =
            non_negative(cfg, "groupedBarMinWidth", base.grouped_bar_min_width);
        Self {
            stacked_bar_width: non_negative(cfg, "stackedBarWidth", base.stacked_bar_width),
            grouped_bar_width: non_negative(cfg, "groupedBarWidth", base.grouped_bar_width)
                .max(grouped_bar_min_width),
            grouped_bar_min_width,
            bar_shrink_per_series: non_negative(
                cfg,
                "barShrinkPerSeries",
                base.bar_shrink_per_series,
            ),
            bar_gap: non_negative(cfg, "barGap", base.bar_gap),
            group_gap: non_negative(cfg, "groupGap", base.group_gap),
            padding_left: non_negative(cfg, "paddingLeft", base.padding_left),
            padding_right: non_negative(cfg, "paddingRight", base.padding_right),
            padding_top: non_negative(cfg, "paddingTop", base.padding_top),
            padding_bottom: non_negative(cfg, "paddingBottom", base.padding_bottom),
            label_max_chars: config_f64(cfg, &["chart", "labelMaxChars"])
                .filter(|v| *v >= 2.0)
                .map(|v| v.floor() as usize)
                .unwrap_or(base.label_max_chars),
            category_label_offset: non_negative(
                cfg,
                "categoryLabelOffset",
                base.category_label_offset,
            ),
            value_label_offset: non_negative(cfg, "valueLabelOffset", base.value_label_offset),
            line_stroke_width: non_negative(cfg, "lineStrokeWidth", base.line_stroke_width),
            point_radius: non_negative(cfg, "pointRadius", base.point_radius),
        }
    }
}
