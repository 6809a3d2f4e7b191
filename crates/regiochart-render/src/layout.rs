use crate::config::LayoutConstants;
use regiochart_core::Domain;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Pixel geometry of one render. Depends on counts and viewport only, never on values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub category_count: usize,
    pub bar_series_count: usize,
    pub stacked: bool,
    pub padding: Padding,
    /// Horizontal factor applied to every base width and gap.
    pub scale: f64,
    pub bar_width: f64,
    pub bar_gap: f64,
    pub group_width: f64,
    pub group_gap: f64,
    pub draw_width: f64,
    pub draw_height: f64,
}

impl Layout {
    pub fn group_left(&self, category_index: usize) -> f64 {
        self.padding.left + category_index as f64 * (self.group_width + self.group_gap)
    }

    pub fn group_center(&self, category_index: usize) -> f64 {
        self.group_left(category_index) + self.group_width / 2.0
    }

    /// Left edge of a bar. Stacked bars share the whole group slot.
    pub fn bar_left(&self, category_index: usize, series_index: usize) -> f64 {
        let base = self.group_left(category_index);
        if self.stacked {
            base
        } else {
            base + series_index as f64 * (self.bar_width + self.bar_gap)
        }
    }

    pub fn plot_left(&self) -> f64 {
        self.padding.left
    }

    pub fn plot_right(&self) -> f64 {
        self.padding.left + self.draw_width
    }

    pub fn plot_top(&self) -> f64 {
        self.padding.top
    }

    pub fn plot_bottom(&self) -> f64 {
        self.padding.top + self.draw_height
    }
}

/// Shrinks a padding pair proportionally when it does not fit into `extent`, so the plot box
/// never starts outside the viewport.
fn fit_padding(first: f64, second: f64, extent: f64) -> (f64, f64) {
    let total = first + second;
    if total <= extent || total <= 0.0 {
        return (first, second);
    }
    let factor = extent.max(0.0) / total;
    (first * factor, second * factor)
}

pub fn plan_layout(
    category_count: usize,
    bar_series_count: usize,
    stacked: bool,
    viewport_width: f64,
    viewport_height: f64,
    constants: &LayoutConstants,
) -> Layout {
    let (base_bar_width, base_gap) = if stacked {
        (constants.stacked_bar_width, 0.0)
    } else {
        let shrink = constants.bar_shrink_per_series * bar_series_count as f64;
        (
            (constants.grouped_bar_width - shrink).max(constants.grouped_bar_min_width),
            constants.bar_gap,
        )
    };

    // A chart with only line series still needs one slot per category.
    let slots = bar_series_count.max(1) as f64;
    let base_group_width = if stacked {
        base_bar_width
    } else {
        slots * base_bar_width + (slots - 1.0) * base_gap
    };

    let n = category_count as f64;
    let inner_width = if category_count == 0 {
        0.0
    } else {
        n * base_group_width + (n - 1.0) * constants.group_gap
    };

    let (left, right) = fit_padding(
        constants.padding_left,
        constants.padding_right,
        viewport_width,
    );
    let (top, bottom) = fit_padding(
        constants.padding_top,
        constants.padding_bottom,
        viewport_height,
    );
    let padding = Padding {
        left,
        right,
        top,
        bottom,
    };
    let available_width = (viewport_width - padding.left - padding.right).max(0.0);
    let scale = if inner_width == 0.0 {
        1.0
    } else {
        available_width / inner_width
    };
    let draw_height = (viewport_height - padding.top - padding.bottom).max(0.0);

    let layout = Layout {
        viewport_width,
        viewport_height,
        category_count,
        bar_series_count,
        stacked,
        padding,
        scale,
        bar_width: base_bar_width * scale,
        bar_gap: base_gap * scale,
        group_width: base_group_width * scale,
        group_gap: constants.group_gap * scale,
        draw_width: if inner_width == 0.0 {
            available_width
        } else {
            inner_width * scale
        },
        draw_height,
    };
    tracing::trace!(
        categories = category_count,
        bars = bar_series_count,
        stacked,
        scale,
        bar_width = layout.bar_width,
        "planned chart layout"
    );
    layout
}

/// The one value-to-y mapping shared by bars, lines, guides and value labels.
///
/// Works on halved values so that domains close to `±f64::MAX` still map to finite pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScale {
    top: f64,
    draw_height: f64,
    half_min: f64,
    half_span: f64,
}

impl ValueScale {
    pub fn new(domain: &Domain, layout: &Layout) -> Self {
        Self {
            top: layout.plot_top(),
            draw_height: layout.draw_height,
            half_min: domain.min / 2.0,
            half_span: domain.half_span(),
        }
    }

    pub fn y(&self, value: f64) -> f64 {
        let ratio = (value / 2.0 - self.half_min) / self.half_span;
        self.top + self.draw_height - ratio * self.draw_height
    }

    /// Pixel height of a bar segment for `value`; never negative.
    pub fn height(&self, value: f64) -> f64 {
        (value / 2.0).abs() / self.half_span * self.draw_height
    }

    /// Converts a pixel height back to a value magnitude.
    pub fn value_for_height(&self, height: f64) -> f64 {
        if self.draw_height == 0.0 {
            0.0
        } else {
            height / self.draw_height * self.half_span * 2.0
        }
    }

    /// Topmost pixel row of the plot area.
    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.draw_height
    }
}
