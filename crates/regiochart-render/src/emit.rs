use crate::RenderOptions;
use crate::format::{FormatContext, truncate_label};
use crate::layout::{Layout, ValueScale};
use crate::model::{
    AccessibleTable, ChartGeometry, DrawInstruction, GuideKind, LegendItem, LinePoint, TableColumn,
    TableRow, TextAnchor, TextRole,
};
use crate::svg::fmt;
use regiochart_core::{ChartConfig, Domain, NormalizedChart, Series, SeriesKind, ValueKind};

/// Running stack edges of one category: `top` grows upward with positive values, `bottom`
/// downward with negative ones.
#[derive(Debug, Clone, Copy, PartialEq)]
struct StackCursor {
    top: f64,
    bottom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BarSpan {
    y: f64,
    height: f64,
}

/// Places one stacked segment. Segments stop at the plot edges, which only matters when the
/// category total saturated at `±f64::MAX`.
fn stack_segment(
    cursor: StackCursor,
    value: Option<f64>,
    scale: &ValueScale,
) -> (StackCursor, BarSpan) {
    match value {
        Some(v) if v > 0.0 => {
            let mut height = scale.height(v);
            let mut y = cursor.top - height;
            if y < scale.top() {
                y = scale.top();
                height = (cursor.top - y).max(0.0);
            }
            (StackCursor { top: y, ..cursor }, BarSpan { y, height })
        }
        Some(v) if v < 0.0 => {
            let mut height = scale.height(v);
            if cursor.bottom + height > scale.bottom() {
                height = (scale.bottom() - cursor.bottom).max(0.0);
            }
            let span = BarSpan {
                y: cursor.bottom,
                height,
            };
            (
                StackCursor {
                    bottom: cursor.bottom + height,
                    ..cursor
                },
                span,
            )
        }
        _ => (
            cursor,
            BarSpan {
                y: cursor.top,
                height: 0.0,
            },
        ),
    }
}

fn stacked_spans(bars: &[Series], category_index: usize, scale: &ValueScale) -> Vec<BarSpan> {
    let y0 = scale.y(0.0);
    bars.iter()
        .scan(StackCursor { top: y0, bottom: y0 }, |cursor, series| {
            let (next, span) = stack_segment(*cursor, series.value(category_index), scale);
            *cursor = next;
            Some(span)
        })
        .collect()
}

fn grouped_span(value: Option<f64>, scale: &ValueScale) -> BarSpan {
    let y0 = scale.y(0.0);
    match value {
        Some(v) => {
            let height = scale.height(v);
            BarSpan {
                y: if v >= 0.0 { y0 - height } else { y0 },
                height,
            }
        }
        None => BarSpan { y: y0, height: 0.0 },
    }
}

pub(crate) fn line_path(points: &[LinePoint]) -> String {
    let Some((first, rest)) = points.split_first() else {
        return String::new();
    };
    let mut out = format!("M{},{}", fmt(first.x), fmt(first.y));
    if rest.is_empty() {
        out.push('Z');
        return out;
    }
    for p in rest {
        out.push_str(&format!("L{},{}", fmt(p.x), fmt(p.y)));
    }
    out
}

fn guides(layout: &Layout, scale: &ValueScale, zero_baseline: bool) -> Vec<DrawInstruction> {
    let left = layout.plot_left();
    let right = layout.plot_right();
    let bottom = layout.plot_bottom();
    let mut out = vec![
        DrawInstruction::Guide {
            kind: GuideKind::Baseline,
            x1: left,
            y1: bottom,
            x2: right,
            y2: bottom,
        },
        DrawInstruction::Guide {
            kind: GuideKind::ValueAxis,
            x1: left,
            y1: layout.plot_top(),
            x2: left,
            y2: bottom,
        },
    ];
    if zero_baseline {
        let y0 = scale.y(0.0);
        out.push(DrawInstruction::Guide {
            kind: GuideKind::Zero,
            x1: left,
            y1: y0,
            x2: right,
            y2: y0,
        });
    }
    out
}

fn category_group(
    chart: &NormalizedChart,
    category_index: usize,
    bar_colors: &[String],
    layout: &Layout,
    scale: &ValueScale,
    options: &RenderOptions,
) -> DrawInstruction {
    let spans = if layout.stacked {
        stacked_spans(&chart.bars, category_index, scale)
    } else {
        chart
            .bars
            .iter()
            .map(|s| grouped_span(s.value(category_index), scale))
            .collect()
    };

    let mut children: Vec<DrawInstruction> = chart
        .bars
        .iter()
        .zip(spans)
        .enumerate()
        .map(|(series_index, (series, span))| DrawInstruction::Bar {
            series_key: series.key.clone(),
            category_index,
            value: series.value(category_index),
            x: layout.bar_left(category_index, series_index),
            y: span.y,
            width: layout.bar_width,
            height: span.height,
            fill: bar_colors[series_index].clone(),
        })
        .collect();

    let category = &chart.categories[category_index];
    let text = truncate_label(category, options.constants.label_max_chars);
    let full_text = (text != *category).then(|| category.clone());
    children.push(DrawInstruction::Text {
        role: TextRole::CategoryLabel,
        text,
        full_text,
        x: layout.group_center(category_index),
        y: (layout.plot_bottom() + options.constants.category_label_offset)
            .min(layout.viewport_height),
        anchor: TextAnchor::Middle,
    });

    DrawInstruction::Group {
        category_index,
        category: category.clone(),
        children,
    }
}

fn line_series(
    series: &Series,
    color: String,
    category_count: usize,
    layout: &Layout,
    scale: &ValueScale,
    options: &RenderOptions,
) -> DrawInstruction {
    // Missing values sit on the zero line and stay connected to their neighbours.
    let points: Vec<LinePoint> = (0..category_count)
        .map(|idx| {
            let value = series.value(idx);
            LinePoint {
                x: layout.group_center(idx),
                y: scale.y(value.unwrap_or(0.0)),
                value,
            }
        })
        .collect();
    DrawInstruction::Line {
        series_key: series.key.clone(),
        path: line_path(&points),
        points,
        stroke: color,
        stroke_width: options.constants.line_stroke_width,
        point_radius: options.constants.point_radius,
    }
}

fn value_labels(
    domain: &Domain,
    zero_baseline: bool,
    layout: &Layout,
    scale: &ValueScale,
    options: &RenderOptions,
) -> Vec<DrawInstruction> {
    let x = (layout.plot_left() - options.constants.value_label_offset).max(0.0);
    let label = |role: TextRole, value: f64, text: String| DrawInstruction::Text {
        role,
        text,
        full_text: None,
        x,
        y: scale.y(value),
        anchor: TextAnchor::End,
    };
    let axis_text = |value: f64| {
        options
            .formatter
            .format(Some(value), ValueKind::Number, None, FormatContext::Axis)
    };
    let mut out = vec![
        label(TextRole::MaxValue, domain.max, axis_text(domain.max)),
        label(TextRole::MinValue, domain.min, axis_text(domain.min)),
    ];
    if zero_baseline {
        out.push(label(TextRole::ZeroValue, 0.0, "0".to_string()));
    }
    out
}

fn accessible_table(
    chart: &NormalizedChart,
    visible: bool,
    options: &RenderOptions,
) -> AccessibleTable {
    let columns = chart
        .all_series()
        .map(|(series_kind, s)| TableColumn {
            key: s.key.clone(),
            label: s.label.clone(),
            series_kind,
            value_kind: s.kind,
        })
        .collect();
    let rows = chart
        .categories
        .iter()
        .enumerate()
        .map(|(idx, category)| TableRow {
            category: category.clone(),
            cells: chart
                .all_series()
                .map(|(_, s)| {
                    options.formatter.format(
                        s.value(idx),
                        s.kind,
                        s.unit_key.as_deref(),
                        FormatContext::Table,
                    )
                })
                .collect(),
        })
        .collect();
    AccessibleTable {
        visible,
        columns,
        rows,
    }
}

/// Last finite value of a series, shown next to its legend entry.
fn latest_value(series: &Series) -> Option<f64> {
    series.values.iter().rev().find_map(|v| *v)
}

/// Produces the draw list, accessible table and legend for an already normalized chart.
///
/// Draw order: guides, one group per category (bars, then the category label), one line per
/// line series, then the value labels.
pub fn emit_geometry(
    chart: &NormalizedChart,
    config: &ChartConfig,
    domain: Domain,
    layout: Layout,
    options: &RenderOptions,
) -> ChartGeometry {
    let scale = ValueScale::new(&domain, &layout);
    let zero_baseline = domain.has_zero_baseline();

    let bar_colors: Vec<String> = chart
        .bars
        .iter()
        .enumerate()
        .map(|(idx, s)| options.palette.resolve(s, idx, SeriesKind::Bar))
        .collect();
    let line_colors: Vec<String> = chart
        .lines
        .iter()
        .enumerate()
        .map(|(idx, s)| options.palette.resolve(s, idx, SeriesKind::Line))
        .collect();

    let mut primitives = guides(&layout, &scale, zero_baseline);
    for category_index in 0..chart.categories.len() {
        primitives.push(category_group(
            chart,
            category_index,
            &bar_colors,
            &layout,
            &scale,
            options,
        ));
    }
    for (series, color) in chart.lines.iter().zip(&line_colors) {
        primitives.push(line_series(
            series,
            color.clone(),
            chart.categories.len(),
            &layout,
            &scale,
            options,
        ));
    }
    primitives.extend(value_labels(&domain, zero_baseline, &layout, &scale, options));

    let legend = if config.show_legend {
        chart
            .bars
            .iter()
            .zip(&bar_colors)
            .map(|(s, c)| (SeriesKind::Bar, s, c))
            .chain(
                chart
                    .lines
                    .iter()
                    .zip(&line_colors)
                    .map(|(s, c)| (SeriesKind::Line, s, c)),
            )
            .map(|(series_kind, s, color)| LegendItem {
                key: s.key.clone(),
                label: s.label.clone(),
                color: color.clone(),
                series_kind,
                latest: options.formatter.format(
                    latest_value(s),
                    s.kind,
                    s.unit_key.as_deref(),
                    FormatContext::Legend,
                ),
            })
            .collect()
    } else {
        Vec::new()
    };

    ChartGeometry {
        width: layout.viewport_width,
        height: layout.viewport_height,
        stacked: layout.stacked,
        domain,
        zero_baseline,
        layout,
        primitives,
        table: accessible_table(chart, config.show_table, options),
        legend,
    }
}
