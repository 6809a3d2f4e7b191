use regiochart_core::{ChartConfig, ChartRequest, RawSeries, stack_totals};
use regiochart_render::layout::ValueScale;
use regiochart_render::model::{ChartGeometry, ChartRender, DrawInstruction, GuideKind, TextRole};
use regiochart_render::{RenderOptions, render, render_json};
use serde_json::{Value, json};
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn render_fixture(name: &str) -> ChartRender {
    let path = workspace_root().join("fixtures").join(name);
    let text = std::fs::read_to_string(&path).expect("fixture");
    render_json(&text, &RenderOptions::default()).expect("valid request")
}

fn expect_chart(out: ChartRender) -> ChartGeometry {
    match out {
        ChartRender::Chart(g) => g,
        ChartRender::NoData => panic!("expected a chart, got no data"),
    }
}

fn request(
    categories: Value,
    bars: Vec<RawSeries>,
    lines: Vec<RawSeries>,
    stacked: bool,
) -> ChartRequest {
    ChartRequest {
        categories: categories.as_array().cloned().unwrap_or_default(),
        bars,
        lines,
        config: ChartConfig {
            stacked,
            ..ChartConfig::default()
        },
    }
}

/// (x, y, width, height, value) of every bar, in draw order.
fn bars(g: &ChartGeometry) -> Vec<(f64, f64, f64, f64, Option<f64>)> {
    g.flat_primitives()
        .into_iter()
        .filter_map(|d| match d {
            DrawInstruction::Bar {
                x,
                y,
                width,
                height,
                value,
                ..
            } => Some((*x, *y, *width, *height, *value)),
            _ => None,
        })
        .collect()
}

fn zero_guide_y(g: &ChartGeometry) -> Option<f64> {
    g.primitives.iter().find_map(|d| match d {
        DrawInstruction::Guide {
            kind: GuideKind::Zero,
            y1,
            ..
        } => Some(*y1),
        _ => None,
    })
}

#[test]
fn stacked_mixed_sign_bars_grow_both_ways_from_zero() {
    let g = expect_chart(render_fixture("stacked_mixed_sign.json"));
    assert!(g.stacked);
    assert_eq!(g.domain.max, 10.0);
    assert_eq!(g.domain.min, -5.0);
    assert!(g.zero_baseline);

    let scale = ValueScale::new(&g.domain, &g.layout);
    let y0 = scale.y(0.0);
    let b = bars(&g);
    assert_eq!(b.len(), 2);

    let (_, y, _, h, v) = b[0];
    assert_eq!(v, Some(10.0));
    assert!((y + h - y0).abs() < 1e-9, "positive bar must end on zero");
    assert!((scale.value_for_height(h) - 10.0).abs() < 1e-9);

    let (_, y, _, h, v) = b[1];
    assert_eq!(v, Some(-5.0));
    assert!((y - y0).abs() < 1e-9, "negative bar must start on zero");
    assert!((scale.value_for_height(h) - 5.0).abs() < 1e-9);
}

#[test]
fn grouped_pairs_have_equal_widths_and_no_overlap() {
    let g = expect_chart(render_fixture("grouped_pairs.json"));
    assert!(!g.zero_baseline);
    assert_eq!(g.domain.min, 0.0);
    assert!(zero_guide_y(&g).is_none());

    let b = bars(&g);
    assert_eq!(b.len(), 6);
    let width = b[0].2;
    for bar in &b {
        assert!((bar.2 - width).abs() < 1e-9);
        assert!((bar.3 - b[0].3).abs() < 1e-9);
    }
    for pair in b.chunks(2) {
        assert!(pair[0].0 + pair[0].2 <= pair[1].0 + 1e-9);
    }
    for next in b.windows(2) {
        assert!(next[0].0 < next[1].0);
    }
}

#[test]
fn empty_categories_signal_no_data() {
    assert!(render_fixture("empty_categories.json").is_no_data());
}

#[test]
fn all_absent_values_signal_no_data() {
    assert!(render_fixture("all_absent.json").is_no_data());
}

#[test]
fn line_gap_shows_placeholder_and_stays_connected() {
    let g = expect_chart(render_fixture("line_with_gap.json"));
    assert_eq!(g.table.rows.len(), 3);
    assert_eq!(g.table.rows[1].cells, vec!["–".to_string()]);
    assert_eq!(g.table.rows[0].cells, vec!["5".to_string()]);

    let line = g
        .primitives
        .iter()
        .find_map(|d| match d {
            DrawInstruction::Line { path, points, .. } => Some((path.clone(), points.clone())),
            _ => None,
        })
        .expect("line primitive");
    assert_eq!(line.1.len(), 3);
    assert!(line.0.starts_with('M'));
    assert_eq!(line.0.matches('L').count(), 2);

    let scale = ValueScale::new(&g.domain, &g.layout);
    assert_eq!(line.1[1].value, None);
    assert!((line.1[1].y - scale.y(0.0)).abs() < 1e-9);
}

#[test]
fn halving_the_viewport_scales_x_proportionally() {
    let make = |width: f64| {
        let mut req = request(
            json!(["2019", "2020", "2021", "2022"]),
            vec![
                RawSeries::new("a", vec![json!(3), json!(4), json!(5), json!(6)]),
                RawSeries::new("b", vec![json!(1), json!(-2), json!(3), json!(-4)]),
            ],
            vec![RawSeries::new("c", vec![json!(2), json!(2), json!(2), json!(2)])],
            false,
        );
        req.config.viewport_width = width;
        expect_chart(render(&req, &RenderOptions::default()))
    };
    let wide = make(720.0);
    let narrow = make(360.0);
    let pad = wide.layout.padding;
    let ratio = (360.0 - pad.left - pad.right) / (720.0 - pad.left - pad.right);
    assert!((narrow.layout.scale / wide.layout.scale - ratio).abs() < 1e-12);

    for (w, n) in bars(&wide).iter().zip(bars(&narrow)) {
        assert!(((w.0 - pad.left) * ratio - (n.0 - pad.left)).abs() < 1e-9);
        assert!((w.2 * ratio - n.2).abs() < 1e-9);
        // Heights do not depend on the width.
        assert!((w.3 - n.3).abs() < 1e-9);
    }
}

fn mixed_request(stacked: bool, categories: usize) -> ChartRequest {
    let cats: Vec<Value> = (0..categories).map(|i| json!(format!("Region {i}"))).collect();
    let series = |seed: i64| {
        (0..categories as i64)
            .map(|i| {
                let v = ((i * 37 + seed * 11) % 23) - 9;
                if v == 0 { Value::Null } else { json!(v as f64 * 1.5) }
            })
            .collect::<Vec<_>>()
    };
    request(
        Value::Array(cats),
        vec![
            RawSeries::new("a", series(1)),
            RawSeries::new("b", series(2)),
            RawSeries::new("c", series(3)),
        ],
        vec![RawSeries::new("trend", series(4))],
        stacked,
    )
}

#[test]
fn bar_heights_are_never_negative() {
    for stacked in [true, false] {
        let g = expect_chart(render(&mixed_request(stacked, 12), &RenderOptions::default()));
        for (_, _, _, h, _) in bars(&g) {
            assert!(h >= 0.0);
        }
    }
}

#[test]
fn stacked_heights_conserve_category_totals() {
    let req = mixed_request(true, 9);
    let g = expect_chart(render(&req, &RenderOptions::default()));
    let chart = regiochart_core::normalize(&req);
    let totals = stack_totals(&chart.bars, chart.categories.len());
    let scale = ValueScale::new(&g.domain, &g.layout);

    for group in &g.primitives {
        let DrawInstruction::Group {
            category_index,
            children,
            ..
        } = group
        else {
            continue;
        };
        let mut pos = 0.0;
        let mut neg = 0.0;
        for child in children {
            if let DrawInstruction::Bar {
                value: Some(v),
                height,
                ..
            } = child
            {
                if *v > 0.0 {
                    pos += scale.value_for_height(*height);
                } else {
                    neg -= scale.value_for_height(*height);
                }
            }
        }
        assert!((pos - totals.positive[*category_index]).abs() < 1e-9);
        assert!((neg - totals.negative[*category_index]).abs() < 1e-9);
    }
}

#[test]
fn zero_guide_and_label_use_the_shared_scale() {
    let g = expect_chart(render(&mixed_request(false, 6), &RenderOptions::default()));
    assert!(g.zero_baseline);
    let scale = ValueScale::new(&g.domain, &g.layout);
    let guide = zero_guide_y(&g).expect("zero guide");
    assert_eq!(guide, scale.y(0.0));

    let label_y = g
        .primitives
        .iter()
        .find_map(|d| match d {
            DrawInstruction::Text {
                role: TextRole::ZeroValue,
                y,
                text,
                ..
            } => {
                assert_eq!(text, "0");
                Some(*y)
            }
            _ => None,
        })
        .expect("zero label");
    assert_eq!(label_y, guide);
}

#[test]
fn identical_input_yields_identical_geometry() {
    let req = mixed_request(true, 7);
    let a = render(&req, &RenderOptions::default());
    let b = render(&req, &RenderOptions::default());
    assert_eq!(a, b);
    let ja = serde_json::to_string(&a.chart().unwrap()).unwrap();
    let jb = serde_json::to_string(&b.chart().unwrap()).unwrap();
    assert_eq!(ja, jb);
}

fn right_extent(d: &DrawInstruction) -> f64 {
    match d {
        DrawInstruction::Guide { x1, x2, .. } => x1.max(*x2),
        DrawInstruction::Bar { x, width, .. } => x + width,
        DrawInstruction::Line { points, .. } => {
            points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max)
        }
        DrawInstruction::Text { x, .. } => *x,
        DrawInstruction::Group { .. } => f64::NEG_INFINITY,
    }
}

#[test]
fn drawing_always_fits_the_viewport_width() {
    for n in [1usize, 5, 50] {
        for stacked in [true, false] {
            let g = expect_chart(render(&mixed_request(stacked, n), &RenderOptions::default()));
            let limit = g.width - g.layout.padding.right;
            for d in g.flat_primitives() {
                assert!(
                    right_extent(d) <= limit + 1e-9,
                    "{d:?} exceeds {limit} for n={n} stacked={stacked}"
                );
            }
        }
    }
}

fn assert_inside_viewport(g: &ChartGeometry) {
    let inside = |x: f64, y: f64| {
        (-1e-9..=g.width + 1e-9).contains(&x) && (-1e-9..=g.height + 1e-9).contains(&y)
    };
    for d in g.flat_primitives() {
        match d {
            DrawInstruction::Guide { x1, y1, x2, y2, .. } => {
                assert!(inside(*x1, *y1) && inside(*x2, *y2), "{d:?}");
            }
            DrawInstruction::Bar {
                x, y, width, height, ..
            } => {
                assert!(inside(*x, *y) && inside(x + width, y + height), "{d:?}");
            }
            DrawInstruction::Line { points, .. } => {
                assert!(points.iter().all(|p| inside(p.x, p.y)), "{d:?}");
            }
            DrawInstruction::Text { x, y, .. } => assert!(inside(*x, *y), "{d:?}"),
            DrawInstruction::Group { .. } => {}
        }
    }
}

#[test]
fn coordinates_stay_inside_the_viewport() {
    assert_inside_viewport(&expect_chart(render_fixture("market_report.json")));
}

#[test]
fn viewports_smaller_than_the_padding_keep_coordinates_inside() {
    for stacked in [true, false] {
        let mut req = request(
            json!(["A", "B"]),
            vec![RawSeries::new("a", vec![json!(4), json!(-2)])],
            vec![RawSeries::new("t", vec![json!(1), json!(3)])],
            stacked,
        );
        req.config.viewport_width = 30.0;
        req.config.viewport_height = 10.0;
        let g = expect_chart(render(&req, &RenderOptions::default()));
        assert_eq!((g.width, g.height), (30.0, 10.0));
        assert_inside_viewport(&g);
    }
}

#[test]
fn huge_stacked_values_keep_finite_coordinates() {
    let req = request(
        json!(["A"]),
        vec![
            RawSeries::new("a", vec![json!(1e308)]),
            RawSeries::new("b", vec![json!(1e308)]),
        ],
        Vec::new(),
        true,
    );
    let g = expect_chart(render(&req, &RenderOptions::default()));
    assert_eq!(g.domain.max, f64::MAX);
    assert_inside_viewport(&g);

    let scale = ValueScale::new(&g.domain, &g.layout);
    let stacked_height: f64 = bars(&g).iter().map(|b| b.3).sum();
    assert!((stacked_height - (scale.y(0.0) - scale.top())).abs() < 1e-9);
}

#[test]
fn huge_grouped_values_of_both_signs_keep_finite_coordinates() {
    let req = request(
        json!(["A", "B"]),
        vec![RawSeries::new("a", vec![json!(f64::MAX), json!(-f64::MAX)])],
        vec![RawSeries::new("t", vec![json!(1e308), json!(-1e308)])],
        false,
    );
    let g = expect_chart(render(&req, &RenderOptions::default()));
    assert!(g.zero_baseline);
    assert_inside_viewport(&g);
}

#[test]
fn draw_order_is_guides_groups_lines_labels() {
    let g = expect_chart(render_fixture("market_report.json"));
    let rank = |d: &DrawInstruction| match d {
        DrawInstruction::Guide { .. } => 0,
        DrawInstruction::Group { .. } => 1,
        DrawInstruction::Line { .. } => 2,
        DrawInstruction::Text { .. } => 3,
        DrawInstruction::Bar { .. } => panic!("bars live inside category groups"),
    };
    let ranks: Vec<u8> = g.primitives.iter().map(rank).collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]), "{ranks:?}");

    for d in &g.primitives {
        if let DrawInstruction::Group { children, .. } = d {
            let last = children.last().expect("group children");
            assert!(matches!(
                last,
                DrawInstruction::Text {
                    role: TextRole::CategoryLabel,
                    ..
                }
            ));
        }
    }
}

#[test]
fn market_report_table_and_legend_follow_series_order() {
    let g = expect_chart(render_fixture("market_report.json"));
    // The blank category and its values are gone.
    assert_eq!(g.table.rows.len(), 6);
    assert!(!g.table.visible);

    let keys: Vec<&str> = g.table.columns.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["houses", "flats", "change"]);
    assert_eq!(g.table.rows[0].category, "2019");
    assert_eq!(
        g.table.rows[0].cells,
        vec!["3.120 €/m²", "2.480 €/m²", "2,1 %"]
    );
    assert_eq!(g.table.rows[3].cells[1], "–");
    assert_eq!(g.table.rows[5].category, "Prognose 2024");

    let legend: Vec<(&str, &str)> = g
        .legend
        .iter()
        .map(|l| (l.key.as_str(), l.color.as_str()))
        .collect();
    assert_eq!(legend[0], ("houses", "#1F4E79"));
    assert_eq!(legend.len(), 3);

    let latest: Vec<&str> = g.legend.iter().map(|l| l.latest.as_str()).collect();
    assert_eq!(latest, vec!["3.950 €/m²", "3.010 €/m²", "2,1 %"]);

    let label = g
        .flat_primitives()
        .into_iter()
        .find_map(|d| match d {
            DrawInstruction::Text {
                role: TextRole::CategoryLabel,
                text,
                full_text: Some(full),
                ..
            } => Some((text.clone(), full.clone())),
            _ => None,
        })
        .expect("truncated label");
    assert_eq!(label, ("Prognose…".to_string(), "Prognose 2024".to_string()));
}

#[test]
fn legend_is_omitted_when_disabled() {
    let mut req = mixed_request(false, 3);
    req.config.show_legend = false;
    let g = expect_chart(render(&req, &RenderOptions::default()));
    assert!(g.legend.is_empty());
    assert!(g.table.visible);
}

#[test]
fn single_constant_value_renders_flat_finite_geometry() {
    let req = request(
        json!(["X", "Y"]),
        vec![RawSeries::new("flat", vec![json!(0), json!(0)])],
        Vec::new(),
        false,
    );
    let g = expect_chart(render(&req, &RenderOptions::default()));
    assert_eq!(g.domain.span(), 1.0);
    for (x, y, w, h, _) in bars(&g) {
        assert!(x.is_finite() && y.is_finite() && w.is_finite());
        assert_eq!(h, 0.0);
    }
}
