//! SVG serialization of [`ChartGeometry`].
//!
//! The emitted document mirrors the draw list one to one: every instruction becomes one element
//! (lines become a `<g>` holding the path and its point markers), in draw order.

use crate::model::{ChartGeometry, DrawInstruction, GuideKind, TextRole};
use std::collections::BTreeMap;
use std::fmt::Write as _;

pub const DEFAULT_NO_DATA_TEXT: &str = "Keine Daten verfügbar";

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Root `<svg id>`; also prefixes the ids of `<title>`/`<desc>`.
    pub diagram_id: Option<String>,
    /// Accessible name of the chart.
    pub title: Option<String>,
    /// Emit a `<desc>` summarizing the accessible table.
    pub include_description: bool,
    pub no_data_text: String,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            diagram_id: None,
            title: None,
            include_description: true,
            no_data_text: DEFAULT_NO_DATA_TEXT.to_string(),
        }
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Stringifies a coordinate like JS `Number#toString()`, without `-0` and without float noise
/// from our own arithmetic.
pub fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    } else {
        v = (v * 1000.0).round() / 1000.0;
    }
    if v == 0.0 {
        return "0".to_string();
    }
    let mut buf = ryu_js::Buffer::new();
    buf.format_finite(v).to_string()
}

#[derive(Debug, Clone)]
struct Node {
    tag: &'static str,
    attrs: BTreeMap<&'static str, String>,
    text: Option<String>,
    children: Vec<usize>,
}

fn node(tag: &'static str) -> Node {
    Node {
        tag,
        attrs: BTreeMap::new(),
        text: None,
        children: Vec::new(),
    }
}

fn push_child(arena: &mut Vec<Node>, parent: usize, child: Node) -> usize {
    let id = arena.len();
    arena.push(child);
    arena[parent].children.push(id);
    id
}

fn render_node(out: &mut String, arena: &[Node], id: usize) {
    let n = &arena[id];
    out.push('<');
    out.push_str(n.tag);
    for (k, v) in &n.attrs {
        let _ = write!(out, r#" {k}="{v}""#);
    }
    if n.children.is_empty() && n.text.as_deref().unwrap_or("").is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    if let Some(t) = n.text.as_deref() {
        out.push_str(t);
    }
    for c in &n.children {
        render_node(out, arena, *c);
    }
    let _ = write!(out, "</{}>", n.tag);
}

fn guide_class(kind: GuideKind) -> &'static str {
    match kind {
        GuideKind::Baseline => "guide baseline",
        GuideKind::ValueAxis => "guide value-axis",
        GuideKind::Zero => "guide zero-line",
    }
}

fn text_class(role: TextRole) -> &'static str {
    match role {
        TextRole::CategoryLabel => "category-label",
        TextRole::MaxValue => "value-label value-max",
        TextRole::MinValue => "value-label value-min",
        TextRole::ZeroValue => "value-label value-zero",
    }
}

fn append_instruction(arena: &mut Vec<Node>, parent: usize, d: &DrawInstruction) {
    match d {
        DrawInstruction::Guide {
            kind,
            x1,
            y1,
            x2,
            y2,
        } => {
            let mut n = node("line");
            n.attrs.insert("class", guide_class(*kind).to_string());
            n.attrs.insert("x1", fmt(*x1));
            n.attrs.insert("y1", fmt(*y1));
            n.attrs.insert("x2", fmt(*x2));
            n.attrs.insert("y2", fmt(*y2));
            push_child(arena, parent, n);
        }
        DrawInstruction::Group {
            category_index,
            children,
            ..
        } => {
            let mut g = node("g");
            g.attrs.insert("class", "category".to_string());
            g.attrs.insert("data-index", category_index.to_string());
            let gid = push_child(arena, parent, g);
            for child in children {
                append_instruction(arena, gid, child);
            }
        }
        DrawInstruction::Bar {
            series_key,
            x,
            y,
            width,
            height,
            fill,
            ..
        } => {
            let mut n = node("rect");
            n.attrs.insert("class", "bar".to_string());
            n.attrs.insert("data-series", escape_xml(series_key));
            n.attrs.insert("x", fmt(*x));
            n.attrs.insert("y", fmt(*y));
            n.attrs.insert("width", fmt(*width));
            n.attrs.insert("height", fmt(*height));
            n.attrs.insert("fill", escape_xml(fill));
            push_child(arena, parent, n);
        }
        DrawInstruction::Line {
            series_key,
            path,
            points,
            stroke,
            stroke_width,
            point_radius,
        } => {
            let mut g = node("g");
            g.attrs.insert("class", "line-series".to_string());
            g.attrs.insert("data-series", escape_xml(series_key));
            let gid = push_child(arena, parent, g);

            let mut p = node("path");
            p.attrs.insert("class", "line".to_string());
            p.attrs.insert("d", escape_xml(path));
            p.attrs.insert("fill", "none".to_string());
            p.attrs.insert("stroke", escape_xml(stroke));
            p.attrs.insert("stroke-width", fmt(*stroke_width));
            push_child(arena, gid, p);

            if *point_radius > 0.0 {
                for pt in points.iter().filter(|pt| pt.value.is_some()) {
                    let mut c = node("circle");
                    c.attrs.insert("class", "point".to_string());
                    c.attrs.insert("cx", fmt(pt.x));
                    c.attrs.insert("cy", fmt(pt.y));
                    c.attrs.insert("r", fmt(*point_radius));
                    c.attrs.insert("fill", escape_xml(stroke));
                    push_child(arena, gid, c);
                }
            }
        }
        DrawInstruction::Text {
            role,
            text,
            full_text,
            x,
            y,
            anchor,
        } => {
            let mut n = node("text");
            n.attrs.insert("class", text_class(*role).to_string());
            n.attrs.insert("x", fmt(*x));
            n.attrs.insert("y", fmt(*y));
            n.attrs.insert("text-anchor", anchor.as_str().to_string());
            if *role != TextRole::CategoryLabel {
                n.attrs
                    .insert("dominant-baseline", "middle".to_string());
            }
            n.text = Some(escape_xml(text));
            let tid = push_child(arena, parent, n);
            if let Some(full) = full_text {
                let mut t = node("title");
                t.text = Some(escape_xml(full));
                push_child(arena, tid, t);
            }
        }
    }
}

fn chart_css(diagram_id: &str) -> String {
    let id = escape_xml(diagram_id);
    format!(
        "#{id}{{font-family:\"trebuchet ms\",verdana,arial,sans-serif;font-size:11px;}}\
#{id} .guide{{stroke:#666;stroke-width:1;}}\
#{id} .zero-line{{stroke:#999;stroke-dasharray:3,3;}}\
#{id} .category-label{{fill:#333;}}\
#{id} .value-label{{fill:#666;}}\
#{id} .no-data{{fill:#666;font-size:13px;}}"
    )
}

fn table_description(geometry: &ChartGeometry) -> String {
    let headers: Vec<&str> = geometry
        .table
        .columns
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    geometry
        .table
        .rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = headers
                .iter()
                .zip(&row.cells)
                .map(|(h, c)| format!("{h} {c}"))
                .collect();
            format!("{}: {}", row.category, cells.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn open_svg(out: &mut String, id: &str, width: f64, height: f64, options: &SvgRenderOptions) {
    let id_esc = escape_xml(id);
    let described = if options.include_description {
        format!(r#" aria-describedby="{id_esc}-desc""#)
    } else {
        String::new()
    };
    let _ = write!(
        out,
        r#"<svg id="{id_esc}" xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="img" aria-labelledby="{id_esc}-title"{described}>"#,
        w = fmt(width.max(1.0)),
        h = fmt(height.max(1.0)),
    );
    let title = options.title.as_deref().unwrap_or("Diagramm");
    let _ = write!(
        out,
        r#"<title id="{id_esc}-title">{}</title>"#,
        escape_xml(title)
    );
}

pub fn render_chart_svg(geometry: &ChartGeometry, options: &SvgRenderOptions) -> String {
    let diagram_id = options.diagram_id.as_deref().unwrap_or("chart");
    let mut out = String::new();
    open_svg(&mut out, diagram_id, geometry.width, geometry.height, options);
    if options.include_description {
        let _ = write!(
            &mut out,
            r#"<desc id="{}-desc">{}</desc>"#,
            escape_xml(diagram_id),
            escape_xml(&table_description(geometry))
        );
    }
    let _ = write!(&mut out, "<style>{}</style>", chart_css(diagram_id));

    let mut arena: Vec<Node> = Vec::new();
    let mut root = node("g");
    root.attrs.insert(
        "class",
        if geometry.stacked {
            "chart stacked".to_string()
        } else {
            "chart grouped".to_string()
        },
    );
    arena.push(root);
    for d in &geometry.primitives {
        append_instruction(&mut arena, 0, d);
    }
    render_node(&mut out, &arena, 0);
    out.push_str("</svg>\n");
    out
}

/// Placeholder document for the no-data case: same frame, a centered message, nothing else.
pub fn render_no_data_svg(width: f64, height: f64, options: &SvgRenderOptions) -> String {
    let diagram_id = options.diagram_id.as_deref().unwrap_or("chart");
    let mut out = String::new();
    let options = SvgRenderOptions {
        include_description: false,
        ..options.clone()
    };
    open_svg(&mut out, diagram_id, width, height, &options);
    let _ = write!(&mut out, "<style>{}</style>", chart_css(diagram_id));
    let _ = write!(
        &mut out,
        r#"<text class="no-data" x="{}" y="{}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
        fmt(width / 2.0),
        fmt(height / 2.0),
        escape_xml(&options.no_data_text)
    );
    out.push_str("</svg>\n");
    out
}
