use crate::layout::Layout;
use regiochart_core::{Domain, SeriesKind, ValueKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GuideKind {
    /// Category axis along the bottom edge of the plot.
    Baseline,
    /// Value axis along the left edge of the plot.
    ValueAxis,
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextRole {
    CategoryLabel,
    MaxValue,
    MinValue,
    ZeroValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub x: f64,
    pub y: f64,
    /// `None` when the point was placed at zero for a missing value.
    pub value: Option<f64>,
}

/// One drawable, independent of any graphics API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DrawInstruction {
    #[serde(rename_all = "camelCase")]
    Guide {
        kind: GuideKind,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    #[serde(rename_all = "camelCase")]
    Group {
        category_index: usize,
        category: String,
        children: Vec<DrawInstruction>,
    },
    #[serde(rename_all = "camelCase")]
    Bar {
        series_key: String,
        category_index: usize,
        value: Option<f64>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: String,
    },
    #[serde(rename_all = "camelCase")]
    Line {
        series_key: String,
        /// SVG path data through all points, in category order.
        path: String,
        points: Vec<LinePoint>,
        stroke: String,
        stroke_width: f64,
        point_radius: f64,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        role: TextRole,
        text: String,
        /// Untruncated text, when `text` was shortened.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        full_text: Option<String>,
        x: f64,
        y: f64,
        anchor: TextAnchor,
    },
}

impl DrawInstruction {
    /// Visits this instruction and, for groups, its children depth-first.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a DrawInstruction)) {
        f(self);
        if let Self::Group { children, .. } = self {
            for child in children {
                child.walk(f);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub key: String,
    pub label: String,
    pub series_kind: SeriesKind,
    pub value_kind: ValueKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub category: String,
    pub cells: Vec<String>,
}

/// Tabular twin of the chart for assistive technology. Always built; `visible` tells the UI
/// whether to show it or keep it screen-reader only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibleTable {
    pub visible: bool,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendItem {
    pub key: String,
    pub label: String,
    pub color: String,
    pub series_kind: SeriesKind,
    /// Last finite value of the series, formatted for the legend (placeholder when none).
    pub latest: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartGeometry {
    pub width: f64,
    pub height: f64,
    pub stacked: bool,
    pub domain: Domain,
    pub zero_baseline: bool,
    pub layout: Layout,
    pub primitives: Vec<DrawInstruction>,
    pub table: AccessibleTable,
    #[serde(default)]
    pub legend: Vec<LegendItem>,
}

impl ChartGeometry {
    /// All instructions in draw order, with group children inlined after their group.
    pub fn flat_primitives(&self) -> Vec<&DrawInstruction> {
        let mut out = Vec::new();
        for p in &self.primitives {
            p.walk(&mut |d| out.push(d));
        }
        out
    }

    pub fn bars(&self) -> impl Iterator<Item = &DrawInstruction> {
        self.flat_primitives()
            .into_iter()
            .filter(|d| matches!(d, DrawInstruction::Bar { .. }))
    }
}

#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum ChartRender {
    Chart(ChartGeometry),
    /// No category or no finite value: the caller shows a placeholder message instead.
    NoData,
}

impl ChartRender {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    pub fn chart(&self) -> Option<&ChartGeometry> {
        match self {
            Self::Chart(geometry) => Some(geometry),
            Self::NoData => None,
        }
    }

    pub fn into_chart(self) -> Option<ChartGeometry> {
        match self {
            Self::Chart(geometry) => Some(geometry),
            Self::NoData => None,
        }
    }
}
