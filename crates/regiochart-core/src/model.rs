use crate::normalize::scalar_label;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_VIEWPORT_WIDTH: f64 = 720.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 260.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Bar,
    Line,
}

impl SeriesKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
        }
    }
}

/// What a series measures. Only used to pick a unit when formatting values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[default]
    Number,
    Currency,
    Percent,
    Area,
}

impl ValueKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "number" | "count" => Some(Self::Number),
            "currency" | "eur" | "price" => Some(Self::Currency),
            "percent" | "percentage" | "share" => Some(Self::Percent),
            "area" | "sqm" => Some(Self::Area),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartConfig {
    /// Stack bar series per category. Line series are never stacked.
    pub stacked: bool,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub show_legend: bool,
    pub show_table: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            stacked: false,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            show_legend: true,
            show_table: true,
        }
    }
}

impl ChartConfig {
    /// Replaces unusable viewport sizes (non-finite, zero, negative) with the defaults.
    pub fn sanitized(mut self) -> Self {
        if !(self.viewport_width.is_finite() && self.viewport_width > 0.0) {
            self.viewport_width = DEFAULT_VIEWPORT_WIDTH;
        }
        if !(self.viewport_height.is_finite() && self.viewport_height > 0.0) {
            self.viewport_height = DEFAULT_VIEWPORT_HEIGHT;
        }
        self
    }
}

/// A series as it arrives from report data: values are arbitrary JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSeries {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub kind: ValueKind,
    #[serde(default)]
    pub unit_key: Option<String>,
}

impl RawSeries {
    pub fn new(key: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            key: key.into(),
            label: None,
            values,
            color: None,
            kind: ValueKind::default(),
            unit_key: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_unit_key(mut self, unit_key: impl Into<String>) -> Self {
        self.unit_key = Some(unit_key.into());
        self
    }
}

/// One chart render call: raw categories, raw series, and display config.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    pub categories: Vec<Value>,
    pub bars: Vec<RawSeries>,
    pub lines: Vec<RawSeries>,
    pub config: ChartConfig,
}

impl ChartRequest {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Decodes a request document.
    ///
    /// Only the document shape is validated here (object/array structure and series keys); the
    /// individual values are left as-is for the normalizer, which never fails.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(obj) = value.as_object() else {
            return Err(Error::invalid("chart request must be a JSON object"));
        };

        let categories = match obj.get("categories") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => return Err(Error::invalid("`categories` must be an array")),
        };
        let bars = parse_series_list(obj.get("bars"), "bars")?;
        let lines = parse_series_list(obj.get("lines"), "lines")?;
        let config = match obj.get("config") {
            None | Some(Value::Null) => ChartConfig::default(),
            Some(cfg @ Value::Object(_)) => {
                serde_json::from_value::<ChartConfig>(cfg.clone())?.sanitized()
            }
            Some(_) => return Err(Error::invalid("`config` must be an object")),
        };

        Ok(Self {
            categories,
            bars,
            lines,
            config,
        })
    }
}

fn parse_series_list(value: Option<&Value>, field: &str) -> Result<Vec<RawSeries>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| parse_series(item, field, idx))
            .collect(),
        Some(_) => Err(Error::invalid(format!("`{field}` must be an array"))),
    }
}

fn parse_series(item: &Value, field: &str, idx: usize) -> Result<RawSeries> {
    let Some(obj) = item.as_object() else {
        return Err(Error::invalid(format!("{field}[{idx}] must be an object")));
    };

    let key = obj
        .get("key")
        .and_then(scalar_label)
        .ok_or_else(|| Error::invalid(format!("{field}[{idx}] is missing a `key`")))?;

    let values = match obj.get("values") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(values)) => values.clone(),
        Some(_) => {
            return Err(Error::invalid(format!(
                "{field}[{idx}].values must be an array"
            )));
        }
    };

    let non_empty = |v: &Value| {
        v.as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    };

    Ok(RawSeries {
        key,
        label: obj.get("label").and_then(scalar_label),
        values,
        color: obj.get("color").and_then(non_empty),
        kind: obj
            .get("kind")
            .and_then(Value::as_str)
            .and_then(ValueKind::parse)
            .unwrap_or_default(),
        unit_key: obj.get("unitKey").and_then(non_empty),
    })
}

/// A series resized to the category count, every value finite or absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub key: String,
    pub label: String,
    pub values: Vec<Option<f64>>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub kind: ValueKind,
    #[serde(default)]
    pub unit_key: Option<String>,
}

impl Series {
    pub fn value(&self, category_index: usize) -> Option<f64> {
        self.values.get(category_index).copied().flatten()
    }

    pub fn has_finite_value(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedChart {
    pub categories: Vec<String>,
    pub bars: Vec<Series>,
    pub lines: Vec<Series>,
}

impl NormalizedChart {
    /// Renderable only with at least one category and one finite value in any series.
    pub fn has_data(&self) -> bool {
        !self.categories.is_empty()
            && self
                .bars
                .iter()
                .chain(self.lines.iter())
                .any(Series::has_finite_value)
    }

    /// Bars first, then lines: the column order of the accessible table.
    pub fn all_series(&self) -> impl Iterator<Item = (SeriesKind, &Series)> {
        self.bars
            .iter()
            .map(|s| (SeriesKind::Bar, s))
            .chain(self.lines.iter().map(|s| (SeriesKind::Line, s)))
    }
}
