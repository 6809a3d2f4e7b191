use regiochart_core::ValueKind;
use serde::{Deserialize, Serialize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Placeholder text for absent values.
pub const ABSENT_PLACEHOLDER: &str = "–";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatContext {
    Axis,
    Legend,
    Table,
}

/// Number formatting collaborator.
///
/// Report pages normally plug in their locale-aware formatter; [`DefaultFormatter`] is used when
/// none is supplied.
pub trait ValueFormatter {
    /// Formats a (possibly absent) value. Absent values must map to a placeholder, not an
    /// empty string.
    fn format(
        &self,
        value: Option<f64>,
        kind: ValueKind,
        unit_key: Option<&str>,
        context: FormatContext,
    ) -> String;

    /// Short magnitude label for axis extremes (`1,5k`, `2M`).
    fn compact(&self, value: f64) -> String;
}

/// German-style formatting: `.` groups thousands, `,` separates decimals.
#[derive(Debug, Clone, Default)]
pub struct DefaultFormatter;

impl DefaultFormatter {
    fn unit_suffix(kind: ValueKind, unit_key: Option<&str>) -> Option<String> {
        if let Some(key) = unit_key.map(str::trim).filter(|k| !k.is_empty()) {
            let unit = match key {
                "eur" | "currency" => "€",
                "eurPerSqm" | "eur_per_sqm" => "€/m²",
                "sqm" | "area" => "m²",
                "percent" => "%",
                "years" => "Jahre",
                other => other,
            };
            return Some(unit.to_string());
        }
        match kind {
            ValueKind::Number => None,
            ValueKind::Currency => Some("€".to_string()),
            ValueKind::Percent => Some("%".to_string()),
            ValueKind::Area => Some("m²".to_string()),
        }
    }
}

impl ValueFormatter for DefaultFormatter {
    fn format(
        &self,
        value: Option<f64>,
        kind: ValueKind,
        unit_key: Option<&str>,
        context: FormatContext,
    ) -> String {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            return ABSENT_PLACEHOLDER.to_string();
        };
        let number = match context {
            FormatContext::Axis => self.compact(v),
            FormatContext::Legend | FormatContext::Table => {
                let digits = if kind == ValueKind::Percent { 1 } else { 2 };
                format_decimal(v, digits)
            }
        };
        match Self::unit_suffix(kind, unit_key) {
            Some(unit) => format!("{number} {unit}"),
            None => number,
        }
    }

    fn compact(&self, value: f64) -> String {
        if !value.is_finite() {
            return ABSENT_PLACEHOLDER.to_string();
        }
        let abs = value.abs();
        if abs >= 1_000_000.0 {
            format!("{}M", format_decimal(value / 1_000_000.0, 1))
        } else if abs >= 1_000.0 {
            format!("{}k", format_decimal(value / 1_000.0, 1))
        } else {
            format_decimal(value, 2)
        }
    }
}

/// Rounds to at most `max_fraction_digits`, drops trailing zeros and groups thousands.
pub fn format_decimal(value: f64, max_fraction_digits: usize) -> String {
    if !value.is_finite() {
        return ABSENT_PLACEHOLDER.to_string();
    }
    let factor = 10f64.powi(max_fraction_digits as i32);
    let rounded = (value * factor).round() / factor;
    let negative = rounded < 0.0;
    let text = format!("{:.*}", max_fraction_digits, rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(text.len() + text.len() / 3 + 2);
    if negative {
        out.push('-');
    }
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if !frac_part.is_empty() {
        out.push(',');
        out.push_str(frac_part);
    }
    out
}

/// Shortens a label to `max_width` display columns, ending it with `…` when cut.
pub fn truncate_label(text: &str, max_width: usize) -> String {
    let text = text.trim();
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut used = 0usize;
    let mut out = String::new();
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out.push('…');
    out
}
