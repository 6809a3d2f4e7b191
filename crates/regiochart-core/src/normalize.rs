use crate::model::{ChartRequest, NormalizedChart, RawSeries, Series};
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use serde_json::Value;

/// Stringifies a JSON scalar the way a category or key label is displayed.
///
/// Strings are trimmed, numbers use the shortest round-trip form (`2021`, not `2021.0`), and
/// booleans print as words. `null`, arrays, objects and blank strings have no label.
pub fn scalar_label(v: &Value) -> Option<String> {
    let s = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64()?;
                if !f.is_finite() {
                    return None;
                }
                let mut buf = ryu_js::Buffer::new();
                buf.format_finite(f).to_string()
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    if s.is_empty() { None } else { Some(s) }
}

/// Coerces a raw value to a finite number. Anything else (strings included) is absent.
pub fn coerce_value(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Returns the kept category labels together with the raw index each one came from.
///
/// Blank labels are dropped, and so are repeated labels after their first occurrence. The raw
/// indices let series values follow the same drops.
pub fn normalize_categories(raw: &[Value]) -> (Vec<String>, Vec<usize>) {
    let mut seen: IndexSet<String> = IndexSet::with_capacity(raw.len());
    let mut kept = Vec::with_capacity(raw.len());
    for (idx, v) in raw.iter().enumerate() {
        let Some(label) = scalar_label(v) else {
            tracing::debug!(index = idx, "dropping blank category");
            continue;
        };
        if !seen.insert(label) {
            tracing::debug!(index = idx, "dropping duplicate category");
            continue;
        }
        kept.push(idx);
    }
    (seen.into_iter().collect(), kept)
}

fn normalize_series(raw: &RawSeries, key: String, kept: &[usize]) -> Series {
    let values = kept
        .iter()
        .map(|&raw_idx| raw.values.get(raw_idx).and_then(coerce_value))
        .collect();
    let label = raw
        .label
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| key.clone());
    Series {
        key,
        label,
        values,
        color: raw
            .color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(ToString::to_string),
        kind: raw.kind,
        unit_key: raw.unit_key.clone(),
    }
}

fn normalize_series_list(raw: &[RawSeries], kept: &[usize]) -> Vec<Series> {
    let mut used: FxHashMap<String, usize> = FxHashMap::default();
    raw.iter()
        .map(|s| {
            let base = s.key.trim().to_string();
            let count = used.entry(base.clone()).or_insert(0);
            *count += 1;
            let key = if *count == 1 {
                base
            } else {
                let renamed = format!("{base}-{count}");
                tracing::warn!(key = %base, renamed = %renamed, "duplicate series key");
                renamed
            };
            normalize_series(s, key, kept)
        })
        .collect()
}

pub fn normalize(request: &ChartRequest) -> NormalizedChart {
    let (categories, kept) = normalize_categories(&request.categories);
    let chart = NormalizedChart {
        bars: normalize_series_list(&request.bars, &kept),
        lines: normalize_series_list(&request.lines, &kept),
        categories,
    };
    tracing::trace!(
        categories = chart.categories.len(),
        bars = chart.bars.len(),
        lines = chart.lines.len(),
        "normalized chart input"
    );
    chart
}
