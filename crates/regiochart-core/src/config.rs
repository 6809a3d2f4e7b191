//! Path lookups into an "effective config" JSON object.
//!
//! Engine constants (bar widths, paddings, palettes) can be overridden by the embedding report
//! page. Lookups are lenient: a missing key, a `null`, or a value of the wrong type yields `None`
//! and the caller keeps its default.

use serde_json::Value;

pub fn json_f64(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_i64().map(|n| n as f64))
        .or_else(|| v.as_u64().map(|n| n as f64))
        .filter(|n| n.is_finite())
}

fn lookup<'a>(cfg: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = cfg;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn config_f64(cfg: &Value, path: &[&str]) -> Option<f64> {
    lookup(cfg, path).and_then(json_f64)
}

pub fn config_bool(cfg: &Value, path: &[&str]) -> Option<bool> {
    lookup(cfg, path)?.as_bool()
}

pub fn config_string(cfg: &Value, path: &[&str]) -> Option<String> {
    lookup(cfg, path)?.as_str().map(|s| s.to_string())
}

/// Reads a color list either as a comma-separated string (`"#aaa, #bbb"`) or as a JSON array of
/// strings. Empty entries are skipped; an empty result is reported as `None`.
pub fn config_color_list(cfg: &Value, path: &[&str]) -> Option<Vec<String>> {
    let colors: Vec<String> = match lookup(cfg, path)? {
        Value::String(s) => s
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
        _ => return None,
    };
    if colors.is_empty() { None } else { Some(colors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookups_follow_nested_paths() {
        let cfg = json!({
            "chart": { "barGap": 4, "paddingLeft": 52.5, "compact": true, "font": "Inter" }
        });
        assert_eq!(config_f64(&cfg, &["chart", "barGap"]), Some(4.0));
        assert_eq!(config_f64(&cfg, &["chart", "paddingLeft"]), Some(52.5));
        assert_eq!(config_bool(&cfg, &["chart", "compact"]), Some(true));
        assert_eq!(
            config_string(&cfg, &["chart", "font"]).as_deref(),
            Some("Inter")
        );
        assert_eq!(config_f64(&cfg, &["chart", "missing"]), None);
        assert_eq!(config_f64(&cfg, &["chart", "font"]), None);
    }

    #[test]
    fn color_lists_accept_strings_and_arrays() {
        let cfg = json!({
            "a": "#111, ,#222",
            "b": ["#333", 4, " #444 "],
            "c": ""
        });
        assert_eq!(
            config_color_list(&cfg, &["a"]),
            Some(vec!["#111".to_string(), "#222".to_string()])
        );
        assert_eq!(
            config_color_list(&cfg, &["b"]),
            Some(vec!["#333".to_string(), "#444".to_string()])
        );
        assert_eq!(config_color_list(&cfg, &["c"]), None);
    }
}
