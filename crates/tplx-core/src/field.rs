use regex::RegexBuilder;
use serde::Serialize;
use serde_json::Value;

use crate::normalize::apply_normalizers;
use crate::template::schema::{Cast, Field};

/// Result of evaluating one field (§4.5): the JSON-typed value plus whether
/// a `required` field ended up missing.
pub struct FieldResult {
    pub value: Value,
    pub missing: bool,
}

/// Per-field debug entry (§4.6A).
#[derive(Debug, Clone, Serialize)]
pub struct FieldDebug {
    pub raw_text_preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub matched_value: Value,
}

pub fn evaluate_field(field: &Field, raw_text: &str) -> (FieldResult, FieldDebug) {
    let captured = match &field.regex {
        Some(pattern) => extract_with_regex(raw_text, pattern),
        None => raw_text.to_string(),
    };

    let normalized = apply_normalizers(&captured, &field.normalizers);
    let value = apply_cast(&normalized, field.cast);

    let missing = field.required && is_missing(&value);

    let debug = FieldDebug {
        raw_text_preview: preview(raw_text, 200),
        pattern: field.regex.clone(),
        matched_value: value.clone(),
    };

    (FieldResult { value, missing }, debug)
}

/// Search `raw` with multiline+dotall flags; return the first non-empty
/// capture group, or the full match if there are no groups; empty string on
/// no match or a malformed pattern (§4.5, §7.3 — not an error).
fn extract_with_regex(raw: &str, pattern: &str) -> String {
    let compiled = match RegexBuilder::new(pattern).multi_line(true).dot_matches_new_line(true).build() {
        Ok(re) => re,
        Err(e) => {
            log::warn!("field regex '{pattern}' failed to compile: {e}");
            return String::new();
        }
    };

    let Some(caps) = compiled.captures(raw) else {
        return String::new();
    };

    if caps.len() > 1 {
        for i in 1..caps.len() {
            if let Some(m) = caps.get(i) {
                if !m.as_str().is_empty() {
                    return m.as_str().to_string();
                }
            }
        }
    }

    caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default()
}

/// §4.5: `int` strips `,` and `.`; `float`/`decimal` strips `,` only. On cast
/// failure the normalized string is retained, never an error.
fn apply_cast(s: &str, cast: Option<Cast>) -> Value {
    if s.is_empty() {
        return Value::String(String::new());
    }

    match cast {
        None => Value::String(s.to_string()),
        Some(Cast::Int) => {
            let stripped: String = s.chars().filter(|&c| c != ',' && c != '.').collect();
            match stripped.parse::<i64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => Value::String(s.to_string()),
            }
        }
        Some(Cast::Float) | Some(Cast::Decimal) => {
            let stripped: String = s.chars().filter(|&c| c != ',').collect();
            match stripped.parse::<f64>() {
                Ok(n) => serde_json::Number::from_f64(n).map(Value::Number).unwrap_or_else(|| Value::String(s.to_string())),
                Err(_) => Value::String(s.to_string()),
            }
        }
    }
}

/// §9's fixed `required` rule: only an empty string / absent match counts as
/// missing. A successful numeric cast (including `0`) is present.
fn is_missing(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}

fn preview(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(key: &str, regex: Option<&str>, cast: Option<Cast>, normalizers: &[&str], required: bool) -> Field {
        Field {
            field_id: None,
            key: key.into(),
            box_id: "b1".into(),
            required,
            normalizers: normalizers.iter().map(|s| s.to_string()).collect(),
            regex: regex.map(|s| s.to_string()),
            cast,
        }
    }

    #[test]
    fn captures_first_group() {
        let f = field("num", Some(r"(\d+)"), None, &[], false);
        let (res, _) = evaluate_field(&f, "Factura 12345");
        assert_eq!(res.value, Value::String("12345".into()));
    }

    #[test]
    fn float_cast_strips_commas_keeps_dot() {
        let f = field("total", Some(r"([0-9.,]+)"), Some(Cast::Float), &["removeSpaces".into()], false);
        let (res, _) = evaluate_field(&f, "1,234.56");
        assert_eq!(res.value, serde_json::json!(1234.56));
    }

    #[test]
    fn int_cast_strips_comma_and_dot() {
        let f = field("count", Some(r"([\d.,]+)"), Some(Cast::Int), &[], false);
        let (res, _) = evaluate_field(&f, "12.345,00");
        assert_eq!(res.value, serde_json::json!(1234500));
    }

    #[test]
    fn cast_failure_keeps_normalized_string() {
        let f = field("code", Some(r"([A-Z\d-]+)"), Some(Cast::Int), &[], false);
        let (res, _) = evaluate_field(&f, "INV-001");
        assert_eq!(res.value, Value::String("INV-001".into()));
    }

    #[test]
    fn no_match_is_empty_and_missing_when_required() {
        let f = field("num", Some(r"(\d+)"), None, &[], true);
        let (res, _) = evaluate_field(&f, "no digits here");
        assert_eq!(res.value, Value::String(String::new()));
        assert!(res.missing);
    }

    #[test]
    fn zero_is_present_not_missing() {
        let f = field("qty", Some(r"(\d+)"), Some(Cast::Int), &[], true);
        let (res, _) = evaluate_field(&f, "0");
        assert_eq!(res.value, serde_json::json!(0));
        assert!(!res.missing);
    }

    #[test]
    fn no_regex_passes_raw_text_through() {
        let f = field("raw", None, None, &[], false);
        let (res, _) = evaluate_field(&f, "whatever text");
        assert_eq!(res.value, Value::String("whatever text".into()));
    }

    #[test]
    fn malformed_regex_yields_empty_value_not_error() {
        let f = field("bad", Some("(unclosed"), None, &[], false);
        let (res, _) = evaluate_field(&f, "anything");
        assert_eq!(res.value, Value::String(String::new()));
    }
}
