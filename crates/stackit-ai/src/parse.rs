//! Tolerant extraction of a JSON object from model prose, plus typed field
//! readers over the result.
//!
//! Models wrap their JSON in explanations and markdown fences. The object is
//! taken from the first `{` to the last `}`; anything that does not parse as
//! an object is reported as [`Parsed::Unparsable`] and handled by the
//! caller's text fallback.

use serde_json::{Map, Value};

use crate::model::clamp_score;

#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Object(Map<String, Value>),
    Unparsable,
}

pub fn extract_object(text: &str) -> Parsed {
    let Some(start) = text.find('{') else {
        return Parsed::Unparsable;
    };
    let Some(end) = text.rfind('}') else {
        return Parsed::Unparsable;
    };
    if end < start {
        return Parsed::Unparsable;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => Parsed::Object(map),
        _ => Parsed::Unparsable,
    }
}

/// Read-only view over a parsed object with lenient coercions.
pub struct Fields<'a>(pub &'a Map<String, Value>);

impl<'a> Fields<'a> {
    /// Number or numeric string.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Score in `[0, 100]`, `default` when absent or not numeric.
    pub fn score(&self, key: &str, default: f64) -> f64 {
        self.number(key).and_then(clamp_score).unwrap_or(default)
    }

    /// Boolean, or the strings "true"/"false"/"yes"/"no".
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.0.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => Some(true),
                "false" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Non-blank string, trimmed.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// Non-blank string elements of an array, at most `limit`. `None` when
    /// the field is missing or not an array.
    pub fn strings(&self, key: &str, limit: usize) -> Option<Vec<String>> {
        let Value::Array(items) = self.0.get(key)? else {
            return None;
        };
        Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .take(limit)
                .map(str::to_string)
                .collect(),
        )
    }
}
