//! Cell values read out of rows, plus rollup cells for grouped rows.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single primitive value read from a row for one column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text used for substring filtering and display.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Type-tagged key used to bucket rows while grouping, so `1` and `"1"`
    /// land in different groups.
    pub(crate) fn group_key(&self) -> String {
        match self {
            CellValue::Null => "null".to_string(),
            CellValue::Bool(b) => format!("b:{b}"),
            CellValue::Number(n) => format!("n:{}", format_number(*n)),
            CellValue::Text(s) => format!("s:{s}"),
        }
    }

    /// Ordering among non-null values. Numbers < booleans < text; text compares
    /// case-insensitively first.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            CellValue::Null => 3,
            CellValue::Number(_) => 0,
            CellValue::Bool(_) => 1,
            CellValue::Text(_) => 2,
        }
    }
}

/// Integers print without a fractional part; everything else uses `f64` display.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&Value> for CellValue {
    /// Report items nest values as `{type: "url", value: ...}`,
    /// `{type: "link", text: ..., url: ...}`, `{type: "source-location", url: ...}`
    /// or `{type: "node", snippet: ...}`.
    fn from(v: &Value) -> Self {
        match v {
            Value::Null | Value::Array(_) => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or_default(),
            Value::String(s) => CellValue::Text(s.clone()),
            Value::Object(map) => ["text", "value", "url", "nodeLabel", "snippet"]
                .iter()
                .find_map(|k| map.get(*k))
                .map(CellValue::from)
                .unwrap_or_default(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(n: Option<f64>) -> Self {
        n.map(CellValue::Number).unwrap_or_default()
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// What a grouped row shows for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AggregatedCell {
    /// A single rolled-up value (unique text, max, sum, count...).
    Value { value: CellValue },
    /// Leaves disagree; `distinct` non-null values were seen.
    Mixed { distinct: usize },
    /// No leaf carried a usable value.
    Empty,
}

impl AggregatedCell {
    pub fn value(v: impl Into<CellValue>) -> Self {
        AggregatedCell::Value { value: v.into() }
    }

    /// Value used when sorting grouped rows by this column.
    pub fn sort_value(&self) -> CellValue {
        match self {
            AggregatedCell::Value { value } => value.clone(),
            AggregatedCell::Mixed { .. } | AggregatedCell::Empty => CellValue::Null,
        }
    }

    pub fn display_text(&self) -> String {
        match self {
            AggregatedCell::Value { value } => value.display_text(),
            AggregatedCell::Mixed { distinct } => format!("{distinct} values"),
            AggregatedCell::Empty => String::new(),
        }
    }
}
