use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use table_view::{CellValue, TableRow};

/// Field holding the report label a row came from.
pub const REPORT_LABEL_FIELD: &str = "label";

/// Where a pre-existing `label` field is moved when a row is tagged.
pub const ITEM_LABEL_FIELD: &str = "itemLabel";

/// One detail row: an open field map with no fixed schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditRow(pub Map<String, Value>);

impl From<Map<String, Value>> for AuditRow {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl AuditRow {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Non-empty string `url`.
    pub fn url(&self) -> Option<&str> {
        self.text("url").filter(|u| !u.is_empty())
    }

    /// Finite number at `key`.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.0
            .get(key)
            .and_then(Value::as_f64)
            .filter(|n| n.is_finite())
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Report label this row is attributed to.
    pub fn label(&self) -> Option<&str> {
        self.text(REPORT_LABEL_FIELD)
    }

    /// Tags the row with its report label. A label the row already carried
    /// (resource summaries use one) is kept under [`ITEM_LABEL_FIELD`].
    pub fn set_label(&mut self, label: &str) {
        if let Some(prev) = self.0.remove(REPORT_LABEL_FIELD) {
            self.0.entry(ITEM_LABEL_FIELD).or_insert(prev);
        }
        self.0
            .insert(REPORT_LABEL_FIELD.to_string(), Value::from(label));
    }

    /// Overwrites the report label without preserving the old value.
    pub(crate) fn replace_label(&mut self, label: String) {
        self.0.insert(REPORT_LABEL_FIELD.to_string(), Value::String(label));
    }
}

impl TableRow for AuditRow {
    fn cell(&self, column_id: &str) -> CellValue {
        self.0.get(column_id).map(CellValue::from).unwrap_or_default()
    }
}
