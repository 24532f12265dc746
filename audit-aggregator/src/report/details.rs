//! Structured detail payloads carried by an audit.
//!
//! The `type` tag is the single source of truth: a payload is decoded into
//! exactly one variant of [`DetailPayload`] and never shape-sniffed later.
//! Unrecognized tags are kept verbatim in [`DetailPayload::Unknown`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::row::AuditRow;

/// One column description from a table payload.
///
/// Newer reports use `label`/`valueType`; older ones `text`/`itemType`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnHeading {
    pub key: Option<String>,
    #[serde(alias = "text")]
    pub label: Option<String>,
    #[serde(alias = "itemType")]
    pub value_type: Option<String>,
    pub granularity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_items_heading: Option<Value>,
}

impl ColumnHeading {
    /// Value types that hold a measured quantity.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.value_type.as_deref(),
            Some("bytes" | "ms" | "numeric" | "timespanMs")
        )
    }
}

/// Element of a `list` payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ListElement {
    /// A nested `{type: "table", ...}` sub-object.
    Table {
        headings: Vec<ColumnHeading>,
        items: Vec<AuditRow>,
    },
    /// Anything else (plain rows, debug data, nested lists).
    Other(Value),
}

/// Closed set of detail payload shapes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum DetailPayload {
    Table {
        headings: Vec<ColumnHeading>,
        items: Vec<AuditRow>,
    },
    List {
        items: Vec<ListElement>,
    },
    Opportunity {
        items: Vec<AuditRow>,
    },
    /// Unrecognized or missing tag; `raw` is the untouched payload.
    Unknown { kind: Option<String>, raw: Value },
}

impl DetailPayload {
    /// The `type` tag this payload was decoded from.
    pub fn kind(&self) -> Option<&str> {
        match self {
            DetailPayload::Table { .. } => Some("table"),
            DetailPayload::List { .. } => Some("list"),
            DetailPayload::Opportunity { .. } => Some("opportunity"),
            DetailPayload::Unknown { kind, .. } => kind.as_deref(),
        }
    }
}

impl From<Value> for DetailPayload {
    fn from(raw: Value) -> Self {
        let kind = raw.get("type").and_then(Value::as_str).map(str::to_owned);
        match kind.as_deref() {
            Some("table") => DetailPayload::Table {
                headings: headings_of(&raw),
                items: rows_of(&raw),
            },
            Some("opportunity") => DetailPayload::Opportunity {
                items: rows_of(&raw),
            },
            Some("list") => {
                let items = raw
                    .get("items")
                    .and_then(Value::as_array)
                    .map(|elems| elems.iter().map(list_element).collect())
                    .unwrap_or_default();
                DetailPayload::List { items }
            }
            _ => DetailPayload::Unknown { kind, raw },
        }
    }
}

fn list_element(elem: &Value) -> ListElement {
    if elem.get("type").and_then(Value::as_str) == Some("table") {
        ListElement::Table {
            headings: headings_of(elem),
            items: rows_of(elem),
        }
    } else {
        ListElement::Other(elem.clone())
    }
}

fn headings_of(v: &Value) -> Vec<ColumnHeading> {
    v.get("headings")
        .and_then(Value::as_array)
        .map(|hs| {
            hs.iter()
                .filter_map(|h| ColumnHeading::deserialize(h).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Non-object items are dropped; rows are open field maps.
fn rows_of(v: &Value) -> Vec<AuditRow> {
    v.get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|it| it.as_object().cloned().map(AuditRow::from))
                .collect()
        })
        .unwrap_or_default()
}
