//! Known detail-row families.
//!
//! Rows have no fixed schema, so each row is classified into a typed view
//! of the fields its family is known to carry, with a generic fallback
//! that reads only what it can find. A family supplies:
//! - an identity key (url, origin, entity) used to cluster rows,
//! - an impact value used to rank clusters,
//! - a column preset for tables without headings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use table_view::ColumnDef;

use crate::row::AuditRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuditFamily {
    /// Per-URL transfer waste (unused code, image sizing, compression).
    Resource,
    /// Per-script CPU time.
    Bootup,
    /// Per-origin latency.
    Network,
    /// Per-entity third-party cost.
    ThirdParty,
    #[default]
    Generic,
}

impl AuditFamily {
    /// Family of a homogeneous row set: the first row that is not generic.
    pub fn of_rows<'r, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'r AuditRow>,
    {
        rows.into_iter()
            .map(|r| TypedRow::classify(r).family())
            .find(|f| *f != AuditFamily::Generic)
            .unwrap_or_default()
    }

    /// Rows of this family are merged by URL before ranking.
    pub fn dedups_by_url(self) -> bool {
        matches!(self, AuditFamily::Resource | AuditFamily::Bootup)
    }

    /// Column preset used when a payload carries no headings.
    pub fn preset_columns(self) -> Vec<ColumnDef> {
        match self {
            AuditFamily::Resource => vec![
                ColumnDef::text("url", "URL"),
                ColumnDef::number("totalBytes", "Transfer Size"),
                ColumnDef::number("wastedBytes", "Potential Savings"),
                ColumnDef::number("wastedMs", "Potential Savings (ms)"),
            ],
            AuditFamily::Bootup => vec![
                ColumnDef::text("url", "URL"),
                ColumnDef::number("total", "Total CPU Time"),
                ColumnDef::number("scripting", "Script Evaluation"),
                ColumnDef::number("scriptParseCompile", "Script Parse"),
            ],
            AuditFamily::Network => vec![
                ColumnDef::text("origin", "Origin"),
                ColumnDef::number("rtt", "Round Trip Time"),
                ColumnDef::number("serverResponseTime", "Server Backend Latency"),
            ],
            AuditFamily::ThirdParty => vec![
                ColumnDef::text("entity", "Third-Party"),
                ColumnDef::number("transferSize", "Transfer Size"),
                ColumnDef::number("blockingTime", "Main-Thread Blocking Time"),
                ColumnDef::number("mainThreadTime", "Main-Thread Time"),
            ],
            AuditFamily::Generic => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRow {
    pub url: String,
    pub total_bytes: Option<f64>,
    pub wasted_bytes: Option<f64>,
    pub wasted_ms: Option<f64>,
    pub wasted_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BootupRow {
    pub url: String,
    pub total: Option<f64>,
    pub scripting: Option<f64>,
    pub script_parse_compile: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkRow {
    pub origin: String,
    pub rtt: Option<f64>,
    pub server_response_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThirdPartyRow {
    pub entity: String,
    pub transfer_size: Option<f64>,
    pub blocking_time: Option<f64>,
    pub main_thread_time: Option<f64>,
}

/// Typed view over one [`AuditRow`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypedRow<'a> {
    Resource(ResourceRow),
    Bootup(BootupRow),
    Network(NetworkRow),
    ThirdParty(ThirdPartyRow),
    Generic(&'a AuditRow),
}

impl<'a> TypedRow<'a> {
    pub fn classify(row: &'a AuditRow) -> Self {
        let has = |k: &str| row.number(k).is_some();

        if let Some(url) = row.url() {
            if has("scripting") || has("scriptParseCompile") || has("total") {
                return TypedRow::Bootup(BootupRow {
                    url: url.to_string(),
                    total: row.number("total"),
                    scripting: row.number("scripting"),
                    script_parse_compile: row.number("scriptParseCompile"),
                });
            }
            if has("wastedBytes") || has("wastedMs") || has("totalBytes") {
                return TypedRow::Resource(ResourceRow {
                    url: url.to_string(),
                    total_bytes: row.number("totalBytes"),
                    wasted_bytes: row.number("wastedBytes"),
                    wasted_ms: row.number("wastedMs"),
                    wasted_percent: row.number("wastedPercent"),
                });
            }
        }
        if let Some(origin) = row.text("origin").filter(|o| !o.is_empty()) {
            if has("rtt") || has("serverResponseTime") {
                return TypedRow::Network(NetworkRow {
                    origin: origin.to_string(),
                    rtt: row.number("rtt"),
                    server_response_time: row.number("serverResponseTime"),
                });
            }
        }
        if let Some(entity) = row.get("entity").and_then(entity_text) {
            return TypedRow::ThirdParty(ThirdPartyRow {
                entity,
                transfer_size: row.number("transferSize"),
                blocking_time: row.number("blockingTime"),
                main_thread_time: row.number("mainThreadTime"),
            });
        }
        TypedRow::Generic(row)
    }

    pub fn family(&self) -> AuditFamily {
        match self {
            TypedRow::Resource(_) => AuditFamily::Resource,
            TypedRow::Bootup(_) => AuditFamily::Bootup,
            TypedRow::Network(_) => AuditFamily::Network,
            TypedRow::ThirdParty(_) => AuditFamily::ThirdParty,
            TypedRow::Generic(_) => AuditFamily::Generic,
        }
    }

    /// Key that identifies the same entity across reports.
    pub fn identity(&self) -> Option<String> {
        match self {
            TypedRow::Resource(r) => Some(r.url.clone()),
            TypedRow::Bootup(r) => Some(r.url.clone()),
            TypedRow::Network(r) => Some(r.origin.clone()),
            TypedRow::ThirdParty(r) => Some(r.entity.clone()),
            TypedRow::Generic(row) => {
                if let Some(url) = row.url() {
                    return Some(url.to_string());
                }
                ["origin", "groupLabel", "group", "resourceType"]
                    .iter()
                    .find_map(|k| row.text(k).filter(|s| !s.is_empty()))
                    .map(str::to_owned)
                    .or_else(|| row.get("entity").and_then(entity_text))
            }
        }
    }

    /// Magnitude used to rank clusters; larger is worse.
    pub fn impact(&self) -> Option<f64> {
        match self {
            TypedRow::Resource(r) => r.wasted_ms.or(r.wasted_bytes).or(r.total_bytes),
            TypedRow::Bootup(r) => r.total.or(r.scripting),
            TypedRow::Network(r) => r.rtt.or(r.server_response_time),
            TypedRow::ThirdParty(r) => r
                .blocking_time
                .or(r.main_thread_time)
                .or(r.transfer_size),
            TypedRow::Generic(row) => [
                "wastedMs",
                "wastedBytes",
                "total",
                "duration",
                "totalBytes",
                "transferSize",
            ]
            .iter()
            .find_map(|k| row.number(k)),
        }
    }
}

/// Entities are plain strings or link objects.
fn entity_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(o) => ["text", "value", "url"]
            .iter()
            .find_map(|k| o.get(*k).and_then(Value::as_str))
            .filter(|s| !s.is_empty())
            .map(str::to_owned),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> AuditRow {
        AuditRow(v.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn classifies_known_shapes() {
        let r = row(json!({"url": "a.js", "wastedBytes": 10, "totalBytes": 40}));
        assert_eq!(TypedRow::classify(&r).family(), AuditFamily::Resource);
        assert_eq!(TypedRow::classify(&r).impact(), Some(10.0));

        let r = row(json!({"url": "a.js", "total": 120, "scripting": 80}));
        assert_eq!(TypedRow::classify(&r).family(), AuditFamily::Bootup);
        assert_eq!(TypedRow::classify(&r).impact(), Some(120.0));

        let r = row(json!({"origin": "https://cdn.test", "rtt": 33}));
        assert_eq!(TypedRow::classify(&r).identity().as_deref(), Some("https://cdn.test"));

        let r = row(json!({"entity": {"type": "link", "text": "Google Tag Manager"}, "transferSize": 9}));
        let typed = TypedRow::classify(&r);
        assert_eq!(typed.family(), AuditFamily::ThirdParty);
        assert_eq!(typed.identity().as_deref(), Some("Google Tag Manager"));
    }

    #[test]
    fn generic_fallback_reads_what_it_finds() {
        let r = row(json!({"groupLabel": "Style & Layout", "duration": 250.5}));
        let typed = TypedRow::classify(&r);
        assert_eq!(typed.family(), AuditFamily::Generic);
        assert_eq!(typed.identity().as_deref(), Some("Style & Layout"));
        assert_eq!(typed.impact(), Some(250.5));

        let empty = row(json!({"node": {"snippet": "<img>"}}));
        assert_eq!(TypedRow::classify(&empty).identity(), None);
        assert_eq!(TypedRow::classify(&empty).impact(), None);
        assert!(AuditFamily::Generic.preset_columns().is_empty());
    }

    #[test]
    fn family_of_rows_skips_generic() {
        let rows = vec![row(json!({"note": "x"})), row(json!({"url": "b.css", "wastedMs": 5}))];
        assert_eq!(AuditFamily::of_rows(&rows), AuditFamily::Resource);
        assert_eq!(AuditFamily::of_rows(std::iter::empty()), AuditFamily::Generic);
    }
}
