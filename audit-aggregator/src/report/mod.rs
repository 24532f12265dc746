//! Report documents as delivered by the fetch collaborator.
//!
//! Decoding is lenient by construction:
//! 1) a document without `lighthouseResult` decodes to an empty report;
//! 2) each audit is decoded on its own, undecodable ones are skipped;
//! 3) audits missing `category`/`priority` are attributed from the report
//!    categories and from their score.

pub mod audit;
pub mod details;

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

pub use audit::{Priority, RawAudit, ScoreDisplayMode};
pub use details::{ColumnHeading, DetailPayload, ListElement};

/// A whole report document. Immutable once decoded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct AuditReport {
    pub lighthouse_result: Option<LighthouseResult>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LighthouseResult {
    pub requested_url: Option<String>,
    pub final_url: Option<String>,
    pub fetch_time: Option<String>,
    pub audits: BTreeMap<String, RawAudit>,
    /// Sorted by category id.
    pub categories: Vec<ReportCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportCategory {
    pub id: String,
    pub title: String,
    pub score: Option<f64>,
    pub audit_refs: Vec<AuditRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditRef {
    pub id: String,
    pub weight: Option<f64>,
    pub group: Option<String>,
}

impl From<Value> for AuditReport {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl AuditReport {
    pub fn from_value(value: Value) -> Self {
        let lighthouse_result = match value {
            Value::Object(mut root) => match root.remove("lighthouseResult") {
                Some(Value::Object(lr)) => Some(LighthouseResult::from_map(lr)),
                _ => None,
            },
            _ => None,
        };
        Self { lighthouse_result }
    }

    /// Audits of this report; empty when the result is missing.
    pub fn audits(&self) -> impl Iterator<Item = (&str, &RawAudit)> {
        self.lighthouse_result
            .iter()
            .flat_map(|lr| lr.audits.iter().map(|(k, a)| (k.as_str(), a)))
    }

    pub fn audit(&self, id: &str) -> Option<&RawAudit> {
        self.lighthouse_result.as_ref()?.audits.get(id)
    }

    pub fn categories(&self) -> &[ReportCategory] {
        self.lighthouse_result
            .as_ref()
            .map(|lr| lr.categories.as_slice())
            .unwrap_or_default()
    }

    pub fn requested_url(&self) -> Option<&str> {
        self.lighthouse_result.as_ref()?.requested_url.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.audits().next().is_none()
    }
}

impl LighthouseResult {
    fn from_map(mut lr: Map<String, Value>) -> Self {
        let text = |v: Option<Value>| match v {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        let requested_url = text(lr.remove("requestedUrl"));
        let final_url = text(lr.remove("finalUrl").or_else(|| lr.remove("finalDisplayedUrl")));
        let fetch_time = text(lr.remove("fetchTime"));

        let categories: Vec<ReportCategory> = match lr.remove("categories") {
            Some(Value::Object(cats)) => cats
                .into_iter()
                .filter_map(|(key, v)| {
                    let mut cat = ReportCategory::deserialize(v).ok()?;
                    if cat.id.is_empty() {
                        cat.id = key;
                    }
                    Some(cat)
                })
                .collect(),
            _ => Vec::new(),
        };

        let mut audits = BTreeMap::new();
        if let Some(Value::Object(raw)) = lr.remove("audits") {
            for (key, v) in raw {
                if v.is_null() {
                    continue;
                }
                let mut audit = match RawAudit::deserialize(v) {
                    Ok(a) => a,
                    Err(e) => {
                        warn!(
                            audit = %key,
                            url = requested_url.as_deref().unwrap_or("-"),
                            error = %e,
                            "skipping undecodable audit"
                        );
                        continue;
                    }
                };
                if audit.id.is_empty() {
                    audit.id = key.clone();
                }
                attribute(&mut audit, &categories);
                audits.insert(key, audit);
            }
        }

        Self {
            requested_url,
            final_url,
            fetch_time,
            audits,
            categories,
        }
    }
}

/// Fills category/group from the first referencing category and priority
/// from the score, leaving explicit values alone.
fn attribute(audit: &mut RawAudit, categories: &[ReportCategory]) {
    if audit.category.is_none() {
        let hit = categories.iter().find_map(|cat| {
            cat.audit_refs
                .iter()
                .find(|r| r.id == audit.id)
                .map(|r| (cat, r))
        });
        if let Some((cat, aref)) = hit {
            let name = if cat.title.is_empty() { &cat.id } else { &cat.title };
            audit.category = Some(name.clone());
            if audit.group.is_none() {
                audit.group = aref.group.clone();
            }
        }
    }
    audit.priority = Some(audit.effective_priority());
}
