use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::details::DetailPayload;

/// Urgency of a recommendation. Ordering puts `High` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Score bands: null → low, below 0.5 → high, below 0.9 → medium.
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if s < 0.5 => Priority::High,
            Some(s) if s < 0.9 => Priority::Medium,
            _ => Priority::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreDisplayMode {
    Numeric,
    Binary,
    Manual,
    Informative,
    NotApplicable,
    MetricSavings,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One audit result inside a report.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAudit {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// `None` when the audit is not numerically scored.
    pub score: Option<f64>,
    pub score_display_mode: ScoreDisplayMode,
    pub display_value: Option<String>,
    pub details: Option<DetailPayload>,
    #[serde(deserialize_with = "numeric_map")]
    pub metric_savings: BTreeMap<String, f64>,
    pub category: Option<String>,
    /// Category group (e.g. `diagnostics`, `load-opportunities`).
    pub group: Option<String>,
    pub priority: Option<Priority>,
}

impl RawAudit {
    /// Explicit priority, else the band of the audit's own score.
    pub fn effective_priority(&self) -> Priority {
        self.priority
            .unwrap_or_else(|| Priority::from_score(self.score))
    }
}

/// Keeps only numeric entries; a missing or null map is empty.
fn numeric_map<'de, D>(de: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Map<String, Value>>::deserialize(de)?;
    Ok(raw
        .into_iter()
        .flatten()
        .filter_map(|(k, v)| v.as_f64().map(|n| (k, n)))
        .collect())
}
