//! Per-audit recommendation builder.
//!
//! For each audit id in the [`AuditDataMap`]:
//! 1) worst score and combined metric savings across entries;
//! 2) detail rows tagged with their report label, opportunity items kept apart;
//! 3) URL merge per the configured [`DedupPolicy`];
//! 4) cross-report ranking by family identity and impact;
//! 5) actionable steps from descriptions.

pub mod steps;
pub mod summary;

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::collect::{AuditDataMap, AuditEntry};
use crate::config::{AggregatorConfig, DedupPolicy};
use crate::dedup::{UNATTRIBUTABLE, dedup_resources, join_labels};
use crate::extract::extract_details;
use crate::family::{AuditFamily, TypedRow};
use crate::rank::rank_by_peak;
use crate::report::{ColumnHeading, DetailPayload, Priority, RawAudit};
use crate::row::AuditRow;

pub use steps::{ActionableStep, StepGroup};

/// Score badge of one contributing report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportScore {
    pub label: String,
    pub score: Option<f64>,
    pub display_value: Option<String>,
}

/// Cross-report view of one audit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub group: Option<String>,
    pub priority: Priority,
    /// Lowest non-null score; `None` when no report scored the audit.
    pub worst_score: Option<f64>,
    pub combined_metric_savings: BTreeMap<String, f64>,
    pub actionable_steps: Vec<ActionableStep>,
    pub rows: Vec<AuditRow>,
    pub opportunity_items: Vec<AuditRow>,
    pub table_headings: Option<Vec<ColumnHeading>>,
    pub family: AuditFamily,
    pub reports: Vec<ReportScore>,
}

impl Recommendation {
    /// Anything to tabulate.
    pub fn has_details(&self) -> bool {
        !self.rows.is_empty() || !self.opportunity_items.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.reports.iter().map(|r| r.label.as_str()).collect()
    }

    pub fn report_count(&self) -> usize {
        self.reports.len()
    }

    pub fn largest_saving(&self) -> Option<f64> {
        self.combined_metric_savings.values().copied().reduce(f64::max)
    }

    /// Appends caller-supplied steps; identical texts merge their labels.
    pub fn add_steps<I>(&mut self, extra: I)
    where
        I: IntoIterator<Item = ActionableStep>,
    {
        for step in extra {
            match self.actionable_steps.iter_mut().find(|s| s.step == step.step) {
                Some(existing) if existing.reports.is_empty() => {}
                Some(existing) if step.reports.is_empty() => existing.reports.clear(),
                Some(existing) => {
                    for r in step.reports {
                        if !existing.reports.contains(&r) {
                            existing.reports.push(r);
                        }
                    }
                }
                None => self.actionable_steps.push(step),
            }
        }
    }

    pub fn step_groups(&self) -> Vec<StepGroup> {
        steps::group_steps(&self.actionable_steps, &self.labels())
    }
}

/// One recommendation per audit id, in audit-id order.
pub fn analyze(map: &AuditDataMap<'_>, cfg: &AggregatorConfig) -> Vec<Recommendation> {
    map.iter()
        .filter(|(_, entries)| !entries.is_empty())
        .map(|(id, entries)| analyze_audit(id, entries, cfg))
        .collect()
}

pub fn analyze_audit(
    audit_id: &str,
    entries: &[AuditEntry<'_>],
    cfg: &AggregatorConfig,
) -> Recommendation {
    let title =
        first_text(entries, |a| Some(a.title.as_str())).unwrap_or_else(|| audit_id.to_string());
    let description = first_text(entries, |a| a.description.as_deref());
    let category = first_text(entries, |a| a.category.as_deref());
    let group = first_text(entries, |a| a.group.as_deref());

    let worst = worst_score(entries);
    let priority = entries
        .iter()
        .map(|e| e.audit.effective_priority())
        .min()
        .unwrap_or(Priority::Low);

    let reports = entries
        .iter()
        .map(|e| ReportScore {
            label: e.label.to_string(),
            score: e.audit.score,
            display_value: e.audit.display_value.clone(),
        })
        .collect();

    let mut table_rows: Vec<Vec<AuditRow>> = Vec::new();
    let mut opportunity_items: Vec<AuditRow> = Vec::new();
    let mut table_headings: Option<Vec<ColumnHeading>> = None;
    let mut row_labels: Vec<&str> = Vec::new();

    for e in entries {
        let ex = extract_details(e.audit.details.as_ref());
        if ex.items.is_empty() {
            continue;
        }
        if !row_labels.contains(&e.label) {
            row_labels.push(e.label);
        }
        let mut items = ex.items;
        for r in &mut items {
            r.set_label(e.label);
        }
        if matches!(e.audit.details, Some(DetailPayload::Opportunity { .. })) {
            opportunity_items.extend(items);
        } else {
            if table_headings.is_none() {
                table_headings = ex.headings.filter(|h| !h.is_empty());
            }
            table_rows.push(items);
        }
    }

    let family = match AuditFamily::of_rows(table_rows.iter().flatten()) {
        AuditFamily::Generic => AuditFamily::of_rows(&opportunity_items),
        f => f,
    };

    let row_count: usize = table_rows.iter().map(Vec::len).sum();
    let mut rows = merge_rows(table_rows, family, cfg.dedup);
    let report_count = row_labels.len();
    if cfg.rank_across_reports {
        rows = rank_rows(rows, report_count);
        opportunity_items = rank_rows(opportunity_items, report_count);
    }
    debug!(
        "analyze: {} rows {} -> {} ({:?}, {} report(s))",
        audit_id,
        row_count,
        rows.len(),
        family,
        report_count
    );

    Recommendation {
        id: audit_id.to_string(),
        title,
        description,
        category,
        group,
        priority,
        worst_score: worst,
        combined_metric_savings: combined_metric_savings(entries),
        actionable_steps: steps::derive_steps(entries),
        rows,
        opportunity_items,
        table_headings,
        family,
        reports,
    }
}

/// First non-empty text any entry carries.
fn first_text<F>(entries: &[AuditEntry<'_>], f: F) -> Option<String>
where
    F: Fn(&RawAudit) -> Option<&str>,
{
    entries
        .iter()
        .find_map(|e| f(e.audit).filter(|s| !s.is_empty()))
        .map(str::to_owned)
}

/// Minimum non-null score; the first entry's (null) score otherwise.
pub fn worst_score(entries: &[AuditEntry<'_>]) -> Option<f64> {
    entries
        .iter()
        .filter_map(|e| e.audit.score)
        .filter(|s| !s.is_nan())
        .reduce(f64::min)
        .or_else(|| entries.first().and_then(|e| e.audit.score))
}

/// Per metric, the largest positive saving any report estimated.
pub fn combined_metric_savings(entries: &[AuditEntry<'_>]) -> BTreeMap<String, f64> {
    let mut out: BTreeMap<String, f64> = BTreeMap::new();
    for e in entries {
        for (metric, &value) in &e.audit.metric_savings {
            if value > 0.0 {
                out.entry(metric.clone())
                    .and_modify(|v| *v = v.max(value))
                    .or_insert(value);
            }
        }
    }
    out
}

fn merge_rows(per_entry: Vec<Vec<AuditRow>>, family: AuditFamily, policy: DedupPolicy) -> Vec<AuditRow> {
    if !family.dedups_by_url() {
        return per_entry.into_iter().flatten().collect();
    }
    match policy {
        DedupPolicy::Off => per_entry.into_iter().flatten().collect(),
        DedupPolicy::PerReport => per_entry.into_iter().flat_map(dedup_resources).collect(),
        DedupPolicy::AcrossReports => {
            let flat: Vec<AuditRow> = per_entry.into_iter().flatten().collect();
            let mut url_labels: HashMap<String, Vec<String>> = HashMap::new();
            for r in &flat {
                if let (Some(url), Some(label)) = (r.url(), r.label()) {
                    if url != UNATTRIBUTABLE {
                        url_labels
                            .entry(url.to_string())
                            .or_default()
                            .push(label.to_string());
                    }
                }
            }
            let mut merged = dedup_resources(flat);
            for r in &mut merged {
                let joined = r
                    .url()
                    .and_then(|u| url_labels.get(u))
                    .and_then(|ls| join_labels(ls.iter().map(String::as_str)));
                if let Some(j) = joined {
                    r.replace_label(j);
                }
            }
            merged
        }
    }
}

/// Ranks rows by family identity; rows without one rank on their own.
fn rank_rows(rows: Vec<AuditRow>, report_count: usize) -> Vec<AuditRow> {
    let keyed: Vec<(String, AuditRow)> = rows
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            let key = TypedRow::classify(&r)
                .identity()
                .unwrap_or_else(|| format!("#{i}"));
            (key, r)
        })
        .collect();
    rank_by_peak(
        keyed,
        |(k, _)| k.clone(),
        |(_, r)| TypedRow::classify(r).impact(),
        report_count,
    )
    .into_iter()
    .map(|(_, r)| r)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::{LabeledReport, collect_audits};
    use crate::report::AuditReport;
    use serde_json::{Value, json};

    fn report(audits: Value) -> AuditReport {
        AuditReport::from_value(json!({"lighthouseResult": {"audits": audits}}))
    }

    #[test]
    fn savings_keep_positive_maxima() {
        let m = report(json!({"x": {"metricSavings": {"LCP": 100, "TBT": 0, "CLS": -1}}}));
        let d = report(json!({"x": {"metricSavings": {"LCP": 250, "FCP": 40}}}));
        let map = collect_audits(&[LabeledReport::new("Mobile", &m), LabeledReport::new("Desktop", &d)]);
        let savings = combined_metric_savings(map.get("x").unwrap());
        assert_eq!(savings.len(), 2);
        assert_eq!(savings["LCP"], 250.0);
        assert_eq!(savings["FCP"], 40.0);
    }

    #[test]
    fn worst_score_ignores_nulls() {
        let a = report(json!({"x": {"score": null}}));
        let b = report(json!({"x": {"score": 0.7}}));
        let map = collect_audits(&[LabeledReport::new("A", &a), LabeledReport::new("B", &b)]);
        assert_eq!(worst_score(map.get("x").unwrap()), Some(0.7));

        let map = collect_audits(&[LabeledReport::new("A", &a)]);
        assert_eq!(worst_score(map.get("x").unwrap()), None);
    }

    #[test]
    fn priority_is_most_urgent_across_entries() {
        let source = AuditReport::default();
        let unattributed = RawAudit {
            score: Some(0.3),
            ..RawAudit::default()
        };
        let explicit = RawAudit {
            score: Some(0.95),
            priority: Some(Priority::Low),
            ..RawAudit::default()
        };
        let entry = |audit, label| AuditEntry {
            audit_id: "x",
            audit,
            label,
            source_report: &source,
        };
        let cfg = AggregatorConfig::default();

        let rec = analyze_audit("x", &[entry(&explicit, "A"), entry(&unattributed, "B")], &cfg);
        assert_eq!(rec.priority, Priority::High);

        let rec = analyze_audit("x", &[entry(&explicit, "A")], &cfg);
        assert_eq!(rec.priority, Priority::Low);
    }

    #[test]
    fn opportunity_items_stay_apart_from_rows() {
        let r = report(json!({"x": {"details": {"type": "opportunity", "items": [{"url": "a.js", "wastedBytes": 5}]}}}));
        let map = collect_audits(&[LabeledReport::new("Mobile", &r)]);
        let rec = analyze_audit("x", map.get("x").unwrap(), &AggregatorConfig::default());
        assert!(rec.rows.is_empty());
        assert_eq!(rec.opportunity_items.len(), 1);
        assert_eq!(rec.opportunity_items[0].label(), Some("Mobile"));
        assert_eq!(rec.family, AuditFamily::Resource);
        assert!(rec.has_details());
    }

    #[test]
    fn policies_control_url_merge() {
        let table = |bytes: u32| {
            json!({"u": {"details": {"type": "table", "headings": [], "items": [
                {"url": "a.js", "wastedBytes": bytes},
                {"url": "a.js", "wastedBytes": 1}
            ]}}})
        };
        let m = report(table(100));
        let d = report(table(50));
        let map = collect_audits(&[LabeledReport::new("Mobile", &m), LabeledReport::new("Desktop", &d)]);
        let entries = map.get("u").unwrap();

        let across = analyze_audit("u", entries, &AggregatorConfig::default());
        assert_eq!(across.rows.len(), 1);
        assert_eq!(across.rows[0].label(), Some("Mobile, Desktop"));

        let per = AggregatorConfig {
            dedup: DedupPolicy::PerReport,
            ..AggregatorConfig::default()
        };
        let per = analyze_audit("u", entries, &per);
        assert_eq!(per.rows.len(), 2);
        assert_eq!(per.rows[0].number("wastedBytes"), Some(100.0));

        let off = AggregatorConfig {
            dedup: DedupPolicy::Off,
            ..AggregatorConfig::default()
        };
        assert_eq!(analyze_audit("u", entries, &off).rows.len(), 4);
    }

    #[test]
    fn explicit_priority_wins_over_score() {
        let a = report(json!({"x": {"score": 0.95, "priority": "medium"}}));
        let b = report(json!({"x": {"score": 0.92}}));
        let map = collect_audits(&[LabeledReport::new("A", &a), LabeledReport::new("B", &b)]);
        let rec = analyze_audit("x", map.get("x").unwrap(), &AggregatorConfig::default());
        assert_eq!(rec.priority, Priority::Medium);
        assert!(!rec.has_details());
    }

    #[test]
    fn extra_steps_merge_labels() {
        let a = report(json!({"x": {"description": "Do the thing."}}));
        let map = collect_audits(&[LabeledReport::new("A", &a)]);
        let mut rec = analyze_audit("x", map.get("x").unwrap(), &AggregatorConfig::default());
        rec.add_steps([
            ActionableStep::new("Do the thing.", vec!["B".into()]),
            ActionableStep::everywhere("Cache it."),
        ]);
        assert_eq!(rec.actionable_steps.len(), 2);
        assert_eq!(rec.actionable_steps[0].reports, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(rec.step_groups()[0].key, "all");
    }
}
