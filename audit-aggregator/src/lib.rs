//! Cross-report audit aggregation.
//!
//! Flow of [`aggregate_reports`]:
//! 1) Collect: index every audit of every labeled report by audit id.
//! 2) Analyze: one [`Recommendation`] per audit id (worst score, combined
//!    savings, merged and ranked rows, actionable steps).
//! 3) Present: keep recommendations with something to tabulate, optionally
//!    drop passing ones, order them and count them for badges.
//!
//! Everything here is synchronous and side-effect free apart from logging;
//! reports are borrowed, never copied.

pub mod analyze;
pub mod collect;
pub mod columns;
pub mod config;
pub mod dedup;
pub mod errors;
pub mod extract;
pub mod family;
pub mod rank;
pub mod report;
pub mod row;
pub mod telemetry;

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

pub use analyze::summary::{
    RecommendationFilter, RecommendationSummary, compare_recommendations, recommendation_columns,
    sort_recommendations, summarize,
};
pub use analyze::{ActionableStep, Recommendation, ReportScore, StepGroup, analyze, analyze_audit};
pub use collect::{AuditDataMap, AuditEntry, LabeledReport, collect_audits};
pub use columns::{columns_for, detail_table, opportunity_columns_for, opportunity_table};
pub use config::{AggregatorConfig, DedupPolicy, ReportSource};
pub use dedup::dedup_resources;
pub use errors::{AggregatorError, AggregatorResult, ConfigError};
pub use extract::{Extraction, extract_details};
pub use family::{AuditFamily, TypedRow};
pub use rank::rank_by_peak;
pub use report::{AuditReport, ColumnHeading, DetailPayload, Priority, RawAudit};
pub use row::AuditRow;

/// Result of one aggregation pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    pub generated_at: DateTime<Utc>,
    /// Labels of reports that contributed audits, in input order.
    pub labels: Vec<String>,
    /// Presentable recommendations, most urgent first.
    pub recommendations: Vec<Recommendation>,
    pub summary: RecommendationSummary,
}

/// Runs collect → analyze → present over the given reports.
pub fn aggregate_reports(reports: &[LabeledReport<'_>], cfg: &AggregatorConfig) -> Aggregation {
    let t0 = Instant::now();

    // step1: collect
    let map = collect_audits(reports);
    debug!(
        "step1: collected {} audit id(s) from {}/{} report(s) in {} ms",
        map.len(),
        map.labels().len(),
        reports.len(),
        t0.elapsed().as_millis()
    );

    // step2: analyze
    let t1 = Instant::now();
    let analyzed = analyze(&map, cfg);
    debug!(
        "step2: analyzed {} recommendation(s) in {} ms",
        analyzed.len(),
        t1.elapsed().as_millis()
    );

    // step3: present
    let before = analyzed.len();
    let mut recommendations: Vec<Recommendation> = analyzed
        .into_iter()
        .filter(Recommendation::has_details)
        .filter(|r| !(cfg.hide_passing && r.worst_score == Some(1.0)))
        .collect();
    sort_recommendations(&mut recommendations);
    let summary = summarize(&recommendations);
    debug!(
        "step3: kept {}/{} recommendation(s) with details",
        recommendations.len(),
        before
    );

    info!(
        recommendations = summary.total,
        reports = map.labels().len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "aggregation complete"
    );

    Aggregation {
        generated_at: Utc::now(),
        labels: map.labels().iter().map(|l| l.to_string()).collect(),
        recommendations,
        summary,
    }
}
