//! Runtime configuration loaded from environment variables.
//!
//! # Environment variables
//!
//! - `AUDIT_DEDUP_POLICY`        = `across-reports` (default) | `per-report` | `off`
//! - `AUDIT_RANK_ACROSS_REPORTS` = `true` (default) | `false`
//! - `AUDIT_HIDE_PASSING`        = `false` (default) | `true`
//! - `AUDIT_PAGE_SIZE`           = rows per table page (default 10, must be ≥ 1)
//! - `AUDIT_REPORTS`             = `Label=path.json,Label2=other.json`
//! - `AUDIT_OUTPUT_JSON`         = optional path for the serialized aggregation
//!
//! [`AggregatorConfig::from_lookup`] takes any key lookup so tests never have
//! to touch the process environment.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use table_view::{DEFAULT_PAGE_SIZE, TableOptions};

use crate::errors::{AggregatorResult, ConfigError};

/// How resource rows sharing a URL are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPolicy {
    /// Merge rows of every report into one row per URL.
    #[default]
    AcrossReports,
    /// Merge duplicates inside each report only; reports stay separate.
    PerReport,
    /// Keep every row.
    Off,
}

impl FromStr for DedupPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "across-reports" | "across" => Ok(DedupPolicy::AcrossReports),
            "per-report" => Ok(DedupPolicy::PerReport),
            "off" | "none" => Ok(DedupPolicy::Off),
            other => Err(ConfigError::InvalidValue {
                var: "AUDIT_DEDUP_POLICY",
                value: other.to_string(),
                expected: "across-reports, per-report or off",
            }),
        }
    }
}

/// One labeled report file for the binary to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSource {
    pub label: String,
    pub path: PathBuf,
}

/// Config bag for an aggregation pass. All fields have defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub dedup: DedupPolicy,
    pub rank_across_reports: bool,
    /// Drop recommendations whose worst score is exactly 1.0.
    pub hide_passing: bool,
    pub page_size: usize,
    pub reports: Vec<ReportSource>,
    pub output_json: Option<PathBuf>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            dedup: DedupPolicy::default(),
            rank_across_reports: true,
            hide_passing: false,
            page_size: DEFAULT_PAGE_SIZE,
            reports: Vec::new(),
            output_json: None,
        }
    }
}

impl AggregatorConfig {
    /// Build from process environment variables.
    pub fn from_env() -> AggregatorResult<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary key lookup; unset or blank keys use defaults.
    pub fn from_lookup<F>(lookup: F) -> AggregatorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let dflt = Self::default();

        let dedup = match get("AUDIT_DEDUP_POLICY") {
            Some(v) => v.parse()?,
            None => dflt.dedup,
        };
        let rank_across_reports = match get("AUDIT_RANK_ACROSS_REPORTS") {
            Some(v) => parse_bool("AUDIT_RANK_ACROSS_REPORTS", &v)?,
            None => dflt.rank_across_reports,
        };
        let hide_passing = match get("AUDIT_HIDE_PASSING") {
            Some(v) => parse_bool("AUDIT_HIDE_PASSING", &v)?,
            None => dflt.hide_passing,
        };
        let page_size = match get("AUDIT_PAGE_SIZE") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "AUDIT_PAGE_SIZE",
                    reason: "expected usize",
                })?,
            None => dflt.page_size,
        };
        let reports = match get("AUDIT_REPORTS") {
            Some(v) => parse_report_sources(&v)?,
            None => Vec::new(),
        };
        let output_json = get("AUDIT_OUTPUT_JSON").map(PathBuf::from);

        let cfg = Self {
            dedup,
            rank_across_reports,
            hide_passing,
            page_size,
            reports,
            output_json,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate config sanity (no degenerate values).
    pub fn validate(&self) -> AggregatorResult<()> {
        if self.page_size == 0 {
            return Err(ConfigError::OutOfRange {
                field: "page_size",
                detail: "expected at least 1",
            }
            .into());
        }
        Ok(())
    }

    /// Table options for recommendation detail tables.
    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            page_size: self.page_size,
            ..TableOptions::default()
        }
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            var,
            value: other.to_string(),
            expected: "true or false",
        }),
    }
}

/// Parses `Mobile=reports/m.json,Desktop=reports/d.json`.
fn parse_report_sources(raw: &str) -> Result<Vec<ReportSource>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (label, path) = pair
                .split_once('=')
                .map(|(l, p)| (l.trim(), p.trim()))
                .filter(|(l, p)| !l.is_empty() && !p.is_empty())
                .ok_or_else(|| ConfigError::InvalidValue {
                    var: "AUDIT_REPORTS",
                    value: pair.to_string(),
                    expected: "Label=path pairs",
                })?;
            Ok(ReportSource {
                label: label.to_string(),
                path: PathBuf::from(path),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AggregatorError;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = AggregatorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, AggregatorConfig::default());
        assert_eq!(cfg.table_options().page_size, 10);
    }

    #[test]
    fn reads_every_knob() {
        let cfg = AggregatorConfig::from_lookup(lookup(&[
            ("AUDIT_DEDUP_POLICY", "per-report"),
            ("AUDIT_RANK_ACROSS_REPORTS", "no"),
            ("AUDIT_HIDE_PASSING", "1"),
            ("AUDIT_PAGE_SIZE", "25"),
            ("AUDIT_REPORTS", "Mobile=m.json, Desktop = d.json"),
            ("AUDIT_OUTPUT_JSON", "out/agg.json"),
        ]))
        .unwrap();
        assert_eq!(cfg.dedup, DedupPolicy::PerReport);
        assert!(!cfg.rank_across_reports);
        assert!(cfg.hide_passing);
        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.reports.len(), 2);
        assert_eq!(cfg.reports[1].label, "Desktop");
        assert_eq!(cfg.reports[1].path, PathBuf::from("d.json"));
        assert_eq!(cfg.output_json, Some(PathBuf::from("out/agg.json")));
    }

    #[test]
    fn rejects_bad_values() {
        let err = AggregatorConfig::from_lookup(lookup(&[("AUDIT_PAGE_SIZE", "0")])).unwrap_err();
        assert!(matches!(
            err,
            AggregatorError::Config(ConfigError::OutOfRange { field: "page_size", .. })
        ));

        let err = AggregatorConfig::from_lookup(lookup(&[("AUDIT_PAGE_SIZE", "ten")])).unwrap_err();
        assert!(matches!(err, AggregatorError::Config(ConfigError::InvalidNumber { .. })));

        let err = AggregatorConfig::from_lookup(lookup(&[("AUDIT_DEDUP_POLICY", "sometimes")]))
            .unwrap_err();
        assert!(matches!(err, AggregatorError::Config(ConfigError::InvalidValue { .. })));

        let err = AggregatorConfig::from_lookup(lookup(&[("AUDIT_REPORTS", "Mobile")])).unwrap_err();
        assert!(matches!(
            err,
            AggregatorError::Config(ConfigError::InvalidValue { var: "AUDIT_REPORTS", .. })
        ));
    }
}
