//! Report loading: documents are read from JSON files on disk, one per
//! label.
//!
//! A file that is missing or unreadable contributes nothing; the pass
//! continues with the remaining reports.

use std::path::Path;

use anyhow::{Context, Result};
use audit_aggregator::{Aggregation, AuditReport, ReportSource};
use serde_json::Value;
use tokio::fs;
use tracing::{info, warn};

/// Reads and decodes one report file.
pub async fn load_report(path: &Path) -> Result<AuditReport> {
    let data = fs::read(path)
        .await
        .with_context(|| format!("read report {}", path.display()))?;
    let value: Value = serde_json::from_slice(&data)
        .with_context(|| format!("parse report {}", path.display()))?;
    Ok(AuditReport::from_value(value))
}

/// Loads every source in order; failures become `None`.
pub async fn load_reports(sources: &[ReportSource]) -> Vec<(String, Option<AuditReport>)> {
    let mut out = Vec::with_capacity(sources.len());
    for src in sources {
        let report = match load_report(&src.path).await {
            Ok(r) => {
                if r.is_empty() {
                    warn!(label = %src.label, "report has no audits; contributes nothing");
                } else {
                    info!(label = %src.label, path = %src.path.display(), "report loaded");
                }
                Some(r)
            }
            Err(e) => {
                warn!(label = %src.label, error = %format!("{e:#}"), "skipping report");
                None
            }
        };
        out.push((src.label.clone(), report));
    }
    out
}

/// Writes the aggregation as pretty JSON, creating parent directories.
pub async fn write_aggregation(path: &Path, agg: &Aggregation) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create {}", dir.display()))?;
    }
    let bytes = serde_json::to_vec_pretty(agg).context("serialize aggregation")?;
    fs::write(path, bytes)
        .await
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("audit-insights-{}", std::process::id()))
            .join(name)
    }

    #[tokio::test]
    async fn missing_and_broken_files_are_skipped() {
        let good = scratch("good.json");
        let broken = scratch("broken.json");
        fs::create_dir_all(good.parent().unwrap()).await.unwrap();
        fs::write(
            &good,
            br#"{"lighthouseResult": {"audits": {"a": {"score": 0.5}}}}"#,
        )
        .await
        .unwrap();
        fs::write(&broken, b"{not json").await.unwrap();

        let sources = vec![
            ReportSource { label: "Mobile".into(), path: good },
            ReportSource { label: "Desktop".into(), path: broken },
            ReportSource { label: "Tablet".into(), path: scratch("absent.json") },
        ];
        let loaded = load_reports(&sources).await;
        assert_eq!(loaded.len(), 3);
        assert!(loaded[0].1.as_ref().is_some_and(|r| !r.is_empty()));
        assert!(loaded[1].1.is_none());
        assert!(loaded[2].1.is_none());
    }
}
