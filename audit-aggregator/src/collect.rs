//! Indexes audits across labeled reports.

use std::collections::BTreeMap;

use crate::report::{AuditReport, RawAudit};

/// A report with its caller-supplied label; `None` while still loading.
#[derive(Debug, Clone, Copy)]
pub struct LabeledReport<'a> {
    pub label: &'a str,
    pub report: Option<&'a AuditReport>,
}

impl<'a> LabeledReport<'a> {
    pub fn new(label: &'a str, report: &'a AuditReport) -> Self {
        Self {
            label,
            report: Some(report),
        }
    }

    pub fn pending(label: &'a str) -> Self {
        Self {
            label,
            report: None,
        }
    }
}

/// One audit as seen in one report.
#[derive(Debug, Clone, Copy)]
pub struct AuditEntry<'a> {
    pub audit_id: &'a str,
    pub audit: &'a RawAudit,
    pub label: &'a str,
    pub source_report: &'a AuditReport,
}

/// Audit id → entries in report processing order.
#[derive(Debug, Clone, Default)]
pub struct AuditDataMap<'a> {
    entries: BTreeMap<&'a str, Vec<AuditEntry<'a>>>,
    labels: Vec<&'a str>,
}

impl<'a> AuditDataMap<'a> {
    pub fn get(&self, audit_id: &str) -> Option<&[AuditEntry<'a>]> {
        self.entries.get(audit_id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[AuditEntry<'a>])> {
        self.entries.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn audit_ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels of reports that contributed at least one audit, in order.
    pub fn labels(&self) -> &[&'a str] {
        &self.labels
    }
}

/// Rebuilds the audit index from scratch. Absent or empty reports add
/// nothing.
pub fn collect_audits<'a>(reports: &[LabeledReport<'a>]) -> AuditDataMap<'a> {
    let mut map = AuditDataMap::default();
    for lr in reports {
        let Some(report) = lr.report else {
            continue;
        };
        let mut contributed = false;
        for (audit_id, audit) in report.audits() {
            map.entries.entry(audit_id).or_default().push(AuditEntry {
                audit_id,
                audit,
                label: lr.label,
                source_report: report,
            });
            contributed = true;
        }
        if contributed && !map.labels.contains(&lr.label) {
            map.labels.push(lr.label);
        }
    }
    map
}
