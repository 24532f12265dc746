//! Actionable steps and their report-set grouping.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::collect::AuditEntry;

/// Key of the class of steps that apply to every contributing report.
pub const ALL_REPORTS_KEY: &str = "all";

lazy_static! {
    static ref MARKDOWN_LINK: Regex =
        Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("markdown link pattern");
}

/// One step and the reports it applies to. Empty `reports` means all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionableStep {
    pub step: String,
    pub reports: Vec<String>,
}

impl ActionableStep {
    pub fn new(step: impl Into<String>, reports: Vec<String>) -> Self {
        Self {
            step: step.into(),
            reports,
        }
    }

    /// A step that applies to every report.
    pub fn everywhere(step: impl Into<String>) -> Self {
        Self::new(step, Vec::new())
    }
}

/// Steps sharing one report set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepGroup {
    /// `"all"` or the sorted comma-joined labels.
    pub key: String,
    /// Labels of the class; every contributing label for `"all"`.
    pub reports: Vec<String>,
    pub steps: Vec<String>,
}

/// Sorted distinct labels of a report list, or `None` when the list covers
/// every contributing label.
fn report_class(reports: &[String], all_labels: &[&str]) -> Option<Vec<String>> {
    let set: BTreeSet<&str> = reports.iter().map(String::as_str).collect();
    let all: BTreeSet<&str> = all_labels.iter().copied().collect();
    if set.is_empty() || set == all {
        None
    } else {
        Some(set.into_iter().map(str::to_owned).collect())
    }
}

/// Equivalence class of a report list against the contributing labels.
pub fn group_key(reports: &[String], all_labels: &[&str]) -> String {
    match report_class(reports, all_labels) {
        None => ALL_REPORTS_KEY.to_string(),
        Some(labels) => labels.join(","),
    }
}

/// Groups steps by report set. `"all"` comes first; the other classes
/// follow in the order their first step appeared.
pub fn group_steps(steps: &[ActionableStep], all_labels: &[&str]) -> Vec<StepGroup> {
    let mut classes: Vec<(Option<Vec<String>>, StepGroup)> = Vec::new();
    for s in steps {
        let class = report_class(&s.reports, all_labels);
        match classes.iter_mut().find(|(c, _)| *c == class) {
            Some((_, g)) => g.steps.push(s.step.clone()),
            None => {
                let (key, reports) = match &class {
                    None => (
                        ALL_REPORTS_KEY.to_string(),
                        all_labels.iter().map(|l| l.to_string()).collect(),
                    ),
                    Some(labels) => (labels.join(","), labels.clone()),
                };
                classes.push((
                    class,
                    StepGroup {
                        key,
                        reports,
                        steps: vec![s.step.clone()],
                    },
                ));
            }
        }
    }
    // stable: non-"all" classes keep first-appearance order
    classes.sort_by_key(|(c, _)| c.is_some());
    classes.into_iter().map(|(_, g)| g).collect()
}

/// One step per distinct cleaned description, listing the labels whose
/// entries carried it.
pub fn derive_steps(entries: &[AuditEntry<'_>]) -> Vec<ActionableStep> {
    let mut steps: Vec<ActionableStep> = Vec::new();
    for e in entries {
        let Some(text) = e.audit.description.as_deref().map(clean_description) else {
            continue;
        };
        if text.is_empty() {
            continue;
        }
        match steps.iter_mut().find(|s| s.step == text) {
            Some(s) => {
                if !s.reports.iter().any(|r| r == e.label) {
                    s.reports.push(e.label.to_string());
                }
            }
            None => steps.push(ActionableStep::new(text, vec![e.label.to_string()])),
        }
    }
    steps
}

/// Replaces markdown links with their text and collapses whitespace.
pub fn clean_description(raw: &str) -> String {
    let unlinked = MARKDOWN_LINK.replace_all(raw, "$1");
    unlinked.split_whitespace().collect::<Vec<_>>().join(" ")
}
