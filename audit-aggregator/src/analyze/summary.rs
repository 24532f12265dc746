//! Presentation helpers over a recommendation list: ordering, counts for
//! badges, filter predicates, and a row view for recommendation tables.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use table_view::{AggregationFn, CellValue, ColumnDef, TableRow};

use super::Recommendation;
use crate::report::Priority;

/// Priority, then worst score (null last), then largest saving, then id.
pub fn compare_recommendations(a: &Recommendation, b: &Recommendation) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| match (a.worst_score, b.worst_score) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| {
            let sa = a.largest_saving().unwrap_or(0.0);
            let sb = b.largest_saving().unwrap_or(0.0);
            sb.total_cmp(&sa)
        })
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_recommendations(recs: &mut [Recommendation]) {
    recs.sort_by(compare_recommendations);
}

/// Counts for summary badges and the option lists for filter controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSummary {
    pub total: usize,
    pub by_priority: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    /// Distinct categories, sorted.
    pub categories: Vec<String>,
    /// Distinct priorities, most urgent first.
    pub priorities: Vec<Priority>,
}

pub fn summarize(recs: &[Recommendation]) -> RecommendationSummary {
    let mut out = RecommendationSummary {
        total: recs.len(),
        ..RecommendationSummary::default()
    };
    for r in recs {
        *out.by_priority
            .entry(r.priority.as_str().to_string())
            .or_default() += 1;
        if let Some(cat) = &r.category {
            *out.by_category.entry(cat.clone()).or_default() += 1;
        }
        if !out.priorities.contains(&r.priority) {
            out.priorities.push(r.priority);
        }
    }
    out.categories = out.by_category.keys().cloned().collect();
    out.priorities.sort();
    out
}

/// Selection made through filter controls; unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationFilter {
    pub category: Option<String>,
    pub priority: Option<Priority>,
    /// Keep recommendations with an entry from this report label.
    pub report: Option<String>,
}

impl RecommendationFilter {
    pub fn matches(&self, rec: &Recommendation) -> bool {
        self.category
            .as_ref()
            .is_none_or(|c| rec.category.as_ref() == Some(c))
            && self.priority.is_none_or(|p| rec.priority == p)
            && self
                .report
                .as_ref()
                .is_none_or(|l| rec.reports.iter().any(|r| &r.label == l))
    }

    pub fn apply<'r>(&self, recs: &'r [Recommendation]) -> Vec<&'r Recommendation> {
        recs.iter().filter(|r| self.matches(r)).collect()
    }
}

impl TableRow for Recommendation {
    fn cell(&self, column_id: &str) -> CellValue {
        match column_id {
            "id" => CellValue::from(self.id.as_str()),
            "title" => CellValue::from(self.title.as_str()),
            "category" => self.category.as_deref().map(CellValue::from).unwrap_or_default(),
            "priority" => CellValue::from(self.priority.as_str()),
            "worstScore" => CellValue::from(self.worst_score),
            "largestSaving" => CellValue::from(self.largest_saving()),
            "reportCount" => CellValue::from(self.report_count() as f64),
            "rowCount" => CellValue::from((self.rows.len() + self.opportunity_items.len()) as f64),
            _ => CellValue::Null,
        }
    }
}

/// Columns for a table whose rows are recommendations.
pub fn recommendation_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::text("id", "Audit"),
        ColumnDef::text("title", "Title").with_size(320, 120, 800),
        ColumnDef::text("category", "Category"),
        ColumnDef::text("priority", "Priority"),
        ColumnDef::number("worstScore", "Worst Score").with_aggregation(AggregationFn::Min),
        ColumnDef::number("largestSaving", "Largest Saving"),
        ColumnDef::number("reportCount", "Reports").without_filter(),
        ColumnDef::number("rowCount", "Items").with_aggregation(AggregationFn::Sum),
    ]
}
