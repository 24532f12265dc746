//! Owned view state. One value per table instance; never shared.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortingEntry {
    pub id: String,
    pub direction: SortDirection,
}

impl SortingEntry {
    pub fn asc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Filter value for one column; must match the column's [`crate::FilterKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterValue {
    Text { needle: String },
    Range { min: Option<f64>, max: Option<f64> },
}

impl FilterValue {
    pub fn text(needle: impl Into<String>) -> Self {
        FilterValue::Text {
            needle: needle.into(),
        }
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        FilterValue::Range { min, max }
    }

    /// An empty filter is removed instead of stored.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text { needle } => needle.trim().is_empty(),
            FilterValue::Range { min, max } => min.is_none() && max.is_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilter {
    pub id: String,
    pub value: FilterValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableViewState {
    pub sorting: Vec<SortingEntry>,
    pub column_filters: Vec<ColumnFilter>,
    /// Grouping column ids, outermost first.
    pub grouping: Vec<String>,
    /// Ids of expanded group rows.
    pub expanded: BTreeSet<String>,
    pub pagination: Option<PaginationState>,
    pub column_sizes: BTreeMap<String, u16>,
    pub column_visibility: BTreeMap<String, bool>,
    /// Page size to restore on "show less".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_page_size: Option<usize>,
}

impl TableViewState {
    pub fn sort_direction(&self, column_id: &str) -> Option<SortDirection> {
        self.sorting
            .iter()
            .find(|s| s.id == column_id)
            .map(|s| s.direction)
    }

    pub fn filter_value(&self, column_id: &str) -> Option<&FilterValue> {
        self.column_filters
            .iter()
            .find(|f| f.id == column_id)
            .map(|f| &f.value)
    }
}
