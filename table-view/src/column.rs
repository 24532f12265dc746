//! Column descriptors: which field a column reads, how it filters, how it
//! rolls up inside grouped rows, and its size bounds.

use serde::{Deserialize, Serialize};

use crate::cell::{AggregatedCell, CellValue};

pub const DEFAULT_COLUMN_SIZE: u16 = 150;
pub const DEFAULT_MIN_COLUMN_SIZE: u16 = 20;
pub const DEFAULT_MAX_COLUMN_SIZE: u16 = u16::MAX;

/// How a column's filter value is matched against cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    /// Case-insensitive substring match on the cell text.
    IncludesString,
    /// Inclusive numeric range; unset bounds default to `[0, +inf)`.
    InNumberRange,
}

/// Rollup applied to a column's leaf values inside a grouped row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregationFn {
    /// The shared value when every leaf agrees, otherwise a mixed marker.
    UniqueOrMixed,
    Max,
    Min,
    Sum,
    Mean,
    /// Number of leaves in the group.
    Count,
}

impl AggregationFn {
    pub fn aggregate<I>(self, values: I) -> AggregatedCell
    where
        I: IntoIterator<Item = CellValue>,
    {
        match self {
            AggregationFn::Count => {
                AggregatedCell::value(CellValue::Number(values.into_iter().count() as f64))
            }
            AggregationFn::UniqueOrMixed => unique_or_mixed(values),
            AggregationFn::Max => numeric(values, |acc, n| acc.max(n)),
            AggregationFn::Min => numeric(values, |acc, n| acc.min(n)),
            AggregationFn::Sum => numeric(values, |acc, n| acc + n),
            AggregationFn::Mean => {
                let nums: Vec<f64> = values.into_iter().filter_map(|v| v.as_f64()).collect();
                if nums.is_empty() {
                    AggregatedCell::Empty
                } else {
                    AggregatedCell::value(nums.iter().sum::<f64>() / nums.len() as f64)
                }
            }
        }
    }
}

fn unique_or_mixed<I>(values: I) -> AggregatedCell
where
    I: IntoIterator<Item = CellValue>,
{
    let mut distinct: Vec<CellValue> = Vec::new();
    for v in values.into_iter().filter(|v| !v.is_null()) {
        if !distinct.contains(&v) {
            distinct.push(v);
        }
    }
    match distinct.len() {
        0 => AggregatedCell::Empty,
        1 => AggregatedCell::Value {
            value: distinct.remove(0),
        },
        n => AggregatedCell::Mixed { distinct: n },
    }
}

fn numeric<I, F>(values: I, fold: F) -> AggregatedCell
where
    I: IntoIterator<Item = CellValue>,
    F: Fn(f64, f64) -> f64,
{
    values
        .into_iter()
        .filter_map(|v| v.as_f64())
        .reduce(fold)
        .map(AggregatedCell::value)
        .unwrap_or(AggregatedCell::Empty)
}

/// Column descriptor consumed by [`crate::Table`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Field name the column reads through [`crate::TableRow::cell`].
    pub id: String,
    pub header: String,
    pub filter: Option<FilterKind>,
    pub aggregation: Option<AggregationFn>,
    pub enable_sorting: bool,
    pub enable_grouping: bool,
    pub size: u16,
    pub min_size: u16,
    pub max_size: u16,
}

impl ColumnDef {
    /// Bare column: sortable and groupable, no filter, no rollup.
    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            filter: None,
            aggregation: None,
            enable_sorting: true,
            enable_grouping: true,
            size: DEFAULT_COLUMN_SIZE,
            min_size: DEFAULT_MIN_COLUMN_SIZE,
            max_size: DEFAULT_MAX_COLUMN_SIZE,
        }
    }

    /// Text column: substring filter, unique-or-mixed rollup.
    pub fn text(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self::new(id, header)
            .with_filter(FilterKind::IncludesString)
            .with_aggregation(AggregationFn::UniqueOrMixed)
    }

    /// Numeric column: range filter, max rollup.
    pub fn number(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self::new(id, header)
            .with_filter(FilterKind::InNumberRange)
            .with_aggregation(AggregationFn::Max)
    }

    pub fn with_filter(mut self, kind: FilterKind) -> Self {
        self.filter = Some(kind);
        self
    }

    pub fn without_filter(mut self) -> Self {
        self.filter = None;
        self
    }

    pub fn with_aggregation(mut self, agg: AggregationFn) -> Self {
        self.aggregation = Some(agg);
        self
    }

    pub fn sortable(mut self, enabled: bool) -> Self {
        self.enable_sorting = enabled;
        self
    }

    pub fn groupable(mut self, enabled: bool) -> Self {
        self.enable_grouping = enabled;
        self
    }

    /// Sets the default width and bounds; the default is clamped into the bounds.
    pub fn with_size(mut self, size: u16, min_size: u16, max_size: u16) -> Self {
        let (lo, hi) = if min_size <= max_size {
            (min_size, max_size)
        } else {
            (max_size, min_size)
        };
        self.min_size = lo;
        self.max_size = hi;
        self.size = size.clamp(lo, hi);
        self
    }

    pub(crate) fn clamp_size(&self, size: u16) -> u16 {
        size.clamp(self.min_size, self.max_size)
    }
}
