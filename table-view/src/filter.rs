use crate::cell::CellValue;
use crate::row::TableRow;
use crate::state::{ColumnFilter, FilterValue};

/// Lower bound used when a range filter leaves `min` unset.
pub const RANGE_DEFAULT_MIN: f64 = 0.0;

pub fn matches(value: &CellValue, filter: &FilterValue) -> bool {
    match filter {
        FilterValue::Text { needle } => {
            let needle = needle.trim().to_lowercase();
            needle.is_empty() || value.display_text().to_lowercase().contains(&needle)
        }
        FilterValue::Range { min, max } => match value.as_f64() {
            Some(n) => n >= min.unwrap_or(RANGE_DEFAULT_MIN) && n <= max.unwrap_or(f64::INFINITY),
            None => false,
        },
    }
}

/// Indices of rows passing every filter (logical AND), in input order.
pub(crate) fn filter_rows<R: TableRow>(rows: &[R], filters: &[ColumnFilter]) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            filters
                .iter()
                .all(|f| matches(&row.cell(&f.id), &f.value))
        })
        .map(|(i, _)| i)
        .collect()
}
