use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::cell::CellValue;

/// Anything a table can read cells from.
///
/// Columns name the fields they read; rows that do not carry a field return
/// [`CellValue::Null`] so unknown shapes degrade to empty cells.
pub trait TableRow {
    fn cell(&self, column_id: &str) -> CellValue;
}

impl TableRow for Map<String, Value> {
    fn cell(&self, column_id: &str) -> CellValue {
        self.get(column_id).map(CellValue::from).unwrap_or_default()
    }
}

impl TableRow for BTreeMap<String, CellValue> {
    fn cell(&self, column_id: &str) -> CellValue {
        self.get(column_id).cloned().unwrap_or_default()
    }
}

impl<T: TableRow + ?Sized> TableRow for &T {
    fn cell(&self, column_id: &str) -> CellValue {
        (**self).cell(column_id)
    }
}
