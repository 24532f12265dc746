//! Generic tabular view engine.
//!
//! A [`Table`] borrows a read-only row slice, owns its column descriptors and
//! one [`TableViewState`], and re-derives its visible rows on every read:
//! filter → group (with rollup cells) → sort → expand → paginate.
//!
//! There is no shared registry: each presentation surface creates its own
//! `Table` over the same rows, and state never leaks between instances.
//! All transitions are synchronous and allocation-only (no I/O).
//!
//! ```
//! use serde_json::json;
//! use table_view::{ColumnDef, FilterValue, Table};
//!
//! let rows: Vec<_> = [json!({"url": "a.js", "wastedBytes": 120}), json!({"url": "b.css", "wastedBytes": 40})]
//!     .into_iter()
//!     .filter_map(|v| v.as_object().cloned())
//!     .collect();
//! let mut table = Table::new(&rows, vec![
//!     ColumnDef::text("url", "URL"),
//!     ColumnDef::number("wastedBytes", "Potential savings"),
//! ]);
//! table.set_column_filter("url", FilterValue::text(".JS")).unwrap();
//! assert_eq!(table.page_rows().len(), 1);
//! ```

pub mod cell;
pub mod column;
pub mod error;
pub mod filter;
mod group;
pub mod row;
mod sort;
pub mod state;
pub mod table;

pub use cell::{AggregatedCell, CellValue};
pub use column::{AggregationFn, ColumnDef, FilterKind};
pub use error::{TableError, TableResult};
pub use row::TableRow;
pub use state::{
    ColumnFilter, FilterValue, PaginationState, SortDirection, SortingEntry, TableViewState,
};
pub use table::{DEFAULT_PAGE_SIZE, RowView, RowViewKind, Table, TableOptions};
