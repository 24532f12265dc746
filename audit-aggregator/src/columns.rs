//! Column descriptors for a recommendation's detail tables.

use table_view::{ColumnDef, Table};

use crate::analyze::Recommendation;
use crate::config::AggregatorConfig;
use crate::family::AuditFamily;
use crate::report::ColumnHeading;
use crate::row::{AuditRow, ITEM_LABEL_FIELD, REPORT_LABEL_FIELD};

/// The "Report" column that tells rows of different reports apart.
pub fn report_column() -> ColumnDef {
    ColumnDef::text(REPORT_LABEL_FIELD, "Report").with_size(120, 60, 320)
}

/// Columns for `rec.rows`: report column when several reports
/// contributed, then the retained headings or the family preset.
pub fn columns_for(rec: &Recommendation) -> Vec<ColumnDef> {
    let body = rec
        .table_headings
        .as_deref()
        .and_then(heading_columns)
        .unwrap_or_else(|| rec.family.preset_columns());
    with_report_column(rec, body)
}

/// Columns for `rec.opportunity_items`, from the items' own family.
pub fn opportunity_columns_for(rec: &Recommendation) -> Vec<ColumnDef> {
    let body = AuditFamily::of_rows(&rec.opportunity_items).preset_columns();
    with_report_column(rec, body)
}

/// Table over `rec.rows` with the configured page size.
pub fn detail_table<'r>(rec: &'r Recommendation, cfg: &AggregatorConfig) -> Table<'r, AuditRow> {
    Table::with_options(&rec.rows, columns_for(rec), cfg.table_options())
}

/// Table over `rec.opportunity_items` with the configured page size.
pub fn opportunity_table<'r>(
    rec: &'r Recommendation,
    cfg: &AggregatorConfig,
) -> Table<'r, AuditRow> {
    Table::with_options(
        &rec.opportunity_items,
        opportunity_columns_for(rec),
        cfg.table_options(),
    )
}

fn with_report_column(rec: &Recommendation, body: Vec<ColumnDef>) -> Vec<ColumnDef> {
    if body.is_empty() {
        return body;
    }
    let mut cols = Vec::with_capacity(body.len() + 1);
    if rec.report_count() > 1 {
        cols.push(report_column());
    }
    cols.extend(body);
    cols
}

/// `None` when no heading names a field.
fn heading_columns(headings: &[ColumnHeading]) -> Option<Vec<ColumnDef>> {
    let mut cols: Vec<ColumnDef> = Vec::new();
    for h in headings {
        let Some(key) = h.key.as_deref().filter(|k| !k.is_empty()) else {
            continue;
        };
        // tagged rows keep their own `label` under another name
        let id = if key == REPORT_LABEL_FIELD {
            ITEM_LABEL_FIELD
        } else {
            key
        };
        if cols.iter().any(|c| c.id == id) {
            continue;
        }
        let header = h.label.clone().filter(|l| !l.is_empty()).unwrap_or_else(|| key.to_string());
        cols.push(if h.is_numeric() {
            ColumnDef::number(id, header)
        } else {
            ColumnDef::text(id, header)
        });
    }
    (!cols.is_empty()).then_some(cols)
}
