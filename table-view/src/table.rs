//! The table handle: canonical rows + column defs + owned view state.
//!
//! Every read (`page_rows`, `page_count`, ...) re-derives its output from the
//! canonical rows in a fixed order:
//!
//! 1) column filters (AND across columns);
//! 2) grouping with rollup cells;
//! 3) sorting at every tree level (stable);
//! 4) expansion of group rows into a flat list;
//! 5) pagination.
//!
//! Setters only touch [`TableViewState`]; rows are borrowed and never mutated.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::cell::{AggregatedCell, CellValue};
use crate::column::{ColumnDef, FilterKind};
use crate::error::{TableError, TableResult};
use crate::filter::filter_rows;
use crate::group::{RowNode, group_ids, group_rows};
use crate::row::TableRow;
use crate::sort::sort_nodes;
use crate::state::{
    ColumnFilter, FilterValue, PaginationState, SortDirection, SortingEntry, TableViewState,
};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Construction-time switches for one table instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    pub enable_pagination: bool,
    /// Initial page size, also restored by "show less" when no prior size is known.
    pub page_size: usize,
    /// Group rows may expand to reveal their children. Leaf rows never expand.
    pub enable_group_expansion: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            enable_pagination: true,
            page_size: DEFAULT_PAGE_SIZE,
            enable_group_expansion: true,
        }
    }
}

/// One row of derived output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    /// Leaf rows use their canonical index; group rows use `col:value` paths.
    pub id: String,
    pub depth: usize,
    pub kind: RowViewKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RowViewKind {
    Leaf {
        index: usize,
    },
    #[serde(rename_all = "camelCase")]
    Group {
        column_id: String,
        value: CellValue,
        leaf_count: usize,
        leaves: Vec<usize>,
        aggregates: BTreeMap<String, AggregatedCell>,
        expanded: bool,
        can_expand: bool,
    },
}

impl RowView {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, RowViewKind::Group { .. })
    }

    pub fn leaf_index(&self) -> Option<usize> {
        match self.kind {
            RowViewKind::Leaf { index } => Some(index),
            RowViewKind::Group { .. } => None,
        }
    }

    pub fn can_expand(&self) -> bool {
        matches!(self.kind, RowViewKind::Group { can_expand: true, .. })
    }
}

pub struct Table<'a, R> {
    rows: &'a [R],
    columns: Vec<ColumnDef>,
    options: TableOptions,
    state: TableViewState,
}

impl<'a, R: TableRow> Table<'a, R> {
    pub fn new(rows: &'a [R], columns: Vec<ColumnDef>) -> Self {
        Self::with_options(rows, columns, TableOptions::default())
    }

    pub fn with_options(rows: &'a [R], columns: Vec<ColumnDef>, options: TableOptions) -> Self {
        let pagination = options.enable_pagination.then(|| PaginationState {
            page_index: 0,
            page_size: options.page_size.max(1),
        });
        Self {
            rows,
            columns,
            options,
            state: TableViewState {
                pagination,
                ..TableViewState::default()
            },
        }
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn rows(&self) -> &'a [R] {
        self.rows
    }

    pub fn row(&self, index: usize) -> Option<&'a R> {
        self.rows.get(index)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn state(&self) -> &TableViewState {
        &self.state
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    fn require_column(&self, id: &str) -> TableResult<&ColumnDef> {
        self.column(id)
            .ok_or_else(|| TableError::UnknownColumn(id.to_string()))
    }

    // ---------------------------------------------------------------------
    // Derivation
    // ---------------------------------------------------------------------

    fn derive_tree(&self) -> Vec<RowNode> {
        let filtered = filter_rows(self.rows, &self.state.column_filters);
        let mut tree = group_rows(self.rows, &filtered, &self.columns, &self.state.grouping);
        sort_nodes(&mut tree, self.rows, &self.state.sorting);
        tree
    }

    pub fn filtered_row_count(&self) -> usize {
        filter_rows(self.rows, &self.state.column_filters).len()
    }

    /// Filtered, grouped, sorted and expanded rows, before pagination.
    pub fn rows_before_pagination(&self) -> Vec<RowView> {
        let tree = self.derive_tree();
        let mut out = Vec::new();
        self.flatten(&tree, 0, &mut out);
        out
    }

    fn flatten(&self, nodes: &[RowNode], depth: usize, out: &mut Vec<RowView>) {
        for node in nodes {
            match node {
                RowNode::Leaf(index) => out.push(RowView {
                    id: index.to_string(),
                    depth,
                    kind: RowViewKind::Leaf { index: *index },
                }),
                RowNode::Group(g) => {
                    let can_expand = self.options.enable_group_expansion;
                    let expanded = can_expand && self.state.expanded.contains(&g.id);
                    out.push(RowView {
                        id: g.id.clone(),
                        depth: g.depth,
                        kind: RowViewKind::Group {
                            column_id: g.column_id.clone(),
                            value: g.value.clone(),
                            leaf_count: g.leaves.len(),
                            leaves: g.leaves.clone(),
                            aggregates: g.aggregates.clone(),
                            expanded,
                            can_expand,
                        },
                    });
                    if expanded {
                        self.flatten(&g.children, depth + 1, out);
                    }
                }
            }
        }
    }

    /// Rows of the current page (all rows when pagination is disabled).
    pub fn page_rows(&self) -> Vec<RowView> {
        let all = self.rows_before_pagination();
        let Some(p) = self.state.pagination else {
            return all;
        };
        let index = p.page_index.min(page_count_for(all.len(), p.page_size).saturating_sub(1));
        all.into_iter()
            .skip(index * p.page_size)
            .take(p.page_size)
            .collect()
    }

    /// What a cell shows: the leaf value, the group's own value for its
    /// grouping column, or the column rollup for other columns of a group.
    pub fn display_cell(&self, row: &RowView, column_id: &str) -> AggregatedCell {
        match &row.kind {
            RowViewKind::Leaf { index } => self
                .rows
                .get(*index)
                .map(|r| AggregatedCell::value(r.cell(column_id)))
                .unwrap_or(AggregatedCell::Empty),
            RowViewKind::Group {
                column_id: group_col,
                value,
                ..
            } if group_col == column_id => AggregatedCell::value(value.clone()),
            RowViewKind::Group { aggregates, .. } => aggregates
                .get(column_id)
                .cloned()
                .unwrap_or(AggregatedCell::Empty),
        }
    }

    // ---------------------------------------------------------------------
    // Sorting
    // ---------------------------------------------------------------------

    pub fn sorting(&self) -> &[SortingEntry] {
        &self.state.sorting
    }

    pub fn sort_direction(&self, column_id: &str) -> Option<SortDirection> {
        self.state.sort_direction(column_id)
    }

    pub fn set_sorting(&mut self, sorting: Vec<SortingEntry>) -> TableResult<()> {
        for entry in &sorting {
            if !self.require_column(&entry.id)?.enable_sorting {
                return Err(TableError::NotSortable(entry.id.clone()));
            }
        }
        self.state.sorting = sorting;
        Ok(())
    }

    pub fn clear_sorting(&mut self) {
        self.state.sorting.clear();
    }

    /// Cycles a column unsorted → ascending → descending → unsorted.
    ///
    /// Without `multi` the column becomes the only sort key.
    pub fn toggle_sorting(&mut self, column_id: &str, multi: bool) -> TableResult<Option<SortDirection>> {
        if !self.require_column(column_id)?.enable_sorting {
            return Err(TableError::NotSortable(column_id.to_string()));
        }
        let next = match self.state.sort_direction(column_id) {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        };

        if multi {
            match next {
                Some(direction) => {
                    match self.state.sorting.iter_mut().find(|s| s.id == column_id) {
                        Some(entry) => entry.direction = direction,
                        None => self.state.sorting.push(SortingEntry {
                            id: column_id.to_string(),
                            direction,
                        }),
                    }
                }
                None => self.state.sorting.retain(|s| s.id != column_id),
            }
        } else {
            self.state.sorting = next
                .map(|direction| {
                    vec![SortingEntry {
                        id: column_id.to_string(),
                        direction,
                    }]
                })
                .unwrap_or_default();
        }

        debug!(column = column_id, ?next, multi, "sorting toggled");
        Ok(next)
    }

    // ---------------------------------------------------------------------
    // Filtering
    // ---------------------------------------------------------------------

    /// Sets (or, for an empty value, removes) a column filter. The value must
    /// match the column's declared filter kind.
    pub fn set_column_filter(&mut self, column_id: &str, value: FilterValue) -> TableResult<()> {
        let kind = self
            .require_column(column_id)?
            .filter
            .ok_or_else(|| TableError::NotFilterable(column_id.to_string()))?;
        let fits = matches!(
            (kind, &value),
            (FilterKind::IncludesString, FilterValue::Text { .. })
                | (FilterKind::InNumberRange, FilterValue::Range { .. })
        );
        if !fits {
            return Err(TableError::FilterKindMismatch {
                column: column_id.to_string(),
                expected: kind,
            });
        }

        self.state.column_filters.retain(|f| f.id != column_id);
        if !value.is_empty() {
            self.state.column_filters.push(ColumnFilter {
                id: column_id.to_string(),
                value,
            });
        }
        self.after_row_set_change();
        Ok(())
    }

    pub fn clear_column_filter(&mut self, column_id: &str) {
        self.state.column_filters.retain(|f| f.id != column_id);
        self.after_row_set_change();
    }

    pub fn clear_filters(&mut self) {
        self.state.column_filters.clear();
        self.after_row_set_change();
    }

    // ---------------------------------------------------------------------
    // Grouping & expansion
    // ---------------------------------------------------------------------

    pub fn grouping(&self) -> &[String] {
        &self.state.grouping
    }

    /// Replaces the grouping keys (outermost first). Duplicates are dropped.
    pub fn set_grouping(&mut self, grouping: Vec<String>) -> TableResult<()> {
        let mut next: Vec<String> = Vec::with_capacity(grouping.len());
        for id in grouping {
            if !self.require_column(&id)?.enable_grouping {
                return Err(TableError::NotGroupable(id));
            }
            if !next.contains(&id) {
                next.push(id);
            }
        }
        debug!(grouping = ?next, "grouping set");
        self.state.grouping = next;
        self.after_row_set_change();
        Ok(())
    }

    /// Adds the column as the innermost grouping key, or removes it.
    pub fn toggle_grouping(&mut self, column_id: &str) -> TableResult<bool> {
        let mut next = self.state.grouping.clone();
        let grouped = if let Some(pos) = next.iter().position(|g| g == column_id) {
            next.remove(pos);
            false
        } else {
            next.push(column_id.to_string());
            true
        };
        self.set_grouping(next)?;
        Ok(grouped)
    }

    pub fn is_expanded(&self, row_id: &str) -> bool {
        self.state.expanded.contains(row_id)
    }

    /// Expands or collapses a group row. Returns whether the row is now
    /// expanded; leaf rows and unknown ids stay collapsed.
    pub fn set_expanded(&mut self, row_id: &str, expanded: bool) -> bool {
        if !expanded {
            self.state.expanded.remove(row_id);
            return false;
        }
        if !self.options.enable_group_expansion {
            return false;
        }
        if !group_ids(&self.derive_tree()).iter().any(|id| id == row_id) {
            return false;
        }
        self.state.expanded.insert(row_id.to_string());
        true
    }

    pub fn toggle_expanded(&mut self, row_id: &str) -> bool {
        let next = !self.is_expanded(row_id);
        self.set_expanded(row_id, next)
    }

    pub fn expand_all(&mut self) {
        if self.options.enable_group_expansion {
            self.state.expanded = group_ids(&self.derive_tree()).into_iter().collect();
        }
    }

    pub fn collapse_all(&mut self) {
        self.state.expanded.clear();
    }

    /// Filters and grouping change the row set: go back to the first page and
    /// forget expansion of groups that no longer exist.
    fn after_row_set_change(&mut self) {
        if let Some(p) = self.state.pagination.as_mut() {
            p.page_index = 0;
        }
        if !self.state.expanded.is_empty() {
            let live: BTreeSet<String> = group_ids(&self.derive_tree()).into_iter().collect();
            self.state.expanded.retain(|id| live.contains(id));
        }
    }

    // ---------------------------------------------------------------------
    // Pagination
    // ---------------------------------------------------------------------

    pub fn pagination(&self) -> Option<PaginationState> {
        self.state.pagination
    }

    pub fn page_count(&self) -> usize {
        match self.state.pagination {
            Some(p) => page_count_for(self.rows_before_pagination().len(), p.page_size),
            None => 1,
        }
    }

    pub fn can_previous_page(&self) -> bool {
        self.state.pagination.is_some_and(|p| p.page_index > 0)
    }

    pub fn can_next_page(&self) -> bool {
        self.state
            .pagination
            .is_some_and(|p| p.page_index + 1 < self.page_count())
    }

    /// Changes the page size, keeping the first row of the current page visible.
    pub fn set_page_size(&mut self, page_size: usize) -> TableResult<()> {
        if page_size == 0 {
            return Err(TableError::InvalidPageSize(page_size));
        }
        let p = self
            .state
            .pagination
            .as_mut()
            .ok_or(TableError::PaginationDisabled)?;
        let top_row = p.page_index * p.page_size;
        p.page_size = page_size;
        p.page_index = top_row / page_size;
        self.state.previous_page_size = None;
        Ok(())
    }

    /// Moves to `page_index`, clamped to the last page.
    pub fn set_page_index(&mut self, page_index: usize) -> TableResult<usize> {
        let last = self.page_count().saturating_sub(1);
        let p = self
            .state
            .pagination
            .as_mut()
            .ok_or(TableError::PaginationDisabled)?;
        p.page_index = page_index.min(last);
        Ok(p.page_index)
    }

    pub fn next_page(&mut self) -> bool {
        if !self.can_next_page() {
            return false;
        }
        if let Some(p) = self.state.pagination.as_mut() {
            p.page_index += 1;
        }
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if !self.can_previous_page() {
            return false;
        }
        if let Some(p) = self.state.pagination.as_mut() {
            p.page_index -= 1;
        }
        true
    }

    /// Puts every row on one page, remembering the current page size for
    /// [`Table::show_less`].
    pub fn show_all(&mut self) -> TableResult<()> {
        let full = self
            .rows
            .len()
            .max(self.rows_before_pagination().len())
            .max(1);
        let p = self
            .state
            .pagination
            .as_mut()
            .ok_or(TableError::PaginationDisabled)?;
        if self.state.previous_page_size.is_none() {
            self.state.previous_page_size = Some(p.page_size);
        }
        p.page_size = full;
        p.page_index = 0;
        debug!(page_size = full, "show all");
        Ok(())
    }

    /// Restores the page size active before [`Table::show_all`] and returns
    /// to the first page.
    pub fn show_less(&mut self) -> TableResult<()> {
        let fallback = self.options.page_size.max(1);
        let p = self
            .state
            .pagination
            .as_mut()
            .ok_or(TableError::PaginationDisabled)?;
        p.page_size = self.state.previous_page_size.take().unwrap_or(fallback);
        p.page_index = 0;
        debug!(page_size = p.page_size, "show less");
        Ok(())
    }

    pub fn is_showing_all(&self) -> bool {
        self.state.previous_page_size.is_some()
    }

    // ---------------------------------------------------------------------
    // Column sizing & visibility
    // ---------------------------------------------------------------------

    pub fn column_size(&self, column_id: &str) -> Option<u16> {
        let col = self.column(column_id)?;
        Some(self.state.column_sizes.get(column_id).copied().unwrap_or(col.size))
    }

    /// Resizes a column within its bounds; returns the applied width.
    pub fn set_column_size(&mut self, column_id: &str, size: u16) -> TableResult<u16> {
        let applied = self.require_column(column_id)?.clamp_size(size);
        self.state.column_sizes.insert(column_id.to_string(), applied);
        Ok(applied)
    }

    pub fn reset_column_size(&mut self, column_id: &str) {
        self.state.column_sizes.remove(column_id);
    }

    pub fn reset_column_sizes(&mut self) {
        self.state.column_sizes.clear();
    }

    pub fn is_column_visible(&self, column_id: &str) -> bool {
        self.state
            .column_visibility
            .get(column_id)
            .copied()
            .unwrap_or(true)
    }

    pub fn set_column_visibility(&mut self, column_id: &str, visible: bool) -> TableResult<()> {
        self.require_column(column_id)?;
        self.state
            .column_visibility
            .insert(column_id.to_string(), visible);
        Ok(())
    }

    pub fn toggle_column_visibility(&mut self, column_id: &str) -> TableResult<bool> {
        let next = !self.is_column_visible(column_id);
        self.set_column_visibility(column_id, next)?;
        Ok(next)
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDef> {
        self.columns
            .iter()
            .filter(|c| self.is_column_visible(&c.id))
            .collect()
    }

    /// Sum of the widths of visible columns.
    pub fn total_size(&self) -> u32 {
        self.visible_columns()
            .iter()
            .filter_map(|c| self.column_size(&c.id))
            .map(u32::from)
            .sum()
    }

    // ---------------------------------------------------------------------
    // Faceting (filter controls)
    // ---------------------------------------------------------------------

    /// Distinct non-null values of a column over the canonical rows, with
    /// occurrence counts, in first-appearance order.
    pub fn unique_values(&self, column_id: &str) -> TableResult<Vec<(CellValue, usize)>> {
        self.require_column(column_id)?;
        let mut out: Vec<(CellValue, usize)> = Vec::new();
        for row in self.rows {
            let v = row.cell(column_id);
            if v.is_null() {
                continue;
            }
            match out.iter_mut().find(|(seen, _)| *seen == v) {
                Some((_, count)) => *count += 1,
                None => out.push((v, 1)),
            }
        }
        Ok(out)
    }

    /// Smallest and largest numeric value of a column, if any.
    pub fn min_max_values(&self, column_id: &str) -> TableResult<Option<(f64, f64)>> {
        self.require_column(column_id)?;
        Ok(self
            .rows
            .iter()
            .filter_map(|r| r.cell(column_id).as_f64())
            .fold(None, |acc, n| match acc {
                None => Some((n, n)),
                Some((lo, hi)) => Some((lo.min(n), hi.max(n))),
            }))
    }
}

fn page_count_for(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}
