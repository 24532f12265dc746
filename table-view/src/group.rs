//! Grouping: bucket filtered rows by one or more column values and compute
//! rollup cells per group.

use std::collections::{BTreeMap, HashMap};

use crate::cell::{AggregatedCell, CellValue};
use crate::column::ColumnDef;
use crate::row::TableRow;

/// Node of the derived row tree: a leaf index into the canonical rows, or a
/// synthetic group row.
#[derive(Debug, Clone)]
pub(crate) enum RowNode {
    Leaf(usize),
    Group(GroupNode),
}

#[derive(Debug, Clone)]
pub(crate) struct GroupNode {
    /// `col:` plus the type-tagged bucket key, nested groups joined with `>`.
    pub id: String,
    pub column_id: String,
    pub value: CellValue,
    pub depth: usize,
    /// Canonical indices of every leaf under this group.
    pub leaves: Vec<usize>,
    pub children: Vec<RowNode>,
    pub aggregates: BTreeMap<String, AggregatedCell>,
}

/// Builds the row tree for `grouping` over the filtered `indices`.
///
/// Groups keep first-appearance order; leaves keep input order.
pub(crate) fn group_rows<R: TableRow>(
    rows: &[R],
    indices: &[usize],
    columns: &[ColumnDef],
    grouping: &[String],
) -> Vec<RowNode> {
    build_level(rows, indices, columns, grouping, 0, None)
}

fn build_level<R: TableRow>(
    rows: &[R],
    indices: &[usize],
    columns: &[ColumnDef],
    grouping: &[String],
    depth: usize,
    parent_id: Option<&str>,
) -> Vec<RowNode> {
    let Some(column_id) = grouping.get(depth) else {
        return indices.iter().map(|&i| RowNode::Leaf(i)).collect();
    };

    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, (CellValue, Vec<usize>)> = HashMap::new();
    for &i in indices {
        let value = rows[i].cell(column_id);
        let key = value.group_key();
        buckets
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                (value, Vec::new())
            })
            .1
            .push(i);
    }

    let mut out = Vec::with_capacity(order.len());
    for key in order {
        let Some((value, leaves)) = buckets.remove(&key) else {
            continue;
        };
        let own = format!("{column_id}:{key}");
        let id = match parent_id {
            Some(p) => format!("{p}>{own}"),
            None => own,
        };

        let aggregates = columns
            .iter()
            .filter(|c| &c.id != column_id)
            .filter_map(|c| {
                let agg = c.aggregation?;
                let cell = agg.aggregate(leaves.iter().map(|&i| rows[i].cell(&c.id)));
                Some((c.id.clone(), cell))
            })
            .collect();

        let children = build_level(rows, &leaves, columns, grouping, depth + 1, Some(&id));

        out.push(RowNode::Group(GroupNode {
            id,
            column_id: column_id.clone(),
            value,
            depth,
            leaves,
            children,
            aggregates,
        }));
    }
    out
}

/// Ids of every group row in the tree, depth-first.
pub(crate) fn group_ids(nodes: &[RowNode]) -> Vec<String> {
    let mut out = Vec::new();
    for n in nodes {
        if let RowNode::Group(g) = n {
            out.push(g.id.clone());
            out.extend(group_ids(&g.children));
        }
    }
    out
}
