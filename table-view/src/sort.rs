use std::cmp::Ordering;

use crate::cell::CellValue;
use crate::group::RowNode;
use crate::row::TableRow;
use crate::state::{SortDirection, SortingEntry};

/// Sorts every level of the tree in place. Stable: equal keys keep their
/// relative order. Nulls sort last in both directions.
pub(crate) fn sort_nodes<R: TableRow>(nodes: &mut Vec<RowNode>, rows: &[R], sorting: &[SortingEntry]) {
    if sorting.is_empty() {
        return;
    }

    let mut keyed: Vec<(Vec<CellValue>, RowNode)> = nodes
        .drain(..)
        .map(|n| {
            let keys = sorting.iter().map(|s| sort_value(&n, rows, &s.id)).collect();
            (keys, n)
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, sorting));
    nodes.extend(keyed.into_iter().map(|(_, n)| n));

    for n in nodes.iter_mut() {
        if let RowNode::Group(g) = n {
            sort_nodes(&mut g.children, rows, sorting);
        }
    }
}

fn sort_value<R: TableRow>(node: &RowNode, rows: &[R], column_id: &str) -> CellValue {
    match node {
        RowNode::Leaf(i) => rows[*i].cell(column_id),
        RowNode::Group(g) if g.column_id == column_id => g.value.clone(),
        RowNode::Group(g) => g
            .aggregates
            .get(column_id)
            .map(|a| a.sort_value())
            .unwrap_or_default(),
    }
}

fn compare_keys(a: &[CellValue], b: &[CellValue], sorting: &[SortingEntry]) -> Ordering {
    for ((va, vb), entry) in a.iter().zip(b).zip(sorting) {
        let ord = match (va.is_null(), vb.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let o = va.compare(vb);
                match entry.direction {
                    SortDirection::Asc => o,
                    SortDirection::Desc => o.reverse(),
                }
            }
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
