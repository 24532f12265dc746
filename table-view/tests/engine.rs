use proptest::prelude::*;
use proptest::test_runner::Config;
use serde_json::{Map, Value, json};
use table_view::{
    AggregatedCell, AggregationFn, CellValue, ColumnDef, FilterValue, RowViewKind, SortDirection,
    SortingEntry, Table, TableError, TableOptions,
};

fn obj(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap_or_default()
}

fn resource_rows() -> Vec<Map<String, Value>> {
    vec![
        obj(json!({"url": "https://a.test/app.js", "label": "Mobile", "wastedBytes": 100, "totalBytes": 400})),
        obj(json!({"url": "https://a.test/app.js", "label": "Desktop", "wastedBytes": 50, "totalBytes": 400})),
        obj(json!({"url": "https://a.test/vendor.js", "label": "Mobile", "wastedBytes": 300, "totalBytes": 900})),
        obj(json!({"url": "https://cdn.test/site.css", "label": "Desktop", "wastedBytes": 20})),
    ]
}

fn resource_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::text("label", "Report"),
        ColumnDef::text("url", "URL"),
        ColumnDef::number("totalBytes", "Transfer size"),
        ColumnDef::number("wastedBytes", "Potential savings"),
    ]
}

fn leaf_order(table: &Table<'_, Map<String, Value>>) -> Vec<usize> {
    table
        .page_rows()
        .iter()
        .filter_map(|r| r.leaf_index())
        .collect()
}

#[test]
fn sort_toggle_cycles_through_three_states() {
    let rows = resource_rows();
    let mut table = Table::new(&rows, resource_columns());

    assert_eq!(table.toggle_sorting("wastedBytes", false), Ok(Some(SortDirection::Asc)));
    assert_eq!(leaf_order(&table), vec![3, 1, 0, 2]);

    assert_eq!(table.toggle_sorting("wastedBytes", false), Ok(Some(SortDirection::Desc)));
    assert_eq!(leaf_order(&table), vec![2, 0, 1, 3]);

    assert_eq!(table.toggle_sorting("wastedBytes", false), Ok(None));
    assert!(table.sorting().is_empty());
    assert_eq!(leaf_order(&table), vec![0, 1, 2, 3]);
}

#[test]
fn multi_sort_keeps_previous_keys() {
    let rows = resource_rows();
    let mut table = Table::new(&rows, resource_columns());
    table.toggle_sorting("label", false).unwrap();
    table.toggle_sorting("wastedBytes", true).unwrap();
    table.toggle_sorting("wastedBytes", true).unwrap();

    assert_eq!(
        table.sorting(),
        &[SortingEntry::asc("label"), SortingEntry::desc("wastedBytes")]
    );
    assert_eq!(leaf_order(&table), vec![1, 3, 2, 0]);

    // A plain toggle on another column replaces every key.
    table.toggle_sorting("url", false).unwrap();
    assert_eq!(table.sorting(), &[SortingEntry::asc("url")]);
}

#[test]
fn filters_compose_with_and() {
    let rows = resource_rows();
    let mut table = Table::new(&rows, resource_columns());

    table.set_column_filter("url", FilterValue::text("A.TEST")).unwrap();
    assert_eq!(table.filtered_row_count(), 3);

    table
        .set_column_filter("wastedBytes", FilterValue::range(Some(60.0), None))
        .unwrap();
    assert_eq!(leaf_order(&table), vec![0, 2]);

    // Empty values remove the filter.
    table.set_column_filter("url", FilterValue::text("  ")).unwrap();
    assert_eq!(table.state().column_filters.len(), 1);

    table.clear_filters();
    assert_eq!(table.filtered_row_count(), 4);
}

#[test]
fn filter_kind_must_match_column() {
    let rows = resource_rows();
    let mut table = Table::new(&rows, resource_columns());
    let err = table
        .set_column_filter("url", FilterValue::range(Some(1.0), None))
        .unwrap_err();
    assert!(matches!(err, TableError::FilterKindMismatch { .. }));

    assert_eq!(
        table.set_column_filter("nope", FilterValue::text("x")),
        Err(TableError::UnknownColumn("nope".into()))
    );
}

#[test]
fn grouping_rolls_up_and_expands_one_level() {
    let rows = resource_rows();
    let mut table = Table::new(&rows, resource_columns());
    table.set_grouping(vec!["url".into()]).unwrap();

    let page = table.page_rows();
    assert_eq!(page.len(), 3);
    assert!(page.iter().all(|r| r.is_group() && r.can_expand()));

    let app = &page[0];
    assert_eq!(app.id, "url:s:https://a.test/app.js");
    assert_eq!(table.display_cell(app, "url"), AggregatedCell::value("https://a.test/app.js"));
    assert_eq!(table.display_cell(app, "wastedBytes"), AggregatedCell::value(100.0));
    assert_eq!(table.display_cell(app, "label"), AggregatedCell::Mixed { distinct: 2 });

    assert!(table.toggle_expanded(&app.id));
    let page = table.page_rows();
    assert_eq!(page.len(), 5);
    assert_eq!(page[1].leaf_index(), Some(0));
    assert_eq!(page[2].leaf_index(), Some(1));
    assert_eq!(page[1].depth, 1);

    // Leaf rows never expand.
    assert!(!table.set_expanded("0", true));
    assert!(!table.is_expanded("0"));
}

#[test]
fn grouped_rows_sort_by_rollup() {
    let rows = resource_rows();
    let mut table = Table::new(&rows, resource_columns());
    table.set_grouping(vec!["url".into()]).unwrap();
    table.set_sorting(vec![SortingEntry::desc("wastedBytes")]).unwrap();

    let values: Vec<CellValue> = table
        .page_rows()
        .iter()
        .filter_map(|r| match &r.kind {
            RowViewKind::Group { value, .. } => Some(value.clone()),
            RowViewKind::Leaf { .. } => None,
        })
        .collect();
    assert_eq!(
        values,
        vec![
            CellValue::from("https://a.test/vendor.js"),
            CellValue::from("https://a.test/app.js"),
            CellValue::from("https://cdn.test/site.css"),
        ]
    );
}

#[test]
fn multi_key_grouping_nests() {
    let rows = resource_rows();
    let mut table = Table::new(&rows, resource_columns());
    table
        .set_grouping(vec!["label".into(), "url".into(), "label".into()])
        .unwrap();
    assert_eq!(table.grouping(), &["label".to_string(), "url".to_string()]);

    table.expand_all();
    let page = table.page_rows();
    // 2 labels + 4 (label,url) groups, page size 10 holds them with leaves.
    assert_eq!(page.iter().filter(|r| r.is_group()).count(), 6);
    assert_eq!(page.iter().filter(|r| !r.is_group()).count(), 4);

    table.collapse_all();
    assert_eq!(table.page_rows().len(), 2);
}

#[test]
fn lookalike_group_values_expand_independently() {
    let rows = vec![
        obj(json!({"k": 1})),
        obj(json!({"k": "1"})),
        obj(json!({})),
        obj(json!({"k": ""})),
    ];
    let mut table = Table::new(&rows, vec![ColumnDef::text("k", "K")]);
    table.set_grouping(vec!["k".into()]).unwrap();

    let ids: Vec<String> = table.page_rows().iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids.len(), 4);
    let distinct: std::collections::BTreeSet<&String> = ids.iter().collect();
    assert_eq!(distinct.len(), 4);

    assert!(table.set_expanded(&ids[0], true));
    assert_eq!(table.page_rows().len(), 5);
    assert!(!table.is_expanded(&ids[1]));

    assert!(table.set_expanded(&ids[2], true));
    assert_eq!(table.page_rows().len(), 6);
    assert!(!table.is_expanded(&ids[3]));
}

#[test]
fn changing_filters_prunes_vanished_groups_and_resets_page() {
    let rows = resource_rows();
    let mut table = Table::with_options(
        &rows,
        resource_columns(),
        TableOptions {
            page_size: 1,
            ..TableOptions::default()
        },
    );
    table.set_grouping(vec!["url".into()]).unwrap();
    table.expand_all();
    table.set_page_index(2).unwrap();

    table.set_column_filter("label", FilterValue::text("mobile")).unwrap();
    assert_eq!(table.pagination().map(|p| p.page_index), Some(0));
    assert!(!table.is_expanded("url:s:https://cdn.test/site.css"));
    assert!(table.is_expanded("url:s:https://a.test/app.js"));
}

#[test]
fn group_expansion_can_be_disabled() {
    let rows = resource_rows();
    let mut table = Table::with_options(
        &rows,
        resource_columns(),
        TableOptions {
            enable_group_expansion: false,
            ..TableOptions::default()
        },
    );
    table.set_grouping(vec!["label".into()]).unwrap();
    assert!(!table.toggle_expanded("label:s:Mobile"));
    assert!(table.page_rows().iter().all(|r| !r.can_expand()));
}

#[test]
fn show_all_then_show_less_restores_page_size() {
    let rows: Vec<Map<String, Value>> = (0..150)
        .map(|i| obj(json!({"url": format!("https://a.test/{i}.js"), "wastedBytes": i})))
        .collect();
    let mut table = Table::new(&rows, resource_columns());
    assert_eq!(table.page_rows().len(), 10);
    table.set_page_index(4).unwrap();

    table.show_all().unwrap();
    assert!(table.is_showing_all());
    assert_eq!(table.page_count(), 1);
    assert_eq!(table.page_rows().len(), 150);

    table.show_less().unwrap();
    assert!(!table.is_showing_all());
    assert_eq!(table.page_rows().len(), 10);
    assert_eq!(table.pagination().map(|p| (p.page_index, p.page_size)), Some((0, 10)));
    assert_eq!(table.page_rows()[0].leaf_index(), Some(0));
}

#[test]
fn column_sizes_clamp_and_visibility_hides() {
    let rows = resource_rows();
    let columns = vec![
        ColumnDef::text("url", "URL").with_size(300, 120, 600),
        ColumnDef::number("wastedBytes", "Savings"),
    ];
    let mut table = Table::new(&rows, columns);

    assert_eq!(table.set_column_size("url", 50), Ok(120));
    assert_eq!(table.set_column_size("url", 900), Ok(600));
    assert_eq!(table.total_size(), 600 + 150);

    assert_eq!(table.toggle_column_visibility("wastedBytes"), Ok(false));
    assert_eq!(table.visible_columns().len(), 1);
    assert_eq!(table.total_size(), 600);

    table.reset_column_sizes();
    assert_eq!(table.column_size("url"), Some(300));
}

#[test]
fn facets_feed_filter_controls() {
    let rows = resource_rows();
    let table = Table::new(&rows, resource_columns());
    assert_eq!(
        table.unique_values("label").unwrap(),
        vec![(CellValue::from("Mobile"), 2), (CellValue::from("Desktop"), 2)]
    );
    assert_eq!(table.min_max_values("wastedBytes").unwrap(), Some((20.0, 300.0)));
    assert_eq!(table.min_max_values("label").unwrap(), None);
}

#[test]
fn instances_over_shared_rows_are_independent() {
    let rows = resource_rows();
    let mut a = Table::new(&rows, resource_columns());
    let b = Table::new(&rows, resource_columns());
    a.set_grouping(vec!["label".into()]).unwrap();
    a.toggle_sorting("url", false).unwrap();
    assert!(b.grouping().is_empty());
    assert!(b.sorting().is_empty());
    assert_eq!(b.page_rows().len(), 4);
}

#[test]
fn sum_rollup_is_column_defined() {
    let rows = resource_rows();
    let columns = vec![
        ColumnDef::text("label", "Report"),
        ColumnDef::number("wastedBytes", "Savings").with_aggregation(AggregationFn::Sum),
        ColumnDef::new("url", "Files").with_aggregation(AggregationFn::Count),
    ];
    let mut table = Table::new(&rows, columns);
    table.set_grouping(vec!["label".into()]).unwrap();
    let page = table.page_rows();
    assert_eq!(table.display_cell(&page[0], "wastedBytes"), AggregatedCell::value(400.0));
    assert_eq!(table.display_cell(&page[0], "url"), AggregatedCell::value(2.0));
}

proptest! {
    #![proptest_config(Config::with_cases(64))]
    #[test]
    fn sorting_is_deterministic_and_complete(values in proptest::collection::vec(0_u32..50, 0..60)) {
        let rows: Vec<Map<String, Value>> = values
            .iter()
            .map(|v| obj(json!({"wastedBytes": v})))
            .collect();
        let mut table = Table::with_options(
            &rows,
            vec![ColumnDef::number("wastedBytes", "Savings")],
            TableOptions { enable_pagination: false, ..TableOptions::default() },
        );
        table.set_sorting(vec![SortingEntry::desc("wastedBytes")]).unwrap();
        let first = leaf_order(&table);
        let second = leaf_order(&table);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), values.len());
        for pair in first.windows(2) {
            prop_assert!(values[pair[0]] >= values[pair[1]]);
            if values[pair[0]] == values[pair[1]] {
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }
}
