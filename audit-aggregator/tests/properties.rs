use std::collections::HashMap;

use audit_aggregator::analyze::steps::{ALL_REPORTS_KEY, group_key};
use audit_aggregator::analyze::{combined_metric_savings, worst_score};
use audit_aggregator::dedup::{MAX_MERGE_FIELDS, UNATTRIBUTABLE};
use audit_aggregator::{
    AuditReport, AuditRow, LabeledReport, collect_audits, dedup_resources, rank_by_peak,
};
use proptest::prelude::*;
use proptest::test_runner::Config;
use serde_json::{Map, Value, json};

fn arb_url() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![
        Just(Some("a.js")),
        Just(Some("b.css")),
        Just(Some("c.png")),
        Just(Some(UNATTRIBUTABLE)),
        Just(None),
    ]
}

fn arb_row() -> impl Strategy<Value = AuditRow> {
    (
        arb_url(),
        proptest::collection::vec(proptest::option::of(0_u32..10_000), MAX_MERGE_FIELDS.len()),
        0_u32..1000,
    )
        .prop_map(|(url, values, tag)| {
            let mut m = Map::new();
            if let Some(u) = url {
                m.insert("url".into(), Value::from(u));
            }
            for (field, v) in MAX_MERGE_FIELDS.iter().zip(values) {
                if let Some(v) = v {
                    m.insert((*field).into(), Value::from(v));
                }
            }
            m.insert("tag".into(), Value::from(tag));
            AuditRow(m)
        })
}

fn attributable(row: &AuditRow) -> Option<&str> {
    row.url().filter(|u| *u != UNATTRIBUTABLE)
}

fn reports_with_scores(scores: &[Option<f64>]) -> Vec<AuditReport> {
    scores
        .iter()
        .map(|s| {
            AuditReport::from_value(json!({"lighthouseResult": {"audits": {
                "x": {"score": s, "metricSavings": {"LCP": s.map(|v| v * 200.0 - 60.0), "TBT": 0}}
            }}}))
        })
        .collect()
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn dedup_keeps_per_url_maximum(rows in proptest::collection::vec(arb_row(), 0..40)) {
        let out = dedup_resources(rows.clone());
        for field in MAX_MERGE_FIELDS {
            let mut expected: HashMap<&str, f64> = HashMap::new();
            for r in &rows {
                if let (Some(u), Some(v)) = (attributable(r), r.number(field)) {
                    let e = expected.entry(u).or_insert(v);
                    *e = e.max(v);
                }
            }
            for r in out.iter().filter(|r| attributable(r).is_some()) {
                let url = attributable(r).unwrap();
                prop_assert_eq!(r.number(field), expected.get(url).copied());
            }
        }
        let distinct: std::collections::HashSet<&str> = rows.iter().filter_map(attributable).collect();
        prop_assert_eq!(out.iter().filter(|r| attributable(r).is_some()).count(), distinct.len());
    }

    #[test]
    fn unattributed_rows_pass_through_last(rows in proptest::collection::vec(arb_row(), 0..40)) {
        let out = dedup_resources(rows.clone());
        let expected: Vec<&AuditRow> = rows.iter().filter(|r| attributable(r).is_none()).collect();
        let merged = out.len() - expected.len();
        prop_assert!(out[..merged].iter().all(|r| attributable(r).is_some()));
        let tail: Vec<&AuditRow> = out[merged..].iter().collect();
        prop_assert_eq!(tail, expected);
    }

    #[test]
    fn ranking_is_stable(
        rows in proptest::collection::vec((0_u8..5, proptest::option::of(0_u32..100)), 0..40),
        reports in 0_usize..4,
    ) {
        let once = rank_by_peak(rows.clone(), |r| r.0, |r| r.1.map(f64::from), reports);
        let twice = rank_by_peak(rows.clone(), |r| r.0, |r| r.1.map(f64::from), reports);
        prop_assert_eq!(&once, &twice);
        if reports <= 1 {
            prop_assert_eq!(&once, &rows);
        } else {
            let mut peak: HashMap<u8, u32> = HashMap::new();
            for (k, v) in &rows {
                let p = peak.entry(*k).or_insert(0);
                *p = (*p).max(v.unwrap_or(0));
            }
            for pair in once.windows(2) {
                prop_assert!(peak[&pair[0].0] >= peak[&pair[1].0]);
            }
        }
    }

    #[test]
    fn worst_score_is_minimum_and_savings_positive(
        scores in proptest::collection::vec(proptest::option::of(0.0_f64..=1.0), 1..6),
    ) {
        let reports = reports_with_scores(&scores);
        let labels: Vec<String> = (0..reports.len()).map(|i| format!("R{i}")).collect();
        let labeled: Vec<LabeledReport<'_>> = labels
            .iter()
            .zip(&reports)
            .map(|(l, r)| LabeledReport::new(l, r))
            .collect();
        let map = collect_audits(&labeled);
        let entries = map.get("x").unwrap();

        let min = scores.iter().flatten().copied().reduce(f64::min);
        prop_assert_eq!(worst_score(entries), min);

        let savings = combined_metric_savings(entries);
        prop_assert!(savings.values().all(|v| *v > 0.0));
        prop_assert!(!savings.contains_key("TBT"));
    }

    #[test]
    fn every_label_in_any_order_is_all(
        labels in proptest::sample::subsequence(vec!["Mobile", "Desktop", "Tablet", "TV"], 1..=4),
        seed in any::<u64>(),
    ) {
        let mut shuffled: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        let n = shuffled.len();
        shuffled.rotate_left((seed as usize) % n);
        shuffled.push(shuffled[0].clone());
        prop_assert_eq!(group_key(&shuffled, &labels), ALL_REPORTS_KEY);
    }
}
