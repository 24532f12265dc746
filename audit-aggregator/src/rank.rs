use std::collections::HashMap;
use std::hash::Hash;

/// Orders rows so the key with the greatest peak value comes first.
///
/// With one report (or none) the input is returned as-is. Otherwise each
/// key's maximum of `value` is computed (missing or non-finite counts as
/// 0) and rows are stable-sorted by that maximum, descending.
pub fn rank_by_peak<T, K, FK, FV>(rows: Vec<T>, key: FK, value: FV, report_count: usize) -> Vec<T>
where
    K: Eq + Hash + Clone,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> Option<f64>,
{
    if report_count <= 1 {
        return rows;
    }

    let mut peaks: HashMap<K, f64> = HashMap::new();
    let mut keyed: Vec<(K, T)> = Vec::with_capacity(rows.len());
    for row in rows {
        let k = key(&row);
        let v = value(&row).filter(|v| v.is_finite()).unwrap_or(0.0);
        peaks
            .entry(k.clone())
            .and_modify(|p| *p = p.max(v))
            .or_insert(v);
        keyed.push((k, row));
    }

    let mut scored: Vec<(f64, T)> = keyed
        .into_iter()
        .map(|(k, row)| (peaks.get(&k).copied().unwrap_or(0.0), row))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, row)| row).collect()
}
