//! URL-keyed merge of resource rows.

use std::collections::HashMap;

use crate::row::AuditRow;

/// Placeholder URL for rows that cannot be attributed to a resource.
pub const UNATTRIBUTABLE: &str = "Unattributable";

/// Numeric fields merged by maximum.
pub const MAX_MERGE_FIELDS: [&str; 7] = [
    "wastedBytes",
    "wastedMs",
    "totalBytes",
    "wastedPercent",
    "scripting",
    "scriptParseCompile",
    "total",
];

/// Merges rows sharing a URL.
///
/// Whitelisted numbers keep the larger value (a missing value defers to
/// the other side); other fields take the later row's value; `url` never
/// changes. Merged rows come first in first-seen URL order, then rows
/// without a usable URL, untouched and in input order.
pub fn dedup_resources(rows: Vec<AuditRow>) -> Vec<AuditRow> {
    let mut merged: Vec<AuditRow> = Vec::new();
    let mut unattributed: Vec<AuditRow> = Vec::new();
    let mut by_url: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let url = match row.url() {
            Some(u) if u != UNATTRIBUTABLE => u.to_string(),
            _ => {
                unattributed.push(row);
                continue;
            }
        };
        match by_url.get(&url).copied() {
            Some(pos) => merge_into(&mut merged[pos], row),
            None => {
                by_url.insert(url, merged.len());
                merged.push(row);
            }
        }
    }

    merged.extend(unattributed);
    merged
}

fn merge_into(target: &mut AuditRow, incoming: AuditRow) {
    for (key, value) in incoming.0 {
        if key == "url" {
            continue;
        }
        if MAX_MERGE_FIELDS.contains(&key.as_str()) {
            let Some(new) = value.as_f64() else {
                continue;
            };
            match target.number(&key) {
                Some(old) if old >= new => {}
                _ => {
                    target.insert(key, value);
                }
            }
        } else {
            target.insert(key, value);
        }
    }
}

/// Joins distinct labels in first-seen order, e.g. `Mobile, Desktop`.
pub(crate) fn join_labels<'a, I>(labels: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: Vec<&str> = Vec::new();
    for l in labels {
        if !seen.contains(&l) {
            seen.push(l);
        }
    }
    (!seen.is_empty()).then(|| seen.join(", "))
}
