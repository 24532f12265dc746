use crate::report::{ColumnHeading, DetailPayload, ListElement};
use crate::row::AuditRow;

/// Rows of one payload plus the headings that describe them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub items: Vec<AuditRow>,
    pub headings: Option<Vec<ColumnHeading>>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Normalizes a detail payload into rows.
///
/// - `table`: items and headings as-is.
/// - `list`: items of every nested table, first non-empty headings win.
/// - `opportunity`: items, no headings.
/// - unknown or absent: empty.
pub fn extract_details(details: Option<&DetailPayload>) -> Extraction {
    match details {
        Some(DetailPayload::Table { headings, items }) => Extraction {
            items: items.clone(),
            headings: Some(headings.clone()),
        },
        Some(DetailPayload::List { items }) => {
            let mut out = Extraction::default();
            for elem in items {
                if let ListElement::Table { headings, items } = elem {
                    out.items.extend(items.iter().cloned());
                    if out.headings.is_none() && !headings.is_empty() {
                        out.headings = Some(headings.clone());
                    }
                }
            }
            out
        }
        Some(DetailPayload::Opportunity { items }) => Extraction {
            items: items.clone(),
            headings: None,
        },
        Some(DetailPayload::Unknown { .. }) | None => Extraction::default(),
    }
}
