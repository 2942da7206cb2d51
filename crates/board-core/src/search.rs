//! Column search and ranking

use crate::record::{ColumnMap, ColumnRecord};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Name ordering used for every result list.
///
/// Names are compared with case and diacritics folded away ("État" sorts
/// between "Avancement" and "Zone"); accents only break ties left by the
/// folded form. Names that differ only by case compare equal, so the stable
/// sorts below keep discovery order for them.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
}

/// Lowercased, canonically decomposed text without combining marks
fn fold(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// All records, sorted by name
pub fn all_sorted(columns: &ColumnMap) -> Vec<&ColumnRecord> {
    let mut results: Vec<&ColumnRecord> = columns.iter().collect();
    results.sort_by(|a, b| compare_names(&a.name, &b.name));
    results
}

/// Records whose name or id contains `query`, case-insensitively.
///
/// Exact matches (full name or id equality, ignoring case) come first;
/// each tier is sorted by name. A blank query returns every record.
pub fn search<'a>(columns: &'a ColumnMap, query: &str) -> Vec<&'a ColumnRecord> {
    if query.trim().is_empty() {
        return all_sorted(columns);
    }

    let needle = query.to_lowercase();
    let mut results: Vec<(bool, &ColumnRecord)> = columns
        .iter()
        .filter_map(|record| {
            let name = record.name.to_lowercase();
            let id = record.id.to_lowercase();
            if name.contains(&needle) || id.contains(&needle) {
                Some((name == needle || id == needle, record))
            } else {
                None
            }
        })
        .collect();

    results.sort_by(|(a_exact, a), (b_exact, b)| {
        b_exact
            .cmp(a_exact)
            .then_with(|| compare_names(&a.name, &b.name))
    });

    results.into_iter().map(|(_, record)| record).collect()
}
