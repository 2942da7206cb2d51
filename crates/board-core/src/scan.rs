//! Column header scanning
//!
//! The host page encodes a column id as a `col-identifier-<id>` class on
//! each header cell. The human-readable name sits somewhere inside the
//! cell; where exactly depends on the column type and on the host's
//! markup version, hence the ordered selector chain below.

use crate::record::ColumnMap;

/// Class prefix carrying the column id
pub const COLUMN_ID_PREFIX: &str = "col-identifier-";

/// Header cells inside group headers
pub const HEADER_CELL_SELECTOR: &str = ".group-header-component [class*=\"col-identifier-\"]";

/// Label lookups, most specific first. Extend at the end when the host
/// markup changes.
pub const LABEL_SELECTORS: &[&str] = &[
    "text2[data-testid=\"text\"]",
    ".column-title-editable text2[data-testid=\"text\"]",
    ".column-title text2",
    "[data-testid=\"text\"]",
    ".typography_2a1e03a281",
    "text2",
    ".column-title",
    ".heading_d9e5e57789",
];

/// A header cell as seen by the scanner
pub trait HeaderCell {
    /// The cell's class list
    fn class_names(&self) -> Vec<String>;

    /// Text content of the first descendant matching `selector`
    fn text_at(&self, selector: &str) -> Option<String>;
}

/// Column id encoded in a class list, if any
pub fn column_id_from_classes<I, C>(classes: I) -> Option<String>
where
    I: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    classes.into_iter().find_map(|class| {
        class
            .as_ref()
            .strip_prefix(COLUMN_ID_PREFIX)
            .map(str::to_string)
    })
}

/// First non-empty label found by walking the selector chain
pub fn find_label<H: HeaderCell + ?Sized>(cell: &H) -> Option<String> {
    LABEL_SELECTORS
        .iter()
        .filter_map(|selector| cell.text_at(selector))
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
}

/// Label heuristic: reject empty labels, labels echoing the raw id, and
/// single-character labels.
pub fn accept_label(column_id: &str, label: &str) -> Option<String> {
    let label = label.trim();
    if label.is_empty() || label == column_id || label.chars().count() <= 1 {
        return None;
    }
    Some(label.to_string())
}

/// Counts reported by one scan pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub found: usize,
    pub new: usize,
}

/// Upsert every recognizable header into `columns`
pub fn scan_headers<H, I>(headers: I, columns: &mut ColumnMap, now: u64) -> ScanOutcome
where
    H: HeaderCell,
    I: IntoIterator<Item = H>,
{
    let mut outcome = ScanOutcome::default();

    for cell in headers {
        let Some(column_id) = column_id_from_classes(cell.class_names()) else {
            continue;
        };
        let Some(name) = find_label(&cell).and_then(|label| accept_label(&column_id, &label))
        else {
            continue;
        };

        outcome.found += 1;
        if columns.upsert(&column_id, &name, now) {
            outcome.new += 1;
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    struct FakeCell {
        classes: Vec<String>,
        texts: HashMap<&'static str, String>,
    }

    impl FakeCell {
        fn new(classes: &[&str]) -> Self {
            Self {
                classes: classes.iter().map(|c| c.to_string()).collect(),
                texts: HashMap::new(),
            }
        }

        fn with_text(mut self, selector: &'static str, text: &str) -> Self {
            self.texts.insert(selector, text.to_string());
            self
        }
    }

    impl HeaderCell for FakeCell {
        fn class_names(&self) -> Vec<String> {
            self.classes.clone()
        }

        fn text_at(&self, selector: &str) -> Option<String> {
            self.texts.get(selector).cloned()
        }
    }

    #[test]
    fn test_column_id_from_classes() {
        let id = column_id_from_classes(["cell", "col-identifier-status_1", "sticky"]);
        assert_eq!(id.as_deref(), Some("status_1"));
        assert_eq!(column_id_from_classes(["cell", "sticky"]), None);
    }

    #[test]
    fn test_label_chain_prefers_specific_selector() {
        let cell = FakeCell::new(&["col-identifier-x"])
            .with_text("text2[data-testid=\"text\"]", "Owner")
            .with_text(".column-title", "Owner (legacy)");
        assert_eq!(find_label(&cell).as_deref(), Some("Owner"));
    }

    #[test]
    fn test_label_chain_skips_blank_matches() {
        let cell = FakeCell::new(&["col-identifier-x"])
            .with_text("text2[data-testid=\"text\"]", "   ")
            .with_text(".heading_d9e5e57789", " Budget ");
        assert_eq!(find_label(&cell).as_deref(), Some("Budget"));
    }

    #[test]
    fn test_accept_label_rejections() {
        assert_eq!(accept_label("status", ""), None);
        assert_eq!(accept_label("status", "status"), None);
        assert_eq!(accept_label("status", "S"), None);
        assert_eq!(accept_label("status", " status "), None);
        assert_eq!(accept_label("status", "Status").as_deref(), Some("Status"));
    }

    #[test]
    fn test_scan_counts_new_and_found() {
        let mut columns = ColumnMap::new();
        let headers = vec![
            FakeCell::new(&["col-identifier-status"]).with_text("text2", "Status"),
            FakeCell::new(&["col-identifier-date4"]).with_text(".column-title", "Due"),
            FakeCell::new(&["col-identifier-raw"]).with_text("text2", "raw"),
            FakeCell::new(&["no-identifier"]).with_text("text2", "Ignored"),
        ];

        let outcome = scan_headers(headers, &mut columns, 10);

        assert_eq!(outcome, ScanOutcome { found: 2, new: 2 });
        assert_eq!(columns.get("date4").unwrap().name, "Due");
        assert!(!columns.contains("raw"));
    }

    #[test]
    fn test_rescan_finds_nothing_new() {
        let mut columns = ColumnMap::new();
        let make = || vec![FakeCell::new(&["col-identifier-status"]).with_text("text2", "Status")];

        scan_headers(make(), &mut columns, 1);
        let before: Vec<(String, String)> =
            columns.iter().map(|r| (r.id.clone(), r.name.clone())).collect();
        let second = scan_headers(make(), &mut columns, 2);
        let after: Vec<(String, String)> =
            columns.iter().map(|r| (r.id.clone(), r.name.clone())).collect();

        assert_eq!(second, ScanOutcome { found: 1, new: 0 });
        assert_eq!(before, after);
    }

    proptest! {
        #[test]
        fn accepted_labels_never_echo_the_id(id in "[a-z0-9_]{1,12}", label in ".{0,16}") {
            if let Some(name) = accept_label(&id, &label) {
                prop_assert!(name != id);
                prop_assert!(name.chars().count() > 1);
                prop_assert_eq!(name.trim(), name.as_str());
            }
        }
    }
}
