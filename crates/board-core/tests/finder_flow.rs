//! End-to-end Column Finder flows over the in-memory store

use board_core::{
    BoardId, ColumnFinder, FinderConfig, HeaderCell, KeyValueStore, MemoryStore, ScanOutcome,
};
use pretty_assertions::assert_eq;

#[derive(Clone)]
struct Header {
    id: &'static str,
    label: &'static str,
}

impl HeaderCell for Header {
    fn class_names(&self) -> Vec<String> {
        vec![
            "column-header".to_string(),
            format!("col-identifier-{}", self.id),
        ]
    }

    fn text_at(&self, selector: &str) -> Option<String> {
        (selector == ".column-title").then(|| self.label.to_string())
    }
}

const BOARD_ONE: &str = "https://acme.monday.com/boards/1001";
const BOARD_TWO: &str = "https://acme.monday.com/boards/2002/views/9";

fn board_one_headers() -> Vec<Header> {
    vec![
        Header { id: "status", label: "Status" },
        Header { id: "person", label: "Owner" },
    ]
}

fn board_two_headers() -> Vec<Header> {
    vec![Header { id: "date4", label: "Due date" }]
}

fn names(finder: &ColumnFinder<MemoryStore>) -> Vec<(String, String)> {
    finder
        .columns()
        .iter()
        .map(|r| (r.id.clone(), r.name.clone()))
        .collect()
}

#[test]
fn scanning_one_board_never_writes_another() {
    let config = FinderConfig::default();
    let mut finder = ColumnFinder::new(MemoryStore::new(), &config, BOARD_TWO);
    finder.scan(board_two_headers(), 1);
    let board_two_before = finder
        .store()
        .backend()
        .get(&config.storage_key("2002"))
        .unwrap();

    finder.observe_url(BOARD_ONE);
    finder.scan(board_one_headers(), 2);
    finder.scan(board_one_headers(), 3);

    let board_two_after = finder
        .store()
        .backend()
        .get(&config.storage_key("2002"))
        .unwrap();
    assert_eq!(board_two_before, board_two_after);
}

#[test]
fn switching_boards_saves_before_clearing() {
    let config = FinderConfig::default();
    let mut backend = MemoryStore::new();
    backend
        .set(&config.storage_key("2002"), r#"{"date4":{"name":"Due date","lastSeen":7,"boardId":"2002"}}"#)
        .unwrap();

    let mut finder = ColumnFinder::new(backend, &config, BOARD_ONE);
    finder.scan(board_one_headers(), 5);
    // A refreshed name has not been written through yet (no new ids)
    finder.scan(vec![Header { id: "status", label: "State" }], 6);

    let transition = finder.observe_url(BOARD_TWO).unwrap();
    assert_eq!(transition.from, Some(BoardId::new("1001")));

    let saved = finder.store().load(&BoardId::new("1001")).unwrap();
    assert_eq!(saved.get("status").unwrap().name, "State");
    assert_eq!(
        names(&finder),
        vec![("date4".to_string(), "Due date".to_string())]
    );
}

#[test]
fn second_scan_is_idempotent() {
    let mut finder = ColumnFinder::new(MemoryStore::new(), &FinderConfig::default(), BOARD_ONE);

    let first = finder.scan(board_one_headers(), 1).unwrap();
    let after_first = names(&finder);
    let second = finder.scan(board_one_headers(), 1).unwrap();

    assert_eq!(first, ScanOutcome { found: 2, new: 2 });
    assert_eq!(second, ScanOutcome { found: 2, new: 0 });
    assert_eq!(names(&finder), after_first);
}

#[test]
fn returning_to_a_board_restores_its_columns() {
    let mut finder = ColumnFinder::new(MemoryStore::new(), &FinderConfig::default(), BOARD_ONE);
    finder.scan(board_one_headers(), 1);

    finder.observe_url(BOARD_TWO);
    finder.observe_url(BOARD_ONE);

    assert_eq!(
        names(&finder),
        vec![
            ("status".to_string(), "Status".to_string()),
            ("person".to_string(), "Owner".to_string()),
        ]
    );
}

#[test]
fn export_includes_all_boards() {
    let mut finder = ColumnFinder::new(MemoryStore::new(), &FinderConfig::default(), BOARD_ONE);
    finder.scan(board_one_headers(), 1);
    finder.observe_url(BOARD_TWO);
    finder.scan(board_two_headers(), 2);

    let doc = finder.export();
    let json: serde_json::Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();

    assert_eq!(doc.board_count(), 2);
    assert_eq!(json["1001"]["person"]["name"], "Owner");
    assert_eq!(json["2002"]["date4"]["boardId"], "2002");
}

#[test]
fn corrupted_entry_does_not_hide_valid_boards() {
    let config = FinderConfig::default();
    let mut backend = MemoryStore::new();
    backend.set(&config.storage_key("1"), "{\"broken\":").unwrap();
    backend
        .set(&config.storage_key("2"), r#"{"text":{"name":"Notes","lastSeen":1}}"#)
        .unwrap();

    let finder = ColumnFinder::new(backend, &config, "https://acme.monday.com/boards/1");

    assert!(finder.columns().is_empty());
    let listed: Vec<String> = finder
        .store()
        .list_all()
        .iter()
        .map(|s| s.board_id.to_string())
        .collect();
    assert_eq!(listed, vec!["2".to_string()]);
}

#[test]
fn search_prefers_exact_matches() {
    let mut finder = ColumnFinder::new(MemoryStore::new(), &FinderConfig::default(), BOARD_ONE);
    finder.scan(
        vec![
            Header { id: "1", label: "Status" },
            Header { id: "2", label: "status" },
            Header { id: "3", label: "Status notes" },
        ],
        1,
    );

    let ids: Vec<&str> = finder
        .search("status")
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}
