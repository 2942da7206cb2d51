//! "Export All" document: board id -> stored column mapping

use crate::board::BoardId;
use crate::error::Result;
use crate::record::{BoardSnapshot, ColumnMap, StoredBoard};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportDocument {
    boards: BTreeMap<String, StoredBoard>,
}

impl ExportDocument {
    /// Persisted snapshots, plus the active board when it holds columns
    /// that were never persisted.
    pub fn build(persisted: Vec<BoardSnapshot>, active: Option<(&BoardId, &ColumnMap)>) -> Self {
        let mut boards: BTreeMap<String, StoredBoard> = persisted
            .into_iter()
            .map(|snapshot| {
                let stored = snapshot.columns.to_stored(&snapshot.board_id);
                (snapshot.board_id.to_string(), stored)
            })
            .collect();

        if let Some((board, columns)) = active {
            if !columns.is_empty() {
                boards
                    .entry(board.to_string())
                    .or_insert_with(|| columns.to_stored(board));
            }
        }

        Self { boards }
    }

    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    pub fn contains(&self, board: &BoardId) -> bool {
        self.boards.contains_key(board.as_str())
    }

    /// Pretty JSON with two-space indentation
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.boards)?)
    }
}

/// Download name for an export made on `date`
pub fn export_filename(date: NaiveDate) -> String {
    format!("monday-all-boards-{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(pairs: &[(&str, &str)]) -> ColumnMap {
        let mut map = ColumnMap::new();
        for (id, name) in pairs {
            map.upsert(id, name, 5);
        }
        map
    }

    #[test]
    fn test_filename_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(export_filename(date), "monday-all-boards-2024-03-07.json");
    }

    #[test]
    fn test_active_board_added_when_unsaved() {
        let persisted = vec![BoardSnapshot {
            board_id: BoardId::new("1"),
            columns: columns(&[("a", "Alpha")]),
        }];
        let active = BoardId::new("2");
        let live = columns(&[("b", "Beta")]);

        let doc = ExportDocument::build(persisted, Some((&active, &live)));

        assert_eq!(doc.board_count(), 2);
        assert!(doc.contains(&active));
    }

    #[test]
    fn test_persisted_copy_wins_over_live() {
        let board = BoardId::new("1");
        let persisted = vec![BoardSnapshot {
            board_id: board.clone(),
            columns: columns(&[("a", "Alpha")]),
        }];
        let live = columns(&[("a", "Alpha"), ("b", "Beta")]);

        let doc = ExportDocument::build(persisted, Some((&board, &live)));
        let json: serde_json::Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["1"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_active_board_skipped() {
        let board = BoardId::new("3");
        let doc = ExportDocument::build(Vec::new(), Some((&board, &ColumnMap::new())));
        assert_eq!(doc.board_count(), 0);
        assert_eq!(doc.to_json_pretty().unwrap(), "{}");
    }

    #[test]
    fn test_json_layout() {
        let board = BoardId::new("8");
        let doc = ExportDocument::build(
            vec![BoardSnapshot {
                board_id: board,
                columns: columns(&[("text", "Notes")]),
            }],
            None,
        );
        let expected = "{\n  \"8\": {\n    \"text\": {\n      \"name\": \"Notes\",\n      \"lastSeen\": 5,\n      \"boardId\": \"8\"\n    }\n  }\n}";
        assert_eq!(doc.to_json_pretty().unwrap(), expected);
    }
}
