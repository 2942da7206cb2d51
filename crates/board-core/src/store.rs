//! Board-scoped persistence over a flat key/value store
//!
//! Each board lives under `<prefix>_<boardId>` as a JSON object. The
//! backend is abstracted behind `KeyValueStore` so the browser's
//! `localStorage` and the in-memory test store are interchangeable.

use crate::board::BoardId;
use crate::config::FinderConfig;
use crate::error::{BoardError, Result};
use crate::record::{BoardSnapshot, ColumnMap, StoredBoard};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Flat string key/value backend
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
    /// Every key currently present, in backend order
    fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory backend for tests and host-side tooling
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Per-board snapshots plus a write-through cache of what was saved
#[derive(Debug)]
pub struct BoardStore<S> {
    backend: S,
    config: FinderConfig,
    saved: HashMap<BoardId, ColumnMap>,
}

impl<S: KeyValueStore> BoardStore<S> {
    pub fn new(backend: S, config: &FinderConfig) -> Self {
        Self {
            backend,
            config: config.clone(),
            saved: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    fn key_for(&self, board: &BoardId) -> String {
        self.config.storage_key(board.as_str())
    }

    /// Load one board's columns.
    ///
    /// Missing, unreadable and corrupted entries all come back as `None`;
    /// corruption is logged, never returned.
    pub fn load(&self, board: &BoardId) -> Option<ColumnMap> {
        let key = self.key_for(board);
        let raw = match self.backend.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(board_id = %board, error = %e, "Could not read board snapshot");
                return None;
            }
        };

        match parse_stored(&key, &raw) {
            Ok(stored) => {
                let (columns, dropped) = ColumnMap::from_stored(stored);
                if dropped > 0 {
                    warn!(board_id = %board, dropped, "Discarded stored columns with invalid names");
                }
                info!(board_id = %board, columns = columns.len(), "Loaded board snapshot");
                Some(columns)
            }
            Err(e) => {
                warn!(board_id = %board, error = %e, "Discarding corrupted board snapshot");
                None
            }
        }
    }

    /// Persist one board's columns and mirror them into the saved cache
    pub fn save(&mut self, board: &BoardId, columns: &ColumnMap) -> Result<()> {
        let json = serde_json::to_string(&columns.to_stored(board))?;
        self.backend.set(&self.key_for(board), &json)?;
        self.saved.insert(board.clone(), columns.clone());
        info!(board_id = %board, columns = columns.len(), "Saved board snapshot");
        Ok(())
    }

    /// Every readable snapshot under the namespace, ordered by board id
    pub fn list_all(&self) -> Vec<BoardSnapshot> {
        let prefix = self.config.key_prefix();
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Could not enumerate stored boards");
                return Vec::new();
            }
        };

        let mut snapshots: Vec<BoardSnapshot> = keys
            .iter()
            .filter_map(|key| {
                let board_id = BoardId::new(key.strip_prefix(&prefix)?);
                let raw = self.backend.get(key).ok().flatten()?;
                match parse_stored(key, &raw) {
                    Ok(stored) => Some(BoardSnapshot {
                        board_id,
                        columns: ColumnMap::from_stored(stored).0,
                    }),
                    Err(e) => {
                        warn!(board_id = %board_id, error = %e, "Skipping corrupted board snapshot");
                        None
                    }
                }
            })
            .collect();

        snapshots.sort_by(|a, b| a.board_id.cmp(&b.board_id));
        snapshots
    }

    /// Remove one board's snapshot from storage and from the saved cache
    pub fn clear(&mut self, board: &BoardId) -> Result<()> {
        self.backend.remove(&self.key_for(board))?;
        self.saved.remove(board);
        debug!(board_id = %board, "Cleared board snapshot");
        Ok(())
    }

    /// Columns most recently saved for a board in this session
    pub fn saved(&self, board: &BoardId) -> Option<&ColumnMap> {
        self.saved.get(board)
    }

    /// Every board saved in this session, in no particular order
    pub fn saved_boards(&self) -> impl Iterator<Item = (&BoardId, &ColumnMap)> {
        self.saved.iter()
    }
}

fn parse_stored(key: &str, raw: &str) -> Result<StoredBoard> {
    serde_json::from_str(raw).map_err(|source| BoardError::Corrupted {
        key: key.to_string(),
        source,
    })
}

/// Read the annotator toggle; absent means enabled
pub fn load_toggle<S: KeyValueStore>(backend: &S, key: &str) -> bool {
    match backend.get(key) {
        Ok(Some(value)) => value == "true",
        Ok(None) => true,
        Err(e) => {
            warn!(error = %e, "Could not read toggle state, defaulting to enabled");
            true
        }
    }
}

/// Persist the annotator toggle as `"true"` / `"false"`
pub fn save_toggle<S: KeyValueStore>(backend: &mut S, key: &str, enabled: bool) -> Result<()> {
    backend.set(key, if enabled { "true" } else { "false" })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> BoardStore<MemoryStore> {
        BoardStore::new(MemoryStore::new(), &FinderConfig::default())
    }

    fn columns(pairs: &[(&str, &str)]) -> ColumnMap {
        let mut map = ColumnMap::new();
        for (i, (id, name)) in pairs.iter().enumerate() {
            map.upsert(id, name, i as u64);
        }
        map
    }

    #[test]
    fn test_save_then_load() {
        let mut store = store();
        let board = BoardId::new("100");
        let original = columns(&[("status", "Status"), ("date4", "Due date")]);

        store.save(&board, &original).unwrap();
        let loaded = store.load(&board).unwrap();

        assert_eq!(loaded, original);
        assert_eq!(store.saved(&board), Some(&original));
    }

    #[test]
    fn test_load_missing_board() {
        assert!(store().load(&BoardId::new("404")).is_none());
    }

    #[test]
    fn test_load_corrupted_board() {
        let mut store = store();
        store
            .backend_mut()
            .set("mondayColumnFinder_7", "{not json")
            .unwrap();
        assert!(store.load(&BoardId::new("7")).is_none());
    }

    #[test]
    fn test_load_keeps_valid_columns_next_to_malformed_ones() {
        let mut store = store();
        store
            .backend_mut()
            .set(
                "mondayColumnFinder_5",
                r#"{"a":{"name":"Alpha","lastSeen":1},"b":{"name":["Beta"],"lastSeen":null}}"#,
            )
            .unwrap();

        let loaded = store.load(&BoardId::new("5")).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("a").unwrap().name, "Alpha");
    }

    #[test]
    fn test_list_all_sorted_and_skips_corruption() {
        let mut store = store();
        store.save(&BoardId::new("20"), &columns(&[("a", "Alpha")])).unwrap();
        store.save(&BoardId::new("100"), &columns(&[("b", "Beta")])).unwrap();
        store
            .backend_mut()
            .set("mondayColumnFinder_5", "garbage")
            .unwrap();
        store.backend_mut().set("unrelated", "{}").unwrap();

        let ids: Vec<String> = store
            .list_all()
            .iter()
            .map(|s| s.board_id.to_string())
            .collect();
        assert_eq!(ids, vec!["100", "20"]);
    }

    #[test]
    fn test_clear_removes_key_and_cache() {
        let mut store = store();
        let board = BoardId::new("9");
        store.save(&board, &columns(&[("a", "Alpha")])).unwrap();

        store.clear(&board).unwrap();

        assert!(store.load(&board).is_none());
        assert!(store.saved(&board).is_none());
        assert!(store.backend().is_empty());
    }

    #[test]
    fn test_toggle_defaults_to_enabled() {
        let mut backend = MemoryStore::new();
        assert!(load_toggle(&backend, "devColumnToggleChecked"));

        save_toggle(&mut backend, "devColumnToggleChecked", false).unwrap();
        assert_eq!(
            backend.get("devColumnToggleChecked").unwrap().as_deref(),
            Some("false")
        );
        assert!(!load_toggle(&backend, "devColumnToggleChecked"));

        save_toggle(&mut backend, "devColumnToggleChecked", true).unwrap();
        assert!(load_toggle(&backend, "devColumnToggleChecked"));
    }
}
