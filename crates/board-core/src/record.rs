//! Column records and their persisted form
//!
//! `ColumnMap` keeps insertion order so that ranking ties fall back to the
//! order in which columns were discovered. The stored JSON object keeps
//! that order too (see `StoredBoard`).

use crate::board::BoardId;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// One known column of a board
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRecord {
    pub id: String,
    pub name: String,
    /// Milliseconds since the Unix epoch
    pub last_seen: u64,
}

impl ColumnRecord {
    /// A name is usable when it is non-empty and is not the raw id echoed
    /// back by the page.
    pub fn is_valid_name(id: &str, name: &str) -> bool {
        !name.is_empty() && name != id
    }
}

/// Insertion-ordered mapping of column id to record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    records: Vec<ColumnRecord>,
    index: HashMap<String, usize>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ColumnRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnRecord> {
        self.records.iter()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    /// Insert or refresh a column. Returns `true` when the id was unseen.
    pub fn upsert(&mut self, id: &str, name: &str, last_seen: u64) -> bool {
        if let Some(&i) = self.index.get(id) {
            let record = &mut self.records[i];
            record.name = name.to_string();
            record.last_seen = last_seen;
            return false;
        }

        self.index.insert(id.to_string(), self.records.len());
        self.records.push(ColumnRecord {
            id: id.to_string(),
            name: name.to_string(),
            last_seen,
        });
        true
    }

    /// Persisted form, every entry tagged with its owning board
    pub fn to_stored(&self, board: &BoardId) -> StoredBoard {
        StoredBoard(
            self.records
                .iter()
                .map(|record| {
                    (
                        record.id.clone(),
                        StoredColumn {
                            name: record.name.clone(),
                            last_seen: record.last_seen,
                            board_id: Some(board.to_string()),
                        },
                    )
                })
                .collect(),
        )
    }

    /// Rebuild from the persisted form.
    ///
    /// Entries whose name breaks the record invariant are dropped; the
    /// second element of the tuple counts them.
    pub fn from_stored(stored: StoredBoard) -> (Self, usize) {
        let mut map = Self::new();
        let mut dropped = 0;
        for (id, column) in stored.0 {
            if ColumnRecord::is_valid_name(&id, &column.name) {
                map.upsert(&id, &column.name, column.last_seen);
            } else {
                dropped += 1;
            }
        }
        (map, dropped)
    }
}

impl<'a> IntoIterator for &'a ColumnMap {
    type Item = &'a ColumnRecord;
    type IntoIter = std::slice::Iter<'a, ColumnRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Persisted snapshot of a single board
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub board_id: BoardId,
    pub columns: ColumnMap,
}

/// Value stored per column: `{ name, lastSeen, boardId }`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredColumn {
    pub name: String,
    pub last_seen: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
}

impl StoredColumn {
    /// Read one stored entry leniently.
    ///
    /// Only a string `name` is required. A missing or non-integer
    /// `lastSeen` reads as 0 and a non-string `boardId` as absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        let entry = value.as_object()?;
        let name = entry.get("name")?.as_str()?.to_string();
        Some(StoredColumn {
            name,
            last_seen: entry.get("lastSeen").and_then(Value::as_u64).unwrap_or(0),
            board_id: entry
                .get("boardId")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

/// JSON object mapping column id to `StoredColumn`, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredBoard(pub Vec<(String, StoredColumn)>);

impl StoredBoard {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for StoredBoard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, column) in &self.0 {
            map.serialize_entry(id, column)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StoredBoard {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StoredBoardVisitor)
    }
}

struct StoredBoardVisitor;

impl<'de> Visitor<'de> for StoredBoardVisitor {
    type Value = StoredBoard;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping column ids to column entries")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut raw: Vec<(String, Value)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        let mut index: HashMap<String, usize> = HashMap::new();

        while let Some((id, value)) = access.next_entry::<String, Value>()? {
            // Duplicate keys: last one wins, same as JSON.parse
            match index.get(&id) {
                Some(&i) => raw[i].1 = value,
                None => {
                    index.insert(id.clone(), raw.len());
                    raw.push((id, value));
                }
            }
        }

        let entries = raw
            .into_iter()
            .filter_map(|(id, value)| match StoredColumn::from_value(&value) {
                Some(column) => Some((id, column)),
                None => {
                    warn!(column_id = %id, "Skipping malformed stored column");
                    None
                }
            })
            .collect();

        Ok(StoredBoard(entries))
    }
}
