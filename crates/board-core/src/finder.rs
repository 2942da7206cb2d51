//! Column Finder state: active board, its in-memory columns, persistence
//!
//! Everything here is target independent. The wasm app feeds it page
//! addresses and header cells and renders what comes back.

use crate::board::{BoardId, BoardTransition};
use crate::config::FinderConfig;
use crate::error::Result;
use crate::export::ExportDocument;
use crate::record::{BoardSnapshot, ColumnMap, ColumnRecord};
use crate::scan::{scan_headers, HeaderCell, ScanOutcome};
use crate::search;
use crate::store::{BoardStore, KeyValueStore};
use tracing::{debug, info, warn};

pub struct ColumnFinder<S> {
    store: BoardStore<S>,
    board: Option<BoardId>,
    columns: ColumnMap,
}

impl<S: KeyValueStore> ColumnFinder<S> {
    /// Start on whatever board `url` points at, loading its snapshot
    pub fn new(backend: S, config: &FinderConfig, url: &str) -> Self {
        let mut finder = Self {
            store: BoardStore::new(backend, config),
            board: BoardId::from_url(url),
            columns: ColumnMap::new(),
        };
        finder.load_active();
        finder
    }

    pub fn board(&self) -> Option<&BoardId> {
        self.board.as_ref()
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn store(&self) -> &BoardStore<S> {
        &self.store
    }

    fn load_active(&mut self) {
        self.columns = match &self.board {
            Some(board) => self.store.load(board).unwrap_or_else(|| {
                info!(board_id = %board, "New board, nothing stored yet");
                ColumnMap::new()
            }),
            None => ColumnMap::new(),
        };
    }

    /// React to a page address. Returns the transition when the board
    /// changed.
    ///
    /// The outgoing board is persisted before its columns are dropped.
    pub fn observe_url(&mut self, url: &str) -> Option<BoardTransition> {
        let next = BoardId::from_url(url);
        if next == self.board {
            return None;
        }

        if let Some(previous) = &self.board {
            if !self.columns.is_empty() {
                if let Err(e) = self.store.save(previous, &self.columns) {
                    warn!(board_id = %previous, error = %e, "Could not save outgoing board");
                }
            }
        }

        let transition = BoardTransition {
            from: self.board.take(),
            to: next.clone(),
        };
        info!(from = ?transition.from, to = ?transition.to, "Board changed");

        self.columns.clear();
        self.board = next;
        self.load_active();
        Some(transition)
    }

    /// One scan pass over `headers`.
    ///
    /// Returns `None` without touching anything when no board is active.
    /// New columns are written through to storage immediately.
    pub fn scan<H, I>(&mut self, headers: I, now: u64) -> Option<ScanOutcome>
    where
        H: HeaderCell,
        I: IntoIterator<Item = H>,
    {
        let board = self.board.as_ref()?;
        let outcome = scan_headers(headers, &mut self.columns, now);

        if outcome.new > 0 {
            if let Err(e) = self.store.save(board, &self.columns) {
                warn!(board_id = %board, error = %e, "Could not save scan results");
            }
        }
        debug!(board_id = %board, found = outcome.found, new = outcome.new, "Scan complete");
        Some(outcome)
    }

    pub fn search(&self, query: &str) -> Vec<&ColumnRecord> {
        search::search(&self.columns, query)
    }

    /// Forget the active board, in storage and in memory
    pub fn clear_current(&mut self) -> Result<()> {
        if let Some(board) = &self.board {
            self.store.clear(board)?;
            info!(board_id = %board, "Board cleared");
        }
        self.columns.clear();
        Ok(())
    }

    /// Every persisted board plus the unsaved active one.
    ///
    /// Boards saved this session but missing from the backend (a failed
    /// or foreign write) are taken from the saved cache.
    pub fn export(&self) -> ExportDocument {
        let mut boards = self.store.list_all();
        for (board, columns) in self.store.saved_boards() {
            if !boards.iter().any(|snapshot| &snapshot.board_id == board) {
                boards.push(BoardSnapshot {
                    board_id: board.clone(),
                    columns: columns.clone(),
                });
            }
        }

        let active = self.board.as_ref().map(|board| (board, &self.columns));
        ExportDocument::build(boards, active)
    }

    /// Persist the active board if it holds anything
    pub fn flush(&mut self) -> Result<()> {
        match &self.board {
            Some(board) if !self.columns.is_empty() => self.store.save(board, &self.columns),
            _ => Ok(()),
        }
    }
}
