//! Board column lookup and id annotation
//!
//! Target-independent core for the two page agents:
//! - the Column Finder (board-scoped column catalogue with search and export)
//! - the Inline Annotator (id badges on headers, cards and item rows)
//!
//! DOM access goes through the `HeaderCell` and `BadgeDom` traits and
//! storage through `KeyValueStore`, so everything here runs in host tests.

pub mod annotate;
pub mod board;
pub mod config;
pub mod error;
pub mod export;
pub mod finder;
pub mod record;
pub mod scan;
pub mod search;
pub mod store;

pub use annotate::{
    sweep, sweep_all, strip_all, AnnotatorState, BadgeDom, BadgeKind, StripReport, SweepReport,
    Transition, POSITIONED_ATTRIBUTE,
};
pub use board::{BoardId, BoardTransition};
pub use config::{AnnotatorConfig, FinderConfig};
pub use error::{BoardError, Result};
pub use export::{export_filename, ExportDocument};
pub use finder::ColumnFinder;
pub use record::{BoardSnapshot, ColumnMap, ColumnRecord, StoredBoard, StoredColumn};
pub use scan::{HeaderCell, ScanOutcome};
pub use store::{load_toggle, save_toggle, BoardStore, KeyValueStore, MemoryStore};
