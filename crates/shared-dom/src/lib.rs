//! Browser glue shared by the page agents
//!
//! Console logging, `localStorage`, timers and page-global bookkeeping on
//! top of `web-sys`.

pub mod events;
pub mod logging;
pub mod page;
pub mod singleton;
pub mod storage;
pub mod timer;

pub use events::EventListener;
pub use storage::LocalStorage;
pub use timer::{Debounce, Interval, Timeout};
