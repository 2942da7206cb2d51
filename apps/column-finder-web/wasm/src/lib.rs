//! Column Finder page agent
//!
//! A floating panel that catalogues the column headers of the active board,
//! keeps one snapshot per board in `localStorage`, and offers search, export
//! and click-to-copy on the collected ids.

use board_core::FinderConfig;
use shared_dom::singleton;
use wasm_bindgen::prelude::*;

pub mod app;
pub mod cells;
pub mod clipboard;
pub mod download;
pub mod navigation;
pub mod panel;

pub use app::FinderApp;

/// Page-global name the live instance is published under
pub const INSTANCE_NAME: &str = "MondayColumnFinderInstance";

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    shared_dom::logging::init("column-finder");

    if let Err(e) = launch() {
        tracing::error!(error = ?e, "Column Finder failed to start");
    }
}

/// Replace any running instance with a fresh one
#[wasm_bindgen]
pub fn launch() -> Result<(), JsValue> {
    if singleton::destroy_previous(INSTANCE_NAME)? {
        tracing::info!("Previous Column Finder destroyed");
    }
    FinderApp::start(FinderConfig::default())
}

/// Tear down the running instance, persisting the active board first
#[wasm_bindgen]
pub fn destroy() -> Result<bool, JsValue> {
    singleton::destroy_previous(INSTANCE_NAME)
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
