//! Inline Annotator page agent
//!
//! Adds a "Show column IDs" checkbox to the board toolbar and, while it is
//! checked, keeps small id badges on column headers, pulse cards and item
//! rows as the page re-renders.

use board_core::AnnotatorConfig;
use shared_dom::singleton;
use wasm_bindgen::prelude::*;

pub mod annotator;
pub mod bootstrap;
pub mod dom;
pub mod observers;
pub mod toggle;

pub use annotator::Annotator;
pub use dom::PageDom;

/// Page-global name the live instance is published under
pub const INSTANCE_NAME: &str = "MondayIdAnnotatorInstance";

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    shared_dom::logging::init("id-annotator");

    if let Err(e) = launch() {
        tracing::error!(error = ?e, "Annotator failed to start");
    }
}

/// Replace any running instance and schedule a fresh start
#[wasm_bindgen]
pub fn launch() -> Result<(), JsValue> {
    if singleton::destroy_previous(INSTANCE_NAME)? {
        tracing::info!("Previous annotator destroyed");
    }
    singleton::publish(INSTANCE_NAME, bootstrap::shutdown)?;
    bootstrap::schedule(AnnotatorConfig::default())
}

/// Stop observing and strip every badge
#[wasm_bindgen]
pub fn destroy() -> Result<bool, JsValue> {
    singleton::destroy_previous(INSTANCE_NAME)
}
