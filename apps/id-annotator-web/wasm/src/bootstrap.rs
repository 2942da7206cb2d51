//! Deferred start-up
//!
//! The host app renders its toolbar well after DOM ready, so start-up
//! waits for DOM ready, then a fixed delay, then an idle slot.

use crate::annotator::{self, Annotator};
use board_core::AnnotatorConfig;
use js_sys::Reflect;
use shared_dom::{page, EventListener, Timeout};
use std::cell::RefCell;
use tracing::error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

thread_local! {
    static READY: RefCell<Option<EventListener>> = const { RefCell::new(None) };
    static DELAY: RefCell<Option<Timeout>> = const { RefCell::new(None) };
}

pub fn schedule(config: AnnotatorConfig) -> Result<(), JsValue> {
    let document = page::document()?;
    if document.ready_state() != "loading" {
        return delay_start(config);
    }

    let listener = EventListener::new(&document, "DOMContentLoaded", move |_| {
        if let Err(e) = delay_start(config.clone()) {
            error!(error = ?e, "Could not schedule annotator start");
        }
    })?;
    READY.with(|slot| *slot.borrow_mut() = Some(listener));
    Ok(())
}

fn delay_start(config: AnnotatorConfig) -> Result<(), JsValue> {
    let timeout = Timeout::new(config.startup_delay_ms, move || run_when_idle(config))?;
    DELAY.with(|slot| *slot.borrow_mut() = Some(timeout));
    Ok(())
}

fn run_when_idle(config: AnnotatorConfig) {
    let task = Closure::once_into_js(move || {
        if let Err(e) = Annotator::start(config) {
            error!(error = ?e, "Annotator start failed");
        }
    });

    let scheduled = page::window().and_then(|window| {
        if Reflect::has(&window, &"requestIdleCallback".into())? {
            window.request_idle_callback(task.unchecked_ref()).map(drop)
        } else {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(task.unchecked_ref(), 0)
                .map(drop)
        }
    });
    if let Err(e) = scheduled {
        error!(error = ?e, "Could not schedule annotator start");
    }
}

/// Cancel a pending start and tear down a running annotator
pub fn shutdown() {
    READY.with(|slot| slot.borrow_mut().take());
    DELAY.with(|slot| slot.borrow_mut().take());
    if let Some(annotator) = annotator::take_instance() {
        annotator.borrow_mut().destroy();
    }
}
