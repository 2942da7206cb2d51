//! Timer handles tied to Rust ownership
//!
//! Dropping a handle cancels the timer before its closure is freed.

use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// Repeating `setInterval` callback
pub struct Interval {
    window: Window,
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn new(period_ms: u32, f: impl FnMut() + 'static) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let callback = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
        let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            period_ms as i32,
        )?;

        Ok(Self {
            window,
            handle,
            _callback: callback,
        })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.window.clear_interval_with_handle(self.handle);
    }
}

/// One-shot `setTimeout` callback.
///
/// Must not be dropped from inside its own callback; replace it on the
/// next schedule instead.
pub struct Timeout {
    window: Window,
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Timeout {
    pub fn new(delay_ms: u32, f: impl FnOnce() + 'static) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let mut f = Some(f);
        let callback = Closure::wrap(Box::new(move || {
            if let Some(f) = f.take() {
                f();
            }
        }) as Box<dyn FnMut()>);
        let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay_ms as i32,
        )?;

        Ok(Self {
            window,
            handle,
            _callback: callback,
        })
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        self.window.clear_timeout_with_handle(self.handle);
    }
}

/// Trailing-edge debounce: every `trigger` cancels the pending run and
/// schedules a new one `wait_ms` later.
pub struct Debounce {
    window: Window,
    wait_ms: i32,
    pending: Rc<Cell<Option<i32>>>,
    callback: Closure<dyn FnMut()>,
}

impl Debounce {
    pub fn new(wait_ms: u32, mut f: impl FnMut() + 'static) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let pending = Rc::new(Cell::new(None));
        let fired = pending.clone();
        let callback = Closure::wrap(Box::new(move || {
            fired.set(None);
            f();
        }) as Box<dyn FnMut()>);

        Ok(Self {
            window,
            wait_ms: wait_ms as i32,
            pending,
            callback,
        })
    }

    pub fn trigger(&self) {
        self.cancel();
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                self.callback.as_ref().unchecked_ref(),
                self.wait_ms,
            ) {
            Ok(handle) => self.pending.set(Some(handle)),
            Err(e) => tracing::warn!(error = ?e, "Could not schedule debounced call"),
        }
    }

    pub fn cancel(&self) {
        if let Some(handle) = self.pending.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}

impl Drop for Debounce {
    fn drop(&mut self) {
        self.cancel();
    }
}
