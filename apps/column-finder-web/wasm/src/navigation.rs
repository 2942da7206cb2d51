//! Single-page navigation detection
//!
//! The host app switches boards without page loads and without reliable
//! history events, so the address is sampled on a timer and also shortly
//! after any structural change to `<body>`. Either trigger may fire first.

use board_core::FinderConfig;
use shared_dom::{page, Debounce, Interval};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MutationObserver, MutationObserverInit};

pub struct NavigationWatch {
    _poll: Interval,
    observer: MutationObserver,
    _on_mutation: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
    settle: Rc<Debounce>,
}

impl NavigationWatch {
    /// Call `check` every `url_poll_ms` and `navigation_settle_ms` after
    /// the last burst of body mutations.
    pub fn start(config: &FinderConfig, check: impl Fn() + 'static) -> Result<Self, JsValue> {
        let check = Rc::new(check);

        let poll_check = check.clone();
        let poll = Interval::new(config.url_poll_ms, move || poll_check())?;

        let settle = Rc::new(Debounce::new(config.navigation_settle_ms, move || check())?);
        let pending = Rc::downgrade(&settle);
        let on_mutation = Closure::wrap(Box::new(move |_: js_sys::Array, _: MutationObserver| {
            if let Some(settle) = pending.upgrade() {
                settle.trigger();
            }
        }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

        let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref())?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        let body = page::body()?;
        observer.observe_with_options(&body, &options)?;

        Ok(Self {
            _poll: poll,
            observer,
            _on_mutation: on_mutation,
            settle,
        })
    }
}

impl Drop for NavigationWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
        self.settle.cancel();
    }
}
