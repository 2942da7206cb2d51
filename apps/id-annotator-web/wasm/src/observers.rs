//! Change detection while the annotator is enabled
//!
//! A structural observer schedules full sweeps when relevant nodes appear
//! or change class. Headers scrolling into view schedule header sweeps,
//! through an intersection observer when the browser has one and a
//! passive scroll listener otherwise.

use board_core::annotate::{
    is_watched_class_list, INTERSECTION_TARGET_SELECTOR, RELEVANT_SELECTORS,
};
use board_core::AnnotatorConfig;
use js_sys::{Array, Reflect};
use shared_dom::{page, Debounce, EventListener};
use std::rc::Rc;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    MutationObserver, MutationObserverInit, MutationRecord,
};

type MutationCallback = Closure<dyn FnMut(Array, MutationObserver)>;
type IntersectionCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// True when an added node is, or contains, something worth badging
pub fn node_is_relevant(element: &Element) -> bool {
    RELEVANT_SELECTORS.iter().any(|selector| {
        element.matches(selector).unwrap_or(false)
            || matches!(element.query_selector(selector), Ok(Some(_)))
    })
}

fn record_is_relevant(record: &MutationRecord) -> bool {
    match record.type_().as_str() {
        "childList" => page::elements(&record.added_nodes())
            .iter()
            .any(node_is_relevant),
        "attributes" => {
            record.attribute_name().as_deref() == Some("class")
                && record
                    .target()
                    .and_then(|target| target.dyn_into::<Element>().ok())
                    .map(|target| is_watched_class_list(page::class_names(&target)))
                    .unwrap_or(false)
        }
        _ => false,
    }
}

/// True when any record in a mutation batch warrants a sweep
pub fn batch_is_relevant(records: &Array) -> bool {
    records
        .iter()
        .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
        .any(|record| record_is_relevant(&record))
}

enum HeaderWatch {
    Intersection {
        observer: IntersectionObserver,
        _on_entries: IntersectionCallback,
        registrar: MutationObserver,
        _on_added: MutationCallback,
    },
    Scroll(EventListener),
}

impl HeaderWatch {
    fn start(config: &AnnotatorConfig, sweep_headers: Rc<Debounce>) -> Result<Self, JsValue> {
        let window = page::window()?;
        if !Reflect::has(&window, &"IntersectionObserver".into())? {
            debug!("IntersectionObserver missing, watching scroll instead");
            let listener = EventListener::passive(&window, "scroll", move |_| sweep_headers.trigger())?;
            return Ok(HeaderWatch::Scroll(listener));
        }

        let on_entries = Closure::wrap(Box::new(move |entries: Array, _: IntersectionObserver| {
            let visible = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .any(|entry| entry.is_intersecting());
            if visible {
                sweep_headers.trigger();
            }
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let options = IntersectionObserverInit::new();
        options.set_root_margin(&config.intersection_root_margin);
        let observer =
            IntersectionObserver::new_with_options(on_entries.as_ref().unchecked_ref(), &options)?;
        observe_headers(&observer);

        // Headers rendered later get registered as they appear
        let target = observer.clone();
        let on_added = Closure::wrap(Box::new(move |_: Array, _: MutationObserver| {
            observe_headers(&target);
        }) as Box<dyn FnMut(Array, MutationObserver)>);
        let registrar = MutationObserver::new(on_added.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        let body = page::body()?;
        registrar.observe_with_options(&body, &init)?;

        Ok(HeaderWatch::Intersection {
            observer,
            _on_entries: on_entries,
            registrar,
            _on_added: on_added,
        })
    }

    fn disconnect(&self) {
        if let HeaderWatch::Intersection {
            observer, registrar, ..
        } = self
        {
            registrar.disconnect();
            observer.disconnect();
        }
    }
}

fn observe_headers(observer: &IntersectionObserver) {
    let Ok(document) = page::document() else {
        return;
    };
    match page::query_all(&document, INTERSECTION_TARGET_SELECTOR) {
        Ok(headers) => headers.iter().for_each(|header| observer.observe(header)),
        Err(e) => debug!(error = ?e, "Header registration failed"),
    }
}

/// Observers and pending sweeps for one enabled period.
///
/// Dropping it disconnects everything and cancels pending sweeps.
pub struct Observers {
    mutations: MutationObserver,
    _on_mutations: MutationCallback,
    headers: HeaderWatch,
    sweep_all: Rc<Debounce>,
    sweep_headers: Rc<Debounce>,
}

impl Observers {
    pub fn attach(
        config: &AnnotatorConfig,
        sweep_all: impl FnMut() + 'static,
        sweep_headers: impl FnMut() + 'static,
    ) -> Result<Self, JsValue> {
        let sweep_all = Rc::new(Debounce::new(config.debounce_ms, sweep_all)?);
        let sweep_headers = Rc::new(Debounce::new(config.debounce_ms, sweep_headers)?);

        let pending = Rc::downgrade(&sweep_all);
        let on_mutations = Closure::wrap(Box::new(move |records: Array, _: MutationObserver| {
            if !batch_is_relevant(&records) {
                return;
            }
            if let Some(sweep) = pending.upgrade() {
                sweep.trigger();
            }
        }) as Box<dyn FnMut(Array, MutationObserver)>);

        let mutations = MutationObserver::new(on_mutations.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        init.set_attributes(true);
        init.set_attribute_filter(&Array::of1(&"class".into()));
        let body = page::body()?;
        mutations.observe_with_options(&body, &init)?;

        let headers = match HeaderWatch::start(config, sweep_headers.clone()) {
            Ok(headers) => headers,
            Err(e) => {
                mutations.disconnect();
                return Err(e);
            }
        };
        debug!("Observers attached");

        Ok(Self {
            mutations,
            _on_mutations: on_mutations,
            headers,
            sweep_all,
            sweep_headers,
        })
    }
}

impl Drop for Observers {
    fn drop(&mut self) {
        self.mutations.disconnect();
        self.headers.disconnect();
        self.sweep_all.cancel();
        self.sweep_headers.cancel();
        debug!("Observers detached");
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn element(html: &str) -> Element {
        let holder = page::document().unwrap().create_element("div").unwrap();
        holder.set_inner_html(html);
        holder.first_element_child().unwrap()
    }

    #[wasm_bindgen_test]
    fn test_relevance_of_added_nodes() {
        assert!(node_is_relevant(&element(r#"<div class="column-header"></div>"#)));
        assert!(node_is_relevant(&element(
            r#"<section><div class="pulse-card-row"></div></section>"#
        )));
        assert!(node_is_relevant(&element(r#"<div data-testid="item-42"></div>"#)));
        assert!(!node_is_relevant(&element(r#"<div class="toolbar"></div>"#)));
        assert!(!node_is_relevant(&element(r#"<span data-testid="item-42"></span>"#)));
    }
}
