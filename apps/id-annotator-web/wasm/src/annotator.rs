//! The running annotator: toggle, observers and badge sweeps

use crate::dom::PageDom;
use crate::observers::Observers;
use crate::toggle;
use board_core::{
    load_toggle, save_toggle, strip_all, sweep, AnnotatorConfig, AnnotatorState, BadgeKind,
    Transition,
};
use shared_dom::{page, EventListener, LocalStorage};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::HtmlInputElement;

thread_local! {
    static INSTANCE: RefCell<Option<Rc<RefCell<Annotator>>>> = const { RefCell::new(None) };
}

pub struct Annotator {
    me: Weak<RefCell<Annotator>>,
    config: AnnotatorConfig,
    state: AnnotatorState,
    dom: PageDom,
    storage: LocalStorage,
    checkbox: HtmlInputElement,
    observers: Option<Observers>,
    listeners: Vec<EventListener>,
}

impl Annotator {
    /// Install the toggle and apply its persisted state.
    ///
    /// Without the host toolbar there is nothing to hang the toggle on, so
    /// the annotator stays idle.
    pub fn start(config: AnnotatorConfig) -> Result<(), JsValue> {
        let dom = PageDom::new()?;
        let Some(checkbox) = toggle::install(dom.document(), &config)? else {
            info!(selector = %config.toolbar_selector, "Toolbar not found, annotator idle");
            return Ok(());
        };

        let storage = LocalStorage::open()?;
        let enabled = load_toggle(&storage, &config.toggle_storage_key);
        checkbox.set_checked(enabled);

        let annotator = Rc::new_cyclic(|me| {
            RefCell::new(Annotator {
                me: me.clone(),
                config,
                state: AnnotatorState::default(),
                dom,
                storage,
                checkbox,
                observers: None,
                listeners: Vec::new(),
            })
        });
        INSTANCE.with(|slot| *slot.borrow_mut() = Some(annotator.clone()));

        let mut this = annotator.borrow_mut();
        if let Err(e) = this.bind_events() {
            this.destroy();
            INSTANCE.with(|slot| slot.borrow_mut().take());
            return Err(e);
        }
        this.set_enabled(enabled);
        info!(enabled, "Annotator ready");
        Ok(())
    }

    fn bind_events(&mut self) -> Result<(), JsValue> {
        let me = self.me.clone();
        self.listeners.push(EventListener::new(&self.checkbox, "change", move |_| {
            with_annotator(&me, Annotator::on_toggle)
        })?);

        let me = self.me.clone();
        let window = page::window()?;
        self.listeners
            .push(EventListener::new(&window, "beforeunload", move |_| {
                with_annotator(&me, |annotator| annotator.set_enabled(false))
            })?);
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    /// Persist the checkbox state, then follow it
    pub fn on_toggle(&mut self) {
        let checked = self.checkbox.checked();
        if let Err(e) = save_toggle(&mut self.storage, &self.config.toggle_storage_key, checked) {
            warn!(error = %e, "Could not persist toggle state");
        }
        self.set_enabled(checked);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match self.state.set_enabled(enabled) {
            Some(Transition::Enable) => self.enable(),
            Some(Transition::Disable) => self.disable(),
            None => {}
        }
    }

    fn enable(&mut self) {
        if let Err(e) = self.dom.install_styles() {
            warn!(error = ?e, "Could not inject badge styles");
        }

        let all = self.me.clone();
        let headers = self.me.clone();
        let attached = Observers::attach(
            &self.config,
            move || with_annotator(&all, Annotator::sweep_all),
            move || with_annotator(&headers, Annotator::sweep_headers),
        );
        match attached {
            Ok(observers) => self.observers = Some(observers),
            Err(e) => {
                error!(error = ?e, "Could not attach observers");
                self.state = AnnotatorState::Disabled;
                return;
            }
        }

        self.sweep_all();
        info!("Annotator enabled");
    }

    /// Observers go first so stripping does not feed them
    fn disable(&mut self) {
        self.observers = None;

        match strip_all(&mut self.dom) {
            Ok(report) => info!(
                badges = report.badges,
                markers = report.markers,
                "Annotator disabled"
            ),
            Err(e) => warn!(error = ?e, "Badge cleanup failed"),
        }
        self.dom.remove_styles();
    }

    pub fn sweep_all(&mut self) {
        if !self.is_enabled() {
            return;
        }
        match board_core::sweep_all(&mut self.dom) {
            Ok(report) if report.attached > 0 || report.deferred > 0 => debug!(
                attached = report.attached,
                deferred = report.deferred,
                "Sweep"
            ),
            Ok(_) => {}
            Err(e) => warn!(error = ?e, "Sweep failed"),
        }
    }

    pub fn sweep_headers(&mut self) {
        if !self.is_enabled() {
            return;
        }
        if let Err(e) = sweep(&mut self.dom, BadgeKind::ColumnHeader) {
            warn!(error = ?e, "Header sweep failed");
        }
    }

    /// Disable and drop every listener; the toggle itself stays on the page
    pub fn destroy(&mut self) {
        self.set_enabled(false);
        self.listeners.clear();
    }
}

/// Detach the live annotator, if any
pub fn take_instance() -> Option<Rc<RefCell<Annotator>>> {
    INSTANCE.with(|slot| slot.borrow_mut().take())
}

/// Run `f` on the live annotator
pub fn with_instance<R>(f: impl FnOnce(&mut Annotator) -> R) -> Option<R> {
    let annotator = INSTANCE.with(|slot| slot.borrow().clone())?;
    let mut annotator = annotator.try_borrow_mut().ok()?;
    Some(f(&mut annotator))
}

fn with_annotator(me: &Weak<RefCell<Annotator>>, f: impl FnOnce(&mut Annotator)) {
    if let Some(annotator) = me.upgrade() {
        if let Ok(mut annotator) = annotator.try_borrow_mut() {
            f(&mut annotator);
        }
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;
    use web_sys::Event;

    wasm_bindgen_test_configure!(run_in_browser);

    const BADGES: &str = ".dev-column-suffix, .dev-pulse-card-suffix, .dev-itemid-suffix";
    const MARKERS: &str = "[data-suffix-added], [data-pulse-id-added], [data-itemid-added]";

    #[wasm_bindgen_test]
    fn test_toggle_cycles_leave_no_badges() {
        let document = page::document().unwrap();
        let config = AnnotatorConfig::default();
        page::window()
            .unwrap()
            .local_storage()
            .unwrap()
            .unwrap()
            .remove_item(&config.toggle_storage_key)
            .unwrap();

        let toolbar = document.create_element("div").unwrap();
        toolbar.set_id("mf-topbar");
        let board = document.create_element("div").unwrap();
        board.set_inner_html(
            r#"<div class="column-header col-identifier-text_9"><div class="title-wrapper">Notes</div></div>
               <div data-testid="item-77"><div class="name-cell-text">Row</div></div>"#,
        );
        let body = page::body().unwrap();
        body.append_child(&toolbar).unwrap();
        body.append_child(&board).unwrap();

        Annotator::start(config.clone()).unwrap();
        assert_eq!(with_instance(|a| a.is_enabled()), Some(true));
        assert_eq!(document.query_selector_all(BADGES).unwrap().length(), 2);

        let checkbox = toolbar
            .query_selector("input.dev-column-toggle")
            .unwrap()
            .unwrap()
            .dyn_into::<HtmlInputElement>()
            .unwrap();
        checkbox.set_checked(false);
        checkbox.dispatch_event(&Event::new("change").unwrap()).unwrap();
        assert_eq!(document.query_selector_all(BADGES).unwrap().length(), 0);
        assert_eq!(document.query_selector_all(MARKERS).unwrap().length(), 0);

        let storage = LocalStorage::open().unwrap();
        assert!(!load_toggle(&storage, &config.toggle_storage_key));

        with_instance(|a| a.set_enabled(true));
        assert_eq!(document.query_selector_all(BADGES).unwrap().length(), 2);

        take_instance().unwrap().borrow_mut().destroy();
        assert_eq!(document.query_selector_all(BADGES).unwrap().length(), 0);
        assert_eq!(document.query_selector_all(MARKERS).unwrap().length(), 0);

        toolbar.remove();
        board.remove();
    }
}
