//! The running Column Finder: core state, panel and schedulers wired
//! together.

use crate::navigation::NavigationWatch;
use crate::panel::{self, Panel, CLEARED_TEXT, RESULT_ITEM_CLASS};
use crate::{cells, clipboard, download, INSTANCE_NAME};
use board_core::{export_filename, ColumnFinder, FinderConfig};
use shared_dom::{page, singleton, EventListener, Interval, LocalStorage, Timeout};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, MouseEvent};

thread_local! {
    static INSTANCE: RefCell<Option<Rc<RefCell<FinderApp>>>> = const { RefCell::new(None) };
}

pub struct FinderApp {
    me: Weak<RefCell<FinderApp>>,
    config: FinderConfig,
    finder: ColumnFinder<LocalStorage>,
    panel: Panel,
    scanning: bool,
    drag_offset: Option<(f64, f64)>,
    scan_timer: Option<Interval>,
    rescan: Option<Timeout>,
    navigation: Option<NavigationWatch>,
    listeners: Vec<EventListener>,
}

impl FinderApp {
    /// Build the panel, start scanning and publish the instance
    pub fn start(config: FinderConfig) -> Result<(), JsValue> {
        let document = page::document()?;
        let storage = LocalStorage::open()?;
        let url = page::current_url()?;
        let finder = ColumnFinder::new(storage, &config, &url);
        let panel = Panel::build(&document)?;

        let app = Rc::new_cyclic(|me| {
            RefCell::new(FinderApp {
                me: me.clone(),
                config,
                finder,
                panel,
                scanning: false,
                drag_offset: None,
                scan_timer: None,
                rescan: None,
                navigation: None,
                listeners: Vec::new(),
            })
        });

        INSTANCE.with(|slot| *slot.borrow_mut() = Some(app.clone()));
        singleton::publish(INSTANCE_NAME, || {
            if let Some(app) = INSTANCE.with(|slot| slot.borrow_mut().take()) {
                app.borrow_mut().destroy();
            }
        })?;

        let mut this = app.borrow_mut();
        if let Err(e) = this.activate() {
            this.destroy();
            INSTANCE.with(|slot| slot.borrow_mut().take());
            return Err(e);
        }

        info!(
            board_id = ?this.finder.board().map(|board| board.as_str()),
            "Column Finder active"
        );
        Ok(())
    }

    fn activate(&mut self) -> Result<(), JsValue> {
        self.bind_events()?;
        self.refresh_board_info();
        self.render_results();

        self.panel.set_status("Starting scanner...", true);
        self.scan();

        let me = self.me.clone();
        self.scan_timer = Some(Interval::new(self.config.scan_interval_ms, move || {
            with_app(&me, FinderApp::scan)
        })?);

        let me = self.me.clone();
        self.navigation = Some(NavigationWatch::start(&self.config, move || {
            with_app(&me, FinderApp::check_board)
        })?);
        Ok(())
    }

    fn bind_events(&mut self) -> Result<(), JsValue> {
        let document = page::document()?;

        let me = self.me.clone();
        self.listen(&self.panel.search.clone(), "input", move |_| {
            with_app(&me, FinderApp::render_results)
        })?;

        let me = self.me.clone();
        self.listen(&self.panel.scan_button.clone(), "click", move |_| {
            with_app(&me, FinderApp::force_rescan)
        })?;

        let me = self.me.clone();
        self.listen(&self.panel.export_button.clone(), "click", move |_| {
            with_app(&me, FinderApp::export_all)
        })?;

        let me = self.me.clone();
        self.listen(&self.panel.clear_button.clone(), "click", move |_| {
            with_app(&me, FinderApp::clear_current)
        })?;

        let me = self.me.clone();
        self.listen(&self.panel.toggler().clone(), "click", move |_| {
            with_app(&me, |app| app.panel.toggle_visible())
        })?;

        let me = self.me.clone();
        self.listen(&self.panel.minimize.clone(), "click", move |event| {
            event.stop_propagation();
            with_app(&me, |app| app.panel.toggle_visible())
        })?;

        let me = self.me.clone();
        self.listen(&self.panel.results.clone(), "click", move |event| {
            let id = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .and_then(|target| target.closest(&format!(".{}", RESULT_ITEM_CLASS)).ok())
                .flatten()
                .and_then(|item| item.get_attribute("data-id"));
            if let Some(id) = id {
                with_app(&me, |app| app.copy_id(id))
            }
        })?;

        // Drag: document-level move/up stay installed and act only while
        // a drag is in progress.
        let me = self.me.clone();
        self.listen(&self.panel.handle.clone(), "mousedown", move |event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                let (x, y) = (f64::from(mouse.client_x()), f64::from(mouse.client_y()));
                with_app(&me, |app| app.drag_offset = Some(app.panel.drag_offset(x, y)));
                event.prevent_default();
            }
        })?;

        let me = self.me.clone();
        self.listen(&document, "mousemove", move |event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                let (x, y) = (f64::from(mouse.client_x()), f64::from(mouse.client_y()));
                with_app(&me, |app| app.drag_to(x, y));
            }
        })?;

        let me = self.me.clone();
        self.listen(&document, "mouseup", move |_| {
            with_app(&me, |app| app.drag_offset = None)
        })?;

        let me = self.me.clone();
        let window = page::window()?;
        self.listen(&window, "beforeunload", move |_| {
            with_app(&me, FinderApp::persist)
        })?;

        Ok(())
    }

    fn listen(
        &mut self,
        target: &web_sys::EventTarget,
        event: &'static str,
        f: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        self.listeners.push(EventListener::new(target, event, f)?);
        Ok(())
    }

    /// One scan pass. A pass already running, or no active board, makes
    /// this a no-op.
    pub fn scan(&mut self) {
        if self.scanning || self.finder.board().is_none() {
            return;
        }
        self.scanning = true;
        self.panel.set_status("Scanning...", true);

        let cells = match page::document().and_then(|document| cells::header_cells(&document)) {
            Ok(cells) => cells,
            Err(e) => {
                error!(error = ?e, "Header lookup failed");
                self.panel.set_status("Scan failed", false);
                self.scanning = false;
                return;
            }
        };

        if let Some(outcome) = self.finder.scan(cells, page::now_ms()) {
            self.panel.set_status(
                &format!(
                    "{} columns ({} new)",
                    self.finder.columns().len(),
                    outcome.new
                ),
                false,
            );
        }
        self.refresh_board_info();
        self.render_results();
        self.scanning = false;
    }

    pub fn force_rescan(&mut self) {
        debug!("Forced rescan");
        self.scan();
    }

    /// Follow the page address; on a board switch reload state and schedule
    /// a rescan once the new board has rendered.
    pub fn check_board(&mut self) {
        let url = match page::current_url() {
            Ok(url) => url,
            Err(e) => {
                warn!(error = ?e, "Could not read page address");
                return;
            }
        };
        let Some(transition) = self.finder.observe_url(&url) else {
            return;
        };

        let name = transition
            .to
            .as_ref()
            .map(|board| board.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        self.panel.set_status(&format!("Board changed: {}", name), false);
        self.refresh_board_info();
        self.render_results();

        let me = self.me.clone();
        match Timeout::new(self.config.rescan_delay_ms, move || {
            with_app(&me, FinderApp::force_rescan)
        }) {
            Ok(timeout) => self.rescan = Some(timeout),
            Err(e) => warn!(error = ?e, "Could not schedule rescan"),
        }
    }

    pub fn render_results(&mut self) {
        let query = self.panel.query();
        let results = self.finder.search(&query);
        if let Err(e) = self.panel.show_results(&results) {
            warn!(error = ?e, "Could not render results");
        }
    }

    fn refresh_board_info(&self) {
        self.panel
            .set_board_info(self.finder.board(), self.finder.columns().len());
    }

    pub fn clear_current(&mut self) {
        if let Err(e) = self.finder.clear_current() {
            warn!(error = %e, "Could not remove stored board");
        }
        self.panel.clear_query();
        if let Err(e) = self.panel.show_message(CLEARED_TEXT) {
            warn!(error = ?e, "Could not render results");
        }
        self.panel.set_status("Current board cleared", false);
        self.refresh_board_info();
    }

    pub fn export_all(&mut self) {
        let export = self.finder.export();
        let json = match export.to_json_pretty() {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "Export serialization failed");
                return;
            }
        };
        let filename = export_filename(page::today_utc().unwrap_or_default());

        match download::save_json(&filename, &json) {
            Ok(()) => info!(boards = export.board_count(), %filename, "Exported boards"),
            Err(e) => error!(error = ?e, "Export download failed"),
        }
    }

    fn copy_id(&self, id: String) {
        let notification_ms = self.config.notification_ms;
        wasm_bindgen_futures::spawn_local(async move {
            match clipboard::copy_text(&id).await {
                Ok(method) => {
                    info!(column_id = %id, ?method, "Copied column id");
                    let shown = page::document().and_then(|document| {
                        panel::notify(&document, &format!("ID copied: {}", id), notification_ms)
                    });
                    if let Err(e) = shown {
                        warn!(error = ?e, "Could not show copy notification");
                    }
                }
                Err(e) => error!(error = ?e, "Copy failed"),
            }
        });
    }

    /// Write the active board through, whatever the last scan reported
    pub fn persist(&mut self) {
        if let Err(e) = self.finder.flush() {
            warn!(error = %e, "Could not save board on unload");
        }
    }

    fn drag_to(&mut self, client_x: f64, client_y: f64) {
        let Some((dx, dy)) = self.drag_offset else {
            return;
        };
        if let Err(e) = self.panel.move_to(client_x - dx, client_y - dy) {
            warn!(error = ?e, "Could not move panel");
        }
    }

    /// Persist, stop every scheduler and observer, then remove the UI
    pub fn destroy(&mut self) {
        if let Err(e) = self.finder.flush() {
            warn!(error = %e, "Could not save board on shutdown");
        }

        self.scan_timer = None;
        self.rescan = None;
        self.navigation = None;
        self.listeners.clear();
        self.drag_offset = None;

        self.panel.remove();
        if let Err(e) = singleton::unpublish(INSTANCE_NAME) {
            warn!(error = ?e, "Could not clear page handle");
        }
        info!("Column Finder stopped, data saved");
    }
}

/// Run `f` on the live app, skipping the call if the app is gone or busy
fn with_app(me: &Weak<RefCell<FinderApp>>, f: impl FnOnce(&mut FinderApp)) {
    if let Some(app) = me.upgrade() {
        if let Ok(mut app) = app.try_borrow_mut() {
            f(&mut app);
        }
    }
}
