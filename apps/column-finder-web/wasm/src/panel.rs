//! Floating panel markup and its view updates
//!
//! The skeleton is static markup; everything derived from the page (board
//! ids, column names) goes in through `set_text_content`.

use board_core::{BoardId, ColumnRecord};
use shared_dom::page;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

pub const PANEL_ID: &str = "mondayColumnFinder";
pub const TOGGLER_ID: &str = "mondayFinderToggler";
pub const STYLE_ID: &str = "mondayColumnFinderStyles";

pub const RESULT_ITEM_CLASS: &str = "mondayFinderResultItem";
const RESULT_NAME_CLASS: &str = "mondayFinderResultName";
const RESULT_ID_CLASS: &str = "mondayFinderResultId";
const NO_RESULTS_CLASS: &str = "mondayFinderNoResults";
const SCANNING_CLASS: &str = "mondayFinderScanning";

pub const NO_RESULTS_TEXT: &str = "No columns found";
pub const CLEARED_TEXT: &str = "Board cleared";

const PANEL_HTML: &str = r#"
<div id="mondayFinderDragHandle">🔍 Monday Column Finder<button id="mondayFinderMinimizeBtn" title="Minimize">−</button></div>
<div id="mondayFinderContent">
    <div id="mondayFinderBoardInfo"></div>
    <div id="mondayFinderControls">
        <button id="mondayFinderScanBtn" class="mondayFinderBtn mondayFinderBtnPrimary">Scan</button>
        <button id="mondayFinderExportBtn" class="mondayFinderBtn mondayFinderBtnSecondary">Export All</button>
        <button id="mondayFinderClearBtn" class="mondayFinderBtn mondayFinderBtnDanger">Clear</button>
    </div>
    <input type="text" id="mondayFinderSearch" placeholder="Search by column name or ID..." />
    <div id="mondayFinderStatus">Starting...</div>
    <div id="mondayFinderResults"></div>
</div>
"#;

const PANEL_CSS: &str = r#"
#mondayColumnFinder {
    position: fixed !important;
    top: 50px;
    right: 20px;
    width: 380px !important;
    max-height: 600px !important;
    background: white !important;
    border-radius: 8px !important;
    box-shadow: 0 4px 12px rgba(0, 0, 0, 0.15) !important;
    z-index: 999999 !important;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif !important;
    border: 2px solid #0073ea !important;
}
#mondayColumnFinder * { box-sizing: border-box !important; }
#mondayFinderDragHandle {
    background: linear-gradient(135deg, #0073ea, #005bb5) !important;
    color: white !important;
    padding: 12px !important;
    cursor: move !important;
    border-radius: 6px 6px 0 0 !important;
    font-weight: 600 !important;
    text-align: center !important;
    user-select: none !important;
    font-size: 14px !important;
    position: relative !important;
}
#mondayFinderMinimizeBtn {
    position: absolute !important;
    top: 8px !important;
    right: 8px !important;
    width: 24px !important;
    height: 24px !important;
    line-height: 24px !important;
    border: none !important;
    background: transparent !important;
    color: #fff !important;
    font-size: 18px !important;
    cursor: pointer !important;
    padding: 0 !important;
}
#mondayFinderContent { padding: 16px !important; }
#mondayFinderBoardInfo {
    background: #f0f4ff !important;
    border: 1px solid #b3d4ff !important;
    border-radius: 4px !important;
    padding: 8px !important;
    margin-bottom: 12px !important;
    font-size: 12px !important;
    color: #0056b3 !important;
}
#mondayFinderSearch {
    width: 100% !important;
    padding: 10px !important;
    border: 2px solid #e1e5e9 !important;
    border-radius: 6px !important;
    font-size: 14px !important;
    margin-bottom: 12px !important;
    outline: none !important;
}
#mondayFinderSearch:focus { border-color: #0073ea !important; }
#mondayFinderStatus {
    font-size: 12px !important;
    color: #666 !important;
    margin-bottom: 12px !important;
    padding: 8px !important;
    background: #f8f9fa !important;
    border-radius: 4px !important;
}
#mondayFinderResults {
    max-height: 300px !important;
    overflow-y: auto !important;
    border: 1px solid #e1e5e9 !important;
    border-radius: 6px !important;
    background: #fafbfc !important;
}
.mondayFinderResultItem {
    padding: 10px !important;
    border-bottom: 1px solid #e1e5e9 !important;
    cursor: pointer !important;
}
.mondayFinderResultItem:last-child { border-bottom: none !important; }
.mondayFinderResultItem:hover { background-color: #e8f4fd !important; }
.mondayFinderResultName {
    font-weight: 500 !important;
    color: #333 !important;
    margin-bottom: 4px !important;
    font-size: 14px !important;
}
.mondayFinderResultId {
    font-size: 12px !important;
    color: #666 !important;
    font-family: monospace !important;
    background: #f1f3f4 !important;
    padding: 2px 6px !important;
    border-radius: 3px !important;
    display: inline-block !important;
}
.mondayFinderNoResults {
    padding: 20px !important;
    text-align: center !important;
    color: #999 !important;
    font-style: italic !important;
}
#mondayFinderControls {
    display: flex !important;
    gap: 6px !important;
    margin-bottom: 12px !important;
    flex-wrap: wrap !important;
}
.mondayFinderBtn {
    padding: 6px 10px !important;
    border: none !important;
    border-radius: 4px !important;
    cursor: pointer !important;
    font-size: 11px !important;
}
.mondayFinderBtnPrimary { background: #0073ea !important; color: white !important; }
.mondayFinderBtnPrimary:hover { background: #005bb5 !important; }
.mondayFinderBtnSecondary { background: #e1e5e9 !important; color: #333 !important; }
.mondayFinderBtnSecondary:hover { background: #d1d5d9 !important; }
.mondayFinderBtnDanger { background: #dc3545 !important; color: white !important; }
.mondayFinderBtnDanger:hover { background: #c82333 !important; }
.mondayFinderScanning { animation: mondayFinderPulse 1.5s ease-in-out infinite !important; }
@keyframes mondayFinderPulse {
    0% { opacity: 1; }
    50% { opacity: 0.7; }
    100% { opacity: 1; }
}
#mondayFinderToggler {
    position: fixed !important;
    bottom: 20px !important;
    right: 20px !important;
    width: 44px !important;
    height: 44px !important;
    border-radius: 22px !important;
    background: #0073ea !important;
    color: white !important;
    display: flex !important;
    align-items: center !important;
    justify-content: center !important;
    box-shadow: 0 4px 12px rgba(0, 0, 0, 0.15) !important;
    cursor: pointer !important;
    z-index: 1000000 !important;
    user-select: none !important;
    font-size: 18px !important;
}
#mondayFinderToggler:hover { background: #005bb5 !important; }
"#;

const NOTIFICATION_CSS: &str = "position: fixed !important; top: 20px !important; \
    left: 50% !important; transform: translateX(-50%) !important; \
    background: #4caf50 !important; color: white !important; \
    padding: 10px 20px !important; border-radius: 6px !important; \
    z-index: 1000000 !important; font-family: Arial, sans-serif !important; \
    box-shadow: 0 4px 12px rgba(0,0,0,0.15) !important;";

/// Clamp a panel's top-left corner so the whole panel stays in the viewport.
///
/// A panel larger than the viewport pins to the top-left edge.
pub fn clamp_position(
    x: f64,
    y: f64,
    viewport: (f64, f64),
    panel: (f64, f64),
) -> (f64, f64) {
    let max_x = viewport.0 - panel.0;
    let max_y = viewport.1 - panel.1;
    (x.min(max_x).max(0.0), y.min(max_y).max(0.0))
}

/// "Board: <id> (<n> columns)"
pub fn board_summary(board: Option<&BoardId>, columns: usize) -> String {
    let name = board.map(BoardId::as_str).unwrap_or("none");
    if columns > 0 {
        format!("📋 Board: {} ({} columns)", name, columns)
    } else {
        format!("📋 Board: {}", name)
    }
}

pub struct Panel {
    document: Document,
    root: HtmlElement,
    toggler: HtmlElement,
    pub handle: Element,
    pub minimize: Element,
    pub scan_button: Element,
    pub export_button: Element,
    pub clear_button: Element,
    pub search: HtmlInputElement,
    pub results: Element,
    board_info: Element,
    status: Element,
}

impl Panel {
    /// Inject style sheet, panel (hidden) and toggler into `document`
    pub fn build(document: &Document) -> Result<Self, JsValue> {
        page::ensure_style(document, STYLE_ID, PANEL_CSS)?;
        let body = document.body().ok_or("Document has no body")?;

        let root = html_element(document.create_element("div")?)?;
        root.set_id(PANEL_ID);
        root.set_inner_html(PANEL_HTML);
        root.style().set_property("display", "none")?;
        body.append_child(&root)?;

        let toggler = match document.get_element_by_id(TOGGLER_ID) {
            Some(existing) => html_element(existing)?,
            None => {
                let toggler = html_element(document.create_element("div")?)?;
                toggler.set_id(TOGGLER_ID);
                toggler.set_title("Show/hide Monday Column Finder");
                toggler.set_text_content(Some("🔍"));
                body.append_child(&toggler)?;
                toggler
            }
        };

        let search = find(&root, "#mondayFinderSearch")?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| JsValue::from_str("Search field is not an input"))?;

        Ok(Self {
            document: document.clone(),
            handle: find(&root, "#mondayFinderDragHandle")?,
            minimize: find(&root, "#mondayFinderMinimizeBtn")?,
            scan_button: find(&root, "#mondayFinderScanBtn")?,
            export_button: find(&root, "#mondayFinderExportBtn")?,
            clear_button: find(&root, "#mondayFinderClearBtn")?,
            results: find(&root, "#mondayFinderResults")?,
            board_info: find(&root, "#mondayFinderBoardInfo")?,
            status: find(&root, "#mondayFinderStatus")?,
            search,
            root,
            toggler,
        })
    }

    pub fn toggler(&self) -> &HtmlElement {
        &self.toggler
    }

    pub fn is_visible(&self) -> bool {
        self.root
            .style()
            .get_property_value("display")
            .map(|display| display != "none")
            .unwrap_or(false)
    }

    pub fn toggle_visible(&self) {
        let display = if self.is_visible() { "none" } else { "block" };
        if let Err(e) = self.root.style().set_property("display", display) {
            tracing::warn!(error = ?e, "Could not toggle panel");
        }
    }

    pub fn set_board_info(&self, board: Option<&BoardId>, columns: usize) {
        self.board_info
            .set_text_content(Some(&board_summary(board, columns)));
    }

    /// Timestamped status line; `scanning` drives the pulse animation
    pub fn set_status(&self, message: &str, scanning: bool) {
        self.status
            .set_text_content(Some(&format!("{}: {}", page::local_time(), message)));
        let classes = self.status.class_list();
        let toggled = if scanning {
            classes.add_1(SCANNING_CLASS)
        } else {
            classes.remove_1(SCANNING_CLASS)
        };
        if let Err(e) = toggled {
            tracing::warn!(error = ?e, "Could not update status class");
        }
    }

    pub fn query(&self) -> String {
        self.search.value()
    }

    pub fn clear_query(&self) {
        self.search.set_value("");
    }

    pub fn show_results(&self, results: &[&ColumnRecord]) -> Result<(), JsValue> {
        if results.is_empty() {
            return self.show_message(NO_RESULTS_TEXT);
        }

        self.results.set_text_content(None);
        for record in results {
            let item = self.document.create_element("div")?;
            item.set_class_name(RESULT_ITEM_CLASS);
            item.set_attribute("data-id", &record.id)?;
            item.set_attribute("title", "Click to copy the ID")?;

            let name = self.document.create_element("div")?;
            name.set_class_name(RESULT_NAME_CLASS);
            name.set_text_content(Some(&record.name));

            let id = self.document.create_element("div")?;
            id.set_class_name(RESULT_ID_CLASS);
            id.set_text_content(Some(&record.id));

            item.append_child(&name)?;
            item.append_child(&id)?;
            self.results.append_child(&item)?;
        }
        Ok(())
    }

    pub fn show_message(&self, text: &str) -> Result<(), JsValue> {
        let message = self.document.create_element("div")?;
        message.set_class_name(NO_RESULTS_CLASS);
        message.set_text_content(Some(text));
        self.results.set_text_content(None);
        self.results.append_child(&message)?;
        Ok(())
    }

    /// Pointer offset inside the panel at drag start
    pub fn drag_offset(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        let rect = self.root.get_bounding_client_rect();
        (client_x - rect.left(), client_y - rect.top())
    }

    pub fn move_to(&self, x: f64, y: f64) -> Result<(), JsValue> {
        let window = page::window()?;
        let viewport = (
            window.inner_width()?.as_f64().unwrap_or_default(),
            window.inner_height()?.as_f64().unwrap_or_default(),
        );
        let size = (
            f64::from(self.root.offset_width()),
            f64::from(self.root.offset_height()),
        );
        let (left, top) = clamp_position(x, y, viewport, size);

        let style = self.root.style();
        style.set_property("left", &format!("{}px", left))?;
        style.set_property("top", &format!("{}px", top))?;
        style.set_property("right", "auto")?;
        Ok(())
    }

    /// Remove panel, toggler and style sheet from the page
    pub fn remove(&self) {
        self.root.remove();
        self.toggler.remove();
        page::remove_by_id(&self.document, STYLE_ID);
    }
}

/// Transient confirmation banner, removed after `duration_ms`
pub fn notify(document: &Document, text: &str, duration_ms: u32) -> Result<(), JsValue> {
    let banner = html_element(document.create_element("div")?)?;
    banner.style().set_css_text(NOTIFICATION_CSS);
    banner.set_text_content(Some(text));
    document
        .body()
        .ok_or("Document has no body")?
        .append_child(&banner)?;

    let dismiss = Closure::once_into_js(move || banner.remove());
    page::window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
        dismiss.unchecked_ref(),
        duration_ms as i32,
    )?;
    Ok(())
}

fn html_element(element: Element) -> Result<HtmlElement, JsValue> {
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str("Expected an HTML element"))
}

fn find(root: &Element, selector: &str) -> Result<Element, JsValue> {
    root.query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("Panel element missing: {}", selector)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_inside_viewport_is_identity() {
        assert_eq!(
            clamp_position(100.0, 80.0, (1280.0, 800.0), (380.0, 500.0)),
            (100.0, 80.0)
        );
    }

    #[test]
    fn test_clamp_to_right_and_bottom_edges() {
        assert_eq!(
            clamp_position(1200.0, 700.0, (1280.0, 800.0), (380.0, 500.0)),
            (900.0, 300.0)
        );
    }

    #[test]
    fn test_clamp_negative_to_origin() {
        assert_eq!(
            clamp_position(-40.0, -5.0, (1280.0, 800.0), (380.0, 500.0)),
            (0.0, 0.0)
        );
    }

    #[test]
    fn test_oversized_panel_pins_to_origin() {
        assert_eq!(
            clamp_position(50.0, 50.0, (300.0, 200.0), (380.0, 500.0)),
            (0.0, 0.0)
        );
    }

    #[test]
    fn test_board_summary() {
        let board = BoardId::new("123");
        assert_eq!(board_summary(Some(&board), 4), "📋 Board: 123 (4 columns)");
        assert_eq!(board_summary(Some(&board), 0), "📋 Board: 123");
        assert_eq!(board_summary(None, 0), "📋 Board: none");
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_names_render_as_text() {
        let document = page::document().unwrap();
        let panel = Panel::build(&document).unwrap();
        let record = ColumnRecord {
            id: "text_1".to_string(),
            name: "<b>Owner</b>".to_string(),
            last_seen: 0,
        };

        panel.show_results(&[&record]).unwrap();
        let name = panel
            .results
            .query_selector(".mondayFinderResultName")
            .unwrap()
            .unwrap();
        assert_eq!(name.text_content().as_deref(), Some("<b>Owner</b>"));
        assert!(name.query_selector("b").unwrap().is_none());

        panel.show_results(&[]).unwrap();
        assert_eq!(panel.results.text_content().as_deref(), Some(NO_RESULTS_TEXT));
        panel.remove();
    }

    #[wasm_bindgen_test]
    fn test_panel_starts_hidden_and_toggles() {
        let document = page::document().unwrap();
        let panel = Panel::build(&document).unwrap();
        assert!(!panel.is_visible());
        panel.toggle_visible();
        assert!(panel.is_visible());
        panel.remove();
    }

    #[wasm_bindgen_test]
    fn test_move_to_overrides_stylesheet_position() {
        let document = page::document().unwrap();
        let panel = Panel::build(&document).unwrap();
        panel.toggle_visible();

        let before = panel.root.get_bounding_client_rect();
        assert_eq!(before.top(), 50.0);

        let window = page::window().unwrap();
        let viewport = (
            window.inner_width().unwrap().as_f64().unwrap(),
            window.inner_height().unwrap().as_f64().unwrap(),
        );
        let size = (
            f64::from(panel.root.offset_width()),
            f64::from(panel.root.offset_height()),
        );
        let (left, top) = clamp_position(30.0, 20.0, viewport, size);

        panel.move_to(30.0, 20.0).unwrap();
        let after = panel.root.get_bounding_client_rect();
        assert_eq!(after.top(), top);
        assert_eq!(after.left(), left);
        panel.remove();
    }
}
