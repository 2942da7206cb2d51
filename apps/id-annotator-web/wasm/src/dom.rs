//! The live document as a `BadgeDom`

use board_core::{BadgeDom, BadgeKind, POSITIONED_ATTRIBUTE};
use shared_dom::page;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, Window};

pub struct PageDom {
    window: Window,
    document: Document,
}

impl PageDom {
    pub fn new() -> Result<Self, JsValue> {
        let window = page::window()?;
        let document = page::document()?;
        Ok(Self { window, document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Inject the shared style blocks badges depend on
    pub fn install_styles(&self) -> Result<(), JsValue> {
        for (id, css) in BadgeKind::ALL.iter().filter_map(|kind| kind.stylesheet()) {
            page::ensure_style(&self.document, id, css)?;
        }
        Ok(())
    }

    pub fn remove_styles(&self) {
        for (id, _) in BadgeKind::ALL.iter().filter_map(|kind| kind.stylesheet()) {
            page::remove_by_id(&self.document, id);
        }
    }
}

impl BadgeDom for PageDom {
    type Node = Element;
    type Error = JsValue;

    fn query_all(&self, selector: &str) -> Result<Vec<Element>, JsValue> {
        page::query_all(&self.document, selector)
    }

    fn find_within(&self, node: &Element, selector: &str) -> Result<Option<Element>, JsValue> {
        node.query_selector(selector)
    }

    fn class_names(&self, node: &Element) -> Vec<String> {
        page::class_names(node)
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) -> Result<(), JsValue> {
        node.set_attribute(name, value)
    }

    fn remove_attribute(&mut self, node: &Element, name: &str) -> Result<(), JsValue> {
        node.remove_attribute(name)
    }

    fn attach_badge(
        &mut self,
        container: &Element,
        kind: BadgeKind,
        text: &str,
    ) -> Result<(), JsValue> {
        if kind.needs_positioned_container() && page::ensure_positioned(&self.window, container)? {
            container.set_attribute(POSITIONED_ATTRIBUTE, "")?;
        }

        let badge = self.document.create_element(kind.badge_tag())?;
        badge.set_class_name(kind.badge_class());
        badge.set_text_content(Some(text));
        if let Some(style) = kind.inline_style() {
            badge.set_attribute("style", style)?;
        }
        container.append_child(&badge)?;
        Ok(())
    }

    fn remove(&mut self, node: &Element) -> Result<(), JsValue> {
        node.remove();
        Ok(())
    }

    fn clear_position(&mut self, node: &Element) -> Result<(), JsValue> {
        page::clear_position(node)
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use board_core::{strip_all, sweep_all};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const FIXTURE: &str = r#"
        <div class="column-header col-identifier-status_7"><div class="title-wrapper">Status</div></div>
        <div class="pulse-card-row" data-column-id="date4"><span class="title-text">Due</span></div>
        <div data-testid="item-123456"><div class="name-cell-text">Task</div></div>
        <div data-testid="item-abc"><div class="name-cell-text">No id</div></div>
    "#;

    fn mount() -> Element {
        let document = page::document().unwrap();
        let root = document.create_element("div").unwrap();
        root.set_inner_html(FIXTURE);
        page::body().unwrap().append_child(&root).unwrap();
        root
    }

    #[wasm_bindgen_test]
    fn test_sweeps_never_duplicate_badges() {
        let root = mount();
        let mut dom = PageDom::new().unwrap();

        let first = sweep_all(&mut dom).unwrap();
        let second = sweep_all(&mut dom).unwrap();
        assert_eq!(first.attached, 3);
        assert_eq!(second.attached, 0);

        let badges = root
            .query_selector_all(".dev-column-suffix, .dev-pulse-card-suffix, .dev-itemid-suffix")
            .unwrap();
        assert_eq!(badges.length(), 3);

        let item = root.query_selector(".dev-itemid-suffix").unwrap().unwrap();
        assert_eq!(item.text_content().as_deref(), Some("#123456"));

        strip_all(&mut dom).unwrap();
        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_strip_restores_markup() {
        let root = mount();
        let mut dom = PageDom::new().unwrap();

        sweep_all(&mut dom).unwrap();
        strip_all(&mut dom).unwrap();

        let markers = root
            .query_selector_all("[data-suffix-added], [data-pulse-id-added], [data-itemid-added]")
            .unwrap();
        let badges = root
            .query_selector_all(".dev-column-suffix, .dev-pulse-card-suffix, .dev-itemid-suffix")
            .unwrap();
        assert_eq!(markers.length(), 0);
        assert_eq!(badges.length(), 0);
        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_strip_reverts_container_positioning() {
        let root = mount();
        let pinned = root
            .query_selector("[data-testid=\"item-123456\"] .name-cell-text")
            .unwrap()
            .unwrap();
        pinned.set_attribute("style", "position: absolute;").unwrap();
        let mut dom = PageDom::new().unwrap();

        sweep_all(&mut dom).unwrap();
        let header = root
            .query_selector(".column-header .title-wrapper")
            .unwrap()
            .unwrap();
        assert!(header.has_attribute(POSITIONED_ATTRIBUTE));
        assert!(!pinned.has_attribute(POSITIONED_ATTRIBUTE));

        let report = strip_all(&mut dom).unwrap();
        assert_eq!(report.positioned, 1);
        assert!(!header.has_attribute(POSITIONED_ATTRIBUTE));
        assert_eq!(header.get_attribute("style").unwrap_or_default(), "");
        assert_eq!(pinned.get_attribute("style").as_deref(), Some("position: absolute;"));
        root.remove();
    }
}
