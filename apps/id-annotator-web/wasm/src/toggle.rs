//! The "Show column IDs" checkbox in the host toolbar

use board_core::AnnotatorConfig;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlInputElement};

pub const TOGGLE_CLASS: &str = "dev-column-toggle";

const LABEL_STYLE: &str = "display: flex; align-items: center; gap: 4px; margin-left: 10px; \
     font-size: 12px; color: #333; cursor: pointer;";

/// Find or create the toggle checkbox.
///
/// `None` when the toolbar is not on the page. An existing checkbox (left
/// by an earlier instance) is reused as is.
pub fn install(
    document: &Document,
    config: &AnnotatorConfig,
) -> Result<Option<HtmlInputElement>, JsValue> {
    let Some(toolbar) = document.query_selector(&config.toolbar_selector)? else {
        return Ok(None);
    };

    let selector = format!("input.{}", TOGGLE_CLASS);
    if let Some(existing) = toolbar.query_selector(&selector)? {
        return as_input(existing).map(Some);
    }

    let label = document.create_element("label")?;
    label.set_attribute("style", LABEL_STYLE)?;

    let checkbox = as_input(document.create_element("input")?)?;
    checkbox.set_type("checkbox");
    checkbox.class_list().add_1(TOGGLE_CLASS)?;

    label.append_child(&checkbox)?;
    label.append_child(&document.create_text_node(&config.toggle_label))?;
    toolbar.append_child(&label)?;
    Ok(Some(checkbox))
}

fn as_input(element: web_sys::Element) -> Result<HtmlInputElement, JsValue> {
    element
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| JsValue::from_str("Toggle is not an input element"))
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use shared_dom::page;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_checkbox_injected_once() {
        let document = page::document().unwrap();
        let config = AnnotatorConfig {
            toolbar_selector: "#toggle-test-toolbar".to_string(),
            ..AnnotatorConfig::default()
        };
        assert!(install(&document, &config).unwrap().is_none());

        let toolbar = document.create_element("div").unwrap();
        toolbar.set_id("toggle-test-toolbar");
        page::body().unwrap().append_child(&toolbar).unwrap();

        install(&document, &config).unwrap().unwrap();
        install(&document, &config).unwrap().unwrap();
        assert_eq!(
            toolbar.query_selector_all("input.dev-column-toggle").unwrap().length(),
            1
        );
        assert!(toolbar
            .text_content()
            .unwrap_or_default()
            .contains("Show column IDs"));
        toolbar.remove();
    }
}
