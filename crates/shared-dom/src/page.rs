//! Small helpers over the host page

use chrono::NaiveDate;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, NodeList, Window};

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object available"))
}

pub fn body() -> Result<HtmlElement, JsValue> {
    document()?
        .body()
        .ok_or_else(|| JsValue::from_str("Document has no body"))
}

pub fn current_url() -> Result<String, JsValue> {
    window()?.location().href()
}

/// Milliseconds since the Unix epoch
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Wall-clock time in the user's locale, for status lines
pub fn local_time() -> String {
    js_sys::Date::new_0().to_locale_time_string("default").into()
}

/// Today's date in UTC
pub fn today_utc() -> Option<NaiveDate> {
    let iso: String = js_sys::Date::new_0().to_iso_string().into();
    NaiveDate::parse_from_str(iso.get(..10)?, "%Y-%m-%d").ok()
}

/// Elements of a `NodeList`, non-elements dropped
pub fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
    Ok(elements(&document.query_selector_all(selector)?))
}

pub fn class_names(element: &Element) -> Vec<String> {
    let list = element.class_list();
    (0..list.length()).filter_map(|i| list.item(i)).collect()
}

/// Create or refresh a `<style>` block identified by `id`
pub fn ensure_style(document: &Document, id: &str, css: &str) -> Result<(), JsValue> {
    let style = match document.get_element_by_id(id) {
        Some(existing) => existing,
        None => {
            let style = document.create_element("style")?;
            style.set_id(id);
            let head: Element = match document.head() {
                Some(head) => head.into(),
                None => document
                    .document_element()
                    .ok_or_else(|| JsValue::from_str("Document has no root element"))?,
            };
            head.append_child(&style)?;
            style
        }
    };
    style.set_text_content(Some(css));
    Ok(())
}

pub fn remove_by_id(document: &Document, id: &str) {
    if let Some(element) = document.get_element_by_id(id) {
        element.remove();
    }
}

/// Give `element` a positioning context when it is statically positioned.
///
/// Returns `true` when an inline `position` was written.
pub fn ensure_positioned(window: &Window, element: &Element) -> Result<bool, JsValue> {
    let Some(html) = element.dyn_ref::<HtmlElement>() else {
        return Ok(false);
    };
    let position = match window.get_computed_style(element)? {
        Some(style) => style.get_property_value("position")?,
        None => String::new(),
    };
    if position.is_empty() || position == "static" {
        html.style().set_property("position", "relative")?;
        return Ok(true);
    }
    Ok(false)
}

/// Undo `ensure_positioned`
pub fn clear_position(element: &Element) -> Result<(), JsValue> {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        html.style().remove_property("position")?;
    }
    Ok(())
}
