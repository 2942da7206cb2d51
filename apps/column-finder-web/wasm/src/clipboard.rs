//! Copy text to the system clipboard
//!
//! `navigator.clipboard.writeText` first; when it is missing or rejects,
//! a throwaway textarea and `execCommand("copy")`.

use js_sys::{Function, Promise, Reflect};
use shared_dom::page;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlDocument, HtmlTextAreaElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMethod {
    ClipboardApi,
    Selection,
}

pub async fn copy_text(text: &str) -> Result<CopyMethod, JsValue> {
    match write_with_clipboard_api(text).await {
        Ok(()) => Ok(CopyMethod::ClipboardApi),
        Err(e) => {
            tracing::warn!(error = ?e, "Clipboard API refused, falling back to selection copy");
            copy_with_selection(text)?;
            Ok(CopyMethod::Selection)
        }
    }
}

async fn write_with_clipboard_api(text: &str) -> Result<(), JsValue> {
    let navigator = page::window()?.navigator();
    let clipboard = Reflect::get(&navigator, &"clipboard".into())?;
    if clipboard.is_undefined() || clipboard.is_null() {
        return Err(JsValue::from_str("navigator.clipboard is not available"));
    }

    let write_text = Reflect::get(&clipboard, &"writeText".into())?.dyn_into::<Function>()?;
    let promise = write_text
        .call1(&clipboard, &JsValue::from_str(text))?
        .dyn_into::<Promise>()?;
    JsFuture::from(promise).await?;
    Ok(())
}

fn copy_with_selection(text: &str) -> Result<(), JsValue> {
    let document = page::document()?;
    let body = page::body()?;

    let area = document
        .create_element("textarea")?
        .dyn_into::<HtmlTextAreaElement>()
        .map_err(|_| JsValue::from_str("Could not create textarea"))?;
    area.set_value(text);
    body.append_child(&area)?;
    area.select();

    let copied = match document.dyn_ref::<HtmlDocument>() {
        Some(html) => html.exec_command("copy"),
        None => Ok(false),
    };
    area.remove();

    if copied? {
        Ok(())
    } else {
        Err(JsValue::from_str("execCommand(\"copy\") was refused"))
    }
}
