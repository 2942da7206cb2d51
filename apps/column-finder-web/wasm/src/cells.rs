//! Live header elements seen through `HeaderCell`

use board_core::scan::HEADER_CELL_SELECTOR;
use board_core::HeaderCell;
use shared_dom::page;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

pub struct DomHeaderCell(Element);

impl HeaderCell for DomHeaderCell {
    fn class_names(&self) -> Vec<String> {
        page::class_names(&self.0)
    }

    fn text_at(&self, selector: &str) -> Option<String> {
        self.0
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|element| element.text_content())
    }
}

/// Every header cell currently rendered, in document order
pub fn header_cells(document: &Document) -> Result<Vec<DomHeaderCell>, JsValue> {
    Ok(page::query_all(document, HEADER_CELL_SELECTOR)?
        .into_iter()
        .map(DomHeaderCell)
        .collect())
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use board_core::scan::find_label;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_reads_header_markup() {
        let document = page::document().unwrap();
        let group = document.create_element("div").unwrap();
        group.set_class_name("group-header-component");
        group.set_inner_html(
            r#"<div class="cell col-identifier-status_1"><span class="column-title"> Status </span></div>"#,
        );
        page::body().unwrap().append_child(&group).unwrap();

        let cells = header_cells(&document).unwrap();
        assert_eq!(cells.len(), 1);
        assert!(cells[0]
            .class_names()
            .contains(&"col-identifier-status_1".to_string()));
        assert_eq!(find_label(&cells[0]).as_deref(), Some("Status"));

        group.remove();
    }
}
