//! `localStorage` as a `KeyValueStore`

use board_core::{BoardError, KeyValueStore};
use wasm_bindgen::JsValue;

pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let storage = window.local_storage()?.ok_or("No localStorage")?;
        Ok(Self { storage })
    }
}

fn storage_error(e: JsValue) -> BoardError {
    BoardError::Storage(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> board_core::Result<Option<String>> {
        self.storage.get_item(key).map_err(storage_error)
    }

    fn set(&mut self, key: &str, value: &str) -> board_core::Result<()> {
        self.storage.set_item(key, value).map_err(storage_error)
    }

    fn remove(&mut self, key: &str) -> board_core::Result<()> {
        self.storage.remove_item(key).map_err(storage_error)
    }

    fn keys(&self) -> board_core::Result<Vec<String>> {
        let len = self.storage.length().map_err(storage_error)?;
        Ok((0..len)
            .filter_map(|i| self.storage.key(i).ok().flatten())
            .collect())
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_local_storage_round_trip() {
        let mut store = LocalStorage::open().unwrap();
        store.set("shared-dom-test", "value").unwrap();
        assert_eq!(
            store.get("shared-dom-test").unwrap().as_deref(),
            Some("value")
        );
        assert!(store.keys().unwrap().contains(&"shared-dom-test".to_string()));

        store.remove("shared-dom-test").unwrap();
        assert_eq!(store.get("shared-dom-test").unwrap(), None);
    }
}
