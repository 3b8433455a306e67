//! ブラウザの `localStorage` を記録ストアとして使う

use flarenet_common::{Error, KeyValueStore, Result};
use wasm_bindgen::JsValue;

/// `localStorage` ラッパー
///
/// 値は呼び出しのたびに `window.localStorage` から引く（状態を持たない）。
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStore;

fn js_error(e: JsValue) -> Error {
    Error::Storage(format!("{:?}", e))
}

fn local_storage() -> Result<web_sys::Storage> {
    web_sys::window()
        .ok_or_else(|| Error::Storage("window is not available".into()))?
        .local_storage()
        .map_err(js_error)?
        .ok_or_else(|| Error::Storage("localStorage is not available".into()))
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        local_storage()?.get_item(key).map_err(js_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        local_storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        local_storage()?.remove_item(key).map_err(js_error)
    }
}

/// 設定・認証用の生の読み書き（失敗は無視）
pub fn read_setting(key: &str) -> Option<String> {
    BrowserStore.get(key).ok().flatten().filter(|v| !v.is_empty())
}

pub fn write_setting(key: &str, value: Option<&str>) {
    let mut store = BrowserStore;
    let result = match value {
        Some(v) => store.set(key, v),
        None => store.remove(key),
    };
    if let Err(e) = result {
        gloo::console::warn!(format!("failed to write {}: {}", key, e));
    }
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use flarenet_common::autosave::{editor_initial, DraftAutosave};
    use flarenet_common::storage::DRAFT_KEY;
    use flarenet_common::{Field, MaintenanceRecord, RecordIdentity, Section};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn wasm_browser_store_set_get_remove() {
        let mut store = BrowserStore;
        store.set("flarenet_test_key", "value").unwrap();
        assert_eq!(store.get("flarenet_test_key").unwrap().as_deref(), Some("value"));
        store.remove("flarenet_test_key").unwrap();
        assert_eq!(store.get("flarenet_test_key").unwrap(), None);
    }

    #[wasm_bindgen_test]
    fn wasm_reopened_form_restores_draft() {
        let mut store = BrowserStore;
        store.remove(DRAFT_KEY).unwrap();
        let identity = RecordIdentity::new(Some("T9"), Some("I9"));
        let shown = MaintenanceRecord::default();

        {
            let initial = editor_initial(&BrowserStore, &identity, Some(&shown));
            let mut form = DraftAutosave::open(BrowserStore, &identity, initial.as_ref());
            form.set_field(0, Section::Inspector, Field::Voltage, "230");
        }

        assert!(editor_initial(&BrowserStore, &identity, Some(&shown)).is_none());
        let form = DraftAutosave::open(BrowserStore, &identity, None);
        assert_eq!(form.form().inspector.voltage, "230");
        drop(form);
        store.remove(DRAFT_KEY).unwrap();
    }
}
