//! Host preference cache backed by localStorage.
//!
//! Storage can be absent or throwing (private windows, sandboxed frames),
//! so every path degrades silently to the default.

use wasm_bindgen::prelude::*;
use web_sys::Storage;

use crate::api::helpers::serialize;
use crate::interactions::download::DownloadPayload;
use crate::utils::dom;

const AUTO_SAVE_KEY: &str = "flipbook.autoSave";
const LAST_DOWNLOAD_KEY: &str = "flipbook.lastDownload";

fn local_storage() -> Option<Storage> {
    dom::window().ok()?.local_storage().ok().flatten()
}

#[wasm_bindgen(js_name = setAutoSavePreference)]
pub fn set_auto_save_preference(enabled: bool) {
    let Some(storage) = local_storage() else {
        log::debug!("localStorage unavailable, auto-save preference not persisted");
        return;
    };
    if storage.set_item(AUTO_SAVE_KEY, if enabled { "true" } else { "false" }).is_err() {
        log::debug!("auto-save preference write failed");
    }
}

/// Auto-save defaults to on; only an explicit stored "false" disables it.
#[wasm_bindgen(js_name = autoSavePreference)]
pub fn auto_save_preference() -> bool {
    let Some(storage) = local_storage() else {
        return true;
    };
    !matches!(storage.get_item(AUTO_SAVE_KEY), Ok(Some(value)) if value == "false")
}

/// Remember the last configured download so the panel can prefill it.
#[wasm_bindgen(js_name = rememberDownload)]
pub fn remember_download(value: &str, filename: &str) {
    let payload = DownloadPayload {
        value: value.to_string(),
        filename: filename.to_string(),
    };
    let Ok(json) = serde_json::to_string(&payload) else {
        return;
    };
    let Some(storage) = local_storage() else {
        log::debug!("localStorage unavailable, download not remembered");
        return;
    };
    if storage.set_item(LAST_DOWNLOAD_KEY, &json).is_err() {
        log::debug!("download memory write failed");
    }
}

/// The last remembered download, or null. A stale or corrupt entry reads
/// as null rather than an error.
#[wasm_bindgen(js_name = lastDownload)]
pub fn last_download() -> JsValue {
    let Some(storage) = local_storage() else {
        return JsValue::NULL;
    };
    let Ok(Some(json)) = storage.get_item(LAST_DOWNLOAD_KEY) else {
        return JsValue::NULL;
    };
    match serde_json::from_str::<DownloadPayload>(&json) {
        Ok(payload) => serialize(&payload, "download memory").unwrap_or(JsValue::NULL),
        Err(err) => {
            log::debug!("stored download unreadable: {}", err);
            JsValue::NULL
        }
    }
}
