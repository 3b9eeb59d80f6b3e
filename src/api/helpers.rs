//! Shared helpers for the JS-facing API layer: payload (de)serialization
//! with logged context, optional-callback coercion, and the selected-element
//! guard the panel operations share.

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

/// Deserialize a JS payload, logging and rethrowing with context on failure.
pub fn deserialize<T: DeserializeOwned>(value: JsValue, context: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("{}: {}", context, e);
        log::error!("{}", msg);
        JsValue::from_str(&msg)
    })
}

/// Serialize a value for JS, logging and rethrowing with context on failure.
pub fn serialize<T: Serialize>(value: &T, context: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| {
        let msg = format!("{}: {}", context, e);
        log::error!("{}", msg);
        JsValue::from_str(&msg)
    })
}

/// Coerce an optional JS callback argument: `undefined` and `null` mean
/// "none", anything else must be a function.
pub fn optional_function(value: JsValue) -> Option<js_sys::Function> {
    if value.is_undefined() || value.is_null() {
        return None;
    }
    value.dyn_into().ok()
}

/// Read a named callback out of a JS options object.
pub fn callback_field(options: &JsValue, name: &str) -> Option<js_sys::Function> {
    js_sys::Reflect::get(options, &JsValue::from_str(name))
        .ok()
        .and_then(optional_function)
}

/// The element the panel operations act on. Panel calls with nothing
/// selected are host bugs, reported as thrown errors rather than ignored.
pub fn require_selected() -> Result<Element, JsValue> {
    crate::canvas::editor::selected()
        .map(|selected| selected.element)
        .ok_or_else(|| JsValue::from_str("no element selected"))
}
