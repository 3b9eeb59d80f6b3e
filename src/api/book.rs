//! Flipbook preview exports.
//!
//! The book opens over a snapshot of the current document; edits made while
//! the preview is up do not appear until it is reopened.

use wasm_bindgen::prelude::*;

use crate::api::helpers::{deserialize, optional_function, serialize};
use crate::api::pages;
use crate::flipbook::engine::{self, FlipbookOptions};
use crate::flipbook::spread::ViewMode;
use crate::protocol::runtime;

/// Open the page-turning preview over the current document. `options` may
/// be undefined for the defaults. `on_popup`, when given, receives popup
/// payloads in place of the built-in overlay.
#[wasm_bindgen(js_name = openFlipbook)]
pub async fn open_flipbook(options: JsValue, on_popup: JsValue) -> Result<(), JsValue> {
    let options: FlipbookOptions = if options.is_undefined() || options.is_null() {
        FlipbookOptions::default()
    } else {
        deserialize(options, "flipbook options")?
    };
    let pages = pages::with_store(|store| store.snapshot_html())?;
    engine::init(pages, options, optional_function(on_popup))
        .await
        .map_err(JsValue::from)
}

#[wasm_bindgen(js_name = closeFlipbook)]
pub fn close_flipbook() {
    engine::destroy();
}

/// Turn to a 1-based page. Resolves to the page actually shown, which stays
/// put when a turn is already animating.
#[wasm_bindgen(js_name = flipbookTurnTo)]
pub fn flipbook_turn_to(page: u32) -> Result<u32, JsValue> {
    engine::turn_to_page(page).map_err(JsValue::from)
}

/// Book state for the host's chrome, or null when no book is open.
#[wasm_bindgen(js_name = flipbookState)]
pub fn flipbook_state() -> Result<JsValue, JsValue> {
    match engine::state_snapshot() {
        Some(state) => serialize(&state, "flipbook state"),
        None => Ok(JsValue::NULL),
    }
}

/// Toggle autoplay; resolves to the new state.
#[wasm_bindgen(js_name = flipbookToggleAutoplay)]
pub fn flipbook_toggle_autoplay() -> bool {
    engine::toggle_autoplay()
}

#[wasm_bindgen(js_name = flipbookSetThumbnails)]
pub fn flipbook_set_thumbnails(open: bool) {
    engine::set_thumbnails_open(open);
}

#[wasm_bindgen(js_name = flipbookToggleFullscreen)]
pub fn flipbook_toggle_fullscreen() -> Result<(), JsValue> {
    engine::toggle_fullscreen().map_err(JsValue::from)
}

#[wasm_bindgen(js_name = flipbookSetViewMode)]
pub fn flipbook_set_view_mode(mode: &str) -> Result<(), JsValue> {
    let mode = match mode {
        "single" => ViewMode::Single,
        "double" => ViewMode::Double,
        other => return Err(JsValue::from_str(&format!("unknown view mode '{}'", other))),
    };
    engine::set_view_mode(mode).map_err(JsValue::from)
}

/// Boot the viewer runtime inside a preview or published frame. The
/// bootstrap script injected into every frame calls this with the frame's
/// 1-based page number.
#[wasm_bindgen(js_name = installViewerRuntime)]
pub fn install_viewer_runtime(page_number: u32) -> Result<(), JsValue> {
    runtime::install(page_number).map_err(JsValue::from)
}
