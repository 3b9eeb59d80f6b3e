//! Browser smoke test
//!
//! Runs the exported surface against a real DOM: document lifecycle,
//! canvas attach/load/serialize, the viewer runtime, and the style bridge.

use flipbook_editor_wasm::api::pages;
use flipbook_editor_wasm::canvas::editor::{self, CanvasCallbacks};
use flipbook_editor_wasm::protocol::runtime;
use flipbook_editor_wasm::sync::bridge::{self, SyncPhase};
use gloo_events::EventListener;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::HtmlIFrameElement;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_document_lifecycle_through_exports() {
    pages::init_document(None).unwrap();
    assert_eq!(pages::page_count().unwrap(), 1);

    let idx = pages::add_page(None).unwrap();
    assert_eq!(idx, 1);
    assert_eq!(pages::current_page_index().unwrap(), 1);

    let copy = pages::duplicate_page(0).unwrap();
    assert_eq!(copy, 1);
    assert_eq!(pages::page_count().unwrap(), 3);

    let applied = pages::rename_page(2, "Back cover").unwrap();
    assert_eq!(applied, "Back cover");

    // Down to one page, then the guard kicks in.
    assert_eq!(
        pages::delete_page(2).unwrap().as_string().as_deref(),
        Some("applied")
    );
    pages::delete_page(1).unwrap();
    assert_eq!(
        pages::delete_page(0).unwrap().as_string().as_deref(),
        Some("refused")
    );
    assert_eq!(pages::page_count().unwrap(), 1);
}

#[wasm_bindgen_test]
fn test_save_and_load_round_trip() {
    pages::init_document(Some("<html><body><p>one</p></body></html>".into())).unwrap();
    pages::add_page(Some("<html><body><p>two</p></body></html>".into())).unwrap();
    let saved = pages::save_document().unwrap();

    pages::init_document(None).unwrap();
    assert_eq!(pages::page_count().unwrap(), 1);

    pages::load_document(saved).unwrap();
    assert_eq!(pages::page_count().unwrap(), 2);
    assert_eq!(pages::current_page_index().unwrap(), 1);
}

#[wasm_bindgen_test]
fn test_canvas_attach_requires_the_frame() {
    editor::detach();
    assert!(editor::attach("no-such-frame", CanvasCallbacks::default()).is_err());
    assert!(!editor::is_attached());
}

#[wasm_bindgen_test]
async fn test_canvas_loads_wires_and_serializes() {
    let document = web_sys::window().unwrap().document().unwrap();
    let frame: HtmlIFrameElement = document
        .create_element("iframe")
        .unwrap()
        .dyn_into()
        .unwrap();
    frame.set_id("fb-canvas-under-test");
    document.body().unwrap().append_child(&frame).unwrap();

    editor::attach("fb-canvas-under-test", CanvasCallbacks::default()).unwrap();
    assert!(editor::is_attached());
    editor::load(
        "<!DOCTYPE html><html><head></head><body><h1>Title</h1><p>Hello page</p></body></html>",
        0,
        "page-under-test",
    )
    .unwrap();

    // The srcdoc swap is asynchronous; wait until the read-back shows it.
    let html = loop {
        if let Some(html) = editor::serialize() {
            if html.contains("Hello page") {
                break html;
            }
        }
        next_load(&frame).await;
    };

    // Wiring marked both text elements, and the serializer stripped the
    // markers on the way out.
    assert_eq!(editor::selectable().len(), 2);
    assert!(html.contains("<h1>Title</h1>"));
    assert!(!html.contains("contenteditable"));
    assert!(!html.contains("data-editable"));

    editor::detach();
    assert!(!editor::is_attached());
    frame.remove();
}

#[wasm_bindgen_test]
fn test_viewer_runtime_installs() {
    runtime::install(3).unwrap();
    // Installing again replaces the previous runtime.
    runtime::install(1).unwrap();
}

#[wasm_bindgen_test]
fn test_style_bridge_starts_idle() {
    assert_eq!(bridge::phase(), SyncPhase::Idle);
    // Releasing with nothing selected is a no-op.
    bridge::end_selection();
    assert_eq!(bridge::phase(), SyncPhase::Idle);
}

fn next_load(frame: &HtmlIFrameElement) -> JsFuture {
    let target: web_sys::EventTarget = frame.clone().into();
    let mut constructor = |resolve: js_sys::Function, _reject: js_sys::Function| {
        EventListener::once(&target, "load", move |_| {
            let _ = resolve.call0(&JsValue::NULL);
        })
        .forget();
    };
    JsFuture::from(js_sys::Promise::new(&mut constructor))
}
