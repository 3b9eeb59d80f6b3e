//! Editor frame exports: attach, page load, selection, serialization.
//!
//! The canvas, the style bridge, and the page store meet here. Edits from
//! the frame land in the store first; host callbacks fire only for commits
//! the store accepted.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::api::helpers::callback_field;
use crate::api::pages;
use crate::canvas::{self, CanvasCallbacks, SelectedElement};
use crate::sync::bridge;
use crate::utils::debounce::{Debouncer, THUMBNAIL_DEBOUNCE_MS};

/// Wire the canvas editor to an iframe by element id. `callbacks` is an
/// object of host functions, all optional:
///
/// - `onSelect(element, kind)`: selection changed (`null, null` on clear)
/// - `onChange(pageId, html)`: debounced edit, already in the store
/// - `onCommit(pageId, html)`: blur-time commit, already in the store
/// - `onThumbnailDirty(pageId)`: edits settled, the page preview is stale
/// - `onWheelZoom(delta)`: modifier-wheel from inside the frame
/// - `onPan(dx, dy)`: middle-button or space drag from inside the frame
/// - `onPanelState(snapshot)`: style snapshot for the panel on selection
/// - `onUpdate()`: a style or interaction write settled, refresh previews
#[wasm_bindgen(js_name = attachEditor)]
pub fn attach_editor(frame_id: &str, callbacks: JsValue) -> Result<(), JsValue> {
    let on_select_js = callback_field(&callbacks, "onSelect");
    let on_change_js = callback_field(&callbacks, "onChange");
    let on_commit_js = callback_field(&callbacks, "onCommit");
    let on_thumbnail_js = callback_field(&callbacks, "onThumbnailDirty");
    let on_wheel_zoom_js = callback_field(&callbacks, "onWheelZoom");
    let on_pan_js = callback_field(&callbacks, "onPan");
    let on_panel_state = callback_field(&callbacks, "onPanelState");
    let on_update_js = callback_field(&callbacks, "onUpdate");

    // Style writes flush the canvas serializer before the host hears about
    // them, so a thumbnail regenerated from onUpdate reads post-write html.
    let update_fn = Closure::wrap(Box::new(move || {
        canvas::editor::flush_change();
        if let Some(cb) = &on_update_js {
            if let Err(err) = cb.call0(&JsValue::NULL) {
                log::error!("onUpdate callback failed: {:?}", err);
            }
        }
    }) as Box<dyn FnMut()>)
    .into_js_value()
    .unchecked_into::<js_sys::Function>();
    bridge::set_callbacks(on_panel_state, Some(update_fn));

    THUMBNAIL.with(|slot| {
        let mut notifier = slot.borrow_mut();
        notifier.debounce.cancel();
        notifier.callback = on_thumbnail_js;
    });

    let mut cbs = CanvasCallbacks::default();

    cbs.on_select = Some(Rc::new(
        move |selected: Option<&SelectedElement>| match selected {
            Some(sel) => {
                if let Err(err) = bridge::begin_selection(&sel.element) {
                    log::error!("selection sync failed: {}", err);
                }
                if let Some(cb) = &on_select_js {
                    let kind = JsValue::from_str(sel.kind.as_str());
                    if let Err(err) = cb.call2(&JsValue::NULL, &sel.element, &kind) {
                        log::error!("onSelect callback failed: {:?}", err);
                    }
                }
            }
            None => {
                bridge::end_selection();
                if let Some(cb) = &on_select_js {
                    let _ = cb.call2(&JsValue::NULL, &JsValue::NULL, &JsValue::NULL);
                }
            }
        },
    ));

    cbs.on_change = Some(deliver_edit(on_change_js));
    cbs.on_commit = Some(deliver_edit(on_commit_js));

    if let Some(cb) = on_wheel_zoom_js {
        cbs.on_wheel_zoom = Some(Rc::new(move |delta| {
            let _ = cb.call1(&JsValue::NULL, &JsValue::from_f64(delta));
        }));
    }
    if let Some(cb) = on_pan_js {
        cbs.on_pan = Some(Rc::new(move |dx, dy| {
            let _ = cb.call2(&JsValue::NULL, &JsValue::from_f64(dx), &JsValue::from_f64(dy));
        }));
    }

    canvas::editor::attach(frame_id, cbs).map_err(JsValue::from)
}

/// Store first, host second. A commit addressed to a page that no longer
/// exists is dropped and the host never hears about it.
fn deliver_edit(callback: Option<js_sys::Function>) -> Rc<dyn Fn(&str, String)> {
    Rc::new(move |page_id, html| {
        if !pages::commit_html_internal(page_id, &html) {
            log::warn!("edit for vanished page {} dropped", page_id);
            return;
        }
        if let Some(cb) = &callback {
            if let Err(err) = cb.call2(
                &JsValue::NULL,
                &JsValue::from_str(page_id),
                &JsValue::from_str(&html),
            ) {
                log::error!("edit callback failed: {:?}", err);
            }
        }
        mark_thumbnail_dirty(page_id);
    })
}

thread_local! {
    static THUMBNAIL: RefCell<ThumbnailNotifier> = RefCell::new(ThumbnailNotifier::new());
}

struct ThumbnailNotifier {
    debounce: Debouncer,
    callback: Option<js_sys::Function>,
}

impl ThumbnailNotifier {
    fn new() -> Self {
        ThumbnailNotifier {
            debounce: Debouncer::new(THUMBNAIL_DEBOUNCE_MS),
            callback: None,
        }
    }
}

/// Rasterizing a preview is expensive, so a burst of edits collapses into
/// one notification carrying the id of the last page touched.
fn mark_thumbnail_dirty(page_id: &str) {
    THUMBNAIL.with(|slot| {
        let mut notifier = slot.borrow_mut();
        let Some(callback) = notifier.callback.clone() else {
            return;
        };
        let page_id = page_id.to_string();
        notifier.debounce.call(move || {
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&page_id)) {
                log::error!("onThumbnailDirty callback failed: {:?}", err);
            }
        });
    });
}

/// Load the store's current page into the attached frame. Reloading the
/// page the frame already shows is a no-op so the caret survives.
#[wasm_bindgen(js_name = loadCurrentPage)]
pub fn load_current_page() -> Result<(), JsValue> {
    let (html, index, id) = pages::with_store(|store| {
        let page = store.current_page();
        (page.html.clone(), store.current_index(), page.id.clone())
    })?;
    canvas::editor::load(&html, index, &id).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = detachEditor)]
pub fn detach_editor() {
    bridge::end_selection();
    bridge::set_callbacks(None, None);
    THUMBNAIL.with(|slot| {
        let mut notifier = slot.borrow_mut();
        notifier.debounce.cancel();
        notifier.callback = None;
    });
    canvas::editor::detach();
}

/// Host-initiated deselect, e.g. Escape or a click in the shell chrome.
#[wasm_bindgen(js_name = deselectElement)]
pub fn deselect_element() {
    canvas::editor::deselect();
}

/// Serialize the frame's live document without committing it anywhere.
#[wasm_bindgen(js_name = serializeCanvas)]
pub fn serialize_canvas() -> Option<String> {
    canvas::editor::serialize()
}

/// Every element the canvas would let the user select, with its kind.
#[wasm_bindgen(js_name = selectableElements)]
pub fn selectable_elements() -> js_sys::Array {
    let entries = js_sys::Array::new();
    for (element, kind) in canvas::editor::selectable() {
        let entry = js_sys::Object::new();
        let js_element: JsValue = element.into();
        let _ = js_sys::Reflect::set(&entry, &"element".into(), &js_element);
        let _ = js_sys::Reflect::set(&entry, &"kind".into(), &JsValue::from_str(kind.as_str()));
        entries.push(&entry);
    }
    entries
}
