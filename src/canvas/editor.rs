//! The live canvas editor.
//!
//! One sandboxed iframe holds the page being edited; this module is the
//! only code that reaches into it. Hosts talk to the canvas through
//! [`attach`]/[`load`]/[`serialize`] and the callbacks in
//! [`CanvasCallbacks`], never through the frame DOM directly. Every
//! operation is a no-op while the frame has no content document.
//!
//! State lives in a thread-local slot; handlers borrow it briefly, collect
//! what they need, and release before running callbacks (a selection
//! callback typically re-enters us synchronously to start a style read).

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlIFrameElement, KeyboardEvent, MouseEvent, WheelEvent};

use crate::canvas::editable::{self, EDITABLE_SELECTOR};
use crate::canvas::selection::{SelectedElement, Selection, EDITOR_CSS, EDITOR_STYLE_ID};
use crate::canvas::serializer::serialize_document;
use crate::error::EditorError;
use crate::models::element::ElementKind;
use crate::protocol::inject::placeholder_document;
use crate::utils::debounce::{Debouncer, TYPING_DEBOUNCE_MS};
use crate::utils::dom;

const EMPTY_PAGE_HINT: &str = "This page is empty";

/// Host-side wiring installed at attach time. The change and commit paths
/// are the only writers of stored page html; select fires with `None` on
/// deselection; wheel-zoom and pan gestures are forwarded because their
/// DOM events do not cross the sandbox boundary on their own.
#[derive(Default)]
pub struct CanvasCallbacks {
    pub on_select: Option<Rc<dyn Fn(Option<&SelectedElement>)>>,
    /// Debounced typing serialization: (page id, html).
    pub on_change: Option<Rc<dyn Fn(&str, String)>>,
    /// Blur-time committed serialization: (page id, html).
    pub on_commit: Option<Rc<dyn Fn(&str, String)>>,
    /// Modifier-wheel inside the frame: wheel delta, sign as delivered.
    pub on_wheel_zoom: Option<Rc<dyn Fn(f64)>>,
    /// Middle-button or space drag inside the frame: (dx, dy) per move.
    pub on_pan: Option<Rc<dyn Fn(f64, f64)>>,
}

struct CanvasEditor {
    frame: HtmlIFrameElement,
    /// Html and page index of the last load, kept in sync with serialized
    /// edits so an identical reload request is skipped (a rewrite would
    /// destroy the live caret).
    loaded: Option<(String, usize)>,
    page_id: String,
    selection: Selection,
    typing: Debouncer,
    callbacks: CanvasCallbacks,
    space_held: bool,
    pan_anchor: Option<(i32, i32)>,
    panned: bool,
    _frame_load: Option<EventListener>,
    _doc_listeners: Vec<EventListener>,
}

thread_local! {
    static CANVAS: RefCell<Option<CanvasEditor>> = RefCell::new(None);
}

enum SerializePath {
    Debounced,
    Committed,
}

/// Bind the editor to its host iframe and install the frame-load hook
/// that (re)wires each document the frame navigates to.
pub fn attach(frame_id: &str, callbacks: CanvasCallbacks) -> Result<(), EditorError> {
    let document = dom::document()?;
    let frame: HtmlIFrameElement = dom::require_element(&document, frame_id)?
        .dyn_into()
        .map_err(|_| EditorError::ContainerNotFound(frame_id.to_string()))?;
    let frame_load = EventListener::new(&frame, "load", |_| wire_current_document());
    let editor = CanvasEditor {
        frame,
        loaded: None,
        page_id: String::new(),
        selection: Selection::new(),
        typing: Debouncer::new(TYPING_DEBOUNCE_MS),
        callbacks,
        space_held: false,
        pan_anchor: None,
        panned: false,
        _frame_load: Some(frame_load),
        _doc_listeners: Vec::new(),
    };
    CANVAS.with(|slot| {
        *slot.borrow_mut() = Some(editor);
    });
    log::info!("canvas editor attached to frame '{}'", frame_id);
    Ok(())
}

pub fn detach() {
    CANVAS.with(|slot| {
        if let Some(mut editor) = slot.borrow_mut().take() {
            editor.typing.cancel();
        }
    });
}

pub fn is_attached() -> bool {
    CANVAS.with(|slot| slot.borrow().is_some())
}

/// Show a page in the canvas. Skipped entirely when both the html and the
/// page index match the last load; empty html renders the placeholder.
/// `page_id` keys the serialized write-back.
pub fn load(html: &str, page_index: usize, page_id: &str) -> Result<(), EditorError> {
    let prepared = CANVAS.with(|slot| -> Result<_, EditorError> {
        let mut guard = slot.borrow_mut();
        let editor = guard
            .as_mut()
            .ok_or_else(|| EditorError::FrameUnavailable("canvas editor".to_string()))?;
        let unchanged = editor
            .loaded
            .as_ref()
            .map(|(h, i)| h == html && *i == page_index)
            .unwrap_or(false);
        if unchanged {
            return Ok(None);
        }
        editor.loaded = Some((html.to_string(), page_index));
        editor.page_id = page_id.to_string();
        editor.typing.cancel();
        let had_selection = editor.selection.current().is_some();
        editor.selection.reset();
        let srcdoc = if html.trim().is_empty() {
            placeholder_document(EMPTY_PAGE_HINT)?
        } else {
            html.to_string()
        };
        let notify = if had_selection {
            editor.callbacks.on_select.clone()
        } else {
            None
        };
        Ok(Some((srcdoc, editor.frame.clone(), notify)))
    })?;
    let Some((srcdoc, frame, notify)) = prepared else {
        return Ok(());
    };
    if let Some(callback) = notify {
        callback(None);
    }
    // The swap is asynchronous; wiring re-runs on the frame's load event.
    frame.set_srcdoc(&srcdoc);
    Ok(())
}

/// Serialize now and deliver through the change path. Panel style writes
/// land here after their own debounce window has elapsed.
pub fn flush_change() {
    serialize_and_deliver(SerializePath::Debounced);
}

/// Immediate serialization of the live document, bypassing the callbacks.
pub fn serialize() -> Option<String> {
    let document = current_document()?;
    let html = serialize_document(&document)?;
    CANVAS.with(|slot| {
        if let Some(editor) = slot.borrow_mut().as_mut() {
            if let Some((loaded_html, _)) = editor.loaded.as_mut() {
                *loaded_html = html.clone();
            }
        }
    });
    Some(html)
}

/// The current selection, if any.
pub fn selected() -> Option<SelectedElement> {
    CANVAS.with(|slot| slot.borrow().as_ref().and_then(|e| e.selection.current().cloned()))
}

/// Clear the selection outline and tell the host.
pub fn deselect() {
    match current_document() {
        Some(document) => deselect_all(&document),
        None => CANVAS.with(|slot| {
            if let Some(editor) = slot.borrow_mut().as_mut() {
                editor.selection.reset();
            }
        }),
    }
}

/// The wired elements and their kinds, for host-side tooling.
pub fn selectable() -> Vec<(Element, ElementKind)> {
    match current_document() {
        Some(document) => editable::selectable_elements(&document),
        None => Vec::new(),
    }
}

fn current_document() -> Option<Document> {
    CANVAS.with(|slot| {
        slot.borrow()
            .as_ref()
            .and_then(|editor| dom::frame_document(&editor.frame))
    })
}

fn wire_current_document() {
    let Some(document) = current_document() else {
        return;
    };
    if let Err(err) = dom::ensure_style_element(&document, EDITOR_STYLE_ID, EDITOR_CSS) {
        log::warn!("editor stylesheet injection failed: {}", err);
    }
    let wired = editable::wire_document(&document);
    log::debug!("canvas wired {} editable elements", wired);

    let active = EventListenerOptions::enable_prevent_default();
    let listeners = vec![
        EventListener::new_with_options(&document, "click", active, |e| on_click(e)),
        EventListener::new(&document, "focusin", |e| on_focus_in(e)),
        EventListener::new(&document, "focusout", |_| {
            serialize_and_deliver(SerializePath::Committed)
        }),
        EventListener::new(&document, "input", |_| on_input()),
        EventListener::new_with_options(&document, "wheel", active, |e| on_wheel(e)),
        EventListener::new_with_options(&document, "mousedown", active, |e| on_mouse_down(e)),
        EventListener::new(&document, "mousemove", |e| on_mouse_move(e)),
        EventListener::new(&document, "mouseup", |_| on_mouse_up()),
        EventListener::new_with_options(&document, "keydown", active, |e| on_key(e, true)),
        EventListener::new(&document, "keyup", |e| on_key(e, false)),
    ];
    CANVAS.with(|slot| {
        if let Some(editor) = slot.borrow_mut().as_mut() {
            // Listeners for the previous document drop with this swap.
            editor._doc_listeners = listeners;
            editor.space_held = false;
            editor.pan_anchor = None;
            editor.panned = false;
        }
    });
}

fn select_element(document: &Document, element: &Element, kind: ElementKind) {
    let callback = CANVAS.with(|slot| {
        let mut guard = slot.borrow_mut();
        let editor = guard.as_mut()?;
        if editor.selection.is_selected(element) {
            return None;
        }
        editor.selection.select(document, element, kind);
        editor.callbacks.on_select.clone()
    });
    if let Some(callback) = callback {
        let selected = SelectedElement {
            element: element.clone(),
            kind,
        };
        callback(Some(&selected));
    }
}

fn deselect_all(document: &Document) {
    let callback = CANVAS.with(|slot| {
        let mut guard = slot.borrow_mut();
        let editor = guard.as_mut()?;
        if editor.selection.current().is_none() {
            return None;
        }
        editor.selection.deselect(document);
        editor.callbacks.on_select.clone()
    });
    if let Some(callback) = callback {
        callback(None);
    }
}

fn on_click(event: &Event) {
    // A click that ends a pan gesture is not a selection click.
    let suppress = CANVAS.with(|slot| {
        let mut guard = slot.borrow_mut();
        match guard.as_mut() {
            Some(editor) if editor.panned => {
                editor.panned = false;
                true
            }
            _ => false,
        }
    });
    if suppress {
        return;
    }
    let Some(document) = current_document() else {
        return;
    };
    let target = dom::event_target_element(event);
    if let Some(target) = &target {
        // Anchors stay editable but must not navigate the editing frame.
        if dom::closest(target, "a[href]").is_some() {
            event.prevent_default();
        }
    }
    let hit = target
        .as_ref()
        .and_then(|el| dom::closest(el, EDITABLE_SELECTOR));
    match hit {
        Some(element) => {
            let Some(kind) = editable::classify_element(&element) else {
                return;
            };
            select_element(&document, &element, kind);
        }
        None => deselect_all(&document),
    }
}

fn on_focus_in(event: &Event) {
    let Some(document) = current_document() else {
        return;
    };
    let Some(target) = dom::event_target_element(event) else {
        return;
    };
    if target.get_attribute("contenteditable").as_deref() != Some("true") {
        return;
    }
    let Some(kind) = editable::classify_element(&target) else {
        return;
    };
    select_element(&document, &target, kind);
}

fn on_input() {
    // Editing can remove the selected element out from under us
    // (select-all plus delete).
    let detached_notify = CANVAS.with(|slot| {
        let mut guard = slot.borrow_mut();
        let editor = guard.as_mut()?;
        if editor.selection.invalidate_if_detached() {
            editor.callbacks.on_select.clone()
        } else {
            None
        }
    });
    if let Some(callback) = detached_notify {
        callback(None);
    }
    CANVAS.with(|slot| {
        if let Some(editor) = slot.borrow_mut().as_mut() {
            editor
                .typing
                .call(|| serialize_and_deliver(SerializePath::Debounced));
        }
    });
}

fn serialize_and_deliver(path: SerializePath) {
    let Some(document) = current_document() else {
        return;
    };
    let Some(html) = serialize_document(&document) else {
        return;
    };
    let (page_id, callback) = CANVAS.with(|slot| {
        let mut guard = slot.borrow_mut();
        let Some(editor) = guard.as_mut() else {
            return (String::new(), None);
        };
        if matches!(path, SerializePath::Committed) {
            editor.typing.cancel();
        }
        if let Some((loaded_html, _)) = editor.loaded.as_mut() {
            *loaded_html = html.clone();
        }
        let callback = match path {
            SerializePath::Debounced => editor.callbacks.on_change.clone(),
            SerializePath::Committed => editor.callbacks.on_commit.clone(),
        };
        (editor.page_id.clone(), callback)
    });
    if let Some(callback) = callback {
        callback(&page_id, html);
    }
}

fn on_wheel(event: &Event) {
    let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
        return;
    };
    if !(wheel.ctrl_key() || wheel.meta_key()) {
        return;
    }
    event.prevent_default();
    let callback = CANVAS.with(|slot| {
        slot.borrow()
            .as_ref()
            .and_then(|editor| editor.callbacks.on_wheel_zoom.clone())
    });
    if let Some(callback) = callback {
        callback(wheel.delta_y());
    }
}

fn on_mouse_down(event: &Event) {
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    let space_held = CANVAS.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|editor| editor.space_held)
            .unwrap_or(false)
    });
    let pan_start = mouse.button() == 1 || (space_held && mouse.button() == 0);
    if !pan_start {
        return;
    }
    event.prevent_default();
    CANVAS.with(|slot| {
        if let Some(editor) = slot.borrow_mut().as_mut() {
            editor.pan_anchor = Some((mouse.client_x(), mouse.client_y()));
            editor.panned = false;
        }
    });
}

fn on_mouse_move(event: &Event) {
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    let delta = CANVAS.with(|slot| {
        let mut guard = slot.borrow_mut();
        let editor = guard.as_mut()?;
        let (ax, ay) = editor.pan_anchor?;
        let (cx, cy) = (mouse.client_x(), mouse.client_y());
        editor.pan_anchor = Some((cx, cy));
        let (dx, dy) = ((cx - ax) as f64, (cy - ay) as f64);
        if dx != 0.0 || dy != 0.0 {
            editor.panned = true;
        }
        Some((dx, dy, editor.callbacks.on_pan.clone()))
    });
    if let Some((dx, dy, Some(callback))) = delta {
        callback(dx, dy);
    }
}

fn on_mouse_up() {
    CANVAS.with(|slot| {
        if let Some(editor) = slot.borrow_mut().as_mut() {
            editor.pan_anchor = None;
        }
    });
}

fn on_key(event: &Event, down: bool) {
    let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
        return;
    };
    if key.key() != " " {
        return;
    }
    // Space inside an editable element is typing, not a pan modifier.
    let editing = dom::event_target_element(event)
        .map(|el| dom::closest(&el, "[contenteditable=\"true\"]").is_some())
        .unwrap_or(false);
    if editing {
        return;
    }
    if down {
        event.prevent_default();
    }
    CANVAS.with(|slot| {
        if let Some(editor) = slot.borrow_mut().as_mut() {
            editor.space_held = down;
            if !down {
                editor.pan_anchor = None;
            }
        }
    });
}
