//! Host-side flipbook assembly.
//!
//! Owns the stage DOM, the flip-library mount, the turn/zoom state
//! machines, keyboard and wheel input, autoplay, and the host end of the
//! frame message protocol. All state lives in a thread-local slot; event
//! handlers are free functions that borrow it briefly, collect what they
//! need, and release before touching the DOM or the flip library (library
//! calls re-enter us synchronously through the turn callbacks).

use std::cell::{Cell, RefCell};

use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::{Interval, Timeout};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlIFrameElement, KeyboardEvent, MessageEvent,
    WheelEvent,
};

use crate::error::EditorError;
use crate::flipbook::keyboard::{
    escape_target, intent_for_key, wheel_zoom, KeyIntent, OverlayTarget, AUTOPLAY_INTERVAL_MS,
};
use crate::flipbook::loader;
use crate::flipbook::spread::{self, centering_offset, ViewMode};
use crate::flipbook::turn::{TurnPhase, TurnState, SETTLE_MS};
use crate::flipbook::zoom::{SpreadZoom, ZoomChange, ZoomPhase};
use crate::interactions::panel::render_popup_overlay;
use crate::protocol::inject::{viewer_frame_srcdoc, PAGE_HEIGHT, PAGE_WIDTH};
use crate::protocol::message::{
    post_to_frame, FrameMessage, PopupData, SpreadZoomData, ZoomMoveData,
};
use crate::utils::debounce::Debouncer;
use crate::utils::dom;

// The flip library is a jQuery plugin; web-sys has no binding for either,
// so call through this wrapper. Lookups happen at call time, after the
// loader has injected both scripts.
#[wasm_bindgen]
extern "C" {
    type JQuery;

    #[wasm_bindgen(catch, js_name = jQuery)]
    fn jquery(element: &Element) -> Result<JQuery, JsValue>;

    #[wasm_bindgen(method, catch, js_name = turn)]
    fn turn_init(this: &JQuery, options: &JsValue) -> Result<JQuery, JsValue>;

    #[wasm_bindgen(method, catch, js_name = turn)]
    fn turn_command(this: &JQuery, command: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = turn)]
    fn turn_goto(this: &JQuery, command: &str, page: u32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = turn)]
    fn turn_display(this: &JQuery, command: &str, mode: &str) -> Result<JsValue, JsValue>;
}

const HOST_STYLE_ID: &str = "fb-host-style";
const ZOOM_ENTER_MS: u32 = 350;
const CENTER_LOCK_MS: u32 = 150;

type TurnCallback = Closure<dyn FnMut(JsValue, JsValue, JsValue)>;

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase", default)]
pub struct FlipbookOptions {
    pub container_id: String,
    pub module_url: String,
    pub dependency_url: String,
    pub library_url: String,
    pub display: ViewMode,
    pub start_page: u32,
    pub sound_url: Option<String>,
}

impl Default for FlipbookOptions {
    fn default() -> Self {
        FlipbookOptions {
            container_id: String::new(),
            module_url: "./flipbook_editor_wasm.js".to_string(),
            dependency_url: loader::DEFAULT_DEPENDENCY_URL.to_string(),
            library_url: loader::DEFAULT_LIBRARY_URL.to_string(),
            display: ViewMode::Double,
            start_page: 1,
            sound_url: None,
        }
    }
}

/// JS-facing snapshot of the book state.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FlipbookState {
    pub current_page: u32,
    pub current_view: Vec<u32>,
    pub phase: TurnPhase,
    pub is_animating: bool,
    pub center_offset: f64,
    pub is_single_view: bool,
    pub zoom_phase: ZoomPhase,
    pub zoom_level: f64,
    pub autoplay: bool,
    pub thumbnails_open: bool,
    pub page_count: u32,
    pub loader: &'static str,
}

struct FlipbookEngine {
    container: Element,
    stage: HtmlElement,
    book: HtmlElement,
    frames: Vec<HtmlIFrameElement>,
    page_count: u32,
    mode: ViewMode,
    turn: TurnState,
    zoom: SpreadZoom,
    zoom_level: f64,
    autoplay: Option<Interval>,
    thumbnails_open: bool,
    sound_url: Option<String>,
    on_popup: Option<js_sys::Function>,
    center_lock: Debouncer,
    settle_timer: Option<Timeout>,
    zoom_enter_timer: Option<Timeout>,
    backdrop: Option<(Element, EventListener)>,
    popup_overlay: Option<(Element, EventListener)>,
    _listeners: Vec<EventListener>,
    _turn_callbacks: Vec<TurnCallback>,
}

thread_local! {
    static ENGINE: RefCell<Option<FlipbookEngine>> = RefCell::new(None);
    static INIT_ID: Cell<u64> = Cell::new(0);
}

fn book_width(mode: ViewMode) -> f64 {
    match mode {
        ViewMode::Single => PAGE_WIDTH as f64,
        ViewMode::Double => (PAGE_WIDTH * 2) as f64,
    }
}

/// Build the book inside `options.container_id` from a snapshot of page
/// html strings. A newer `init` supersedes an older one that is still
/// waiting on the script loader (the stale call tears down and refuses).
pub async fn init(
    pages: Vec<String>,
    options: FlipbookOptions,
    on_popup: Option<js_sys::Function>,
) -> Result<(), EditorError> {
    let my_id = INIT_ID.with(|cell| {
        let id = cell.get() + 1;
        cell.set(id);
        id
    });
    teardown_engine();

    loader::ensure_flip_runtime(&options.dependency_url, &options.library_url).await?;

    if INIT_ID.with(|cell| cell.get()) != my_id {
        return Err(EditorError::refused("flipbook initialization superseded"));
    }

    let document = dom::document()?;
    let container = dom::require_element(&document, &options.container_id)?;
    ensure_host_css(&document)?;

    let page_count = pages.len().max(1) as u32;
    let (stage, book, frames) = build_stage(&document, &container, &pages, &options)?;

    let mut turn_state = TurnState::new();
    turn_state.reset_to(options.start_page, page_count);

    let (turn_options, callbacks) = build_turn_options(&options, page_count)?;
    let mount = jquery(&book)
        .map_err(|_| EditorError::ScriptLoad("jQuery missing after load".to_string()))?;
    mount
        .turn_init(&turn_options)
        .map_err(|_| EditorError::ScriptLoad("flip library rejected init".to_string()))?;

    let listeners = install_listeners(&document, &container)?;

    let stage_html = as_html_element(&stage)?;
    let book_html = as_html_element(&book)?;

    ENGINE.with(|slot| {
        *slot.borrow_mut() = Some(FlipbookEngine {
            container,
            stage: stage_html,
            book: book_html,
            frames,
            page_count,
            mode: options.display,
            turn: turn_state,
            zoom: SpreadZoom::new(),
            zoom_level: 1.0,
            autoplay: None,
            thumbnails_open: false,
            sound_url: options.sound_url.clone(),
            on_popup,
            center_lock: Debouncer::new(CENTER_LOCK_MS),
            settle_timer: None,
            zoom_enter_timer: None,
            backdrop: None,
            popup_overlay: None,
            _listeners: listeners,
            _turn_callbacks: callbacks,
        });
    });

    refresh_centering();
    log::info!(
        "flipbook ready: {} pages, {:?} view",
        page_count,
        options.display
    );
    Ok(())
}

/// Tear down the book and invalidate any init still in flight.
pub fn destroy() {
    INIT_ID.with(|cell| cell.set(cell.get() + 1));
    teardown_engine();
}

fn teardown_engine() {
    let engine = ENGINE.with(|slot| slot.borrow_mut().take());
    if let Some(engine) = engine {
        if let Ok(mount) = jquery(&engine.book) {
            if mount.turn_command("destroy").is_err() {
                log::debug!("flip library destroy failed");
            }
        }
        engine.container.set_inner_html("");
    }
}

fn build_stage(
    document: &Document,
    container: &Element,
    pages: &[String],
    options: &FlipbookOptions,
) -> Result<(Element, Element, Vec<HtmlIFrameElement>), EditorError> {
    container.set_inner_html("");

    let stage = create_div(document, "fb-stage")?;
    let width = book_width(options.display);
    if let Some(html) = dom::as_html(&stage) {
        dom::set_style_property(&html, "width", &format!("{}px", width));
        dom::set_style_property(&html, "height", &format!("{}px", PAGE_HEIGHT));
    }

    let book = create_div(document, "fb-book")?;
    let mut frames = Vec::with_capacity(pages.len());
    for (index, page_html) in pages.iter().enumerate() {
        let page_div = create_div(document, "fb-page")?;
        let iframe: HtmlIFrameElement = document
            .create_element("iframe")
            .map_err(|_| EditorError::FrameUnavailable("create iframe".to_string()))?
            .dyn_into()
            .map_err(|_| EditorError::FrameUnavailable("iframe cast".to_string()))?;
        iframe
            .set_attribute("sandbox", "allow-scripts allow-same-origin allow-popups")
            .map_err(|_| EditorError::FrameUnavailable("iframe sandbox".to_string()))?;
        let srcdoc = viewer_frame_srcdoc(page_html, index as u32 + 1, &options.module_url)?;
        iframe.set_srcdoc(&srcdoc);
        page_div
            .append_child(&iframe)
            .map_err(|_| EditorError::FrameUnavailable("mount iframe".to_string()))?;
        book.append_child(&page_div)
            .map_err(|_| EditorError::FrameUnavailable("mount page".to_string()))?;
        frames.push(iframe);
    }

    stage
        .append_child(&book)
        .map_err(|_| EditorError::FrameUnavailable("mount book".to_string()))?;
    container
        .append_child(&stage)
        .map_err(|_| EditorError::FrameUnavailable("mount stage".to_string()))?;
    Ok((stage, book, frames))
}

fn build_turn_options(
    options: &FlipbookOptions,
    page_count: u32,
) -> Result<(JsValue, Vec<TurnCallback>), EditorError> {
    let turning: TurnCallback = Closure::new(move |event: JsValue, page: JsValue, _view| {
        let page = page.as_f64().unwrap_or(0.0) as u32;
        on_turning(&event, page);
    });
    let turned: TurnCallback = Closure::new(move |_event, page: JsValue, _view| {
        let page = page.as_f64().unwrap_or(0.0) as u32;
        on_turned(page);
    });
    let ended: TurnCallback = Closure::new(move |_event, _page, turned: JsValue| {
        on_turn_end(turned.as_bool().unwrap_or(true));
    });

    let when = js_sys::Object::new();
    set_js(&when, "turning", turning.as_ref())?;
    set_js(&when, "turned", turned.as_ref())?;
    set_js(&when, "end", ended.as_ref())?;

    let opts = js_sys::Object::new();
    set_js(&opts, "width", &JsValue::from_f64(book_width(options.display)))?;
    set_js(&opts, "height", &JsValue::from_f64(PAGE_HEIGHT as f64))?;
    set_js(
        &opts,
        "display",
        &JsValue::from_str(match options.display {
            ViewMode::Single => "single",
            ViewMode::Double => "double",
        }),
    )?;
    set_js(
        &opts,
        "page",
        &JsValue::from_f64(spread::clamp_page(options.start_page, page_count) as f64),
    )?;
    // The stage owns centering; the library must not fight it.
    set_js(&opts, "autoCenter", &JsValue::FALSE)?;
    set_js(&opts, "when", &when)?;

    Ok((opts.into(), vec![turning, turned, ended]))
}

fn set_js(target: &js_sys::Object, key: &str, value: &JsValue) -> Result<(), EditorError> {
    js_sys::Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|_| EditorError::Serde(format!("option {}", key)))
}

fn install_listeners(
    document: &Document,
    container: &Element,
) -> Result<Vec<EventListener>, EditorError> {
    let window = dom::window()?;
    let active = EventListenerOptions::enable_prevent_default();
    Ok(vec![
        EventListener::new(&window, "message", |event| on_message(event)),
        EventListener::new_with_options(document, "keydown", active, |event| on_keydown(event)),
        EventListener::new_with_options(container, "wheel", active, |event| on_wheel(event)),
    ])
}

fn create_div(document: &Document, class_name: &str) -> Result<Element, EditorError> {
    let div = document
        .create_element("div")
        .map_err(|_| EditorError::FrameUnavailable("create div".to_string()))?;
    div.set_class_name(class_name);
    Ok(div)
}

fn as_html_element(element: &Element) -> Result<HtmlElement, EditorError> {
    dom::as_html(element).ok_or_else(|| EditorError::FrameUnavailable("html element".to_string()))
}

fn ensure_host_css(document: &Document) -> Result<(), EditorError> {
    let css = format!(
        "\
.fb-stage {{ position: relative; margin: 0 auto; transition: transform 0.35s ease; transform-origin: center center; }}\n\
.fb-stage.fb-zoomed {{ z-index: 41; }}\n\
.fb-book {{ position: relative; margin: 0 auto; transition: transform 0.25s ease; }}\n\
.fb-page {{ width: {w}px; height: {h}px; overflow: hidden; background: #ffffff; }}\n\
.fb-page iframe {{ width: 100%; height: 100%; border: none; display: block; }}\n\
.fb-zoom-backdrop {{ position: fixed; inset: 0; background: rgba(17, 24, 39, 0.55); z-index: 40; cursor: zoom-out; }}\n\
.fb-popup-backdrop {{ position: fixed; inset: 0; background: rgba(17, 24, 39, 0.55); display: flex; align-items: center; justify-content: center; z-index: 50; }}\n\
.fb-popup-card {{ background: #ffffff; border-radius: 8px; padding: 24px; max-width: 70%; max-height: 80%; overflow: auto; box-shadow: 0 12px 40px rgba(0, 0, 0, 0.35); }}\n\
.fb-popup-text {{ white-space: pre-wrap; }}\n\
.fb-popup-image {{ display: block; max-width: 100%; max-height: 100%; }}\n\
.fb-popup-fit-cover .fb-popup-image {{ width: 100%; height: 100%; object-fit: cover; }}\n\
.fb-popup-fit-contain .fb-popup-image {{ width: 100%; height: 100%; object-fit: contain; }}\n",
        w = PAGE_WIDTH,
        h = PAGE_HEIGHT
    );
    dom::ensure_style_element(document, HOST_STYLE_ID, &css)
}

/// Programmatic turn. Refused mid-animation and for the current page.
pub fn turn_to_page(page: u32) -> Result<u32, EditorError> {
    let (target, book, exit_zoom) = ENGINE.with(|slot| {
        let mut guard = slot.borrow_mut();
        let engine = guard
            .as_mut()
            .ok_or_else(|| EditorError::FrameUnavailable("flipbook".to_string()))?;
        let target = engine.turn.begin(page, engine.page_count)?;
        let exit_zoom = engine.zoom.deactivate();
        Ok::<_, EditorError>((target, engine.book.clone(), exit_zoom))
    })?;

    if exit_zoom {
        exit_zoom_visuals();
    }
    refresh_centering();

    let mount = jquery(&book)
        .map_err(|_| EditorError::ScriptLoad("flip library unavailable".to_string()))?;
    mount
        .turn_goto("page", target)
        .map_err(|_| EditorError::ScriptLoad("flip command failed".to_string()))?;
    Ok(target)
}

fn on_turning(event: &JsValue, page: u32) {
    enum Decision {
        Prevent,
        Allow(Option<String>),
    }
    let decision = ENGINE.with(|slot| {
        let mut guard = slot.borrow_mut();
        let Some(engine) = guard.as_mut() else {
            return Decision::Prevent;
        };
        if engine.turn.is_animating() && engine.turn.pending_page() != Some(page) {
            return Decision::Prevent;
        }
        if !engine.turn.is_animating() {
            // Drag-initiated turn straight from the library.
            let _ = engine.turn.begin(page, engine.page_count);
        }
        Decision::Allow(engine.sound_url.clone())
    });
    match decision {
        Decision::Prevent => prevent_library_event(event),
        Decision::Allow(sound) => {
            if let Some(url) = sound {
                play_flip_sound(&url);
            }
            // Center on the destination view while the page is still in the
            // air.
            refresh_centering();
        }
    }
}

fn on_turned(page: u32) {
    ENGINE.with(|slot| {
        if let Some(engine) = slot.borrow_mut().as_mut() {
            engine.turn.complete_external(page, engine.page_count);
            engine.settle_timer = Some(Timeout::new(SETTLE_MS, on_settled));
        }
    });
}

fn on_settled() {
    ENGINE.with(|slot| {
        if let Some(engine) = slot.borrow_mut().as_mut() {
            engine.turn.settle();
            engine.center_lock.call(refresh_centering);
        }
    });
}

fn on_turn_end(turned: bool) {
    if turned {
        return;
    }
    ENGINE.with(|slot| {
        if let Some(engine) = slot.borrow_mut().as_mut() {
            engine.turn.finish(false);
        }
    });
    refresh_centering();
}

fn prevent_library_event(event: &JsValue) {
    if let Ok(prevent) = js_sys::Reflect::get(event, &JsValue::from_str("preventDefault")) {
        if let Some(function) = prevent.dyn_ref::<js_sys::Function>() {
            if function.call0(event).is_err() {
                log::debug!("preventDefault on turn event failed");
            }
        }
    }
}

fn play_flip_sound(url: &str) {
    match web_sys::HtmlAudioElement::new_with_src(url) {
        Ok(audio) => match audio.play() {
            Ok(promise) => {
                // Autoplay policies reject the promise; swallow it.
                spawn_local(async move {
                    let _ = JsFuture::from(promise).await;
                });
            }
            Err(_) => log::debug!("flip sound rejected"),
        },
        Err(_) => log::debug!("flip sound element failed"),
    }
}

fn refresh_centering() {
    let target = ENGINE.with(|slot| {
        let guard = slot.borrow();
        guard.as_ref().map(|engine| {
            let view = engine.turn.display_view(engine.page_count, engine.mode);
            let offset = centering_offset(&view, PAGE_WIDTH as f64);
            (engine.book.clone(), offset)
        })
    });
    if let Some((book, offset)) = target {
        dom::set_style_property(&book, "transform", &format!("translateX({}px)", offset));
    }
}

fn on_message(event: &Event) {
    let Some(message_event) = event.dyn_ref::<MessageEvent>() else {
        return;
    };
    let Some(message) = FrameMessage::from_event(message_event) else {
        return;
    };
    match message {
        FrameMessage::Navigate { page } => {
            if let Err(err) = turn_to_page(page) {
                log::debug!("navigate message dropped: {}", err);
            }
        }
        FrameMessage::SpreadZoom { data } => on_zoom_request(data),
        FrameMessage::ZoomMove { data } => on_zoom_move(data),
        FrameMessage::Popup { data } => on_popup_message(data),
        // Host broadcasts this; it never consumes it.
        FrameMessage::SetZoomState { .. } => {}
    }
}

fn on_zoom_request(data: SpreadZoomData) {
    let change = ENGINE.with(|slot| {
        let mut guard = slot.borrow_mut();
        let engine = guard.as_mut()?;
        if engine.turn.is_animating() {
            return None;
        }
        let view = engine.turn.display_view(engine.page_count, engine.mode);
        let change = engine.zoom.request(
            &data,
            &view,
            engine.mode,
            PAGE_WIDTH as f64,
            PAGE_HEIGHT as f64,
        );
        Some((change, engine.stage.clone(), engine.container.clone()))
    });
    let Some((change, stage, container)) = change else {
        return;
    };
    match change {
        ZoomChange::Entered(transform) => {
            if stage.class_list().add_1("fb-zoomed").is_err() {
                log::debug!("zoom class add failed");
            }
            dom::set_style_property(&stage, "transform", &transform.to_css());
            show_zoom_backdrop(&container);
            broadcast_zoom_state(true);
            ENGINE.with(|slot| {
                if let Some(engine) = slot.borrow_mut().as_mut() {
                    engine.zoom_enter_timer = Some(Timeout::new(ZOOM_ENTER_MS, || {
                        ENGINE.with(|slot| {
                            if let Some(engine) = slot.borrow_mut().as_mut() {
                                engine.zoom.mark_entered();
                            }
                        });
                    }));
                }
            });
        }
        ZoomChange::Exited => exit_zoom_visuals(),
    }
}

fn on_zoom_move(data: ZoomMoveData) {
    let update = ENGINE.with(|slot| {
        let mut guard = slot.borrow_mut();
        let engine = guard.as_mut()?;
        let transform = engine.zoom.pointer_move(data.mouse_x, data.mouse_y)?;
        Some((engine.stage.clone(), transform))
    });
    if let Some((stage, transform)) = update {
        dom::set_style_property(&stage, "transform", &transform.to_css());
    }
}

fn show_zoom_backdrop(container: &Element) {
    let Ok(document) = dom::document() else {
        return;
    };
    let Ok(backdrop) = create_div(&document, "fb-zoom-backdrop") else {
        return;
    };
    if container.append_child(&backdrop).is_err() {
        return;
    }
    let listener = EventListener::new(&backdrop, "click", |_| on_backdrop_click());
    ENGINE.with(|slot| {
        if let Some(engine) = slot.borrow_mut().as_mut() {
            engine.backdrop = Some((backdrop, listener));
        }
    });
}

fn on_backdrop_click() {
    let exited = ENGINE.with(|slot| {
        slot.borrow_mut()
            .as_mut()
            .map(|engine| engine.zoom.deactivate())
            .unwrap_or(false)
    });
    if exited {
        exit_zoom_visuals();
    }
}

fn exit_zoom_visuals() {
    let cleanup = ENGINE.with(|slot| {
        let mut guard = slot.borrow_mut();
        let engine = guard.as_mut()?;
        engine.zoom_enter_timer = None;
        let backdrop = engine.backdrop.take();
        Some((engine.stage.clone(), engine.zoom_level, backdrop))
    });
    let Some((stage, zoom_level, backdrop)) = cleanup else {
        return;
    };
    if stage.class_list().remove_1("fb-zoomed").is_err() {
        log::debug!("zoom class remove failed");
    }
    apply_page_zoom(&stage, zoom_level);
    if let Some((element, listener)) = backdrop {
        drop(listener);
        element.remove();
    }
    broadcast_zoom_state(false);
}

fn broadcast_zoom_state(active: bool) {
    let frames = ENGINE.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|engine| engine.frames.clone())
            .unwrap_or_default()
    });
    let message = FrameMessage::SetZoomState { active };
    for frame in frames {
        if let Some(window) = frame.content_window() {
            if let Err(err) = post_to_frame(&window, &message) {
                log::debug!("zoom broadcast failed: {}", err);
            }
        }
    }
}

fn apply_page_zoom(stage: &HtmlElement, level: f64) {
    if (level - 1.0).abs() < f64::EPSILON {
        dom::remove_style_property(stage, "transform");
    } else {
        dom::set_style_property(stage, "transform", &format!("scale({})", level));
    }
}

fn on_popup_message(data: PopupData) {
    let handler = ENGINE.with(|slot| {
        slot.borrow()
            .as_ref()
            .and_then(|engine| engine.on_popup.clone())
    });
    if let Some(callback) = handler {
        match serde_wasm_bindgen::to_value(&data) {
            Ok(payload) => {
                if callback.call1(&JsValue::NULL, &payload).is_err() {
                    log::debug!("popup callback threw");
                }
            }
            Err(err) => log::debug!("popup payload serialization failed: {}", err),
        }
        return;
    }

    // No host handler: render the built-in overlay.
    close_popup_overlay();
    let container = ENGINE.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|engine| engine.container.clone())
    });
    let Some(container) = container else {
        return;
    };
    let Ok(document) = dom::document() else {
        return;
    };
    match render_popup_overlay(&document, &container, &data) {
        Ok(overlay) => {
            let listener = EventListener::once(&overlay, "click", |_| close_popup_overlay());
            ENGINE.with(|slot| {
                if let Some(engine) = slot.borrow_mut().as_mut() {
                    engine.popup_overlay = Some((overlay, listener));
                }
            });
        }
        Err(err) => log::warn!("popup overlay failed: {}", err),
    }
}

fn close_popup_overlay() {
    let overlay = ENGINE.with(|slot| {
        slot.borrow_mut()
            .as_mut()
            .and_then(|engine| engine.popup_overlay.take())
    });
    if let Some((element, listener)) = overlay {
        drop(listener);
        element.remove();
    }
}

fn on_keydown(event: &Event) {
    let Some(keyboard_event) = event.dyn_ref::<KeyboardEvent>() else {
        return;
    };
    let Some(intent) = intent_for_key(&keyboard_event.key()) else {
        return;
    };
    keyboard_event.prevent_default();

    match intent {
        KeyIntent::NextPage => step_page(true),
        KeyIntent::PrevPage => step_page(false),
        KeyIntent::FirstPage => {
            if let Err(err) = turn_to_page(1) {
                log::debug!("home jump refused: {}", err);
            }
        }
        KeyIntent::LastPage => {
            let last = ENGINE.with(|slot| {
                slot.borrow().as_ref().map(|engine| engine.page_count)
            });
            if let Some(last) = last {
                if let Err(err) = turn_to_page(last) {
                    log::debug!("end jump refused: {}", err);
                }
            }
        }
        KeyIntent::ToggleAutoplay => {
            toggle_autoplay();
        }
        KeyIntent::CloseOverlay => handle_escape(),
    }
}

fn step_page(forward: bool) {
    let target = ENGINE.with(|slot| {
        let guard = slot.borrow();
        let engine = guard.as_ref()?;
        if engine.turn.is_animating() {
            return None;
        }
        let current = engine.turn.current_page();
        if forward {
            spread::next_page(current, engine.page_count, engine.mode)
        } else {
            spread::prev_page(current, engine.page_count, engine.mode)
        }
    });
    if let Some(page) = target {
        if let Err(err) = turn_to_page(page) {
            log::debug!("page step refused: {}", err);
        }
    }
}

fn handle_escape() {
    let Ok(document) = dom::document() else {
        return;
    };
    let fullscreen_open = document.fullscreen_element().is_some();
    let thumbnails_open = ENGINE.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|engine| engine.thumbnails_open)
            .unwrap_or(false)
    });
    match escape_target(fullscreen_open, thumbnails_open) {
        Some(OverlayTarget::Fullscreen) => document.exit_fullscreen(),
        Some(OverlayTarget::ThumbnailStrip) => set_thumbnails_open(false),
        None => {}
    }
}

fn on_wheel(event: &Event) {
    let Some(wheel_event) = event.dyn_ref::<WheelEvent>() else {
        return;
    };
    if !(wheel_event.ctrl_key() || wheel_event.meta_key()) {
        return;
    }
    // Ours, not the browser's page zoom.
    wheel_event.prevent_default();

    let update = ENGINE.with(|slot| {
        let mut guard = slot.borrow_mut();
        let engine = guard.as_mut()?;
        engine.zoom_level = wheel_zoom(engine.zoom_level, wheel_event.delta_y());
        if engine.zoom.is_active() {
            // Spread zoom owns the transform until it exits.
            return None;
        }
        Some((engine.stage.clone(), engine.zoom_level))
    });
    if let Some((stage, level)) = update {
        apply_page_zoom(&stage, level);
    }
}

/// Returns the new autoplay state.
pub fn toggle_autoplay() -> bool {
    ENGINE.with(|slot| {
        let mut guard = slot.borrow_mut();
        let Some(engine) = guard.as_mut() else {
            return false;
        };
        if engine.autoplay.take().is_some() {
            false
        } else {
            engine.autoplay = Some(Interval::new(AUTOPLAY_INTERVAL_MS, autoplay_tick));
            true
        }
    })
}

fn stop_autoplay() {
    ENGINE.with(|slot| {
        if let Some(engine) = slot.borrow_mut().as_mut() {
            engine.autoplay = None;
        }
    });
}

fn autoplay_tick() {
    enum Tick {
        Wait,
        Turn(u32),
        Stop,
    }
    let tick = ENGINE.with(|slot| {
        let guard = slot.borrow();
        let Some(engine) = guard.as_ref() else {
            return Tick::Stop;
        };
        if engine.turn.is_animating() {
            return Tick::Wait;
        }
        match spread::next_page(engine.turn.current_page(), engine.page_count, engine.mode) {
            Some(page) => Tick::Turn(page),
            None => Tick::Stop,
        }
    });
    match tick {
        Tick::Wait => {}
        Tick::Turn(page) => {
            if let Err(err) = turn_to_page(page) {
                log::debug!("autoplay turn refused: {}", err);
            }
        }
        Tick::Stop => stop_autoplay(),
    }
}

pub fn set_thumbnails_open(open: bool) {
    ENGINE.with(|slot| {
        if let Some(engine) = slot.borrow_mut().as_mut() {
            engine.thumbnails_open = open;
        }
    });
}

pub fn toggle_fullscreen() -> Result<(), EditorError> {
    let document = dom::document()?;
    if document.fullscreen_element().is_some() {
        document.exit_fullscreen();
        return Ok(());
    }
    let container = ENGINE.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|engine| engine.container.clone())
    })
    .ok_or_else(|| EditorError::FrameUnavailable("flipbook".to_string()))?;
    container
        .request_fullscreen()
        .map_err(|_| EditorError::FrameUnavailable("fullscreen request".to_string()))
}

/// Switch between single and double view. Resets zoom and recenters.
pub fn set_view_mode(mode: ViewMode) -> Result<(), EditorError> {
    let (book, stage, exit_zoom) = ENGINE.with(|slot| {
        let mut guard = slot.borrow_mut();
        let engine = guard
            .as_mut()
            .ok_or_else(|| EditorError::FrameUnavailable("flipbook".to_string()))?;
        engine.mode = mode;
        let exit_zoom = engine.zoom.deactivate();
        Ok::<_, EditorError>((engine.book.clone(), engine.stage.clone(), exit_zoom))
    })?;

    if exit_zoom {
        exit_zoom_visuals();
    }

    let mount = jquery(&book)
        .map_err(|_| EditorError::ScriptLoad("flip library unavailable".to_string()))?;
    let display = match mode {
        ViewMode::Single => "single",
        ViewMode::Double => "double",
    };
    mount
        .turn_display("display", display)
        .map_err(|_| EditorError::ScriptLoad("display switch failed".to_string()))?;

    dom::set_style_property(&stage, "width", &format!("{}px", book_width(mode)));
    refresh_centering();
    Ok(())
}

pub fn state_snapshot() -> Option<FlipbookState> {
    ENGINE.with(|slot| {
        let guard = slot.borrow();
        let engine = guard.as_ref()?;
        let view = engine.turn.display_view(engine.page_count, engine.mode);
        Some(FlipbookState {
            current_page: engine.turn.current_page(),
            current_view: view.slots(),
            phase: engine.turn.phase(),
            is_animating: engine.turn.is_animating(),
            center_offset: centering_offset(&view, PAGE_WIDTH as f64),
            is_single_view: engine.mode == ViewMode::Single,
            zoom_phase: engine.zoom.phase(),
            zoom_level: engine.zoom_level,
            autoplay: engine.autoplay.is_some(),
            thumbnails_open: engine.thumbnails_open,
            page_count: engine.page_count,
            loader: loader::state().as_str(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_fill_defaults() {
        let options: FlipbookOptions =
            serde_json::from_str(r#"{"containerId":"book-root"}"#).unwrap();
        assert_eq!(options.container_id, "book-root");
        assert_eq!(options.display, ViewMode::Double);
        assert_eq!(options.start_page, 1);
        assert_eq!(options.dependency_url, loader::DEFAULT_DEPENDENCY_URL);
        assert!(options.sound_url.is_none());
    }

    #[test]
    fn test_options_accept_single_display() {
        let options: FlipbookOptions = serde_json::from_str(
            r#"{"containerId":"book-root","display":"single","startPage":3}"#,
        )
        .unwrap();
        assert_eq!(options.display, ViewMode::Single);
        assert_eq!(options.start_page, 3);
    }

    #[test]
    fn test_book_width_follows_mode() {
        assert_eq!(book_width(ViewMode::Double), (PAGE_WIDTH * 2) as f64);
        assert_eq!(book_width(ViewMode::Single), PAGE_WIDTH as f64);
    }
}
