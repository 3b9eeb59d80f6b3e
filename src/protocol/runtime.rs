//! Viewer runtime installed inside each page frame.
//!
//! Every rendered page boots this same wasm module and calls `install` with
//! its 1-based page number. Interaction handling is delegated at the
//! document level so elements added after load still work. Anything that
//! affects the book as a whole (navigation, popups, spread zoom) is posted
//! to the parent; everything element-local (tooltips, links, calls,
//! downloads) is handled in-frame.

use std::cell::RefCell;

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Blob, Document, Element, Event, HtmlAnchorElement, MessageEvent, MouseEvent, Response, Url,
};

use crate::error::EditorError;
use crate::interactions::apply::read_element_interaction;
use crate::models::{InteractionKind, InteractionSpec, TriggerKind};
use crate::protocol::message::{
    post_to_parent, ElementRect, FrameMessage, PopupData, SpreadZoomData, ZoomMoveData,
};
use crate::protocol::tooltip::{place_tooltip, within_hover_region, TooltipPlacement};
use crate::utils::dom;

/// Scale used when a zoom interaction has no explicit multiplier.
pub const DEFAULT_ZOOM_SCALE: f64 = 2.0;

/// Prefix for numbers without an explicit country code (10 digits).
pub const DEFAULT_COUNTRY_CODE: &str = "1";

const ZOOM_ACTIVE_CLASS: &str = "fb-zoom-active";
const VISIT_LABEL: &str = "Visit";

struct ActiveTooltip {
    owner: Element,
    node: Element,
    target_rect: ElementRect,
    placement: TooltipPlacement,
    width: f64,
    height: f64,
}

struct ViewerRuntime {
    page: u32,
    zoom_active: bool,
    zoom_element: Option<Element>,
    zoom_id_seq: u32,
    hover_target: Option<Element>,
    tooltip: Option<ActiveTooltip>,
    _listeners: Vec<EventListener>,
}

thread_local! {
    static RUNTIME: RefCell<Option<ViewerRuntime>> = RefCell::new(None);
}

/// Wire up delegation and remember the frame's page number. Installing a
/// second time replaces the previous runtime (listeners drop with it).
pub fn install(page_number: u32) -> Result<(), EditorError> {
    let document = dom::document()?;
    let window = dom::window()?;

    let listeners = vec![
        EventListener::new(&document, "click", |event| on_click(event)),
        EventListener::new(&document, "mouseover", |event| on_mouseover(event)),
        EventListener::new(&document, "mousemove", |event| on_mousemove(event)),
        EventListener::new(&window, "message", |event| on_message(event)),
    ];

    RUNTIME.with(|slot| {
        *slot.borrow_mut() = Some(ViewerRuntime {
            page: page_number,
            zoom_active: false,
            zoom_element: None,
            zoom_id_seq: 0,
            hover_target: None,
            tooltip: None,
            _listeners: listeners,
        });
    });
    log::debug!("viewer runtime installed for page {}", page_number);
    Ok(())
}

fn runtime_page() -> u32 {
    RUNTIME.with(|slot| slot.borrow().as_ref().map(|rt| rt.page).unwrap_or(1))
}

fn on_click(event: &Event) {
    let Some(target) = dom::event_target_element(event) else {
        return;
    };
    let Some(element) = dom::closest(&target, "[data-interaction]") else {
        return;
    };
    let spec = read_element_interaction(&element);
    if spec.trigger == TriggerKind::Hover {
        return;
    }
    run_interaction(&element, &spec);
}

fn on_mouseover(event: &Event) {
    let Some(target) = dom::event_target_element(event) else {
        return;
    };
    let hit = dom::closest(&target, "[data-interaction]");

    let entered = RUNTIME.with(|slot| {
        let mut guard = slot.borrow_mut();
        let Some(rt) = guard.as_mut() else {
            return false;
        };
        match &hit {
            None => {
                rt.hover_target = None;
                false
            }
            Some(element) => {
                if rt.hover_target.as_ref() == Some(element) {
                    false
                } else {
                    rt.hover_target = Some(element.clone());
                    true
                }
            }
        }
    });
    if !entered {
        return;
    }
    let Some(element) = hit else {
        return;
    };

    let spec = read_element_interaction(&element);
    if spec.trigger != TriggerKind::Hover {
        return;
    }
    match spec.kind {
        // Hover-triggered links cannot open windows from a hover handler;
        // they degrade to a tooltip carrying a real anchor.
        InteractionKind::Link => {
            if let Some(url) = spec.value.clone() {
                if let Err(err) = show_tooltip(&element, &spec, TooltipContent::VisitLink(&url)) {
                    log::debug!("visit tooltip failed: {}", err);
                }
            }
        }
        InteractionKind::Tooltip => {
            let content = spec.content.clone().unwrap_or_default();
            if let Err(err) = show_tooltip(&element, &spec, TooltipContent::Text(&content)) {
                log::debug!("tooltip failed: {}", err);
            }
        }
        _ => run_interaction(&element, &spec),
    }
}

fn on_mousemove(event: &Event) {
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    let x = mouse.client_x() as f64;
    let y = mouse.client_y() as f64;

    let drop_tooltip = RUNTIME.with(|slot| {
        let guard = slot.borrow();
        let Some(rt) = guard.as_ref() else {
            return false;
        };
        match &rt.tooltip {
            Some(tip) => !within_hover_region(
                x,
                y,
                &tip.target_rect,
                &tip.placement,
                tip.width,
                tip.height,
            ),
            None => false,
        }
    });
    if drop_tooltip {
        remove_tooltip();
    }

    let zoomed = RUNTIME.with(|slot| {
        slot.borrow()
            .as_ref()
            .filter(|rt| rt.zoom_active)
            .and_then(|rt| rt.zoom_element.clone())
    });
    if let Some(element) = zoomed {
        let rect = element.get_bounding_client_rect();
        post_or_log(&FrameMessage::ZoomMove {
            data: ZoomMoveData {
                mouse_x: normalized_within(x, rect.x(), rect.width()),
                mouse_y: normalized_within(y, rect.y(), rect.height()),
            },
        });
    }
}

fn on_message(event: &Event) {
    let Some(message_event) = event.dyn_ref::<MessageEvent>() else {
        return;
    };
    let Some(FrameMessage::SetZoomState { active }) = FrameMessage::from_event(message_event)
    else {
        return;
    };
    RUNTIME.with(|slot| {
        if let Some(rt) = slot.borrow_mut().as_mut() {
            rt.zoom_active = active;
            if !active {
                rt.zoom_element = None;
            }
        }
    });
    if let Ok(document) = dom::document() {
        if let Some(body) = document.body() {
            let class_list = body.class_list();
            let result = if active {
                class_list.add_1(ZOOM_ACTIVE_CLASS)
            } else {
                class_list.remove_1(ZOOM_ACTIVE_CLASS)
            };
            if result.is_err() {
                log::debug!("zoom cursor class toggle failed");
            }
        }
    }
}

fn run_interaction(element: &Element, spec: &InteractionSpec) {
    match spec.kind {
        InteractionKind::None => {}
        InteractionKind::Link => {
            if let Some(url) = &spec.value {
                open_in_new_tab(url);
            }
        }
        InteractionKind::Navigation => match spec.value.as_deref().map(str::parse::<u32>) {
            Some(Ok(page)) => post_or_log(&FrameMessage::Navigate { page }),
            _ => log::debug!("navigation interaction without a valid page number"),
        },
        InteractionKind::Call => {
            if let Some(raw) = &spec.value {
                launch_call(raw);
            }
        }
        InteractionKind::Zoom => {
            let scale = spec
                .value
                .as_deref()
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(DEFAULT_ZOOM_SCALE);
            let rect = element.get_bounding_client_rect();
            let element_id = ensure_element_id(element);
            RUNTIME.with(|slot| {
                if let Some(rt) = slot.borrow_mut().as_mut() {
                    rt.zoom_element = Some(element.clone());
                }
            });
            post_or_log(&FrameMessage::SpreadZoom {
                data: SpreadZoomData {
                    element_id,
                    scale,
                    rect: ElementRect {
                        x: rect.x(),
                        y: rect.y(),
                        width: rect.width(),
                        height: rect.height(),
                    },
                    page: runtime_page(),
                },
            });
        }
        InteractionKind::Popup => {
            let styles = if spec.popup_style.is_empty() {
                None
            } else {
                Some(spec.popup_style.clone())
            };
            let tag = element.tag_name().to_lowercase();
            let (element_type, element_source) = if tag == "img" {
                ("image".to_string(), element.get_attribute("src"))
            } else {
                ("text".to_string(), None)
            };
            post_or_log(&FrameMessage::Popup {
                data: PopupData {
                    content: spec.content.clone().unwrap_or_default(),
                    styles,
                    element_type,
                    element_source,
                },
            });
        }
        InteractionKind::Tooltip => {
            // Click-triggered tooltips toggle.
            let shown_for_element = RUNTIME.with(|slot| {
                slot.borrow()
                    .as_ref()
                    .and_then(|rt| rt.tooltip.as_ref())
                    .map(|tip| &tip.owner == element)
                    .unwrap_or(false)
            });
            if shown_for_element {
                remove_tooltip();
            } else {
                let content = spec.content.clone().unwrap_or_default();
                if let Err(err) = show_tooltip(element, spec, TooltipContent::Text(&content)) {
                    log::debug!("tooltip failed: {}", err);
                }
            }
        }
        InteractionKind::Download => start_download(spec),
        InteractionKind::ThreeDViewer | InteractionKind::Slideshow => {
            log::debug!(
                "{} interactions are rendered by their own embeds",
                spec.kind.as_str()
            );
        }
    }
}

enum TooltipContent<'a> {
    Text(&'a str),
    VisitLink(&'a str),
}

fn show_tooltip(
    element: &Element,
    spec: &InteractionSpec,
    content: TooltipContent<'_>,
) -> Result<(), EditorError> {
    remove_tooltip();
    let document = dom::document()?;
    let node = document
        .create_element("div")
        .map_err(|_| EditorError::FrameUnavailable("create tooltip".to_string()))?;
    node.set_class_name("fb-tooltip");

    match content {
        TooltipContent::Text(text) => node.set_text_content(Some(text)),
        TooltipContent::VisitLink(url) => {
            let anchor: HtmlAnchorElement = document
                .create_element("a")
                .map_err(|_| EditorError::FrameUnavailable("create anchor".to_string()))?
                .dyn_into()
                .map_err(|_| EditorError::FrameUnavailable("anchor cast".to_string()))?;
            anchor.set_href(url);
            anchor.set_target("_blank");
            anchor.set_rel("noopener");
            anchor.set_text_content(Some(VISIT_LABEL));
            node.append_child(&anchor)
                .map_err(|_| EditorError::FrameUnavailable("append anchor".to_string()))?;
        }
    }

    if let Some(html) = dom::as_html(&node) {
        if let Some(background) = &spec.tooltip_style.background {
            dom::set_style_property(&html, "background", background);
        }
        if let Some(color) = &spec.tooltip_style.color {
            dom::set_style_property(&html, "color", color);
        }
    }

    let body = document
        .body()
        .ok_or_else(|| EditorError::FrameUnavailable("body".to_string()))?;
    body.append_child(&node)
        .map_err(|_| EditorError::FrameUnavailable("append tooltip".to_string()))?;

    let target = element.get_bounding_client_rect();
    let target_rect = ElementRect {
        x: target.x(),
        y: target.y(),
        width: target.width(),
        height: target.height(),
    };
    let tip = node.get_bounding_client_rect();
    let (vw, vh) = viewport_size();
    let placement = place_tooltip(&target_rect, tip.width(), tip.height(), vw, vh);
    if let Some(html) = dom::as_html(&node) {
        dom::set_style_property(&html, "left", &format!("{}px", placement.left));
        dom::set_style_property(&html, "top", &format!("{}px", placement.top));
    }

    RUNTIME.with(|slot| {
        if let Some(rt) = slot.borrow_mut().as_mut() {
            rt.tooltip = Some(ActiveTooltip {
                owner: element.clone(),
                node,
                target_rect,
                placement,
                width: tip.width(),
                height: tip.height(),
            });
        }
    });
    Ok(())
}

fn remove_tooltip() {
    let node = RUNTIME.with(|slot| {
        slot.borrow_mut()
            .as_mut()
            .and_then(|rt| rt.tooltip.take())
            .map(|tip| tip.node)
    });
    if let Some(node) = node {
        node.remove();
    }
}

fn launch_call(raw: &str) {
    let digits = normalize_phone(raw);
    if digits.is_empty() {
        log::debug!("call interaction without digits");
        return;
    }
    let mobile = dom::window()
        .ok()
        .map(|w| is_mobile_user_agent(&w.navigator().user_agent().unwrap_or_default()))
        .unwrap_or(false);
    let target = call_target(&digits, mobile);
    if target.starts_with("tel:") {
        if let Ok(window) = dom::window() {
            if window.location().set_href(&target).is_err() {
                log::debug!("tel: navigation failed");
            }
        }
    } else {
        open_in_new_tab(&target);
    }
}

fn start_download(spec: &InteractionSpec) {
    let Some(value) = spec.value.clone() else {
        log::debug!("download interaction without a payload");
        return;
    };
    let filename = spec
        .filename
        .clone()
        .unwrap_or_else(|| "download".to_string());

    if value.starts_with("data:") {
        if let Err(err) = anchor_download(&value, &filename) {
            log::warn!("download failed: {}", err);
        }
        return;
    }

    // Remote asset: fetch into a blob so cross-origin files still save with
    // our filename; fall back to a plain link when the fetch fails.
    spawn_local(async move {
        match fetch_to_object_url(&value).await {
            Ok(object_url) => {
                if let Err(err) = anchor_download(&object_url, &filename) {
                    log::warn!("download failed: {}", err);
                }
                if Url::revoke_object_url(&object_url).is_err() {
                    log::debug!("revoke_object_url failed");
                }
            }
            Err(err) => {
                log::debug!("blob download unavailable ({}), using direct link", err);
                if let Err(err) = anchor_download(&value, &filename) {
                    log::warn!("download failed: {}", err);
                }
            }
        }
    });
}

async fn fetch_to_object_url(url: &str) -> Result<String, EditorError> {
    let window = dom::window()?;
    let response_value = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|_| EditorError::FrameUnavailable(format!("fetch {}", url)))?;
    let response: Response = response_value
        .dyn_into()
        .map_err(|_| EditorError::FrameUnavailable("response cast".to_string()))?;
    if !response.ok() {
        return Err(EditorError::FrameUnavailable(format!(
            "fetch {} returned {}",
            url,
            response.status()
        )));
    }
    let blob_value = JsFuture::from(
        response
            .blob()
            .map_err(|_| EditorError::FrameUnavailable("response blob".to_string()))?,
    )
    .await
    .map_err(|_| EditorError::FrameUnavailable("blob read".to_string()))?;
    let blob: Blob = blob_value
        .dyn_into()
        .map_err(|_| EditorError::FrameUnavailable("blob cast".to_string()))?;
    Url::create_object_url_with_blob(&blob)
        .map_err(|_| EditorError::FrameUnavailable("create object url".to_string()))
}

fn anchor_download(href: &str, filename: &str) -> Result<(), EditorError> {
    let document = dom::document()?;
    let anchor = hidden_anchor(&document, href)?;
    anchor.set_download(filename);
    click_and_remove(&document, &anchor)
}

fn open_in_new_tab(url: &str) {
    let Ok(window) = dom::window() else {
        return;
    };
    match window.open_with_url_and_target(url, "_blank") {
        Ok(Some(_)) => {}
        _ => {
            // Pop-up blocked: an anchor click inside the same gesture is
            // usually still allowed.
            if let Ok(document) = dom::document() {
                if let Ok(anchor) = hidden_anchor(&document, url) {
                    anchor.set_target("_blank");
                    anchor.set_rel("noopener");
                    if let Err(err) = click_and_remove(&document, &anchor) {
                        log::debug!("open_in_new_tab fallback failed: {}", err);
                    }
                }
            }
        }
    }
}

fn hidden_anchor(document: &Document, href: &str) -> Result<HtmlAnchorElement, EditorError> {
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|_| EditorError::FrameUnavailable("create anchor".to_string()))?
        .dyn_into()
        .map_err(|_| EditorError::FrameUnavailable("anchor cast".to_string()))?;
    anchor.set_href(href);
    if anchor.set_attribute("style", "display:none;").is_err() {
        log::debug!("anchor style write failed");
    }
    Ok(anchor)
}

fn click_and_remove(document: &Document, anchor: &HtmlAnchorElement) -> Result<(), EditorError> {
    let body = document
        .body()
        .ok_or_else(|| EditorError::FrameUnavailable("body".to_string()))?;
    body.append_child(anchor)
        .map_err(|_| EditorError::FrameUnavailable("append anchor".to_string()))?;
    anchor.click();
    anchor.remove();
    Ok(())
}

fn post_or_log(message: &FrameMessage) {
    if let Err(err) = post_to_parent(message) {
        log::debug!("postMessage failed: {}", err);
    }
}

/// Zoom toggling is keyed by element id on the host side; elements authored
/// without an id get one minted on first use.
fn ensure_element_id(element: &Element) -> String {
    let existing = element.id();
    if !existing.is_empty() {
        return existing;
    }
    let seq = RUNTIME.with(|slot| {
        let mut guard = slot.borrow_mut();
        match guard.as_mut() {
            Some(rt) => {
                rt.zoom_id_seq += 1;
                rt.zoom_id_seq
            }
            None => 0,
        }
    });
    let id = format!("fb-zoom-{}-{}", runtime_page(), seq);
    element.set_id(&id);
    id
}

fn viewport_size() -> (f64, f64) {
    let Ok(window) = dom::window() else {
        return (0.0, 0.0);
    };
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (width, height)
}

/// Digits only; bare 10-digit numbers get the default country code.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("{}{}", DEFAULT_COUNTRY_CODE, digits)
    } else {
        digits
    }
}

/// Phones dial directly; desktops go through the messaging web client.
pub fn call_target(digits: &str, mobile: bool) -> String {
    if mobile {
        format!("tel:+{}", digits)
    } else {
        format!("https://wa.me/{}", digits)
    }
}

pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    ["Android", "iPhone", "iPad", "Mobi"]
        .iter()
        .any(|token| user_agent.contains(token))
}

/// Clamp a client coordinate into the 0..1 range of a rect axis.
pub fn normalized_within(value: f64, start: f64, extent: f64) -> f64 {
    if extent <= 0.0 {
        0.0
    } else {
        ((value - start) / extent).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_digit_number_gets_country_code() {
        assert_eq!(normalize_phone("(555) 123-4567"), "15551234567");
    }

    #[test]
    fn test_full_number_kept_as_is() {
        assert_eq!(normalize_phone("+44 20 7946 0958"), "442079460958");
    }

    #[test]
    fn test_call_target_branches_on_device() {
        assert_eq!(call_target("15551234567", true), "tel:+15551234567");
        assert_eq!(call_target("15551234567", false), "https://wa.me/15551234567");
    }

    #[test]
    fn test_mobile_user_agents() {
        assert!(is_mobile_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"
        ));
        assert!(is_mobile_user_agent("Mozilla/5.0 (Linux; Android 14)"));
        assert!(!is_mobile_user_agent(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)"
        ));
    }

    #[test]
    fn test_normalized_within_clamps() {
        assert_eq!(normalized_within(90.0, 100.0, 800.0), 0.0);
        assert_eq!(normalized_within(500.0, 100.0, 800.0), 0.5);
        assert_eq!(normalized_within(950.0, 100.0, 800.0), 1.0);
        assert_eq!(normalized_within(10.0, 0.0, 0.0), 0.0);
    }
}
