//! Shared web-sys lookups and small DOM conveniences.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlIFrameElement, Window};

use crate::error::EditorError;

pub fn window() -> Result<Window, EditorError> {
    web_sys::window().ok_or_else(|| EditorError::FrameUnavailable("window".to_string()))
}

pub fn document() -> Result<Document, EditorError> {
    window()?
        .document()
        .ok_or_else(|| EditorError::FrameUnavailable("document".to_string()))
}

/// Required lookup: a missing host container is a caller error, reported as
/// retryable so the host can mount the node and call again.
pub fn require_element(doc: &Document, id: &str) -> Result<Element, EditorError> {
    doc.get_element_by_id(id)
        .ok_or_else(|| EditorError::ContainerNotFound(id.to_string()))
}

/// The sandboxed document behind an iframe, if the frame has loaded.
pub fn frame_document(frame: &HtmlIFrameElement) -> Option<Document> {
    frame.content_document()
}

pub fn event_target_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

/// Nearest ancestor (or self) matching `selector`, None when the lookup
/// fails or nothing matches.
pub fn closest(element: &Element, selector: &str) -> Option<Element> {
    element.closest(selector).ok().flatten()
}

pub fn as_html(element: &Element) -> Option<HtmlElement> {
    element.dyn_ref::<HtmlElement>().cloned()
}

/// Idempotent stylesheet injection: one `<style>` per id, replaced in place
/// when the css changes.
pub fn ensure_style_element(doc: &Document, id: &str, css: &str) -> Result<(), EditorError> {
    if let Some(existing) = doc.get_element_by_id(id) {
        if existing.text_content().as_deref() != Some(css) {
            existing.set_text_content(Some(css));
        }
        return Ok(());
    }
    let style = doc
        .create_element("style")
        .map_err(|_| EditorError::FrameUnavailable("create style element".to_string()))?;
    style.set_id(id);
    style.set_text_content(Some(css));
    let head = doc
        .head()
        .ok_or_else(|| EditorError::FrameUnavailable("document head".to_string()))?;
    head.append_child(&style)
        .map_err(|_| EditorError::FrameUnavailable("append style element".to_string()))?;
    Ok(())
}

/// Inline style write that downgrades failures to a debug log; style writes
/// are never load-bearing enough to abort an edit.
pub fn set_style_property(element: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = element.style().set_property(property, value) {
        log::debug!("style write {}: {:?} failed: {:?}", property, value, err);
    }
}

pub fn remove_style_property(element: &HtmlElement, property: &str) {
    if element.style().remove_property(property).is_err() {
        log::debug!("style remove {} failed", property);
    }
}

/// Inline style declaration for html and svg elements alike (icons are
/// inline svg).
pub fn element_style(element: &Element) -> Option<web_sys::CssStyleDeclaration> {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        return Some(html.style());
    }
    element
        .dyn_ref::<web_sys::SvgElement>()
        .map(|svg| svg.style())
}

pub fn set_element_style(element: &Element, property: &str, value: &str) {
    if let Some(style) = element_style(element) {
        if style.set_property(property, value).is_err() {
            log::debug!("style write {} failed", property);
        }
    }
}

pub fn remove_element_style(element: &Element, property: &str) {
    if let Some(style) = element_style(element) {
        if style.remove_property(property).is_err() {
            log::debug!("style remove {} failed", property);
        }
    }
}
