//! Editable wiring for a freshly loaded canvas document.
//!
//! Classification is by tag class (see `models::element::classify_tag`):
//! text-bearing tags become contenteditable, media tags become
//! click-selectable only. Everything gets `data-editable` so the delegated
//! handlers and the serializer can find the wired set again.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use crate::models::element::{classify_tag, ElementKind};
use crate::utils::dom;

/// Marker attribute on every selectable element, in exactly the form the
/// serializer strips.
pub const EDITABLE_ATTR: &str = "data-editable";

/// Selector matching the wired set.
pub const EDITABLE_SELECTOR: &str = "[data-editable=\"true\"]";

/// Classify a live element, or `None` when it is not directly editable.
/// Placeholder chrome is never editable.
pub fn classify_element(element: &Element) -> Option<ElementKind> {
    if dom::closest(element, ".fb-placeholder").is_some() {
        return None;
    }
    let source = element.get_attribute("src");
    classify_tag(
        &element.tag_name(),
        element.child_element_count() > 0,
        source.as_deref(),
    )
}

/// Mark every editable element under `document`'s body. Returns how many
/// were wired.
pub fn wire_document(document: &Document) -> usize {
    let Some(body) = document.body() else {
        return 0;
    };
    let all = match body.query_selector_all("*") {
        Ok(list) => list,
        Err(_) => return 0,
    };
    let mut wired = 0;
    for i in 0..all.length() {
        let Some(node) = all.item(i) else {
            continue;
        };
        let Some(element) = node.dyn_ref::<Element>() else {
            continue;
        };
        let Some(kind) = classify_element(element) else {
            continue;
        };
        if kind == ElementKind::Text {
            element.set_attribute("contenteditable", "true").ok();
        }
        element.set_attribute(EDITABLE_ATTR, "true").ok();
        wired += 1;
    }
    wired
}

/// The wired elements and their kinds, re-classified live (a src swap can
/// turn an image into a gif between wiring and query).
pub fn selectable_elements(document: &Document) -> Vec<(Element, ElementKind)> {
    let mut found = Vec::new();
    let list = match document.query_selector_all(EDITABLE_SELECTOR) {
        Ok(list) => list,
        Err(_) => return found,
    };
    for i in 0..list.length() {
        let Some(node) = list.item(i) else {
            continue;
        };
        let Some(element) = node.dyn_ref::<Element>() else {
            continue;
        };
        if let Some(kind) = classify_element(element) {
            found.push((element.clone(), kind));
        }
    }
    found
}
