//! Full-document serialization for the canvas.
//!
//! The read-back includes the doctype and the injected editor stylesheet.
//! Transient editing attributes are stripped from a detached clone; the
//! live document, and the caret inside it, is never touched.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use crate::canvas::editable::EDITABLE_ATTR;
use crate::canvas::selection::SELECTED_CLASS;

/// Serialize the whole canvas document into markup suitable for the page
/// store. Returns `None` when the document has no root element yet.
pub fn serialize_document(document: &Document) -> Option<String> {
    let root = document.document_element()?;
    let clone: Element = root.clone_node_with_deep(true).ok()?.dyn_into().ok()?;
    strip_editing_attributes(&clone);
    let mut out = String::new();
    if document.doctype().is_some() {
        out.push_str("<!DOCTYPE html>");
    }
    out.push_str(&clone.outer_html());
    Some(out)
}

fn strip_editing_attributes(root: &Element) {
    let selector = format!("[contenteditable], [{}], .{}", EDITABLE_ATTR, SELECTED_CLASS);
    let Ok(list) = root.query_selector_all(&selector) else {
        return;
    };
    for i in 0..list.length() {
        let Some(node) = list.item(i) else {
            continue;
        };
        let Some(element) = node.dyn_ref::<Element>() else {
            continue;
        };
        element.remove_attribute("contenteditable").ok();
        element.remove_attribute(EDITABLE_ATTR).ok();
        element.class_list().remove_1(SELECTED_CLASS).ok();
        if element.class_name().is_empty() {
            element.remove_attribute("class").ok();
        }
    }
}
