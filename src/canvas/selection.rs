//! Selection tracking and the outline stylesheet.
//!
//! At most one element carries the selection outline. Every select and
//! deselect sweeps all current carriers before marking the new one, so the
//! invariant holds even if markup arrived with a stale class baked in.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use crate::models::element::ElementKind;

/// Class that paints the selection outline. Also stripped by the
/// serializer and by viewer-side artifact cleanup, in exactly this form.
pub const SELECTED_CLASS: &str = "fb-selected";

/// Id of the stylesheet injected into the editing document.
pub const EDITOR_STYLE_ID: &str = "fb-editor-style";

/// Visuals for editable affordances inside the canvas. The selection
/// outline replaces the UA focus ring on contenteditable elements.
pub const EDITOR_CSS: &str = "\
[data-editable] { cursor: pointer; }\n\
[data-editable]:hover { outline: 1px dashed #94a3b8; outline-offset: 2px; }\n\
[contenteditable=\"true\"] { cursor: text; }\n\
[contenteditable=\"true\"]:focus { outline: none; }\n\
.fb-selected { outline: 2px solid #3b82f6 !important; outline-offset: 2px; }\n";

/// A live reference into the canvas document plus its kind tag. Never
/// serialized; dies with the document it came from.
#[derive(Clone)]
pub struct SelectedElement {
    pub element: Element,
    pub kind: ElementKind,
}

/// Host-side record of what is selected in the canvas document.
#[derive(Default)]
pub struct Selection {
    current: Option<SelectedElement>,
}

impl Selection {
    pub fn new() -> Self {
        Selection { current: None }
    }

    pub fn current(&self) -> Option<&SelectedElement> {
        self.current.as_ref()
    }

    /// True when `element` is the one already selected.
    pub fn is_selected(&self, element: &Element) -> bool {
        self.current
            .as_ref()
            .map(|sel| sel.element.is_same_node(Some(element)))
            .unwrap_or(false)
    }

    /// Outline `element`, clearing every other carrier first.
    pub fn select(&mut self, document: &Document, element: &Element, kind: ElementKind) {
        sweep_outlines(document);
        element.class_list().add_1(SELECTED_CLASS).ok();
        self.current = Some(SelectedElement {
            element: element.clone(),
            kind,
        });
    }

    /// Clear the outline and forget the element.
    pub fn deselect(&mut self, document: &Document) {
        sweep_outlines(document);
        self.current = None;
    }

    /// Drop without touching the DOM. Used when the document itself is
    /// being replaced and the old element references are about to die.
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Forget a selection whose element left the document (deleted while
    /// editing, replaced by a reload). Returns true when it was dropped.
    pub fn invalidate_if_detached(&mut self) -> bool {
        let detached = self
            .current
            .as_ref()
            .map(|sel| !sel.element.is_connected())
            .unwrap_or(false);
        if detached {
            self.current = None;
        }
        detached
    }
}

/// Remove the outline class from every element carrying it.
pub fn sweep_outlines(document: &Document) {
    let carriers = match document.query_selector_all(&format!(".{}", SELECTED_CLASS)) {
        Ok(list) => list,
        Err(_) => return,
    };
    for i in 0..carriers.length() {
        let Some(node) = carriers.item(i) else {
            continue;
        };
        if let Some(element) = node.dyn_ref::<Element>() {
            element.class_list().remove_1(SELECTED_CLASS).ok();
            if element.class_name().is_empty() {
                element.remove_attribute("class").ok();
            }
        }
    }
}
