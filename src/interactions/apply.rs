//! Reading and writing the interaction attribute family on live elements.
//!
//! The attributes are the single source of truth: the panel edits them, the
//! serializer persists them, and the viewer runtime reads them back. Writes
//! always sweep the whole family first so a kind switch can never leave
//! attributes of the previous kind behind.

use web_sys::Element;

use crate::error::EditorError;
use crate::models::interaction::{is_interaction_attribute, InteractionSpec};

/// Every attribute present on the element, in document order.
pub fn element_attribute_pairs(element: &Element) -> Vec<(String, String)> {
    let map = element.attributes();
    let mut pairs = Vec::with_capacity(map.length() as usize);
    for index in 0..map.length() {
        if let Some(attr) = map.item(index) {
            pairs.push((attr.name(), attr.value()));
        }
    }
    pairs
}

pub fn read_element_interaction(element: &Element) -> InteractionSpec {
    let pairs = element_attribute_pairs(element);
    InteractionSpec::from_attributes(
        pairs.iter().map(|(name, value)| (name.as_str(), value.as_str())),
    )
}

/// Replace the element's interaction configuration wholesale. A spec with
/// kind `None` reduces to a bare clear.
pub fn write_interaction(element: &Element, spec: &InteractionSpec) -> Result<(), EditorError> {
    spec.validate()?;
    clear_interaction(element)?;
    for (name, value) in spec.to_attributes() {
        element
            .set_attribute(&name, &value)
            .map_err(|_| EditorError::FrameUnavailable(format!("attribute {}", name)))?;
    }
    Ok(())
}

/// Remove every interaction-family attribute in one sweep, including any
/// `data-popup-*`/`data-tooltip-*` stragglers the fixed list cannot name.
pub fn clear_interaction(element: &Element) -> Result<(), EditorError> {
    // Collect before removing; the attribute map is live.
    let doomed: Vec<String> = element_attribute_pairs(element)
        .into_iter()
        .map(|(name, _)| name)
        .filter(|name| is_interaction_attribute(name))
        .collect();
    for name in doomed {
        element
            .remove_attribute(&name)
            .map_err(|_| EditorError::FrameUnavailable(format!("attribute {}", name)))?;
    }
    Ok(())
}
