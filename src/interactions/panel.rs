//! Interaction panel operations.
//!
//! The panel edits the selected element's interaction attributes directly;
//! there is no shadow model to drift out of sync. Entering a kind applies
//! that kind's one-time setup (popup typography capture, download payload
//! derivation) and every write funnels through the same sweep-then-write
//! path in [`crate::interactions::apply`].

use serde::Serialize;
use web_sys::{Document, Element};

use crate::error::EditorError;
use crate::interactions::apply::{clear_interaction, read_element_interaction, write_interaction};
use crate::interactions::download;
use crate::models::interaction::{
    InteractionKind, InteractionSpec, PopupStyle, TooltipStyle, TriggerKind,
};
use crate::protocol::message::PopupData;

/// Switch the element's interaction kind. Re-selecting the current kind is
/// a no-op; switching runs the kind's entry derivations before the write.
pub fn set_interaction_kind(
    element: &Element,
    kind: InteractionKind,
) -> Result<InteractionSpec, EditorError> {
    let mut spec = read_element_interaction(element);
    if spec.kind == kind {
        return Ok(spec);
    }
    spec.kind = kind;

    if kind == InteractionKind::Link && spec.trigger == TriggerKind::Hover {
        // Links have no hover mode; fall back rather than refuse.
        spec.trigger = TriggerKind::Click;
    }
    if kind == InteractionKind::Popup && spec.popup_style.is_empty() {
        spec.popup_style = capture_popup_defaults(element);
    }
    if kind == InteractionKind::Download && spec.value.is_none() {
        let payload = download::derive_for_element(element);
        spec.value = Some(payload.value);
        spec.filename = Some(payload.filename);
    }

    write_interaction(element, &spec)?;
    Ok(spec)
}

/// Change the trigger. Hover is refused for kinds that cannot honor it; the
/// element keeps its previous trigger in that case.
pub fn set_trigger(
    element: &Element,
    trigger: TriggerKind,
) -> Result<InteractionSpec, EditorError> {
    let mut spec = read_element_interaction(element);
    if trigger == TriggerKind::Hover && !spec.kind.supports_hover() {
        log::debug!("hover trigger refused for kind {}", spec.kind.as_str());
        return Ok(spec);
    }
    spec.trigger = trigger;
    write_interaction(element, &spec)?;
    Ok(spec)
}

pub fn set_value(
    element: &Element,
    value: Option<String>,
) -> Result<InteractionSpec, EditorError> {
    let mut spec = read_element_interaction(element);
    spec.value = value;
    if spec.kind == InteractionKind::Download {
        spec.filename = spec.value.as_deref().and_then(download::filename_from_url);
    }
    write_interaction(element, &spec)?;
    Ok(spec)
}

pub fn set_content(
    element: &Element,
    content: Option<String>,
) -> Result<InteractionSpec, EditorError> {
    let mut spec = read_element_interaction(element);
    spec.content = content;
    write_interaction(element, &spec)?;
    Ok(spec)
}

/// Highlight is independent of kind and applies immediately.
pub fn set_highlight(element: &Element, highlight: bool) -> Result<InteractionSpec, EditorError> {
    let mut spec = read_element_interaction(element);
    spec.highlight = highlight;
    write_interaction(element, &spec)?;
    Ok(spec)
}

pub fn set_popup_style(
    element: &Element,
    styles: PopupStyle,
) -> Result<InteractionSpec, EditorError> {
    let mut spec = read_element_interaction(element);
    spec.popup_style = styles;
    write_interaction(element, &spec)?;
    Ok(spec)
}

pub fn set_tooltip_style(
    element: &Element,
    styles: TooltipStyle,
) -> Result<InteractionSpec, EditorError> {
    let mut spec = read_element_interaction(element);
    spec.tooltip_style = styles;
    write_interaction(element, &spec)?;
    Ok(spec)
}

/// Reset to no interaction. The attribute sweep is atomic; callers notify
/// listeners only after it returns.
pub fn clear(element: &Element) -> Result<InteractionSpec, EditorError> {
    clear_interaction(element)?;
    Ok(InteractionSpec::default())
}

/// One-time typography capture when an element first becomes a popup.
/// Values come from the element's own document so frame styles apply.
fn capture_popup_defaults(element: &Element) -> PopupStyle {
    let Some(window) = element.owner_document().and_then(|doc| doc.default_view()) else {
        return PopupStyle::default();
    };
    let Ok(Some(computed)) = window.get_computed_style(element) else {
        return PopupStyle::default();
    };
    let read = |property: &str| {
        computed
            .get_property_value(property)
            .ok()
            .filter(|value| !value.is_empty())
    };
    PopupStyle {
        font_family: read("font-family"),
        font_size: read("font-size"),
        font_weight: read("font-weight"),
        color: read("color"),
        fill: None,
        fit: None,
    }
}

/// The popup payload this element would send from the viewer, used for the
/// panel's live preview.
pub fn popup_payload(element: &Element) -> PopupData {
    let spec = read_element_interaction(element);
    let styles = if spec.popup_style.is_empty() {
        None
    } else {
        Some(spec.popup_style.clone())
    };
    let (element_type, element_source) = if element.tag_name().eq_ignore_ascii_case("img") {
        ("image".to_string(), element.get_attribute("src"))
    } else {
        ("text".to_string(), None)
    };
    PopupData {
        content: spec.content.clone().unwrap_or_default(),
        styles,
        element_type,
        element_source,
    }
}

#[derive(Serialize)]
struct PopupCardContext {
    card_class: String,
    style_attr: String,
    is_image: bool,
    source: String,
    content: String,
}

fn render(template: &str, context: &impl Serialize) -> Result<String, EditorError> {
    let compiled = mustache::compile_str(template)?;
    Ok(compiled.render_to_string(context)?)
}

/// Inline style carried by the popup card, derived from the persisted
/// overrides.
pub fn popup_style_attr(styles: Option<&PopupStyle>) -> String {
    let Some(styles) = styles else {
        return String::new();
    };
    let mut rules = Vec::new();
    if let Some(value) = &styles.font_family {
        rules.push(format!("font-family: {}", value));
    }
    if let Some(value) = &styles.font_size {
        rules.push(format!("font-size: {}", value));
    }
    if let Some(value) = &styles.font_weight {
        rules.push(format!("font-weight: {}", value));
    }
    if let Some(value) = &styles.color {
        rules.push(format!("color: {}", value));
    }
    if let Some(value) = &styles.fill {
        rules.push(format!("background: {}", value));
    }
    rules.join("; ")
}

fn popup_card_class(styles: Option<&PopupStyle>) -> String {
    match styles.and_then(|s| s.fit.as_deref()) {
        Some("cover") => "fb-popup-card fb-popup-fit-cover".to_string(),
        Some("contain") => "fb-popup-card fb-popup-fit-contain".to_string(),
        _ => "fb-popup-card".to_string(),
    }
}

pub fn render_popup_card(data: &PopupData) -> Result<String, EditorError> {
    let context = PopupCardContext {
        card_class: popup_card_class(data.styles.as_ref()),
        style_attr: popup_style_attr(data.styles.as_ref()),
        is_image: data.element_type == "image",
        source: data.element_source.clone().unwrap_or_default(),
        content: data.content.clone(),
    };
    render(
        include_str!("templates/popup_preview.html.mustache"),
        &context,
    )
}

/// Mount a popup overlay into `container` and return the backdrop element
/// the caller dismisses.
pub fn render_popup_overlay(
    document: &Document,
    container: &Element,
    data: &PopupData,
) -> Result<Element, EditorError> {
    let backdrop = document
        .create_element("div")
        .map_err(|_| EditorError::FrameUnavailable("create overlay".to_string()))?;
    backdrop.set_class_name("fb-popup-backdrop");
    backdrop.set_inner_html(&render_popup_card(data)?);
    container
        .append_child(&backdrop)
        .map_err(|_| EditorError::FrameUnavailable("mount overlay".to_string()))?;
    Ok(backdrop)
}
