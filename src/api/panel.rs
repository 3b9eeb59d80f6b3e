//! Style and interaction panel exports.
//!
//! Every operation here targets the currently selected canvas element; a
//! call with nothing selected throws. Style writes go through the sync
//! bridge so reads-in-progress win over stale panel values; interaction
//! writes land on the element's `data-*` attributes and then notify the
//! host through the bridge's debounced update path.

use std::cell::RefCell;

use gloo_events::EventListener;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::api::helpers::{deserialize, require_selected, serialize};
use crate::interactions::apply::read_element_interaction;
use crate::interactions::panel;
use crate::models::interaction::{
    InteractionKind, InteractionSpec, PopupStyle, TooltipStyle, TriggerKind,
};
use crate::sync::bridge;
use crate::sync::color::Gradient;
use crate::sync::snapshot::read_snapshot;
use crate::sync::stroke::TextStroke;
use crate::utils::dom;

/// The style snapshot the panel renders, read fresh from the selection.
#[wasm_bindgen(js_name = readSelectedStyle)]
pub fn read_selected_style() -> Result<JsValue, JsValue> {
    let element = require_selected()?;
    let snapshot = read_snapshot(&element);
    serialize(&snapshot, "style snapshot")
}

/// Write one CSS property. Resolves to false when the write was dropped
/// because a selection read is still in flight.
#[wasm_bindgen(js_name = applyElementStyle)]
pub fn apply_element_style(property: &str, value: &str) -> Result<bool, JsValue> {
    bridge::apply_style(property, value).map_err(JsValue::from)
}

/// Opacity as a 0-100 percentage.
#[wasm_bindgen(js_name = setOpacity)]
pub fn set_opacity(percent: f64) -> Result<bool, JsValue> {
    bridge::set_opacity(percent).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = setFillSolid)]
pub fn set_fill_solid(hex: &str) -> Result<bool, JsValue> {
    bridge::set_fill_solid(hex).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = setFillGradient)]
pub fn set_fill_gradient(gradient: JsValue) -> Result<bool, JsValue> {
    let gradient: Gradient = deserialize(gradient, "gradient")?;
    bridge::set_fill_gradient(&gradient).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = setTextStroke)]
pub fn set_text_stroke(stroke: JsValue) -> Result<bool, JsValue> {
    let stroke: TextStroke = deserialize(stroke, "text stroke")?;
    bridge::set_text_stroke(&stroke).map_err(JsValue::from)
}

/// Whether the browser exposes an OS-level color picker.
#[wasm_bindgen(js_name = eyedropperAvailable)]
pub fn eyedropper_available() -> bool {
    bridge::eyedropper_available()
}

/// The selection's interaction state, straight from its attributes.
#[wasm_bindgen(js_name = readInteraction)]
pub fn read_interaction() -> Result<JsValue, JsValue> {
    let element = require_selected()?;
    let spec = read_element_interaction(&element);
    serialize(&spec, "interaction spec")
}

#[wasm_bindgen(js_name = setInteractionKind)]
pub fn set_interaction_kind(kind: &str) -> Result<JsValue, JsValue> {
    let kind = InteractionKind::parse(kind)
        .ok_or_else(|| JsValue::from_str(&format!("unknown interaction kind '{}'", kind)))?;
    let element = require_selected()?;
    let spec = panel::set_interaction_kind(&element, kind).map_err(JsValue::from)?;
    after_interaction_edit(&element, &spec);
    serialize(&spec, "interaction spec")
}

/// Change the trigger. The returned spec reports the trigger actually in
/// effect; a refused hover keeps the previous one.
#[wasm_bindgen(js_name = setInteractionTrigger)]
pub fn set_interaction_trigger(trigger: &str) -> Result<JsValue, JsValue> {
    let trigger = TriggerKind::parse(trigger)
        .ok_or_else(|| JsValue::from_str(&format!("unknown trigger '{}'", trigger)))?;
    let element = require_selected()?;
    let spec = panel::set_trigger(&element, trigger).map_err(JsValue::from)?;
    after_interaction_edit(&element, &spec);
    serialize(&spec, "interaction spec")
}

#[wasm_bindgen(js_name = setInteractionValue)]
pub fn set_interaction_value(value: Option<String>) -> Result<JsValue, JsValue> {
    let element = require_selected()?;
    let spec = panel::set_value(&element, value).map_err(JsValue::from)?;
    after_interaction_edit(&element, &spec);
    serialize(&spec, "interaction spec")
}

#[wasm_bindgen(js_name = setInteractionContent)]
pub fn set_interaction_content(content: Option<String>) -> Result<JsValue, JsValue> {
    let element = require_selected()?;
    let spec = panel::set_content(&element, content).map_err(JsValue::from)?;
    after_interaction_edit(&element, &spec);
    serialize(&spec, "interaction spec")
}

#[wasm_bindgen(js_name = setInteractionHighlight)]
pub fn set_interaction_highlight(highlight: bool) -> Result<JsValue, JsValue> {
    let element = require_selected()?;
    let spec = panel::set_highlight(&element, highlight).map_err(JsValue::from)?;
    after_interaction_edit(&element, &spec);
    serialize(&spec, "interaction spec")
}

#[wasm_bindgen(js_name = setPopupStyle)]
pub fn set_popup_style(styles: JsValue) -> Result<JsValue, JsValue> {
    let styles: PopupStyle = deserialize(styles, "popup style")?;
    let element = require_selected()?;
    let spec = panel::set_popup_style(&element, styles).map_err(JsValue::from)?;
    after_interaction_edit(&element, &spec);
    serialize(&spec, "interaction spec")
}

#[wasm_bindgen(js_name = setTooltipStyle)]
pub fn set_tooltip_style(styles: JsValue) -> Result<JsValue, JsValue> {
    let styles: TooltipStyle = deserialize(styles, "tooltip style")?;
    let element = require_selected()?;
    let spec = panel::set_tooltip_style(&element, styles).map_err(JsValue::from)?;
    after_interaction_edit(&element, &spec);
    serialize(&spec, "interaction spec")
}

/// Remove the whole interaction attribute family in one sweep.
#[wasm_bindgen(js_name = clearInteraction)]
pub fn clear_interaction() -> Result<JsValue, JsValue> {
    let element = require_selected()?;
    let spec = panel::clear(&element).map_err(JsValue::from)?;
    after_interaction_edit(&element, &spec);
    serialize(&spec, "interaction spec")
}

fn after_interaction_edit(element: &Element, spec: &InteractionSpec) {
    bridge::notify_edit();
    refresh_preview(element, spec);
}

struct PopupPreview {
    on: bool,
    overlay: Option<(Element, EventListener)>,
}

thread_local! {
    static PREVIEW: RefCell<PopupPreview> = RefCell::new(PopupPreview {
        on: false,
        overlay: None,
    });
}

/// Toggle the live popup preview. While on, every interaction edit on a
/// popup element re-renders the overlay the published viewer would show.
#[wasm_bindgen(js_name = setPopupPreview)]
pub fn set_popup_preview(on: bool) {
    PREVIEW.with(|slot| slot.borrow_mut().on = on);
    if !on {
        close_preview_overlay();
        return;
    }
    let Some(selected) = crate::canvas::editor::selected() else {
        return;
    };
    let spec = read_element_interaction(&selected.element);
    refresh_preview(&selected.element, &spec);
}

fn refresh_preview(element: &Element, spec: &InteractionSpec) {
    let on = PREVIEW.with(|slot| slot.borrow().on);
    if !on {
        return;
    }
    if spec.kind != InteractionKind::Popup {
        close_preview_overlay();
        return;
    }
    close_preview_overlay();
    let Ok(document) = dom::document() else {
        return;
    };
    let Some(body) = document.body() else {
        return;
    };
    let data = panel::popup_payload(element);
    match panel::render_popup_overlay(&document, &body, &data) {
        Ok(overlay) => {
            // Dismissing the overlay leaves preview mode on; the next edit
            // brings it back.
            let listener = EventListener::once(&overlay, "click", |_| close_preview_overlay());
            PREVIEW.with(|slot| {
                slot.borrow_mut().overlay = Some((overlay, listener));
            });
        }
        Err(err) => log::warn!("popup preview failed: {}", err),
    }
}

fn close_preview_overlay() {
    let overlay = PREVIEW.with(|slot| slot.borrow_mut().overlay.take());
    if let Some((element, listener)) = overlay {
        drop(listener);
        element.remove();
    }
}
