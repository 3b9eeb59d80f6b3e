//! Bidirectional style sync between the selected element and the panel.
//!
//! Selection reads run under an explicit `Reading` phase so the panel's
//! own change events cannot write back values that were just read; the
//! phase is released on the next animation frame, guarded by a generation
//! counter so a stale release cannot unlock a newer read. Panel writes go
//! straight to the element's inline style (plus the intent attributes the
//! snapshot layer prefers) and schedule one debounced update notification.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement};

use crate::error::EditorError;
use crate::sync::color::Gradient;
use crate::sync::snapshot::{
    read_snapshot, StyleSnapshot, ATTR_FILL_GRADIENT, ATTR_FILL_MODE, ATTR_SOLID_COLOR,
    FILL_GRADIENT, FILL_SOLID,
};
use crate::sync::stroke::{
    render_dashed_svg, solid_stroke_css, FontSpec, StrokePosition, TextMeasurer, TextStroke,
    ATTR_STROKE_COLOR, ATTR_STROKE_DASH, ATTR_STROKE_POSITION, ATTR_STROKE_WIDTH,
};
use crate::utils::debounce::{Debouncer, PROPERTY_DEBOUNCE_MS};
use crate::utils::dom;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Reading,
}

struct StyleBridge {
    phase: SyncPhase,
    generation: u64,
    element: Option<Element>,
    on_panel: Option<js_sys::Function>,
    on_update: Option<js_sys::Function>,
    update_debounce: Debouncer,
}

impl StyleBridge {
    fn new() -> Self {
        StyleBridge {
            phase: SyncPhase::Idle,
            generation: 0,
            element: None,
            on_panel: None,
            on_update: None,
            update_debounce: Debouncer::new(PROPERTY_DEBOUNCE_MS),
        }
    }
}

thread_local! {
    static BRIDGE: RefCell<StyleBridge> = RefCell::new(StyleBridge::new());
}

/// Wire the panel-state setter and the serialization trigger.
pub fn set_callbacks(on_panel: Option<js_sys::Function>, on_update: Option<js_sys::Function>) {
    BRIDGE.with(|slot| {
        let mut bridge = slot.borrow_mut();
        bridge.on_panel = on_panel;
        bridge.on_update = on_update;
    });
}

pub fn phase() -> SyncPhase {
    BRIDGE.with(|slot| slot.borrow().phase)
}

/// Bind a newly selected element: batch-read its style state, hand it to
/// the panel, and hold writes until the next frame.
pub fn begin_selection(element: &Element) -> Result<StyleSnapshot, EditorError> {
    let generation = BRIDGE.with(|slot| {
        let mut bridge = slot.borrow_mut();
        bridge.generation += 1;
        bridge.phase = SyncPhase::Reading;
        bridge.element = Some(element.clone());
        bridge.generation
    });

    let snapshot = read_snapshot(element);

    let callback = BRIDGE.with(|slot| slot.borrow().on_panel.clone());
    if let Some(callback) = callback {
        let payload = serde_wasm_bindgen::to_value(&snapshot)
            .map_err(|e| EditorError::Serde(e.to_string()))?;
        if callback.call1(&JsValue::NULL, &payload).is_err() {
            log::debug!("panel callback threw during selection sync");
        }
    }

    schedule_sync_release(generation);
    Ok(snapshot)
}

/// Drop the binding and cancel any pending update notification.
pub fn end_selection() {
    BRIDGE.with(|slot| {
        let mut bridge = slot.borrow_mut();
        bridge.generation += 1;
        bridge.phase = SyncPhase::Idle;
        bridge.element = None;
        bridge.update_debounce.cancel();
    });
}

fn release_sync(generation: u64) {
    BRIDGE.with(|slot| {
        let mut bridge = slot.borrow_mut();
        if bridge.generation == generation {
            bridge.phase = SyncPhase::Idle;
        }
    });
}

fn schedule_sync_release(generation: u64) {
    let scheduled = dom::window().ok().and_then(|window| {
        let callback = Closure::once_into_js(move || release_sync(generation));
        window
            .request_animation_frame(callback.unchecked_ref())
            .ok()
    });
    if scheduled.is_none() {
        release_sync(generation);
    }
}

/// Run a write against the bound element. Returns Ok(false) when the write
/// is ignored: nothing selected, or a selection read is in flight.
fn with_bound_element<F>(write: F) -> Result<bool, EditorError>
where
    F: FnOnce(&Element) -> Result<(), EditorError>,
{
    let element = BRIDGE.with(|slot| {
        let bridge = slot.borrow();
        if bridge.phase == SyncPhase::Reading {
            return None;
        }
        bridge.element.clone()
    });
    let Some(element) = element else {
        return Ok(false);
    };
    write(&element)?;
    notify_update();
    Ok(true)
}

fn notify_update() {
    BRIDGE.with(|slot| {
        let mut bridge = slot.borrow_mut();
        let callback = bridge.on_update.clone();
        bridge.update_debounce.call(move || {
            if let Some(callback) = callback {
                if callback.call0(&JsValue::NULL).is_err() {
                    log::debug!("update callback threw");
                }
            }
        });
    });
}

/// Schedule the debounced update for an edit made outside the style
/// writers (interaction attribute changes land here).
pub fn notify_edit() {
    notify_update();
}

fn set_attr(element: &Element, name: &str, value: &str) -> Result<(), EditorError> {
    element
        .set_attribute(name, value)
        .map_err(|_| EditorError::FrameUnavailable(format!("attribute {}", name)))
}

fn remove_attr(element: &Element, name: &str) -> Result<(), EditorError> {
    element
        .remove_attribute(name)
        .map_err(|_| EditorError::FrameUnavailable(format!("attribute {}", name)))
}

/// Plain property write for the controls with no intent bookkeeping
/// (alignment, letter spacing, radius, filters and friends).
pub fn apply_style(property: &str, value: &str) -> Result<bool, EditorError> {
    with_bound_element(|element| {
        if value.is_empty() {
            dom::remove_element_style(element, property);
        } else {
            dom::set_element_style(element, property, value);
        }
        Ok(())
    })
}

/// Panel opacity is 0..100.
pub fn set_opacity(percent: f64) -> Result<bool, EditorError> {
    with_bound_element(|element| {
        let value = (percent / 100.0).clamp(0.0, 1.0);
        dom::set_element_style(element, "opacity", &format!("{}", value));
        Ok(())
    })
}

fn write_solid_fill(element: &Element, hex: &str) -> Result<(), EditorError> {
    for property in [
        "background-image",
        "background-repeat",
        "background-position",
        "-webkit-background-clip",
        "background-clip",
        "-webkit-text-fill-color",
    ] {
        dom::remove_element_style(element, property);
    }
    dom::set_element_style(element, "color", hex);
    if element.get_attribute(ATTR_STROKE_DASH).is_some() {
        // The dashed-stroke SVG lived in background-image; it is gone now.
        remove_attr(element, ATTR_STROKE_DASH)?;
    }
    set_attr(element, ATTR_FILL_MODE, FILL_SOLID)?;
    set_attr(element, ATTR_SOLID_COLOR, hex)?;
    Ok(())
}

/// Switch to (or update) a solid text color, undoing the gradient clip
/// trick entirely.
pub fn set_fill_solid(hex: &str) -> Result<bool, EditorError> {
    let hex = hex.to_string();
    with_bound_element(move |element| write_solid_fill(element, &hex))
}

/// Paint the text with a gradient via background-clip, remembering the
/// stops so the snapshot can rebuild them later.
pub fn set_fill_gradient(gradient: &Gradient) -> Result<bool, EditorError> {
    let css = gradient.to_css();
    with_bound_element(move |element| {
        dom::set_element_style(element, "background-image", &css);
        dom::set_element_style(element, "-webkit-background-clip", "text");
        dom::set_element_style(element, "background-clip", "text");
        dom::set_element_style(element, "color", "transparent");
        dom::set_element_style(element, "-webkit-text-fill-color", "transparent");
        if element.get_attribute(ATTR_STROKE_DASH).is_some() {
            remove_attr(element, ATTR_STROKE_DASH)?;
        }
        set_attr(element, ATTR_FILL_MODE, FILL_GRADIENT)?;
        set_attr(element, ATTR_FILL_GRADIENT, &css)?;
        Ok(())
    })
}

fn restore_fill(element: &Element) -> Result<(), EditorError> {
    if element.get_attribute(ATTR_FILL_MODE).as_deref() == Some(FILL_GRADIENT) {
        if let Some(css) = element.get_attribute(ATTR_FILL_GRADIENT) {
            dom::set_element_style(element, "background-image", &css);
            dom::set_element_style(element, "-webkit-background-clip", "text");
            dom::set_element_style(element, "background-clip", "text");
            dom::set_element_style(element, "color", "transparent");
            dom::set_element_style(element, "-webkit-text-fill-color", "transparent");
            dom::remove_element_style(element, "background-repeat");
            dom::remove_element_style(element, "background-position");
            return Ok(());
        }
    }
    for property in [
        "background-image",
        "background-repeat",
        "background-position",
        "-webkit-background-clip",
        "background-clip",
        "-webkit-text-fill-color",
    ] {
        dom::remove_element_style(element, property);
    }
    let hex = element
        .get_attribute(ATTR_SOLID_COLOR)
        .unwrap_or_else(|| "#000000".to_string());
    dom::set_element_style(element, "color", &hex);
    Ok(())
}

/// Undo dashed-stroke rendering if it was active, handing background-image
/// and text color back to the fill.
fn clear_dashed_artifacts(element: &Element) -> Result<(), EditorError> {
    if element.get_attribute(ATTR_STROKE_DASH).is_none() {
        return Ok(());
    }
    remove_attr(element, ATTR_STROKE_DASH)?;
    restore_fill(element)
}

fn write_solid_stroke(
    element: &Element,
    width: f64,
    color: &str,
    position: StrokePosition,
) -> Result<(), EditorError> {
    clear_dashed_artifacts(element)?;
    for (property, value) in solid_stroke_css(width, color, position) {
        dom::set_element_style(element, property, &value);
    }
    set_attr(element, ATTR_STROKE_WIDTH, &width.to_string())?;
    set_attr(element, ATTR_STROKE_COLOR, color)?;
    set_attr(element, ATTR_STROKE_POSITION, position.as_str())?;
    Ok(())
}

fn write_dashed_stroke(
    element: &Element,
    width: f64,
    color: &str,
    dash: f64,
    gap: f64,
) -> Result<(), EditorError> {
    let document = element
        .owner_document()
        .ok_or_else(|| EditorError::FrameUnavailable("owner document".to_string()))?;
    let font = font_spec_for(element);
    let text = element.text_content().unwrap_or_default();
    let max_width = element.get_bounding_client_rect().width().max(1.0);
    let measurer = CanvasMeasurer::new(&document)?;
    let svg = render_dashed_svg(&text, &font, width, color, dash, gap, max_width, &measurer)?;

    dom::remove_element_style(element, "-webkit-text-stroke");
    dom::remove_element_style(element, "paint-order");
    let encoded = String::from(js_sys::encode_uri_component(&svg.markup));
    dom::set_element_style(
        element,
        "background-image",
        &format!("url(\"data:image/svg+xml,{}\")", encoded),
    );
    dom::set_element_style(element, "background-repeat", "no-repeat");
    dom::set_element_style(element, "background-position", "0 0");
    dom::set_element_style(element, "color", "transparent");
    dom::set_element_style(element, "-webkit-text-fill-color", "transparent");

    set_attr(element, ATTR_STROKE_WIDTH, &width.to_string())?;
    set_attr(element, ATTR_STROKE_COLOR, color)?;
    set_attr(element, ATTR_STROKE_DASH, &format!("{} {}", dash, gap))?;
    remove_attr(element, ATTR_STROKE_POSITION).ok();
    Ok(())
}

fn clear_stroke(element: &Element) -> Result<(), EditorError> {
    dom::remove_element_style(element, "-webkit-text-stroke");
    dom::remove_element_style(element, "paint-order");
    clear_dashed_artifacts(element)?;
    for name in [ATTR_STROKE_WIDTH, ATTR_STROKE_COLOR, ATTR_STROKE_POSITION] {
        remove_attr(element, name).ok();
    }
    Ok(())
}

/// Apply one of the stroke strategies (or none). Solid and dashed are
/// mutually exclusive; switching cleans up the other's artifacts.
pub fn set_text_stroke(stroke: &TextStroke) -> Result<bool, EditorError> {
    let stroke = stroke.clone();
    with_bound_element(move |element| match &stroke {
        TextStroke::None => clear_stroke(element),
        TextStroke::Solid {
            width,
            color,
            position,
        } => write_solid_stroke(element, *width, color, *position),
        TextStroke::Dashed {
            width,
            color,
            dash,
            gap,
        } => write_dashed_stroke(element, *width, color, *dash, *gap),
    })
}

/// OS-level color picking is optional; the panel omits the control when
/// the API is missing.
pub fn eyedropper_available() -> bool {
    dom::window()
        .ok()
        .map(|window| {
            js_sys::Reflect::has(&window, &JsValue::from_str("EyeDropper")).unwrap_or(false)
        })
        .unwrap_or(false)
}

fn parse_px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

fn font_spec_for(element: &Element) -> FontSpec {
    let computed = element
        .owner_document()
        .and_then(|doc| doc.default_view())
        .and_then(|window| window.get_computed_style(element).ok().flatten());
    let prop = |name: &str| -> Option<String> {
        computed
            .as_ref()
            .and_then(|style| style.get_property_value(name).ok())
            .filter(|value| !value.is_empty())
    };
    let size_px = prop("font-size").as_deref().and_then(parse_px).unwrap_or(16.0);
    let line_height = prop("line-height")
        .as_deref()
        .and_then(parse_px)
        .unwrap_or(size_px * 1.2);
    FontSpec {
        family: prop("font-family").unwrap_or_else(|| "sans-serif".to_string()),
        size_px,
        weight: prop("font-weight").unwrap_or_else(|| "400".to_string()),
        line_height,
    }
}

/// Canvas-backed text measurement for the dashed-stroke SVG wrap.
pub struct CanvasMeasurer {
    context: CanvasRenderingContext2d,
}

impl CanvasMeasurer {
    pub fn new(document: &Document) -> Result<Self, EditorError> {
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|_| EditorError::FrameUnavailable("measure canvas".to_string()))?
            .dyn_into()
            .map_err(|_| EditorError::FrameUnavailable("measure canvas".to_string()))?;
        let context = canvas
            .get_context("2d")
            .map_err(|_| EditorError::FrameUnavailable("canvas context".to_string()))?
            .ok_or_else(|| EditorError::FrameUnavailable("canvas context".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EditorError::FrameUnavailable("canvas context".to_string()))?;
        Ok(CanvasMeasurer { context })
    }
}

impl TextMeasurer for CanvasMeasurer {
    fn text_width(&self, text: &str, font: &FontSpec) -> f64 {
        self.context.set_font(&font.css_font());
        match self.context.measure_text(text) {
            Ok(metrics) => metrics.width(),
            // Rough advance estimate keeps wrapping usable if measurement
            // is unavailable.
            Err(_) => text.chars().count() as f64 * font.size_px * 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("16px"), Some(16.0));
        assert_eq!(parse_px(" 13.5px "), Some(13.5));
        assert_eq!(parse_px("normal"), None);
    }
}
