//! One-batch read of everything the panel shows for a selected element.
//!
//! Derived values prefer the editor's own `data-*` intent attributes over
//! computed CSS: computed style alone cannot distinguish a gradient fill
//! from a solid that renders the same, nor recover the authored stroke
//! width once outside-position doubling has been applied.

use serde::Serialize;
use web_sys::Element;

use crate::sync::color::{parse_css_color, parse_linear_gradient, Gradient};
use crate::sync::stroke::{
    parse_stroke_css, StrokePosition, TextStroke, ATTR_STROKE_COLOR, ATTR_STROKE_DASH,
    ATTR_STROKE_POSITION, ATTR_STROKE_WIDTH,
};

pub const ATTR_FILL_MODE: &str = "data-fill-mode";
pub const ATTR_SOLID_COLOR: &str = "data-solid-color";
pub const ATTR_FILL_GRADIENT: &str = "data-fill-gradient";

pub const FILL_SOLID: &str = "solid";
pub const FILL_GRADIENT: &str = "gradient";

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StyleSnapshot {
    pub fill_mode: String,
    /// Last known solid text color, as hex.
    pub fill_color: String,
    pub gradient: Option<Gradient>,
    /// 0..100 panel units.
    pub opacity: f64,
    pub font_family: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<String>,
    pub text_align: Option<String>,
    pub line_height: Option<String>,
    pub letter_spacing: Option<String>,
    pub border_radius: Option<String>,
    pub filter: Option<String>,
    pub stroke: TextStroke,
    pub source: Option<String>,
}

/// Resolve the fill state from intent attributes and computed fallbacks.
/// Returns (mode, solid hex, gradient).
pub fn derive_fill(
    data_mode: Option<&str>,
    data_solid: Option<&str>,
    data_gradient: Option<&str>,
    computed_color: Option<&str>,
    computed_background_image: Option<&str>,
    computed_background_clip: Option<&str>,
) -> (String, String, Option<Gradient>) {
    let solid_hex = data_solid
        .and_then(parse_css_color)
        .or_else(|| computed_color.and_then(parse_css_color))
        .map(|c| c.to_hex())
        .unwrap_or_else(|| "#000000".to_string());

    // The attribute survives even when a dashed-stroke SVG later takes over
    // background-image.
    let gradient = data_gradient
        .and_then(parse_linear_gradient)
        .or_else(|| computed_background_image.and_then(parse_linear_gradient));

    let mode = match data_mode {
        Some(FILL_GRADIENT) => FILL_GRADIENT,
        Some(_) => FILL_SOLID,
        None => {
            // Foreign content: infer a text gradient from the clip trick.
            let clipped = computed_background_clip
                .map(|clip| clip.contains("text"))
                .unwrap_or(false);
            if gradient.is_some() && clipped {
                FILL_GRADIENT
            } else {
                FILL_SOLID
            }
        }
    };

    let gradient = if mode == FILL_GRADIENT { gradient } else { None };
    (mode.to_string(), solid_hex, gradient)
}

/// "4 2" -> (4.0, 2.0)
pub fn parse_dash_attr(value: &str) -> Option<(f64, f64)> {
    let mut parts = value.split_whitespace();
    let dash: f64 = parts.next()?.parse().ok()?;
    let gap: f64 = parts.next()?.parse().ok()?;
    Some((dash, gap))
}

/// Resolve the stroke state. Intent attributes describe the authored
/// stroke exactly; without them, only a center-position solid stroke can
/// be deduced from computed CSS.
pub fn derive_stroke(
    data_width: Option<&str>,
    data_color: Option<&str>,
    data_position: Option<&str>,
    data_dash: Option<&str>,
    computed_stroke: Option<&str>,
) -> TextStroke {
    if let Some(dash_attr) = data_dash {
        if let (Some((dash, gap)), Some(width), Some(color)) = (
            parse_dash_attr(dash_attr),
            data_width.and_then(|w| w.parse::<f64>().ok()),
            data_color,
        ) {
            return TextStroke::Dashed {
                width,
                color: color.to_string(),
                dash,
                gap,
            };
        }
    }

    if let (Some(width), Some(color)) = (
        data_width.and_then(|w| w.parse::<f64>().ok()),
        data_color,
    ) {
        return TextStroke::Solid {
            width,
            color: color.to_string(),
            position: data_position
                .and_then(StrokePosition::parse)
                .unwrap_or_default(),
        };
    }

    if let Some((width, color)) = computed_stroke.and_then(|s| parse_stroke_css(s)) {
        return TextStroke::Solid {
            width,
            color,
            position: StrokePosition::Center,
        };
    }

    TextStroke::None
}

/// Batch-read the panel state for one element.
pub fn read_snapshot(element: &Element) -> StyleSnapshot {
    let computed = element
        .owner_document()
        .and_then(|doc| doc.default_view())
        .and_then(|window| window.get_computed_style(element).ok().flatten());
    let prop = |name: &str| -> Option<String> {
        computed
            .as_ref()
            .and_then(|style| style.get_property_value(name).ok())
            .filter(|value| !value.is_empty() && value != "none" && value != "normal")
    };
    let attr = |name: &str| element.get_attribute(name);

    let (fill_mode, fill_color, gradient) = derive_fill(
        attr(ATTR_FILL_MODE).as_deref(),
        attr(ATTR_SOLID_COLOR).as_deref(),
        attr(ATTR_FILL_GRADIENT).as_deref(),
        prop("color").as_deref(),
        prop("background-image").as_deref(),
        prop("-webkit-background-clip")
            .or_else(|| prop("background-clip"))
            .as_deref(),
    );

    let stroke = derive_stroke(
        attr(ATTR_STROKE_WIDTH).as_deref(),
        attr(ATTR_STROKE_COLOR).as_deref(),
        attr(ATTR_STROKE_POSITION).as_deref(),
        attr(ATTR_STROKE_DASH).as_deref(),
        prop("-webkit-text-stroke").as_deref(),
    );

    let opacity = prop("opacity")
        .and_then(|value| value.parse::<f64>().ok())
        .unwrap_or(1.0)
        .clamp(0.0, 1.0)
        * 100.0;

    StyleSnapshot {
        fill_mode,
        fill_color,
        gradient,
        opacity,
        font_family: prop("font-family"),
        font_size: prop("font-size"),
        font_weight: prop("font-weight"),
        text_align: prop("text-align"),
        line_height: prop("line-height"),
        letter_spacing: prop("letter-spacing"),
        border_radius: prop("border-radius")
            .filter(|radius| radius != "0px"),
        filter: prop("filter"),
        stroke,
        source: element.get_attribute("src"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_prefers_intent_attributes() {
        let (mode, hex, gradient) = derive_fill(
            Some("gradient"),
            Some("#ff8800"),
            None,
            Some("rgb(0, 0, 0)"),
            Some("linear-gradient(90deg, #ff0000 0%, #0000ff 100%)"),
            Some("text"),
        );
        assert_eq!(mode, FILL_GRADIENT);
        assert_eq!(hex, "#ff8800");
        assert!(gradient.is_some());
    }

    #[test]
    fn test_fill_infers_gradient_from_clip_trick() {
        let (mode, _, gradient) = derive_fill(
            None,
            None,
            None,
            Some("rgba(0, 0, 0, 0)"),
            Some("linear-gradient(180deg, #ff0000 0%, #0000ff 100%)"),
            Some("text"),
        );
        assert_eq!(mode, FILL_GRADIENT);
        assert_eq!(gradient.unwrap().stops.len(), 2);
    }

    #[test]
    fn test_fill_background_image_without_clip_stays_solid() {
        let (mode, hex, gradient) = derive_fill(
            None,
            None,
            None,
            Some("rgb(18, 52, 86)"),
            Some("linear-gradient(180deg, #ff0000 0%, #0000ff 100%)"),
            Some("border-box"),
        );
        assert_eq!(mode, FILL_SOLID);
        assert_eq!(hex, "#123456");
        assert!(gradient.is_none());
    }

    #[test]
    fn test_fill_gradient_attr_survives_stolen_background() {
        // A dashed-stroke SVG owns background-image; the gradient attribute
        // still reconstructs the stops.
        let (mode, _, gradient) = derive_fill(
            Some("gradient"),
            Some("#123456"),
            Some("linear-gradient(90deg, #ff0000 0%, #0000ff 100%)"),
            Some("transparent"),
            Some("url(\"data:image/svg+xml,...\")"),
            Some("border-box"),
        );
        assert_eq!(mode, FILL_GRADIENT);
        assert_eq!(gradient.unwrap().angle_deg, 90.0);
    }

    #[test]
    fn test_stroke_intent_attributes_win_over_computed() {
        // Outside stroke: CSS carries the doubled width, attributes the
        // authored one.
        let stroke = derive_stroke(
            Some("2"),
            Some("#ff0000"),
            Some("outside"),
            None,
            Some("4px rgb(255, 0, 0)"),
        );
        assert_eq!(
            stroke,
            TextStroke::Solid {
                width: 2.0,
                color: "#ff0000".to_string(),
                position: StrokePosition::Outside,
            }
        );
    }

    #[test]
    fn test_stroke_dash_attr_selects_dashed() {
        let stroke = derive_stroke(Some("1.5"), Some("#00ff00"), None, Some("4 2"), None);
        assert_eq!(
            stroke,
            TextStroke::Dashed {
                width: 1.5,
                color: "#00ff00".to_string(),
                dash: 4.0,
                gap: 2.0,
            }
        );
    }

    #[test]
    fn test_stroke_deduced_from_computed_defaults_to_center() {
        let stroke = derive_stroke(None, None, None, None, Some("2px rgb(0, 0, 0)"));
        assert_eq!(
            stroke,
            TextStroke::Solid {
                width: 2.0,
                color: "rgb(0, 0, 0)".to_string(),
                position: StrokePosition::Center,
            }
        );
    }

    #[test]
    fn test_no_stroke() {
        assert_eq!(derive_stroke(None, None, None, None, None), TextStroke::None);
    }

    #[test]
    fn test_parse_dash_attr() {
        assert_eq!(parse_dash_attr("4 2"), Some((4.0, 2.0)));
        assert_eq!(parse_dash_attr("4"), None);
    }
}
