//! Text stroke rendering strategies.
//!
//! Solid strokes map onto native text-stroke CSS, with `paint-order`
//! standing in for the outside/center/inside authoring choice (an outside
//! stroke paints under the fill at doubled width so its visible half keeps
//! the nominal width; inside has no CSS equivalent and keeps its intent in
//! a data attribute). Dashed strokes have no CSS form at all: the text is
//! re-rendered as an inline SVG background with manual line wrapping, and
//! the element's own glyphs go transparent.

use serde::{Deserialize, Serialize};

use crate::error::EditorError;

pub const ATTR_STROKE_POSITION: &str = "data-stroke-position";
pub const ATTR_STROKE_WIDTH: &str = "data-stroke-width";
pub const ATTR_STROKE_COLOR: &str = "data-stroke-color";
pub const ATTR_STROKE_DASH: &str = "data-stroke-dash";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrokePosition {
    Outside,
    #[default]
    Center,
    Inside,
}

impl StrokePosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrokePosition::Outside => "outside",
            StrokePosition::Center => "center",
            StrokePosition::Inside => "inside",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "outside" => Some(StrokePosition::Outside),
            "center" => Some(StrokePosition::Center),
            "inside" => Some(StrokePosition::Inside),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TextStroke {
    None,
    Solid {
        width: f64,
        color: String,
        position: StrokePosition,
    },
    Dashed {
        width: f64,
        color: String,
        dash: f64,
        gap: f64,
    },
}

/// Style writes for a solid stroke. The width doubling for outside strokes
/// keeps the visible half at the requested width once the fill paints over
/// the inner half.
pub fn solid_stroke_css(
    width: f64,
    color: &str,
    position: StrokePosition,
) -> Vec<(&'static str, String)> {
    match position {
        StrokePosition::Outside => vec![
            ("-webkit-text-stroke", format!("{}px {}", width * 2.0, color)),
            ("paint-order", "stroke fill".to_string()),
        ],
        StrokePosition::Center => vec![
            ("-webkit-text-stroke", format!("{}px {}", width, color)),
            ("paint-order", "normal".to_string()),
        ],
        StrokePosition::Inside => vec![
            ("-webkit-text-stroke", format!("{}px {}", width, color)),
            ("paint-order", "fill stroke".to_string()),
        ],
    }
}

/// Parse a computed `-webkit-text-stroke` shorthand ("2px rgb(255, 0, 0)").
pub fn parse_stroke_css(value: &str) -> Option<(f64, String)> {
    let value = value.trim();
    let (first, rest) = value.split_once(' ')?;
    let width: f64 = first.strip_suffix("px")?.parse().ok()?;
    let color = rest.trim();
    if color.is_empty() || width <= 0.0 {
        return None;
    }
    Some((width, color.to_string()))
}

/// Typography needed to measure and re-render text.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size_px: f64,
    pub weight: String,
    pub line_height: f64,
}

impl FontSpec {
    /// Canvas 2d `font` shorthand.
    pub fn css_font(&self) -> String {
        format!("{} {}px {}", self.weight, self.size_px, self.family)
    }
}

/// Text width measurement seam. The browser implementation wraps a canvas
/// 2d context; tests substitute a fixed-advance fake.
pub trait TextMeasurer {
    fn text_width(&self, text: &str, font: &FontSpec) -> f64;
}

/// Greedy word wrap against the element's width. A single word wider than
/// the limit gets its own overflowing line rather than being broken.
pub fn wrap_lines(
    text: &str,
    font: &FontSpec,
    max_width: f64,
    measurer: &dyn TextMeasurer,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if !current.is_empty() && measurer.text_width(&candidate, font) > max_width {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// A rendered SVG text block ready to become a background-image.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgBackground {
    pub markup: String,
    pub width: f64,
    pub height: f64,
}

#[derive(Serialize)]
struct SvgLine {
    y: String,
    text: String,
}

#[derive(Serialize)]
struct SvgContext {
    width: String,
    height: String,
    font_family: String,
    font_size: String,
    font_weight: String,
    stroke_color: String,
    stroke_width: String,
    dash_array: String,
    lines: Vec<SvgLine>,
}

fn render(template: &str, context: &impl Serialize) -> Result<String, EditorError> {
    let compiled = mustache::compile_str(template)?;
    Ok(compiled.render_to_string(context)?)
}

/// Render dashed-stroke text as standalone SVG markup. Line wrapping is
/// manual because SVG `<text>` does not flow.
pub fn render_dashed_svg(
    text: &str,
    font: &FontSpec,
    width: f64,
    color: &str,
    dash: f64,
    gap: f64,
    max_width: f64,
    measurer: &dyn TextMeasurer,
) -> Result<SvgBackground, EditorError> {
    let lines = wrap_lines(text, font, max_width, measurer);
    let widest = lines
        .iter()
        .map(|line| measurer.text_width(line, font))
        .fold(0.0_f64, f64::max)
        .max(1.0);
    let height = lines.len() as f64 * font.line_height + font.size_px * 0.25;

    let svg_lines: Vec<SvgLine> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| SvgLine {
            y: format!("{:.1}", font.size_px + index as f64 * font.line_height),
            text: line.clone(),
        })
        .collect();

    let context = SvgContext {
        width: format!("{:.1}", widest),
        height: format!("{:.1}", height),
        font_family: font.family.clone(),
        font_size: format!("{:.1}", font.size_px),
        font_weight: font.weight.clone(),
        stroke_color: color.to_string(),
        stroke_width: format!("{:.1}", width),
        dash_array: format!("{} {}", dash, gap),
        lines: svg_lines,
    };
    let markup = render(include_str!("templates/stroke_text.svg.mustache"), &context)?;
    Ok(SvgBackground {
        markup,
        width: widest,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ten pixels per character, ignoring the font.
    struct FixedMeasurer;

    impl TextMeasurer for FixedMeasurer {
        fn text_width(&self, text: &str, _font: &FontSpec) -> f64 {
            text.chars().count() as f64 * 10.0
        }
    }

    fn font() -> FontSpec {
        FontSpec {
            family: "Arial".to_string(),
            size_px: 16.0,
            weight: "400".to_string(),
            line_height: 20.0,
        }
    }

    #[test]
    fn test_wrap_splits_on_width() {
        let lines = wrap_lines("alpha beta gamma", &font(), 110.0, &FixedMeasurer);
        assert_eq!(lines, vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn test_wrap_keeps_oversized_word_whole() {
        let lines = wrap_lines("tiny extraordinarily tiny", &font(), 80.0, &FixedMeasurer);
        assert_eq!(lines, vec!["tiny", "extraordinarily", "tiny"]);
    }

    #[test]
    fn test_wrap_preserves_blank_paragraphs() {
        let lines = wrap_lines("one\n\ntwo", &font(), 200.0, &FixedMeasurer);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn test_outside_stroke_doubles_width_and_reorders_paint() {
        let css = solid_stroke_css(2.0, "#ff0000", StrokePosition::Outside);
        assert!(css.contains(&("-webkit-text-stroke", "4px #ff0000".to_string())));
        assert!(css.contains(&("paint-order", "stroke fill".to_string())));
    }

    #[test]
    fn test_center_stroke_keeps_width() {
        let css = solid_stroke_css(2.0, "#ff0000", StrokePosition::Center);
        assert!(css.contains(&("-webkit-text-stroke", "2px #ff0000".to_string())));
    }

    #[test]
    fn test_parse_computed_stroke_shorthand() {
        assert_eq!(
            parse_stroke_css("2px rgb(255, 0, 0)"),
            Some((2.0, "rgb(255, 0, 0)".to_string()))
        );
        assert_eq!(parse_stroke_css("0px none"), None);
    }

    #[test]
    fn test_dashed_svg_contains_dasharray_and_escapes() {
        let svg = render_dashed_svg(
            "a <b> c",
            &font(),
            1.5,
            "#00ff00",
            4.0,
            2.0,
            400.0,
            &FixedMeasurer,
        )
        .unwrap();
        assert!(svg.markup.contains("stroke-dasharray=\"4 2\""));
        assert!(svg.markup.contains("&lt;b&gt;"));
        assert!(!svg.markup.contains("<b>"));
        assert_eq!(svg.height, 20.0 + 4.0);
    }

    #[test]
    fn test_dashed_svg_one_text_node_per_line() {
        let svg = render_dashed_svg(
            "alpha beta gamma",
            &font(),
            1.0,
            "#000000",
            2.0,
            2.0,
            110.0,
            &FixedMeasurer,
        )
        .unwrap();
        assert_eq!(svg.markup.matches("<text").count(), 2);
    }
}
