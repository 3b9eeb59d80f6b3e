//! Element classification for the live canvas
//!
//! This module defines the element kinds a user can select and edit on the
//! canvas, plus the tag-class rules that decide which DOM elements become
//! editable when a page is loaded.

use serde::{Deserialize, Serialize};

/// Kind tag of a selectable canvas element, reported to the host alongside
/// the live element reference on every selection change.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Text-bearing element made contenteditable (headings, paragraphs,
    /// spans, list items, table cells, labels, childless divs)
    Text,

    /// Raster image element
    Image,

    /// Video element
    Video,

    /// Inline SVG / icon element
    Svg,

    /// Animated GIF (an image whose source is a .gif; tracked separately so
    /// the host panel can offer GIF-specific replacement)
    Gif,
}

impl ElementKind {
    /// The string form used in host callbacks and `data-*` attributes.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Image => "image",
            ElementKind::Video => "video",
            ElementKind::Svg => "svg",
            ElementKind::Gif => "gif",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(ElementKind::Text),
            "image" => Some(ElementKind::Image),
            "video" => Some(ElementKind::Video),
            "svg" => Some(ElementKind::Svg),
            "gif" => Some(ElementKind::Gif),
            _ => None,
        }
    }
}

/// Tags that become contenteditable when they carry text content.
pub const TEXT_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "a", "li", "td", "th", "label",
];

/// Classify a DOM element by tag name into the kind it would be selected as,
/// or `None` when the element is not directly editable.
///
/// `has_element_children` only matters for `div`: a div acting as a layout
/// container is not editable, a leaf div holding bare text is.
/// `source` is the element's `src` attribute when present; a `.gif` source
/// reclassifies an image as [`ElementKind::Gif`].
pub fn classify_tag(
    tag: &str,
    has_element_children: bool,
    source: Option<&str>,
) -> Option<ElementKind> {
    let tag = tag.to_ascii_lowercase();
    match tag.as_str() {
        "img" => {
            let is_gif = source
                .map(|s| {
                    let s = s.split(['?', '#']).next().unwrap_or(s);
                    s.to_ascii_lowercase().ends_with(".gif")
                })
                .unwrap_or(false);
            Some(if is_gif {
                ElementKind::Gif
            } else {
                ElementKind::Image
            })
        }
        "video" => Some(ElementKind::Video),
        "svg" => Some(ElementKind::Svg),
        "div" => {
            if has_element_children {
                None
            } else {
                Some(ElementKind::Text)
            }
        }
        t if TEXT_TAGS.contains(&t) => Some(ElementKind::Text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_tags_classify_as_text() {
        for tag in TEXT_TAGS {
            assert_eq!(classify_tag(tag, false, None), Some(ElementKind::Text));
        }
        // Text tags stay editable even with children (spans inside headings)
        assert_eq!(classify_tag("h1", true, None), Some(ElementKind::Text));
    }

    #[test]
    fn test_div_only_editable_without_element_children() {
        assert_eq!(classify_tag("div", false, None), Some(ElementKind::Text));
        assert_eq!(classify_tag("div", true, None), None);
    }

    #[test]
    fn test_media_classification() {
        assert_eq!(
            classify_tag("img", false, Some("photo.png")),
            Some(ElementKind::Image)
        );
        assert_eq!(
            classify_tag("img", false, Some("anim.GIF?v=2")),
            Some(ElementKind::Gif)
        );
        assert_eq!(classify_tag("video", false, None), Some(ElementKind::Video));
        assert_eq!(classify_tag("svg", false, None), Some(ElementKind::Svg));
    }

    #[test]
    fn test_uppercase_tag_names() {
        // DOM tagName reports upper case for HTML elements
        assert_eq!(classify_tag("P", false, None), Some(ElementKind::Text));
        assert_eq!(classify_tag("IMG", false, None), Some(ElementKind::Image));
    }

    #[test]
    fn test_non_editable_tags() {
        assert_eq!(classify_tag("section", false, None), None);
        assert_eq!(classify_tag("body", false, None), None);
        assert_eq!(classify_tag("style", false, None), None);
    }

    #[test]
    fn test_kind_string_round_trip() {
        for kind in [
            ElementKind::Text,
            ElementKind::Image,
            ElementKind::Video,
            ElementKind::Svg,
            ElementKind::Gif,
        ] {
            assert_eq!(ElementKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ElementKind::parse("audio"), None);
    }
}
