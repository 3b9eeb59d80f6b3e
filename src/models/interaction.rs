//! Interaction attribute schema
//!
//! One element carries at most one interaction. The whole configuration
//! lives in `data-*` attributes on the element itself (so it persists inside
//! the page html), and clearing an interaction removes the entire attribute
//! family in one sweep; a partial attribute set is not a valid state.

use serde::{Deserialize, Serialize};

use crate::error::EditorError;

pub const ATTR_INTERACTION: &str = "data-interaction";
pub const ATTR_TRIGGER: &str = "data-interaction-trigger";
pub const ATTR_VALUE: &str = "data-interaction-value";
pub const ATTR_CONTENT: &str = "data-interaction-content";
pub const ATTR_HIGHLIGHT: &str = "data-interaction-highlight";
pub const ATTR_FILENAME: &str = "data-filename";
pub const POPUP_ATTR_PREFIX: &str = "data-popup-";
pub const TOOLTIP_ATTR_PREFIX: &str = "data-tooltip-";

/// The interaction kinds an element can carry. `None` is both the initial
/// state and the reset target.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    #[default]
    None,
    Link,
    Navigation,
    Call,
    Zoom,
    Popup,
    Tooltip,
    Download,
    #[serde(rename = "3dviewer")]
    ThreeDViewer,
    Slideshow,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::None => "none",
            InteractionKind::Link => "link",
            InteractionKind::Navigation => "navigation",
            InteractionKind::Call => "call",
            InteractionKind::Zoom => "zoom",
            InteractionKind::Popup => "popup",
            InteractionKind::Tooltip => "tooltip",
            InteractionKind::Download => "download",
            InteractionKind::ThreeDViewer => "3dviewer",
            InteractionKind::Slideshow => "slideshow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(InteractionKind::None),
            "link" => Some(InteractionKind::Link),
            "navigation" => Some(InteractionKind::Navigation),
            "call" => Some(InteractionKind::Call),
            "zoom" => Some(InteractionKind::Zoom),
            "popup" => Some(InteractionKind::Popup),
            "tooltip" => Some(InteractionKind::Tooltip),
            "download" => Some(InteractionKind::Download),
            "3dviewer" => Some(InteractionKind::ThreeDViewer),
            "slideshow" => Some(InteractionKind::Slideshow),
            _ => None,
        }
    }

    /// Hover-triggered links are refused: browsers block window.open from a
    /// hover handler, which would silently break the published page.
    pub fn supports_hover(&self) -> bool {
        !matches!(self, InteractionKind::Link)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    #[default]
    Click,
    Hover,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Click => "click",
            TriggerKind::Hover => "hover",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "click" => Some(TriggerKind::Click),
            "hover" => Some(TriggerKind::Hover),
            _ => None,
        }
    }
}

/// Popup typography/box overrides, persisted as `data-popup-*` attributes.
/// Captured once from the element's computed typography when the popup kind
/// is first entered, then owned by the panel.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PopupStyle {
    pub font_family: Option<String>,
    pub font_size: Option<String>,
    pub font_weight: Option<String>,
    pub color: Option<String>,
    pub fill: Option<String>,
    pub fit: Option<String>,
}

impl PopupStyle {
    pub fn is_empty(&self) -> bool {
        self.font_family.is_none()
            && self.font_size.is_none()
            && self.font_weight.is_none()
            && self.color.is_none()
            && self.fill.is_none()
            && self.fit.is_none()
    }

    fn attribute_pairs(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let mut push = |key: &str, value: &Option<String>| {
            if let Some(v) = value {
                out.push((format!("{}{}", POPUP_ATTR_PREFIX, key), v.clone()));
            }
        };
        push("font", &self.font_family);
        push("size", &self.font_size);
        push("weight", &self.font_weight);
        push("color", &self.color);
        push("fill", &self.fill);
        push("fit", &self.fit);
        out
    }

    fn set_from_attribute(&mut self, key: &str, value: &str) {
        match key {
            "font" => self.font_family = Some(value.to_string()),
            "size" => self.font_size = Some(value.to_string()),
            "weight" => self.font_weight = Some(value.to_string()),
            "color" => self.color = Some(value.to_string()),
            "fill" => self.fill = Some(value.to_string()),
            "fit" => self.fit = Some(value.to_string()),
            _ => {}
        }
    }
}

/// Tooltip colors, persisted as `data-tooltip-*` attributes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct TooltipStyle {
    pub background: Option<String>,
    pub color: Option<String>,
}

impl TooltipStyle {
    pub fn is_empty(&self) -> bool {
        self.background.is_none() && self.color.is_none()
    }

    fn attribute_pairs(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(v) = &self.background {
            out.push((format!("{}background", TOOLTIP_ATTR_PREFIX), v.clone()));
        }
        if let Some(v) = &self.color {
            out.push((format!("{}color", TOOLTIP_ATTR_PREFIX), v.clone()));
        }
        out
    }
}

/// Complete interaction configuration for one element.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InteractionSpec {
    pub kind: InteractionKind,
    pub trigger: TriggerKind,
    /// Kind-specific payload: URL, page number, phone number, zoom
    /// multiplier, or data URI
    pub value: Option<String>,
    /// Popup/tooltip body text
    pub content: Option<String>,
    /// Visual affordance flag, independent of kind
    pub highlight: bool,
    /// Derived download filename
    pub filename: Option<String>,
    pub popup_style: PopupStyle,
    pub tooltip_style: TooltipStyle,
}

impl InteractionSpec {
    /// Reject configurations the runtime cannot honor.
    pub fn validate(&self) -> Result<(), EditorError> {
        if self.trigger == TriggerKind::Hover && !self.kind.supports_hover() {
            return Err(EditorError::refused(
                "hover trigger is not available for link interactions",
            ));
        }
        Ok(())
    }

    /// The full attribute list this spec writes onto its element. A `None`
    /// kind writes nothing: clearing is expressed by removal, not by a
    /// `data-interaction="none"` marker.
    pub fn to_attributes(&self) -> Vec<(String, String)> {
        if self.kind == InteractionKind::None {
            return Vec::new();
        }
        let mut attrs = vec![
            (ATTR_INTERACTION.to_string(), self.kind.as_str().to_string()),
            (ATTR_TRIGGER.to_string(), self.trigger.as_str().to_string()),
        ];
        if let Some(value) = &self.value {
            attrs.push((ATTR_VALUE.to_string(), value.clone()));
        }
        if let Some(content) = &self.content {
            attrs.push((ATTR_CONTENT.to_string(), content.clone()));
        }
        if self.highlight {
            attrs.push((ATTR_HIGHLIGHT.to_string(), "true".to_string()));
        }
        if let Some(filename) = &self.filename {
            attrs.push((ATTR_FILENAME.to_string(), filename.clone()));
        }
        attrs.extend(self.popup_style.attribute_pairs());
        attrs.extend(self.tooltip_style.attribute_pairs());
        attrs
    }

    /// Rebuild a spec from an element's attribute pairs. Unknown kinds and
    /// unrelated attributes are ignored.
    pub fn from_attributes<'a>(attrs: impl Iterator<Item = (&'a str, &'a str)>) -> Self {
        let mut spec = InteractionSpec::default();
        for (name, value) in attrs {
            match name {
                ATTR_INTERACTION => {
                    if let Some(kind) = InteractionKind::parse(value) {
                        spec.kind = kind;
                    }
                }
                ATTR_TRIGGER => {
                    if let Some(trigger) = TriggerKind::parse(value) {
                        spec.trigger = trigger;
                    }
                }
                ATTR_VALUE => spec.value = Some(value.to_string()),
                ATTR_CONTENT => spec.content = Some(value.to_string()),
                ATTR_HIGHLIGHT => spec.highlight = value == "true",
                ATTR_FILENAME => spec.filename = Some(value.to_string()),
                _ => {
                    if let Some(key) = name.strip_prefix(POPUP_ATTR_PREFIX) {
                        spec.popup_style.set_from_attribute(key, value);
                    } else if let Some(key) = name.strip_prefix(TOOLTIP_ATTR_PREFIX) {
                        match key {
                            "background" => {
                                spec.tooltip_style.background = Some(value.to_string())
                            }
                            "color" => spec.tooltip_style.color = Some(value.to_string()),
                            _ => {}
                        }
                    }
                }
            }
        }
        spec
    }
}

/// Whether an attribute belongs to the interaction family and must go when
/// the interaction is cleared.
pub fn is_interaction_attribute(name: &str) -> bool {
    matches!(
        name,
        ATTR_INTERACTION | ATTR_TRIGGER | ATTR_VALUE | ATTR_CONTENT | ATTR_HIGHLIGHT
            | ATTR_FILENAME
    ) || name.starts_with(POPUP_ATTR_PREFIX)
        || name.starts_with(TOOLTIP_ATTR_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_string_round_trip() {
        for kind in [
            InteractionKind::None,
            InteractionKind::Link,
            InteractionKind::Navigation,
            InteractionKind::Call,
            InteractionKind::Zoom,
            InteractionKind::Popup,
            InteractionKind::Tooltip,
            InteractionKind::Download,
            InteractionKind::ThreeDViewer,
            InteractionKind::Slideshow,
        ] {
            assert_eq!(InteractionKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_hover_refused_for_link() {
        let spec = InteractionSpec {
            kind: InteractionKind::Link,
            trigger: TriggerKind::Hover,
            value: Some("https://example.com".into()),
            ..Default::default()
        };
        assert!(spec.validate().is_err());

        let spec = InteractionSpec {
            kind: InteractionKind::Tooltip,
            trigger: TriggerKind::Hover,
            content: Some("hi".into()),
            ..Default::default()
        };
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_none_kind_writes_no_attributes() {
        let spec = InteractionSpec::default();
        assert!(spec.to_attributes().is_empty());
    }

    #[test]
    fn test_attribute_round_trip() {
        let spec = InteractionSpec {
            kind: InteractionKind::Popup,
            trigger: TriggerKind::Click,
            content: Some("Hello popup".into()),
            highlight: true,
            popup_style: PopupStyle {
                font_family: Some("Georgia".into()),
                font_size: Some("18px".into()),
                font_weight: Some("700".into()),
                color: Some("#222222".into()),
                fill: None,
                fit: Some("contain".into()),
            },
            ..Default::default()
        };
        let attrs = spec.to_attributes();
        let rebuilt = InteractionSpec::from_attributes(
            attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        assert_eq!(rebuilt, spec);
    }

    #[test]
    fn test_family_membership() {
        assert!(is_interaction_attribute(ATTR_INTERACTION));
        assert!(is_interaction_attribute(ATTR_FILENAME));
        assert!(is_interaction_attribute("data-popup-size"));
        assert!(is_interaction_attribute("data-tooltip-background"));
        assert!(!is_interaction_attribute("data-editable"));
        assert!(!is_interaction_attribute("class"));
    }

    #[test]
    fn test_unknown_attributes_ignored() {
        let pairs = [
            ("data-interaction", "zoom"),
            ("data-interaction-value", "2.5"),
            ("class", "hero"),
            ("data-popup-bogus", "x"),
        ];
        let spec = InteractionSpec::from_attributes(pairs.iter().copied());
        assert_eq!(spec.kind, InteractionKind::Zoom);
        assert_eq!(spec.value.as_deref(), Some("2.5"));
        assert!(spec.popup_style.is_empty());
    }
}
