//! Cross-frame wire messages.
//!
//! `postMessage` is the only channel between the host document and the
//! sandboxed page frames. Every message is a tagged JSON object; unknown
//! tags deserialize to an error and are ignored by receivers, so the two
//! sides can version independently.

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
use web_sys::MessageEvent;

use crate::error::EditorError;
use crate::models::PopupStyle;

/// Bounding box of an element, viewport coordinates of its own frame.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct ElementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Payload of a popup interaction. The frame renders nothing itself; the
/// host rebuilds the overlay from this.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PopupData {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<PopupStyle>,
    #[serde(rename = "elementType")]
    pub element_type: String,
    #[serde(rename = "elementSource", default, skip_serializing_if = "Option::is_none")]
    pub element_source: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SpreadZoomData {
    #[serde(rename = "elementId")]
    pub element_id: String,
    pub scale: f64,
    pub rect: ElementRect,
    pub page: u32,
}

/// Cursor position normalized to the zoomed element's bounds, both axes
/// clamped to 0..1.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ZoomMoveData {
    #[serde(rename = "mouseX")]
    pub mouse_x: f64,
    #[serde(rename = "mouseY")]
    pub mouse_y: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum FrameMessage {
    /// Host -> frames broadcast: spread zoom became active/inactive. Frames
    /// flip a cursor class and start/stop reporting pointer movement.
    #[serde(rename = "set-zoom-state")]
    SetZoomState { active: bool },

    /// Frame -> host: a navigation interaction wants the book turned to a
    /// 1-based page number.
    #[serde(rename = "flipbook-navigate")]
    Navigate { page: u32 },

    /// Frame -> host: a popup interaction fired.
    #[serde(rename = "flipbook-popup")]
    Popup { data: PopupData },

    /// Frame -> host: a zoom interaction fired on an element; the host
    /// computes the book-coordinate transform from the rect and page, and
    /// toggles off when the element id repeats.
    #[serde(rename = "flipbook-spread-zoom")]
    SpreadZoom { data: SpreadZoomData },

    /// Frame -> host while zoomed: pan input.
    #[serde(rename = "flipbook-zoom-move")]
    ZoomMove { data: ZoomMoveData },
}

impl FrameMessage {
    pub fn to_js(&self) -> Result<JsValue, EditorError> {
        serde_wasm_bindgen::to_value(self).map_err(|e| EditorError::Serde(e.to_string()))
    }

    /// Decode a message event's payload. Anything that is not one of our
    /// tagged messages (devtools chatter, other libraries) comes back None.
    pub fn from_event(event: &MessageEvent) -> Option<FrameMessage> {
        serde_wasm_bindgen::from_value(event.data()).ok()
    }
}

/// Post to the embedding document. Frames are same-trust srcdoc children of
/// the host, so the wildcard target origin is deliberate.
pub fn post_to_parent(message: &FrameMessage) -> Result<(), EditorError> {
    let window =
        web_sys::window().ok_or_else(|| EditorError::FrameUnavailable("window".to_string()))?;
    let parent = window
        .parent()
        .map_err(|_| EditorError::FrameUnavailable("parent window".to_string()))?
        .ok_or_else(|| EditorError::FrameUnavailable("parent window".to_string()))?;
    parent
        .post_message(&message.to_js()?, "*")
        .map_err(|_| EditorError::FrameUnavailable("postMessage to parent".to_string()))
}

/// Post into one sub-frame's window.
pub fn post_to_frame(frame: &web_sys::Window, message: &FrameMessage) -> Result<(), EditorError> {
    frame
        .post_message(&message.to_js()?, "*")
        .map_err(|_| EditorError::FrameUnavailable("postMessage to frame".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_wire_shape() {
        let msg = FrameMessage::Navigate { page: 3 };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"flipbook-navigate","page":3}"#);
    }

    #[test]
    fn test_zoom_state_round_trip() {
        let json = r#"{"type":"set-zoom-state","active":true}"#;
        let msg: FrameMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg, FrameMessage::SetZoomState { active: true });
        assert_eq!(serde_json::to_string(&msg).unwrap(), json);
    }

    #[test]
    fn test_popup_wire_shape() {
        let msg = FrameMessage::Popup {
            data: PopupData {
                content: "hello".into(),
                styles: None,
                element_type: "text".into(),
                element_source: None,
            },
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"type":"flipbook-popup","data":{"content":"hello","elementType":"text"}}"#
        );
    }

    #[test]
    fn test_spread_zoom_round_trip() {
        let msg = FrameMessage::SpreadZoom {
            data: SpreadZoomData {
                element_id: "fb-el-7".into(),
                scale: 2.5,
                rect: ElementRect {
                    x: 10.0,
                    y: 20.0,
                    width: 100.0,
                    height: 50.0,
                },
                page: 4,
            },
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""elementId":"fb-el-7""#));
        let back: FrameMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_zoom_move_field_names() {
        let msg = FrameMessage::ZoomMove {
            data: ZoomMoveData {
                mouse_x: 0.25,
                mouse_y: 1.0,
            },
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"type":"flipbook-zoom-move","data":{"mouseX":0.25,"mouseY":1.0}}"#
        );
    }

    #[test]
    fn test_unknown_tag_is_error() {
        let json = r#"{"type":"webpack-dev-server","data":1}"#;
        assert!(serde_json::from_str::<FrameMessage>(json).is_err());
    }

    #[test]
    fn test_rect_center() {
        let rect = ElementRect {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
        };
        assert_eq!(rect.center_x(), 60.0);
        assert_eq!(rect.center_y(), 45.0);
    }
}
