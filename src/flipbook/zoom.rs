//! Spread zoom: magnify one element of the open book in place.
//!
//! A zoom request arrives from a page frame with the element's rect in that
//! frame's viewport coordinates. The stage is laid out with its center at
//! the viewport center, so bringing the element to the viewport center
//! means translating the stage by minus the element's stage-space position,
//! scaled. Stage-space x for a frame-local x is:
//!
//!   left page    x - W          (page spans -W..0)
//!   right page   x              (page spans 0..W)
//!   single view  x - W/2        (page spans -W/2..W/2)
//!
//! plus the view's centering offset when a lone page is shifted toward the
//! gutter. Pointer movement pans the magnified element under the cursor,
//! damped so its edges stay near the element bounds rather than tracking
//! 1:1.

use serde::Serialize;

use crate::flipbook::spread::{centering_offset, page_slot, PageSlot, View, ViewMode};
use crate::protocol::message::SpreadZoomData;

pub const PAN_DAMPING: f64 = 0.8;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ZoomPhase {
    Inactive,
    Entering,
    Active,
}

/// CSS transform applied to the whole book container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Transform {
    pub fn to_css(&self) -> String {
        format!(
            "translate({:.2}px, {:.2}px) scale({:.3})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

/// What the engine must do after a zoom request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomChange {
    Entered(Transform),
    Exited,
}

#[derive(Debug)]
pub struct SpreadZoom {
    phase: ZoomPhase,
    element_id: String,
    scale: f64,
    page: u32,
    element_center_x: f64,
    element_center_y: f64,
    element_width: f64,
    element_height: f64,
    base_x: f64,
    base_y: f64,
    pan_x: f64,
    pan_y: f64,
}

impl SpreadZoom {
    pub fn new() -> Self {
        SpreadZoom {
            phase: ZoomPhase::Inactive,
            element_id: String::new(),
            scale: 1.0,
            page: 0,
            element_center_x: 0.0,
            element_center_y: 0.0,
            element_width: 0.0,
            element_height: 0.0,
            base_x: 0.0,
            base_y: 0.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }

    pub fn phase(&self) -> ZoomPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != ZoomPhase::Inactive
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Handle a zoom request. Repeating the active element's id toggles the
    /// zoom off; anything else (re)targets that element.
    pub fn request(
        &mut self,
        data: &SpreadZoomData,
        view: &View,
        mode: ViewMode,
        page_width: f64,
        page_height: f64,
    ) -> ZoomChange {
        if self.is_active() && self.element_id == data.element_id {
            self.reset();
            return ZoomChange::Exited;
        }

        let slot = page_slot(data.page, mode);
        let offset = centering_offset(view, page_width);
        let frame_center_x = data.rect.center_x();
        let frame_center_y = data.rect.center_y();
        let stage_x = match slot {
            PageSlot::Left => frame_center_x - page_width,
            PageSlot::Right => frame_center_x,
            PageSlot::Single => frame_center_x - page_width / 2.0,
        } + offset;
        let stage_y = frame_center_y - page_height / 2.0;

        self.phase = ZoomPhase::Entering;
        self.element_id = data.element_id.clone();
        self.scale = data.scale;
        self.page = data.page;
        self.element_center_x = stage_x;
        self.element_center_y = stage_y;
        self.element_width = data.rect.width;
        self.element_height = data.rect.height;
        self.base_x = -data.scale * stage_x;
        self.base_y = -data.scale * stage_y;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        ZoomChange::Entered(self.transform())
    }

    /// Enter transition finished; pointer panning may start.
    pub fn mark_entered(&mut self) {
        if self.phase == ZoomPhase::Entering {
            self.phase = ZoomPhase::Active;
        }
    }

    /// Pan for a pointer position normalized within the zoomed element.
    /// Latest position wins; ignored until the enter transition is done.
    pub fn pointer_move(&mut self, mouse_x: f64, mouse_y: f64) -> Option<Transform> {
        if self.phase != ZoomPhase::Active {
            return None;
        }
        let overflow_x = self.element_width * (self.scale - 1.0);
        let overflow_y = self.element_height * (self.scale - 1.0);
        self.pan_x = -(mouse_x.clamp(0.0, 1.0) - 0.5) * overflow_x * PAN_DAMPING;
        self.pan_y = -(mouse_y.clamp(0.0, 1.0) - 0.5) * overflow_y * PAN_DAMPING;
        Some(self.transform())
    }

    /// Backdrop click, navigation, or view-mode toggle.
    pub fn deactivate(&mut self) -> bool {
        if self.is_active() {
            self.reset();
            true
        } else {
            false
        }
    }

    pub fn transform(&self) -> Transform {
        Transform {
            translate_x: self.base_x + self.pan_x,
            translate_y: self.base_y + self.pan_y,
            scale: self.scale,
        }
    }

    fn reset(&mut self) {
        *self = SpreadZoom::new();
    }
}

impl Default for SpreadZoom {
    fn default() -> Self {
        SpreadZoom::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::message::ElementRect;

    const W: f64 = 595.0;
    const H: f64 = 842.0;

    fn zoom_data(element_id: &str, page: u32, cx: f64, cy: f64) -> SpreadZoomData {
        SpreadZoomData {
            element_id: element_id.to_string(),
            scale: 2.0,
            rect: ElementRect {
                x: cx - 50.0,
                y: cy - 25.0,
                width: 100.0,
                height: 50.0,
            },
            page,
        }
    }

    #[test]
    fn test_same_element_toggles() {
        let mut zoom = SpreadZoom::new();
        let view = View::Spread { left: 2, right: 3 };
        let data = zoom_data("el-1", 3, 100.0, 100.0);
        assert!(matches!(
            zoom.request(&data, &view, ViewMode::Double, W, H),
            ZoomChange::Entered(_)
        ));
        assert_eq!(
            zoom.request(&data, &view, ViewMode::Double, W, H),
            ZoomChange::Exited
        );
        assert!(!zoom.is_active());
        assert!(matches!(
            zoom.request(&data, &view, ViewMode::Double, W, H),
            ZoomChange::Entered(_)
        ));
    }

    #[test]
    fn test_different_element_retargets() {
        let mut zoom = SpreadZoom::new();
        let view = View::Spread { left: 2, right: 3 };
        zoom.request(&zoom_data("el-1", 3, 100.0, 100.0), &view, ViewMode::Double, W, H);
        let change = zoom.request(&zoom_data("el-2", 2, 50.0, 50.0), &view, ViewMode::Double, W, H);
        assert!(matches!(change, ZoomChange::Entered(_)));
        assert_eq!(zoom.element_id(), "el-2");
    }

    #[test]
    fn test_right_page_element_translates_left() {
        let mut zoom = SpreadZoom::new();
        let view = View::Spread { left: 2, right: 3 };
        // Element centered in page 3 (right half), vertically centered.
        let data = zoom_data("el-1", 3, W / 2.0, H / 2.0);
        let ZoomChange::Entered(t) = zoom.request(&data, &view, ViewMode::Double, W, H) else {
            panic!("expected enter");
        };
        assert_eq!(t.translate_x, -2.0 * (W / 2.0));
        assert_eq!(t.translate_y, 0.0);
        assert_eq!(t.scale, 2.0);
    }

    #[test]
    fn test_lone_first_page_center_needs_no_translate() {
        let mut zoom = SpreadZoom::new();
        // Page 1 alone on the right; stage already shifted -W/2, so an
        // element at the page center sits exactly at stage center.
        let view = View::Spread { left: 0, right: 1 };
        let data = zoom_data("el-1", 1, W / 2.0, H / 2.0);
        let ZoomChange::Entered(t) = zoom.request(&data, &view, ViewMode::Double, W, H) else {
            panic!("expected enter");
        };
        assert_eq!(t.translate_x, 0.0);
        assert_eq!(t.translate_y, 0.0);
    }

    #[test]
    fn test_single_view_centered_element() {
        let mut zoom = SpreadZoom::new();
        let view = View::Single(2);
        let data = zoom_data("el-1", 2, W / 2.0, H / 2.0);
        let ZoomChange::Entered(t) = zoom.request(&data, &view, ViewMode::Single, W, H) else {
            panic!("expected enter");
        };
        assert_eq!(t.translate_x, 0.0);
        assert_eq!(t.translate_y, 0.0);
    }

    #[test]
    fn test_pan_damped_and_gated_on_entering() {
        let mut zoom = SpreadZoom::new();
        let view = View::Single(1);
        let data = zoom_data("el-1", 1, W / 2.0, H / 2.0);
        zoom.request(&data, &view, ViewMode::Single, W, H);
        assert_eq!(zoom.pointer_move(1.0, 0.5), None);
        zoom.mark_entered();
        let t = zoom.pointer_move(1.0, 0.5).unwrap();
        // overflow = width * (scale - 1) = 100; edge pan = 0.5 * 100 * 0.8.
        assert_eq!(t.translate_x, -40.0);
        assert_eq!(t.translate_y, 0.0);
        // Latest-wins idempotence.
        assert_eq!(zoom.pointer_move(1.0, 0.5).unwrap(), t);
    }

    #[test]
    fn test_deactivate_resets() {
        let mut zoom = SpreadZoom::new();
        let view = View::Single(1);
        zoom.request(&zoom_data("el-1", 1, 10.0, 10.0), &view, ViewMode::Single, W, H);
        assert!(zoom.deactivate());
        assert!(!zoom.deactivate());
        assert_eq!(zoom.phase(), ZoomPhase::Inactive);
    }

    #[test]
    fn test_transform_css_shape() {
        let t = Transform {
            translate_x: -595.0,
            translate_y: 10.5,
            scale: 2.0,
        };
        assert_eq!(t.to_css(), "translate(-595.00px, 10.50px) scale(2.000)");
    }
}
