//! Tooltip placement math.
//!
//! Pure geometry, kept separate from the DOM runtime so the clamping rules
//! are testable without a browser. The tooltip prefers the space above its
//! target, horizontally centered; it slides along the viewport edges rather
//! than overflowing, and flips below the target only when there is no room
//! above. A bridge region between target and tooltip keeps the tooltip open
//! while the pointer travels onto it.

use crate::protocol::message::ElementRect;

pub const VIEWPORT_MARGIN: f64 = 8.0;
pub const TARGET_GAP: f64 = 8.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TooltipPlacement {
    pub left: f64,
    pub top: f64,
    pub below: bool,
}

pub fn place_tooltip(
    target: &ElementRect,
    tip_width: f64,
    tip_height: f64,
    viewport_width: f64,
    viewport_height: f64,
) -> TooltipPlacement {
    let max_left = (viewport_width - tip_width - VIEWPORT_MARGIN).max(VIEWPORT_MARGIN);
    let left = (target.center_x() - tip_width / 2.0).clamp(VIEWPORT_MARGIN, max_left);

    let above_top = target.y - tip_height - TARGET_GAP;
    if above_top >= VIEWPORT_MARGIN {
        return TooltipPlacement {
            left,
            top: above_top,
            below: false,
        };
    }

    let below_top = target.y + target.height + TARGET_GAP;
    if below_top + tip_height + VIEWPORT_MARGIN <= viewport_height {
        return TooltipPlacement {
            left,
            top: below_top,
            below: true,
        };
    }

    // No room either side: pin above, clamped into view.
    TooltipPlacement {
        left,
        top: VIEWPORT_MARGIN,
        below: false,
    }
}

/// The corridor between target and tooltip. Pointer positions inside it do
/// not count as leaving the hover region.
pub fn bridge_rect(
    target: &ElementRect,
    placement: &TooltipPlacement,
    tip_width: f64,
    tip_height: f64,
) -> ElementRect {
    let left = placement.left.min(target.x);
    let right = (placement.left + tip_width).max(target.x + target.width);
    let (top, bottom) = if placement.below {
        (target.y + target.height, placement.top)
    } else {
        (placement.top + tip_height, target.y)
    };
    ElementRect {
        x: left,
        y: top,
        width: right - left,
        height: (bottom - top).max(0.0),
    }
}

fn contains(rect: &ElementRect, x: f64, y: f64) -> bool {
    x >= rect.x && x <= rect.x + rect.width && y >= rect.y && y <= rect.y + rect.height
}

/// Whether the pointer is still over target, tooltip, or the bridge between
/// them.
pub fn within_hover_region(
    x: f64,
    y: f64,
    target: &ElementRect,
    placement: &TooltipPlacement,
    tip_width: f64,
    tip_height: f64,
) -> bool {
    let tip = ElementRect {
        x: placement.left,
        y: placement.top,
        width: tip_width,
        height: tip_height,
    };
    contains(target, x, y)
        || contains(&tip, x, y)
        || contains(&bridge_rect(target, placement, tip_width, tip_height), x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ElementRect {
        ElementRect {
            x: 300.0,
            y: 200.0,
            width: 100.0,
            height: 40.0,
        }
    }

    #[test]
    fn test_prefers_above_centered() {
        let p = place_tooltip(&target(), 120.0, 30.0, 1000.0, 800.0);
        assert!(!p.below);
        assert_eq!(p.left, 290.0);
        assert_eq!(p.top, 200.0 - 30.0 - TARGET_GAP);
    }

    #[test]
    fn test_clamps_to_left_edge() {
        let near_left = ElementRect {
            x: 2.0,
            y: 200.0,
            width: 20.0,
            height: 20.0,
        };
        let p = place_tooltip(&near_left, 150.0, 30.0, 1000.0, 800.0);
        assert_eq!(p.left, VIEWPORT_MARGIN);
    }

    #[test]
    fn test_clamps_to_right_edge() {
        let near_right = ElementRect {
            x: 960.0,
            y: 200.0,
            width: 30.0,
            height: 20.0,
        };
        let p = place_tooltip(&near_right, 150.0, 30.0, 1000.0, 800.0);
        assert_eq!(p.left, 1000.0 - 150.0 - VIEWPORT_MARGIN);
    }

    #[test]
    fn test_flips_below_near_top() {
        let near_top = ElementRect {
            x: 300.0,
            y: 10.0,
            width: 100.0,
            height: 20.0,
        };
        let p = place_tooltip(&near_top, 120.0, 30.0, 1000.0, 800.0);
        assert!(p.below);
        assert_eq!(p.top, 10.0 + 20.0 + TARGET_GAP);
    }

    #[test]
    fn test_bridge_spans_gap() {
        let t = target();
        let p = place_tooltip(&t, 120.0, 30.0, 1000.0, 800.0);
        let bridge = bridge_rect(&t, &p, 120.0, 30.0);
        assert_eq!(bridge.y, p.top + 30.0);
        assert_eq!(bridge.height, TARGET_GAP);
        // Pointer halfway between tooltip and target stays in the region.
        assert!(within_hover_region(
            350.0,
            p.top + 30.0 + 4.0,
            &t,
            &p,
            120.0,
            30.0
        ));
        // Far away does not.
        assert!(!within_hover_region(700.0, 600.0, &t, &p, 120.0, 30.0));
    }
}
