//! Keyboard, wheel-zoom and autoplay policy.
//!
//! Pure mapping from input to intent; the engine owns the DOM listeners and
//! decides whether the intent can run (mid-turn requests are dropped there).

pub const ZOOM_MIN: f64 = 0.4;
pub const ZOOM_MAX: f64 = 1.5;
pub const ZOOM_STEP: f64 = 0.05;

/// Autoplay page-advance interval.
pub const AUTOPLAY_INTERVAL_MS: u32 = 3000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyIntent {
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    ToggleAutoplay,
    CloseOverlay,
}

/// Map a `KeyboardEvent.key` value to a book intent.
pub fn intent_for_key(key: &str) -> Option<KeyIntent> {
    match key {
        "ArrowRight" | "PageDown" => Some(KeyIntent::NextPage),
        "ArrowLeft" | "PageUp" => Some(KeyIntent::PrevPage),
        "Home" => Some(KeyIntent::FirstPage),
        "End" => Some(KeyIntent::LastPage),
        " " | "Spacebar" => Some(KeyIntent::ToggleAutoplay),
        "Escape" => Some(KeyIntent::CloseOverlay),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayTarget {
    Fullscreen,
    ThumbnailStrip,
}

/// Escape closes fullscreen before the thumbnail strip.
pub fn escape_target(fullscreen_open: bool, thumbnails_open: bool) -> Option<OverlayTarget> {
    if fullscreen_open {
        Some(OverlayTarget::Fullscreen)
    } else if thumbnails_open {
        Some(OverlayTarget::ThumbnailStrip)
    } else {
        None
    }
}

/// One Ctrl/Cmd-scroll notch. Snapped to the step grid so repeated wheel
/// events cannot drift off the 0.05 increments.
pub fn wheel_zoom(current: f64, delta_y: f64) -> f64 {
    let direction = if delta_y < 0.0 { 1.0 } else { -1.0 };
    let stepped = current + direction * ZOOM_STEP;
    let snapped = (stepped / ZOOM_STEP).round() * ZOOM_STEP;
    // Two-decimal grid; keeps 0.4 + n*0.05 exact in floating point.
    ((snapped * 100.0).round() / 100.0).clamp(ZOOM_MIN, ZOOM_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(intent_for_key("ArrowRight"), Some(KeyIntent::NextPage));
        assert_eq!(intent_for_key("PageUp"), Some(KeyIntent::PrevPage));
        assert_eq!(intent_for_key("Home"), Some(KeyIntent::FirstPage));
        assert_eq!(intent_for_key("End"), Some(KeyIntent::LastPage));
        assert_eq!(intent_for_key(" "), Some(KeyIntent::ToggleAutoplay));
        assert_eq!(intent_for_key("Escape"), Some(KeyIntent::CloseOverlay));
        assert_eq!(intent_for_key("a"), None);
    }

    #[test]
    fn test_escape_priority() {
        assert_eq!(escape_target(true, true), Some(OverlayTarget::Fullscreen));
        assert_eq!(
            escape_target(false, true),
            Some(OverlayTarget::ThumbnailStrip)
        );
        assert_eq!(escape_target(false, false), None);
    }

    #[test]
    fn test_wheel_zoom_steps_and_clamps() {
        assert_eq!(wheel_zoom(1.0, -120.0), 1.05);
        assert_eq!(wheel_zoom(1.0, 120.0), 0.95);
        assert_eq!(wheel_zoom(1.5, -120.0), 1.5);
        assert_eq!(wheel_zoom(0.4, 120.0), 0.4);
    }

    #[test]
    fn test_wheel_zoom_never_drifts_off_grid() {
        let mut zoom = 1.0;
        for _ in 0..40 {
            zoom = wheel_zoom(zoom, -120.0);
        }
        assert_eq!(zoom, ZOOM_MAX);
        for _ in 0..40 {
            zoom = wheel_zoom(zoom, 120.0);
        }
        assert_eq!(zoom, ZOOM_MIN);
    }
}
