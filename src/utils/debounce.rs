//! Trailing-edge debounce built on `gloo_timers::callback::Timeout`.
//!
//! Typing serialization (~200ms), property-edit serialization (~500ms) and
//! thumbnail regeneration (~800ms) all funnel through this. Re-arming drops
//! the pending call instead of stacking a second one, and teardown paths
//! cancel outright.

use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;

pub const TYPING_DEBOUNCE_MS: u32 = 200;
pub const PROPERTY_DEBOUNCE_MS: u32 = 500;
pub const THUMBNAIL_DEBOUNCE_MS: u32 = 800;

pub struct Debouncer {
    delay_ms: u32,
    handle: Option<Timeout>,
    armed: Rc<Cell<bool>>,
}

impl Debouncer {
    pub fn new(delay_ms: u32) -> Self {
        Debouncer {
            delay_ms,
            handle: None,
            armed: Rc::new(Cell::new(false)),
        }
    }

    /// Arm the window with `f`. A still-pending call is canceled first, so
    /// only the latest closure ever runs.
    pub fn call<F: FnOnce() + 'static>(&mut self, f: F) {
        self.cancel();
        let armed = Rc::clone(&self.armed);
        armed.set(true);
        self.handle = Some(Timeout::new(self.delay_ms, move || {
            armed.set(false);
            f();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
        self.armed.set(false);
    }

    pub fn is_pending(&self) -> bool {
        self.armed.get()
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_debouncer_is_idle() {
        let d = Debouncer::new(TYPING_DEBOUNCE_MS);
        assert!(!d.is_pending());
        assert_eq!(d.delay_ms(), 200);
    }

    #[test]
    fn test_cancel_without_pending_is_noop() {
        let mut d = Debouncer::new(PROPERTY_DEBOUNCE_MS);
        d.cancel();
        assert!(!d.is_pending());
    }
}
