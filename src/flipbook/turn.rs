//! Turn lifecycle state machine.
//!
//! Exactly one turn animates at a time. `Turning` covers the animation
//! itself; `Settling` is the short window after the page lands in which the
//! committed state absorbs trailing reflow and further turn requests are
//! still refused. Aborted turns (released before the page passes the fold)
//! return to `Idle` without committing anything.

use serde::Serialize;

use crate::error::EditorError;
use crate::flipbook::spread::{clamp_page, ViewMode};

/// Trailing window after a completed turn.
pub const SETTLE_MS: u32 = 100;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnPhase {
    Idle,
    Turning,
    Settling,
}

#[derive(Debug)]
pub struct TurnState {
    phase: TurnPhase,
    current_page: u32,
    pending_page: Option<u32>,
}

impl TurnState {
    pub fn new() -> Self {
        TurnState {
            phase: TurnPhase::Idle,
            current_page: 1,
            pending_page: None,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn is_animating(&self) -> bool {
        self.phase != TurnPhase::Idle
    }

    pub fn pending_page(&self) -> Option<u32> {
        self.pending_page
    }

    /// Start a turn toward `target_page`. Refused while another turn is
    /// animating or settling, and when the target is the current page.
    pub fn begin(&mut self, target_page: u32, page_count: u32) -> Result<u32, EditorError> {
        if self.phase != TurnPhase::Idle {
            return Err(EditorError::refused("a page turn is already in progress"));
        }
        let target = clamp_page(target_page, page_count);
        if target == self.current_page {
            return Err(EditorError::refused("already on the requested page"));
        }
        self.phase = TurnPhase::Turning;
        self.pending_page = Some(target);
        Ok(target)
    }

    /// Animation ended. `turned` false means the flip snapped back, which
    /// leaves the committed page untouched.
    pub fn finish(&mut self, turned: bool) {
        if self.phase != TurnPhase::Turning {
            return;
        }
        if turned {
            if let Some(page) = self.pending_page.take() {
                self.current_page = page;
            }
            self.phase = TurnPhase::Settling;
        } else {
            self.pending_page = None;
            self.phase = TurnPhase::Idle;
        }
    }

    /// A flip driven from inside the rendering library (user drag) landed
    /// on `page` without going through `begin`.
    pub fn complete_external(&mut self, page: u32, page_count: u32) {
        self.current_page = clamp_page(page, page_count);
        self.pending_page = None;
        self.phase = TurnPhase::Settling;
    }

    /// Settle window elapsed.
    pub fn settle(&mut self) {
        if self.phase == TurnPhase::Settling {
            self.phase = TurnPhase::Idle;
        }
    }

    /// Snap to a page with no animation (init, view-mode switch).
    pub fn reset_to(&mut self, page: u32, page_count: u32) {
        self.current_page = clamp_page(page, page_count);
        self.pending_page = None;
        self.phase = TurnPhase::Idle;
    }

    /// The view the stage should center for right now: the turn target while
    /// animating, the committed page otherwise.
    pub fn display_page(&self) -> u32 {
        match self.phase {
            TurnPhase::Turning => self.pending_page.unwrap_or(self.current_page),
            _ => self.current_page,
        }
    }

    pub fn display_view(
        &self,
        page_count: u32,
        mode: ViewMode,
    ) -> crate::flipbook::spread::View {
        crate::flipbook::spread::view_for_page(self.display_page(), page_count, mode)
    }
}

impl Default for TurnState {
    fn default() -> Self {
        TurnState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_turn_refused() {
        let mut state = TurnState::new();
        state.begin(3, 5).unwrap();
        let err = state.begin(4, 5).unwrap_err();
        assert!(err.to_string().contains("in progress"));
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn test_completed_turn_commits_after_finish() {
        let mut state = TurnState::new();
        state.begin(3, 5).unwrap();
        assert_eq!(state.current_page(), 1);
        state.finish(true);
        assert_eq!(state.current_page(), 3);
        assert_eq!(state.phase(), TurnPhase::Settling);
        // Still refused until settled.
        assert!(state.begin(5, 5).is_err());
        state.settle();
        assert_eq!(state.phase(), TurnPhase::Idle);
        assert!(state.begin(5, 5).is_ok());
    }

    #[test]
    fn test_aborted_turn_commits_nothing() {
        let mut state = TurnState::new();
        state.begin(3, 5).unwrap();
        state.finish(false);
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.phase(), TurnPhase::Idle);
    }

    #[test]
    fn test_turn_to_current_page_refused() {
        let mut state = TurnState::new();
        assert!(state.begin(1, 5).is_err());
    }

    #[test]
    fn test_display_page_anticipates_target() {
        let mut state = TurnState::new();
        state.begin(3, 5).unwrap();
        assert_eq!(state.display_page(), 3);
        state.finish(true);
        assert_eq!(state.display_page(), 3);
    }

    #[test]
    fn test_external_drag_flip() {
        let mut state = TurnState::new();
        state.complete_external(4, 5);
        assert_eq!(state.current_page(), 4);
        assert_eq!(state.phase(), TurnPhase::Settling);
        state.settle();
        assert_eq!(state.phase(), TurnPhase::Idle);
    }

    #[test]
    fn test_settle_ignored_outside_settling() {
        let mut state = TurnState::new();
        state.settle();
        assert_eq!(state.phase(), TurnPhase::Idle);
        state.begin(2, 5).unwrap();
        state.settle();
        assert_eq!(state.phase(), TurnPhase::Turning);
    }
}
