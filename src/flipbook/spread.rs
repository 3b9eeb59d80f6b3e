//! View pairing and centering math.
//!
//! Pages are 1-based. In double view the book opens with page 1 alone on
//! the right (cover position), then spreads (2,3), (4,5) and so on; a book
//! with an even page count ends with its last page alone on the left. A
//! blank slot is represented as page 0. Lone pages are shifted half a page
//! width toward the gutter so they appear centered in the stage.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Single,
    Double,
}

/// One visible view: a single centered page, or a left/right spread where
/// 0 marks a blank slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Single(u32),
    Spread { left: u32, right: u32 },
}

impl View {
    pub fn contains(&self, page: u32) -> bool {
        match self {
            View::Single(p) => *p == page,
            View::Spread { left, right } => *left == page || *right == page,
        }
    }

    /// The page navigation lands on when this view is shown.
    pub fn landing_page(&self) -> u32 {
        match self {
            View::Single(p) => *p,
            View::Spread { left: 0, right } => *right,
            View::Spread { left, .. } => *left,
        }
    }

    /// Visible page numbers, blanks included, left to right.
    pub fn slots(&self) -> Vec<u32> {
        match self {
            View::Single(p) => vec![*p],
            View::Spread { left, right } => vec![*left, *right],
        }
    }
}

/// Which side of the spread a page sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSlot {
    Single,
    Left,
    Right,
}

pub fn page_slot(page: u32, mode: ViewMode) -> PageSlot {
    match mode {
        ViewMode::Single => PageSlot::Single,
        ViewMode::Double => {
            if page % 2 == 1 {
                PageSlot::Right
            } else {
                PageSlot::Left
            }
        }
    }
}

pub fn clamp_page(page: u32, page_count: u32) -> u32 {
    page.clamp(1, page_count.max(1))
}

pub fn view_index(page: u32, mode: ViewMode) -> u32 {
    match mode {
        ViewMode::Single => page.saturating_sub(1),
        ViewMode::Double => page / 2,
    }
}

pub fn view_count(page_count: u32, mode: ViewMode) -> u32 {
    match mode {
        ViewMode::Single => page_count.max(1),
        ViewMode::Double => page_count / 2 + 1,
    }
}

pub fn view_at(index: u32, page_count: u32, mode: ViewMode) -> View {
    let count = page_count.max(1);
    match mode {
        ViewMode::Single => View::Single((index + 1).min(count)),
        ViewMode::Double => {
            if index == 0 {
                return View::Spread { left: 0, right: 1 };
            }
            let left = (index * 2).min(count);
            let right = if left + 1 <= count { left + 1 } else { 0 };
            View::Spread { left, right }
        }
    }
}

pub fn view_for_page(page: u32, page_count: u32, mode: ViewMode) -> View {
    view_at(view_index(clamp_page(page, page_count), mode), page_count, mode)
}

/// Horizontal shift that centers a lone page in a double-view stage:
/// -W/2 for a page alone on the right, +W/2 for a page alone on the left,
/// zero for full spreads and single view.
pub fn centering_offset(view: &View, page_width: f64) -> f64 {
    match view {
        View::Single(_) => 0.0,
        View::Spread { left: 0, .. } => -page_width / 2.0,
        View::Spread { right: 0, .. } => page_width / 2.0,
        View::Spread { .. } => 0.0,
    }
}

/// Landing page of the next view, None at the end of the book.
pub fn next_page(current: u32, page_count: u32, mode: ViewMode) -> Option<u32> {
    let index = view_index(clamp_page(current, page_count), mode);
    if index + 1 >= view_count(page_count, mode) {
        None
    } else {
        Some(view_at(index + 1, page_count, mode).landing_page())
    }
}

/// Landing page of the previous view, None at the front of the book.
pub fn prev_page(current: u32, page_count: u32, mode: ViewMode) -> Option<u32> {
    let index = view_index(clamp_page(current, page_count), mode);
    if index == 0 {
        None
    } else {
        Some(view_at(index - 1, page_count, mode).landing_page())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_view_pairing_five_pages() {
        assert_eq!(
            view_for_page(1, 5, ViewMode::Double),
            View::Spread { left: 0, right: 1 }
        );
        assert_eq!(
            view_for_page(2, 5, ViewMode::Double),
            View::Spread { left: 2, right: 3 }
        );
        assert_eq!(
            view_for_page(3, 5, ViewMode::Double),
            View::Spread { left: 2, right: 3 }
        );
        assert_eq!(
            view_for_page(5, 5, ViewMode::Double),
            View::Spread { left: 4, right: 5 }
        );
    }

    #[test]
    fn test_even_count_ends_with_lone_left_page() {
        assert_eq!(
            view_for_page(4, 4, ViewMode::Double),
            View::Spread { left: 4, right: 0 }
        );
    }

    #[test]
    fn test_view_counts() {
        assert_eq!(view_count(1, ViewMode::Double), 1);
        assert_eq!(view_count(2, ViewMode::Double), 2);
        assert_eq!(view_count(4, ViewMode::Double), 3);
        assert_eq!(view_count(5, ViewMode::Double), 3);
        assert_eq!(view_count(5, ViewMode::Single), 5);
    }

    #[test]
    fn test_centering_offsets() {
        let width = 595.0;
        // Page 1 alone on the right shifts left by half a page.
        let first = view_for_page(1, 5, ViewMode::Double);
        assert_eq!(centering_offset(&first, width), -width / 2.0);
        // Full spread sits centered already.
        let full = view_for_page(4, 5, ViewMode::Double);
        assert_eq!(centering_offset(&full, width), 0.0);
        // Trailing lone page on the left shifts right by half a page.
        let last = view_for_page(4, 4, ViewMode::Double);
        assert_eq!(centering_offset(&last, width), width / 2.0);
        // Single view never shifts.
        let single = view_for_page(3, 5, ViewMode::Single);
        assert_eq!(centering_offset(&single, width), 0.0);
    }

    #[test]
    fn test_view_contains_its_page() {
        for count in 1..=8u32 {
            for page in 1..=count {
                for mode in [ViewMode::Single, ViewMode::Double] {
                    let view = view_for_page(page, count, mode);
                    assert!(view.contains(page), "page {} count {} {:?}", page, count, mode);
                }
            }
        }
    }

    #[test]
    fn test_navigation_stops_at_ends() {
        assert_eq!(next_page(1, 5, ViewMode::Double), Some(2));
        assert_eq!(next_page(3, 5, ViewMode::Double), Some(4));
        assert_eq!(next_page(5, 5, ViewMode::Double), None);
        assert_eq!(prev_page(1, 5, ViewMode::Double), None);
        assert_eq!(prev_page(4, 5, ViewMode::Double), Some(2));
        assert_eq!(next_page(4, 4, ViewMode::Single), None);
        assert_eq!(prev_page(4, 4, ViewMode::Single), Some(3));
    }

    #[test]
    fn test_page_slots() {
        assert_eq!(page_slot(1, ViewMode::Double), PageSlot::Right);
        assert_eq!(page_slot(2, ViewMode::Double), PageSlot::Left);
        assert_eq!(page_slot(5, ViewMode::Double), PageSlot::Right);
        assert_eq!(page_slot(3, ViewMode::Single), PageSlot::Single);
    }
}
