//! Page-flip presentation: view math, turn lifecycle, spread zoom, input
//! routing, script loading, and the host-side engine that ties them to the
//! flip library.

pub mod engine;
pub mod keyboard;
pub mod loader;
pub mod spread;
pub mod turn;
pub mod zoom;

pub use engine::{FlipbookOptions, FlipbookState};
pub use spread::{View, ViewMode};
pub use turn::{TurnPhase, TurnState};
pub use zoom::{SpreadZoom, Transform, ZoomChange, ZoomPhase};
