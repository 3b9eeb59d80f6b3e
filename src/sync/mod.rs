//! Selected-element style state: color and gradient parsing, text stroke
//! strategies, the computed-style snapshot the panel renders from, and the
//! write-back bridge that keeps panel edits from echoing.

pub mod bridge;
pub mod color;
pub mod snapshot;
pub mod stroke;

pub use color::{Gradient, GradientStop, Rgba};
pub use snapshot::{read_snapshot, StyleSnapshot};
pub use stroke::{StrokePosition, TextStroke};
