//! Cross-frame interaction protocol
//!
//! The host document and the sandboxed page frames never touch each other's
//! DOM. This module is everything that crosses the boundary: the tagged
//! message types, the srcdoc wrapper that boots a runtime into each frame,
//! the runtime itself, and the tooltip placement math it uses.

pub mod inject;
pub mod message;
pub mod runtime;
pub mod tooltip;

// Re-export commonly used types
pub use inject::{viewer_frame_srcdoc, PAGE_HEIGHT, PAGE_WIDTH};
pub use message::{post_to_frame, post_to_parent, ElementRect, FrameMessage};
