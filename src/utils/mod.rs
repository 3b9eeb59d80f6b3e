//! Utility modules for the Flipbook Document Editor
//!
//! This module contains utility functions and helpers for
//! various aspects of the editor.

pub mod debounce;
pub mod dom;
pub mod ids;
pub mod names;

// Re-export commonly used types
pub use debounce::Debouncer;
pub use ids::generate_page_id;
pub use names::{copy_name, next_page_name, unique_name};
