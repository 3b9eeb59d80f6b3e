//! Models module for the Flipbook Document Editor
//!
//! This module contains the data models shared across the editor:
//! the page store, element classification, and the interaction
//! attribute schema.

pub mod element;
pub mod interaction;
pub mod page;

// Re-export commonly used types
pub use element::{classify_tag, ElementKind, TEXT_TAGS};
pub use interaction::{
    is_interaction_attribute, InteractionKind, InteractionSpec, PopupStyle, TooltipStyle,
    TriggerKind,
};
pub use page::{MutationOutcome, Page, PageStore};
