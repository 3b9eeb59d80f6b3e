//! JavaScript-facing API.
//!
//! Everything the host shell calls lives here, split by surface:
//!
//! - `pages`: document lifecycle and the page store
//! - `editor`: canvas frame wiring, selection, serialization
//! - `panel`: style and interaction panel operations on the selection
//! - `book`: flipbook preview and the frame viewer runtime entry point
//! - `export`: rasterizer handoff
//! - `prefs`: localStorage-backed host preferences
//! - `helpers`: shared serialization and callback plumbing
//!
//! Exports use camelCase `js_name`s; errors cross the boundary as thrown
//! `JsValue`s built from [`crate::error::EditorError`].

pub mod book;
pub mod editor;
pub mod export;
pub mod helpers;
pub mod pages;
pub mod panel;
pub mod prefs;
