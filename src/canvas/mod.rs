//! The sandboxed editing surface: document loading, editable wiring,
//! selection tracking, and full-document serialization back to the host.

pub mod editable;
pub mod editor;
pub mod selection;
pub mod serializer;

pub use editor::CanvasCallbacks;
pub use selection::SelectedElement;
