//! Error types for editor and preview operations
//!
//! Defines the error hierarchy shared by the canvas editor, the flipbook
//! engine, and the JS-facing API layer. Retryable errors (script load,
//! missing container) are distinguished from refused operations so the host
//! can surface a retry affordance for the former and silently ignore the
//! latter.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Top-level error type for the flipbook editor module
#[derive(Debug, Clone, Error)]
pub enum EditorError {
    /// The page-flip rendering library (or its DOM dependency) failed to load.
    /// Retryable: the host re-invokes initialization.
    #[error("failed to load rendering library: {0}")]
    ScriptLoad(String),

    /// A host container element (book stage, editor frame) was not found in
    /// the document. Retryable, treated identically to a script-load failure.
    #[error("container '{0}' not found")]
    ContainerNotFound(String),

    /// A DOM handle was missing or a DOM write failed: no content document
    /// yet, detached element, blocked fetch. Callers treat this as a no-op
    /// condition, never a crash.
    #[error("dom unavailable: {0}")]
    FrameUnavailable(String),

    /// A business-rule guard refused the operation (deleting the last page,
    /// turning while a turn is in flight, hover trigger on a link).
    #[error("operation refused: {0}")]
    Refused(String),

    /// An index was outside the page list or view bounds.
    #[error("{context} index {index} out of bounds (len: {len})")]
    OutOfBounds {
        context: &'static str,
        index: usize,
        len: usize,
    },

    /// Payload (de)serialization across the JS boundary failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Template rendering for injected markup failed.
    #[error("template error: {0}")]
    Template(String),
}

impl EditorError {
    /// True when the host should offer a retry action instead of degrading.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EditorError::ScriptLoad(_) | EditorError::ContainerNotFound(_)
        )
    }

    pub fn refused(msg: impl Into<String>) -> Self {
        EditorError::Refused(msg.into())
    }
}

impl From<EditorError> for JsValue {
    fn from(err: EditorError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

impl From<mustache::Error> for EditorError {
    fn from(err: mustache::Error) -> Self {
        EditorError::Template(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(EditorError::ScriptLoad("timeout".into()).is_retryable());
        assert!(EditorError::ContainerNotFound("book".into()).is_retryable());
        assert!(!EditorError::refused("last page").is_retryable());
        assert!(!EditorError::FrameUnavailable("page-3".into()).is_retryable());
    }

    #[test]
    fn test_out_of_bounds_message() {
        let err = EditorError::OutOfBounds {
            context: "page",
            index: 9,
            len: 4,
        };
        assert_eq!(err.to_string(), "page index 9 out of bounds (len: 4)");
    }
}
