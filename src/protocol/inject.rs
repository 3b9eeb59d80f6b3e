//! Page html -> viewer frame srcdoc.
//!
//! Each flipbook page renders inside its own sandboxed iframe. The stored
//! page html is a complete document; this module splices in the viewer
//! stylesheet and the bootstrap script that boots this same wasm module
//! inside the frame, so every frame runs its own runtime instance and the
//! host never reaches into frame DOM.

use serde::Serialize;

use crate::error::EditorError;

/// Fixed page raster size, A4 at 72dpi.
pub const PAGE_WIDTH: u32 = 595;
pub const PAGE_HEIGHT: u32 = 842;

pub const DEFAULT_TOOLTIP_BACKGROUND: &str = "#111827";
pub const DEFAULT_TOOLTIP_COLOR: &str = "#f9fafb";

#[derive(Serialize)]
struct InjectContext<'a> {
    page_width: u32,
    page_height: u32,
    page_number: u32,
    module_url: &'a str,
    tooltip_background: &'a str,
    tooltip_color: &'a str,
}

#[derive(Serialize)]
struct BlankContext {
    page_width: u32,
    page_height: u32,
}

#[derive(Serialize)]
struct PlaceholderContext<'a> {
    page_width: u32,
    page_height: u32,
    hint: &'a str,
}

fn render(template: &str, context: &impl Serialize) -> Result<String, EditorError> {
    let compiled = mustache::compile_str(template)?;
    Ok(compiled.render_to_string(context)?)
}

/// A complete empty page document at the fixed page size.
pub fn blank_page_document() -> Result<String, EditorError> {
    render(
        include_str!("templates/blank_page.html.mustache"),
        &BlankContext {
            page_width: PAGE_WIDTH,
            page_height: PAGE_HEIGHT,
        },
    )
}

/// The document the canvas editor shows for a page with no content yet.
pub fn placeholder_document(hint: &str) -> Result<String, EditorError> {
    render(
        include_str!("templates/editor_placeholder.html.mustache"),
        &PlaceholderContext {
            page_width: PAGE_WIDTH,
            page_height: PAGE_HEIGHT,
            hint,
        },
    )
}

/// Wrap stored page html into the srcdoc for one viewer frame. `page_number`
/// is 1-based and ends up in the frame's zoom messages.
pub fn viewer_frame_srcdoc(
    page_html: &str,
    page_number: u32,
    module_url: &str,
) -> Result<String, EditorError> {
    let base = if page_html.trim().is_empty() {
        blank_page_document()?
    } else {
        strip_editing_artifacts(page_html)
    };
    let injection = render(
        include_str!("templates/viewer_inject.html.mustache"),
        &InjectContext {
            page_width: PAGE_WIDTH,
            page_height: PAGE_HEIGHT,
            page_number,
            module_url,
            tooltip_background: DEFAULT_TOOLTIP_BACKGROUND,
            tooltip_color: DEFAULT_TOOLTIP_COLOR,
        },
    )?;
    Ok(inject_into_head(&base, &injection))
}

fn inject_into_head(document: &str, injection: &str) -> String {
    let split_at = document
        .find("</head>")
        .or_else(|| document.rfind("</body>"));
    match split_at {
        Some(idx) => {
            let mut out = String::with_capacity(document.len() + injection.len());
            out.push_str(&document[..idx]);
            out.push_str(injection);
            out.push_str(&document[idx..]);
            out
        }
        None => {
            let mut out = String::with_capacity(document.len() + injection.len());
            out.push_str(document);
            out.push_str(injection);
            out
        }
    }
}

/// Remove editing attributes from serialized html. The canvas serializer
/// already strips these; this catches html that was captured outside the
/// serializer (old documents, external imports). The tokens are only ever
/// machine-written, in exactly these forms.
pub fn strip_editing_artifacts(html: &str) -> String {
    html.replace(" contenteditable=\"true\"", "")
        .replace(" data-editable=\"true\"", "")
        .replace(" class=\"fb-selected\"", "")
        .replace(" fb-selected", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_page_has_fixed_size() {
        let doc = blank_page_document().unwrap();
        assert!(doc.contains("width: 595px"));
        assert!(doc.contains("height: 842px"));
        assert!(doc.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_placeholder_carries_hint() {
        let doc = placeholder_document("This page is empty").unwrap();
        assert!(doc.contains("This page is empty"));
        assert!(doc.contains("fb-placeholder"));
    }

    #[test]
    fn test_srcdoc_injects_into_head() {
        let html = "<!DOCTYPE html><html><head></head><body><p>Hi</p></body></html>";
        let out = viewer_frame_srcdoc(html, 3, "/pkg/flipbook_editor_wasm.js").unwrap();
        assert!(out.contains("installViewerRuntime(3)"));
        assert!(out.contains("/pkg/flipbook_editor_wasm.js"));
        let style_at = out.find("fb-viewer-style").unwrap();
        let head_close_at = out.find("</head>").unwrap();
        assert!(style_at < head_close_at);
        assert!(out.contains("<p>Hi</p>"));
    }

    #[test]
    fn test_empty_html_renders_blank_page() {
        let out = viewer_frame_srcdoc("   ", 1, "/pkg/mod.js").unwrap();
        assert!(out.contains("installViewerRuntime(1)"));
        assert!(out.contains("background: #ffffff"));
    }

    #[test]
    fn test_editing_artifacts_removed() {
        let html = "<html><body><p contenteditable=\"true\" data-editable=\"true\" class=\"fb-selected\">x</p></body></html>";
        let out = viewer_frame_srcdoc(html, 2, "/pkg/mod.js").unwrap();
        assert!(!out.contains("contenteditable"));
        assert!(!out.contains("data-editable"));
        assert!(!out.contains("fb-selected\">x"));
    }
}
