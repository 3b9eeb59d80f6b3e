//! Export handoff.
//!
//! The host owns the rasterizer; this side validates the request against
//! the store and hands over print-ready page html at the fixed A4 pixel
//! size every page is authored against.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::api::helpers::{deserialize, serialize};
use crate::api::pages::with_store;
use crate::error::EditorError;
use crate::models::page::PageStore;
use crate::protocol::inject::{strip_editing_artifacts, PAGE_HEIGHT, PAGE_WIDTH};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Jpg,
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Jpg => "jpg",
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// Which pages, in which format. Empty `indices` means every page.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    #[serde(default)]
    pub indices: Vec<usize>,
    pub format: ExportFormat,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportPage {
    pub index: usize,
    pub name: String,
    pub html: String,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub format: &'static str,
    pub width: u32,
    pub height: u32,
    pub pages: Vec<ExportPage>,
}

/// Resolve a request against the store. Any out-of-range index fails the
/// whole request; a partial export would be worse than none.
fn collect_pages(store: &PageStore, indices: &[usize]) -> Result<Vec<ExportPage>, EditorError> {
    let selected: Vec<usize> = if indices.is_empty() {
        (0..store.len()).collect()
    } else {
        indices.to_vec()
    };
    selected
        .iter()
        .map(|&index| {
            let page = store.get(index).ok_or(EditorError::OutOfBounds {
                context: "export",
                index,
                len: store.len(),
            })?;
            Ok(ExportPage {
                index,
                name: page.name.clone(),
                html: strip_editing_artifacts(&page.html),
            })
        })
        .collect()
}

/// Validate an export request and hand the cleaned page html to the host's
/// rasterizer callback.
#[wasm_bindgen(js_name = exportPages)]
pub fn export_pages(request: JsValue, rasterize: js_sys::Function) -> Result<(), JsValue> {
    let request: ExportRequest = deserialize(request, "export request")?;
    let pages =
        with_store(|store| collect_pages(store, &request.indices))?.map_err(JsValue::from)?;
    log::info!("exporting {} page(s) as {}", pages.len(), request.format.as_str());
    let payload = ExportPayload {
        format: request.format.as_str(),
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        pages,
    };
    let js_payload = serialize(&payload, "export payload")?;
    rasterize.call1(&JsValue::NULL, &js_payload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_three_pages() -> PageStore {
        let mut store = PageStore::new("<html><body contenteditable=\"true\">one</body></html>");
        store.add_page("<html><body>two</body></html>");
        store.add_page("<html><body>three</body></html>");
        store
    }

    #[test]
    fn test_collect_all_pages_when_indices_empty() {
        let store = store_with_three_pages();
        let pages = collect_pages(&store, &[]).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].index, 0);
        assert_eq!(pages[2].index, 2);
    }

    #[test]
    fn test_collect_respects_requested_order() {
        let store = store_with_three_pages();
        let pages = collect_pages(&store, &[2, 0]).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].index, 2);
        assert_eq!(pages[1].index, 0);
    }

    #[test]
    fn test_collect_strips_editing_artifacts() {
        let store = store_with_three_pages();
        let pages = collect_pages(&store, &[0]).unwrap();
        assert!(!pages[0].html.contains("contenteditable"));
        assert!(pages[0].html.contains("one"));
    }

    #[test]
    fn test_out_of_range_index_fails_whole_request() {
        let store = store_with_three_pages();
        let err = collect_pages(&store, &[1, 7]).unwrap_err();
        assert!(matches!(
            err,
            EditorError::OutOfBounds { index: 7, len: 3, .. }
        ));
    }

    #[test]
    fn test_format_strings() {
        assert_eq!(ExportFormat::Jpg.as_str(), "jpg");
        assert_eq!(ExportFormat::Png.as_str(), "png");
        assert_eq!(ExportFormat::Pdf.as_str(), "pdf");
    }
}
