//! Document and page-model exports.
//!
//! The store lives in wasm; the host sees indices, ids, and outcome values.
//! Destructive operations (`deletePage`, `clearPage`) are expected to sit
//! behind the host's confirmation modal, and `deletePage` still reports
//! `refused` for the last page no matter what the host asked.

use std::cell::RefCell;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::api::helpers::{deserialize, serialize};
use crate::models::page::{MutationOutcome, PageStore};
use crate::protocol::inject::blank_page_document;

thread_local! {
    static STORE: RefCell<Option<PageStore>> = RefCell::new(None);
}

/// Run a closure against the store, or throw when no document is open.
pub(crate) fn with_store<R>(f: impl FnOnce(&mut PageStore) -> R) -> Result<R, JsValue> {
    STORE.with(|slot| {
        let mut guard = slot.borrow_mut();
        let store = guard
            .as_mut()
            .ok_or_else(|| JsValue::from_str("document not initialized"))?;
        Ok(f(store))
    })
}

/// Id-keyed html commit used by the canvas write-back. Returns false when
/// the page is gone and the commit was dropped.
pub(crate) fn commit_html_internal(page_id: &str, html: &str) -> bool {
    with_store(|store| store.commit_html(page_id, html.to_string())).unwrap_or(false)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageListing {
    id: String,
    name: String,
    thumbnail: Option<String>,
}

/// Open a fresh document with one page. `initial_html` empty or absent
/// starts from the blank page document.
#[wasm_bindgen(js_name = initDocument)]
pub fn init_document(initial_html: Option<String>) -> Result<(), JsValue> {
    let html = match initial_html.filter(|h| !h.trim().is_empty()) {
        Some(html) => html,
        None => blank_page_document().map_err(JsValue::from)?,
    };
    STORE.with(|slot| {
        *slot.borrow_mut() = Some(PageStore::new(html));
    });
    log::info!("document initialized");
    Ok(())
}

/// Restore a previously saved document.
#[wasm_bindgen(js_name = loadDocument)]
pub fn load_document(document: JsValue) -> Result<(), JsValue> {
    let store: PageStore = deserialize(document, "saved document")?;
    STORE.with(|slot| {
        *slot.borrow_mut() = Some(store);
    });
    Ok(())
}

/// The full document state for persistence.
#[wasm_bindgen(js_name = saveDocument)]
pub fn save_document() -> Result<JsValue, JsValue> {
    let store = with_store(|store| store.clone())?;
    serialize(&store, "document snapshot")
}

/// Append a blank page (or `html` when given) and make it current.
#[wasm_bindgen(js_name = addPage)]
pub fn add_page(html: Option<String>) -> Result<usize, JsValue> {
    let html = match html {
        Some(html) => html,
        None => blank_page_document().map_err(JsValue::from)?,
    };
    with_store(|store| store.add_page(html))
}

#[wasm_bindgen(js_name = duplicatePage)]
pub fn duplicate_page(index: usize) -> Result<usize, JsValue> {
    with_store(|store| store.duplicate_page(index))?.map_err(JsValue::from)
}

/// Delete a page. Resolves to "applied" or "refused" (last page).
#[wasm_bindgen(js_name = deletePage)]
pub fn delete_page(index: usize) -> Result<JsValue, JsValue> {
    let outcome: MutationOutcome =
        with_store(|store| store.delete_page(index))?.map_err(JsValue::from)?;
    serialize(&outcome, "delete outcome")
}

#[wasm_bindgen(js_name = clearPage)]
pub fn clear_page(index: usize) -> Result<(), JsValue> {
    with_store(|store| store.clear_page(index))?.map_err(JsValue::from)
}

/// Rename a page; resolves to the name actually applied after collision
/// handling.
#[wasm_bindgen(js_name = renamePage)]
pub fn rename_page(index: usize, name: &str) -> Result<String, JsValue> {
    with_store(|store| store.rename_page(index, name))?.map_err(JsValue::from)
}

#[wasm_bindgen(js_name = movePage)]
pub fn move_page(from: usize, to: usize) -> Result<(), JsValue> {
    with_store(|store| store.move_page(from, to))?.map_err(JsValue::from)
}

#[wasm_bindgen(js_name = setCurrentPage)]
pub fn set_current_page(index: usize) -> Result<(), JsValue> {
    with_store(|store| store.set_current(index))?.map_err(JsValue::from)
}

#[wasm_bindgen(js_name = currentPageIndex)]
pub fn current_page_index() -> Result<usize, JsValue> {
    with_store(|store| store.current_index())
}

#[wasm_bindgen(js_name = pageCount)]
pub fn page_count() -> Result<usize, JsValue> {
    with_store(|store| store.len())
}

/// Id, name and thumbnail for every page, for the host's page strip.
#[wasm_bindgen(js_name = listPages)]
pub fn list_pages() -> Result<JsValue, JsValue> {
    let listings = with_store(|store| {
        store
            .pages()
            .iter()
            .map(|page| PageListing {
                id: page.id.clone(),
                name: page.name.clone(),
                thumbnail: page.thumbnail.clone(),
            })
            .collect::<Vec<_>>()
    })?;
    serialize(&listings, "page listings")
}

/// Store a regenerated thumbnail, keyed by page id so late completions for
/// a deleted page are dropped.
#[wasm_bindgen(js_name = setPageThumbnail)]
pub fn set_page_thumbnail(page_id: &str, data_url: &str) -> Result<bool, JsValue> {
    with_store(|store| store.set_thumbnail(page_id, data_url.to_string()))
}
