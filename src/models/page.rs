//! Page records and the WASM-owned page store
//!
//! This module is the source of truth for the document's pages. The canvas
//! editor is the only writer of page html during authoring, and all of its
//! debounced writes funnel through [`PageStore::commit_html`], which is keyed
//! by page id rather than index so a commit that fires after its page was
//! deleted or moved is dropped instead of landing on the wrong page.

use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::utils::ids::generate_page_id;
use crate::utils::names::{copy_name, next_page_name, unique_name};

/// One editable page surface.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Page {
    /// Stable unique identifier, never reused
    pub id: String,

    /// Human label; collisions are resolved on rename/duplicate
    pub name: String,

    /// Complete serialized document markup at last sync
    pub html: String,

    /// Derived raster preview (data URL), regenerated after edits settle
    pub thumbnail: Option<String>,
}

impl Page {
    pub fn new(name: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            id: generate_page_id(),
            name: name.into(),
            html: html.into(),
            thumbnail: None,
        }
    }
}

/// Outcome of a guarded mutation, so the host can distinguish "applied"
/// from "refused by a business rule" without treating the latter as an error.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MutationOutcome {
    Applied,
    Refused,
}

/// Ordered page collection plus the current-page cursor.
///
/// Invariants: at least one page always exists, and `current` always points
/// at a valid page.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PageStore {
    pages: Vec<Page>,
    current: usize,
}

impl PageStore {
    /// Create a store holding one initial page.
    pub fn new(initial_html: impl Into<String>) -> Self {
        Self {
            pages: vec![Page::new("Page 1", initial_html)],
            current: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        false // the store never drops below one page
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_page(&self) -> &Page {
        &self.pages[self.current]
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    fn names(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.name.as_str()).collect()
    }

    /// Select a page as current.
    pub fn set_current(&mut self, index: usize) -> Result<(), EditorError> {
        if index >= self.pages.len() {
            return Err(EditorError::OutOfBounds {
                context: "page",
                index,
                len: self.pages.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// Append a new page and make it current. Returns its index.
    pub fn add_page(&mut self, html: impl Into<String>) -> usize {
        let name = next_page_name(&self.names(), self.pages.len());
        self.pages.push(Page::new(name, html));
        self.current = self.pages.len() - 1;
        self.current
    }

    /// Insert a copy of `index` directly after it (fresh id, `(copy)` name)
    /// and make the copy current. Returns the copy's index.
    pub fn duplicate_page(&mut self, index: usize) -> Result<usize, EditorError> {
        let source = self.pages.get(index).ok_or(EditorError::OutOfBounds {
            context: "page",
            index,
            len: self.pages.len(),
        })?;
        let name = copy_name(&source.name, &self.names());
        let mut copy = Page::new(name, source.html.clone());
        copy.thumbnail = source.thumbnail.clone();
        self.pages.insert(index + 1, copy);
        self.current = index + 1;
        Ok(self.current)
    }

    /// Delete a page. Refused (not an error) when it is the last one.
    pub fn delete_page(&mut self, index: usize) -> Result<MutationOutcome, EditorError> {
        if index >= self.pages.len() {
            return Err(EditorError::OutOfBounds {
                context: "page",
                index,
                len: self.pages.len(),
            });
        }
        if self.pages.len() == 1 {
            log::warn!("delete refused: document must keep at least one page");
            return Ok(MutationOutcome::Refused);
        }
        self.pages.remove(index);
        if self.current >= self.pages.len() {
            self.current = self.pages.len() - 1;
        } else if index < self.current {
            self.current -= 1;
        }
        Ok(MutationOutcome::Applied)
    }

    /// Reset a page's content to empty markup (the canvas renders its
    /// placeholder for empty html). The id and name survive.
    pub fn clear_page(&mut self, index: usize) -> Result<(), EditorError> {
        let len = self.pages.len();
        let page = self.pages.get_mut(index).ok_or(EditorError::OutOfBounds {
            context: "page",
            index,
            len,
        })?;
        page.html = String::new();
        page.thumbnail = None;
        Ok(())
    }

    /// Rename a page, resolving collisions with other pages' names.
    /// Returns the name actually applied.
    pub fn rename_page(&mut self, index: usize, name: &str) -> Result<String, EditorError> {
        if index >= self.pages.len() {
            return Err(EditorError::OutOfBounds {
                context: "page",
                index,
                len: self.pages.len(),
            });
        }
        let others: Vec<&str> = self
            .pages
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, p)| p.name.as_str())
            .collect();
        let resolved = unique_name(name.trim(), &others);
        self.pages[index].name = resolved.clone();
        Ok(resolved)
    }

    /// Move a page from one position to another; the current-page cursor
    /// keeps following the same page.
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), EditorError> {
        let len = self.pages.len();
        if from >= len {
            return Err(EditorError::OutOfBounds {
                context: "page",
                index: from,
                len,
            });
        }
        if to >= len {
            return Err(EditorError::OutOfBounds {
                context: "page",
                index: to,
                len,
            });
        }
        if from == to {
            return Ok(());
        }
        let current_id = self.pages[self.current].id.clone();
        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        if let Some(idx) = self.pages.iter().position(|p| p.id == current_id) {
            self.current = idx;
        }
        Ok(())
    }

    /// Commit serialized html for a page, addressed by id.
    ///
    /// Returns `false` when the page no longer exists; the stale commit is
    /// dropped rather than misapplied.
    pub fn commit_html(&mut self, page_id: &str, html: String) -> bool {
        match self.pages.iter_mut().find(|p| p.id == page_id) {
            Some(page) => {
                page.html = html;
                true
            }
            None => {
                log::debug!("dropping stale html commit for removed page {}", page_id);
                false
            }
        }
    }

    /// Store a regenerated thumbnail, addressed by id like html commits.
    pub fn set_thumbnail(&mut self, page_id: &str, data_url: String) -> bool {
        match self.pages.iter_mut().find(|p| p.id == page_id) {
            Some(page) => {
                page.thumbnail = Some(data_url);
                true
            }
            None => false,
        }
    }

    /// Snapshot of all page html, taken at preview-open time. Later edits
    /// are invisible to an already-open preview.
    pub fn snapshot_html(&self) -> Vec<String> {
        self.pages.iter().map(|p| p.html.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(n: usize) -> PageStore {
        let mut store = PageStore::new("<html><body>1</body></html>");
        for i in 1..n {
            store.add_page(format!("<html><body>{}</body></html>", i + 1));
        }
        store
    }

    #[test]
    fn test_new_store_has_one_current_page() {
        let store = PageStore::new("<html></html>");
        assert_eq!(store.len(), 1);
        assert_eq!(store.current_index(), 0);
        assert_eq!(store.current_page().name, "Page 1");
    }

    #[test]
    fn test_add_page_selects_it() {
        let mut store = store_with(1);
        let idx = store.add_page("");
        assert_eq!(idx, 1);
        assert_eq!(store.current_index(), 1);
        assert_eq!(store.current_page().name, "Page 2");
    }

    #[test]
    fn test_delete_last_page_refused() {
        let mut store = store_with(1);
        let before = store.pages()[0].clone();
        assert_eq!(store.delete_page(0).unwrap(), MutationOutcome::Refused);
        assert_eq!(store.len(), 1);
        assert_eq!(store.pages()[0], before);
    }

    #[test]
    fn test_delete_adjusts_current() {
        let mut store = store_with(3);
        store.set_current(2).unwrap();
        assert_eq!(store.delete_page(2).unwrap(), MutationOutcome::Applied);
        assert_eq!(store.current_index(), 1);

        let mut store = store_with(3);
        store.set_current(2).unwrap();
        // Deleting before the current page shifts the cursor left
        store.delete_page(0).unwrap();
        assert_eq!(store.current_index(), 1);
        assert_eq!(store.current_page().name, "Page 3");
    }

    #[test]
    fn test_duplicate_inserts_after_with_copy_name() {
        let mut store = store_with(2);
        let idx = store.duplicate_page(0).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(store.len(), 3);
        assert_eq!(store.pages()[1].name, "Page 1 (copy)");
        assert_eq!(store.pages()[1].html, store.pages()[0].html);
        assert_ne!(store.pages()[1].id, store.pages()[0].id);

        let idx = store.duplicate_page(0).unwrap();
        assert_eq!(store.pages()[idx].name, "Page 1 (copy 2)");
    }

    #[test]
    fn test_move_page_keeps_current_id() {
        let mut store = store_with(3);
        store.set_current(0).unwrap();
        let current_id = store.current_page().id.clone();
        store.move_page(0, 2).unwrap();
        assert_eq!(store.current_index(), 2);
        assert_eq!(store.current_page().id, current_id);
    }

    #[test]
    fn test_commit_by_id_drops_stale() {
        let mut store = store_with(2);
        let id = store.pages()[1].id.clone();
        assert!(store.commit_html(&id, "<html><body>edited</body></html>".into()));
        assert_eq!(store.pages()[1].html, "<html><body>edited</body></html>");

        store.delete_page(1).unwrap();
        // The debounced commit for the deleted page fires late: dropped.
        assert!(!store.commit_html(&id, "<html><body>stale</body></html>".into()));
        assert_eq!(store.len(), 1);
        assert!(!store.pages()[0].html.contains("stale"));
    }

    #[test]
    fn test_rename_resolves_collision() {
        let mut store = store_with(2);
        let applied = store.rename_page(1, "Page 1").unwrap();
        assert_eq!(applied, "Page 1 (1)");
        // Renaming a page to its own name is not a collision
        let applied = store.rename_page(0, "Page 1").unwrap();
        assert_eq!(applied, "Page 1");
    }

    #[test]
    fn test_clear_page_keeps_identity() {
        let mut store = store_with(1);
        let id = store.pages()[0].id.clone();
        store.clear_page(0).unwrap();
        assert_eq!(store.pages()[0].html, "");
        assert_eq!(store.pages()[0].id, id);
        assert_eq!(store.pages()[0].thumbnail, None);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut store = store_with(2);
        let snapshot = store.snapshot_html();
        let id = store.pages()[0].id.clone();
        store.commit_html(&id, "<html><body>after</body></html>".into());
        assert!(!snapshot[0].contains("after"));
    }
}
