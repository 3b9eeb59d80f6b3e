// An authoring session against the page store: the interleaved adds, moves,
// deletes and late debounced write-backs a real editing host produces.

use flipbook_editor_wasm::models::page::{MutationOutcome, PageStore};
use flipbook_editor_wasm::protocol::inject::strip_editing_artifacts;

fn page_html(body: &str) -> String {
    format!("<html><head></head><body>{}</body></html>", body)
}

#[test]
fn test_authoring_session_keeps_cursor_and_identity() {
    let mut store = PageStore::new(page_html("cover"));

    // Build up a three-page draft; each add selects the new page.
    store.add_page(page_html("middle"));
    store.add_page(page_html("back"));
    assert_eq!(store.len(), 3);
    assert_eq!(store.current_index(), 2);

    // Duplicate the middle page; the copy lands right after it with a
    // disambiguated name and a fresh id.
    let copy = store.duplicate_page(1).unwrap();
    assert_eq!(copy, 2);
    assert_eq!(store.pages()[2].name, "Page 2 (copy)");
    assert_ne!(store.pages()[2].id, store.pages()[1].id);

    // Renaming the copy into a collision resolves it.
    let applied = store.rename_page(2, "Page 2").unwrap();
    assert_eq!(applied, "Page 2 (1)");

    // Drag the current page to the front; the cursor follows the page.
    store.set_current(2).unwrap();
    let followed = store.current_page().id.clone();
    store.move_page(2, 0).unwrap();
    assert_eq!(store.current_index(), 0);
    assert_eq!(store.current_page().id, followed);

    // Deleting ahead of the cursor shifts it left so it stays on its page.
    store.set_current(2).unwrap();
    let kept = store.current_page().id.clone();
    assert_eq!(store.delete_page(0).unwrap(), MutationOutcome::Applied);
    assert_eq!(store.current_index(), 1);
    assert_eq!(store.current_page().id, kept);

    // A document never drops below one page.
    while store.len() > 1 {
        assert_eq!(store.delete_page(0).unwrap(), MutationOutcome::Applied);
    }
    assert_eq!(store.delete_page(0).unwrap(), MutationOutcome::Refused);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_late_commits_target_pages_by_id_not_position() {
    let mut store = PageStore::new(page_html("one"));
    store.add_page(page_html("two"));
    store.add_page(page_html("three"));
    let second = store.pages()[1].id.clone();

    // The canvas debounces its write-back; by the time it fires the page
    // has been dragged to the end.
    store.move_page(1, 2).unwrap();
    assert!(store.commit_html(&second, page_html("two, edited")));
    assert_eq!(store.pages()[2].html, page_html("two, edited"));
    assert!(!store.pages()[1].html.contains("edited"));

    // And by the time the thumbnail worker finishes, the page is gone.
    store.delete_page(2).unwrap();
    assert!(!store.commit_html(&second, page_html("two, stale")));
    assert!(!store.set_thumbnail(&second, "data:image/jpeg;base64,AAAA".into()));
    assert_eq!(store.len(), 2);
    assert!(store.pages().iter().all(|p| !p.html.contains("stale")));
}

#[test]
fn test_preview_snapshot_is_reader_clean_and_detached() {
    let mut store = PageStore::new(
        "<html><body><p contenteditable=\"true\" data-editable=\"true\">draft</p></body></html>",
    );
    store.add_page(page_html("two"));

    let snapshot = store.snapshot_html();
    assert_eq!(snapshot.len(), 2);

    // Readers never see authoring attributes.
    let clean = strip_editing_artifacts(&snapshot[0]);
    assert!(!clean.contains("contenteditable"));
    assert!(!clean.contains("data-editable"));
    assert!(clean.contains("<p>draft</p>"));

    // Edits after the snapshot do not reach an already-open preview.
    let id = store.pages()[0].id.clone();
    store.commit_html(&id, page_html("rewritten"));
    assert!(!snapshot[0].contains("rewritten"));
}

#[test]
fn test_saved_document_round_trips_with_cursor() {
    let mut store = PageStore::new(page_html("one"));
    store.add_page(page_html("two"));
    store.set_current(0).unwrap();
    let id = store.pages()[0].id.clone();
    store.set_thumbnail(&id, "data:image/jpeg;base64,dGVzdA==".into());

    let json = serde_json::to_string(&store).unwrap();
    let restored: PageStore = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored.current_index(), 0);
    assert_eq!(restored.pages()[0].id, id);
    assert_eq!(
        restored.pages()[0].thumbnail.as_deref(),
        Some("data:image/jpeg;base64,dGVzdA==")
    );
}
