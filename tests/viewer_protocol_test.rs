// The published side of a page: stored html wrapped into a viewer frame,
// and interaction attributes surviving the trip so the frame runtime can
// turn them into wire messages for the host.

use flipbook_editor_wasm::models::{InteractionKind, InteractionSpec, TriggerKind};
use flipbook_editor_wasm::models::page::PageStore;
use flipbook_editor_wasm::protocol::inject::{
    viewer_frame_srcdoc, DEFAULT_TOOLTIP_BACKGROUND, PAGE_HEIGHT, PAGE_WIDTH,
};
use flipbook_editor_wasm::protocol::message::{FrameMessage, PopupData};

const MODULE_URL: &str = "/pkg/flipbook_editor_wasm.js";

#[test]
fn test_authored_page_survives_wrapping_for_the_viewer() {
    // A page as the canvas serializer would have stored it after an editing
    // session: interaction attributes configured, editing attributes that an
    // old document might still carry.
    let stored = concat!(
        "<!DOCTYPE html><html><head><title>p</title></head><body>",
        "<p contenteditable=\"true\" data-editable=\"true\" ",
        "data-interaction=\"popup\" data-interaction-trigger=\"click\" ",
        "data-interaction-content=\"Did you know?\" data-popup-font=\"Georgia\">",
        "Fun fact</p>",
        "</body></html>"
    );

    let srcdoc = viewer_frame_srcdoc(stored, 2, MODULE_URL).unwrap();

    // Interaction attributes drive the viewer runtime and must survive.
    assert!(srcdoc.contains("data-interaction=\"popup\""));
    assert!(srcdoc.contains("data-interaction-content=\"Did you know?\""));
    assert!(srcdoc.contains("data-popup-font=\"Georgia\""));

    // Editing attributes never reach a reader.
    assert!(!srcdoc.contains("contenteditable"));
    assert!(!srcdoc.contains("data-editable"));

    // The frame boots this module with its own 1-based page number, and the
    // injection lands inside the existing document rather than around it.
    assert!(srcdoc.contains(MODULE_URL));
    assert!(srcdoc.contains("installViewerRuntime(2)"));
    assert_eq!(srcdoc.matches("<!DOCTYPE").count(), 1);
    assert_eq!(srcdoc.matches("</html>").count(), 1);
}

#[test]
fn test_each_frame_boots_with_its_own_page_number() {
    let mut store = PageStore::new("<html><body><p>one</p></body></html>");
    store.add_page("<html><body><p>two</p></body></html>");
    store.add_page("");

    // The engine snapshots the store and wraps each page for its frame.
    let snapshot = store.snapshot_html();
    for (index, html) in snapshot.iter().enumerate() {
        let number = index as u32 + 1;
        let srcdoc = viewer_frame_srcdoc(html, number, MODULE_URL).unwrap();
        assert!(
            srcdoc.contains(&format!("installViewerRuntime({})", number)),
            "frame {} boots with the wrong page number",
            number
        );
        // Every frame renders at the fixed page size, blank pages included.
        assert!(srcdoc.contains(&format!("{}px", PAGE_WIDTH)));
        assert!(srcdoc.contains(&format!("{}px", PAGE_HEIGHT)));
        assert!(srcdoc.contains(DEFAULT_TOOLTIP_BACKGROUND));
    }
}

#[test]
fn test_interaction_attributes_reach_the_popup_payload() {
    // The frame runtime reads the element's attribute family back into a
    // spec, then posts the popup payload the host overlay renders from.
    let attrs = [
        ("data-interaction", "popup"),
        ("data-interaction-trigger", "click"),
        ("data-interaction-content", "Did you know?"),
        ("data-popup-font", "Georgia"),
        ("data-popup-size", "18px"),
        ("data-popup-color", "#222222"),
    ];
    let spec = InteractionSpec::from_attributes(attrs.iter().copied());
    assert_eq!(spec.kind, InteractionKind::Popup);
    assert_eq!(spec.trigger, TriggerKind::Click);
    assert!(spec.validate().is_ok());

    let message = FrameMessage::Popup {
        data: PopupData {
            content: spec.content.clone().unwrap_or_default(),
            styles: Some(spec.popup_style.clone()),
            element_type: "text".to_string(),
            element_source: None,
        },
    };
    let wire = serde_json::to_string(&message).unwrap();
    assert!(wire.contains(r#""type":"flipbook-popup""#));
    assert!(wire.contains(r#""content":"Did you know?""#));
    assert!(wire.contains(r#""fontFamily":"Georgia""#));
    assert!(wire.contains(r#""fontSize":"18px""#));

    // The host decodes the same styles the panel wrote.
    let FrameMessage::Popup { data } = serde_json::from_str(&wire).unwrap() else {
        panic!("expected a popup message");
    };
    assert_eq!(data.styles, Some(spec.popup_style));
    assert_eq!(data.element_type, "text");
}
