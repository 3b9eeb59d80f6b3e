//! Flipbook Editor WASM Module
//!
//! Browser-side core of the flipbook document editor: the page store, the
//! iframe canvas editor, the style/interaction panels, the page-turn
//! preview engine, and the viewer runtime injected into published frames.
//! The same module loads in the host shell and inside every viewer frame.

pub mod api;
pub mod canvas;
pub mod error;
pub mod flipbook;
pub mod interactions;
pub mod models;
pub mod protocol;
pub mod sync;
pub mod utils;

pub use error::EditorError;
pub use models::page::{Page, PageStore};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).expect("failed to initialize logger");

    log::info!("Flipbook Editor WASM module initialized");
}
