//! Memoized loader for the page-flip rendering library.
//!
//! The flip library is a jQuery plugin, so two scripts load in order:
//! jQuery itself, then the plugin. Both are checked against their globals
//! before fetching (the host page may already ship them), concurrent
//! callers share one in-flight promise, and a failure leaves the loader
//! retryable rather than poisoned.

use std::cell::RefCell;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::HtmlScriptElement;

use crate::error::EditorError;
use crate::utils::dom;

pub const DEFAULT_DEPENDENCY_URL: &str = "https://code.jquery.com/jquery-3.7.1.min.js";
pub const DEFAULT_LIBRARY_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/turn.js/3/turn.min.js";

const DEPENDENCY_GLOBAL: &str = "jQuery";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Loading,
    Ready,
    Failed,
}

impl LoaderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoaderState::Idle => "idle",
            LoaderState::Loading => "loading",
            LoaderState::Ready => "ready",
            LoaderState::Failed => "failed",
        }
    }
}

enum LoaderPhase {
    Idle,
    Loading(js_sys::Promise),
    Ready,
    Failed(String),
}

thread_local! {
    static LOADER: RefCell<LoaderPhase> = RefCell::new(LoaderPhase::Idle);
}

pub fn state() -> LoaderState {
    LOADER.with(|slot| match &*slot.borrow() {
        LoaderPhase::Idle => LoaderState::Idle,
        LoaderPhase::Loading(_) => LoaderState::Loading,
        LoaderPhase::Ready => LoaderState::Ready,
        LoaderPhase::Failed(_) => LoaderState::Failed,
    })
}

/// Make sure the flip library is usable. Safe to call from any number of
/// concurrent initializations; a failed earlier attempt is retried.
pub async fn ensure_flip_runtime(
    dependency_url: &str,
    library_url: &str,
) -> Result<(), EditorError> {
    let in_flight = LOADER.with(|slot| {
        let mut phase = slot.borrow_mut();
        match &*phase {
            LoaderPhase::Ready => return InFlight::Done,
            LoaderPhase::Loading(promise) => return InFlight::Join(promise.clone()),
            LoaderPhase::Idle | LoaderPhase::Failed(_) => {}
        }
        let dependency = dependency_url.to_string();
        let library = library_url.to_string();
        let promise = future_to_promise(async move {
            match load_flip_scripts(&dependency, &library).await {
                Ok(()) => {
                    LOADER.with(|slot| *slot.borrow_mut() = LoaderPhase::Ready);
                    Ok(JsValue::UNDEFINED)
                }
                Err(err) => {
                    let message = err.to_string();
                    LOADER.with(|slot| {
                        *slot.borrow_mut() = LoaderPhase::Failed(message.clone())
                    });
                    Err(JsValue::from_str(&message))
                }
            }
        });
        *phase = LoaderPhase::Loading(promise.clone());
        InFlight::Join(promise)
    });

    match in_flight {
        InFlight::Done => Ok(()),
        InFlight::Join(promise) => JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|err| {
                EditorError::ScriptLoad(
                    err.as_string().unwrap_or_else(|| "script load failed".to_string()),
                )
            }),
    }
}

enum InFlight {
    Done,
    Join(js_sys::Promise),
}

async fn load_flip_scripts(dependency_url: &str, library_url: &str) -> Result<(), EditorError> {
    if !has_dependency() {
        load_script(dependency_url).await?;
    }
    if !has_flip_plugin() {
        load_script(library_url).await?;
    }
    if !has_flip_plugin() {
        return Err(EditorError::ScriptLoad(format!(
            "{} loaded but the flip plugin is missing",
            library_url
        )));
    }
    Ok(())
}

fn has_dependency() -> bool {
    js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str(DEPENDENCY_GLOBAL))
        .unwrap_or(false)
}

/// jQuery.fn.turn exists once the plugin script has executed.
fn has_flip_plugin() -> bool {
    let global = js_sys::global();
    let jquery = match js_sys::Reflect::get(&global, &JsValue::from_str(DEPENDENCY_GLOBAL)) {
        Ok(v) if !v.is_undefined() => v,
        _ => return false,
    };
    let prototype = match js_sys::Reflect::get(&jquery, &JsValue::from_str("fn")) {
        Ok(v) if !v.is_undefined() => v,
        _ => return false,
    };
    js_sys::Reflect::get(&prototype, &JsValue::from_str("turn"))
        .map(|v| !v.is_undefined())
        .unwrap_or(false)
}

async fn load_script(url: &str) -> Result<(), EditorError> {
    let document = dom::document()?;
    let script: HtmlScriptElement = document
        .create_element("script")
        .map_err(|_| EditorError::ScriptLoad(url.to_string()))?
        .dyn_into()
        .map_err(|_| EditorError::ScriptLoad(url.to_string()))?;
    script.set_src(url);

    let loaded = js_sys::Promise::new(&mut |resolve, reject| {
        script.set_onload(Some(&resolve));
        script.set_onerror(Some(&reject));
    });

    let head = document
        .head()
        .ok_or_else(|| EditorError::ScriptLoad(url.to_string()))?;
    head.append_child(&script)
        .map_err(|_| EditorError::ScriptLoad(url.to_string()))?;

    JsFuture::from(loaded)
        .await
        .map(|_| ())
        .map_err(|_| EditorError::ScriptLoad(url.to_string()))
}
