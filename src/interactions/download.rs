//! Download payload derivation.
//!
//! When a download interaction is configured without an explicit payload,
//! the element supplies one: images download their own source, anything
//! else downloads its text content as a `data:` URI. Filenames come from
//! the URL basename or from the text itself.

use serde::{Deserialize, Serialize};
use web_sys::Element;

/// What a download interaction will actually fetch and save.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DownloadPayload {
    pub value: String,
    pub filename: String,
}

const FALLBACK_STEM: &str = "download";

pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Basename of a URL path, query and fragment stripped, sanitized. None
/// when nothing usable remains (directory URLs, bare origins, data URIs).
pub fn filename_from_url(url: &str) -> Option<String> {
    if url.starts_with("data:") {
        return None;
    }
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let candidate = match path.find("://") {
        // Absolute URL: the basename must come from a path segment, never
        // from the host.
        Some(scheme_end) => {
            let rest = &path[scheme_end + 3..];
            match rest.find('/') {
                Some(slash) => rest[slash + 1..].rsplit('/').next().unwrap_or(""),
                None => "",
            }
        }
        None => path.rsplit('/').next().unwrap_or(""),
    };
    let sanitized = sanitize_filename(candidate);
    if sanitized.is_empty() || sanitized.chars().all(|c| c == '_' || c == '.') {
        None
    } else {
        Some(sanitized)
    }
}

/// Filename for a text download: the first ten characters, anything that is
/// not ascii-alphanumeric flattened to `_`, with a `.txt` extension.
pub fn text_filename(text: &str) -> String {
    let stem: String = text
        .trim()
        .chars()
        .take(10)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if stem.is_empty() {
        format!("{}.txt", FALLBACK_STEM)
    } else {
        format!("{}.txt", stem)
    }
}

fn text_data_uri(text: &str) -> String {
    let encoded = String::from(js_sys::encode_uri_component(text));
    format!("data:text/plain;charset=utf-8,{}", encoded)
}

/// Derive the payload an element would download. Images resolve to their
/// source URL; everything else snapshots its text content into a data URI.
pub fn derive_for_element(element: &Element) -> DownloadPayload {
    if element.tag_name().eq_ignore_ascii_case("img") {
        if let Some(src) = element.get_attribute("src") {
            let filename =
                filename_from_url(&src).unwrap_or_else(|| format!("{}.img", FALLBACK_STEM));
            return DownloadPayload {
                value: src,
                filename,
            };
        }
    }
    let text = element.text_content().unwrap_or_default();
    DownloadPayload {
        value: text_data_uri(&text),
        filename: text_filename(&text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_filename_truncates_then_flattens() {
        assert_eq!(text_filename("Hello World"), "Hello_Worl.txt");
    }

    #[test]
    fn test_text_filename_short_text() {
        assert_eq!(text_filename("Hi!"), "Hi_.txt");
    }

    #[test]
    fn test_text_filename_empty_text_falls_back() {
        assert_eq!(text_filename("   "), "download.txt");
    }

    #[test]
    fn test_filename_from_url_strips_query_and_fragment() {
        assert_eq!(
            filename_from_url("https://cdn.example.com/photos/cat.jpg?w=200#main"),
            Some("cat.jpg".to_string())
        );
    }

    #[test]
    fn test_filename_from_url_directory_is_unusable() {
        assert_eq!(filename_from_url("https://example.com/photos/"), None);
        assert_eq!(filename_from_url("https://example.com"), None);
        assert_eq!(filename_from_url("data:text/plain,hello"), None);
    }

    #[test]
    fn test_filename_from_relative_path() {
        assert_eq!(
            filename_from_url("images/pic.png"),
            Some("pic.png".to_string())
        );
    }

    #[test]
    fn test_sanitize_filename_replaces_unsafe_chars() {
        assert_eq!(sanitize_filename("my photo (1).png"), "my_photo__1_.png");
    }
}
