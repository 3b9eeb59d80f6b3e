//! Page identifier generation
//!
//! Page ids are never reused: each combines the creation timestamp with a
//! random component, so ids stay unique across duplicate/delete/re-add
//! sequences within a session and across sessions.

/// Generate a fresh page id: millisecond timestamp (hex) + 4 random bytes (hex).
pub fn generate_page_id() -> String {
    let mut random = [0u8; 4];
    // Zeroes on the (practically unreachable) failure path still yield a
    // unique id thanks to the timestamp half.
    let _ = getrandom::getrandom(&mut random);
    format!(
        "pg-{:x}-{:02x}{:02x}{:02x}{:02x}",
        now_millis(),
        random[0],
        random[1],
        random[2],
        random[3]
    )
}

#[cfg(target_arch = "wasm32")]
fn now_millis() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_have_prefix_and_are_unique() {
        let ids: HashSet<String> = (0..64).map(|_| generate_page_id()).collect();
        assert_eq!(ids.len(), 64);
        assert!(ids.iter().all(|id| id.starts_with("pg-")));
    }
}
