//! Page name collision heuristics
//!
//! Names are a display convenience, not a structural invariant: these
//! helpers only make colliding names visually distinct. Rename collisions
//! get a ` (1)` / ` (2)` suffix, duplicated pages get ` (copy)` /
//! ` (copy 2)`, and new pages count up from `Page 1`.

/// Resolve a rename collision by appending ` (1)`, ` (2)`, ... until the
/// name no longer matches any in `existing`.
pub fn unique_name(desired: &str, existing: &[&str]) -> String {
    let taken = |name: &str| existing.iter().any(|e| *e == name);
    if !taken(desired) {
        return desired.to_string();
    }
    let mut n = 1usize;
    loop {
        let candidate = format!("{} ({})", desired, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Name for a duplicated page: `Name (copy)`, then `Name (copy 2)`, ...
pub fn copy_name(base: &str, existing: &[&str]) -> String {
    let taken = |name: &str| existing.iter().any(|e| *e == name);
    let first = format!("{} (copy)", base);
    if !taken(&first) {
        return first;
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{} (copy {})", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Default name for a freshly added page, bumped past collisions.
pub fn next_page_name(existing: &[&str], count: usize) -> String {
    let taken = |name: &str| existing.iter().any(|e| *e == name);
    let mut n = count + 1;
    loop {
        let candidate = format!("Page {}", n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_name_no_collision() {
        assert_eq!(unique_name("Cover", &["Page 1", "Page 2"]), "Cover");
    }

    #[test]
    fn test_unique_name_appends_counter() {
        assert_eq!(unique_name("Cover", &["Cover"]), "Cover (1)");
        assert_eq!(unique_name("Cover", &["Cover", "Cover (1)"]), "Cover (2)");
    }

    #[test]
    fn test_copy_name_progression() {
        assert_eq!(copy_name("Page 1", &["Page 1"]), "Page 1 (copy)");
        assert_eq!(
            copy_name("Page 1", &["Page 1", "Page 1 (copy)"]),
            "Page 1 (copy 2)"
        );
        assert_eq!(
            copy_name("Page 1", &["Page 1", "Page 1 (copy)", "Page 1 (copy 2)"]),
            "Page 1 (copy 3)"
        );
    }

    #[test]
    fn test_next_page_name_skips_taken() {
        assert_eq!(next_page_name(&["Page 1"], 1), "Page 2");
        // A manually renamed page already holds "Page 3": skip it
        assert_eq!(next_page_name(&["Page 1", "Page 3"], 2), "Page 4");
    }

    #[test]
    fn test_manual_name_matching_generated_pattern() {
        // Renaming a page to literally match an auto-generated pattern is
        // resolved the same way as any other collision.
        assert_eq!(
            unique_name("Page 1 (copy)", &["Page 1", "Page 1 (copy)"]),
            "Page 1 (copy) (1)"
        );
    }
}
