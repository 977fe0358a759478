//! Archive-relative path handling.
//!
//! Stored filenames come from untrusted producers and may use backslash
//! separators, `.`/`..` segments, or absolute-looking prefixes. Every name
//! passes through [`clean`] before it is used as an on-disk path.

/// Normalize an archive-relative path.
///
/// Splits on both `/` and `\`, drops empty and `.` segments, and resolves
/// each `..` by popping the previously kept segment (a `..` at the root is
/// silently dropped). The result is re-joined with `/` and never starts or
/// ends with a separator. Purely lexical; no filesystem access.
pub fn clean(path: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();

    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                kept.pop();
            }
            other => kept.push(other),
        }
    }

    kept.join("/")
}

/// Drop the first `count` path segments from an already-cleaned name.
///
/// The final filename segment always survives, even when `count` would
/// otherwise consume it.
pub fn strip_components(name: &str, count: usize) -> String {
    let segments: Vec<&str> = name.split('/').collect();
    if segments.len() <= count {
        segments.last().copied().unwrap_or("").to_string()
    } else {
        segments[count..].join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_resolves_dot_segments() {
        assert_eq!(clean("a/../b/./c"), "b/c");
        assert_eq!(clean("../../x"), "x");
        assert_eq!(clean("/a/b/"), "a/b");
    }

    #[test]
    fn clean_splits_on_backslash() {
        assert_eq!(clean(r"a\b\..\c"), "a/c");
    }

    #[test]
    fn clean_of_nothing_is_empty() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("./.."), "");
    }

    #[test]
    fn strip_drops_leading_segments() {
        assert_eq!(strip_components("a/b/c.txt", 1), "b/c.txt");
        assert_eq!(strip_components("a/b/c.txt", 2), "c.txt");
    }

    #[test]
    fn strip_preserves_the_filename() {
        assert_eq!(strip_components("a/b/c.txt", 3), "c.txt");
        assert_eq!(strip_components("a/b/c.txt", 99), "c.txt");
        assert_eq!(strip_components("c.txt", 1), "c.txt");
    }
}
