//! Path canonicalization
//!
//! Registration patterns and request paths are both reduced to the same
//! normal form before they touch the tree.

/// Returns the canonical form of `p`.
///
/// The rules are those of rooted path cleaning:
/// 1. A missing leading slash is added.
/// 2. Runs of slashes collapse into one.
/// 3. `.` elements are removed.
/// 4. `..` removes the element before it; at the root it is dropped.
/// 5. A trailing slash is removed, except for the root itself.
///
/// The result always starts with `/` and cleaning a clean path returns it
/// unchanged.
pub fn clean_path(p: &str) -> String {
    let mut elements: Vec<&str> = Vec::new();

    for element in p.split('/') {
        match element {
            "" | "." => {}
            ".." => {
                elements.pop();
            }
            name => elements.push(name),
        }
    }

    if elements.is_empty() {
        return "/".to_string();
    }

    let mut out = String::with_capacity(p.len() + 1);
    for element in elements {
        out.push('/');
        out.push_str(element);
    }
    out
}

/// Iterates over the segments of a canonical path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// First segment of `rest`, where `rest` is empty or a canonical path.
pub(crate) fn first_segment(rest: &str) -> Option<&str> {
    let body = rest.strip_prefix('/')?;
    if body.is_empty() {
        return None;
    }
    Some(body.split_once('/').map_or(body, |(head, _)| head))
}

/// Appends `segment` to a node label.
pub(crate) fn join(prefix: &str, segment: &str) -> String {
    if prefix.ends_with('/') {
        format!("{prefix}{segment}")
    } else {
        format!("{prefix}/{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // input, expected
    const CLEAN_CASES: &[(&str, &str)] = &[
        // already clean
        ("/", "/"),
        ("/abc", "/abc"),
        ("/a/b/c", "/a/b/c"),
        // missing root
        ("", "/"),
        ("abc", "/abc"),
        ("a/b/c", "/a/b/c"),
        // trailing slash
        ("/abc/", "/abc"),
        ("a/", "/a"),
        // doubled slashes
        ("//", "/"),
        ("/abc//def//ghi", "/abc/def/ghi"),
        ("///abc", "/abc"),
        ("//abc//", "/abc"),
        // dot elements
        (".", "/"),
        ("./", "/"),
        ("/abc/./def", "/abc/def"),
        ("/abc/.", "/abc"),
        // dot-dot elements
        ("..", "/"),
        ("../../abc", "/abc"),
        ("/abc/def/ghi/../jkl", "/abc/def/jkl"),
        ("/abc/def/../ghi/../jkl", "/abc/jkl"),
        ("/abc/def/../../..", "/"),
        ("/abc/def/../../../ghi/jkl/../../../mno", "/mno"),
        // combinations
        ("abc/./../def", "/def"),
        ("/a//b/../c", "/a/c"),
        // not special
        ("/.../x", "/.../x"),
        ("/:id/..x", "/:id/..x"),
    ];

    #[test]
    fn test_clean_path() {
        for (input, expected) in CLEAN_CASES {
            assert_eq!(clean_path(input), *expected, "cleaning {input:?}");
        }
    }

    #[test]
    fn test_clean_path_idempotent() {
        for (input, _) in CLEAN_CASES {
            let once = clean_path(input);
            assert_eq!(clean_path(&once), once, "re-cleaning {once:?}");
        }
    }

    #[test]
    fn test_clean_path_long() {
        for i in 1..300 {
            let name = "a".repeat(i);
            let expected = format!("/{name}");
            assert_eq!(clean_path(&name), expected);
            assert_eq!(clean_path(&format!("//{name}/b/..")), expected);
        }
    }

    #[test]
    fn test_segments() {
        assert_eq!(segments("/").count(), 0);
        assert_eq!(segments("/a/:id/c").collect::<Vec<_>>(), ["a", ":id", "c"]);
    }

    #[test]
    fn test_first_segment() {
        assert_eq!(first_segment("/a/b"), Some("a"));
        assert_eq!(first_segment("/b"), Some("b"));
        assert_eq!(first_segment("/"), None);
        assert_eq!(first_segment(""), None);
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/a", ":id"), "/a/:id");
    }
}
