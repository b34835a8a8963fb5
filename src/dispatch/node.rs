//! Dispatch tree nodes
//!
//! Each node owns its children outright. Literal children are keyed by the
//! exact segment text; a node has at most one parameter child, which matches
//! any single segment and captures it under the parameter's name.

use std::collections::HashMap;

use super::error::RegisterError;
use super::params::Params;
use super::path::{clean_path, first_segment, join, segments};

/// Marker that turns a pattern segment into a capture.
const PARAM_MARKER: char = ':';

/// A node of the dispatch tree.
#[derive(Debug)]
pub struct DispatcherNode<H> {
    pattern: String,
    name: String,
    handler: Option<H>,
    literals: HashMap<String, DispatcherNode<H>>,
    param: Option<Box<ParamChild<H>>>,
    preserve_path: bool,
}

#[derive(Debug)]
struct ParamChild<H> {
    name: String,
    node: DispatcherNode<H>,
}

/// Result of resolving a path.
#[derive(Debug)]
pub struct Match<'a, H> {
    /// Handler of the deepest node on the walked path that has one.
    pub handler: &'a H,
    /// Values captured by parameter segments, in path order.
    pub params: Params,
    /// Canonical path below the answering node; `/` when fully consumed.
    pub remaining: String,
    /// Label of the answering node.
    pub route: &'a str,
}

struct Walk<'a, H> {
    answer: Option<(&'a DispatcherNode<H>, &'a H, usize)>,
    params: Params,
    path: String,
}

impl<H> DispatcherNode<H> {
    /// Creates a node without a handler of its own, labelled with `pattern`.
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        Self {
            name: pattern.clone(),
            pattern,
            handler: None,
            literals: HashMap::new(),
            param: None,
            preserve_path: false,
        }
    }

    /// Canonical pattern prefix that created this node.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn handler(&self) -> Option<&H> {
        self.handler.as_ref()
    }

    pub fn preserve_path(&self) -> bool {
        self.preserve_path
    }

    /// When set, resolution stops at this node and its handler receives the
    /// whole remaining path, even if deeper registrations exist.
    pub fn set_preserve_path(&mut self, preserve: bool) -> &mut Self {
        self.preserve_path = preserve;
        self
    }

    /// Registers `handler` for `pattern`, relative to this node.
    ///
    /// Intermediate segments that do not exist yet become placeholder nodes
    /// without a handler; requests that end on them are answered by the
    /// nearest registered ancestor. Children already attached below the
    /// target node are kept.
    ///
    /// Returns the target node so nested routes can be registered on it.
    pub fn register(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RegisterError> {
        let pattern = clean_path(pattern);
        self.check_register(&pattern)?;

        let mut node = self;
        for segment in segments(&pattern) {
            node = node.child_or_insert(segment);
        }
        node.handler = Some(handler);
        Ok(node)
    }

    // Validates `pattern` without touching the tree.
    fn check_register(&self, pattern: &str) -> Result<(), RegisterError> {
        let mut current = Some(self);

        for segment in segments(pattern) {
            let param = segment.strip_prefix(PARAM_MARKER);
            if param == Some("") {
                return Err(RegisterError::UnnamedParam);
            }

            current = match (current, param) {
                (None, _) => None,
                (Some(node), None) => node.literals.get(segment),
                (Some(node), Some(name)) => match node.param.as_deref() {
                    Some(child) if child.name != name => {
                        return Err(RegisterError::conflict(&child.node.name));
                    }
                    Some(child) => Some(&child.node),
                    None => None,
                },
            };
        }

        match current {
            Some(node) if node.handler.is_some() => Err(RegisterError::conflict(&node.name)),
            _ => Ok(()),
        }
    }

    fn child_or_insert(&mut self, segment: &str) -> &mut Self {
        let name = join(&self.pattern, segment);

        if let Some(param) = segment.strip_prefix(PARAM_MARKER) {
            let child = self.param.get_or_insert_with(|| {
                Box::new(ParamChild {
                    name: param.to_owned(),
                    node: Self::new(name),
                })
            });
            return &mut child.node;
        }

        self.literals
            .entry(segment.to_owned())
            .or_insert_with(|| Self::new(name))
    }

    /// Resolves `path` against the subtree rooted here.
    ///
    /// Returns `None` when no node on the walked path has a handler.
    pub fn resolve(&self, path: &str) -> Option<Match<'_, H>> {
        let walk = self.walk(path);
        let (node, handler, offset) = walk.answer?;
        Some(Match {
            handler,
            params: walk.params,
            remaining: remainder(&walk.path, offset),
            route: &node.name,
        })
    }

    /// Like [`resolve`](Self::resolve), answering with `fallback` when no
    /// handler is found.
    pub fn resolve_or<'a>(&'a self, path: &str, fallback: &'a H) -> Match<'a, H> {
        let walk = self.walk(path);
        match walk.answer {
            Some((node, handler, offset)) => Match {
                handler,
                params: walk.params,
                remaining: remainder(&walk.path, offset),
                route: &node.name,
            },
            None => Match {
                handler: fallback,
                params: walk.params,
                remaining: walk.path,
                route: &self.name,
            },
        }
    }

    fn walk(&self, path: &str) -> Walk<'_, H> {
        let path = clean_path(path);
        let mut params = Params::new();
        let mut node = self;
        let mut offset = 0;
        let mut answer = node.handler.as_ref().map(|h| (node, h, offset));
        let mut answered_params = 0;

        while !node.preserve_path {
            let Some(segment) = first_segment(&path[offset..]) else {
                break;
            };

            // literal children always win over the parameter child
            node = if let Some(child) = node.literals.get(segment) {
                child
            } else if let Some(param) = node.param.as_deref() {
                params.push(&param.name, segment);
                &param.node
            } else {
                break;
            };

            offset += segment.len() + 1;
            if let Some(handler) = node.handler.as_ref() {
                answer = Some((node, handler, offset));
                answered_params = params.len();
            }
        }

        // values captured below the answering node belong to no pattern it declared
        params.truncate(answered_params);

        Walk {
            answer,
            params,
            path,
        }
    }

    /// Label of the first node above `pattern` that stops descent, if any.
    ///
    /// A route below such a node is registered but can never be reached.
    pub fn preserving_ancestor(&self, pattern: &str) -> Option<&str> {
        let pattern = clean_path(pattern);
        let mut node = self;

        for segment in segments(&pattern) {
            if node.preserve_path {
                return Some(&node.name);
            }
            node = match segment.strip_prefix(PARAM_MARKER) {
                Some(_) => &node.param.as_deref()?.node,
                None => node.literals.get(segment)?,
            };
        }
        None
    }

    /// Labels of all nodes carrying a handler, sorted.
    pub fn routes(&self) -> Vec<&str> {
        let mut routes = Vec::new();
        self.collect_routes(&mut routes);
        routes.sort_unstable();
        routes
    }

    fn collect_routes<'a>(&'a self, out: &mut Vec<&'a str>) {
        if self.handler.is_some() {
            out.push(&self.name);
        }
        for child in self.literals.values() {
            child.collect_routes(out);
        }
        if let Some(param) = self.param.as_deref() {
            param.node.collect_routes(out);
        }
    }
}

fn remainder(path: &str, offset: usize) -> String {
    match &path[offset..] {
        "" => "/".to_string(),
        rest => rest.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(routes: &[&'static str]) -> DispatcherNode<&'static str> {
        let mut root = DispatcherNode::new("/");
        for route in routes {
            root.register(route, *route).unwrap();
        }
        root
    }

    #[test]
    fn test_exact_match() {
        let root = tree(&["/a/b/c"]);
        let matched = root.resolve("/a/b/c").unwrap();
        assert_eq!(*matched.handler, "/a/b/c");
        assert!(matched.params.is_empty());
        assert_eq!(matched.remaining, "/");
        assert_eq!(matched.route, "/a/b/c");
    }

    #[test]
    fn test_param_capture() {
        let root = tree(&["/a/:id"]);
        let matched = root.resolve("/a/42").unwrap();
        assert_eq!(*matched.handler, "/a/:id");
        assert_eq!(matched.params.iter().collect::<Vec<_>>(), [("id", "42")]);
    }

    #[test]
    fn test_nested_params() {
        let root = tree(&["/albums/:album/photos/:photo"]);
        let matched = root.resolve("/albums/2021/photos/7").unwrap();
        assert_eq!(
            matched.params.iter().collect::<Vec<_>>(),
            [("album", "2021"), ("photo", "7")]
        );
    }

    #[test]
    fn test_ancestor_fallback_keeps_remainder() {
        let root = tree(&["/files"]);
        let matched = root.resolve("/files/sub/deep/path").unwrap();
        assert_eq!(*matched.handler, "/files");
        assert_eq!(matched.remaining, "/sub/deep/path");
    }

    #[test]
    fn test_placeholder_defers_to_registered_ancestor() {
        // registered bottom-up: the placeholder /files/a was created before /files
        let root = tree(&["/files/a/b", "/files"]);
        let matched = root.resolve("/files/a/zzz").unwrap();
        assert_eq!(*matched.handler, "/files");
        assert_eq!(matched.remaining, "/a/zzz");
    }

    #[test]
    fn test_remaining_measured_from_registered_route() {
        // top-down: /files/a is still only a placeholder
        let root = tree(&["/files", "/files/a/b"]);
        let matched = root.resolve("/files/a/zzz").unwrap();
        assert_eq!(*matched.handler, "/files");
        assert_eq!(matched.route, "/files");
        assert_eq!(matched.remaining, "/a/zzz");
    }

    #[test]
    fn test_unregistered_returns_none() {
        let root = tree(&["/a/b"]);
        assert!(root.resolve("/x").is_none());
        assert!(root.resolve("/a").is_none());
        assert!(root.resolve("/a/b").is_some());
    }

    #[test]
    fn test_resolve_or_fallback() {
        let root = tree(&["/a/b"]);
        let matched = root.resolve_or("/x//y/", &"fallback");
        assert_eq!(*matched.handler, "fallback");
        assert_eq!(matched.remaining, "/x/y");
        assert_eq!(matched.route, "/");
    }

    #[test]
    fn test_canonical_equivalence() {
        let root = tree(&["/a/c", "/a/b"]);
        let left = root.resolve("/a//b/../c").unwrap();
        let right = root.resolve("/a/c").unwrap();
        assert_eq!(left.route, right.route);
        assert_eq!(left.handler, right.handler);
    }

    #[test]
    fn test_root_handler_is_universal_fallback() {
        let root = tree(&["/"]);
        let matched = root.resolve("/x/y").unwrap();
        assert_eq!(*matched.handler, "/");
        assert_eq!(matched.remaining, "/x/y");
    }

    #[test]
    fn test_literal_beats_param() {
        let root = tree(&["/users/:id", "/users/me"]);
        assert_eq!(*root.resolve("/users/me").unwrap().handler, "/users/me");

        let matched = root.resolve("/users/7").unwrap();
        assert_eq!(*matched.handler, "/users/:id");
        assert_eq!(matched.params.get("id"), Some("7"));
    }

    #[test]
    fn test_param_in_middle_of_pattern() {
        let root = tree(&["/users/:id/photos", "/users"]);
        let matched = root.resolve("/users/9/photos").unwrap();
        assert_eq!(*matched.handler, "/users/:id/photos");
        assert_eq!(matched.params.get("id"), Some("9"));

        // the parameter placeholder itself has no handler, and /users
        // declares no parameter
        let matched = root.resolve("/users/9").unwrap();
        assert_eq!(*matched.handler, "/users");
        assert_eq!(matched.remaining, "/9");
        assert!(matched.params.is_empty());
    }

    #[test]
    fn test_param_does_not_match_empty_rest() {
        let root = tree(&["/a", "/a/:id"]);
        let matched = root.resolve("/a/").unwrap();
        assert_eq!(*matched.handler, "/a");
        assert!(matched.params.is_empty());
    }

    #[test]
    fn test_case_sensitive() {
        let root = tree(&["/", "/Photos"]);
        assert_eq!(*root.resolve("/photos").unwrap().handler, "/");
        assert_eq!(*root.resolve("/Photos").unwrap().handler, "/Photos");
    }

    #[test]
    fn test_duplicate_registration_conflicts() {
        let mut root = tree(&["/a/b"]);
        assert_eq!(
            root.register("/a//b/", "again").unwrap_err(),
            RegisterError::Conflict {
                with: "/a/b".to_string()
            }
        );
        assert_eq!(*root.resolve("/a/b").unwrap().handler, "/a/b");

        let mut root = tree(&["/"]);
        assert!(root.register("/", "again").is_err());
    }

    #[test]
    fn test_ancestor_registration_keeps_children() {
        let root = tree(&["/a/b/c", "/a/b"]);
        assert_eq!(*root.resolve("/a/b/c").unwrap().handler, "/a/b/c");
        assert_eq!(*root.resolve("/a/b/x").unwrap().handler, "/a/b");
        assert_eq!(root.routes(), ["/a/b", "/a/b/c"]);
    }

    #[test]
    fn test_conflicting_param_names() {
        let mut root = tree(&["/users/:id"]);
        assert_eq!(
            root.register("/users/:name/posts", "posts").unwrap_err(),
            RegisterError::Conflict {
                with: "/users/:id".to_string()
            }
        );
        // same name is fine
        root.register("/users/:id/posts", "posts").unwrap();
        assert_eq!(root.routes(), ["/users/:id", "/users/:id/posts"]);
    }

    #[test]
    fn test_unnamed_param() {
        let mut root: DispatcherNode<&str> = DispatcherNode::new("/");
        assert_eq!(
            root.register("/a/:/b", "x").unwrap_err(),
            RegisterError::UnnamedParam
        );
        // nothing was created on the way
        assert!(root.routes().is_empty());
        assert!(root.resolve("/a").is_none());
    }

    #[test]
    fn test_failed_registration_leaves_tree_untouched() {
        let mut root = tree(&["/users/:id"]);
        assert!(root.register("/users/:name/new/deep", "x").is_err());
        let matched = root.resolve("/users/5/new/deep").unwrap();
        assert_eq!(*matched.handler, "/users/:id");
        assert_eq!(matched.remaining, "/new/deep");
    }

    #[test]
    fn test_chained_registration() {
        let mut root: DispatcherNode<&str> = DispatcherNode::new("/");
        let api = root.register("/api", "api").unwrap();
        api.register("/status", "status").unwrap();
        api.register(":version/items", "items").unwrap();

        assert_eq!(*root.resolve("/api/status").unwrap().handler, "status");
        let matched = root.resolve("/api/v2/items").unwrap();
        assert_eq!(*matched.handler, "items");
        assert_eq!(matched.params.get("version"), Some("v2"));
        assert_eq!(matched.route, "/api/:version/items");
    }

    #[test]
    fn test_preserve_path_stops_descent() {
        let mut root: DispatcherNode<&str> = DispatcherNode::new("/");
        root.register("/static/css", "css").unwrap();
        root.register("/static", "static")
            .unwrap()
            .set_preserve_path(true);

        let matched = root.resolve("/static/css/site.css").unwrap();
        assert_eq!(*matched.handler, "static");
        assert_eq!(matched.remaining, "/css/site.css");
    }

    #[test]
    fn test_params_stop_at_answering_node() {
        let root = tree(&["/albums/:album", "/albums/:album/photos/:photo/raw"]);
        let matched = root.resolve("/albums/2021/photos/7").unwrap();
        assert_eq!(*matched.handler, "/albums/:album");
        assert_eq!(matched.params.iter().collect::<Vec<_>>(), [("album", "2021")]);
        assert_eq!(matched.remaining, "/photos/7");

        let matched = root.resolve_or("/elsewhere", &"fallback");
        assert!(matched.params.is_empty());
    }

    #[test]
    fn test_preserving_ancestor() {
        let mut root: DispatcherNode<&str> = DispatcherNode::new("/");
        root.register("/static/css", "css").unwrap();
        root.register("/users/:id/posts", "posts").unwrap();
        root.register("/static", "static")
            .unwrap()
            .set_preserve_path(true);

        assert_eq!(root.preserving_ancestor("/static/css"), Some("/static"));
        assert_eq!(root.preserving_ancestor("/static"), None);
        assert_eq!(root.preserving_ancestor("/users/:id/posts"), None);
        assert_eq!(root.preserving_ancestor("/not/registered"), None);
    }

    #[test]
    fn test_set_name() {
        let mut root: DispatcherNode<&str> = DispatcherNode::new("/");
        root.register("/files", "files").unwrap().set_name("drive");
        root.register("/files/:id", "file").unwrap();
        assert_eq!(root.resolve("/files").unwrap().route, "drive");
        assert_eq!(root.routes(), ["/files/:id", "drive"]);
    }
}
