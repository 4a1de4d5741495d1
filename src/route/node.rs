//! Route node types: RouteNodeId, RouteNode.

use slotmap::new_key_type;

new_key_type! {
    /// Identifier of a route tree node.
    pub struct RouteNodeId;
}

/// Segment reserved for moving to the parent node.
pub const PARENT_SEGMENT: &str = "..";

/// A single node of the route tree.
#[derive(Debug, Clone)]
pub struct RouteNode<V> {
    /// Path segment; empty for the root.
    pub segment: String,
    /// Payload bound to this exact path.
    pub value: Option<V>,
}

impl<V> RouteNode<V> {
    pub fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            value: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.segment.is_empty()
    }
}

/// Split a path into the segments traversal visits: empty segments are
/// dropped, so `"//a///b/"` yields `a`, `b`.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Whether traversal of `path` starts at the root.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_skip_empty() {
        let parts: Vec<_> = segments("//a///b/").collect();
        assert_eq!(parts, vec!["a", "b"]);
        assert_eq!(segments("/").count(), 0);
        assert_eq!(segments("").count(), 0);
    }

    #[test]
    fn absolute_paths() {
        assert!(is_absolute("/a"));
        assert!(!is_absolute("a/b"));
        assert!(!is_absolute("../a"));
    }

    #[test]
    fn root_node() {
        assert!(RouteNode::<()>::new("").is_root());
        assert!(!RouteNode::<()>::new("a").is_root());
    }
}
