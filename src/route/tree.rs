//! Route tree: insert, resolve, traverse with a cursor.

use slotmap::{SecondaryMap, SlotMap};

use super::node::{is_absolute, segments, RouteNode, RouteNodeId, PARENT_SEGMENT};
use crate::error::RouteError;

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[RouteNodeId] = &[];

/// Hierarchical path → value map with a "current node" cursor.
///
/// Paths starting with `/` are resolved from the root, all others from the
/// cursor. `..` moves to the parent. Only [`traverse`](Self::traverse) moves
/// the cursor; every other lookup is side-effect free.
pub struct RouteTree<V> {
    nodes: SlotMap<RouteNodeId, RouteNode<V>>,
    children: SecondaryMap<RouteNodeId, Vec<RouteNodeId>>,
    parent: SecondaryMap<RouteNodeId, RouteNodeId>,
    root: RouteNodeId,
    current: RouteNodeId,
}

impl<V> RouteTree<V> {
    /// A tree holding only an empty root, with the cursor on it.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(RouteNode::new(""));
        let mut children = SecondaryMap::new();
        children.insert(root, Vec::new());
        Self {
            nodes,
            children,
            parent: SecondaryMap::new(),
            root,
            current: root,
        }
    }

    /// Bind `value` to `path`, creating missing nodes. An existing value at
    /// that node is overwritten. The cursor does not move.
    ///
    /// Fails if a `..` segment would leave the root. A failed insert leaves
    /// the tree unchanged.
    pub fn insert(&mut self, path: &str, value: V) -> Result<RouteNodeId, RouteError> {
        let mut node = self.start(path);
        let mut depth = self.depth(node);
        for segment in segments(path) {
            if segment != PARENT_SEGMENT {
                depth += 1;
            } else if depth == 0 {
                return Err(RouteError::AboveRoot {
                    path: path.to_string(),
                });
            } else {
                depth -= 1;
            }
        }

        for segment in segments(path) {
            if segment == PARENT_SEGMENT {
                node = self.parent(node).unwrap_or(node);
                continue;
            }
            node = match self.child(node, segment) {
                Some(existing) => existing,
                None => self.insert_child(node, segment),
            };
        }
        self.nodes[node].value = Some(value);
        Ok(node)
    }

    /// Resolve `path` to a node without touching the tree.
    ///
    /// `..` at the root stays at the root.
    pub fn find(&self, path: &str) -> Option<RouteNodeId> {
        let mut node = self.start(path);
        for segment in segments(path) {
            if segment == PARENT_SEGMENT {
                node = self.parent(node).unwrap_or(node);
                continue;
            }
            node = self.child(node, segment)?;
        }
        Some(node)
    }

    /// Value bound to `path`, without moving the cursor.
    pub fn get(&self, path: &str) -> Option<&V> {
        self.find(path).and_then(|id| self.value(id))
    }

    /// Whether a value is bound to `path`. Never moves the cursor.
    pub fn contains_path(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Resolve `path` and move the cursor there if the node exists.
    ///
    /// On a missing node the cursor stays where it was.
    pub fn traverse(&mut self, path: &str) -> Option<&V> {
        let node = self.find(path)?;
        self.current = node;
        self.value(node)
    }

    /// Child of `id` named `segment`.
    pub fn child(&self, id: RouteNodeId, segment: &str) -> Option<RouteNodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.nodes[child].segment == segment)
    }

    fn insert_child(&mut self, parent: RouteNodeId, segment: &str) -> RouteNodeId {
        let id = self.nodes.insert(RouteNode::new(segment));
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        id
    }

    fn depth(&self, mut id: RouteNodeId) -> usize {
        let mut depth = 0;
        while let Some(parent) = self.parent(id) {
            depth += 1;
            id = parent;
        }
        depth
    }

    fn start(&self, path: &str) -> RouteNodeId {
        if is_absolute(path) {
            self.root
        } else {
            self.current
        }
    }

    pub fn root(&self) -> RouteNodeId {
        self.root
    }

    /// The cursor.
    pub fn current(&self) -> RouteNodeId {
        self.current
    }

    /// Move the cursor to `id`. Returns `false` (and leaves the cursor) if
    /// the node is not part of this tree.
    pub fn set_current(&mut self, id: RouteNodeId) -> bool {
        if !self.nodes.contains_key(id) {
            return false;
        }
        self.current = id;
        true
    }

    pub fn root_value(&self) -> Option<&V> {
        self.value(self.root)
    }

    pub fn current_value(&self) -> Option<&V> {
        self.value(self.current)
    }

    pub fn value(&self, id: RouteNodeId) -> Option<&V> {
        self.nodes.get(id).and_then(|n| n.value.as_ref())
    }

    pub fn node(&self, id: RouteNodeId) -> Option<&RouteNode<V>> {
        self.nodes.get(id)
    }

    pub fn parent(&self, id: RouteNodeId) -> Option<RouteNodeId> {
        self.parent.get(id).copied()
    }

    /// Children in insertion order.
    pub fn children(&self, id: RouteNodeId) -> &[RouteNodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Absolute path of `id`, `/` for the root.
    pub fn path_of(&self, id: RouteNodeId) -> String {
        let mut parts = Vec::new();
        let mut node = id;
        while let Some(parent) = self.parent(node) {
            parts.push(self.nodes[node].segment.as_str());
            node = parent;
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }

    /// Absolute paths of every node carrying a value, pre-order.
    pub fn paths(&self) -> Vec<String> {
        let mut result = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.value(id).is_some() {
                result.push(self.path_of(id));
            }
            for &child in self.children(id).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }
}

impl<V> Default for RouteTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Insert ───────────────────────────────────────────────────────

    #[test]
    fn new_tree_is_empty() {
        let tree = RouteTree::<i32>::new();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), tree.current());
        assert_eq!(tree.root_value(), None);
        assert_eq!(tree.current_value(), None);
    }

    #[test]
    fn insert_root_value() {
        let mut tree = RouteTree::new();
        let id = tree.insert("/", 1).unwrap();
        assert_eq!(id, tree.root());
        assert_eq!(tree.root_value(), Some(&1));
        assert_eq!(tree.current_value(), Some(&1));
    }

    #[test]
    fn insert_creates_intermediate_nodes() {
        let mut tree = RouteTree::new();
        tree.insert("/a/b/c", 3).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.get("/a/b/c"), Some(&3));
        assert_eq!(tree.get("/a/b"), None);
        assert!(tree.find("/a/b").is_some());
    }

    #[test]
    fn insert_overwrites() {
        let mut tree = RouteTree::new();
        let first = tree.insert("/a", 1).unwrap();
        let second = tree.insert("/a", 2).unwrap();
        assert_eq!(first, second);
        assert_eq!(tree.get("/a"), Some(&2));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn insert_above_root_fails() {
        let mut tree = RouteTree::new();
        let err = tree.insert("/../a", 1).unwrap_err();
        assert_eq!(err, RouteError::AboveRoot { path: "/../a".into() });
        assert!(tree.is_empty());
    }

    #[test]
    fn failed_insert_creates_no_nodes() {
        let mut tree = RouteTree::new();
        tree.insert("/x", 0).unwrap();
        let before = tree.len();

        assert!(tree.insert("/a/../../b", 1).is_err());
        assert_eq!(tree.len(), before);
        assert!(tree.find("/a").is_none());

        tree.insert("/a/../b", 2).unwrap();
        assert_eq!(tree.get("/b"), Some(&2));
        assert!(tree.find("/a").is_some());
    }

    #[test]
    fn insert_does_not_move_cursor() {
        let mut tree = RouteTree::new();
        tree.insert("/a", 1).unwrap();
        assert_eq!(tree.current(), tree.root());
    }

    #[test]
    fn insert_relative_to_cursor() {
        let mut tree = RouteTree::new();
        tree.insert("/a", 1).unwrap();
        tree.traverse("/a");
        tree.insert("b", 2).unwrap();
        tree.insert("../c", 3).unwrap();
        assert_eq!(tree.get("/a/b"), Some(&2));
        assert_eq!(tree.get("/c"), Some(&3));
    }

    // ── Resolve ──────────────────────────────────────────────────────

    #[test]
    fn walkthrough() {
        let mut tree = RouteTree::new();
        tree.insert("/", 1).unwrap();
        tree.insert("/a", 2).unwrap();
        assert_eq!(tree.current_value(), Some(&1));

        assert_eq!(tree.traverse("/a"), Some(&2));
        assert_eq!(tree.current_value(), Some(&2));
        assert_eq!(tree.traverse("/a"), Some(&2));

        assert_eq!(tree.traverse("/a/b"), None);
        assert_eq!(tree.current_value(), Some(&2));

        tree.insert("b", 3).unwrap();
        assert_eq!(tree.traverse("b"), Some(&3));
        assert_eq!(tree.current_value(), Some(&3));

        assert_eq!(tree.traverse("../../a/b/.."), Some(&2));
        assert_eq!(tree.path_of(tree.current()), "/a");
    }

    #[test]
    fn parent_at_root_clamps_when_resolving() {
        let mut tree = RouteTree::new();
        tree.insert("/a", 1).unwrap();
        assert_eq!(tree.get("../../a"), Some(&1));
    }

    #[test]
    fn failed_lookups_have_no_side_effects() {
        let mut tree = RouteTree::new();
        tree.insert("/a/b", 1).unwrap();
        tree.traverse("/a");
        let cursor = tree.current();
        let nodes = tree.len();

        for _ in 0..3 {
            assert_eq!(tree.get("/x/y"), None);
            assert!(!tree.contains_path("missing"));
            assert_eq!(tree.traverse("b/c"), None);
        }
        assert_eq!(tree.current(), cursor);
        assert_eq!(tree.len(), nodes);
    }

    #[test]
    fn non_navigating_lookup_keeps_cursor() {
        let mut tree = RouteTree::new();
        tree.insert("/a", 1).unwrap();
        assert!(tree.contains_path("/a"));
        assert_eq!(tree.get("a"), Some(&1));
        assert_eq!(tree.current(), tree.root());
    }

    #[test]
    fn round_trip() {
        let mut tree = RouteTree::new();
        let paths = ["/", "/a", "/a/b", "/c/d/e", "/c/x"];
        for (i, p) in paths.iter().enumerate() {
            tree.insert(p, i).unwrap();
        }
        for (i, p) in paths.iter().enumerate() {
            assert_eq!(tree.get(p), Some(&i), "path {p}");
        }
    }

    // ── Cursor & structure ───────────────────────────────────────────

    #[test]
    fn set_current_restores_position() {
        let mut tree = RouteTree::new();
        let b = tree.insert("/a/b", 1).unwrap();
        assert!(tree.set_current(b));
        assert_eq!(tree.current_value(), Some(&1));
        assert_eq!(tree.get(".."), None);
        assert!(tree.find("..").is_some());
    }

    #[test]
    fn paths_and_children() {
        let mut tree = RouteTree::new();
        let a = tree.insert("/a", 1).unwrap();
        tree.insert("/a/b", 2).unwrap();
        tree.insert("/c", 3).unwrap();
        assert_eq!(tree.paths(), vec!["/a", "/a/b", "/c"]);
        assert_eq!(tree.children(tree.root()).len(), 2);
        assert_eq!(tree.parent(a), Some(tree.root()));
        assert_eq!(tree.path_of(tree.root()), "/");
        assert_eq!(tree.node(a).map(|n| n.segment.as_str()), Some("a"));
    }
}
