//! Generic rooted n-ary tree backed by an arena
//!
//! One instance is built per sentence and cleared afterwards. The same
//! structure serves both adjacency models: a left-to-right chain in surface
//! mode and a true dependency tree in dependency mode.

/// Handle to a node inside a [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Index into the tree arena
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Handle for a known arena index (nodes are allocated sequentially)
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

#[derive(Debug)]
struct Node<T> {
    element: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-allocated rooted tree with parent back-links and ordered children
#[derive(Debug, Default)]
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Tree<T> {
    /// Create an empty tree
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Allocate a detached node
    pub fn add_node(&mut self, element: T) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            element,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Attach `child` under `parent`, preserving insertion order
    pub fn link(&mut self, child: NodeId, parent: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Element stored at a node
    pub fn element(&self, id: NodeId) -> &T {
        &self.nodes[id.index()].element
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Children of a node in attachment order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// True when the node has no children
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.index()].children.is_empty()
    }

    /// Number of allocated nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no nodes have been allocated
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node, keeping the allocation
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_sets_parent_and_child_order() {
        let mut tree = Tree::new();
        let root = tree.add_node(0usize);
        let a = tree.add_node(1);
        let b = tree.add_node(2);
        tree.link(a, root);
        tree.link(b, root);
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.children(root), &[a, b]);
        assert!(tree.is_leaf(a));
        assert!(!tree.is_leaf(root));
    }

    #[test]
    fn test_clear_resets_arena() {
        let mut tree = Tree::new();
        tree.add_node(7usize);
        tree.clear();
        assert!(tree.is_empty());
    }
}
