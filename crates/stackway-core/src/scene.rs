//! Scene-graph seam.
//!
//! The core never renders. It only arranges nodes: trees that group a
//! view's content and decorations, and surface trees that display a
//! client buffer. Backends either adopt [`MemoryScene`] and render from it
//! or implement [`SceneGraph`] on top of their own scene.

use std::collections::HashMap;

use crate::shell::SurfaceId;

/// Handle to a node in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

/// Operations the core performs on the scene graph.
pub trait SceneGraph: std::fmt::Debug {
    fn root(&self) -> NodeId;

    /// Create an empty, enabled tree under `parent`.
    fn create_tree(&mut self, parent: NodeId) -> NodeId;

    /// Create a tree displaying `surface` and its subsurfaces.
    ///
    /// Returns `None` when the scene cannot allocate the tree.
    fn create_surface_tree(&mut self, parent: NodeId, surface: SurfaceId) -> Option<NodeId>;

    fn set_enabled(&mut self, node: NodeId, enabled: bool);
    fn set_position(&mut self, node: NodeId, x: i32, y: i32);
    fn reparent(&mut self, node: NodeId, parent: NodeId);
    fn raise_to_top(&mut self, node: NodeId);

    /// Destroy `node` and everything below it.
    fn destroy(&mut self, node: NodeId);

    fn contains(&self, node: NodeId) -> bool;
    fn is_enabled(&self, node: NodeId) -> bool;
    fn position(&self, node: NodeId) -> Option<(i32, i32)>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn surface(&self, node: NodeId) -> Option<SurfaceId>;

    /// A node is visible when it and all its ancestors are enabled.
    fn is_visible(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if !self.contains(id) || !self.is_enabled(id) {
                return false;
            }
            current = self.parent(id);
        }
        true
    }
}

#[derive(Debug, Clone)]
struct SceneNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    enabled: bool,
    position: (i32, i32),
    surface: Option<SurfaceId>,
}

impl SceneNode {
    const fn new(parent: Option<NodeId>, surface: Option<SurfaceId>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            enabled: true,
            position: (0, 0),
            surface,
        }
    }
}

/// Arena-backed scene graph.
#[derive(Debug)]
pub struct MemoryScene {
    nodes: HashMap<NodeId, SceneNode>,
    root: NodeId,
    next_id: u64,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, SceneNode::new(None, None));
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of `node` in stacking order, bottom first.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    fn insert(&mut self, parent: NodeId, surface: Option<SurfaceId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, SceneNode::new(Some(parent), surface));
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.nodes.get(&node).and_then(|n| n.parent);
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|&c| c != node);
        }
    }
}

impl SceneGraph for MemoryScene {
    fn root(&self) -> NodeId {
        self.root
    }

    fn create_tree(&mut self, parent: NodeId) -> NodeId {
        self.insert(parent, None)
    }

    fn create_surface_tree(&mut self, parent: NodeId, surface: SurfaceId) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        Some(self.insert(parent, Some(surface)))
    }

    fn set_enabled(&mut self, node: NodeId, enabled: bool) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.enabled = enabled;
        }
    }

    fn set_position(&mut self, node: NodeId, x: i32, y: i32) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.position = (x, y);
        }
    }

    fn reparent(&mut self, node: NodeId, parent: NodeId) {
        if node == parent || !self.nodes.contains_key(&parent) {
            return;
        }
        self.detach(node);
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(node);
        }
    }

    fn raise_to_top(&mut self, node: NodeId) {
        let parent = self.nodes.get(&node).and_then(|n| n.parent);
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|&c| c != node);
            p.children.push(node);
        }
    }

    fn destroy(&mut self, node: NodeId) {
        if node == self.root {
            return;
        }
        self.detach(node);
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(n) = self.nodes.remove(&id) {
                pending.extend(n.children);
            }
        }
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn is_enabled(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| n.enabled)
    }

    fn position(&self, node: NodeId) -> Option<(i32, i32)> {
        self.nodes.get(&node).map(|n| n.position)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn surface(&self, node: NodeId) -> Option<SurfaceId> {
        self.nodes.get(&node).and_then(|n| n.surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destroy_removes_subtree() {
        let mut scene = MemoryScene::new();
        let root = scene.root();
        let tree = scene.create_tree(root);
        let child = scene.create_surface_tree(tree, SurfaceId(7)).unwrap();
        assert_eq!(scene.len(), 3);

        scene.destroy(tree);
        assert!(!scene.contains(tree));
        assert!(!scene.contains(child));
        assert!(scene.children(root).is_empty());
    }

    #[test]
    fn test_visibility_follows_ancestors() {
        let mut scene = MemoryScene::new();
        let root = scene.root();
        let tree = scene.create_tree(root);
        let child = scene.create_tree(tree);

        assert!(scene.is_visible(child));
        scene.set_enabled(tree, false);
        assert!(!scene.is_visible(child));
        assert!(scene.is_enabled(child));
    }

    #[test]
    fn test_reparent_and_raise() {
        let mut scene = MemoryScene::new();
        let root = scene.root();
        let a = scene.create_tree(root);
        let b = scene.create_tree(root);
        let node = scene.create_tree(a);

        scene.reparent(node, b);
        assert_eq!(scene.parent(node), Some(b));
        assert!(scene.children(a).is_empty());

        scene.raise_to_top(a);
        assert_eq!(scene.children(root), &[b, a]);
    }
}
