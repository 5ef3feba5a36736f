//! Retained scene-graph model: the mutation sink every chart renders into.
//!
//! Nodes carry a kind, an optional data key (the identity used by the
//! reconciler), ordered string attributes, and owned children. Attribute
//! values are either scalars or space-separated numeric tuples ("x y z"
//! vectors, "r g b" colors, coordinate-index streams terminated by `-1`).
//! Because the tree is plain owned data it doubles as the headless test
//! double for reconciliation and encoding.

use std::collections::BTreeMap;

/// The kind of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum NodeKind {
    /// Plain grouping node.
    Group,
    /// Spatial transform (translation, rotation, scale attributes).
    Transform,
    /// Geometry-bearing shape.
    Shape,
    /// Appearance container.
    Appearance,
    /// Surface material (diffuse color, transparency).
    Material,
    /// Box primitive.
    Box,
    /// Sphere primitive.
    Sphere,
    /// Cylinder primitive.
    Cylinder,
    /// Cone primitive.
    Cone,
    /// Indexed face set geometry.
    IndexedFaceSet,
    /// Coordinate list for an indexed face set.
    Coordinate,
    /// Per-vertex color list for an indexed face set.
    Color,
    /// Text label.
    Text,
    /// Volumetric data container.
    VolumeData,
    /// Texture atlas image reference.
    ImageTexture,
}

/// A node in the retained scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    kind: NodeKind,
    key: Option<String>,
    attributes: BTreeMap<String, String>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    /// Create an unkeyed node.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self { kind, key: None, attributes: BTreeMap::new(), children: Vec::new() }
    }

    /// Create a keyed node.
    #[must_use]
    pub fn keyed(kind: NodeKind, key: impl Into<String>) -> Self {
        Self { kind, key: Some(key.into()), attributes: BTreeMap::new(), children: Vec::new() }
    }

    /// Node kind.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Data key, if the node is data-bound.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Set or replace the data key.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = Some(key.into());
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Read an attribute.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Append a child node.
    pub fn push(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// Builder-style child appender.
    #[must_use]
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.push(child);
        self
    }

    /// Child nodes in order.
    #[must_use]
    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    /// Mutable access to child nodes.
    pub fn children_mut(&mut self) -> &mut Vec<SceneNode> {
        &mut self.children
    }

    /// Find a keyed child.
    #[must_use]
    pub fn child_by_key(&self, key: &str) -> Option<&SceneNode> {
        self.children.iter().find(|c| c.key() == Some(key))
    }

    /// Find a keyed child mutably.
    pub fn child_by_key_mut(&mut self, key: &str) -> Option<&mut SceneNode> {
        self.children.iter_mut().find(|c| c.key.as_deref() == Some(key))
    }

    /// Keys of data-bound children, in order.
    #[must_use]
    pub fn child_keys(&self) -> Vec<&str> {
        self.children.iter().filter_map(SceneNode::key).collect()
    }

    /// Remove the keyed child (and, via ownership, its whole subtree).
    ///
    /// Returns `true` when a child was removed.
    pub fn remove_child(&mut self, key: &str) -> bool {
        let before = self.children.len();
        self.children.retain(|c| c.key() != Some(key));
        self.children.len() != before
    }

    /// First descendant of the given kind, depth-first.
    #[must_use]
    pub fn find_kind(&self, kind: NodeKind) -> Option<&SceneNode> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_kind(kind))
    }

    /// First descendant of the given kind, depth-first, mutable.
    pub fn find_kind_mut(&mut self, kind: NodeKind) -> Option<&mut SceneNode> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_kind_mut(kind))
    }

    /// Total node count of this subtree (including self).
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }
}
