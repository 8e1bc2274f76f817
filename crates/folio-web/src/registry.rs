#![forbid(unsafe_code)]

//! Measured node positions, sorted top to bottom.
//!
//! # Invariants
//!
//! 1. At most one entry per [`NodeKey`]; registering again replaces it.
//! 2. Entries are sorted by `position.y` ascending. Equal `y` falls back to
//!    key order, so the result never depends on registration order.

use folio_core::Point;
use folio_timeline::NodeKey;

/// One measured circle.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredNode {
    /// Display id of the row the circle belongs to.
    pub id: String,
    pub key: NodeKey,
    /// Container-relative centre.
    pub position: Point,
}

#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: Vec<RegisteredNode>,
}

impl NodeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `node.key`, keeping the sort order.
    ///
    /// Returns the previous entry, if any.
    pub fn upsert(&mut self, node: RegisteredNode) -> Option<RegisteredNode> {
        let previous = self.remove(&node.key);
        let at = self.nodes.partition_point(|n| {
            n.position
                .y
                .total_cmp(&node.position.y)
                .then_with(|| n.key.cmp(&node.key))
                .is_lt()
        });
        self.nodes.insert(at, node);
        previous
    }

    /// Drop the entry for `key`.
    pub fn remove(&mut self, key: &NodeKey) -> Option<RegisteredNode> {
        let idx = self.nodes.iter().position(|n| &n.key == key)?;
        Some(self.nodes.remove(idx))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&RegisteredNode> {
        self.nodes.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&RegisteredNode> {
        self.nodes.last()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RegisteredNode> {
        self.nodes.get(index)
    }

    /// Entries top to bottom.
    #[must_use]
    pub fn as_slice(&self) -> &[RegisteredNode] {
        &self.nodes
    }

    pub fn keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.nodes.iter().map(|n| &n.key)
    }
}
