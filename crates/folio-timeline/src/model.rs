#![forbid(unsafe_code)]

//! Authored timeline data and the derived row/segment shapes.
//!
//! Authoring types ([`AuthoredNode`], [`BranchSpan`]) are layout-agnostic and
//! come from configuration. Derived types ([`TimelineRow`], [`Segment`],
//! [`BuiltTimeline`]) are produced by [`crate::builder`] and never mutated
//! afterwards.

use std::borrow::Borrow;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Sentinel accepted in authored data for a span that never merges.
pub const OPEN_SPAN_SENTINEL: &str = "__END__";

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Name of a timeline lane ("main", "work", ...). One grid column each.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(String);

impl BranchId {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for BranchId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BranchId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for BranchId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for BranchId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BranchId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Identifies one drawn circle: a branch column on a given row.
///
/// A row can hold up to three circles (its own branch, a split child and a
/// merge child), so the row index alone is not enough.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    pub row_index: usize,
    pub branch: BranchId,
}

impl NodeKey {
    #[must_use]
    pub fn new(row_index: usize, branch: impl Into<BranchId>) -> Self {
        Self {
            row_index,
            branch: branch.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Authoring types
// ---------------------------------------------------------------------------

/// Descriptive tag only. Split/merge behavior is driven by spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Milestone,
    Split,
    Merge,
}

/// One career event as written by the author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthoredNode {
    pub id: String,
    #[serde(default)]
    pub kind: NodeKind,
    pub branch: BranchId,
    pub title: String,
    /// Sort key. Nodes without one sort after all nodes that have one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
    /// Key into the details lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_ref: Option<String>,
}

impl AuthoredNode {
    #[must_use]
    pub fn new(id: impl Into<String>, branch: impl Into<BranchId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Milestone,
            branch: branch.into(),
            title: title.into(),
            order_index: None,
            details_ref: None,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn order(mut self, index: i64) -> Self {
        self.order_index = Some(index);
        self
    }

    #[must_use]
    pub fn details(mut self, key: impl Into<String>) -> Self {
        self.details_ref = Some(key.into());
        self
    }
}

/// Where a span ends.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum SpanEnd {
    /// The branch never merges within the authored data.
    #[default]
    Open,
    /// The branch merges at this node id.
    At(String),
}

impl SpanEnd {
    /// The merge node id, if the span is closed.
    #[must_use]
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::Open => None,
            Self::At(id) => Some(id),
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl From<Option<String>> for SpanEnd {
    fn from(raw: Option<String>) -> Self {
        match raw {
            Some(id) if id != OPEN_SPAN_SENTINEL => Self::At(id),
            _ => Self::Open,
        }
    }
}

impl From<SpanEnd> for Option<String> {
    fn from(end: SpanEnd) -> Self {
        match end {
            SpanEnd::Open => Some(OPEN_SPAN_SENTINEL.to_owned()),
            SpanEnd::At(id) => Some(id),
        }
    }
}

/// Lifetime of one child branch relative to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSpan {
    pub branch: BranchId,
    pub parent: BranchId,
    pub starts_at: String,
    #[serde(default)]
    pub ends_at: SpanEnd,
}

impl BranchSpan {
    /// A span that merges back at `ends_at`.
    #[must_use]
    pub fn closed(
        branch: impl Into<BranchId>,
        parent: impl Into<BranchId>,
        starts_at: impl Into<String>,
        ends_at: impl Into<String>,
    ) -> Self {
        Self {
            branch: branch.into(),
            parent: parent.into(),
            starts_at: starts_at.into(),
            ends_at: SpanEnd::At(ends_at.into()),
        }
    }

    /// A span that stays open past the last row.
    #[must_use]
    pub fn open(
        branch: impl Into<BranchId>,
        parent: impl Into<BranchId>,
        starts_at: impl Into<String>,
    ) -> Self {
        Self {
            branch: branch.into(),
            parent: parent.into(),
            starts_at: starts_at.into(),
            ends_at: SpanEnd::Open,
        }
    }
}

// ---------------------------------------------------------------------------
// Derived types
// ---------------------------------------------------------------------------

/// A split or merge marker on a row: which child and which parent it connects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchLink {
    pub branch: BranchId,
    pub parent: BranchId,
}

/// One renderable row, one per authored node in sorted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRow {
    pub id: String,
    /// Branch this row's primary circle belongs to.
    pub node: BranchId,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<BranchLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<BranchLink>,
}

impl TimelineRow {
    /// Child branch beginning on this row.
    #[must_use]
    pub fn split_branch(&self) -> Option<&BranchId> {
        self.split.as_ref().map(|l| &l.branch)
    }

    /// Child branch ending on this row.
    #[must_use]
    pub fn merge_branch(&self) -> Option<&BranchId> {
        self.merge.as_ref().map(|l| &l.branch)
    }

    /// Branch the connector curve attaches to, split parent first.
    #[must_use]
    pub fn parent(&self) -> Option<&BranchId> {
        self.split
            .as_ref()
            .or(self.merge.as_ref())
            .map(|l| &l.parent)
    }

    /// Whether this row draws anything on `branch`.
    #[must_use]
    pub fn references(&self, branch: &BranchId) -> bool {
        &self.node == branch
            || self.split_branch() == Some(branch)
            || self.merge_branch() == Some(branch)
    }
}

/// Vertical line extent for one child branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub branch: BranchId,
    pub top: f64,
    pub height: f64,
}

/// A span after its rows have been located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSpan {
    pub branch: BranchId,
    pub parent: BranchId,
    pub start_row: usize,
    /// Merge row, or the last row referencing the branch when `open`.
    ///
    /// For open spans this is not where the drawn segment ends: that runs to
    /// the final row.
    pub end_row: usize,
    pub open: bool,
}

/// Output of [`crate::builder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltTimeline {
    pub rows: Vec<TimelineRow>,
    pub segments: Vec<Segment>,
    /// One entry per authored span, in authoring order.
    pub spans: Vec<ResolvedSpan>,
    pub index_by_id: FxHashMap<String, usize>,
}

impl BuiltTimeline {
    /// Row index of a node id.
    #[must_use]
    pub fn row_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Circles drawn on a row: its own branch, then the split child, then the
    /// merge child, each at most once.
    #[must_use]
    pub fn row_nodes(&self, row_index: usize) -> Vec<NodeKey> {
        let Some(row) = self.rows.get(row_index) else {
            return Vec::new();
        };
        let mut keys = vec![NodeKey::new(row_index, row.node.clone())];
        for branch in [row.split_branch(), row.merge_branch()].into_iter().flatten() {
            if keys.iter().all(|k| &k.branch != branch) {
                keys.push(NodeKey::new(row_index, branch.clone()));
            }
        }
        keys
    }

    /// Every circle on every row, top to bottom.
    #[must_use]
    pub fn all_node_keys(&self) -> Vec<NodeKey> {
        (0..self.rows.len()).flat_map(|i| self.row_nodes(i)).collect()
    }
}
