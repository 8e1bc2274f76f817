#![forbid(unsafe_code)]

//! Referential-integrity checks over authored nodes and spans.
//!
//! # Invariants checked
//!
//! 1. Node ids are unique.
//! 2. Every `starts_at` and concrete `ends_at` names an existing node.
//! 3. Every span `branch` and `parent` is used as some node's `branch`.
//! 4. No two spans declare the same `branch`.
//! 5. A concrete `ends_at` sorts strictly after its `starts_at`.
//! 6. No two spans split (or merge) at the same node.
//!
//! # Failure Modes
//!
//! The first violation, in authoring order, is returned as a
//! [`TimelineError`]. Checks run in the numbered order above, so a span with
//! an unknown start is reported as such even if it is also a duplicate.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Result, TimelineError};
use crate::model::{AuthoredNode, BranchId, BranchSpan};

/// Row order for `nodes`: indices into `nodes`, sorted by `order_index`
/// ascending with unindexed nodes last. Ties keep authoring order.
#[must_use]
pub fn row_order(nodes: &[AuthoredNode]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    // `sort_by_key` is stable, which is what breaks ties.
    order.sort_by_key(|&i| match nodes[i].order_index {
        Some(k) => (0u8, k),
        None => (1u8, 0),
    });
    order
}

/// Validate authored data before building.
pub fn validate(nodes: &[AuthoredNode], spans: &[BranchSpan]) -> Result<()> {
    let mut ids: FxHashSet<&str> = FxHashSet::default();
    for node in nodes {
        if !ids.insert(node.id.as_str()) {
            return Err(TimelineError::DuplicateNode {
                id: node.id.clone(),
            });
        }
    }
    let branches: FxHashSet<&BranchId> = nodes.iter().map(|n| &n.branch).collect();

    for span in spans {
        if !ids.contains(span.starts_at.as_str()) {
            return Err(TimelineError::UnknownStart {
                branch: span.branch.clone(),
                node: span.starts_at.clone(),
            });
        }
        if let Some(end) = span.ends_at.node_id()
            && !ids.contains(end)
        {
            return Err(TimelineError::UnknownEnd {
                branch: span.branch.clone(),
                node: end.to_owned(),
            });
        }
        if !branches.contains(&span.branch) {
            return Err(TimelineError::UnknownBranch {
                branch: span.branch.clone(),
            });
        }
        if !branches.contains(&span.parent) {
            return Err(TimelineError::UnknownParent {
                branch: span.branch.clone(),
                parent: span.parent.clone(),
            });
        }
    }

    let mut declared: FxHashSet<&BranchId> = FxHashSet::default();
    for span in spans {
        if !declared.insert(&span.branch) {
            return Err(TimelineError::DuplicateSpan {
                branch: span.branch.clone(),
            });
        }
    }

    let row_of: FxHashMap<&str, usize> = row_order(nodes)
        .into_iter()
        .enumerate()
        .map(|(row, i)| (nodes[i].id.as_str(), row))
        .collect();

    for span in spans {
        if let Some(end) = span.ends_at.node_id()
            && let Some(&start_row) = row_of.get(span.starts_at.as_str())
            && let Some(&end_row) = row_of.get(end)
            && end_row <= start_row
        {
            return Err(TimelineError::MergeBeforeSplit {
                branch: span.branch.clone(),
                start_row,
                end_row,
            });
        }
    }

    let mut splits: FxHashMap<&str, &BranchId> = FxHashMap::default();
    let mut merges: FxHashMap<&str, &BranchId> = FxHashMap::default();
    for span in spans {
        if let Some(first) = splits.insert(span.starts_at.as_str(), &span.branch) {
            return Err(TimelineError::SplitCollision {
                node: span.starts_at.clone(),
                first: first.clone(),
                second: span.branch.clone(),
            });
        }
        if let Some(end) = span.ends_at.node_id()
            && let Some(first) = merges.insert(end, &span.branch)
        {
            return Err(TimelineError::MergeCollision {
                node: end.to_owned(),
                first: first.clone(),
                second: span.branch.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<AuthoredNode> {
        vec![
            AuthoredNode::new("a", "main", "A").order(1),
            AuthoredNode::new("b", "main", "B").order(2),
            AuthoredNode::new("c", "x", "C").order(3),
            AuthoredNode::new("d", "main", "D").order(4),
        ]
    }

    #[test]
    fn accepts_well_formed_data() {
        let spans = [BranchSpan::closed("x", "main", "b", "c")];
        assert_eq!(validate(&nodes(), &spans), Ok(()));
    }

    #[test]
    fn rejects_unknown_start() {
        let spans = [BranchSpan::closed("x", "main", "zzz", "c")];
        assert!(matches!(
            validate(&nodes(), &spans),
            Err(TimelineError::UnknownStart { .. })
        ));
    }

    #[test]
    fn rejects_unknown_end() {
        let spans = [BranchSpan::closed("x", "main", "b", "zzz")];
        assert!(matches!(
            validate(&nodes(), &spans),
            Err(TimelineError::UnknownEnd { .. })
        ));
    }

    #[test]
    fn open_span_needs_no_end() {
        let spans = [BranchSpan::open("x", "main", "b")];
        assert_eq!(validate(&nodes(), &spans), Ok(()));
    }

    #[test]
    fn rejects_unknown_branch_and_parent() {
        let spans = [BranchSpan::open("y", "main", "b")];
        assert_eq!(
            validate(&nodes(), &spans),
            Err(TimelineError::UnknownBranch { branch: "y".into() })
        );

        let spans = [BranchSpan::open("x", "root", "b")];
        assert_eq!(
            validate(&nodes(), &spans),
            Err(TimelineError::UnknownParent {
                branch: "x".into(),
                parent: "root".into()
            })
        );
    }

    #[test]
    fn rejects_duplicate_span() {
        let spans = [
            BranchSpan::closed("x", "main", "b", "c"),
            BranchSpan::open("x", "main", "a"),
        ];
        assert_eq!(
            validate(&nodes(), &spans),
            Err(TimelineError::DuplicateSpan { branch: "x".into() })
        );
    }

    #[test]
    fn rejects_merge_before_split() {
        let spans = [BranchSpan::closed("x", "main", "c", "b")];
        assert_eq!(
            validate(&nodes(), &spans),
            Err(TimelineError::MergeBeforeSplit {
                branch: "x".into(),
                start_row: 2,
                end_row: 1
            })
        );
    }

    #[test]
    fn rejects_merge_on_split_row() {
        let spans = [BranchSpan::closed("x", "main", "b", "b")];
        assert!(matches!(
            validate(&nodes(), &spans),
            Err(TimelineError::MergeBeforeSplit { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_node_id() {
        let mut n = nodes();
        n.push(AuthoredNode::new("a", "main", "again"));
        assert_eq!(
            validate(&n, &[]),
            Err(TimelineError::DuplicateNode { id: "a".into() })
        );
    }

    #[test]
    fn rejects_two_splits_on_one_node() {
        let mut n = nodes();
        n.push(AuthoredNode::new("e", "y", "E").order(5));
        let spans = [
            BranchSpan::closed("x", "main", "b", "c"),
            BranchSpan::open("y", "main", "b"),
        ];
        assert!(matches!(
            validate(&n, &spans),
            Err(TimelineError::SplitCollision { .. })
        ));
    }

    #[test]
    fn row_order_puts_unindexed_last_and_keeps_ties_stable() {
        let n = vec![
            AuthoredNode::new("late", "main", "L"),
            AuthoredNode::new("two", "main", "2").order(2),
            AuthoredNode::new("one-a", "main", "1a").order(1),
            AuthoredNode::new("later", "main", "LL"),
            AuthoredNode::new("one-b", "main", "1b").order(1),
        ];
        let ids: Vec<&str> = row_order(&n).into_iter().map(|i| n[i].id.as_str()).collect();
        assert_eq!(ids, ["one-a", "one-b", "two", "late", "later"]);
    }
}
