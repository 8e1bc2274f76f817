#![forbid(unsafe_code)]

//! Authored nodes + branch spans → rows and vertical segments.
//!
//! # Pipeline
//!
//! 1. [`validate`] the authored data; any violation aborts the build.
//! 2. Sort nodes into rows ([`row_order`]): `order_index` ascending,
//!    unindexed nodes last, ties in authoring order.
//! 3. Apply each span: mark the split row, and the merge row for closed
//!    spans. Open spans never get a merge marker; their
//!    [`ResolvedSpan::end_row`] records the last row that still references
//!    the branch.
//! 4. Walk the rows once, folding a list of open branches, and emit one
//!    [`Segment`] per span. Branches still open after the walk are drawn
//!    down to the final row.
//!
//! # Invariants
//!
//! 1. `rows.len() == nodes.len()`.
//! 2. Each span marks exactly one split row; closed spans mark exactly one
//!    strictly later merge row; open spans mark none.
//! 3. `segments.len() == spans.len()` and every `height >= 0`.
//! 4. An open span's segment ends at the final row, whatever its last
//!    referencing row is.
//! 5. Output is a pure function of the input.

use rustc_hash::FxHashMap;

use crate::error::{Result, TimelineError};
use crate::geometry::Grid;
use crate::model::{
    AuthoredNode, BranchId, BranchLink, BranchSpan, BuiltTimeline, ResolvedSpan, Segment,
    TimelineRow,
};
use crate::validate::{row_order, validate};

/// Build with the default grid metrics.
pub fn build(nodes: &[AuthoredNode], spans: &[BranchSpan]) -> Result<BuiltTimeline> {
    build_with(&Grid::default(), nodes, spans)
}

/// Build, computing segment pixel extents with `grid`.
pub fn build_with(
    grid: &Grid,
    nodes: &[AuthoredNode],
    spans: &[BranchSpan],
) -> Result<BuiltTimeline> {
    validate(nodes, spans)?;

    let mut rows: Vec<TimelineRow> = row_order(nodes)
        .into_iter()
        .map(|i| {
            let n = &nodes[i];
            TimelineRow {
                id: n.id.clone(),
                node: n.branch.clone(),
                message: n.title.clone(),
                split: None,
                merge: None,
            }
        })
        .collect();

    let index_by_id: FxHashMap<String, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.clone(), i))
        .collect();

    let mut resolved = Vec::with_capacity(spans.len());
    for span in spans {
        resolved.push(apply_span(&mut rows, &index_by_id, span)?);
    }

    let segments = derive_segments(grid, &rows, resolved.len());

    tracing::debug!(
        rows = rows.len(),
        spans = resolved.len(),
        segments = segments.len(),
        "timeline built"
    );

    Ok(BuiltTimeline {
        rows,
        segments,
        spans: resolved,
        index_by_id,
    })
}

fn apply_span(
    rows: &mut [TimelineRow],
    index_by_id: &FxHashMap<String, usize>,
    span: &BranchSpan,
) -> Result<ResolvedSpan> {
    let start_row =
        index_by_id
            .get(&span.starts_at)
            .copied()
            .ok_or_else(|| TimelineError::UnknownStart {
                branch: span.branch.clone(),
                node: span.starts_at.clone(),
            })?;
    let link = BranchLink {
        branch: span.branch.clone(),
        parent: span.parent.clone(),
    };
    rows[start_row].split = Some(link.clone());

    let (end_row, open) = match span.ends_at.node_id() {
        Some(end) => {
            let end_row =
                index_by_id
                    .get(end)
                    .copied()
                    .ok_or_else(|| TimelineError::UnknownEnd {
                        branch: span.branch.clone(),
                        node: end.to_owned(),
                    })?;
            if end_row <= start_row {
                return Err(TimelineError::MergeBeforeSplit {
                    branch: span.branch.clone(),
                    start_row,
                    end_row,
                });
            }
            rows[end_row].merge = Some(link);
            (end_row, false)
        }
        None => {
            // The split row itself references the branch, so the scan
            // always lands at or after `start_row`.
            let last = last_reference(rows, &span.branch).unwrap_or(rows.len() - 1);
            (last.max(start_row), true)
        }
    };

    Ok(ResolvedSpan {
        branch: span.branch.clone(),
        parent: span.parent.clone(),
        start_row,
        end_row,
        open,
    })
}

/// Last row whose node, split or merge is `branch`.
fn last_reference(rows: &[TimelineRow], branch: &BranchId) -> Option<usize> {
    rows.iter().rposition(|r| r.references(branch))
}

fn derive_segments(grid: &Grid, rows: &[TimelineRow], span_count: usize) -> Vec<Segment> {
    let (mut segments, still_open) = rows.iter().enumerate().fold(
        (Vec::with_capacity(span_count), Vec::<(&BranchId, usize)>::new()),
        |(mut segments, mut started), (i, row)| {
            if let Some(b) = row.split_branch() {
                started.push((b, i));
            }
            if let Some(b) = row.merge_branch()
                && let Some(pos) = started.iter().position(|(s, _)| *s == b)
            {
                let (_, start) = started.remove(pos);
                segments.push(segment(grid, rows, b, start, i));
            }
            (segments, started)
        },
    );

    // Open branches continue past the data: draw them to the final row.
    let last = rows.len().saturating_sub(1);
    for (branch, start) in still_open {
        segments.push(segment(grid, rows, branch, start, last));
    }
    segments
}

fn segment(grid: &Grid, rows: &[TimelineRow], branch: &BranchId, start: usize, end: usize) -> Segment {
    let start_y = grid.node_center_y(start, branch, &rows[start]);
    let end_y = grid.node_center_y(end, branch, &rows[end]);
    let top = start_y + grid.node_r;
    Segment {
        branch: branch.clone(),
        top,
        height: (end_y - grid.node_r - top).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{NODE_R, OFFSET, row_baseline_y};
    use pretty_assertions::assert_eq;

    fn abcd() -> Vec<AuthoredNode> {
        vec![
            AuthoredNode::new("a", "main", "A").order(1),
            AuthoredNode::new("b", "main", "B").order(2),
            AuthoredNode::new("c", "x", "C").order(3),
            AuthoredNode::new("d", "main", "D").order(4),
        ]
    }

    #[test]
    fn closed_span_marks_split_and_merge() {
        let grid = Grid::with_order(["main", "x"]);
        let built = build_with(&grid, &abcd(), &[BranchSpan::closed("x", "main", "b", "c")]).unwrap();

        assert_eq!(built.rows.len(), 4);
        assert_eq!(built.rows[1].split_branch(), Some(&BranchId::from("x")));
        assert_eq!(built.rows[1].parent(), Some(&BranchId::from("main")));
        assert_eq!(built.rows[2].merge_branch(), Some(&BranchId::from("x")));
        assert_eq!(built.rows[2].parent(), Some(&BranchId::from("main")));

        let top = grid.node_center_y(1, &"x".into(), &built.rows[1]) + NODE_R;
        assert_eq!(top, row_baseline_y(1) + OFFSET + NODE_R);
        let end_y = row_baseline_y(2) - OFFSET;
        assert_eq!(
            built.segments,
            vec![Segment {
                branch: "x".into(),
                top,
                height: end_y - NODE_R - top,
            }]
        );
    }

    #[test]
    fn open_span_ends_at_last_reference_without_merge() {
        let mut nodes: Vec<AuthoredNode> = (0..10)
            .map(|i| AuthoredNode::new(format!("n{i}"), "main", format!("N{i}")).order(i))
            .collect();
        for i in 6..=9 {
            nodes[i].branch = "work".into();
        }
        let spans = [BranchSpan::open("work", "main", "n5")];
        let built = build(&nodes, &spans).unwrap();

        assert!(built.rows.iter().all(|r| r.merge.is_none()));
        assert_eq!(
            built.spans,
            vec![ResolvedSpan {
                branch: "work".into(),
                parent: "main".into(),
                start_row: 5,
                end_row: 9,
                open: true,
            }]
        );
        let seg = &built.segments[0];
        assert_eq!(seg.top, row_baseline_y(5) + OFFSET + NODE_R);
        assert_eq!(seg.height, row_baseline_y(9) - NODE_R - seg.top);
    }

    #[test]
    fn open_span_line_runs_past_trailing_rows_on_other_branches() {
        let nodes = vec![
            AuthoredNode::new("s", "main", "split").order(1),
            AuthoredNode::new("w", "work", "job").order(2),
            AuthoredNode::new("m1", "main", "meta").order(3),
            AuthoredNode::new("m2", "main", "later").order(4),
        ];
        let built = build(&nodes, &[BranchSpan::open("work", "main", "s")]).unwrap();

        // The resolved span still records where the branch was last seen.
        assert_eq!(built.spans[0].end_row, 1);

        let seg = &built.segments[0];
        assert_eq!(seg.top, row_baseline_y(0) + OFFSET + NODE_R);
        assert_eq!(seg.height, row_baseline_y(3) - NODE_R - seg.top);
        assert_eq!(seg.height, 318.0);
    }

    #[test]
    fn open_span_split_on_final_row_has_zero_height() {
        let nodes = vec![
            AuthoredNode::new("w", "work", "early").order(1),
            AuthoredNode::new("s", "main", "split").order(2),
        ];
        let built = build(&nodes, &[BranchSpan::open("work", "main", "s")]).unwrap();
        assert_eq!(built.spans[0].end_row, 1);
        assert_eq!(built.segments[0].height, 0.0);
    }

    #[test]
    fn rows_follow_order_index_then_authoring_order() {
        let nodes = vec![
            AuthoredNode::new("z", "main", "no index"),
            AuthoredNode::new("b", "main", "B").order(2),
            AuthoredNode::new("a", "main", "A").order(1),
        ];
        let built = build(&nodes, &[]).unwrap();
        let ids: Vec<&str> = built.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "z"]);
        assert_eq!(built.row_of("z"), Some(2));
        assert_eq!(built.rows[0].message, "A");
        assert!(built.segments.is_empty());
    }

    #[test]
    fn row_holding_split_and_merge_keeps_both_parents() {
        let nodes = vec![
            AuthoredNode::new("a", "main", "A").order(1),
            AuthoredNode::new("b", "school", "B").order(2),
            AuthoredNode::new("c", "school", "C").order(3),
            AuthoredNode::new("d", "work", "D").order(4),
        ];
        let spans = [
            BranchSpan::closed("school", "main", "a", "c"),
            BranchSpan::open("work", "school", "c"),
        ];
        let built = build(&nodes, &spans).unwrap();
        let row = &built.rows[2];
        assert_eq!(row.merge.as_ref().map(|l| l.parent.as_str()), Some("main"));
        assert_eq!(row.split.as_ref().map(|l| l.parent.as_str()), Some("school"));
        assert_eq!(built.segments.len(), 2);
        assert_eq!(built.segments[0].branch, "school");
        assert_eq!(built.segments[1].branch, "work");
    }

    #[test]
    fn row_nodes_dedupes_own_branch() {
        let nodes = vec![
            AuthoredNode::new("a", "main", "A").order(1),
            AuthoredNode::new("b", "work", "B").order(2),
        ];
        let built = build(&nodes, &[BranchSpan::open("work", "main", "a")]).unwrap();
        let keys = built.row_nodes(0);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].branch, "main");
        assert_eq!(keys[1].branch, "work");
        assert_eq!(built.row_nodes(1).len(), 1);
        assert!(built.row_nodes(5).is_empty());
        assert_eq!(built.all_node_keys().len(), 3);
    }

    #[test]
    fn invalid_data_aborts_build() {
        let err = build(&abcd(), &[BranchSpan::closed("x", "main", "b", "missing")]).unwrap_err();
        assert!(matches!(err, TimelineError::UnknownEnd { .. }));
    }

    #[test]
    fn build_is_deterministic() {
        let spans = [BranchSpan::closed("x", "main", "b", "c")];
        assert_eq!(build(&abcd(), &spans), build(&abcd(), &spans));
    }
}
