#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

use crate::model::BranchId;

pub type Result<T> = std::result::Result<T, TimelineError>;

/// Authored-data integrity violations.
///
/// These are configuration errors: they indicate a bug in the timeline data
/// and halt construction rather than yielding a partial layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    #[error("node id defined more than once: {id}")]
    DuplicateNode { id: String },

    #[error("span {branch} startsAt not found: {node}")]
    UnknownStart { branch: BranchId, node: String },

    #[error("span {branch} endsAt not found: {node}")]
    UnknownEnd { branch: BranchId, node: String },

    #[error("span branch not present in nodes: {branch}")]
    UnknownBranch { branch: BranchId },

    #[error("span {branch} parent not present in nodes: {parent}")]
    UnknownParent { branch: BranchId, parent: BranchId },

    #[error("branch {branch} defined more than once in spans")]
    DuplicateSpan { branch: BranchId },

    #[error("merge must appear after split for {branch} (split row {start_row}, merge row {end_row})")]
    MergeBeforeSplit {
        branch: BranchId,
        start_row: usize,
        end_row: usize,
    },

    #[error("branches {first} and {second} both split at node {node}")]
    SplitCollision {
        node: String,
        first: BranchId,
        second: BranchId,
    },

    #[error("branches {first} and {second} both merge at node {node}")]
    MergeCollision {
        node: String,
        first: BranchId,
        second: BranchId,
    },

    #[error("branch has no column in the branch order: {branch}")]
    UnknownColumn { branch: BranchId },

    #[error("invalid hex color for {branch}: {value}")]
    InvalidColor { branch: BranchId, value: String },
}

/// Errors that can occur when loading configuration or authored content.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
