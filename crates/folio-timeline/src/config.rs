#![forbid(unsafe_code)]

//! Configuration and authored content loading.
//!
//! Two documents are loaded from TOML or JSON:
//!
//! - [`TimelineDocument`]: the authored nodes, spans and details.
//! - [`LayoutConfig`]: grid metrics, column order and branch palette.
//!
//! ```toml
//! # timeline.toml
//! [[nodes]]
//! id = "start-college"
//! kind = "split"
//! branch = "main"
//! title = "Start college"
//! order_index = 3
//!
//! [[spans]]
//! branch = "school"
//! parent = "main"
//! starts_at = "start-college"
//! ends_at = "graduation"
//!
//! [details.d_start_college]
//! title = "College begins"
//! ```
//!
//! ```rust,ignore
//! let doc = TimelineDocument::from_toml_file("timeline.toml")?;
//! let layout = LayoutConfig::from_toml_str(&layout_src)?;
//! let built = doc.build(&layout.grid)?;
//! ```
//!
//! # Defaults
//!
//! Every field of [`LayoutConfig`] defaults to the built-in constants, so an
//! empty file yields `LayoutConfig::default()`.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::builder::build_with;
use crate::details::{Details, DetailsMap};
use crate::error::{ConfigError, TimelineError};
use crate::geometry::Grid;
use crate::model::{AuthoredNode, BranchSpan, BuiltTimeline};
use crate::palette::BranchPalette;
use crate::validate::validate;

// ---------------------------------------------------------------------------
// Loader trait
// ---------------------------------------------------------------------------

/// A document that can be loaded from TOML or JSON and then checked.
///
/// Loaders fail with [`ConfigError::Validation`] when [`ConfigFile::validate`]
/// reports anything.
pub trait ConfigFile: DeserializeOwned {
    /// Range and consistency checks. An empty list means the value is usable.
    fn validate(&self) -> Vec<String> {
        Vec::new()
    }

    /// Run [`ConfigFile::validate`] and turn findings into an error.
    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            tracing::warn!(count = errors.len(), "configuration rejected");
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load from a TOML string.
    fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let value: Self = toml::from_str(s)?;
        value.checked()
    }

    /// Load from a TOML file on disk.
    fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path.as_ref())?)
    }

    /// Load from a JSON string.
    fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let value: Self = serde_json::from_str(s)?;
        value.checked()
    }

    /// Load from a JSON file on disk.
    fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read(path.as_ref())?)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    tracing::debug!(path = %path.display(), "reading configuration");
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// TimelineDocument
// ---------------------------------------------------------------------------

/// Authored timeline content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimelineDocument {
    pub nodes: Vec<AuthoredNode>,
    #[serde(default)]
    pub spans: Vec<BranchSpan>,
    #[serde(default)]
    pub details: DetailsMap,
}

impl TimelineDocument {
    /// Validate and build rows/segments.
    pub fn build(&self, grid: &Grid) -> Result<BuiltTimeline, TimelineError> {
        build_with(grid, &self.nodes, &self.spans)
    }

    /// Details for the node with `id`, if it has any.
    #[must_use]
    pub fn details_for(&self, id: &str) -> Option<&Details> {
        let node = self.nodes.iter().find(|n| n.id == id)?;
        self.details.get(node.details_ref.as_deref()?)
    }
}

impl ConfigFile for TimelineDocument {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Err(e) = validate(&self.nodes, &self.spans) {
            errors.push(e.to_string());
        }
        for node in &self.nodes {
            if let Some(key) = &node.details_ref
                && !self.details.contains_key(key)
            {
                errors.push(format!("node {} details_ref not found: {key}", node.id));
            }
        }
        errors
    }
}

// ---------------------------------------------------------------------------
// LayoutConfig
// ---------------------------------------------------------------------------

/// Grid metrics and colors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub grid: Grid,
    pub palette: BranchPalette,
}

impl ConfigFile for LayoutConfig {
    fn validate(&self) -> Vec<String> {
        let mut errors = self.grid.validate();
        if let Err(e) = self.palette.check() {
            errors.push(e.to_string());
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
[[nodes]]
id = "a"
branch = "main"
title = "A"
order_index = 1
details_ref = "d_a"

[[nodes]]
id = "b"
kind = "split"
branch = "main"
title = "B"
order_index = 2

[[nodes]]
id = "c"
branch = "work"
title = "C"
order_index = 3

[[spans]]
branch = "work"
parent = "main"
starts_at = "b"
ends_at = "__END__"

[details.d_a]
title = "Roots"
bullets = ["one", "two"]
"#;

    #[test]
    fn document_loads_from_toml() {
        let doc = TimelineDocument::from_toml_str(DOC).unwrap();
        assert_eq!(doc.nodes.len(), 3);
        assert!(doc.spans[0].ends_at.is_open());
        assert_eq!(doc.details_for("a").map(|d| d.title.as_str()), Some("Roots"));
        assert_eq!(doc.details_for("b"), None);

        let built = doc.build(&Grid::default()).unwrap();
        assert_eq!(built.segments.len(), 1);
    }

    #[test]
    fn document_round_trips_through_json() {
        let doc = TimelineDocument::from_toml_str(DOC).unwrap();
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(TimelineDocument::from_json_str(&json).unwrap(), doc);
    }

    #[test]
    fn dangling_details_ref_is_rejected() {
        let src = DOC.replace("details_ref = \"d_a\"", "details_ref = \"d_missing\"");
        let err = TimelineDocument::from_toml_str(&src).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
    }

    #[test]
    fn integrity_errors_surface_as_validation() {
        let src = DOC.replace("starts_at = \"b\"", "starts_at = \"nope\"");
        match TimelineDocument::from_toml_str(&src) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors, ["span work startsAt not found: nope"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_layout_is_default() {
        assert_eq!(LayoutConfig::from_toml_str("").unwrap(), LayoutConfig::default());
    }

    #[test]
    fn layout_overrides_merge_with_defaults() {
        let cfg = LayoutConfig::from_toml_str(
            r#"
[grid]
col_w = 96.0
branch_order = ["main", "work"]
"#,
        )
        .unwrap();
        assert_eq!(cfg.grid.col_w, 96.0);
        assert_eq!(cfg.grid.row_h, crate::geometry::ROW_H);
        assert_eq!(cfg.grid.column_center_x(&"work".into()), Some(144.0));
    }

    #[test]
    fn bad_layout_is_rejected() {
        let err = LayoutConfig::from_toml_str("[grid]\nrow_h = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = TimelineDocument::from_toml_file("/nonexistent/folio.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/folio.toml"));
    }
}
