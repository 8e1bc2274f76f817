#![forbid(unsafe_code)]

//! Branch colors.
//!
//! The palette is ordered; its order is also the default column order of
//! [`crate::geometry::Grid`]. Inactive branches are drawn at 20% alpha.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelineError};
use crate::model::BranchId;

/// Default left-to-right branch order.
pub const DEFAULT_BRANCH_ORDER: [&str; 4] = ["main", "school", "work", "edu"];

/// Alpha used for branches that are not currently highlighted.
pub const IDLE_ALPHA: f64 = 0.2;

/// One palette entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchColor {
    pub branch: BranchId,
    /// `#rrggbb`.
    pub color: String,
}

/// Ordered branch → hex color table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchPalette {
    entries: Vec<BranchColor>,
}

impl Default for BranchPalette {
    fn default() -> Self {
        let colors = ["#3b82f6", "#ef4444", "#eab308", "#22c55e"];
        Self {
            entries: DEFAULT_BRANCH_ORDER
                .iter()
                .zip(colors)
                .map(|(b, c)| BranchColor {
                    branch: BranchId::from(*b),
                    color: c.to_owned(),
                })
                .collect(),
        }
    }
}

impl BranchPalette {
    #[must_use]
    pub fn new(entries: Vec<BranchColor>) -> Self {
        Self { entries }
    }

    /// Branches in palette order.
    pub fn order(&self) -> impl Iterator<Item = &BranchId> {
        self.entries.iter().map(|e| &e.branch)
    }

    /// Full tint for an active branch.
    #[must_use]
    pub fn bright_color(&self, branch: &BranchId) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| &e.branch == branch)
            .map(|e| e.color.as_str())
    }

    /// Dimmed `rgba(...)` for an inactive branch.
    pub fn idle_color(&self, branch: &BranchId) -> Result<Option<String>> {
        self.bright_color(branch)
            .map(|hex| with_alpha(branch, hex, IDLE_ALPHA))
            .transpose()
    }

    /// Check that every entry parses.
    pub fn check(&self) -> Result<()> {
        for e in &self.entries {
            parse_hex(&e.branch, &e.color)?;
        }
        Ok(())
    }
}

/// `#rrggbb` → `rgba(r, g, b, a)`.
pub fn with_alpha(branch: &BranchId, hex: &str, alpha: f64) -> Result<String> {
    let (r, g, b) = parse_hex(branch, hex)?;
    Ok(format!("rgba({r}, {g}, {b}, {alpha})"))
}

fn parse_hex(branch: &BranchId, hex: &str) -> Result<(u8, u8, u8)> {
    let invalid = || TimelineError::InvalidColor {
        branch: branch.clone(),
        value: hex.to_owned(),
    };
    let clean = hex.strip_prefix('#').unwrap_or(hex);
    if clean.len() != 6 || !clean.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&clean[i..i + 2], 16).map_err(|_| invalid());
    Ok((channel(0)?, channel(2)?, channel(4)?))
}
