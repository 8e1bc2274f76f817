#![forbid(unsafe_code)]

//! Page-level configuration: layout plus tracker and fade tuning.
//!
//! ```toml
//! [grid]
//! col_w = 96.0
//!
//! [tracker]
//! start_fraction = 0.25
//!
//! [cue]
//! fade_start = 0.5
//! fade_end = 0.7
//! ```
//!
//! Every section is optional and falls back to its default.

use folio_timeline::{BranchPalette, ConfigFile, Grid, LayoutConfig};
use serde::{Deserialize, Serialize};

use crate::cue::CueConfig;
use crate::sections::SectionFade;
use crate::tracker::TrackerConfig;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub grid: Grid,
    pub palette: BranchPalette,
    pub tracker: TrackerConfig,
    pub cue: CueConfig,
    pub sections: SectionFade,
}

impl FolioConfig {
    /// The layout half of the configuration.
    #[must_use]
    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            grid: self.grid.clone(),
            palette: self.palette.clone(),
        }
    }
}

impl ConfigFile for FolioConfig {
    fn validate(&self) -> Vec<String> {
        let mut errors = self.layout().validate();
        errors.extend(self.tracker.validate());
        errors.extend(self.cue.validate());
        errors.extend(self.sections.validate());
        errors
    }
}
