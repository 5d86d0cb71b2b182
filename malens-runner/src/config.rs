//! TOML analysis configuration.
//!
//! Every field is optional; an empty file yields the dashboard defaults:
//!
//! ```toml
//! profile = "balanced"
//! timezone_offset_hours = 8
//! coin = "bitcoin"
//!
//! [[lines]]
//! window = 50
//! color = "#FF6B6B"
//! label = "MA50"
//!
//! [thresholds]
//! band_edge = "inclusive"
//! congestion_bands = [2.0, 4.0, 8.0]
//!
//! [labels]
//! "slope.flat" = "Sideways"
//! ```

use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use malens_core::domain::{MaLine, MaLineTable, WindowError};
use malens_core::profile::{BandEdge, Labels, ProfileError, ProfileId, SignalProfile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid MA lines: {0}")]
    Lines(#[from] WindowError),

    #[error("invalid signal profile: {0}")]
    Profile(#[from] ProfileError),

    #[error("timezone offset {0}h is out of range (-23..=23)")]
    TimezoneOffset(i32),
}

/// Field-by-field overrides on top of a built-in profile's thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdOverrides {
    pub short_window: Option<usize>,
    pub long_window: Option<usize>,
    pub key_window: Option<usize>,
    pub congestion_bands: Option<[f64; 3]>,
    pub band_edge: Option<BandEdge>,
    pub slope_strong_pct: Option<f64>,
    pub slope_flat_pct: Option<f64>,
    pub key_level_tolerance_pct: Option<f64>,
    pub far_deviation_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub profile: ProfileId,
    /// Moving-average lines; the dashboard's six lines when omitted.
    pub lines: Option<Vec<MaLine>>,
    pub thresholds: ThresholdOverrides,
    pub labels: Labels,
    /// Offset of the calendar used to pick "yesterday" for the updater.
    pub timezone_offset_hours: i32,
    pub coin: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            profile: ProfileId::default(),
            lines: None,
            thresholds: ThresholdOverrides::default(),
            labels: Labels::default(),
            timezone_offset_hours: 8,
            coin: "bitcoin".to_string(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn line_table(&self) -> Result<MaLineTable, ConfigError> {
        match &self.lines {
            Some(lines) => Ok(MaLineTable::new(lines.clone())?),
            None => Ok(MaLineTable::default()),
        }
    }

    /// The selected built-in profile with threshold and label overrides applied.
    pub fn signal_profile(&self) -> Result<SignalProfile, ConfigError> {
        let mut profile = self.profile.profile();
        let t = &mut profile.thresholds;
        let o = &self.thresholds;
        if o.short_window.is_some() {
            t.short_window = o.short_window;
        }
        if o.long_window.is_some() {
            t.long_window = o.long_window;
        }
        if o.key_window.is_some() {
            t.key_window = o.key_window;
        }
        if let Some(v) = o.congestion_bands {
            t.congestion_bands = v;
        }
        if let Some(v) = o.band_edge {
            t.band_edge = v;
        }
        if let Some(v) = o.slope_strong_pct {
            t.slope_strong_pct = v;
        }
        if let Some(v) = o.slope_flat_pct {
            t.slope_flat_pct = v;
        }
        if let Some(v) = o.key_level_tolerance_pct {
            t.key_level_tolerance_pct = v;
        }
        if let Some(v) = o.far_deviation_pct {
            t.far_deviation_pct = v;
        }
        profile.labels.merge(&self.labels);
        profile.validate()?;
        Ok(profile)
    }

    pub fn timezone(&self) -> Result<FixedOffset, ConfigError> {
        if !(-23..=23).contains(&self.timezone_offset_hours) {
            return Err(ConfigError::TimezoneOffset(self.timezone_offset_hours));
        }
        FixedOffset::east_opt(self.timezone_offset_hours * 3600)
            .ok_or(ConfigError::TimezoneOffset(self.timezone_offset_hours))
    }
}
