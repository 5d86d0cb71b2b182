//! Signal profiles: threshold and label sets for the trend-signal analyzer.
//!
//! Four named profiles tune the same rule engine differently:
//! - **Balanced**: default bands and tolerances
//! - **Conservative**: tighter congestion bands, slower slope grading
//! - **Aggressive**: wider bands, reacts to small slopes
//! - **LongHorizon**: pairs the 200/1400-day lines and grades on the long line
//!
//! None of the numbers encode a validated trading strategy; they are starting
//! points that a config file can override field by field.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Built-in profile selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProfileId {
    #[default]
    Balanced,
    Conservative,
    Aggressive,
    LongHorizon,
}

impl ProfileId {
    pub const ALL: [ProfileId; 4] = [
        ProfileId::Balanced,
        ProfileId::Conservative,
        ProfileId::Aggressive,
        ProfileId::LongHorizon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Conservative => "conservative",
            Self::Aggressive => "aggressive",
            Self::LongHorizon => "long_horizon",
        }
    }

    /// The full built-in profile for this id.
    pub fn profile(&self) -> SignalProfile {
        SignalProfile {
            id: *self,
            thresholds: self.thresholds(),
            labels: self.labels(),
        }
    }

    fn thresholds(&self) -> Thresholds {
        match self {
            Self::Balanced => Thresholds::default(),
            Self::Conservative => Thresholds {
                congestion_bands: [2.0, 4.0, 8.0],
                slope_strong_pct: 0.8,
                slope_flat_pct: 0.15,
                key_level_tolerance_pct: 1.5,
                far_deviation_pct: 30.0,
                ..Thresholds::default()
            },
            Self::Aggressive => Thresholds {
                congestion_bands: [4.0, 6.0, 12.0],
                slope_strong_pct: 0.3,
                slope_flat_pct: 0.05,
                key_level_tolerance_pct: 3.0,
                far_deviation_pct: 15.0,
                ..Thresholds::default()
            },
            Self::LongHorizon => Thresholds {
                short_window: Some(200),
                long_window: Some(1400),
                key_window: Some(1400),
                congestion_bands: [5.0, 10.0, 20.0],
                slope_strong_pct: 0.2,
                slope_flat_pct: 0.02,
                key_level_tolerance_pct: 2.0,
                far_deviation_pct: 50.0,
                ..Thresholds::default()
            },
        }
    }

    fn labels(&self) -> Labels {
        let mut labels = Labels::english();
        match self {
            Self::Balanced => {}
            Self::Conservative => {
                labels.set("position.range_bound", "Mixed: price inside the MA band");
                labels.set("slope.flat", "Trend stalled");
            }
            Self::Aggressive => {
                labels.set("crossover.golden", "Golden cross: momentum entry");
                labels.set("crossover.death", "Death cross: momentum exit");
            }
            Self::LongHorizon => {
                labels.set("proximity.at_key_level", "Testing the long-term base line");
                labels.set("proximity.far_above", "Far above the long-term base line");
                labels.set("proximity.far_below", "Far below the long-term base line");
            }
        }
        labels
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileId {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == key)
            .ok_or_else(|| ProfileError::UnknownProfile(s.to_string()))
    }
}

/// How a value lying exactly on a congestion band edge is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BandEdge {
    /// `range < edge` falls in the tighter band; the edge itself belongs to the wider one.
    #[default]
    Exclusive,
    /// `range <= edge` falls in the tighter band.
    Inclusive,
}

impl BandEdge {
    pub fn within(&self, value: f64, edge: f64) -> bool {
        match self {
            Self::Exclusive => value < edge,
            Self::Inclusive => value <= edge,
        }
    }
}

/// Numeric thresholds for every classifier. All percentages are in percent units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Short window of the cross pair. Shortest configured window if unset.
    pub short_window: Option<usize>,
    /// Long window of the cross pair. Longest configured window if unset.
    pub long_window: Option<usize>,
    /// Reference window for key-level proximity. Longest configured window if unset.
    pub key_window: Option<usize>,
    /// Ascending edges: extreme-dense | dense | dispersed | highly-dispersed.
    pub congestion_bands: [f64; 3],
    pub band_edge: BandEdge,
    pub slope_strong_pct: f64,
    pub slope_flat_pct: f64,
    pub key_level_tolerance_pct: f64,
    pub far_deviation_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            short_window: None,
            long_window: None,
            key_window: None,
            congestion_bands: [3.0, 5.0, 10.0],
            band_edge: BandEdge::Exclusive,
            slope_strong_pct: 0.5,
            slope_flat_pct: 0.1,
            key_level_tolerance_pct: 2.0,
            far_deviation_pct: 20.0,
        }
    }
}

/// Display text per category code. Codes missing from the map render as the code itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(BTreeMap<String, String>);

impl Labels {
    pub fn english() -> Self {
        let pairs = [
            ("insufficient_data", "Loading / insufficient data"),
            ("undefined", "Undefined"),
            ("cross.bullish", "Bullish: short MA above long MA"),
            ("cross.bearish", "Bearish: short MA below long MA"),
            ("position.strong_up", "Strong uptrend: price above all MAs"),
            ("position.strong_down", "Strong downtrend: price below all MAs"),
            ("position.range_bound", "Range-bound"),
            ("alignment.bullish", "Bullish alignment"),
            ("alignment.bearish", "Bearish alignment"),
            ("alignment.none", "No clear alignment"),
            ("congestion.extreme_dense", "MAs extremely converged: breakout likely"),
            ("congestion.dense", "MAs converging"),
            ("congestion.dispersed", "MAs dispersed"),
            ("congestion.highly_dispersed", "MAs highly dispersed"),
            ("slope.strong_up", "Strongly rising"),
            ("slope.strong_down", "Strongly falling"),
            ("slope.flat", "Flat"),
            ("slope.moderate_up", "Gently rising"),
            ("slope.moderate_down", "Gently falling"),
            ("crossover.golden", "Golden cross"),
            ("crossover.death", "Death cross"),
            ("crossover.none", "No crossover"),
            ("proximity.far_above", "Far above the long-term MA"),
            ("proximity.far_below", "Far below the long-term MA"),
            ("proximity.at_key_level", "At the key long-term level"),
            ("proximity.moderate", "Moderate distance from the long-term MA"),
        ];
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn set(&mut self, code: impl Into<String>, text: impl Into<String>) {
        self.0.insert(code.into(), text.into());
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.0.get(code).map(String::as_str)
    }

    /// Text for a code, or the code itself.
    pub fn text<'a>(&'a self, code: &'a str) -> &'a str {
        self.get(code).unwrap_or(code)
    }

    /// Overlay `other` on top of `self`.
    pub fn merge(&mut self, other: &Labels) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("unknown profile '{0}' (expected one of: balanced, conservative, aggressive, long_horizon)")]
    UnknownProfile(String),

    #[error("congestion bands must be finite and strictly ascending, got {0:?}")]
    BandsNotAscending([f64; 3]),

    #[error("{name} must be a finite, non-negative percentage, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("slope_flat_pct ({flat}) must not exceed slope_strong_pct ({strong})")]
    SlopeOrder { flat: f64, strong: f64 },

    #[error("key_level_tolerance_pct ({tolerance}) must be below far_deviation_pct ({far})")]
    DeviationOrder { tolerance: f64, far: f64 },

    #[error("{name} must be at least 1")]
    ZeroWindow { name: &'static str },

    #[error("short_window ({short}) must be below long_window ({long})")]
    PairOrder { short: usize, long: usize },
}

/// Thresholds plus labels, evaluated by one rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalProfile {
    pub id: ProfileId,
    pub thresholds: Thresholds,
    pub labels: Labels,
}

impl SignalProfile {
    pub fn validate(&self) -> Result<(), ProfileError> {
        let t = &self.thresholds;
        let [a, b, c] = t.congestion_bands;
        if !(a.is_finite() && b.is_finite() && c.is_finite() && a >= 0.0 && a < b && b < c) {
            return Err(ProfileError::BandsNotAscending(t.congestion_bands));
        }
        for (name, value) in [
            ("slope_strong_pct", t.slope_strong_pct),
            ("slope_flat_pct", t.slope_flat_pct),
            ("key_level_tolerance_pct", t.key_level_tolerance_pct),
            ("far_deviation_pct", t.far_deviation_pct),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ProfileError::InvalidThreshold { name, value });
            }
        }
        if t.slope_flat_pct > t.slope_strong_pct {
            return Err(ProfileError::SlopeOrder {
                flat: t.slope_flat_pct,
                strong: t.slope_strong_pct,
            });
        }
        if t.key_level_tolerance_pct >= t.far_deviation_pct {
            return Err(ProfileError::DeviationOrder {
                tolerance: t.key_level_tolerance_pct,
                far: t.far_deviation_pct,
            });
        }
        for (name, window) in [
            ("short_window", t.short_window),
            ("long_window", t.long_window),
            ("key_window", t.key_window),
        ] {
            if window == Some(0) {
                return Err(ProfileError::ZeroWindow { name });
            }
        }
        if let (Some(short), Some(long)) = (t.short_window, t.long_window) {
            if short >= long {
                return Err(ProfileError::PairOrder { short, long });
            }
        }
        Ok(())
    }
}

impl Default for SignalProfile {
    fn default() -> Self {
        ProfileId::Balanced.profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles_are_valid() {
        for id in ProfileId::ALL {
            let profile = id.profile();
            assert_eq!(profile.id, id);
            profile.validate().unwrap();
        }
    }

    #[test]
    fn profile_id_round_trips_through_str() {
        for id in ProfileId::ALL {
            assert_eq!(id.as_str().parse::<ProfileId>().unwrap(), id);
        }
        assert_eq!(
            "Long-Horizon".parse::<ProfileId>().unwrap(),
            ProfileId::LongHorizon
        );
        assert!(matches!(
            "vendor_x".parse::<ProfileId>(),
            Err(ProfileError::UnknownProfile(_))
        ));
    }

    #[test]
    fn band_edge_conventions() {
        assert!(!BandEdge::Exclusive.within(5.0, 5.0));
        assert!(BandEdge::Inclusive.within(5.0, 5.0));
        assert!(BandEdge::Exclusive.within(4.99, 5.0));
    }

    #[test]
    fn rejects_unordered_bands() {
        let mut profile = SignalProfile::default();
        profile.thresholds.congestion_bands = [5.0, 3.0, 10.0];
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::BandsNotAscending(_))
        ));
    }

    #[test]
    fn rejects_negative_threshold() {
        let mut profile = SignalProfile::default();
        profile.thresholds.slope_flat_pct = -1.0;
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::InvalidThreshold {
                name: "slope_flat_pct",
                ..
            })
        ));
    }

    #[test]
    fn rejects_flat_above_strong() {
        let mut profile = SignalProfile::default();
        profile.thresholds.slope_flat_pct = 2.0;
        profile.thresholds.slope_strong_pct = 1.0;
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::SlopeOrder { .. })
        ));
    }

    #[test]
    fn rejects_reversed_or_equal_pair() {
        let mut profile = ProfileId::LongHorizon.profile();
        profile.thresholds.short_window = Some(1400);
        profile.thresholds.long_window = Some(200);
        assert_eq!(
            profile.validate(),
            Err(ProfileError::PairOrder {
                short: 1400,
                long: 200
            })
        );

        profile.thresholds.short_window = Some(200);
        profile.thresholds.long_window = Some(200);
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::PairOrder { .. })
        ));
    }

    #[test]
    fn rejects_zero_window() {
        let mut profile = SignalProfile::default();
        profile.thresholds.key_window = Some(0);
        assert_eq!(
            profile.validate(),
            Err(ProfileError::ZeroWindow { name: "key_window" })
        );
    }

    #[test]
    fn profiles_differ_only_in_data() {
        let balanced = ProfileId::Balanced.profile();
        let long = ProfileId::LongHorizon.profile();
        assert_ne!(balanced.thresholds, long.thresholds);
        assert_eq!(long.thresholds.short_window, Some(200));
        assert_ne!(
            balanced.labels.get("proximity.at_key_level"),
            long.labels.get("proximity.at_key_level")
        );
    }

    #[test]
    fn labels_fall_back_to_code() {
        let labels = Labels::default();
        assert_eq!(labels.text("cross.bullish"), "cross.bullish");
        let english = Labels::english();
        assert_eq!(english.text("crossover.golden"), "Golden cross");
    }

    #[test]
    fn labels_merge_overrides() {
        let mut labels = Labels::english();
        let mut overrides = Labels::default();
        overrides.set("slope.flat", "Sideways");
        labels.merge(&overrides);
        assert_eq!(labels.text("slope.flat"), "Sideways");
        assert_eq!(labels.text("slope.strong_up"), "Strongly rising");
    }

    #[test]
    fn thresholds_deserialize_partial() {
        let t: Thresholds = serde_json::from_str(r#"{"band_edge": "inclusive"}"#).unwrap();
        assert_eq!(t.band_edge, BandEdge::Inclusive);
        assert_eq!(t.congestion_bands, [3.0, 5.0, 10.0]);
    }
}
