//! The rule engine: one pass over an `AnalysisInput` under a `SignalProfile`.

use super::{
    classify_alignment, classify_congestion, classify_cross, classify_crossover,
    classify_position, classify_proximity, classify_slope, percent_change, AnalysisInput,
    CrossSignal, CrossoverEvent, MaSample, Measure, Reading, SignalSet, WindowSlope,
};
use crate::profile::{SignalProfile, Thresholds};

/// Short, long and key windows after applying profile defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindows {
    pub short: usize,
    pub long: usize,
    pub key: usize,
}

/// Resolve the cross pair and key window against the windows present in `input`.
///
/// A profile window that is unset or not present falls back to the shortest
/// (short) or longest (long, key) window. `None` when `input` has no windows.
pub fn resolve_windows(input: &AnalysisInput, thresholds: &Thresholds) -> Option<ResolvedWindows> {
    let shortest = input.windows().next()?;
    let longest = input.windows().last()?;
    let pick = |wanted: Option<usize>, fallback: usize| {
        wanted
            .filter(|w| input.sample(*w).is_some())
            .unwrap_or(fallback)
    };
    Some(ResolvedWindows {
        short: pick(thresholds.short_window, shortest),
        long: pick(thresholds.long_window, longest),
        key: pick(thresholds.key_window, longest),
    })
}

fn slope_of(sample: Option<&MaSample>) -> Measure {
    match sample {
        Some(s) => percent_change(s.prev(), s.cur()),
        None => Measure::Insufficient,
    }
}

/// Classify every signal for the snapshot described by `input`.
pub fn analyze(input: &AnalysisInput, profile: &SignalProfile) -> SignalSet {
    let thresholds = &profile.thresholds;
    let Some(windows) = resolve_windows(input, thresholds) else {
        return SignalSet::insufficient();
    };

    let price = input.current_price();
    let currents = input.currents();
    let short = input.sample(windows.short);
    let long = input.sample(windows.long);
    let key = input.sample(windows.key);

    // A pair needs two distinct lines.
    let (cross, crossover) = match (short, long) {
        (Some(s), Some(l)) if s.window != l.window => (
            classify_cross(s.cur(), l.cur()),
            classify_crossover(s.prev(), l.prev(), s.cur(), l.cur()),
        ),
        _ => (
            Reading::bare(CrossSignal::InsufficientData),
            Reading::bare(CrossoverEvent::InsufficientData),
        ),
    };

    let window_slopes = input
        .samples()
        .iter()
        .map(|s| WindowSlope {
            window: s.window,
            slope_pct: percent_change(s.prev(), s.cur()).value(),
        })
        .collect();

    SignalSet {
        cross,
        position: classify_position(price, &currents),
        alignment: classify_alignment(&currents),
        congestion: classify_congestion(&currents, price, thresholds),
        slope: classify_slope(slope_of(short), slope_of(long), thresholds),
        crossover,
        proximity: classify_proximity(price, key.and_then(MaSample::cur), thresholds),
        window_slopes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileId;
    use crate::signals::{Alignment, Category, Congestion, PricePosition, Proximity, SlopeStrength};

    fn input(price: f64, samples: &[(usize, f64, f64)]) -> AnalysisInput {
        AnalysisInput::new(
            Some(price),
            samples
                .iter()
                .map(|&(w, cur, prev)| MaSample::new(w, Some(cur), Some(prev)))
                .collect(),
        )
    }

    #[test]
    fn empty_input_is_fully_insufficient() {
        let set = analyze(&AnalysisInput::default(), &SignalProfile::default());
        assert!(set.is_fully_insufficient());
    }

    #[test]
    fn bullish_snapshot() {
        let inp = input(
            130.0,
            &[(30, 120.0, 119.0), (200, 110.0, 109.9), (700, 100.0, 99.99)],
        );
        let set = analyze(&inp, &SignalProfile::default());
        assert_eq!(set.cross.category, CrossSignal::BullishCross);
        assert_eq!(set.position.category, PricePosition::StrongUp);
        assert_eq!(set.alignment.category, Alignment::Bullish);
        assert_eq!(set.crossover.category, CrossoverEvent::None);
        assert_eq!(set.proximity.category, Proximity::FarAbove);
        assert_eq!(set.window_slopes.len(), 3);
        assert_eq!(set.window_slopes[0].window, 30);
    }

    #[test]
    fn flat_series_grades_flat() {
        let inp = input(100.0, &[(3, 100.0, 100.0), (5, 100.0, 100.0)]);
        let set = analyze(&inp, &SignalProfile::default());
        assert_eq!(set.slope.category, SlopeStrength::Flat);
        assert_eq!(set.congestion.category, Congestion::ExtremeDense);
        assert_eq!(set.congestion.magnitude, Some(0.0));
        assert_eq!(set.alignment.category, Alignment::None);
    }

    #[test]
    fn golden_cross_between_samples() {
        let inp = input(106.0, &[(50, 105.0, 99.0), (200, 100.0, 100.0)]);
        let set = analyze(&inp, &SignalProfile::default());
        assert_eq!(set.crossover.category, CrossoverEvent::GoldenCross);
        assert_eq!(set.cross.category, CrossSignal::BullishCross);
    }

    #[test]
    fn single_window_has_no_pair() {
        let inp = input(100.0, &[(5, 99.0, 98.0)]);
        let set = analyze(&inp, &SignalProfile::default());
        assert_eq!(set.cross.category, CrossSignal::InsufficientData);
        assert_eq!(set.crossover.category, CrossoverEvent::InsufficientData);
        assert_eq!(set.alignment.category, Alignment::InsufficientData);
        assert_eq!(set.congestion.category, Congestion::InsufficientData);
        assert_eq!(set.position.category, PricePosition::StrongUp);
        assert!(!set.slope.category.is_degenerate());
    }

    #[test]
    fn profile_windows_are_used_when_present() {
        let inp = input(
            100.0,
            &[(7, 90.0, 90.0), (200, 95.0, 95.0), (1400, 110.0, 110.0), (1500, 80.0, 80.0)],
        );
        let profile = ProfileId::LongHorizon.profile();
        let resolved = resolve_windows(&inp, &profile.thresholds).unwrap();
        assert_eq!(
            resolved,
            ResolvedWindows {
                short: 200,
                long: 1400,
                key: 1400
            }
        );
        let set = analyze(&inp, &profile);
        assert_eq!(set.cross.category, CrossSignal::BearishCross);
    }

    #[test]
    fn unknown_profile_windows_fall_back() {
        let inp = input(100.0, &[(7, 90.0, 90.0), (30, 95.0, 95.0)]);
        let profile = ProfileId::LongHorizon.profile();
        let resolved = resolve_windows(&inp, &profile.thresholds).unwrap();
        assert_eq!(resolved.short, 7);
        assert_eq!(resolved.long, 30);
        assert_eq!(resolved.key, 30);
    }

    #[test]
    fn zero_previous_is_undefined_slope() {
        let inp = input(100.0, &[(3, 1.0, 0.0), (5, 1.0, 1.0)]);
        let set = analyze(&inp, &SignalProfile::default());
        assert_eq!(set.slope.category, SlopeStrength::Undefined);
        assert_eq!(set.window_slopes[0].slope_pct, None);
    }

    #[test]
    fn missing_price_only_affects_price_signals() {
        let inp = AnalysisInput::new(
            None,
            vec![
                MaSample::new(3, Some(110.0), Some(100.0)),
                MaSample::new(5, Some(100.0), Some(105.0)),
            ],
        );
        let set = analyze(&inp, &SignalProfile::default());
        assert_eq!(set.position.category, PricePosition::InsufficientData);
        assert_eq!(set.congestion.category, Congestion::InsufficientData);
        assert_eq!(set.proximity.category, Proximity::InsufficientData);
        assert_eq!(set.cross.category, CrossSignal::BullishCross);
        assert_eq!(set.crossover.category, CrossoverEvent::GoldenCross);
    }
}
