//! Integration tests for the trend-signal analyzer.
//!
//! Tests:
//! 1. Documented rule examples (alignment, crossover, congestion edges).
//! 2. End-to-end: series -> session -> signal set on synthetic shapes.
//! 3. Profiles: one rule engine, different thresholds and labels.
//! 4. Look-ahead: a truncated series analyzes exactly like the full series did
//!    at that point.

use chrono::NaiveDate;

use malens_core::domain::{PricePoint, PriceSeries, WindowSet};
use malens_core::engine::{compute_moving_averages, Session};
use malens_core::profile::{BandEdge, ProfileId, SignalProfile, Thresholds};
use malens_core::signals::{
    analyze, classify_alignment, classify_congestion, crossover_from_spreads, Alignment,
    AnalysisInput, Congestion, CrossSignal, CrossoverEvent, MaSample, PricePosition, Proximity,
    SlopeStrength,
};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn series(prices: &[f64]) -> PriceSeries {
    let base = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    PriceSeries::new(
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(base + chrono::Duration::days(i as i64), p))
            .collect(),
    )
    .unwrap()
}

fn windows(ws: &[usize]) -> WindowSet {
    WindowSet::new(ws.iter().copied()).unwrap()
}

fn fan(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|v| Some(*v)).collect()
}

// ──────────────────────────────────────────────
// 1. Rule examples
// ──────────────────────────────────────────────

#[test]
fn alignment_for_dashboard_windows() {
    // cur(30), cur(200), cur(700)
    let input = |values: [f64; 3]| {
        AnalysisInput::new(
            Some(110.0),
            [30, 200, 700]
                .into_iter()
                .zip(values)
                .map(|(w, v)| MaSample::new(w, Some(v), Some(v)))
                .collect(),
        )
    };
    let profile = SignalProfile::default();
    assert_eq!(
        analyze(&input([120.0, 110.0, 100.0]), &profile).alignment.category,
        Alignment::Bullish
    );
    assert_eq!(
        analyze(&input([100.0, 110.0, 120.0]), &profile).alignment.category,
        Alignment::Bearish
    );
    assert_eq!(
        analyze(&input([120.0, 100.0, 110.0]), &profile).alignment.category,
        Alignment::None
    );
    assert_eq!(
        classify_alignment(&fan(&[120.0, 110.0, 100.0])).category,
        Alignment::Bullish
    );
}

#[test]
fn crossover_spread_examples() {
    assert_eq!(crossover_from_spreads(-1.0, 2.0), CrossoverEvent::GoldenCross);
    assert_eq!(crossover_from_spreads(2.0, -1.0), CrossoverEvent::DeathCross);
    assert_eq!(crossover_from_spreads(2.0, 3.0), CrossoverEvent::None);
}

#[test]
fn congestion_five_percent_edge() {
    let currents = fan(&[100.0, 102.5, 105.0]);
    let exclusive = Thresholds::default();
    let inclusive = Thresholds {
        band_edge: BandEdge::Inclusive,
        ..Thresholds::default()
    };
    assert_eq!(
        classify_congestion(&currents, Some(100.0), &exclusive).category,
        Congestion::Dispersed
    );
    assert_eq!(
        classify_congestion(&currents, Some(100.0), &inclusive).category,
        Congestion::Dense
    );
}

#[test]
fn constant_series_is_flat() {
    let mut session = Session::new(windows(&[3]));
    session.set_series(series(&[100.0, 100.0, 100.0, 100.0]));
    let set = session.analyze(&SignalProfile::default());
    assert_eq!(set.slope.category, SlopeStrength::Flat);
    assert_eq!(set.slope.short_slope_pct, Some(0.0));
}

// ──────────────────────────────────────────────
// 2. End-to-end shapes
// ──────────────────────────────────────────────

#[test]
fn steady_uptrend() {
    let prices: Vec<f64> = (0..300).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
    let mut session = Session::new(windows(&[7, 30, 120]));
    session.set_series(series(&prices));
    let set = session.analyze(&SignalProfile::default());

    assert_eq!(set.cross.category, CrossSignal::BullishCross);
    assert_eq!(set.position.category, PricePosition::StrongUp);
    assert_eq!(set.alignment.category, Alignment::Bullish);
    assert_eq!(set.slope.category, SlopeStrength::StrongUp);
    assert_eq!(set.crossover.category, CrossoverEvent::None);
    assert_eq!(set.proximity.category, Proximity::FarAbove);
    assert!(!set.is_fully_insufficient());
}

#[test]
fn steady_downtrend() {
    let prices: Vec<f64> = (0..300).map(|i| 10_000.0 * 0.99_f64.powi(i)).collect();
    let mut session = Session::new(windows(&[7, 30, 120]));
    session.set_series(series(&prices));
    let set = session.analyze(&SignalProfile::default());

    assert_eq!(set.cross.category, CrossSignal::BearishCross);
    assert_eq!(set.position.category, PricePosition::StrongDown);
    assert_eq!(set.alignment.category, Alignment::Bearish);
    assert_eq!(set.slope.category, SlopeStrength::StrongDown);
    assert_eq!(set.proximity.category, Proximity::FarBelow);
}

#[test]
fn golden_cross_on_v_reversal() {
    // Falling then sharply rising: the 3-day line crosses the 10-day line.
    let mut prices: Vec<f64> = (0..20).map(|i| 200.0 - i as f64 * 2.0).collect();
    prices.extend((1..=20).map(|i| 162.0 + i as f64 * 4.0));
    let set_at = |n: usize| {
        let s = series(&prices[..n]);
        let ma = compute_moving_averages(&s, &windows(&[3, 10]));
        analyze(&AnalysisInput::from_averages(&s, &ma), &SignalProfile::default())
    };
    let events: Vec<CrossoverEvent> = (12..=prices.len())
        .map(|n| set_at(n).crossover.category)
        .collect();
    let golden = events
        .iter()
        .filter(|e| **e == CrossoverEvent::GoldenCross)
        .count();
    assert_eq!(golden, 1);
    assert!(!events.contains(&CrossoverEvent::DeathCross));
}

#[test]
fn short_history_is_insufficient() {
    let mut session = Session::new(windows(&[30, 200]));
    session.set_series(series(&[1.0, 2.0, 3.0]));
    let set = session.analyze(&SignalProfile::default());
    assert!(set.is_fully_insufficient());
    let rows = set.labelled(&SignalProfile::default().labels);
    assert!(rows.iter().all(|r| r.text == "Loading / insufficient data"));
}

// ──────────────────────────────────────────────
// 3. Profiles
// ──────────────────────────────────────────────

#[test]
fn profiles_change_classification_not_rules() {
    // Price 2.5% above the key line: at-key-level for aggressive (3%),
    // moderate for balanced (2%).
    let input = AnalysisInput::new(
        Some(102.5),
        vec![
            MaSample::new(10, Some(101.0), Some(101.0)),
            MaSample::new(50, Some(100.0), Some(100.0)),
        ],
    );
    let balanced = analyze(&input, &ProfileId::Balanced.profile());
    let aggressive = analyze(&input, &ProfileId::Aggressive.profile());
    assert_eq!(balanced.proximity.category, Proximity::Moderate);
    assert_eq!(aggressive.proximity.category, Proximity::AtKeyLevel);
    assert_eq!(balanced.cross, aggressive.cross);
}

#[test]
fn profile_labels_render() {
    let input = AnalysisInput::new(
        Some(100.0),
        vec![
            MaSample::new(200, Some(100.0), Some(100.0)),
            MaSample::new(1400, Some(100.5), Some(100.5)),
        ],
    );
    let profile = ProfileId::LongHorizon.profile();
    let set = analyze(&input, &profile);
    let rows = set.labelled(&profile.labels);
    let proximity = rows.iter().find(|r| r.signal == "proximity").unwrap();
    assert_eq!(proximity.code, "proximity.at_key_level");
    assert_eq!(proximity.text, "Testing the long-term base line");
}

// ──────────────────────────────────────────────
// 4. Look-ahead
// ──────────────────────────────────────────────

#[test]
fn truncated_series_matches_history() {
    let prices: Vec<f64> = (0..120)
        .map(|i| 100.0 + (i as f64 * 0.3).sin() * 15.0)
        .collect();
    let ws = windows(&[5, 20, 60]);
    let full = series(&prices);
    let full_ma = compute_moving_averages(&full, &ws);

    let cut = 90;
    let truncated = series(&prices[..cut]);
    let truncated_ma = compute_moving_averages(&truncated, &ws);
    for w in ws.iter() {
        assert_eq!(
            &full_ma.series(w).unwrap().values[..cut],
            &truncated_ma.series(w).unwrap().values[..]
        );
    }
}
