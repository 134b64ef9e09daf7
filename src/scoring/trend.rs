//! Trend analysis over time-ordered weather samples.
//!
//! Feeds threshold-alert decisions: each numeric metric gets a direction, and
//! the window as a whole gets a confidence level derived from sample count
//! and field completeness.

use serde::{Deserialize, Serialize};

use crate::models::WeatherObservation;

/// Default per-step change below which a series counts as stable
pub const DEFAULT_TREND_THRESHOLD: f64 = 0.5;

/// Slope magnitude below which a regression counts as stable
const STABLE_SLOPE: f64 = 0.1;

/// Directional characterization of one metric
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    Variable,
    /// Not enough data to say anything (empty series)
    Unknown,
}

impl TrendDirection {
    /// Render for metrics where a rising value means worse conditions
    /// (precipitation, wind) or better ones (visibility, score).
    #[must_use]
    pub fn as_outlook(&self, higher_is_worse: bool) -> &'static str {
        match (self, higher_is_worse) {
            (TrendDirection::Increasing, true) | (TrendDirection::Decreasing, false) => "worsening",
            (TrendDirection::Increasing, false) | (TrendDirection::Decreasing, true) => "improving",
            (TrendDirection::Stable, _) => "stable",
            (TrendDirection::Variable, _) => "variable",
            (TrendDirection::Unknown, _) => "unknown",
        }
    }
}

/// Selectable trend computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrendMethod {
    /// Mean of successive deltas, gated by delta standard deviation
    #[default]
    SuccessiveDelta,
    /// Least-squares slope over the sample index
    Regression,
}

/// Confidence in a trend report
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

/// Per-metric directions plus overall confidence for a window
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TrendReport {
    pub temperature: TrendDirection,
    pub precipitation: TrendDirection,
    pub wind: TrendDirection,
    pub cloud_cover: TrendDirection,
    pub confidence: ConfidenceLevel,
}

/// Directional trend of one numeric series.
///
/// Zero samples are unknown, one sample is stable; high variability of the
/// successive deltas overrides any direction.
#[must_use]
pub fn analyze_series(values: &[f64], method: TrendMethod, threshold: f64) -> TrendDirection {
    if values.is_empty() {
        return TrendDirection::Unknown;
    }
    if values.len() < 2 {
        return TrendDirection::Stable;
    }

    let deltas: Vec<f64> = values.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let mean_delta = deltas.iter().sum::<f64>() / deltas.len() as f64;
    let variance = deltas
        .iter()
        .map(|d| (d - mean_delta).powi(2))
        .sum::<f64>()
        / deltas.len() as f64;
    if variance.sqrt() > threshold * 2.0 {
        return TrendDirection::Variable;
    }

    match method {
        TrendMethod::SuccessiveDelta => {
            if mean_delta > threshold {
                TrendDirection::Increasing
            } else if mean_delta < -threshold {
                TrendDirection::Decreasing
            } else {
                TrendDirection::Stable
            }
        }
        TrendMethod::Regression => {
            let slope = regression_slope(values);
            if slope.abs() < STABLE_SLOPE {
                TrendDirection::Stable
            } else if slope > 0.0 {
                TrendDirection::Increasing
            } else {
                TrendDirection::Decreasing
            }
        }
    }
}

/// Least-squares slope of `values` over their index.
/// Returns 0 when the denominator degenerates (fewer than 2 points).
fn regression_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }
    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_xx: f64 = (0..values.len()).map(|i| (i as f64).powi(2)).sum();

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denominator
}

/// Analyze every tracked metric of a window and derive overall confidence.
#[must_use]
pub fn analyze_window(
    window: &[WeatherObservation],
    method: TrendMethod,
    threshold: f64,
) -> TrendReport {
    let series = |extract: fn(&WeatherObservation) -> Option<f64>| -> Vec<f64> {
        window.iter().filter_map(extract).collect()
    };

    TrendReport {
        temperature: analyze_series(&series(|o| o.temperature), method, threshold),
        precipitation: analyze_series(
            &window.iter().map(|o| o.precipitation).collect::<Vec<f64>>(),
            method,
            threshold,
        ),
        wind: analyze_series(&series(|o| o.wind_speed), method, threshold),
        cloud_cover: analyze_series(&series(|o| o.cloud_cover), method, threshold),
        confidence: confidence(window),
    }
}

/// Confidence from sample quantity and field completeness.
///
/// Quantity: a full day of high-resolution samples (>=24) scores 1.0, >=8
/// scores 0.8, >=4 scores 0.6. The final level averages quantity with the
/// mean field-completeness ratio. Below 4 samples the window is too small
/// for completeness to compensate: always low.
#[must_use]
pub fn confidence(window: &[WeatherObservation]) -> ConfidenceLevel {
    if window.len() < 4 {
        return ConfidenceLevel::Low;
    }

    let quantity = match window.len() {
        n if n >= 24 => 1.0,
        n if n >= 8 => 0.8,
        _ => 0.6,
    };

    let completeness =
        window.iter().map(WeatherObservation::field_completeness).sum::<f64>() / window.len() as f64;

    let final_score = (quantity + completeness) / 2.0;
    if final_score >= 0.8 {
        ConfidenceLevel::High
    } else if final_score >= 0.6 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn full_observation(temperature: f64) -> WeatherObservation {
        WeatherObservation {
            timestamp: Utc::now(),
            temperature: Some(temperature),
            precipitation: 0.0,
            wind_speed: Some(5.0),
            cloud_cover: Some(20.0),
            visibility: Some(10_000.0),
            description: "Clear sky".to_string(),
        }
    }

    #[rstest]
    #[case(TrendMethod::SuccessiveDelta)]
    #[case(TrendMethod::Regression)]
    fn flat_series_is_stable(#[case] method: TrendMethod) {
        let direction = analyze_series(&[10.0, 10.0, 10.0], method, DEFAULT_TREND_THRESHOLD);
        assert_eq!(direction, TrendDirection::Stable);
    }

    #[rstest]
    #[case(TrendMethod::SuccessiveDelta)]
    #[case(TrendMethod::Regression)]
    fn rising_series_is_increasing(#[case] method: TrendMethod) {
        let direction =
            analyze_series(&[1.0, 2.0, 3.0, 4.0, 5.0], method, DEFAULT_TREND_THRESHOLD);
        assert_eq!(direction, TrendDirection::Increasing);
    }

    #[rstest]
    #[case(TrendMethod::SuccessiveDelta)]
    #[case(TrendMethod::Regression)]
    fn falling_series_is_decreasing(#[case] method: TrendMethod) {
        let direction =
            analyze_series(&[20.0, 18.0, 16.0, 14.0], method, DEFAULT_TREND_THRESHOLD);
        assert_eq!(direction, TrendDirection::Decreasing);
    }

    #[test]
    fn empty_series_is_unknown_single_sample_is_stable() {
        assert_eq!(
            analyze_series(&[], TrendMethod::SuccessiveDelta, DEFAULT_TREND_THRESHOLD),
            TrendDirection::Unknown
        );
        assert_eq!(
            analyze_series(&[42.0], TrendMethod::SuccessiveDelta, DEFAULT_TREND_THRESHOLD),
            TrendDirection::Stable
        );
    }

    #[test]
    fn erratic_series_is_variable() {
        let direction = analyze_series(
            &[0.0, 10.0, -8.0, 12.0, -6.0],
            TrendMethod::SuccessiveDelta,
            DEFAULT_TREND_THRESHOLD,
        );
        assert_eq!(direction, TrendDirection::Variable);
    }

    #[test]
    fn regression_slope_matches_hand_computation() {
        // y = 2x: slope exactly 2
        let slope = regression_slope(&[0.0, 2.0, 4.0, 6.0]);
        assert!((slope - 2.0).abs() < 1e-9);
    }

    #[test]
    fn three_samples_give_low_confidence() {
        let window: Vec<WeatherObservation> =
            (0..3).map(|_| full_observation(10.0)).collect();
        let report = analyze_window(&window, TrendMethod::SuccessiveDelta, DEFAULT_TREND_THRESHOLD);
        assert_eq!(report.temperature, TrendDirection::Stable);
        assert_eq!(report.confidence, ConfidenceLevel::Low);
    }

    #[test]
    fn fewer_than_four_samples_are_always_low_confidence() {
        // Even fully populated samples cannot lift a tiny window.
        for count in 0..4 {
            let window: Vec<WeatherObservation> =
                (0..count).map(|_| full_observation(10.0)).collect();
            assert_eq!(confidence(&window), ConfidenceLevel::Low, "count {count}");
        }
        let four: Vec<WeatherObservation> = (0..4).map(|_| full_observation(10.0)).collect();
        assert_ne!(confidence(&four), ConfidenceLevel::Low);
    }

    #[test]
    fn full_day_of_complete_samples_gives_high_confidence() {
        let window: Vec<WeatherObservation> =
            (0..24).map(|i| full_observation(10.0 + f64::from(i) * 0.01)).collect();
        assert_eq!(confidence(&window), ConfidenceLevel::High);
    }

    #[test]
    fn sparse_fields_reduce_confidence() {
        let mut window: Vec<WeatherObservation> =
            (0..24).map(|_| full_observation(10.0)).collect();
        for obs in &mut window {
            obs.temperature = None;
            obs.wind_speed = None;
            obs.cloud_cover = None;
            obs.visibility = None;
        }
        // Quantity 1.0, completeness 3/7: average ~0.71 -> medium
        assert_eq!(confidence(&window), ConfidenceLevel::Medium);
    }

    #[test]
    fn outlook_respects_polarity() {
        assert_eq!(TrendDirection::Increasing.as_outlook(true), "worsening");
        assert_eq!(TrendDirection::Increasing.as_outlook(false), "improving");
        assert_eq!(TrendDirection::Decreasing.as_outlook(true), "improving");
        assert_eq!(TrendDirection::Stable.as_outlook(true), "stable");
    }
}
