//! Per-factor scorers.
//!
//! Each scorer maps one raw weather value plus a profile factor to a 0-100
//! sub-score. An absent value scores 0. Two scoring modes exist because the
//! product has not settled on one; both are kept selectable (see
//! [`ScoringMode`]).

use serde::{Deserialize, Serialize};

use crate::scoring::profile::{CeilingFactor, FloorFactor, RangeFactor};

/// Selectable factor-scoring style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Three-tier banding: optimal 100, acceptable 70, otherwise 30.
    #[default]
    Banded,
    /// Continuous penalty: 100 minus a linear penalty per unit outside the
    /// optimal range, floored at 0. The slope is chosen so the score crosses
    /// 70 exactly at the acceptable boundary, matching the banded mode there.
    LinearPenalty,
}

const OPTIMAL_SCORE: f64 = 100.0;
const ACCEPTABLE_SCORE: f64 = 70.0;
const OUTSIDE_SCORE: f64 = 30.0;
const ACCEPTABLE_DROP: f64 = OPTIMAL_SCORE - ACCEPTABLE_SCORE;

/// Score a range-type factor (temperature, wind, cloud cover).
#[must_use]
pub fn range_score(value: Option<f64>, factor: &RangeFactor, mode: ScoringMode) -> f64 {
    let Some(value) = value else { return 0.0 };
    match mode {
        ScoringMode::Banded => {
            if value >= factor.optimal_min && value <= factor.optimal_max {
                OPTIMAL_SCORE
            } else if value >= factor.acceptable_min && value <= factor.acceptable_max {
                ACCEPTABLE_SCORE
            } else {
                OUTSIDE_SCORE
            }
        }
        ScoringMode::LinearPenalty => {
            let (excess, margin) = if value < factor.optimal_min {
                (
                    factor.optimal_min - value,
                    factor.optimal_min - factor.acceptable_min,
                )
            } else if value > factor.optimal_max {
                (
                    value - factor.optimal_max,
                    factor.acceptable_max - factor.optimal_max,
                )
            } else {
                return OPTIMAL_SCORE;
            };
            linear_penalty(excess, margin)
        }
    }
}

/// Score a ceiling-type factor (precipitation): lower is better.
#[must_use]
pub fn ceiling_score(value: Option<f64>, factor: &CeilingFactor, mode: ScoringMode) -> f64 {
    let Some(value) = value else { return 0.0 };
    match mode {
        ScoringMode::Banded => {
            if value <= factor.optimal_max {
                OPTIMAL_SCORE
            } else if value <= factor.acceptable_max {
                ACCEPTABLE_SCORE
            } else {
                OUTSIDE_SCORE
            }
        }
        ScoringMode::LinearPenalty => {
            if value <= factor.optimal_max {
                return OPTIMAL_SCORE;
            }
            linear_penalty(
                value - factor.optimal_max,
                factor.acceptable_max - factor.optimal_max,
            )
        }
    }
}

/// Score a floor-type factor (visibility): higher is better.
#[must_use]
pub fn floor_score(value: Option<f64>, factor: &FloorFactor, mode: ScoringMode) -> f64 {
    let Some(value) = value else { return 0.0 };
    match mode {
        ScoringMode::Banded => {
            if value >= factor.optimal_min {
                OPTIMAL_SCORE
            } else if value >= factor.acceptable_min {
                ACCEPTABLE_SCORE
            } else {
                OUTSIDE_SCORE
            }
        }
        ScoringMode::LinearPenalty => {
            if value >= factor.optimal_min {
                return OPTIMAL_SCORE;
            }
            linear_penalty(
                factor.optimal_min - value,
                factor.optimal_min - factor.acceptable_min,
            )
        }
    }
}

fn linear_penalty(excess: f64, margin: f64) -> f64 {
    // Degenerate profile (acceptable == optimal): any excess exhausts it.
    if margin <= f64::EPSILON {
        return 0.0;
    }
    (OPTIMAL_SCORE - ACCEPTABLE_DROP * excess / margin).clamp(0.0, OPTIMAL_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::profile::OUTDOOR_SPORTS;
    use rstest::rstest;

    #[rstest]
    // Inside optimal [18, 25]
    #[case(Some(18.0), 100.0)]
    #[case(Some(22.0), 100.0)]
    #[case(Some(25.0), 100.0)]
    // Inside acceptable [15, 30] only
    #[case(Some(16.0), 70.0)]
    #[case(Some(28.0), 70.0)]
    // Outside everything
    #[case(Some(40.0), 30.0)]
    #[case(Some(-5.0), 30.0)]
    // Absent value
    #[case(None, 0.0)]
    fn banded_temperature_bands(#[case] value: Option<f64>, #[case] expected: f64) {
        let score = range_score(value, &OUTDOOR_SPORTS.temperature, ScoringMode::Banded);
        assert_eq!(score, expected);
    }

    #[rstest]
    #[case(Some(0.0), 100.0)]
    #[case(Some(0.3), 70.0)]
    #[case(Some(0.5), 70.0)]
    #[case(Some(2.0), 30.0)]
    fn banded_precipitation_ceiling(#[case] value: Option<f64>, #[case] expected: f64) {
        let score = ceiling_score(value, &OUTDOOR_SPORTS.precipitation, ScoringMode::Banded);
        assert_eq!(score, expected);
    }

    #[rstest]
    #[case(Some(10_000.0), 100.0)]
    #[case(Some(8000.0), 100.0)]
    #[case(Some(6000.0), 70.0)]
    #[case(Some(1000.0), 30.0)]
    #[case(None, 0.0)]
    fn banded_visibility_floor(#[case] value: Option<f64>, #[case] expected: f64) {
        let score = floor_score(value, &OUTDOOR_SPORTS.visibility, ScoringMode::Banded);
        assert_eq!(score, expected);
    }

    #[test]
    fn linear_penalty_matches_banding_at_acceptable_edge() {
        // Outdoor temperature: optimal [18, 25], acceptable [15, 30].
        let factor = &OUTDOOR_SPORTS.temperature;
        let at_edge = range_score(Some(30.0), factor, ScoringMode::LinearPenalty);
        assert!((at_edge - 70.0).abs() < 1e-9);

        let inside = range_score(Some(20.0), factor, ScoringMode::LinearPenalty);
        assert_eq!(inside, 100.0);
    }

    #[test]
    fn linear_penalty_floors_at_zero() {
        let factor = &OUTDOOR_SPORTS.temperature;
        let extreme = range_score(Some(80.0), factor, ScoringMode::LinearPenalty);
        assert_eq!(extreme, 0.0);
    }

    #[test]
    fn linear_penalty_is_monotonic_outside_optimal() {
        let factor = &OUTDOOR_SPORTS.temperature;
        let mut last = 100.0;
        for step in 0..20 {
            let value = 25.0 + f64::from(step);
            let score = range_score(Some(value), factor, ScoringMode::LinearPenalty);
            assert!(score <= last, "score must not increase as value leaves range");
            last = score;
        }
    }

    #[test]
    fn moving_out_of_optimal_never_increases_banded_score() {
        let factor = &OUTDOOR_SPORTS.wind;
        let inside = range_score(Some(10.0), factor, ScoringMode::Banded);
        let acceptable = range_score(Some(18.0), factor, ScoringMode::Banded);
        let outside = range_score(Some(30.0), factor, ScoringMode::Banded);
        assert!(inside >= acceptable);
        assert!(acceptable >= outside);
    }

    #[test]
    fn scores_stay_in_bounds_for_extreme_input() {
        for mode in [ScoringMode::Banded, ScoringMode::LinearPenalty] {
            for value in [-1e9, -1.0, 0.0, 1.0, 1e9] {
                let s = range_score(Some(value), &OUTDOOR_SPORTS.temperature, mode);
                assert!((0.0..=100.0).contains(&s));
                let c = ceiling_score(Some(value), &OUTDOOR_SPORTS.precipitation, mode);
                assert!((0.0..=100.0).contains(&c));
                let f = floor_score(Some(value), &OUTDOOR_SPORTS.visibility, mode);
                assert!((0.0..=100.0).contains(&f));
            }
        }
    }
}
