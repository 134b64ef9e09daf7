//! Weather Suitability Scoring Engine.
//!
//! Pure and stateless: given an already-fetched [`WeatherObservation`] and an
//! event type it produces a 0-100 suitability score, a condition label, and a
//! per-factor breakdown. All I/O (provider fetches, persistence, email) lives
//! with the callers; the engine is safe to share across tasks without locking.

pub mod alternatives;
pub mod factors;
pub mod profile;
pub mod trend;

pub use alternatives::AlternativeCandidate;
pub use factors::ScoringMode;
pub use profile::EventTypeProfile;
pub use trend::{ConfidenceLevel, TrendDirection, TrendMethod, TrendReport};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{EventType, WeatherObservation};

/// Coarse weather quality bucket derived from the aggregate score.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    Okay,
    Poor,
}

impl Condition {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Excellent => "excellent",
            Condition::Good => "good",
            Condition::Fair => "fair",
            Condition::Okay => "okay",
            Condition::Poor => "poor",
        }
    }
}

/// Selectable condition band table.
///
/// Two variants exist in the product history; neither has been declared
/// canonical, so both stay configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConditionBands {
    /// excellent >= 80, good >= 60, fair >= 40, else poor
    #[default]
    Graded,
    /// good >= 70, okay >= 49, else poor
    Coarse,
}

impl ConditionBands {
    /// Map an aggregate score to its condition label.
    #[must_use]
    pub fn classify(&self, score: f64) -> Condition {
        match self {
            ConditionBands::Graded => {
                if score >= 80.0 {
                    Condition::Excellent
                } else if score >= 60.0 {
                    Condition::Good
                } else if score >= 40.0 {
                    Condition::Fair
                } else {
                    Condition::Poor
                }
            }
            ConditionBands::Coarse => {
                if score >= 70.0 {
                    Condition::Good
                } else if score >= 49.0 {
                    Condition::Okay
                } else {
                    Condition::Poor
                }
            }
        }
    }
}

/// One factor's contribution to the aggregate score
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct FactorScore {
    /// Sub-score in [0, 100], rounded to one decimal
    pub score: f64,
    /// Raw value the sub-score was computed from, if present
    pub value: Option<f64>,
    /// Weight applied when aggregating
    pub weight: f64,
}

/// Full result of a suitability computation.
///
/// Recomputed on every call and never persisted by the engine itself.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScoreBreakdown {
    /// Weighted aggregate in [0, 100], rounded to one decimal
    pub score: f64,
    pub condition: Condition,
    pub temperature: FactorScore,
    pub wind: FactorScore,
    pub precipitation: FactorScore,
    pub cloud_cover: FactorScore,
    pub visibility: FactorScore,
}

/// One scored hour of an event day, used in reminder emails
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HourlyScore {
    pub time: String,
    pub temperature: Option<f64>,
    pub description: String,
    pub score: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Combine weighted sub-scores into the aggregate score and condition.
/// Deterministic: identical inputs always yield identical output.
#[must_use]
pub fn aggregate(subscores: &[(f64, f64)], bands: ConditionBands) -> (f64, Condition) {
    let total: f64 = subscores.iter().map(|(score, weight)| score * weight).sum();
    let score = round1(total.clamp(0.0, 100.0));
    (score, bands.classify(score))
}

/// The scoring engine: factor scoring mode plus condition band table.
///
/// Constructed once at startup and handed to whatever consumes it; holds no
/// mutable state.
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine {
    mode: ScoringMode,
    bands: ConditionBands,
    trend_method: TrendMethod,
    trend_threshold: f64,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(
            ScoringMode::default(),
            ConditionBands::default(),
            TrendMethod::default(),
            trend::DEFAULT_TREND_THRESHOLD,
        )
    }
}

impl ScoringEngine {
    #[must_use]
    pub fn new(
        mode: ScoringMode,
        bands: ConditionBands,
        trend_method: TrendMethod,
        trend_threshold: f64,
    ) -> Self {
        Self {
            mode,
            bands,
            trend_method,
            trend_threshold,
        }
    }

    #[must_use]
    pub fn bands(&self) -> ConditionBands {
        self.bands
    }

    /// Score one observation against an event type's profile.
    ///
    /// Malformed-but-present numeric input is clamped, never an error; absent
    /// optional fields score 0 for their factor.
    #[must_use]
    pub fn compute_suitability(
        &self,
        observation: &WeatherObservation,
        event_type: EventType,
    ) -> ScoreBreakdown {
        let profile = EventTypeProfile::for_event_type(event_type);

        let temperature = observation.temperature;
        let wind = observation.wind_speed.map(|w| w.max(0.0));
        let precipitation = Some(observation.precipitation.max(0.0));
        let cloud_cover = observation.cloud_cover.map(|c| c.clamp(0.0, 100.0));
        let visibility = observation.visibility.map(|v| v.max(0.0));

        let temp_score = factors::range_score(temperature, &profile.temperature, self.mode);
        let wind_score = factors::range_score(wind, &profile.wind, self.mode);
        let precip_score = factors::ceiling_score(precipitation, &profile.precipitation, self.mode);
        let cloud_score = factors::range_score(cloud_cover, &profile.cloud_cover, self.mode);
        let vis_score = factors::floor_score(visibility, &profile.visibility, self.mode);

        let (score, condition) = aggregate(
            &[
                (temp_score, profile.temperature.weight),
                (wind_score, profile.wind.weight),
                (precip_score, profile.precipitation.weight),
                (cloud_score, profile.cloud_cover.weight),
                (vis_score, profile.visibility.weight),
            ],
            self.bands,
        );

        ScoreBreakdown {
            score,
            condition,
            temperature: FactorScore {
                score: round1(temp_score),
                value: temperature,
                weight: profile.temperature.weight,
            },
            wind: FactorScore {
                score: round1(wind_score),
                value: wind,
                weight: profile.wind.weight,
            },
            precipitation: FactorScore {
                score: round1(precip_score),
                value: precipitation,
                weight: profile.precipitation.weight,
            },
            cloud_cover: FactorScore {
                score: round1(cloud_score),
                value: cloud_cover,
                weight: profile.cloud_cover.weight,
            },
            visibility: FactorScore {
                score: round1(vis_score),
                value: visibility,
                weight: profile.visibility.weight,
            },
        }
    }

    /// Rank alternative dates within a forecast window; see
    /// [`alternatives::rank_alternatives`].
    #[must_use]
    pub fn rank_alternatives(
        &self,
        base_location: &str,
        base_date: NaiveDate,
        event_type: EventType,
        forecast_window: &[WeatherObservation],
        current_score: Option<f64>,
    ) -> Vec<AlternativeCandidate> {
        alternatives::rank_alternatives(
            self,
            base_location,
            base_date,
            event_type,
            forecast_window,
            current_score,
        )
    }

    /// Directional trend per metric over a time-ordered observation window;
    /// see [`trend::analyze_window`].
    #[must_use]
    pub fn analyze_trend(&self, window: &[WeatherObservation]) -> TrendReport {
        trend::analyze_window(window, self.trend_method, self.trend_threshold)
    }

    /// Directional trend of one numeric series.
    #[must_use]
    pub fn analyze_series(&self, values: &[f64]) -> TrendDirection {
        trend::analyze_series(values, self.trend_method, self.trend_threshold)
    }

    /// Per-sample scores for the hours of `date` within a forecast window.
    #[must_use]
    pub fn hourly_breakdown(
        &self,
        forecast_window: &[WeatherObservation],
        date: NaiveDate,
        event_type: EventType,
    ) -> Vec<HourlyScore> {
        forecast_window
            .iter()
            .filter(|obs| obs.timestamp.date_naive() == date)
            .map(|obs| {
                let breakdown = self.compute_suitability(obs, event_type);
                HourlyScore {
                    time: obs.timestamp.format("%H:%M").to_string(),
                    temperature: obs.temperature,
                    description: obs.description.clone(),
                    score: breakdown.score,
                }
            })
            .collect()
    }
}
