//! Alternative-date ranking.
//!
//! Collapses a forecast window into one representative observation per
//! calendar day, scores each day other than the event's own date, and returns
//! the best candidates. Order is a pure function of the input window.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{EventType, WeatherObservation};
use crate::scoring::{Condition, ScoringEngine};

/// Maximum number of candidates returned by the ranker
pub const MAX_ALTERNATIVES: usize = 5;

/// A candidate replacement date with its daily weather and score
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AlternativeCandidate {
    pub date: NaiveDate,
    pub location: String,
    pub observation: WeatherObservation,
    pub score: f64,
    pub condition: Condition,
}

/// Rank alternative dates for an event.
///
/// Intra-day samples are merged into a single daily observation (mean
/// temperature/wind/cloud cover, summed precipitation, most frequent
/// description). The base calendar date is excluded. When `current_score` is
/// given, only strictly better candidates are kept. Result is sorted by
/// descending score, ties broken by proximity to `base_date` (earliest
/// first), and capped at [`MAX_ALTERNATIVES`]. An empty window yields an
/// empty result.
#[must_use]
pub fn rank_alternatives(
    engine: &ScoringEngine,
    base_location: &str,
    base_date: NaiveDate,
    event_type: EventType,
    forecast_window: &[WeatherObservation],
    current_score: Option<f64>,
) -> Vec<AlternativeCandidate> {
    // BTreeMap keeps the day grouping deterministic.
    let mut by_date: BTreeMap<NaiveDate, Vec<&WeatherObservation>> = BTreeMap::new();
    for obs in forecast_window {
        let date = obs.timestamp.date_naive();
        if date == base_date {
            continue;
        }
        by_date.entry(date).or_default().push(obs);
    }

    let mut candidates: Vec<AlternativeCandidate> = by_date
        .into_iter()
        .map(|(date, samples)| {
            let daily = merge_daily(date, &samples);
            let breakdown = engine.compute_suitability(&daily, event_type);
            AlternativeCandidate {
                date,
                location: base_location.to_string(),
                observation: daily,
                score: breakdown.score,
                condition: breakdown.condition,
            }
        })
        .filter(|candidate| current_score.is_none_or(|floor| candidate.score > floor))
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| {
                let prox_a = (a.date - base_date).num_days().abs();
                let prox_b = (b.date - base_date).num_days().abs();
                prox_a.cmp(&prox_b)
            })
            .then_with(|| a.date.cmp(&b.date))
    });
    candidates.truncate(MAX_ALTERNATIVES);
    candidates
}

/// Collapse all samples of one calendar day into a single observation.
fn merge_daily(date: NaiveDate, samples: &[&WeatherObservation]) -> WeatherObservation {
    let timestamp = date
        .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default())
        .and_utc();

    WeatherObservation {
        timestamp,
        temperature: mean(samples.iter().filter_map(|o| o.temperature)),
        precipitation: samples.iter().map(|o| o.precipitation).sum(),
        wind_speed: mean(samples.iter().filter_map(|o| o.wind_speed)),
        cloud_cover: mean(samples.iter().filter_map(|o| o.cloud_cover)),
        visibility: mean(samples.iter().filter_map(|o| o.visibility)),
        description: most_frequent_description(samples),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let collected: Vec<f64> = values.collect();
    if collected.is_empty() {
        None
    } else {
        Some(collected.iter().sum::<f64>() / collected.len() as f64)
    }
}

fn most_frequent_description(samples: &[&WeatherObservation]) -> String {
    // BTreeMap gives a deterministic winner when counts tie.
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for obs in samples {
        *counts.entry(obs.description.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(description, _)| description.to_string())
        .unwrap_or_default()
}
