//! Integration tests exercising the scoring engine, event store, and
//! background check cycle together through the library API.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use eventcast::api::AppState;
use eventcast::config::EventCastConfig;
use eventcast::models::{EventCreate, EventType, Location, WeatherObservation};
use eventcast::provider::WeatherProvider;
use eventcast::scoring::{Condition, ScoringEngine, TrendDirection};
use eventcast::store::EventStore;
use eventcast::{EventCastError, tasks};

fn observation(timestamp: DateTime<Utc>, temperature: f64, precipitation: f64) -> WeatherObservation {
    WeatherObservation {
        timestamp,
        temperature: Some(temperature),
        precipitation,
        wind_speed: Some(5.0),
        cloud_cover: Some(20.0),
        visibility: Some(10_000.0),
        description: if precipitation > 0.0 {
            "Slight rain".to_string()
        } else {
            "Clear sky".to_string()
        },
    }
}

/// A deterministic week: perfect weather except one rainy day.
fn synthetic_week(rainy_day: u32) -> Vec<WeatherObservation> {
    let mut window = Vec::new();
    for day in 10..17 {
        for hour in (0..24).step_by(3) {
            let timestamp = Utc.with_ymd_and_hms(2026, 6, day, hour, 0, 0).unwrap();
            let rain = if day == rainy_day { 2.0 } else { 0.0 };
            window.push(observation(timestamp, 22.0, rain));
        }
    }
    window
}

#[test]
fn picnic_on_a_rainy_day_gets_better_alternatives() {
    let engine = ScoringEngine::default();
    let base_date = NaiveDate::from_ymd_opt(2026, 6, 12).unwrap();
    let window = synthetic_week(12);

    // The event day itself is rainy.
    let rainy_noon = observation(
        Utc.with_ymd_and_hms(2026, 6, 12, 12, 0, 0).unwrap(),
        22.0,
        2.0,
    );
    let rainy = engine.compute_suitability(&rainy_noon, EventType::OutdoorSports);
    assert!(rainy.score < 100.0);
    assert_eq!(rainy.precipitation.score, 30.0);

    let alternatives = engine.rank_alternatives(
        "Berlin",
        base_date,
        EventType::OutdoorSports,
        &window,
        Some(rainy.score),
    );

    assert!(!alternatives.is_empty());
    assert!(alternatives.len() <= 5);
    for candidate in &alternatives {
        assert_ne!(candidate.date, base_date);
        assert!(candidate.score > rainy.score);
        assert_eq!(candidate.condition, Condition::Excellent);
    }
    // Identical scores: nearest dates win.
    assert_eq!(
        alternatives[0].date,
        NaiveDate::from_ymd_opt(2026, 6, 11).unwrap()
    );
}

#[test]
fn formal_event_is_stricter_than_outdoor_sports() {
    let engine = ScoringEngine::default();
    // 27°C with a fresh breeze: acceptable for sports, outside formal comfort.
    let obs = observation(Utc::now(), 27.0, 0.0);

    let sports = engine.compute_suitability(&obs, EventType::OutdoorSports);
    let formal = engine.compute_suitability(&obs, EventType::FormalEvents);
    assert!(formal.score < sports.score);
}

#[test]
fn steadily_worsening_forecast_is_reported_as_a_trend() {
    let engine = ScoringEngine::default();
    let start = Utc.with_ymd_and_hms(2026, 6, 10, 0, 0, 0).unwrap();
    let window: Vec<WeatherObservation> = (0..24)
        .map(|hour| {
            let mut obs = observation(start + Duration::hours(hour), 20.0, 0.0);
            obs.wind_speed = Some(5.0 + hour as f64); // wind picking up all day
            obs
        })
        .collect();

    let report = engine.analyze_trend(&window);
    assert_eq!(report.wind, TrendDirection::Increasing);
    assert_eq!(report.temperature, TrendDirection::Stable);
    assert_eq!(report.wind.as_outlook(true), "worsening");
}

struct CannedProvider {
    window: Vec<WeatherObservation>,
}

#[async_trait]
impl WeatherProvider for CannedProvider {
    async fn get_coordinates(&self, name: &str) -> Result<Location, EventCastError> {
        Ok(Location::new(52.52, 13.40, name.to_string()))
    }

    async fn get_forecast(
        &self,
        _location: &Location,
        _days_ahead: u32,
    ) -> Result<Vec<WeatherObservation>, EventCastError> {
        Ok(self.window.clone())
    }

    async fn get_observation(
        &self,
        _location: &Location,
        at: DateTime<Utc>,
    ) -> Result<WeatherObservation, EventCastError> {
        self.window
            .iter()
            .min_by_key(|obs| (obs.timestamp - at).num_seconds().abs())
            .cloned()
            .ok_or_else(|| EventCastError::provider("empty window"))
    }
}

#[tokio::test]
async fn background_cycle_scores_and_persists_upcoming_events() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(
        EventStore::open(dir.path().join("events.json"))
            .await
            .unwrap(),
    );

    // Canned forecast centred on the event date.
    let event_date = Utc::now() + Duration::hours(48);
    let window: Vec<WeatherObservation> = (-24..72)
        .map(|hour| observation(event_date + Duration::hours(hour), 22.0, 0.0))
        .collect();

    let config = Arc::new(EventCastConfig::default());
    let state = AppState {
        engine: config.scoring.engine(),
        config,
        provider: Arc::new(CannedProvider { window }),
        store: store.clone(),
        notifier: None,
    };

    let event = store
        .create(EventCreate {
            name: "Company picnic".to_string(),
            location: "Berlin".to_string(),
            date: event_date,
            event_type: EventType::OutdoorSports,
            description: None,
            email: None,
        })
        .await
        .unwrap();
    assert!(event.weather_score.is_none());

    tasks::run_cycle(&state).await;

    let assessed = store.get(event.id).await.unwrap();
    assert_eq!(assessed.weather_score, Some(100.0));
    assert_eq!(assessed.weather_condition, Some(Condition::Excellent));
    assert!(assessed.weather_breakdown.is_some());

    // The assessment survives a restart.
    let reopened = EventStore::open(dir.path().join("events.json"))
        .await
        .unwrap();
    let reloaded = reopened.get(event.id).await.unwrap();
    assert_eq!(reloaded.weather_score, Some(100.0));
}
