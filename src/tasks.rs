//! Background weather checks.
//!
//! A fixed tokio interval walks the upcoming events, refreshes their weather,
//! and sends alerts and reminders. A failure for one event is logged and
//! skipped; it never halts the cycle or the loop.

use std::time::Duration;

use chrono::Utc;

use crate::api::AppState;
use crate::error::EventCastError;
use crate::models::Event;
use crate::notify;

pub async fn run_periodic_checks(state: AppState) {
    let interval_minutes = state.config.notifications.check_interval_minutes;
    let mut ticker = tokio::time::interval(Duration::from_secs(u64::from(interval_minutes) * 60));
    tracing::info!(interval_minutes, "background weather checks started");

    loop {
        ticker.tick().await;
        run_cycle(&state).await;
    }
}

/// One pass over all events inside the forecast horizon.
pub async fn run_cycle(state: &AppState) {
    let horizon_hours = i64::from(state.config.weather.forecast_days) * 24;
    let events = state.store.upcoming(horizon_hours).await;
    tracing::debug!(count = events.len(), "running weather check cycle");

    for event in events {
        if let Err(e) = check_event(state, &event).await {
            tracing::warn!(event = %event.name, error = %e, "weather check failed; skipping event");
        }
    }
}

async fn check_event(state: &AppState, event: &Event) -> Result<(), EventCastError> {
    let previous_score = event.weather_score;
    let previous_condition = event.weather_condition;

    let location = state.provider.get_coordinates(&event.location).await?;
    let observation = state.provider.get_observation(&location, event.date).await?;
    let breakdown = state.engine.compute_suitability(&observation, event.event_type);
    tracing::debug!(
        event = %event.name,
        score = breakdown.score,
        condition = breakdown.condition.as_str(),
        "assessed event weather"
    );

    if let Some(notifier) = &state.notifier {
        let notifications = &state.config.notifications;

        if notify::is_significant_change(
            previous_score,
            previous_condition,
            &breakdown,
            notifications.change_threshold_pct,
        ) {
            if let Err(e) = notifier.send_change_alert(event, previous_score, &breakdown) {
                tracing::warn!(event = %event.name, error = %e, "change alert not delivered");
            }
        }

        let violations = notify::threshold_violations(&observation, notifications);
        if !violations.is_empty() {
            if let Err(e) = notifier.send_threshold_alert(event, &violations) {
                tracing::warn!(event = %event.name, error = %e, "threshold alert not delivered");
            }
        }

        let hours_until = (event.date - Utc::now()).num_hours();
        if (0..=i64::from(notifications.reminder_hours_before)).contains(&hours_until) {
            let window = state
                .provider
                .get_forecast(&location, state.config.weather.forecast_days)
                .await?;
            let hourly = state.engine.hourly_breakdown(
                &window,
                event.date.date_naive(),
                event.event_type,
            );
            if let Err(e) = notifier.send_reminder(event, &hourly) {
                tracing::warn!(event = %event.name, error = %e, "reminder not delivered");
            }
        }
    }

    state
        .store
        .record_assessment(event.id, observation, breakdown)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventCastConfig;
    use crate::models::{EventCreate, EventType, Location, WeatherObservation};
    use crate::provider::WeatherProvider;
    use crate::store::EventStore;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration, Timelike};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider serving a canned week of hourly weather; one location fails.
    struct FakeProvider {
        calls: AtomicUsize,
    }

    fn sample_at(timestamp: DateTime<Utc>) -> WeatherObservation {
        WeatherObservation {
            timestamp,
            temperature: Some(22.0),
            precipitation: 0.0,
            wind_speed: Some(5.0),
            cloud_cover: Some(20.0),
            visibility: Some(10_000.0),
            description: "Clear sky".to_string(),
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn get_coordinates(&self, name: &str) -> Result<Location, EventCastError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if name == "Atlantis" {
                return Err(EventCastError::location_not_found(name));
            }
            Ok(Location::new(52.52, 13.40, name.to_string()))
        }

        async fn get_forecast(
            &self,
            _location: &Location,
            days_ahead: u32,
        ) -> Result<Vec<WeatherObservation>, EventCastError> {
            let start = Utc::now()
                .with_minute(0)
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or_else(Utc::now);
            Ok((0..i64::from(days_ahead) * 24)
                .map(|hour| sample_at(start + ChronoDuration::hours(hour)))
                .collect())
        }

        async fn get_observation(
            &self,
            location: &Location,
            at: DateTime<Utc>,
        ) -> Result<WeatherObservation, EventCastError> {
            let window = self.get_forecast(location, 16).await?;
            window
                .into_iter()
                .min_by_key(|obs| (obs.timestamp - at).num_seconds().abs())
                .ok_or_else(|| EventCastError::provider("empty window"))
        }
    }

    async fn test_state(dir: &tempfile::TempDir) -> (AppState, Arc<FakeProvider>) {
        let provider = Arc::new(FakeProvider {
            calls: AtomicUsize::new(0),
        });
        let config = Arc::new(EventCastConfig::default());
        let state = AppState {
            engine: config.scoring.engine(),
            config,
            provider: provider.clone(),
            store: Arc::new(
                EventStore::open(dir.path().join("events.json"))
                    .await
                    .unwrap(),
            ),
            notifier: None,
        };
        (state, provider)
    }

    fn payload(name: &str, location: &str) -> EventCreate {
        EventCreate {
            name: name.to_string(),
            location: location.to_string(),
            date: Utc::now() + ChronoDuration::hours(48),
            event_type: EventType::OutdoorSports,
            description: None,
            email: None,
        }
    }

    #[tokio::test]
    async fn cycle_records_assessments() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = test_state(&dir).await;
        let event = state.store.create(payload("Picnic", "Berlin")).await.unwrap();

        run_cycle(&state).await;

        let assessed = state.store.get(event.id).await.unwrap();
        assert_eq!(assessed.weather_score, Some(100.0));
        assert!(assessed.weather.is_some());
    }

    #[tokio::test]
    async fn one_failing_event_does_not_halt_the_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let (state, provider) = test_state(&dir).await;
        state
            .store
            .create(payload("Lost city tour", "Atlantis"))
            .await
            .unwrap();
        let good = state.store.create(payload("Picnic", "Berlin")).await.unwrap();

        run_cycle(&state).await;

        let assessed = state.store.get(good.id).await.unwrap();
        assert!(assessed.weather_score.is_some());
        assert!(provider.calls.load(Ordering::SeqCst) >= 2);
    }
}
