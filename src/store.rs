//! JSON-file-backed event store.
//!
//! Events live in memory behind an `RwLock` and are written back to one JSON
//! file after every mutation. The last computed weather assessment is stored
//! on the event as a cache; the scoring engine itself never persists
//! anything.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::EventCastError;
use crate::models::{Event, EventCreate, EventUpdate, WeatherObservation};
use crate::scoring::ScoreBreakdown;

pub struct EventStore {
    path: PathBuf,
    events: RwLock<HashMap<Uuid, Event>>,
}

impl EventStore {
    /// Open the store, loading any existing events file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, EventCastError> {
        let path = path.as_ref().to_path_buf();
        let events = if tokio::fs::try_exists(&path).await? {
            let contents = tokio::fs::read_to_string(&path).await?;
            let list: Vec<Event> = serde_json::from_str(&contents).map_err(|e| {
                EventCastError::store(format!("Failed to parse {}: {e}", path.display()))
            })?;
            tracing::info!(count = list.len(), path = %path.display(), "loaded events");
            list.into_iter().map(|event| (event.id, event)).collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            events: RwLock::new(events),
        })
    }

    pub async fn create(&self, payload: EventCreate) -> Result<Event, EventCastError> {
        if payload.name.trim().is_empty() {
            return Err(EventCastError::validation("Event name cannot be empty"));
        }
        if payload.location.trim().is_empty() {
            return Err(EventCastError::validation("Event location cannot be empty"));
        }

        let event = Event::from_create(payload);
        {
            let mut events = self.events.write().await;
            events.insert(event.id, event.clone());
        }
        self.persist().await?;
        tracing::info!(id = %event.id, name = %event.name, "created event");
        Ok(event)
    }

    pub async fn get(&self, id: Uuid) -> Result<Event, EventCastError> {
        self.events
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| EventCastError::not_found(format!("Event {id}")))
    }

    /// All events, ordered by date.
    pub async fn list(&self) -> Vec<Event> {
        let mut all: Vec<Event> = self.events.read().await.values().cloned().collect();
        all.sort_by_key(|event| event.date);
        all
    }

    /// Apply a partial update. The returned flag is true when location or
    /// date changed and the cached weather is stale.
    pub async fn update(
        &self,
        id: Uuid,
        update: EventUpdate,
    ) -> Result<(Event, bool), EventCastError> {
        let (event, weather_stale) = {
            let mut events = self.events.write().await;
            let event = events
                .get_mut(&id)
                .ok_or_else(|| EventCastError::not_found(format!("Event {id}")))?;
            let weather_stale = event.apply_update(update);
            if weather_stale {
                event.weather = None;
                event.weather_score = None;
                event.weather_condition = None;
                event.weather_breakdown = None;
            }
            (event.clone(), weather_stale)
        };
        self.persist().await?;
        Ok((event, weather_stale))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), EventCastError> {
        {
            let mut events = self.events.write().await;
            events
                .remove(&id)
                .ok_or_else(|| EventCastError::not_found(format!("Event {id}")))?;
        }
        self.persist().await?;
        tracing::info!(id = %id, "deleted event");
        Ok(())
    }

    /// Events starting within the next `hours` hours, ordered by date.
    pub async fn upcoming(&self, hours: i64) -> Vec<Event> {
        let now = Utc::now();
        let horizon = now + Duration::hours(hours);
        let mut matches: Vec<Event> = self
            .events
            .read()
            .await
            .values()
            .filter(|event| event.date >= now && event.date <= horizon)
            .cloned()
            .collect();
        matches.sort_by_key(|event| event.date);
        matches
    }

    /// Events with a date inside `[start, end]`, ordered by date.
    pub async fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Event> {
        let mut matches: Vec<Event> = self
            .events
            .read()
            .await
            .values()
            .filter(|event| event.date >= start && event.date <= end)
            .cloned()
            .collect();
        matches.sort_by_key(|event| event.date);
        matches
    }

    /// Attach the latest weather assessment to an event.
    pub async fn record_assessment(
        &self,
        id: Uuid,
        observation: WeatherObservation,
        breakdown: ScoreBreakdown,
    ) -> Result<Event, EventCastError> {
        let event = {
            let mut events = self.events.write().await;
            let event = events
                .get_mut(&id)
                .ok_or_else(|| EventCastError::not_found(format!("Event {id}")))?;
            event.weather = Some(observation);
            event.weather_score = Some(breakdown.score);
            event.weather_condition = Some(breakdown.condition);
            event.weather_breakdown = Some(breakdown);
            event.updated_at = Utc::now();
            event.clone()
        };
        self.persist().await?;
        Ok(event)
    }

    /// Write the current event set to disk. The snapshot is taken under the
    /// read lock, the file write happens outside it.
    async fn persist(&self) -> Result<(), EventCastError> {
        let snapshot = {
            let events = self.events.read().await;
            let mut list: Vec<Event> = events.values().cloned().collect();
            list.sort_by_key(|event| event.created_at);
            list
        };

        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| EventCastError::store(format!("Failed to serialize events: {e}")))?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            EventCastError::store(format!("Failed to write {}: {e}", self.path.display()))
        })?;
        Ok(())
    }
}
