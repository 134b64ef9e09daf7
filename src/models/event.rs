//! Event records and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::WeatherObservation;
use crate::scoring::{Condition, ScoreBreakdown};

/// Category of event, used to select a weather profile.
///
/// Unknown strings deserialize to `Other`, which maps to the default profile
/// rather than an error.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    OutdoorSports,
    FormalEvents,
    #[serde(other)]
    Other,
}

impl EventType {
    /// Stable identifier used in logs and cache keys
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::OutdoorSports => "outdoor_sports",
            EventType::FormalEvents => "formal_events",
            EventType::Other => "other",
        }
    }
}

/// A planned event with the last computed weather assessment attached.
///
/// The score fields are a cache owned by the store; the scoring engine
/// recomputes them from scratch on every call.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub event_type: EventType,
    pub description: Option<String>,
    /// Alert/reminder recipient; no notifications are sent when absent
    pub email: Option<String>,
    pub weather: Option<WeatherObservation>,
    pub weather_score: Option<f64>,
    pub weather_condition: Option<Condition>,
    pub weather_breakdown: Option<ScoreBreakdown>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating an event
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EventCreate {
    pub name: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub event_type: EventType,
    pub description: Option<String>,
    pub email: Option<String>,
}

/// Payload for partially updating an event
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct EventUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub event_type: Option<EventType>,
    pub description: Option<String>,
    pub email: Option<String>,
}

impl Event {
    /// Build a fresh event from a create payload
    #[must_use]
    pub fn from_create(payload: EventCreate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: payload.name,
            location: payload.location,
            date: payload.date,
            event_type: payload.event_type,
            description: payload.description,
            email: payload.email,
            weather: None,
            weather_score: None,
            weather_condition: None,
            weather_breakdown: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, bumping `updated_at`.
    /// Returns true when the location or date changed and weather needs a refetch.
    pub fn apply_update(&mut self, update: EventUpdate) -> bool {
        let mut weather_stale = false;
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(location) = update.location {
            if location != self.location {
                weather_stale = true;
            }
            self.location = location;
        }
        if let Some(date) = update.date {
            if date != self.date {
                weather_stale = true;
            }
            self.date = date;
        }
        if let Some(event_type) = update.event_type {
            self.event_type = event_type;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(email) = update.email {
            self.email = Some(email);
        }
        self.updated_at = Utc::now();
        weather_stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_payload() -> EventCreate {
        EventCreate {
            name: "Company picnic".to_string(),
            location: "Berlin".to_string(),
            date: Utc::now() + chrono::Duration::days(3),
            event_type: EventType::OutdoorSports,
            description: None,
            email: Some("organizer@example.com".to_string()),
        }
    }

    #[test]
    fn test_unknown_event_type_deserializes_to_other() {
        let parsed: EventType = serde_json::from_str("\"garden_party\"").unwrap();
        assert_eq!(parsed, EventType::Other);

        let known: EventType = serde_json::from_str("\"outdoor_sports\"").unwrap();
        assert_eq!(known, EventType::OutdoorSports);
    }

    #[test]
    fn test_apply_update_flags_stale_weather() {
        let mut event = Event::from_create(create_payload());
        assert!(!event.apply_update(EventUpdate {
            name: Some("Team picnic".to_string()),
            ..Default::default()
        }));

        assert!(event.apply_update(EventUpdate {
            location: Some("Hamburg".to_string()),
            ..Default::default()
        }));
        assert_eq!(event.location, "Hamburg");
        assert_eq!(event.name, "Team picnic");
    }
}
