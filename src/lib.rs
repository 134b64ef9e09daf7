//! `EventCast` - Weather-aware event planning
//!
//! This library provides weather suitability scoring for planned events,
//! alternative-date ranking, trend analysis over forecast windows, and the
//! surrounding service plumbing (provider, store, notifications, HTTP API).

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod provider;
pub mod scoring;
pub mod store;
pub mod tasks;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use cache::PersistentCache;
pub use config::EventCastConfig;
pub use error::EventCastError;
pub use models::{Event, EventCreate, EventType, EventUpdate, Location, WeatherObservation};
pub use notify::Notifier;
pub use provider::{OpenMeteoProvider, WeatherProvider};
pub use scoring::{
    AlternativeCandidate, Condition, ConditionBands, ScoreBreakdown, ScoringEngine, ScoringMode,
    TrendDirection, TrendReport,
};
pub use store::EventStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, EventCastError>;
