//! Data models for events, locations, and weather observations

pub mod event;
pub mod location;
pub mod weather;

pub use event::{Event, EventCreate, EventType, EventUpdate};
pub use location::Location;
pub use weather::WeatherObservation;
