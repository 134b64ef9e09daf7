//! Weather observation model and display methods

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single typed weather observation for a location and point in time.
///
/// Provider responses are parsed into this value at the boundary; the scoring
/// engine never sees raw provider payloads. Fields the provider omitted stay
/// `None` and score 0 for their factor instead of failing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherObservation {
    /// Timestamp for this weather observation
    pub timestamp: DateTime<Utc>,
    /// Temperature in Celsius
    pub temperature: Option<f64>,
    /// Precipitation amount in mm (0 when the provider reports none)
    pub precipitation: f64,
    /// Wind speed in m/s
    pub wind_speed: Option<f64>,
    /// Cloud cover percentage (0-100)
    pub cloud_cover: Option<f64>,
    /// Visibility in meters
    pub visibility: Option<f64>,
    /// Human-readable description of weather conditions
    pub description: String,
}

impl WeatherObservation {
    /// Convert wind direction from degrees to cardinal direction
    #[must_use]
    pub fn wind_direction_to_cardinal(degrees: u16) -> &'static str {
        match degrees {
            0..=11 | 349..=360 => "N",
            12..=33 => "NNE",
            34..=56 => "NE",
            57..=78 => "ENE",
            79..=101 => "E",
            102..=123 => "ESE",
            124..=146 => "SE",
            147..=168 => "SSE",
            169..=191 => "S",
            192..=213 => "SSW",
            214..=236 => "SW",
            237..=258 => "WSW",
            259..=281 => "W",
            282..=303 => "WNW",
            304..=326 => "NW",
            327..=348 => "NNW",
            _ => "Unknown",
        }
    }

    /// Format temperature with unit, or a placeholder when absent
    #[must_use]
    pub fn format_temperature(&self) -> String {
        match self.temperature {
            Some(t) => format!("{t:.1}°C"),
            None => "n/a".to_string(),
        }
    }

    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        match self.wind_speed {
            Some(w) => format!("{w:.1} m/s"),
            None => "n/a".to_string(),
        }
    }

    /// Ratio of populated fields, used for trend confidence.
    ///
    /// Timestamp, precipitation and description are always present; the four
    /// optional metrics count individually.
    #[must_use]
    pub fn field_completeness(&self) -> f64 {
        let present = 3
            + usize::from(self.temperature.is_some())
            + usize::from(self.wind_speed.is_some())
            + usize::from(self.cloud_cover.is_some())
            + usize::from(self.visibility.is_some());
        present as f64 / 7.0
    }
}
