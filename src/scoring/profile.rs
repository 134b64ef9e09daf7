//! Event-type weather profiles.
//!
//! Each profile assigns every factor a weight plus an optimal and a wider
//! acceptable range. Weights across the five factors sum to 1.0 per profile;
//! `tests::weights_sum_to_one` enforces the invariant.

use crate::models::EventType;

/// Range-type factor: scored by where the value falls relative to two nested
/// intervals (temperature, wind, cloud cover).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFactor {
    pub optimal_min: f64,
    pub optimal_max: f64,
    pub acceptable_min: f64,
    pub acceptable_max: f64,
    pub weight: f64,
}

/// Ceiling-type factor: lower is better (precipitation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CeilingFactor {
    pub optimal_max: f64,
    pub acceptable_max: f64,
    pub weight: f64,
}

/// Floor-type factor: higher is better (visibility).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorFactor {
    pub optimal_min: f64,
    pub acceptable_min: f64,
    pub weight: f64,
}

/// Per-event-type weather requirements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventTypeProfile {
    pub temperature: RangeFactor,
    pub wind: RangeFactor,
    pub precipitation: CeilingFactor,
    pub cloud_cover: RangeFactor,
    pub visibility: FloorFactor,
}

/// Outdoor, physically active events: tolerant of wind, intolerant of rain.
pub const OUTDOOR_SPORTS: EventTypeProfile = EventTypeProfile {
    temperature: RangeFactor {
        optimal_min: 18.0,
        optimal_max: 25.0,
        acceptable_min: 15.0,
        acceptable_max: 30.0,
        weight: 0.30,
    },
    wind: RangeFactor {
        optimal_min: 0.0,
        optimal_max: 15.0,
        acceptable_min: 0.0,
        acceptable_max: 20.0,
        weight: 0.15,
    },
    precipitation: CeilingFactor {
        optimal_max: 0.0,
        acceptable_max: 0.5,
        weight: 0.30,
    },
    cloud_cover: RangeFactor {
        optimal_min: 0.0,
        optimal_max: 30.0,
        acceptable_min: 0.0,
        acceptable_max: 50.0,
        weight: 0.10,
    },
    visibility: FloorFactor {
        optimal_min: 8000.0,
        acceptable_min: 5000.0,
        weight: 0.15,
    },
};

/// Formal or dress-sensitive events: a narrow comfort band.
pub const FORMAL_EVENTS: EventTypeProfile = EventTypeProfile {
    temperature: RangeFactor {
        optimal_min: 20.0,
        optimal_max: 24.0,
        acceptable_min: 18.0,
        acceptable_max: 26.0,
        weight: 0.30,
    },
    wind: RangeFactor {
        optimal_min: 0.0,
        optimal_max: 10.0,
        acceptable_min: 0.0,
        acceptable_max: 15.0,
        weight: 0.15,
    },
    precipitation: CeilingFactor {
        optimal_max: 0.0,
        acceptable_max: 1.0,
        weight: 0.30,
    },
    cloud_cover: RangeFactor {
        optimal_min: 0.0,
        optimal_max: 40.0,
        acceptable_min: 0.0,
        acceptable_max: 60.0,
        weight: 0.10,
    },
    visibility: FloorFactor {
        optimal_min: 8000.0,
        acceptable_min: 5000.0,
        weight: 0.15,
    },
};

/// Relaxed fallback used for unknown event types.
pub const DEFAULT: EventTypeProfile = EventTypeProfile {
    temperature: RangeFactor {
        optimal_min: 15.0,
        optimal_max: 30.0,
        acceptable_min: 10.0,
        acceptable_max: 35.0,
        weight: 0.30,
    },
    wind: RangeFactor {
        optimal_min: 0.0,
        optimal_max: 20.0,
        acceptable_min: 0.0,
        acceptable_max: 25.0,
        weight: 0.15,
    },
    precipitation: CeilingFactor {
        optimal_max: 0.5,
        acceptable_max: 1.0,
        weight: 0.30,
    },
    cloud_cover: RangeFactor {
        optimal_min: 0.0,
        optimal_max: 50.0,
        acceptable_min: 0.0,
        acceptable_max: 70.0,
        weight: 0.10,
    },
    visibility: FloorFactor {
        optimal_min: 8000.0,
        acceptable_min: 5000.0,
        weight: 0.15,
    },
};

impl EventTypeProfile {
    /// Look up the profile for an event type; unknown types get the default.
    #[must_use]
    pub fn for_event_type(event_type: EventType) -> &'static EventTypeProfile {
        match event_type {
            EventType::OutdoorSports => &OUTDOOR_SPORTS,
            EventType::FormalEvents => &FORMAL_EVENTS,
            EventType::Other => &DEFAULT,
        }
    }

    /// Sum of factor weights
    #[must_use]
    pub fn weight_sum(&self) -> f64 {
        self.temperature.weight
            + self.wind.weight
            + self.precipitation.weight
            + self.cloud_cover.weight
            + self.visibility.weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&OUTDOOR_SPORTS)]
    #[case(&FORMAL_EVENTS)]
    #[case(&DEFAULT)]
    fn weights_sum_to_one(#[case] profile: &EventTypeProfile) {
        assert!((profile.weight_sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_event_type_gets_default_profile() {
        let profile = EventTypeProfile::for_event_type(EventType::Other);
        assert_eq!(profile, &DEFAULT);
    }

    #[test]
    fn acceptable_ranges_contain_optimal_ranges() {
        for profile in [&OUTDOOR_SPORTS, &FORMAL_EVENTS, &DEFAULT] {
            assert!(profile.temperature.acceptable_min <= profile.temperature.optimal_min);
            assert!(profile.temperature.acceptable_max >= profile.temperature.optimal_max);
            assert!(profile.wind.acceptable_max >= profile.wind.optimal_max);
            assert!(profile.precipitation.acceptable_max >= profile.precipitation.optimal_max);
            assert!(profile.visibility.acceptable_min <= profile.visibility.optimal_min);
        }
    }
}
