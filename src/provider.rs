//! Weather provider boundary.
//!
//! Raw provider payloads are parsed into typed [`WeatherObservation`]s here;
//! nothing downstream ever sees provider JSON. Responses are cached with a
//! jittered TTL so a burst of events at the same location does not hammer the
//! API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cache::PersistentCache;
use crate::config::WeatherConfig;
use crate::error::EventCastError;
use crate::models::{Location, WeatherObservation};

/// Requested time must be within this distance of a forecast sample unless
/// nearest-sample fallback is enabled.
const MAX_SAMPLE_DISTANCE_HOURS: i64 = 3;

/// Async boundary to a weather data source.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Resolve a place name to coordinates.
    async fn get_coordinates(&self, name: &str) -> Result<Location, EventCastError>;

    /// Hourly forecast window for a location, `days_ahead` days long.
    async fn get_forecast(
        &self,
        location: &Location,
        days_ahead: u32,
    ) -> Result<Vec<WeatherObservation>, EventCastError>;

    /// The observation closest to `at` within the forecast window.
    async fn get_observation(
        &self,
        location: &Location,
        at: DateTime<Utc>,
    ) -> Result<WeatherObservation, EventCastError>;
}

/// Open-Meteo backed provider (no API key required).
pub struct OpenMeteoProvider {
    client: reqwest::Client,
    base_url: String,
    geocoding_url: String,
    cache: Arc<PersistentCache>,
    cache_ttl: Duration,
    allow_current_fallback: bool,
}

impl OpenMeteoProvider {
    pub fn new(
        config: &WeatherConfig,
        cache: Arc<PersistentCache>,
        cache_ttl: Duration,
    ) -> Result<Self, EventCastError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .build()
            .map_err(|e| EventCastError::provider(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            geocoding_url: config.geocoding_url.clone(),
            cache,
            cache_ttl,
            allow_current_fallback: config.allow_current_fallback,
        })
    }

    async fn cached<T>(&self, key: &str) -> Option<T>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
    {
        match self.cache.get::<T>(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed; fetching fresh");
                None
            }
        }
    }

    async fn store_cached<T>(&self, key: &str, value: T)
    where
        T: serde::Serialize + Send + std::fmt::Debug + 'static,
    {
        if let Err(e) = self.cache.put_jittered(key, value, self.cache_ttl).await {
            tracing::warn!(key, error = %e, "cache write failed");
        }
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, EventCastError> {
        tracing::debug!("Calling the API");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EventCastError::provider(format!("Request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EventCastError::rate_limited(
                "Provider returned 429 Too Many Requests",
            ));
        }
        if !response.status().is_success() {
            return Err(EventCastError::provider(format!(
                "Provider returned HTTP {}",
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EventCastError::provider(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_coordinates(&self, name: &str) -> Result<Location, EventCastError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EventCastError::validation("Location cannot be empty"));
        }

        let key = format!("geocode:{}", trimmed.to_lowercase());
        if let Some(cached) = self.cached::<Location>(&key).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/search?name={}&count=5&language=en&format=json",
            self.geocoding_url,
            urlencoding::encode(trimmed)
        );
        let response: openmeteo::GeocodingResponse = self.fetch_json(&url).await?;

        let location: Location = response
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| EventCastError::location_not_found(trimmed))?;

        self.store_cached(&key, location.clone()).await;
        Ok(location)
    }

    #[tracing::instrument(level = "debug", skip(self, location), fields(location = %location.name))]
    async fn get_forecast(
        &self,
        location: &Location,
        days_ahead: u32,
    ) -> Result<Vec<WeatherObservation>, EventCastError> {
        let key = location.cache_key(&format!("forecast:{days_ahead}"));
        if let Some(cached) = self.cached::<Vec<WeatherObservation>>(&key).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/forecast?latitude={}&longitude={}&hourly=temperature_2m,windspeed_10m,precipitation,cloudcover,visibility,weathercode&timezone=UTC&forecast_days={}&wind_speed_unit=ms",
            self.base_url, location.latitude, location.longitude, days_ahead
        );
        let response: openmeteo::ForecastResponse = self.fetch_json(&url).await?;
        let observations = openmeteo::observations_from_response(&response);

        self.store_cached(&key, observations.clone()).await;
        Ok(observations)
    }

    async fn get_observation(
        &self,
        location: &Location,
        at: DateTime<Utc>,
    ) -> Result<WeatherObservation, EventCastError> {
        let days = forecast_days_covering(at);
        let window = self.get_forecast(location, days).await?;

        let nearest = window
            .into_iter()
            .min_by_key(|obs| (obs.timestamp - at).num_seconds().abs())
            .ok_or_else(|| EventCastError::provider("Forecast window is empty"))?;

        let distance_hours = (nearest.timestamp - at).num_hours().abs();
        if distance_hours > MAX_SAMPLE_DISTANCE_HOURS && !self.allow_current_fallback {
            return Err(EventCastError::provider(format!(
                "No forecast sample within {MAX_SAMPLE_DISTANCE_HOURS}h of {at}; nearest is {distance_hours}h away"
            )));
        }
        Ok(nearest)
    }
}

/// Forecast length needed so the window covers `at`, clamped to the
/// provider's 16-day maximum. The hour count is rounded up: truncating
/// would cut the window short of the target day for times almost exactly
/// N days out.
fn forecast_days_covering(at: DateTime<Utc>) -> u32 {
    let hours_out = (at - Utc::now()).num_hours().max(0);
    let days_out = (hours_out as u64).div_ceil(24);
    u32::try_from(days_out + 1).unwrap_or(16).clamp(1, 16)
}

/// Open-Meteo API response structures and conversion utilities
mod openmeteo {
    use chrono::NaiveDateTime;
    use serde::Deserialize;

    use crate::models::{Location, WeatherObservation};

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub hourly: Option<HourlyData>,
    }

    /// Hourly weather data; every metric array may be missing entirely or
    /// hold nulls per sample.
    #[derive(Debug, Deserialize)]
    pub struct HourlyData {
        pub time: Vec<String>,
        #[serde(rename = "temperature_2m")]
        pub temperature: Option<Vec<Option<f64>>>,
        #[serde(rename = "windspeed_10m")]
        pub wind_speed: Option<Vec<Option<f64>>>,
        pub precipitation: Option<Vec<Option<f64>>>,
        #[serde(rename = "cloudcover")]
        pub cloud_cover: Option<Vec<Option<f64>>>,
        pub visibility: Option<Vec<Option<f64>>>,
        #[serde(rename = "weathercode")]
        pub weather_code: Option<Vec<Option<u8>>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResponse {
        pub results: Option<Vec<GeocodingResult>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResult {
        pub name: String,
        pub latitude: f64,
        pub longitude: f64,
        pub country: Option<String>,
    }

    impl From<GeocodingResult> for Location {
        fn from(result: GeocodingResult) -> Self {
            Location {
                latitude: result.latitude,
                longitude: result.longitude,
                name: result.name,
                country: result.country,
            }
        }
    }

    /// Convert Open-Meteo weather code to human-readable description
    #[must_use]
    pub fn weather_code_to_description(code: u8) -> &'static str {
        match code {
            0 => "Clear sky",
            1 => "Mainly clear",
            2 => "Partly cloudy",
            3 => "Overcast",
            45 => "Fog",
            48 => "Depositing rime fog",
            51 => "Light drizzle",
            53 => "Moderate drizzle",
            55 => "Dense drizzle",
            56 => "Light freezing drizzle",
            57 => "Dense freezing drizzle",
            61 => "Slight rain",
            63 => "Moderate rain",
            65 => "Heavy rain",
            66 => "Light freezing rain",
            67 => "Heavy freezing rain",
            71 => "Slight snow fall",
            73 => "Moderate snow fall",
            75 => "Heavy snow fall",
            77 => "Snow grains",
            80 => "Slight rain showers",
            81 => "Moderate rain showers",
            82 => "Violent rain showers",
            85 => "Slight snow showers",
            86 => "Heavy snow showers",
            95 => "Thunderstorm",
            96 => "Thunderstorm with slight hail",
            99 => "Thunderstorm with heavy hail",
            _ => "Unknown",
        }
    }

    fn metric_at(metric: Option<&Vec<Option<f64>>>, index: usize) -> Option<f64> {
        metric.and_then(|values| values.get(index).copied().flatten())
    }

    /// Convert a forecast response into typed observations.
    /// Samples with an unparsable timestamp are dropped.
    #[must_use]
    pub fn observations_from_response(response: &ForecastResponse) -> Vec<WeatherObservation> {
        let Some(hourly) = &response.hourly else {
            return Vec::new();
        };

        hourly
            .time
            .iter()
            .enumerate()
            .filter_map(|(i, time)| {
                let timestamp = NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
                    .ok()?
                    .and_utc();

                let code = hourly
                    .weather_code
                    .as_ref()
                    .and_then(|codes| codes.get(i).copied().flatten());

                Some(WeatherObservation {
                    timestamp,
                    temperature: metric_at(hourly.temperature.as_ref(), i),
                    precipitation: metric_at(hourly.precipitation.as_ref(), i).unwrap_or(0.0),
                    wind_speed: metric_at(hourly.wind_speed.as_ref(), i),
                    cloud_cover: metric_at(hourly.cloud_cover.as_ref(), i),
                    visibility: metric_at(hourly.visibility.as_ref(), i),
                    description: code
                        .map(weather_code_to_description)
                        .unwrap_or("Unknown")
                        .to_string(),
                })
            })
            .collect()
    }
}
