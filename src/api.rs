//! HTTP API: event CRUD, alternative dates, on-demand weather checks.
//!
//! Everything a handler needs arrives through [`AppState`]; there are no
//! process-global statics.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EventCastConfig;
use crate::error::EventCastError;
use crate::models::{Event, EventCreate, EventType, EventUpdate, Location, WeatherObservation};
use crate::notify::Notifier;
use crate::provider::WeatherProvider;
use crate::scoring::{AlternativeCandidate, ScoreBreakdown, ScoringEngine, TrendReport};
use crate::store::EventStore;

/// Shared application dependencies, built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EventCastConfig>,
    pub engine: ScoringEngine,
    pub provider: Arc<dyn WeatherProvider>,
    pub store: Arc<EventStore>,
    pub notifier: Option<Arc<Notifier>>,
}

/// Error wrapper mapping domain failures to HTTP statuses.
pub struct ApiError(EventCastError);

impl From<EventCastError> for ApiError {
    fn from(err: EventCastError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EventCastError::NotFound { .. } | EventCastError::LocationNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            EventCastError::Validation { .. } => StatusCode::BAD_REQUEST,
            EventCastError::RateLimited { .. } | EventCastError::Provider { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.0.user_message() }));
        (status, body).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/{id}/alternatives", get(get_alternatives))
        .route("/events/{id}/trend", get(get_trend))
        .route("/events/{id}/weather-check", post(run_weather_check))
        .route("/weather/{location}/{date}", get(get_weather))
        .with_state(state)
}

/// Fetch weather for an event, score it, and persist the assessment.
pub(crate) async fn fetch_and_score(
    state: &AppState,
    event: &Event,
) -> Result<Event, EventCastError> {
    let location = state.provider.get_coordinates(&event.location).await?;
    let observation = state.provider.get_observation(&location, event.date).await?;
    let breakdown = state.engine.compute_suitability(&observation, event.event_type);
    state
        .store
        .record_assessment(event.id, observation, breakdown)
        .await
}

async fn list_events(State(state): State<AppState>) -> ApiResult<Vec<Event>> {
    Ok(Json(state.store.list().await))
}

async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<EventCreate>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.store.create(payload).await?;

    // Initial assessment is best-effort; the event exists either way.
    let event = match fetch_and_score(&state, &event).await {
        Ok(assessed) => assessed,
        Err(e) => {
            tracing::warn!(event = %event.name, error = %e, "initial weather check failed");
            event
        }
    };

    Ok((StatusCode::CREATED, Json(event)))
}

async fn get_event(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Event> {
    Ok(Json(state.store.get(id).await?))
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EventUpdate>,
) -> ApiResult<Event> {
    let (event, weather_stale) = state.store.update(id, payload).await?;

    let event = if weather_stale {
        match fetch_and_score(&state, &event).await {
            Ok(assessed) => assessed,
            Err(e) => {
                tracing::warn!(event = %event.name, error = %e, "weather refresh failed");
                event
            }
        }
    } else {
        event
    };

    Ok(Json(event))
}

async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct AlternativesQuery {
    /// Only return dates scoring strictly better than the event's current score
    #[serde(default)]
    better: bool,
}

#[derive(Serialize)]
struct AlternativesResponse {
    event_id: Uuid,
    base_date: NaiveDate,
    alternatives: Vec<AlternativeCandidate>,
}

async fn get_alternatives(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AlternativesQuery>,
) -> ApiResult<AlternativesResponse> {
    let event = state.store.get(id).await?;
    let location = state.provider.get_coordinates(&event.location).await?;
    let window = state
        .provider
        .get_forecast(&location, state.config.weather.forecast_days)
        .await?;

    let floor = if query.better { event.weather_score } else { None };
    let base_date = event.date.date_naive();
    let alternatives = state.engine.rank_alternatives(
        &event.location,
        base_date,
        event.event_type,
        &window,
        floor,
    );

    Ok(Json(AlternativesResponse {
        event_id: event.id,
        base_date,
        alternatives,
    }))
}

#[derive(Serialize)]
struct TrendResponse {
    event_id: Uuid,
    samples: usize,
    report: TrendReport,
}

/// How the forecast window for the event's location is developing.
async fn get_trend(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TrendResponse> {
    let event = state.store.get(id).await?;
    let location = state.provider.get_coordinates(&event.location).await?;
    let window = state
        .provider
        .get_forecast(&location, state.config.weather.forecast_days)
        .await?;
    let report = state.engine.analyze_trend(&window);

    Ok(Json(TrendResponse {
        event_id: event.id,
        samples: window.len(),
        report,
    }))
}

async fn run_weather_check(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Event> {
    let event = state.store.get(id).await?;
    Ok(Json(fetch_and_score(&state, &event).await?))
}

#[derive(Deserialize)]
struct WeatherQuery {
    event_type: Option<EventType>,
}

#[derive(Serialize)]
struct WeatherResponse {
    location: Location,
    date: NaiveDate,
    observation: WeatherObservation,
    breakdown: ScoreBreakdown,
}

async fn get_weather(
    State(state): State<AppState>,
    Path((location_name, date)): Path<(String, NaiveDate)>,
    Query(query): Query<WeatherQuery>,
) -> ApiResult<WeatherResponse> {
    let location = state.provider.get_coordinates(&location_name).await?;
    let noon = date
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| EventCastError::validation("Invalid date"))?
        .and_utc();
    let observation = state.provider.get_observation(&location, noon).await?;
    let event_type = query.event_type.unwrap_or(EventType::Other);
    let breakdown = state.engine.compute_suitability(&observation, event_type);

    Ok(Json(WeatherResponse {
        location,
        date,
        observation,
        breakdown,
    }))
}
