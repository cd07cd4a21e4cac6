use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    SearchError, VERSION,
    config::DefaultsConfig,
    models::{Coordinate, VenueWithScore, WeatherSnapshot},
    search::SearchService,
};

#[derive(Clone)]
pub struct AppState {
    pub search: SearchService,
    pub defaults: DefaultsConfig,
}

/// Error body: `{"code": .., "message": ..}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    InvalidQuery(QueryRejection),
    MissingPostcode,
    Search(SearchError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::InvalidQuery(rejection) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_QUERY", rejection.body_text()),
            ),
            AppError::MissingPostcode => (
                StatusCode::BAD_REQUEST,
                ApiError::new("MISSING_POSTCODE", "Please provide a postcode."),
            ),
            AppError::Search(e) => {
                let status = match e {
                    SearchError::LocationUnknown { .. } => StatusCode::NOT_FOUND,
                    SearchError::InvalidRadius { .. } => StatusCode::BAD_REQUEST,
                    SearchError::LocationServiceUnavailable { .. }
                    | SearchError::WeatherUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, ApiError::new(e.kind(), e.user_message()))
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidQuery(rejection)
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        AppError::Search(err)
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub postcode: Option<String>,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub postcode: String,
    pub location: Coordinate,
    pub radius_km: f64,
    pub current: WeatherSnapshot,
    /// Matches before truncation to `max_results`
    pub total: usize,
    pub venues: Vec<VenueWithScore>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/search", get(search))
        .with_state(state)
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: VERSION.to_string(),
    })
}

async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Query(params) = query?;
    let postcode = params
        .postcode
        .filter(|p| !p.trim().is_empty())
        .ok_or(AppError::MissingPostcode)?;
    let radius_km = params.radius_km.unwrap_or(state.defaults.search_radius_km);

    let outcome = state.search.search_with_outlook(&postcode, radius_km).await?;

    let total = outcome.venues.len();
    let limit = usize::try_from(state.defaults.max_results).unwrap_or(usize::MAX);
    let mut venues = outcome.venues;
    venues.truncate(limit);

    Ok(Json(SearchResponse {
        postcode: postcode.trim().to_string(),
        location: outcome.location,
        radius_km,
        current: outcome.outlook.current,
        total,
        venues,
    }))
}
