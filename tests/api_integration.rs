//! HTTP surface tests driven through the router with `oneshot`

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use gonow::api::AppState;
use gonow::config::DefaultsConfig;
use gonow::models::{ForecastSlot, TimeBlock, WeatherCode};
use gonow::{
    Coordinate, DailyOutlook, GoNowEngine, PostcodeTable, SearchService, VenueCatalog, WeatherGateway, WeatherSnapshot,
};
use serde_json::Value;
use tower::ServiceExt;

struct StaticGateway(Option<WeatherSnapshot>);

#[async_trait]
impl WeatherGateway for StaticGateway {
    async fn daily_outlook(&self, _at: &Coordinate) -> Result<DailyOutlook> {
        let now = self.0.ok_or_else(|| anyhow!("upstream returned 502"))?;
        let slots = TimeBlock::ALL
            .into_iter()
            .map(|block| ForecastSlot::new(block, now))
            .collect();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        DailyOutlook::new(now, slots, date, 10).map_err(|e| anyhow!(e))
    }
}

fn app(weather: Option<WeatherSnapshot>, max_results: u32) -> axum::Router {
    let search = SearchService::new(
        Arc::new(VenueCatalog::load(None).unwrap()),
        Arc::new(PostcodeTable::embedded().unwrap()),
        Arc::new(StaticGateway(weather)),
        GoNowEngine::default(),
    );
    let state = AppState {
        search,
        defaults: DefaultsConfig {
            search_radius_km: 15.0,
            max_results,
        },
    };
    gonow::web::app(state, Duration::from_secs(5))
}

fn mild() -> Option<WeatherSnapshot> {
    Some(WeatherSnapshot::new(23.0, 3.0, 10.0, WeatherCode::CLEAR))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(mild(), 50), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], gonow::VERSION);
}

#[tokio::test]
async fn test_search_returns_ranked_venues() {
    let (status, body) = get(app(mild(), 50), "/api/search?postcode=3000").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["postcode"], "3000");
    assert_eq!(body["radius_km"], 15.0);
    let venues = body["venues"].as_array().unwrap();
    assert!(!venues.is_empty());
    assert_eq!(body["total"].as_u64(), Some(venues.len() as u64));
    assert_eq!(venues[0]["go_now"]["status"], "Go");
    assert_eq!(venues[0]["go_now"]["score"], 10);
    assert!(venues[0]["venue"]["id"].is_string());
    assert!(venues[0]["distance_km"].as_f64().unwrap() <= 15.0);
}

#[tokio::test]
async fn test_search_truncates_to_max_results() {
    let (status, body) = get(app(mild(), 2), "/api/search?postcode=3000&radius_km=20").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["venues"].as_array().unwrap().len(), 2);
    assert!(body["total"].as_u64().unwrap() > 2);
}

#[tokio::test]
async fn test_unknown_postcode_is_404() {
    let (status, body) = get(app(mild(), 50), "/api/search?postcode=9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "LOCATION_UNKNOWN");
    assert!(body["message"].as_str().unwrap().contains("9999"));
}

#[tokio::test]
async fn test_negative_radius_is_400() {
    let (status, body) = get(app(mild(), 50), "/api/search?postcode=3000&radius_km=-3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_RADIUS");
}

#[tokio::test]
async fn test_missing_postcode_is_400() {
    let (status, body) = get(app(mild(), 50), "/api/search?postcode=%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_POSTCODE");
}

#[tokio::test]
async fn test_unparseable_radius_is_json_400() {
    let (status, body) = get(app(mild(), 50), "/api/search?postcode=3000&radius_km=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_QUERY");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn test_weather_outage_is_503() {
    let (status, body) = get(app(None, 50), "/api/search?postcode=3000").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "WEATHER_UNAVAILABLE");
}
