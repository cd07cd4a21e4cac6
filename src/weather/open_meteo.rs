//! Open-Meteo forecast client
//!
//! One request per coordinate fetches current conditions and today's hourly
//! series. Hours are folded into morning/afternoon/evening slots, each slot
//! carrying the worst value of the hours it covers.

use super::{WeatherGateway, get_sunrise_sunset};
use crate::cache::{PersistentCache, jittered};
use crate::config::WeatherConfig;
use crate::http_client::build_client;
use crate::models::{Coordinate, DailyOutlook, ForecastSlot, TimeBlock, WeatherCode, WeatherSnapshot};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike, Utc};
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const VARIABLES: &str = "temperature_2m,uv_index,wind_speed_10m,weather_code";

/// `/forecast` response, restricted to the variables we request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub current: Option<CurrentConditions>,
    pub hourly: Option<HourlySeries>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub time: String,
    pub temperature_2m: Option<f64>,
    pub uv_index: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub weather_code: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub uv_index: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub weather_code: Vec<Option<u8>>,
}

impl ForecastResponse {
    /// Whether `current.time` falls on the location's local date at `now`
    #[must_use]
    pub fn is_current_day(&self, now: DateTime<Utc>) -> bool {
        let Some(current) = &self.current else {
            return false;
        };
        let Ok(issued) = NaiveDateTime::parse_from_str(&current.time, TIME_FORMAT) else {
            return false;
        };
        FixedOffset::east_opt(self.utc_offset_seconds)
            .is_some_and(|offset| now.with_timezone(&offset).date_naive() == issued.date())
    }
}

pub struct OpenMeteoGateway {
    client: ClientWithMiddleware,
    base_url: String,
    cache: Option<Arc<PersistentCache>>,
    cache_ttl: Duration,
}

impl OpenMeteoGateway {
    pub fn new(config: &WeatherConfig, cache: Option<Arc<PersistentCache>>) -> Result<Self> {
        let client = build_client(
            Duration::from_secs(config.timeout_seconds.into()),
            config.max_retries,
        )?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache,
            cache_ttl: Duration::from_secs(u64::from(config.cache_ttl_minutes) * 60),
        })
    }

    #[must_use]
    pub fn forecast_url(&self, at: &Coordinate) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&current={VARIABLES}&hourly={VARIABLES}&forecast_days=1&timezone=auto",
            self.base_url, at.latitude, at.longitude
        )
    }

    async fn forecast(&self, at: &Coordinate) -> Result<ForecastResponse> {
        let key = at.cache_key("weather");

        if let Some(cache) = &self.cache {
            match cache.get::<ForecastResponse>(&key).await {
                Ok(Some(cached)) if cached.is_current_day(Utc::now()) => return Ok(cached),
                Ok(Some(_)) => debug!("Cached forecast for {key} is from a previous local day"),
                Ok(None) => {}
                Err(e) => warn!("Ignoring unreadable weather cache entry {key}: {e:#}"),
            }
        }

        debug!("Calling the forecast API for {}", at.format_coordinates());
        let response = self
            .client
            .get(self.forecast_url(at))
            .send()
            .await
            .context("Forecast request failed")?
            .error_for_status()
            .context("Forecast API returned an error status")?;

        let forecast: ForecastResponse = response
            .json()
            .await
            .context("Failed to parse OpenMeteo forecast response")?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&key, forecast.clone(), jittered(self.cache_ttl)).await {
                warn!("Failed to cache forecast for {key}: {e:#}");
            }
        }

        Ok(forecast)
    }
}

#[async_trait]
impl WeatherGateway for OpenMeteoGateway {
    #[tracing::instrument(skip_all, fields(location = %at.format_coordinates()))]
    async fn daily_outlook(&self, at: &Coordinate) -> Result<DailyOutlook> {
        let response = self.forecast(at).await?;
        outlook_from_response(&response, at)
    }
}

/// Fold a forecast response into current conditions plus three slots.
///
/// Evening hours starting at or after local sunset are dropped, unless that
/// would leave the evening with no hours at all.
pub fn outlook_from_response(response: &ForecastResponse, at: &Coordinate) -> Result<DailyOutlook> {
    let current = response
        .current
        .as_ref()
        .context("Forecast response has no current conditions")?;
    let now = NaiveDateTime::parse_from_str(&current.time, TIME_FORMAT)
        .with_context(|| format!("Invalid current time '{}'", current.time))?;

    let current_snapshot = WeatherSnapshot::new(
        current.temperature_2m.context("Current temperature missing")?,
        current.uv_index.context("Current UV index missing")?,
        current.wind_speed_10m.context("Current wind speed missing")?,
        WeatherCode(current.weather_code.context("Current weather code missing")?),
    );

    let hourly = response
        .hourly
        .as_ref()
        .context("Forecast response has no hourly series")?;
    let hours = hourly_snapshots(hourly, now)?;

    let offset = FixedOffset::east_opt(response.utc_offset_seconds)
        .with_context(|| format!("Invalid UTC offset {}", response.utc_offset_seconds))?;
    let (_, sunset) = get_sunrise_sunset(at, now.date())?;
    let sunset_local = sunset.with_timezone(&offset).naive_local();

    let mut slots = Vec::with_capacity(TimeBlock::ALL.len());
    for block in TimeBlock::ALL {
        let mut in_block: Vec<(NaiveDateTime, WeatherSnapshot)> = hours
            .iter()
            .filter(|(time, _)| block.hours().contains(&time.hour()))
            .copied()
            .collect();

        if block == TimeBlock::Evening {
            let before_sunset: Vec<_> = in_block
                .iter()
                .filter(|(time, _)| *time < sunset_local)
                .copied()
                .collect();
            if before_sunset.is_empty() {
                debug!("Sunset precedes the evening block; keeping all evening hours");
            } else {
                in_block = before_sunset;
            }
        }

        let snapshots: Vec<WeatherSnapshot> = in_block.into_iter().map(|(_, s)| s).collect();
        let worst = aggregate(&snapshots).ok_or_else(|| anyhow!("No hourly data for the {block} block"))?;
        slots.push(ForecastSlot::new(block, worst));
    }

    DailyOutlook::new(current_snapshot, slots, now.date(), now.hour()).map_err(|e| anyhow!(e))
}

/// Complete hours falling on the same local day as `now`
fn hourly_snapshots(hourly: &HourlySeries, now: NaiveDateTime) -> Result<Vec<(NaiveDateTime, WeatherSnapshot)>> {
    let len = hourly.time.len();
    if hourly.temperature_2m.len() != len
        || hourly.uv_index.len() != len
        || hourly.wind_speed_10m.len() != len
        || hourly.weather_code.len() != len
    {
        bail!("Hourly series have mismatched lengths");
    }

    let mut hours = Vec::with_capacity(len);
    for (i, raw_time) in hourly.time.iter().enumerate() {
        let time = NaiveDateTime::parse_from_str(raw_time, TIME_FORMAT)
            .with_context(|| format!("Invalid hourly time '{raw_time}'"))?;
        if time.date() != now.date() {
            continue;
        }

        let (Some(temperature), Some(uv), Some(wind), Some(code)) = (
            hourly.temperature_2m[i],
            hourly.uv_index[i],
            hourly.wind_speed_10m[i],
            hourly.weather_code[i],
        ) else {
            debug!("Skipping incomplete hour {raw_time}");
            continue;
        };

        hours.push((time, WeatherSnapshot::new(temperature, uv, wind, WeatherCode(code))));
    }
    Ok(hours)
}

/// Worst case across hours: hottest, highest UV, windiest, most severe code
fn aggregate(hours: &[WeatherSnapshot]) -> Option<WeatherSnapshot> {
    let first = hours.first()?;
    Some(hours.iter().skip(1).fold(*first, |acc, hour| {
        WeatherSnapshot::new(
            acc.temperature_c.max(hour.temperature_c),
            acc.uv_index.max(hour.uv_index),
            acc.wind_speed_kmh.max(hour.wind_speed_kmh),
            if hour.weather_code.severity() > acc.weather_code.severity() {
                hour.weather_code
            } else {
                acc.weather_code
            },
        )
    }))
}
