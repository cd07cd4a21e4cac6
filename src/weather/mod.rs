//! Weather Gateway
//!
//! Given a coordinate, the gateway returns current conditions plus a
//! morning/afternoon/evening forecast for the current local day. Retry and
//! timeout policy live inside each gateway implementation; callers treat any
//! error as "weather unavailable".

use crate::models::{Coordinate, DailyOutlook};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sunrise::{Coordinates, SolarDay, SolarEvent};

pub mod open_meteo;

pub use open_meteo::OpenMeteoGateway;

#[async_trait]
pub trait WeatherGateway: Send + Sync {
    /// Current conditions and today's three time-block slots
    async fn daily_outlook(&self, at: &Coordinate) -> Result<DailyOutlook>;
}

/// Sunrise and sunset in UTC, falling back to 06:00/19:00 UTC where the sun
/// never rises or sets
pub fn get_sunrise_sunset(at: &Coordinate, date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let coordinates = Coordinates::new(at.latitude, at.longitude).with_context(|| {
        format!(
            "Invalid coordinates: lat={}, lng={}",
            at.latitude, at.longitude
        )
    })?;

    let solar_day = SolarDay::new(coordinates, date);

    let sunrise = solar_day
        .event_time(SolarEvent::Sunrise)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN + chrono::Duration::hours(6)).and_utc());

    let sunset = solar_day
        .event_time(SolarEvent::Sunset)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN + chrono::Duration::hours(19)).and_utc());

    Ok((sunrise, sunset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_melbourne_summer_sunset_is_late_evening_local() {
        let melbourne = Coordinate::new(-37.8136, 144.9631).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let (sunrise, sunset) = get_sunrise_sunset(&melbourne, date).unwrap();
        assert!(sunrise < sunset);
        // AEDT is UTC+11; sunset around 20:40 local
        let local = sunset + chrono::Duration::hours(11);
        let hour = local.format("%H").to_string();
        assert!(hour == "20" || hour == "21", "got {local}");
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let bogus = Coordinate {
            latitude: 123.0,
            longitude: 0.0,
        };
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert!(get_sunrise_sunset(&bogus, date).is_err());
    }
}
