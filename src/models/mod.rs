//! Data models for the `GoNow` recommendation engine
//!
//! This module contains the core domain models organized by concern:
//! - Coordinate: Geographic points and great-circle distance
//! - Venue: Immutable playground records from the catalog
//! - Weather: Point-in-time conditions and weather code buckets
//! - Forecast: Same-day time blocks and the daily outlook
//! - Score: Go-Now scores, statuses and ranked results

pub mod coordinate;
pub mod forecast;
pub mod score;
pub mod venue;
pub mod weather;

// Re-export all public types for convenient access
pub use coordinate::Coordinate;
pub use forecast::{DailyOutlook, ForecastSlot, TimeBlock};
pub use score::{AlternateWindow, Factor, GoNowScore, Penalty, Status, VenueWithScore};
pub use venue::{AgeGroup, Equipment, Facility, ShadeLevel, SurfaceMaterial, VenueRecord};
pub use weather::{ConditionBucket, WeatherCode, WeatherSnapshot};
