//! `gonow` - Playground recommendations for right now
//!
//! This library ranks nearby playgrounds by how suitable they are for a
//! visit under current weather, and suggests a better time later today
//! when one exists.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod http_client;
pub mod location_resolver;
pub mod models;
pub mod playground;
pub mod search;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use cache::PersistentCache;
pub use config::GoNowConfig;
pub use error::{GoNowError, SearchError};
pub use location_resolver::{LocationResolver, OpenMeteoGeocoder, PostcodeTable};
pub use models::{Coordinate, DailyOutlook, GoNowScore, Status, VenueRecord, VenueWithScore, WeatherSnapshot};
pub use playground::{GeoIndex, GoNowEngine, VenueCatalog};
pub use search::{SearchOutcome, SearchService};
pub use weather::{OpenMeteoGateway, WeatherGateway};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
