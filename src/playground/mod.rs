//! Playground recommendation core
//!
//! This module provides the decision logic of the engine:
//! - Venue catalog loading and validation
//! - Geographic index with radius search
//! - Go-Now scoring of a venue under current conditions
//! - Time-block advice for a better visit later today

pub mod advisor;
pub mod catalog;
pub mod geo_index;
pub mod scoring;

// Re-export commonly used types from submodules
pub use advisor::advise;
pub use catalog::VenueCatalog;
pub use geo_index::{GeoIndex, NearbyVenue};
pub use scoring::{GoNowEngine, MAX_TIPS, ScoringPolicy, score};
