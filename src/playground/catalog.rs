//! Venue catalog loading
//!
//! Venues come from a JSON file when one is configured, otherwise from the
//! catalog embedded in the binary.

use crate::models::VenueRecord;
use crate::playground::GeoIndex;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

const EMBEDDED_VENUES: &str = include_str!("../../data/venues.json");

/// Loads venue records and builds the shared index
pub struct VenueCatalog;

impl VenueCatalog {
    /// Load the catalog from `path` if it exists, else the embedded data
    pub fn load(path: Option<&Path>) -> Result<GeoIndex> {
        let venues = match path {
            Some(path) if path.exists() => {
                debug!("Loading venues from {}", path.display());
                Self::load_file(path)?
            }
            Some(path) => {
                warn!(
                    "Venue file not found at {}, using embedded catalog",
                    path.display()
                );
                Self::embedded()?
            }
            None => Self::embedded()?,
        };

        let index = GeoIndex::new(venues).context("Venue catalog failed validation")?;
        info!("Loaded {} venues into the geo index", index.len());
        Ok(index)
    }

    /// Parse venues from a JSON file
    pub fn load_file(path: &Path) -> Result<Vec<VenueRecord>> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read venue file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid venue file {}", path.display()))
    }

    /// Venues bundled with the binary
    pub fn embedded() -> Result<Vec<VenueRecord>> {
        Self::from_json(EMBEDDED_VENUES).context("Embedded venue catalog is invalid")
    }

    pub fn from_json(raw: &str) -> Result<Vec<VenueRecord>> {
        let venues: Vec<VenueRecord> = serde_json::from_str(raw)?;
        Ok(venues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    #[test]
    fn test_embedded_catalog_loads() {
        let index = VenueCatalog::load(None).unwrap();
        assert!(index.len() >= 10);
        let fitzroy = Coordinate::new(-37.8128, 144.9803).unwrap();
        let here = index.nearby(&fitzroy, 0.01);
        assert!(here.iter().any(|n| n.venue.id == "fitzroy-gardens"));
    }

    #[test]
    fn test_missing_file_falls_back_to_embedded() {
        let index = VenueCatalog::load(Some(Path::new("/definitely/not/here.json"))).unwrap();
        assert!(!index.is_empty());
    }

    #[test]
    fn test_embedded_catalog_has_venues_near_cbd() {
        let index = VenueCatalog::load(None).unwrap();
        let cbd = Coordinate::new(-37.8136, 144.9631).unwrap();
        let nearby = index.nearby(&cbd, 15.0);
        assert!(nearby.len() >= 8);
        assert!(nearby.iter().all(|n| n.venue.id != "geelong-waterfront"));
    }

    #[test]
    fn test_from_json_rejects_unknown_shade() {
        let raw = r#"[{"id":"x","name":"X","coordinate":{"latitude":0.0,"longitude":0.0},"shade":"dappled","surface":"bark"}]"#;
        assert!(VenueCatalog::from_json(raw).is_err());
    }
}
