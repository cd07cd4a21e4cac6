//! In-memory geographic index over the venue catalog
//!
//! A linear scan per query. The catalog holds hundreds of venues, so this
//! stays cheap; a grid or R-tree can replace it behind `nearby` without
//! touching callers.

use crate::GoNowError;
use crate::models::{Coordinate, VenueRecord};
use std::collections::HashSet;
use std::sync::Arc;

/// A venue within range of a query point
#[derive(Debug, Clone)]
pub struct NearbyVenue {
    pub venue: Arc<VenueRecord>,
    pub distance_km: f64,
}

/// Read-only venue index, shared across requests
#[derive(Debug, Clone, Default)]
pub struct GeoIndex {
    venues: Vec<Arc<VenueRecord>>,
}

impl GeoIndex {
    /// Build the index. Fails on duplicate identifiers or invalid coordinates.
    pub fn new(venues: Vec<VenueRecord>) -> Result<Self, GoNowError> {
        let mut seen = HashSet::with_capacity(venues.len());
        for venue in &venues {
            if venue.id.trim().is_empty() {
                return Err(GoNowError::catalog(format!(
                    "venue '{}' has an empty identifier",
                    venue.name
                )));
            }
            if !seen.insert(venue.id.as_str()) {
                return Err(GoNowError::catalog(format!(
                    "duplicate venue identifier '{}'",
                    venue.id
                )));
            }
            if !venue.coordinate.is_valid() {
                return Err(GoNowError::catalog(format!(
                    "venue '{}' has invalid coordinates {}",
                    venue.id,
                    venue.coordinate.format_coordinates()
                )));
            }
        }

        Ok(Self {
            venues: venues.into_iter().map(Arc::new).collect(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.venues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    /// Venues with `distance <= radius_km`, nearest first, ties by identifier
    #[must_use]
    pub fn nearby(&self, center: &Coordinate, radius_km: f64) -> Vec<NearbyVenue> {
        let mut results: Vec<NearbyVenue> = self
            .venues
            .iter()
            .filter_map(|venue| {
                let distance_km = center.distance_km(&venue.coordinate);
                (distance_km <= radius_km).then(|| NearbyVenue {
                    venue: Arc::clone(venue),
                    distance_km,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| a.venue.id.cmp(&b.venue.id))
        });
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ShadeLevel, SurfaceMaterial};
    use std::collections::BTreeSet;

    fn venue(id: &str, lat: f64, lng: f64) -> VenueRecord {
        VenueRecord {
            id: id.to_string(),
            name: format!("Venue {id}"),
            suburb: None,
            coordinate: Coordinate {
                latitude: lat,
                longitude: lng,
            },
            shade: ShadeLevel::Partial,
            has_covered_structure: false,
            has_metal_equipment: false,
            surface: SurfaceMaterial::Bark,
            facilities: BTreeSet::new(),
            equipment: BTreeSet::new(),
            age_groups: BTreeSet::new(),
        }
    }

    fn center() -> Coordinate {
        Coordinate::new(-37.8136, 144.9631).unwrap()
    }

    fn index() -> GeoIndex {
        GeoIndex::new(vec![
            venue("far", -38.1499, 144.3617),
            venue("near", -37.8150, 144.9650),
            venue("mid", -37.8600, 144.9000),
            venue("twin-b", -37.8300, 144.9631),
            venue("twin-a", -37.8300, 144.9631),
        ])
        .unwrap()
    }

    #[test]
    fn test_nearby_filters_and_sorts() {
        let results = index().nearby(&center(), 15.0);
        let ids: Vec<&str> = results.iter().map(|r| r.venue.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "twin-a", "twin-b", "mid"]);
        assert!(results.iter().all(|r| r.distance_km <= 15.0));
        assert!(results.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    }

    #[test]
    fn test_radius_is_inclusive() {
        let idx = index();
        let exact = center().distance_km(&Coordinate::new(-37.8600, 144.9000).unwrap());
        let results = idx.nearby(&center(), exact);
        assert!(results.iter().any(|r| r.venue.id == "mid"));
        let results = idx.nearby(&center(), exact - 1e-6);
        assert!(!results.iter().any(|r| r.venue.id == "mid"));
    }

    #[test]
    fn test_nearby_zero_radius_and_empty() {
        let idx = index();
        assert!(idx.nearby(&center(), 0.0).is_empty());
        assert!(idx.nearby(&center(), -5.0).is_empty());
        assert!(GeoIndex::default().nearby(&center(), 100.0).is_empty());
    }

    #[test]
    fn test_nearby_has_no_duplicates() {
        for radius in [0.5, 5.0, 15.0, 100.0, 20_000.0] {
            let results = index().nearby(&center(), radius);
            let unique: HashSet<&str> = results.iter().map(|r| r.venue.id.as_str()).collect();
            assert_eq!(unique.len(), results.len());
        }
    }

    #[test]
    fn test_new_rejects_duplicates_and_bad_coordinates() {
        let dup = GeoIndex::new(vec![venue("a", -37.8, 144.9), venue("a", -37.9, 145.0)]);
        assert!(matches!(dup, Err(GoNowError::Catalog { .. })));

        let bad = GeoIndex::new(vec![venue("a", -97.8, 144.9)]);
        assert!(matches!(bad, Err(GoNowError::Catalog { .. })));

        let blank = GeoIndex::new(vec![venue("  ", -37.8, 144.9)]);
        assert!(blank.is_err());
    }

    #[test]
    fn test_venues_are_shared_not_copied() {
        let idx = index();
        let first = idx.nearby(&center(), 15.0);
        let second = idx.nearby(&center(), 15.0);
        assert!(Arc::ptr_eq(&first[0].venue, &second[0].venue));
    }
}
