//! Search orchestration
//!
//! resolve postcode → fetch weather → query the geo index → score each venue
//! → sort. Each step's failure ends the request with its own error kind.

use crate::error::SearchError;
use crate::location_resolver::LocationResolver;
use crate::models::{Coordinate, DailyOutlook, ForecastSlot, VenueWithScore, WeatherSnapshot};
use crate::playground::{GeoIndex, GoNowEngine, NearbyVenue, advise};
use crate::weather::WeatherGateway;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Ranked venues plus the weather they were scored against
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub location: Coordinate,
    pub outlook: DailyOutlook,
    pub venues: Vec<VenueWithScore>,
}

#[derive(Clone)]
pub struct SearchService {
    index: Arc<GeoIndex>,
    resolver: Arc<dyn LocationResolver>,
    gateway: Arc<dyn WeatherGateway>,
    engine: GoNowEngine,
}

impl SearchService {
    pub fn new(
        index: Arc<GeoIndex>,
        resolver: Arc<dyn LocationResolver>,
        gateway: Arc<dyn WeatherGateway>,
        engine: GoNowEngine,
    ) -> Self {
        Self {
            index,
            resolver,
            gateway,
            engine,
        }
    }

    /// Venues within `radius_km` of the postcode, best conditions first,
    /// nearest among equals
    pub async fn search(&self, postcode: &str, radius_km: f64) -> Result<Vec<VenueWithScore>, SearchError> {
        self.search_with_outlook(postcode, radius_km)
            .await
            .map(|outcome| outcome.venues)
    }

    #[instrument(skip(self))]
    pub async fn search_with_outlook(&self, postcode: &str, radius_km: f64) -> Result<SearchOutcome, SearchError> {
        if !radius_km.is_finite() || radius_km < 0.0 {
            warn!("Rejecting search radius {radius_km}");
            return Err(SearchError::InvalidRadius { radius_km });
        }

        debug!("Resolving location");
        let location = match self.resolver.resolve(postcode).await {
            Ok(Some(location)) => location,
            Ok(None) => {
                warn!("No location data for postcode");
                return Err(SearchError::LocationUnknown {
                    postcode: postcode.trim().to_string(),
                });
            }
            Err(e) => {
                warn!("Location lookup failed: {e:#}");
                return Err(SearchError::LocationServiceUnavailable {
                    reason: format!("{e:#}"),
                });
            }
        };

        debug!("Fetching weather for {}", location.format_coordinates());
        let outlook = self.gateway.daily_outlook(&location).await.map_err(|e| {
            warn!("Weather fetch failed: {e:#}");
            SearchError::WeatherUnavailable {
                reason: format!("{e:#}"),
            }
        })?;

        debug!("Querying venues within {radius_km} km");
        let nearby = self.index.nearby(&location, radius_km);

        debug!("Scoring {} venues", nearby.len());
        let upcoming = outlook.upcoming_slots();
        let mut venues: Vec<VenueWithScore> = nearby
            .into_iter()
            .map(|candidate| self.rank(candidate, &outlook.current, &upcoming))
            .collect();
        sort_ranked(&mut venues);

        info!(
            "Ranked {} venues ({}, UV {:.0}, {})",
            venues.len(),
            outlook.current.format_temperature(),
            outlook.current.uv_index,
            outlook.current.weather_code.description()
        );

        Ok(SearchOutcome {
            location,
            outlook,
            venues,
        })
    }

    /// Independent searches run concurrently; results keep input order
    pub async fn search_many(
        &self,
        postcodes: &[String],
        radius_km: f64,
    ) -> Vec<Result<Vec<VenueWithScore>, SearchError>> {
        join_all(postcodes.iter().map(|postcode| self.search(postcode, radius_km))).await
    }

    fn rank(&self, candidate: NearbyVenue, now: &WeatherSnapshot, upcoming: &[ForecastSlot]) -> VenueWithScore {
        let current = self.engine.score(&candidate.venue, now);
        let go_now = match advise(&self.engine, &candidate.venue, &current, upcoming) {
            Some((block, later)) => current.with_alternate(block, &later),
            None => current,
        };

        VenueWithScore {
            venue: candidate.venue,
            distance_km: candidate.distance_km,
            go_now,
        }
    }
}

/// Score descending, then distance ascending, then identifier
fn sort_ranked(venues: &mut [VenueWithScore]) {
    venues.sort_by(|a, b| {
        b.go_now
            .score
            .cmp(&a.go_now.score)
            .then_with(|| a.distance_km.total_cmp(&b.distance_km))
            .then_with(|| a.venue.id.cmp(&b.venue.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ShadeLevel, SurfaceMaterial, VenueRecord, WeatherCode};
    use std::collections::BTreeSet;

    fn ranked(id: &str, shade: ShadeLevel, distance_km: f64) -> VenueWithScore {
        let venue = VenueRecord {
            id: id.to_string(),
            name: id.to_string(),
            suburb: None,
            coordinate: Coordinate::new(-37.8, 144.9).unwrap(),
            shade,
            has_covered_structure: false,
            has_metal_equipment: false,
            surface: SurfaceMaterial::Bark,
            facilities: BTreeSet::new(),
            equipment: BTreeSet::new(),
            age_groups: BTreeSet::new(),
        };
        let weather = WeatherSnapshot::new(25.0, 9.0, 10.0, WeatherCode::CLEAR);
        VenueWithScore {
            go_now: GoNowEngine::default().score(&venue, &weather),
            venue: Arc::new(venue),
            distance_km,
        }
    }

    #[test]
    fn test_sort_ranked_orders_by_score_then_distance() {
        let mut venues = vec![
            ranked("open-near", ShadeLevel::None, 0.5),
            ranked("shaded-far", ShadeLevel::Full, 9.0),
            ranked("shaded-near", ShadeLevel::Full, 2.0),
            ranked("partial", ShadeLevel::Partial, 1.0),
        ];
        sort_ranked(&mut venues);
        let ids: Vec<&str> = venues.iter().map(|v| v.venue.id.as_str()).collect();
        assert_eq!(ids, vec!["shaded-near", "shaded-far", "partial", "open-near"]);
    }

    #[test]
    fn test_sort_ranked_breaks_full_ties_by_id() {
        let mut venues = vec![
            ranked("b", ShadeLevel::Full, 1.0),
            ranked("a", ShadeLevel::Full, 1.0),
        ];
        sort_ranked(&mut venues);
        assert_eq!(venues[0].venue.id, "a");
    }
}
