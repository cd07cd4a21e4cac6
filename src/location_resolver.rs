//! Location Resolution Module
//!
//! Turns a postcode into a coordinate. `Ok(None)` means the postcode is
//! unknown; `Err` means the lookup itself could not be performed. Callers map
//! the two to different user-facing errors.

use crate::cache::{PersistentCache, jittered};
use crate::config::GeocodingConfig;
use crate::http_client::build_client;
use crate::models::Coordinate;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const EMBEDDED_POSTCODES: &str = include_str!("../data/postcodes.json");
const GEOCODE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve(&self, postcode: &str) -> Result<Option<Coordinate>>;
}

/// Canonical form of a postcode: spaces and hyphens removed, upper-cased,
/// 3 to 10 ASCII alphanumerics. Anything else cannot be a postcode.
#[must_use]
pub fn normalize_postcode(raw: &str) -> Option<String> {
    let normalized: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let valid = (3..=10).contains(&normalized.len())
        && normalized.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(normalized)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostcodeEntry {
    pub postcode: String,
    #[serde(default)]
    pub locality: Option<String>,
    pub coordinate: Coordinate,
}

/// Static postcode table, embedded or loaded from JSON
#[derive(Debug, Clone, Default)]
pub struct PostcodeTable {
    entries: HashMap<String, PostcodeEntry>,
}

impl PostcodeTable {
    pub fn from_entries(entries: Vec<PostcodeEntry>) -> Result<Self> {
        let mut table = HashMap::with_capacity(entries.len());
        for entry in entries {
            let key = normalize_postcode(&entry.postcode)
                .ok_or_else(|| anyhow!("Malformed postcode '{}' in table", entry.postcode))?;
            if !entry.coordinate.is_valid() {
                bail!(
                    "Postcode {key} has invalid coordinates {}",
                    entry.coordinate.format_coordinates()
                );
            }
            if table.insert(key.clone(), entry).is_some() {
                bail!("Duplicate postcode {key} in table");
            }
        }
        Ok(Self { entries: table })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: Vec<PostcodeEntry> = serde_json::from_str(raw)?;
        Self::from_entries(entries)
    }

    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_POSTCODES).context("Embedded postcode table is invalid")
    }

    /// Load from `path` if it exists, else the embedded table
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let table = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read postcode file {}", path.display()))?;
                Self::from_json(&raw).with_context(|| format!("Invalid postcode file {}", path.display()))?
            }
            Some(path) => {
                warn!(
                    "Postcode file not found at {}, using embedded table",
                    path.display()
                );
                Self::embedded()?
            }
            None => Self::embedded()?,
        };
        info!("Loaded {} postcodes", table.len());
        Ok(table)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn lookup(&self, postcode: &str) -> Option<&PostcodeEntry> {
        normalize_postcode(postcode).and_then(|key| self.entries.get(&key))
    }
}

#[async_trait]
impl LocationResolver for PostcodeTable {
    async fn resolve(&self, postcode: &str) -> Result<Option<Coordinate>> {
        let found = self.lookup(postcode);
        if let Some(entry) = found {
            debug!(
                "Postcode {} resolved to {} ({})",
                entry.postcode,
                entry.locality.as_deref().unwrap_or("unnamed locality"),
                entry.coordinate.format_coordinates()
            );
        }
        Ok(found.map(|entry| entry.coordinate))
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country_code: Option<String>,
}

/// Postcode lookup against the Open-Meteo geocoding API
pub struct OpenMeteoGeocoder {
    client: ClientWithMiddleware,
    base_url: String,
    country_code: String,
    cache: Option<Arc<PersistentCache>>,
}

impl OpenMeteoGeocoder {
    pub fn new(config: &GeocodingConfig, cache: Option<Arc<PersistentCache>>) -> Result<Self> {
        let client = build_client(
            Duration::from_secs(config.timeout_seconds.into()),
            config.max_retries,
        )?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country_code: config.country_code.to_ascii_uppercase(),
            cache,
        })
    }

    #[must_use]
    pub fn search_url(&self, postcode: &str) -> String {
        format!(
            "{}/search?name={}&count=10&language=en&format=json&countryCode={}",
            self.base_url,
            urlencoding::encode(postcode),
            self.country_code
        )
    }

    async fn search(&self, postcode: &str) -> Result<Option<Coordinate>> {
        let response = self
            .client
            .get(self.search_url(postcode))
            .send()
            .await
            .context("Geocoding request failed")?
            .error_for_status()
            .context("Geocoding API returned an error status")?;

        let parsed: GeocodingResponse = response
            .json()
            .await
            .context("Failed to parse OpenMeteo geocoding response")?;

        Ok(pick_result(parsed.results.unwrap_or_default(), &self.country_code))
    }
}

/// First result in the configured country with usable coordinates
fn pick_result(results: Vec<GeocodingResult>, country_code: &str) -> Option<Coordinate> {
    results
        .into_iter()
        .filter(|r| {
            r.country_code
                .as_deref()
                .is_none_or(|cc| cc.eq_ignore_ascii_case(country_code))
        })
        .find_map(|r| {
            debug!("Geocoding candidate {} ({:.4}, {:.4})", r.name, r.latitude, r.longitude);
            Coordinate::new(r.latitude, r.longitude).ok()
        })
}

#[async_trait]
impl LocationResolver for OpenMeteoGeocoder {
    #[instrument(skip(self))]
    async fn resolve(&self, postcode: &str) -> Result<Option<Coordinate>> {
        let Some(normalized) = normalize_postcode(postcode) else {
            return Ok(None);
        };
        let key = format!("geocode:{}:{normalized}", self.country_code);

        if let Some(cache) = &self.cache {
            match cache.get::<Option<Coordinate>>(&key).await {
                Ok(Some(cached)) => return Ok(cached),
                Ok(None) => {}
                Err(e) => warn!("Ignoring unreadable geocoding cache entry {key}: {e:#}"),
            }
        }

        let found = self.search(&normalized).await?;
        if found.is_none() {
            info!("No geocoding results for postcode {normalized}");
        }

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&key, found, jittered(GEOCODE_TTL)).await {
                warn!("Failed to cache geocoding result for {key}: {e:#}");
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3000", Some("3000"))]
    #[case("  3000 ", Some("3000"))]
    #[case("30-00", Some("3000"))]
    #[case("sw1a 1aa", Some("SW1A1AA"))]
    #[case("30", None)]
    #[case("", None)]
    #[case("12345678901", None)]
    #[case("30#0", None)]
    #[case("３０００", None)]
    fn test_normalize_postcode(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_postcode(raw).as_deref(), expected);
    }

    #[tokio::test]
    async fn test_embedded_table_resolves_known_postcode() {
        let table = PostcodeTable::embedded().unwrap();
        let melbourne = table.resolve("3000").await.unwrap().unwrap();
        assert!((melbourne.latitude - -37.8136).abs() < 1e-9);
        assert!((melbourne.longitude - 144.9631).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_postcodes_are_none() {
        let table = PostcodeTable::embedded().unwrap();
        assert!(table.resolve("9999").await.unwrap().is_none());
        assert!(table.resolve("x").await.unwrap().is_none());
        assert!(table.resolve("   ").await.unwrap().is_none());
    }

    #[test]
    fn test_table_rejects_duplicates_and_bad_coordinates() {
        let dup = r#"[
            {"postcode":"3000","coordinate":{"latitude":-37.8,"longitude":144.9}},
            {"postcode":"30 00","coordinate":{"latitude":-37.9,"longitude":145.0}}
        ]"#;
        assert!(PostcodeTable::from_json(dup).is_err());

        let bad = r#"[{"postcode":"3000","coordinate":{"latitude":-137.8,"longitude":144.9}}]"#;
        assert!(PostcodeTable::from_json(bad).is_err());
    }

    #[test]
    fn test_load_missing_file_uses_embedded() {
        let table = PostcodeTable::load(Some(Path::new("/definitely/not/postcodes.json"))).unwrap();
        assert!(table.lookup("3000").is_some());
    }

    #[test]
    fn test_pick_result_filters_country() {
        let results = vec![
            GeocodingResult {
                name: "Elsewhere".to_string(),
                latitude: 40.0,
                longitude: -75.0,
                country_code: Some("US".to_string()),
            },
            GeocodingResult {
                name: "Melbourne".to_string(),
                latitude: -37.8136,
                longitude: 144.9631,
                country_code: Some("AU".to_string()),
            },
        ];
        let found = pick_result(results, "AU").unwrap();
        assert!((found.latitude - -37.8136).abs() < 1e-9);
        assert!(pick_result(Vec::new(), "AU").is_none());
    }

    #[test]
    fn test_geocoding_response_without_results() {
        let parsed: GeocodingResponse = serde_json::from_str(r#"{"generationtime_ms":0.5}"#).unwrap();
        assert!(parsed.results.is_none());
    }

    #[test]
    fn test_search_url_encodes_postcode() {
        let geocoder = OpenMeteoGeocoder::new(&GeocodingConfig::default(), None).unwrap();
        let url = geocoder.search_url("SW1A 1AA");
        assert!(url.starts_with("https://geocoding-api.open-meteo.com/v1/search?name=SW1A%201AA"));
        assert!(url.ends_with("countryCode=AU"));
    }
}
