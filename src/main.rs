use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use gonow::api::AppState;
use gonow::config::GeocodingProvider;
use gonow::{
    GoNowConfig, GoNowEngine, LocationResolver, OpenMeteoGateway, OpenMeteoGeocoder, PersistentCache,
    PostcodeTable, SearchService, VenueCatalog, telemetry, web,
};
use tracing::{info, warn};

fn open_cache(config: &GoNowConfig) -> Option<Arc<PersistentCache>> {
    if !config.cache.enabled {
        return None;
    }
    match PersistentCache::open(&config.cache.location) {
        Ok(cache) => {
            info!("Using cache at {}", config.cache.location);
            Some(Arc::new(cache))
        }
        Err(e) => {
            warn!("Cache unavailable at {}, continuing without: {e:#}", config.cache.location);
            None
        }
    }
}

fn resolver(config: &GoNowConfig, cache: Option<Arc<PersistentCache>>) -> Result<Arc<dyn LocationResolver>> {
    let resolver: Arc<dyn LocationResolver> = match config.geocoding.provider {
        GeocodingProvider::Table => Arc::new(PostcodeTable::load(config.catalog.postcodes_path.as_deref())?),
        GeocodingProvider::OpenMeteo => {
            info!("Resolving postcodes via {}", config.geocoding.base_url);
            Arc::new(OpenMeteoGeocoder::new(&config.geocoding, cache)?)
        }
    };
    Ok(resolver)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = GoNowConfig::load_from_path(config_path).context("Failed to load configuration")?;
    let _telemetry = telemetry::init(&config.logging)?;

    info!("Starting gonow {}", gonow::VERSION);

    let cache = open_cache(&config);
    let index = Arc::new(VenueCatalog::load(config.catalog.venues_path.as_deref())?);
    let resolver = resolver(&config, cache.clone())?;
    let gateway = Arc::new(OpenMeteoGateway::new(&config.weather, cache)?);
    let engine = GoNowEngine::new(config.scoring.clone());

    let state = AppState {
        search: SearchService::new(index, resolver, gateway, engine),
        defaults: config.defaults.clone(),
    };

    web::run(&config.server, state).await
}
