use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use weather_average::api::AppState;
use weather_average::{AppConfig, ReqwestFetcher, SystemClock, WeatherService, telemetry, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load_from_path(config_path)?;

    telemetry::init(&config.logging)?;
    tracing::info!("weather-average {} starting", weather_average::VERSION);
    tracing::debug!(
        "Upstreams: geocoding={} archive={} timeout={}s",
        config.upstream.geocoding_base_url,
        config.upstream.archive_base_url,
        config.upstream.timeout_seconds
    );

    let fetcher =
        ReqwestFetcher::new(&config.upstream).with_context(|| "Failed to create HTTP client")?;
    let service = WeatherService::from_config(
        &config.upstream,
        Arc::new(fetcher),
        Arc::new(SystemClock),
    );

    let state = AppState {
        service: Arc::new(service),
    };

    web::run(&config, state).await
}
