// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, logging and the geo-query cache, then start HTTP server

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use citywalk_places::config::{Config, GeoCacheConfig};
use citywalk_places::handlers;
use citywalk_places::services::{start_sweep_task, GeoQueryCache, GooglePlacesClient};
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        anyhow::bail!("Configuration error: {}", e);
    }

    log::info!("Starting citywalk-places service...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Build the geo-query cache around the Google Places provider
    let cache_config = GeoCacheConfig::from(&config);
    log::info!(
        "Geo-query cache: ttl={}s, interval={}s, movement={}m, wide radius={}m, max entries={}",
        cache_config.cache_ttl.as_secs(),
        cache_config.min_query_interval.as_secs(),
        cache_config.min_movement_threshold,
        cache_config.wide_search_radius,
        cache_config.max_entries
    );

    let provider = Arc::new(GooglePlacesClient::new(config.google_places_api_key.clone()));
    let cache = Arc::new(GeoQueryCache::new(provider, cache_config));

    // Background sweep of expired searches
    start_sweep_task(
        cache.clone(),
        Duration::from_secs(config.cache_sweep_interval_seconds),
    );
    log::info!(
        "Started cache sweep task (interval: {}s)",
        config.cache_sweep_interval_seconds
    );

    // 5. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(cache.clone()))
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            .configure(handlers::health_config)
            .configure(handlers::places_config)
            .configure(handlers::routes_config)
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {}", server_addr))?
    .run()
    .await
    .context("HTTP server terminated")?;

    Ok(())
}
