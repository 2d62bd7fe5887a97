//! Memory Wall Service — guestbook messages and photo memories over HTTP.
//!
//! Images are uploaded first, parked in a pending registry, then claimed
//! by a memory. Default: http://127.0.0.1:3000/

mod cache;
mod config;
mod db;
mod error;
mod pipeline;
mod registry;
mod routes;
mod storage;
mod thumbnail;

use config::Config;
use pipeline::MemoryWall;
use routes::AppState;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Opening database at: {}", config.database_path);
    let database = match db::Db::open(&config.database_path) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            log::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let store = match storage::build_store(&config) {
        Ok(store) => store,
        Err(e) => {
            log::error!("Failed to initialize {} storage: {}", config.storage.name(), e);
            std::process::exit(1);
        }
    };

    let wall = Arc::new(MemoryWall::new(database, store, &config));
    log::info!(
        "Image storage: {} (pending images expire after {}s)",
        wall.storage_name(),
        config.pending_image_ttl.as_secs()
    );

    let state = Arc::new(AppState {
        wall,
        start_time: Instant::now(),
        max_upload_files: config.limits.max_upload_files,
    });
    let app = routes::router(state, &config);

    let addr = format!("{}:{}", config.host, config.port);
    log::info!("Memory Wall Service listening on http://{}", addr);
    log::info!("Public image URLs use {}", config.api_url);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        log::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
