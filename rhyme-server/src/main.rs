use std::sync::Arc;
use tokio::signal;
use tracing::info;

use rhyme_core::WordSelector;
use rhyme_server::{
    config::Config,
    create_routes,
    providers::{HttpRhymeProvider, HttpRoomDirectory},
    room_manager::RoomManager,
    storage::MemoryStorage,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Rhyme Rooms server...");

    let config = Arc::new(Config::new());

    let rhymes = Arc::new(HttpRhymeProvider::new(
        &config.rhyme_api_base_url,
        config.fetch_timeout_seconds,
    ));
    let directory = Arc::new(HttpRoomDirectory::new(
        &config.room_api_base_url,
        &config.room_api_key,
        config.fetch_timeout_seconds,
    ));
    let storage = Arc::new(MemoryStorage::new());
    let selector = WordSelector::with_default_corpus();

    let rooms = Arc::new(RoomManager::new(
        config.clone(),
        storage,
        rhymes,
        directory,
        selector,
    ));

    let routes = create_routes(rooms);

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config.host.parse::<std::net::IpAddr>().unwrap(),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
