use axum::ServiceExt;
use axum::extract::Request;
use geocoding::PositionStackGeocoder;
use server_http::{AppState, build_router};
use shared::config::Config;
use std::sync::Arc;
use storage_engine::{repository_from_config, response_cache_from_config};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if exists)
    let dotenv = dotenvy::dotenv();

    // Load configuration from environment variables
    let config = Config::from_env();

    // Initialize tracing; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting RocketStore HTTP Server...");
    match dotenv {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    if let Err(e) = run(config).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> shared::Result<()> {
    let repository = repository_from_config(&config)?;
    let cache = response_cache_from_config(&config);
    let geocoder = Arc::new(PositionStackGeocoder::new(&config.geocoding)?);

    let state = AppState::new(repository, cache, geocoder)?;

    // Build router
    let router = build_router(state, &config);

    // Start server
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| shared::Error::Internal(format!("failed to bind {}: {}", address, e)))?;

    info!("HTTP Server listening on http://{}", address);
    info!("Try: curl http://localhost:{}/health", config.http_port);

    // Graceful shutdown handler
    axum::serve(listener, ServiceExt::<Request>::into_make_service(router))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| shared::Error::Internal(format!("server error: {}", e)))?;

    info!("Server shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
