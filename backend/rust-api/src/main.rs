use std::sync::Arc;

use anyhow::Context;
use quizhub_api::{
    config::{Config, StoreBackend},
    create_router,
    remote::StaticResolver,
    store, telemetry, Stores, Wiring,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let service_arg = std::env::args().nth(1);
    let config = Config::load(service_arg.as_deref()).context("Failed to load configuration")?;

    let tracer_provider = telemetry::init(config.service, config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting {}", config.service.service_name());
    tracing::info!(
        "Configuration loaded for environment: {:?}",
        std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string())
    );

    let resolver = Arc::new(StaticResolver::new(&config.peers)?);
    tracing::info!("Resolver knows {} peers", resolver.len());

    let wiring = match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            Wiring::new(config, resolver, Stores::memory())
        }
        StoreBackend::Mongo => {
            let db = store::mongo::connect(&config.mongo_uri, &config.mongo_database).await?;
            tracing::info!("MongoDB connected");
            Wiring::new(config, resolver, Stores::mongo(&db)).with_mongo(db)
        }
    };

    let app = create_router(&wiring)?;

    let listener = tokio::net::TcpListener::bind(wiring.config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", wiring.config.bind_addr))?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    telemetry::shutdown(tracer_provider);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
