use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skinrec_api::{
    config::Config,
    db::{self, Cache},
    routes::{create_router, AppState},
    services::embedding::{EmbeddingService, HttpEmbeddingProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skinrec_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db_pool = db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db::run_migrations(&db_pool).await?;
    db::check_embedding_dimensions(&db_pool, config.embedding_dimensions)
        .await
        .context("Embedding columns do not fit the configured model")?;

    // Redis is optional; without it every embedding request hits the backend
    let (cache, cache_writer) = match config.redis_url.as_deref() {
        Some(url) => {
            let client = db::create_redis_client(url)?;
            match Cache::new(client).await {
                Ok((cache, writer)) => {
                    tracing::info!("Redis cache enabled");
                    (Some(cache), Some(writer))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Redis unavailable, continuing without cache");
                    (None, None)
                }
            }
        }
        None => (None, None),
    };

    let provider = HttpEmbeddingProvider::new(
        config.embedding_api_url.clone(),
        config.embedding_api_key.clone(),
        config.embedding_model.clone(),
    )?;
    tracing::info!(
        api_url = %config.embedding_api_url,
        model = %config.embedding_model,
        dimensions = config.embedding_dimensions,
        "Embedding backend configured"
    );
    let embeddings = EmbeddingService::new(
        Arc::new(provider),
        cache.clone(),
        config.embedding_dimensions,
    );

    let state = Arc::new(AppState {
        db_pool,
        embeddings: Arc::new(embeddings),
        cache,
    });
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(writer) = cache_writer {
        writer.shutdown().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
    }
}
