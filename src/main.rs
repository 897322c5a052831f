use axum::Router;
use cryptosmc::config::Config;
use cryptosmc::services::{GlobalReliability, LocalReliability};
use cryptosmc::{api, AppState};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cryptosmc=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!("Starting cryptosmc server on {}:{}", config.host, config.port);

    let local_reliability = LocalReliability::with_file(config.local_reliability_path.clone());
    info!(
        "Local reliability at {} ({} records)",
        config.local_reliability_path.display(),
        local_reliability.records().len()
    );

    // Shared reliability pool
    let global_reliability = GlobalReliability::new();
    if let Some(ref redis_url) = config.redis_url {
        global_reliability.connect_redis(redis_url).await;
        global_reliability.load_all_from_redis().await;
    } else {
        info!("REDIS_URL not set, global reliability stays in memory");
    }

    info!(
        "Analyzing {} symbols on {} candles ({} per fetch)",
        config.watchlist.len(),
        config.analysis.interval,
        config.analysis.limit
    );

    let addr = config.bind_address();
    let state = AppState::new(config, local_reliability, global_reliability);

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("cryptosmc server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
