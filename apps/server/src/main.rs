use std::net::SocketAddr;

use axum::http::{header, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stagecast_server::config::Config;
use stagecast_server::store::{load_descriptors, SceneStore};
use stagecast_server::{build_app, Coordinator};

/// Build the CORS layer based on configuration.
///
/// In production mode:
/// - If `CORS_ORIGINS` is set, only those origins are allowed
/// - If `CORS_ORIGINS` is not set, CORS requests are rejected (no origins allowed)
///
/// In development mode:
/// - If `CORS_ORIGINS` is set, those origins are used
/// - If `CORS_ORIGINS` is not set, permissive CORS is used for convenience
fn build_cors_layer(config: &Config) -> CorsLayer {
    match &config.cors_allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<_> = origins
                .iter()
                .filter_map(|origin| {
                    origin.parse().ok().or_else(|| {
                        tracing::warn!("Invalid CORS origin '{}', skipping", origin);
                        None
                    })
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::error!("No valid CORS origins configured, CORS requests will be rejected");
                CorsLayer::new()
            } else {
                tracing::info!(
                    "CORS configured with {} allowed origin(s): {:?}",
                    allowed_origins.len(),
                    origins
                );
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([
                        Method::GET,
                        Method::POST,
                        Method::PUT,
                        Method::DELETE,
                        Method::OPTIONS,
                    ])
                    .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
            }
        }
        _ if config.is_production() => {
            tracing::warn!(
                "CORS_ORIGINS not configured in production mode. \
                 CORS requests will be rejected. Set CORS_ORIGINS to allow cross-origin requests."
            );
            CorsLayer::new()
        }
        _ => {
            tracing::warn!(
                "Using permissive CORS in development mode. \
                 Set CORS_ORIGINS for production-like behavior."
            );
            CorsLayer::permissive()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stagecast_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!(
        environment = %config.common.environment,
        port = config.port,
        "Starting Stagecast server"
    );
    tracing::info!(
        ping_interval_ms = config.common.timing.ping_interval_ms,
        connection_timeout_ms = config.common.timing.connection_timeout_ms,
        "Advisory client timing loaded (not enforced server-side)"
    );

    // Device descriptors are mandatory: refuse to start without them
    let descriptors = load_descriptors(&config.common.paths.devices_file)?;

    // Scene store; the directory is created up front so the first scene
    // write never races with a listing
    let scene_store = SceneStore::new(config.common.paths.scenes_dir.clone());
    scene_store.ensure_dir()?;
    tracing::info!(
        scenes_dir = %scene_store.dir().display(),
        "Scene store ready"
    );

    // The coordinator is the single owner of device state
    let coordinator = Coordinator::new(descriptors, scene_store);

    let cors_layer = build_cors_layer(&config);

    let app = build_app(coordinator)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer);

    let addr = SocketAddr::from((config.host, config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    tracing::info!(
        "Admin clients connect to ws://{}/ws, displays to ws://{}/ws?deviceId=<id>",
        addr,
        addr
    );

    axum::serve(listener, app).await?;

    Ok(())
}
