//! fatebot API server entry point.

use std::error::Error;
use std::sync::Arc;

use fatebot_api::config::AppConfig;
use fatebot_api::display::HttpDisplaySurface;
use fatebot_api::error::AppError;
use fatebot_api::routes;
use fatebot_api::state::AppState;
use fatebot_api::telemetry;
use fatebot_core::clock::SystemClock;
use fatebot_scene_store::pg_scene_repository::PgSceneRepository;
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Read configuration from environment.
    let config = AppConfig::from_env()?;

    // Initialize tracing subscriber.
    let tracer_provider = telemetry::init_tracing(config.otlp_endpoint.as_deref())?;

    tracing::info!(?config, "Starting fatebot API server");

    // Create database connection pool.
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(AppError::from)?;

    let scene_repository = PgSceneRepository::new(pool);
    scene_repository.ensure_schema().await?;

    // Build application state.
    let display = HttpDisplaySurface::new(
        config.display_base_url.clone(),
        config.display_authorization.clone(),
    )
    .map_err(|e| AppError::Config(format!("display client: {e}")))?;
    let app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(scene_repository),
        Arc::new(display),
    );

    // Build router.
    let app = routes::api_router()
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Start server.
    let addr = config.bind_address()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(AppError::from)?;

    axum::serve(listener, app).await.map_err(AppError::from)?;

    if let Some(provider) = tracer_provider {
        provider
            .shutdown()
            .map_err(|e| AppError::Telemetry(e.to_string()))?;
    }

    Ok(())
}
