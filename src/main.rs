pub mod api;
mod board;
mod config;
mod providers;
mod sync;

use std::path::Path;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::Config;
use providers::gtfs::static_data;
use sync::BoardSync;

#[derive(OpenApi)]
#[openapi(
    info(title = "Subway Arrivals Board API", version = "0.1.0"),
    paths(
        api::board::get_board,
        api::board::navigate,
        api::health::health_check,
    ),
    components(schemas(
        api::board::BoardResponse,
        api::board::NavigateRequest,
        api::board::NavigateResponse,
        api::health::HealthResponse,
        board::BoardPage,
        board::TrainEntry,
        board::NavAction,
        board::Position,
    )),
    tags(
        (name = "board", description = "Arrivals board pages and display rotation"),
        (name = "health", description = "Service health check")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    // Load config
    let config = Config::load("config.yaml").expect("Failed to load config");
    config.validate().expect("Invalid config");
    tracing::info!(
        feeds = config.feeds.len(),
        stops = config.stops.len(),
        "Loaded configuration"
    );

    // Build CORS layer based on config
    let cors_layer = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode explicitly enabled (all origins allowed) - DO NOT USE IN PRODUCTION");
        CorsLayer::permissive()
    } else if !config.cors_origins.is_empty() {
        tracing::info!(origins = ?config.cors_origins, "CORS: Restricting to configured origins");
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    } else {
        panic!("CORS configuration error: Either set 'cors_origins' with allowed origins, or set 'cors_permissive: true' for development");
    };

    // Load the static GTFS reference data
    let static_index = Arc::new(
        static_data::load(Path::new(&config.static_dir))
            .expect("Failed to load static GTFS data"),
    );

    // Start the feed polling and display rotation loops
    let board_sync =
        Arc::new(BoardSync::new(config, static_index.clone()).expect("Failed to initialize sync"));
    let snapshot_store = board_sync.snapshot_store();
    let cycle_handle = board_sync.cycle_handle();
    board_sync.start();

    // Build the app
    let app = Router::new()
        .route("/", get(root))
        .nest("/api", api::router(snapshot_store, cycle_handle, static_index))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer);

    // Start server
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("Failed to bind to port 3000");

    tracing::info!("Server running on http://localhost:3000");
    tracing::info!("Swagger UI: http://localhost:3000/swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}

async fn root() -> &'static str {
    "Subway Arrivals Board API"
}
