//! HTTP surface: `POST /api/generateBlueprint` and `GET /api/health`.

mod config;
mod handlers;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::app::{BlueprintService, HealthReport};

pub use config::ServerConfig;

/// Request-independent state built once at startup.
#[derive(Clone)]
pub struct AppState {
    service: Option<BlueprintService>,
    health: HealthReport,
}

impl AppState {
    /// `service` is `None` when the model client could not be initialized.
    pub fn new(service: Option<BlueprintService>, health: HealthReport) -> Self {
        Self { service, health }
    }
}

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/api/generateBlueprint", post(handlers::generate_blueprint))
        .route("/api/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring CORS origin that is not a valid header value");
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
