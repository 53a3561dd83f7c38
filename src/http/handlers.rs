use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::app::{HealthBody, validate_query};
use crate::domain::{BlueprintGraph, GenerationError, LlmError};

use super::AppState;

pub(crate) async fn generate_blueprint(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BlueprintGraph>, GenerationError> {
    let Some(service) = state.service.clone() else {
        error!("model not initialized, check API key and configuration");
        return Err(GenerationError::configuration(
            "Model failed to initialize. Check API Key and configuration.",
        ));
    };

    let Json(body) = payload.map_err(|rejection| {
        warn!(%rejection, "request is not JSON");
        GenerationError::invalid_input("Request must be JSON")
    })?;

    let query = body
        .get("query")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default();
    validate_query(&query).inspect_err(|_| warn!(query = %query, "invalid query"))?;

    let graph = tokio::task::spawn_blocking(move || service.generate(&query))
        .await
        .map_err(|err| GenerationError::UpstreamService {
            source: LlmError::internal(format!("generation task failed: {err}")),
        })??;

    Ok(Json(graph))
}

pub(crate) async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthBody>) {
    let body = state.health.body();
    info!(status = %body.status, "health check");

    let status = if state.health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(body))
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        let status = match self {
            GenerationError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            GenerationError::Configuration { .. }
            | GenerationError::UpstreamService { .. }
            | GenerationError::NoJsonFound { .. }
            | GenerationError::JsonParse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self.report())).into_response()
    }
}
