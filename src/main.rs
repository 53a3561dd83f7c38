use std::sync::Arc;

use noder::app::{BlueprintService, HealthReport};
use noder::http::{AppState, ServerConfig, router};
use noder::infra::llm::{
    ENV_API_KEY, GeminiProvider, LlmProvider, generation_config_from_env, resolve_api_key,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "noder=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let server_config = ServerConfig::from_env()?;
    let api_key_configured = match resolve_api_key() {
        Ok(key) => key.is_some(),
        Err(err) => {
            error!(error = %err, "failed to read Gemini API key");
            false
        }
    };
    if !api_key_configured {
        error!("{ENV_API_KEY} environment variable not set");
    }

    // The blocking HTTP client owns its own runtime and must be built off the async workers.
    let service = tokio::task::spawn_blocking(build_service).await?;
    let health = HealthReport::evaluate(api_key_configured, service.is_some());

    let app = router(AppState::new(service, health), &server_config);
    let addr = server_config.bind_address();
    info!(%addr, "starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_service() -> Option<BlueprintService> {
    let provider = match GeminiProvider::from_env() {
        Ok(provider) => provider,
        Err(err) => {
            error!(error = %err, "failed to initialize Gemini provider");
            return None;
        }
    };
    let config = match generation_config_from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid generation configuration");
            return None;
        }
    };

    let model = provider.model_id().to_string();
    match BlueprintService::new(Arc::new(provider), config) {
        Ok(service) => {
            info!(%model, "successfully initialized Gemini model");
            Some(service)
        }
        Err(err) => {
            error!(error = %err, "failed to initialize blueprint service");
            None
        }
    }
}
