use std::sync::Arc;

use tracing::{error, info};

use crate::domain::{BlueprintGraph, GenerationConfig, GenerationError, TextCompletion};
use crate::infra::llm::{BlueprintExtractor, LlmProvider, PromptBuilder};

const QUERY_LOG_PREVIEW_CHARS: usize = 50;

/// Runs one query through prompt building, the provider and extraction.
#[derive(Clone)]
pub struct BlueprintService {
    provider: Arc<dyn LlmProvider>,
    config: GenerationConfig,
    extractor: Arc<BlueprintExtractor>,
}

impl BlueprintService {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        config: GenerationConfig,
    ) -> Result<Self, GenerationError> {
        config
            .validate()
            .map_err(|err| GenerationError::configuration(err.to_string()))?;

        Ok(Self {
            provider,
            config,
            extractor: Arc::new(BlueprintExtractor::new()?),
        })
    }

    pub fn extractor(&self) -> &BlueprintExtractor {
        &self.extractor
    }

    pub fn generate(&self, query: &str) -> Result<BlueprintGraph, GenerationError> {
        let completion = self.complete(query)?;
        self.extractor.extract(&completion.text)
    }

    /// Sends the prompt for `query` and returns the provider's raw reply.
    pub fn complete(&self, query: &str) -> Result<TextCompletion, GenerationError> {
        validate_query(query)?;

        let prompt = PromptBuilder::build(query);
        info!(
            provider = self.provider.provider_id(),
            model = self.provider.model_id(),
            query = %query_preview(query),
            "sending prompt"
        );

        let completion = self
            .provider
            .generate_text(&prompt, &self.config)
            .map_err(|source| {
                error!(error = %source, "error calling LLM provider");
                GenerationError::UpstreamService { source }
            })?;

        info!(
            latency_ms = completion.metadata.latency_ms,
            finish_reason = completion.metadata.finish_reason.as_deref(),
            total_tokens = completion
                .metadata
                .usage
                .as_ref()
                .and_then(|usage| usage.total_tokens),
            "received raw response"
        );
        Ok(completion)
    }
}

pub fn validate_query(query: &str) -> Result<(), GenerationError> {
    if query.trim().is_empty() {
        return Err(GenerationError::invalid_input(
            "Missing or invalid \"query\" in request body.",
        ));
    }
    Ok(())
}

fn query_preview(query: &str) -> String {
    let preview: String = query.chars().take(QUERY_LOG_PREVIEW_CHARS).collect();
    format!("{preview}...")
}
