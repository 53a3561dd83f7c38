use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    CompletionMetadata, GenerationConfig, LlmError, SafetySetting, TextCompletion, TokenUsage,
};

use super::LlmProvider;
use super::env::{read_env_var, read_timeout_from_env, resolve_timeout_with_global_fallback};
use super::response_parsing::truncate_message;

const PROVIDER_ID: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
const ENV_API_KEY_OVERRIDE: &str = "NODER_GEMINI_API_KEY";
const ENV_MODEL: &str = "NODER_GEMINI_MODEL";
const ENV_BASE_URL: &str = "NODER_GEMINI_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "NODER_GEMINI_TIMEOUT_SECS";
const ENV_GLOBAL_TIMEOUT_SECS: &str = "NODER_LLM_TIMEOUT_SECS";

const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"];

pub struct GeminiProvider {
    api_key: String,
    api_base_url: String,
    model: String,
    client: Client,
}

impl GeminiProvider {
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_config(api_key, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT)
    }

    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = resolve_api_key()?.ok_or_else(|| {
            LlmError::validation(
                "Gemini API key is missing (set GEMINI_API_KEY or NODER_GEMINI_API_KEY)",
            )
        })?;
        let api_base_url = read_env_var(ENV_BASE_URL)?.unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let model = read_env_var(ENV_MODEL)?.unwrap_or_else(|| DEFAULT_MODEL.into());
        let timeout = resolve_timeout_with_global_fallback(
            read_timeout_from_env(ENV_TIMEOUT_SECS)?,
            || read_timeout_from_env(ENV_GLOBAL_TIMEOUT_SECS),
            DEFAULT_TIMEOUT,
        )?;
        Self::with_config(api_key, api_base_url, model, timeout)
    }

    pub fn with_config(
        api_key: impl Into<String>,
        api_base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::validation("Gemini API key must not be empty"));
        }

        let api_base_url = api_base_url.into();
        if api_base_url.trim().is_empty() {
            return Err(LlmError::validation("Gemini API base URL must not be empty"));
        }

        let model = model.into().trim().to_string();
        if model.is_empty() {
            return Err(LlmError::validation("Gemini model name must not be empty"));
        }

        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            LlmError::internal(format!("failed to create Gemini HTTP client: {err}"))
        })?;

        Ok(Self {
            api_key,
            api_base_url,
            model,
            client,
        })
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn build_request_payload(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> GeminiGenerateContentRequest {
        GeminiGenerateContentRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                max_output_tokens: config.max_output_tokens,
            },
            safety_settings: config.safety_settings.clone(),
        }
    }

    fn map_success_response(
        &self,
        response_body: &str,
        latency_ms: u64,
    ) -> Result<TextCompletion, LlmError> {
        let response: GeminiGenerateContentResponse = serde_json::from_str(response_body)
            .map_err(|err| {
                LlmError::invalid_response(format!("Gemini response decode failed: {err}"))
            })?;

        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
            .and_then(non_empty_owned)
        {
            return Err(LlmError::blocked(format!("prompt blocked ({reason})")));
        }

        let mut text = None;
        let mut finish_reason = None;
        for candidate in &response.candidates {
            if let Some(candidate_text) = candidate.joined_text() {
                text = Some(candidate_text);
                finish_reason = candidate.finish_reason.as_deref().and_then(non_empty_owned);
                break;
            }
        }

        let Some(text) = text else {
            let blocked_reason = response
                .candidates
                .iter()
                .filter_map(|candidate| candidate.finish_reason.as_deref())
                .find(|reason| BLOCKING_FINISH_REASONS.contains(reason));
            return Err(match blocked_reason {
                Some(reason) => LlmError::blocked(format!("candidate finished with {reason}")),
                None => LlmError::invalid_response("Gemini response did not include text content"),
            });
        };

        debug!(
            latency_ms,
            finish_reason = finish_reason.as_deref().unwrap_or("unknown"),
            "received Gemini completion"
        );

        Ok(TextCompletion {
            text,
            metadata: CompletionMetadata {
                latency_ms: Some(latency_ms),
                provider_request_id: response.response_id.as_deref().and_then(non_empty_owned),
                finish_reason,
                usage: response.usage_metadata.and_then(map_usage),
            },
        })
    }
}

impl LlmProvider for GeminiProvider {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn generate_text(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<TextCompletion, LlmError> {
        config.validate()?;
        let payload = self.build_request_payload(prompt, config);
        let started = Instant::now();

        let response = self
            .client
            .post(self.endpoint_url())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .map_err(map_transport_error)?;

        let status = response.status();
        let response_body = response.text().map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_http_error(status, &response_body));
        }

        let elapsed_ms = started.elapsed().as_millis();
        let latency_ms = u64::try_from(elapsed_ms).unwrap_or(u64::MAX);
        self.map_success_response(&response_body, latency_ms)
    }
}

/// API key the provider would use: `NODER_GEMINI_API_KEY`, else `GEMINI_API_KEY`.
pub fn resolve_api_key() -> Result<Option<String>, LlmError> {
    Ok(select_api_key(
        read_env_var(ENV_API_KEY_OVERRIDE)?,
        read_env_var(ENV_API_KEY)?,
    ))
}

fn select_api_key(override_key: Option<String>, primary_key: Option<String>) -> Option<String> {
    override_key.or(primary_key)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerateContentRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
    #[serde(default)]
    response_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl GeminiCandidate {
    fn joined_text(&self) -> Option<String> {
        let joined = self
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        (!joined.trim().is_empty()).then_some(joined)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
    #[serde(default)]
    total_token_count: Option<u32>,
}

fn map_usage(usage: GeminiUsageMetadata) -> Option<TokenUsage> {
    let total_tokens = usage.total_token_count.or_else(|| {
        match (usage.prompt_token_count, usage.candidates_token_count) {
            (Some(input), Some(output)) => input.checked_add(output),
            _ => None,
        }
    });

    let mapped = TokenUsage {
        input_tokens: usage.prompt_token_count,
        output_tokens: usage.candidates_token_count,
        total_tokens,
    };

    if mapped.input_tokens.is_some() || mapped.output_tokens.is_some() || mapped.total_tokens.is_some()
    {
        Some(mapped)
    } else {
        None
    }
}

fn map_http_error(status: StatusCode, body: &str) -> LlmError {
    let parsed_error = serde_json::from_str::<GeminiErrorEnvelope>(body).ok();
    let error_status = parsed_error
        .as_ref()
        .and_then(|envelope| envelope.error.as_ref())
        .and_then(|detail| detail.status.as_deref());

    if matches!(error_status, Some("UNAUTHENTICATED" | "PERMISSION_DENIED"))
        || status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
    {
        return LlmError::Auth;
    }
    if matches!(error_status, Some("RESOURCE_EXHAUSTED")) || status == StatusCode::TOO_MANY_REQUESTS
    {
        return LlmError::RateLimited;
    }
    if matches!(error_status, Some("DEADLINE_EXCEEDED"))
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::GATEWAY_TIMEOUT
    {
        return LlmError::Timeout;
    }

    let message = parsed_error
        .as_ref()
        .and_then(|envelope| envelope.error.as_ref())
        .and_then(|detail| detail.message.clone())
        .unwrap_or_else(|| truncate_message(body));
    LlmError::Transport {
        message: format!("Gemini API returned HTTP {status}: {message}"),
    }
}

fn map_transport_error(error: reqwest::Error) -> LlmError {
    if error.is_timeout() {
        return LlmError::Timeout;
    }
    LlmError::Transport {
        message: format!("Gemini transport error: {error}"),
    }
}

fn non_empty_owned(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    #[serde(default)]
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::StatusCode;

    use super::{GeminiProvider, map_http_error, select_api_key};
    use crate::domain::{GenerationConfig, LlmError};
    use crate::infra::llm::LlmProvider;

    fn provider() -> GeminiProvider {
        GeminiProvider::from_api_key("test-key").expect("provider should build")
    }

    #[test]
    fn select_api_key_prefers_override_and_falls_back_to_primary() {
        assert_eq!(
            select_api_key(Some("override".into()), Some("primary".into())).as_deref(),
            Some("override")
        );
        assert_eq!(
            select_api_key(Some("override".into()), None).as_deref(),
            Some("override")
        );
        assert_eq!(
            select_api_key(None, Some("primary".into())).as_deref(),
            Some("primary")
        );
        assert_eq!(select_api_key(None, None), None);
    }

    #[test]
    fn with_config_rejects_blank_values() {
        let error = GeminiProvider::with_config(" ", "http://x", "m", Duration::from_secs(1))
            .err()
            .expect("blank key should fail");
        assert!(matches!(
            error,
            LlmError::Validation { message } if message == "Gemini API key must not be empty"
        ));

        let error = GeminiProvider::with_config("k", "http://x", "  ", Duration::from_secs(1))
            .err()
            .expect("blank model should fail");
        assert!(matches!(
            error,
            LlmError::Validation { message } if message == "Gemini model name must not be empty"
        ));
    }

    #[test]
    fn endpoint_url_targets_generate_content_for_model() {
        let provider = provider();

        assert_eq!(
            provider.endpoint_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(provider.model_id(), "gemini-2.0-flash");
        assert_eq!(provider.provider_id(), "gemini");
    }

    #[test]
    fn build_request_payload_maps_prompt_and_generation_config() {
        let payload = provider().build_request_payload("make it jump", &GenerationConfig::default());
        let value = serde_json::to_value(&payload).expect("payload should serialize");

        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "make it jump");
        let temperature = value["generationConfig"]["temperature"]
            .as_f64()
            .expect("temperature should be a number");
        assert!((temperature - 0.3).abs() < 1e-6);
        assert_eq!(value["generationConfig"]["topP"], 1.0);
        assert_eq!(value["generationConfig"]["topK"], 1);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(value["safetySettings"].as_array().map(Vec::len), Some(4));
        assert_eq!(
            value["safetySettings"][3]["category"],
            "HARM_CATEGORY_DANGEROUS_CONTENT"
        );
    }

    #[test]
    fn map_success_response_joins_text_parts_and_metadata() {
        let response = r#"{
          "candidates": [
            {
              "content": {
                "role": "model",
                "parts": [
                  { "text": "```json\n{\"nodes\": [" },
                  { "text": "], \"connections\": []}\n```" }
                ]
              },
              "finishReason": "STOP"
            }
          ],
          "usageMetadata": {
            "promptTokenCount": 900,
            "candidatesTokenCount": 40,
            "totalTokenCount": 940
          },
          "responseId": "resp-1"
        }"#;

        let completion = provider()
            .map_success_response(response, 120)
            .expect("response should map");

        assert_eq!(
            completion.text,
            "```json\n{\"nodes\": [], \"connections\": []}\n```"
        );
        assert_eq!(completion.metadata.latency_ms, Some(120));
        assert_eq!(completion.metadata.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(
            completion.metadata.provider_request_id.as_deref(),
            Some("resp-1")
        );
        assert_eq!(
            completion
                .metadata
                .usage
                .as_ref()
                .and_then(|usage| usage.total_tokens),
            Some(940)
        );
    }

    #[test]
    fn map_success_response_reports_blocked_prompt() {
        let response = r#"{ "promptFeedback": { "blockReason": "SAFETY" } }"#;

        let error = provider()
            .map_success_response(response, 5)
            .expect_err("blocked prompt should fail");

        assert!(matches!(
            error,
            LlmError::Blocked { reason } if reason == "prompt blocked (SAFETY)"
        ));
    }

    #[test]
    fn map_success_response_reports_safety_finished_candidate() {
        let response = r#"{ "candidates": [ { "finishReason": "SAFETY" } ] }"#;

        let error = provider()
            .map_success_response(response, 5)
            .expect_err("empty safety candidate should fail");

        assert!(matches!(error, LlmError::Blocked { .. }));
    }

    #[test]
    fn map_success_response_rejects_missing_text() {
        let error = provider()
            .map_success_response(r#"{ "candidates": [] }"#, 5)
            .expect_err("no candidates should fail");

        assert!(matches!(
            error,
            LlmError::InvalidResponse { message }
            if message == "Gemini response did not include text content"
        ));
    }

    #[test]
    fn map_http_error_maps_status_and_error_status() {
        let auth = map_http_error(
            StatusCode::FORBIDDEN,
            r#"{"error":{"code":403,"message":"denied","status":"PERMISSION_DENIED"}}"#,
        );
        let rate_limited = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"code":429,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#,
        );
        let timeout = map_http_error(
            StatusCode::GATEWAY_TIMEOUT,
            r#"{"error":{"code":504,"message":"slow","status":"DEADLINE_EXCEEDED"}}"#,
        );
        let other = map_http_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"bad field","status":"INVALID_ARGUMENT"}}"#,
        );

        assert!(matches!(auth, LlmError::Auth));
        assert!(matches!(rate_limited, LlmError::RateLimited));
        assert!(matches!(timeout, LlmError::Timeout));
        assert!(matches!(
            other,
            LlmError::Transport { message }
            if message == "Gemini API returned HTTP 400 Bad Request: bad field"
        ));
    }
}
