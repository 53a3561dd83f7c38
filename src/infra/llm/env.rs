use std::time::Duration;

use crate::domain::{GenerationConfig, LlmError};

const ENV_TEMPERATURE: &str = "NODER_LLM_TEMPERATURE";
const ENV_MAX_OUTPUT_TOKENS: &str = "NODER_LLM_MAX_OUTPUT_TOKENS";

pub(crate) fn read_env_var(name: &str) -> Result<Option<String>, LlmError> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(error) => Err(LlmError::validation(format!(
            "{name} could not be read: {error}"
        ))),
    }
}

pub(crate) fn parse_timeout_seconds(name: &str, value: &str) -> Result<Duration, LlmError> {
    let parsed = value.trim().parse::<u64>().map_err(|_| {
        LlmError::validation(format!("{name} must be a positive integer in seconds"))
    })?;
    if parsed == 0 {
        return Err(LlmError::validation(format!(
            "{name} must be greater than 0 seconds"
        )));
    }
    Ok(Duration::from_secs(parsed))
}

pub(crate) fn read_timeout_from_env(name: &str) -> Result<Option<Duration>, LlmError> {
    let Some(value) = read_env_var(name)? else {
        return Ok(None);
    };
    Ok(Some(parse_timeout_seconds(name, &value)?))
}

pub(crate) fn resolve_timeout_with_global_fallback<F>(
    provider_timeout: Option<Duration>,
    read_global_timeout: F,
    default_timeout: Duration,
) -> Result<Duration, LlmError>
where
    F: FnOnce() -> Result<Option<Duration>, LlmError>,
{
    if let Some(timeout) = provider_timeout {
        return Ok(timeout);
    }

    Ok(read_global_timeout()?.unwrap_or(default_timeout))
}

/// Builds the generation config from defaults plus `NODER_LLM_*` overrides.
pub fn generation_config_from_env() -> Result<GenerationConfig, LlmError> {
    apply_overrides(
        GenerationConfig::default(),
        read_env_var(ENV_TEMPERATURE)?.as_deref(),
        read_env_var(ENV_MAX_OUTPUT_TOKENS)?.as_deref(),
    )
}

fn apply_overrides(
    mut config: GenerationConfig,
    temperature: Option<&str>,
    max_output_tokens: Option<&str>,
) -> Result<GenerationConfig, LlmError> {
    if let Some(value) = temperature {
        config.temperature = value.trim().parse::<f32>().map_err(|_| {
            LlmError::validation(format!("{ENV_TEMPERATURE} must be a number"))
        })?;
    }
    if let Some(value) = max_output_tokens {
        config.max_output_tokens = value.trim().parse::<u32>().map_err(|_| {
            LlmError::validation(format!("{ENV_MAX_OUTPUT_TOKENS} must be a positive integer"))
        })?;
    }
    config.validate()?;
    Ok(config)
}
