use serde::Serialize;
use thiserror::Error;

/// Failures raised by an LLM provider while producing a text completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("validation failed: {message}")]
    Validation { message: String },
    #[error("provider authentication failed")]
    Auth,
    #[error("provider rate limit reached")]
    RateLimited,
    #[error("provider request timed out")]
    Timeout,
    #[error("provider blocked the request: {reason}")]
    Blocked { reason: String },
    #[error("provider returned an invalid response: {message}")]
    InvalidResponse { message: String },
    #[error("provider transport failed: {message}")]
    Transport { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl LlmError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::Blocked {
            reason: reason.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Line/column reported by the JSON parser for a failed parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorPosition {
    pub line: usize,
    pub column: usize,
}

/// Wire tag for [`GenerationError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    ConfigurationError,
    InvalidInput,
    UpstreamServiceError,
    NoJsonFound,
    JsonParseError,
}

impl ErrorType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConfigurationError => "configuration_error",
            Self::InvalidInput => "invalid_input",
            Self::UpstreamServiceError => "upstream_service_error",
            Self::NoJsonFound => "no_json_found",
            Self::JsonParseError => "json_parse_error",
        }
    }
}

/// Terminal outcome of a failed blueprint generation request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("configuration error: {message}")]
    Configuration { message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("upstream service failed: {source}")]
    UpstreamService {
        #[source]
        source: LlmError,
    },
    #[error("LLM response does not appear to contain JSON")]
    NoJsonFound { response_preview: String },
    #[error("failed to parse LLM response as JSON: {raw_error}")]
    JsonParse {
        raw_error: String,
        position: Option<ErrorPosition>,
        response_preview: String,
    },
}

impl GenerationError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            Self::Configuration { .. } => ErrorType::ConfigurationError,
            Self::InvalidInput { .. } => ErrorType::InvalidInput,
            Self::UpstreamService { .. } => ErrorType::UpstreamServiceError,
            Self::NoJsonFound { .. } => ErrorType::NoJsonFound,
            Self::JsonParse { .. } => ErrorType::JsonParseError,
        }
    }

    /// Caller-facing message. Upstream details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration { message } | Self::InvalidInput { message } => message.clone(),
            Self::UpstreamService { .. } => "Failed to generate blueprint: Server error".to_string(),
            Self::NoJsonFound { .. } => {
                "Failed to generate blueprint: Generation service did not return JSON.".to_string()
            }
            Self::JsonParse { .. } => {
                "Failed to generate blueprint: Invalid format from generation service.".to_string()
            }
        }
    }

    pub fn report(&self) -> ErrorReport {
        let (raw_error, response_preview) = match self {
            Self::NoJsonFound { response_preview } => (None, Some(response_preview.clone())),
            Self::JsonParse {
                raw_error,
                response_preview,
                ..
            } => (Some(raw_error.clone()), Some(response_preview.clone())),
            _ => (None, None),
        };

        ErrorReport {
            error: self.user_message(),
            error_type: self.error_type(),
            raw_error,
            response_preview,
        }
    }
}

/// Structured error body returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub error: String,
    pub error_type: ErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_preview: Option<String>,
}
