pub(crate) mod env;
mod gemini;
mod graph_extractor;
mod prompt_builder;
mod provider;
pub mod response_parsing;
pub mod schema_validator;

pub use env::generation_config_from_env;
pub use gemini::{DEFAULT_MODEL, ENV_API_KEY, GeminiProvider, resolve_api_key};
pub use graph_extractor::BlueprintExtractor;
pub use prompt_builder::PromptBuilder;
pub use provider::LlmProvider;
