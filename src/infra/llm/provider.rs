use crate::domain::{GenerationConfig, LlmError, TextCompletion};

/// Text-generation backend. Calls block until the provider answers or times out.
pub trait LlmProvider: Send + Sync {
    fn provider_id(&self) -> &str;

    fn model_id(&self) -> &str;

    fn generate_text(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<TextCompletion, LlmError>;
}
