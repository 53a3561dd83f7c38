use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use noder::domain::{GenerationConfig, LlmError, TextCompletion};
use noder::infra::llm::LlmProvider;

/// Provider double that answers every prompt with the same scripted reply.
pub(crate) struct ScriptedProvider {
    reply: Result<String, LlmError>,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub(crate) fn replying(text: &str) -> Self {
        Self::with_result(Ok(text.to_string()))
    }

    pub(crate) fn failing(error: LlmError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(reply: Result<String, LlmError>) -> Self {
        Self {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    #[allow(dead_code)]
    pub(crate) fn prompt_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

impl LlmProvider for ScriptedProvider {
    fn provider_id(&self) -> &str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        "scripted-model"
    }

    fn generate_text(
        &self,
        prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<TextCompletion, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompt log mutex should not be poisoned")
            .push(prompt.to_string());
        self.reply.clone().map(TextCompletion::new)
    }
}
