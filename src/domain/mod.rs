mod blueprint_graph;
mod errors;
mod generation_contract;

pub use blueprint_graph::{BlueprintGraph, Connection, GraphNode, NodeKind, Pin};
pub use errors::{ErrorPosition, ErrorReport, ErrorType, GenerationError, LlmError};
pub use generation_contract::{
    CompletionMetadata, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_K,
    DEFAULT_TOP_P, GenerationConfig, HarmBlockThreshold, HarmCategory, SafetySetting,
    TextCompletion, TokenUsage,
};
