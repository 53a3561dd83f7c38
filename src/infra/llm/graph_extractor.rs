use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::domain::{BlueprintGraph, ErrorPosition, GenerationError};

use super::response_parsing::{
    CandidateSource, contains_json_delimiters, locate_json_candidate, response_preview,
};
use super::schema_validator::GraphShapeValidator;

/// Turns a model's free-form reply into a [`BlueprintGraph`].
pub struct BlueprintExtractor {
    shape_validator: GraphShapeValidator,
}

impl BlueprintExtractor {
    pub fn new() -> Result<Self, GenerationError> {
        Ok(Self {
            shape_validator: GraphShapeValidator::new()?,
        })
    }

    pub fn extract(&self, raw_text: &str) -> Result<BlueprintGraph, GenerationError> {
        if !contains_json_delimiters(raw_text) {
            error!(
                preview = %response_preview(raw_text),
                "LLM response did not contain JSON object delimiters"
            );
            return Err(GenerationError::NoJsonFound {
                response_preview: response_preview(raw_text),
            });
        }

        let candidate = locate_json_candidate(raw_text);
        match candidate.source {
            CandidateSource::FencedBlock => info!("found JSON wrapped in markdown code block"),
            CandidateSource::BraceSpan => info!("extracted JSON object from brace span"),
            CandidateSource::RawText => warn!("no JSON block located, parsing raw response"),
        }

        let payload: Value = serde_json::from_str(candidate.text).map_err(|err| {
            error!(error = %err, "failed to parse LLM response as JSON");
            debug!(candidate = candidate.text, "unparseable candidate");
            json_parse_error(err.to_string(), &err, raw_text)
        })?;

        self.shape_validator.check_shape(&payload).map_err(|reason| {
            error!(%reason, "parsed JSON is not a blueprint graph");
            GenerationError::JsonParse {
                raw_error: reason,
                position: None,
                response_preview: response_preview(raw_text),
            }
        })?;

        // Typed pass over the text, not the value, so layout errors keep their position.
        let graph: BlueprintGraph = serde_json::from_str(candidate.text).map_err(|err| {
            error!(error = %err, "parsed JSON does not match the blueprint graph layout");
            json_parse_error(
                format!("payload did not match the blueprint graph layout: {err}"),
                &err,
                raw_text,
            )
        })?;

        info!(
            nodes = graph.nodes.len(),
            connections = graph.connections.len(),
            "successfully parsed blueprint graph"
        );
        Ok(graph)
    }
}

fn json_parse_error(raw_error: String, err: &serde_json::Error, raw_text: &str) -> GenerationError {
    GenerationError::JsonParse {
        raw_error,
        position: (err.line() > 0).then(|| ErrorPosition {
            line: err.line(),
            column: err.column(),
        }),
        response_preview: response_preview(raw_text),
    }
}
