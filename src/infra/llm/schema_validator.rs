use jsonschema::JSONSchema;
use serde_json::Value;

use crate::domain::GenerationError;

/// Shape contract for a blueprint graph reply. Only container types are
/// checked; node titles, pin types and cross references are left to the editor.
pub const BLUEPRINT_GRAPH_SHAPE_SCHEMA: &str = r#"
{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "properties": {
    "nodes": {
      "type": "array"
    },
    "connections": {
      "type": "array"
    }
  }
}
"#;

pub struct GraphShapeValidator {
    compiled_schema: JSONSchema,
}

impl GraphShapeValidator {
    pub fn new() -> Result<Self, GenerationError> {
        let schema: Value = serde_json::from_str(BLUEPRINT_GRAPH_SHAPE_SCHEMA).map_err(|err| {
            GenerationError::configuration(format!("invalid built-in graph schema: {err}"))
        })?;
        let compiled_schema = JSONSchema::compile(&schema).map_err(|err| {
            GenerationError::configuration(format!("failed to compile graph schema: {err}"))
        })?;
        Ok(Self { compiled_schema })
    }

    /// Checks the container shape of a parsed reply.
    ///
    /// The error string names the violated rule; callers wrap it into their
    /// own error with the response preview attached.
    pub fn check_shape(&self, payload: &Value) -> Result<(), String> {
        if !payload.is_object() {
            return Err(format!(
                "expected a JSON object at the top level, got {}",
                json_type_name(payload)
            ));
        }

        self.compiled_schema
            .validate(payload)
            .map_err(schema_validation_error)
    }
}

fn schema_validation_error<'a, I>(errors: I) -> String
where
    I: IntoIterator<Item = jsonschema::ValidationError<'a>>,
{
    let details = errors
        .into_iter()
        .map(|err| {
            let path = err.instance_path.to_string();
            if path.is_empty() {
                err.to_string()
            } else {
                format!("{path}: {err}")
            }
        })
        .collect::<Vec<_>>()
        .join("; ");
    format!("graph shape validation failed: {details}")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::GraphShapeValidator;

    fn validator() -> GraphShapeValidator {
        GraphShapeValidator::new().expect("shape schema must compile")
    }

    #[test]
    fn check_shape_accepts_minimal_object() {
        validator()
            .check_shape(&json!({ "nodes": [], "connections": [] }))
            .expect("empty graph should pass");
    }

    #[test]
    fn check_shape_accepts_object_without_node_lists() {
        validator()
            .check_shape(&json!({ "blueprintName": "Empty" }))
            .expect("missing lists are allowed");
    }

    #[test]
    fn check_shape_rejects_top_level_array() {
        let error = validator()
            .check_shape(&json!([{ "nodes": [] }]))
            .expect_err("arrays are not graphs");

        assert_eq!(error, "expected a JSON object at the top level, got array");
    }

    #[test]
    fn check_shape_rejects_single_object_nodes() {
        let error = validator()
            .check_shape(&json!({ "nodes": { "id": "a" }, "connections": [] }))
            .expect_err("nodes must be a sequence");

        assert!(error.starts_with("graph shape validation failed:"));
        assert!(error.contains("/nodes"));
    }

    #[test]
    fn check_shape_ignores_leaf_types() {
        validator()
            .check_shape(&json!({
                "nodes": [{ "id": 7, "title": null, "inputs": "none" }],
                "connections": [42]
            }))
            .expect("only the node and connection containers are checked");
    }

    #[test]
    fn check_shape_does_not_check_cross_references() {
        validator()
            .check_shape(&json!({
                "nodes": [],
                "connections": [
                    {
                        "sourceNodeId": "ghost",
                        "sourcePinName": "Out",
                        "targetNodeId": "phantom",
                        "targetPinName": "In"
                    }
                ]
            }))
            .expect("dangling connections are the editor's concern");
    }
}
