const INSTRUCTIONS: &str = r##"
You are an expert Unreal Engine Blueprint assistant.
Your task is to analyze the user's request and generate a JSON object representing the necessary Blueprint nodes, their pins, color, default input values, and connections for a single blueprint graph.

The JSON output MUST strictly follow this format:
{
  "blueprintName": "Optional short name for the graph",
  "blueprintDescription": "Optional brief description",
  "nodes": [
    {
      "id": "unique_temporary_node_id",
      "title": "Exact Unreal Engine Node Title",
      "nodeType": "event | function | variable | macro",
      "color": "#RRGGBB or suggested color name",
      "inputs": [ { "name": "Exact Pin Name", "type": "PinType", "value": value_or_null } /* ... ALL pins IN ORDER */ ],
      "outputs": [ { "name": "Exact Pin Name", "type": "PinType" } /* ... ALL pins IN ORDER */ ]
    }
  ],
  "connections": [
    {
      "sourceNodeId": "temporary_id_of_source_node",
      "sourcePinName": "Exact OUTPUT Pin Name",
      "targetNodeId": "temporary_id_of_target_node",
      "targetPinName": "Exact INPUT Pin Name"
    }
  ]
}

IMPORTANT RULES:
- Node ID Uniqueness: Must be unique within the response.
- Accuracy: Use exact UE node titles and pin names (case-sensitive).
- Pins: Include COMPLETE and ACCURATE inputs/outputs arrays for ALL standard pins, in order. Use exact PinTypes. Do NOT use empty strings ("") for pin names; use descriptive names. Provide sensible default 'value' or null (JSON keyword null, not 'None') for unconnected INPUT pins. Use JSON booleans true/false (lowercase).
- Color: Use color accurate to Unreal's blueprint colors.
- Connections: CRITICAL: sourcePinName MUST exist in source node's outputs. targetPinName MUST exist in target node's inputs. Ensure types are compatible.
- Appropriate Node Types: Use the correct node type for the node.
- Minimality: Only include essential nodes/connections but fulfill user request; generate a good amount of tokens.
- Output Format: ONLY the pure, valid JSON object. NO comments. Pay strict attention to JSON syntax (quotes, commas, NO trailing commas).
- Handle unknown nodes: Use your knowledge to generate nodes not in a predefined database, ensuring they are accurate.
"##;

const EXAMPLES: &str = r##"
EXAMPLE 1:
User Query: "When I press Space Bar, make the character jump"
JSON Output:
{
  "blueprintName": "BP_MyCharacter_Jump",
  "blueprintDescription": "Makes the character jump when Space Bar is pressed.",
  "nodes": [
    {"id": "node-1", "title": "InputAction Jump", "nodeType": "event", "color": "#B71C1C", "inputs": [], "outputs": [{ "name": "Pressed", "type": "exec" }, { "name": "Released", "type": "exec" }, { "name": "Key", "type": "object" }] },
    {"id": "node-2", "title": "Jump", "nodeType": "function", "color": "#1E88E5", "inputs": [{ "name": "Execute", "type": "exec", "value": null }, { "name": "Target", "type": "object", "value": null }], "outputs": [{ "name": "Execute", "type": "exec" }] },
    {"id": "node-3", "title": "Get Player Character", "nodeType": "function", "color": "#1E88E5", "inputs": [{ "name": "Player Index", "type": "int", "value": 0 }], "outputs": [{ "name": "Return Value", "type": "object" }] }
  ],
  "connections": [
    {"sourceNodeId": "node-1", "sourcePinName": "Pressed", "targetNodeId": "node-2", "targetPinName": "Execute"},
    {"sourceNodeId": "node-3", "sourcePinName": "Return Value", "targetNodeId": "node-2", "targetPinName": "Target"}
  ]
}

EXAMPLE 2:
User Query: "On begin play in the Level Blueprint, print Hello World"
JSON Output:
{
  "blueprintName": "LevelBlueprint_DebugPrint",
  "blueprintDescription": "Prints Hello World when the game starts.",
  "nodes": [
    {"id": "startNode", "title": "Event BeginPlay", "nodeType": "event", "color": "#B71C1C", "inputs": [], "outputs": [{ "name": "Execute", "type": "exec" }] },
    {"id": "printNode", "title": "Print String", "nodeType": "function", "color": "#004D40", "inputs": [{ "name": "Execute", "type": "exec", "value": null }, { "name": "In String", "type": "string", "value": "Hello World" }, { "name": "Print to Screen", "type": "bool", "value": true }, { "name": "Print to Log", "type": "bool", "value": true }, { "name": "Text Color", "type": "vector", "value": "(R=0.0,G=0.66,B=1.0,A=1.0)" }, { "name": "Duration", "type": "float", "value": 2.0 }], "outputs": [{ "name": "Execute", "type": "exec" }] }
  ],
  "connections": [
    {"sourceNodeId": "startNode", "sourcePinName": "Execute", "targetNodeId": "printNode", "targetPinName": "Execute"}
  ]
}
"##;

pub struct PromptBuilder;

impl PromptBuilder {
    /// Instructions, few-shot examples and the quoted query, in that order.
    ///
    /// The query is embedded verbatim; callers reject blank queries first.
    pub fn build(query: &str) -> String {
        format!("{INSTRUCTIONS}\n{EXAMPLES}\n{}", user_request_block(query))
    }
}

fn user_request_block(query: &str) -> String {
    format!("\n      USER QUERY:\n      \"{query}\"\n\n      JSON Output:\n    ")
}

#[cfg(test)]
mod tests {
    use super::{EXAMPLES, INSTRUCTIONS, PromptBuilder};

    #[test]
    fn prompt_concatenates_instructions_examples_and_query() {
        let prompt = PromptBuilder::build("make the door open");

        let instructions_at = prompt.find(INSTRUCTIONS).expect("instructions present");
        let examples_at = prompt.find(EXAMPLES).expect("examples present");
        let query_at = prompt
            .find("USER QUERY:\n      \"make the door open\"")
            .expect("query block present");

        assert_eq!(instructions_at, 0);
        assert!(instructions_at < examples_at);
        assert!(examples_at < query_at);
        assert!(prompt.ends_with("JSON Output:\n    "));
    }

    #[test]
    fn query_is_embedded_verbatim() {
        let query = "  print \"hi\" {literally}\nthen stop  ";
        let prompt = PromptBuilder::build(query);

        assert!(prompt.contains(&format!("\"{query}\"")));
    }

    #[test]
    fn instructions_describe_editor_wire_names() {
        let prompt = PromptBuilder::build("jump");

        assert!(prompt.contains("\"blueprintName\""));
        assert!(prompt.contains("\"nodeType\": \"event | function | variable | macro\""));
        assert!(prompt.contains("\"sourcePinName\""));
        assert!(prompt.contains("NO trailing commas"));
    }
}
