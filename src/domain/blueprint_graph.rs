use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Graph document produced from a model reply and handed to the editor.
///
/// Field names on the wire follow the editor's format (`blueprintName`,
/// `nodeType`, ...). Properties this type does not model are kept in `extra`
/// and written back unchanged. Text fields accept any JSON value: `null`
/// reads as empty, other scalars and containers as their JSON text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlueprintGraph {
    #[serde(
        rename = "blueprintName",
        alias = "graphName",
        default,
        deserialize_with = "lenient_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub graph_name: Option<String>,
    #[serde(
        rename = "blueprintDescription",
        alias = "graphDescription",
        default,
        deserialize_with = "lenient_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub graph_description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    /// Advisory node category. Unknown labels pass through untouched.
    #[serde(
        rename = "nodeType",
        alias = "kind",
        default,
        deserialize_with = "lenient_text"
    )]
    pub kind: String,
    #[serde(
        default,
        deserialize_with = "lenient_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<String>,
    #[serde(default)]
    pub inputs: Vec<Pin>,
    #[serde(default)]
    pub outputs: Vec<Pin>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphNode {
    pub fn node_kind(&self) -> Option<NodeKind> {
        NodeKind::from_label(&self.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub pin_type: String,
    /// Default value for an unconnected input pin. `None` means the key was
    /// absent (output pins); an explicit `null` is kept as `Some(Value::Null)`.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default, deserialize_with = "lenient_text")]
    pub source_node_id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub source_pin_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub target_node_id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub target_pin_name: String,
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(value_to_text)
}

fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        other => Some(value_to_text(other)),
    })
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Event,
    Function,
    Variable,
    Macro,
}

impl NodeKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "event" => Some(Self::Event),
            "function" => Some(Self::Function),
            "variable" => Some(Self::Variable),
            "macro" => Some(Self::Macro),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Function => "function",
            Self::Variable => "variable",
            Self::Macro => "macro",
        }
    }
}
