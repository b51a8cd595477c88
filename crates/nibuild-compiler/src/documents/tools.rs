use nibuild_core::{CwlType, CwlTypeError, OrderedMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolRegistryDocument {
    pub schema: String,
    pub tools: OrderedMap<ToolDefinition>,
}

/// Registry metadata for one tool, keyed by its editor label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub cwl_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,
    #[serde(default)]
    pub required_inputs: OrderedMap<ToolInput>,
    #[serde(default)]
    pub optional_inputs: OrderedMap<ToolInput>,
    #[serde(default)]
    pub outputs: OrderedMap<ToolOutput>,
}

impl ToolDefinition {
    pub fn has_input(&self, name: &str) -> bool {
        self.required_inputs.contains_key(name) || self.optional_inputs.contains_key(name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInput {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_decl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default)]
    pub has_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl ToolInput {
    pub fn of_type(type_decl: &str) -> Self {
        Self {
            type_decl: Some(type_decl.to_string()),
            ..Self::default()
        }
    }

    pub fn cwl_type(&self) -> Result<CwlType, CwlTypeError> {
        CwlType::declared(self.type_decl.as_deref(), &self.options)
    }

    pub fn lower_bound(&self) -> Option<&Value> {
        self.bounds.as_ref().and_then(|bounds| bounds.first())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_decl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ToolOutput {
    pub fn of_type(type_decl: &str) -> Self {
        Self {
            type_decl: Some(type_decl.to_string()),
            label: None,
        }
    }

    pub fn cwl_type(&self) -> Result<CwlType, CwlTypeError> {
        CwlType::declared(self.type_decl.as_deref(), &[])
    }
}
