use crate::documents::{ToolDefinition, ToolInput, ToolOutput, ToolRegistryDocument};
use nibuild_core::OrderedMap;
use regex::Regex;
use std::collections::BTreeMap;

/// Read-only lookup of tool metadata by editor label.
pub trait ToolLookup {
    fn get(&self, label: &str) -> Option<&ToolDefinition>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDefinition>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: &ToolRegistryDocument) -> Self {
        let mut registry = Self::new();
        registry.extend_from(document);
        registry
    }

    /// Registers a tool, returning the definition it replaced.
    pub fn register(
        &mut self,
        label: impl Into<String>,
        definition: ToolDefinition,
    ) -> Option<ToolDefinition> {
        self.tools.insert(label.into(), definition)
    }

    /// Merges a registry document; later documents win. Returns the replaced labels.
    pub fn extend_from(&mut self, document: &ToolRegistryDocument) -> Vec<String> {
        document
            .tools
            .iter()
            .filter_map(|(label, definition)| {
                self.register(label, definition.clone())
                    .map(|_| label.to_string())
            })
            .collect()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl ToolLookup for ToolRegistry {
    fn get(&self, label: &str) -> Option<&ToolDefinition> {
        self.tools.get(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedTool<'a> {
    Registered {
        tool_id: String,
        definition: &'a ToolDefinition,
    },
    /// Stand-in for a label missing from the registry.
    Generic {
        tool_id: String,
        definition: ToolDefinition,
    },
}

impl ResolvedTool<'_> {
    pub fn tool_id(&self) -> &str {
        match self {
            ResolvedTool::Registered { tool_id, .. } | ResolvedTool::Generic { tool_id, .. } => {
                tool_id
            }
        }
    }

    pub fn definition(&self) -> &ToolDefinition {
        match self {
            ResolvedTool::Registered { definition, .. } => definition,
            ResolvedTool::Generic { definition, .. } => definition,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, ResolvedTool::Registered { .. })
    }
}

pub fn resolve_tool<'a>(lookup: &'a dyn ToolLookup, label: &str) -> ResolvedTool<'a> {
    match lookup.get(label) {
        Some(definition) => ResolvedTool::Registered {
            tool_id: definition
                .id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| sanitize_tool_id(label)),
            definition,
        },
        None => {
            let tool_id = sanitize_tool_id(label);
            ResolvedTool::Generic {
                definition: generic_tool(&tool_id),
                tool_id,
            }
        }
    }
}

/// Lowercases a label and maps every character outside `[a-z0-9]` to `_`.
pub fn sanitize_tool_id(label: &str) -> String {
    let pattern = Regex::new(r"[^a-z0-9]").expect("valid regex");
    pattern.replace_all(&label.to_lowercase(), "_").into_owned()
}

/// One `File` in, one `File` out.
pub fn generic_tool(tool_id: &str) -> ToolDefinition {
    let mut required_inputs = OrderedMap::new();
    required_inputs.insert("input", ToolInput::of_type("File"));
    let mut outputs = OrderedMap::new();
    outputs.insert("output", ToolOutput::of_type("File"));
    ToolDefinition {
        id: Some(tool_id.to_string()),
        cwl_path: format!("cwl/generic/{tool_id}.cwl"),
        docker_image: None,
        required_inputs,
        optional_inputs: OrderedMap::new(),
        outputs,
    }
}

#[cfg(test)]
#[path = "tool_registry_test.rs"]
mod tests;
