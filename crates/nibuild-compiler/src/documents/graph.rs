use nibuild_core::OrderedMap;
use nibuild_schema::versions::SCHEMA_GRAPH_0_1_0;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A pipeline graph as the editor hands it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GraphDocument {
    pub schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub edges: Vec<EdgeDocument>,
}

impl GraphDocument {
    pub fn new(nodes: Vec<NodeDocument>, edges: Vec<EdgeDocument>) -> Self {
        Self {
            schema: SCHEMA_GRAPH_0_1_0.to_string(),
            name: None,
            nodes,
            edges,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    #[default]
    Tool,
    /// Visual input/output marker; never compiled.
    PassThrough,
    /// Supplies array-valued file inputs resolved from a structured dataset.
    DatasetSource,
    /// Reusable pipeline inlined before compilation.
    SubPipeline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum LinkMerge {
    #[default]
    #[serde(rename = "merge_flattened")]
    Flattened,
    #[serde(rename = "merge_nested")]
    Nested,
}

impl LinkMerge {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkMerge::Flattened => "merge_flattened",
            LinkMerge::Nested => "merge_nested",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDocument {
    pub id: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default, alias = "label")]
    pub tool_label: String,
    #[serde(default)]
    pub parameters: OrderedMap<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_version: Option<String>,
    #[serde(default)]
    pub scatter_enabled: bool,
    #[serde(default)]
    pub gather_enabled: bool,
    #[serde(default)]
    pub link_merge_overrides: OrderedMap<LinkMerge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_expression: Option<String>,
    /// Parameter a bare condition such as `== true` is applied to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_parameter: Option<String>,
    #[serde(default)]
    pub expressions: OrderedMap<String>,
    #[serde(default)]
    pub dataset_selections: OrderedMap<Vec<String>>,
    #[serde(default)]
    pub internal_nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub internal_edges: Vec<EdgeDocument>,
}

impl NodeDocument {
    pub fn new(id: impl Into<String>, kind: NodeKind, tool_label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            tool_label: tool_label.into(),
            parameters: OrderedMap::new(),
            docker_version: None,
            scatter_enabled: false,
            gather_enabled: false,
            link_merge_overrides: OrderedMap::new(),
            when_expression: None,
            when_parameter: None,
            expressions: OrderedMap::new(),
            dataset_selections: OrderedMap::new(),
            internal_nodes: Vec::new(),
            internal_edges: Vec::new(),
        }
    }

    pub fn tool(id: impl Into<String>, tool_label: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Tool, tool_label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDocument {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub mappings: Vec<MappingDocument>,
}

impl EdgeDocument {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        mappings: &[(&str, &str)],
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            mappings: mappings
                .iter()
                .map(|(source_output, target_input)| MappingDocument {
                    source_output: source_output.to_string(),
                    target_input: target_input.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDocument {
    pub source_output: String,
    pub target_input: String,
}
