use crate::documents::{LinkMerge, NodeKind};
use nibuild_core::{FieldPath, OrderedMap};
use serde_json::Value;

/// Comparison operators a bare when-condition may start with.
pub const VALID_OPERATORS: [&str; 6] = ["==", "!=", ">=", "<=", ">", "<"];

/// Validated graph snapshot. Every compilation stage reads it and builds a new one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub tool_label: String,
    pub parameters: OrderedMap<Value>,
    pub docker_version: String,
    pub scatter_enabled: bool,
    pub gather_enabled: bool,
    pub link_merge_overrides: OrderedMap<LinkMerge>,
    pub when: Option<WhenClause>,
    /// Already wrapped as `$(...)`.
    pub expressions: OrderedMap<String>,
    pub dataset_selections: OrderedMap<Vec<String>>,
    /// Id of the sub-pipeline this node was inlined from.
    pub origin: Option<String>,
    pub path: FieldPath,
    pub sub_pipeline: Option<SubPipeline>,
}

impl Node {
    pub fn link_merge(&self, input: &str) -> LinkMerge {
        self.link_merge_overrides
            .get(input)
            .copied()
            .unwrap_or_default()
    }

    pub fn is_sub_pipeline(&self) -> bool {
        self.kind == NodeKind::SubPipeline
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubPipeline {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub mappings: Vec<Mapping>,
    pub path: FieldPath,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pub source_output: PortRef,
    pub target_input: PortRef,
}

/// Port name on one side of a mapping. Ports on a sub-pipeline boundary
/// name the internal node they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortRef {
    Plain(String),
    Namespaced { node: String, port: String },
}

impl PortRef {
    pub fn plain(name: impl Into<String>) -> Self {
        PortRef::Plain(name.into())
    }

    /// Splits `node/port` at the first slash.
    pub fn parse_boundary(token: &str) -> Option<Self> {
        let (node, port) = token.split_once('/')?;
        if node.is_empty() || port.is_empty() {
            return None;
        }
        Some(PortRef::Namespaced {
            node: node.to_string(),
            port: port.to_string(),
        })
    }

    /// The name as it appears in the editor.
    pub fn token(&self) -> String {
        match self {
            PortRef::Plain(name) => name.clone(),
            PortRef::Namespaced { node, port } => format!("{node}/{port}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhenClause {
    /// Full expression, rendered as given.
    Raw(String),
    /// Bare condition applied to one of the step's inputs.
    Bound { parameter: String, condition: String },
}

impl WhenClause {
    pub fn render(&self) -> String {
        match self {
            WhenClause::Raw(expression) => expression.clone(),
            WhenClause::Bound {
                parameter,
                condition,
            } => format!("$(inputs.{parameter} {condition})"),
        }
    }

    pub fn parameter(&self) -> Option<&str> {
        match self {
            WhenClause::Raw(_) => None,
            WhenClause::Bound { parameter, .. } => Some(parameter),
        }
    }
}
