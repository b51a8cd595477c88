use super::model::{Edge, Graph, Mapping, Node, PortRef, SubPipeline, WhenClause, VALID_OPERATORS};
use crate::documents::{EdgeDocument, GraphDocument, NodeDocument, NodeKind};
use nibuild_core::{FieldPath, OrderedMap, StructuredIssue};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct LoweredGraph {
    pub graph: Graph,
    pub issues: Vec<StructuredIssue>,
}

/// Converts an editor document into the internal graph model.
pub fn lower_graph(document: &GraphDocument) -> LoweredGraph {
    let mut issues = Vec::new();
    let (nodes, edges) = lower_scope(
        &document.nodes,
        &document.edges,
        &FieldPath::root(),
        &mut issues,
    );
    LoweredGraph {
        graph: Graph { nodes, edges },
        issues,
    }
}

/// Wraps an expression body as `$(...)` unless it is already wrapped.
pub fn wrap_expression(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.starts_with("$(") {
        trimmed.to_string()
    } else {
        format!("$({trimmed})")
    }
}

fn lower_scope(
    nodes: &[NodeDocument],
    edges: &[EdgeDocument],
    base: &FieldPath,
    issues: &mut Vec<StructuredIssue>,
) -> (Vec<Node>, Vec<Edge>) {
    let sub_pipelines: BTreeSet<&str> = nodes
        .iter()
        .filter(|node| node.kind == NodeKind::SubPipeline)
        .map(|node| node.id.as_str())
        .collect();

    let lowered_nodes = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| lower_node(node, base.clone().key(nodes_key(base)).index(index), issues))
        .collect();
    let lowered_edges = edges
        .iter()
        .enumerate()
        .map(|(index, edge)| {
            lower_edge(
                edge,
                &sub_pipelines,
                base.clone().key(edges_key(base)).index(index),
                issues,
            )
        })
        .collect();
    (lowered_nodes, lowered_edges)
}

fn nodes_key(base: &FieldPath) -> &'static str {
    if base.is_root() {
        "nodes"
    } else {
        "internalNodes"
    }
}

fn edges_key(base: &FieldPath) -> &'static str {
    if base.is_root() {
        "edges"
    } else {
        "internalEdges"
    }
}

fn lower_node(document: &NodeDocument, path: FieldPath, issues: &mut Vec<StructuredIssue>) -> Node {
    let sub_pipeline = (document.kind == NodeKind::SubPipeline).then(|| {
        let (nodes, edges) = lower_scope(
            &document.internal_nodes,
            &document.internal_edges,
            &path,
            issues,
        );
        SubPipeline { nodes, edges }
    });

    let expressions: OrderedMap<String> = document
        .expressions
        .iter()
        .filter(|(_, body)| !body.trim().is_empty())
        .map(|(name, body)| (name.to_string(), wrap_expression(body)))
        .collect();

    let when = lower_when(document, &path, issues);

    Node {
        id: document.id.clone(),
        kind: document.kind,
        tool_label: document.tool_label.clone(),
        parameters: document.parameters.clone(),
        docker_version: document
            .docker_version
            .as_deref()
            .map(str::trim)
            .filter(|version| !version.is_empty())
            .unwrap_or("latest")
            .to_string(),
        scatter_enabled: document.scatter_enabled,
        gather_enabled: document.gather_enabled,
        link_merge_overrides: document.link_merge_overrides.clone(),
        when,
        expressions,
        dataset_selections: document.dataset_selections.clone(),
        origin: None,
        path,
        sub_pipeline,
    }
}

fn lower_when(
    document: &NodeDocument,
    path: &FieldPath,
    issues: &mut Vec<StructuredIssue>,
) -> Option<WhenClause> {
    let expression = document
        .when_expression
        .as_deref()
        .map(str::trim)
        .filter(|expression| !expression.is_empty())?;
    if expression.starts_with("$(") {
        return Some(WhenClause::Raw(expression.to_string()));
    }

    let parameter = document
        .when_parameter
        .as_deref()
        .map(str::trim)
        .filter(|parameter| !parameter.is_empty());
    let Some(parameter) = parameter else {
        return Some(WhenClause::Raw(expression.to_string()));
    };

    if !VALID_OPERATORS
        .iter()
        .any(|operator| expression.starts_with(operator))
    {
        issues.push(
            StructuredIssue::warning(
                "compile_warning",
                path.clone().key("whenExpression"),
                format!(
                    "condition `{expression}` does not start with one of {}; kept verbatim",
                    VALID_OPERATORS.join(" ")
                ),
                "graph.when.operator",
            )
            .with_node(&document.id),
        );
        return Some(WhenClause::Raw(expression.to_string()));
    }

    Some(WhenClause::Bound {
        parameter: parameter.to_string(),
        condition: expression.to_string(),
    })
}

fn lower_edge(
    document: &EdgeDocument,
    sub_pipelines: &BTreeSet<&str>,
    path: FieldPath,
    issues: &mut Vec<StructuredIssue>,
) -> Edge {
    let source_is_boundary = sub_pipelines.contains(document.source.as_str());
    let target_is_boundary = sub_pipelines.contains(document.target.as_str());

    let mappings = document
        .mappings
        .iter()
        .enumerate()
        .map(|(index, mapping)| {
            let mapping_path = path.clone().key("mappings").index(index);
            Mapping {
                source_output: lower_port(
                    &mapping.source_output,
                    source_is_boundary,
                    mapping_path.clone().key("sourceOutput"),
                    &document.source,
                    issues,
                ),
                target_input: lower_port(
                    &mapping.target_input,
                    target_is_boundary,
                    mapping_path.key("targetInput"),
                    &document.target,
                    issues,
                ),
            }
        })
        .collect();

    Edge {
        id: document.id.clone(),
        source: document.source.clone(),
        target: document.target.clone(),
        mappings,
        path,
    }
}

fn lower_port(
    token: &str,
    on_boundary: bool,
    path: FieldPath,
    node_id: &str,
    issues: &mut Vec<StructuredIssue>,
) -> PortRef {
    if !on_boundary {
        return PortRef::plain(token);
    }
    PortRef::parse_boundary(token).unwrap_or_else(|| {
        issues.push(
            StructuredIssue::warning(
                "compile_warning",
                path,
                format!("sub-pipeline port `{token}` is not of the form `node/port`"),
                "graph.boundary.malformed",
            )
            .with_node(node_id),
        );
        PortRef::plain(token)
    })
}

#[cfg(test)]
#[path = "lower_test.rs"]
mod tests;
