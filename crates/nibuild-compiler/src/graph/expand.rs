use super::model::{Edge, Graph, Mapping, Node, PortRef};
use nibuild_core::StructuredIssue;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedGraph {
    pub graph: Graph,
    pub issues: Vec<StructuredIssue>,
}

/// Inlines every top-level sub-pipeline node into the surrounding graph.
///
/// Internal nodes become `<outer>__<inner>` and internal edges
/// `<outer>__<edge>`. Edges that touch a sub-pipeline are split so that
/// each resulting edge connects one pair of concrete nodes. Sub-pipelines
/// nested inside a sub-pipeline are kept as opaque nodes.
pub fn expand_sub_pipelines(graph: &Graph) -> ExpandedGraph {
    let mut issues = Vec::new();
    let mut nodes = Vec::new();
    let mut inlined_nodes = Vec::new();
    let mut inlined_edges = Vec::new();

    for node in &graph.nodes {
        let Some(sub_pipeline) = node.sub_pipeline.as_ref() else {
            nodes.push(node.clone());
            continue;
        };
        for inner in &sub_pipeline.nodes {
            if inner.is_sub_pipeline() {
                issues.push(
                    StructuredIssue::warning(
                        "compile_warning",
                        inner.path.clone(),
                        format!(
                            "sub-pipeline `{}` nested inside `{}` is not expanded",
                            inner.id, node.id
                        ),
                        "graph.subpipeline.nested",
                    )
                    .with_node(&inner.id),
                );
            }
            inlined_nodes.push(Node {
                id: inner_id(&node.id, &inner.id),
                origin: Some(node.id.clone()),
                ..inner.clone()
            });
        }
        for edge in &sub_pipeline.edges {
            inlined_edges.push(Edge {
                id: inner_id(&node.id, &edge.id),
                source: inner_id(&node.id, &edge.source),
                target: inner_id(&node.id, &edge.target),
                ..edge.clone()
            });
        }
    }

    let boundaries: BTreeSet<&str> = graph
        .nodes
        .iter()
        .filter(|node| node.sub_pipeline.is_some())
        .map(|node| node.id.as_str())
        .collect();

    let mut edges = Vec::new();
    for edge in &graph.edges {
        let source_is_boundary = boundaries.contains(edge.source.as_str());
        let target_is_boundary = boundaries.contains(edge.target.as_str());
        if !source_is_boundary && !target_is_boundary {
            edges.push(edge.clone());
            continue;
        }
        edges.extend(split_boundary_edge(edge, source_is_boundary, target_is_boundary));
    }

    nodes.extend(inlined_nodes);
    edges.extend(inlined_edges);

    ExpandedGraph {
        graph: Graph { nodes, edges },
        issues,
    }
}

fn inner_id(outer: &str, inner: &str) -> String {
    format!("{outer}__{inner}")
}

/// Resolves an endpoint through a sub-pipeline boundary, if it crosses one.
fn resolve_endpoint(node_id: &str, port: &PortRef, on_boundary: bool) -> (String, PortRef) {
    match port {
        PortRef::Namespaced { node, port } if on_boundary => {
            (inner_id(node_id, node), PortRef::plain(port.as_str()))
        }
        other => (node_id.to_string(), other.clone()),
    }
}

fn split_boundary_edge(edge: &Edge, source_is_boundary: bool, target_is_boundary: bool) -> Vec<Edge> {
    let mut groups: Vec<(String, String, Vec<Mapping>)> = Vec::new();
    for mapping in &edge.mappings {
        let (source, source_output) =
            resolve_endpoint(&edge.source, &mapping.source_output, source_is_boundary);
        let (target, target_input) =
            resolve_endpoint(&edge.target, &mapping.target_input, target_is_boundary);
        let rewritten = Mapping {
            source_output,
            target_input,
        };
        match groups
            .iter_mut()
            .find(|(group_source, group_target, _)| *group_source == source && *group_target == target)
        {
            Some((_, _, mappings)) => mappings.push(rewritten),
            None => groups.push((source, target, vec![rewritten])),
        }
    }

    groups
        .into_iter()
        .map(|(source, target, mappings)| Edge {
            id: format!("{}__{source}::{target}", edge.id),
            source,
            target,
            mappings,
            path: edge.path.clone(),
        })
        .collect()
}

#[cfg(test)]
#[path = "expand_test.rs"]
mod tests;
