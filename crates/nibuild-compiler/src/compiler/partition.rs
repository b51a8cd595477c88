use crate::documents::NodeKind;
use crate::graph::{Edge, Graph, Node};
use nibuild_core::StructuredIssue;
use std::collections::BTreeMap;

/// The parts of an expanded graph that take part in compilation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Partition<'g> {
    pub steps: Vec<&'g Node>,
    pub datasets: Vec<&'g Node>,
    /// Edges between two step nodes.
    pub step_edges: Vec<&'g Edge>,
    /// Edges from a dataset-source node into a step node.
    pub dataset_edges: Vec<&'g Edge>,
    pub issues: Vec<StructuredIssue>,
}

impl Partition<'_> {
    pub fn is_step(&self, node_id: &str) -> bool {
        self.steps.iter().any(|node| node.id == node_id)
    }
}

pub(crate) fn partition(graph: &Graph) -> Partition<'_> {
    let kinds: BTreeMap<&str, NodeKind> = graph
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), node.kind))
        .collect();

    let mut partition = Partition {
        steps: Vec::new(),
        datasets: Vec::new(),
        step_edges: Vec::new(),
        dataset_edges: Vec::new(),
        issues: Vec::new(),
    };

    for node in &graph.nodes {
        match node.kind {
            NodeKind::Tool | NodeKind::SubPipeline => partition.steps.push(node),
            NodeKind::DatasetSource => partition.datasets.push(node),
            NodeKind::PassThrough => {}
        }
    }

    for edge in &graph.edges {
        let (Some(source), Some(target)) = (
            kinds.get(edge.source.as_str()).copied(),
            kinds.get(edge.target.as_str()).copied(),
        ) else {
            let missing = if kinds.contains_key(edge.source.as_str()) {
                &edge.target
            } else {
                &edge.source
            };
            partition.issues.push(StructuredIssue::warning(
                "compile_warning",
                edge.path.clone(),
                format!("edge `{}` references unknown node `{missing}`; edge dropped", edge.id),
                "graph.edge.dangling",
            ));
            continue;
        };

        match (is_step_kind(source), is_step_kind(target), source) {
            (true, true, _) => partition.step_edges.push(edge),
            (false, true, NodeKind::DatasetSource) => partition.dataset_edges.push(edge),
            _ => {}
        }
    }

    partition
}

fn is_step_kind(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Tool | NodeKind::SubPipeline)
}

#[cfg(test)]
#[path = "partition_test.rs"]
mod tests;
