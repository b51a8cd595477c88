use crate::compiler::ir::ScatterDirective;
use crate::compiler::partition::Partition;
use crate::compiler::wiring::WiredInputIndex;
use crate::documents::{NodeKind, ToolDefinition};
use crate::graph::{Edge, Node};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Scatter state of the step and dataset-source nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScatterSets {
    /// Nodes without incoming edges.
    pub sources: BTreeSet<String>,
    pub gathers: BTreeSet<String>,
    pub scattered: BTreeSet<String>,
}

impl ScatterSets {
    /// Marks every node reachable from a scatter seed. A gather node is
    /// marked but does not pass the mark on.
    pub fn propagate(nodes: &[&Node], edges: &[&Edge]) -> Self {
        let known: BTreeSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
        let mut successors: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        let mut has_incoming: BTreeSet<&str> = BTreeSet::new();
        for edge in edges {
            let (source, target) = (edge.source.as_str(), edge.target.as_str());
            if !known.contains(source) || !known.contains(target) {
                continue;
            }
            successors.entry(source).or_default().push(target);
            has_incoming.insert(target);
        }

        let mut sets = Self::default();
        for node in nodes {
            if !has_incoming.contains(node.id.as_str()) {
                sets.sources.insert(node.id.clone());
            }
            if node.gather_enabled {
                sets.gathers.insert(node.id.clone());
            }
        }

        let mut queue: VecDeque<&str> = VecDeque::new();
        for node in nodes {
            let seeded = node.kind == NodeKind::DatasetSource
                || (node.scatter_enabled
                    && (sets.sources.contains(&node.id) || node.origin.is_some()));
            if seeded && sets.scattered.insert(node.id.clone()) && !node.gather_enabled {
                queue.push_back(node.id.as_str());
            }
        }

        while let Some(node_id) = queue.pop_front() {
            for successor in successors.get(node_id).into_iter().flatten() {
                if sets.scattered.insert(successor.to_string()) && !sets.gathers.contains(*successor) {
                    queue.push_back(*successor);
                }
            }
        }

        sets
    }

    pub fn is_source(&self, node_id: &str) -> bool {
        self.sources.contains(node_id)
    }

    pub fn is_gather(&self, node_id: &str) -> bool {
        self.gathers.contains(node_id)
    }

    pub fn is_scattered(&self, node_id: &str) -> bool {
        self.scattered.contains(node_id)
    }

    /// Scattered and not gathering: the step runs once per array element.
    pub fn expands(&self, node_id: &str) -> bool {
        self.is_scattered(node_id) && !self.is_gather(node_id)
    }
}

/// Chooses the inputs a step scatters over.
///
/// Source steps scatter over their unwired required `File`/`Directory`
/// inputs. Downstream steps scatter over inputs wired from a scattered
/// step or from a dataset source.
pub(crate) fn scatter_directive(
    node: &Node,
    tool: &ToolDefinition,
    sets: &ScatterSets,
    wiring: &WiredInputIndex,
    partition: &Partition<'_>,
) -> Option<ScatterDirective> {
    if !sets.expands(&node.id) {
        return None;
    }

    let mut inputs: Vec<String> = Vec::new();

    let is_source = sets.is_source(&node.id);
    if !is_source {
        for edge in partition.step_edges.iter().filter(|edge| edge.target == node.id) {
            if sets.is_scattered(&edge.source) {
                for mapping in &edge.mappings {
                    push_unique(&mut inputs, mapping.target_input.token());
                }
            }
        }
        for edge in partition.dataset_edges.iter().filter(|edge| edge.target == node.id) {
            for mapping in &edge.mappings {
                push_unique(&mut inputs, mapping.target_input.token());
            }
        }
    }

    if inputs.is_empty() && (is_source || node.scatter_enabled) {
        for (name, input) in tool.required_inputs.iter() {
            let file_like = input
                .cwl_type()
                .map(|cwl_type| cwl_type.is_file_like())
                .unwrap_or(false);
            if file_like && !wiring.is_wired(&node.id, name) {
                push_unique(&mut inputs, name.to_string());
            }
        }
    }

    match inputs.len() {
        0 => None,
        1 => inputs.pop().map(ScatterDirective::Single),
        _ => Some(ScatterDirective::Lockstep(inputs)),
    }
}

fn push_unique(inputs: &mut Vec<String>, name: String) {
    if !inputs.contains(&name) {
        inputs.push(name);
    }
}

#[cfg(test)]
#[path = "scatter_test.rs"]
mod tests;
