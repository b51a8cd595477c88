use crate::compiler::step_ids::StepIds;
use crate::graph::Edge;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WiredSource {
    Step { node_id: String, output: String },
    /// Synthetic workflow input fed by a dataset-source node.
    Dataset { selection: String },
}

impl WiredSource {
    pub fn reference(&self, step_ids: &StepIds) -> String {
        match self {
            WiredSource::Step { node_id, output } => {
                format!("{}/{output}", step_ids.step_id(node_id))
            }
            WiredSource::Dataset { selection } => selection.clone(),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, WiredSource::Dataset { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct InputKey {
    pub node_id: String,
    pub input: String,
}

impl InputKey {
    pub fn new(node_id: &str, input: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            input: input.to_string(),
        }
    }
}

/// Which upstream outputs feed each step input, first wired first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WiredInputIndex {
    sources: BTreeMap<InputKey, Vec<WiredSource>>,
}

impl WiredInputIndex {
    pub fn build(step_edges: &[&Edge], dataset_edges: &[&Edge]) -> Self {
        let mut index = Self::default();
        for edge in step_edges {
            for mapping in &edge.mappings {
                index.push(
                    InputKey::new(&edge.target, &mapping.target_input.token()),
                    WiredSource::Step {
                        node_id: edge.source.clone(),
                        output: mapping.source_output.token(),
                    },
                );
            }
        }
        for edge in dataset_edges {
            for mapping in &edge.mappings {
                index.push(
                    InputKey::new(&edge.target, &mapping.target_input.token()),
                    WiredSource::Dataset {
                        selection: mapping.source_output.token(),
                    },
                );
            }
        }
        index
    }

    fn push(&mut self, key: InputKey, source: WiredSource) {
        self.sources.entry(key).or_default().push(source);
    }

    pub fn sources(&self, node_id: &str, input: &str) -> &[WiredSource] {
        self.sources
            .get(&InputKey::new(node_id, input))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_wired(&self, node_id: &str, input: &str) -> bool {
        !self.sources(node_id, input).is_empty()
    }
}

#[cfg(test)]
#[path = "wiring_test.rs"]
mod tests;
