use std::collections::{BTreeMap, BTreeSet};

/// Step identifier for each compiled node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepIds {
    by_node: BTreeMap<String, String>,
    renamed: Vec<RenamedStep>,
}

/// A node whose natural step id was already taken by an earlier node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedStep {
    pub node_id: String,
    pub wanted: String,
    pub assigned: String,
}

impl StepIds {
    /// Names steps after their tool. A tool used more than once gets
    /// `<tool>_<n>`, numbered from 1 in the order given.
    ///
    /// `ordered` pairs each node id with its tool id, in topological order.
    /// Ids never repeat: when a name is already taken, a numbered step moves
    /// to its next free ordinal and any other step gets a `_<k>` suffix.
    pub fn assign(ordered: &[(&str, &str)]) -> Self {
        let mut occurrences: BTreeMap<&str, usize> = BTreeMap::new();
        for &(_, tool_id) in ordered {
            *occurrences.entry(tool_id).or_default() += 1;
        }

        let mut ordinals: BTreeMap<&str, usize> = BTreeMap::new();
        let mut taken = BTreeSet::new();
        let mut by_node = BTreeMap::new();
        let mut renamed = Vec::new();
        for &(node_id, tool_id) in ordered {
            let repeated = occurrences.get(tool_id).copied().unwrap_or_default() > 1;
            let (wanted, step_id) = if repeated {
                let ordinal = ordinals.entry(tool_id).or_default();
                *ordinal += 1;
                let wanted = format!("{tool_id}_{ordinal}");
                let mut step_id = wanted.clone();
                while taken.contains(&step_id) {
                    *ordinal += 1;
                    step_id = format!("{tool_id}_{ordinal}");
                }
                (wanted, step_id)
            } else {
                let wanted = tool_id.to_string();
                let mut step_id = wanted.clone();
                let mut suffix = 1;
                while taken.contains(&step_id) {
                    suffix += 1;
                    step_id = format!("{tool_id}_{suffix}");
                }
                (wanted, step_id)
            };
            if wanted != step_id {
                renamed.push(RenamedStep {
                    node_id: node_id.to_string(),
                    wanted,
                    assigned: step_id.clone(),
                });
            }
            taken.insert(step_id.clone());
            by_node.insert(node_id.to_string(), step_id);
        }
        Self { by_node, renamed }
    }

    /// Nodes that could not keep their natural id, in assignment order.
    pub fn renamed(&self) -> &[RenamedStep] {
        &self.renamed
    }

    pub fn get(&self, node_id: &str) -> Option<&str> {
        self.by_node.get(node_id).map(String::as_str)
    }

    /// Step id of a compiled node; unknown nodes keep their node id.
    pub fn step_id<'a>(&'a self, node_id: &'a str) -> &'a str {
        self.get(node_id).unwrap_or(node_id)
    }

    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }
}

#[cfg(test)]
#[path = "step_ids_test.rs"]
mod tests;
