use crate::compiler::ir::CompiledWorkflow;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Concrete job value recorded while binding an input.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedValue {
    pub value: Value,
    /// True when the value is the tool's declared default rather than a user choice.
    pub from_tool_default: bool,
}

impl CapturedValue {
    pub fn user(value: Value) -> Self {
        Self {
            value,
            from_tool_default: false,
        }
    }

    pub fn tool_default(value: Value) -> Self {
        Self {
            value,
            from_tool_default: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobEntry {
    pub name: String,
    pub value: Value,
}

/// Starter job file: one entry per workflow input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobTemplate {
    pub entries: Vec<JobEntry>,
    pub tool_defaults: BTreeSet<String>,
}

impl JobTemplate {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }

    pub fn is_tool_default(&self, name: &str) -> bool {
        self.tool_defaults.contains(name)
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for entry in &self.entries {
            map.insert(entry.name.clone(), entry.value.clone());
        }
        Value::Object(map)
    }
}

/// Fills each workflow input from, in order: a captured value, the input's
/// own default, then a placeholder for its type.
pub fn build_job_template(
    workflow: &CompiledWorkflow,
    captured: &BTreeMap<String, CapturedValue>,
) -> JobTemplate {
    let mut template = JobTemplate::default();
    for input in &workflow.inputs {
        let value = match captured.get(&input.name) {
            Some(captured) => {
                if captured.from_tool_default {
                    template.tool_defaults.insert(input.name.clone());
                }
                captured.value.clone()
            }
            None => input
                .default
                .clone()
                .unwrap_or_else(|| input.cwl_type.placeholder()),
        };
        template.entries.push(JobEntry {
            name: input.name.clone(),
            value,
        });
    }
    template
}

#[cfg(test)]
#[path = "job_template_test.rs"]
mod tests;
