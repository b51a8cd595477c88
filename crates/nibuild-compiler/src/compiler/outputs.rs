use crate::compiler::ir::{PickValue, WorkflowOutput};
use crate::compiler::scatter::ScatterSets;
use crate::compiler::step_ids::StepIds;
use crate::graph::Node;
use crate::registry::ResolvedTool;
use nibuild_core::{CwlType, StructuredIssue};
use std::collections::{BTreeMap, BTreeSet};

pub(crate) struct OutputContext<'a> {
    pub tools: &'a BTreeMap<String, ResolvedTool<'a>>,
    pub step_ids: &'a StepIds,
    pub scatter: &'a ScatterSets,
    pub conditional: &'a BTreeSet<String>,
    pub scattered_conditional_pick: PickValue,
}

/// Exposes every output of every terminal step as a workflow output.
pub(crate) fn declare_outputs(
    ctx: &OutputContext<'_>,
    terminals: &[&Node],
) -> (Vec<WorkflowOutput>, Vec<StructuredIssue>) {
    let mut outputs = Vec::new();
    let mut issues = Vec::new();
    let bare_names = terminals.len() == 1;

    for node in terminals {
        let Some(tool) = ctx.tools.get(&node.id) else {
            continue;
        };
        let step_id = ctx.step_ids.step_id(&node.id);
        let expands = ctx.scatter.expands(&node.id);
        let conditional = ctx.conditional.contains(&node.id);

        for (name, output) in tool.definition().outputs.iter() {
            let declared = output.cwl_type().unwrap_or_else(|err| {
                issues.push(
                    StructuredIssue::warning(
                        "compile_warning",
                        node.path.clone(),
                        format!("output `{name}` of `{}`: {err}; using Any", node.tool_label),
                        "tool.output.type",
                    )
                    .with_node(&node.id),
                );
                CwlType::Any
            });
            let base = if expands { declared.array_of() } else { declared };
            let (cwl_type, pick_value) = match (conditional, expands) {
                (false, _) => (base, None),
                (true, false) => (base.nullable(), Some(PickValue::FirstNonNull)),
                (true, true) => match ctx.scattered_conditional_pick {
                    PickValue::FirstNonNull => (base.nullable(), Some(PickValue::FirstNonNull)),
                    PickValue::AllNonNull => (base, Some(PickValue::AllNonNull)),
                },
            };

            outputs.push(WorkflowOutput {
                name: if bare_names {
                    name.to_string()
                } else {
                    format!("{step_id}_{name}")
                },
                cwl_type,
                output_source: format!("{step_id}/{name}"),
                pick_value,
            });
        }
    }

    (outputs, issues)
}

#[cfg(test)]
#[path = "outputs_test.rs"]
mod tests;
