use crate::compiler::bind::{bind_step, BindContext};
use crate::compiler::ir::{CompiledWorkflow, WorkflowInput};
use crate::compiler::job_template::{build_job_template, CapturedValue, JobTemplate};
use crate::compiler::options::CompileOptions;
use crate::compiler::outputs::{declare_outputs, OutputContext};
use crate::compiler::partition::{partition, Partition};
use crate::compiler::requirements::{aggregate_requirements, FeatureUsage};
use crate::compiler::scatter::ScatterSets;
use crate::compiler::step_ids::StepIds;
use crate::compiler::wiring::WiredInputIndex;
use crate::compiler::TRACING_TARGET;
use crate::documents::GraphDocument;
use crate::graph::{expand_sub_pipelines, lower_graph, topological_order, Graph, Node};
use crate::registry::{resolve_tool, ResolvedTool, ToolLookup};
use nibuild_core::{CwlType, StructuredIssue};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub struct CompileOutput {
    pub workflow: CompiledWorkflow,
    pub job_template: JobTemplate,
    /// Anomalies recovered from during compilation, sorted.
    pub issues: Vec<StructuredIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("workflow graph has cycles through: {}", nodes.join(", "))]
    CyclicGraph { nodes: Vec<String> },
}

/// Compiles an editor graph into a workflow and its starter job file.
pub fn compile_graph(
    document: &GraphDocument,
    tools: &dyn ToolLookup,
    options: &CompileOptions,
) -> Result<CompileOutput, CompileError> {
    let lowered = lower_graph(document);
    let mut output = compile(&lowered.graph, tools, options)?;
    output.issues.extend(lowered.issues);
    StructuredIssue::sort_stable(&mut output.issues);
    Ok(output)
}

/// Compiles an already lowered graph.
pub fn compile(
    graph: &Graph,
    tools: &dyn ToolLookup,
    options: &CompileOptions,
) -> Result<CompileOutput, CompileError> {
    let expanded = expand_sub_pipelines(graph);
    let mut issues = expanded.issues.clone();
    let parts = partition(&expanded.graph);
    issues.extend(parts.issues.iter().cloned());
    tracing::debug!(
        target: TRACING_TARGET,
        steps = parts.steps.len(),
        datasets = parts.datasets.len(),
        edges = parts.step_edges.len() + parts.dataset_edges.len(),
        "expanded graph"
    );

    let node_ids: Vec<&str> = parts.steps.iter().map(|node| node.id.as_str()).collect();
    let edge_pairs: Vec<(&str, &str)> = parts
        .step_edges
        .iter()
        .map(|edge| (edge.source.as_str(), edge.target.as_str()))
        .collect();
    let order = topological_order(&node_ids, &edge_pairs)
        .map_err(|nodes| CompileError::CyclicGraph { nodes })?;

    let mut resolved: BTreeMap<String, ResolvedTool<'_>> = BTreeMap::new();
    for node in &parts.steps {
        let tool = resolve_tool(tools, &node.tool_label);
        if !tool.is_registered() {
            issues.push(
                StructuredIssue::warning(
                    "compile_warning",
                    node.path.clone().key("toolLabel"),
                    format!(
                        "tool `{}` is not registered; using generic File to File step `{}`",
                        node.tool_label,
                        tool.tool_id()
                    ),
                    "tool.unknown",
                )
                .with_node(&node.id),
            );
        }
        resolved.insert(node.id.clone(), tool);
    }

    let ordered: Vec<(&str, &str)> = order
        .iter()
        .filter_map(|node_id| {
            resolved
                .get(node_id)
                .map(|tool| (node_id.as_str(), tool.tool_id()))
        })
        .collect();
    let step_ids = StepIds::assign(&ordered);
    for renamed in step_ids.renamed() {
        let path = parts
            .steps
            .iter()
            .find(|node| node.id == renamed.node_id)
            .map(|node| node.path.clone())
            .unwrap_or_default();
        issues.push(
            StructuredIssue::warning(
                "compile_warning",
                path,
                format!(
                    "step id `{}` is already taken; using `{}`",
                    renamed.wanted, renamed.assigned
                ),
                "step.id.collision",
            )
            .with_node(&renamed.node_id),
        );
    }
    let wiring = WiredInputIndex::build(&parts.step_edges, &parts.dataset_edges);
    let scatter = propagate_scatter(&parts);

    let mut inputs = Vec::new();
    let mut captured = BTreeMap::new();
    declare_dataset_inputs(&parts, &mut inputs, &mut captured);

    let ctx = BindContext {
        wiring: &wiring,
        scatter: &scatter,
        step_ids: &step_ids,
        partition: &parts,
        single_step: order.len() == 1,
        run_prefix: &options.run_prefix,
    };
    let nodes_by_id: BTreeMap<&str, &Node> = parts
        .steps
        .iter()
        .map(|node| (node.id.as_str(), *node))
        .collect();

    let mut steps = Vec::with_capacity(order.len());
    let mut usage = FeatureUsage::default();
    let mut conditional = BTreeSet::new();
    for node_id in &order {
        let (Some(node), Some(tool)) = (nodes_by_id.get(node_id.as_str()), resolved.get(node_id))
        else {
            continue;
        };
        let binding = bind_step(&ctx, node, tool);
        for exposed in binding.exposed {
            match exposed.captured {
                Some(value) => captured.insert(exposed.input.name.clone(), value),
                None => captured.remove(&exposed.input.name),
            };
            declare_input(&mut inputs, exposed.input);
        }
        usage = usage | binding.usage;
        if binding.conditional {
            conditional.insert(node_id.clone());
        }
        issues.extend(binding.issues);
        steps.push(binding.step);
    }

    let terminals: Vec<&Node> = parts
        .steps
        .iter()
        .copied()
        .filter(|node| !parts.step_edges.iter().any(|edge| edge.source == node.id))
        .collect();
    let (outputs, output_issues) = declare_outputs(
        &OutputContext {
            tools: &resolved,
            step_ids: &step_ids,
            scatter: &scatter,
            conditional: &conditional,
            scattered_conditional_pick: options.scattered_conditional_pick,
        },
        &terminals,
    );
    issues.extend(output_issues);

    let workflow = CompiledWorkflow {
        cwl_version: options.cwl_version.clone(),
        inputs,
        outputs,
        steps,
        requirements: aggregate_requirements(usage),
    };
    let job_template = build_job_template(&workflow, &captured);

    StructuredIssue::sort_stable(&mut issues);
    for issue in &issues {
        tracing::warn!(
            target: TRACING_TARGET,
            reference = issue.reference.as_deref().unwrap_or_default(),
            node_id = issue.node_id.as_deref().unwrap_or_default(),
            "{}",
            issue.message
        );
    }
    tracing::debug!(
        target: TRACING_TARGET,
        steps = workflow.steps.len(),
        inputs = workflow.inputs.len(),
        outputs = workflow.outputs.len(),
        requirements = workflow.requirements.len(),
        "compiled workflow"
    );

    Ok(CompileOutput {
        workflow,
        job_template,
        issues,
    })
}

fn propagate_scatter(parts: &Partition<'_>) -> ScatterSets {
    let nodes: Vec<&Node> = parts
        .steps
        .iter()
        .chain(parts.datasets.iter())
        .copied()
        .collect();
    let edges: Vec<_> = parts
        .step_edges
        .iter()
        .chain(parts.dataset_edges.iter())
        .copied()
        .collect();
    ScatterSets::propagate(&nodes, &edges)
}

/// Declares one `File[]` input per dataset selection a step consumes.
fn declare_dataset_inputs(
    parts: &Partition<'_>,
    inputs: &mut Vec<WorkflowInput>,
    captured: &mut BTreeMap<String, CapturedValue>,
) {
    for edge in &parts.dataset_edges {
        let dataset = parts.datasets.iter().find(|node| node.id == edge.source);
        for mapping in &edge.mappings {
            let selection = mapping.source_output.token();
            if inputs.iter().any(|input| input.name == selection) {
                continue;
            }
            if let Some(paths) = dataset.and_then(|node| node.dataset_selections.get(&selection)) {
                let files: Vec<Value> = paths
                    .iter()
                    .map(|path| json!({ "class": "File", "path": path }))
                    .collect();
                captured.insert(selection.clone(), CapturedValue::user(Value::Array(files)));
            }
            inputs.push(WorkflowInput {
                name: selection,
                cwl_type: CwlType::File.array_of(),
                default: None,
            });
        }
    }
}

/// Adds a workflow input; a later input with the same name replaces the earlier one in place.
fn declare_input(inputs: &mut Vec<WorkflowInput>, input: WorkflowInput) {
    match inputs.iter_mut().find(|existing| existing.name == input.name) {
        Some(existing) => *existing = input,
        None => inputs.push(input),
    }
}

#[cfg(test)]
#[path = "compile_graph_test.rs"]
mod tests;
