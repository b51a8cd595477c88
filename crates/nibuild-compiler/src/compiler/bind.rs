use crate::compiler::ir::{CompiledStep, InputBinding, InputSource, StepInput, WorkflowInput};
use crate::compiler::job_template::CapturedValue;
use crate::compiler::partition::Partition;
use crate::compiler::requirements::FeatureUsage;
use crate::compiler::scatter::{scatter_directive, ScatterSets};
use crate::compiler::step_ids::StepIds;
use crate::compiler::wiring::WiredInputIndex;
use crate::compiler::TRACING_TARGET;
use crate::documents::ToolInput;
use crate::graph::{Node, WhenClause};
use crate::registry::ResolvedTool;
use nibuild_core::{CwlType, StructuredIssue};
use serde_json::Value;

/// Graph-wide facts every step binding reads.
pub(crate) struct BindContext<'a> {
    pub wiring: &'a WiredInputIndex,
    pub scatter: &'a ScatterSets,
    pub step_ids: &'a StepIds,
    pub partition: &'a Partition<'a>,
    /// Workflow inputs keep bare names when the graph compiles to one step.
    pub single_step: bool,
    pub run_prefix: &'a str,
}

/// Workflow input a step exposes, with the job value captured for it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExposedInput {
    pub input: WorkflowInput,
    pub captured: Option<CapturedValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StepBinding {
    pub step: CompiledStep,
    pub exposed: Vec<ExposedInput>,
    pub usage: FeatureUsage,
    pub conditional: bool,
    pub issues: Vec<StructuredIssue>,
}

pub(crate) fn bind_step(ctx: &BindContext<'_>, node: &Node, tool: &ResolvedTool<'_>) -> StepBinding {
    let definition = tool.definition();
    let mut binder = StepBinder {
        ctx,
        node,
        step_id: ctx.step_ids.step_id(&node.id).to_string(),
        expands: ctx.scatter.expands(&node.id),
        inputs: Vec::new(),
        exposed: Vec::new(),
        usage: FeatureUsage::default(),
        issues: Vec::new(),
    };

    for (name, input) in definition.required_inputs.iter() {
        binder.bind_required(name, input);
    }
    for (name, input) in definition.optional_inputs.iter() {
        binder.bind_optional(name, input);
    }

    if let Some(WhenClause::Bound { parameter, .. }) = &node.when {
        if !definition.has_input(parameter) {
            binder.issues.push(
                StructuredIssue::warning(
                    "compile_warning",
                    node.path.clone().key("whenParameter"),
                    format!(
                        "guard parameter `{parameter}` is not an input of `{}`",
                        node.tool_label
                    ),
                    "graph.when.parameter",
                )
                .with_node(&node.id),
            );
        }
    }
    let when = node.when.as_ref().map(WhenClause::render);
    let conditional = when.is_some();
    binder.usage.inline_javascript |= conditional;

    let scatter = scatter_directive(node, definition, ctx.scatter, ctx.wiring, ctx.partition);
    binder.usage.scatter = scatter.is_some();

    let docker_pull = definition
        .docker_image
        .as_deref()
        .filter(|image| !image.is_empty())
        .map(|image| format!("{image}:{}", node.docker_version));

    tracing::debug!(
        target: TRACING_TARGET,
        node_id = %node.id,
        step_id = %binder.step_id,
        exposed = binder.exposed.len(),
        scattered = scatter.is_some(),
        "bound step"
    );

    StepBinding {
        step: CompiledStep {
            id: binder.step_id,
            node_id: node.id.clone(),
            run: format!("{}{}", ctx.run_prefix, definition.cwl_path),
            scatter,
            inputs: binder.inputs,
            out: definition.outputs.keys().map(str::to_string).collect(),
            docker_pull,
            when,
        },
        exposed: binder.exposed,
        usage: binder.usage,
        conditional,
        issues: binder.issues,
    }
}

struct StepBinder<'c, 'a> {
    ctx: &'c BindContext<'a>,
    node: &'c Node,
    step_id: String,
    expands: bool,
    inputs: Vec<StepInput>,
    exposed: Vec<ExposedInput>,
    usage: FeatureUsage,
    issues: Vec<StructuredIssue>,
}

impl StepBinder<'_, '_> {
    fn bind_required(&mut self, name: &str, input: &ToolInput) {
        let cwl_type = self.input_type(name, input);

        if let Some(expression) = self.expression(name) {
            let source = match self.wired_source(name) {
                Some(source) => source,
                None => self.expose(name, cwl_type, None, None),
            };
            self.push(name, source, Some(expression));
            return;
        }

        if let Some(source) = self.wired_source(name) {
            self.push(name, source, None);
            return;
        }

        let exposed_type = if self.expands && cwl_type.is_file_like() {
            cwl_type.array_of()
        } else {
            cwl_type
        };
        let captured = if carries_paths(&exposed_type) {
            None
        } else {
            self.user_value(name).map(CapturedValue::user)
        };
        let source = self.expose(name, exposed_type, None, captured);
        self.push(name, source, None);
    }

    fn bind_optional(&mut self, name: &str, input: &ToolInput) {
        let cwl_type = self.input_type(name, input);

        if let Some(expression) = self.expression(name) {
            let source = match self.wired_source(name) {
                Some(source) => source,
                None => self.expose(name, cwl_type.nullable(), None, None),
            };
            self.push(name, source, Some(expression));
            return;
        }

        if cwl_type.is_record() {
            let default = self.user_value(name);
            let source = self.expose(name, CwlType::Any.nullable(), default, None);
            self.push(name, source, None);
            return;
        }

        if let Some(source) = self.wired_source(name) {
            self.push(name, source, None);
            return;
        }

        let captured = match self.user_value(name) {
            Some(value) => Some(CapturedValue::user(value)),
            None if input.has_default => input
                .default_value
                .clone()
                .filter(|value| !value.is_null())
                .map(CapturedValue::tool_default),
            None => cwl_type
                .zero_value(input.lower_bound())
                .map(CapturedValue::user),
        };
        let source = self.expose(name, cwl_type.nullable(), None, captured);
        self.push(name, source, None);
    }

    fn input_type(&mut self, name: &str, input: &ToolInput) -> CwlType {
        input.cwl_type().unwrap_or_else(|err| {
            self.issues.push(
                StructuredIssue::warning(
                    "compile_warning",
                    self.node.path.clone(),
                    format!("input `{name}` of `{}`: {err}; using Any", self.node.tool_label),
                    "tool.input.type",
                )
                .with_node(&self.node.id),
            );
            CwlType::Any
        })
    }

    fn expression(&mut self, name: &str) -> Option<String> {
        let expression = self.node.expressions.get(name)?.clone();
        self.usage.step_input_expression = true;
        self.usage.inline_javascript = true;
        Some(expression)
    }

    fn wired_source(&mut self, name: &str) -> Option<InputSource> {
        let ctx = self.ctx;
        match ctx.wiring.sources(&self.node.id, name) {
            [] => None,
            [single] => Some(InputSource::Single(single.reference(ctx.step_ids))),
            many => {
                self.usage.multiple_input = true;
                Some(InputSource::Merged {
                    sources: many
                        .iter()
                        .map(|source| source.reference(ctx.step_ids))
                        .collect(),
                    link_merge: self.node.link_merge(name),
                })
            }
        }
    }

    fn exposed_name(&self, name: &str) -> String {
        if self.ctx.single_step {
            name.to_string()
        } else {
            format!("{}_{name}", self.step_id)
        }
    }

    fn expose(
        &mut self,
        name: &str,
        cwl_type: CwlType,
        default: Option<Value>,
        captured: Option<CapturedValue>,
    ) -> InputSource {
        let exposed_name = self.exposed_name(name);
        self.exposed.push(ExposedInput {
            input: WorkflowInput {
                name: exposed_name.clone(),
                cwl_type,
                default,
            },
            captured,
        });
        InputSource::Single(exposed_name)
    }

    fn push(&mut self, name: &str, source: InputSource, value_from: Option<String>) {
        self.inputs.push(StepInput {
            name: name.to_string(),
            binding: InputBinding { source, value_from },
        });
    }

    /// The user's value for a parameter, when it can be written to a job file.
    fn user_value(&self, name: &str) -> Option<Value> {
        let value = self.node.parameters.get(name)?;
        if is_serializable(value) && value.as_str() != Some("") {
            Some(value.clone())
        } else {
            tracing::debug!(
                target: TRACING_TARGET,
                node_id = %self.node.id,
                parameter = name,
                "ignored unset parameter value"
            );
            None
        }
    }
}

fn is_serializable(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => items.iter().all(is_serializable),
        Value::Object(fields) => fields.values().all(is_serializable),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => true,
    }
}

/// True when job values for the type are file or directory references.
fn carries_paths(cwl_type: &CwlType) -> bool {
    match cwl_type {
        CwlType::File | CwlType::Directory => true,
        CwlType::Array(items) | CwlType::Nullable(items) => carries_paths(items),
        _ => false,
    }
}

#[cfg(test)]
#[path = "bind_test.rs"]
mod tests;
