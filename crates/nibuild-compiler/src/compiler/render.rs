use crate::compiler::ir::{CompiledStep, CompiledWorkflow, InputBinding, InputSource, ScatterDirective};
use crate::compiler::job_template::JobTemplate;
use nibuild_core::{fingerprint_hex, FingerprintOptions};
use serde_json::{json, Map, Value};

pub const SHEBANG: &str = "#!/usr/bin/env cwl-runner";
const TOOL_DEFAULT_COMMENT: &str = "  # tool default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub shebang: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { shebang: true }
    }
}

/// The workflow as a CWL document, with keys in conventional CWL order.
pub fn render_workflow_value(workflow: &CompiledWorkflow) -> Value {
    let mut document = Map::new();
    document.insert("cwlVersion".to_string(), json!(workflow.cwl_version));
    document.insert("class".to_string(), json!("Workflow"));

    let mut inputs = Map::new();
    for input in &workflow.inputs {
        let mut entry = Map::new();
        entry.insert("type".to_string(), input.cwl_type.to_value());
        if let Some(default) = &input.default {
            entry.insert("default".to_string(), default.clone());
        }
        inputs.insert(input.name.clone(), Value::Object(entry));
    }
    document.insert("inputs".to_string(), Value::Object(inputs));

    let mut outputs = Map::new();
    for output in &workflow.outputs {
        let mut entry = Map::new();
        entry.insert("type".to_string(), output.cwl_type.to_value());
        entry.insert("outputSource".to_string(), json!(output.output_source));
        if let Some(pick_value) = output.pick_value {
            entry.insert("pickValue".to_string(), json!(pick_value.as_str()));
        }
        outputs.insert(output.name.clone(), Value::Object(entry));
    }
    document.insert("outputs".to_string(), Value::Object(outputs));

    let mut steps = Map::new();
    for step in &workflow.steps {
        steps.insert(step.id.clone(), render_step(step));
    }
    document.insert("steps".to_string(), Value::Object(steps));

    if !workflow.requirements.is_empty() {
        let requirements: Map<String, Value> = workflow
            .requirements
            .iter()
            .map(|requirement| (requirement.class_name().to_string(), json!({})))
            .collect();
        document.insert("requirements".to_string(), Value::Object(requirements));
    }

    Value::Object(document)
}

fn render_step(step: &CompiledStep) -> Value {
    let mut entry = Map::new();
    entry.insert("run".to_string(), json!(step.run));
    match &step.scatter {
        Some(ScatterDirective::Single(input)) => {
            entry.insert("scatter".to_string(), json!(input));
        }
        Some(ScatterDirective::Lockstep(inputs)) => {
            entry.insert("scatter".to_string(), json!(inputs));
            entry.insert("scatterMethod".to_string(), json!("dotproduct"));
        }
        None => {}
    }

    let bindings: Map<String, Value> = step
        .inputs
        .iter()
        .map(|input| (input.name.clone(), render_binding(&input.binding)))
        .collect();
    entry.insert("in".to_string(), Value::Object(bindings));
    entry.insert("out".to_string(), json!(step.out));

    if let Some(docker_pull) = &step.docker_pull {
        entry.insert(
            "hints".to_string(),
            json!({ "DockerRequirement": { "dockerPull": docker_pull } }),
        );
    }
    if let Some(when) = &step.when {
        entry.insert("when".to_string(), json!(when));
    }
    Value::Object(entry)
}

fn render_binding(binding: &InputBinding) -> Value {
    let mut entry = Map::new();
    match &binding.source {
        InputSource::Single(source) => {
            if binding.value_from.is_none() {
                return json!(source);
            }
            entry.insert("source".to_string(), json!(source));
        }
        InputSource::Merged {
            sources,
            link_merge,
        } => {
            entry.insert("source".to_string(), json!(sources));
            entry.insert("linkMerge".to_string(), json!(link_merge.as_str()));
        }
    }
    if let Some(value_from) = &binding.value_from {
        entry.insert("valueFrom".to_string(), json!(value_from));
    }
    Value::Object(entry)
}

pub fn render_workflow_yaml(
    workflow: &CompiledWorkflow,
    options: &RenderOptions,
) -> Result<String, serde_yaml::Error> {
    let body = serde_yaml::to_string(&render_workflow_value(workflow))?;
    Ok(if options.shebang {
        format!("{SHEBANG}\n\n{body}")
    } else {
        body
    })
}

/// The job file as YAML; entries holding a tool default carry a trailing comment.
pub fn render_job_template_yaml(template: &JobTemplate) -> Result<String, serde_yaml::Error> {
    let body = serde_yaml::to_string(&template.to_value())?;
    let mut rendered = String::with_capacity(body.len());
    for line in body.lines() {
        rendered.push_str(line);
        if template
            .tool_defaults
            .iter()
            .any(|name| is_entry_line(line, name))
        {
            rendered.push_str(TOOL_DEFAULT_COMMENT);
        }
        rendered.push('\n');
    }
    Ok(rendered)
}

fn is_entry_line(line: &str, name: &str) -> bool {
    [format!("{name}:"), format!("'{name}':"), format!("\"{name}\":")]
        .iter()
        .any(|key| line.starts_with(key.as_str()))
}

/// SHA-256 over the canonical JSON of the rendered workflow.
pub fn workflow_fingerprint(workflow: &CompiledWorkflow) -> serde_json::Result<String> {
    fingerprint_hex(
        &render_workflow_value(workflow),
        &FingerprintOptions::default(),
    )
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
