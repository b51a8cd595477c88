use crate::documents::LinkMerge;
use nibuild_core::CwlType;
use serde_json::Value;

/// Compiled workflow, ready to be rendered as CWL.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledWorkflow {
    pub cwl_version: String,
    pub inputs: Vec<WorkflowInput>,
    pub outputs: Vec<WorkflowOutput>,
    pub steps: Vec<CompiledStep>,
    pub requirements: Vec<Requirement>,
}

impl CompiledWorkflow {
    pub fn input(&self, name: &str) -> Option<&WorkflowInput> {
        self.inputs.iter().find(|input| input.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&WorkflowOutput> {
        self.outputs.iter().find(|output| output.name == name)
    }

    pub fn step(&self, id: &str) -> Option<&CompiledStep> {
        self.steps.iter().find(|step| step.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowInput {
    pub name: String,
    pub cwl_type: CwlType,
    /// Literal default rendered on the input itself.
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowOutput {
    pub name: String,
    pub cwl_type: CwlType,
    pub output_source: String,
    pub pick_value: Option<PickValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickValue {
    FirstNonNull,
    AllNonNull,
}

impl PickValue {
    pub fn as_str(self) -> &'static str {
        match self {
            PickValue::FirstNonNull => "first_non_null",
            PickValue::AllNonNull => "all_non_null",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStep {
    pub id: String,
    /// Graph node the step was compiled from.
    pub node_id: String,
    pub run: String,
    pub scatter: Option<ScatterDirective>,
    pub inputs: Vec<StepInput>,
    pub out: Vec<String>,
    pub docker_pull: Option<String>,
    pub when: Option<String>,
}

impl CompiledStep {
    pub fn input(&self, name: &str) -> Option<&StepInput> {
        self.inputs.iter().find(|input| input.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScatterDirective {
    Single(String),
    /// Inputs advanced together (`dotproduct`).
    Lockstep(Vec<String>),
}

impl ScatterDirective {
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            ScatterDirective::Single(input) => vec![input.as_str()],
            ScatterDirective::Lockstep(inputs) => inputs.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepInput {
    pub name: String,
    pub binding: InputBinding,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputBinding {
    pub source: InputSource,
    pub value_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Single(String),
    Merged {
        sources: Vec<String>,
        link_merge: LinkMerge,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Requirement {
    InlineJavascript,
    ScatterFeature,
    MultipleInputFeature,
    StepInputExpression,
}

impl Requirement {
    pub fn class_name(self) -> &'static str {
        match self {
            Requirement::InlineJavascript => "InlineJavascriptRequirement",
            Requirement::ScatterFeature => "ScatterFeatureRequirement",
            Requirement::MultipleInputFeature => "MultipleInputFeatureRequirement",
            Requirement::StepInputExpression => "StepInputExpressionRequirement",
        }
    }
}
