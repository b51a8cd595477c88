mod bind;
mod compile_graph;
mod ir;
mod job_template;
mod options;
mod outputs;
mod partition;
mod render;
mod requirements;
mod scatter;
mod step_ids;
mod wiring;

pub(crate) const TRACING_TARGET: &str = "nibuild_compiler::compiler";

pub use compile_graph::{compile, compile_graph, CompileError, CompileOutput};
pub use ir::{
    CompiledStep, CompiledWorkflow, InputBinding, InputSource, PickValue, Requirement,
    ScatterDirective, StepInput, WorkflowInput, WorkflowOutput,
};
pub use job_template::{build_job_template, CapturedValue, JobEntry, JobTemplate};
pub use options::CompileOptions;
pub use render::{
    render_job_template_yaml, render_workflow_value, render_workflow_yaml, workflow_fingerprint,
    RenderOptions, SHEBANG,
};
pub use requirements::{aggregate_requirements, FeatureUsage};
pub use scatter::ScatterSets;
pub use step_ids::{RenamedStep, StepIds};
pub use wiring::{InputKey, WiredInputIndex, WiredSource};
