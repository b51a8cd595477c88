pub mod compiler;
pub mod documents;
pub mod graph;
pub mod parse;
pub mod registry;

#[cfg(test)]
mod test_fixtures;

pub use compiler::{
    compile_graph, render_job_template_yaml, render_workflow_value, render_workflow_yaml,
    workflow_fingerprint, CompileError, CompileOptions, CompileOutput, CompiledWorkflow,
    JobTemplate, PickValue, RenderOptions,
};
pub use documents::{GraphDocument, NodeDocument, ToolDefinition, ToolRegistryDocument};
pub use parse::{
    parse_document, parse_document_with_options, parse_graph_document,
    parse_tool_registry_document, DocumentFormat, NibuildDocument, ParseDocumentOptions,
};
pub use registry::{ToolLookup, ToolRegistry};
