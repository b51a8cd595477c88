use crate::cli::{CompileCommand, OutputFormat};
use crate::config::{load_config, ConfigError, NibuildConfig};
use crate::io::load_tool_registry;
use nibuild_compiler::{
    compile_graph, parse_graph_document, render_job_template_yaml, render_workflow_value,
    render_workflow_yaml, workflow_fingerprint, CompileError, CompileOutput, GraphDocument,
    ParseDocumentOptions, RenderOptions,
};
use nibuild_core::StructuredIssue;
use regex::Regex;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

const MAX_FILENAME_LEN: usize = 50;
const FALLBACK_FILENAME: &str = "main";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("read file failed `{path}`: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("write file failed `{path}`: {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("graph parse failed `{path}`:\n{}", format_issues(.issues))]
    GraphParse {
        path: String,
        issues: Vec<StructuredIssue>,
    },
    #[error("tool registry load failed:\n{}", format_issues(.0))]
    ToolsLoad(Vec<StructuredIssue>),
    #[error("config load failed: {0}")]
    Config(#[from] ConfigError),
    #[error("compile failed: {0}")]
    Compile(#[from] CompileError),
    #[error("yaml encode failed: {0}")]
    YamlEncode(#[from] serde_yaml::Error),
    #[error("json encode failed: {0}")]
    JsonEncode(#[from] serde_json::Error),
}

/// Compiles the graph and returns the workflow and job template.
///
/// With `--out-dir` both documents are written to disk and the output lists
/// the written files instead.
pub fn execute_compile(command: &CompileCommand) -> Result<String, CliError> {
    let compiled = compile_command(command)?;
    let workflow_yaml = render_workflow_yaml(&compiled.output.workflow, &compiled.render)?;
    let job_yaml = render_job_template_yaml(&compiled.output.job_template)?;

    if let Some(out_dir) = &command.out_dir {
        let workflow_path = out_dir.join(format!("{}.cwl", compiled.name));
        let job_path = out_dir.join(format!("{}.job.yml", compiled.name));
        create_dir(out_dir)?;
        write_file(&workflow_path, &workflow_yaml)?;
        write_file(&job_path, &job_yaml)?;
        return render_written(command.format, &compiled, &[workflow_path, job_path]);
    }

    match command.format {
        OutputFormat::Yaml => Ok(format!("{}---\n{}", workflow_yaml, job_yaml)
            .trim_end()
            .to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "name": compiled.name,
            "fingerprint": workflow_fingerprint(&compiled.output.workflow)?,
            "workflow": render_workflow_value(&compiled.output.workflow),
            "job": compiled.output.job_template.to_value(),
            "tool_defaults": compiled.output.job_template.tool_defaults,
            "issues": compiled.output.issues,
        }))?),
    }
}

/// Compiles the graph and returns only the job template.
pub fn execute_template(command: &CompileCommand) -> Result<String, CliError> {
    let compiled = compile_command(command)?;
    let job_yaml = render_job_template_yaml(&compiled.output.job_template)?;

    if let Some(out_dir) = &command.out_dir {
        let job_path = out_dir.join(format!("{}.job.yml", compiled.name));
        create_dir(out_dir)?;
        write_file(&job_path, &job_yaml)?;
        return render_written(command.format, &compiled, &[job_path]);
    }

    match command.format {
        OutputFormat::Yaml => Ok(job_yaml.trim_end().to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(
            &compiled.output.job_template.to_value(),
        )?),
    }
}

struct CompiledCommand {
    name: String,
    output: CompileOutput,
    render: RenderOptions,
}

fn compile_command(command: &CompileCommand) -> Result<CompiledCommand, CliError> {
    let (config, config_dir) = match &command.config {
        Some(path) => (load_config(path)?, parent_dir(path)),
        None => (NibuildConfig::default(), PathBuf::from(".")),
    };

    let mut tool_paths = config.tool_paths(config_dir.as_path());
    tool_paths.extend(command.tools.iter().cloned());
    let tools = load_tool_registry(&tool_paths).map_err(CliError::ToolsLoad)?;
    for issue in &tools.issues {
        tracing::warn!(reference = ?issue.reference, "{}", issue.message);
    }
    tracing::debug!(
        files = tools.files.len(),
        tools = tools.registry.len(),
        "tool registry loaded"
    );

    let graph = read_graph(command.graph.as_path())?;
    let output = compile_graph(&graph, &tools.registry, &config.compile_options())?;
    tracing::debug!(
        steps = output.workflow.steps.len(),
        inputs = output.workflow.inputs.len(),
        outputs = output.workflow.outputs.len(),
        issues = output.issues.len(),
        "graph compiled"
    );

    let name = command
        .name
        .clone()
        .or_else(|| graph.name.clone())
        .or_else(|| {
            command
                .graph
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_default();
    Ok(CompiledCommand {
        name: sanitize_filename(&name),
        output,
        render: config.render_options(),
    })
}

fn read_graph(path: &Path) -> Result<GraphDocument, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    parse_graph_document(text.as_str(), ParseDocumentOptions::default()).map_err(|issues| {
        CliError::GraphParse {
            path: path.display().to_string(),
            issues,
        }
    })
}

fn render_written(
    format: OutputFormat,
    compiled: &CompiledCommand,
    written: &[PathBuf],
) -> Result<String, CliError> {
    let files = written
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>();
    match format {
        OutputFormat::Yaml => Ok(files
            .iter()
            .map(|file| format!("wrote {file}"))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "name": compiled.name,
            "files": files,
            "issues": compiled.output.issues,
        }))?),
    }
}

/// Reduces a pipeline name to a safe file stem: `[a-z0-9_-]`, at most
/// 50 characters, `main` when nothing survives.
pub fn sanitize_filename(name: &str) -> String {
    let lowered = name.to_lowercase().replace("..", "").replace(['/', '\\'], "");
    let replaced = Regex::new(r"[^a-z0-9_-]")
        .expect("valid regex")
        .replace_all(lowered.as_str(), "_");
    let collapsed = Regex::new(r"_+")
        .expect("valid regex")
        .replace_all(replaced.as_ref(), "_");
    let trimmed = collapsed
        .trim_matches('_')
        .chars()
        .take(MAX_FILENAME_LEN)
        .collect::<String>();
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn create_dir(path: &Path) -> Result<(), CliError> {
    fs::create_dir_all(path).map_err(|source| CliError::WriteFile {
        path: path.display().to_string(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), CliError> {
    fs::write(path, content).map_err(|source| CliError::WriteFile {
        path: path.display().to_string(),
        source,
    })
}

fn format_issues(issues: &[StructuredIssue]) -> String {
    issues
        .iter()
        .map(|issue| {
            let reference = issue.reference.as_deref().unwrap_or(issue.kind.as_str());
            format!("  [{reference}] {}", issue.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
