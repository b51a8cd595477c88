use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "nibuild")]
#[command(about = "Compile neuroimaging pipeline graphs into CWL workflows")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Compile a graph into a workflow and its job template.
    Compile(CompileCommand),
    /// Compile a graph and emit only the job template.
    Template(CompileCommand),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub struct CompileCommand {
    #[arg(long)]
    pub graph: PathBuf,
    /// Tool registry file or directory; may be repeated.
    #[arg(long)]
    pub tools: Vec<PathBuf>,
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
    /// Base name for written files; defaults to the graph's name.
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
