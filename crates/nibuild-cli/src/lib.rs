mod cli;
mod config;
mod io;
mod run;
mod telemetry;

pub use cli::{Cli, Commands, CompileCommand, OutputFormat};
pub use config::{
    load_config, validate_config, CompileConfig, ConfigError, NibuildConfig, OutputConfig,
    CONFIG_SCHEMA,
};
pub use io::{load_tool_registry, LoadedTools};
pub use run::{execute_compile, execute_template, sanitize_filename, CliError};
pub use telemetry::init_tracing;
