use nibuild_compiler::{CompileOptions, PickValue, RenderOptions};
use nibuild_core::{FieldPath, IssueSeverity, StructuredIssue};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA: &str = "nibuild-config/0.1.0";

const SUPPORTED_CWL_VERSIONS: &[&str] = &["v1.2"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NibuildConfig {
    #[serde(default = "default_config_schema")]
    pub schema: String,
    /// Tool registry files or directories, relative to the config file.
    #[serde(default)]
    pub tools: Vec<PathBuf>,
    #[serde(default)]
    pub compile: CompileConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompileConfig {
    #[serde(default = "default_cwl_version")]
    pub cwl_version: String,
    #[serde(default = "default_run_prefix")]
    pub run_prefix: String,
    #[serde(default = "default_scattered_conditional_pick")]
    pub scattered_conditional_pick: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_shebang")]
    pub shebang: bool,
}

impl Default for NibuildConfig {
    fn default() -> Self {
        Self {
            schema: default_config_schema(),
            tools: Vec::new(),
            compile: CompileConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            cwl_version: default_cwl_version(),
            run_prefix: default_run_prefix(),
            scattered_conditional_pick: default_scattered_conditional_pick(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            shebang: default_shebang(),
        }
    }
}

impl NibuildConfig {
    /// Only meaningful on a config that passed [`validate_config`].
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            cwl_version: self.compile.cwl_version.clone(),
            run_prefix: self.compile.run_prefix.clone(),
            scattered_conditional_pick: parse_pick_value(&self.compile.scattered_conditional_pick)
                .unwrap_or(PickValue::FirstNonNull),
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            shebang: self.output.shebang,
        }
    }

    /// Tool paths resolved against `base`.
    pub fn tool_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.tools
            .iter()
            .map(|path| {
                if path.is_absolute() {
                    path.clone()
                } else {
                    base.join(path)
                }
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config failed `{path}`: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("config validation failed: {0:?}")]
    Validation(Vec<StructuredIssue>),
}

pub fn load_config(path: &Path) -> Result<NibuildConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let expanded = expand_env_placeholders(raw.as_str()).map_err(ConfigError::Parse)?;
    let config: NibuildConfig = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(expanded.as_str())
            .map_err(|error| ConfigError::Parse(format!("json decode error: {error}")))?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(expanded.as_str())
            .map_err(|error| ConfigError::Parse(format!("yaml decode error: {error}")))?,
        _ => serde_yaml::from_str(expanded.as_str())
            .or_else(|_| serde_json::from_str(expanded.as_str()))
            .map_err(|error| ConfigError::Parse(error.to_string()))?,
    };

    let mut issues = validate_config(&config);
    StructuredIssue::sort_stable(&mut issues);
    if !issues.is_empty() {
        return Err(ConfigError::Validation(issues));
    }
    Ok(config)
}

pub fn validate_config(config: &NibuildConfig) -> Vec<StructuredIssue> {
    let mut issues = Vec::new();
    if config.schema != CONFIG_SCHEMA {
        issues.push(config_issue(
            "config.schema",
            FieldPath::root().key("schema"),
            format!(
                "unsupported config schema `{}` (expected `{CONFIG_SCHEMA}`)",
                config.schema
            ),
        ));
    }
    if !SUPPORTED_CWL_VERSIONS.contains(&config.compile.cwl_version.as_str()) {
        issues.push(config_issue(
            "config.compile.cwl_version",
            FieldPath::root().key("compile").key("cwl_version"),
            format!(
                "unsupported cwl version `{}` (supported: {})",
                config.compile.cwl_version,
                SUPPORTED_CWL_VERSIONS.join(", ")
            ),
        ));
    }
    if parse_pick_value(&config.compile.scattered_conditional_pick).is_none() {
        issues.push(config_issue(
            "config.compile.scattered_conditional_pick",
            FieldPath::root()
                .key("compile")
                .key("scattered_conditional_pick"),
            format!(
                "unknown pick policy `{}` (expected `first_non_null` or `all_non_null`)",
                config.compile.scattered_conditional_pick
            ),
        ));
    }
    for (index, path) in config.tools.iter().enumerate() {
        if path.as_os_str().is_empty() {
            issues.push(config_issue(
                "config.tools.empty_path",
                FieldPath::root().key("tools").index(index),
                "tool path must not be empty".to_string(),
            ));
        }
    }
    issues
}

fn parse_pick_value(value: &str) -> Option<PickValue> {
    [PickValue::FirstNonNull, PickValue::AllNonNull]
        .into_iter()
        .find(|pick| pick.as_str() == value)
}

fn config_issue(reference: &str, field_path: FieldPath, message: String) -> StructuredIssue {
    StructuredIssue {
        kind: "config_error".to_string(),
        severity: IssueSeverity::Error,
        node_id: None,
        field_path,
        message,
        reference: Some(reference.to_string()),
    }
}

fn default_config_schema() -> String {
    CONFIG_SCHEMA.to_string()
}

fn default_cwl_version() -> String {
    CompileOptions::default().cwl_version
}

fn default_run_prefix() -> String {
    CompileOptions::default().run_prefix
}

fn default_scattered_conditional_pick() -> String {
    CompileOptions::default()
        .scattered_conditional_pick
        .as_str()
        .to_string()
}

fn default_shebang() -> bool {
    true
}

fn expand_env_placeholders(input: &str) -> Result<String, String> {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;
    while let Some(start_offset) = input[cursor..].find("${") {
        let start = cursor + start_offset;
        out.push_str(&input[cursor..start]);
        let name_start = start + 2;
        let Some(end_offset) = input[name_start..].find('}') else {
            return Err("unterminated env placeholder `${...`".to_string());
        };
        let end = name_start + end_offset;
        let name = &input[name_start..end];
        if name.is_empty() {
            return Err("empty env placeholder `${}`".to_string());
        }
        let value = std::env::var(name)
            .map_err(|_| format!("missing env var for placeholder `${{{name}}}`"))?;
        out.push_str(value.as_str());
        cursor = end + 1;
    }
    out.push_str(&input[cursor..]);
    Ok(out)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
