mod json;
mod yaml;

use crate::documents::{GraphDocument, ToolRegistryDocument};
use nibuild_core::{FieldPath, StructuredIssue};
use nibuild_schema::validate_schema_instance;
use nibuild_schema::versions::{SCHEMA_GRAPH_0_1_0, SCHEMA_TOOLS_0_1_0};
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Auto,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseDocumentOptions {
    pub format: DocumentFormat,
    pub validate_schema: bool,
}

impl Default for ParseDocumentOptions {
    fn default() -> Self {
        Self {
            format: DocumentFormat::Auto,
            validate_schema: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NibuildDocument {
    Graph(GraphDocument),
    Tools(ToolRegistryDocument),
}

impl NibuildDocument {
    pub fn schema_id(&self) -> &'static str {
        match self {
            NibuildDocument::Graph(_) => SCHEMA_GRAPH_0_1_0,
            NibuildDocument::Tools(_) => SCHEMA_TOOLS_0_1_0,
        }
    }
}

pub fn parse_document(input: &str) -> Result<NibuildDocument, Vec<StructuredIssue>> {
    parse_document_with_options(input, ParseDocumentOptions::default())
}

pub fn parse_document_with_options(
    input: &str,
    options: ParseDocumentOptions,
) -> Result<NibuildDocument, Vec<StructuredIssue>> {
    let value = match options.format {
        DocumentFormat::Auto => {
            if looks_like_json(input) {
                json::parse_json(input)
            } else {
                yaml::parse_yaml(input)
            }
        }
        DocumentFormat::Json => json::parse_json(input),
        DocumentFormat::Yaml => yaml::parse_yaml(input),
    }?;

    let schema_id = extract_schema_id(&value)?;

    if options.validate_schema {
        let mut issues = validate_schema_instance(schema_id.as_str(), &value);
        if !issues.is_empty() {
            StructuredIssue::sort_stable(&mut issues);
            return Err(issues);
        }
    }

    match schema_id.as_str() {
        SCHEMA_GRAPH_0_1_0 => Ok(NibuildDocument::Graph(parse_typed_document(value, &schema_id)?)),
        SCHEMA_TOOLS_0_1_0 => Ok(NibuildDocument::Tools(parse_typed_document(value, &schema_id)?)),
        _ => Err(vec![StructuredIssue::error(
            "parse_error",
            FieldPath::root().key("schema"),
            format!("unsupported nibuild schema: {schema_id}"),
            "parse.unsupported_schema",
        )]),
    }
}

pub fn parse_graph_document(
    input: &str,
    options: ParseDocumentOptions,
) -> Result<GraphDocument, Vec<StructuredIssue>> {
    match parse_document_with_options(input, options)? {
        NibuildDocument::Graph(graph) => Ok(graph),
        other => Err(vec![unexpected_schema(other.schema_id(), SCHEMA_GRAPH_0_1_0)]),
    }
}

pub fn parse_tool_registry_document(
    input: &str,
    options: ParseDocumentOptions,
) -> Result<ToolRegistryDocument, Vec<StructuredIssue>> {
    match parse_document_with_options(input, options)? {
        NibuildDocument::Tools(tools) => Ok(tools),
        other => Err(vec![unexpected_schema(other.schema_id(), SCHEMA_TOOLS_0_1_0)]),
    }
}

fn unexpected_schema(found: &str, expected: &str) -> StructuredIssue {
    StructuredIssue::error(
        "parse_error",
        FieldPath::root().key("schema"),
        format!("expected a {expected} document, found {found}"),
        "parse.unexpected_schema",
    )
}

fn looks_like_json(input: &str) -> bool {
    let trimmed = input.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

fn extract_schema_id(value: &Value) -> Result<String, Vec<StructuredIssue>> {
    value
        .as_object()
        .and_then(|obj| obj.get("schema"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            vec![StructuredIssue::error(
                "parse_error",
                FieldPath::root(),
                "document must contain string field `schema`",
                "parse.schema_required",
            )]
        })
}

fn parse_typed_document<T: DeserializeOwned>(
    value: Value,
    schema_id: &str,
) -> Result<T, Vec<StructuredIssue>> {
    serde_json::from_value::<T>(value).map_err(|err| {
        vec![StructuredIssue::error(
            "parse_error",
            FieldPath::root(),
            format!("typed parse failed for schema {schema_id}: {err}"),
            "parse.typed_deserialize_error",
        )]
    })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
