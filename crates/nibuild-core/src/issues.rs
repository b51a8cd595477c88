use crate::field_path::FieldPath;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
    Info,
}

/// A diagnostic attached to a document location.
///
/// Errors stop a parse or load. Warnings describe anomalies the compiler
/// recovered from, such as an unregistered tool or a dropped parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredIssue {
    pub kind: String,
    pub severity: IssueSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub field_path: FieldPath,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl StructuredIssue {
    pub fn error(
        kind: &str,
        field_path: FieldPath,
        message: impl Into<String>,
        reference: &str,
    ) -> Self {
        Self {
            kind: kind.to_string(),
            severity: IssueSeverity::Error,
            node_id: None,
            field_path,
            message: message.into(),
            reference: Some(reference.to_string()),
        }
    }

    pub fn warning(
        kind: &str,
        field_path: FieldPath,
        message: impl Into<String>,
        reference: &str,
    ) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            ..Self::error(kind, field_path, message, reference)
        }
    }

    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }

    pub fn sort_stable(issues: &mut [Self]) {
        issues.sort_by(|left, right| {
            (
                left.severity,
                &left.kind,
                &left.field_path,
                &left.message,
                &left.node_id,
            )
                .cmp(&(
                    right.severity,
                    &right.kind,
                    &right.field_path,
                    &right.message,
                    &right.node_id,
                ))
        });
    }
}

impl Display for StructuredIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Info => "info",
        };
        write!(f, "{severity}[{}] {}: {}", self.kind, self.field_path, self.message)?;
        if let Some(node_id) = &self.node_id {
            write!(f, " (node `{node_id}`)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "issues_test.rs"]
mod tests;
