use nibuild_compiler::{parse_tool_registry_document, ParseDocumentOptions, ToolRegistry};
use nibuild_core::{FieldPath, StructuredIssue};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct LoadedTools {
    pub registry: ToolRegistry,
    /// Files read, in merge order.
    pub files: Vec<PathBuf>,
    /// Labels defined by more than one file; the later file wins.
    pub issues: Vec<StructuredIssue>,
}

/// Merges every tool registry under `paths` into one registry.
///
/// A path may name a single document or a directory, which is walked for
/// `.json`, `.yaml` and `.yml` files. Files merge in the order given, and in
/// sorted path order within a directory.
pub fn load_tool_registry(paths: &[PathBuf]) -> Result<LoadedTools, Vec<StructuredIssue>> {
    let mut issues = Vec::<StructuredIssue>::new();
    let mut files = Vec::<PathBuf>::new();
    for path in paths {
        if path.is_dir() {
            files.extend(collect_directory(path.as_path(), &mut issues));
        } else {
            files.push(path.clone());
        }
    }

    let mut loaded = LoadedTools::default();
    for file in files {
        let text = match fs::read_to_string(&file) {
            Ok(text) => text,
            Err(error) => {
                issues.push(io_issue(
                    format!("read file failed: {error}"),
                    "tools.read_file_failed",
                    file.as_path(),
                ));
                continue;
            }
        };
        match parse_tool_registry_document(text.as_str(), ParseDocumentOptions::default()) {
            Ok(document) => {
                for label in loaded.registry.extend_from(&document) {
                    tracing::debug!(label = %label, file = %file.display(), "tool definition replaced");
                    loaded.issues.push(
                        StructuredIssue::warning(
                            "tools_warning",
                            FieldPath::root().key("tools").key(label.as_str()),
                            format!("{}: tool `{label}` redefined", file.display()),
                            "tools.duplicate_label",
                        )
                        .with_node(label),
                    );
                }
                loaded.files.push(file);
            }
            Err(parse_issues) => issues.extend(
                parse_issues
                    .into_iter()
                    .map(|issue| attach_issue_file(issue, file.as_path())),
            ),
        }
    }

    if issues.is_empty() {
        StructuredIssue::sort_stable(&mut loaded.issues);
        Ok(loaded)
    } else {
        StructuredIssue::sort_stable(&mut issues);
        Err(issues)
    }
}

fn collect_directory(root: &Path, issues: &mut Vec<StructuredIssue>) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = match fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(error) => {
                issues.push(io_issue(
                    format!("read_dir failed: {error}"),
                    "tools.read_dir_failed",
                    current.as_path(),
                ));
                continue;
            }
        };
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    issues.push(io_issue(
                        format!("read_dir entry failed: {error}"),
                        "tools.read_dir_entry_failed",
                        current.as_path(),
                    ));
                    continue;
                }
            };
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if is_document_candidate(path.as_path()) {
                found.push(path);
            }
        }
    }
    found.sort();
    found
}

fn is_document_candidate(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("json") | Some("yaml") | Some("yml")
    )
}

fn io_issue(message: String, reference: &str, path: &Path) -> StructuredIssue {
    StructuredIssue::error(
        "tools_io_error",
        FieldPath::root(),
        format!("{}: {message}", path.display()),
        reference,
    )
}

fn attach_issue_file(mut issue: StructuredIssue, path: &Path) -> StructuredIssue {
    issue.message = format!("{}: {}", path.display(), issue.message);
    issue
}

#[cfg(test)]
#[path = "load_tools_test.rs"]
mod tests;
