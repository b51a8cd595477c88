use super::{resolve_tool, sanitize_tool_id, ResolvedTool, ToolLookup, ToolRegistry};
use crate::documents::{ToolDefinition, ToolRegistryDocument};
use nibuild_core::OrderedMap;

fn definition(id: Option<&str>, cwl_path: &str) -> ToolDefinition {
    ToolDefinition {
        id: id.map(str::to_string),
        cwl_path: cwl_path.to_string(),
        docker_image: None,
        required_inputs: OrderedMap::new(),
        optional_inputs: OrderedMap::new(),
        outputs: OrderedMap::new(),
    }
}

#[test]
fn sanitize_tool_id_lowercases_and_replaces_symbols() {
    assert_eq!(sanitize_tool_id("FSL BET"), "fsl_bet");
    assert_eq!(sanitize_tool_id("AFNI-3dSkullStrip"), "afni_3dskullstrip");
    assert_eq!(sanitize_tool_id("ants.Registration"), "ants_registration");
}

#[test]
fn registered_tool_uses_declared_id() {
    let mut registry = ToolRegistry::new();
    registry.register("BET", definition(Some("bet"), "cwl/fsl/bet.cwl"));

    let resolved = resolve_tool(&registry, "BET");
    assert!(resolved.is_registered());
    assert_eq!(resolved.tool_id(), "bet");
    assert_eq!(resolved.definition().cwl_path, "cwl/fsl/bet.cwl");
}

#[test]
fn registered_tool_without_id_falls_back_to_sanitized_label() {
    let mut registry = ToolRegistry::new();
    registry.register("Brain Extraction", definition(None, "cwl/x.cwl"));

    assert_eq!(resolve_tool(&registry, "Brain Extraction").tool_id(), "brain_extraction");
}

#[test]
fn unknown_label_resolves_to_generic_tool() {
    let registry = ToolRegistry::new();
    let resolved = resolve_tool(&registry, "My Tool");

    match &resolved {
        ResolvedTool::Generic { tool_id, definition } => {
            assert_eq!(tool_id, "my_tool");
            assert_eq!(definition.cwl_path, "cwl/generic/my_tool.cwl");
            assert!(definition.required_inputs.contains_key("input"));
            assert!(definition.outputs.contains_key("output"));
        }
        ResolvedTool::Registered { .. } => panic!("expected generic tool"),
    }
}

#[test]
fn later_documents_replace_earlier_definitions() {
    let mut first = ToolRegistryDocument {
        schema: "nibuild-tools/0.1.0".to_string(),
        tools: OrderedMap::new(),
    };
    first.tools.insert("BET", definition(Some("bet"), "cwl/old.cwl"));
    let mut second = first.clone();
    second.tools.insert("BET", definition(Some("bet"), "cwl/new.cwl"));
    second.tools.insert("FLIRT", definition(Some("flirt"), "cwl/flirt.cwl"));

    let mut registry = ToolRegistry::from_document(&first);
    let replaced = registry.extend_from(&second);

    assert_eq!(replaced, vec!["BET".to_string()]);
    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.get("BET").map(|tool| tool.cwl_path.as_str()),
        Some("cwl/new.cwl")
    );
    assert_eq!(registry.labels().collect::<Vec<_>>(), vec!["BET", "FLIRT"]);
}
