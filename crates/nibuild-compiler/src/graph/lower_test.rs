use super::{lower_graph, wrap_expression};
use crate::documents::{EdgeDocument, GraphDocument, NodeDocument, NodeKind};
use crate::graph::{PortRef, WhenClause};

#[test]
fn wrap_expression_leaves_wrapped_bodies_alone() {
    assert_eq!(wrap_expression("inputs.x * 2"), "$(inputs.x * 2)");
    assert_eq!(wrap_expression("$(inputs.x)"), "$(inputs.x)");
    assert_eq!(wrap_expression("  self[0] "), "$(self[0])");
}

#[test]
fn lowering_defaults_docker_version_and_wraps_expressions() {
    let mut node = NodeDocument::tool("n1", "BET");
    node.expressions.insert("frac", "inputs.frac / 2".to_string());
    node.expressions.insert("blank", "   ".to_string());

    let lowered = lower_graph(&GraphDocument::new(vec![node], Vec::new()));
    let node = &lowered.graph.nodes[0];

    assert_eq!(node.docker_version, "latest");
    assert_eq!(node.expressions.get("frac").map(String::as_str), Some("$(inputs.frac / 2)"));
    assert!(!node.expressions.contains_key("blank"));
    assert_eq!(node.path.to_string(), "$.nodes[0]");
    assert!(lowered.issues.is_empty());
}

#[test]
fn bare_condition_binds_to_parameter() {
    let mut node = NodeDocument::tool("n1", "BET");
    node.when_parameter = Some("run_it".to_string());
    node.when_expression = Some("== true".to_string());

    let lowered = lower_graph(&GraphDocument::new(vec![node], Vec::new()));
    let when = lowered.graph.nodes[0].when.clone().expect("guard");

    assert_eq!(
        when,
        WhenClause::Bound {
            parameter: "run_it".to_string(),
            condition: "== true".to_string()
        }
    );
    assert_eq!(when.render(), "$(inputs.run_it == true)");
}

#[test]
fn wrapped_condition_is_kept_verbatim() {
    let mut node = NodeDocument::tool("n1", "BET");
    node.when_parameter = Some("ignored".to_string());
    node.when_expression = Some("$(inputs.frac > 0.3)".to_string());

    let lowered = lower_graph(&GraphDocument::new(vec![node], Vec::new()));
    assert_eq!(
        lowered.graph.nodes[0].when,
        Some(WhenClause::Raw("$(inputs.frac > 0.3)".to_string()))
    );
}

#[test]
fn unknown_operator_keeps_guard_verbatim_with_warning() {
    let mut node = NodeDocument::tool("n1", "BET");
    node.when_parameter = Some("mask".to_string());
    node.when_expression = Some(" true ".to_string());

    let lowered = lower_graph(&GraphDocument::new(vec![node], Vec::new()));

    assert_eq!(
        lowered.graph.nodes[0].when,
        Some(WhenClause::Raw("true".to_string()))
    );
    assert_eq!(lowered.issues.len(), 1);
    assert_eq!(lowered.issues[0].reference.as_deref(), Some("graph.when.operator"));
    assert_eq!(lowered.issues[0].node_id.as_deref(), Some("n1"));
    assert_eq!(lowered.issues[0].field_path.to_string(), "$.nodes[0].whenExpression");
}

#[test]
fn unbound_condition_is_kept_verbatim() {
    let mut node = NodeDocument::tool("n1", "BET");
    node.when_expression = Some("inputs.mask".to_string());

    let lowered = lower_graph(&GraphDocument::new(vec![node], Vec::new()));

    assert_eq!(
        lowered.graph.nodes[0].when,
        Some(WhenClause::Raw("inputs.mask".to_string()))
    );
    assert!(lowered.issues.is_empty());
}

#[test]
fn boundary_ports_are_namespaced_only_on_sub_pipeline_sides() {
    let sub = NodeDocument::new("sp", NodeKind::SubPipeline, "Preproc");
    let tool = NodeDocument::tool("t", "FLIRT");
    let edge = EdgeDocument::new("e1", "sp", "t", &[("bet/out_file", "in_file")]);

    let lowered = lower_graph(&GraphDocument::new(vec![sub, tool], vec![edge]));
    let mapping = &lowered.graph.edges[0].mappings[0];

    assert_eq!(
        mapping.source_output,
        PortRef::Namespaced {
            node: "bet".to_string(),
            port: "out_file".to_string()
        }
    );
    assert_eq!(mapping.target_input, PortRef::plain("in_file"));
    assert!(lowered.issues.is_empty());
}

#[test]
fn malformed_boundary_port_passes_through_with_warning() {
    let sub = NodeDocument::new("sp", NodeKind::SubPipeline, "Preproc");
    let tool = NodeDocument::tool("t", "FLIRT");
    let edge = EdgeDocument::new("e1", "t", "sp", &[("out_file", "in_file")]);

    let lowered = lower_graph(&GraphDocument::new(vec![sub, tool], vec![edge]));

    assert_eq!(lowered.graph.edges[0].mappings[0].target_input, PortRef::plain("in_file"));
    assert_eq!(lowered.issues[0].reference.as_deref(), Some("graph.boundary.malformed"));
    assert_eq!(
        lowered.issues[0].field_path.to_string(),
        "$.edges[0].mappings[0].targetInput"
    );
}

#[test]
fn sub_pipeline_internals_are_lowered_with_nested_paths() {
    let mut sub = NodeDocument::new("sp", NodeKind::SubPipeline, "Preproc");
    sub.internal_nodes = vec![NodeDocument::tool("bet", "BET"), NodeDocument::tool("flirt", "FLIRT")];
    sub.internal_edges = vec![EdgeDocument::new("ie", "bet", "flirt", &[("out_file", "in_file")])];

    let lowered = lower_graph(&GraphDocument::new(vec![sub], Vec::new()));
    let inner = lowered.graph.nodes[0].sub_pipeline.as_ref().expect("sub-pipeline");

    assert_eq!(inner.nodes.len(), 2);
    assert_eq!(inner.nodes[1].path.to_string(), "$.nodes[0].internalNodes[1]");
    assert_eq!(inner.edges[0].path.to_string(), "$.nodes[0].internalEdges[0]");
}
