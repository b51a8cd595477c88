use super::{compile_graph, CompileError};
use crate::compiler::ir::{InputSource, PickValue, Requirement, ScatterDirective};
use crate::compiler::options::CompileOptions;
use crate::compiler::render::{render_workflow_value, workflow_fingerprint};
use crate::documents::{EdgeDocument, GraphDocument, NodeDocument, NodeKind, ToolDefinition, ToolInput, ToolOutput};
use crate::registry::ToolRegistry;
use crate::test_fixtures::registry;
use nibuild_core::{CwlType, OrderedMap};
use serde_json::json;

fn compile(nodes: Vec<NodeDocument>, edges: Vec<EdgeDocument>) -> super::CompileOutput {
    compile_graph(
        &GraphDocument::new(nodes, edges),
        &registry(),
        &CompileOptions::default(),
    )
    .expect("acyclic graph compiles")
}

fn scattered(id: &str, label: &str) -> NodeDocument {
    let mut node = NodeDocument::tool(id, label);
    node.scatter_enabled = true;
    node
}

#[test]
fn single_node_exposes_its_ports() {
    let mut tools = ToolRegistry::new();
    let mut required_inputs = OrderedMap::new();
    required_inputs.insert("in", ToolInput::of_type("File"));
    let mut outputs = OrderedMap::new();
    outputs.insert("out", ToolOutput::of_type("File"));
    tools.register(
        "X",
        ToolDefinition {
            id: Some("x".to_string()),
            cwl_path: "cwl/x.cwl".to_string(),
            docker_image: None,
            required_inputs,
            optional_inputs: OrderedMap::new(),
            outputs,
        },
    );

    let output = compile_graph(
        &GraphDocument::new(vec![NodeDocument::tool("n1", "X")], Vec::new()),
        &tools,
        &CompileOptions::default(),
    )
    .expect("compiles");
    let workflow = &output.workflow;

    assert_eq!(workflow.inputs.len(), 1);
    assert_eq!(workflow.inputs[0].name, "in");
    assert_eq!(workflow.inputs[0].cwl_type, CwlType::File);
    assert_eq!(workflow.outputs.len(), 1);
    assert_eq!(workflow.outputs[0].name, "out");
    assert_eq!(workflow.outputs[0].output_source, "x/out");
    assert!(workflow.requirements.is_empty());
    assert!(output.issues.is_empty());
}

#[test]
fn repeated_tool_steps_are_numbered() {
    let output = compile(
        vec![NodeDocument::tool("a", "Smooth"), NodeDocument::tool("b", "Smooth")],
        vec![EdgeDocument::new("e1", "a", "b", &[])],
    );
    let ids: Vec<&str> = output.workflow.steps.iter().map(|step| step.id.as_str()).collect();
    assert_eq!(ids, vec!["smooth_1", "smooth_2"]);
    assert_eq!(output.workflow.steps[1].node_id, "b");
}

#[test]
fn scatter_reaches_downstream_wired_input() {
    let output = compile(
        vec![scattered("a", "BET"), NodeDocument::tool("b", "Smooth")],
        vec![EdgeDocument::new("e1", "a", "b", &[("out_file", "in_file")])],
    );
    let workflow = &output.workflow;

    let smooth = workflow.step("smooth").expect("smooth step");
    assert_eq!(smooth.scatter, Some(ScatterDirective::Single("in_file".to_string())));
    assert_eq!(
        smooth.input("in_file").map(|input| &input.binding.source),
        Some(&InputSource::Single("bet/out_file".to_string()))
    );
    assert_eq!(
        workflow.input("bet_in_file").map(|input| &input.cwl_type),
        Some(&CwlType::File.array_of())
    );
    assert_eq!(
        workflow.output("smoothed_file").map(|output| &output.cwl_type),
        Some(&CwlType::File.array_of())
    );
    assert_eq!(workflow.requirements, vec![Requirement::ScatterFeature]);
}

#[test]
fn bound_condition_guards_step() {
    let mut node = NodeDocument::tool("n1", "BET");
    node.when_parameter = Some("mask".to_string());
    node.when_expression = Some("== true".to_string());
    let output = compile(vec![node], Vec::new());
    let workflow = &output.workflow;

    assert_eq!(workflow.steps[0].when.as_deref(), Some("$(inputs.mask == true)"));
    assert_eq!(workflow.requirements, vec![Requirement::InlineJavascript]);
    let out_file = workflow.output("out_file").expect("out_file");
    assert_eq!(out_file.cwl_type, CwlType::File.nullable());
    assert_eq!(out_file.pick_value, Some(PickValue::FirstNonNull));
}

#[test]
fn colliding_step_ids_are_renamed_with_warning() {
    let output = compile(
        vec![
            NodeDocument::tool("a", "Smooth"),
            NodeDocument::tool("b", "Smooth"),
            NodeDocument::tool("c", "Smooth 1"),
        ],
        Vec::new(),
    );
    let ids: Vec<&str> = output.workflow.steps.iter().map(|step| step.id.as_str()).collect();
    assert_eq!(ids, vec!["smooth_1", "smooth_2", "smooth_1_2"]);

    let rendered = render_workflow_value(&output.workflow);
    assert_eq!(rendered["steps"].as_object().map(|steps| steps.len()), Some(3));

    let collision = output
        .issues
        .iter()
        .find(|issue| issue.reference.as_deref() == Some("step.id.collision"))
        .expect("collision reported");
    assert_eq!(collision.node_id.as_deref(), Some("c"));
    assert_eq!(collision.field_path.to_string(), "$.nodes[2]");
}

#[test]
fn raw_guard_is_attached_verbatim() {
    let mut node = NodeDocument::tool("n1", "BET");
    node.when_parameter = Some("mask".to_string());
    node.when_expression = Some("true".to_string());
    let output = compile(vec![node], Vec::new());
    let workflow = &output.workflow;

    assert_eq!(workflow.steps[0].when.as_deref(), Some("true"));
    let out_file = workflow.output("out_file").expect("out_file");
    assert_eq!(out_file.cwl_type, CwlType::File.nullable());
    assert_eq!(out_file.pick_value, Some(PickValue::FirstNonNull));
}

#[test]
fn scattered_conditional_output_defaults_to_nullable_first_non_null() {
    let mut node = scattered("n1", "BET");
    node.when_parameter = Some("mask".to_string());
    node.when_expression = Some("== true".to_string());
    let output = compile(vec![node], Vec::new());

    let out_file = output.workflow.output("out_file").expect("out_file");
    assert_eq!(out_file.cwl_type, CwlType::File.array_of().nullable());
    assert_eq!(out_file.pick_value, Some(PickValue::FirstNonNull));
}

#[test]
fn cycles_are_fatal() {
    let error = compile_graph(
        &GraphDocument::new(
            vec![NodeDocument::tool("a", "BET"), NodeDocument::tool("b", "Smooth")],
            vec![
                EdgeDocument::new("e1", "a", "b", &[("out_file", "in_file")]),
                EdgeDocument::new("e2", "b", "a", &[("smoothed_file", "in_file")]),
            ],
        ),
        &registry(),
        &CompileOptions::default(),
    )
    .expect_err("cycle");
    assert_eq!(
        error,
        CompileError::CyclicGraph {
            nodes: vec!["a".to_string(), "b".to_string()]
        }
    );
    assert!(error.to_string().contains("cycles"));
}

#[test]
fn compilation_is_deterministic() {
    let build = || {
        let mut merge = NodeDocument::tool("m", "Merge");
        merge.gather_enabled = true;
        compile(
            vec![scattered("a", "BET"), NodeDocument::tool("b", "Smooth"), merge],
            vec![
                EdgeDocument::new("e1", "a", "b", &[("out_file", "in_file")]),
                EdgeDocument::new("e2", "b", "m", &[("smoothed_file", "in_files")]),
                EdgeDocument::new("e3", "a", "m", &[("mask_file", "in_files")]),
            ],
        )
    };
    let first = build();
    let second = build();

    assert_eq!(first, second);
    assert_eq!(
        workflow_fingerprint(&first.workflow).expect("hash"),
        workflow_fingerprint(&second.workflow).expect("hash")
    );
}

#[test]
fn gather_collects_scattered_branches_with_merge() {
    let mut merge = NodeDocument::tool("m", "Merge");
    merge.gather_enabled = true;
    let output = compile(
        vec![scattered("a", "BET"), NodeDocument::tool("b", "Smooth"), merge],
        vec![
            EdgeDocument::new("e1", "a", "b", &[("out_file", "in_file")]),
            EdgeDocument::new("e2", "b", "m", &[("smoothed_file", "in_files")]),
            EdgeDocument::new("e3", "a", "m", &[("mask_file", "in_files")]),
        ],
    );
    let workflow = &output.workflow;
    let merge = workflow.step("merge").expect("merge step");

    assert!(merge.scatter.is_none());
    assert_eq!(
        merge.input("in_files").map(|input| &input.binding.source),
        Some(&InputSource::Merged {
            sources: vec!["smooth/smoothed_file".to_string(), "bet/mask_file".to_string()],
            link_merge: crate::documents::LinkMerge::Flattened,
        })
    );
    assert_eq!(workflow.output("merged_file").map(|output| &output.cwl_type), Some(&CwlType::File));
    assert_eq!(
        workflow.requirements,
        vec![Requirement::ScatterFeature, Requirement::MultipleInputFeature]
    );
}

#[test]
fn pass_through_nodes_are_not_compiled() {
    let output = compile(
        vec![
            NodeDocument::new("in", NodeKind::PassThrough, "Input"),
            NodeDocument::tool("n1", "Smooth"),
            NodeDocument::new("out", NodeKind::PassThrough, "Output"),
        ],
        vec![
            EdgeDocument::new("e1", "in", "n1", &[("file", "in_file")]),
            EdgeDocument::new("e2", "n1", "out", &[("smoothed_file", "file")]),
        ],
    );
    assert_eq!(output.workflow.steps.len(), 1);
    assert_eq!(output.workflow.inputs[0].name, "in_file");
    assert_eq!(output.workflow.outputs[0].name, "smoothed_file");
}

#[test]
fn dataset_selections_become_file_array_inputs_with_job_values() {
    let mut dataset = NodeDocument::new("ds", NodeKind::DatasetSource, "BIDS");
    dataset.dataset_selections.insert(
        "T1w",
        vec!["sub-01/anat/sub-01_T1w.nii.gz".to_string(), "sub-02/anat/sub-02_T1w.nii.gz".to_string()],
    );
    let output = compile(
        vec![dataset, NodeDocument::tool("bet", "BET")],
        vec![EdgeDocument::new("e1", "ds", "bet", &[("T1w", "in_file")])],
    );
    let workflow = &output.workflow;

    assert_eq!(workflow.inputs[0].name, "T1w");
    assert_eq!(workflow.inputs[0].cwl_type, CwlType::File.array_of());
    assert_eq!(workflow.steps.len(), 1);
    let bet = &workflow.steps[0];
    assert_eq!(bet.scatter, Some(ScatterDirective::Single("in_file".to_string())));
    assert_eq!(
        bet.input("in_file").map(|input| &input.binding.source),
        Some(&InputSource::Single("T1w".to_string()))
    );
    assert_eq!(
        output.job_template.get("T1w"),
        Some(&json!([
            { "class": "File", "path": "sub-01/anat/sub-01_T1w.nii.gz" },
            { "class": "File", "path": "sub-02/anat/sub-02_T1w.nii.gz" }
        ]))
    );
}

#[test]
fn sub_pipelines_are_inlined_before_compiling() {
    let mut sub = NodeDocument::new("sp", NodeKind::SubPipeline, "Preproc");
    sub.internal_nodes = vec![NodeDocument::tool("bet", "BET"), NodeDocument::tool("smooth", "Smooth")];
    sub.internal_edges = vec![EdgeDocument::new("ie", "bet", "smooth", &[("out_file", "in_file")])];
    let output = compile(
        vec![sub, NodeDocument::tool("m", "Merge")],
        vec![EdgeDocument::new("e1", "sp", "m", &[("smooth/smoothed_file", "in_files")])],
    );

    let ids: Vec<&str> = output.workflow.steps.iter().map(|step| step.id.as_str()).collect();
    assert_eq!(ids, vec!["bet", "smooth", "merge"]);
    assert_eq!(
        output.workflow.step("merge").and_then(|step| step.input("in_files")).map(|input| &input.binding.source),
        Some(&InputSource::Single("smooth/smoothed_file".to_string()))
    );
    assert!(output.issues.is_empty());
}

#[test]
fn unknown_tools_and_dangling_edges_are_reported() {
    let output = compile(
        vec![NodeDocument::tool("n1", "Mystery")],
        vec![EdgeDocument::new("e1", "n1", "ghost", &[("output", "input")])],
    );
    let references: Vec<&str> = output
        .issues
        .iter()
        .filter_map(|issue| issue.reference.as_deref())
        .collect();
    assert!(references.contains(&"tool.unknown"));
    assert!(references.contains(&"graph.edge.dangling"));
    assert_eq!(output.workflow.steps[0].run, "../cwl/generic/mystery.cwl");
}

#[test]
fn options_control_version_and_run_prefix() {
    let options = CompileOptions {
        cwl_version: "v1.3".to_string(),
        run_prefix: "tools/".to_string(),
        ..CompileOptions::default()
    };
    let output = compile_graph(
        &GraphDocument::new(vec![NodeDocument::tool("n1", "Smooth")], Vec::new()),
        &registry(),
        &options,
    )
    .expect("compiles");
    assert_eq!(output.workflow.cwl_version, "v1.3");
    assert_eq!(output.workflow.steps[0].run, "tools/cwl/fsl/smooth.cwl");
}

#[test]
fn job_template_marks_tool_defaults() {
    let output = compile(vec![NodeDocument::tool("n1", "BET")], Vec::new());
    assert_eq!(output.job_template.get("frac"), Some(&json!(0.5)));
    assert!(output.job_template.is_tool_default("frac"));
    assert_eq!(
        output.job_template.get("in_file"),
        Some(&json!({ "class": "File", "path": "a/file/path" }))
    );
}
