use crate::documents::{ToolDefinition, ToolInput, ToolOutput};
use crate::registry::ToolRegistry;
use nibuild_core::OrderedMap;
use serde_json::json;

fn tool(
    id: &str,
    cwl_path: &str,
    docker_image: Option<&str>,
    required: &[(&str, ToolInput)],
    optional: &[(&str, ToolInput)],
    outputs: &[(&str, &str)],
) -> ToolDefinition {
    ToolDefinition {
        id: Some(id.to_string()),
        cwl_path: cwl_path.to_string(),
        docker_image: docker_image.map(str::to_string),
        required_inputs: required
            .iter()
            .map(|(name, input)| (name.to_string(), input.clone()))
            .collect(),
        optional_inputs: optional
            .iter()
            .map(|(name, input)| (name.to_string(), input.clone()))
            .collect(),
        outputs: outputs
            .iter()
            .map(|(name, type_decl)| (name.to_string(), ToolOutput::of_type(type_decl)))
            .collect::<OrderedMap<_>>(),
    }
}

/// Small neuroimaging registry shared by the compiler tests.
pub(crate) fn registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(
        "BET",
        tool(
            "bet",
            "cwl/fsl/bet.cwl",
            Some("brainlife/fsl"),
            &[("in_file", ToolInput::of_type("File"))],
            &[
                (
                    "frac",
                    ToolInput {
                        bounds: Some(vec![json!(0), json!(1)]),
                        has_default: true,
                        default_value: Some(json!(0.5)),
                        ..ToolInput::of_type("double")
                    },
                ),
                ("mask", ToolInput::of_type("boolean")),
                ("out_prefix", ToolInput::of_type("string")),
            ],
            &[("out_file", "File"), ("mask_file", "File?")],
        ),
    );
    registry.register(
        "FLIRT",
        tool(
            "flirt",
            "cwl/fsl/flirt.cwl",
            Some("brainlife/fsl"),
            &[
                ("in_file", ToolInput::of_type("File")),
                ("reference", ToolInput::of_type("File")),
            ],
            &[(
                "dof",
                ToolInput {
                    bounds: Some(vec![json!(6), json!(12)]),
                    ..ToolInput::of_type("int")
                },
            )],
            &[("out_file", "File"), ("out_matrix_file", "File")],
        ),
    );
    registry.register(
        "Smooth",
        tool(
            "smooth",
            "cwl/fsl/smooth.cwl",
            None,
            &[
                ("in_file", ToolInput::of_type("File")),
                ("fwhm", ToolInput::of_type("double")),
            ],
            &[],
            &[("smoothed_file", "File")],
        ),
    );
    registry.register(
        "Merge",
        tool(
            "merge",
            "cwl/fsl/merge.cwl",
            Some("brainlife/fsl"),
            &[
                ("in_files", ToolInput::of_type("File[]")),
                ("dimension", ToolInput::of_type("string")),
            ],
            &[],
            &[("merged_file", "File")],
        ),
    );
    registry.register(
        "Atlas Stats",
        tool(
            "atlas_stats",
            "cwl/atlas/stats.cwl",
            None,
            &[("in_file", ToolInput::of_type("File"))],
            &[
                ("roi", ToolInput::of_type("record")),
                (
                    "method",
                    ToolInput {
                        options: vec!["mean".to_string(), "median".to_string()],
                        ..ToolInput::of_type("string")
                    },
                ),
            ],
            &[("stats", "File")],
        ),
    );
    registry
}
