pub const SCHEMA_GRAPH_0_1_0: &str = "nibuild-graph/0.1.0";
pub const SCHEMA_TOOLS_0_1_0: &str = "nibuild-tools/0.1.0";
