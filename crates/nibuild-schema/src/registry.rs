use crate::embedded::EmbeddedSchema;
use crate::versions::{SCHEMA_GRAPH_0_1_0, SCHEMA_TOOLS_0_1_0};

const GRAPH_SCHEMA: &str = include_str!("../schemas/graph.schema.json");
const TOOLS_SCHEMA: &str = include_str!("../schemas/tools.schema.json");

pub fn get_json_schema(schema_id: &str) -> Option<EmbeddedSchema> {
    match schema_id {
        SCHEMA_GRAPH_0_1_0 => Some(EmbeddedSchema {
            id: SCHEMA_GRAPH_0_1_0,
            json: GRAPH_SCHEMA,
        }),
        SCHEMA_TOOLS_0_1_0 => Some(EmbeddedSchema {
            id: SCHEMA_TOOLS_0_1_0,
            json: TOOLS_SCHEMA,
        }),
        _ => None,
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
