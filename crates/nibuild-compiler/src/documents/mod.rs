mod graph;
mod tools;

pub use graph::{EdgeDocument, GraphDocument, LinkMerge, MappingDocument, NodeDocument, NodeKind};
pub use tools::{ToolDefinition, ToolInput, ToolOutput, ToolRegistryDocument};
