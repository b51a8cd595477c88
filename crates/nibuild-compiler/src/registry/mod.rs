mod tool_registry;

pub use tool_registry::{
    generic_tool, resolve_tool, sanitize_tool_id, ResolvedTool, ToolLookup, ToolRegistry,
};
