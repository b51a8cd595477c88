mod load_tools;

pub use load_tools::{load_tool_registry, LoadedTools};
