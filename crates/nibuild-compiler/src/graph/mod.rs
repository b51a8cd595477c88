mod expand;
mod lower;
mod model;
mod order;

pub use expand::{expand_sub_pipelines, ExpandedGraph};
pub use lower::{lower_graph, wrap_expression, LoweredGraph};
pub use model::{Edge, Graph, Mapping, Node, PortRef, SubPipeline, WhenClause, VALID_OPERATORS};
pub use order::topological_order;
