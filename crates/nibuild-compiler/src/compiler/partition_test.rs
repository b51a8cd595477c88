use super::partition;
use crate::documents::{EdgeDocument, GraphDocument, NodeDocument, NodeKind};
use crate::graph::lower_graph;

#[test]
fn pass_through_and_dataset_nodes_never_become_steps() {
    let graph = lower_graph(&GraphDocument::new(
        vec![
            NodeDocument::new("in", NodeKind::PassThrough, "Input"),
            NodeDocument::new("ds", NodeKind::DatasetSource, "BIDS"),
            NodeDocument::tool("bet", "BET"),
            NodeDocument::new("out", NodeKind::PassThrough, "Output"),
        ],
        vec![
            EdgeDocument::new("e1", "in", "bet", &[("x", "in_file")]),
            EdgeDocument::new("e2", "ds", "bet", &[("T1w", "in_file")]),
            EdgeDocument::new("e3", "bet", "out", &[("out_file", "x")]),
        ],
    ))
    .graph;

    let parts = partition(&graph);

    let steps: Vec<&str> = parts.steps.iter().map(|node| node.id.as_str()).collect();
    assert_eq!(steps, vec!["bet"]);
    assert_eq!(parts.datasets.len(), 1);
    assert!(parts.step_edges.is_empty());
    assert_eq!(parts.dataset_edges.len(), 1);
    assert_eq!(parts.dataset_edges[0].id, "e2");
    assert!(parts.issues.is_empty());
    assert!(parts.is_step("bet"));
    assert!(!parts.is_step("ds"));
}

#[test]
fn dangling_edges_are_dropped_with_warning() {
    let graph = lower_graph(&GraphDocument::new(
        vec![NodeDocument::tool("bet", "BET")],
        vec![EdgeDocument::new("e1", "bet", "ghost", &[("out_file", "in_file")])],
    ))
    .graph;

    let parts = partition(&graph);

    assert!(parts.step_edges.is_empty());
    assert_eq!(parts.issues.len(), 1);
    assert_eq!(parts.issues[0].reference.as_deref(), Some("graph.edge.dangling"));
    assert!(parts.issues[0].message.contains("ghost"));
}
