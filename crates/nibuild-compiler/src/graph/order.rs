use std::collections::{BTreeMap, VecDeque};

/// Kahn's algorithm seeded in declaration order, successors in edge order.
///
/// Returns the nodes left unordered when the edges contain a cycle.
pub fn topological_order(node_ids: &[&str], edges: &[(&str, &str)]) -> Result<Vec<String>, Vec<String>> {
    let mut in_degree: BTreeMap<&str, usize> = node_ids.iter().map(|id| (*id, 0)).collect();
    let mut successors: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for &(source, target) in edges {
        if !in_degree.contains_key(source) || !in_degree.contains_key(target) {
            continue;
        }
        successors.entry(source).or_default().push(target);
        if let Some(degree) = in_degree.get_mut(target) {
            *degree += 1;
        }
    }

    let mut queue: VecDeque<&str> = node_ids
        .iter()
        .copied()
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();
    let mut order = Vec::with_capacity(node_ids.len());

    while let Some(node_id) = queue.pop_front() {
        order.push(node_id.to_string());
        for successor in successors.get(node_id).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(successor) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(*successor);
                }
            }
        }
    }

    if order.len() == node_ids.len() {
        Ok(order)
    } else {
        Err(node_ids
            .iter()
            .filter(|id| in_degree.get(*id).is_some_and(|degree| *degree > 0))
            .map(|id| id.to_string())
            .collect())
    }
}

#[cfg(test)]
#[path = "order_test.rs"]
mod tests;
