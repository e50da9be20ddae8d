use crate::error::{GraphError, Result};
use crate::types::*;
use hashbrown::HashMap;
use std::collections::VecDeque;

/// Kahn ordering of the nodes. Ties are broken by declaration order so the result is stable.
pub fn topo_order(nodes: &[NodeSpec]) -> Result<Vec<NodeId>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for (i, n) in nodes.iter().enumerate() {
        if index.insert(n.id.as_str(), i).is_some() {
            return Err(GraphError::DuplicateNode { id: n.id.clone() });
        }
    }

    let mut indeg = vec![0usize; nodes.len()];
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (i, n) in nodes.iter().enumerate() {
        for conn in n.inputs.values() {
            let src = *index
                .get(conn.node_id.as_str())
                .ok_or_else(|| GraphError::UnknownInput {
                    node: n.id.clone(),
                    source_node: conn.node_id.clone(),
                })?;
            adj[src].push(i);
            indeg[i] += 1;
        }
    }

    let mut q: VecDeque<usize> = (0..nodes.len()).filter(|&i| indeg[i] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());
    while let Some(u) = q.pop_front() {
        order.push(nodes[u].id.clone());
        for &v in &adj[u] {
            indeg[v] -= 1;
            if indeg[v] == 0 {
                q.push_back(v);
            }
        }
    }

    if order.len() != nodes.len() {
        return Err(GraphError::Cycle);
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_topo() {
        let g = GraphSpec {
            nodes: vec![
                NodeSpec::new("b", NodeType::Sin).with_input("in", InputConnection::new("a")),
                NodeSpec::new("a", NodeType::Constant),
            ],
        };
        let order = topo_order(&g.nodes).unwrap();
        assert_eq!(order, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn cycle_is_rejected() {
        let nodes = vec![
            NodeSpec::new("a", NodeType::Sin).with_input("in", InputConnection::new("b")),
            NodeSpec::new("b", NodeType::Cos).with_input("in", InputConnection::new("a")),
        ];
        assert_eq!(topo_order(&nodes), Err(GraphError::Cycle));
    }

    #[test]
    fn dangling_input_is_reported() {
        let nodes = vec![NodeSpec::new("a", NodeType::Sin).with_input("in", InputConnection::new("ghost"))];
        assert!(matches!(
            topo_order(&nodes),
            Err(GraphError::UnknownInput { .. })
        ));
    }
}
