// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Topology import
//!
//! A network can be built from anything that can list its nodes and directed
//! edges together with per-node and per-edge field overrides.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::fields::FieldTable;
use crate::ids::NeuronId;

/// Directed graph with field overrides on nodes and edges
pub trait GraphSource {
    /// `(id, overrides)` for every node
    fn nodes(&self) -> Box<dyn Iterator<Item = (NeuronId, &FieldTable)> + '_>;

    /// `(source, destination, overrides)` for every edge
    fn edges(&self) -> Box<dyn Iterator<Item = (NeuronId, NeuronId, &FieldTable)> + '_>;
}

/// Owned directed multigraph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    nodes: BTreeMap<NeuronId, FieldTable>,
    edges: Vec<(NeuronId, NeuronId, FieldTable)>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, replacing the attributes of an existing one
    pub fn add_node(&mut self, id: NeuronId, attributes: FieldTable) {
        self.nodes.insert(id, attributes);
    }

    /// Add an edge; missing endpoints are added as nodes without attributes
    pub fn add_edge(&mut self, source: NeuronId, dest: NeuronId, attributes: FieldTable) {
        self.nodes.entry(source).or_default();
        self.nodes.entry(dest).or_default();
        self.edges.push((source, dest, attributes));
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: NeuronId) -> Option<&FieldTable> {
        self.nodes.get(&id)
    }
}

impl GraphSource for Graph {
    fn nodes(&self) -> Box<dyn Iterator<Item = (NeuronId, &FieldTable)> + '_> {
        Box::new(self.nodes.iter().map(|(id, fields)| (*id, fields)))
    }

    fn edges(&self) -> Box<dyn Iterator<Item = (NeuronId, NeuronId, &FieldTable)> + '_> {
        Box::new(self.edges.iter().map(|(s, d, fields)| (*s, *d, fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_adds_missing_endpoints() {
        let mut graph = Graph::new();
        graph.add_node(NeuronId(1), FieldTable::from([("a", 0.1)]));
        graph.add_edge(NeuronId(1), NeuronId(5), FieldTable::new());

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        // existing attributes survive
        assert_eq!(graph.node(NeuronId(1)).and_then(|f| f.get("a")), Some(0.1));
        assert!(graph.node(NeuronId(5)).is_some_and(FieldTable::is_empty));
    }

    #[test]
    fn test_iteration_order() {
        let mut graph = Graph::new();
        graph.add_edge(NeuronId(3), NeuronId(1), FieldTable::new());
        graph.add_edge(NeuronId(1), NeuronId(2), FieldTable::from([("w", 2.0)]));

        let nodes: Vec<NeuronId> = graph.nodes().map(|(id, _)| id).collect();
        assert_eq!(nodes, vec![NeuronId(1), NeuronId(2), NeuronId(3)]);

        let edges: Vec<(NeuronId, NeuronId)> = graph.edges().map(|(s, d, _)| (s, d)).collect();
        assert_eq!(edges, vec![(NeuronId(3), NeuronId(1)), (NeuronId(1), NeuronId(2))]);
    }
}
