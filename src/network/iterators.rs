// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Iterators over the nodes of a [`NetworkGraph`].

use petgraph::graph::NodeIndex;

use crate::equipment::{ConductingEquipment, NetworkNode, Terminal};

use super::NetworkGraph;

/// An iterator over all conducting equipment in a network.
pub struct Equipment<'a> {
    graph: &'a NetworkGraph,
    indices: std::ops::Range<usize>,
}

impl<'a> Iterator for Equipment<'a> {
    type Item = (NodeIndex, &'a ConductingEquipment);

    fn next(&mut self) -> Option<Self::Item> {
        for index in self.indices.by_ref() {
            let index = NodeIndex::new(index);
            if let Some(NetworkNode::Equipment(equipment)) = self.graph.graph.node_weight(index) {
                return Some((index, equipment));
            }
        }
        None
    }
}

/// An iterator over all terminals in a network.
pub struct Terminals<'a> {
    graph: &'a NetworkGraph,
    indices: std::ops::Range<usize>,
}

impl<'a> Iterator for Terminals<'a> {
    type Item = (NodeIndex, &'a Terminal);

    fn next(&mut self) -> Option<Self::Item> {
        for index in self.indices.by_ref() {
            let index = NodeIndex::new(index);
            if let Some(NetworkNode::Terminal(terminal)) = self.graph.graph.node_weight(index) {
                return Some((index, terminal));
            }
        }
        None
    }
}

impl NetworkGraph {
    /// Iterates over all conducting equipment in the network.
    pub fn all_equipment(&self) -> Equipment<'_> {
        Equipment {
            graph: self,
            indices: 0..self.graph.node_count(),
        }
    }

    /// Iterates over all terminals in the network.
    pub fn all_terminals(&self) -> Terminals<'_> {
        Terminals {
            graph: self,
            indices: 0..self.graph.node_count(),
        }
    }

    /// The terminals joined to the given terminal at its connectivity node,
    /// excluding the terminal itself.
    ///
    /// Returns an empty vector when the terminal is unconnected.
    pub fn connected_terminals(&self, terminal: NodeIndex) -> Vec<NodeIndex> {
        let Some(node) = self.connectivity_node_of(terminal) else {
            return Vec::new();
        };
        self.graph
            .neighbors(node)
            .filter(|&other| other != terminal)
            .collect()
    }

    /// The terminals of the given terminal's equipment other than the
    /// terminal itself, in sequence order.
    pub fn other_terminals(&self, terminal: NodeIndex) -> Vec<NodeIndex> {
        let Ok(terminal_node) = self.terminal(terminal) else {
            return Vec::new();
        };
        let Ok(equipment) = self.equipment(terminal_node.equipment) else {
            return Vec::new();
        };
        equipment
            .terminals
            .iter()
            .copied()
            .filter(|&other| other != terminal)
            .collect()
    }
}
