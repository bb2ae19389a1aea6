// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A graph representation of an electrical distribution network: conducting
//! equipment connected through terminals and connectivity nodes, plus the
//! containers that group the equipment.

mod creation;
mod retrieval;
mod validation;

pub mod iterators;

#[cfg(test)]
pub(crate) mod test_utils;

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};

use crate::containers::{
    AuxiliaryEquipment, Feeder, LvFeeder, PowerElectronicsUnit, ProtectionRelayFunction,
    ProtectionRelayScheme, ProtectionRelaySystem, Site,
};
use crate::equipment::NetworkNode;

/// `NetworkNode`s stored in an `UnGraph` instance can be addressed with
/// `NodeIndex`es.
///
/// `NodeIndexMap` stores the corresponding `NodeIndex` for any mRID, so that
/// nodes in the `UnGraph` can be retrieved from their mRIDs.
pub(crate) type NodeIndexMap = HashMap<String, NodeIndex>;

/// A graph representation of the conducting equipment of a distribution
/// network and the connectivity between them.
///
/// Graph edges exist only between terminals and connectivity nodes; the
/// equipment to terminal relation is an ordered list on the equipment, so a
/// terminal stores only a lightweight index back to its owner and its
/// junction.
pub struct NetworkGraph {
    pub(crate) graph: UnGraph<NetworkNode, ()>,
    pub(crate) node_indices: NodeIndexMap,
    pub(crate) feeders: Vec<Feeder>,
    pub(crate) lv_feeders: Vec<LvFeeder>,
    pub(crate) sites: Vec<Site>,
    pub(crate) aux_equipment: Vec<AuxiliaryEquipment>,
    pub(crate) relay_functions: Vec<ProtectionRelayFunction>,
    pub(crate) relay_schemes: Vec<ProtectionRelayScheme>,
    pub(crate) relay_systems: Vec<ProtectionRelaySystem>,
    pub(crate) units: Vec<PowerElectronicsUnit>,
    container_mrids: std::collections::HashSet<String>,
    auto_node_count: usize,
}

impl NetworkGraph {
    /// Creates a new, empty network graph.
    pub fn new() -> Self {
        NetworkGraph {
            graph: UnGraph::default(),
            node_indices: NodeIndexMap::new(),
            feeders: Vec::new(),
            lv_feeders: Vec::new(),
            sites: Vec::new(),
            aux_equipment: Vec::new(),
            relay_functions: Vec::new(),
            relay_schemes: Vec::new(),
            relay_systems: Vec::new(),
            units: Vec::new(),
            container_mrids: std::collections::HashSet::new(),
            auto_node_count: 0,
        }
    }

    pub(crate) fn next_auto_node_mrid(&mut self) -> String {
        self.auto_node_count += 1;
        format!("generated-cn-{}", self.auto_node_count)
    }

    pub(crate) fn reserve_container_mrid(&mut self, mrid: &str) -> bool {
        !self.node_indices.contains_key(mrid) && self.container_mrids.insert(mrid.to_string())
    }
}

impl Default for NetworkGraph {
    fn default() -> Self {
        NetworkGraph::new()
    }
}
