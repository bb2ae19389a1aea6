// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for retrieving nodes and containers from a [`NetworkGraph`].

use petgraph::graph::NodeIndex;

use crate::containers::{
    AuxEquipmentId, AuxiliaryEquipment, EquipmentRef, Feeder, FeederId, LvFeeder, LvFeederId,
    Memberships, PowerElectronicsUnit, ProtectionRelayFunction, ProtectionRelayScheme,
    ProtectionRelaySystem, RelayFunctionId, RelaySchemeId, RelaySystemId, Site, SiteId, UnitId,
};
use crate::equipment::{ConductingEquipment, ConnectivityNode, NetworkNode, Terminal};
use crate::state::Dual;
use crate::Error;

use super::NetworkGraph;

/// `NetworkGraph` lookups.
impl NetworkGraph {
    /// The conducting equipment at the given index.
    ///
    /// Returns an error if the index is unknown or does not refer to
    /// equipment.
    pub fn equipment(&self, index: NodeIndex) -> Result<&ConductingEquipment, Error> {
        match self.graph.node_weight(index) {
            Some(NetworkNode::Equipment(equipment)) => Ok(equipment),
            Some(node) => Err(Error::invalid_reference(format!(
                "Node {} is not conducting equipment.",
                node_mrid(node)
            ))),
            None => Err(Error::equipment_not_found(format!(
                "Equipment not found at index: {}",
                index.index()
            ))),
        }
    }

    pub(crate) fn equipment_mut(
        &mut self,
        index: NodeIndex,
    ) -> Result<&mut ConductingEquipment, Error> {
        match self.graph.node_weight_mut(index) {
            Some(NetworkNode::Equipment(equipment)) => Ok(equipment),
            Some(node) => Err(Error::invalid_reference(format!(
                "Node {} is not conducting equipment.",
                node_mrid(node)
            ))),
            None => Err(Error::equipment_not_found(format!(
                "Equipment not found at index: {}",
                index.index()
            ))),
        }
    }

    /// The terminal at the given index.
    ///
    /// Returns an error if the index is unknown or does not refer to a
    /// terminal.
    pub fn terminal(&self, index: NodeIndex) -> Result<&Terminal, Error> {
        match self.graph.node_weight(index) {
            Some(NetworkNode::Terminal(terminal)) => Ok(terminal),
            Some(node) => Err(Error::invalid_reference(format!(
                "Node {} is not a terminal.",
                node_mrid(node)
            ))),
            None => Err(Error::terminal_not_found(format!(
                "Terminal not found at index: {}",
                index.index()
            ))),
        }
    }

    pub(crate) fn terminal_mut(&mut self, index: NodeIndex) -> Result<&mut Terminal, Error> {
        match self.graph.node_weight_mut(index) {
            Some(NetworkNode::Terminal(terminal)) => Ok(terminal),
            Some(node) => Err(Error::invalid_reference(format!(
                "Node {} is not a terminal.",
                node_mrid(node)
            ))),
            None => Err(Error::terminal_not_found(format!(
                "Terminal not found at index: {}",
                index.index()
            ))),
        }
    }

    /// The connectivity node at the given index.
    ///
    /// Returns an error if the index is unknown or does not refer to a
    /// connectivity node.
    pub fn junction(&self, index: NodeIndex) -> Result<&ConnectivityNode, Error> {
        match self.graph.node_weight(index) {
            Some(NetworkNode::Junction(junction)) => Ok(junction),
            Some(node) => Err(Error::invalid_reference(format!(
                "Node {} is not a connectivity node.",
                node_mrid(node)
            ))),
            None => Err(Error::invalid_reference(format!(
                "Connectivity node not found at index: {}",
                index.index()
            ))),
        }
    }

    /// Finds conducting equipment by its mRID.
    pub fn equipment_by_mrid(&self, mrid: &str) -> Result<NodeIndex, Error> {
        match self.node_indices.get(mrid) {
            Some(&index) if self.equipment(index).is_ok() => Ok(index),
            _ => Err(Error::equipment_not_found(format!(
                "Equipment not found: {mrid}"
            ))),
        }
    }

    /// Finds a terminal by its mRID.
    pub fn terminal_by_mrid(&self, mrid: &str) -> Result<NodeIndex, Error> {
        match self.node_indices.get(mrid) {
            Some(&index) if self.terminal(index).is_ok() => Ok(index),
            _ => Err(Error::terminal_not_found(format!(
                "Terminal not found: {mrid}"
            ))),
        }
    }

    /// Finds a terminal by its equipment and 1-based sequence number.
    pub fn terminal_at(&self, equipment: NodeIndex, sequence_number: usize) -> Result<NodeIndex, Error> {
        let equipment = self.equipment(equipment)?;
        equipment
            .terminals
            .get(sequence_number.wrapping_sub(1))
            .copied()
            .ok_or_else(|| {
                Error::terminal_not_found(format!(
                    "Equipment {} has no terminal {sequence_number}.",
                    equipment.mrid
                ))
            })
    }

    /// The connectivity node the given terminal is connected to, if any.
    pub fn connectivity_node_of(&self, terminal: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors(terminal)
            .find(|&index| matches!(self.graph.node_weight(index), Some(NetworkNode::Junction(_))))
    }

    /// The equipment the given terminal belongs to, if the index refers to a
    /// terminal.
    pub fn terminal_equipment(&self, terminal: NodeIndex) -> Option<&ConductingEquipment> {
        let terminal = match self.graph.node_weight(terminal) {
            Some(NetworkNode::Terminal(terminal)) => terminal,
            _ => return None,
        };
        self.equipment(terminal.equipment).ok()
    }

    /// The container memberships of the referenced equipment.
    pub(crate) fn memberships_mut(
        &mut self,
        reference: EquipmentRef,
    ) -> Result<&mut Dual<Memberships>, Error> {
        match reference {
            EquipmentRef::Conducting(index) => Ok(&mut self.equipment_mut(index)?.memberships),
            EquipmentRef::Auxiliary(id) => self
                .aux_equipment
                .get_mut(id.0)
                .map(|aux| &mut aux.memberships)
                .ok_or_else(|| {
                    Error::invalid_reference(format!("Auxiliary equipment not found: {}", id.0))
                }),
            EquipmentRef::RelaySystem(id) => self
                .relay_systems
                .get_mut(id.0)
                .map(|system| &mut system.memberships)
                .ok_or_else(|| {
                    Error::invalid_reference(format!("Relay system not found: {}", id.0))
                }),
            EquipmentRef::Unit(id) => self
                .units
                .get_mut(id.0)
                .map(|unit| &mut unit.memberships)
                .ok_or_else(|| Error::invalid_reference(format!("Unit not found: {}", id.0))),
        }
    }

    /// The feeder with the given id.
    pub fn feeder(&self, id: FeederId) -> &Feeder {
        &self.feeders[id.0]
    }

    pub(crate) fn feeder_mut(&mut self, id: FeederId) -> &mut Feeder {
        &mut self.feeders[id.0]
    }

    /// The LV feeder with the given id.
    pub fn lv_feeder(&self, id: LvFeederId) -> &LvFeeder {
        &self.lv_feeders[id.0]
    }

    pub(crate) fn lv_feeder_mut(&mut self, id: LvFeederId) -> &mut LvFeeder {
        &mut self.lv_feeders[id.0]
    }

    /// The site with the given id.
    pub fn site(&self, id: SiteId) -> &Site {
        &self.sites[id.0]
    }

    /// The auxiliary equipment with the given id.
    pub fn auxiliary_equipment(&self, id: AuxEquipmentId) -> &AuxiliaryEquipment {
        &self.aux_equipment[id.0]
    }

    /// The relay function with the given id.
    pub fn relay_function(&self, id: RelayFunctionId) -> &ProtectionRelayFunction {
        &self.relay_functions[id.0]
    }

    /// The relay scheme with the given id.
    pub fn relay_scheme(&self, id: RelaySchemeId) -> &ProtectionRelayScheme {
        &self.relay_schemes[id.0]
    }

    /// The relay system with the given id.
    pub fn relay_system(&self, id: RelaySystemId) -> &ProtectionRelaySystem {
        &self.relay_systems[id.0]
    }

    /// The power electronics unit with the given id.
    pub fn unit(&self, id: UnitId) -> &PowerElectronicsUnit {
        &self.units[id.0]
    }

    /// The ids of all feeders in the network.
    pub fn feeder_ids(&self) -> impl Iterator<Item = FeederId> {
        (0..self.feeders.len()).map(FeederId)
    }

    /// The ids of all LV feeders in the network.
    pub fn lv_feeder_ids(&self) -> impl Iterator<Item = LvFeederId> {
        (0..self.lv_feeders.len()).map(LvFeederId)
    }

    /// The ids of all auxiliary equipment in the network.
    pub fn auxiliary_equipment_ids(&self) -> impl Iterator<Item = AuxEquipmentId> {
        (0..self.aux_equipment.len()).map(AuxEquipmentId)
    }

    /// Whether the given terminal is the head terminal of a feeder.
    pub fn is_feeder_head_terminal(&self, terminal: NodeIndex) -> bool {
        self.feeders
            .iter()
            .any(|feeder| feeder.head_terminal == Some(terminal))
    }

    /// Whether the given terminal is the head terminal of an LV feeder.
    pub fn is_lv_feeder_head_terminal(&self, terminal: NodeIndex) -> bool {
        self.lv_feeders
            .iter()
            .any(|feeder| feeder.head_terminal == Some(terminal))
    }
}

fn node_mrid(node: &NetworkNode) -> &str {
    match node {
        NetworkNode::Equipment(equipment) => &equipment.mrid,
        NetworkNode::Terminal(terminal) => &terminal.mrid,
        NetworkNode::Junction(junction) => &junction.mrid,
    }
}
