// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for building up a [`NetworkGraph`] from equipment, terminals,
//! connectivity nodes and containers.

use petgraph::graph::NodeIndex;

use crate::containers::{
    AuxEquipmentId, AuxiliaryEquipment, Feeder, FeederId, LvFeeder, LvFeederId,
    PowerElectronicsUnit, ProtectionRelayFunction, ProtectionRelayScheme, ProtectionRelaySystem,
    RelayFunctionId, RelaySchemeId, RelaySystemId, Site, SiteId, UnitId,
};
use crate::equipment::{ConductingEquipment, ConnectivityNode, NetworkNode, Terminal};
use crate::state::Dual;
use crate::{EquipmentKind, Error, PhaseCode};

use super::NetworkGraph;

/// `NetworkGraph` population.
///
/// Networks are built incrementally: distribution networks are cyclic and
/// multi-sourced, so there is no whole-graph shape to validate up front.
/// Each method validates the structural invariants it can break.
impl NetworkGraph {
    /// Adds a piece of conducting equipment and returns its index.
    ///
    /// Returns an error if the mRID is already in use.
    pub fn add_equipment(&mut self, mrid: &str, kind: EquipmentKind) -> Result<NodeIndex, Error> {
        if self.node_indices.contains_key(mrid) {
            return Err(Error::invalid_network(format!(
                "Duplicate mRID found: {mrid}"
            )));
        }

        let idx = self.graph.add_node(NetworkNode::Equipment(ConductingEquipment {
            mrid: mrid.to_string(),
            kind,
            base_voltage: None,
            in_substation: false,
            status: Dual::default(),
            terminals: Vec::new(),
            memberships: Dual::default(),
            sites: Vec::new(),
            relay_functions: Vec::new(),
            units: Vec::new(),
        }));
        self.node_indices.insert(mrid.to_string(), idx);

        Ok(idx)
    }

    /// Adds a terminal to the given equipment and returns its index.
    ///
    /// Terminals are numbered in the order they are added, starting at 1,
    /// and named after their equipment.
    pub fn add_terminal(
        &mut self,
        equipment: NodeIndex,
        phases: PhaseCode,
    ) -> Result<NodeIndex, Error> {
        let sequence_number = self.equipment(equipment)?.terminals.len() + 1;
        let mrid = format!("{}-t{sequence_number}", self.equipment(equipment)?.mrid);
        if self.node_indices.contains_key(&mrid) {
            return Err(Error::invalid_network(format!(
                "Duplicate mRID found: {mrid}"
            )));
        }

        let idx = self.graph.add_node(NetworkNode::Terminal(Terminal {
            mrid: mrid.clone(),
            equipment,
            sequence_number,
            phases,
            state: Dual::default(),
        }));
        self.node_indices.insert(mrid, idx);
        self.equipment_mut(equipment)?.terminals.push(idx);

        Ok(idx)
    }

    /// Adds a connectivity node and returns its index.
    pub fn add_connectivity_node(&mut self, mrid: &str) -> Result<NodeIndex, Error> {
        if self.node_indices.contains_key(mrid) {
            return Err(Error::invalid_network(format!(
                "Duplicate mRID found: {mrid}"
            )));
        }

        let idx = self.graph.add_node(NetworkNode::Junction(ConnectivityNode {
            mrid: mrid.to_string(),
        }));
        self.node_indices.insert(mrid.to_string(), idx);

        Ok(idx)
    }

    /// Connects a terminal to a connectivity node.
    ///
    /// Returns an error if the terminal is already connected; a terminal
    /// joins at most one connectivity node at a time.
    pub fn connect(&mut self, terminal: NodeIndex, node: NodeIndex) -> Result<(), Error> {
        let terminal_mrid = self.terminal(terminal)?.mrid.clone();
        self.junction(node)?;

        if self.connectivity_node_of(terminal).is_some() {
            return Err(Error::invalid_network(format!(
                "Terminal {terminal_mrid} is already connected to a connectivity node."
            )));
        }

        self.graph.add_edge(terminal, node, ());
        Ok(())
    }

    /// Connects two terminals, reusing the connectivity node either is
    /// already joined at or creating one when both are unconnected.
    ///
    /// Returns the index of the joining connectivity node.
    pub fn connect_terminals(&mut self, a: NodeIndex, b: NodeIndex) -> Result<NodeIndex, Error> {
        if a == b {
            let mrid = self.terminal(a)?.mrid.clone();
            return Err(Error::invalid_network(format!(
                "Can't connect terminal {mrid} to itself."
            )));
        }

        let node = match (self.connectivity_node_of(a), self.connectivity_node_of(b)) {
            (Some(node), None) => {
                self.connect(b, node)?;
                node
            }
            (None, Some(node)) => {
                self.connect(a, node)?;
                node
            }
            (None, None) => {
                let mrid = self.next_auto_node_mrid();
                let node = self.add_connectivity_node(&mrid)?;
                self.connect(a, node)?;
                self.connect(b, node)?;
                node
            }
            (Some(_), Some(_)) => {
                let (a, b) = (self.terminal(a)?.mrid.clone(), self.terminal(b)?.mrid.clone());
                return Err(Error::invalid_network(format!(
                    "Terminals {a} and {b} are both already connected."
                )));
            }
        };

        Ok(node)
    }

    /// Sets the nominal voltage of the given equipment, in volts.
    pub fn set_base_voltage(&mut self, equipment: NodeIndex, volts: u32) -> Result<(), Error> {
        self.equipment_mut(equipment)?.base_voltage = Some(volts);
        Ok(())
    }

    /// Marks the given equipment as being part of a substation.
    pub fn set_in_substation(&mut self, equipment: NodeIndex, value: bool) -> Result<(), Error> {
        self.equipment_mut(equipment)?.in_substation = value;
        Ok(())
    }

    /// Sets the open flag of the given equipment in the normal network state.
    pub fn set_normally_open(&mut self, equipment: NodeIndex, open: bool) -> Result<(), Error> {
        self.equipment_mut(equipment)?.status.normal.open = open;
        Ok(())
    }

    /// Sets the open flag of the given equipment in the current network
    /// state.
    pub fn set_currently_open(&mut self, equipment: NodeIndex, open: bool) -> Result<(), Error> {
        self.equipment_mut(equipment)?.status.current.open = open;
        Ok(())
    }

    /// Sets the in-service flag of the given equipment in the normal network
    /// state.
    pub fn set_normally_in_service(
        &mut self,
        equipment: NodeIndex,
        in_service: bool,
    ) -> Result<(), Error> {
        self.equipment_mut(equipment)?.status.normal.in_service = in_service;
        Ok(())
    }

    /// Sets the in-service flag of the given equipment in the current network
    /// state.
    pub fn set_currently_in_service(
        &mut self,
        equipment: NodeIndex,
        in_service: bool,
    ) -> Result<(), Error> {
        self.equipment_mut(equipment)?.status.current.in_service = in_service;
        Ok(())
    }

    /// Adds a feeder with the given head terminal.
    pub fn add_feeder(
        &mut self,
        mrid: &str,
        head_terminal: Option<NodeIndex>,
    ) -> Result<FeederId, Error> {
        if let Some(terminal) = head_terminal {
            self.terminal(terminal)?;
        }
        if !self.reserve_container_mrid(mrid) {
            return Err(Error::invalid_network(format!(
                "Duplicate mRID found: {mrid}"
            )));
        }

        self.feeders.push(Feeder {
            mrid: mrid.to_string(),
            head_terminal,
            contents: Dual::default(),
        });
        Ok(FeederId(self.feeders.len() - 1))
    }

    /// Adds an LV feeder with the given head terminal.
    pub fn add_lv_feeder(
        &mut self,
        mrid: &str,
        head_terminal: Option<NodeIndex>,
    ) -> Result<LvFeederId, Error> {
        if let Some(terminal) = head_terminal {
            self.terminal(terminal)?;
        }
        if !self.reserve_container_mrid(mrid) {
            return Err(Error::invalid_network(format!(
                "Duplicate mRID found: {mrid}"
            )));
        }

        self.lv_feeders.push(LvFeeder {
            mrid: mrid.to_string(),
            head_terminal,
            contents: Dual::default(),
        });
        Ok(LvFeederId(self.lv_feeders.len() - 1))
    }

    /// Adds a site.
    pub fn add_site(&mut self, mrid: &str) -> Result<SiteId, Error> {
        if !self.reserve_container_mrid(mrid) {
            return Err(Error::invalid_network(format!(
                "Duplicate mRID found: {mrid}"
            )));
        }

        self.sites.push(Site {
            mrid: mrid.to_string(),
            equipment: std::collections::BTreeSet::new(),
        });
        Ok(SiteId(self.sites.len() - 1))
    }

    /// Adds the given equipment to a site.
    pub fn add_equipment_to_site(
        &mut self,
        site: SiteId,
        equipment: NodeIndex,
    ) -> Result<(), Error> {
        self.equipment_mut(equipment)?.sites.push(site);
        self.sites[site.0].equipment.insert(equipment);
        Ok(())
    }

    /// Adds auxiliary equipment attached to the given terminal.
    pub fn add_auxiliary_equipment(
        &mut self,
        mrid: &str,
        terminal: NodeIndex,
    ) -> Result<AuxEquipmentId, Error> {
        self.terminal(terminal)?;
        if !self.reserve_container_mrid(mrid) {
            return Err(Error::invalid_network(format!(
                "Duplicate mRID found: {mrid}"
            )));
        }

        self.aux_equipment.push(AuxiliaryEquipment {
            mrid: mrid.to_string(),
            terminal,
            memberships: Dual::default(),
        });
        Ok(AuxEquipmentId(self.aux_equipment.len() - 1))
    }

    /// Adds a protection relay system.
    pub fn add_relay_system(&mut self, mrid: &str) -> Result<RelaySystemId, Error> {
        if !self.reserve_container_mrid(mrid) {
            return Err(Error::invalid_network(format!(
                "Duplicate mRID found: {mrid}"
            )));
        }

        self.relay_systems.push(ProtectionRelaySystem {
            mrid: mrid.to_string(),
            schemes: Vec::new(),
            memberships: Dual::default(),
        });
        Ok(RelaySystemId(self.relay_systems.len() - 1))
    }

    /// Adds a protection relay scheme belonging to the given system.
    pub fn add_relay_scheme(
        &mut self,
        mrid: &str,
        system: RelaySystemId,
    ) -> Result<RelaySchemeId, Error> {
        if !self.reserve_container_mrid(mrid) {
            return Err(Error::invalid_network(format!(
                "Duplicate mRID found: {mrid}"
            )));
        }

        self.relay_schemes.push(ProtectionRelayScheme {
            mrid: mrid.to_string(),
            system,
            functions: Vec::new(),
        });
        let id = RelaySchemeId(self.relay_schemes.len() - 1);
        self.relay_systems[system.0].schemes.push(id);
        Ok(id)
    }

    /// Adds a protection relay function hosted on the given equipment.
    pub fn add_relay_function(
        &mut self,
        mrid: &str,
        equipment: NodeIndex,
    ) -> Result<RelayFunctionId, Error> {
        self.equipment(equipment)?;
        if !self.reserve_container_mrid(mrid) {
            return Err(Error::invalid_network(format!(
                "Duplicate mRID found: {mrid}"
            )));
        }

        self.relay_functions.push(ProtectionRelayFunction {
            mrid: mrid.to_string(),
            schemes: Vec::new(),
        });
        let id = RelayFunctionId(self.relay_functions.len() - 1);
        self.equipment_mut(equipment)?.relay_functions.push(id);
        Ok(id)
    }

    /// Adds a relay function to a relay scheme.
    pub fn add_function_to_scheme(
        &mut self,
        scheme: RelaySchemeId,
        function: RelayFunctionId,
    ) -> Result<(), Error> {
        self.relay_schemes[scheme.0].functions.push(function);
        self.relay_functions[function.0].schemes.push(scheme);
        Ok(())
    }

    /// Adds a power electronics unit owned by the given equipment.
    ///
    /// Returns an error if the equipment is not a power electronics
    /// connection.
    pub fn add_power_electronics_unit(
        &mut self,
        mrid: &str,
        equipment: NodeIndex,
    ) -> Result<UnitId, Error> {
        let eq = self.equipment(equipment)?;
        if eq.kind != EquipmentKind::PowerElectronicsConnection {
            return Err(Error::invalid_network(format!(
                "Can't add a power electronics unit to {}, it is a {}.",
                eq.mrid, eq.kind
            )));
        }
        if !self.reserve_container_mrid(mrid) {
            return Err(Error::invalid_network(format!(
                "Duplicate mRID found: {mrid}"
            )));
        }

        self.units.push(PowerElectronicsUnit {
            mrid: mrid.to_string(),
            equipment,
            memberships: Dual::default(),
        });
        let id = UnitId(self.units.len() - 1);
        self.equipment_mut(equipment)?.units.push(id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_mrid() {
        let mut network = NetworkGraph::new();
        network
            .add_equipment("line", EquipmentKind::AcLineSegment)
            .unwrap();
        assert!(network
            .add_equipment("line", EquipmentKind::Junction)
            .is_err_and(|e| e == Error::invalid_network("Duplicate mRID found: line")));
        assert!(network
            .add_feeder("line", None)
            .is_err_and(|e| e == Error::invalid_network("Duplicate mRID found: line")));
    }

    #[test]
    fn test_terminal_numbering() {
        let mut network = NetworkGraph::new();
        let line = network
            .add_equipment("line", EquipmentKind::AcLineSegment)
            .unwrap();
        let t1 = network.add_terminal(line, PhaseCode::ABC).unwrap();
        let t2 = network.add_terminal(line, PhaseCode::ABC).unwrap();

        assert_eq!(network.terminal(t1).unwrap().sequence_number(), 1);
        assert_eq!(network.terminal(t2).unwrap().sequence_number(), 2);
        assert_eq!(network.terminal(t2).unwrap().mrid(), "line-t2");
        assert_eq!(network.equipment(line).unwrap().terminals(), &[t1, t2]);
    }

    #[test]
    fn test_connect_single_node_per_terminal() {
        let mut network = NetworkGraph::new();
        let line = network
            .add_equipment("line", EquipmentKind::AcLineSegment)
            .unwrap();
        let t1 = network.add_terminal(line, PhaseCode::ABC).unwrap();
        let cn1 = network.add_connectivity_node("cn1").unwrap();
        let cn2 = network.add_connectivity_node("cn2").unwrap();

        network.connect(t1, cn1).unwrap();
        assert!(network.connect(t1, cn2).is_err_and(|e| e
            == Error::invalid_network(
                "Terminal line-t1 is already connected to a connectivity node."
            )));
        assert_eq!(network.connectivity_node_of(t1), Some(cn1));
    }

    #[test]
    fn test_connect_terminals() {
        let mut network = NetworkGraph::new();
        let line1 = network
            .add_equipment("line1", EquipmentKind::AcLineSegment)
            .unwrap();
        let line2 = network
            .add_equipment("line2", EquipmentKind::AcLineSegment)
            .unwrap();
        let line3 = network
            .add_equipment("line3", EquipmentKind::AcLineSegment)
            .unwrap();
        let t1 = network.add_terminal(line1, PhaseCode::ABC).unwrap();
        let t2 = network.add_terminal(line2, PhaseCode::ABC).unwrap();
        let t3 = network.add_terminal(line3, PhaseCode::ABC).unwrap();

        assert!(network
            .connect_terminals(t1, t1)
            .is_err_and(|e| e
                == Error::invalid_network("Can't connect terminal line1-t1 to itself.")));

        let node = network.connect_terminals(t1, t2).unwrap();
        assert_eq!(network.connectivity_node_of(t1), Some(node));
        assert_eq!(network.connectivity_node_of(t2), Some(node));

        // reuses the existing node when one side is already connected
        assert_eq!(network.connect_terminals(t2, t3).unwrap(), node);
        assert_eq!(network.connectivity_node_of(t3), Some(node));

        assert!(network.connect_terminals(t1, t3).is_err_and(|e| e
            == Error::invalid_network(
                "Terminals line1-t1 and line3-t1 are both already connected."
            )));
    }

    #[test]
    fn test_unit_requires_power_electronics_connection() {
        let mut network = NetworkGraph::new();
        let line = network
            .add_equipment("line", EquipmentKind::AcLineSegment)
            .unwrap();
        assert!(network.add_power_electronics_unit("unit", line).is_err_and(|e| e
            == Error::invalid_network(
                "Can't add a power electronics unit to line, it is a AcLineSegment."
            )));

        let pec = network
            .add_equipment("pec", EquipmentKind::PowerElectronicsConnection)
            .unwrap();
        assert!(network.add_power_electronics_unit("unit", pec).is_ok());
    }
}
