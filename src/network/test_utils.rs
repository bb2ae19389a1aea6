// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A builder for constructing test networks concisely.

use petgraph::graph::NodeIndex;

use crate::containers::{FeederId, LvFeederId};
use crate::{EquipmentKind, NetworkGraph, PhaseCode};

/// A builder that adds equipment with their terminals in one call and wires
/// them together by sequence number.
pub(crate) struct NetworkBuilder {
    network: NetworkGraph,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        NetworkBuilder {
            network: NetworkGraph::new(),
        }
    }

    fn equipment(
        &mut self,
        mrid: &str,
        kind: EquipmentKind,
        terminal_phases: &[PhaseCode],
    ) -> NodeIndex {
        let equipment = self.network.add_equipment(mrid, kind).unwrap();
        for &phases in terminal_phases {
            self.network.add_terminal(equipment, phases).unwrap();
        }
        equipment
    }

    /// An energy source with one ABC terminal.
    pub fn source(&mut self, mrid: &str) -> NodeIndex {
        self.source_with_phases(mrid, PhaseCode::ABC)
    }

    pub fn source_with_phases(&mut self, mrid: &str, phases: PhaseCode) -> NodeIndex {
        self.equipment(mrid, EquipmentKind::EnergySource, &[phases])
    }

    /// An AC line segment with two ABC terminals.
    pub fn acls(&mut self, mrid: &str) -> NodeIndex {
        self.acls_with_phases(mrid, PhaseCode::ABC)
    }

    pub fn acls_with_phases(&mut self, mrid: &str, phases: PhaseCode) -> NodeIndex {
        self.equipment(mrid, EquipmentKind::AcLineSegment, &[phases, phases])
    }

    /// A breaker with two ABC terminals.
    pub fn breaker(&mut self, mrid: &str) -> NodeIndex {
        self.breaker_with_phases(mrid, PhaseCode::ABC)
    }

    pub fn breaker_with_phases(&mut self, mrid: &str, phases: PhaseCode) -> NodeIndex {
        self.equipment(mrid, EquipmentKind::Breaker, &[phases, phases])
    }

    /// A junction with the given number of ABC terminals.
    pub fn junction(&mut self, mrid: &str, terminals: usize) -> NodeIndex {
        let phases = vec![PhaseCode::ABC; terminals];
        self.equipment(mrid, EquipmentKind::Junction, &phases)
    }

    /// A power transformer with one terminal per entry of `windings`.
    pub fn transformer(&mut self, mrid: &str, windings: &[PhaseCode]) -> NodeIndex {
        self.equipment(mrid, EquipmentKind::PowerTransformer, windings)
    }

    /// An energy consumer with one ABC terminal.
    pub fn consumer(&mut self, mrid: &str) -> NodeIndex {
        self.consumer_with_phases(mrid, PhaseCode::ABC)
    }

    pub fn consumer_with_phases(&mut self, mrid: &str, phases: PhaseCode) -> NodeIndex {
        self.equipment(mrid, EquipmentKind::EnergyConsumer, &[phases])
    }

    /// A power electronics connection with one ABC terminal.
    pub fn pec(&mut self, mrid: &str) -> NodeIndex {
        self.equipment(
            mrid,
            EquipmentKind::PowerElectronicsConnection,
            &[PhaseCode::ABC],
        )
    }

    /// Connects two equipment by their 1-based terminal sequence numbers.
    pub fn connect(
        &mut self,
        a: NodeIndex,
        a_sequence: usize,
        b: NodeIndex,
        b_sequence: usize,
    ) -> NodeIndex {
        let a_terminal = self.network.terminal_at(a, a_sequence).unwrap();
        let b_terminal = self.network.terminal_at(b, b_sequence).unwrap();
        self.network.connect_terminals(a_terminal, b_terminal).unwrap()
    }

    /// A feeder headed at the given terminal of the given equipment.
    pub fn feeder(&mut self, mrid: &str, head: NodeIndex, head_sequence: usize) -> FeederId {
        let terminal = self.network.terminal_at(head, head_sequence).unwrap();
        self.network.add_feeder(mrid, Some(terminal)).unwrap()
    }

    /// An LV feeder headed at the given terminal of the given equipment.
    pub fn lv_feeder(&mut self, mrid: &str, head: NodeIndex, head_sequence: usize) -> LvFeederId {
        let terminal = self.network.terminal_at(head, head_sequence).unwrap();
        self.network.add_lv_feeder(mrid, Some(terminal)).unwrap()
    }

    pub fn build(self) -> NetworkGraph {
        self.network
    }
}
