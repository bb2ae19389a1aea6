// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the node types stored in a
//! [`NetworkGraph`][crate::NetworkGraph]: conducting equipment, terminals and
//! connectivity nodes.

use petgraph::graph::NodeIndex;

use crate::containers::{Memberships, RelayFunctionId, SiteId, UnitId};
use crate::state::Dual;
use crate::{EquipmentKind, FeederDirection, PhaseCode, SinglePhaseKind};

/// The open and in-service flags of a piece of equipment in one network
/// state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EquipmentState {
    pub open: bool,
    pub in_service: bool,
}

impl Default for EquipmentState {
    fn default() -> Self {
        EquipmentState {
            open: false,
            in_service: true,
        }
    }
}

/// The traced phase and feeder direction record of a terminal in one network
/// state.
///
/// Traced phases are indexed by core position within the terminal's nominal
/// phase code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerminalState {
    traced: [SinglePhaseKind; 4],
    pub(crate) direction: FeederDirection,
}

impl TerminalState {
    /// The traced phase of the given core.
    pub fn phase(&self, core: usize) -> SinglePhaseKind {
        self.traced[core]
    }

    /// Assigns a traced phase to the given core.
    ///
    /// Returns `Some(false)` when the core already holds the phase,
    /// `Some(true)` when the phase was assigned or cleared, and `None` when
    /// the core holds a different phase and neither side is
    /// `SinglePhaseKind::None`.
    pub(crate) fn set_phase(&mut self, core: usize, phase: SinglePhaseKind) -> Option<bool> {
        let existing = self.traced[core];
        if existing == phase {
            Some(false)
        } else if existing == SinglePhaseKind::None || phase == SinglePhaseKind::None {
            self.traced[core] = phase;
            Some(true)
        } else {
            None
        }
    }

    /// The feeder direction of the terminal.
    pub fn direction(&self) -> FeederDirection {
        self.direction
    }
}

/// A connection point on a piece of conducting equipment.
///
/// Terminals carry all traced phase and direction state, in two independent
/// records for the normal and current network states.
#[derive(Clone, Debug)]
pub struct Terminal {
    pub(crate) mrid: String,
    pub(crate) equipment: NodeIndex,
    pub(crate) sequence_number: usize,
    pub(crate) phases: PhaseCode,
    pub(crate) state: Dual<TerminalState>,
}

impl Terminal {
    /// The mRID of the terminal.
    pub fn mrid(&self) -> &str {
        &self.mrid
    }

    /// The equipment the terminal belongs to.
    pub fn equipment(&self) -> NodeIndex {
        self.equipment
    }

    /// The 1-based position of the terminal on its equipment.
    pub fn sequence_number(&self) -> usize {
        self.sequence_number
    }

    /// The nominal phase code of the terminal.
    pub fn phases(&self) -> PhaseCode {
        self.phases
    }
}

/// A piece of conducting equipment: a node in the network that owns an
/// ordered list of terminals.
#[derive(Clone, Debug)]
pub struct ConductingEquipment {
    pub(crate) mrid: String,
    pub(crate) kind: EquipmentKind,
    pub(crate) base_voltage: Option<u32>,
    pub(crate) in_substation: bool,
    pub(crate) status: Dual<EquipmentState>,
    pub(crate) terminals: Vec<NodeIndex>,
    pub(crate) memberships: Dual<Memberships>,
    pub(crate) sites: Vec<SiteId>,
    pub(crate) relay_functions: Vec<RelayFunctionId>,
    pub(crate) units: Vec<UnitId>,
}

impl ConductingEquipment {
    /// The mRID of the equipment.
    pub fn mrid(&self) -> &str {
        &self.mrid
    }

    /// The kind of the equipment.
    pub fn kind(&self) -> EquipmentKind {
        self.kind
    }

    /// The nominal voltage of the equipment in volts, when known.
    pub fn base_voltage(&self) -> Option<u32> {
        self.base_voltage
    }

    /// Whether the equipment is part of a substation.
    pub fn in_substation(&self) -> bool {
        self.in_substation
    }

    /// The ordered terminals of the equipment.
    pub fn terminals(&self) -> &[NodeIndex] {
        &self.terminals
    }
}

/// A junction where two or more terminals are electrically joined.
///
/// The membership relation itself is kept as graph edges, so the node weight
/// only carries identity.
#[derive(Clone, Debug)]
pub struct ConnectivityNode {
    pub(crate) mrid: String,
}

impl ConnectivityNode {
    /// The mRID of the connectivity node.
    pub fn mrid(&self) -> &str {
        &self.mrid
    }
}

/// A node stored in the network graph.
#[derive(Clone, Debug)]
pub(crate) enum NetworkNode {
    Equipment(ConductingEquipment),
    Terminal(Terminal),
    Junction(ConnectivityNode),
}
