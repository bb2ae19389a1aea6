// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Dual network state storage and the state-operator abstraction.
//!
//! Every stateful attribute in the network exists twice: once for the
//! *normal* state (how the network is built and switched by default) and
//! once for the *current* state (how it is switched right now). The tracing
//! algorithms are written once against the [`NetworkStateOperators`] trait
//! and run over either state by picking the operator value.

use petgraph::graph::NodeIndex;

use crate::containers::{EquipmentRef, FeederId, LvFeederId};
use crate::equipment::{ConductingEquipment, Terminal};
use crate::{Error, FeederDirection, SinglePhaseKind};

use crate::network::NetworkGraph;

/// A pair of values, one per network state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dual<T> {
    pub normal: T,
    pub current: T,
}

/// Selects one side of every [`Dual`] in the network.
///
/// Implementations are zero-sized and `Copy`; algorithms take an operator
/// value and thread it through. The two kernel methods pick the state, and
/// everything else is provided on top of them.
pub trait NetworkStateOperators: Copy {
    /// Picks this operator's side of a dual value.
    fn pick<'a, T>(self, dual: &'a Dual<T>) -> &'a T;

    /// Picks this operator's side of a dual value, mutably.
    fn pick_mut<'a, T>(self, dual: &'a mut Dual<T>) -> &'a mut T;

    /// The traced phase of the given core of a terminal.
    fn phase(self, terminal: &Terminal, core: usize) -> SinglePhaseKind {
        self.pick(&terminal.state).phase(core)
    }

    /// Assigns a traced phase to the given core of a terminal.
    ///
    /// Returns whether the record changed, or a `CrossingPhases` error when
    /// the core already holds a different phase.
    fn set_phase(
        self,
        graph: &mut NetworkGraph,
        terminal: NodeIndex,
        core: usize,
        phase: SinglePhaseKind,
    ) -> Result<bool, Error> {
        let terminal = graph.terminal_mut(terminal)?;
        let existing = self.pick(&terminal.state).phase(core);
        match self.pick_mut(&mut terminal.state).set_phase(core, phase) {
            Some(changed) => Ok(changed),
            None => Err(Error::crossing_phases(format!(
                "Crossing phases at terminal {}: core {core} is traced as {existing}, \
                 can't also trace it as {phase}.",
                terminal.mrid
            ))),
        }
    }

    /// The feeder direction of a terminal.
    fn direction(self, terminal: &Terminal) -> FeederDirection {
        self.pick(&terminal.state).direction
    }

    /// Adds a feeder direction to a terminal, accumulating with any
    /// direction already present.
    ///
    /// Returns whether the stored direction changed.
    fn add_direction(self, terminal: &mut Terminal, direction: FeederDirection) -> bool {
        let state = self.pick_mut(&mut terminal.state);
        let combined = state.direction.plus(direction);
        let changed = combined != state.direction;
        state.direction = combined;
        changed
    }

    /// Replaces the feeder direction of a terminal.
    fn set_direction(self, terminal: &mut Terminal, direction: FeederDirection) {
        self.pick_mut(&mut terminal.state).direction = direction;
    }

    /// Whether the equipment blocks current flow. Only switches can be open.
    fn is_open(self, equipment: &ConductingEquipment) -> bool {
        equipment.kind.is_switch() && self.pick(&equipment.status).open
    }

    /// Whether the equipment is in service.
    fn is_in_service(self, equipment: &ConductingEquipment) -> bool {
        self.pick(&equipment.status).in_service
    }

    /// Associates equipment with a feeder, in both directions.
    fn assign_to_feeder(
        self,
        graph: &mut NetworkGraph,
        feeder: FeederId,
        equipment: EquipmentRef,
    ) -> Result<(), Error> {
        self.pick_mut(graph.memberships_mut(equipment)?)
            .feeders
            .insert(feeder);
        self.pick_mut(&mut graph.feeder_mut(feeder).contents)
            .equipment
            .insert(equipment);
        Ok(())
    }

    /// Associates equipment with an LV feeder, in both directions.
    fn assign_to_lv_feeder(
        self,
        graph: &mut NetworkGraph,
        lv_feeder: LvFeederId,
        equipment: EquipmentRef,
    ) -> Result<(), Error> {
        self.pick_mut(graph.memberships_mut(equipment)?)
            .lv_feeders
            .insert(lv_feeder);
        self.pick_mut(&mut graph.lv_feeder_mut(lv_feeder).contents)
            .equipment
            .insert(equipment);
        Ok(())
    }

    /// Records that a feeder energizes an LV feeder, in both directions.
    fn add_energizing_feeder(self, graph: &mut NetworkGraph, feeder: FeederId, lv_feeder: LvFeederId) {
        self.pick_mut(&mut graph.feeder_mut(feeder).contents)
            .energized_lv_feeders
            .insert(lv_feeder);
        self.pick_mut(&mut graph.lv_feeder_mut(lv_feeder).contents)
            .energizing_feeders
            .insert(feeder);
    }
}

/// The state operator for the normal network state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalStateOperators;

impl NetworkStateOperators for NormalStateOperators {
    fn pick<'a, T>(self, dual: &'a Dual<T>) -> &'a T {
        &dual.normal
    }

    fn pick_mut<'a, T>(self, dual: &'a mut Dual<T>) -> &'a mut T {
        &mut dual.normal
    }
}

/// The state operator for the current network state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CurrentStateOperators;

impl NetworkStateOperators for CurrentStateOperators {
    fn pick<'a, T>(self, dual: &'a Dual<T>) -> &'a T {
        &dual.current
    }

    fn pick_mut<'a, T>(self, dual: &'a mut Dual<T>) -> &'a mut T {
        &mut dual.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EquipmentKind, PhaseCode};

    #[test]
    fn test_states_are_independent() {
        let mut network = NetworkGraph::new();
        let line = network
            .add_equipment("line", EquipmentKind::AcLineSegment)
            .unwrap();
        let t1 = network.add_terminal(line, PhaseCode::ABC).unwrap();

        assert!(NormalStateOperators
            .set_phase(&mut network, t1, 0, SinglePhaseKind::A)
            .unwrap());
        let terminal = network.terminal(t1).unwrap();
        assert_eq!(NormalStateOperators.phase(terminal, 0), SinglePhaseKind::A);
        assert_eq!(
            CurrentStateOperators.phase(terminal, 0),
            SinglePhaseKind::None
        );
    }

    #[test]
    fn test_crossing_phases() {
        let mut network = NetworkGraph::new();
        let line = network
            .add_equipment("line", EquipmentKind::AcLineSegment)
            .unwrap();
        let t1 = network.add_terminal(line, PhaseCode::ABC).unwrap();

        NormalStateOperators
            .set_phase(&mut network, t1, 0, SinglePhaseKind::A)
            .unwrap();
        assert!(NormalStateOperators
            .set_phase(&mut network, t1, 0, SinglePhaseKind::B)
            .is_err_and(|e| e
                == Error::crossing_phases(
                    "Crossing phases at terminal line-t1: core 0 is traced as A, \
                     can't also trace it as B."
                )));
    }

    #[test]
    fn test_open_is_switch_only() {
        let mut network = NetworkGraph::new();
        let line = network
            .add_equipment("line", EquipmentKind::AcLineSegment)
            .unwrap();
        let breaker = network
            .add_equipment("breaker", EquipmentKind::Breaker)
            .unwrap();
        network.set_normally_open(line, true).unwrap();
        network.set_normally_open(breaker, true).unwrap();

        assert!(!NormalStateOperators.is_open(network.equipment(line).unwrap()));
        assert!(NormalStateOperators.is_open(network.equipment(breaker).unwrap()));
        assert!(!CurrentStateOperators.is_open(network.equipment(breaker).unwrap()));
    }

    #[test]
    fn test_add_direction_accumulates() {
        let mut network = NetworkGraph::new();
        let line = network
            .add_equipment("line", EquipmentKind::AcLineSegment)
            .unwrap();
        let t1 = network.add_terminal(line, PhaseCode::ABC).unwrap();

        let terminal = network.terminal_mut(t1).unwrap();
        assert!(NormalStateOperators.add_direction(terminal, FeederDirection::Downstream));
        assert!(NormalStateOperators.add_direction(terminal, FeederDirection::Upstream));
        assert!(!NormalStateOperators.add_direction(terminal, FeederDirection::Downstream));
        assert_eq!(NormalStateOperators.direction(terminal), FeederDirection::Both);
        assert_eq!(
            CurrentStateOperators.direction(terminal),
            FeederDirection::None
        );
    }
}
