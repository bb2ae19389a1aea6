// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Assignment of equipment to low voltage feeders.

use std::collections::HashSet;
use std::rc::Rc;

use petgraph::graph::NodeIndex;

use crate::containers::{AuxEquipmentId, EquipmentRef, FeederId, LvFeederId};
use crate::network::NetworkGraph;
use crate::state::NetworkStateOperators;
use crate::trace::{ActionType, NetworkTrace, TraversalQueue};
use crate::Error;

use super::assign_to_feeders::LV_THRESHOLD;

impl NetworkGraph {
    /// Assigns equipment to the LV feeders energizing it, for one network
    /// state.
    ///
    /// Each LV feeder is traced from its head terminal without crossing open
    /// points, stopping at other LV feeder heads and at the boundary back up
    /// to high voltage. The feeders containing the head equipment are
    /// recorded as energizing the LV feeder.
    pub fn assign_equipment_to_lv_feeders<St: NetworkStateOperators + 'static>(
        &mut self,
        state: St,
    ) -> Result<(), Error> {
        let start_points = Rc::new(self.lv_feeder_start_points()?);

        let lv_feeder_ids: Vec<LvFeederId> = self.lv_feeder_ids().collect();
        for lv_feeder in lv_feeder_ids {
            let Some(head) = self.lv_feeder(lv_feeder).head_terminal() else {
                continue;
            };
            self.seed_energizing_feeders(state, lv_feeder, head)?;
            self.assign_lv_feeder_from(state, lv_feeder, head, start_points.clone())?;
        }
        Ok(())
    }

    /// Assigns to the LV feeders already associated with the terminal's
    /// equipment, tracing outward from the terminal.
    pub fn assign_equipment_to_lv_feeders_from_terminal<St: NetworkStateOperators + 'static>(
        &mut self,
        state: St,
        terminal: NodeIndex,
    ) -> Result<(), Error> {
        let equipment = self.terminal(terminal)?.equipment();
        let lv_feeders: Vec<LvFeederId> = state
            .pick(&self.equipment(equipment)?.memberships)
            .lv_feeders
            .iter()
            .copied()
            .collect();
        let start_points = Rc::new(self.lv_feeder_start_points()?);

        for lv_feeder in lv_feeders {
            self.assign_lv_feeder_from(state, lv_feeder, terminal, start_points.clone())?;
        }
        Ok(())
    }

    fn lv_feeder_start_points(&self) -> Result<HashSet<NodeIndex>, Error> {
        let mut start_points = HashSet::new();
        for lv_feeder in self.lv_feeders.iter() {
            if let Some(head) = lv_feeder.head_terminal {
                start_points.insert(self.terminal(head)?.equipment());
            }
        }
        Ok(start_points)
    }

    /// Records the feeders containing the head equipment as energizing the
    /// LV feeder.
    fn seed_energizing_feeders<St: NetworkStateOperators>(
        &mut self,
        state: St,
        lv_feeder: LvFeederId,
        head: NodeIndex,
    ) -> Result<(), Error> {
        let equipment = self.terminal(head)?.equipment();
        let feeders: Vec<FeederId> = state
            .pick(&self.equipment(equipment)?.memberships)
            .feeders
            .iter()
            .copied()
            .collect();
        for feeder in feeders {
            state.add_energizing_feeder(self, feeder, lv_feeder);
        }
        Ok(())
    }

    fn assign_lv_feeder_from<St: NetworkStateOperators + 'static>(
        &mut self,
        state: St,
        lv_feeder: LvFeederId,
        head: NodeIndex,
        start_points: Rc<HashSet<NodeIndex>>,
    ) -> Result<(), Error> {
        let mut trace = NetworkTrace::new(state, TraversalQueue::fifo());
        trace.stop_at_open(state);
        trace.add_stop_condition(move |graph, path, _| {
            graph
                .terminal(path.to_terminal)
                .is_ok_and(|terminal| start_points.contains(&terminal.equipment()))
        });
        trace.add_stop_condition(|graph, path, _| {
            graph
                .terminal_equipment(path.to_terminal)
                .is_some_and(|equipment| reached_hv(equipment.base_voltage()))
        });

        trace.add_step_action(ActionType::FirstStepOnEquipment, move |graph, path, context| {
            let equipment_index = graph.terminal(path.to_terminal)?.equipment();
            let base_voltage = graph.equipment(equipment_index)?.base_voltage();
            // equipment at the boundary back to HV belongs to the feeder
            // above, not to this LV feeder
            if context.is_stopping && reached_hv(base_voltage) {
                return Ok(());
            }

            state.assign_to_lv_feeder(graph, lv_feeder, EquipmentRef::Conducting(equipment_index))?;
            for system in graph.relay_systems_protecting(equipment_index) {
                state.assign_to_lv_feeder(graph, lv_feeder, EquipmentRef::RelaySystem(system))?;
            }
            let units = graph.equipment(equipment_index)?.units.clone();
            for unit in units {
                state.assign_to_lv_feeder(graph, lv_feeder, EquipmentRef::Unit(unit))?;
            }
            Ok(())
        });

        trace.add_step_action(ActionType::AllSteps, move |graph, path, _| {
            let attached: Vec<AuxEquipmentId> = graph
                .auxiliary_equipment_ids()
                .filter(|&id| graph.auxiliary_equipment(id).terminal() == path.to_terminal)
                .collect();
            for id in attached {
                state.assign_to_lv_feeder(graph, lv_feeder, EquipmentRef::Auxiliary(id))?;
            }
            Ok(())
        });

        trace.run(self, head, false)
    }
}

fn reached_hv(base_voltage: Option<u32>) -> bool {
    base_voltage.is_some_and(|volts| volts >= LV_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::test_utils::NetworkBuilder;
    use crate::state::NormalStateOperators;
    use crate::PhaseCode;

    fn lv_feeder_equipment(network: &NetworkGraph, lv_feeder: LvFeederId) -> Vec<EquipmentRef> {
        NormalStateOperators
            .pick(&network.lv_feeder(lv_feeder).contents)
            .equipment
            .iter()
            .copied()
            .collect()
    }

    #[test]
    fn test_assigns_the_lv_network_below_the_transformer() {
        let mut builder = NetworkBuilder::new();
        let breaker = builder.breaker("breaker");
        let transformer =
            builder.transformer("tx", &[PhaseCode::ABC, PhaseCode::ABCN]);
        let lv_line = builder.acls_with_phases("lv-line", PhaseCode::ABCN);
        let lv_consumer = builder.consumer_with_phases("lv-consumer", PhaseCode::ABCN);
        builder.connect(breaker, 2, transformer, 1);
        builder.connect(transformer, 2, lv_line, 1);
        builder.connect(lv_line, 2, lv_consumer, 1);
        let feeder = builder.feeder("feeder", breaker, 2);
        let lv_feeder = builder.lv_feeder("lv-feeder", transformer, 2);
        let mut network = builder.build();
        network.set_base_voltage(breaker, 11_000).unwrap();
        network.set_base_voltage(lv_line, 400).unwrap();
        network.set_base_voltage(lv_consumer, 400).unwrap();

        network
            .assign_equipment_to_feeders(NormalStateOperators)
            .unwrap();
        network
            .assign_equipment_to_lv_feeders(NormalStateOperators)
            .unwrap();

        let equipment = lv_feeder_equipment(&network, lv_feeder);
        assert!(equipment.contains(&EquipmentRef::Conducting(transformer)));
        assert!(equipment.contains(&EquipmentRef::Conducting(lv_line)));
        assert!(equipment.contains(&EquipmentRef::Conducting(lv_consumer)));
        // the HV side stays with the feeder above
        assert!(!equipment.contains(&EquipmentRef::Conducting(breaker)));

        // the head equipment's feeder energizes this LV feeder
        let contents = NormalStateOperators.pick(&network.lv_feeder(lv_feeder).contents);
        assert!(contents.energizing_feeders.contains(&feeder));
    }

    #[test]
    fn test_stops_at_another_lv_feeder_head() {
        let mut builder = NetworkBuilder::new();
        let lv_breaker1 = builder.breaker_with_phases("lv-breaker1", PhaseCode::ABCN);
        let lv_line = builder.acls_with_phases("lv-line", PhaseCode::ABCN);
        let lv_breaker2 = builder.breaker_with_phases("lv-breaker2", PhaseCode::ABCN);
        builder.connect(lv_breaker1, 2, lv_line, 1);
        builder.connect(lv_line, 2, lv_breaker2, 1);
        let lv_feeder1 = builder.lv_feeder("lv-feeder1", lv_breaker1, 2);
        let lv_feeder2 = builder.lv_feeder("lv-feeder2", lv_breaker2, 1);
        let mut network = builder.build();

        network
            .assign_equipment_to_lv_feeders(NormalStateOperators)
            .unwrap();

        let equipment = lv_feeder_equipment(&network, lv_feeder1);
        assert!(equipment.contains(&EquipmentRef::Conducting(lv_line)));
        // the other head's equipment is reached but the trace stops there
        assert!(equipment.contains(&EquipmentRef::Conducting(lv_breaker2)));
        let equipment2 = lv_feeder_equipment(&network, lv_feeder2);
        assert!(equipment2.contains(&EquipmentRef::Conducting(lv_line)));
    }
}
