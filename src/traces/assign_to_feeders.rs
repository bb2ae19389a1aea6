// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Assignment of equipment to the feeders that energize it.

use std::collections::HashSet;
use std::rc::Rc;

use petgraph::graph::NodeIndex;

use crate::containers::{AuxEquipmentId, EquipmentRef, FeederId, LvFeederId, RelaySystemId};
use crate::network::NetworkGraph;
use crate::state::NetworkStateOperators;
use crate::trace::{ActionType, NetworkTrace, TraversalQueue};
use crate::Error;

/// The base voltage below which equipment counts as low voltage, in volts.
pub(crate) const LV_THRESHOLD: u32 = 1000;

impl NetworkGraph {
    /// Assigns equipment to the feeders energizing it, for one network
    /// state.
    ///
    /// Each feeder is traced from its head terminal without crossing open
    /// points, stopping at other feeder heads, at substation transformers
    /// and at the low voltage boundary. Along the way, protection relay
    /// systems, power electronics units and auxiliary equipment follow the
    /// equipment they are attached to, and transformers record which LV
    /// feeders the feeder energizes.
    pub fn assign_equipment_to_feeders<St: NetworkStateOperators + 'static>(
        &mut self,
        state: St,
    ) -> Result<(), Error> {
        let mut start_points = HashSet::new();
        for feeder in self.feeders.iter() {
            if let Some(head) = feeder.head_terminal {
                start_points.insert(self.terminal(head)?.equipment());
            }
        }
        let start_points = Rc::new(start_points);

        let feeder_ids: Vec<FeederId> = self.feeder_ids().collect();
        for feeder in feeder_ids {
            let Some(head) = self.feeder(feeder).head_terminal() else {
                continue;
            };
            self.assign_feeder_from(state, feeder, head, start_points.clone())?;
        }
        Ok(())
    }

    /// Assigns to the feeders already associated with the terminal's
    /// equipment, tracing outward from the terminal. Used when connecting
    /// new equipment into an already assigned network.
    pub fn assign_equipment_to_feeders_from_terminal<St: NetworkStateOperators + 'static>(
        &mut self,
        state: St,
        terminal: NodeIndex,
    ) -> Result<(), Error> {
        let equipment = self.terminal(terminal)?.equipment();
        let feeders: Vec<FeederId> = state
            .pick(&self.equipment(equipment)?.memberships)
            .feeders
            .iter()
            .copied()
            .collect();

        let mut start_points = HashSet::new();
        for feeder in self.feeders.iter() {
            if let Some(head) = feeder.head_terminal {
                start_points.insert(self.terminal(head)?.equipment());
            }
        }
        let start_points = Rc::new(start_points);

        for feeder in feeders {
            self.assign_feeder_from(state, feeder, terminal, start_points.clone())?;
        }
        Ok(())
    }

    fn assign_feeder_from<St: NetworkStateOperators + 'static>(
        &mut self,
        state: St,
        feeder: FeederId,
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
                .is_some_and(|equipment| {
                    equipment.kind().is_transformer() && equipment.in_substation()
                })
        });
        trace.add_stop_condition(|graph, path, _| {
            graph
                .terminal_equipment(path.to_terminal)
                .is_some_and(|equipment| {
                    equipment
                        .base_voltage()
                        .is_some_and(|volts| volts < LV_THRESHOLD)
                })
        });

        trace.add_step_action(ActionType::FirstStepOnEquipment, move |graph, path, context| {
            let equipment_index = graph.terminal(path.to_terminal)?.equipment();
            let is_transformer = graph.equipment(equipment_index)?.kind().is_transformer();
            // a stopping transformer marks the boundary to the next feeder
            // or substation and belongs to neither
            if context.is_stopping && is_transformer {
                return Ok(());
            }

            state.assign_to_feeder(graph, feeder, EquipmentRef::Conducting(equipment_index))?;
            for system in graph.relay_systems_protecting(equipment_index) {
                state.assign_to_feeder(graph, feeder, EquipmentRef::RelaySystem(system))?;
            }
            let units = graph.equipment(equipment_index)?.units.clone();
            for unit in units {
                state.assign_to_feeder(graph, feeder, EquipmentRef::Unit(unit))?;
            }
            if is_transformer {
                for lv_feeder in graph.lv_feeders_energized_through(equipment_index) {
                    state.add_energizing_feeder(graph, feeder, lv_feeder);
                }
            }
            Ok(())
        });

        // auxiliary equipment hangs off terminals rather than equipment, so
        // it follows every visited terminal
        trace.add_step_action(ActionType::AllSteps, move |graph, path, _| {
            let attached: Vec<AuxEquipmentId> = graph
                .auxiliary_equipment_ids()
                .filter(|&id| graph.auxiliary_equipment(id).terminal() == path.to_terminal)
                .collect();
            for id in attached {
                state.assign_to_feeder(graph, feeder, EquipmentRef::Auxiliary(id))?;
            }
            Ok(())
        });

        trace.run(self, head, false)
    }

    /// The relay systems reached from the relay functions hosted on the
    /// given equipment.
    pub(crate) fn relay_systems_protecting(
        &self,
        equipment: NodeIndex,
    ) -> Vec<RelaySystemId> {
        let Ok(equipment) = self.equipment(equipment) else {
            return Vec::new();
        };
        let mut systems = Vec::new();
        for &function in &equipment.relay_functions {
            for &scheme in &self.relay_function(function).schemes {
                let system = self.relay_scheme(scheme).system;
                if !systems.contains(&system) {
                    systems.push(system);
                }
            }
        }
        systems
    }

    /// The LV feeders fed through the given transformer: those headed on
    /// equipment sharing a site with it, or headed on the transformer itself
    /// when it has no site.
    pub(crate) fn lv_feeders_energized_through(&self, transformer: NodeIndex) -> Vec<LvFeederId> {
        let Ok(equipment) = self.equipment(transformer) else {
            return Vec::new();
        };
        let mut energized = Vec::new();
        for id in self.lv_feeder_ids() {
            let Some(head) = self.lv_feeder(id).head_terminal() else {
                continue;
            };
            let Ok(head_equipment) = self.terminal(head).map(|t| t.equipment()) else {
                continue;
            };
            let fed = if equipment.sites.is_empty() {
                head_equipment == transformer
            } else {
                equipment
                    .sites
                    .iter()
                    .any(|&site| self.site(site).equipment.contains(&head_equipment))
            };
            if fed {
                energized.push(id);
            }
        }
        energized
    }
}
