// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Traced phase propagation from energy sources.

use petgraph::graph::NodeIndex;

use crate::network::NetworkGraph;
use crate::state::NetworkStateOperators;
use crate::trace::TraversalQueue;
use crate::{Error, NominalPhasePath, PhaseSet, SinglePhaseKind};

impl NetworkGraph {
    /// Applies traced phases outward from every energy source terminal, for
    /// one network state.
    ///
    /// Source terminals take their nominal phases (placeholders start
    /// unresolved); every other terminal is traced from there.
    pub fn set_phases<St: NetworkStateOperators>(&mut self, state: St) -> Result<(), Error> {
        let start_terminals: Vec<NodeIndex> = self
            .all_equipment()
            .filter(|(_, equipment)| equipment.kind().is_source())
            .flat_map(|(_, equipment)| equipment.terminals().iter().copied())
            .collect();

        for &terminal in &start_terminals {
            self.apply_nominal_phases(state, terminal, None)?;
        }
        self.flow_from_terminals(state, &start_terminals)
    }

    /// Applies the given phases (or the terminal's nominal phases) at a
    /// terminal and spreads them outward, for one network state.
    pub fn set_phases_from_terminal<St: NetworkStateOperators>(
        &mut self,
        state: St,
        terminal: NodeIndex,
        phases: Option<&[SinglePhaseKind]>,
    ) -> Result<(), Error> {
        self.apply_nominal_phases(state, terminal, phases)?;
        self.flow_from_terminals(state, &[terminal])
    }

    /// Spreads the phases already traced at a terminal outward without
    /// applying any new ones. Used to continue propagation after a repair.
    pub(crate) fn spread_phases_from<St: NetworkStateOperators>(
        &mut self,
        state: St,
        terminal: NodeIndex,
    ) -> Result<(), Error> {
        self.flow_from_terminals(state, &[terminal])
    }

    /// Spreads phases from one terminal of a piece of equipment to another,
    /// returning the nominal phases that changed on the target.
    pub(crate) fn spread_phases_internally<St: NetworkStateOperators>(
        &mut self,
        state: St,
        from_terminal: NodeIndex,
        to_terminal: NodeIndex,
        include_phases: Option<PhaseSet>,
    ) -> Result<PhaseSet, Error> {
        let paths: Vec<NominalPhasePath> = self
            .internal_phase_paths(from_terminal, to_terminal)?
            .into_iter()
            .filter(|path| {
                path.from_phase == SinglePhaseKind::None
                    || include_phases.map_or(true, |include| include.contains(path.from_phase))
            })
            .collect();
        self.flow_via_paths(state, from_terminal, to_terminal, &paths)
    }

    fn apply_nominal_phases<St: NetworkStateOperators>(
        &mut self,
        state: St,
        terminal: NodeIndex,
        phases: Option<&[SinglePhaseKind]>,
    ) -> Result<(), Error> {
        let nominal = self.terminal(terminal)?.phases().single_phases();
        let apply: Vec<SinglePhaseKind> = match phases {
            Some(phases) => {
                if phases.len() != nominal.len() {
                    let mrid = self.terminal(terminal)?.mrid().to_string();
                    return Err(Error::invalid_network(format!(
                        "Attempted to apply {} phase(s) to terminal {mrid} with {} nominal \
                         phase(s).",
                        phases.len(),
                        nominal.len()
                    )));
                }
                phases.to_vec()
            }
            None => nominal.to_vec(),
        };

        for (core, phase) in apply.into_iter().enumerate() {
            // placeholders stay unresolved until traced or inferred
            let phase = if phase.is_placeholder() {
                SinglePhaseKind::None
            } else {
                phase
            };
            if phase != SinglePhaseKind::None {
                state.set_phase(self, terminal, core, phase)?;
            }
        }
        Ok(())
    }

    fn flow_from_terminals<St: NetworkStateOperators>(
        &mut self,
        state: St,
        starts: &[NodeIndex],
    ) -> Result<(), Error> {
        // terminals with more phases flow first so that single-phase spurs
        // see settled phases on the backbone
        let mut queue = TraversalQueue::weighted(|item: &(NodeIndex, usize)| item.1);

        for &start in starts {
            let include = self.terminal(start)?.phases().phase_set();
            self.flow_externally_and_queue(state, start, include, &mut queue)?;
        }
        while let Some((terminal, _)) = queue.pop() {
            self.flow_through_and_queue(state, terminal, &mut queue)?;
        }
        Ok(())
    }

    fn flow_through_and_queue<St: NetworkStateOperators>(
        &mut self,
        state: St,
        terminal: NodeIndex,
        queue: &mut TraversalQueue<(NodeIndex, usize)>,
    ) -> Result<(), Error> {
        let equipment = self.equipment(self.terminal(terminal)?.equipment())?;
        if state.is_open(equipment) {
            return Ok(());
        }

        let phases_to_flow = self.terminal(terminal)?.phases().phase_set();
        for other in self.other_terminals(terminal) {
            let flowed =
                self.spread_phases_internally(state, terminal, other, Some(phases_to_flow))?;
            if !flowed.is_empty() {
                self.flow_externally_and_queue(state, other, flowed, queue)?;
            }
        }
        Ok(())
    }

    fn flow_externally_and_queue<St: NetworkStateOperators>(
        &mut self,
        state: St,
        from_terminal: NodeIndex,
        include_phases: PhaseSet,
        queue: &mut TraversalQueue<(NodeIndex, usize)>,
    ) -> Result<(), Error> {
        let results = self.connected_phase_paths(state, from_terminal, Some(include_phases))?;
        for result in results {
            let changed =
                self.flow_via_paths(state, from_terminal, result.to_terminal, &result.paths)?;
            if !changed.is_empty() {
                let weight = self.terminal(result.to_terminal)?.phases().num_phases();
                queue.push((result.to_terminal, weight));
            }
        }
        Ok(())
    }

    fn flow_via_paths<St: NetworkStateOperators>(
        &mut self,
        state: St,
        from_terminal: NodeIndex,
        to_terminal: NodeIndex,
        paths: &[NominalPhasePath],
    ) -> Result<PhaseSet, Error> {
        let mut changed = PhaseSet::new();
        for path in paths {
            let phase = if path.from_phase != SinglePhaseKind::None {
                let from = self.terminal(from_terminal)?;
                match from.phases().index_of(path.from_phase) {
                    Some(core) => state.phase(from, core),
                    None => continue,
                }
            } else if !path.to_phase.is_placeholder() {
                // a phase added by a transformer is energised from it
                path.to_phase
            } else {
                let to = self.terminal(to_terminal)?;
                match to.phases().index_of(path.to_phase) {
                    Some(core) => state.phase(to, core),
                    None => continue,
                }
            };
            if phase == SinglePhaseKind::None {
                continue;
            }

            let to = self.terminal(to_terminal)?;
            let Some(to_core) = to.phases().index_of(path.to_phase) else {
                continue;
            };
            let existing = state.phase(to, to_core);
            match state.set_phase(self, to_terminal, to_core, phase) {
                Ok(true) => changed.insert(path.to_phase),
                Ok(false) => {}
                Err(_) => {
                    let from_mrid = self.terminal(from_terminal)?.mrid();
                    let to_mrid = self.terminal(to_terminal)?.mrid();
                    return Err(Error::crossing_phases(format!(
                        "Attempted to flow conflicting phase {phase} onto {existing} on nominal \
                         phase path {} to {}, between {from_mrid} and {to_mrid}. This is caused \
                         by missing open points or incorrect phases in upstream equipment that \
                         should be corrected in the source data.",
                        path.from_phase, path.to_phase
                    )));
                }
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::test_utils::NetworkBuilder;
    use crate::state::{CurrentStateOperators, NormalStateOperators};
    use crate::PhaseCode;
    use SinglePhaseKind::{A, B, C, N, None as NoPhase};

    fn traced(network: &NetworkGraph, terminal: NodeIndex) -> Vec<SinglePhaseKind> {
        let terminal = network.terminal(terminal).unwrap();
        (0..terminal.phases().num_phases())
            .map(|core| NormalStateOperators.phase(terminal, core))
            .collect()
    }

    #[test]
    fn test_phases_flow_from_source() {
        let mut builder = NetworkBuilder::new();
        let source = builder.source("source");
        let line = builder.acls("line");
        let consumer = builder.consumer("consumer");
        builder.connect(source, 1, line, 1);
        builder.connect(line, 2, consumer, 1);
        let mut network = builder.build();

        network.set_phases(NormalStateOperators).unwrap();

        let t = network.terminal_at(consumer, 1).unwrap();
        assert_eq!(traced(&network, t), vec![A, B, C]);
        // the current state is untouched
        let terminal = network.terminal(t).unwrap();
        assert_eq!(CurrentStateOperators.phase(terminal, 0), NoPhase);
    }

    #[test]
    fn test_phases_stop_at_open_switch() {
        let mut builder = NetworkBuilder::new();
        let source = builder.source("source");
        let breaker = builder.breaker("breaker");
        let consumer = builder.consumer("consumer");
        builder.connect(source, 1, breaker, 1);
        builder.connect(breaker, 2, consumer, 1);
        let mut network = builder.build();
        network.set_normally_open(breaker, true).unwrap();

        network.set_phases(NormalStateOperators).unwrap();

        let b1 = network.terminal_at(breaker, 1).unwrap();
        let c1 = network.terminal_at(consumer, 1).unwrap();
        assert_eq!(traced(&network, b1), vec![A, B, C]);
        assert_eq!(traced(&network, c1), vec![NoPhase, NoPhase, NoPhase]);
    }

    #[test]
    fn test_xy_spur_resolves_while_tracing() {
        let mut builder = NetworkBuilder::new();
        let source = builder.source("source");
        let line = builder.acls("line");
        let spur = builder.acls_with_phases("spur", PhaseCode::XY);
        let consumer = builder.consumer_with_phases("consumer", PhaseCode::XY);
        builder.connect(source, 1, line, 1);
        builder.connect(line, 2, spur, 1);
        builder.connect(spur, 2, consumer, 1);
        let mut network = builder.build();

        network.set_phases(NormalStateOperators).unwrap();

        let s1 = network.terminal_at(spur, 1).unwrap();
        let c1 = network.terminal_at(consumer, 1).unwrap();
        assert_eq!(traced(&network, s1), vec![A, C]);
        assert_eq!(traced(&network, c1), vec![A, C]);
    }

    #[test]
    fn test_transformer_adds_neutral() {
        let mut builder = NetworkBuilder::new();
        let source = builder.source("source");
        let transformer = builder.transformer("tx", &[PhaseCode::ABC, PhaseCode::ABCN]);
        let consumer = builder.consumer_with_phases("consumer", PhaseCode::ABCN);
        builder.connect(source, 1, transformer, 1);
        builder.connect(transformer, 2, consumer, 1);
        let mut network = builder.build();

        network.set_phases(NormalStateOperators).unwrap();

        let t2 = network.terminal_at(transformer, 2).unwrap();
        assert_eq!(traced(&network, t2), vec![A, B, C, N]);
        let c1 = network.terminal_at(consumer, 1).unwrap();
        assert_eq!(traced(&network, c1), vec![A, B, C, N]);
    }

    #[test]
    fn test_junction_fans_out_without_conflicts() {
        let mut builder = NetworkBuilder::new();
        let source = builder.source("source");
        let junction = builder.junction("junction", 3);
        let consumer1 = builder.consumer("consumer1");
        let consumer2 = builder.consumer("consumer2");
        builder.connect(source, 1, junction, 1);
        builder.connect(junction, 2, consumer1, 1);
        builder.connect(junction, 3, consumer2, 1);
        let mut network = builder.build();

        network.set_phases(NormalStateOperators).unwrap();

        for consumer in [consumer1, consumer2] {
            let t = network.terminal_at(consumer, 1).unwrap();
            assert_eq!(traced(&network, t), vec![A, B, C]);
        }
    }

    #[test]
    fn test_idempotent() {
        let mut builder = NetworkBuilder::new();
        let source = builder.source("source");
        let line = builder.acls("line");
        builder.connect(source, 1, line, 1);
        let mut network = builder.build();

        network.set_phases(NormalStateOperators).unwrap();
        network.set_phases(NormalStateOperators).unwrap();

        let t = network.terminal_at(line, 2).unwrap();
        assert_eq!(traced(&network, t), vec![A, B, C]);
    }

    #[test]
    fn test_conflicting_phases_error() {
        let mut builder = NetworkBuilder::new();
        let source = builder.source("source");
        let line = builder.acls("line");
        builder.connect(source, 1, line, 1);
        let mut network = builder.build();

        network.set_phases(NormalStateOperators).unwrap();
        let t2 = network.terminal_at(line, 2).unwrap();
        let result =
            network.set_phases_from_terminal(NormalStateOperators, t2, Some(&[C, A, B]));
        assert!(result.is_err_and(|e| e.to_string().contains("Crossing phases")));
    }

    #[test]
    fn test_apply_phase_count_mismatch() {
        let mut builder = NetworkBuilder::new();
        let source = builder.source("source");
        let mut network = builder.build();

        let t1 = network.terminal_at(source, 1).unwrap();
        let result = network.set_phases_from_terminal(NormalStateOperators, t1, Some(&[A]));
        assert!(result.is_err_and(|e| e
            == Error::invalid_network(
                "Attempted to apply 1 phase(s) to terminal source-t1 with 3 nominal phase(s)."
            )));
    }
}
