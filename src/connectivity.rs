// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Resolution of phase-level connectivity between terminals.
//!
//! Straight connections map shared phases one to one. When a terminal with
//! `X`/`Y` placeholders meets known phases, the placeholders are resolved by
//! collecting traced phases and viable candidates from around the junction
//! and the equipment beyond it.

mod phase_paths;
mod xy_candidates;

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use crate::network::NetworkGraph;
use crate::state::NetworkStateOperators;
use crate::{Error, NominalPhasePath, PhaseCode, PhaseSet, SinglePhaseKind};

pub(crate) use phase_paths::{transformer_phase_paths, ADD_NEUTRAL};
pub(crate) use xy_candidates::{is_after, is_before, X_PRIORITY, Y_PRIORITY};

use phase_paths::{straight_phase_paths, viable_candidates};
use xy_candidates::XyCandidatePhasePaths;

/// The phase-level connectivity between two terminals at a junction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectivityResult {
    pub from_terminal: NodeIndex,
    pub to_terminal: NodeIndex,
    pub paths: Vec<NominalPhasePath>,
}

/// A pending placeholder search step: a terminal to inspect, carrying the
/// placeholder code the search started from.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct XyPhaseStep {
    terminal: NodeIndex,
    phase_code: PhaseCode,
}

impl NetworkGraph {
    /// The terminals connected to `terminal` at its junction, with the phase
    /// paths between them. Results without any phase path are omitted.
    ///
    /// `phases` restricts the paths to those leaving on one of the given
    /// phases; by default all of the terminal's nominal phases are included.
    pub fn connected_phase_paths<St: NetworkStateOperators>(
        &self,
        state: St,
        terminal: NodeIndex,
        phases: Option<PhaseSet>,
    ) -> Result<Vec<ConnectivityResult>, Error> {
        let terminal_phases = self.terminal(terminal)?.phases();
        let include_phases = phases.unwrap_or_else(|| terminal_phases.phase_set());

        let mut results = Vec::new();
        for connected in self.connected_terminals(terminal) {
            let connected_phases = self.terminal(connected)?.phases();
            let paths: Vec<NominalPhasePath> =
                match straight_phase_paths(terminal_phases, connected_phases) {
                    Some(paths) => paths,
                    None => self.xy_phase_paths(state, terminal, terminal_phases, connected_phases)?,
                }
                .into_iter()
                .filter(|path| {
                    include_phases.contains(path.from_phase)
                        && terminal_phases.contains(path.from_phase)
                        && connected_phases.contains(path.to_phase)
                })
                .collect();

            if !paths.is_empty() {
                results.push(ConnectivityResult {
                    from_terminal: terminal,
                    to_terminal: connected,
                    paths,
                });
            }
        }

        Ok(results)
    }

    /// The phase paths from one terminal of a piece of equipment to another
    /// terminal of the same equipment.
    ///
    /// Transformers follow the winding table; everything else carries shared
    /// phases straight through, with placeholders mapped by core position.
    pub fn internal_phase_paths(
        &self,
        from_terminal: NodeIndex,
        to_terminal: NodeIndex,
    ) -> Result<Vec<NominalPhasePath>, Error> {
        let from = self.terminal(from_terminal)?;
        let to = self.terminal(to_terminal)?;
        let equipment = self.equipment(from.equipment())?;

        if equipment.kind().is_transformer() {
            return Ok(transformer_phase_paths(from.phases(), to.phases()).to_vec());
        }

        let from_phases = from.phases();
        let to_phases = to.phases();
        let cross_family = straight_phase_paths(from_phases, to_phases).is_none();

        let mut paths = Vec::new();
        for &phase in from_phases.single_phases() {
            if to_phases.contains(phase) {
                paths.push(NominalPhasePath::new(phase, phase));
            } else if cross_family && phase != SinglePhaseKind::N {
                // map placeholder cores onto known cores by position
                let index = from_phases.without_neutral().index_of(phase);
                if let Some(index) = index {
                    if let Some(&to_phase) =
                        to_phases.without_neutral().single_phases().get(index)
                    {
                        paths.push(NominalPhasePath::new(phase, to_phase));
                    }
                }
            }
        }
        Ok(paths)
    }

    fn xy_phase_paths<St: NetworkStateOperators>(
        &self,
        state: St,
        terminal: NodeIndex,
        terminal_phases: PhaseCode,
        connected_phases: PhaseCode,
    ) -> Result<Vec<NominalPhasePath>, Error> {
        let terminal_has_xy = terminal_phases.xy_family() != PhaseCode::None;
        let connected_has_xy = connected_phases.xy_family() != PhaseCode::None;
        if terminal_has_xy == connected_has_xy {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        if terminal_phases.contains(SinglePhaseKind::N)
            && connected_phases.contains(SinglePhaseKind::N)
        {
            paths.push(NominalPhasePath::new(SinglePhaseKind::N, SinglePhaseKind::N));
        }

        let Some(node) = self.connectivity_node_of(terminal) else {
            return Ok(paths);
        };
        let candidates = self.xy_candidate_phases(state, node)?;
        let (x_phase, y_phase) = candidates.calculate_paths();
        for (from_phase, to_phase) in [
            (SinglePhaseKind::X, x_phase),
            (SinglePhaseKind::Y, y_phase),
        ] {
            let touches_terminal = terminal_phases.contains(from_phase)
                || terminal_phases.contains(to_phase);
            if to_phase != SinglePhaseKind::None && touches_terminal {
                if terminal_has_xy {
                    paths.push(NominalPhasePath::new(from_phase, to_phase));
                } else {
                    paths.push(NominalPhasePath::new(to_phase, from_phase));
                }
            }
        }

        Ok(paths)
    }

    /// Collects the known and candidate phases for the placeholders present
    /// at a junction, searching outward through closed equipment until a
    /// traced phase pins them down.
    fn xy_candidate_phases<St: NetworkStateOperators>(
        &self,
        state: St,
        node: NodeIndex,
    ) -> Result<XyCandidatePhasePaths, Error> {
        let node_terminals: Vec<NodeIndex> = self.graph.neighbors(node).collect();

        let mut xy_terminals = Vec::new();
        let mut primary_codes = Vec::new();
        for &node_terminal in &node_terminals {
            let phases = self.terminal(node_terminal)?.phases();
            if phases.xy_family() != PhaseCode::None {
                xy_terminals.push((node_terminal, phases.xy_family()));
            }
            if phases.primary_family() != PhaseCode::None {
                primary_codes.push(phases.primary_family());
            }
        }

        let mut candidates = XyCandidatePhasePaths::new();
        let mut queue: Vec<XyPhaseStep> = Vec::new();
        let mut visited: HashSet<XyPhaseStep> = HashSet::new();

        for &(xy_terminal, xy_code) in &xy_terminals {
            for &primary_code in &primary_codes {
                for &(phase, viable) in viable_candidates(xy_code, primary_code) {
                    candidates.add_candidates(phase, viable.iter().copied());
                }
            }
            self.find_more_xy_candidates(
                state,
                XyPhaseStep {
                    terminal: xy_terminal,
                    phase_code: xy_code,
                },
                &mut visited,
                &mut queue,
                &mut candidates,
            )?;
        }

        while let Some(step) = queue.pop() {
            self.find_more_xy_candidates(state, step, &mut visited, &mut queue, &mut candidates)?;
        }

        Ok(candidates)
    }

    fn find_more_xy_candidates<St: NetworkStateOperators>(
        &self,
        state: St,
        step: XyPhaseStep,
        visited: &mut HashSet<XyPhaseStep>,
        queue: &mut Vec<XyPhaseStep>,
        candidates: &mut XyCandidatePhasePaths,
    ) -> Result<(), Error> {
        if !visited.insert(step) {
            return Ok(());
        }

        let terminal = self.terminal(step.terminal)?;
        let without_neutral = terminal.phases().without_neutral();
        if without_neutral.contains(SinglePhaseKind::X)
            || without_neutral.contains(SinglePhaseKind::Y)
        {
            let mut found_traced = false;
            for placeholder in [SinglePhaseKind::X, SinglePhaseKind::Y] {
                if let Some(core) = terminal.phases().index_of(placeholder) {
                    let traced = state.phase(terminal, core);
                    if traced != SinglePhaseKind::None {
                        candidates.add_known(placeholder, traced);
                        found_traced = true;
                    }
                }
            }
            if !found_traced {
                self.queue_next_xy_steps(state, step.terminal, without_neutral, queue)?;
            }
        } else {
            for &(phase, viable) in viable_candidates(step.phase_code, without_neutral) {
                candidates.add_candidates(phase, viable.iter().copied());
            }
        }

        Ok(())
    }

    fn queue_next_xy_steps<St: NetworkStateOperators>(
        &self,
        state: St,
        terminal: NodeIndex,
        phase_code: PhaseCode,
        queue: &mut Vec<XyPhaseStep>,
    ) -> Result<(), Error> {
        let equipment_index = self.terminal(terminal)?.equipment();
        let equipment = self.equipment(equipment_index)?;
        if state.is_open(equipment) {
            return Ok(());
        }

        for other in self.other_terminals(terminal) {
            for connected in self.connected_terminals(other) {
                if self.terminal(connected)?.equipment() != equipment_index {
                    queue.push(XyPhaseStep {
                        terminal: connected,
                        phase_code,
                    });
                }
            }
        }
        Ok(())
    }
}
