// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Inference of traced phases that tracing could not resolve, caused by
//! phasing gaps in the source data.

use std::collections::BTreeMap;

use petgraph::graph::NodeIndex;

use crate::connectivity::{is_after, is_before, X_PRIORITY, Y_PRIORITY};
use crate::network::NetworkGraph;
use crate::state::NetworkStateOperators;
use crate::{Error, FeederDirection, SinglePhaseKind, Terminal};

/// A record of inferred phases on a piece of equipment.
///
/// A `suspect` inference filled a placeholder from priority order rather
/// than the nominal phase, so it may not match the actual wiring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InferredPhase {
    pub equipment: NodeIndex,
    pub suspect: bool,
}

impl NetworkGraph {
    /// Infers traced phases that phase propagation left unresolved, for one
    /// network state.
    ///
    /// Terminals that are connected to phased neighbors but still carry
    /// unresolved cores get their nominal phases, and unresolved `X`/`Y`
    /// placeholders fall back to priority order. Each repaired terminal
    /// spreads its phases onward before the next is considered.
    ///
    /// Returns the equipment that had phases inferred; the caller decides
    /// how to report them.
    pub fn infer_phases<St: NetworkStateOperators>(
        &mut self,
        state: St,
    ) -> Result<Vec<InferredPhase>, Error> {
        let mut tracking: BTreeMap<NodeIndex, bool> = BTreeMap::new();

        loop {
            let missing = self.terminals_missing_phases(state)?;
            let missing_xy: Vec<NodeIndex> = missing
                .iter()
                .copied()
                .filter(|&terminal| {
                    self.terminal(terminal).is_ok_and(|t| {
                        t.phases().contains(SinglePhaseKind::X)
                            || t.phases().contains(SinglePhaseKind::Y)
                    })
                })
                .collect();

            let did_nominal = self.infer_over(state, &missing, None, &mut tracking)?;
            let did_xy_1 = self.infer_over(state, &missing_xy, Some(1), &mut tracking)?;
            let did_xy_4 = self.infer_over(state, &missing_xy, Some(4), &mut tracking)?;

            if !(did_nominal || did_xy_1 || did_xy_4) {
                break;
            }
        }

        Ok(tracking
            .into_iter()
            .map(|(equipment, suspect)| InferredPhase { equipment, suspect })
            .collect())
    }

    /// Connected terminals that still have an unresolved core.
    fn terminals_missing_phases<St: NetworkStateOperators>(
        &self,
        state: St,
    ) -> Result<Vec<NodeIndex>, Error> {
        let mut missing = Vec::new();
        for (index, terminal) in self.all_terminals() {
            if !self.connected_terminals(index).is_empty() && has_none_phase(state, terminal) {
                missing.push(index);
            }
        }
        Ok(missing)
    }

    /// Runs one inference processor over the candidate terminals until it
    /// stops making progress. `max_xy` of `None` fills non-placeholder cores
    /// from the nominal phases; otherwise placeholders are inferred, up to
    /// the given number of unresolved cores per terminal.
    fn infer_over<St: NetworkStateOperators>(
        &mut self,
        state: St,
        terminals: &[NodeIndex],
        max_xy: Option<usize>,
        tracking: &mut BTreeMap<NodeIndex, bool>,
    ) -> Result<bool, Error> {
        let mut to_process = self.terminals_at_start_of_missing(state, terminals)?;
        let mut has_processed = false;
        loop {
            let mut continue_processing = false;
            for &terminal in &to_process {
                let did = match max_xy {
                    None => self.set_missing_to_nominal(state, terminal, tracking)?,
                    Some(max) => self.infer_xy_phases(state, terminal, max, tracking)?,
                };
                continue_processing = did || continue_processing;
            }

            to_process = self.terminals_at_start_of_missing(state, terminals)?;
            has_processed = has_processed || continue_processing;
            if !continue_processing {
                break;
            }
        }
        Ok(has_processed)
    }

    /// Narrows the candidates to terminals right at the edge of the missing
    /// phases, preferring those fed from a downstream-facing neighbor.
    fn terminals_at_start_of_missing<St: NetworkStateOperators>(
        &self,
        state: St,
        terminals: &[NodeIndex],
    ) -> Result<Vec<NodeIndex>, Error> {
        let down_to_up = self.missing_candidates(state, terminals, true, true)?;
        if !down_to_up.is_empty() {
            return Ok(down_to_up);
        }
        let down_to_any = self.missing_candidates(state, terminals, false, true)?;
        if !down_to_any.is_empty() {
            return Ok(down_to_any);
        }
        self.missing_candidates(state, terminals, false, false)
    }

    fn missing_candidates<St: NetworkStateOperators>(
        &self,
        state: St,
        terminals: &[NodeIndex],
        require_upstream: bool,
        require_downstream_neighbor: bool,
    ) -> Result<Vec<NodeIndex>, Error> {
        let mut candidates = Vec::new();
        for &index in terminals {
            let terminal = self.terminal(index)?;
            if !has_none_phase(state, terminal) {
                continue;
            }
            if require_upstream && !state.direction(terminal).has(FeederDirection::Upstream) {
                continue;
            }

            let has_phased_neighbor = self.connected_terminals(index).into_iter().any(|other| {
                self.terminal(other).is_ok_and(|other| {
                    let direction_fits = !require_downstream_neighbor
                        || state.direction(other).has(FeederDirection::Downstream);
                    direction_fits && !has_none_phase(state, other)
                })
            });
            if has_phased_neighbor {
                candidates.push(index);
            }
        }
        Ok(candidates)
    }

    fn set_missing_to_nominal<St: NetworkStateOperators>(
        &mut self,
        state: St,
        terminal: NodeIndex,
        tracking: &mut BTreeMap<NodeIndex, bool>,
    ) -> Result<bool, Error> {
        let (equipment, nominal) = {
            let terminal = self.terminal(terminal)?;
            (terminal.equipment(), terminal.phases().single_phases().to_vec())
        };
        let to_process: Vec<(usize, SinglePhaseKind)> = nominal
            .into_iter()
            .enumerate()
            .filter(|&(core, phase)| {
                !phase.is_placeholder()
                    && self
                        .terminal(terminal)
                        .is_ok_and(|t| state.phase(t, core) == SinglePhaseKind::None)
            })
            .collect();

        if to_process.is_empty() {
            return Ok(false);
        }
        for (core, phase) in to_process {
            state.set_phase(self, terminal, core, phase)?;
        }
        self.continue_phases(state, terminal)?;
        tracking.insert(equipment, false);
        Ok(true)
    }

    fn infer_xy_phases<St: NetworkStateOperators>(
        &mut self,
        state: St,
        terminal: NodeIndex,
        max_missing_phases: usize,
        tracking: &mut BTreeMap<NodeIndex, bool>,
    ) -> Result<bool, Error> {
        let mut none: Vec<(usize, SinglePhaseKind)> = Vec::new();
        let mut used_phases: Vec<SinglePhaseKind> = Vec::new();
        let equipment = {
            let terminal = self.terminal(terminal)?;
            for (core, &nominal) in terminal.phases().single_phases().iter().enumerate() {
                let phase = state.phase(terminal, core);
                if phase == SinglePhaseKind::None {
                    none.push((core, nominal));
                } else if !used_phases.contains(&phase) {
                    used_phases.push(phase);
                }
            }
            terminal.equipment()
        };

        if none.is_empty() || none.len() > max_missing_phases {
            return Ok(false);
        }
        tracking.insert(equipment, true);

        let mut had_changes = false;
        for (core, nominal) in none {
            // the paired placeholder is re-read each round so an X inferred
            // this round constrains the Y that follows it
            let new_phase = match nominal {
                SinglePhaseKind::X => {
                    let traced_y = self.traced_placeholder(state, terminal, SinglePhaseKind::Y)?;
                    first_unused(&X_PRIORITY, &used_phases, |phase| {
                        is_before(phase, Some(traced_y))
                    })
                }
                SinglePhaseKind::Y => {
                    let traced_x = self.traced_placeholder(state, terminal, SinglePhaseKind::X)?;
                    first_unused(&Y_PRIORITY, &used_phases, |phase| {
                        is_after(phase, Some(traced_x))
                    })
                }
                _ => continue,
            };

            if new_phase != SinglePhaseKind::None {
                state.set_phase(self, terminal, core, new_phase)?;
                used_phases.push(new_phase);
                had_changes = true;
            }
        }

        self.continue_phases(state, terminal)?;
        Ok(had_changes)
    }

    /// The traced phase of the given placeholder core, or `NONE` when the
    /// terminal has no such core.
    fn traced_placeholder<St: NetworkStateOperators>(
        &self,
        state: St,
        terminal: NodeIndex,
        placeholder: SinglePhaseKind,
    ) -> Result<SinglePhaseKind, Error> {
        let terminal = self.terminal(terminal)?;
        Ok(terminal
            .phases()
            .index_of(placeholder)
            .map(|core| state.phase(terminal, core))
            .unwrap_or(SinglePhaseKind::None))
    }

    /// Spreads repaired phases through the terminal's equipment and onward
    /// through the network.
    fn continue_phases<St: NetworkStateOperators>(
        &mut self,
        state: St,
        terminal: NodeIndex,
    ) -> Result<(), Error> {
        for other in self.other_terminals(terminal) {
            self.spread_phases_internally(state, terminal, other, None)?;
            self.spread_phases_from(state, other)?;
        }
        Ok(())
    }
}

fn has_none_phase<St: NetworkStateOperators>(state: St, terminal: &Terminal) -> bool {
    (0..terminal.phases().num_phases())
        .any(|core| state.phase(terminal, core) == SinglePhaseKind::None)
}

fn first_unused(
    priority: &[SinglePhaseKind],
    used: &[SinglePhaseKind],
    validate: impl Fn(SinglePhaseKind) -> bool,
) -> SinglePhaseKind {
    priority
        .iter()
        .copied()
        .find(|phase| !used.contains(phase) && validate(*phase))
        .unwrap_or(SinglePhaseKind::None)
}
