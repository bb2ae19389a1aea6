// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The tracing algorithms that derive state from the network's topology:
//! feeder directions, traced phases, phase inference and feeder assignment,
//! plus the pipeline that runs them all after loading a network.

mod assign_to_feeders;
mod assign_to_lv_feeders;
mod clear_direction;
mod phase_inferrer;
mod set_direction;
mod set_phases;

use std::collections::BTreeMap;

use tracing::warn;

use crate::config::NetworkProcessingConfig;
use crate::network::NetworkGraph;
use crate::state::{CurrentStateOperators, NormalStateOperators};
use crate::Error;

pub use phase_inferrer::InferredPhase;

/// What the post-load processing inferred and found.
#[derive(Debug, Default)]
pub struct NetworkProcessingReport {
    /// Equipment that had phases inferred, across both network states.
    pub inferred_phases: Vec<InferredPhase>,
    /// Findings of the post-load validation.
    pub validation_findings: Vec<String>,
}

impl NetworkGraph {
    /// Runs the full post-load pipeline on both network states: feeder
    /// directions, traced phases, phase inference, feeder and LV feeder
    /// assignment, and validation.
    ///
    /// Inference and validation can be skipped through the config; their
    /// findings are logged as warnings and returned in the report.
    pub fn process_network(
        &mut self,
        config: &NetworkProcessingConfig,
    ) -> Result<NetworkProcessingReport, Error> {
        self.set_feeder_directions(NormalStateOperators)?;
        self.set_feeder_directions(CurrentStateOperators)?;
        self.set_phases(NormalStateOperators)?;
        self.set_phases(CurrentStateOperators)?;

        let mut report = NetworkProcessingReport::default();
        if !config.skip_phase_inference {
            let mut merged = BTreeMap::new();
            for state_inferences in [
                self.infer_phases(NormalStateOperators)?,
                self.infer_phases(CurrentStateOperators)?,
            ] {
                for inferred in state_inferences {
                    merged.insert(inferred.equipment, inferred.suspect);
                }
            }
            report.inferred_phases = merged
                .into_iter()
                .map(|(equipment, suspect)| InferredPhase { equipment, suspect })
                .collect();
            self.report_inferred_phases(&report.inferred_phases);
        }

        self.assign_equipment_to_feeders(NormalStateOperators)?;
        self.assign_equipment_to_feeders(CurrentStateOperators)?;
        self.assign_equipment_to_lv_feeders(NormalStateOperators)?;
        self.assign_equipment_to_lv_feeders(CurrentStateOperators)?;

        if !config.skip_validation {
            report.validation_findings = self.validate_network();
        }
        Ok(report)
    }

    fn report_inferred_phases(&self, inferred: &[InferredPhase]) {
        for inference in inferred {
            let mrid = match self.equipment(inference.equipment) {
                Ok(equipment) => equipment.mrid(),
                Err(_) => continue,
            };
            if inference.suspect {
                warn!(
                    "*** Action Required *** Inferred missing phases for [{mrid}] which may \
                     not be correct. The phases were inferred due to a disconnected nominal \
                     phase because of an upstream error in the source data. Phasing information \
                     for the upstream equipment should be fixed in the source system."
                );
            } else {
                warn!(
                    "*** Action Required *** Inferred missing phase for [{mrid}] which should \
                     be correct. The phase was inferred due to a disconnected nominal phase \
                     because of an upstream error in the source data. Phasing information for \
                     the upstream equipment should be fixed in the source system."
                );
            }
        }
    }
}
