// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Post-load sanity checks on a [`NetworkGraph`].

use tracing::warn;

use super::NetworkGraph;

/// `NetworkGraph` validation.
impl NetworkGraph {
    /// Checks the network for modelling problems that the tracing algorithms
    /// tolerate but that usually indicate bad source data.
    ///
    /// Findings are logged as warnings and returned; they are never errors.
    pub fn validate_network(&self) -> Vec<String> {
        let mut findings = Vec::new();

        for (_, equipment) in self.all_equipment() {
            if equipment.memberships.normal.feeders.is_empty()
                && equipment.memberships.normal.lv_feeders.is_empty()
                && equipment.sites.is_empty()
            {
                findings.push(format!(
                    "Equipment {} is not assigned to any container.",
                    equipment.mrid
                ));
            }

            if equipment.kind.is_source() {
                for &feeder_id in &equipment.memberships.normal.feeders {
                    let feeder = self.feeder(feeder_id);
                    let head_on_source = feeder
                        .head_terminal
                        .is_some_and(|head| equipment.terminals.contains(&head));
                    if !head_on_source {
                        findings.push(format!(
                            "Energy source {} is on feeder {} that does not start at it.",
                            equipment.mrid, feeder.mrid
                        ));
                    }
                }
            }
        }

        for finding in &findings {
            warn!("{finding}");
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::EquipmentRef;
    use crate::{EquipmentKind, PhaseCode};

    #[test]
    fn test_unassigned_equipment() {
        let mut network = NetworkGraph::new();
        network
            .add_equipment("line", EquipmentKind::AcLineSegment)
            .unwrap();

        assert_eq!(
            network.validate_network(),
            vec!["Equipment line is not assigned to any container."]
        );
    }

    #[test]
    fn test_source_off_feeder_head() {
        let mut network = NetworkGraph::new();
        let source = network
            .add_equipment("source", EquipmentKind::EnergySource)
            .unwrap();
        let t1 = network.add_terminal(source, PhaseCode::ABC).unwrap();
        let breaker = network
            .add_equipment("breaker", EquipmentKind::Breaker)
            .unwrap();
        network.add_terminal(breaker, PhaseCode::ABC).unwrap();
        let b2 = network.add_terminal(breaker, PhaseCode::ABC).unwrap();

        let feeder = network.add_feeder("feeder", Some(b2)).unwrap();
        network
            .equipment_mut(source)
            .unwrap()
            .memberships
            .normal
            .feeders
            .insert(feeder);
        network
            .feeder_mut(feeder)
            .contents
            .normal
            .equipment
            .insert(EquipmentRef::Conducting(source));

        let findings = network.validate_network();
        assert!(findings
            .contains(&"Energy source source is on feeder feeder that does not start at it.".to_string()));

        // a feeder headed on the source itself is fine
        let own_feeder = network.add_feeder("own-feeder", Some(t1)).unwrap();
        network
            .equipment_mut(source)
            .unwrap()
            .memberships
            .normal
            .feeders
            .insert(own_feeder);
        let findings = network.validate_network();
        assert!(!findings
            .iter()
            .any(|finding| finding.contains("own-feeder")));
    }
}
