// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the `EquipmentKind` enum, which represents the kind of
//! a piece of conducting equipment.

use std::fmt::Display;

/// Represents the kind of a piece of conducting equipment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EquipmentKind {
    EnergySource,
    EnergyConsumer,
    AcLineSegment,
    Junction,
    Breaker,
    Disconnector,
    Fuse,
    Recloser,
    PowerTransformer,
    PowerElectronicsConnection,
}

impl EquipmentKind {
    /// Whether equipment of this kind can be opened and closed.
    pub fn is_switch(self) -> bool {
        matches!(
            self,
            EquipmentKind::Breaker
                | EquipmentKind::Disconnector
                | EquipmentKind::Fuse
                | EquipmentKind::Recloser
        )
    }

    /// Whether equipment of this kind energizes the network.
    pub fn is_source(self) -> bool {
        self == EquipmentKind::EnergySource
    }

    /// Whether equipment of this kind transforms between voltage levels.
    pub fn is_transformer(self) -> bool {
        self == EquipmentKind::PowerTransformer
    }

    /// Whether equipment of this kind is a passive conductor.
    pub fn is_conductor(self) -> bool {
        self == EquipmentKind::AcLineSegment
    }
}

impl Display for EquipmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EquipmentKind::EnergySource => write!(f, "EnergySource"),
            EquipmentKind::EnergyConsumer => write!(f, "EnergyConsumer"),
            EquipmentKind::AcLineSegment => write!(f, "AcLineSegment"),
            EquipmentKind::Junction => write!(f, "Junction"),
            EquipmentKind::Breaker => write!(f, "Breaker"),
            EquipmentKind::Disconnector => write!(f, "Disconnector"),
            EquipmentKind::Fuse => write!(f, "Fuse"),
            EquipmentKind::Recloser => write!(f, "Recloser"),
            EquipmentKind::PowerTransformer => write!(f, "PowerTransformer"),
            EquipmentKind::PowerElectronicsConnection => write!(f, "PowerElectronicsConnection"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(EquipmentKind::Breaker.is_switch());
        assert!(EquipmentKind::Fuse.is_switch());
        assert!(!EquipmentKind::AcLineSegment.is_switch());
        assert!(EquipmentKind::EnergySource.is_source());
        assert!(EquipmentKind::PowerTransformer.is_transformer());
        assert!(!EquipmentKind::PowerTransformer.is_switch());
        assert!(EquipmentKind::AcLineSegment.is_conductor());
    }
}
