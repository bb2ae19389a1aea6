// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the container and sub-object types held in arenas on a
//! [`NetworkGraph`][crate::NetworkGraph]: feeders, LV feeders, sites,
//! auxiliary equipment, the protection relay chain and power electronics
//! units, together with the typed ids used to address them.

use std::collections::BTreeSet;

use petgraph::graph::NodeIndex;

use crate::state::Dual;

/// A macro for defining the typed id of an arena entry.
macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub(crate) usize);
    };
}

arena_id!(
    /// The id of a [`Feeder`] within its network.
    FeederId
);
arena_id!(
    /// The id of an [`LvFeeder`] within its network.
    LvFeederId
);
arena_id!(
    /// The id of a [`Site`] within its network.
    SiteId
);
arena_id!(
    /// The id of an [`AuxiliaryEquipment`] within its network.
    AuxEquipmentId
);
arena_id!(
    /// The id of a [`ProtectionRelayFunction`] within its network.
    RelayFunctionId
);
arena_id!(
    /// The id of a [`ProtectionRelayScheme`] within its network.
    RelaySchemeId
);
arena_id!(
    /// The id of a [`ProtectionRelaySystem`] within its network.
    RelaySystemId
);
arena_id!(
    /// The id of a [`PowerElectronicsUnit`] within its network.
    UnitId
);

/// A reference to anything that can belong to a feeder's equipment set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EquipmentRef {
    Conducting(NodeIndex),
    Auxiliary(AuxEquipmentId),
    RelaySystem(RelaySystemId),
    Unit(UnitId),
}

/// The container memberships of a piece of equipment in one network state.
#[derive(Clone, Debug, Default)]
pub struct Memberships {
    pub(crate) feeders: BTreeSet<FeederId>,
    pub(crate) lv_feeders: BTreeSet<LvFeederId>,
}

/// The equipment and energization sets of a [`Feeder`] in one network state.
#[derive(Clone, Debug, Default)]
pub struct FeederContents {
    pub(crate) equipment: BTreeSet<EquipmentRef>,
    pub(crate) energized_lv_feeders: BTreeSet<LvFeederId>,
}

/// A medium/high voltage feeder: a grouping of equipment energized from a
/// distinguished head terminal.
#[derive(Clone, Debug)]
pub struct Feeder {
    pub(crate) mrid: String,
    pub(crate) head_terminal: Option<NodeIndex>,
    pub(crate) contents: Dual<FeederContents>,
}

impl Feeder {
    /// The mRID of the feeder.
    pub fn mrid(&self) -> &str {
        &self.mrid
    }

    /// The head terminal of the feeder, when set.
    pub fn head_terminal(&self) -> Option<NodeIndex> {
        self.head_terminal
    }
}

/// The equipment and energization sets of an [`LvFeeder`] in one network
/// state.
#[derive(Clone, Debug, Default)]
pub struct LvFeederContents {
    pub(crate) equipment: BTreeSet<EquipmentRef>,
    pub(crate) energizing_feeders: BTreeSet<FeederId>,
}

/// A low voltage feeder, energized by one or more [`Feeder`]s through a
/// transformer.
#[derive(Clone, Debug)]
pub struct LvFeeder {
    pub(crate) mrid: String,
    pub(crate) head_terminal: Option<NodeIndex>,
    pub(crate) contents: Dual<LvFeederContents>,
}

impl LvFeeder {
    /// The mRID of the LV feeder.
    pub fn mrid(&self) -> &str {
        &self.mrid
    }

    /// The head terminal of the LV feeder, when set.
    pub fn head_terminal(&self) -> Option<NodeIndex> {
        self.head_terminal
    }
}

/// A physical site grouping equipment, such as a substation yard or a pole
/// top. Used to find the LV feeders energized through a transformer.
#[derive(Clone, Debug)]
pub struct Site {
    pub(crate) mrid: String,
    pub(crate) equipment: BTreeSet<NodeIndex>,
}

impl Site {
    /// The mRID of the site.
    pub fn mrid(&self) -> &str {
        &self.mrid
    }
}

/// Equipment attached to a terminal without conducting through it, such as a
/// current transformer or a fault indicator.
#[derive(Clone, Debug)]
pub struct AuxiliaryEquipment {
    pub(crate) mrid: String,
    pub(crate) terminal: NodeIndex,
    pub(crate) memberships: Dual<Memberships>,
}

impl AuxiliaryEquipment {
    /// The mRID of the auxiliary equipment.
    pub fn mrid(&self) -> &str {
        &self.mrid
    }

    /// The terminal the auxiliary equipment is attached to.
    pub fn terminal(&self) -> NodeIndex {
        self.terminal
    }
}

/// A protection function hosted on a piece of equipment, such as an
/// overcurrent element in a relay.
#[derive(Clone, Debug)]
pub struct ProtectionRelayFunction {
    pub(crate) mrid: String,
    pub(crate) schemes: Vec<RelaySchemeId>,
}

impl ProtectionRelayFunction {
    /// The mRID of the relay function.
    pub fn mrid(&self) -> &str {
        &self.mrid
    }
}

/// A grouping of relay functions within a relay system.
#[derive(Clone, Debug)]
pub struct ProtectionRelayScheme {
    pub(crate) mrid: String,
    pub(crate) system: RelaySystemId,
    pub(crate) functions: Vec<RelayFunctionId>,
}

impl ProtectionRelayScheme {
    /// The mRID of the relay scheme.
    pub fn mrid(&self) -> &str {
        &self.mrid
    }
}

/// A protection relay system. Relay systems follow their protected equipment
/// into feeder membership.
#[derive(Clone, Debug)]
pub struct ProtectionRelaySystem {
    pub(crate) mrid: String,
    pub(crate) schemes: Vec<RelaySchemeId>,
    pub(crate) memberships: Dual<Memberships>,
}

impl ProtectionRelaySystem {
    /// The mRID of the relay system.
    pub fn mrid(&self) -> &str {
        &self.mrid
    }
}

/// A generation or storage unit owned by a power electronics connection.
#[derive(Clone, Debug)]
pub struct PowerElectronicsUnit {
    pub(crate) mrid: String,
    pub(crate) equipment: NodeIndex,
    pub(crate) memberships: Dual<Memberships>,
}

impl PowerElectronicsUnit {
    /// The mRID of the unit.
    pub fn mrid(&self) -> &str {
        &self.mrid
    }

    /// The power electronics connection that owns the unit.
    pub fn equipment(&self) -> NodeIndex {
        self.equipment
    }
}
