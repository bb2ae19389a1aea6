// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

/*!
# Frequenz Distribution Network Graph

This is a library for representing an electrical distribution network as a
graph of conducting equipment joined through terminals and connectivity
nodes, and for tracing that graph to derive the state that operating the
network depends on: traced phases, feeder directions and feeder membership.

## The network graph

The main struct is [`NetworkGraph`]. Equipment, terminals and connectivity
nodes are added one by one and wired together with
[`connect_terminals`][NetworkGraph::connect_terminals]; feeders, LV feeders,
sites, auxiliary equipment, protection relays and power electronics units
are layered on top of the conducting topology.

Everything derived is kept twice, once for the *normal* (as designed) state
of the network and once for the *current* (as operating) state. The two
records are addressed through the [`NetworkStateOperators`] trait and its
two implementations, [`NormalStateOperators`] and [`CurrentStateOperators`],
so every tracing algorithm runs unchanged against either state.

## Tracing

The tracing algorithms are methods on [`NetworkGraph`], each taking a state
operator value:

- [`set_phases`][NetworkGraph::set_phases] traces nominal phases outward
  from the energy sources, resolving `X`/`Y` placeholder phases as it goes.
- [`infer_phases`][NetworkGraph::infer_phases] repairs phases that tracing
  could not resolve because of gaps in the source data.
- [`set_feeder_directions`][NetworkGraph::set_feeder_directions] and
  [`clear_feeder_directions`][NetworkGraph::clear_feeder_directions] apply
  and remove the per-terminal direction relative to the feeder head.
- [`assign_equipment_to_feeders`][NetworkGraph::assign_equipment_to_feeders]
  and
  [`assign_equipment_to_lv_feeders`][NetworkGraph::assign_equipment_to_lv_feeders]
  group equipment under the feeders energizing it.

[`process_network`][NetworkGraph::process_network] runs the whole pipeline
on both states after a network is loaded, driven by a
[`NetworkProcessingConfig`].

All of these are built on a small traversal toolkit ([`Traversal`],
[`NetworkTrace`], [`TraversalQueue`], [`Tracker`]) which is public for
writing custom traces.
*/

mod config;
pub use config::NetworkProcessingConfig;

mod connectivity;
pub use connectivity::ConnectivityResult;

mod containers;
pub use containers::{
    AuxEquipmentId, AuxiliaryEquipment, EquipmentRef, Feeder, FeederContents, FeederId, LvFeeder,
    LvFeederContents, LvFeederId, Memberships, PowerElectronicsUnit, ProtectionRelayFunction,
    ProtectionRelayScheme, ProtectionRelaySystem, RelayFunctionId, RelaySchemeId, RelaySystemId,
    Site, SiteId, UnitId,
};

mod direction;
pub use direction::FeederDirection;

mod equipment;
pub use equipment::{
    ConductingEquipment, ConnectivityNode, EquipmentState, Terminal, TerminalState,
};

mod equipment_kind;
pub use equipment_kind::EquipmentKind;

mod error;
pub use error::Error;

mod network;
pub use network::{iterators, NetworkGraph};

mod phase;
pub use phase::{NominalPhasePath, PhaseCode, PhaseSet, SinglePhaseKind};

mod state;
pub use state::{CurrentStateOperators, Dual, NetworkStateOperators, NormalStateOperators};

mod trace;
pub use trace::{
    ActionType, NetworkTrace, StepContext, TracePath, Tracker, Traversal, TraversalQueue,
};

mod traces;
pub use traces::{InferredPhase, NetworkProcessingReport};
