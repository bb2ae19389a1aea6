// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The generic traversal engine and its network-aware specialization.

mod network_trace;
mod queue;
mod traversal;

pub use network_trace::{ActionType, NetworkTrace, TracePath};
pub use queue::{Tracker, TraversalQueue};
pub use traversal::{StepContext, Traversal};
