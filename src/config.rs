// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Options for the post-load processing pipeline.

/// Options controlling [`NetworkGraph::process_network`][pn].
///
/// The default runs every stage.
///
/// [pn]: crate::NetworkGraph::process_network
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetworkProcessingConfig {
    /// Skip inferring phases that tracing could not resolve.
    pub skip_phase_inference: bool,
    /// Skip the post-load validation checks.
    pub skip_validation: bool,
}
