// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Feeder direction removal, used when an open point splits a feeder.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use petgraph::graph::NodeIndex;

use crate::network::NetworkGraph;
use crate::state::NetworkStateOperators;
use crate::trace::{ActionType, NetworkTrace};
use crate::{Error, FeederDirection};

impl NetworkGraph {
    /// Clears feeder directions outward from the given terminal, for one
    /// network state.
    ///
    /// The clearing stops at open points and at terminals that carry no
    /// direction. Returns the feeder head terminals that were cleared, so
    /// directions can be reapplied for the parts still fed from a head.
    pub fn clear_feeder_directions<St: NetworkStateOperators + 'static>(
        &mut self,
        state: St,
        terminal: NodeIndex,
    ) -> Result<Vec<NodeIndex>, Error> {
        let mut trace = NetworkTrace::new(state, NetworkTrace::weighted_queue());
        trace.stop_at_open(state);
        trace.add_queue_condition(move |graph, next, _, _, _| {
            graph
                .terminal(next.to_terminal)
                .map(|terminal| state.direction(terminal) != FeederDirection::None)
                .unwrap_or(false)
        });

        let heads = Rc::new(RefCell::new(BTreeSet::new()));
        let action_heads = heads.clone();
        trace.add_step_action(ActionType::AllSteps, move |graph, path, _| {
            if graph.is_feeder_head_terminal(path.to_terminal) {
                action_heads.borrow_mut().insert(path.to_terminal);
            }
            state.set_direction(graph.terminal_mut(path.to_terminal)?, FeederDirection::None);
            Ok(())
        });

        trace.run(self, terminal, false)?;
        let heads = heads.borrow().iter().copied().collect();
        Ok(heads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::test_utils::NetworkBuilder;
    use crate::state::NormalStateOperators;
    use FeederDirection::{Downstream, None as NoDirection, Upstream};

    fn direction(network: &NetworkGraph, terminal: NodeIndex) -> FeederDirection {
        NormalStateOperators.direction(network.terminal(terminal).unwrap())
    }

    #[test]
    fn test_clearing_stops_at_a_new_open_point() {
        let mut builder = NetworkBuilder::new();
        let breaker = builder.breaker("breaker");
        let switch = builder.breaker("switch");
        let consumer = builder.consumer("consumer");
        builder.connect(breaker, 2, switch, 1);
        builder.connect(switch, 2, consumer, 1);
        builder.feeder("feeder", breaker, 2);
        let mut network = builder.build();

        network.set_feeder_directions(NormalStateOperators).unwrap();
        network.set_normally_open(switch, true).unwrap();

        let s2 = network.terminal_at(switch, 2).unwrap();
        let heads = network
            .clear_feeder_directions(NormalStateOperators, s2)
            .unwrap();

        // the de-energized side is cleared, the fed side keeps its direction
        assert!(heads.is_empty());
        let s1 = network.terminal_at(switch, 1).unwrap();
        let c1 = network.terminal_at(consumer, 1).unwrap();
        assert_eq!(direction(&network, s1), Upstream);
        assert_eq!(direction(&network, s2), NoDirection);
        assert_eq!(direction(&network, c1), NoDirection);
    }

    #[test]
    fn test_clear_and_reapply_round_trip() {
        let mut builder = NetworkBuilder::new();
        let breaker = builder.breaker("breaker");
        let line = builder.acls("line");
        let consumer = builder.consumer("consumer");
        builder.connect(breaker, 2, line, 1);
        builder.connect(line, 2, consumer, 1);
        builder.feeder("feeder", breaker, 2);
        let mut network = builder.build();

        network.set_feeder_directions(NormalStateOperators).unwrap();

        let head = network.terminal_at(breaker, 2).unwrap();
        let heads = network
            .clear_feeder_directions(NormalStateOperators, head)
            .unwrap();
        assert_eq!(heads, vec![head]);

        let l1 = network.terminal_at(line, 1).unwrap();
        let l2 = network.terminal_at(line, 2).unwrap();
        assert_eq!(direction(&network, l1), NoDirection);
        assert_eq!(direction(&network, l2), NoDirection);

        for head in heads {
            network
                .set_directions_from_terminal(NormalStateOperators, head)
                .unwrap();
        }
        assert_eq!(direction(&network, head), Downstream);
        assert_eq!(direction(&network, l1), Upstream);
        assert_eq!(direction(&network, l2), Downstream);
    }
}
