// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Feeder direction application from feeder head terminals.

use petgraph::graph::NodeIndex;

use crate::network::NetworkGraph;
use crate::state::NetworkStateOperators;
use crate::trace::{Tracker, TraversalQueue};
use crate::{Error, FeederDirection};

impl NetworkGraph {
    /// Applies feeder directions from every feeder head terminal, for one
    /// network state.
    ///
    /// Head terminals become `DOWNSTREAM`, terminals facing back toward a
    /// head become `UPSTREAM`, and terminals on loops fed from two paths
    /// accumulate `BOTH`.
    pub fn set_feeder_directions<St: NetworkStateOperators>(
        &mut self,
        state: St,
    ) -> Result<(), Error> {
        let heads: Vec<NodeIndex> = self
            .feeders
            .iter()
            .filter_map(|feeder| feeder.head_terminal)
            .collect();
        let mut tracker = Tracker::new();
        for head in heads {
            self.apply_directions_from(state, head, &mut tracker)?;
        }
        Ok(())
    }

    /// Applies `DOWNSTREAM` at the given terminal and flows directions
    /// onward from it, for one network state.
    pub fn set_directions_from_terminal<St: NetworkStateOperators>(
        &mut self,
        state: St,
        terminal: NodeIndex,
    ) -> Result<(), Error> {
        self.apply_directions_from(state, terminal, &mut Tracker::new())
    }

    fn apply_directions_from<St: NetworkStateOperators>(
        &mut self,
        state: St,
        start: NodeIndex,
        tracker: &mut Tracker<NodeIndex>,
    ) -> Result<(), Error> {
        let mut queue = TraversalQueue::fifo();
        queue.push(start);
        while let Some(terminal) = queue.pop() {
            self.flow_downstream_and_queue(state, terminal, tracker, &mut queue)?;
        }
        Ok(())
    }

    fn flow_downstream_and_queue<St: NetworkStateOperators>(
        &mut self,
        state: St,
        terminal: NodeIndex,
        tracker: &mut Tracker<NodeIndex>,
        queue: &mut TraversalQueue<NodeIndex>,
    ) -> Result<(), Error> {
        if !state.add_direction(self.terminal_mut(terminal)?, FeederDirection::Downstream) {
            return Ok(());
        }

        let connected = self.connected_terminals(terminal);
        let branching = connected.len() > 1;
        for other in connected {
            // at a branch point the connected terminal is left unvisited so
            // the downstream path of a loop can still process it
            if branching {
                if tracker.has_visited(&other) {
                    continue;
                }
            } else if !tracker.visit(other) {
                continue;
            }
            self.flow_upstream_and_queue(state, other, queue)?;
        }
        Ok(())
    }

    fn flow_upstream_and_queue<St: NetworkStateOperators>(
        &mut self,
        state: St,
        terminal: NodeIndex,
        queue: &mut TraversalQueue<NodeIndex>,
    ) -> Result<(), Error> {
        if !state.add_direction(self.terminal_mut(terminal)?, FeederDirection::Upstream) {
            return Ok(());
        }
        if self.is_feeder_head_terminal(terminal) {
            return Ok(());
        }
        let equipment = self.equipment(self.terminal(terminal)?.equipment())?;
        if state.is_open(equipment) {
            return Ok(());
        }
        for other in self.other_terminals(terminal) {
            queue.push(other);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::test_utils::NetworkBuilder;
    use crate::state::{CurrentStateOperators, NormalStateOperators};
    use FeederDirection::{Both, Downstream, None as NoDirection, Upstream};

    fn direction(network: &NetworkGraph, terminal: NodeIndex) -> FeederDirection {
        NormalStateOperators.direction(network.terminal(terminal).unwrap())
    }

    #[test]
    fn test_directions_along_a_radial_chain() {
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
        let l1 = network.terminal_at(line, 1).unwrap();
        let l2 = network.terminal_at(line, 2).unwrap();
        let c1 = network.terminal_at(consumer, 1).unwrap();
        assert_eq!(direction(&network, head), Downstream);
        assert_eq!(direction(&network, l1), Upstream);
        assert_eq!(direction(&network, l2), Downstream);
        assert_eq!(direction(&network, c1), Upstream);
        // the current state is untouched
        let terminal = network.terminal(l1).unwrap();
        assert_eq!(CurrentStateOperators.direction(terminal), NoDirection);
    }

    #[test]
    fn test_directions_stop_at_open_switch() {
        let mut builder = NetworkBuilder::new();
        let breaker = builder.breaker("breaker");
        let switch = builder.breaker("switch");
        let consumer = builder.consumer("consumer");
        builder.connect(breaker, 2, switch, 1);
        builder.connect(switch, 2, consumer, 1);
        builder.feeder("feeder", breaker, 2);
        let mut network = builder.build();
        network.set_normally_open(switch, true).unwrap();

        network.set_feeder_directions(NormalStateOperators).unwrap();

        let s1 = network.terminal_at(switch, 1).unwrap();
        let s2 = network.terminal_at(switch, 2).unwrap();
        let c1 = network.terminal_at(consumer, 1).unwrap();
        assert_eq!(direction(&network, s1), Upstream);
        assert_eq!(direction(&network, s2), NoDirection);
        assert_eq!(direction(&network, c1), NoDirection);
    }

    #[test]
    fn test_loop_terminals_accumulate_both() {
        let mut builder = NetworkBuilder::new();
        let breaker = builder.breaker("breaker");
        let line1 = builder.acls("line1");
        let line2 = builder.acls("line2");
        let consumer = builder.consumer("consumer");
        builder.connect(breaker, 2, line1, 1);
        builder.connect(breaker, 2, line2, 1);
        builder.connect(line1, 2, line2, 2);
        builder.connect(line2, 2, consumer, 1);
        builder.feeder("feeder", breaker, 2);
        let mut network = builder.build();

        network.set_feeder_directions(NormalStateOperators).unwrap();

        for (equipment, sequence) in [(line1, 1), (line1, 2), (line2, 1), (line2, 2)] {
            let terminal = network.terminal_at(equipment, sequence).unwrap();
            assert_eq!(direction(&network, terminal), Both, "{equipment:?}-t{sequence}");
        }
        let c1 = network.terminal_at(consumer, 1).unwrap();
        assert_eq!(direction(&network, c1), Upstream);
    }

    #[test]
    fn test_idempotent() {
        let mut builder = NetworkBuilder::new();
        let breaker = builder.breaker("breaker");
        let line = builder.acls("line");
        builder.connect(breaker, 2, line, 1);
        builder.feeder("feeder", breaker, 2);
        let mut network = builder.build();

        network.set_feeder_directions(NormalStateOperators).unwrap();
        network.set_feeder_directions(NormalStateOperators).unwrap();

        let l1 = network.terminal_at(line, 1).unwrap();
        let l2 = network.terminal_at(line, 2).unwrap();
        assert_eq!(direction(&network, l1), Upstream);
        assert_eq!(direction(&network, l2), Downstream);
    }
}
