// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A [`Traversal`] specialized to walking terminals of a
//! [`NetworkGraph`][crate::NetworkGraph].

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use crate::network::NetworkGraph;
use crate::state::NetworkStateOperators;
use crate::trace::{StepContext, Tracker, Traversal, TraversalQueue};
use crate::{Error, PhaseCode};

/// One hop of a network trace: the terminal stepped to, and how it was
/// reached.
///
/// A step is traced *internally* when it crossed a piece of equipment from
/// one of its terminals to another, and *externally* when it crossed a
/// connectivity node. Starting steps have `from_terminal == to_terminal`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TracePath {
    pub from_terminal: NodeIndex,
    pub to_terminal: NodeIndex,
    /// The nominal phases of `to_terminal`, carried for queue weighting.
    pub to_phases: PhaseCode,
    pub traced_internally: bool,
}

impl TracePath {
    pub(crate) fn start(terminal: NodeIndex, phases: PhaseCode) -> Self {
        TracePath {
            from_terminal: terminal,
            to_terminal: terminal,
            to_phases: phases,
            traced_internally: false,
        }
    }
}

/// How often a step action fires along a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionType {
    /// On every visited step.
    AllSteps,
    /// Only on the first step that lands on each piece of equipment.
    FirstStepOnEquipment,
}

/// A traversal over the terminals of a network.
///
/// Steps alternate between internal hops (through equipment) and external
/// hops (across connectivity nodes); the starting terminal fans out both
/// ways. Terminals of out-of-service equipment are never stepped to, and
/// each terminal is visited at most once per trace instance.
pub struct NetworkTrace {
    traversal: Traversal<TracePath, NetworkGraph>,
}

impl NetworkTrace {
    /// Creates a trace over the given queue, reading equipment status
    /// through the given state operators.
    pub fn new<St: NetworkStateOperators + 'static>(
        state: St,
        queue: TraversalQueue<(TracePath, StepContext)>,
    ) -> Self {
        let mut tracker = Tracker::new();
        let traversal = Traversal::new(queue, move |graph: &NetworkGraph, path, context| {
            next_paths(state, graph, path, context)
        })
        .with_visit_filter(move |path: &TracePath| tracker.visit(path.to_terminal));
        NetworkTrace { traversal }
    }

    /// A queue that steps to terminals with more nominal phases first.
    pub fn weighted_queue() -> TraversalQueue<(TracePath, StepContext)> {
        TraversalQueue::weighted(|(path, _): &(TracePath, StepContext)| {
            path.to_phases.num_phases()
        })
    }

    /// Adds a queue condition that keeps the trace from crossing open
    /// equipment. The open equipment's own terminals are still visited.
    pub fn stop_at_open<St: NetworkStateOperators + 'static>(&mut self, state: St) {
        self.traversal.add_queue_condition(move |graph, next, _, _, _| {
            !(next.traced_internally
                && graph
                    .terminal_equipment(next.to_terminal)
                    .is_some_and(|equipment| state.is_open(equipment)))
        });
    }

    /// Adds a stop condition.
    pub fn add_stop_condition(
        &mut self,
        condition: impl Fn(&NetworkGraph, &TracePath, &StepContext) -> bool + 'static,
    ) {
        self.traversal.add_stop_condition(condition);
    }

    /// Adds a queue condition.
    pub fn add_queue_condition(
        &mut self,
        condition: impl Fn(&NetworkGraph, &TracePath, &StepContext, &TracePath, &StepContext) -> bool
            + 'static,
    ) {
        self.traversal.add_queue_condition(condition);
    }

    /// Adds a step action, fired per the given action type.
    pub fn add_step_action(
        &mut self,
        action_type: ActionType,
        mut action: impl FnMut(&mut NetworkGraph, &TracePath, &StepContext) -> Result<(), Error>
            + 'static,
    ) {
        match action_type {
            ActionType::AllSteps => {
                self.traversal
                    .add_step_action(move |graph, path, context| action(graph, path, context));
            }
            ActionType::FirstStepOnEquipment => {
                let mut acted: HashSet<NodeIndex> = HashSet::new();
                self.traversal.add_step_action(move |graph, path, context| {
                    let equipment = graph.terminal(path.to_terminal)?.equipment();
                    if acted.insert(equipment) {
                        action(graph, path, context)
                    } else {
                        Ok(())
                    }
                });
            }
        }
    }

    /// Runs the trace from the given terminal.
    pub fn run(
        &mut self,
        graph: &mut NetworkGraph,
        start: NodeIndex,
        can_stop_on_start: bool,
    ) -> Result<(), Error> {
        let phases = graph.terminal(start)?.phases();
        self.traversal
            .run(graph, vec![TracePath::start(start, phases)], can_stop_on_start)
    }
}

fn next_paths<St: NetworkStateOperators>(
    state: St,
    graph: &NetworkGraph,
    path: &TracePath,
    context: &StepContext,
) -> Result<Vec<TracePath>, Error> {
    let mut next = Vec::new();

    // arrived through the equipment, leave across the junction (and back)
    if context.is_start || path.traced_internally {
        for other in graph.connected_terminals(path.to_terminal) {
            let in_service = graph
                .terminal_equipment(other)
                .is_some_and(|equipment| state.is_in_service(equipment));
            if in_service {
                next.push(TracePath {
                    from_terminal: path.to_terminal,
                    to_terminal: other,
                    to_phases: graph.terminal(other)?.phases(),
                    traced_internally: false,
                });
            }
        }
    }
    if context.is_start || !path.traced_internally {
        for other in graph.other_terminals(path.to_terminal) {
            next.push(TracePath {
                from_terminal: path.to_terminal,
                to_terminal: other,
                to_phases: graph.terminal(other)?.phases(),
                traced_internally: true,
            });
        }
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::test_utils::NetworkBuilder;
    use crate::state::NormalStateOperators;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn collecting_trace(
        action_type: ActionType,
    ) -> (NetworkTrace, Rc<RefCell<Vec<NodeIndex>>>) {
        let mut trace = NetworkTrace::new(NormalStateOperators, TraversalQueue::fifo());
        let visited = Rc::new(RefCell::new(Vec::new()));
        let action_visited = visited.clone();
        trace.add_step_action(action_type, move |_, path, _| {
            action_visited.borrow_mut().push(path.to_terminal);
            Ok(())
        });
        (trace, visited)
    }

    #[test]
    fn test_visits_every_terminal_once() {
        let mut builder = NetworkBuilder::new();
        let source = builder.source("source");
        let line = builder.acls("line");
        let consumer = builder.consumer("consumer");
        builder.connect(source, 1, line, 1);
        builder.connect(line, 2, consumer, 1);
        let mut network = builder.build();

        let start = network.terminal_at(source, 1).unwrap();
        let (mut trace, visited) = collecting_trace(ActionType::AllSteps);
        trace.run(&mut network, start, false).unwrap();

        let mut visited = visited.borrow_mut().clone();
        assert_eq!(visited.len(), 4);
        visited.sort();
        visited.dedup();
        assert_eq!(visited.len(), 4);
    }

    #[test]
    fn test_stop_at_open_contains_the_trace() {
        let mut builder = NetworkBuilder::new();
        let source = builder.source("source");
        let breaker = builder.breaker("breaker");
        let consumer = builder.consumer("consumer");
        builder.connect(source, 1, breaker, 1);
        builder.connect(breaker, 2, consumer, 1);
        let mut network = builder.build();
        network.set_normally_open(breaker, true).unwrap();

        let start = network.terminal_at(source, 1).unwrap();
        let (mut trace, visited) = collecting_trace(ActionType::AllSteps);
        trace.stop_at_open(NormalStateOperators);
        trace.run(&mut network, start, false).unwrap();

        let visited = visited.borrow();
        let b1 = network.terminal_at(breaker, 1).unwrap();
        let b2 = network.terminal_at(breaker, 2).unwrap();
        assert!(visited.contains(&b1));
        assert!(!visited.contains(&b2));
    }

    #[test]
    fn test_first_step_on_equipment_acts_once() {
        let mut builder = NetworkBuilder::new();
        let source = builder.source("source");
        let line = builder.acls("line");
        builder.connect(source, 1, line, 1);
        let mut network = builder.build();

        let start = network.terminal_at(line, 1).unwrap();
        let (mut trace, visited) = collecting_trace(ActionType::FirstStepOnEquipment);
        trace.run(&mut network, start, false).unwrap();

        // three terminals visited, but only two pieces of equipment acted on
        let visited = visited.borrow();
        assert_eq!(visited.len(), 2);
    }

    #[test]
    fn test_skips_out_of_service_equipment() {
        let mut builder = NetworkBuilder::new();
        let source = builder.source("source");
        let line = builder.acls("line");
        let consumer = builder.consumer("consumer");
        builder.connect(source, 1, line, 1);
        builder.connect(line, 2, consumer, 1);
        let mut network = builder.build();
        network.set_normally_in_service(line, false).unwrap();

        let start = network.terminal_at(source, 1).unwrap();
        let (mut trace, visited) = collecting_trace(ActionType::AllSteps);
        trace.run(&mut network, start, false).unwrap();

        assert_eq!(*visited.borrow(), vec![start]);
    }
}
