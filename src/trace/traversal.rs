// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The generic traversal engine.
//!
//! A [`Traversal`] walks items of some type `T` over shared state `S`,
//! driven by a queue discipline and four kinds of plug-in behavior: stop
//! conditions, queue conditions, step actions and a next-step provider.

use crate::trace::TraversalQueue;
use crate::Error;

/// Per-item bookkeeping carried alongside each queued item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepContext {
    /// Whether the item is one of the traversal's starting items.
    pub is_start: bool,
    /// Whether a stop condition matched on the item. Stop conditions still
    /// run their step actions; they just don't queue onward.
    pub is_stopping: bool,
    /// The number of steps taken to reach the item.
    pub step_number: usize,
}

/// Decides whether the traversal stops spreading from an item.
pub type StopCondition<T, S> = Box<dyn Fn(&S, &T, &StepContext) -> bool>;

/// Decides whether a candidate next item enters the queue. Receives the
/// candidate and the item it was reached from.
pub type QueueCondition<T, S> = Box<dyn Fn(&S, &T, &StepContext, &T, &StepContext) -> bool>;

/// Runs on every visited item.
pub type StepAction<T, S> = Box<dyn FnMut(&mut S, &T, &StepContext) -> Result<(), Error>>;

/// Produces the candidate next items from a visited item.
pub type NextSteps<T, S> = Box<dyn Fn(&S, &T, &StepContext) -> Result<Vec<T>, Error>>;

/// A configurable graph walk.
///
/// Items are deduplicated by the visit filter at pop time, so an item queued
/// twice before its first visit is still only acted on once.
pub struct Traversal<T, S> {
    queue: TraversalQueue<(T, StepContext)>,
    visit: Box<dyn FnMut(&T) -> bool>,
    stop_conditions: Vec<StopCondition<T, S>>,
    queue_conditions: Vec<QueueCondition<T, S>>,
    step_actions: Vec<StepAction<T, S>>,
    next_steps: NextSteps<T, S>,
}

impl<T, S> Traversal<T, S> {
    /// Creates a traversal over the given queue with the given next-step
    /// provider. The visit filter admits every item; replace it with
    /// [`Traversal::with_visit_filter`] to deduplicate.
    pub fn new(
        queue: TraversalQueue<(T, StepContext)>,
        next_steps: impl Fn(&S, &T, &StepContext) -> Result<Vec<T>, Error> + 'static,
    ) -> Self {
        Traversal {
            queue,
            visit: Box::new(|_| true),
            stop_conditions: Vec::new(),
            queue_conditions: Vec::new(),
            step_actions: Vec::new(),
            next_steps: Box::new(next_steps),
        }
    }

    /// Replaces the visit filter. The filter runs when an item is popped and
    /// a `false` return skips the item entirely.
    pub fn with_visit_filter(mut self, visit: impl FnMut(&T) -> bool + 'static) -> Self {
        self.visit = Box::new(visit);
        self
    }

    /// Adds a stop condition.
    pub fn add_stop_condition(
        &mut self,
        condition: impl Fn(&S, &T, &StepContext) -> bool + 'static,
    ) {
        self.stop_conditions.push(Box::new(condition));
    }

    /// Adds a queue condition.
    pub fn add_queue_condition(
        &mut self,
        condition: impl Fn(&S, &T, &StepContext, &T, &StepContext) -> bool + 'static,
    ) {
        self.queue_conditions.push(Box::new(condition));
    }

    /// Adds a step action.
    pub fn add_step_action(
        &mut self,
        action: impl FnMut(&mut S, &T, &StepContext) -> Result<(), Error> + 'static,
    ) {
        self.step_actions.push(Box::new(action));
    }

    /// Runs the traversal from the given starting items.
    ///
    /// With `can_stop_on_start` false, stop conditions are not evaluated on
    /// the starting items themselves, only on items reached from them.
    pub fn run(
        &mut self,
        state: &mut S,
        starts: Vec<T>,
        can_stop_on_start: bool,
    ) -> Result<(), Error> {
        self.queue.clear();
        for start in starts {
            self.queue.push((
                start,
                StepContext {
                    is_start: true,
                    is_stopping: false,
                    step_number: 0,
                },
            ));
        }

        while let Some((item, mut context)) = self.queue.pop() {
            if !(self.visit)(&item) {
                continue;
            }

            context.is_stopping = (can_stop_on_start || !context.is_start)
                && self
                    .stop_conditions
                    .iter()
                    .any(|condition| condition(state, &item, &context));

            for action in &mut self.step_actions {
                action(state, &item, &context)?;
            }

            if context.is_stopping {
                continue;
            }

            let next_context = StepContext {
                is_start: false,
                is_stopping: false,
                step_number: context.step_number + 1,
            };
            for next in (self.next_steps)(state, &item, &context)? {
                if self
                    .queue_conditions
                    .iter()
                    .all(|condition| condition(state, &next, &next_context, &item, &context))
                {
                    self.queue.push((next, next_context));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    // a little line graph: item n steps to n + 1, up to a limit of 10
    fn line_steps() -> impl Fn(&Vec<usize>, &usize, &StepContext) -> Result<Vec<usize>, Error> {
        |_, &item, _| {
            if item < 10 {
                Ok(vec![item + 1])
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[test]
    fn test_walks_to_the_end() {
        let mut traversal = Traversal::new(TraversalQueue::fifo(), line_steps());
        traversal.add_step_action(|state: &mut Vec<usize>, &item, _| {
            state.push(item);
            Ok(())
        });

        let mut visited = Vec::new();
        traversal.run(&mut visited, vec![0], false).unwrap();
        assert_eq!(visited, (0..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_stop_condition_acts_but_does_not_spread() {
        let mut traversal = Traversal::new(TraversalQueue::fifo(), line_steps());
        traversal.add_stop_condition(|_, &item, _| item == 3);
        traversal.add_step_action(|state: &mut Vec<usize>, &item, context| {
            state.push(item);
            assert_eq!(context.is_stopping, item == 3);
            Ok(())
        });

        let mut visited = Vec::new();
        traversal.run(&mut visited, vec![0], false).unwrap();
        assert_eq!(visited, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_stop_on_start() {
        let mut traversal = Traversal::new(TraversalQueue::fifo(), line_steps());
        traversal.add_stop_condition(|_, &item, _| item == 0);
        traversal.add_step_action(|state: &mut Vec<usize>, &item, _| {
            state.push(item);
            Ok(())
        });

        let mut visited = Vec::new();
        traversal.run(&mut visited, vec![0], true).unwrap();
        assert_eq!(visited, vec![0]);
    }

    #[test]
    fn test_queue_condition_filters() {
        let mut traversal = Traversal::new(TraversalQueue::fifo(), line_steps());
        traversal.add_queue_condition(|_, &next, _, _, _| next % 2 == 0 || next < 4);
        traversal.add_step_action(|state: &mut Vec<usize>, &item, _| {
            state.push(item);
            Ok(())
        });

        let mut visited = Vec::new();
        traversal.run(&mut visited, vec![0], false).unwrap();
        // 5 is rejected, so nothing past 4 is reached
        assert_eq!(visited, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_visit_filter_deduplicates() {
        let seen = Rc::new(RefCell::new(HashSet::new()));
        let filter_seen = seen.clone();
        let mut traversal = Traversal::new(
            TraversalQueue::fifo(),
            // both parities fan into the same successors
            |_, &item: &usize, _| {
                if item < 4 {
                    Ok(vec![item + 1, item + 2])
                } else {
                    Ok(Vec::new())
                }
            },
        )
        .with_visit_filter(move |&item| filter_seen.borrow_mut().insert(item));
        traversal.add_step_action(|state: &mut Vec<usize>, &item, _| {
            state.push(item);
            Ok(())
        });

        let mut visited = Vec::new();
        traversal.run(&mut visited, vec![0], false).unwrap();
        assert_eq!(visited, vec![0, 1, 2, 3, 4, 5]);
        let _ = seen;
    }
}
