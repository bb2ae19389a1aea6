// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Candidate tracking for resolving `X`/`Y` placeholder phases.

use crate::SinglePhaseKind;

use SinglePhaseKind::{A, B, C, None as NoPhase, X, Y};

/// The pathing priority for nominal phase `X`.
pub(crate) const X_PRIORITY: [SinglePhaseKind; 3] = [A, B, C];

/// The pathing priority for nominal phase `Y`.
pub(crate) const Y_PRIORITY: [SinglePhaseKind; 2] = [C, B];

/// Whether `phase` may pair with an `X` resolved to `before`, keeping `X`
/// strictly below `Y` in `A < B < C` order.
pub(crate) fn is_before(phase: SinglePhaseKind, before: Option<SinglePhaseKind>) -> bool {
    match before {
        None | Some(NoPhase) => true,
        Some(A) => false,
        Some(B) => phase == A,
        Some(C) => phase == A || phase == B,
        Some(_) => false,
    }
}

/// Whether `phase` may pair with a `Y` resolved to `after`, keeping `Y`
/// strictly above `X` in `A < B < C` order.
pub(crate) fn is_after(phase: SinglePhaseKind, after: Option<SinglePhaseKind>) -> bool {
    match after {
        None | Some(NoPhase) => true,
        Some(C) => false,
        Some(B) => phase == C,
        Some(A) => phase == C || phase == B,
        Some(_) => false,
    }
}

/// Tracks the known and candidate phases for the `X` and `Y` placeholders of
/// a connectivity node, and picks the best allocation.
#[derive(Debug, Default)]
pub(crate) struct XyCandidatePhasePaths {
    known_x: Option<SinglePhaseKind>,
    known_y: Option<SinglePhaseKind>,
    candidates_x: Vec<SinglePhaseKind>,
    candidates_y: Vec<SinglePhaseKind>,
}

impl XyCandidatePhasePaths {
    pub fn new() -> Self {
        XyCandidatePhasePaths::default()
    }

    /// Records a traced phase for a placeholder. The first known phase wins;
    /// later ones are ignored.
    pub fn add_known(&mut self, xy_phase: SinglePhaseKind, known_phase: SinglePhaseKind) {
        let slot = match xy_phase {
            X => &mut self.known_x,
            Y => &mut self.known_y,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(known_phase);
        }
    }

    /// Records candidate phases for a placeholder. A candidate reached
    /// through multiple paths should be added once per path; the counts
    /// weight the final pick. Candidates invalid for the placeholder
    /// (`X`: `A`/`B`/`C`, `Y`: `B`/`C`) are dropped.
    pub fn add_candidates(
        &mut self,
        xy_phase: SinglePhaseKind,
        candidates: impl IntoIterator<Item = SinglePhaseKind>,
    ) {
        match xy_phase {
            X => self
                .candidates_x
                .extend(candidates.into_iter().filter(|p| matches!(p, A | B | C))),
            Y => self
                .candidates_y
                .extend(candidates.into_iter().filter(|p| matches!(p, B | C))),
            _ => {}
        }
    }

    /// Picks the phases for `X` and `Y`, preferring known phases, keeping
    /// `X` below `Y`, then most occurrences, then the priority orders
    /// (`X`: `A`, `B`, `C`; `Y`: `C`, `B`). Returns `NONE` for a
    /// placeholder that cannot be allocated.
    pub fn calculate_paths(&self) -> (SinglePhaseKind, SinglePhaseKind) {
        let known_x = self.known_x;
        // a Y clashing with the known X is as good as missing
        let known_y = self.known_y.filter(|y| known_x != Some(*y));

        match (known_x, known_y) {
            (Some(x), Some(y)) => (x, y),
            (Some(x), None) => {
                let y = if self.candidates_y.is_empty() {
                    NoPhase
                } else {
                    find_candidate(&self.candidates_y, &Y_PRIORITY, None, Some(x))
                };
                (x, y)
            }
            (None, Some(y)) => {
                let x = if self.candidates_x.is_empty() {
                    NoPhase
                } else {
                    find_candidate(&self.candidates_x, &X_PRIORITY, Some(y), None)
                };
                (x, y)
            }
            (None, None) => self.process_candidates(),
        }
    }

    fn process_candidates(&self) -> (SinglePhaseKind, SinglePhaseKind) {
        let x_counts = counted(&self.candidates_x);
        let y_counts = counted(&self.candidates_y);

        if x_counts.is_empty() {
            return (
                NoPhase,
                find_candidate(&self.candidates_y, &Y_PRIORITY, None, None),
            );
        }
        if x_counts.len() == 1 {
            let x = x_counts[0].0;
            return (
                x,
                find_candidate(&self.candidates_y, &Y_PRIORITY, None, Some(x)),
            );
        }
        if y_counts.is_empty() {
            return (
                find_candidate(&self.candidates_x, &X_PRIORITY, None, None),
                NoPhase,
            );
        }
        if y_counts.len() == 1 {
            let y = y_counts[0].0;
            return (
                find_candidate(&self.candidates_x, &X_PRIORITY, Some(y), None),
                y,
            );
        }

        let x = find_candidate(&self.candidates_x, &X_PRIORITY, None, None);
        let y = find_candidate(&self.candidates_y, &Y_PRIORITY, None, None);
        if is_before(x, Some(y)) {
            return (x, y);
        }

        let count_of = |counts: &[(SinglePhaseKind, usize)], phase| {
            counts
                .iter()
                .find(|(p, _)| *p == phase)
                .map_or(0, |(_, c)| *c)
        };
        let count_x = count_of(&x_counts, x);
        let count_y = count_of(&y_counts, y);
        if count_x > count_y {
            return (
                x,
                find_candidate(&self.candidates_y, &Y_PRIORITY, None, Some(x)),
            );
        }
        if count_y > count_x {
            return (
                find_candidate(&self.candidates_x, &X_PRIORITY, Some(y), None),
                y,
            );
        }

        let x2 = find_candidate(&self.candidates_x, &X_PRIORITY, Some(y), None);
        let y2 = find_candidate(&self.candidates_y, &Y_PRIORITY, None, Some(x));
        if x2 == NoPhase {
            (x, y2)
        } else if y2 == NoPhase {
            (x2, y)
        } else if count_of(&x_counts, x2) > count_of(&y_counts, y2) {
            (x2, y)
        } else {
            (x, y2)
        }
    }
}

/// Unique candidates with their counts, in first-occurrence order.
fn counted(candidates: &[SinglePhaseKind]) -> Vec<(SinglePhaseKind, usize)> {
    let mut counts: Vec<(SinglePhaseKind, usize)> = Vec::new();
    for &candidate in candidates {
        match counts.iter_mut().find(|(p, _)| *p == candidate) {
            Some((_, count)) => *count += 1,
            None => counts.push((candidate, 1)),
        }
    }
    counts
}

fn find_candidate(
    candidates: &[SinglePhaseKind],
    priority: &[SinglePhaseKind],
    before: Option<SinglePhaseKind>,
    after: Option<SinglePhaseKind>,
) -> SinglePhaseKind {
    // count order with first-occurrence tie-breaking keeps the pick stable
    let mut by_count = counted(candidates);
    by_count.sort_by(|a, b| b.1.cmp(&a.1));

    let valid: Vec<(SinglePhaseKind, usize)> = by_count
        .into_iter()
        .filter(|(phase, _)| is_before(*phase, before) && is_after(*phase, after))
        .collect();
    match valid.as_slice() {
        [] => NoPhase,
        [(phase, _)] => *phase,
        [(first, top), ..] => {
            let tied: Vec<SinglePhaseKind> = valid
                .iter()
                .take_while(|(_, count)| count == top)
                .map(|(phase, _)| *phase)
                .collect();
            if tied.len() == 1 {
                *first
            } else {
                priority
                    .iter()
                    .copied()
                    .find(|phase| tied.contains(phase))
                    .unwrap_or(NoPhase)
            }
        }
    }
}
