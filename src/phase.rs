// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the phase vocabulary of the network: the
//! `SinglePhaseKind` and `PhaseCode` enums, the `PhaseSet` bitset and the
//! `NominalPhasePath` core mapping.

use std::fmt::Display;

/// A single conductor phase.
///
/// `X` and `Y` are placeholders used when the true phase of a conductor is
/// not known until traced or inferred, e.g. on SWER spurs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SinglePhaseKind {
    #[default]
    None,
    A,
    B,
    C,
    N,
    X,
    Y,
}

impl SinglePhaseKind {
    /// Returns the bit position of the phase in a [`PhaseSet`], or `None` for
    /// the `None` phase which has no bit.
    fn bit(self) -> Option<u8> {
        match self {
            SinglePhaseKind::None => None,
            SinglePhaseKind::A => Some(0),
            SinglePhaseKind::B => Some(1),
            SinglePhaseKind::C => Some(2),
            SinglePhaseKind::N => Some(3),
            SinglePhaseKind::X => Some(4),
            SinglePhaseKind::Y => Some(5),
        }
    }

    /// Whether the phase is one of the `X`/`Y` placeholders.
    pub fn is_placeholder(self) -> bool {
        matches!(self, SinglePhaseKind::X | SinglePhaseKind::Y)
    }
}

impl Display for SinglePhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinglePhaseKind::None => write!(f, "NONE"),
            SinglePhaseKind::A => write!(f, "A"),
            SinglePhaseKind::B => write!(f, "B"),
            SinglePhaseKind::C => write!(f, "C"),
            SinglePhaseKind::N => write!(f, "N"),
            SinglePhaseKind::X => write!(f, "X"),
            SinglePhaseKind::Y => write!(f, "Y"),
        }
    }
}

/// The canonical phase codes a terminal can be nominally rated with.
///
/// A phase code is an ordered tuple of up to four [`SinglePhaseKind`] cores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseCode {
    None,
    A,
    B,
    C,
    N,
    AB,
    AC,
    BC,
    AN,
    BN,
    CN,
    ABN,
    ACN,
    BCN,
    ABC,
    ABCN,
    X,
    XN,
    Y,
    YN,
    XY,
    XYN,
}

use SinglePhaseKind::{A, B, C, N, X, Y};

impl PhaseCode {
    /// The ordered cores of the phase code.
    pub fn single_phases(self) -> &'static [SinglePhaseKind] {
        match self {
            PhaseCode::None => &[],
            PhaseCode::A => &[A],
            PhaseCode::B => &[B],
            PhaseCode::C => &[C],
            PhaseCode::N => &[N],
            PhaseCode::AB => &[A, B],
            PhaseCode::AC => &[A, C],
            PhaseCode::BC => &[B, C],
            PhaseCode::AN => &[A, N],
            PhaseCode::BN => &[B, N],
            PhaseCode::CN => &[C, N],
            PhaseCode::ABN => &[A, B, N],
            PhaseCode::ACN => &[A, C, N],
            PhaseCode::BCN => &[B, C, N],
            PhaseCode::ABC => &[A, B, C],
            PhaseCode::ABCN => &[A, B, C, N],
            PhaseCode::X => &[X],
            PhaseCode::XN => &[X, N],
            PhaseCode::Y => &[Y],
            PhaseCode::YN => &[Y, N],
            PhaseCode::XY => &[X, Y],
            PhaseCode::XYN => &[X, Y, N],
        }
    }

    /// The number of cores in the phase code.
    pub fn num_phases(self) -> usize {
        self.single_phases().len()
    }

    /// Whether the phase code contains the given core.
    pub fn contains(self, phase: SinglePhaseKind) -> bool {
        self.single_phases().contains(&phase)
    }

    /// The position of the given core within the phase code.
    pub fn index_of(self, phase: SinglePhaseKind) -> Option<usize> {
        self.single_phases().iter().position(|p| *p == phase)
    }

    /// The phase code with the neutral core removed.
    pub fn without_neutral(self) -> PhaseCode {
        match self {
            PhaseCode::N => PhaseCode::None,
            PhaseCode::AN => PhaseCode::A,
            PhaseCode::BN => PhaseCode::B,
            PhaseCode::CN => PhaseCode::C,
            PhaseCode::ABN => PhaseCode::AB,
            PhaseCode::ACN => PhaseCode::AC,
            PhaseCode::BCN => PhaseCode::BC,
            PhaseCode::ABCN => PhaseCode::ABC,
            PhaseCode::XN => PhaseCode::X,
            PhaseCode::YN => PhaseCode::Y,
            PhaseCode::XYN => PhaseCode::XY,
            other => other,
        }
    }

    /// The placeholder portion of the phase code, or `PhaseCode::None` when
    /// the code carries no `X`/`Y` cores.
    pub(crate) fn xy_family(self) -> PhaseCode {
        match self {
            PhaseCode::XY | PhaseCode::XYN => PhaseCode::XY,
            PhaseCode::X | PhaseCode::XN => PhaseCode::X,
            PhaseCode::Y | PhaseCode::YN => PhaseCode::Y,
            _ => PhaseCode::None,
        }
    }

    /// The non-placeholder portion of the phase code, or `PhaseCode::None`
    /// when the code carries no `A`/`B`/`C` cores.
    pub(crate) fn primary_family(self) -> PhaseCode {
        match self {
            PhaseCode::ABC | PhaseCode::ABCN => PhaseCode::ABC,
            PhaseCode::AB | PhaseCode::ABN => PhaseCode::AB,
            PhaseCode::AC | PhaseCode::ACN => PhaseCode::AC,
            PhaseCode::BC | PhaseCode::BCN => PhaseCode::BC,
            PhaseCode::A | PhaseCode::AN => PhaseCode::A,
            PhaseCode::B | PhaseCode::BN => PhaseCode::B,
            PhaseCode::C | PhaseCode::CN => PhaseCode::C,
            _ => PhaseCode::None,
        }
    }

    /// The cores as a [`PhaseSet`].
    pub fn phase_set(self) -> PhaseSet {
        let mut set = PhaseSet::new();
        for phase in self.single_phases() {
            set.insert(*phase);
        }
        set
    }
}

impl Display for PhaseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == PhaseCode::None {
            return write!(f, "NONE");
        }
        for phase in self.single_phases() {
            write!(f, "{}", phase)?;
        }
        Ok(())
    }
}

/// A small set of [`SinglePhaseKind`] values.
///
/// The `None` phase is not representable in the set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct PhaseSet(u8);

impl PhaseSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        PhaseSet(0)
    }

    /// Adds a phase to the set. Adding `None` is a no-op.
    pub fn insert(&mut self, phase: SinglePhaseKind) {
        if let Some(bit) = phase.bit() {
            self.0 |= 1 << bit;
        }
    }

    /// Removes a phase from the set.
    pub fn remove(&mut self, phase: SinglePhaseKind) {
        if let Some(bit) = phase.bit() {
            self.0 &= !(1 << bit);
        }
    }

    /// Whether the set contains the given phase.
    pub fn contains(&self, phase: SinglePhaseKind) -> bool {
        phase.bit().is_some_and(|bit| self.0 & (1 << bit) != 0)
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The number of phases in the set.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the phases in the set in `A, B, C, N, X, Y` order.
    pub fn iter(&self) -> impl Iterator<Item = SinglePhaseKind> + '_ {
        [A, B, C, N, X, Y].into_iter().filter(|p| self.contains(*p))
    }
}

impl FromIterator<SinglePhaseKind> for PhaseSet {
    fn from_iter<I: IntoIterator<Item = SinglePhaseKind>>(iter: I) -> Self {
        let mut set = PhaseSet::new();
        for phase in iter {
            set.insert(phase);
        }
        set
    }
}

/// A mapping of one terminal's core onto a connected terminal's core.
///
/// Ordering is lexicographic on `(from_phase, to_phase)` so path lists can be
/// compared and sorted canonically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NominalPhasePath {
    pub from_phase: SinglePhaseKind,
    pub to_phase: SinglePhaseKind,
}

impl NominalPhasePath {
    /// Creates a new path from `from_phase` to `to_phase`.
    pub fn new(from_phase: SinglePhaseKind, to_phase: SinglePhaseKind) -> Self {
        NominalPhasePath {
            from_phase,
            to_phase,
        }
    }
}
