// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Static phase-path tables: straight paths across connectivity nodes,
//! viable candidates for placeholder inference, and the transformer winding
//! table.

use crate::{NominalPhasePath, PhaseCode, SinglePhaseKind};

use SinglePhaseKind::{A, B, C, N, X, Y};

macro_rules! path {
    ($from:expr, $to:expr) => {
        NominalPhasePath {
            from_phase: $from,
            to_phase: $to,
        }
    };
}

/// Marks a transformer winding that adds a neutral; the neutral is energised
/// from the transformer itself rather than from the other winding.
pub(crate) const ADD_NEUTRAL: NominalPhasePath = path!(SinglePhaseKind::None, N);

fn is_known_code(code: PhaseCode) -> bool {
    code.contains(A) || code.contains(B) || code.contains(C) || code == PhaseCode::N
}

fn is_unknown_code(code: PhaseCode) -> bool {
    code.contains(X) || code.contains(Y)
}

/// The identity phase paths between two terminals across a connectivity
/// node, or `None` when the codes are from different families (one carries
/// placeholders, the other known phases) and placeholder resolution is
/// needed instead.
pub(crate) fn straight_phase_paths(from: PhaseCode, to: PhaseCode) -> Option<Vec<NominalPhasePath>> {
    let same_family = (is_known_code(from) && is_known_code(to))
        || (is_unknown_code(from) && is_unknown_code(to));
    same_family.then(|| {
        from.single_phases()
            .iter()
            .copied()
            .filter(|phase| to.contains(*phase))
            .map(|phase| path!(phase, phase))
            .collect()
    })
}

/// The phases each placeholder of `xy_code` could map to when connected to a
/// terminal carrying `primary_code`, as `(placeholder, candidates)` pairs.
pub(crate) fn viable_candidates(
    xy_code: PhaseCode,
    primary_code: PhaseCode,
) -> &'static [(SinglePhaseKind, &'static [SinglePhaseKind])] {
    match xy_code {
        PhaseCode::XY => match primary_code {
            PhaseCode::ABC => &[(X, &[A, B, C]), (Y, &[B, C])],
            PhaseCode::AB => &[(X, &[A, B]), (Y, &[B])],
            PhaseCode::AC => &[(X, &[A, C]), (Y, &[C])],
            PhaseCode::BC => &[(X, &[B, C]), (Y, &[B, C])],
            PhaseCode::A => &[(X, &[A])],
            PhaseCode::B => &[(X, &[B]), (Y, &[B])],
            PhaseCode::C => &[(X, &[C]), (Y, &[C])],
            _ => &[],
        },
        PhaseCode::X => match primary_code {
            PhaseCode::ABC => &[(X, &[A, B, C])],
            PhaseCode::AB => &[(X, &[A, B])],
            PhaseCode::AC => &[(X, &[A, C])],
            PhaseCode::BC => &[(X, &[B, C])],
            PhaseCode::A => &[(X, &[A])],
            PhaseCode::B => &[(X, &[B])],
            PhaseCode::C => &[(X, &[C])],
            _ => &[],
        },
        PhaseCode::Y => match primary_code {
            PhaseCode::ABC => &[(Y, &[B, C])],
            PhaseCode::AB => &[(Y, &[B])],
            PhaseCode::AC => &[(Y, &[C])],
            PhaseCode::BC => &[(Y, &[B, C])],
            PhaseCode::B => &[(Y, &[B])],
            PhaseCode::C => &[(Y, &[C])],
            _ => &[],
        },
        _ => &[],
    }
}

/// The phase paths between two windings of a power transformer, or an empty
/// slice for winding combinations a transformer cannot bridge.
///
/// A `NONE -> phase` entry means the phase on the `to` winding is created by
/// the transformer rather than carried through from the `from` winding.
pub(crate) fn transformer_phase_paths(
    from: PhaseCode,
    to: PhaseCode,
) -> &'static [NominalPhasePath] {
    use SinglePhaseKind::None as NoPhase;
    match (from, to) {
        (PhaseCode::ABCN, PhaseCode::ABCN) => {
            &[path!(A, A), path!(B, B), path!(C, C), path!(N, N)]
        }
        (PhaseCode::ABCN, PhaseCode::ABC) => &[path!(A, A), path!(B, B), path!(C, C)],

        (PhaseCode::AN, PhaseCode::AN) => &[path!(A, A), path!(N, N)],
        (PhaseCode::AN, PhaseCode::XN) => &[path!(A, X), path!(N, N)],
        (PhaseCode::AN, PhaseCode::AB) => &[path!(A, A), path!(NoPhase, B)],
        (PhaseCode::AN, PhaseCode::XY) => &[path!(A, X), path!(NoPhase, Y)],
        (PhaseCode::AN, PhaseCode::X) => &[path!(A, X)],
        (PhaseCode::AN, PhaseCode::A) => &[path!(A, A)],

        (PhaseCode::BN, PhaseCode::BN) => &[path!(B, B), path!(N, N)],
        (PhaseCode::BN, PhaseCode::XN) => &[path!(B, X), path!(N, N)],
        (PhaseCode::BN, PhaseCode::BC) => &[path!(B, B), path!(NoPhase, C)],
        (PhaseCode::BN, PhaseCode::XY) => &[path!(B, X), path!(NoPhase, Y)],
        (PhaseCode::BN, PhaseCode::B) => &[path!(B, B)],
        (PhaseCode::BN, PhaseCode::X) => &[path!(B, X)],

        (PhaseCode::CN, PhaseCode::CN) => &[path!(C, C), path!(N, N)],
        (PhaseCode::CN, PhaseCode::XN) => &[path!(C, X), path!(N, N)],
        (PhaseCode::CN, PhaseCode::AC) => &[path!(C, C), path!(NoPhase, A)],
        (PhaseCode::CN, PhaseCode::XY) => &[path!(C, X), path!(NoPhase, Y)],
        (PhaseCode::CN, PhaseCode::C) => &[path!(C, C)],
        (PhaseCode::CN, PhaseCode::X) => &[path!(C, X)],

        (PhaseCode::XN, PhaseCode::AN) => &[path!(X, A), path!(N, N)],
        (PhaseCode::XN, PhaseCode::BN) => &[path!(X, B), path!(N, N)],
        (PhaseCode::XN, PhaseCode::CN) => &[path!(X, C), path!(N, N)],
        (PhaseCode::XN, PhaseCode::XN) => &[path!(X, X), path!(N, N)],
        (PhaseCode::XN, PhaseCode::AB) => &[path!(X, A), path!(NoPhase, B)],
        (PhaseCode::XN, PhaseCode::BC) => &[path!(X, B), path!(NoPhase, C)],
        (PhaseCode::XN, PhaseCode::AC) => &[path!(X, C), path!(NoPhase, A)],
        (PhaseCode::XN, PhaseCode::XY) => &[path!(X, X), path!(NoPhase, Y)],
        (PhaseCode::XN, PhaseCode::A) => &[path!(X, A)],
        (PhaseCode::XN, PhaseCode::B) => &[path!(X, B)],
        (PhaseCode::XN, PhaseCode::C) => &[path!(X, C)],
        (PhaseCode::XN, PhaseCode::X) => &[path!(X, X)],

        (PhaseCode::ABC, PhaseCode::ABCN) => {
            &[path!(A, A), path!(B, B), path!(C, C), ADD_NEUTRAL]
        }
        (PhaseCode::ABC, PhaseCode::ABC) => &[path!(A, A), path!(B, B), path!(C, C)],

        (PhaseCode::ABN, PhaseCode::ABN) => &[path!(A, A), path!(B, B), path!(N, N)],
        (PhaseCode::ABN, PhaseCode::XYN) => &[path!(A, X), path!(B, Y), path!(N, N)],
        (PhaseCode::ABN, PhaseCode::AB) => &[path!(A, A), path!(B, B)],
        (PhaseCode::ABN, PhaseCode::XY) => &[path!(A, X), path!(B, Y)],
        (PhaseCode::ABN, PhaseCode::A) => &[path!(A, A)],
        (PhaseCode::ABN, PhaseCode::X) => &[path!(A, X)],

        (PhaseCode::BCN, PhaseCode::BCN) => &[path!(B, B), path!(C, C), path!(N, N)],
        (PhaseCode::BCN, PhaseCode::XYN) => &[path!(B, X), path!(C, Y), path!(N, N)],
        (PhaseCode::BCN, PhaseCode::BC) => &[path!(B, B), path!(C, C)],
        (PhaseCode::BCN, PhaseCode::XY) => &[path!(B, X), path!(C, Y)],
        (PhaseCode::BCN, PhaseCode::B) => &[path!(B, B)],
        (PhaseCode::BCN, PhaseCode::X) => &[path!(B, X)],

        (PhaseCode::ACN, PhaseCode::ACN) => &[path!(A, A), path!(C, C), path!(N, N)],
        (PhaseCode::ACN, PhaseCode::XYN) => &[path!(A, X), path!(C, Y), path!(N, N)],
        (PhaseCode::ACN, PhaseCode::AC) => &[path!(A, A), path!(C, C)],
        (PhaseCode::ACN, PhaseCode::XY) => &[path!(A, X), path!(C, Y)],
        (PhaseCode::ACN, PhaseCode::C) => &[path!(C, C)],
        (PhaseCode::ACN, PhaseCode::X) => &[path!(C, X)],

        (PhaseCode::XYN, PhaseCode::ABN) => &[path!(X, A), path!(Y, B), path!(N, N)],
        (PhaseCode::XYN, PhaseCode::BCN) => &[path!(X, B), path!(Y, C), path!(N, N)],
        (PhaseCode::XYN, PhaseCode::ACN) => &[path!(X, A), path!(Y, C), path!(N, N)],
        (PhaseCode::XYN, PhaseCode::XYN) => &[path!(X, X), path!(Y, Y), path!(N, N)],
        (PhaseCode::XYN, PhaseCode::AB) => &[path!(X, A), path!(Y, B)],
        (PhaseCode::XYN, PhaseCode::BC) => &[path!(X, B), path!(Y, C)],
        (PhaseCode::XYN, PhaseCode::AC) => &[path!(X, A), path!(Y, C)],
        (PhaseCode::XYN, PhaseCode::XY) => &[path!(X, X), path!(Y, Y)],
        (PhaseCode::XYN, PhaseCode::A) => &[path!(X, A)],
        (PhaseCode::XYN, PhaseCode::B) => &[path!(X, B)],
        (PhaseCode::XYN, PhaseCode::C) => &[path!(X, C)],
        (PhaseCode::XYN, PhaseCode::X) => &[path!(X, X)],

        (PhaseCode::AB, PhaseCode::ABN) => &[path!(A, A), path!(B, B), ADD_NEUTRAL],
        (PhaseCode::AB, PhaseCode::XYN) => &[path!(A, X), path!(B, Y), ADD_NEUTRAL],
        (PhaseCode::AB, PhaseCode::AN) => &[path!(A, A), ADD_NEUTRAL],
        (PhaseCode::AB, PhaseCode::XN) => &[path!(A, X), ADD_NEUTRAL],
        (PhaseCode::AB, PhaseCode::AB) => &[path!(A, A), path!(B, B)],
        (PhaseCode::AB, PhaseCode::XY) => &[path!(A, X), path!(B, Y)],
        (PhaseCode::AB, PhaseCode::A) => &[path!(A, A)],
        (PhaseCode::AB, PhaseCode::X) => &[path!(A, X)],

        (PhaseCode::BC, PhaseCode::BCN) => &[path!(B, B), path!(C, C), ADD_NEUTRAL],
        (PhaseCode::BC, PhaseCode::XYN) => &[path!(B, X), path!(C, Y), ADD_NEUTRAL],
        (PhaseCode::BC, PhaseCode::BN) => &[path!(B, B), ADD_NEUTRAL],
        (PhaseCode::BC, PhaseCode::XN) => &[path!(B, X), ADD_NEUTRAL],
        (PhaseCode::BC, PhaseCode::BC) => &[path!(B, B), path!(C, C)],
        (PhaseCode::BC, PhaseCode::XY) => &[path!(B, X), path!(C, Y)],
        (PhaseCode::BC, PhaseCode::B) => &[path!(B, B)],
        (PhaseCode::BC, PhaseCode::X) => &[path!(B, X)],

        (PhaseCode::AC, PhaseCode::ACN) => &[path!(A, A), path!(C, C), ADD_NEUTRAL],
        (PhaseCode::AC, PhaseCode::XYN) => &[path!(A, X), path!(C, Y), ADD_NEUTRAL],
        (PhaseCode::AC, PhaseCode::CN) => &[path!(C, C), ADD_NEUTRAL],
        (PhaseCode::AC, PhaseCode::XN) => &[path!(C, X), ADD_NEUTRAL],
        (PhaseCode::AC, PhaseCode::AC) => &[path!(A, A), path!(C, C)],
        (PhaseCode::AC, PhaseCode::XY) => &[path!(A, X), path!(C, Y)],
        (PhaseCode::AC, PhaseCode::C) => &[path!(C, C)],
        (PhaseCode::AC, PhaseCode::X) => &[path!(C, X)],

        (PhaseCode::XY, PhaseCode::ABN) => &[path!(X, A), path!(Y, B), ADD_NEUTRAL],
        (PhaseCode::XY, PhaseCode::BCN) => &[path!(X, B), path!(Y, C), ADD_NEUTRAL],
        (PhaseCode::XY, PhaseCode::ACN) => &[path!(X, A), path!(Y, C), ADD_NEUTRAL],
        (PhaseCode::XY, PhaseCode::XYN) => &[path!(X, X), path!(Y, Y), ADD_NEUTRAL],
        (PhaseCode::XY, PhaseCode::AN) => &[path!(X, A), ADD_NEUTRAL],
        (PhaseCode::XY, PhaseCode::BN) => &[path!(X, B), ADD_NEUTRAL],
        (PhaseCode::XY, PhaseCode::CN) => &[path!(X, C), ADD_NEUTRAL],
        (PhaseCode::XY, PhaseCode::XN) => &[path!(X, X), ADD_NEUTRAL],
        (PhaseCode::XY, PhaseCode::AB) => &[path!(X, A), path!(Y, B)],
        (PhaseCode::XY, PhaseCode::BC) => &[path!(X, B), path!(Y, C)],
        (PhaseCode::XY, PhaseCode::AC) => &[path!(X, A), path!(Y, C)],
        (PhaseCode::XY, PhaseCode::XY) => &[path!(X, X), path!(Y, Y)],
        (PhaseCode::XY, PhaseCode::A) => &[path!(X, A)],
        (PhaseCode::XY, PhaseCode::B) => &[path!(X, B)],
        (PhaseCode::XY, PhaseCode::C) => &[path!(X, C)],
        (PhaseCode::XY, PhaseCode::X) => &[path!(X, X)],

        (PhaseCode::A, PhaseCode::AN) => &[path!(A, A), ADD_NEUTRAL],
        (PhaseCode::A, PhaseCode::XN) => &[path!(A, X), ADD_NEUTRAL],
        (PhaseCode::A, PhaseCode::AB) => &[path!(A, A), path!(NoPhase, B)],
        (PhaseCode::A, PhaseCode::XY) => &[path!(A, X), path!(NoPhase, Y)],
        (PhaseCode::A, PhaseCode::A) => &[path!(A, A)],
        (PhaseCode::A, PhaseCode::X) => &[path!(A, X)],
        (PhaseCode::A, PhaseCode::ABN) => &[path!(A, A), path!(NoPhase, B), ADD_NEUTRAL],
        (PhaseCode::A, PhaseCode::XYN) => &[path!(A, X), path!(NoPhase, Y), ADD_NEUTRAL],

        (PhaseCode::B, PhaseCode::BN) => &[path!(B, B), ADD_NEUTRAL],
        (PhaseCode::B, PhaseCode::XN) => &[path!(B, X), ADD_NEUTRAL],
        (PhaseCode::B, PhaseCode::BC) => &[path!(B, B), path!(NoPhase, C)],
        (PhaseCode::B, PhaseCode::XY) => &[path!(B, X), path!(NoPhase, Y)],
        (PhaseCode::B, PhaseCode::B) => &[path!(B, B)],
        (PhaseCode::B, PhaseCode::X) => &[path!(B, X)],
        (PhaseCode::B, PhaseCode::BCN) => &[path!(B, B), path!(NoPhase, C), ADD_NEUTRAL],
        (PhaseCode::B, PhaseCode::XYN) => &[path!(B, X), path!(NoPhase, Y), ADD_NEUTRAL],

        (PhaseCode::C, PhaseCode::CN) => &[path!(C, C), ADD_NEUTRAL],
        (PhaseCode::C, PhaseCode::XN) => &[path!(C, X), ADD_NEUTRAL],
        (PhaseCode::C, PhaseCode::AC) => &[path!(C, C), path!(NoPhase, A)],
        (PhaseCode::C, PhaseCode::XY) => &[path!(C, X), path!(NoPhase, Y)],
        (PhaseCode::C, PhaseCode::C) => &[path!(C, C)],
        (PhaseCode::C, PhaseCode::X) => &[path!(C, X)],
        (PhaseCode::C, PhaseCode::ACN) => &[path!(C, C), path!(NoPhase, A), ADD_NEUTRAL],
        (PhaseCode::C, PhaseCode::XYN) => &[path!(C, X), path!(NoPhase, Y), ADD_NEUTRAL],

        (PhaseCode::X, PhaseCode::AN) => &[path!(X, A), ADD_NEUTRAL],
        (PhaseCode::X, PhaseCode::BN) => &[path!(X, B), ADD_NEUTRAL],
        (PhaseCode::X, PhaseCode::CN) => &[path!(X, C), ADD_NEUTRAL],
        (PhaseCode::X, PhaseCode::XN) => &[path!(X, X), ADD_NEUTRAL],
        (PhaseCode::X, PhaseCode::AB) => &[path!(X, A), path!(NoPhase, B)],
        (PhaseCode::X, PhaseCode::BC) => &[path!(X, B), path!(NoPhase, C)],
        (PhaseCode::X, PhaseCode::AC) => &[path!(X, C), path!(NoPhase, A)],
        (PhaseCode::X, PhaseCode::XY) => &[path!(X, X), path!(NoPhase, Y)],
        (PhaseCode::X, PhaseCode::A) => &[path!(X, A)],
        (PhaseCode::X, PhaseCode::B) => &[path!(X, B)],
        (PhaseCode::X, PhaseCode::C) => &[path!(X, C)],
        (PhaseCode::X, PhaseCode::X) => &[path!(X, X)],
        (PhaseCode::X, PhaseCode::ABN) => &[path!(X, A), path!(NoPhase, B), ADD_NEUTRAL],
        (PhaseCode::X, PhaseCode::BCN) => &[path!(X, B), path!(NoPhase, C), ADD_NEUTRAL],
        (PhaseCode::X, PhaseCode::ACN) => &[path!(X, C), path!(NoPhase, A), ADD_NEUTRAL],
        (PhaseCode::X, PhaseCode::XYN) => &[path!(X, X), path!(NoPhase, Y), ADD_NEUTRAL],

        _ => &[],
    }
}
