// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the `FeederDirection` enum, which represents the
//! direction of power flow at a terminal relative to its feeder head.

use std::fmt::Display;

/// The direction of a terminal relative to the head of its feeder.
///
/// `Both` is only legitimate at loop or tie points fed from two paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum FeederDirection {
    #[default]
    None,
    Upstream,
    Downstream,
    Both,
}

impl FeederDirection {
    fn bits(self) -> u8 {
        match self {
            FeederDirection::None => 0b00,
            FeederDirection::Upstream => 0b01,
            FeederDirection::Downstream => 0b10,
            FeederDirection::Both => 0b11,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b01 => FeederDirection::Upstream,
            0b10 => FeederDirection::Downstream,
            0b11 => FeederDirection::Both,
            _ => FeederDirection::None,
        }
    }

    /// Whether this direction contains all bits of `other`.
    ///
    /// Every direction contains `None`, and `Both` contains everything.
    pub fn has(self, other: FeederDirection) -> bool {
        self.bits() & other.bits() == other.bits()
    }

    /// The union of this direction and `other`.
    pub fn plus(self, other: FeederDirection) -> FeederDirection {
        FeederDirection::from_bits(self.bits() | other.bits())
    }

    /// This direction with the bits of `other` removed.
    pub fn minus(self, other: FeederDirection) -> FeederDirection {
        FeederDirection::from_bits(self.bits() & !other.bits())
    }
}

impl Display for FeederDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeederDirection::None => write!(f, "NONE"),
            FeederDirection::Upstream => write!(f, "UPSTREAM"),
            FeederDirection::Downstream => write!(f, "DOWNSTREAM"),
            FeederDirection::Both => write!(f, "BOTH"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus() {
        assert_eq!(
            FeederDirection::None.plus(FeederDirection::Upstream),
            FeederDirection::Upstream
        );
        assert_eq!(
            FeederDirection::Upstream.plus(FeederDirection::Downstream),
            FeederDirection::Both
        );
        assert_eq!(
            FeederDirection::Both.plus(FeederDirection::Upstream),
            FeederDirection::Both
        );
    }

    #[test]
    fn test_minus() {
        assert_eq!(
            FeederDirection::Both.minus(FeederDirection::Upstream),
            FeederDirection::Downstream
        );
        assert_eq!(
            FeederDirection::Downstream.minus(FeederDirection::Downstream),
            FeederDirection::None
        );
        assert_eq!(
            FeederDirection::Upstream.minus(FeederDirection::Downstream),
            FeederDirection::Upstream
        );
    }

    #[test]
    fn test_has() {
        assert!(FeederDirection::Both.has(FeederDirection::Upstream));
        assert!(FeederDirection::Both.has(FeederDirection::Downstream));
        assert!(FeederDirection::Upstream.has(FeederDirection::Upstream));
        assert!(!FeederDirection::Upstream.has(FeederDirection::Downstream));
        assert!(FeederDirection::None.has(FeederDirection::None));
        assert!(!FeederDirection::None.has(FeederDirection::Both));
    }
}
