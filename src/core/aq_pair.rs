// src/core/aq_pair.rs
//
// AQ-pair relations: the building block the matrix solver downstream
// consumes. Four tagged variants depending on how much of Q(x) was left
// over after trial division against the factor base.

use num::BigInt;

use crate::core::small_factors::SmallFactors;

/// The largest "large" factor this core will ever emit. Matches the
/// signed-32-bit ceiling spec.md places on every residue it hands off to
/// the matrix solver.
pub const MAX_LARGE_FACTOR: i64 = i32::MAX as i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AQPair {
    /// `Q_rest == 1`: fully smooth over the factor base.
    SmoothPerfect {
        a: BigInt,
        small_factors: SmallFactors,
    },
    /// `Q_rest == p²` for a prime `p > pMax`.
    Smooth1LargeSquare {
        a: BigInt,
        small_factors: SmallFactors,
        p: i64,
    },
    /// `Q_rest` is a single prime `p > pMax`, `p` fits in 31 bits.
    Partial1Large {
        a: BigInt,
        small_factors: SmallFactors,
        p: i64,
    },
    /// `Q_rest = p1 * p2`, two distinct primes each fitting in 31 bits.
    Partial2Large {
        a: BigInt,
        small_factors: SmallFactors,
        p1: i64,
        p2: i64,
    },
}

impl AQPair {
    pub fn a(&self) -> &BigInt {
        match self {
            AQPair::SmoothPerfect { a, .. }
            | AQPair::Smooth1LargeSquare { a, .. }
            | AQPair::Partial1Large { a, .. }
            | AQPair::Partial2Large { a, .. } => a,
        }
    }

    pub fn small_factors(&self) -> &SmallFactors {
        match self {
            AQPair::SmoothPerfect { small_factors, .. }
            | AQPair::Smooth1LargeSquare { small_factors, .. }
            | AQPair::Partial1Large { small_factors, .. }
            | AQPair::Partial2Large { small_factors, .. } => small_factors,
        }
    }

    /// True for relations that still carry one or two uncombined large
    /// primes and therefore need a matching partial before they can enter
    /// the matrix as a full relation.
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            AQPair::Partial1Large { .. } | AQPair::Partial2Large { .. }
        )
    }
}
