// src/algorithms/mod.rs
//
// Small-factor engines (C2): a size-dispatch table over Hart's one-line
// method and the two Pollard-ρ/Brent variants, the way the GNFS workbench
// this grew out of dispatched trial division / Pollard-ρ / quadratic
// sieve / GNFS by digit count. Here the dispatch key is bit-length and
// the tiers top out at 63 bits — everything past that is the nested SIQS
// collaborator's job (`crate::siqs::Factoriser`), not this module's.

pub mod hart;
pub mod lehman;
pub mod pollard_rho;
pub mod trial_division;

use log::{debug, info};

/// Which of the three native-width engines handled a residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmallFactorEngine {
    /// Hart's one-line method. Fastest below ~50 bits.
    Hart,
    /// Pollard-ρ/Brent over a plain `u128` widen-multiply. 50-57 bits.
    PollardRhoBrent,
    /// Pollard-ρ/Brent over true Montgomery multiplication. 57-63 bits.
    PollardRhoBrentMontgomery,
}

impl SmallFactorEngine {
    /// Picks the engine tier for a residue of the given bit-length, per
    /// the thresholds spec.md §4.4 assigns each C2 engine.
    pub fn for_bit_length(bits: u32) -> Self {
        let engine = match bits {
            0..=49 => SmallFactorEngine::Hart,
            50..=56 => SmallFactorEngine::PollardRhoBrent,
            _ => SmallFactorEngine::PollardRhoBrentMontgomery,
        };

        debug!("small-factor engine for {}-bit residue: {:?}", bits, engine);
        engine
    }
}

/// Iteration budgets for each engine tier. Generous enough that a
/// genuine within-domain composite almost never exhausts its budget;
/// exhaustion is reported as `None` rather than panicking, matching
/// spec.md's "returns 1 on failure" convention translated to `Option`.
const HART_ITERATIONS: u64 = 1_000_000;
const POLLARD_ITERATIONS: usize = 1_000_000;

/// Splits a composite 63-bit-or-smaller residue using the size-dispatched
/// small-factor engine, falling through to the next, stronger engine if
/// the chosen one exhausts its iteration budget without finding a factor.
/// Returns `None` only if every tier up to and including the Montgomery
/// variant fails — the caller (the classifier) then hands the residue to
/// the nested SIQS collaborator.
pub fn split_small_factor(n: u64, bits: u32) -> Option<u64> {
    info!("splitting {}-bit residue via the small-factor engine chain", bits);

    match SmallFactorEngine::for_bit_length(bits) {
        SmallFactorEngine::Hart => hart::hart_one_line(n, HART_ITERATIONS)
            .or_else(|| pollard_rho::pollard_rho_brent64(n, POLLARD_ITERATIONS))
            .or_else(|| pollard_rho::pollard_rho_brent_montgomery64(n, POLLARD_ITERATIONS)),
        SmallFactorEngine::PollardRhoBrent => pollard_rho::pollard_rho_brent64(n, POLLARD_ITERATIONS)
            .or_else(|| pollard_rho::pollard_rho_brent_montgomery64(n, POLLARD_ITERATIONS)),
        SmallFactorEngine::PollardRhoBrentMontgomery => {
            pollard_rho::pollard_rho_brent_montgomery64(n, POLLARD_ITERATIONS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_hart_below_fifty_bits() {
        assert_eq!(SmallFactorEngine::for_bit_length(30), SmallFactorEngine::Hart);
        assert_eq!(SmallFactorEngine::for_bit_length(49), SmallFactorEngine::Hart);
    }

    #[test]
    fn dispatches_plain_pollard_rho_in_the_middle_band() {
        assert_eq!(SmallFactorEngine::for_bit_length(50), SmallFactorEngine::PollardRhoBrent);
        assert_eq!(SmallFactorEngine::for_bit_length(56), SmallFactorEngine::PollardRhoBrent);
    }

    #[test]
    fn dispatches_montgomery_pollard_rho_above_the_middle_band() {
        assert_eq!(
            SmallFactorEngine::for_bit_length(57),
            SmallFactorEngine::PollardRhoBrentMontgomery
        );
        assert_eq!(
            SmallFactorEngine::for_bit_length(63),
            SmallFactorEngine::PollardRhoBrentMontgomery
        );
    }

    #[test]
    fn split_small_factor_finds_a_factor_of_a_small_semiprime() {
        let n = 8051u64; // 83 × 97
        let f = split_small_factor(n, 13).expect("factor expected");
        assert!(f > 1 && f < n);
        assert_eq!(n % f, 0);
    }
}
