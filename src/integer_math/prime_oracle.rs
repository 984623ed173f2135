// src/integer_math/prime_oracle.rs
//
// C1: the probable-prime oracle. spec.md treats this as an external
// collaborator ("BPSW-equivalent"); this module is the one narrow seam
// through which every other module reaches it, backed by num-prime's
// combined Miller-Rabin + strong Lucas (BPSW) test.

use num::BigUint;
use num_prime::nt_funcs;
use num_prime::traits::PrimalityTestConfig;

/// BPSW-equivalent probable-primality test on an arbitrary-precision
/// magnitude. Used by the classifier once `Q_rest >= pMax^2`.
pub fn is_probable_prime(n: &BigUint) -> bool {
    nt_funcs::is_prime(n, Some(PrimalityTestConfig::strict())).probably()
}

/// The first probable prime strictly greater than `n`, used by the
/// hard-semiprime generator's "next_probable_prime on a random draw"
/// step (spec.md §4.3).
pub fn next_probable_prime(n: &BigUint) -> BigUint {
    nt_funcs::next_prime(n, Some(PrimalityTestConfig::strict()))
        .expect("next_prime search space is effectively unbounded for BigUint")
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::FromPrimitive;

    #[test]
    fn recognises_small_primes_and_composites() {
        assert!(is_probable_prime(&BigUint::from_u32(97).unwrap()));
        assert!(!is_probable_prime(&BigUint::from_u32(91).unwrap()));
    }

    #[test]
    fn next_probable_prime_after_a_composite() {
        let n = BigUint::from_u32(100).unwrap();
        let next = next_probable_prime(&n);
        assert_eq!(next, BigUint::from_u32(101).unwrap());
    }
}
