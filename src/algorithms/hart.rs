// src/algorithms/hart.rs
//
// Hart's "one line" factorization: for i = 1, 2, 3, ..., test whether
// 4*i*n is a perfect square plus a small residue, i.e. whether
// s = ceil(sqrt(4*i*n)) satisfies s² - 4*i*n is itself a perfect square.
// When it does, gcd(s - sqrt(s² - 4in), n) yields a factor. The fastest
// of the three C2 small-factor engines on its intended range (spec.md
// §4.4, "< 50 bits") because it needs only an integer square root per
// iteration and no cycle-detection state.

use log::debug;

use crate::integer_math::gcd::gcd_u64;
use crate::integer_math::isqrt::isqrt_u128;

/// Runs Hart's one-line method against `n` for `i` in `1..=max_iterations`.
/// Returns a non-trivial factor, or `None` if the budget is exhausted
/// without finding one.
pub fn hart_one_line(n: u64, max_iterations: u64) -> Option<u64> {
    if n <= 1 {
        return None;
    }
    if n % 2 == 0 {
        return Some(2);
    }

    let n128 = n as u128;

    for i in 1..=max_iterations {
        let four_i_n = 4 * i as u128 * n128;
        let s = isqrt_u128(four_i_n) + 1;
        let t_squared = s * s - four_i_n;
        let t = isqrt_u128(t_squared);

        if t * t == t_squared {
            let candidate = gcd_u64((s - t) as u64, n);
            if candidate > 1 && candidate < n {
                debug!("Hart one-line: found factor {} after i={} iterations", candidate, i);
                return Some(candidate);
            }
        }
    }

    debug!("Hart one-line: no factor found within {} iterations", max_iterations);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_factor_of_a_small_semiprime() {
        let n = 8051u64; // 83 × 97
        let f = hart_one_line(n, 10_000).expect("factor expected");
        assert!(f > 1 && f < n);
        assert_eq!(n % f, 0);
    }

    #[test]
    fn finds_a_factor_of_a_larger_semiprime() {
        let n = 1_000_730_021u64; // 31193 × 32069
        let f = hart_one_line(n, 100_000).expect("factor expected");
        assert!(f > 1 && f < n);
        assert_eq!(n % f, 0);
    }

    #[test]
    fn handles_an_even_input_directly() {
        assert_eq!(hart_one_line(1000, 100), Some(2));
    }
}
