// src/integer_math/barrett.rs
//
// Barrett-style reduction for the classifier's pass-1 loop. `p` is a
// factor-base prime (fits in 32 bits unsigned); `x` is a signed 32-bit
// sieve offset. A generic remainder is unnecessary because the
// reciprocal bounds the error to at most one correction.

/// `floor(2^32 / p)`, precomputed once per factor-base prime and stored
/// alongside it (`pinvArrayL` in spec.md §3).
pub fn reciprocal(p: u64) -> u64 {
    debug_assert!(p > 0 && p <= u32::MAX as u64);
    (1u64 << 32) / p
}

/// Reduce `x` modulo `p` using the precomputed reciprocal, normalising
/// the result into `[0, p)`. Equivalent to `((x mod p) + p) mod p` for
/// every `p` in `[1, 2^32)` and every `x` in `[-2^31, 2^31)` — this is
/// the property spec.md §8 scenario 6 asks for.
pub fn reduce(x: i32, p: u64, reciprocal: u64) -> u32 {
    let p_i64 = p as i64;

    if (x as i64).abs() < p_i64 {
        return if x < 0 { (x as i64 + p_i64) as u32 } else { x as u32 };
    }

    // x * reciprocal never overflows signed 64 bits: |x| < 2^31 and
    // reciprocal <= 2^32, so the product is bounded by 2^63.
    let q = ((x as i64) * (reciprocal as i64)) >> 32;
    let mut r = x as i64 - q * p_i64;

    // The reciprocal's rounding error is at most ±1 unit of p; a single
    // correction in either direction always lands in [0, p).
    if r < 0 {
        r += p_i64;
    } else if r >= p_i64 {
        r -= p_i64;
    }

    r as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduce_naive(x: i32, p: i64) -> u32 {
        (((x as i64) % p + p) % p) as u32
    }

    #[test]
    fn matches_naive_mod_across_small_primes_and_offsets() {
        for &p in &[2u64, 3, 7, 251, 65521, 4294967291] {
            let recip = reciprocal(p);
            for x in (-2000i32..=2000).step_by(7) {
                assert_eq!(
                    reduce(x, p, recip) as i64,
                    reduce_naive(x, p as i64) as i64,
                    "p={} x={}",
                    p,
                    x
                );
            }
        }
    }

    #[test]
    fn handles_the_full_signed_32_bit_range_boundaries() {
        let p = 1_000_003u64;
        let recip = reciprocal(p);
        for &x in &[i32::MIN, i32::MIN + 1, -1, 0, 1, i32::MAX - 1, i32::MAX] {
            assert_eq!(reduce(x, p, recip) as i64, reduce_naive(x, p as i64) as i64);
        }
    }
}
