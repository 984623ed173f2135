// src/algorithms/pollard_rho.rs
//
// Pollard's Rho with Brent's cycle detection, specialised to native 64-bit
// moduli for the classifier's small-factor-engine dispatch (spec.md §4.1
// step 5, §4.4): one variant doing the per-step squaring with a plain
// `u128` widen-multiply, one doing it in true Montgomery form. Both keep
// Brent's batching (powers-of-two segment doubling, GCD every up-to-100
// steps with backtracking on an unlucky `d == n`) from the original
// BigInt-based implementation, just over native integers.

use log::debug;

use crate::integer_math::gcd::gcd_u64;

const TRIAL_C_VALUES: [u64; 5] = [1, 2, 3, 5, 7];

fn add_mod(a: u64, b: u64, n: u64) -> u64 {
    let s = a as u128 + b as u128;
    let s = if s >= n as u128 { s - n as u128 } else { s };
    s as u64
}

fn abs_diff(a: u64, b: u64) -> u64 {
    if a > b { a - b } else { b - a }
}

/// Pollard-ρ / Brent over a plain `u128` widen-multiply, suitable while
/// `n` stays under 57 bits — the point at which `a * b` as a `u128` still
/// leaves enough headroom that the reduction never needs a second
/// correction pass. Used as the first small-factor engine above Hart's
/// one-line method (spec.md §4.4, "< 57 bits").
pub fn pollard_rho_brent64(n: u64, max_iterations: usize) -> Option<u64> {
    if n <= 1 {
        return None;
    }
    if n % 2 == 0 {
        return Some(2);
    }

    for &c in &TRIAL_C_VALUES {
        debug!("Pollard-ρ/Brent (u128): trying c = {}", c);
        if let Some(factor) = brent64_with_c(n, max_iterations, 2 % n, c, |x, c, n| {
            let squared = (x as u128 * x as u128) % n as u128;
            add_mod(squared as u64, c, n)
        }) {
            return Some(factor);
        }
    }

    debug!("Pollard-ρ/Brent (u128): no factor found after trying all c values");
    None
}

/// Pollard-ρ / Brent over a true Montgomery multiplier (`R = 2^64`),
/// suitable up to the full 63-bit residue width the classifier ever hands
/// a C2 engine (spec.md §4.4, "< 63 bits"). Montgomery form turns the
/// per-step reduction into a multiply-high plus one conditional
/// subtraction instead of a 128-bit division, which matters once `n`
/// itself occupies nearly the full 64-bit word.
pub fn pollard_rho_brent_montgomery64(n: u64, max_iterations: usize) -> Option<u64> {
    if n <= 1 {
        return None;
    }
    if n % 2 == 0 {
        return Some(2);
    }

    let mont = Montgomery64::new(n);

    for &c in &TRIAL_C_VALUES {
        debug!("Pollard-ρ/Brent (Montgomery): trying c = {}", c);
        let c_m = mont.to_mont(c % n);
        let y0 = mont.to_mont(2 % n);
        if let Some(factor) = brent64_with_c(n, max_iterations, y0, c_m, |x, c, _n| {
            add_mod(mont.mont_mul(x, x), c, mont.n)
        }) {
            return Some(factor);
        }
    }

    debug!("Pollard-ρ/Brent (Montgomery): no factor found after trying all c values");
    None
}

/// Shared Brent-cycle-detection driver: segment-doubling batches of
/// squarings, a GCD check every up to 100 steps, and a backtracking
/// re-walk if the batched GCD lands on `n` itself rather than a proper
/// factor. `step` computes one application of `f(x) = x² + c (mod n)` in
/// whatever domain the caller's multiplication lives in (plain or
/// Montgomery); the GCD is always taken on the domain value directly
/// against `n`, which is valid because Montgomery's `R` is coprime to any
/// odd `n` and therefore preserves every GCD with `n` exactly.
fn brent64_with_c(
    n: u64,
    max_iterations: usize,
    initial_y: u64,
    c: u64,
    step: impl Fn(u64, u64, u64) -> u64,
) -> Option<u64> {
    let mut y = initial_y;
    let mut r = 1usize;
    let mut q = 1u64;
    let mut iterations = 0usize;

    loop {
        let x = y;
        for _ in 0..r {
            y = step(y, c, n);
        }

        let mut k = 0usize;
        while k < r && iterations < max_iterations {
            let ys = y;
            let m = (r - k).min(100);

            for _ in 0..m {
                y = step(y, c, n);
                q = ((q as u128 * abs_diff(x, y) as u128) % n as u128) as u64;
                iterations += 1;
            }

            let d = gcd_u64(q, n);

            if d > 1 {
                if d == n {
                    let mut d2 = 1u64;
                    let mut y2 = ys;
                    while d2 == 1 {
                        y2 = step(y2, c, n);
                        d2 = gcd_u64(abs_diff(x, y2), n);
                    }
                    if d2 < n {
                        debug!("Pollard-ρ/Brent: found factor after {} iterations (backtracked)", iterations);
                        return Some(d2);
                    }
                } else {
                    debug!("Pollard-ρ/Brent: found factor after {} iterations", iterations);
                    return Some(d);
                }
            }

            k += m;
        }

        if iterations >= max_iterations {
            break;
        }

        r *= 2;
    }

    debug!("Pollard-ρ/Brent: no factor found after {} iterations", iterations);
    None
}

/// Montgomery multiplication modulo an odd 64-bit `n`, with `R = 2^64`.
struct Montgomery64 {
    n: u64,
    /// `-n⁻¹ mod 2^64`, the REDC multiplier.
    n_inv_neg: u64,
    /// `R² mod n`, used to move an ordinary residue into Montgomery form.
    r2: u64,
}

impl Montgomery64 {
    fn new(n: u64) -> Self {
        debug_assert!(n % 2 == 1, "Montgomery form requires an odd modulus");

        // Newton's iteration for the inverse of an odd n modulo 2^64:
        // each pass doubles the number of correct bits, starting from the
        // trivially-correct single bit (n is odd, so n * 1 ≡ 1 mod 2).
        let mut inv = 1u64;
        for _ in 0..6 {
            inv = inv.wrapping_mul(2u64.wrapping_sub(n.wrapping_mul(inv)));
        }
        let n_inv_neg = inv.wrapping_neg();

        let r_mod_n = ((1u128 << 64) % n as u128) as u64;
        let r2 = ((r_mod_n as u128 * r_mod_n as u128) % n as u128) as u64;

        Montgomery64 { n, n_inv_neg, r2 }
    }

    fn redc(&self, t: u128) -> u64 {
        let m = (t as u64).wrapping_mul(self.n_inv_neg);
        let reduced = (t + m as u128 * self.n as u128) >> 64;
        let reduced = reduced as u64;
        if reduced >= self.n { reduced - self.n } else { reduced }
    }

    fn mont_mul(&self, a: u64, b: u64) -> u64 {
        self.redc(a as u128 * b as u128)
    }

    fn to_mont(&self, a: u64) -> u64 {
        self.mont_mul(a, self.r2)
    }
}
