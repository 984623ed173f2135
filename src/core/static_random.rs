// src/core/static_random.rs
//
// Process-scoped, cryptographically seeded PRNG.
//
// A single ChaCha8 stream is seeded once from the OS CSPRNG and then
// "warmed up" by discarding a random number of outputs, matching the
// convention used everywhere else in this crate: this avoids handing out
// the first few outputs of a freshly seeded stream, which some CSPRNG
// constructions treat specially.

use num::BigUint;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct StaticRandom {
    rng: ChaCha8Rng,
}

impl StaticRandom {
    pub fn new() -> Self {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill(&mut seed);
        let mut rng = ChaCha8Rng::from_seed(seed);
        let counter = rng.gen_range(100..200);
        for _ in 0..counter {
            rng.gen::<u32>();
        }
        StaticRandom { rng }
    }

    pub fn next_bytes(&mut self, bytes: &mut [u8]) {
        self.rng.fill(bytes);
    }

    /// Uniform sample from `[lo, hi)`. If `hi <= lo` the range is treated as
    /// having width 1 (a single valid value at `lo`), per the generator's
    /// promotion rule for degenerate ranges.
    pub fn next_biguint_range(&mut self, lo: &BigUint, hi: &BigUint) -> BigUint {
        if hi <= lo {
            return lo.clone();
        }

        let width = hi - lo;
        let byte_len = width.to_bytes_be().len().max(1);
        let mut buffer = vec![0u8; byte_len];

        loop {
            self.next_bytes(&mut buffer);
            let candidate = BigUint::from_bytes_be(&buffer);
            if candidate < width {
                return lo + candidate;
            }
        }
    }

    /// Draw a uniformly random integer with exactly `bits` bits: the top bit
    /// is forced to 1 and the remaining `bits - 1` bits are random.
    pub fn next_biguint_with_bits(&mut self, bits: u32) -> BigUint {
        assert!(bits > 0, "bit length must be positive");

        let byte_len = ((bits as usize) + 7) / 8;
        let mut buffer = vec![0u8; byte_len];
        self.next_bytes(&mut buffer);

        let mut value = BigUint::from_bytes_be(&buffer);
        let total_bits = (byte_len as u32) * 8;

        // Clear any bits above the requested width, then force the top bit.
        if total_bits > bits {
            value >>= total_bits - bits;
        }
        value.set_bit((bits - 1) as u64, true);
        value
    }
}
