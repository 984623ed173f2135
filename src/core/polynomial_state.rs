// src/core/polynomial_state.rs
//
// The polynomial coefficients the classifier needs between
// `initialise_for_A`/`set_B` calls: `d*a`, `b`, and the current `k*N`.
// `A(x) = d*a*x + b`; `Q(x) = A(x)^2 - k*N`.

use num::{BigInt, Integer};

#[derive(Debug, Clone)]
pub struct PolynomialState {
    /// `d * a`, where `d` is 1 or 2 depending on `(k*N) mod 8`.
    pub da: BigInt,
    pub b: BigInt,
    pub kn: BigInt,
}

impl PolynomialState {
    pub fn new(kn: BigInt) -> Self {
        PolynomialState {
            da: BigInt::from(0),
            b: BigInt::from(0),
            kn,
        }
    }

    /// `d` is 2 when `k*N ≡ 1 (mod 8)` and 1 otherwise; it folds a
    /// factor of 2 into `a` so that `A(x)` hits the right residue class.
    pub fn d_for(kn: &BigInt) -> u32 {
        let eight = BigInt::from(8);
        if kn.mod_floor(&eight) == BigInt::from(1) {
            2
        } else {
            1
        }
    }

    pub fn set_a(&mut self, a: BigInt) {
        let d = Self::d_for(&self.kn);
        self.da = a * d;
    }

    pub fn set_b(&mut self, b: BigInt) {
        self.b = b;
    }

    pub fn evaluate_a(&self, x: i64) -> BigInt {
        &self.da * x + &self.b
    }

    pub fn evaluate_q(&self, x: i64) -> BigInt {
        let a_x = self.evaluate_a(x);
        &a_x * &a_x - &self.kn
    }
}
