// src/classifier.rs
//
// C4: the trial-division / relation classifier. The largest component of
// this crate (spec.md §2 puts it at 45% of the core): consumes sieve
// candidates, trial-divides Q(x) against the factor base, and dispatches
// whatever residue is left over to the probable-prime oracle, the C2
// small-factor engines, or a nested SIQS instance, emitting AQ-pair
// relations for the ones that turn out smooth enough.

use std::time::Instant;

use log::{debug, warn};
use num::{BigInt, BigUint, Signed, ToPrimitive, Zero};

use crate::algorithms;
use crate::core::aq_pair::{AQPair, MAX_LARGE_FACTOR};
use crate::core::factor_base::FactorBaseView;
use crate::core::polynomial_state::PolynomialState;
use crate::core::small_factors::SmallFactors;
use crate::core::stats::Stats;
use crate::integer_math::prime_oracle;
use crate::siqs::Factoriser;

/// One classifier instance is bound to one polynomial at a time; `'a` is
/// the lifetime of the factor-base view installed by `initialise_for_A`
/// (spec.md §3's ownership note: "the classifier holds a non-owning view
/// for the lifetime of one polynomial").
pub struct TrialDivisionClassifier<'a> {
    polynomial: Option<PolynomialState>,
    max_q_rest: BigUint,
    profile: bool,
    base: Option<FactorBaseView<'a>>,
    p_max_squared: u64,
    nested_siqs: Box<dyn Factoriser>,
    stats: Stats,
}

impl<'a> TrialDivisionClassifier<'a> {
    /// `nested_siqs` is injected here, at construction, per spec.md §9's
    /// "builder injects at construction" resolution of the
    /// classifier/SIQS cyclic dependency.
    pub fn new(nested_siqs: Box<dyn Factoriser>) -> Self {
        TrialDivisionClassifier {
            polynomial: None,
            max_q_rest: BigUint::from(1u32),
            profile: false,
            base: None,
            p_max_squared: 1,
            nested_siqs,
            stats: Stats::new(),
        }
    }

    /// Stores the current `k*N` and the smoothness cutoff. `max_q_rest`
    /// bounds the unfactored residue above which a candidate is rejected
    /// without further work.
    pub fn initialise_for_n(&mut self, kn: BigInt, max_q_rest: BigUint, profile: bool) {
        self.polynomial = Some(PolynomialState::new(kn));
        self.max_q_rest = max_q_rest;
        self.profile = profile;
    }

    /// As `initialise_for_n`, but scales `base_max_q_rest` by
    /// `config.max_q_rest_profile` first -- the hook a deployment uses to
    /// loosen or tighten the partial-relation acceptance rate without
    /// recompiling.
    pub fn initialise_for_n_with_config(
        &mut self,
        kn: BigInt,
        base_max_q_rest: BigUint,
        profile: bool,
        config: &crate::config::EngineConfig,
    ) {
        let max_q_rest = config.scale_max_q_rest(&base_max_q_rest);
        self.initialise_for_n(kn, max_q_rest, profile);
    }

    /// Installs polynomial coefficients and the factor-base view for the
    /// next group of candidates; computes `pMax²` as a 63-bit integer.
    pub fn initialise_for_a(&mut self, a: BigInt, b: BigInt, base: FactorBaseView<'a>) {
        let polynomial = self
            .polynomial
            .as_mut()
            .expect("initialise_for_n must run before initialise_for_a");
        polynomial.set_a(a);
        polynomial.set_b(b);

        self.p_max_squared = base.p_max_squared();
        self.base = Some(base);
    }

    /// Updates only the linear coefficient between sub-polynomials that
    /// share `a`.
    pub fn set_b(&mut self, b: BigInt) {
        let polynomial = self
            .polynomial
            .as_mut()
            .expect("initialise_for_a must run before set_b");
        polynomial.set_b(b);
    }

    pub fn report(&self) -> &Stats {
        &self.stats
    }

    pub fn clean_up(&mut self) {
        self.base = None;
    }

    /// Computes `A(x)`/`Q(x)` for every `x` in `x_list` from the stored
    /// polynomial and classifies each. Emitted AQ-pairs appear in the
    /// same order as their input sieve positions (spec.md §5).
    pub fn test_list(&mut self, x_list: &[i32]) -> Vec<AQPair> {
        let polynomial = self
            .polynomial
            .as_ref()
            .expect("initialise_for_n must run before test_list")
            .clone();

        x_list
            .iter()
            .filter_map(|&x| {
                let a = polynomial.evaluate_a(x as i64);
                let q = polynomial.evaluate_q(x as i64);
                self.test(&a, &q, x)
            })
            .collect()
    }

    /// The per-candidate algorithm (spec.md §4.1). Any rejection is
    /// silent: the classifier never errors, it just doesn't emit a pair.
    pub fn test(&mut self, a: &BigInt, q: &BigInt, x: i32) -> Option<AQPair> {
        let overall_start = self.profile.then(Instant::now);
        if self.profile {
            self.stats.record_test();
        }

        let mut small_factors = SmallFactors::new();

        // Step 1: sign extraction.
        let mut q_rest: BigUint = if q.is_negative() {
            small_factors.add(-1);
            (-q).to_biguint().expect("negated negative BigInt is non-negative")
        } else {
            q.to_biguint().expect("non-negative BigInt converts to BigUint")
        };

        // Step 2: power-of-two reduction.
        let mut v2 = 0u32;
        while !q_rest.is_zero() && !q_rest.bit(0) {
            q_rest >>= 1usize;
            v2 += 1;
        }
        if v2 > 0 {
            small_factors.add_with_exponent(2, v2);
        }

        // Step 3: pass 1 -- candidate-prime selection via Barrett
        // reduction against the stored factor-base view.
        let pass1_start = self.profile.then(Instant::now);
        let base = self
            .base
            .as_ref()
            .expect("initialise_for_a must run before test");
        let mut pass2_work = Vec::with_capacity(100);

        for idx in base.unsieved_indices() {
            pass2_work.push(*idx);
        }

        let entries = base.entries();
        for i in (1..entries.len()).rev() {
            let entry = &entries[i];
            let p = entry.p_array;
            let recip = entry.pinv_array_l;
            let r = crate::integer_math::barrett::reduce(x, p, recip);

            if r as i32 == entry.x1 || r as i32 == entry.x2 {
                pass2_work.push(i);
            }
        }
        if let Some(start) = pass1_start {
            self.stats.pass1_duration += start.elapsed();
        }

        // Step 4: pass 2 -- division.
        let pass2_start = self.profile.then(Instant::now);
        for &idx in &pass2_work {
            let entry = &entries[idx];
            let divisor = BigUint::from(entry.p_array);
            while !q_rest.is_zero() && (&q_rest % &divisor).is_zero() {
                q_rest /= &divisor;
                small_factors.add_with_exponent(entry.prime as i64, entry.exponent);
            }
        }
        if let Some(start) = pass2_start {
            self.stats.pass2_duration += start.elapsed();
        }

        // Step 5: classification by Q_rest.
        let result = if q_rest == BigUint::from(1u32) {
            if self.profile {
                self.stats.record_smooth();
            }
            debug!(
                "classifier: smooth relation at x={}{}",
                x,
                small_factors.format_string_as_factorization()
            );
            Some(AQPair::SmoothPerfect {
                a: a.clone(),
                small_factors,
            })
        } else if q_rest >= self.max_q_rest {
            debug!("classifier: rejecting candidate x={}, Q_rest too large", x);
            None
        } else {
            if self.profile {
                self.stats.record_q_rest_bits(q_rest.bits());
            }
            self.classify_large_residue(a, q_rest, small_factors, x)
        };

        if let Some(start) = overall_start {
            self.stats.aq_duration += start.elapsed();
        }

        result
    }

    fn classify_large_residue(
        &mut self,
        a: &BigInt,
        q_rest: BigUint,
        small_factors: SmallFactors,
        x: i32,
    ) -> Option<AQPair> {
        let prime_test_start = self.profile.then(Instant::now);
        let is_prime = if q_rest < BigUint::from(self.p_max_squared) {
            true
        } else {
            prime_oracle::is_probable_prime(&q_rest)
        };
        if let Some(start) = prime_test_start {
            self.stats.prime_test_duration += start.elapsed();
        }

        if is_prime {
            return match q_rest.to_i64() {
                Some(p) if p <= MAX_LARGE_FACTOR => {
                    if self.profile {
                        self.stats.record_smooth();
                    }
                    Some(AQPair::Partial1Large {
                        a: a.clone(),
                        small_factors,
                        p,
                    })
                }
                _ => {
                    warn!("classifier: rejecting x={}, prime residue exceeds 31 bits", x);
                    None
                }
            };
        }

        let factor_start = self.profile.then(Instant::now);
        let split = self.split_composite(&q_rest);
        if let Some(start) = factor_start {
            self.stats.factor_duration += start.elapsed();
        }

        let (f1, f2) = split?;
        if &f1 * &f2 != q_rest {
            debug_assert!(false, "split factors must multiply back to Q_rest");
            return None;
        }

        let (f1, f2) = match (f1.to_i64(), f2.to_i64()) {
            (Some(f1), Some(f2)) if f1 <= MAX_LARGE_FACTOR && f2 <= MAX_LARGE_FACTOR => (f1, f2),
            _ => {
                warn!("classifier: rejecting x={}, a large factor exceeds 31 bits", x);
                return None;
            }
        };

        if self.profile {
            self.stats.record_smooth();
        }
        if f1 == f2 {
            Some(AQPair::Smooth1LargeSquare {
                a: a.clone(),
                small_factors,
                p: f1,
            })
        } else {
            let (p1, p2) = if f1 < f2 { (f1, f2) } else { (f2, f1) };
            Some(AQPair::Partial2Large {
                a: a.clone(),
                small_factors,
                p1,
                p2,
            })
        }
    }

    /// Dispatches a composite `Q_rest` to the size-dispatched C2 engines
    /// when it still fits in 63 bits, or to the nested SIQS collaborator
    /// otherwise (spec.md §4.1 step 5).
    fn split_composite(&self, q_rest: &BigUint) -> Option<(BigUint, BigUint)> {
        let bits = q_rest.bits() as u32;

        if bits < 63 {
            let n = q_rest.to_u64()?;
            let f1 = algorithms::split_small_factor(n, bits)?;
            if f1 == 0 || n % f1 != 0 {
                return None;
            }
            let f2 = n / f1;
            Some((BigUint::from(f1), BigUint::from(f2)))
        } else {
            self.nested_siqs.split(q_rest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::factor_base::FactorBaseEntry;
    use crate::integer_math::barrett;
    use crate::siqs::RecursiveSmallFactorSplitter;

    fn entry(prime: u64, x1: i32, x2: i32) -> FactorBaseEntry {
        FactorBaseEntry {
            prime,
            p_array: prime,
            exponent: 1,
            pinv_array_l: barrett::reciprocal(prime),
            x1,
            x2,
        }
    }

    #[test]
    fn all_zeros_x_list_returns_empty_when_nothing_is_smooth() {
        let mut classifier = TrialDivisionClassifier::new(Box::new(RecursiveSmallFactorSplitter::default()));
        classifier.initialise_for_n(BigInt::from(91), BigUint::from(1_000_000u32), false);

        let entries = vec![entry(2, 0, 0), entry(3, 0, 0)];
        let base = FactorBaseView::new(&entries, &[]);
        classifier.initialise_for_a(BigInt::from(1), BigInt::from(1), base);

        let results = classifier.test_list(&[0, 0, 0]);
        assert!(results.is_empty());
    }

    #[test]
    fn emits_smooth_perfect_when_q_rest_fully_divides_out() {
        // kN = 91 = 7*13, a = x, so Q(x) = x^2 - 91. Pick x=10 -> Q=9=3^2.
        let mut classifier = TrialDivisionClassifier::new(Box::new(RecursiveSmallFactorSplitter::default()));
        classifier.initialise_for_n(BigInt::from(91), BigUint::from(1_000_000u32), false);

        let three = entry(3, 1, 1); // x mod 3 must hit 1 for x=10 (10 mod 3 = 1)
        let entries = vec![entry(2, 0, 0), three];
        let base = FactorBaseView::new(&entries, &[]);
        classifier.initialise_for_a(BigInt::from(1), BigInt::from(0), base);

        let results = classifier.test_list(&[10]);
        assert_eq!(results.len(), 1);
        match &results[0] {
            AQPair::SmoothPerfect { a, small_factors } => {
                assert_eq!(a, &BigInt::from(10));
                assert_eq!(small_factors.exponent_of(3), 2);
            }
            other => panic!("expected SmoothPerfect, got {:?}", other),
        }
    }

    #[test]
    fn rejects_a_residue_at_or_above_max_q_rest() {
        let mut classifier = TrialDivisionClassifier::new(Box::new(RecursiveSmallFactorSplitter::default()));
        classifier.initialise_for_n(BigInt::from(91), BigUint::from(2u32), false);

        let entries = vec![entry(2, 0, 0)];
        let base = FactorBaseView::new(&entries, &[]);
        classifier.initialise_for_a(BigInt::from(1), BigInt::from(0), base);

        // Q(10) = 100 - 91 = 9, no base primes match x=10 here beyond 2
        // (which never divides the odd 9), so Q_rest stays 9 >= maxQRest(2).
        let results = classifier.test_list(&[10]);
        assert!(results.is_empty());
    }

    #[test]
    fn initialise_for_n_with_config_scales_the_smoothness_cutoff() {
        // kN = 91 = 7*13; Q(12) = 144 - 91 = 53, a prime residue. With a
        // base cutoff of 1 it would be rejected outright (53 >= 1); the
        // profile of 60.0 widens that to 60, which 53 clears.
        let mut config = crate::config::EngineConfig::default();
        config.max_q_rest_profile = 60.0;

        let mut classifier = TrialDivisionClassifier::new(Box::new(RecursiveSmallFactorSplitter::default()));
        classifier.initialise_for_n_with_config(BigInt::from(91), BigUint::from(1u32), false, &config);

        let entries = vec![entry(2, 0, 0)];
        let base = FactorBaseView::new(&entries, &[]);
        classifier.initialise_for_a(BigInt::from(1), BigInt::from(0), base);

        let results = classifier.test_list(&[12]);
        assert_eq!(results.len(), 1);
        match &results[0] {
            AQPair::Partial1Large { p, .. } => assert_eq!(*p, 53),
            other => panic!("expected Partial1Large, got {:?}", other),
        }
    }
}
