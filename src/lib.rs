// src/lib.rs
//
// Self-initialising quadratic sieve relation core: the trial-division
// classifier (C4), the Lehman ordered-k search (C3), and the
// hard-semiprime generator (C5), plus the small-factor engines (C2) and
// probable-prime oracle (C1) they depend on. Full SIQS sieving,
// polynomial generation, and the matrix step are out of scope; the
// `siqs::Factoriser` trait is this crate's seam onto whatever recursive
// SIQS instance a surrounding driver supplies.

pub mod algorithms;
pub mod classifier;
pub mod config;
pub mod core;
pub mod error;
pub mod generator;
pub mod integer_math;
pub mod siqs;
