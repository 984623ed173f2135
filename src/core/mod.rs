// src/core/mod.rs

pub mod aq_pair;
pub mod factor_base;
pub mod polynomial_state;
pub mod small_factors;
pub mod static_random;
pub mod stats;

pub use aq_pair::AQPair;
pub use factor_base::{FactorBaseEntry, FactorBaseView};
pub use polynomial_state::PolynomialState;
pub use small_factors::SmallFactors;
pub use static_random::StaticRandom;
pub use stats::Stats;
