// src/config/engine_config.rs
//
// Tunable knobs for the relation core, loaded through the `config` crate
// with the same layered precedence the teacher workbench uses for its
// own tuning knobs: built-in defaults, then an optional config file,
// then environment variables (prefix `SIQS_`) override on top.

use config::{Config, ConfigError, Environment, File};
use num::{BigUint, FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine-wide tuning knobs. None of these change the *semantics* spec.md
/// fixes (classification rules, the Lehman bucket table's divisibility
/// rules, the generator's five modes) — they only adjust budgets and
/// toggles spec.md explicitly leaves to the implementation: the
/// smoothness cutoff profile, whether Lehman's trial-division sweep runs
/// up front or after the bucket search, how far the Lehman table is
/// built, and how many consecutive rejects the generator tolerates
/// before logging instead of spinning silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Logging level (error, warn, info, debug, trace).
    pub log_level: String,

    /// Multiplies the classifier's `maxQRest` smoothness cutoff relative
    /// to the caller-supplied base value; `1.0` leaves it unchanged.
    /// Exists so a deployment can loosen or tighten the partial-relation
    /// acceptance rate without recompiling.
    pub max_q_rest_profile: f64,

    /// Lehman tuning.
    pub lehman: LehmanConfig,

    /// Generator tuning.
    pub generator: GeneratorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LehmanConfig {
    /// Whether the cheap trial-division sweep to `cbrt(N)` runs before
    /// the bucketed multiplier search (spec.md §4.2: "a construction-time
    /// flag").
    pub trial_division_upfront: bool,

    /// How many multipliers the bucketed table is built for; defaults to
    /// `K_MAX` (2^20). Lower values trade completeness for construction
    /// speed on repeated short-lived `LehmanFactoriser` instances.
    pub k_limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Consecutive reject-and-retry attempts tolerated per accepted value
    /// before the generator logs and resets its counter rather than
    /// spinning silently forever.
    pub max_attempts_per_accept: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            log_level: "info".to_string(),
            max_q_rest_profile: 1.0,
            lehman: LehmanConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl Default for LehmanConfig {
    fn default() -> Self {
        LehmanConfig {
            trial_division_upfront: true,
            k_limit: crate::algorithms::lehman::K_MAX,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            max_attempts_per_accept: 100_000,
        }
    }
}

impl EngineConfig {
    /// Applies `max_q_rest_profile` to a caller-supplied base cutoff. The
    /// classifier itself (`initialise_for_n`) still takes `maxQRest`
    /// verbatim per spec.md §4.1's contract; this is where the
    /// deployment-tunable multiplier is actually applied, before that
    /// call. `1.0` returns `base` unchanged.
    pub fn scale_max_q_rest(&self, base: &BigUint) -> BigUint {
        if self.max_q_rest_profile == 1.0 {
            return base.clone();
        }

        let scaled = base.to_f64().unwrap_or(f64::MAX) * self.max_q_rest_profile;
        if scaled <= 0.0 {
            return BigUint::from(0u32);
        }
        BigUint::from_f64(scaled).unwrap_or_else(|| base.clone())
    }

    fn builder_with_defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let defaults = EngineConfig::default();
        Config::builder()
            .set_default("log_level", defaults.log_level)?
            .set_default("max_q_rest_profile", defaults.max_q_rest_profile)?
            .set_default("lehman.trial_division_upfront", defaults.lehman.trial_division_upfront)?
            .set_default("lehman.k_limit", defaults.lehman.k_limit as i64)?
            .set_default(
                "generator.max_attempts_per_accept",
                defaults.generator.max_attempts_per_accept as i64,
            )
    }

    /// Load configuration with precedence: defaults -> config file ->
    /// environment variables (`SIQS_*`).
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::builder_with_defaults()?;

        if Path::new("siqs.toml").exists() {
            builder = builder.add_source(File::with_name("siqs.toml"));
        } else if Path::new("siqs.yaml").exists() {
            builder = builder.add_source(File::with_name("siqs.yaml"));
        }

        builder = builder.add_source(
            Environment::with_prefix("SIQS").separator("_").try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Load configuration with a specific file path instead of the
    /// default `siqs.toml`/`siqs.yaml` search.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut builder = Self::builder_with_defaults()?;

        if path.as_ref().exists() {
            builder = builder.add_source(File::from(path.as_ref()));
        }

        builder = builder.add_source(
            Environment::with_prefix("SIQS").separator("_").try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_budgets() {
        let config = EngineConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.max_q_rest_profile, 1.0);
        assert!(config.lehman.trial_division_upfront);
        assert_eq!(config.lehman.k_limit, crate::algorithms::lehman::K_MAX);
        assert_eq!(config.generator.max_attempts_per_accept, 100_000);
    }

    #[test]
    fn load_without_a_config_file_falls_back_to_defaults() {
        let config = EngineConfig::load().unwrap_or_else(|_| EngineConfig::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn default_profile_leaves_max_q_rest_unchanged() {
        let config = EngineConfig::default();
        let base = BigUint::from(1_000_000u32);
        assert_eq!(config.scale_max_q_rest(&base), base);
    }

    #[test]
    fn scale_max_q_rest_applies_the_configured_multiplier() {
        let mut config = EngineConfig::default();
        config.max_q_rest_profile = 2.0;
        assert_eq!(
            config.scale_max_q_rest(&BigUint::from(1_000_000u32)),
            BigUint::from(2_000_000u32)
        );

        config.max_q_rest_profile = 0.5;
        assert_eq!(
            config.scale_max_q_rest(&BigUint::from(1_000_000u32)),
            BigUint::from(500_000u32)
        );
    }
}
