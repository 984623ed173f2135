// src/config/mod.rs

pub mod engine_config;

pub use engine_config::{EngineConfig, GeneratorConfig, LehmanConfig};
