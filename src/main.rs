// src/main.rs
//
// Small demo front-end: generates a handful of hard semiprimes via the
// C5 generator, then runs the Lehman ordered-k search (C3) against them
// as a sanity pass. Full SIQS sieving, polynomial generation, and the
// matrix step live outside this crate's scope (spec.md §1) and are not
// invoked here.

use env_logger::Env;
use log::{info, warn};

use siqs_relation_core::algorithms::lehman::LehmanFactoriser;
use siqs_relation_core::config::EngineConfig;
use siqs_relation_core::core::static_random::StaticRandom;
use siqs_relation_core::generator;

fn main() {
    let config = EngineConfig::load().unwrap_or_else(|err| {
        eprintln!("falling back to default engine config: {}", err);
        EngineConfig::default()
    });

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.clone())).init();

    info!("engine config: {:?}", config);

    let mut rng = StaticRandom::new();
    let lehman = LehmanFactoriser::from_config(&config.lehman);

    let bits = 48;
    let count = 5;
    let values = match generator::generate_with_config(
        &mut rng,
        count,
        bits,
        "HardSemiprime",
        config.generator.max_attempts_per_accept,
    ) {
        Ok(values) => values,
        Err(err) => {
            eprintln!("generator error: {}", err);
            return;
        }
    };

    for n in &values {
        match n.to_u64_digits().as_slice() {
            [lo] => {
                let factor = lehman.find_single_factor(*lo);
                if factor > 1 && factor < *lo {
                    println!("{} = {} * {}", lo, factor, lo / factor);
                } else {
                    warn!("Lehman found no factor for {} within budget", lo);
                }
            }
            _ => println!("{} (wider than 64 bits, outside the Lehman demo path)", n),
        }
    }
}
