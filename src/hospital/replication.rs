use super::config::HospitalConfig;
use super::results::SimulationResult;
use super::simulation::HospitalSimulation;
use crate::core::error::SimError;
use crate::core::execution::config::{ConcurrencyMode, ReplicationConfig};
use log::info;
use rayon::prelude::*;

/// Run one independent simulation per seed up to the configured horizon.
///
/// Results come back in seed order whatever the concurrency mode.
pub fn run_replications(
    config: &HospitalConfig,
    replication: &ReplicationConfig,
) -> Result<Vec<SimulationResult>, SimError> {
    config.validate()?;
    let seeds: Vec<u64> = replication.seeds().collect();
    info!(
        "running {} replications ({:?}) from seed {}",
        seeds.len(),
        replication.concurrency_mode,
        replication.base_seed
    );

    match replication.concurrency_mode {
        ConcurrencyMode::Sequential => seeds.iter().map(|&seed| run_one(config, seed)).collect(),
        ConcurrencyMode::Rayon => {
            let run_all = || -> Result<Vec<SimulationResult>, SimError> {
                seeds.par_iter().map(|&seed| run_one(config, seed)).collect()
            };

            match replication.thread_pool_size {
                Some(size) => rayon::ThreadPoolBuilder::new()
                    .num_threads(size)
                    .build()
                    .map_err(|e| SimError::InvalidConfig(format!("thread pool: {}", e)))?
                    .install(run_all),
                None => run_all(),
            }
        }
    }
}

fn run_one(config: &HospitalConfig, seed: u64) -> Result<SimulationResult, SimError> {
    let config = config.clone().with_random_seed(Some(seed));
    let mut simulation = HospitalSimulation::new(&config)?;
    simulation.run_to_horizon()?;
    Ok(simulation.collect_results())
}
