use log::info;
use surgsim::hospital::{HospitalConfig, HospitalSimulation, Stage};
use surgsim::SimError;

/// One day on the default ward, advanced an hour at a time. A second operating
/// room is opened for the afternoon and closed again in the evening.
fn main() -> Result<(), SimError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = HospitalConfig::default();
    let mut sim = HospitalSimulation::new(&config)?;
    sim.set_total_capacity(Stage::OperatingRoom, 2)?;

    let hours = (config.sim_duration / 60.0).ceil() as usize;
    for hour in 0..hours {
        match hour {
            12 => sim.set_capacity(Stage::OperatingRoom, 2)?,
            18 => sim.set_capacity(Stage::OperatingRoom, 1)?,
            _ => {}
        }
        sim.run_for(60.0)?;
    }

    let result = sim.collect_results();
    let summary = result.summary();

    info!("=== SURGERY UNIT REPORT (t = {}) ===", result.end_time);
    info!(
        "Patients: {} arrived, {} completed, {} still inside",
        summary.arrivals, summary.completed, summary.in_system
    );
    if let Some(total) = summary.mean_total_time {
        info!("Mean time in system: {:.1} min", total);
    }
    for stage in Stage::ALL {
        info!(
            "  {:<9} wait {:>6.1}  service {:>6.1}  blocked {:>5.1}  queue {:>5.2}  util {:>5.2}",
            stage.name(),
            summary.mean_wait[stage].unwrap_or(0.0),
            summary.mean_service[stage].unwrap_or(0.0),
            summary.mean_blocked[stage].unwrap_or(0.0),
            summary.mean_queue_length[stage].unwrap_or(0.0),
            summary.mean_utilization[stage].unwrap_or(0.0),
        );
    }

    Ok(())
}
