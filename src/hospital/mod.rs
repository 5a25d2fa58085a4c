//! Three-stage surgery unit: preparation, operating room and recovery.

pub mod config;
pub mod distribution;
pub mod model;
pub mod patient;
pub mod replication;
pub mod results;
pub mod simulation;
pub mod stage;

pub use config::{FlowPolicy, HospitalConfig, StageConfig};
pub use distribution::TimeDistribution;
pub use replication::run_replications;
pub use results::{PatientSummary, SimulationResult, Summary, UtilizationSample};
pub use simulation::HospitalSimulation;
pub use stage::{PerStage, Stage};
