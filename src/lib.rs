pub mod core;
pub mod hospital;

// Re-export commonly used types
pub use crate::core::error::SimError;
pub use crate::core::execution::{ConcurrencyMode, ReplicationConfig};
pub use crate::core::types::SimTime;
pub use crate::hospital::{
    FlowPolicy, HospitalConfig, HospitalSimulation, SimulationResult, Stage, StageConfig,
    TimeDistribution,
};
