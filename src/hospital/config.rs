use super::distribution::TimeDistribution;
use super::stage::{PerStage, Stage};
use crate::core::error::SimError;
use serde::{Deserialize, Serialize};

/// How a patient leaves a stage whose service has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPolicy {
    /// Release the slot as soon as service ends, then queue for the next stage
    #[default]
    Release,
    /// Keep the operating room until a recovery slot is granted
    BlockOperatingRoom,
    /// Keep every slot until the next stage's slot is granted
    BlockAll,
}

impl FlowPolicy {
    /// Whether `stage` stays held after its service ends
    pub fn holds_after_service(self, stage: Stage) -> bool {
        if stage.next().is_none() {
            return false;
        }
        match self {
            FlowPolicy::Release => false,
            FlowPolicy::BlockOperatingRoom => stage == Stage::OperatingRoom,
            FlowPolicy::BlockAll => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub capacity: usize,
    pub total_capacity: usize,
    pub service_time: TimeDistribution,
}

impl StageConfig {
    /// Stage with `capacity` staffed slots and no spare ceiling
    pub fn new(capacity: usize, service_time: TimeDistribution) -> Self {
        Self {
            capacity,
            total_capacity: capacity,
            service_time,
        }
    }

    /// Set the hard ceiling staffing can be raised to mid-run
    ///
    /// # Arguments
    /// * `total_capacity` - Maximum number of slots, must be at least `capacity`
    ///
    /// # Returns
    /// A new stage configuration with the specified ceiling
    pub fn with_total_capacity(mut self, total_capacity: usize) -> Self {
        self.total_capacity = total_capacity;
        self
    }
}

/// Parameters of one hospital run. All times are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalConfig {
    pub arrivals: TimeDistribution,
    pub stages: PerStage<StageConfig>,
    pub monitor_interval: f64,
    pub sim_duration: f64,
    pub random_seed: Option<u64>,
    pub flow_policy: FlowPolicy,
}

impl Default for HospitalConfig {
    fn default() -> Self {
        Self {
            arrivals: TimeDistribution::exponential(25.0),
            stages: PerStage {
                preparation: StageConfig::new(3, TimeDistribution::exponential(40.0)),
                operating_room: StageConfig::new(1, TimeDistribution::exponential(20.0)),
                recovery: StageConfig::new(3, TimeDistribution::exponential(40.0)),
            },
            monitor_interval: 5.0,
            sim_duration: 24.0 * 60.0,
            random_seed: Some(42),
            flow_policy: FlowPolicy::Release,
        }
    }
}

impl HospitalConfig {
    /// Create a configuration of the reference ward (see [`Default`])
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inter-arrival gap distribution
    ///
    /// # Arguments
    /// * `arrivals` - Distribution of the time between consecutive patients
    ///
    /// # Returns
    /// A new configuration with the specified arrival process
    pub fn with_arrivals(mut self, arrivals: TimeDistribution) -> Self {
        self.arrivals = arrivals;
        self
    }

    /// Replace the whole configuration of one stage
    ///
    /// # Arguments
    /// * `stage` - The stage to configure
    /// * `config` - Staffing, ceiling and service time of that stage
    ///
    /// # Returns
    /// A new configuration with the specified stage
    pub fn with_stage(mut self, stage: Stage, config: StageConfig) -> Self {
        self.stages[stage] = config;
        self
    }

    /// Set the initial staffing of one stage
    ///
    /// # Arguments
    /// * `stage` - The stage to staff
    /// * `capacity` - Number of staffed slots
    ///
    /// # Returns
    /// A new configuration with the specified staffing
    ///
    /// # Note
    /// The stage's total capacity is raised to `capacity` if it was lower
    pub fn with_capacity(mut self, stage: Stage, capacity: usize) -> Self {
        self.stages[stage].capacity = capacity;
        self.stages[stage].total_capacity = self.stages[stage].total_capacity.max(capacity);
        self
    }

    /// Set the service time distribution of one stage
    ///
    /// # Arguments
    /// * `stage` - The stage to change
    /// * `service_time` - Distribution of a single service at that stage
    ///
    /// # Returns
    /// A new configuration with the specified service time
    pub fn with_service_time(mut self, stage: Stage, service_time: TimeDistribution) -> Self {
        self.stages[stage].service_time = service_time;
        self
    }

    /// Set the interval between monitor samples
    ///
    /// # Arguments
    /// * `interval` - Time between samples, must be positive
    ///
    /// # Returns
    /// A new configuration with the specified sampling interval
    pub fn with_monitor_interval(mut self, interval: f64) -> Self {
        self.monitor_interval = interval;
        self
    }

    /// Set the horizon used by `run_to_horizon` and replications
    ///
    /// # Arguments
    /// * `duration` - Length of the run in minutes
    ///
    /// # Returns
    /// A new configuration with the specified horizon
    pub fn with_sim_duration(mut self, duration: f64) -> Self {
        self.sim_duration = duration;
        self
    }

    /// Set the RNG seed
    ///
    /// # Arguments
    /// * `seed` - Seed for reproducible runs, `None` to seed from entropy
    ///
    /// # Returns
    /// A new configuration with the specified seed
    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        self.random_seed = seed;
        self
    }

    /// Set how patients leave a finished stage
    ///
    /// # Arguments
    /// * `policy` - Whether finished stages are released or held
    ///
    /// # Returns
    /// A new configuration with the specified flow policy
    pub fn with_flow_policy(mut self, policy: FlowPolicy) -> Self {
        self.flow_policy = policy;
        self
    }

    pub fn stage(&self, stage: Stage) -> &StageConfig {
        &self.stages[stage]
    }

    /// Check every parameter before a model is built from this configuration
    ///
    /// # Returns
    /// `Ok(())` if every distribution is valid, each stage's capacity fits its
    /// ceiling and the monitor interval and horizon are usable
    pub fn validate(&self) -> Result<(), SimError> {
        self.arrivals.validate()?;

        for (stage, config) in self.stages.iter() {
            if config.capacity > config.total_capacity {
                return Err(SimError::CapacityExceedsTotal {
                    pool: stage.name().to_string(),
                    requested: config.capacity,
                    total: config.total_capacity,
                });
            }
            config.service_time.validate()?;
        }

        if !self.monitor_interval.is_finite() || self.monitor_interval <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "monitor_interval {} must be finite and > 0",
                self.monitor_interval
            )));
        }

        if !self.sim_duration.is_finite() || self.sim_duration < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "sim_duration {} must be finite and >= 0",
                self.sim_duration
            )));
        }

        Ok(())
    }
}
