use super::config::HospitalConfig;
use super::distribution::TimeDistribution;
use super::model::HospitalModel;
use super::patient::PatientId;
use super::results::SimulationResult;
use super::stage::Stage;
use crate::core::error::SimError;
use crate::core::execution::simulation_engine::{SimulationEngine, SimulationObserver};
use crate::core::resource::ResourcePool;
use crate::core::types::SimTime;
use log::{error, info};

/// Run controller of the surgery unit.
///
/// The simulation advances in bounded increments with [`run_for`](Self::run_for).
/// Staffing and distribution changes are made between increments; there is a single
/// thread of control, so they can never interleave with an advance.
///
/// An error raised while advancing (a rejected duration draw, say) stops the run
/// at the failing event and is kept: every later advance returns it again.
pub struct HospitalSimulation {
    engine: SimulationEngine<HospitalModel>,
    horizon: f64,
    failure: Option<SimError>,
}

impl HospitalSimulation {
    /// Build the model and schedule the monitor and arrival generator
    pub fn new(config: &HospitalConfig) -> Result<Self, SimError> {
        let mut engine = SimulationEngine::new(HospitalModel::new(config)?);
        let (model, scheduler) = engine.model_and_scheduler();
        model.start(scheduler)?;

        info!(
            "hospital simulation ready: capacities prep={} or={} recovery={}, policy {:?}, seed {:?}",
            config.stage(Stage::Preparation).capacity,
            config.stage(Stage::OperatingRoom).capacity,
            config.stage(Stage::Recovery).capacity,
            config.flow_policy,
            config.random_seed
        );

        Ok(Self {
            engine,
            horizon: config.sim_duration,
            failure: None,
        })
    }

    /// Advance `duration` time units from the current time. Events landing exactly on
    /// the end point are executed.
    ///
    /// # Errors
    /// `InvalidDelay` for a negative or non-finite `duration`, or the error that
    /// stopped an earlier advance.
    pub fn run_for(&mut self, duration: f64) -> Result<u64, SimError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(SimError::InvalidDelay { delay: duration });
        }

        let target = self.engine.now() + duration;
        let executed = match self.engine.run_until(target) {
            Ok(executed) => executed,
            Err(e) => {
                error!("simulation stopped at t={}: {}", self.engine.now(), e);
                self.failure = Some(e.clone());
                return Err(e);
            }
        };
        info!(
            "advanced to t={} ({} events, {} arrivals so far)",
            target,
            executed,
            self.engine.model().patients().len()
        );
        Ok(executed)
    }

    /// Advance to the configured horizon (`sim_duration`), if not already past it
    pub fn run_to_horizon(&mut self) -> Result<u64, SimError> {
        let remaining = (self.horizon - self.now().as_f64()).max(0.0);
        self.run_for(remaining)
    }

    /// Error that stopped the run, if any
    pub fn failure(&self) -> Option<&SimError> {
        self.failure.as_ref()
    }

    pub fn set_capacity(&mut self, stage: Stage, capacity: usize) -> Result<(), SimError> {
        let (model, scheduler) = self.engine.model_and_scheduler();
        model.set_capacity(stage, capacity, scheduler)
    }

    pub fn set_total_capacity(&mut self, stage: Stage, total: usize) -> Result<(), SimError> {
        let (model, _) = self.engine.model_and_scheduler();
        model.set_total_capacity(stage, total)
    }

    pub fn set_service_time(&mut self, stage: Stage, service_time: TimeDistribution) -> Result<(), SimError> {
        let (model, _) = self.engine.model_and_scheduler();
        model.set_service_time(stage, service_time)
    }

    pub fn set_arrivals(&mut self, arrivals: TimeDistribution) -> Result<(), SimError> {
        let (model, _) = self.engine.model_and_scheduler();
        model.set_arrivals(arrivals)
    }

    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.engine.add_observer(observer);
    }

    pub fn now(&self) -> SimTime {
        self.engine.now()
    }

    pub fn pool(&self, stage: Stage) -> &ResourcePool<PatientId> {
        self.engine.model().pool_for(stage)
    }

    pub fn model(&self) -> &HospitalModel {
        self.engine.model()
    }

    /// Completed patients and the full monitor series as of now
    pub fn collect_results(&self) -> SimulationResult {
        SimulationResult::from_model(self.engine.model(), self.engine.now())
    }
}
