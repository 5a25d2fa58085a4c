use super::config::{FlowPolicy, HospitalConfig};
use super::distribution::TimeDistribution;
use super::patient::{Patient, PatientId, PatientState};
use super::results::UtilizationSample;
use super::stage::{PerStage, Stage};
use crate::core::error::SimError;
use crate::core::event_scheduler::EventScheduler;
use crate::core::execution::simulation_engine::Model;
use crate::core::resource::{RequestOutcome, ResourcePool};
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Continuations of the hospital processes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HospitalEvent {
    /// The arrival generator wakes up: a patient arrives and the next gap is drawn
    Arrival,
    /// A queued patient was granted `stage` and starts service
    Resume { patient: PatientId, stage: Stage },
    /// The sampled service time of `stage` has elapsed
    ServiceEnd { patient: PatientId, stage: Stage },
    /// The monitor takes a snapshot of every pool
    MonitorTick,
}

/// State of the surgery unit: three pools, every patient seen so far and the
/// monitor's time series.
#[derive(Debug, Clone)]
pub struct HospitalModel {
    pools: PerStage<ResourcePool<PatientId>>,
    service_times: PerStage<TimeDistribution>,
    arrivals: TimeDistribution,
    flow_policy: FlowPolicy,
    monitor_interval: f64,
    rng: StdRng,
    patients: Vec<Patient>,
    samples: Vec<UtilizationSample>,
}

impl HospitalModel {
    pub fn new(config: &HospitalConfig) -> Result<Self, SimError> {
        config.validate()?;

        let pools = PerStage {
            preparation: Self::pool(config, Stage::Preparation)?,
            operating_room: Self::pool(config, Stage::OperatingRoom)?,
            recovery: Self::pool(config, Stage::Recovery)?,
        };

        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            pools,
            service_times: config.stages.map(|_, stage| stage.service_time),
            arrivals: config.arrivals,
            flow_policy: config.flow_policy,
            monitor_interval: config.monitor_interval,
            rng,
            patients: Vec::new(),
            samples: Vec::new(),
        })
    }

    fn pool(config: &HospitalConfig, stage: Stage) -> Result<ResourcePool<PatientId>, SimError> {
        let stage_config = config.stage(stage);
        ResourcePool::new(stage.name(), stage_config.capacity, stage_config.total_capacity)
    }

    /// Schedule the always-on processes: the monitor first, then the arrival generator
    pub fn start(&mut self, scheduler: &mut EventScheduler<HospitalEvent>) -> Result<(), SimError> {
        scheduler.schedule(0.0, HospitalEvent::MonitorTick)?;
        let gap = self.arrivals.sample(&mut self.rng)?;
        scheduler.schedule(gap, HospitalEvent::Arrival)?;
        Ok(())
    }

    pub fn pool_for(&self, stage: Stage) -> &ResourcePool<PatientId> {
        &self.pools[stage]
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn samples(&self) -> &[UtilizationSample] {
        &self.samples
    }

    pub fn flow_policy(&self) -> FlowPolicy {
        self.flow_policy
    }

    pub fn service_time(&self, stage: Stage) -> TimeDistribution {
        self.service_times[stage]
    }

    /// Restaff a pool. Waiters granted by an increase resume at the current instant.
    pub fn set_capacity(
        &mut self,
        stage: Stage,
        capacity: usize,
        scheduler: &mut EventScheduler<HospitalEvent>,
    ) -> Result<(), SimError> {
        let old = self.pools[stage].capacity();
        let granted = self.pools[stage].set_capacity(capacity)?;
        info!(
            "t={} {} capacity {} -> {} ({} waiting patients granted)",
            scheduler.now(),
            stage,
            old,
            capacity,
            granted.len()
        );

        for patient in granted {
            scheduler.schedule(0.0, HospitalEvent::Resume { patient, stage })?;
        }
        Ok(())
    }

    pub fn set_total_capacity(&mut self, stage: Stage, total: usize) -> Result<(), SimError> {
        self.pools[stage].set_total_capacity(total)?;
        info!("{} total capacity set to {}", stage, total);
        Ok(())
    }

    /// Applies to services that start from now on
    pub fn set_service_time(&mut self, stage: Stage, service_time: TimeDistribution) -> Result<(), SimError> {
        service_time.validate()?;
        self.service_times[stage] = service_time;
        Ok(())
    }

    /// Applies from the gap after the already scheduled arrival
    pub fn set_arrivals(&mut self, arrivals: TimeDistribution) -> Result<(), SimError> {
        arrivals.validate()?;
        self.arrivals = arrivals;
        Ok(())
    }

    fn patient_mut(&mut self, id: PatientId) -> &mut Patient {
        &mut self.patients[(id - 1) as usize]
    }

    fn on_arrival(&mut self, scheduler: &mut EventScheduler<HospitalEvent>) -> Result<(), SimError> {
        // a failed draw must not leave a half-admitted patient behind
        let gap = self.arrivals.sample(&mut self.rng)?;

        let id = self.patients.len() as PatientId + 1;
        self.patients.push(Patient::new(id, scheduler.now()));
        debug!("t={} patient {} arrives", scheduler.now(), id);

        self.enter_queue(id, Stage::Preparation, scheduler)?;
        scheduler.schedule(gap, HospitalEvent::Arrival)?;
        Ok(())
    }

    fn enter_queue(
        &mut self,
        id: PatientId,
        stage: Stage,
        scheduler: &mut EventScheduler<HospitalEvent>,
    ) -> Result<(), SimError> {
        let now = scheduler.now();
        self.patient_mut(id).record_mut(stage).queue_enter = Some(now);

        match self.pools[stage].request(id) {
            RequestOutcome::Granted => self.begin_service(id, stage, scheduler),
            RequestOutcome::Queued { position } => {
                trace!("t={} patient {} queued for {} at position {}", now, id, stage, position);
                let patient = self.patient_mut(id);
                let holding = stage
                    .previous()
                    .filter(|prev| patient.record(*prev).holds_slot());
                patient.state = match holding {
                    Some(prev) => PatientState::Blocked(prev),
                    None => PatientState::Awaiting(stage),
                };
                Ok(())
            }
        }
    }

    fn begin_service(
        &mut self,
        id: PatientId,
        stage: Stage,
        scheduler: &mut EventScheduler<HospitalEvent>,
    ) -> Result<(), SimError> {
        let now = scheduler.now();
        // drawn at service start so distribution changes only affect later services,
        // and before any bookkeeping so a failed draw leaves the patient untouched
        let duration = self.service_times[stage].sample(&mut self.rng)?;

        let patient = self.patient_mut(id);
        patient.record_mut(stage).service_start = Some(now);
        patient.state = PatientState::InService(stage);

        if let Some(prev) = stage.previous() {
            if self.patient_mut(id).record(prev).holds_slot() {
                self.release_slot(id, prev, scheduler)?;
            }
        }

        trace!("t={} patient {} starts {} for {:.3}", now, id, stage, duration);
        scheduler.schedule(duration, HospitalEvent::ServiceEnd { patient: id, stage })?;
        Ok(())
    }

    fn release_slot(
        &mut self,
        id: PatientId,
        stage: Stage,
        scheduler: &mut EventScheduler<HospitalEvent>,
    ) -> Result<(), SimError> {
        self.patient_mut(id).record_mut(stage).released_at = Some(scheduler.now());

        if let Some(next) = self.pools[stage].release()? {
            scheduler.schedule(0.0, HospitalEvent::Resume { patient: next, stage })?;
        }
        Ok(())
    }

    fn on_service_end(
        &mut self,
        id: PatientId,
        stage: Stage,
        scheduler: &mut EventScheduler<HospitalEvent>,
    ) -> Result<(), SimError> {
        let now = scheduler.now();
        self.patient_mut(id).record_mut(stage).service_end = Some(now);

        if self.flow_policy.holds_after_service(stage) {
            self.patient_mut(id).state = PatientState::Blocked(stage);
        } else {
            self.release_slot(id, stage, scheduler)?;
        }

        match stage.next() {
            Some(next) => self.enter_queue(id, next, scheduler),
            None => {
                let patient = self.patient_mut(id);
                patient.state = PatientState::Done;
                debug!(
                    "t={} patient {} departs after {:.3}",
                    now,
                    id,
                    now - patient.arrival_time
                );
                Ok(())
            }
        }
    }

    fn on_monitor_tick(&mut self, scheduler: &mut EventScheduler<HospitalEvent>) -> Result<(), SimError> {
        let now = scheduler.now();
        for stage in Stage::ALL {
            self.samples
                .push(UtilizationSample::new(now, stage, self.pools[stage].snapshot()));
        }
        scheduler.schedule(self.monitor_interval, HospitalEvent::MonitorTick)?;
        Ok(())
    }
}

impl Model for HospitalModel {
    type Event = HospitalEvent;

    fn react(
        &mut self,
        event: HospitalEvent,
        scheduler: &mut EventScheduler<HospitalEvent>,
    ) -> Result<(), SimError> {
        match event {
            HospitalEvent::Arrival => self.on_arrival(scheduler),
            HospitalEvent::Resume { patient, stage } => self.begin_service(patient, stage, scheduler),
            HospitalEvent::ServiceEnd { patient, stage } => self.on_service_end(patient, stage, scheduler),
            HospitalEvent::MonitorTick => self.on_monitor_tick(scheduler),
        }
    }
}
