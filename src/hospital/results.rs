use super::model::HospitalModel;
use super::patient::{Patient, PatientId};
use super::stage::{PerStage, Stage};
use crate::core::resource::PoolSnapshot;
use crate::core::types::SimTime;
use serde::{Deserialize, Serialize};

/// One monitor reading of one pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilizationSample {
    pub time: SimTime,
    pub stage: Stage,
    pub queue_length: usize,
    pub in_use: usize,
    pub capacity: usize,
}

impl UtilizationSample {
    pub fn new(time: SimTime, stage: Stage, snapshot: PoolSnapshot) -> Self {
        Self {
            time,
            stage,
            queue_length: snapshot.queue_length,
            in_use: snapshot.in_use,
            capacity: snapshot.capacity,
        }
    }

    /// `in_use / capacity`; can exceed 1.0 right after a capacity cut.
    /// None for an unstaffed pool.
    pub fn utilization(&self) -> Option<f64> {
        if self.capacity == 0 {
            None
        } else {
            Some(self.in_use as f64 / self.capacity as f64)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    pub queue_enter: SimTime,
    pub service_start: SimTime,
    pub service_end: SimTime,
    pub wait: f64,
    pub service: f64,
    pub blocked: f64,
}

/// Finalised record of a patient who left the unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: PatientId,
    pub arrival_time: SimTime,
    pub departure_time: SimTime,
    pub total_time: f64,
    pub stages: PerStage<StageSummary>,
}

impl PatientSummary {
    /// None unless the patient has completed every stage
    pub fn from_patient(patient: &Patient) -> Option<Self> {
        if !patient.is_complete() {
            return None;
        }

        let stage_summary = |stage: Stage| -> Option<StageSummary> {
            let record = patient.record(stage);
            Some(StageSummary {
                queue_enter: record.queue_enter?,
                service_start: record.service_start?,
                service_end: record.service_end?,
                wait: record.wait()?,
                service: record.service()?,
                blocked: record.blocked()?,
            })
        };

        Some(Self {
            id: patient.id,
            arrival_time: patient.arrival_time,
            departure_time: patient.departure_time()?,
            total_time: patient.total_time()?,
            stages: PerStage {
                preparation: stage_summary(Stage::Preparation)?,
                operating_room: stage_summary(Stage::OperatingRoom)?,
                recovery: stage_summary(Stage::Recovery)?,
            },
        })
    }
}

/// Aggregate statistics over completed patients and the monitor series.
/// Means are None when there is nothing to average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub arrivals: usize,
    pub completed: usize,
    pub in_system: usize,
    pub mean_total_time: Option<f64>,
    pub max_total_time: Option<f64>,
    pub mean_wait: PerStage<Option<f64>>,
    pub mean_service: PerStage<Option<f64>>,
    pub mean_blocked: PerStage<Option<f64>>,
    pub mean_queue_length: PerStage<Option<f64>>,
    pub mean_utilization: PerStage<Option<f64>>,
}

/// Everything a run produced up to `end_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub end_time: SimTime,
    pub arrivals: usize,
    pub patients: Vec<PatientSummary>,
    pub samples: Vec<UtilizationSample>,
}

impl SimulationResult {
    pub fn from_model(model: &HospitalModel, end_time: SimTime) -> Self {
        let patients: Vec<PatientSummary> = model
            .patients()
            .iter()
            .filter_map(PatientSummary::from_patient)
            .collect();

        Self {
            end_time,
            arrivals: model.patients().len(),
            patients,
            samples: model.samples().to_vec(),
        }
    }

    pub fn completed(&self) -> usize {
        self.patients.len()
    }

    /// (time, queue length) readings of one stage
    pub fn queue_series(&self, stage: Stage) -> Vec<(SimTime, usize)> {
        self.samples
            .iter()
            .filter(|s| s.stage == stage)
            .map(|s| (s.time, s.queue_length))
            .collect()
    }

    /// (time, utilization) readings of one stage, skipping unstaffed readings
    pub fn utilization_series(&self, stage: Stage) -> Vec<(SimTime, f64)> {
        self.samples
            .iter()
            .filter(|s| s.stage == stage)
            .filter_map(|s| Some((s.time, s.utilization()?)))
            .collect()
    }

    fn stage_mean(&self, f: impl Fn(&StageSummary) -> f64) -> PerStage<Option<f64>> {
        PerStage::from_fn(|stage| mean(self.patients.iter().map(|p| f(&p.stages[stage]))))
    }

    pub fn summary(&self) -> Summary {
        let totals: Vec<f64> = self.patients.iter().map(|p| p.total_time).collect();

        Summary {
            arrivals: self.arrivals,
            completed: self.patients.len(),
            in_system: self.arrivals - self.patients.len(),
            mean_total_time: mean(totals.iter().copied()),
            max_total_time: totals.iter().copied().reduce(f64::max),
            mean_wait: self.stage_mean(|s| s.wait),
            mean_service: self.stage_mean(|s| s.service),
            mean_blocked: self.stage_mean(|s| s.blocked),
            mean_queue_length: PerStage::from_fn(|stage| {
                mean(self.queue_series(stage).into_iter().map(|(_, q)| q as f64))
            }),
            mean_utilization: PerStage::from_fn(|stage| {
                mean(self.utilization_series(stage).into_iter().map(|(_, u)| u))
            }),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
