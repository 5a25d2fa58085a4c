use super::stage::{PerStage, Stage};
use crate::core::types::SimTime;
use serde::{Deserialize, Serialize};

pub type PatientId = u64;

/// Where a patient is in its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientState {
    /// Queued for the stage
    Awaiting(Stage),
    /// Holding the stage's slot while being served
    InService(Stage),
    /// Service ended but the slot is kept until the next stage is granted
    Blocked(Stage),
    Done,
}

/// Timestamps of one stage, filled in as the patient moves through it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub queue_enter: Option<SimTime>,
    pub service_start: Option<SimTime>,
    pub service_end: Option<SimTime>,
    pub released_at: Option<SimTime>,
}

impl StageRecord {
    pub fn wait(&self) -> Option<f64> {
        Some(self.service_start? - self.queue_enter?)
    }

    pub fn service(&self) -> Option<f64> {
        Some(self.service_end? - self.service_start?)
    }

    /// Time the slot stayed held after service ended
    pub fn blocked(&self) -> Option<f64> {
        Some(self.released_at? - self.service_end?)
    }

    /// Whether the slot is currently held
    pub fn holds_slot(&self) -> bool {
        self.service_start.is_some() && self.released_at.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub arrival_time: SimTime,
    pub state: PatientState,
    pub stages: PerStage<StageRecord>,
}

impl Patient {
    pub fn new(id: PatientId, arrival_time: SimTime) -> Self {
        Self {
            id,
            arrival_time,
            state: PatientState::Awaiting(Stage::Preparation),
            stages: PerStage::default(),
        }
    }

    pub fn record(&self, stage: Stage) -> &StageRecord {
        &self.stages[stage]
    }

    pub(crate) fn record_mut(&mut self, stage: Stage) -> &mut StageRecord {
        &mut self.stages[stage]
    }

    pub fn is_complete(&self) -> bool {
        self.state == PatientState::Done
    }

    /// Departure time, once recovery has ended
    pub fn departure_time(&self) -> Option<SimTime> {
        if self.is_complete() {
            self.stages[Stage::Recovery].service_end
        } else {
            None
        }
    }

    /// Time from arrival to departure
    pub fn total_time(&self) -> Option<f64> {
        Some(self.departure_time()? - self.arrival_time)
    }
}
