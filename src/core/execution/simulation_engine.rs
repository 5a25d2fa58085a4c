use crate::core::error::SimError;
use crate::core::event_scheduler::EventScheduler;
use crate::core::types::SimTime;
use log::debug;

/// A model reacts to its own events and may schedule further ones.
pub trait Model {
    type Event: std::fmt::Debug;

    fn react(
        &mut self,
        event: Self::Event,
        scheduler: &mut EventScheduler<Self::Event>,
    ) -> Result<(), SimError>;
}

/// Observer trait for simulation events
pub trait SimulationObserver {
    /// Called when the simulation clock advances
    fn on_time_advance(&mut self, old_time: SimTime, new_time: SimTime);

    /// Called after each executed event
    fn on_step_complete(&mut self, time: SimTime, events_processed: u64);
}

pub struct SimulationEngine<M: Model> {
    model: M,
    scheduler: EventScheduler<M::Event>,
    events_processed: u64,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl<M: Model> SimulationEngine<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            scheduler: EventScheduler::new(),
            events_processed: 0,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the simulation
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    /// Schedule an event from outside the model (initial processes, mid-run grants)
    pub fn schedule(&mut self, delay: f64, event: M::Event) -> Result<SimTime, SimError> {
        self.scheduler.schedule(delay, event)
    }

    /// Execute the earliest pending event, returns false if there was none
    pub fn step(&mut self) -> Result<bool, SimError> {
        let old_time = self.scheduler.now();
        let Some((time, event)) = self.scheduler.advance() else {
            return Ok(false);
        };

        if time != old_time {
            self.notify_time_advance(old_time, time);
        }

        debug!("t={} executing {:?}", time, event);
        self.model.react(event, &mut self.scheduler)?;
        self.events_processed += 1;

        self.notify_step_complete(time);
        Ok(true)
    }

    /// Execute every event scheduled at or before `target`, then leave the clock at
    /// `target`. Returns the number of events executed.
    ///
    /// # Errors
    /// If a reaction fails the clock stays at the failing event's time.
    pub fn run_until(&mut self, target: SimTime) -> Result<u64, SimError> {
        let now = self.scheduler.now();
        if target < now {
            return Err(SimError::InvalidDelay {
                delay: target - now,
            });
        }

        let start = self.events_processed;
        while self
            .scheduler
            .peek_next_time()
            .map_or(false, |next| next <= target)
        {
            self.step()?;
        }

        let before_idle = self.scheduler.now();
        self.scheduler.idle_until(target);
        if before_idle != target {
            self.notify_time_advance(before_idle, target);
        }

        Ok(self.events_processed - start)
    }

    /// Run until no events remain, returns the final time
    pub fn run(&mut self) -> Result<SimTime, SimError> {
        while self.step()? {}
        Ok(self.scheduler.now())
    }

    /// Get current simulation time
    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Check if there are pending events in the scheduler
    pub fn has_pending_events(&self) -> bool {
        self.scheduler.has_events()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the model together with the scheduler, for changes made
    /// between runs that may need to schedule events.
    pub fn model_and_scheduler(&mut self) -> (&mut M, &mut EventScheduler<M::Event>) {
        (&mut self.model, &mut self.scheduler)
    }

    fn notify_time_advance(&mut self, old_time: SimTime, new_time: SimTime) {
        for observer in &mut self.observers {
            observer.on_time_advance(old_time, new_time);
        }
    }

    fn notify_step_complete(&mut self, time: SimTime) {
        let processed = self.events_processed;
        for observer in &mut self.observers {
            observer.on_step_complete(time, processed);
        }
    }
}
