// Tests for SimulationEngine functionality
#[cfg(test)]
mod tests {
    use crate::core::{
        error::SimError,
        event_scheduler::EventScheduler,
        execution::simulation_engine::{Model, SimulationEngine, SimulationObserver},
        resource::{RequestOutcome, ResourcePool},
        types::SimTime,
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every event it sees and optionally reschedules itself.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<(f64, &'static str)>,
        tick_interval: Option<f64>,
    }

    #[derive(Debug)]
    enum RecorderEvent {
        Mark(&'static str),
        Tick,
        Chain(&'static str, f64),
    }

    impl Model for Recorder {
        type Event = RecorderEvent;

        fn react(
            &mut self,
            event: RecorderEvent,
            scheduler: &mut EventScheduler<RecorderEvent>,
        ) -> Result<(), SimError> {
            let now = scheduler.now().as_f64();
            match event {
                RecorderEvent::Mark(name) => self.seen.push((now, name)),
                RecorderEvent::Tick => {
                    self.seen.push((now, "tick"));
                    if let Some(interval) = self.tick_interval {
                        scheduler.schedule(interval, RecorderEvent::Tick)?;
                    }
                }
                RecorderEvent::Chain(name, delay) => {
                    self.seen.push((now, name));
                    scheduler.schedule(delay, RecorderEvent::Mark("chained"))?;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_step_executes_one_event() {
        let mut engine = SimulationEngine::new(Recorder::default());
        engine.schedule(2.0, RecorderEvent::Mark("a")).unwrap();
        engine.schedule(2.0, RecorderEvent::Mark("b")).unwrap();

        assert!(engine.step().unwrap());
        assert_eq!(engine.model().seen, vec![(2.0, "a")]);
        assert!(engine.step().unwrap());
        assert!(!engine.step().unwrap());
        assert_eq!(engine.events_processed(), 2);
    }

    #[test]
    fn test_run_until_stops_at_target_even_without_event() {
        let mut engine = SimulationEngine::new(Recorder {
            tick_interval: Some(3.0),
            ..Recorder::default()
        });
        engine.schedule(0.0, RecorderEvent::Tick).unwrap();

        let executed = engine.run_until(SimTime::new(10.0)).unwrap();
        assert_eq!(executed, 4); // 0, 3, 6, 9
        assert_eq!(engine.now(), SimTime::new(10.0));

        // an event exactly on the target is included
        engine.run_until(SimTime::new(12.0)).unwrap();
        let last = engine.model().seen.last().copied();
        assert_eq!(last, Some((12.0, "tick")));
    }

    #[test]
    fn test_run_until_in_the_past_fails() {
        let mut engine = SimulationEngine::new(Recorder::default());
        engine.run_until(SimTime::new(5.0)).unwrap();
        assert!(matches!(
            engine.run_until(SimTime::new(4.0)),
            Err(SimError::InvalidDelay { .. })
        ));
        assert_eq!(engine.now(), SimTime::new(5.0));
    }

    #[test]
    fn test_continuations_can_schedule_same_instant() {
        let mut engine = SimulationEngine::new(Recorder::default());
        engine.schedule(1.0, RecorderEvent::Chain("first", 0.0)).unwrap();
        engine.schedule(1.0, RecorderEvent::Mark("second")).unwrap();

        let end = engine.run().unwrap();
        assert_eq!(end, SimTime::new(1.0));
        // the zero-delay event was scheduled after "second", so it runs after it
        assert_eq!(
            engine.model().seen,
            vec![(1.0, "first"), (1.0, "second"), (1.0, "chained")]
        );
    }

    struct CountingObserver {
        advances: Rc<RefCell<Vec<(f64, f64)>>>,
        steps: Rc<RefCell<u64>>,
    }

    impl SimulationObserver for CountingObserver {
        fn on_time_advance(&mut self, old_time: SimTime, new_time: SimTime) {
            self.advances
                .borrow_mut()
                .push((old_time.as_f64(), new_time.as_f64()));
        }

        fn on_step_complete(&mut self, _time: SimTime, events_processed: u64) {
            *self.steps.borrow_mut() = events_processed;
        }
    }

    #[test]
    fn test_observers_are_notified() {
        let advances = Rc::new(RefCell::new(Vec::new()));
        let steps = Rc::new(RefCell::new(0));

        let mut engine = SimulationEngine::new(Recorder::default());
        engine.add_observer(Box::new(CountingObserver {
            advances: advances.clone(),
            steps: steps.clone(),
        }));
        engine.schedule(1.0, RecorderEvent::Mark("a")).unwrap();
        engine.schedule(1.0, RecorderEvent::Mark("b")).unwrap();
        engine.schedule(4.0, RecorderEvent::Mark("c")).unwrap();

        engine.run_until(SimTime::new(6.0)).unwrap();

        assert_eq!(*advances.borrow(), vec![(0.0, 1.0), (1.0, 4.0), (4.0, 6.0)]);
        assert_eq!(*steps.borrow(), 3);
    }

    /// Single server with a pool: each job holds the server for a fixed time.
    struct Server {
        pool: ResourcePool<u32>,
        service: f64,
        started: Vec<(u32, f64)>,
    }

    #[derive(Debug)]
    enum ServerEvent {
        Arrive(u32),
        Start(u32),
        Done,
    }

    impl Model for Server {
        type Event = ServerEvent;

        fn react(
            &mut self,
            event: ServerEvent,
            scheduler: &mut EventScheduler<ServerEvent>,
        ) -> Result<(), SimError> {
            match event {
                ServerEvent::Arrive(job) => {
                    if self.pool.request(job) == RequestOutcome::Granted {
                        scheduler.schedule(0.0, ServerEvent::Start(job))?;
                    }
                }
                ServerEvent::Start(job) => {
                    self.started.push((job, scheduler.now().as_f64()));
                    scheduler.schedule(self.service, ServerEvent::Done)?;
                }
                ServerEvent::Done => {
                    if let Some(next) = self.pool.release()? {
                        scheduler.schedule(0.0, ServerEvent::Start(next))?;
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_pool_serialises_jobs_in_arrival_order() {
        let server = Server {
            pool: ResourcePool::new("server", 1, 1).unwrap(),
            service: 2.0,
            started: Vec::new(),
        };
        let mut engine = SimulationEngine::new(server);
        for job in 0..4 {
            engine.schedule(0.5, ServerEvent::Arrive(job)).unwrap();
        }

        engine.run().unwrap();
        assert_eq!(
            engine.model().started,
            vec![(0, 0.5), (1, 2.5), (2, 4.5), (3, 6.5)]
        );
        assert_eq!(engine.model().pool.in_use(), 0);
    }
}
