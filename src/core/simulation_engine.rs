use super::errors::SimError;
use super::event_scheduler::{EventScheduler, ScheduledEvent, WakeKind};
use super::process::{raise_interrupt, Context, Process, ProcessStatus, ProcessTable, Suspend, Wake};
use super::types::{Priority, ProcessId, SimTime};
use log::{debug, trace, warn};

/// Observer trait for simulation events
pub trait SimulationObserver {
    /// Called when model time advances
    fn on_time_advance(&mut self, old_time: SimTime, new_time: SimTime);

    /// Called after a process has been resumed and suspended again
    fn on_step_complete(&mut self, time: SimTime, process: ProcessId);
}

/// Discrete-event engine driving a set of cooperative processes over a shared world.
///
/// Exactly one process runs at a time and runs until it suspends. Pending wakeups are
/// ordered by time, then priority class, then submission order, so a run is fully
/// reproducible for a fixed random sequence.
pub struct SimulationEngine<P: Process> {
    scheduler: EventScheduler,
    processes: ProcessTable<P>,
    world: P::World,
    current_time: SimTime,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl<P: Process> SimulationEngine<P> {
    /// Create an engine at time zero owning `world`
    pub fn new(world: P::World) -> Self {
        Self {
            scheduler: EventScheduler::new(),
            processes: ProcessTable::new(),
            world,
            current_time: 0,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the simulation
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    fn notify_time_advance(&mut self, old_time: SimTime, new_time: SimTime) {
        for observer in &mut self.observers {
            observer.on_time_advance(old_time, new_time);
        }
    }

    fn notify_step_complete(&mut self, time: SimTime, process: ProcessId) {
        for observer in &mut self.observers {
            observer.on_step_complete(time, process);
        }
    }

    /// Register a process; its start is queued at the current instant
    pub fn spawn(&mut self, process: P) -> ProcessId {
        let label = process.label();
        let pid = self.processes.insert(process);
        self.scheduler
            .schedule_now(self.current_time, Priority::Urgent, pid, WakeKind::Start);
        debug!("[t={}] spawned {} as {}", self.current_time, label, pid);
        pid
    }

    /// Interrupt a process from outside the simulation
    pub fn interrupt(&mut self, target: ProcessId, cause: Option<String>) -> Result<(), SimError> {
        raise_interrupt(
            &self.processes,
            &mut self.scheduler,
            self.current_time,
            target,
            cause,
        )
    }

    /// Run every wakeup due strictly before `until`, then move the clock to `until`
    pub fn run_until(&mut self, until: SimTime) -> Result<SimTime, SimError> {
        while self
            .scheduler
            .peek_next_time()
            .map_or(false, |time| time < until)
        {
            self.step()?;
        }
        if until > self.current_time {
            let old_time = self.current_time;
            self.current_time = until;
            self.notify_time_advance(old_time, until);
        }
        Ok(self.current_time)
    }

    /// Run until no wakeup is pending
    pub fn run(&mut self) -> Result<SimTime, SimError> {
        while self.step()? {}
        Ok(self.current_time)
    }

    /// Process the earliest pending wakeup, returns true if events remain
    pub fn step(&mut self) -> Result<bool, SimError> {
        let Some(event) = self.scheduler.pop_next() else {
            return Ok(false);
        };

        let old_time = self.current_time;
        self.current_time = event.wake_time;
        if old_time != self.current_time {
            self.notify_time_advance(old_time, self.current_time);
            debug!("=== Simulation Time {} ===", self.current_time);
        }

        let process = event.process;
        if self.dispatch(event)? {
            self.notify_step_complete(self.current_time, process);
        }

        Ok(self.has_pending_events())
    }

    /// Resume the target of `event`; false when the entry was stale and dropped
    fn dispatch(&mut self, event: ScheduledEvent) -> Result<bool, SimError> {
        let pid = event.process;
        let status = self.processes.slot(pid)?.status;

        let wake = match (event.kind, status) {
            (WakeKind::Start, ProcessStatus::Pending) => Wake::Start,
            (WakeKind::Timeout { token }, ProcessStatus::Sleeping { token: current })
                if token == current =>
            {
                Wake::Timeout
            }
            (WakeKind::Timeout { token }, _) => {
                trace!("[t={}] dropping cancelled timeout {} of {}", self.current_time, token, pid);
                return Ok(false);
            }
            (WakeKind::Interrupt(_), ProcessStatus::Finished) => {
                warn!("[t={}] interrupt for finished process {} dropped", self.current_time, pid);
                return Ok(false);
            }
            (WakeKind::Interrupt(interrupt), _) => Wake::Interrupt(interrupt),
            (WakeKind::Start, other) => {
                return Err(SimError::UnreachableState {
                    process: pid.to_string(),
                    detail: format!("start delivered while {:?}", other),
                })
            }
        };

        let slot = self.processes.slot_mut(pid)?;
        let mut process = slot.process.take().ok_or(SimError::UnknownProcess(pid))?;
        slot.status = ProcessStatus::Running;

        let outcome = {
            let mut ctx = Context {
                now: self.current_time,
                current: pid,
                world: &mut self.world,
                scheduler: &mut self.scheduler,
                table: &mut self.processes,
            };
            process.resume(wake, &mut ctx)
        };

        let suspend = match outcome {
            Ok(suspend) => suspend,
            Err(err) => {
                let slot = self.processes.slot_mut(pid)?;
                slot.status = ProcessStatus::Finished;
                return Err(err);
            }
        };

        let status = match suspend {
            Suspend::Timeout(delay) => {
                let token = self.processes.next_token();
                let scheduled = self.scheduler.schedule_after(
                    self.current_time,
                    delay,
                    Priority::Normal,
                    pid,
                    WakeKind::Timeout { token },
                );
                if let Err(err) = scheduled {
                    self.processes.slot_mut(pid)?.status = ProcessStatus::Finished;
                    return Err(err);
                }
                ProcessStatus::Sleeping { token }
            }
            Suspend::WaitForSignal => ProcessStatus::Waiting,
            Suspend::Exit => ProcessStatus::Finished,
        };
        debug!("[t={}] {} suspended: {:?}", self.current_time, process.label(), suspend);

        let slot = self.processes.slot_mut(pid)?;
        slot.status = status;
        if status.is_alive() {
            slot.process = Some(process);
        }
        Ok(true)
    }

    /// Get current simulation time
    pub fn current_time(&self) -> SimTime {
        self.current_time
    }

    /// Wake time of the earliest queued entry, stale entries included
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.scheduler.peek_next_time()
    }

    /// Check if there are pending events in the scheduler
    pub fn has_pending_events(&self) -> bool {
        self.scheduler.has_events()
    }

    pub fn world(&self) -> &P::World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut P::World {
        &mut self.world
    }

    /// Lifecycle state of a process
    pub fn process_status(&self, pid: ProcessId) -> Result<ProcessStatus, SimError> {
        Ok(self.processes.slot(pid)?.status)
    }

    /// Borrow a suspended process; `None` once it has finished
    pub fn process(&self, pid: ProcessId) -> Option<&P> {
        self.processes.slot(pid).ok()?.process.as_ref()
    }

    /// Number of processes ever spawned
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Number of processes that have not returned
    pub fn alive_process_count(&self) -> usize {
        self.processes.alive_count()
    }
}
