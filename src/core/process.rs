use super::errors::SimError;
use super::event_scheduler::{EventScheduler, WakeKind};
use super::types::{Priority, ProcessId, SimTime};
use log::debug;

/// Signal delivered to a suspended process ahead of its own wake condition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Interrupt {
    pub cause: Option<String>,
}

impl Interrupt {
    pub fn new(cause: Option<String>) -> Self {
        Self { cause }
    }

    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

/// Reason a process is being resumed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wake {
    Start,
    Timeout,
    Interrupt(Interrupt),
}

/// What a process asks the engine for when it gives up control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suspend {
    /// Resume after `delay` time units unless interrupted first
    Timeout(SimTime),
    /// Resume only when interrupted
    WaitForSignal,
    /// The process is done and its handle becomes dead
    Exit,
}

/// Lifecycle state of a registered process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Spawned, start not delivered yet
    Pending,
    /// Currently executing
    Running,
    /// Suspended on a timer; the token matches the queued timeout entry
    Sleeping { token: u64 },
    /// Suspended until interrupted
    Waiting,
    Finished,
}

impl ProcessStatus {
    pub fn is_alive(&self) -> bool {
        !matches!(self, ProcessStatus::Finished)
    }
}

/// A cooperatively scheduled unit of control flow.
///
/// The engine calls `resume` each time the process is due; the process mutates the shared
/// world through the context and returns how it wants to be suspended. Implementations are
/// expected to be explicit state machines, typically one enum covering every process kind.
pub trait Process: Sized {
    type World;

    fn resume(&mut self, wake: Wake, ctx: &mut Context<'_, Self>) -> Result<Suspend, SimError>;

    /// Short human readable name used in logs
    fn label(&self) -> String;
}

pub(crate) struct ProcessSlot<P> {
    pub(crate) process: Option<P>,
    pub(crate) status: ProcessStatus,
}

/// Registry of every process ever spawned, indexed by `ProcessId`
pub(crate) struct ProcessTable<P> {
    slots: Vec<ProcessSlot<P>>,
    token_counter: u64,
}

impl<P> ProcessTable<P> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            token_counter: 0,
        }
    }

    pub(crate) fn insert(&mut self, process: P) -> ProcessId {
        let pid = ProcessId(self.slots.len());
        self.slots.push(ProcessSlot {
            process: Some(process),
            status: ProcessStatus::Pending,
        });
        pid
    }

    pub(crate) fn slot(&self, pid: ProcessId) -> Result<&ProcessSlot<P>, SimError> {
        self.slots.get(pid.0).ok_or(SimError::UnknownProcess(pid))
    }

    pub(crate) fn slot_mut(&mut self, pid: ProcessId) -> Result<&mut ProcessSlot<P>, SimError> {
        self.slots.get_mut(pid.0).ok_or(SimError::UnknownProcess(pid))
    }

    pub(crate) fn next_token(&mut self) -> u64 {
        self.token_counter += 1;
        self.token_counter
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn alive_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.status.is_alive()).count()
    }
}

/// Queue an interrupt for `target`, shared by the engine and the process context
pub(crate) fn raise_interrupt<P>(
    table: &ProcessTable<P>,
    scheduler: &mut EventScheduler,
    now: SimTime,
    target: ProcessId,
    cause: Option<String>,
) -> Result<(), SimError> {
    match table.slot(target)?.status {
        ProcessStatus::Finished => Err(SimError::ProcessTerminated(target)),
        ProcessStatus::Running => Err(SimError::SelfInterrupt(target)),
        _ => {
            debug!("[t={}] interrupt queued for {} (cause: {:?})", now, target, cause);
            scheduler.schedule_now(
                now,
                Priority::Urgent,
                target,
                WakeKind::Interrupt(Interrupt::new(cause)),
            );
            Ok(())
        }
    }
}

/// View of the engine handed to a process while it runs
pub struct Context<'a, P: Process> {
    pub(crate) now: SimTime,
    pub(crate) current: ProcessId,
    pub(crate) world: &'a mut P::World,
    pub(crate) scheduler: &'a mut EventScheduler,
    pub(crate) table: &'a mut ProcessTable<P>,
}

impl<'a, P: Process> Context<'a, P> {
    /// Current model time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Handle of the running process
    pub fn current(&self) -> ProcessId {
        self.current
    }

    pub fn world(&self) -> &P::World {
        &*self.world
    }

    pub fn world_mut(&mut self) -> &mut P::World {
        &mut *self.world
    }

    /// Register a new process; it starts at the current instant after already queued urgent work
    pub fn spawn(&mut self, process: P) -> ProcessId {
        let label = process.label();
        let pid = self.table.insert(process);
        self.scheduler
            .schedule_now(self.now, Priority::Urgent, pid, WakeKind::Start);
        debug!("[t={}] {} spawned {} as {}", self.now, self.current, label, pid);
        pid
    }

    /// Interrupt another process; delivery happens after the caller suspends
    pub fn interrupt(&mut self, target: ProcessId, cause: Option<String>) -> Result<(), SimError> {
        raise_interrupt(&*self.table, &mut *self.scheduler, self.now, target, cause)
    }
}
