use super::types::{ProcessId, SimTime};

/// Errors that terminate a simulation run.
///
/// Stockouts and pending restocks are ordinary domain states and never show up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A restock would push a store above its fixed maximum
    InventoryOverflow {
        store: String,
        current: u64,
        added: u64,
        max: u64,
    },
    /// A process was resumed in a state/wake combination its state machine does not define
    UnreachableState { process: String, detail: String },
    /// Interrupt targeted a process that already returned
    ProcessTerminated(ProcessId),
    /// A running process tried to interrupt itself
    SelfInterrupt(ProcessId),
    /// A wakeup `delay` after `now` lies beyond the representable clock
    TimeOverflow { now: SimTime, delay: SimTime },
    /// No process is registered under this handle
    UnknownProcess(ProcessId),
    /// Interrupt cause or index did not name a store of the warehouse
    UnknownStore(String),
    /// Configuration rejected by validation
    InvalidConfig(String),
    /// Configuration file could not be read or parsed
    ConfigLoad(String),
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::InventoryOverflow {
                store,
                current,
                added,
                max,
            } => write!(
                f,
                "Inventory overflow in {}: {} + {} exceeds maximum {}",
                store, current, added, max
            ),
            SimError::UnreachableState { process, detail } => {
                write!(f, "Unreachable state in {}: {}", process, detail)
            }
            SimError::ProcessTerminated(pid) => {
                write!(f, "Process {} has terminated and cannot be interrupted", pid)
            }
            SimError::SelfInterrupt(pid) => {
                write!(f, "Process {} is not allowed to interrupt itself", pid)
            }
            SimError::TimeOverflow { now, delay } => {
                write!(f, "Wake time {} + {} overflows the simulation clock", now, delay)
            }
            SimError::UnknownProcess(pid) => write!(f, "Process {} not found", pid),
            SimError::UnknownStore(name) => write!(f, "Store '{}' not found", name),
            SimError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            SimError::ConfigLoad(msg) => write!(f, "Failed to load configuration: {}", msg),
        }
    }
}

impl std::error::Error for SimError {}
