pub mod core;
pub mod inventory;

// Re-export commonly used types
pub use crate::core::errors::SimError;
pub use crate::core::process::{Context, Interrupt, Process, ProcessStatus, Suspend, Wake};
pub use crate::core::simulation_engine::{SimulationEngine, SimulationObserver};
pub use crate::core::types::{Interval, Priority, ProcessId, SimTime};
pub use crate::inventory::{InventorySimulation, RunSummary, SimulationConfig, StoreId};
