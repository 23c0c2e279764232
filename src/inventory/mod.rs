pub mod config;
pub mod processes;
pub mod simulation;
pub mod store;
pub mod summary;
pub mod trace;
pub mod warehouse;
pub mod world;

// Re-export commonly used types
pub use config::{ConcurrencyMode, ReplicationConfig, RngAlgorithm, SimulationConfig, StoreOverride};
pub use processes::{InventoryProcess, OrderPhase};
pub use simulation::{run_replications, InventorySimulation};
pub use store::{OrderOutcome, Store, StoreId};
pub use summary::{RunSummary, StoreSummary};
pub use trace::{TraceEvent, TraceKind};
pub use warehouse::Warehouse;
pub use world::InventoryWorld;
