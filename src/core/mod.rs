pub mod errors;
pub mod event_scheduler;
pub mod process;
pub mod random;
pub mod simulation_engine;
pub mod types;
