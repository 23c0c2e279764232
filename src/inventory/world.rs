use super::config::{RngAlgorithm, SimulationConfig};
use super::trace::{Trace, TraceKind};
use super::warehouse::Warehouse;
use crate::core::errors::SimError;
use crate::core::random::{draw_interval, Mt19937};
use crate::core::types::{Interval, ProcessId, SimTime};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Shared state every inventory process works on
pub struct InventoryWorld {
    warehouse: Warehouse,
    dispatcher: Option<ProcessId>,
    rng: Box<dyn RngCore + Send>,
    trace: Trace,
}

impl InventoryWorld {
    pub fn new(warehouse: Warehouse, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            warehouse,
            dispatcher: None,
            rng,
            trace: Trace::new(),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        let rng: Box<dyn RngCore + Send> = match config.rng {
            RngAlgorithm::Mt19937 => {
                let seed = u32::try_from(config.seed).map_err(|_| {
                    SimError::InvalidConfig(format!("seed {} exceeds 32 bits", config.seed))
                })?;
                Box::new(Mt19937::new(seed))
            }
            RngAlgorithm::StdRng => Box::new(StdRng::seed_from_u64(config.seed)),
        };
        Ok(Self::new(Warehouse::from_config(config)?, rng))
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    pub fn warehouse_mut(&mut self) -> &mut Warehouse {
        &mut self.warehouse
    }

    pub fn dispatcher(&self) -> Option<ProcessId> {
        self.dispatcher
    }

    pub(crate) fn set_dispatcher(&mut self, pid: ProcessId) {
        self.dispatcher = Some(pid);
    }

    /// Next integer from `[lo, hi)` on the run's single random stream
    pub fn draw(&mut self, interval: Interval) -> u64 {
        draw_interval(self.rng.as_mut(), interval)
    }

    pub fn record(&mut self, time: SimTime, kind: TraceKind) {
        self.trace.record(time, kind);
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }
}
