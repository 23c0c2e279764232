use super::config::{ConcurrencyMode, ReplicationConfig, SimulationConfig};
use super::processes::InventoryProcess;
use super::store::{Store, StoreId};
use super::summary::RunSummary;
use super::trace::{TraceEvent, TraceKind};
use super::warehouse::Warehouse;
use super::world::InventoryWorld;
use crate::core::errors::SimError;
use crate::core::simulation_engine::{SimulationEngine, SimulationObserver};
use crate::core::types::{ProcessId, SimTime};
use log::info;
use rayon::prelude::*;
use uuid::Uuid;

/// One run of the inventory network: engine, world and the processes wired together
pub struct InventorySimulation {
    engine: SimulationEngine<InventoryProcess>,
    config: SimulationConfig,
    run_id: Uuid,
}

impl InventorySimulation {
    /// Build the warehouse and stores and spawn every long-lived process.
    ///
    /// Spawn order fixes the start order at time zero: dispatcher, reporter, then for each
    /// store its order consumption followed by its restock listener.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        let world = InventoryWorld::from_config(&config)?;
        let mut engine = SimulationEngine::new(world);

        let dispatcher = engine.spawn(InventoryProcess::Dispatcher);
        engine.world_mut().set_dispatcher(dispatcher);
        engine.spawn(InventoryProcess::reporter(config.report_interval));

        let store_ids: Vec<StoreId> = engine.world().warehouse().store_ids().collect();
        for store in store_ids {
            let order_process = engine.spawn(InventoryProcess::order_consumption(store));
            let listener = engine.spawn(InventoryProcess::restock_listener(store));
            engine
                .world_mut()
                .warehouse_mut()
                .store_mut(store)?
                .attach_processes(order_process, listener);
        }

        let run_id = Uuid::new_v4();
        info!(
            "Run {} prepared for {} with {} stores, seed {}",
            run_id, config.warehouse_name, config.store_count, config.seed
        );
        Ok(Self {
            engine,
            config,
            run_id,
        })
    }

    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.engine.add_observer(observer);
    }

    /// Run to the configured end time and report
    pub fn run(&mut self) -> Result<RunSummary, SimError> {
        info!("Run {} starting, end time {}", self.run_id, self.config.end_time);
        self.engine.run_until(self.config.end_time)?;
        let summary = self.summary();
        info!(
            "Run {} finished at {}: {} stockouts, {} restocks",
            self.run_id, summary.end_time, summary.total_stockouts, summary.total_restocks
        );
        Ok(summary)
    }

    /// Advance to `until` (never past the configured end time)
    pub fn run_until(&mut self, until: SimTime) -> Result<SimTime, SimError> {
        self.engine.run_until(until.min(self.config.end_time))
    }

    /// Process one wakeup due before the end time; false when nothing is left to do
    pub fn step(&mut self) -> Result<bool, SimError> {
        match self.engine.peek_next_time() {
            Some(time) if time < self.config.end_time => {
                self.engine.step()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Ask the warehouse to restock `store` from outside the model.
    ///
    /// Goes through the same dispatcher interrupt as a reorder-point crossing and is refused
    /// (`Ok(false)`) while a restock for that store is already in flight.
    pub fn request_restock(&mut self, store: StoreId) -> Result<bool, SimError> {
        let now = self.engine.current_time();
        let world = self.engine.world_mut();
        let s = world.warehouse_mut().store_mut(store)?;
        if !s.claim_restock_request() {
            return Ok(false);
        }
        let name = s.name().to_string();
        let dispatcher = world.dispatcher().ok_or_else(|| SimError::UnreachableState {
            process: "dispatcher".to_string(),
            detail: "no dispatcher registered".to_string(),
        })?;
        world.record(now, TraceKind::RestockRequested { store: name.clone() });
        self.engine.interrupt(dispatcher, Some(name))?;
        Ok(true)
    }

    pub fn now(&self) -> SimTime {
        self.engine.current_time()
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn warehouse(&self) -> &Warehouse {
        self.engine.world().warehouse()
    }

    pub fn store(&self, store: StoreId) -> Result<&Store, SimError> {
        self.warehouse().store(store)
    }

    pub fn trace(&self) -> &[TraceEvent] {
        self.engine.world().trace().events()
    }

    pub fn dispatcher(&self) -> Option<ProcessId> {
        self.engine.world().dispatcher()
    }

    pub fn engine(&self) -> &SimulationEngine<InventoryProcess> {
        &self.engine
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::collect(self.run_id, self.config.seed, self.now(), self.warehouse())
    }
}

/// Run one independent replication per seed and return the summaries in seed order
pub fn run_replications(
    config: &SimulationConfig,
    seeds: &[u64],
    replication: &ReplicationConfig,
) -> Result<Vec<RunSummary>, SimError> {
    let run_one = |seed: u64| -> Result<RunSummary, SimError> {
        InventorySimulation::new(config.clone().with_seed(seed))?.run()
    };

    match replication.concurrency_mode {
        ConcurrencyMode::Sequential => seeds.iter().map(|&seed| run_one(seed)).collect(),
        ConcurrencyMode::Rayon => {
            let mut builder = rayon::ThreadPoolBuilder::new();
            if let Some(size) = replication.thread_pool_size {
                builder = builder.num_threads(size);
            }
            let pool = builder
                .build()
                .map_err(|e| SimError::InvalidConfig(format!("thread pool: {}", e)))?;
            pool.install(|| seeds.par_iter().map(|&seed| run_one(seed)).collect())
        }
    }
}
