use super::warehouse::Warehouse;
use crate::core::types::SimTime;
use serde::Serialize;
use uuid::Uuid;

/// End-of-run figures for one store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub name: String,
    pub stockouts: u64,
    pub restocks: u64,
    pub orders: usize,
    pub initial_inventory: u64,
    pub final_inventory: u64,
    pub consumed: u64,
    pub delivered: u64,
}

impl StoreSummary {
    /// Stock in equals stock out plus stock on hand
    pub fn is_balanced(&self) -> bool {
        self.initial_inventory + self.delivered == self.consumed + self.final_inventory
    }
}

/// End-of-run report
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub seed: u64,
    pub end_time: SimTime,
    pub stores: Vec<StoreSummary>,
    pub total_stockouts: u64,
    pub total_restocks: u64,
}

impl RunSummary {
    pub fn collect(run_id: Uuid, seed: u64, end_time: SimTime, warehouse: &Warehouse) -> Self {
        let stores: Vec<StoreSummary> = warehouse
            .stores()
            .iter()
            .map(|store| StoreSummary {
                name: store.name().to_string(),
                stockouts: store.stockout_count(),
                restocks: store.restock_count(),
                orders: store.order_sizes().len(),
                initial_inventory: store.initial_inventory(),
                final_inventory: store.inventory(),
                consumed: store.total_consumed(),
                delivered: store.total_delivered(),
            })
            .collect();
        let total_stockouts = stores.iter().map(|s| s.stockouts).sum();
        let total_restocks = stores.iter().map(|s| s.restocks).sum();
        Self {
            run_id,
            seed,
            end_time,
            stores,
            total_stockouts,
            total_restocks,
        }
    }

    pub fn stockouts_by_store(&self) -> Vec<u64> {
        self.stores.iter().map(|s| s.stockouts).collect()
    }

    /// Same outcome regardless of run id
    pub fn same_outcome(&self, other: &RunSummary) -> bool {
        self.seed == other.seed
            && self.end_time == other.end_time
            && self.stores == other.stores
            && self.total_stockouts == other.total_stockouts
            && self.total_restocks == other.total_restocks
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Finished run at model time    {}", self.end_time)?;
        writeln!(
            f,
            "Total number of stockouts, by store number {:?}",
            self.stockouts_by_store()
        )?;
        writeln!(
            f,
            "Grand total number of stockouts over all stores:  {}",
            self.total_stockouts
        )?;
        write!(
            f,
            "Grand total number of restocks over all stores:  {}",
            self.total_restocks
        )
    }
}
