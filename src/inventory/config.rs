use crate::core::errors::SimError;
use crate::core::random::MAX_EXACT_BOUND;
use crate::core::types::{Interval, SimTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Generator backing every random draw of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RngAlgorithm {
    /// Mersenne Twister, same draw sequence as numpy's legacy `RandomState` for a given seed
    #[default]
    Mt19937,
    /// `rand`'s standard generator
    StdRng,
}

/// Per-store deviation from the default inventory parameters (store numbers start at 1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOverride {
    pub store: usize,
    #[serde(default)]
    pub inventory: Option<u64>,
    #[serde(default)]
    pub reorder_point: Option<u64>,
}

impl StoreOverride {
    pub fn inventory(store: usize, inventory: u64) -> Self {
        Self {
            store,
            inventory: Some(inventory),
            reorder_point: None,
        }
    }
}

/// Run configuration for the inventory network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub warehouse_name: String,
    pub store_name_prefix: String,
    pub store_count: usize,
    pub default_inventory: u64,
    pub default_reorder_point: u64,
    pub store_overrides: Vec<StoreOverride>,
    pub arrival_interval: Interval,
    pub order_size_interval: Interval,
    pub restock_lead_time_interval: Interval,
    pub end_time: SimTime,
    pub report_interval: SimTime,
    pub seed: u64,
    pub rng: RngAlgorithm,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            warehouse_name: "WH1".to_string(),
            store_name_prefix: "HD".to_string(),
            store_count: 25,
            default_inventory: 200,
            default_reorder_point: 50,
            // Stores 1 and 20 are the two super stores
            store_overrides: vec![StoreOverride::inventory(1, 400), StoreOverride::inventory(20, 400)],
            arrival_interval: Interval::new(1, 3),
            order_size_interval: Interval::new(10, 41),
            restock_lead_time_interval: Interval::new(2, 6),
            end_time: 120,
            report_interval: 5,
            seed: 123_456,
            rng: RngAlgorithm::Mt19937,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON configuration; missing fields fall back to the defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SimError::ConfigLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SimError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| SimError::ConfigLoad(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_store_count(mut self, count: usize) -> Self {
        self.store_count = count;
        self
    }

    pub fn with_default_inventory(mut self, inventory: u64) -> Self {
        self.default_inventory = inventory;
        self
    }

    pub fn with_default_reorder_point(mut self, reorder_point: u64) -> Self {
        self.default_reorder_point = reorder_point;
        self
    }

    pub fn with_store_overrides(mut self, overrides: Vec<StoreOverride>) -> Self {
        self.store_overrides = overrides;
        self
    }

    pub fn with_arrival_interval(mut self, interval: impl Into<Interval>) -> Self {
        self.arrival_interval = interval.into();
        self
    }

    pub fn with_order_size_interval(mut self, interval: impl Into<Interval>) -> Self {
        self.order_size_interval = interval.into();
        self
    }

    pub fn with_restock_lead_time_interval(mut self, interval: impl Into<Interval>) -> Self {
        self.restock_lead_time_interval = interval.into();
        self
    }

    pub fn with_end_time(mut self, end_time: SimTime) -> Self {
        self.end_time = end_time;
        self
    }

    pub fn with_report_interval(mut self, interval: SimTime) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_rng(mut self, rng: RngAlgorithm) -> Self {
        self.rng = rng;
        self
    }

    /// Initial inventory and reorder point of store `number` (1-based)
    pub fn store_parameters(&self, number: usize) -> (u64, u64) {
        self.store_overrides
            .iter()
            .filter(|o| o.store == number)
            .fold(
                (self.default_inventory, self.default_reorder_point),
                |(inventory, reorder_point), o| {
                    (
                        o.inventory.unwrap_or(inventory),
                        o.reorder_point.unwrap_or(reorder_point),
                    )
                },
            )
    }

    /// Display name of store `number` (1-based)
    pub fn store_name(&self, number: usize) -> String {
        format!("{}{}", self.store_name_prefix, number)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.store_count == 0 {
            return Err(SimError::InvalidConfig("store_count must be at least 1".to_string()));
        }
        for (name, interval) in [
            ("arrival_interval", self.arrival_interval),
            ("order_size_interval", self.order_size_interval),
            ("restock_lead_time_interval", self.restock_lead_time_interval),
        ] {
            if interval.is_empty() {
                return Err(SimError::InvalidConfig(format!(
                    "{} {} is empty, lower bound must be below upper bound",
                    name, interval
                )));
            }
            if interval.hi > MAX_EXACT_BOUND {
                return Err(SimError::InvalidConfig(format!(
                    "{} {} exceeds the largest supported bound {}",
                    name, interval, MAX_EXACT_BOUND
                )));
            }
        }
        if self.report_interval == 0 {
            return Err(SimError::InvalidConfig("report_interval must be positive".to_string()));
        }
        if self.rng == RngAlgorithm::Mt19937 && self.seed > u64::from(u32::MAX) {
            return Err(SimError::InvalidConfig(format!(
                "seed {} does not fit the 32-bit Mersenne Twister seed",
                self.seed
            )));
        }
        for o in &self.store_overrides {
            if o.store == 0 || o.store > self.store_count {
                return Err(SimError::InvalidConfig(format!(
                    "override targets store {} but stores are numbered 1..={}",
                    o.store, self.store_count
                )));
            }
        }
        for number in 1..=self.store_count {
            let (inventory, _) = self.store_parameters(number);
            if inventory == 0 {
                return Err(SimError::InvalidConfig(format!(
                    "{} needs a positive initial inventory",
                    self.store_name(number)
                )));
            }
        }
        Ok(())
    }
}

/// How independent replications are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// One replication after the other on the calling thread
    #[default]
    Sequential,
    /// Replications spread over a Rayon thread pool
    Rayon,
}

/// Configuration for a batch of replications
#[derive(Debug, Clone, Default)]
pub struct ReplicationConfig {
    pub concurrency_mode: ConcurrencyMode,
    /// Only relevant when concurrency_mode is Rayon
    pub thread_pool_size: Option<usize>,
}

impl ReplicationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.store_count, 25);
        assert_eq!(config.store_parameters(1), (400, 50));
        assert_eq!(config.store_parameters(2), (200, 50));
        assert_eq!(config.store_parameters(20), (400, 50));
        assert_eq!(config.store_name(7), "HD7");
    }

    #[test]
    fn test_config_builder() {
        let config = SimulationConfig::new()
            .with_store_count(3)
            .with_arrival_interval((2, 4))
            .with_end_time(50)
            .with_seed(9)
            .with_store_overrides(vec![StoreOverride {
                store: 2,
                inventory: None,
                reorder_point: Some(80),
            }]);

        assert_eq!(config.arrival_interval, Interval::new(2, 4));
        assert_eq!(config.store_parameters(2), (200, 80));
        assert_eq!(config.end_time, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_interval() {
        let config = SimulationConfig::new().with_order_size_interval((5, 5));
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_interval_bounds_beyond_exact_range() {
        let config = SimulationConfig::new().with_restock_lead_time_interval((u64::MAX - 10, u64::MAX));
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        let at_limit = SimulationConfig::new().with_restock_lead_time_interval((2, MAX_EXACT_BOUND));
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_rejects_override_outside_store_range() {
        let config = SimulationConfig::new()
            .with_store_count(3)
            .with_store_overrides(vec![StoreOverride::inventory(4, 100)]);
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_inventory() {
        let config = SimulationConfig::new()
            .with_store_overrides(vec![])
            .with_default_inventory(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_partial_config_uses_defaults() {
        let config = SimulationConfig::from_json_str(
            r#"{ "store_count": 4, "seed": 7, "rng": "std_rng", "store_overrides": [],
                 "arrival_interval": { "lo": 1, "hi": 2 } }"#,
        )
        .unwrap();
        assert_eq!(config.store_count, 4);
        assert_eq!(config.seed, 7);
        assert_eq!(config.rng, RngAlgorithm::StdRng);
        assert_eq!(config.arrival_interval, Interval::new(1, 2));
        assert_eq!(config.end_time, 120);
    }

    #[test]
    fn test_json_rejects_garbage() {
        assert!(matches!(
            SimulationConfig::from_json_str("{ not json"),
            Err(SimError::ConfigLoad(_))
        ));
    }

    #[test]
    fn test_replication_config_builder() {
        let config = ReplicationConfig::new()
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_thread_pool_size(4);
        assert_eq!(config.concurrency_mode, ConcurrencyMode::Rayon);
        assert_eq!(config.thread_pool_size, Some(4));
        assert_eq!(ReplicationConfig::default().concurrency_mode, ConcurrencyMode::Sequential);
    }
}
