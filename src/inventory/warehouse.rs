use super::config::SimulationConfig;
use super::store::{Store, StoreId};
use crate::core::errors::SimError;
use crate::core::types::Interval;

/// The single warehouse: owns every store and the restock lead-time distribution
#[derive(Debug, Clone)]
pub struct Warehouse {
    name: String,
    stores: Vec<Store>,
    restock_lead_time_interval: Interval,
}

impl Warehouse {
    pub fn new(name: impl Into<String>, stores: Vec<Store>, restock_lead_time_interval: Interval) -> Self {
        Self {
            name: name.into(),
            stores,
            restock_lead_time_interval,
        }
    }

    /// Build the warehouse and its stores, numbered 1..=store_count
    pub fn from_config(config: &SimulationConfig) -> Result<Self, SimError> {
        let stores = (1..=config.store_count)
            .map(|number| {
                let (inventory, reorder_point) = config.store_parameters(number);
                Store::new(
                    config.store_name(number),
                    inventory,
                    reorder_point,
                    config.arrival_interval,
                    config.order_size_interval,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(
            config.warehouse_name.clone(),
            stores,
            config.restock_lead_time_interval,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn restock_lead_time_interval(&self) -> Interval {
        self.restock_lead_time_interval
    }

    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    pub fn store_ids(&self) -> impl Iterator<Item = StoreId> {
        (0..self.stores.len()).map(StoreId)
    }

    pub fn store(&self, id: StoreId) -> Result<&Store, SimError> {
        self.stores
            .get(id.0)
            .ok_or_else(|| SimError::UnknownStore(id.to_string()))
    }

    pub fn store_mut(&mut self, id: StoreId) -> Result<&mut Store, SimError> {
        self.stores
            .get_mut(id.0)
            .ok_or_else(|| SimError::UnknownStore(id.to_string()))
    }

    /// Resolve the store named in a restock request
    pub fn find_store(&self, name: &str) -> Result<StoreId, SimError> {
        self.stores
            .iter()
            .position(|store| store.name() == name)
            .map(StoreId)
            .ok_or_else(|| SimError::UnknownStore(name.to_string()))
    }

    /// Names of stores whose restock has been scheduled but not completed, in store order
    pub fn pending_restocks(&self) -> Vec<String> {
        self.stores
            .iter()
            .filter(|store| store.is_restock_scheduled())
            .map(|store| store.name().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_applies_overrides_in_order() {
        let warehouse = Warehouse::from_config(&SimulationConfig::default()).unwrap();
        assert_eq!(warehouse.name(), "WH1");
        assert_eq!(warehouse.stores().len(), 25);
        assert_eq!(warehouse.stores()[0].name(), "HD1");
        assert_eq!(warehouse.stores()[0].max_inventory(), 400);
        assert_eq!(warehouse.stores()[1].max_inventory(), 200);
        assert_eq!(warehouse.stores()[19].max_inventory(), 400);
        assert_eq!(warehouse.restock_lead_time_interval(), Interval::new(2, 6));
    }

    #[test]
    fn test_find_store_by_name() {
        let warehouse = Warehouse::from_config(&SimulationConfig::default()).unwrap();
        assert_eq!(warehouse.find_store("HD12").unwrap(), StoreId(11));
        assert_eq!(
            warehouse.find_store("HD99"),
            Err(SimError::UnknownStore("HD99".to_string()))
        );
        assert!(warehouse.store(StoreId(25)).is_err());
    }

    #[test]
    fn test_pending_restocks_lists_scheduled_stores() {
        let mut warehouse = Warehouse::from_config(&SimulationConfig::default().with_store_count(4)).unwrap();
        assert!(warehouse.pending_restocks().is_empty());
        warehouse.store_mut(StoreId(2)).unwrap().mark_restock_scheduled();
        warehouse.store_mut(StoreId(0)).unwrap().mark_restock_scheduled();
        assert_eq!(warehouse.pending_restocks(), vec!["HD1".to_string(), "HD3".to_string()]);
    }
}
