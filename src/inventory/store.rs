use crate::core::errors::SimError;
use crate::core::types::{Interval, ProcessId};

/// Position of a store inside its warehouse (0-based; store number minus one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(pub usize);

impl StoreId {
    /// 1-based store number used in names and reports
    pub fn number(&self) -> usize {
        self.0 + 1
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.number())
    }
}

/// Result of presenting one customer order to a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOutcome {
    /// Order filled; `restock_needed` is true when this order crossed the reorder point
    Filled { remaining: u64, restock_needed: bool },
    /// Not enough stock; the store is now in stockout
    Stockout,
}

/// A retail store: inventory counters plus the flags of its restock state machine
#[derive(Debug, Clone)]
pub struct Store {
    name: String,
    inventory: u64,
    max_inventory: u64,
    reorder_point: u64,
    arrival_interval: Interval,
    order_size_interval: Interval,
    stockout_count: u64,
    restock_count: u64,
    restock_scheduled: bool,
    reorder_point_crossed: bool,
    is_stockout: bool,
    order_sizes: Vec<u64>,
    total_delivered: u64,
    order_process: Option<ProcessId>,
    listener_process: Option<ProcessId>,
}

impl Store {
    /// The initial inventory doubles as the store's fixed maximum
    pub fn new(
        name: impl Into<String>,
        inventory: u64,
        reorder_point: u64,
        arrival_interval: Interval,
        order_size_interval: Interval,
    ) -> Result<Self, SimError> {
        let name = name.into();
        if inventory == 0 {
            return Err(SimError::InvalidConfig(format!(
                "{} needs a positive initial inventory",
                name
            )));
        }
        Ok(Self {
            name,
            inventory,
            max_inventory: inventory,
            reorder_point,
            arrival_interval,
            order_size_interval,
            stockout_count: 0,
            restock_count: 0,
            restock_scheduled: false,
            reorder_point_crossed: false,
            is_stockout: false,
            order_sizes: Vec::new(),
            total_delivered: 0,
            order_process: None,
            listener_process: None,
        })
    }

    /// Apply one order of `size` units.
    ///
    /// The reorder check is edge-triggered: it only reports `restock_needed` on the order
    /// that takes inventory below the reorder point while no request is outstanding.
    pub fn take_order(&mut self, size: u64) -> OrderOutcome {
        match self.inventory.checked_sub(size) {
            Some(remaining) => {
                self.inventory = remaining;
                self.order_sizes.push(size);
                let restock_needed = self.inventory < self.reorder_point && !self.reorder_point_crossed;
                if restock_needed {
                    self.reorder_point_crossed = true;
                }
                OrderOutcome::Filled {
                    remaining,
                    restock_needed,
                }
            }
            None => {
                self.stockout_count += 1;
                self.is_stockout = true;
                OrderOutcome::Stockout
            }
        }
    }

    /// Claim the single outstanding restock slot; false if a request is already in flight
    pub fn claim_restock_request(&mut self) -> bool {
        if self.reorder_point_crossed {
            return false;
        }
        self.reorder_point_crossed = true;
        true
    }

    pub fn mark_restock_scheduled(&mut self) {
        self.restock_scheduled = true;
    }

    /// Units needed to bring the store back to its maximum
    pub fn deficit(&self) -> u64 {
        self.max_inventory - self.inventory
    }

    /// Add delivered stock; exceeding the maximum is a broken invariant
    pub fn add_inventory(&mut self, quantity: u64) -> Result<(), SimError> {
        let total = self.inventory.checked_add(quantity);
        match total {
            Some(total) if total <= self.max_inventory => {
                self.inventory = total;
                self.total_delivered += quantity;
                Ok(())
            }
            _ => Err(SimError::InventoryOverflow {
                store: self.name.clone(),
                current: self.inventory,
                added: quantity,
                max: self.max_inventory,
            }),
        }
    }

    /// Clear the restock state machine after a delivery; returns whether the store was in stockout
    pub fn complete_restock(&mut self) -> bool {
        let was_stockout = self.is_stockout;
        self.restock_count += 1;
        self.restock_scheduled = false;
        self.reorder_point_crossed = false;
        self.is_stockout = false;
        was_stockout
    }

    pub(crate) fn attach_processes(&mut self, order_process: ProcessId, listener_process: ProcessId) {
        self.order_process = Some(order_process);
        self.listener_process = Some(listener_process);
    }

    pub fn order_process(&self) -> Option<ProcessId> {
        self.order_process
    }

    pub fn listener_process(&self) -> Option<ProcessId> {
        self.listener_process
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inventory(&self) -> u64 {
        self.inventory
    }

    pub fn max_inventory(&self) -> u64 {
        self.max_inventory
    }

    /// Starting stock, equal to the maximum
    pub fn initial_inventory(&self) -> u64 {
        self.max_inventory
    }

    pub fn reorder_point(&self) -> u64 {
        self.reorder_point
    }

    pub fn arrival_interval(&self) -> Interval {
        self.arrival_interval
    }

    pub fn order_size_interval(&self) -> Interval {
        self.order_size_interval
    }

    pub fn stockout_count(&self) -> u64 {
        self.stockout_count
    }

    pub fn restock_count(&self) -> u64 {
        self.restock_count
    }

    pub fn is_restock_scheduled(&self) -> bool {
        self.restock_scheduled
    }

    pub fn has_crossed_reorder_point(&self) -> bool {
        self.reorder_point_crossed
    }

    pub fn is_stockout(&self) -> bool {
        self.is_stockout
    }

    /// Sizes of every filled order, in arrival order
    pub fn order_sizes(&self) -> &[u64] {
        &self.order_sizes
    }

    pub fn total_consumed(&self) -> u64 {
        self.order_sizes.iter().sum()
    }

    pub fn total_delivered(&self) -> u64 {
        self.total_delivered
    }
}
