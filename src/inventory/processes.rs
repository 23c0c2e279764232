//! The five process kinds of the inventory network as explicit state machines.
//!
//! Store order consumption decrements stock and signals the dispatcher when the reorder
//! point is crossed. The dispatcher spawns one delivery per request. A delivery refills the
//! store after its lead time and signals the store's restock listener, which clears the
//! restock flags and wakes order consumption if the store was in stockout.

use super::store::{OrderOutcome, StoreId};
use super::trace::TraceKind;
use super::world::InventoryWorld;
use crate::core::errors::SimError;
use crate::core::process::{Context, Interrupt, Process, Suspend, Wake};
use crate::core::types::SimTime;
use log::debug;

/// Phase of a store's order-consumption loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPhase {
    /// Spawned, not started yet
    Idle,
    /// Waiting for the next customer arrival
    Ordering,
    /// Out of stock, waiting for the restock listener
    Stockout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPhase {
    Idle,
    InTransit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryProcess {
    OrderConsumption { store: StoreId, phase: OrderPhase },
    RestockListener { store: StoreId },
    Dispatcher,
    RestockDelivery { store: StoreId, phase: DeliveryPhase },
    Reporter { interval: SimTime },
}

impl InventoryProcess {
    pub fn order_consumption(store: StoreId) -> Self {
        InventoryProcess::OrderConsumption {
            store,
            phase: OrderPhase::Idle,
        }
    }

    pub fn restock_listener(store: StoreId) -> Self {
        InventoryProcess::RestockListener { store }
    }

    pub fn restock_delivery(store: StoreId) -> Self {
        InventoryProcess::RestockDelivery {
            store,
            phase: DeliveryPhase::Idle,
        }
    }

    pub fn reporter(interval: SimTime) -> Self {
        InventoryProcess::Reporter { interval }
    }

    fn unreachable(&self, wake: &Wake) -> SimError {
        SimError::UnreachableState {
            process: self.label(),
            detail: format!("unexpected wake {:?} in {:?}", wake, self),
        }
    }
}

type Ctx<'a, 'b> = &'a mut Context<'b, InventoryProcess>;

impl Process for InventoryProcess {
    type World = InventoryWorld;

    fn resume(&mut self, wake: Wake, ctx: &mut Context<'_, Self>) -> Result<Suspend, SimError> {
        match self {
            InventoryProcess::OrderConsumption { store, phase } => {
                let store = *store;
                match (*phase, &wake) {
                    (OrderPhase::Idle, Wake::Start) => {
                        let s = ctx.world().warehouse().store(store)?;
                        let kind = TraceKind::OrderingStarted {
                            store: s.name().to_string(),
                            inventory: s.inventory(),
                            reorder_point: s.reorder_point(),
                        };
                        let now = ctx.now();
                        ctx.world_mut().record(now, kind);
                        *phase = OrderPhase::Ordering;
                        next_arrival(ctx, store)
                    }
                    (OrderPhase::Ordering, Wake::Timeout) => {
                        let suspend = handle_arrival(ctx, store)?;
                        if suspend == Suspend::WaitForSignal {
                            *phase = OrderPhase::Stockout;
                        }
                        Ok(suspend)
                    }
                    (OrderPhase::Stockout, Wake::Interrupt(_)) => {
                        debug!("[t={}] store {} resumes ordering", ctx.now(), store);
                        *phase = OrderPhase::Ordering;
                        next_arrival(ctx, store)
                    }
                    _ => Err(self.unreachable(&wake)),
                }
            }
            InventoryProcess::RestockListener { store } => match &wake {
                Wake::Start => Ok(Suspend::WaitForSignal),
                Wake::Interrupt(_) => {
                    let store = *store;
                    complete_restock(ctx, store)?;
                    Ok(Suspend::WaitForSignal)
                }
                Wake::Timeout => Err(self.unreachable(&wake)),
            },
            InventoryProcess::Dispatcher => match &wake {
                Wake::Start => Ok(Suspend::WaitForSignal),
                Wake::Interrupt(interrupt) => {
                    dispatch_restock(ctx, interrupt)?;
                    Ok(Suspend::WaitForSignal)
                }
                Wake::Timeout => Err(self.unreachable(&wake)),
            },
            InventoryProcess::RestockDelivery { store, phase } => {
                let store = *store;
                match (*phase, &wake) {
                    (DeliveryPhase::Idle, Wake::Start) => {
                        let lead_interval = ctx.world().warehouse().restock_lead_time_interval();
                        let lead_time = ctx.world_mut().draw(lead_interval);
                        *phase = DeliveryPhase::InTransit;
                        Ok(Suspend::Timeout(lead_time))
                    }
                    (DeliveryPhase::InTransit, Wake::Timeout) => {
                        deliver(ctx, store)?;
                        Ok(Suspend::Exit)
                    }
                    _ => Err(self.unreachable(&wake)),
                }
            }
            InventoryProcess::Reporter { interval } => match &wake {
                Wake::Start => Ok(Suspend::Timeout(*interval)),
                Wake::Timeout => {
                    let stores = ctx.world().warehouse().pending_restocks();
                    let now = ctx.now();
                    ctx.world_mut().record(now, TraceKind::PendingRestocks { stores });
                    Ok(Suspend::Timeout(*interval))
                }
                Wake::Interrupt(_) => Err(self.unreachable(&wake)),
            },
        }
    }

    fn label(&self) -> String {
        match self {
            InventoryProcess::OrderConsumption { store, .. } => format!("order-consumption{}", store),
            InventoryProcess::RestockListener { store } => format!("restock-listener{}", store),
            InventoryProcess::Dispatcher => "dispatcher".to_string(),
            InventoryProcess::RestockDelivery { store, .. } => format!("restock-delivery{}", store),
            InventoryProcess::Reporter { .. } => "reporter".to_string(),
        }
    }
}

fn next_arrival(ctx: Ctx<'_, '_>, store: StoreId) -> Result<Suspend, SimError> {
    let interval = ctx.world().warehouse().store(store)?.arrival_interval();
    let delay = ctx.world_mut().draw(interval);
    Ok(Suspend::Timeout(delay))
}

/// A customer arrived: draw the order size and apply it
fn handle_arrival(ctx: Ctx<'_, '_>, store: StoreId) -> Result<Suspend, SimError> {
    let now = ctx.now();
    let interval = ctx.world().warehouse().store(store)?.order_size_interval();
    let size = ctx.world_mut().draw(interval);

    let s = ctx.world_mut().warehouse_mut().store_mut(store)?;
    let name = s.name().to_string();
    let inventory_before = s.inventory();
    match s.take_order(size) {
        OrderOutcome::Stockout => {
            ctx.world_mut().record(
                now,
                TraceKind::StockoutEntered {
                    store: name,
                    order_size: size,
                    inventory: inventory_before,
                },
            );
            Ok(Suspend::WaitForSignal)
        }
        OrderOutcome::Filled {
            remaining,
            restock_needed,
        } => {
            ctx.world_mut().record(
                now,
                TraceKind::OrderProcessed {
                    store: name.clone(),
                    size,
                    inventory: remaining,
                },
            );
            if restock_needed {
                request_restock(ctx, name)?;
            }
            next_arrival(ctx, store)
        }
    }
}

/// Signal the dispatcher that `store` needs stock; the reorder flag is already set
fn request_restock(ctx: Ctx<'_, '_>, store: String) -> Result<(), SimError> {
    let now = ctx.now();
    let dispatcher = ctx
        .world()
        .dispatcher()
        .ok_or_else(|| SimError::UnreachableState {
            process: "order-consumption".to_string(),
            detail: "no dispatcher registered".to_string(),
        })?;
    ctx.world_mut().record(now, TraceKind::RestockRequested { store: store.clone() });
    ctx.interrupt(dispatcher, Some(store))
}

fn dispatch_restock(ctx: Ctx<'_, '_>, interrupt: &Interrupt) -> Result<(), SimError> {
    let now = ctx.now();
    let name = interrupt
        .cause()
        .ok_or_else(|| SimError::UnknownStore("<missing interrupt cause>".to_string()))?;
    let store = ctx.world().warehouse().find_store(name)?;
    ctx.world_mut().warehouse_mut().store_mut(store)?.mark_restock_scheduled();
    ctx.spawn(InventoryProcess::restock_delivery(store));
    ctx.world_mut().record(now, TraceKind::RestockScheduled { store: name.to_string() });
    Ok(())
}

fn deliver(ctx: Ctx<'_, '_>, store: StoreId) -> Result<(), SimError> {
    let now = ctx.now();
    let s = ctx.world_mut().warehouse_mut().store_mut(store)?;
    let quantity = s.deficit();
    s.add_inventory(quantity)?;
    let name = s.name().to_string();
    let listener = s.listener_process().ok_or_else(|| SimError::UnreachableState {
        process: format!("restock-delivery{}", store),
        detail: "store has no restock listener".to_string(),
    })?;
    ctx.world_mut().record(now, TraceKind::RestockDelivered { store: name, quantity });
    ctx.interrupt(listener, None)
}

/// Clear the store's restock state, then wake order consumption if it was stocked out
fn complete_restock(ctx: Ctx<'_, '_>, store: StoreId) -> Result<(), SimError> {
    let now = ctx.now();
    let s = ctx.world_mut().warehouse_mut().store_mut(store)?;
    let was_stockout = s.complete_restock();
    let name = s.name().to_string();
    let inventory = s.inventory();
    let order_process = s.order_process();

    if was_stockout {
        let order_process = order_process.ok_or_else(|| SimError::UnreachableState {
            process: format!("restock-listener{}", store),
            detail: "store has no order process".to_string(),
        })?;
        ctx.interrupt(order_process, None)?;
    }
    ctx.world_mut().record(
        now,
        TraceKind::RestockCompleted {
            store: name,
            inventory,
            resumed_ordering: was_stockout,
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::simulation_engine::SimulationEngine;
    use crate::inventory::config::SimulationConfig;

    fn engine() -> SimulationEngine<InventoryProcess> {
        let config = SimulationConfig::new()
            .with_store_count(2)
            .with_store_overrides(vec![]);
        SimulationEngine::new(InventoryWorld::from_config(&config).unwrap())
    }

    #[test]
    fn test_interrupt_while_ordering_is_unreachable() {
        let mut engine = engine();
        let pid = engine.spawn(InventoryProcess::order_consumption(StoreId(0)));
        assert!(engine.step().unwrap());
        assert_eq!(
            engine.process(pid),
            Some(&InventoryProcess::OrderConsumption {
                store: StoreId(0),
                phase: OrderPhase::Ordering
            })
        );

        engine.interrupt(pid, None).unwrap();
        let err = engine.step().unwrap_err();
        match err {
            SimError::UnreachableState { process, .. } => assert_eq!(process, "order-consumption#1"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_dispatcher_rejects_unknown_store() {
        let mut engine = engine();
        let dispatcher = engine.spawn(InventoryProcess::Dispatcher);
        engine.step().unwrap();

        engine.interrupt(dispatcher, Some("HD99".to_string())).unwrap();
        assert_eq!(engine.step(), Err(SimError::UnknownStore("HD99".to_string())));
    }

    #[test]
    fn test_reporter_snapshots_pending_restocks() {
        let mut engine = engine();
        engine.spawn(InventoryProcess::reporter(5));
        engine.run_until(6).unwrap();

        engine
            .world_mut()
            .warehouse_mut()
            .store_mut(StoreId(1))
            .unwrap()
            .mark_restock_scheduled();
        engine.run_until(11).unwrap();

        let reports: Vec<_> = engine
            .world()
            .trace()
            .events()
            .iter()
            .map(|e| (e.time, e.kind.clone()))
            .collect();
        assert_eq!(
            reports,
            vec![
                (5, TraceKind::PendingRestocks { stores: vec![] }),
                (10, TraceKind::PendingRestocks { stores: vec!["HD2".to_string()] }),
            ]
        );
    }

    #[test]
    fn test_labels_name_the_store() {
        assert_eq!(InventoryProcess::restock_listener(StoreId(4)).label(), "restock-listener#5");
        assert_eq!(InventoryProcess::Dispatcher.label(), "dispatcher");
    }
}
