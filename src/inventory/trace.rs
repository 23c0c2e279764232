use crate::core::types::SimTime;
use serde::Serialize;

/// Something observable that happened during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceKind {
    OrderingStarted {
        store: String,
        inventory: u64,
        reorder_point: u64,
    },
    OrderProcessed {
        store: String,
        size: u64,
        inventory: u64,
    },
    RestockRequested {
        store: String,
    },
    StockoutEntered {
        store: String,
        order_size: u64,
        inventory: u64,
    },
    RestockScheduled {
        store: String,
    },
    RestockDelivered {
        store: String,
        quantity: u64,
    },
    RestockCompleted {
        store: String,
        inventory: u64,
        resumed_ordering: bool,
    },
    PendingRestocks {
        stores: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEvent {
    pub time: SimTime,
    #[serde(flatten)]
    pub kind: TraceKind,
}

impl std::fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let t = self.time;
        match &self.kind {
            TraceKind::OrderingStarted {
                store,
                inventory,
                reorder_point,
            } => write!(
                f,
                "Starting orders for {} at time {} with Init. Inventory = {}, RP value = {}",
                store, t, inventory, reorder_point
            ),
            TraceKind::OrderProcessed { store, inventory, .. } => {
                write!(f, "{}  inventory level is  {}  at time  {}", store, inventory, t)
            }
            TraceKind::RestockRequested { store } => {
                write!(f, "!!! {}  is interrupting warehouse at time  {}", store, t)
            }
            TraceKind::StockoutEntered { store, .. } => {
                write!(f, "%%% Stockout occurred for {} at time {}", store, t)
            }
            TraceKind::RestockScheduled { store } => {
                write!(f, "Start scheduling & delivering restock to {} at time  {}", store, t)
            }
            TraceKind::RestockDelivered { store, quantity } => {
                write!(f, "Delivered {} units to {} at time  {}", quantity, store, t)
            }
            TraceKind::RestockCompleted { store, inventory, .. } => write!(
                f,
                "{}  completed re-stocking, resuming w. I(t) =  {}  at time   {}",
                store, inventory, t
            ),
            TraceKind::PendingRestocks { stores } => write!(
                f,
                "RPT:: Stores with pending restocks at time {} :: [{}]",
                t,
                stores.join(", ")
            ),
        }
    }
}

/// Append-only event trace of one run
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, time: SimTime, kind: TraceKind) {
        let event = TraceEvent { time, kind };
        log::debug!("{}", event);
        self.events.push(event);
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events concerning `store`, in recording order
    pub fn for_store<'a>(&'a self, store: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |event| match &event.kind {
            TraceKind::OrderingStarted { store: s, .. }
            | TraceKind::OrderProcessed { store: s, .. }
            | TraceKind::RestockRequested { store: s }
            | TraceKind::StockoutEntered { store: s, .. }
            | TraceKind::RestockScheduled { store: s }
            | TraceKind::RestockDelivered { store: s, .. }
            | TraceKind::RestockCompleted { store: s, .. } => s == store,
            TraceKind::PendingRestocks { .. } => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lines() {
        let event = TraceEvent {
            time: 12,
            kind: TraceKind::OrderProcessed { store: "HD3".to_string(), size: 25, inventory: 140 },
        };
        assert_eq!(event.to_string(), "HD3  inventory level is  140  at time  12");

        let report = TraceEvent {
            time: 5,
            kind: TraceKind::PendingRestocks { stores: vec!["HD1".to_string(), "HD4".to_string()] },
        };
        assert_eq!(report.to_string(), "RPT:: Stores with pending restocks at time 5 :: [HD1, HD4]");
    }

    #[test]
    fn test_for_store_filters_events() {
        let mut trace = Trace::new();
        trace.record(1, TraceKind::RestockRequested { store: "HD1".to_string() });
        trace.record(1, TraceKind::RestockRequested { store: "HD10".to_string() });
        trace.record(5, TraceKind::PendingRestocks { stores: vec!["HD1".to_string()] });
        trace.record(6, TraceKind::RestockScheduled { store: "HD1".to_string() });

        let times: Vec<_> = trace.for_store("HD1").map(|e| e.time).collect();
        assert_eq!(times, vec![1, 6]);
        assert_eq!(trace.len(), 4);
    }

    #[test]
    fn test_serializes_flat_json() {
        let event = TraceEvent {
            time: 3,
            kind: TraceKind::RestockScheduled { store: "HD2".to_string() },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["time"], 3);
        assert_eq!(json["event"], "restock_scheduled");
        assert_eq!(json["store"], "HD2");
    }
}
