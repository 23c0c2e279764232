use super::errors::SimError;
use super::process::Interrupt;
use super::types::{Priority, ProcessId, SimTime};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// What happens to a process when its scheduled entry comes due
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WakeKind {
    /// First resumption after spawn
    Start,
    /// A timed wait elapsed; `token` identifies which wait so cancelled ones can be skipped
    Timeout { token: u64 },
    /// An interrupt raised by another process or by the caller of the engine
    Interrupt(Interrupt),
}

#[derive(Debug)]
pub struct ScheduledEvent {
    pub wake_time: SimTime,
    pub priority: Priority,
    pub sequence_num: u64,
    pub process: ProcessId,
    pub kind: WakeKind,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.wake_time == other.wake_time
            && self.priority == other.priority
            && self.sequence_num == other.sequence_num
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .wake_time
            .cmp(&self.wake_time)
            .then_with(|| other.priority.cmp(&self.priority))
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Min-priority queue of pending process wakeups keyed by absolute model time
pub struct EventScheduler {
    event_queue: BinaryHeap<ScheduledEvent>,
    sequence_counter: u64,
}

impl EventScheduler {
    /// Create a new EventScheduler
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
        }
    }

    /// Schedule a wakeup `delay` time units after `now`
    pub fn schedule_after(
        &mut self,
        now: SimTime,
        delay: SimTime,
        priority: Priority,
        process: ProcessId,
        kind: WakeKind,
    ) -> Result<u64, SimError> {
        let wake_time = now
            .checked_add(delay)
            .ok_or(SimError::TimeOverflow { now, delay })?;
        Ok(self.push(wake_time, priority, process, kind))
    }

    /// Schedule a wakeup at `now` itself, used for starts and interrupts
    pub fn schedule_now(
        &mut self,
        now: SimTime,
        priority: Priority,
        process: ProcessId,
        kind: WakeKind,
    ) -> u64 {
        self.push(now, priority, process, kind)
    }

    fn push(&mut self, wake_time: SimTime, priority: Priority, process: ProcessId, kind: WakeKind) -> u64 {
        let sequence_num = self.sequence_counter;
        self.event_queue.push(ScheduledEvent {
            wake_time,
            priority,
            sequence_num,
            process,
            kind,
        });
        self.sequence_counter += 1;
        sequence_num
    }

    /// Remove and return the earliest pending wakeup
    pub fn pop_next(&mut self) -> Option<ScheduledEvent> {
        self.event_queue.pop()
    }

    /// Check if there are any events remaining in the queue
    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    /// Get the wake time of the next event without removing it
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|event| event.wake_time)
    }

    /// Number of queued entries, stale ones included
    pub fn len(&self) -> usize {
        self.event_queue.len()
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: usize) -> ProcessId {
        ProcessId(n)
    }

    #[test]
    fn test_pops_in_time_order() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule_after(0, 5, Priority::Normal, pid(0), WakeKind::Start).unwrap();
        scheduler.schedule_after(0, 2, Priority::Normal, pid(1), WakeKind::Start).unwrap();
        scheduler.schedule_after(0, 9, Priority::Normal, pid(2), WakeKind::Start).unwrap();

        let order: Vec<_> = std::iter::from_fn(|| scheduler.pop_next())
            .map(|event| (event.wake_time, event.process))
            .collect();
        assert_eq!(order, vec![(2, pid(1)), (5, pid(0)), (9, pid(2))]);
    }

    #[test]
    fn test_equal_times_keep_submission_order() {
        let mut scheduler = EventScheduler::new();
        for n in 0..6 {
            scheduler.schedule_after(3, 1, Priority::Normal, pid(n), WakeKind::Timeout { token: 0 }).unwrap();
        }

        let order: Vec<_> = std::iter::from_fn(|| scheduler.pop_next())
            .map(|event| event.process.index())
            .collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_urgent_precedes_normal_at_same_time() {
        let mut scheduler = EventScheduler::new();
        scheduler.schedule_after(0, 4, Priority::Normal, pid(0), WakeKind::Timeout { token: 1 }).unwrap();
        scheduler.schedule_now(4, Priority::Urgent, pid(1), WakeKind::Start);
        scheduler.schedule_after(0, 3, Priority::Normal, pid(2), WakeKind::Timeout { token: 1 }).unwrap();

        let first = scheduler.pop_next().unwrap();
        assert_eq!(first.process, pid(2));
        let second = scheduler.pop_next().unwrap();
        assert_eq!(second.process, pid(1), "Urgent entry should run before the earlier-submitted normal one");
        assert_eq!(scheduler.pop_next().unwrap().process, pid(0));
        assert!(!scheduler.has_events());
    }

    #[test]
    fn test_peek_does_not_remove() {
        let mut scheduler = EventScheduler::new();
        assert_eq!(scheduler.peek_next_time(), None);
        scheduler.schedule_after(10, 7, Priority::Normal, pid(0), WakeKind::Start).unwrap();
        assert_eq!(scheduler.peek_next_time(), Some(17));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_wake_time_overflow_is_an_error() {
        let mut scheduler = EventScheduler::new();
        let result = scheduler.schedule_after(5, u64::MAX - 2, Priority::Normal, pid(0), WakeKind::Start);
        assert_eq!(result, Err(SimError::TimeOverflow { now: 5, delay: u64::MAX - 2 }));
        assert!(!scheduler.has_events());
    }
}
