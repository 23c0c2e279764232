/// Model time. One unit is one hour in the default inventory scenario.
pub type SimTime = u64;

/// Handle identifying a process registered with the simulation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub(crate) usize);

impl ProcessId {
    /// Get the raw slot index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Priority class of a pending wakeup.
///
/// At equal wake time urgent wakeups (process start, interrupt delivery) run before
/// normal ones (timeouts). Inside a class, submission order decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    Urgent,
    Normal,
}

/// Half-open integer interval `[lo, hi)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Interval {
    pub lo: u64,
    pub hi: u64,
}

impl Interval {
    pub const fn new(lo: u64, hi: u64) -> Self {
        Self { lo, hi }
    }

    /// Interval containing exactly `value`
    pub const fn fixed(value: u64) -> Self {
        Self {
            lo: value,
            hi: value + 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lo >= self.hi
    }

    pub fn contains(&self, value: u64) -> bool {
        self.lo <= value && value < self.hi
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.lo, self.hi)
    }
}

impl From<(u64, u64)> for Interval {
    fn from((lo, hi): (u64, u64)) -> Self {
        Self::new(lo, hi)
    }
}
