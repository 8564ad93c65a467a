//! Per-task verdicts and the per-cycle summary.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepReason {
    /// Resolved, but the service refused the booking.
    CapacityRace,
    NotYetAvailable,
    /// A transport or decode fault; try again next cycle.
    Transient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveReason {
    Registered,
    Expired,
    NotFound,
    UnknownCustomer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep(KeepReason),
    Remove(RemoveReason),
}

impl Decision {
    #[must_use]
    pub const fn keeps(self) -> bool {
        matches!(self, Self::Keep(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Keep(KeepReason::CapacityRace) => "kept: refused, retrying",
            Self::Keep(KeepReason::NotYetAvailable) => "kept: not open yet",
            Self::Keep(KeepReason::Transient) => "kept: upstream fault",
            Self::Remove(RemoveReason::Registered) => "registered",
            Self::Remove(RemoveReason::Expired) => "dropped: expired",
            Self::Remove(RemoveReason::NotFound) => "dropped: not found",
            Self::Remove(RemoveReason::UnknownCustomer) => "dropped: unknown customer",
        })
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub tasks: usize,
    pub snapshots: usize,
    pub registered: usize,
    pub kept: usize,
    pub dropped: usize,
}

impl CycleReport {
    pub(crate) fn record(&mut self, decision: Decision) {
        match decision {
            Decision::Keep(_) => self.kept += 1,
            Decision::Remove(RemoveReason::Registered) => self.registered += 1,
            Decision::Remove(_) => self.dropped += 1,
        }
    }
}
