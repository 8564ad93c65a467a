//! Pending registration intents and the persisted queue.

use bitflags::bitflags;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ordered, persisted queue of pending intents.
pub type Queue = Vec<RegistrationTask>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Location,
    Class,
    Ticket,
}

impl TaskKind {
    pub const ALL: [Self; 3] = [Self::Location, Self::Class, Self::Ticket];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Class => "class",
            Self::Ticket => "ticket",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Set of kinds that a queue needs snapshots for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KindSet: u8 {
        const LOCATION = 1 << 0;
        const CLASS = 1 << 1;
        const TICKET = 1 << 2;
    }
}

impl From<TaskKind> for KindSet {
    fn from(kind: TaskKind) -> Self {
        match kind {
            TaskKind::Location => Self::LOCATION,
            TaskKind::Class => Self::CLASS,
            TaskKind::Ticket => Self::TICKET,
        }
    }
}

impl FromIterator<TaskKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = TaskKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, kind| set | kind.into())
    }
}

impl KindSet {
    /// Member kinds in declaration order.
    pub fn kinds(self) -> impl Iterator<Item = TaskKind> {
        TaskKind::ALL.into_iter().filter(move |kind| self.contains((*kind).into()))
    }
}

/// A local date, wall-clock time and facility tag naming a future location slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub date: NaiveDate,
    #[serde(with = "crate::wire::hh_mm")]
    pub time: NaiveTime,
    pub facility: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationSelector {
    DirectId(String),
    TimeWindow(TimeWindow),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OfferingSelector {
    DirectId(String),
}

/// One persisted intent: who wants what.
///
/// Stored as `{"kind": "location", "customerId": "...", "selector": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RegistrationTask {
    Location { customer_id: String, selector: LocationSelector },
    Class { customer_id: String, selector: OfferingSelector },
    Ticket { customer_id: String, selector: OfferingSelector },
}

impl RegistrationTask {
    #[must_use]
    pub fn location_slot(customer_id: impl Into<String>, slot_id: impl Into<String>) -> Self {
        Self::Location {
            customer_id: customer_id.into(),
            selector: LocationSelector::DirectId(slot_id.into()),
        }
    }

    #[must_use]
    pub fn location_window(
        customer_id: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
        facility: impl Into<String>,
    ) -> Self {
        Self::Location {
            customer_id: customer_id.into(),
            selector: LocationSelector::TimeWindow(TimeWindow {
                date,
                time,
                facility: facility.into(),
            }),
        }
    }

    #[must_use]
    pub fn class(customer_id: impl Into<String>, offering_id: impl Into<String>) -> Self {
        Self::Class {
            customer_id: customer_id.into(),
            selector: OfferingSelector::DirectId(offering_id.into()),
        }
    }

    #[must_use]
    pub fn ticket(customer_id: impl Into<String>, offering_id: impl Into<String>) -> Self {
        Self::Ticket {
            customer_id: customer_id.into(),
            selector: OfferingSelector::DirectId(offering_id.into()),
        }
    }

    #[must_use]
    pub fn customer_id(&self) -> &str {
        match self {
            Self::Location { customer_id, .. }
            | Self::Class { customer_id, .. }
            | Self::Ticket { customer_id, .. } => customer_id,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::Location { .. } => TaskKind::Location,
            Self::Class { .. } => TaskKind::Class,
            Self::Ticket { .. } => TaskKind::Ticket,
        }
    }
}

impl fmt::Display for RegistrationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location { selector: LocationSelector::DirectId(id), .. } => {
                write!(f, "location slot {id}")
            },
            Self::Location { selector: LocationSelector::TimeWindow(window), .. } => write!(
                f,
                "location '{}' on {} at {}",
                window.facility,
                window.date,
                window.time.format("%H:%M")
            ),
            Self::Class { selector: OfferingSelector::DirectId(id), .. } => write!(f, "class {id}"),
            Self::Ticket { selector: OfferingSelector::DirectId(id), .. } => write!(f, "ticket {id}"),
        }
    }
}
