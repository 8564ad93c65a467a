//! Live availability snapshots returned by the booking service.
//!
//! Records mirror the upstream field names; times are epoch seconds and every
//! numeric field is accepted either quoted or bare.

use crate::task::TaskKind;
use serde::{Deserialize, Serialize};

/// A bookable hour at a location (pool, gym floor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSlot {
    #[serde(rename = "planregelId", deserialize_with = "crate::wire::id")]
    pub id: String,
    #[serde(rename = "naam")]
    pub name: String,
    #[serde(rename = "inschrijvingId", deserialize_with = "crate::wire::id")]
    pub registration_id: String,
    #[serde(rename = "poolId", deserialize_with = "crate::wire::id")]
    pub pool_id: String,
    #[serde(rename = "laanbodId", deserialize_with = "crate::wire::id")]
    pub offering_id: String,
    #[serde(deserialize_with = "crate::wire::number")]
    pub start: i64,
    #[serde(rename = "eind", deserialize_with = "crate::wire::number")]
    pub end: i64,
    #[serde(rename = "inschrijvingen", default, deserialize_with = "crate::wire::count")]
    pub enrolled: u32,
    #[serde(rename = "maxInschrijvingen", default, deserialize_with = "crate::wire::count")]
    pub max_enrolled: u32,
}

/// A course; registering books all of its sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassOffering {
    #[serde(rename = "aanbodId", deserialize_with = "crate::wire::id")]
    pub id: String,
    #[serde(rename = "naam")]
    pub name: String,
    #[serde(rename = "eersteStart", deserialize_with = "crate::wire::number")]
    pub start: i64,
    #[serde(rename = "eersteEind", deserialize_with = "crate::wire::number")]
    pub end: i64,
    #[serde(rename = "inschrijvingen", default, deserialize_with = "crate::wire::count")]
    pub enrolled: u32,
    #[serde(rename = "maxInschrijvingen", default, deserialize_with = "crate::wire::count")]
    pub max_enrolled: u32,
}

/// A ticketed hour (e.g. a single lesson bought with a strip card).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSlot {
    #[serde(rename = "planregelId", deserialize_with = "crate::wire::id")]
    pub id: String,
    #[serde(rename = "naam")]
    pub name: String,
    #[serde(rename = "inschrijvingId", deserialize_with = "crate::wire::id")]
    pub registration_id: String,
    #[serde(rename = "poolId", deserialize_with = "crate::wire::id")]
    pub pool_id: String,
    #[serde(deserialize_with = "crate::wire::number")]
    pub start: i64,
    #[serde(rename = "eind", deserialize_with = "crate::wire::number")]
    pub end: i64,
    #[serde(rename = "inschrijvingen", default, deserialize_with = "crate::wire::count")]
    pub enrolled: u32,
    #[serde(rename = "maxInschrijvingen", default, deserialize_with = "crate::wire::count")]
    pub max_enrolled: u32,
}

/// One entry of a per-kind snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityEntry {
    Location(LocationSlot),
    Class(ClassOffering),
    Ticket(TicketSlot),
}

impl AvailabilityEntry {
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::Location(_) => TaskKind::Location,
            Self::Class(_) => TaskKind::Class,
            Self::Ticket(_) => TaskKind::Ticket,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Location(slot) => &slot.id,
            Self::Class(offering) => &offering.id,
            Self::Ticket(slot) => &slot.id,
        }
    }

    /// Facility or category tag (`naam`).
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Location(slot) => &slot.name,
            Self::Class(offering) => &offering.name,
            Self::Ticket(slot) => &slot.name,
        }
    }

    #[must_use]
    pub const fn start(&self) -> i64 {
        match self {
            Self::Location(slot) => slot.start,
            Self::Class(offering) => offering.start,
            Self::Ticket(slot) => slot.start,
        }
    }

    #[must_use]
    pub const fn end(&self) -> i64 {
        match self {
            Self::Location(slot) => slot.end,
            Self::Class(offering) => offering.end,
            Self::Ticket(slot) => slot.end,
        }
    }

    #[must_use]
    pub const fn enrolled(&self) -> u32 {
        match self {
            Self::Location(slot) => slot.enrolled,
            Self::Class(offering) => offering.enrolled,
            Self::Ticket(slot) => slot.enrolled,
        }
    }

    #[must_use]
    pub const fn max_enrolled(&self) -> u32 {
        match self {
            Self::Location(slot) => slot.max_enrolled,
            Self::Class(offering) => offering.max_enrolled,
            Self::Ticket(slot) => slot.max_enrolled,
        }
    }
}

impl From<LocationSlot> for AvailabilityEntry {
    fn from(slot: LocationSlot) -> Self {
        Self::Location(slot)
    }
}

impl From<ClassOffering> for AvailabilityEntry {
    fn from(offering: ClassOffering) -> Self {
        Self::Class(offering)
    }
}

impl From<TicketSlot> for AvailabilityEntry {
    fn from(slot: TicketSlot) -> Self {
        Self::Ticket(slot)
    }
}

/// A booking the customer already holds, from the agenda call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarItem {
    #[serde(rename = "planregelId", default, deserialize_with = "crate::wire::id")]
    pub id: String,
    #[serde(rename = "naam")]
    pub name: String,
    #[serde(rename = "locatie", default)]
    pub location: String,
    #[serde(rename = "type", default)]
    pub category: String,
    #[serde(deserialize_with = "crate::wire::number")]
    pub start: i64,
    #[serde(rename = "eind", deserialize_with = "crate::wire::number")]
    pub end: i64,
    #[serde(rename = "uitschrijfbaar", default, deserialize_with = "crate::wire::flag")]
    pub cancellable: bool,
}
