//! # Domain Models
//!
//! Pure data types of the booking daemon with minimal dependencies (`serde`,
//! `chrono`, `bitflags`). No I/O, networking or decisions live here: just the
//! shapes that the store, the upstream client and the reconciler agree on.

pub mod availability;
pub mod config;
pub mod customer;
pub mod task;
mod wire;

pub use availability::{AvailabilityEntry, CalendarItem, ClassOffering, LocationSlot, TicketSlot};
pub use customer::Customer;
pub use task::{KindSet, LocationSelector, OfferingSelector, Queue, RegistrationTask, TaskKind, TimeWindow};
