//! # Reconciler
//!
//! The booking engine. A durable queue holds registration intents; every cycle
//! the [`Reconciler`] refreshes availability once per needed kind, resolves each
//! intent against it, tries to register what resolved and decides per intent
//! whether to keep it. Survivors are written back in their original order with
//! a single save. [`ReconciliationLoop`] repeats this after a random pause.
//!
//! | Outcome                           | Decision |
//! |-----------------------------------|----------|
//! | resolved, booking confirmed       | remove   |
//! | resolved, booking refused         | keep     |
//! | not yet available                 | keep     |
//! | expired or not found              | remove   |
//! | unknown customer                  | remove   |
//! | transport fault (fetch or book)   | keep     |

mod decision;
mod error;
mod reconciler;
mod registrar;
pub mod resolver;
mod schedule;
mod scheduler;
mod source;
pub mod store;

pub use decision::{CycleReport, Decision, KeepReason, RemoveReason};
pub use error::{ReconcileError, ReconcileErrorExt};
pub use reconciler::Reconciler;
pub use registrar::Registrar;
pub use resolver::{Resolution, Resolver};
pub use schedule::{Jitter, rng_for};
pub use scheduler::ReconciliationLoop;
pub use source::{BookingApi, Snapshot};
pub use store::{CredentialStore, FileCredentialStore, FileTaskStore, TaskStore};
