//! The upstream seam: availability snapshots and registration calls.

use async_trait::async_trait;
use zb_domain::{AvailabilityEntry, Customer, TaskKind};
use zb_upstream::{RscClient, UpstreamError};

/// What the reconciler needs from the booking service.
///
/// `register` returns `Ok` only for a confirmed booking. A refusal comes back as
/// [`UpstreamError::Rejected`]; every other error is a fault.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn fetch_entries(
        &self,
        customer: &Customer,
        kind: TaskKind,
    ) -> Result<Vec<AvailabilityEntry>, UpstreamError>;

    async fn register(
        &self,
        customer: &Customer,
        entry: &AvailabilityEntry,
    ) -> Result<(), UpstreamError>;
}

#[async_trait]
impl BookingApi for RscClient {
    async fn fetch_entries(
        &self,
        customer: &Customer,
        kind: TaskKind,
    ) -> Result<Vec<AvailabilityEntry>, UpstreamError> {
        self.entries(customer, kind).await
    }

    async fn register(
        &self,
        customer: &Customer,
        entry: &AvailabilityEntry,
    ) -> Result<(), UpstreamError> {
        Self::register(self, customer, entry).await
    }
}

/// One fresh set of entries of a single kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub kind: TaskKind,
    pub entries: Vec<AvailabilityEntry>,
}

impl Snapshot {
    #[must_use]
    pub const fn new(kind: TaskKind, entries: Vec<AvailabilityEntry>) -> Self {
        Self { kind, entries }
    }
}
