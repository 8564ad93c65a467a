use crate::source::BookingApi;
use std::sync::Arc;
use tracing::{debug, warn};
use zb_domain::{AvailabilityEntry, Customer};
use zb_upstream::UpstreamError;

/// Commits one registration. Never touches the entry's counters.
#[derive(Clone)]
pub struct Registrar {
    api: Arc<dyn BookingApi>,
}

impl std::fmt::Debug for Registrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrar").finish_non_exhaustive()
    }
}

impl Registrar {
    #[must_use]
    pub fn new(api: Arc<dyn BookingApi>) -> Self {
        Self { api }
    }

    /// `Ok(true)` when the booking was confirmed, `Ok(false)` when the service
    /// refused it (typically full).
    ///
    /// # Errors
    /// Transport and decode faults, for the caller to isolate per task.
    pub async fn attempt(
        &self,
        customer: &Customer,
        entry: &AvailabilityEntry,
    ) -> Result<bool, UpstreamError> {
        match self.api.register(customer, entry).await {
            Ok(()) => {
                debug!(customer = %customer.customer_id, entry = %entry.id(), "Registration confirmed");
                Ok(true)
            },
            Err(UpstreamError::Rejected { message, .. }) => {
                warn!(
                    customer = %customer.customer_id,
                    entry = %entry.id(),
                    enrolled = entry.enrolled(),
                    max = entry.max_enrolled(),
                    reason = %message,
                    "Registration refused"
                );
                Ok(false)
            },
            Err(err) => Err(err),
        }
    }
}
