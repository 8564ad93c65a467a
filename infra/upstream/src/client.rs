use crate::error::{UpstreamError, UpstreamErrorExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use zb_domain::config::UpstreamConfig;
use zb_domain::{
    AvailabilityEntry, CalendarItem, ClassOffering, Customer, LocationSlot, TaskKind, TicketSlot,
};

/// Stateless handle; the session lives in the [`Customer`] passed to each call.
#[derive(Debug, Clone)]
pub struct RscClient {
    http: reqwest::Client,
    base_url: String,
}

impl RscClient {
    /// # Errors
    ///
    /// [`UpstreamError::Transport`] if the TLS backend cannot be initialised.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Building HTTP client")?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchanges a username and password for a session.
    pub async fn log_in(&self, username: &str, password: &str) -> Result<Customer, UpstreamError> {
        self.call("user", "logIn", &[("username", username), ("password", password)])
            .await
            .context("Logging in")
    }

    /// Bookings the customer currently holds.
    pub async fn calendar(&self, customer: &Customer) -> Result<Vec<CalendarItem>, UpstreamError> {
        self.authed(customer, "agenda", "getAgenda", &[]).await
    }

    /// Location hours currently open for registration.
    pub async fn locations(&self, customer: &Customer) -> Result<Vec<LocationSlot>, UpstreamError> {
        self.authed(customer, "locatie", "getLocaties", &[]).await
    }

    pub async fn tickets(&self, customer: &Customer) -> Result<Vec<TicketSlot>, UpstreamError> {
        self.authed(customer, "ticketuur", "getTicketuren", &[]).await
    }

    pub async fn classes(&self, customer: &Customer) -> Result<Vec<ClassOffering>, UpstreamError> {
        self.authed(customer, "cursus", "getCursussen", &[]).await
    }

    /// The open entries of one kind, wrapped uniformly.
    pub async fn entries(
        &self,
        customer: &Customer,
        kind: TaskKind,
    ) -> Result<Vec<AvailabilityEntry>, UpstreamError> {
        let entries = match kind {
            TaskKind::Location => wrap(self.locations(customer).await?),
            TaskKind::Class => wrap(self.classes(customer).await?),
            TaskKind::Ticket => wrap(self.tickets(customer).await?),
        };
        Ok(entries)
    }

    pub async fn register_location(
        &self,
        customer: &Customer,
        slot: &LocationSlot,
    ) -> Result<(), UpstreamError> {
        let start = slot.start.to_string();
        let end = slot.end.to_string();
        let form = [
            ("inschrijvingId", slot.registration_id.as_str()),
            ("poolId", slot.pool_id.as_str()),
            ("laanbodId", slot.offering_id.as_str()),
            ("start", start.as_str()),
            ("eind", end.as_str()),
        ];
        self.authed::<Value>(customer, "locatie", "addLinschrijving", &form).await.map(drop)
    }

    pub async fn register_ticket(
        &self,
        customer: &Customer,
        slot: &TicketSlot,
    ) -> Result<(), UpstreamError> {
        let form = [
            ("inschrijvingId", slot.registration_id.as_str()),
            ("poolId", slot.pool_id.as_str()),
            ("planregelId", slot.id.as_str()),
        ];
        self.authed::<Value>(customer, "ticketuur", "addTinschrijving", &form).await.map(drop)
    }

    pub async fn register_class(
        &self,
        customer: &Customer,
        offering: &ClassOffering,
    ) -> Result<(), UpstreamError> {
        let form = [("aanbodId", offering.id.as_str())];
        self.authed::<Value>(customer, "cursus", "addInschrijving", &form).await.map(drop)
    }

    /// Registers for any entry. `Ok` means the service confirmed the booking.
    pub async fn register(
        &self,
        customer: &Customer,
        entry: &AvailabilityEntry,
    ) -> Result<(), UpstreamError> {
        match entry {
            AvailabilityEntry::Location(slot) => self.register_location(customer, slot).await,
            AvailabilityEntry::Class(offering) => self.register_class(customer, offering).await,
            AvailabilityEntry::Ticket(slot) => self.register_ticket(customer, slot).await,
        }
    }

    async fn authed<T: DeserializeOwned>(
        &self,
        customer: &Customer,
        module: &str,
        method: &str,
        extra: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let mut form = Vec::with_capacity(extra.len() + 2);
        form.push(("klantId", customer.customer_id.as_str()));
        form.push(("token", customer.token.as_str()));
        form.extend_from_slice(extra);
        self.call(module, method, &form).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        module: &str,
        method: &str,
        form: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        debug!(module, method, "Calling upstream");

        let body = self
            .http
            .post(&self.base_url)
            .query(&[("module", module), ("method", method)])
            .form(form)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .context(format!("{module}/{method}"))?
            .bytes()
            .await
            .context(format!("{module}/{method}: reading body"))?;

        let value: Value =
            serde_json::from_slice(&body).context(format!("{module}/{method}: not JSON"))?;

        if let Some(error) = value.get("error") {
            return Err(UpstreamError::Rejected {
                message: rejection_message(error).into(),
                context: Some(format!("{module}/{method}").into()),
            });
        }

        serde_json::from_value(value).context(format!("{module}/{method}"))
    }
}

fn wrap<E: Into<AvailabilityEntry>>(items: Vec<E>) -> Vec<AvailabilityEntry> {
    items.into_iter().map(Into::into).collect()
}

fn rejection_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_owned),
        other => other.to_string(),
    }
}
