//! Durable state: the task queue and the credential list.
//!
//! Both are whole-snapshot JSON files. A process is assumed to be the only
//! writer; `zwembot enqueue` while a daemon is saving can lose one of the two
//! writes.

use crate::error::{ReconcileError, ReconcileErrorExt};
use async_trait::async_trait;
use tracing::debug;
use zb_domain::{Customer, Queue, RegistrationTask};
use zb_store::Store;

pub const QUEUE_FILE: &str = "queue.json";
pub const CUSTOMERS_FILE: &str = "customers.json";

/// Whole-snapshot persistence of the pending-intent queue.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// The persisted queue; empty if nothing was ever saved.
    async fn get(&self) -> Result<Queue, ReconcileError>;

    /// Replaces the persisted queue with exactly `queue`.
    async fn save(&self, queue: &[RegistrationTask]) -> Result<(), ReconcileError>;

    async fn append(&self, task: RegistrationTask) -> Result<(), ReconcileError> {
        let mut queue = self.get().await?;
        queue.push(task);
        self.save(&queue).await
    }
}

/// Read access to stored sessions, plus the write used by `zwembot login`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn list_customers(&self) -> Result<Vec<Customer>, ReconcileError>;

    async fn find_customer(&self, customer_id: &str) -> Result<Option<Customer>, ReconcileError> {
        Ok(self.list_customers().await?.into_iter().find(|c| c.customer_id == customer_id))
    }

    /// Adds a customer, replacing a stored one with the same id.
    async fn store_customer(&self, customer: Customer) -> Result<(), ReconcileError>;
}

/// [`TaskStore`] over `queue.json`.
#[derive(Debug, Clone)]
pub struct FileTaskStore {
    store: Store,
}

impl FileTaskStore {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TaskStore for FileTaskStore {
    async fn get(&self) -> Result<Queue, ReconcileError> {
        self.store.load(QUEUE_FILE).await.context("Reading task queue")
    }

    async fn save(&self, queue: &[RegistrationTask]) -> Result<(), ReconcileError> {
        self.store.save(QUEUE_FILE, queue).await.context("Writing task queue")?;
        debug!(tasks = queue.len(), "Task queue persisted");
        Ok(())
    }
}

/// [`CredentialStore`] over `customers.json`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    store: Store,
}

impl FileCredentialStore {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn list_customers(&self) -> Result<Vec<Customer>, ReconcileError> {
        self.store.load(CUSTOMERS_FILE).await.context("Reading credential store")
    }

    async fn store_customer(&self, customer: Customer) -> Result<(), ReconcileError> {
        let mut customers = self.list_customers().await?;
        match customers.iter_mut().find(|c| c.customer_id == customer.customer_id) {
            Some(existing) => *existing = customer,
            None => customers.push(customer),
        }
        self.store.save(CUSTOMERS_FILE, &customers).await.context("Writing credential store")
    }
}
