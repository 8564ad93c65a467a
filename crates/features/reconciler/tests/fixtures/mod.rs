#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use zb_domain::{AvailabilityEntry, ClassOffering, Customer, LocationSlot, Queue, RegistrationTask, TaskKind};
use zb_reconciler::{BookingApi, CredentialStore, ReconcileError, TaskStore};
use zb_store::StoreError;
use zb_upstream::UpstreamError;

/// 2025-06-01 08:00:00 UTC
pub const EIGHT_AM: i64 = 1_748_764_800;

pub fn at(epoch: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(epoch, 0).unwrap()
}

pub fn customer(id: &str) -> Customer {
    Customer {
        customer_id: id.into(),
        token: format!("token-{id}"),
        first_name: "Test".into(),
        prefix: String::new(),
        last_name: id.into(),
        warning: false,
        fine: false,
    }
}

pub fn location(id: &str, name: &str, start: i64) -> AvailabilityEntry {
    AvailabilityEntry::Location(LocationSlot {
        id: id.into(),
        name: name.into(),
        registration_id: "11".into(),
        pool_id: "3".into(),
        offering_id: "7".into(),
        start,
        end: start + 3600,
        enrolled: 39,
        max_enrolled: 40,
    })
}

pub fn class(id: &str, start: i64) -> AvailabilityEntry {
    AvailabilityEntry::Class(ClassOffering {
        id: id.into(),
        name: "Yoga".into(),
        start,
        end: start + 3600,
        enrolled: 0,
        max_enrolled: 20,
    })
}

/// A non-rejection fault, standing in for a dropped connection.
pub fn fault() -> UpstreamError {
    let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    UpstreamError::Decode { source, context: Some("simulated fault".into()) }
}

pub fn rejection() -> UpstreamError {
    UpstreamError::Rejected { message: "Vol".into(), context: None }
}

#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    queue: Mutex<Queue>,
    saves: AtomicUsize,
    reads: AtomicUsize,
    broken_reads: Mutex<Vec<usize>>,
}

impl MemoryTaskStore {
    pub fn with(queue: Queue) -> Self {
        Self { queue: Mutex::new(queue), ..Self::default() }
    }

    /// The `nth` read (1-based) fails as if the queue file were unreadable.
    pub fn failing_read(self, nth: usize) -> Self {
        self.broken_reads.lock().unwrap().push(nth);
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Queue {
        self.queue.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn get(&self) -> Result<Queue, ReconcileError> {
        let nth = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if self.broken_reads.lock().unwrap().contains(&nth) {
            return Err(StoreError::from("queue unreadable").into());
        }
        Ok(self.snapshot())
    }

    async fn save(&self, queue: &[RegistrationTask]) -> Result<(), ReconcileError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.queue.lock().unwrap() = queue.to_vec();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryCredentials {
    customers: Mutex<Vec<Customer>>,
}

impl MemoryCredentials {
    pub fn with(ids: &[&str]) -> Self {
        Self { customers: Mutex::new(ids.iter().map(|id| customer(id)).collect()) }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentials {
    async fn list_customers(&self) -> Result<Vec<Customer>, ReconcileError> {
        Ok(self.customers.lock().unwrap().clone())
    }

    async fn store_customer(&self, customer: Customer) -> Result<(), ReconcileError> {
        self.customers.lock().unwrap().push(customer);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Confirm,
    Refuse,
    Fail,
}

/// Scripted booking service that records every call.
#[derive(Debug, Default)]
pub struct FakeApi {
    snapshots: Mutex<HashMap<TaskKind, Vec<AvailabilityEntry>>>,
    broken_kinds: Mutex<Vec<TaskKind>>,
    replies: Mutex<HashMap<String, Reply>>,
    pub fetches: Mutex<Vec<(TaskKind, String)>>,
    pub registrations: Mutex<Vec<(String, String)>>,
}

impl FakeApi {
    pub fn offering(self, kind: TaskKind, entries: Vec<AvailabilityEntry>) -> Self {
        self.snapshots.lock().unwrap().insert(kind, entries);
        self
    }

    pub fn failing_fetch(self, kind: TaskKind) -> Self {
        self.broken_kinds.lock().unwrap().push(kind);
        self
    }

    pub fn replying(self, entry_id: &str, reply: Reply) -> Self {
        self.replies.lock().unwrap().insert(entry_id.to_owned(), reply);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.lock().unwrap().len()
    }
}

#[async_trait]
impl BookingApi for FakeApi {
    async fn fetch_entries(
        &self,
        customer: &Customer,
        kind: TaskKind,
    ) -> Result<Vec<AvailabilityEntry>, UpstreamError> {
        self.fetches.lock().unwrap().push((kind, customer.customer_id.clone()));
        if self.broken_kinds.lock().unwrap().contains(&kind) {
            return Err(fault());
        }
        Ok(self.snapshots.lock().unwrap().get(&kind).cloned().unwrap_or_default())
    }

    async fn register(
        &self,
        customer: &Customer,
        entry: &AvailabilityEntry,
    ) -> Result<(), UpstreamError> {
        self.registrations
            .lock()
            .unwrap()
            .push((customer.customer_id.clone(), entry.id().to_owned()));
        match self.replies.lock().unwrap().get(entry.id()).copied().unwrap_or(Reply::Confirm) {
            Reply::Confirm => Ok(()),
            Reply::Refuse => Err(rejection()),
            Reply::Fail => Err(fault()),
        }
    }
}
