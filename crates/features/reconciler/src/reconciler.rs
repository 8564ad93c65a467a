//! One cycle: fetch, resolve, register, classify, persist.

use crate::decision::{CycleReport, Decision, KeepReason, RemoveReason};
use crate::error::ReconcileError;
use crate::registrar::Registrar;
use crate::resolver::{Resolution, Resolver};
use crate::source::{BookingApi, Snapshot};
use crate::store::{CredentialStore, TaskStore};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use fxhash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use zb_domain::{Customer, KindSet, RegistrationTask, TaskKind};
use zb_kernel::clock::Clock;

/// Snapshots of this cycle; `None` marks a kind whose fetch failed.
type Snapshots = FxHashMap<TaskKind, Option<Snapshot>>;

pub struct Reconciler {
    tasks: Arc<dyn TaskStore>,
    customers: Arc<dyn CredentialStore>,
    api: Arc<dyn BookingApi>,
    registrar: Registrar,
    resolver: Resolver,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("resolver", &self.resolver)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        customers: Arc<dyn CredentialStore>,
        api: Arc<dyn BookingApi>,
        resolver: Resolver,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let registrar = Registrar::new(Arc::clone(&api));
        Self { tasks, customers, api, registrar, resolver, clock }
    }

    /// Runs one full cycle.
    ///
    /// Per-task faults are classified and never returned. An empty queue costs
    /// no upstream calls and no write.
    ///
    /// # Errors
    /// Reading the queue or the credentials, or writing the new queue, failed.
    /// The persisted queue is then left as it was.
    pub async fn run_cycle(&self) -> Result<CycleReport, ReconcileError> {
        let queue = self.tasks.get().await?;
        let mut report = CycleReport { tasks: queue.len(), ..CycleReport::default() };

        if queue.is_empty() {
            info!("Queue is empty, waiting");
            return Ok(report);
        }

        let known = self.customers.list_customers().await?;
        let customers: FxHashMap<&str, &Customer> =
            known.iter().map(|c| (c.customer_id.as_str(), c)).collect();

        let snapshots = self.fetch_snapshots(&queue, &customers).await;
        report.snapshots = snapshots.values().filter(|s| s.is_some()).count();

        let now = self.clock.now();
        let decisions = join_all(
            queue.iter().map(|task| self.process(task, &customers, &snapshots, now)),
        )
        .await;

        let mut survivors = Vec::with_capacity(queue.len());
        for (task, decision) in queue.into_iter().zip(decisions) {
            report.record(decision);
            if decision.keeps() {
                survivors.push(task);
            }
        }

        self.tasks.save(&survivors).await?;
        Ok(report)
    }

    /// One fetch per kind in the queue, each with the credentials of the first
    /// task of that kind whose customer is known.
    async fn fetch_snapshots(
        &self,
        queue: &[RegistrationTask],
        customers: &FxHashMap<&str, &Customer>,
    ) -> Snapshots {
        let needed: KindSet = queue.iter().map(RegistrationTask::kind).collect();
        let requests = needed.kinds().filter_map(|kind| {
            queue
                .iter()
                .filter(|task| task.kind() == kind)
                .find_map(|task| customers.get(task.customer_id()))
                .map(|customer| (kind, *customer))
        });

        let fetched = join_all(requests.map(|(kind, customer)| async move {
            match self.api.fetch_entries(customer, kind).await {
                Ok(entries) => {
                    debug!(%kind, entries = entries.len(), "Snapshot fetched");
                    (kind, Some(Snapshot::new(kind, entries)))
                },
                Err(err) => {
                    warn!(%kind, error = %err, "Snapshot fetch failed, keeping its tasks");
                    (kind, None)
                },
            }
        }))
        .await;

        fetched.into_iter().collect()
    }

    async fn process(
        &self,
        task: &RegistrationTask,
        customers: &FxHashMap<&str, &Customer>,
        snapshots: &Snapshots,
        now: DateTime<Utc>,
    ) -> Decision {
        let decision = self.decide(task, customers, snapshots, now).await;
        match decision {
            Decision::Remove(RemoveReason::Registered) => {
                info!(customer = %task.customer_id(), task = %task, "Registered");
            },
            Decision::Remove(_) => {
                info!(customer = %task.customer_id(), task = %task, outcome = %decision, "Task dropped");
            },
            Decision::Keep(_) => {
                debug!(customer = %task.customer_id(), task = %task, outcome = %decision, "Task kept");
            },
        }
        decision
    }

    async fn decide(
        &self,
        task: &RegistrationTask,
        customers: &FxHashMap<&str, &Customer>,
        snapshots: &Snapshots,
        now: DateTime<Utc>,
    ) -> Decision {
        let Some(customer) = customers.get(task.customer_id()) else {
            return Decision::Remove(RemoveReason::UnknownCustomer);
        };
        let Some(Some(snapshot)) = snapshots.get(&task.kind()) else {
            return Decision::Keep(KeepReason::Transient);
        };

        match self.resolver.resolve(task, snapshot, now) {
            Resolution::Resolved(entry) => match self.registrar.attempt(customer, entry).await {
                Ok(true) => Decision::Remove(RemoveReason::Registered),
                Ok(false) => Decision::Keep(KeepReason::CapacityRace),
                Err(err) => {
                    warn!(task = %task, error = %err, "Registration fault");
                    Decision::Keep(KeepReason::Transient)
                },
            },
            Resolution::NotYetAvailable => Decision::Keep(KeepReason::NotYetAvailable),
            Resolution::Expired => Decision::Remove(RemoveReason::Expired),
            Resolution::NotFound => Decision::Remove(RemoveReason::NotFound),
        }
    }
}
