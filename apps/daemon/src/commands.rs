//! One-shot commands. Each takes its collaborators explicitly and writes plain
//! lines to `out`.

use crate::cli::{LocationArgs, Target};
use anyhow::{Context, Result, bail, ensure};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::io::Write;
use std::sync::Arc;
use tracing::info;
use zb_domain::{AvailabilityEntry, Customer, RegistrationTask, TaskKind};
use zb_kernel::clock::Zone;
use zb_reconciler::{
    BookingApi, CredentialStore, Registrar, Resolution, Resolver, Snapshot, TaskStore,
};
use zb_upstream::RscClient;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Turns command-line arguments into a queueable task.
///
/// Time windows must name a real, future instant in `zone`.
pub fn build_task(
    customer: &str,
    target: Target,
    zone: Zone,
    now: DateTime<Utc>,
) -> Result<RegistrationTask> {
    ensure!(!customer.trim().is_empty(), "Customer id cannot be empty");

    match target {
        Target::Location(LocationArgs { slot: Some(slot), .. }) => {
            Ok(RegistrationTask::location_slot(customer, non_empty(&slot, "slot")?))
        },
        Target::Location(LocationArgs {
            date: Some(date), time: Some(time), facility: Some(facility), ..
        }) => {
            let day = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
                .with_context(|| format!("Invalid date '{date}', expected YYYY-MM-DD"))?;
            let clock = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT)
                .with_context(|| format!("Invalid time '{time}', expected HH:MM"))?;
            let facility = non_empty(&facility, "facility")?;

            let starts = zone
                .localize(day.and_time(clock))
                .with_context(|| format!("{date} {time} does not exist in the configured time zone"))?;
            if starts < now {
                bail!("{date} {time} has already passed");
            }
            Ok(RegistrationTask::location_window(customer, day, clock, facility))
        },
        Target::Location(_) => bail!("A location needs --slot, or --date with --time and --facility"),
        Target::Class { offering } => {
            Ok(RegistrationTask::class(customer, non_empty(&offering, "offering")?))
        },
        Target::Ticket { offering } => {
            Ok(RegistrationTask::ticket(customer, non_empty(&offering, "offering")?))
        },
    }
}

fn non_empty(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    ensure!(!trimmed.is_empty(), "{what} cannot be empty");
    Ok(trimmed.to_owned())
}

/// Appends `task` after checking its customer has a stored session.
pub async fn enqueue(
    tasks: &dyn TaskStore,
    customers: &dyn CredentialStore,
    task: RegistrationTask,
    out: &mut impl Write,
) -> Result<()> {
    known_customer(customers, task.customer_id()).await?;

    let customer = task.customer_id().to_owned();
    let label = task.to_string();
    tasks.append(task).await?;

    info!(customer = %customer, task = %label, "Task queued");
    writeln!(out, "Queued {label} for {customer}")?;
    Ok(())
}

async fn known_customer(customers: &dyn CredentialStore, customer_id: &str) -> Result<Customer> {
    match customers.find_customer(customer_id).await? {
        Some(customer) => Ok(customer),
        None => bail!("Unknown customer '{customer_id}', run `zwembot login` first"),
    }
}

/// Registers `task` right away against a fresh snapshot.
///
/// A refused or not yet open registration is appended to the queue when
/// `queue_if_full` is set and otherwise only reported. Expired or unmatched
/// tasks are errors.
pub async fn book(
    api: Arc<dyn BookingApi>,
    tasks: &dyn TaskStore,
    customers: &dyn CredentialStore,
    task: RegistrationTask,
    queue_if_full: bool,
    zone: Zone,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> Result<()> {
    let customer = known_customer(customers, task.customer_id()).await?;
    let kind = task.kind();
    let entries = api
        .fetch_entries(&customer, kind)
        .await
        .with_context(|| format!("Failed to fetch {kind} availability"))?;
    let snapshot = Snapshot::new(kind, entries);

    match Resolver::new(zone).resolve(&task, &snapshot, now) {
        Resolution::Resolved(entry) => {
            let booked = Registrar::new(api)
                .attempt(&customer, entry)
                .await
                .with_context(|| format!("Failed to book {task}"))?;
            if booked {
                info!(customer = %customer.customer_id, entry = %entry.id(), "Booked");
                writeln!(
                    out,
                    "Booked {task} for {} ({}, {})",
                    customer.customer_id,
                    entry.tag(),
                    local(zone, entry.start(), STAMP_FORMAT)
                )?;
                return Ok(());
            }
            hold(tasks, task, queue_if_full, "is full", out).await
        },
        Resolution::NotYetAvailable => hold(tasks, task, queue_if_full, "is not open yet", out).await,
        Resolution::Expired => bail!("{task} has passed or is no longer offered"),
        Resolution::NotFound => bail!("{task} matches nothing on offer"),
    }
}

async fn hold(
    tasks: &dyn TaskStore,
    task: RegistrationTask,
    queue_if_full: bool,
    why: &str,
    out: &mut impl Write,
) -> Result<()> {
    if !queue_if_full {
        writeln!(out, "{task} {why}, not queued (use --queue-if-full to keep trying)")?;
        return Ok(());
    }

    let customer = task.customer_id().to_owned();
    let label = task.to_string();
    tasks.append(task).await?;

    info!(customer = %customer, task = %label, "Task queued");
    writeln!(out, "{label} {why}, queued for {customer}")?;
    Ok(())
}

/// Lists the live entries of one kind, earliest first, with enrolment counts.
pub async fn available(
    api: &dyn BookingApi,
    customers: &dyn CredentialStore,
    customer_id: &str,
    kind: TaskKind,
    zone: Zone,
    out: &mut impl Write,
) -> Result<()> {
    let customer = known_customer(customers, customer_id).await?;
    let mut entries = api
        .fetch_entries(&customer, kind)
        .await
        .with_context(|| format!("Failed to fetch {kind} availability"))?;
    if entries.is_empty() {
        writeln!(out, "Nothing open")?;
        return Ok(());
    }
    entries.sort_by_key(AvailabilityEntry::start);

    for entry in &entries {
        let start = local(zone, entry.start(), STAMP_FORMAT);
        let end = local(zone, entry.end(), TIME_FORMAT);
        let (enrolled, max) = (entry.enrolled(), entry.max_enrolled());
        let full = if max > 0 && enrolled >= max { "  full" } else { "" };
        writeln!(out, "{:<10}  {start}-{end}  {}  {enrolled}/{max}{full}", entry.id(), entry.tag())?;
    }
    Ok(())
}

pub async fn queue(tasks: &dyn TaskStore, out: &mut impl Write) -> Result<()> {
    let queue = tasks.get().await?;
    if queue.is_empty() {
        writeln!(out, "Queue is empty")?;
        return Ok(());
    }
    for (position, task) in queue.iter().enumerate() {
        writeln!(out, "{:>3}  {:<10}  {task}", position + 1, task.customer_id())?;
    }
    Ok(())
}

pub async fn customers(customers: &dyn CredentialStore, out: &mut impl Write) -> Result<()> {
    let known = customers.list_customers().await?;
    if known.is_empty() {
        writeln!(out, "No customers, run `zwembot login` first")?;
        return Ok(());
    }
    for customer in &known {
        writeln!(out, "{:<10}  {}{}", customer.customer_id, customer.display_name(), flags(customer))?;
    }
    Ok(())
}

fn flags(customer: &Customer) -> String {
    let mut flags = String::new();
    if customer.warning {
        flags.push_str(" [warning]");
    }
    if customer.fine {
        flags.push_str(" [fine]");
    }
    flags
}

/// Logs in upstream and stores (or refreshes) the session.
pub async fn login(
    client: &RscClient,
    customers: &dyn CredentialStore,
    username: &str,
    password: &str,
    out: &mut impl Write,
) -> Result<()> {
    let customer = client.log_in(username, password).await.context("Login failed")?;
    writeln!(out, "Logged in as {} ({})", customer.display_name(), customer.customer_id)?;
    info!(customer = %customer.customer_id, "Session stored");
    customers.store_customer(customer).await?;
    Ok(())
}

/// Prints the customer's current bookings in facility time, earliest first.
pub async fn calendar(
    client: &RscClient,
    customers: &dyn CredentialStore,
    customer_id: &str,
    zone: Zone,
    out: &mut impl Write,
) -> Result<()> {
    let customer = known_customer(customers, customer_id).await?;

    let mut items = client.calendar(&customer).await.context("Failed to fetch calendar")?;
    if items.is_empty() {
        writeln!(out, "No bookings")?;
        return Ok(());
    }
    items.sort_by_key(|item| item.start);

    for item in &items {
        let start = local(zone, item.start, STAMP_FORMAT);
        let end = local(zone, item.end, TIME_FORMAT);
        let place = if item.location.is_empty() { String::new() } else { format!(" @ {}", item.location) };
        writeln!(out, "{start}-{end}  {}{place}", item.name)?;
    }
    Ok(())
}

fn local(zone: Zone, epoch: i64, format: &str) -> String {
    zone.to_local(epoch).map_or_else(|| epoch.to_string(), |at| at.format(format).to_string())
}
