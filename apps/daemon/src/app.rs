use crate::cli::{Cli, Command};
use crate::commands;
use crate::shutdown::shutdown_signal;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use std::io::Write;
use std::sync::Arc;
use tracing::info;
use zb_domain::config::DaemonConfig;
use zb_kernel::clock::{SystemClock, Zone};
use zb_kernel::config::{load_config, validate};
use zb_logger::{LevelFilter, Logger};
use zb_reconciler::{FileCredentialStore, FileTaskStore, ReconciliationLoop, Reconciler, Resolver};
use zb_store::Store;
use zb_upstream::RscClient;

/// Reads the config layers, applies command-line overrides and validates the result.
pub fn load(cli: &Cli) -> Result<DaemonConfig> {
    let mut config: DaemonConfig = load_config(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir.clone_from(dir);
    }
    validate(&config)?;
    Ok(config)
}

/// Console logging always; rolling files only for the daemon, so one-shot
/// commands do not interleave with its log.
pub fn init_logger(config: &DaemonConfig, daemon: bool) -> Result<Logger> {
    let level: LevelFilter = config
        .log
        .level
        .parse()
        .with_context(|| format!("Invalid log.level '{}'", config.log.level))?;
    let directory = if daemon { config.log.dir.clone() } else { None };

    let logger = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(level)
        .maybe_directory(directory)
        .json(config.log.json)
        .init()?;
    Ok(logger)
}

/// Opened data directory plus the settings every command needs.
#[derive(Debug)]
pub struct App {
    config: DaemonConfig,
    zone: Zone,
    tasks: Arc<FileTaskStore>,
    customers: Arc<FileCredentialStore>,
}

impl App {
    /// # Errors
    /// The time zone does not parse or the data directory cannot be opened.
    pub async fn open(config: DaemonConfig) -> Result<Self> {
        let zone: Zone = config.clock.timezone.parse().context("Invalid clock.timezone")?;
        let store = Store::builder()
            .root(config.storage.data_dir.clone())
            .connect()
            .await
            .context("Failed to open data directory")?;

        Ok(Self {
            config,
            zone,
            tasks: Arc::new(FileTaskStore::new(store.clone())),
            customers: Arc::new(FileCredentialStore::new(store)),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &DaemonConfig {
        &self.config
    }

    #[must_use]
    pub const fn zone(&self) -> Zone {
        self.zone
    }

    fn client(&self) -> Result<RscClient> {
        RscClient::new(&self.config.upstream).context("Failed to build upstream client")
    }

    /// Reconciles until SIGINT or SIGTERM. A cycle in progress is allowed to
    /// finish and persist first.
    pub async fn run(self) -> Result<()> {
        let client = self.client()?;
        info!(
            upstream = client.base_url(),
            data_dir = %self.config.storage.data_dir.display(),
            min_secs = self.config.schedule.min_interval_secs,
            max_secs = self.config.schedule.max_interval_secs,
            "Starting reconciliation daemon"
        );

        let reconciler = Reconciler::new(
            self.tasks,
            self.customers,
            Arc::new(client),
            Resolver::new(self.zone),
            Arc::new(SystemClock),
        );
        let cycles = ReconciliationLoop::from_config(reconciler, &self.config.schedule)
            .run_until(shutdown_signal())
            .await;

        info!(cycles, "Daemon stopped");
        Ok(())
    }

    /// Runs a one-shot command, writing its human-readable result to `out`.
    pub async fn execute(&self, command: Command, out: &mut impl Write) -> Result<()> {
        match command {
            Command::Run => bail!("`run` is handled by App::run"),
            Command::Login { username, password } => {
                commands::login(&self.client()?, self.customers.as_ref(), &username, &password, out)
                    .await
            },
            Command::Customers => commands::customers(self.customers.as_ref(), out).await,
            Command::Enqueue { customer, target } => {
                let task = commands::build_task(&customer, target, self.zone, Utc::now())?;
                commands::enqueue(self.tasks.as_ref(), self.customers.as_ref(), task, out).await
            },
            Command::Queue => commands::queue(self.tasks.as_ref(), out).await,
            Command::Available { customer, kind } => {
                commands::available(
                    &self.client()?,
                    self.customers.as_ref(),
                    &customer,
                    kind.into(),
                    self.zone,
                    out,
                )
                .await
            },
            Command::Book { customer, queue_if_full, target } => {
                let now = Utc::now();
                let task = commands::build_task(&customer, target, self.zone, now)?;
                commands::book(
                    Arc::new(self.client()?),
                    self.tasks.as_ref(),
                    self.customers.as_ref(),
                    task,
                    queue_if_full,
                    self.zone,
                    now,
                    out,
                )
                .await
            },
            Command::Calendar { customer } => {
                commands::calendar(&self.client()?, self.customers.as_ref(), &customer, self.zone, out)
                    .await
            },
        }
    }
}
