use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use zb_domain::TaskKind;

/// Keeps pending sports-centre registrations and books them the moment they open.
#[derive(Debug, Parser)]
#[command(name = "zwembot", version, about)]
pub struct Cli {
    /// Config file (TOML, JSON or YAML). Defaults to `./zwembot.*` when present.
    #[arg(long, short, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Overrides `storage.data_dir`.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// No subcommand means daemon mode.
    #[must_use]
    pub const fn is_daemon(&self) -> bool {
        matches!(self.command, None | Some(Command::Run))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Poll and register until SIGINT or SIGTERM.
    #[default]
    Run,

    /// Log in and keep the session for later registrations.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "ZWEMBOT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// List stored customers.
    Customers,

    /// Queue a registration for the daemon to pick up.
    Enqueue {
        #[arg(long)]
        customer: String,
        #[command(subcommand)]
        target: Target,
    },

    /// Show pending registrations.
    Queue,

    /// List what is on offer right now, with enrolment counts.
    Available {
        #[arg(long)]
        customer: String,
        #[arg(value_enum)]
        kind: Kind,
    },

    /// Register immediately against the live offer.
    Book {
        #[arg(long)]
        customer: String,
        /// Queue the registration when it is full or not open yet.
        #[arg(long)]
        queue_if_full: bool,
        #[command(subcommand)]
        target: Target,
    },

    /// Show the bookings a customer already holds.
    Calendar {
        #[arg(long)]
        customer: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Location,
    Class,
    Ticket,
}

impl From<Kind> for TaskKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Location => Self::Location,
            Kind::Class => Self::Class,
            Kind::Ticket => Self::Ticket,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Target {
    /// A free-swim slot, by id or by date, time and facility.
    Location(LocationArgs),
    Class {
        #[arg(long)]
        offering: String,
    },
    Ticket {
        #[arg(long)]
        offering: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
#[command(group(ArgGroup::new("selector").required(true).args(["slot", "date"])))]
pub struct LocationArgs {
    #[arg(long, conflicts_with_all = ["date", "time", "facility"])]
    pub slot: Option<String>,

    /// `YYYY-MM-DD`
    #[arg(long, requires_all = ["time", "facility"])]
    pub date: Option<String>,

    /// `HH:MM`, facility local time.
    #[arg(long, requires = "date")]
    pub time: Option<String>,

    /// Facility name as listed upstream, e.g. `Zwemmen`.
    #[arg(long, requires = "date")]
    pub facility: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("zwembot").chain(args.iter().copied()))
    }

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_runs_the_daemon() {
        let cli = parse(&[]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.is_daemon());
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli = parse(&["queue", "--data-dir", "/tmp/zb", "-c", "zwembot.toml"]).unwrap();
        assert_eq!(cli.command, Some(Command::Queue));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/zb")));
        assert_eq!(cli.config, Some(PathBuf::from("zwembot.toml")));
        assert!(!cli.is_daemon());
    }

    #[test]
    fn location_by_window() {
        let cli = parse(&[
            "enqueue", "--customer", "C1", "location", "--date", "2025-06-01", "--time", "08:00",
            "--facility", "Zwemmen",
        ])
        .unwrap();

        let Some(Command::Enqueue { customer, target: Target::Location(args) }) = cli.command
        else {
            panic!("unexpected parse: {:?}", cli.command);
        };
        assert_eq!(customer, "C1");
        assert_eq!(args.date.as_deref(), Some("2025-06-01"));
        assert_eq!(args.facility.as_deref(), Some("Zwemmen"));
        assert!(args.slot.is_none());
    }

    #[test]
    fn location_needs_exactly_one_selector() {
        assert!(parse(&["enqueue", "--customer", "C1", "location"]).is_err());
        assert!(
            parse(&["enqueue", "--customer", "C1", "location", "--slot", "P1", "--date", "2025-06-01"])
                .is_err()
        );
        assert!(parse(&["enqueue", "--customer", "C1", "location", "--date", "2025-06-01"]).is_err());
    }

    #[test]
    fn class_and_ticket_take_an_offering() {
        let cli = parse(&["enqueue", "--customer", "C1", "class", "--offering", "991"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Enqueue {
                customer: "C1".into(),
                target: Target::Class { offering: "991".into() },
            })
        );
        assert!(parse(&["enqueue", "--customer", "C1", "ticket"]).is_err());
    }

    #[test]
    fn available_takes_a_kind() {
        let cli = parse(&["available", "--customer", "C1", "ticket"]).unwrap();
        let Some(Command::Available { customer, kind }) = cli.command else {
            panic!("unexpected parse: {:?}", cli.command);
        };
        assert_eq!(customer, "C1");
        assert_eq!(TaskKind::from(kind), TaskKind::Ticket);
        assert!(parse(&["available", "--customer", "C1", "sauna"]).is_err());
    }

    #[test]
    fn book_queues_only_when_asked() {
        let cli = parse(&["book", "--customer", "C1", "location", "--slot", "P1"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Book {
                customer: "C1".into(),
                queue_if_full: false,
                target: Target::Location(LocationArgs {
                    slot: Some("P1".into()),
                    date: None,
                    time: None,
                    facility: None,
                }),
            })
        );

        let cli =
            parse(&["book", "--customer", "C1", "--queue-if-full", "class", "--offering", "991"])
                .unwrap();
        assert!(matches!(cli.command, Some(Command::Book { queue_if_full: true, .. })));
    }
}
