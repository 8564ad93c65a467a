//! # Zwembot
//!
//! The `zwembot` binary: a daemon that keeps a queue of wanted sports-centre
//! registrations and books each one once it opens, plus the small commands
//! that feed that queue (`login`, `enqueue`, `book`) or inspect it and the live
//! offer (`queue`, `customers`, `calendar`, `available`).
//!
//! ```no_run
//! use zwembot::{App, Cli};
//! use clap::Parser;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cli = Cli::parse();
//! let config = zwembot::load(&cli)?;
//! App::open(config).await?.run().await
//! # }
//! ```

mod app;
mod cli;
pub mod commands;
mod shutdown;

pub use app::{App, init_logger, load};
pub use cli::{Cli, Command, Kind, LocationArgs, Target};
