//! Kernel utilities shared across slices.
//! Keep this crate lightweight: layered config loading plus the clock and
//! time-zone helpers the reconciler is tested against.
//!
//! ## Config loading
//! ```rust,ignore
//! use zb_kernel::config::load_config;
//! use zb_kernel::domain::config::DaemonConfig;
//!
//! let cfg: DaemonConfig = load_config(Some("zwembot.toml"))?;
//! ```
//!
//! ## Time zones
//! ```rust
//! use chrono::NaiveDate;
//! use zb_kernel::clock::Zone;
//!
//! let zone: Zone = "+02:00".parse().unwrap();
//! let at = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
//! assert_eq!(zone.localize(at).unwrap().timestamp(), 1_748_757_600);
//! ```
pub mod clock;
pub mod config;

pub use zb_domain as domain;
