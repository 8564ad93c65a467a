//! Client for the sports centre booking API.
//!
//! Every call is a form `POST` to `{base_url}?module=..&method=..`. The service
//! answers `200 OK` even when it refuses a request and reports the refusal in a
//! top-level `"error"` property, so responses are inspected before decoding:
//!
//! * [`UpstreamError::Transport`]: connect failure, timeout or non-2xx status.
//! * [`UpstreamError::Rejected`]: the service refused (full, expired session, ...).
//! * [`UpstreamError::Decode`]: the body is not what the call expects.
//!
//! ```rust,ignore
//! use zb_upstream::RscClient;
//!
//! let client = RscClient::new(&config.upstream)?;
//! let customer = client.log_in("s1234567", "hunter2").await?;
//! for slot in client.locations(&customer).await? {
//!     tracing::info!(id = %slot.id, name = %slot.name, "open slot");
//! }
//! ```

mod client;
mod error;

pub use client::RscClient;
pub use error::{UpstreamError, UpstreamErrorExt};
