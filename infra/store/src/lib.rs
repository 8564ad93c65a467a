//! Sandboxed snapshot storage for the daemon's state files.
//!
//! Every file lives under one root directory and is replaced as a whole:
//! writes go to a unique temp file that is synced and then renamed over the
//! target, so readers only ever observe the previous or the next snapshot.
//!
//! - **Sandbox**: relative paths only, `..` may not climb above the root and
//!   symlinked parents must resolve inside it.
//! - **Atomic replace**: unique temp write, `fsync`, `rename`, parent `fsync`.
//! - **Self-healing**: temp files orphaned by a crashed writer are removed on
//!   [`StoreBuilder::connect`].
//! - **JSON documents**: [`Store::load`] / [`Store::save`] for serde types, with a
//!   missing file reading as the type's default.
//!
//! ```rust
//! use zb_store::{Store, StoreError};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), StoreError> {
//! # let tmp = tempfile::tempdir().unwrap();
//! let store = Store::builder().root(tmp.path().join("data")).create(true).connect().await?;
//!
//! let empty: Vec<String> = store.load("queue.json").await?;
//! assert!(empty.is_empty());
//!
//! store.save("queue.json", &vec!["P42".to_owned()]).await?;
//! let queue: Vec<String> = store.load("queue.json").await?;
//! assert_eq!(queue, ["P42"]);
//! # Ok(())
//! # }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod security;

pub use builder::StoreBuilder;
pub use engine::Store;
pub use error::{StoreError, StoreErrorExt};
