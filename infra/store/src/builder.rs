use crate::engine::{Store, StoreInner};
use crate::error::{StoreError, StoreErrorExt};
use private::Sealed;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug)]
pub struct StoreBuilder<S: Sealed = NoRoot> {
    state: S,
    create: bool,
}

impl Default for StoreBuilder<NoRoot> {
    fn default() -> Self {
        Self { state: NoRoot, create: true }
    }
}

#[allow(private_bounds)]
impl<S: Sealed> StoreBuilder<S> {
    /// Create the root directory on connect when it does not exist yet.
    #[must_use]
    pub const fn create(mut self, enable: bool) -> Self {
        self.create = enable;
        self
    }
}

impl StoreBuilder<NoRoot> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(self, path: impl Into<PathBuf>) -> StoreBuilder<WithRoot> {
        StoreBuilder { state: WithRoot(path.into()), create: self.create }
    }
}

impl StoreBuilder<WithRoot> {
    /// Bootstraps the root, canonicalizes it and purges orphaned temp files.
    ///
    /// Cleanup is best effort; failures are logged and do not fail the connect.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] when the root is missing and `create(false)` was set, or
    /// when it cannot be created or resolved.
    pub async fn connect(self) -> Result<Store, StoreError> {
        let root = &self.state.0;

        if self.create {
            fs::create_dir_all(root)
                .await
                .context(format!("Failed to bootstrap store root: {}", root.display()))?;
            info!(path = %root.display(), "Store root ready");
        }

        let canonical = fs::canonicalize(root)
            .await
            .context(format!("Failed to resolve store root: {}", root.display()))?;

        let store = Store {
            inner: Arc::new(StoreInner { root: canonical, tmp_counter: AtomicU64::new(1) }),
        };

        store.purge_tmp().await;

        Ok(store)
    }
}
