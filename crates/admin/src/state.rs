//! Application state shared across handlers.

use std::sync::Arc;

use curator_core::Tab;
use tokio::sync::{Mutex, MutexGuard};

use crate::catalog::{CatalogBackend, CatalogClient, CatalogError};
use crate::config::AdminConfig;
use crate::prioritization::{SearchOverlay, Workspace, WorkspaceError};

/// Application state shared across all handlers.
///
/// Generic over the catalog backend so routes can be exercised against a
/// fake; the binary uses [`CatalogClient`].
pub struct AppState<B = CatalogClient> {
    inner: Arc<AppStateInner<B>>,
}

struct AppStateInner<B> {
    workspace: Mutex<Workspace<B>>,
    search: SearchOverlay<B>,
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl AppState<CatalogClient> {
    /// Build state for the configured catalog backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &AdminConfig) -> Result<Self, CatalogError> {
        let client = CatalogClient::from_config(&config.catalog)?;
        Ok(Self::new(Arc::new(client), config.search.debounce))
    }
}

impl<B: CatalogBackend> AppState<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, debounce: std::time::Duration) -> Self {
        let workspace = Workspace::new(backend, Tab::default(), debounce);
        let search = workspace.search().clone();
        Self {
            inner: Arc::new(AppStateInner {
                workspace: Mutex::new(workspace),
                search,
            }),
        }
    }

    /// Claim the workspace for a mutating operation.
    ///
    /// # Errors
    ///
    /// Returns `Busy` if another operation (a save, a reset) holds it.
    pub fn claim(&self) -> Result<MutexGuard<'_, Workspace<B>>, WorkspaceError> {
        self.inner
            .workspace
            .try_lock()
            .map_err(|_| WorkspaceError::Busy)
    }

    /// Wait for the workspace, for read-only access.
    pub async fn workspace(&self) -> MutexGuard<'_, Workspace<B>> {
        self.inner.workspace.lock().await
    }

    /// The search overlay, usable without the workspace lock.
    #[must_use]
    pub fn search(&self) -> &SearchOverlay<B> {
        &self.inner.search
    }
}
