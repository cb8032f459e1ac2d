//! The product prioritization workspace.
//!
//! One operator curates the "top selling" and "latest" rails:
//!
//! - [`ProductListStore`] holds the working list for the active rail
//! - [`SearchOverlay`] finds candidates not yet in the list
//! - drag gestures go through [`DragSession`] and the `reorder` reducer
//! - [`SyncCoordinator`] writes the result back to the catalog
//! - [`ModalController`] reports every outcome to the operator
//!
//! [`Workspace`] owns all of them and is what the HTTP routes and the CLI
//! drive. Every backend failure becomes an error modal and is also returned
//! to the caller.

pub mod list_store;
pub mod modal;
pub mod search;
pub mod sync;

pub use list_store::ProductListStore;
pub use modal::{ConfirmAction, Modal, ModalController};
pub use search::{SearchFailure, SearchOverlay, SearchState};
pub use sync::{SyncCoordinator, SyncError, SyncPhase, SyncReport};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use curator_core::ranking::{DragSession, DropOutcome, ReorderError};
use curator_core::{Product, ProductId, RankBadge, SearchResult, Tab};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::catalog::{CatalogBackend, CatalogError};

/// Errors from workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Reorder(#[from] ReorderError),

    #[error("Product {0} is already in the list")]
    Duplicate(ProductId),

    #[error("Product {0} is not among the search results that can be added")]
    UnknownProduct(ProductId),

    #[error("No drag in progress")]
    NoDrag,

    #[error("Nothing to confirm")]
    NothingToConfirm,

    /// Another operation holds the workspace.
    #[error("Another operation is in progress")]
    Busy,
}

impl WorkspaceError {
    /// Whether the failure came from a missing or rejected token.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        match self {
            Self::Catalog(e) => e.is_auth(),
            Self::Sync(e) => e.source.is_auth(),
            _ => false,
        }
    }
}

/// A product as shown in the working list.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub badge: RankBadge,
}

/// Serializable view of the whole workspace.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceSnapshot {
    pub tab: Tab,
    pub exclude_other: bool,
    pub ranked_count: usize,
    pub products: Vec<ProductView>,
    pub dragging: bool,
    pub modal: Option<Modal>,
    pub sync_phase: SyncPhase,
    pub last_sync: Option<SyncReport>,
}

/// Search state for the active rail, results narrowed to addable candidates.
#[derive(Debug, Clone, Serialize)]
pub struct SearchView {
    pub query: String,
    pub pending: bool,
    pub error: Option<String>,
    pub results: Vec<SearchResult>,
}

/// Single-operator prioritization session.
pub struct Workspace<B> {
    backend: Arc<B>,
    store: ProductListStore,
    search: SearchOverlay<B>,
    drag: Option<DragSession>,
    sync: SyncCoordinator,
    modal: ModalController,
}

impl<B: CatalogBackend> Workspace<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, tab: Tab, debounce: Duration) -> Self {
        let search = SearchOverlay::new(Arc::clone(&backend), debounce);
        Self {
            backend,
            store: ProductListStore::new(tab),
            search,
            drag: None,
            sync: SyncCoordinator::default(),
            modal: ModalController::default(),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ProductListStore {
        &self.store
    }

    /// The search overlay. Clones share state with the workspace.
    #[must_use]
    pub const fn search(&self) -> &SearchOverlay<B> {
        &self.search
    }

    #[must_use]
    pub const fn modal(&self) -> Option<&Modal> {
        self.modal.current()
    }

    #[must_use]
    pub const fn sync(&self) -> &SyncCoordinator {
        &self.sync
    }

    #[must_use]
    pub fn snapshot(&self) -> WorkspaceSnapshot {
        let tab = self.store.tab();
        WorkspaceSnapshot {
            tab,
            exclude_other: self.store.exclude_other(),
            ranked_count: self.store.ranked_count(),
            products: self
                .store
                .products()
                .iter()
                .map(|product| ProductView {
                    badge: product.badge(tab),
                    product: product.clone(),
                })
                .collect(),
            dragging: self.drag.is_some(),
            modal: self.modal.current().cloned(),
            sync_phase: self.sync.phase(),
            last_sync: self.sync.last_report().cloned(),
        }
    }

    /// Switch rails and load the new one.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, already shown as a modal.
    pub async fn switch_tab(&mut self, tab: Tab) -> Result<(), WorkspaceError> {
        self.drag = None;
        self.store.set_tab(tab);
        self.fetch_products().await
    }

    /// Reload the working list from the backend.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, already shown as a modal. The list is empty.
    #[instrument(skip(self), fields(tab = %self.store.tab()))]
    pub async fn fetch_products(&mut self) -> Result<(), WorkspaceError> {
        self.drag = None;
        if let Err(e) = self.store.fetch(self.backend.as_ref()).await {
            return Err(self.surface("Failed to fetch products", e.into()));
        }
        Ok(())
    }

    pub fn set_exclude_other(&mut self, enabled: bool) {
        self.drag = None;
        self.store.set_exclude_other(enabled);
    }

    /// Committed search results that can still be added to the active rail.
    ///
    /// A search that failed since the last call is shown as a modal.
    pub async fn search_candidates(&mut self) -> Vec<SearchResult> {
        if let Some(failure) = self.search.take_failure().await {
            self.show_failure(failure.auth, "Failed to search products", &failure.message);
        }
        let in_list: HashSet<ProductId> =
            self.store.products().iter().map(|p| p.id.clone()).collect();
        self.search
            .candidates(self.store.tab(), self.store.exclude_other(), &in_list)
            .await
    }

    /// The search overlay as the operator sees it.
    pub async fn search_view(&mut self) -> SearchView {
        let results = self.search_candidates().await;
        let state = self.search.state().await;
        SearchView {
            query: state.query,
            pending: state.pending,
            error: state.error,
            results,
        }
    }

    /// Move a product within the working list without a drag gesture.
    ///
    /// # Errors
    ///
    /// Returns `Reorder` if either index is out of range.
    pub fn move_product(&mut self, from: usize, to: usize) -> Result<(), WorkspaceError> {
        self.store.move_product(from, to)?;
        Ok(())
    }

    /// Start dragging the product at `index` of the working list.
    ///
    /// # Errors
    ///
    /// Returns `Reorder` if `index` is out of range.
    pub fn begin_drag_product(&mut self, index: usize) -> Result<(), WorkspaceError> {
        let len = self.store.products().len();
        if index >= len {
            return Err(ReorderError { index, len }.into());
        }
        self.drag = Some(DragSession::product(index));
        Ok(())
    }

    /// Start dragging a search candidate.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the product is already listed, `UnknownProduct`
    /// if it is not a candidate.
    pub async fn begin_drag_search(&mut self, id: &ProductId) -> Result<(), WorkspaceError> {
        let result = self.candidate(id).await?;
        self.drag = Some(DragSession::search_result(result));
        Ok(())
    }

    /// Hover the current drag over slot `index`. Returns whether the list
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns `NoDrag` without an active drag, `Reorder` if `index` is out of
    /// range.
    pub fn hover(&mut self, index: usize) -> Result<bool, WorkspaceError> {
        let drag = self.drag.as_mut().ok_or(WorkspaceError::NoDrag)?;
        Ok(self.store.hover(drag, index)?)
    }

    /// Finish the current drag over slot `index`.
    ///
    /// A dropped search result is appended through the add path whatever
    /// the slot.
    ///
    /// # Errors
    ///
    /// Returns `NoDrag` without an active drag, otherwise the error of the
    /// move or add.
    pub async fn drop_on(&mut self, index: usize) -> Result<(), WorkspaceError> {
        let drag = self.drag.take().ok_or(WorkspaceError::NoDrag)?;
        match drag.drop_on(index) {
            DropOutcome::Noop => Ok(()),
            DropOutcome::Move { from, to } => self.move_product(from, to),
            DropOutcome::Add(result) => self.add_search_result(result).await,
        }
    }

    /// Persist the working list as the order of the active rail, then reload.
    ///
    /// # Errors
    ///
    /// Returns the sync error, already shown as a modal. Writes sent before
    /// the failure stay applied; saving again converges.
    #[instrument(
        skip(self),
        fields(tab = %self.store.tab(), products = self.store.products().len())
    )]
    pub async fn save(&mut self) -> Result<SyncReport, WorkspaceError> {
        self.drag = None;
        let tab = self.store.tab();
        let ordered = self.store.products().to_vec();

        let report = match self.sync.save(self.backend.as_ref(), tab, &ordered).await {
            Ok(report) => report,
            Err(e) => return Err(self.surface("Failed to save product order", e.into())),
        };

        self.modal
            .show(Modal::success("Success", "Product order saved successfully."));
        if self.fetch_products().await.is_ok() {
            self.warn_on_drift(&report);
        }
        Ok(report)
    }

    /// Add a search candidate to the end of the active rail.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` (shown as a warning, nothing sent) if the product
    /// is already listed, `UnknownProduct` if it is not a candidate, otherwise
    /// the write error.
    pub async fn add_product_from_search(&mut self, id: &ProductId) -> Result<(), WorkspaceError> {
        let result = self.candidate(id).await?;
        self.add_search_result(result).await
    }

    /// Resolve `id` among the search candidates. Results hidden by the
    /// "exclude other rail" filter are not candidates.
    async fn candidate(&mut self, id: &ProductId) -> Result<SearchResult, WorkspaceError> {
        if self.store.contains(id) {
            return Err(self.warn_duplicate(id));
        }
        self.search_candidates()
            .await
            .into_iter()
            .find(|result| &result.id == id)
            .ok_or_else(|| WorkspaceError::UnknownProduct(id.clone()))
    }

    #[instrument(skip(self, result), fields(tab = %self.store.tab(), product_id = %result.id))]
    async fn add_search_result(&mut self, result: SearchResult) -> Result<(), WorkspaceError> {
        if self.store.contains(&result.id) {
            return Err(self.warn_duplicate(&result.id));
        }
        let tab = self.store.tab();
        let ranked_count = self.store.ranked_count();

        let slot = match self
            .sync
            .add(self.backend.as_ref(), tab, &result.id, ranked_count)
            .await
        {
            Ok(slot) => slot,
            Err(e) => return Err(self.surface("Failed to add product", e.into())),
        };

        self.store.push(Product::from(result).with_slot(tab, slot));
        self.resync_quietly().await;
        Ok(())
    }

    /// Follow-up to an add: persist the whole list and reload, logging
    /// failures instead of showing them.
    async fn resync_quietly(&mut self) {
        let tab = self.store.tab();
        let ordered = self.store.products().to_vec();
        if let Err(e) = self.sync.save(self.backend.as_ref(), tab, &ordered).await {
            tracing::warn!(error = %e, "Follow-up sync after add failed");
        }
        if let Err(e) = self.store.fetch(self.backend.as_ref()).await {
            tracing::warn!(error = %e, "Reload after add failed");
        }
    }

    /// Clear one product's slot on the active rail, then reload.
    ///
    /// # Errors
    ///
    /// Returns the write error, already shown as a modal.
    pub async fn remove_product(&mut self, id: &ProductId) -> Result<(), WorkspaceError> {
        self.drag = None;
        let tab = self.store.tab();
        if let Err(e) = self.sync.remove(self.backend.as_ref(), tab, id).await {
            return Err(self.surface("Failed to remove product", e.into()));
        }
        self.modal
            .show(Modal::success("Success", "Product removed successfully."));
        self.fetch_products().await
    }

    /// Ask the operator to confirm clearing the active rail.
    pub fn request_reset(&mut self) {
        let tab = self.store.tab();
        self.modal.show(Modal::confirm(
            "Reset All Products",
            format!("This will remove every product from the {tab} ranking. Continue?"),
            ConfirmAction::ResetAll { tab },
        ));
    }

    /// Run the action of the open confirmation modal.
    ///
    /// # Errors
    ///
    /// Returns `NothingToConfirm` if no confirmation is open, otherwise the
    /// action's error.
    pub async fn confirm_modal(&mut self) -> Result<(), WorkspaceError> {
        match self.modal.confirm() {
            Some(ConfirmAction::ResetAll { tab }) => self.reset_all_products(tab).await,
            None => Err(WorkspaceError::NothingToConfirm),
        }
    }

    pub fn dismiss_modal(&mut self) {
        self.modal.dismiss();
    }

    /// Clear `tab` on every product in the catalog, then reload.
    ///
    /// Only reachable through a confirmed [`ConfirmAction::ResetAll`] or the
    /// CLI's explicit `--yes`.
    ///
    /// # Errors
    ///
    /// Returns the sync error, already shown as a modal.
    #[instrument(skip(self), fields(tab = %tab))]
    pub async fn reset_all_products(&mut self, tab: Tab) -> Result<(), WorkspaceError> {
        self.drag = None;
        if let Err(e) = self.sync.reset(self.backend.as_ref(), tab).await {
            return Err(self.surface("Failed to reset products", e.into()));
        }
        self.modal
            .show(Modal::success("Success", "All products have been reset."));
        self.fetch_products().await
    }

    fn warn_duplicate(&mut self, id: &ProductId) -> WorkspaceError {
        self.modal.show(Modal::error(
            "Warning",
            "This product is already in the prioritized list.",
        ));
        WorkspaceError::Duplicate(id.clone())
    }

    fn warn_on_drift(&self, report: &SyncReport) {
        let drift = report.log.unconfirmed(self.store.fetched());
        if !drift.is_empty() {
            tracing::warn!(
                writes = drift.len(),
                "Reloaded list does not reflect every write of the save"
            );
        }
    }

    /// Show `error` as a modal and hand it back.
    fn surface(&mut self, context: &str, error: WorkspaceError) -> WorkspaceError {
        self.show_failure(error.is_auth(), context, &error.to_string());
        error
    }

    fn show_failure(&mut self, auth: bool, context: &str, message: &str) {
        let modal = if auth {
            Modal::error("Authentication Error", message)
        } else {
            Modal::error("Error", format!("{context}: {message}"))
        };
        self.modal.show(modal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::{MemoryCatalog, plain, ranked};
    use curator_core::RankSlot;

    fn workspace(
        catalog: MemoryCatalog,
        tab: Tab,
    ) -> (Arc<MemoryCatalog>, Workspace<MemoryCatalog>) {
        let backend = Arc::new(catalog);
        let ws = Workspace::new(Arc::clone(&backend), tab, Duration::from_millis(1000));
        (backend, ws)
    }

    fn ids(ws: &Workspace<MemoryCatalog>) -> Vec<String> {
        ws.store()
            .products()
            .iter()
            .map(|p| p.id.to_string())
            .collect()
    }

    fn modal_title(ws: &Workspace<MemoryCatalog>) -> Option<String> {
        match ws.modal()? {
            Modal::Success { title, .. }
            | Modal::Error { title, .. }
            | Modal::Confirm { title, .. } => Some(title.clone()),
        }
    }

    async fn search(ws: &Workspace<MemoryCatalog>, query: &str) {
        ws.search().input(query).await.unwrap().await.unwrap();
    }

    /// `listed` ranked on `tab`, then enough products ranked on the other
    /// rail to fill the fetch window, then `beyond`. With "exclude other
    /// rail" on, the working list is just `listed` and `beyond` can only be
    /// reached through search.
    fn crowded(tab: Tab, listed: &[&str], beyond: Vec<Product>) -> MemoryCatalog {
        let mut products: Vec<Product> = (1..)
            .zip(listed)
            .map(|(position, id)| ranked(id, tab, position))
            .collect();
        let fillers = curator_core::ranking::RANK_WINDOW - listed.len();
        products.extend((1..).take(fillers).map(|position| {
            ranked(&format!("other{position}"), tab.other(), position)
        }));
        products.extend(beyond);
        MemoryCatalog::new(products)
    }

    #[tokio::test]
    async fn test_fetch_orders_ranked_first() {
        let (_, mut ws) = workspace(
            MemoryCatalog::new(vec![
                plain("A"),
                ranked("B", Tab::TopSelling, 2),
                ranked("C", Tab::TopSelling, 1),
            ]),
            Tab::TopSelling,
        );

        ws.fetch_products().await.unwrap();

        assert_eq!(ids(&ws), vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_missing_token_shows_auth_modal() {
        let (backend, mut ws) = workspace(
            MemoryCatalog::new(vec![plain("A")]).logged_out(),
            Tab::Latest,
        );

        assert!(ws.fetch_products().await.is_err());
        assert!(ws.store().products().is_empty());
        assert_eq!(modal_title(&ws).as_deref(), Some("Authentication Error"));

        let err = ws.save().await.unwrap_err();
        assert!(err.is_auth());
        assert!(backend.patches().is_empty());
    }

    #[tokio::test]
    async fn test_drag_then_save_writes_new_order() {
        let (backend, mut ws) = workspace(
            MemoryCatalog::new(vec![
                ranked("a", Tab::Latest, 1),
                ranked("b", Tab::Latest, 2),
                ranked("c", Tab::Latest, 3),
            ]),
            Tab::Latest,
        );
        ws.fetch_products().await.unwrap();

        ws.begin_drag_product(0).unwrap();
        assert!(ws.hover(1).unwrap());
        assert!(ws.hover(2).unwrap());
        ws.drop_on(2).await.unwrap();
        assert_eq!(ids(&ws), vec!["b", "c", "a"]);

        let report = ws.save().await.unwrap();

        assert_eq!(report.patches_sent, 3);
        assert_eq!(modal_title(&ws).as_deref(), Some("Success"));
        assert_eq!(ids(&ws), vec!["b", "c", "a"]);
        assert_eq!(backend.product("a").slot(Tab::Latest), RankSlot::ranked(3));
    }

    #[tokio::test]
    async fn test_drop_product_on_itself_is_noop() {
        let (_, mut ws) = workspace(
            MemoryCatalog::new(vec![plain("a"), plain("b")]),
            Tab::Latest,
        );
        ws.fetch_products().await.unwrap();

        ws.begin_drag_product(1).unwrap();
        ws.drop_on(1).await.unwrap();

        assert_eq!(ids(&ws), vec!["a", "b"]);
        assert!(matches!(ws.drop_on(0).await, Err(WorkspaceError::NoDrag)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_add_warns_without_patch() {
        let (backend, mut ws) = workspace(
            MemoryCatalog::new(vec![ranked("a", Tab::TopSelling, 1)]),
            Tab::TopSelling,
        );
        ws.fetch_products().await.unwrap();
        search(&ws, "Product a").await;

        let err = ws
            .add_product_from_search(&ProductId::new("a"))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkspaceError::Duplicate(_)));
        assert_eq!(modal_title(&ws).as_deref(), Some("Warning"));
        assert!(backend.patches().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_search_result_appends_it() {
        let (backend, mut ws) = workspace(
            crowded(Tab::Latest, &["a", "b"], vec![plain("extra")]),
            Tab::Latest,
        );
        ws.fetch_products().await.unwrap();
        ws.set_exclude_other(true);
        assert_eq!(ids(&ws), vec!["a", "b"]);
        search(&ws, "Product extra").await;

        ws.begin_drag_search(&ProductId::new("extra")).await.unwrap();
        ws.drop_on(0).await.unwrap();

        assert_eq!(backend.patches().len(), 1);
        assert_eq!(backend.product("extra").slot(Tab::Latest), RankSlot::ranked(3));
        assert!(ws.modal().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_hidden_by_exclude_other_cannot_be_added() {
        let (backend, mut ws) = workspace(
            MemoryCatalog::new(vec![
                ranked("a", Tab::Latest, 1),
                ranked("hidden", Tab::TopSelling, 1),
            ]),
            Tab::Latest,
        );
        ws.fetch_products().await.unwrap();
        ws.set_exclude_other(true);
        search(&ws, "Product hidden").await;
        assert!(ws.search_candidates().await.is_empty());

        let err = ws
            .add_product_from_search(&ProductId::new("hidden"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::UnknownProduct(_)));
        assert!(matches!(
            ws.begin_drag_search(&ProductId::new("hidden")).await,
            Err(WorkspaceError::UnknownProduct(_))
        ));

        assert!(backend.patches().is_empty());
        assert_eq!(backend.product("hidden").slot(Tab::Latest), RankSlot::UNRANKED);
        ws.save().await.unwrap();
        assert_eq!(backend.product("hidden").slot(Tab::TopSelling), RankSlot::ranked(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_search_shows_modal_once() {
        let (backend, mut ws) = workspace(
            MemoryCatalog::new(vec![plain("a")]).logged_out(),
            Tab::Latest,
        );

        search(&ws, "Product").await;
        assert!(ws.modal().is_none());

        let view = ws.search_view().await;
        assert_eq!(view.error.as_deref(), Some("Authentication Error"));
        assert!(view.results.is_empty());
        assert_eq!(modal_title(&ws).as_deref(), Some("Authentication Error"));

        ws.dismiss_modal();
        ws.search_view().await;
        assert!(ws.modal().is_none());
        assert!(backend.searches().is_empty());
    }

    #[tokio::test]
    async fn test_remove_keeps_other_rail() {
        let (backend, mut ws) = workspace(
            MemoryCatalog::new(vec![
                ranked("dual", Tab::TopSelling, 1).with_slot(Tab::Latest, RankSlot::ranked(2)),
            ]),
            Tab::TopSelling,
        );
        ws.fetch_products().await.unwrap();

        ws.remove_product(&ProductId::new("dual")).await.unwrap();

        let dual = backend.product("dual");
        assert_eq!(dual.slot(Tab::TopSelling), RankSlot::UNRANKED);
        assert_eq!(dual.slot(Tab::Latest), RankSlot::ranked(2));
        assert_eq!(ws.snapshot().products[0].badge, RankBadge::Other);
    }

    #[tokio::test]
    async fn test_reset_waits_for_confirmation() {
        let (backend, mut ws) = workspace(
            MemoryCatalog::new(vec![
                ranked("a", Tab::Latest, 1).with_slot(Tab::TopSelling, RankSlot::ranked(1)),
                plain("b"),
            ]),
            Tab::Latest,
        );
        ws.fetch_products().await.unwrap();

        ws.request_reset();
        assert!(backend.patches().is_empty());
        assert!(matches!(ws.modal(), Some(Modal::Confirm { .. })));

        ws.confirm_modal().await.unwrap();

        assert_eq!(backend.patches().len(), 2);
        let a = backend.product("a");
        assert_eq!(a.slot(Tab::Latest), RankSlot::UNRANKED);
        assert_eq!(a.slot(Tab::TopSelling), RankSlot::ranked(1));
        assert!(matches!(
            ws.confirm_modal().await,
            Err(WorkspaceError::NothingToConfirm)
        ));
    }

    #[tokio::test]
    async fn test_dismissed_reset_sends_nothing() {
        let (backend, mut ws) = workspace(MemoryCatalog::new(vec![plain("a")]), Tab::Latest);

        ws.request_reset();
        ws.dismiss_modal();

        assert!(matches!(
            ws.confirm_modal().await,
            Err(WorkspaceError::NothingToConfirm)
        ));
        assert!(backend.patches().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_reports_error_modal() {
        let (_, mut ws) = workspace(
            MemoryCatalog::new(vec![plain("a"), plain("b")]).failing_patch(1),
            Tab::TopSelling,
        );
        ws.fetch_products().await.unwrap();

        let err = ws.save().await.unwrap_err();

        assert!(matches!(err, WorkspaceError::Sync(ref e) if e.applied == 0));
        assert_eq!(modal_title(&ws).as_deref(), Some("Error"));
        assert_eq!(ws.sync().phase(), SyncPhase::Failed);
    }
}
