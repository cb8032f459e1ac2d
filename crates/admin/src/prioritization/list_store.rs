//! The working list for the active rail.

use curator_core::ranking::{
    DragSession, RANK_WINDOW, ReorderError, exclude_other, sorted_for_tab,
};
use curator_core::{Product, ProductId, Tab};
use tracing::instrument;

use crate::catalog::{CatalogBackend, CatalogError};

/// In-memory ordered product list for one rail.
///
/// `fetched` is the last page loaded from the backend, already in display
/// order. `products` is the working list the operator reorders: `fetched`
/// after the optional "exclude other rail" filter. It is never persisted and
/// is rebuilt from the backend after every mutation.
#[derive(Debug, Clone, Default)]
pub struct ProductListStore {
    tab: Tab,
    exclude_other: bool,
    fetched: Vec<Product>,
    products: Vec<Product>,
}

impl ProductListStore {
    #[must_use]
    pub fn new(tab: Tab) -> Self {
        Self {
            tab,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn tab(&self) -> Tab {
        self.tab
    }

    #[must_use]
    pub const fn exclude_other(&self) -> bool {
        self.exclude_other
    }

    /// The working list, in its current order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// The last fetched page, before filtering.
    #[must_use]
    pub fn fetched(&self) -> &[Product] {
        &self.fetched
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.products.iter().any(|p| &p.id == id)
    }

    /// Products in the working list flagged on the active rail.
    #[must_use]
    pub fn ranked_count(&self) -> usize {
        self.products.iter().filter(|p| p.slot(self.tab).flag).count()
    }

    /// Switch rails. The list is emptied until the next fetch.
    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.fetched.clear();
        self.products.clear();
    }

    /// Toggle the "exclude other rail" filter and rebuild the working list
    /// from the fetched page. Unsaved reorders are discarded.
    pub fn set_exclude_other(&mut self, enabled: bool) {
        self.exclude_other = enabled;
        self.rebuild();
    }

    /// Load the first rank window for the active rail.
    ///
    /// On failure the list is left empty and the error is returned for the
    /// caller to surface.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self, backend), fields(tab = %self.tab))]
    pub async fn fetch<B: CatalogBackend>(&mut self, backend: &B) -> Result<(), CatalogError> {
        let page_size = u32::try_from(RANK_WINDOW).unwrap_or(u32::MAX);
        match backend.list_page(page_size).await {
            Ok(page) => {
                self.fetched = sorted_for_tab(page.results, self.tab);
                self.rebuild();
                tracing::debug!(
                    fetched = self.fetched.len(),
                    visible = self.products.len(),
                    "Loaded products"
                );
                Ok(())
            }
            Err(e) => {
                self.fetched.clear();
                self.products.clear();
                Err(e)
            }
        }
    }

    /// Move the product at `from` to `to`. Returns whether the list changed.
    ///
    /// # Errors
    ///
    /// Returns `ReorderError` if either index is out of range; the list is
    /// left as it was.
    pub fn move_product(&mut self, from: usize, to: usize) -> Result<bool, ReorderError> {
        DragSession::product(from).hover(&mut self.products, to)
    }

    /// Feed a hover event from an in-progress drag into the working list.
    ///
    /// # Errors
    ///
    /// Returns `ReorderError` if `target` is out of range.
    pub fn hover(&mut self, drag: &mut DragSession, target: usize) -> Result<bool, ReorderError> {
        drag.hover(&mut self.products, target)
    }

    /// Append a product to the end of the working list.
    pub fn push(&mut self, product: Product) {
        self.products.push(product);
    }

    fn rebuild(&mut self) {
        self.products = exclude_other(self.fetched.clone(), self.tab, self.exclude_other);
    }
}
