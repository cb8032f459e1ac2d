//! In-memory catalog used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use curator_core::ranking::RankPatch;
use curator_core::{Page, Product, ProductId, SearchResult};

use super::{CatalogBackend, CatalogError};

/// Catalog held in memory, recording every call made against it.
#[derive(Default)]
pub struct MemoryCatalog {
    products: Mutex<Vec<Product>>,
    patches: Mutex<Vec<RankPatch>>,
    searches: Mutex<Vec<String>>,
    search_delays: HashMap<String, Duration>,
    page_size_override: Option<u32>,
    fail_patch_number: Option<usize>,
    logged_out: bool,
}

impl MemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            ..Self::default()
        }
    }

    /// Scan with small pages to exercise `next` links.
    #[must_use]
    pub const fn with_page_size(mut self, size: u32) -> Self {
        self.page_size_override = Some(size);
        self
    }

    /// Make the n-th PATCH (1-based) fail with a 500.
    #[must_use]
    pub const fn failing_patch(mut self, number: usize) -> Self {
        self.fail_patch_number = Some(number);
        self
    }

    /// Answer searches for `query` only after `delay`.
    #[must_use]
    pub fn with_search_delay(mut self, query: &str, delay: Duration) -> Self {
        self.search_delays.insert(query.to_string(), delay);
        self
    }

    /// Behave as if no token were stored.
    #[must_use]
    pub const fn logged_out(mut self) -> Self {
        self.logged_out = true;
        self
    }

    pub fn products(&self) -> Vec<Product> {
        self.products.lock().unwrap().clone()
    }

    pub fn product(&self, id: &str) -> Product {
        self.products()
            .into_iter()
            .find(|p| p.id.as_str() == id)
            .unwrap()
    }

    pub fn patches(&self) -> Vec<RankPatch> {
        self.patches.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn clear_patches(&self) {
        self.patches.lock().unwrap().clear();
    }

    fn page_from(&self, offset: usize, size: usize) -> Page<Product> {
        let products = self.products.lock().unwrap();
        let results: Vec<Product> = products.iter().skip(offset).take(size).cloned().collect();
        let next_offset = offset + results.len();
        Page {
            count: Some(products.len() as u64),
            next: (next_offset < products.len() && !results.is_empty())
                .then(|| format!("memory://catalog?offset={next_offset}&size={size}")),
            previous: None,
            results,
        }
    }

    fn check_token(&self) -> Result<(), CatalogError> {
        if self.logged_out {
            Err(CatalogError::MissingToken)
        } else {
            Ok(())
        }
    }
}

impl CatalogBackend for MemoryCatalog {
    async fn list_page(&self, page_size: u32) -> Result<Page<Product>, CatalogError> {
        self.check_token()?;
        Ok(self.page_from(0, page_size as usize))
    }

    async fn next_page(&self, url: &str) -> Result<Page<Product>, CatalogError> {
        self.check_token()?;
        let parsed = url::Url::parse(url)?;
        let param = |name: &str| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == name)
                .and_then(|(_, value)| value.parse::<usize>().ok())
                .unwrap()
        };
        Ok(self.page_from(param("offset"), param("size")))
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError> {
        self.check_token()?;
        self.searches.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.search_delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        let needle = query.to_lowercase();
        Ok(self
            .products()
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .map(SearchResult::from)
            .collect())
    }

    async fn patch_product(&self, patch: &RankPatch) -> Result<(), CatalogError> {
        self.check_token()?;
        let number = {
            let mut patches = self.patches.lock().unwrap();
            patches.push(patch.clone());
            patches.len()
        };
        if self.fail_patch_number == Some(number) {
            return Err(CatalogError::Api {
                status: 500,
                message: "write failed".to_string(),
            });
        }
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == patch.product_id)
            .ok_or_else(|| CatalogError::NotFound(patch.product_id.to_string()))?;
        patch.apply_to(product);
        Ok(())
    }

    fn scan_page_size(&self) -> u32 {
        self.page_size_override.unwrap_or(100)
    }
}

/// Shorthand for a product ranked on one rail.
pub fn ranked(id: &str, tab: curator_core::Tab, position: u32) -> Product {
    Product::new(id, format!("Product {id}"))
        .with_slot(tab, curator_core::RankSlot::ranked(position))
}

/// Shorthand for an unranked product.
pub fn plain(id: &str) -> Product {
    Product::new(ProductId::new(id), format!("Product {id}"))
}
