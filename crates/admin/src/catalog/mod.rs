//! Catalog REST API access.
//!
//! The prioritization tool treats the catalog backend as an opaque HTTP
//! service. Everything it needs goes through [`CatalogBackend`]:
//!
//! - `GET   /product/item/?page_size=N` - paginated listing, `next` is absolute
//! - `GET   /product/item/admin-search/?search=<q>` - admin search
//! - `PATCH /product/item/<id>/` - partial update of the rank fields
//!
//! # Authentication
//!
//! Every request carries `Authorization: JWT <token>`. Tokens come from an
//! [`AuthContext`]; when it has none, calls fail with
//! [`CatalogError::MissingToken`] before anything is sent.

pub mod auth;
pub mod client;
#[cfg(test)]
pub mod memory;

pub use auth::{AuthContext, StaticToken, TokenStore, TokenStoreError};
pub use client::CatalogClient;

use std::collections::HashSet;
use std::future::Future;

use curator_core::ranking::RankPatch;
use curator_core::{Page, Product, SearchResult};
use thiserror::Error;
use tracing::instrument;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No token available; nothing was sent.
    #[error("No access token found. Please log in again.")]
    MissingToken,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-2xx response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Token rejected by the backend.
    #[error("Unauthorized: the access token was rejected")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Failed to build a request URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A `next` link pointed back at a page already visited.
    #[error("Pagination loop detected at {0}")]
    PaginationLoop(String),
}

impl CatalogError {
    /// Whether the failure is an authentication problem rather than a
    /// backend or network one.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::MissingToken | Self::Unauthorized)
    }
}

/// The catalog operations the prioritization tool relies on.
pub trait CatalogBackend: Send + Sync + 'static {
    /// First page of the product listing.
    fn list_page(
        &self,
        page_size: u32,
    ) -> impl Future<Output = Result<Page<Product>, CatalogError>> + Send;

    /// Follow an absolute `next` link from a previous page.
    fn next_page(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Page<Product>, CatalogError>> + Send;

    /// Admin search.
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<SearchResult>, CatalogError>> + Send;

    /// Apply one product's rank writes.
    fn patch_product(
        &self,
        patch: &RankPatch,
    ) -> impl Future<Output = Result<(), CatalogError>> + Send;

    /// Page size used by [`fetch_all`].
    fn scan_page_size(&self) -> u32 {
        100
    }
}

/// Scan the entire product collection by following `next` links until null.
///
/// # Errors
///
/// Returns the first failing page's error, or `PaginationLoop` if a `next`
/// link repeats.
#[instrument(skip(backend))]
pub async fn fetch_all<B: CatalogBackend>(backend: &B) -> Result<Vec<Product>, CatalogError> {
    let mut page = backend.list_page(backend.scan_page_size()).await?;
    let mut products = Vec::new();
    let mut visited = HashSet::new();
    let mut pages = 1_u32;

    loop {
        products.append(&mut page.results);
        let Some(next) = page.next.take() else {
            break;
        };
        if !visited.insert(next.clone()) {
            return Err(CatalogError::PaginationLoop(next));
        }
        page = backend.next_page(&next).await?;
        pages += 1;
    }

    tracing::debug!(pages, products = products.len(), "Scanned full catalog");
    Ok(products)
}
