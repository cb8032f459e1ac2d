//! Debounced product search.
//!
//! Each keystroke bumps a generation counter. A request fires only after the
//! input has been quiet for the debounce period, and its response is
//! committed only if no newer input arrived in the meantime, so a slow
//! earlier response can never overwrite a later one.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use curator_core::ranking::exclude_other;
use curator_core::{ProductId, SearchResult, Tab};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::catalog::{CatalogBackend, CatalogError};

/// Current search state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchState {
    /// Latest input, as typed.
    pub query: String,
    /// Results of the latest committed request.
    pub results: Vec<SearchResult>,
    /// A request for `query` is waiting or in flight.
    pub pending: bool,
    /// Error from the latest committed request.
    pub error: Option<String>,
    #[serde(skip)]
    generation: u64,
    #[serde(skip)]
    unreported: Option<SearchFailure>,
}

/// A committed search failure the operator has not been shown yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFailure {
    /// The token was missing or rejected.
    pub auth: bool,
    pub message: String,
}

/// Debounced search over the catalog's admin search endpoint.
///
/// Clones share state, so the HTTP layer and the workspace can hold the same
/// overlay.
pub struct SearchOverlay<B> {
    backend: Arc<B>,
    debounce: Duration,
    state: Arc<Mutex<SearchState>>,
}

impl<B> Clone for SearchOverlay<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            debounce: self.debounce,
            state: Arc::clone(&self.state),
        }
    }
}

impl<B: CatalogBackend> SearchOverlay<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, debounce: Duration) -> Self {
        Self {
            backend,
            debounce,
            state: Arc::new(Mutex::new(SearchState::default())),
        }
    }

    /// Record new input.
    ///
    /// Blank input clears the results immediately without a request and
    /// returns `None`. Otherwise a debounced request is scheduled and its task
    /// handle returned; callers may ignore it.
    pub async fn input(&self, query: &str) -> Option<JoinHandle<()>> {
        let generation = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.query = query.to_string();
            state.unreported = None;
            if query.trim().is_empty() {
                state.results.clear();
                state.pending = false;
                state.error = None;
                return None;
            }
            state.pending = true;
            state.generation
        };

        let overlay = self.clone();
        let query = query.trim().to_string();
        Some(tokio::spawn(async move {
            overlay.run(generation, query).await;
        }))
    }

    async fn run(&self, generation: u64, query: String) {
        tokio::time::sleep(self.debounce).await;
        if !self.is_current(generation).await {
            return;
        }

        let outcome = self.backend.search(&query).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            tracing::debug!(%query, "Discarding superseded search response");
            return;
        }
        state.pending = false;
        match outcome {
            Ok(results) => {
                tracing::debug!(%query, results = results.len(), "Search committed");
                state.results = results;
                state.error = None;
            }
            Err(e) => {
                tracing::warn!(%query, error = %e, "Search failed");
                state.results.clear();
                state.error = Some(search_error_message(&e));
                state.unreported = Some(SearchFailure {
                    auth: e.is_auth(),
                    message: e.to_string(),
                });
            }
        }
    }

    async fn is_current(&self, generation: u64) -> bool {
        self.state.lock().await.generation == generation
    }

    /// Snapshot of the raw state.
    pub async fn state(&self) -> SearchState {
        self.state.lock().await.clone()
    }

    /// Committed results a curator can still add to `tab`: not already in
    /// the working list and, when `exclude_other_tab` is set, not ranked on
    /// the other rail.
    pub async fn candidates(
        &self,
        tab: Tab,
        exclude_other_tab: bool,
        in_list: &HashSet<ProductId>,
    ) -> Vec<SearchResult> {
        let results = self.state.lock().await.results.clone();
        exclude_other(results, tab, exclude_other_tab)
            .into_iter()
            .filter(|result| !in_list.contains(&result.id))
            .collect()
    }

    /// Hand over the latest failure once. Later calls return `None` until
    /// another request fails.
    pub async fn take_failure(&self) -> Option<SearchFailure> {
        self.state.lock().await.unreported.take()
    }

    /// Forget the current query and results.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        *state = SearchState {
            generation: state.generation,
            ..SearchState::default()
        };
    }
}

fn search_error_message(error: &CatalogError) -> String {
    if error.is_auth() {
        "Authentication Error".to_string()
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::{MemoryCatalog, plain, ranked};

    fn overlay(catalog: MemoryCatalog) -> (Arc<MemoryCatalog>, SearchOverlay<MemoryCatalog>) {
        let backend = Arc::new(catalog);
        let overlay = SearchOverlay::new(Arc::clone(&backend), Duration::from_millis(1000));
        (backend, overlay)
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_input_is_sent() {
        let (backend, overlay) = overlay(MemoryCatalog::new(vec![plain("1"), plain("2")]));

        let first = overlay.input("Prod").await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        let second = overlay.input("Product 2").await.unwrap();
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(backend.searches(), vec!["Product 2".to_string()]);
        let state = overlay.state().await;
        assert!(!state.pending);
        assert_eq!(state.results.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_waits_for_debounce() {
        let (backend, overlay) = overlay(MemoryCatalog::new(vec![plain("1")]));

        let handle = overlay.input("Product").await.unwrap();
        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(backend.searches().is_empty());
        assert!(overlay.state().await.pending);

        handle.await.unwrap();
        assert_eq!(backend.searches().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_clears_without_request() {
        let (backend, overlay) = overlay(MemoryCatalog::new(vec![plain("1")]));
        overlay.input("Product").await.unwrap().await.unwrap();
        assert_eq!(overlay.state().await.results.len(), 1);

        assert!(overlay.input("   ").await.is_none());

        let state = overlay.state().await;
        assert!(state.results.is_empty());
        assert!(!state.pending);
        assert_eq!(backend.searches().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_cancels_pending_request() {
        let (backend, overlay) = overlay(MemoryCatalog::new(vec![plain("1")]));

        let handle = overlay.input("Product").await.unwrap();
        overlay.input("").await;
        handle.await.unwrap();

        assert!(backend.searches().is_empty());
        assert!(overlay.state().await.results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_candidates_filter_list_and_other_tab() {
        let (_backend, overlay) = overlay(MemoryCatalog::new(vec![
            plain("1"),
            ranked("2", Tab::Latest, 1),
            plain("3"),
        ]));
        overlay.input("Product").await.unwrap().await.unwrap();
        let in_list: HashSet<ProductId> = [ProductId::new("3")].into_iter().collect();

        let all = overlay.candidates(Tab::TopSelling, false, &in_list).await;
        let filtered = overlay.candidates(Tab::TopSelling, true, &in_list).await;

        assert_eq!(all.len(), 2);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.first().map(|r| r.id.as_str()), Some("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_error_is_recorded() {
        let (_backend, overlay) = overlay(MemoryCatalog::new(vec![plain("1")]).logged_out());

        overlay.input("Product").await.unwrap().await.unwrap();

        let state = overlay.state().await;
        assert_eq!(state.error.as_deref(), Some("Authentication Error"));
        assert!(state.results.is_empty());

        let failure = overlay.take_failure().await.unwrap();
        assert!(failure.auth);
        assert!(overlay.take_failure().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_earlier_response_is_discarded() {
        let catalog = MemoryCatalog::new(vec![plain("1"), plain("2")])
            .with_search_delay("Product 1", Duration::from_secs(5))
            .with_search_delay("Product 2", Duration::from_millis(100));
        let (backend, overlay) = overlay(catalog);

        let first = overlay.input("Product 1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(backend.searches(), vec!["Product 1".to_string()]);
        assert!(overlay.state().await.pending);

        let second = overlay.input("Product 2").await.unwrap();
        second.await.unwrap();
        let state = overlay.state().await;
        assert!(!state.pending);
        assert_eq!(state.results.first().map(|r| r.id.as_str()), Some("2"));

        // The first request answers last and must not replace the results
        first.await.unwrap();
        let state = overlay.state().await;
        assert_eq!(state.query, "Product 2");
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results.first().map(|r| r.id.as_str()), Some("2"));
        assert_eq!(backend.searches().len(), 2);
    }
}
