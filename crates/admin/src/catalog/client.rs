//! `reqwest` implementation of the catalog API.

use std::sync::Arc;

use curator_core::ranking::RankPatch;
use curator_core::{Page, Product, SearchResult};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::auth::{AuthContext, StaticToken, TokenStore};
use super::{CatalogBackend, CatalogError};
use crate::config::CatalogConfig;

/// Catalog REST API client.
///
/// Cheap to clone; clones share the connection pool and auth context.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    auth: Arc<dyn AuthContext>,
    scan_page_size: u32,
}

impl CatalogClient {
    /// Create a client using an explicit auth context.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig, auth: Arc<dyn AuthContext>) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.api_url.clone(),
                auth,
                scan_page_size: config.scan_page_size,
            }),
        })
    }

    /// Create a client whose auth context follows the configuration: the
    /// static token when set, the token file otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let auth: Arc<dyn AuthContext> = match &config.token {
            Some(token) => Arc::new(StaticToken::new(token.clone())),
            None => Arc::new(TokenStore::new(config.token_file.clone())),
        };
        Self::new(config, auth)
    }

    /// Base URL all endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build `<base>/<segments>/` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                CatalogError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    /// `Authorization` header value, or `MissingToken` before any I/O.
    fn authorization(&self) -> Result<HeaderValue, CatalogError> {
        let token = self.inner.auth.token().ok_or(CatalogError::MissingToken)?;
        let mut value = HeaderValue::from_str(&format!("JWT {}", token.expose_secret()))
            .map_err(|e| CatalogError::Parse(format!("Invalid token format: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Execute an authorized GET and parse the JSON body.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let authorization = self.authorization()?;
        let response = self
            .inner
            .client
            .get(url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;
        let response = self.check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(format!("Failed to parse response: {e}")))
    }

    /// Map non-2xx responses to errors.
    async fn check_status(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CatalogError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            self.inner.auth.on_unauthorized();
            return Err(CatalogError::Unauthorized);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(response.url().path().to_string()));
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(CatalogError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl CatalogBackend for CatalogClient {
    #[instrument(skip(self))]
    async fn list_page(&self, page_size: u32) -> Result<Page<Product>, CatalogError> {
        let mut url = self.endpoint(&["product", "item"])?;
        url.query_pairs_mut()
            .append_pair("page_size", &page_size.to_string());
        self.get(url).await
    }

    #[instrument(skip(self))]
    async fn next_page(&self, url: &str) -> Result<Page<Product>, CatalogError> {
        let url = Url::parse(url)?;
        self.get(url).await
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError> {
        let mut url = self.endpoint(&["product", "item", "admin-search"])?;
        url.query_pairs_mut().append_pair("search", query);
        let page: Page<SearchResult> = self.get(url).await?;
        Ok(page.results)
    }

    #[instrument(skip(self, patch), fields(product_id = %patch.product_id))]
    async fn patch_product(&self, patch: &RankPatch) -> Result<(), CatalogError> {
        let authorization = self.authorization()?;
        let url = self.endpoint(&["product", "item", patch.product_id.as_str()])?;
        let response = self
            .inner
            .client
            .patch(url)
            .header(AUTHORIZATION, authorization)
            .json(&patch.body())
            .send()
            .await?;
        self.check_status(response).await?;
        Ok(())
    }

    fn scan_page_size(&self) -> u32 {
        self.inner.scan_page_size
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
