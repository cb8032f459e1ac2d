//! Integration tests for Curator.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p curator-integration-tests
//! ```
//!
//! No external services are needed: [`FakeCatalog`] stands in for the
//! catalog REST API on a local `wiremock` server, keeping product state
//! across requests so saves and re-fetches behave like the real backend.
//!
//! # Test Categories
//!
//! - `catalog_client` - HTTP contract of the catalog client
//! - `prioritization` - workspace operations end to end

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use curator_admin::catalog::{AuthContext, CatalogClient, StaticToken};
use curator_admin::config::CatalogConfig;
use curator_admin::prioritization::Workspace;
use curator_core::Tab;
use secrecy::SecretString;
use serde_json::{Map, Value, json};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Token the fake catalog accepts.
pub const TEST_TOKEN: &str = "test-token";

/// A PATCH the fake catalog received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPatch {
    pub id: String,
    pub body: Map<String, Value>,
}

#[derive(Default)]
struct CatalogState {
    products: Vec<Map<String, Value>>,
    patches: Vec<RecordedPatch>,
}

/// Stateful catalog backend served over HTTP.
pub struct FakeCatalog {
    server: MockServer,
    state: Arc<Mutex<CatalogState>>,
}

impl FakeCatalog {
    /// Start a server holding `products` (JSON objects with at least `id`).
    ///
    /// # Panics
    ///
    /// Panics if a product is not a JSON object.
    pub async fn start(products: Vec<Value>) -> Self {
        let products = products
            .into_iter()
            .map(|p| match p {
                Value::Object(map) => map,
                other => panic!("product must be an object, got {other}"),
            })
            .collect();
        let state = Arc::new(Mutex::new(CatalogState {
            products,
            patches: Vec::new(),
        }));
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/product/item/"))
            .respond_with(ListResponder {
                state: Arc::clone(&state),
                base: server.uri(),
            })
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/product/item/admin-search/"))
            .respond_with(SearchResponder {
                state: Arc::clone(&state),
            })
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path_regex(r"^/api/product/item/[^/]+/$"))
            .respond_with(PatchResponder {
                state: Arc::clone(&state),
            })
            .mount(&server)
            .await;

        Self { server, state }
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("{}/api/", self.server.uri())
    }

    /// A client authenticated with [`TEST_TOKEN`].
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> CatalogClient {
        self.client_with(Arc::new(StaticToken::new(SecretString::from(TEST_TOKEN))))
    }

    /// A client using `auth` for its token.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client_with(&self, auth: Arc<dyn AuthContext>) -> CatalogClient {
        let mut config = CatalogConfig::new(&self.api_url()).expect("valid mock URL");
        config.scan_page_size = 7;
        CatalogClient::new(&config, auth).expect("client builds")
    }

    /// A workspace on `tab` backed by this catalog, with no search debounce.
    #[must_use]
    pub fn workspace(&self, tab: Tab) -> Workspace<CatalogClient> {
        Workspace::new(Arc::new(self.client()), tab, Duration::ZERO)
    }

    /// Current record of product `id`.
    ///
    /// # Panics
    ///
    /// Panics if the product does not exist.
    #[must_use]
    pub fn product(&self, id: &str) -> Map<String, Value> {
        lock(&self.state)
            .products
            .iter()
            .find(|p| id_of(p) == id)
            .cloned()
            .unwrap_or_else(|| panic!("no product {id}"))
    }

    /// Every PATCH received so far, in order.
    #[must_use]
    pub fn patches(&self) -> Vec<RecordedPatch> {
        lock(&self.state).patches.clone()
    }

    pub fn clear_patches(&self) {
        lock(&self.state).patches.clear();
    }

    /// Raw requests seen by the server.
    ///
    /// # Panics
    ///
    /// Panics if request recording is disabled.
    pub async fn requests(&self) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .expect("request recording enabled")
    }

    /// The underlying server, for mounting extra mocks.
    #[must_use]
    pub const fn server(&self) -> &MockServer {
        &self.server
    }
}

/// Product JSON with one rail ranked.
#[must_use]
pub fn ranked(id: &str, tab: Tab, position: u32) -> Value {
    let mut product = plain(id);
    let (flag, pos) = match tab {
        Tab::TopSelling => ("top_selling_items", "top_selling_position"),
        Tab::Latest => ("latest_item", "latest_item_position"),
    };
    product[flag] = json!(true);
    product[pos] = json!(position);
    product
}

/// Unranked product JSON.
#[must_use]
pub fn plain(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Product {id}"),
        "primary_image": null,
        "top_selling_items": false,
        "top_selling_position": null,
        "latest_item": false,
        "latest_item_position": null,
    })
}

fn lock(state: &Mutex<CatalogState>) -> MutexGuard<'_, CatalogState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn id_of(product: &Map<String, Value>) -> String {
    match product.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn authorized(request: &Request) -> bool {
    request
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("JWT {TEST_TOKEN}"))
}

fn query(request: &Request) -> HashMap<String, String> {
    request.url.query_pairs().into_owned().collect()
}

struct ListResponder {
    state: Arc<Mutex<CatalogState>>,
    base: String,
}

impl Respond for ListResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if !authorized(request) {
            return ResponseTemplate::new(401);
        }
        let params = query(request);
        let size: usize = params
            .get("page_size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);
        let page: usize = params.get("page").and_then(|s| s.parse().ok()).unwrap_or(1);

        let state = lock(&self.state);
        let total = state.products.len();
        let start = (page - 1) * size;
        let results: Vec<Value> = state
            .products
            .iter()
            .skip(start)
            .take(size)
            .cloned()
            .map(Value::Object)
            .collect();
        let next = (start + size < total).then(|| {
            format!(
                "{}/api/product/item/?page={}&page_size={size}",
                self.base,
                page + 1
            )
        });

        ResponseTemplate::new(200).set_body_json(json!({
            "count": total,
            "next": next,
            "previous": null,
            "results": results,
        }))
    }
}

struct SearchResponder {
    state: Arc<Mutex<CatalogState>>,
}

impl Respond for SearchResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if !authorized(request) {
            return ResponseTemplate::new(401);
        }
        let needle = query(request)
            .get("search")
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        let state = lock(&self.state);
        let results: Vec<Value> = state
            .products
            .iter()
            .filter(|p| {
                p.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .map(Value::Object)
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({ "results": results }))
    }
}

struct PatchResponder {
    state: Arc<Mutex<CatalogState>>,
}

impl Respond for PatchResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if !authorized(request) {
            return ResponseTemplate::new(401);
        }
        let Some(id) = request
            .url
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
            .map(str::to_string)
        else {
            return ResponseTemplate::new(404);
        };
        let Ok(Value::Object(body)) = serde_json::from_slice::<Value>(&request.body) else {
            return ResponseTemplate::new(400);
        };

        let mut state = lock(&self.state);
        state.patches.push(RecordedPatch {
            id: id.clone(),
            body: body.clone(),
        });
        let Some(product) = state.products.iter_mut().find(|p| id_of(p) == id) else {
            return ResponseTemplate::new(404);
        };
        for (key, value) in body {
            product.insert(key, value);
        }
        ResponseTemplate::new(200).set_body_json(Value::Object(product.clone()))
    }
}
