//! Prioritization workspace API handlers.
//!
//! Mutating handlers claim the workspace without waiting; a request that
//! arrives while a save or reset is running gets `409 Conflict`.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use curator_core::{ProductId, Tab};
use serde::Deserialize;

use crate::catalog::CatalogBackend;
use crate::error::AppError;
use crate::prioritization::{SearchView, WorkspaceSnapshot};
use crate::state::AppState;

type SnapshotResult = Result<Json<WorkspaceSnapshot>, AppError>;

/// Build the prioritization router.
pub fn router<B: CatalogBackend>() -> Router<AppState<B>> {
    Router::new()
        .route("/api/prioritization", get(snapshot::<B>))
        .route("/api/prioritization/tab", post(switch_tab::<B>))
        .route("/api/prioritization/exclude-other", post(exclude_other::<B>))
        .route("/api/prioritization/refresh", post(refresh::<B>))
        .route("/api/prioritization/drag/start", post(drag_start::<B>))
        .route("/api/prioritization/drag/hover", post(drag_hover::<B>))
        .route("/api/prioritization/drag/drop", post(drag_drop::<B>))
        .route("/api/prioritization/move", post(move_product::<B>))
        .route("/api/prioritization/save", post(save::<B>))
        .route("/api/prioritization/products", post(add_product::<B>))
        .route(
            "/api/prioritization/products/{id}",
            delete(remove_product::<B>),
        )
        .route("/api/prioritization/reset", post(request_reset::<B>))
        .route("/api/prioritization/modal/confirm", post(confirm_modal::<B>))
        .route("/api/prioritization/modal/dismiss", post(dismiss_modal::<B>))
        .route(
            "/api/prioritization/search",
            get(search_results::<B>).put(search_input::<B>),
        )
}

#[derive(Debug, Deserialize)]
pub struct TabRequest {
    pub tab: Tab,
}

#[derive(Debug, Deserialize)]
pub struct ExcludeOtherRequest {
    pub enabled: bool,
}

/// What a drag gesture picks up.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DragSource {
    Product { index: usize },
    SearchResult { id: ProductId },
}

#[derive(Debug, Deserialize)]
pub struct IndexRequest {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// Current workspace snapshot.
pub async fn snapshot<B: CatalogBackend>(
    State(state): State<AppState<B>>,
) -> Json<WorkspaceSnapshot> {
    Json(state.workspace().await.snapshot())
}

/// Switch rail and reload its list.
///
/// # Errors
///
/// Returns an error if the workspace is busy or the fetch fails.
pub async fn switch_tab<B: CatalogBackend>(
    State(state): State<AppState<B>>,
    Json(body): Json<TabRequest>,
) -> SnapshotResult {
    let mut workspace = state.claim()?;
    workspace.switch_tab(body.tab).await?;
    Ok(Json(workspace.snapshot()))
}

/// Toggle the "exclude other rail" filter.
///
/// # Errors
///
/// Returns an error if the workspace is busy.
pub async fn exclude_other<B: CatalogBackend>(
    State(state): State<AppState<B>>,
    Json(body): Json<ExcludeOtherRequest>,
) -> SnapshotResult {
    let mut workspace = state.claim()?;
    workspace.set_exclude_other(body.enabled);
    Ok(Json(workspace.snapshot()))
}

/// Reload the working list.
///
/// # Errors
///
/// Returns an error if the workspace is busy or the fetch fails.
pub async fn refresh<B: CatalogBackend>(State(state): State<AppState<B>>) -> SnapshotResult {
    let mut workspace = state.claim()?;
    workspace.fetch_products().await?;
    Ok(Json(workspace.snapshot()))
}

/// Start a drag gesture.
///
/// # Errors
///
/// Returns an error if the workspace is busy or the source does not exist.
pub async fn drag_start<B: CatalogBackend>(
    State(state): State<AppState<B>>,
    Json(source): Json<DragSource>,
) -> SnapshotResult {
    let mut workspace = state.claim()?;
    match source {
        DragSource::Product { index } => workspace.begin_drag_product(index)?,
        DragSource::SearchResult { id } => workspace.begin_drag_search(&id).await?,
    }
    Ok(Json(workspace.snapshot()))
}

/// Hover the current drag over a slot.
///
/// # Errors
///
/// Returns an error if the workspace is busy, no drag is active, or the
/// index is out of range.
pub async fn drag_hover<B: CatalogBackend>(
    State(state): State<AppState<B>>,
    Json(body): Json<IndexRequest>,
) -> SnapshotResult {
    let mut workspace = state.claim()?;
    workspace.hover(body.index)?;
    Ok(Json(workspace.snapshot()))
}

/// Drop the current drag on a slot.
///
/// # Errors
///
/// Returns an error if the workspace is busy, no drag is active, or the
/// resulting move or add fails.
pub async fn drag_drop<B: CatalogBackend>(
    State(state): State<AppState<B>>,
    Json(body): Json<IndexRequest>,
) -> SnapshotResult {
    let mut workspace = state.claim()?;
    workspace.drop_on(body.index).await?;
    Ok(Json(workspace.snapshot()))
}

/// Move a product without a gesture.
///
/// # Errors
///
/// Returns an error if the workspace is busy or an index is out of range.
pub async fn move_product<B: CatalogBackend>(
    State(state): State<AppState<B>>,
    Json(body): Json<MoveRequest>,
) -> SnapshotResult {
    let mut workspace = state.claim()?;
    workspace.move_product(body.from, body.to)?;
    Ok(Json(workspace.snapshot()))
}

/// Persist the working order.
///
/// # Errors
///
/// Returns an error if the workspace is busy or the sync fails.
pub async fn save<B: CatalogBackend>(State(state): State<AppState<B>>) -> SnapshotResult {
    let mut workspace = state.claim()?;
    workspace.save().await?;
    Ok(Json(workspace.snapshot()))
}

/// Add a committed search result to the active rail.
///
/// # Errors
///
/// Returns an error if the workspace is busy, the product is already listed
/// or unknown, or the write fails.
pub async fn add_product<B: CatalogBackend>(
    State(state): State<AppState<B>>,
    Json(body): Json<AddProductRequest>,
) -> SnapshotResult {
    let mut workspace = state.claim()?;
    workspace.add_product_from_search(&body.product_id).await?;
    Ok(Json(workspace.snapshot()))
}

/// Unrank one product on the active rail.
///
/// # Errors
///
/// Returns an error if the workspace is busy or the write fails.
pub async fn remove_product<B: CatalogBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> SnapshotResult {
    let mut workspace = state.claim()?;
    workspace.remove_product(&ProductId::new(id)).await?;
    Ok(Json(workspace.snapshot()))
}

/// Open the reset confirmation.
///
/// # Errors
///
/// Returns an error if the workspace is busy.
pub async fn request_reset<B: CatalogBackend>(
    State(state): State<AppState<B>>,
) -> SnapshotResult {
    let mut workspace = state.claim()?;
    workspace.request_reset();
    Ok(Json(workspace.snapshot()))
}

/// Run the action of the open confirmation.
///
/// # Errors
///
/// Returns an error if the workspace is busy, nothing awaits confirmation,
/// or the action fails.
pub async fn confirm_modal<B: CatalogBackend>(
    State(state): State<AppState<B>>,
) -> SnapshotResult {
    let mut workspace = state.claim()?;
    workspace.confirm_modal().await?;
    Ok(Json(workspace.snapshot()))
}

/// Close the open modal.
///
/// # Errors
///
/// Returns an error if the workspace is busy.
pub async fn dismiss_modal<B: CatalogBackend>(
    State(state): State<AppState<B>>,
) -> SnapshotResult {
    let mut workspace = state.claim()?;
    workspace.dismiss_modal();
    Ok(Json(workspace.snapshot()))
}

/// Record search input. The request fires after the debounce period.
pub async fn search_input<B: CatalogBackend>(
    State(state): State<AppState<B>>,
    Json(body): Json<SearchRequest>,
) -> StatusCode {
    // The request completes in the background
    let _ = state.search().input(&body.query).await;
    StatusCode::ACCEPTED
}

/// Committed search results a curator can still add. A failed search also
/// opens an error modal on the workspace.
pub async fn search_results<B: CatalogBackend>(
    State(state): State<AppState<B>>,
) -> Json<SearchView> {
    Json(state.workspace().await.search_view().await)
}
