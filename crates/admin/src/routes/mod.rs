//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Health check (binary only)
//!
//! # Prioritization workspace
//! GET    /api/prioritization                  - Snapshot of the workspace
//! POST   /api/prioritization/tab              - Switch rail and reload
//! POST   /api/prioritization/exclude-other    - Toggle the other-rail filter
//! POST   /api/prioritization/refresh          - Reload the working list
//! POST   /api/prioritization/drag/start       - Start a drag gesture
//! POST   /api/prioritization/drag/hover       - Hover over a slot
//! POST   /api/prioritization/drag/drop        - Drop on a slot
//! POST   /api/prioritization/move             - Move without a gesture
//! POST   /api/prioritization/save             - Persist the working order
//! POST   /api/prioritization/products         - Add a search result
//! DELETE /api/prioritization/products/{id}    - Unrank one product
//! POST   /api/prioritization/reset            - Ask to reset the rail
//! POST   /api/prioritization/modal/confirm    - Run the confirmed action
//! POST   /api/prioritization/modal/dismiss    - Close the modal
//! PUT    /api/prioritization/search           - Debounced search input
//! GET    /api/prioritization/search           - Committed candidates
//! ```

pub mod prioritization;

use axum::Router;

use crate::catalog::CatalogBackend;
use crate::state::AppState;

/// Build the complete API router.
pub fn routes<B: CatalogBackend>() -> Router<AppState<B>> {
    Router::new().merge(prioritization::router())
}
