//! Unified error handling for the admin HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::prioritization::WorkspaceError;

/// Application-level error type for the admin service.
#[derive(Debug, Error)]
pub enum AppError {
    /// A workspace operation failed.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Workspace(e) if e.is_auth() => StatusCode::UNAUTHORIZED,
            Self::Workspace(WorkspaceError::Catalog(CatalogError::NotFound(_))) => {
                StatusCode::NOT_FOUND
            }
            Self::Workspace(WorkspaceError::Catalog(_) | WorkspaceError::Sync(_)) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Workspace(WorkspaceError::UnknownProduct(_)) => StatusCode::NOT_FOUND,
            Self::Workspace(
                WorkspaceError::Duplicate(_)
                | WorkspaceError::Busy
                | WorkspaceError::NothingToConfirm,
            ) => StatusCode::CONFLICT,
            Self::Workspace(WorkspaceError::Reorder(_) | WorkspaceError::NoDrag) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Backend failures go to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        (status, self.to_string()).into_response()
    }
}
