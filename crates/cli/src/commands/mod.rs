//! CLI command implementations.

pub mod products;
pub mod token;

use curator_admin::catalog::{CatalogError, TokenStoreError};
use curator_admin::config::ConfigError;
use curator_admin::prioritization::{SyncError, WorkspaceError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Token file could not be read or written.
    #[error("Token file error: {0}")]
    TokenStore(#[from] TokenStoreError),

    /// Catalog request failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Workspace operation failed.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// A sync run stopped part-way.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// An ID passed on the command line is not in the catalog.
    #[error("Unknown product ID: {0}")]
    UnknownProduct(String),

    /// A destructive command was run without `--yes`.
    #[error("Refusing to {0} without --yes")]
    ConfirmationRequired(&'static str),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}
