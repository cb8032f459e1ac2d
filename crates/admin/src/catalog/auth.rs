//! Access-token sources for the catalog API.
//!
//! The data-access layer never reads ambient state for its token. It is handed
//! an [`AuthContext`] and asks it for a token on every request, reporting back
//! through [`AuthContext::on_unauthorized`] when the backend rejects one.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key under which the token is persisted.
pub const TOKEN_KEY: &str = "access_token";

/// Source of the bearer token used for catalog requests.
pub trait AuthContext: Send + Sync {
    /// Current token, if one is available.
    fn token(&self) -> Option<SecretString>;

    /// Called when the backend answers 401/403 for the current token.
    fn on_unauthorized(&self);
}

/// A fixed token supplied by configuration.
#[derive(Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    #[must_use]
    pub const fn new(token: SecretString) -> Self {
        Self(token)
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticToken").field(&"[REDACTED]").finish()
    }
}

impl AuthContext for StaticToken {
    fn token(&self) -> Option<SecretString> {
        Some(self.0.clone())
    }

    fn on_unauthorized(&self) {
        tracing::warn!("Catalog rejected the configured CATALOG_API_TOKEN");
    }
}

/// Errors from the persistent token file.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("Token file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Token file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
}

/// File-backed token storage, the service-side stand-in for a browser's
/// local storage.
///
/// The file holds a single JSON object keyed by [`TOKEN_KEY`]. It is read on
/// every call so a token written by the CLI is picked up without a restart.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token.
    ///
    /// A missing file or an empty token is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `TokenStoreError` if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<SecretString>, TokenStoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredToken = serde_json::from_str(&raw)?;
        let token = stored.access_token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(SecretString::from(token.to_string())))
    }

    /// Persist `token`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `TokenStoreError` if the file cannot be written.
    pub fn save(&self, token: &SecretString) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string(&StoredToken {
            access_token: token.expose_secret().to_string(),
        })?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }

    /// Remove the stored token. Removing a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `TokenStoreError` if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl AuthContext for TokenStore {
    fn token(&self) -> Option<SecretString> {
        match self.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read token file"
                );
                None
            }
        }
    }

    fn on_unauthorized(&self) {
        tracing::warn!(path = %self.path.display(), "Catalog rejected stored token, clearing it");
        if let Err(e) = self.clear() {
            tracing::error!(error = %e, "Failed to clear rejected token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("token.json"));

        assert!(store.load().unwrap().is_none());

        store.save(&SecretString::from("abc.def.ghi")).unwrap();
        let token = store.token().unwrap();
        assert_eq!(token.expose_secret(), "abc.def.ghi");

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(TOKEN_KEY));

        store.clear().unwrap();
        assert!(store.token().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_token_store_blank_token_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, r#"{"access_token": "   "}"#).unwrap();

        assert!(TokenStore::new(path).load().unwrap().is_none());
    }

    #[test]
    fn test_token_store_unauthorized_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        store.save(&SecretString::from("stale")).unwrap();

        store.on_unauthorized();

        assert!(store.token().is_none());
    }

    #[test]
    fn test_corrupt_token_file_reads_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "not json").unwrap();
        let store = TokenStore::new(path);

        assert!(store.load().is_err());
        assert!(store.token().is_none());
    }

    #[test]
    fn test_static_token_debug_redacts() {
        let token = StaticToken::new(SecretString::from("very-secret-token"));
        let debug_output = format!("{token:?}");
        assert!(!debug_output.contains("very-secret-token"));
        assert!(token.token().is_some());
    }
}
