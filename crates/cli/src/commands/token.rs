//! Access token management.
//!
//! # Usage
//!
//! ```bash
//! curator token set <TOKEN>
//! curator token show
//! curator token clear
//! ```
//!
//! # Environment Variables
//!
//! - `CURATOR_TOKEN_FILE` - Token file location (default: `.curator/token.json`)

use std::io::Write;

use curator_admin::catalog::TokenStore;
use curator_admin::config::token_file_from_env;
use secrecy::SecretString;

use super::CliError;

fn store() -> TokenStore {
    TokenStore::new(token_file_from_env())
}

/// Save `token` to the token file.
pub fn set(token: String) -> Result<(), CliError> {
    let store = store();
    store.save(&SecretString::from(token))?;
    tracing::info!("Token saved to {}", store.path().display());
    Ok(())
}

/// Delete the token file.
pub fn clear() -> Result<(), CliError> {
    let store = store();
    store.clear()?;
    tracing::info!("Token cleared from {}", store.path().display());
    Ok(())
}

/// Report whether a token is stored.
pub fn show() -> Result<(), CliError> {
    let store = store();
    let state = if store.load()?.is_some() {
        "stored"
    } else {
        "missing"
    };
    writeln!(std::io::stdout().lock(), "{}: {state}", store.path().display())?;
    Ok(())
}
