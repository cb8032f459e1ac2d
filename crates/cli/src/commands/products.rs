//! Rail inspection and maintenance.
//!
//! # Usage
//!
//! ```bash
//! curator products list --tab latest
//! curator products search "linen" --tab top_selling --exclude-other
//! curator products order --tab latest 42 17 8
//! curator products reset --tab latest --yes
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_API_URL` - Base URL of the catalog REST API
//! - `CATALOG_API_TOKEN` - Static token (otherwise the token file is used)

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use curator_admin::catalog::{CatalogClient, fetch_all};
use curator_admin::config::CatalogConfig;
use curator_admin::prioritization::{SyncCoordinator, SyncReport, Workspace};
use curator_core::{Product, ProductId, RankBadge, RankSlot, SearchResult, Tab};

use super::CliError;

/// The CLI runs one command at a time, so searches fire immediately.
const NO_DEBOUNCE: Duration = Duration::ZERO;

fn client() -> Result<Arc<CatalogClient>, CliError> {
    let config = CatalogConfig::from_env()?;
    Ok(Arc::new(CatalogClient::from_config(&config)?))
}

async fn load(tab: Tab, exclude_other: bool) -> Result<Workspace<CatalogClient>, CliError> {
    let mut workspace = Workspace::new(client()?, tab, NO_DEBOUNCE);
    workspace.fetch_products().await?;
    workspace.set_exclude_other(exclude_other);
    Ok(workspace)
}

const fn badge_label(badge: RankBadge) -> &'static str {
    match badge {
        RankBadge::None => "",
        RankBadge::Active => "ranked",
        RankBadge::Other => "other rail",
        RankBadge::Dual => "dual status",
    }
}

fn format_slot(slot: RankSlot) -> String {
    slot.position.map_or_else(|| "-".to_string(), |p| p.to_string())
}

fn write_report(out: &mut impl Write, report: &SyncReport) -> std::io::Result<()> {
    writeln!(
        out,
        "{}: {} positioned, {} unranked, {} writes at {}",
        report.tab,
        report.positioned,
        report.unranked,
        report.patches_sent,
        report.completed_at.to_rfc3339()
    )
}

/// Print the sorted ranked view of `tab`.
pub async fn list(tab: Tab, exclude_other: bool) -> Result<(), CliError> {
    let workspace = load(tab, exclude_other).await?;
    let mut out = std::io::stdout().lock();
    for product in workspace.store().products() {
        writeln!(
            out,
            "{:>3}  {:<12} {}  {}",
            format_slot(product.slot(tab)),
            product.id.as_str(),
            product.name,
            badge_label(product.badge(tab))
        )?;
    }
    Ok(())
}

/// Print search results that could be added to `tab`.
pub async fn search(query: &str, tab: Tab, exclude_other: bool) -> Result<(), CliError> {
    let mut workspace = load(tab, exclude_other).await?;
    if let Some(handle) = workspace.search().input(query).await {
        // A panicked search task only loses its results
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Search task failed");
        }
    }
    if let Some(error) = workspace.search().state().await.error {
        tracing::error!("Search failed: {error}");
    }

    let results: Vec<SearchResult> = workspace.search_candidates().await;
    let mut out = std::io::stdout().lock();
    for result in &results {
        writeln!(out, "{:<12} {}", result.id.as_str(), result.name)?;
    }
    tracing::info!(results = results.len(), "Search complete");
    Ok(())
}

/// Clear `tab` on every product. Requires `yes`.
pub async fn reset(tab: Tab, yes: bool) -> Result<(), CliError> {
    if !yes {
        return Err(CliError::ConfirmationRequired("reset a rail"));
    }
    let mut workspace = Workspace::new(client()?, tab, NO_DEBOUNCE);
    workspace.reset_all_products(tab).await?;
    if let Some(report) = workspace.sync().last_report() {
        write_report(&mut std::io::stdout().lock(), report)?;
    }
    Ok(())
}

/// Persist `ids` as the order of `tab`.
///
/// Products not listed lose their rank on `tab`.
pub async fn order(tab: Tab, ids: &[String]) -> Result<(), CliError> {
    let client = client()?;
    let catalog = fetch_all(client.as_ref()).await?;
    let by_id: HashMap<&ProductId, &Product> = catalog.iter().map(|p| (&p.id, p)).collect();

    let ordered = ids
        .iter()
        .map(|id| {
            by_id
                .get(&ProductId::new(id.as_str()))
                .map(|product| (*product).clone())
                .ok_or_else(|| CliError::UnknownProduct(id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut sync = SyncCoordinator::default();
    let report = sync.save(client.as_ref(), tab, &ordered).await?;
    write_report(&mut std::io::stdout().lock(), &report)?;
    Ok(())
}
