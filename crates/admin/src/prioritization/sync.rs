//! Reconciles a working list with the catalog backend.
//!
//! A save runs as a small state machine:
//!
//! ```text
//! Idle -> FetchingAll -> UnrankingRemoved -> WritingPositions -> Done
//!              \               \                   \
//!               +---------------+-------------------+--> Failed
//! ```
//!
//! Writes are sent one at a time. The first failing PATCH stops the run;
//! writes already acknowledged stay applied, there is no rollback. Re-running
//! the save converges because planning only emits writes that differ from
//! the backend.

use chrono::{DateTime, Utc};
use curator_core::ranking::{MutationLog, next_position, plan_remove, plan_reset, plan_save};
use curator_core::{Product, ProductId, RankSlot, Tab};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::catalog::{CatalogBackend, CatalogError, fetch_all};

/// Phase of the current (or last) sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    #[default]
    Idle,
    FetchingAll,
    UnrankingRemoved,
    WritingPositions,
    Done,
    Failed,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::FetchingAll => "fetching_all",
            Self::UnrankingRemoved => "unranking_removed",
            Self::WritingPositions => "writing_positions",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A sync run that stopped part-way.
#[derive(Debug, Error)]
#[error("{phase} failed after {applied} successful writes: {source}")]
pub struct SyncError {
    /// Phase that was running when the failure happened.
    pub phase: SyncPhase,
    /// PATCH requests acknowledged before the failure (not rolled back).
    pub applied: usize,
    #[source]
    pub source: CatalogError,
}

/// Outcome of a completed sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub tab: Tab,
    /// Products whose slot was cleared because they left the list.
    pub unranked: usize,
    /// Products whose slot was (re)written.
    pub positioned: usize,
    /// Total PATCH requests sent.
    pub patches_sent: usize,
    pub completed_at: DateTime<Utc>,
    /// Every write the run intended, in send order.
    #[serde(skip)]
    pub log: MutationLog,
}

/// Drives save/add/remove/reset against the backend.
#[derive(Debug, Default)]
pub struct SyncCoordinator {
    phase: SyncPhase,
    last_report: Option<SyncReport>,
}

impl SyncCoordinator {
    #[must_use]
    pub const fn phase(&self) -> SyncPhase {
        self.phase
    }

    #[must_use]
    pub const fn last_report(&self) -> Option<&SyncReport> {
        self.last_report.as_ref()
    }

    fn enter(&mut self, phase: SyncPhase) {
        tracing::debug!(from = %self.phase, to = %phase, "Sync phase");
        self.phase = phase;
    }

    fn fail(&mut self, applied: usize, source: CatalogError) -> SyncError {
        let error = SyncError {
            phase: self.phase,
            applied,
            source,
        };
        tracing::error!(error = %error, "Sync failed");
        self.phase = SyncPhase::Failed;
        error
    }

    /// Persist `ordered` as the order of `tab`.
    ///
    /// Scans the whole catalog first, because `ordered` may be a filtered
    /// view, then clears products that left the list and writes positions
    /// that changed.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` carrying the failing phase and how many writes
    /// were already applied.
    #[instrument(skip(self, backend, ordered), fields(tab = %tab, products = ordered.len()))]
    pub async fn save<B: CatalogBackend>(
        &mut self,
        backend: &B,
        tab: Tab,
        ordered: &[Product],
    ) -> Result<SyncReport, SyncError> {
        self.enter(SyncPhase::FetchingAll);
        let catalog = match fetch_all(backend).await {
            Ok(catalog) => catalog,
            Err(e) => return Err(self.fail(0, e)),
        };

        let plan = plan_save(tab, ordered, &catalog);
        let unranked = plan.unrank.patches().len();
        let positioned = plan.positions.patches().len();

        self.enter(SyncPhase::UnrankingRemoved);
        let mut applied = self.replay(backend, &plan.unrank, 0).await?;

        self.enter(SyncPhase::WritingPositions);
        applied = self.replay(backend, &plan.positions, applied).await?;

        let mut log = plan.unrank;
        log.extend(plan.positions);
        Ok(self.finish(tab, unranked, positioned, applied, log))
    }

    /// Rank a single product at the end of `tab`'s window.
    ///
    /// The position is `ranked_count + 1`, capped at the window size.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the PATCH fails.
    #[instrument(skip(self, backend), fields(tab = %tab, product_id = %product_id))]
    pub async fn add<B: CatalogBackend>(
        &mut self,
        backend: &B,
        tab: Tab,
        product_id: &ProductId,
        ranked_count: usize,
    ) -> Result<RankSlot, SyncError> {
        let slot = RankSlot::ranked(next_position(ranked_count));
        let mut log = MutationLog::new();
        log.set_slot(product_id, tab, slot);

        self.enter(SyncPhase::WritingPositions);
        let applied = self.replay(backend, &log, 0).await?;
        self.finish(tab, 0, 1, applied, log);
        Ok(slot)
    }

    /// Clear one product's slot on `tab`. The other rail is untouched.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the PATCH fails.
    #[instrument(skip(self, backend), fields(tab = %tab, product_id = %product_id))]
    pub async fn remove<B: CatalogBackend>(
        &mut self,
        backend: &B,
        tab: Tab,
        product_id: &ProductId,
    ) -> Result<SyncReport, SyncError> {
        let log = plan_remove(product_id, tab);

        self.enter(SyncPhase::UnrankingRemoved);
        let applied = self.replay(backend, &log, 0).await?;
        Ok(self.finish(tab, 1, 0, applied, log))
    }

    /// Clear `tab` on every product in the catalog, ranked or not.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the scan or any PATCH fails.
    #[instrument(skip(self, backend), fields(tab = %tab))]
    pub async fn reset<B: CatalogBackend>(
        &mut self,
        backend: &B,
        tab: Tab,
    ) -> Result<SyncReport, SyncError> {
        self.enter(SyncPhase::FetchingAll);
        let catalog = match fetch_all(backend).await {
            Ok(catalog) => catalog,
            Err(e) => return Err(self.fail(0, e)),
        };

        let log = plan_reset(tab, &catalog);
        let cleared = log.patches().len();

        self.enter(SyncPhase::UnrankingRemoved);
        let applied = self.replay(backend, &log, 0).await?;
        Ok(self.finish(tab, cleared, 0, applied, log))
    }

    /// Send `log` one PATCH at a time, stopping at the first failure.
    ///
    /// `applied` is the running count from earlier phases of the same run.
    async fn replay<B: CatalogBackend>(
        &mut self,
        backend: &B,
        log: &MutationLog,
        mut applied: usize,
    ) -> Result<usize, SyncError> {
        for patch in log.patches() {
            if let Err(e) = backend.patch_product(&patch).await {
                return Err(self.fail(applied, e));
            }
            applied += 1;
        }
        Ok(applied)
    }

    fn finish(
        &mut self,
        tab: Tab,
        unranked: usize,
        positioned: usize,
        patches_sent: usize,
        log: MutationLog,
    ) -> SyncReport {
        self.enter(SyncPhase::Done);
        let report = SyncReport {
            tab,
            unranked,
            positioned,
            patches_sent,
            completed_at: Utc::now(),
            log,
        };
        tracing::info!(
            tab = %tab,
            unranked,
            positioned,
            patches_sent,
            "Sync complete"
        );
        self.last_report = Some(report.clone());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::{MemoryCatalog, plain, ranked};

    #[tokio::test]
    async fn test_save_sixty_candidates() {
        let products: Vec<Product> = (0..60)
            .map(|i| ranked(&format!("p{i}"), Tab::TopSelling, 60 - i))
            .collect();
        let catalog = MemoryCatalog::new(products.clone()).with_page_size(25);
        let mut sync = SyncCoordinator::default();

        let report = sync.save(&catalog, Tab::TopSelling, &products).await.unwrap();

        assert_eq!(report.patches_sent, 60);
        assert_eq!(sync.phase(), SyncPhase::Done);
        for (index, product) in products.iter().enumerate() {
            let slot = catalog.product(product.id.as_str()).slot(Tab::TopSelling);
            if index < 50 {
                assert_eq!(slot, RankSlot::ranked(u32::try_from(index + 1).unwrap()));
            } else {
                assert_eq!(slot, RankSlot::UNRANKED);
            }
        }
    }

    #[tokio::test]
    async fn test_save_twice_sends_nothing_second_time() {
        let catalog = MemoryCatalog::new(vec![
            ranked("a", Tab::Latest, 2),
            ranked("b", Tab::Latest, 1),
            plain("c"),
        ]);
        let ordered = vec![plain("c"), catalog.product("a"), catalog.product("b")];
        let mut sync = SyncCoordinator::default();

        let first = sync.save(&catalog, Tab::Latest, &ordered).await.unwrap();
        assert_eq!(first.patches_sent, 2);
        catalog.clear_patches();

        let second = sync.save(&catalog, Tab::Latest, &ordered).await.unwrap();
        assert_eq!(second.patches_sent, 0);
        assert!(catalog.patches().is_empty());
    }

    #[tokio::test]
    async fn test_save_unranks_products_missing_from_list() {
        let catalog = MemoryCatalog::new(vec![
            ranked("stay", Tab::Latest, 1),
            ranked("gone", Tab::Latest, 2).with_slot(Tab::TopSelling, RankSlot::ranked(4)),
        ])
        .with_page_size(1);
        let ordered = vec![catalog.product("stay")];
        let mut sync = SyncCoordinator::default();

        let report = sync.save(&catalog, Tab::Latest, &ordered).await.unwrap();

        assert_eq!(report.unranked, 1);
        let gone = catalog.product("gone");
        assert_eq!(gone.slot(Tab::Latest), RankSlot::UNRANKED);
        assert_eq!(gone.slot(Tab::TopSelling), RankSlot::ranked(4));
    }

    #[tokio::test]
    async fn test_failed_patch_stops_without_rollback() {
        let catalog = MemoryCatalog::new(vec![plain("a"), plain("b"), plain("c")]).failing_patch(2);
        let ordered = catalog.products();
        let mut sync = SyncCoordinator::default();

        let err = sync.save(&catalog, Tab::TopSelling, &ordered).await.unwrap_err();

        assert_eq!(err.phase, SyncPhase::WritingPositions);
        assert_eq!(err.applied, 1);
        assert_eq!(sync.phase(), SyncPhase::Failed);
        assert_eq!(catalog.patches().len(), 2);
        assert_eq!(catalog.product("a").slot(Tab::TopSelling), RankSlot::ranked(1));
        assert_eq!(catalog.product("c").slot(Tab::TopSelling), RankSlot::UNRANKED);
    }

    #[tokio::test]
    async fn test_missing_token_fails_in_fetch_phase() {
        let catalog = MemoryCatalog::new(vec![plain("a")]).logged_out();
        let mut sync = SyncCoordinator::default();

        let err = sync.save(&catalog, Tab::Latest, &[]).await.unwrap_err();

        assert_eq!(err.phase, SyncPhase::FetchingAll);
        assert!(matches!(err.source, CatalogError::MissingToken));
    }

    #[tokio::test]
    async fn test_remove_keeps_other_rail() {
        let catalog = MemoryCatalog::new(vec![
            ranked("dual", Tab::TopSelling, 1).with_slot(Tab::Latest, RankSlot::ranked(3)),
        ]);
        let mut sync = SyncCoordinator::default();

        sync.remove(&catalog, Tab::TopSelling, &ProductId::new("dual"))
            .await
            .unwrap();

        let dual = catalog.product("dual");
        assert_eq!(dual.slot(Tab::TopSelling), RankSlot::UNRANKED);
        assert_eq!(dual.slot(Tab::Latest), RankSlot::ranked(3));
    }

    #[tokio::test]
    async fn test_reset_latest_never_touches_top_selling() {
        let catalog = MemoryCatalog::new(vec![
            ranked("a", Tab::Latest, 1).with_slot(Tab::TopSelling, RankSlot::ranked(2)),
            ranked("b", Tab::TopSelling, 1),
            plain("c"),
        ])
        .with_page_size(2);
        let mut sync = SyncCoordinator::default();

        let report = sync.reset(&catalog, Tab::Latest).await.unwrap();

        assert_eq!(report.patches_sent, 3);
        for patch in catalog.patches() {
            assert!(patch.fields.iter().all(|(field, _)| field.tab() == Tab::Latest));
        }
        assert_eq!(catalog.product("a").slot(Tab::TopSelling), RankSlot::ranked(2));
        assert_eq!(catalog.product("b").slot(Tab::TopSelling), RankSlot::ranked(1));
        assert!(catalog.products().iter().all(|p| p.slot(Tab::Latest) == RankSlot::UNRANKED));
    }

    #[tokio::test]
    async fn test_add_caps_position_at_window() {
        let catalog = MemoryCatalog::new(vec![plain("new")]);
        let mut sync = SyncCoordinator::default();

        let slot = sync
            .add(&catalog, Tab::Latest, &ProductId::new("new"), 57)
            .await
            .unwrap();

        assert_eq!(slot, RankSlot::ranked(50));
        assert_eq!(catalog.product("new").slot(Tab::Latest), RankSlot::ranked(50));
    }
}
