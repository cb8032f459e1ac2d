//! Display order for a rail and the cross-rail exclusion filter.

use crate::types::{Product, RankSlot, SearchResult, Tab};

/// Anything that carries per-rail rank slots.
pub trait Ranked {
    /// The flag/position pair for `tab`.
    fn rank_slot(&self, tab: Tab) -> RankSlot;
}

impl Ranked for Product {
    fn rank_slot(&self, tab: Tab) -> RankSlot {
        self.slot(tab)
    }
}

impl Ranked for SearchResult {
    fn rank_slot(&self, tab: Tab) -> RankSlot {
        self.slot(tab)
    }
}

/// Sort key for the active rail.
///
/// Flagged before unflagged, then (flagged only) ascending position, then
/// positioned before unpositioned. Anything else is a tie.
fn sort_key(slot: RankSlot) -> (bool, bool, u32) {
    let position = if slot.flag {
        slot.position.unwrap_or(u32::MAX)
    } else {
        0
    };
    (!slot.flag, slot.position.is_none(), position)
}

/// Sort products in place into display order for `tab`.
///
/// The sort is stable, so ties keep the order the backend returned them in.
pub fn sort_for_tab<T: Ranked>(items: &mut [T], tab: Tab) {
    items.sort_by_key(|item| sort_key(item.rank_slot(tab)));
}

/// Owned variant of [`sort_for_tab`].
#[must_use]
pub fn sorted_for_tab<T: Ranked>(mut items: Vec<T>, tab: Tab) -> Vec<T> {
    sort_for_tab(&mut items, tab);
    items
}

/// Whether an item holds a rank on the rail other than `tab`.
///
/// Either half of the other rail's slot counts: a set flag or a non-null
/// position.
#[must_use]
pub fn is_ranked_elsewhere<T: Ranked>(item: &T, tab: Tab) -> bool {
    item.rank_slot(tab.other()).is_claimed()
}

/// Drop items already ranked on the other rail when `enabled`.
///
/// This is a view filter over an already-fetched list; it never touches the
/// backend.
#[must_use]
pub fn exclude_other<T: Ranked>(items: Vec<T>, tab: Tab, enabled: bool) -> Vec<T> {
    if !enabled {
        return items;
    }
    items
        .into_iter()
        .filter(|item| !is_ranked_elsewhere(item, tab))
        .collect()
}
