//! Write planning for the curated rails.
//!
//! Every backend mutation is first recorded in a [`MutationLog`] as a queue
//! of `(product, field, value)` writes. The log is grouped into one PATCH per
//! product for replay, and can be compared against a fresh listing to find
//! writes the backend did not keep.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::{Map, Value};

use super::RANK_WINDOW;
use crate::types::{Product, ProductId, RankField, RankSlot, Tab};

/// Value written to a single rank field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Position(Option<u32>),
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Flag(flag) => Self::Bool(flag),
            FieldValue::Position(Some(position)) => Self::from(position),
            FieldValue::Position(None) => Self::Null,
        }
    }
}

/// One intended write: set `field` of `product_id` to `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldWrite {
    pub product_id: ProductId,
    pub field: RankField,
    pub value: FieldValue,
}

impl FieldWrite {
    /// Whether `product` already holds this value.
    #[must_use]
    pub fn is_reflected_by(&self, product: &Product) -> bool {
        let slot = product.slot(self.field.tab());
        match self.value {
            FieldValue::Flag(flag) => slot.flag == flag,
            FieldValue::Position(position) => slot.position == position,
        }
    }
}

/// The writes for one product, sent as a single PATCH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankPatch {
    pub product_id: ProductId,
    pub fields: Vec<(RankField, FieldValue)>,
}

impl RankPatch {
    /// JSON body for `PATCH /product/item/<id>/`.
    ///
    /// Null positions are serialized as explicit `null`s so the backend
    /// clears them.
    #[must_use]
    pub fn body(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(field, value)| (field.as_str().to_owned(), Value::from(*value)))
            .collect();
        Value::Object(map)
    }

    /// Apply the patch to a local copy of the product.
    pub fn apply_to(&self, product: &mut Product) {
        for (field, value) in &self.fields {
            let tab = field.tab();
            let mut slot = product.slot(tab);
            match value {
                FieldValue::Flag(flag) => slot.flag = *flag,
                FieldValue::Position(position) => slot.position = *position,
            }
            product.set_slot(tab, slot);
        }
    }
}

/// Ordered queue of intended rank writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MutationLog {
    writes: Vec<FieldWrite>,
}

impl MutationLog {
    #[must_use]
    pub const fn new() -> Self {
        Self { writes: Vec::new() }
    }

    pub fn push(&mut self, write: FieldWrite) {
        self.writes.push(write);
    }

    /// Record both halves of a rail's slot for one product.
    ///
    /// Flag and position are always written together, which keeps the
    /// "position iff flag" pairing intact on the backend.
    pub fn set_slot(&mut self, product_id: &ProductId, tab: Tab, slot: RankSlot) {
        self.push(FieldWrite {
            product_id: product_id.clone(),
            field: tab.flag_field(),
            value: FieldValue::Flag(slot.flag),
        });
        self.push(FieldWrite {
            product_id: product_id.clone(),
            field: tab.position_field(),
            value: FieldValue::Position(slot.position),
        });
    }

    #[must_use]
    pub fn writes(&self) -> &[FieldWrite] {
        &self.writes
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.writes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Append another log after this one.
    pub fn extend(&mut self, other: Self) {
        self.writes.extend(other.writes);
    }

    /// Group consecutive writes for the same product into PATCHes, in order.
    #[must_use]
    pub fn patches(&self) -> Vec<RankPatch> {
        let mut patches: Vec<RankPatch> = Vec::new();
        for write in &self.writes {
            match patches.last_mut() {
                Some(patch) if patch.product_id == write.product_id => {
                    patch.fields.push((write.field, write.value));
                }
                _ => patches.push(RankPatch {
                    product_id: write.product_id.clone(),
                    fields: vec![(write.field, write.value)],
                }),
            }
        }
        patches
    }

    /// Writes that `listing` contradicts.
    ///
    /// Only products present in `listing` are checked; a write for a product
    /// the listing does not include is neither confirmed nor contradicted.
    #[must_use]
    pub fn unconfirmed<'a>(&'a self, listing: &[Product]) -> Vec<&'a FieldWrite> {
        let by_id: HashMap<&ProductId, &Product> = listing.iter().map(|p| (&p.id, p)).collect();
        self.writes
            .iter()
            .filter(|write| {
                by_id
                    .get(&write.product_id)
                    .is_some_and(|product| !write.is_reflected_by(product))
            })
            .collect()
    }
}

/// Position assigned to the product at `index` of a working list.
///
/// Indices inside the rank window get dense 1-based positions; anything
/// beyond the window is left unpositioned.
#[must_use]
pub fn position_for_index(index: usize) -> Option<u32> {
    if index < RANK_WINDOW {
        u32::try_from(index + 1).ok()
    } else {
        None
    }
}

/// Position for a product appended to a list with `ranked_count` ranked
/// products, capped at the last slot of the window.
#[must_use]
pub fn next_position(ranked_count: usize) -> u32 {
    let next = ranked_count.saturating_add(1).min(RANK_WINDOW);
    u32::try_from(next).unwrap_or(u32::MAX)
}

/// Writes needed to persist a working list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavePlan {
    /// Products ranked on the backend but absent from the working list.
    pub unrank: MutationLog,
    /// Products whose computed slot differs from their last-known slot.
    pub positions: MutationLog,
}

impl SavePlan {
    /// Whether the backend already matches the working list.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.unrank.is_empty() && self.positions.is_empty()
    }

    /// Number of PATCH requests the plan will issue.
    #[must_use]
    pub fn patch_count(&self) -> usize {
        self.unrank.patches().len() + self.positions.patches().len()
    }
}

/// Plan the writes that make the backend match `ordered` on `tab`.
///
/// `backend` is the full catalog as just fetched. A product's last-known slot
/// is its backend record when present, its local copy otherwise.
#[must_use]
pub fn plan_save(tab: Tab, ordered: &[Product], backend: &[Product]) -> SavePlan {
    let wanted: HashSet<&ProductId> = ordered.iter().map(|p| &p.id).collect();
    let known: HashMap<&ProductId, RankSlot> =
        backend.iter().map(|p| (&p.id, p.slot(tab))).collect();

    let mut unrank = MutationLog::new();
    for product in backend {
        if !wanted.contains(&product.id) && product.slot(tab).is_claimed() {
            unrank.set_slot(&product.id, tab, RankSlot::UNRANKED);
        }
    }

    let mut positions = MutationLog::new();
    for (index, product) in ordered.iter().enumerate() {
        let target = RankSlot::from_position(position_for_index(index));
        let current = known
            .get(&product.id)
            .copied()
            .unwrap_or_else(|| product.slot(tab));
        if current != target {
            positions.set_slot(&product.id, tab, target);
        }
    }

    SavePlan { unrank, positions }
}

/// Clear one product's slot on `tab`.
#[must_use]
pub fn plan_remove(product_id: &ProductId, tab: Tab) -> MutationLog {
    let mut log = MutationLog::new();
    log.set_slot(product_id, tab, RankSlot::UNRANKED);
    log
}

/// Clear `tab` on every product, ranked or not.
#[must_use]
pub fn plan_reset(tab: Tab, catalog: &[Product]) -> MutationLog {
    let mut log = MutationLog::new();
    for product in catalog {
        log.set_slot(&product.id, tab, RankSlot::UNRANKED);
    }
    log
}
