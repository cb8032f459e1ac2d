//! Ranking algorithms for the curated product rails.
//!
//! Everything here is pure: functions take the products they need and return
//! new orders or write plans. Network access lives in the admin crate.
//!
//! - [`order`] - Display order and the "exclude other rail" filter
//! - [`reorder`] - List splicing and drag gesture tracking
//! - [`plan`] - Mutation log and the write planners used by save/add/remove/reset

pub mod order;
pub mod plan;
pub mod reorder;

pub use order::{Ranked, exclude_other, is_ranked_elsewhere, sort_for_tab, sorted_for_tab};
pub use plan::{
    FieldValue, FieldWrite, MutationLog, RankPatch, SavePlan, next_position, plan_remove,
    plan_reset, plan_save, position_for_index,
};
pub use reorder::{DragPayload, DragSession, DropOutcome, ReorderError, reorder};

/// Number of ranked positions a rail exposes. Products beyond this window
/// keep their place in the working list but carry no position.
pub const RANK_WINDOW: usize = 50;
