//! Core types for Curator.
//!
//! This module provides type-safe wrappers for the catalog concepts the
//! prioritization tool works with.

pub mod id;
pub mod page;
pub mod product;
pub mod tab;

pub use id::*;
pub use page::Page;
pub use product::{Product, RankBadge, SearchResult};
pub use tab::{RankField, RankSlot, Tab, TabParseError};
