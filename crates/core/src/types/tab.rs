//! Product rails and the rank slot each rail owns on a product.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A curated product rail.
///
/// Each rail stores its own flag/position pair on the product, so a product
/// can be ranked on both rails at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// "Top selling" rail (`top_selling_items` / `top_selling_position`).
    #[default]
    TopSelling,
    /// "Latest" rail (`latest_item` / `latest_item_position`).
    Latest,
}

impl Tab {
    /// Every rail, in display order.
    pub const ALL: [Self; 2] = [Self::TopSelling, Self::Latest];

    /// The rail that is not `self`.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::TopSelling => Self::Latest,
            Self::Latest => Self::TopSelling,
        }
    }

    /// Backend field holding this rail's boolean flag.
    #[must_use]
    pub const fn flag_field(self) -> RankField {
        match self {
            Self::TopSelling => RankField::TopSellingItems,
            Self::Latest => RankField::LatestItem,
        }
    }

    /// Backend field holding this rail's position.
    #[must_use]
    pub const fn position_field(self) -> RankField {
        match self {
            Self::TopSelling => RankField::TopSellingPosition,
            Self::Latest => RankField::LatestItemPosition,
        }
    }

    /// Wire name of the rail.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopSelling => "top_selling",
            Self::Latest => "latest",
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown rail name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tab: {0} (expected top_selling or latest)")]
pub struct TabParseError(pub String);

impl std::str::FromStr for Tab {
    type Err = TabParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top_selling" | "top-selling" => Ok(Self::TopSelling),
            "latest" => Ok(Self::Latest),
            _ => Err(TabParseError(s.to_owned())),
        }
    }
}

/// One of the four rank fields a product carries on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankField {
    TopSellingItems,
    TopSellingPosition,
    LatestItem,
    LatestItemPosition,
}

impl RankField {
    /// JSON key used in PATCH bodies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopSellingItems => "top_selling_items",
            Self::TopSellingPosition => "top_selling_position",
            Self::LatestItem => "latest_item",
            Self::LatestItemPosition => "latest_item_position",
        }
    }

    /// Rail this field belongs to.
    #[must_use]
    pub const fn tab(self) -> Tab {
        match self {
            Self::TopSellingItems | Self::TopSellingPosition => Tab::TopSelling,
            Self::LatestItem | Self::LatestItemPosition => Tab::Latest,
        }
    }
}

/// A rail's flag/position pair on a single product.
///
/// Positions are 1-based. A well-formed slot has a position if and only if
/// the flag is set; [`RankSlot::ranked`] and [`RankSlot::UNRANKED`] are the
/// only two shapes the planner ever writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RankSlot {
    pub flag: bool,
    pub position: Option<u32>,
}

impl RankSlot {
    /// Flag cleared, position null.
    pub const UNRANKED: Self = Self {
        flag: false,
        position: None,
    };

    /// Flag set at the given 1-based position.
    #[must_use]
    pub const fn ranked(position: u32) -> Self {
        Self {
            flag: true,
            position: Some(position),
        }
    }

    /// Slot for an optional position: ranked when present, unranked otherwise.
    #[must_use]
    pub const fn from_position(position: Option<u32>) -> Self {
        match position {
            Some(position) => Self::ranked(position),
            None => Self::UNRANKED,
        }
    }

    /// Whether either half of the slot marks the product as ranked.
    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        self.flag || self.position.is_some()
    }
}
