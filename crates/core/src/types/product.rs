//! Product shapes returned by the catalog backend.

use serde::{Deserialize, Serialize};

use super::{ProductId, RankSlot, Tab};

/// A product as seen by the prioritization tool.
///
/// Only the fields the tool reads are modelled; everything else the backend
/// returns is ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    /// Primary image URL.
    #[serde(default, alias = "primary_image", alias = "image_url")]
    pub image: Option<String>,
    #[serde(default)]
    pub top_selling_items: bool,
    #[serde(default)]
    pub top_selling_position: Option<u32>,
    #[serde(default)]
    pub latest_item: bool,
    #[serde(default)]
    pub latest_item_position: Option<u32>,
}

impl Product {
    /// Create an unranked product.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: None,
            top_selling_items: false,
            top_selling_position: None,
            latest_item: false,
            latest_item_position: None,
        }
    }

    /// Builder-style setter for a rail's slot.
    #[must_use]
    pub fn with_slot(mut self, tab: Tab, slot: RankSlot) -> Self {
        self.set_slot(tab, slot);
        self
    }

    /// The flag/position pair this product holds on `tab`.
    #[must_use]
    pub const fn slot(&self, tab: Tab) -> RankSlot {
        match tab {
            Tab::TopSelling => RankSlot {
                flag: self.top_selling_items,
                position: self.top_selling_position,
            },
            Tab::Latest => RankSlot {
                flag: self.latest_item,
                position: self.latest_item_position,
            },
        }
    }

    /// Overwrite the flag/position pair on `tab`, leaving the other rail alone.
    pub const fn set_slot(&mut self, tab: Tab, slot: RankSlot) {
        match tab {
            Tab::TopSelling => {
                self.top_selling_items = slot.flag;
                self.top_selling_position = slot.position;
            }
            Tab::Latest => {
                self.latest_item = slot.flag;
                self.latest_item_position = slot.position;
            }
        }
    }

    /// Badge to show for this product while `tab` is active.
    #[must_use]
    pub const fn badge(&self, tab: Tab) -> RankBadge {
        match (
            self.slot(tab).is_claimed(),
            self.slot(tab.other()).is_claimed(),
        ) {
            (true, true) => RankBadge::Dual,
            (true, false) => RankBadge::Active,
            (false, true) => RankBadge::Other,
            (false, false) => RankBadge::None,
        }
    }
}

/// Ranking status of a product relative to the active rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBadge {
    None,
    /// Ranked on the active rail only.
    Active,
    /// Ranked on the other rail only.
    Other,
    /// Ranked on both rails.
    Dual,
}

/// Lighter product shape returned by the admin search endpoint.
///
/// Rank fields are optional; a missing field means "not ranked".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "primary_image", alias = "image_url")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_selling_items: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_selling_position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_item: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_item_position: Option<u32>,
}

impl SearchResult {
    /// The flag/position pair this result reports for `tab`.
    #[must_use]
    pub fn slot(&self, tab: Tab) -> RankSlot {
        match tab {
            Tab::TopSelling => RankSlot {
                flag: self.top_selling_items.unwrap_or(false),
                position: self.top_selling_position,
            },
            Tab::Latest => RankSlot {
                flag: self.latest_item.unwrap_or(false),
                position: self.latest_item_position,
            },
        }
    }
}

impl From<SearchResult> for Product {
    fn from(result: SearchResult) -> Self {
        Self {
            id: result.id,
            name: result.name,
            image: result.image,
            top_selling_items: result.top_selling_items.unwrap_or(false),
            top_selling_position: result.top_selling_position,
            latest_item: result.latest_item.unwrap_or(false),
            latest_item_position: result.latest_item_position,
        }
    }
}

impl From<Product> for SearchResult {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            image: product.image,
            top_selling_items: Some(product.top_selling_items),
            top_selling_position: product.top_selling_position,
            latest_item: Some(product.latest_item),
            latest_item_position: product.latest_item_position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_with_missing_rank_fields() {
        let product: Product =
            serde_json::from_str(r#"{"id": 7, "name": "Linen Shirt", "price": "49.00"}"#).unwrap();

        assert_eq!(product.id, ProductId::new("7"));
        assert_eq!(product.slot(Tab::TopSelling), RankSlot::UNRANKED);
        assert_eq!(product.slot(Tab::Latest), RankSlot::UNRANKED);
    }

    #[test]
    fn test_set_slot_leaves_other_tab_untouched() {
        let mut product = Product::new("1", "Tote")
            .with_slot(Tab::TopSelling, RankSlot::ranked(4))
            .with_slot(Tab::Latest, RankSlot::ranked(2));

        product.set_slot(Tab::TopSelling, RankSlot::UNRANKED);

        assert_eq!(product.slot(Tab::TopSelling), RankSlot::UNRANKED);
        assert_eq!(product.slot(Tab::Latest), RankSlot::ranked(2));
    }

    #[test]
    fn test_badge() {
        let dual = Product::new("1", "a")
            .with_slot(Tab::TopSelling, RankSlot::ranked(1))
            .with_slot(Tab::Latest, RankSlot::ranked(1));
        let latest_only = Product::new("2", "b").with_slot(Tab::Latest, RankSlot::ranked(3));

        assert_eq!(dual.badge(Tab::TopSelling), RankBadge::Dual);
        assert_eq!(latest_only.badge(Tab::TopSelling), RankBadge::Other);
        assert_eq!(latest_only.badge(Tab::Latest), RankBadge::Active);
        assert_eq!(Product::new("3", "c").badge(Tab::Latest), RankBadge::None);
    }

    #[test]
    fn test_search_result_without_flags_is_unranked() {
        let result: SearchResult = serde_json::from_str(r#"{"id": "9", "name": "Cap"}"#).unwrap();
        let product = Product::from(result);

        assert!(!product.top_selling_items);
        assert!(!product.latest_item);
        assert_eq!(product.latest_item_position, None);
    }
}
