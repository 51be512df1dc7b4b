//! Line items and the product descriptors they are captured from.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// A catalog product as handed to [`CartStore::add_item`](super::CartStore::add_item).
///
/// Field names follow the catalog's JSON. Unknown catalog fields (ratings and
/// the like) are ignored. `price` accepts a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Pre-rendered description attached by the catalog layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_description: Option<String>,
}

impl ProductDescriptor {
    /// Create a descriptor with empty image, category, and description.
    #[must_use]
    pub fn new(id: ProductId, title: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image: String::new(),
            category: String::new(),
            description: String::new(),
            display_description: None,
        }
    }

    /// Attach the description shown in the cart.
    #[must_use]
    pub fn with_display_description(mut self, description: impl Into<String>) -> Self {
        self.display_description = Some(description.into());
        self
    }

    /// The description a cart line captures: the display override if present.
    #[must_use]
    pub fn cart_description(&self) -> &str {
        self.display_description
            .as_deref()
            .unwrap_or(&self.description)
    }
}

/// One distinct product held in the cart.
///
/// Everything except `quantity` is captured when the product is first added
/// and never re-fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: ProductId,
    pub title: String,
    pub unit_price: Price,
    /// Always at least 1 while the item is in a cart.
    pub quantity: u32,
    pub image_url: String,
    pub description: String,
}

impl LineItem {
    /// A new line with quantity 1.
    #[must_use]
    pub fn from_product(product: &ProductDescriptor) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            unit_price: product.price,
            quantity: 1,
            image_url: product.image.clone(),
            description: product.cart_description().to_owned(),
        }
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}
