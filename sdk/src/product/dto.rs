//! Views of a product handed across the service boundary

use crate::entity::BigDecimal;
use crate::product::model::Product;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input for creating a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub image_url: String,
}

/// Row of a product listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListItem {
    pub guid: Uuid,
    pub name: String,
    pub image_url: String,
    pub price: Option<BigDecimal>,
    pub description: Option<String>,
    pub quantity: i32,
}

crate::entity_fields!(ProductListItem {
    guid: Uuid => "guid",
    name: String => "name",
    image_url: String => "imageUrl",
    price: Option<BigDecimal> => "price",
    description: Option<String> => "description",
    quantity: i32 => "quantity",
});

/// Single product view; same shape as a listing row for now
pub type ProductDetail = ProductListItem;

/// Quantity change for one product, also the queued message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateQty {
    pub guid: Uuid,
    pub quantity: i32,
}

impl ProductUpdateQty {
    pub fn new(guid: Uuid, quantity: i32) -> Self {
        Self { guid, quantity }
    }
}

impl From<Product> for ProductListItem {
    fn from(product: Product) -> Self {
        Self {
            guid: product.guid,
            name: product.name,
            image_url: product.image_url,
            price: product.price,
            description: product.description,
            quantity: product.quantity,
        }
    }
}

impl From<ProductListItem> for Product {
    fn from(item: ProductListItem) -> Self {
        Self {
            guid: item.guid,
            name: item.name,
            image_url: item.image_url,
            price: item.price,
            description: item.description,
            quantity: item.quantity,
        }
    }
}

impl ProductCreate {
    pub fn new(name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
        }
    }

    /// New product with a fresh id and nothing in stock
    pub fn into_product(self) -> Product {
        Product {
            guid: Uuid::new_v4(),
            name: self.name,
            image_url: self.image_url,
            price: None,
            description: None,
            quantity: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_yields_empty_stock() {
        let product =
            ProductCreate::new("Rivet", "https://cdn.example.com/rivet.png").into_product();
        assert_eq!(product.quantity, 0);
        assert_eq!(product.name, "Rivet");
        assert!(product.price.is_none());
    }

    #[test]
    fn update_message_wire_shape() {
        let guid = Uuid::nil();
        let encoded = serde_json::to_value(ProductUpdateQty::new(guid, 3)).unwrap();
        assert_eq!(encoded, json!({"guid": guid.to_string(), "quantity": 3}));
    }

    #[test]
    fn list_item_round_trips_through_entity() {
        let product = ProductCreate::new("Pin", "https://cdn.example.com/pin.png").into_product();
        let item = ProductListItem::from(product.clone());
        assert_eq!(Product::from(item), product);
    }
}
