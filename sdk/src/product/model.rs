//! Entity: Product

use crate::entity::{BigDecimal, Entity};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entity: Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct Product {
    #[builder(default = "Uuid::new_v4()")]
    pub guid: Uuid,
    pub name: String,
    /// URL of the main product image
    pub image_url: String,
    #[builder(default)]
    pub price: Option<BigDecimal>,
    #[builder(default)]
    pub description: Option<String>,
    #[builder(default)]
    pub quantity: i32,
}

crate::entity_fields!(Product {
    guid: Uuid => "guid",
    name: String => "name",
    image_url: String => "imageUrl",
    price: Option<BigDecimal> => "price",
    description: Option<String> => "description",
    quantity: i32 => "quantity",
});

impl Entity for Product {
    type Id = Uuid;
    const TABLE_NAME: &'static str = "product";

    fn id(&self) -> &Self::Id {
        &self.guid
    }
}

impl Product {
    pub fn builder() -> ProductBuilder {
        ProductBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{FieldRegistry, FieldValue, ScalarType};
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn builder_fills_defaults() {
        let product = Product::builder()
            .name("Hex bolt")
            .image_url("https://cdn.example.com/bolt.png")
            .build()
            .unwrap();

        assert_eq!(product.quantity, 0);
        assert!(product.price.is_none());
        assert!(!product.guid.is_nil());
    }

    #[test]
    fn serializes_camel_case() {
        let product = Product::builder()
            .guid(Uuid::nil())
            .name("Washer")
            .image_url("https://cdn.example.com/washer.png")
            .price(Some(BigDecimal::from_str("0.15").unwrap()))
            .quantity(500)
            .build()
            .unwrap();

        let value = product.to_json().unwrap();
        assert_eq!(value["imageUrl"], json!("https://cdn.example.com/washer.png"));
        assert_eq!(value["quantity"], json!(500));
        assert_eq!(Product::from_json(value).unwrap(), product);
    }

    #[test]
    fn registry_describes_every_column() {
        let price = Product::find_field("Price").unwrap();
        assert_eq!(price.field_type.scalar, ScalarType::Decimal);
        assert!(price.field_type.nullable);
        assert_eq!(Product::find_field("IMAGEURL").map(|f| f.name), Some("imageUrl"));

        let product = Product::builder()
            .name("Nut")
            .image_url("https://cdn.example.com/nut.png")
            .build()
            .unwrap();
        assert_eq!(product.field_value("description"), Some(FieldValue::Null));
        assert_eq!(product.field_value("guid"), Some(FieldValue::Id(product.guid)));
    }
}
