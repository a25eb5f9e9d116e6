use crate::entity::{BigDecimal, EntityStore, StoreProvider};
use crate::product::Product;
use crate::testing::MemoryStoreProvider;
use uuid::Uuid;

/// Utility functions for creating mock catalog data for testing

/// Create a mock product with the given name and stock.
///
/// The image URL is derived from the name and the price is left empty.
///
/// # Example
///
/// ```rust
/// use catalog_sdk::testing::mock_product;
///
/// let bolt = mock_product("Hex bolt", 120);
/// assert_eq!(bolt.quantity, 120);
/// ```
pub fn mock_product(name: &str, quantity: i32) -> Product {
    Product {
        guid: Uuid::new_v4(),
        name: name.to_string(),
        image_url: format!(
            "https://cdn.example.com/{}.png",
            name.to_lowercase().replace(' ', "-")
        ),
        price: None,
        description: None,
        quantity,
    }
}

/// Create a mock product with a price (decimal text, e.g. `"12.50"`)
pub fn mock_priced_product(name: &str, price: &str, quantity: i32) -> Product {
    Product {
        price: price.parse::<BigDecimal>().ok(),
        ..mock_product(name, quantity)
    }
}

/// Insert `count` products named `Product 01`, `Product 02`, ... and return
/// them in insertion order
pub async fn seed_products(provider: &MemoryStoreProvider, count: usize) -> Vec<Product> {
    let products: Vec<Product> = (1..=count)
        .map(|i| mock_product(&format!("Product {:02}", i), i as i32))
        .collect();
    insert_products(provider, &products).await;
    products
}

/// Store the given products through a fresh scope
pub async fn insert_products(provider: &MemoryStoreProvider, products: &[Product]) {
    let scope = provider
        .create_scope()
        .expect("memory provider always opens a scope");
    scope
        .store()
        .upsert_many(products)
        .await
        .expect("memory database accepts products");
}
