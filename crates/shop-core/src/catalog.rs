//! # Seed Catalog
//!
//! Categories and products loaded from `config/catalog.toml` at startup.

use crate::error::{ShopError, ShopResult};
use crate::product::NewProduct;
use crate::store::{CategoryRepository, ProductRepository, Store};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedCatalog {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub products: Vec<NewProduct>,
}

impl SeedCatalog {
    pub fn from_toml(toml_str: &str) -> ShopResult<Self> {
        toml::from_str(toml_str)
            .map_err(|e| ShopError::Configuration(format!("invalid catalog: {}", e)))
    }

    /// Insert everything into the store; returns the number of products added
    pub async fn load_into(self, store: &dyn Store) -> ShopResult<usize> {
        for name in &self.categories {
            store.ensure_category(name).await?;
        }
        let mut added = 0;
        for input in self.products {
            let product = input.validate()?;
            store.ensure_category(product.category.as_str()).await?;
            store.insert_product(product).await?;
            added += 1;
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    const CATALOG: &str = r#"
categories = ["Men", "Women"]

[[products]]
productName = "Classic Boxer"
productNumber = "BYC-001"
category = "Men"
productPrice = 250000
productStock = 5
productDescription = "Soft cotton boxer brief"
productImage = ["https://res.cloudinary.com/byc/boxer.png"]
sizes = ["M", "L"]
colors = ["Black", "White"]

[[products.stock]]
size = "M"
color = "Black"
quantity = 3

[[products.stock]]
size = "L"
color = "White"
quantity = 2
"#;

    #[tokio::test]
    async fn test_load_catalog() {
        let store = InMemoryStore::new();
        let catalog = SeedCatalog::from_toml(CATALOG).unwrap();
        assert_eq!(catalog.load_into(&store).await.unwrap(), 1);

        let products = store.list_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert!(products[0].has_variants());
        assert_eq!(store.list_categories().await.unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_catalog() {
        assert!(matches!(
            SeedCatalog::from_toml("products = 3"),
            Err(ShopError::Configuration(_))
        ));
    }
}
