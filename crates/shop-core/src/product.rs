//! # Product Types
//!
//! Catalog documents: products, their variant stock and reviews.
//!
//! Stock is a flat counter (`product_stock`) plus an optional list of
//! (size, color, quantity) entries. When variant entries exist the flat
//! counter always equals their sum; `take` and `restore` update both.

use crate::error::{ShopError, ShopResult};
use crate::validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Garment size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Size {
    S,
    M,
    L,
    XL,
    XXL,
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
            Size::XL => "XL",
            Size::XXL => "XXL",
        };
        f.write_str(s)
    }
}

/// Garment color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Green,
    Black,
    White,
    Yellow,
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Top-level catalog section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryName {
    Men,
    Women,
    Children,
}

impl CategoryName {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryName::Men => "Men",
            CategoryName::Women => "Women",
            CategoryName::Children => "Children",
        }
    }
}

/// Quantity held for one (size, color) combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantStock {
    pub size: Size,
    pub color: Color,
    pub quantity: u32,
}

/// A customer review embedded in a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub rating: u8,
    /// Author user id
    pub author: String,
    pub date: DateTime<Utc>,
}

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,

    pub product_name: String,

    /// Merchant SKU / style number
    pub product_number: String,

    pub category: CategoryName,

    /// Unit price in smallest currency unit
    pub product_price: i64,

    /// Flat stock counter (sum of `stock` when variants exist)
    pub product_stock: u32,

    pub product_image: Vec<String>,

    pub product_description: String,

    /// Merchant-controlled availability switch
    pub in_stock: bool,

    /// Average review rating
    pub ratings: f64,

    pub total_reviews: u32,

    #[serde(default)]
    pub sizes: Vec<Size>,

    #[serde(default)]
    pub colors: Vec<Color>,

    /// Per-variant stock
    #[serde(default)]
    pub stock: Vec<VariantStock>,

    #[serde(default)]
    pub reviews: Vec<Review>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether stock is tracked per (size, color)
    pub fn has_variants(&self) -> bool {
        !self.stock.is_empty()
    }

    fn variant(&self, size: Size, color: Color) -> Option<&VariantStock> {
        self.stock
            .iter()
            .find(|v| v.size == size && v.color == color)
    }

    fn variant_mut(&mut self, size: Size, color: Color) -> Option<&mut VariantStock> {
        self.stock
            .iter_mut()
            .find(|v| v.size == size && v.color == color)
    }

    /// Units available for the requested variant (or the flat counter)
    pub fn available(&self, size: Option<Size>, color: Option<Color>) -> u32 {
        match (size, color) {
            (Some(s), Some(c)) if self.has_variants() => {
                self.variant(s, c).map(|v| v.quantity).unwrap_or(0)
            }
            _ => self.product_stock,
        }
    }

    /// Checks that the product is offered in the given variant
    pub fn check_variant(&self, size: Option<Size>, color: Option<Color>) -> ShopResult<()> {
        if let Some(s) = size {
            if !self.sizes.contains(&s) {
                return Err(ShopError::InvalidVariant {
                    product: self.product_name.clone(),
                    detail: format!("Invalid size: {}", s),
                });
            }
        }
        if let Some(c) = color {
            if !self.colors.contains(&c) {
                return Err(ShopError::InvalidVariant {
                    product: self.product_name.clone(),
                    detail: format!("Invalid color: {}", c),
                });
            }
        }
        if self.has_variants() && (size.is_none() || color.is_none()) {
            return Err(ShopError::InvalidVariant {
                product: self.product_name.clone(),
                detail: "size and color are required".to_string(),
            });
        }
        Ok(())
    }

    /// Full availability check used before taking stock for an order
    pub fn check_available(
        &self,
        quantity: u32,
        size: Option<Size>,
        color: Option<Color>,
    ) -> ShopResult<()> {
        if !self.in_stock {
            return Err(ShopError::OutOfStock {
                product: self.product_name.clone(),
            });
        }
        self.check_variant(size, color)?;

        let available = self.available(size, color);
        if available < quantity {
            return Err(ShopError::InsufficientStock {
                product: self.product_name.clone(),
                available,
                requested: quantity,
            });
        }
        Ok(())
    }

    /// Decrement stock; the caller must have run `check_available`
    pub fn take(&mut self, quantity: u32, size: Option<Size>, color: Option<Color>) {
        if let (Some(s), Some(c)) = (size, color) {
            if let Some(v) = self.variant_mut(s, c) {
                v.quantity = v.quantity.saturating_sub(quantity);
            }
        }
        self.product_stock = self.product_stock.saturating_sub(quantity);
        self.updated_at = Utc::now();
    }

    /// Return previously taken units
    pub fn restore(&mut self, quantity: u32, size: Option<Size>, color: Option<Color>) {
        if let (Some(s), Some(c)) = (size, color) {
            if let Some(v) = self.variant_mut(s, c) {
                v.quantity += quantity;
            }
        }
        self.product_stock += quantity;
        self.updated_at = Utc::now();
    }

    /// Add a review, one per author, and refresh the rating aggregates
    pub fn add_review(&mut self, author: &str, review: NewReview) -> ShopResult<()> {
        let review = review.validate()?;
        if self.reviews.iter().any(|r| r.author == author) {
            return Err(ShopError::Conflict(
                "You have already reviewed this product".to_string(),
            ));
        }

        self.reviews.push(Review {
            id: Uuid::new_v4().to_string(),
            title: review.title,
            description: review.description,
            rating: review.rating,
            author: author.to_string(),
            date: Utc::now(),
        });

        self.total_reviews = self.reviews.len() as u32;
        let sum: u32 = self.reviews.iter().map(|r| r.rating as u32).sum();
        self.ratings = sum as f64 / self.reviews.len() as f64;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn variant_total(stock: &[VariantStock]) -> u32 {
    stock.iter().map(|v| v.quantity).sum()
}

fn check_images(images: &[String]) -> ShopResult<Vec<String>> {
    if images.is_empty() {
        return Err(ShopError::validation("productImage must be a non-empty array of URLs"));
    }
    images
        .iter()
        .map(|url| validate::image_url("image URL", url))
        .collect()
}

/// Request body for creating a product
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub product_name: String,
    pub product_number: String,
    pub category: CategoryName,
    pub product_price: i64,
    pub product_stock: u32,
    pub product_description: String,
    pub product_image: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<Size>,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub stock: Vec<VariantStock>,
}

impl NewProduct {
    /// Validate and build the stored document
    pub fn validate(self) -> ShopResult<Product> {
        let product_name = validate::length("productName", &self.product_name, 3, 50)?;
        let product_number = validate::length("productNumber", &self.product_number, 3, 50)?;
        let product_description =
            validate::length("productDescription", &self.product_description, 10, 500)?;
        let product_image = check_images(&self.product_image)?;

        if self.product_price < 0 {
            return Err(ShopError::validation(
                "Product price must be a non-negative number",
            ));
        }
        if self.product_stock < 1 {
            return Err(ShopError::validation("Stock must be at least 1"));
        }

        if !self.stock.is_empty() {
            let sum = variant_total(&self.stock);
            if sum != self.product_stock {
                return Err(ShopError::validation(format!(
                    "Sum of stock quantities ({}) must equal productStock ({})",
                    sum, self.product_stock
                )));
            }
        }

        let now = Utc::now();
        Ok(Product {
            id: Uuid::new_v4().to_string(),
            product_name,
            product_number,
            category: self.category,
            product_price: self.product_price,
            product_stock: self.product_stock,
            product_image,
            product_description,
            in_stock: true,
            ratings: 0.0,
            total_reviews: 0,
            sizes: self.sizes,
            colors: self.colors,
            stock: self.stock,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update of a product
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub product_name: Option<String>,
    pub product_number: Option<String>,
    pub category: Option<CategoryName>,
    pub product_price: Option<i64>,
    pub product_stock: Option<u32>,
    pub product_description: Option<String>,
    pub product_image: Option<Vec<String>>,
    pub sizes: Option<Vec<Size>>,
    pub colors: Option<Vec<Color>>,
    pub stock: Option<Vec<VariantStock>>,
    pub in_stock: Option<bool>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.product_name.is_none()
            && self.product_number.is_none()
            && self.category.is_none()
            && self.product_price.is_none()
            && self.product_stock.is_none()
            && self.product_description.is_none()
            && self.product_image.is_none()
            && self.sizes.is_none()
            && self.colors.is_none()
            && self.stock.is_none()
            && self.in_stock.is_none()
    }

    /// Validate every field first, then apply; a failed update leaves the
    /// product untouched.
    pub fn apply(self, product: &mut Product) -> ShopResult<()> {
        if self.is_empty() {
            return Err(ShopError::validation("Product data is required"));
        }

        let name = self
            .product_name
            .as_deref()
            .map(|v| validate::length("productName", v, 3, 50))
            .transpose()?;
        let number = self
            .product_number
            .as_deref()
            .map(|v| validate::length("productNumber", v, 3, 50))
            .transpose()?;
        let description = self
            .product_description
            .as_deref()
            .map(|v| validate::length("productDescription", v, 10, 500))
            .transpose()?;
        let images = self.product_image.as_deref().map(check_images).transpose()?;
        if matches!(self.product_price, Some(p) if p < 0) {
            return Err(ShopError::validation(
                "Product price must be a non-negative number",
            ));
        }

        if self.stock.is_none() && self.product_stock.is_some() && product.has_variants() {
            return Err(ShopError::validation(
                "productStock is derived from variant stock; update stock instead",
            ));
        }

        if let Some(v) = name {
            product.product_name = v;
        }
        if let Some(v) = number {
            product.product_number = v;
        }
        if let Some(v) = description {
            product.product_description = v;
        }
        if let Some(v) = images {
            product.product_image = v;
        }
        if let Some(v) = self.category {
            product.category = v;
        }
        if let Some(v) = self.product_price {
            product.product_price = v;
        }
        if let Some(v) = self.sizes {
            product.sizes = v;
        }
        if let Some(v) = self.colors {
            product.colors = v;
        }
        if let Some(v) = self.in_stock {
            product.in_stock = v;
        }

        match self.stock {
            Some(stock) => {
                product.product_stock = variant_total(&stock);
                product.in_stock = product.product_stock > 0;
                product.stock = stock;
            }
            None => {
                if let Some(flat) = self.product_stock {
                    product.product_stock = flat;
                }
            }
        }

        product.updated_at = Utc::now();
        Ok(())
    }
}

/// Request body for a product review
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub title: String,
    pub description: String,
    pub rating: i64,
}

impl NewReview {
    fn validate(self) -> ShopResult<ValidReview> {
        if !(1..=5).contains(&self.rating) {
            return Err(ShopError::validation(
                "Rating must be an integer between 1 and 5",
            ));
        }
        Ok(ValidReview {
            title: validate::length("Title", &self.title, 3, 100)?,
            description: validate::length("Description", &self.description, 10, 500)?,
            rating: self.rating as u8,
        })
    }
}

struct ValidReview {
    title: String,
    description: String,
    rating: u8,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn new_product(stock: u32) -> NewProduct {
        NewProduct {
            product_name: "Classic Boxer".to_string(),
            product_number: "BYC-001".to_string(),
            category: CategoryName::Men,
            product_price: 250_000,
            product_stock: stock,
            product_description: "Soft cotton boxer brief".to_string(),
            product_image: vec!["https://res.cloudinary.com/byc/boxer.png".to_string()],
            sizes: vec![Size::M, Size::L],
            colors: vec![Color::Black, Color::White],
            stock: Vec::new(),
        }
    }

    pub(crate) fn variant_product() -> Product {
        let mut input = new_product(5);
        input.stock = vec![
            VariantStock {
                size: Size::M,
                color: Color::Black,
                quantity: 3,
            },
            VariantStock {
                size: Size::L,
                color: Color::White,
                quantity: 2,
            },
        ];
        input.validate().unwrap()
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let mut input = new_product(5);
        input.product_image = vec!["http://example.com/x.png".to_string()];
        assert!(matches!(input.validate(), Err(ShopError::Validation(_))));

        let input = new_product(0);
        assert!(input.validate().is_err());

        let mut input = new_product(4);
        input.stock = vec![VariantStock {
            size: Size::M,
            color: Color::Black,
            quantity: 3,
        }];
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("must equal productStock"));
    }

    #[test]
    fn test_flat_stock_check() {
        let product = new_product(3).validate().unwrap();
        assert!(product.check_available(3, None, None).is_ok());
        assert!(matches!(
            product.check_available(4, None, None),
            Err(ShopError::InsufficientStock { available: 3, .. })
        ));
        assert!(matches!(
            product.check_available(1, Some(Size::XXL), None),
            Err(ShopError::InvalidVariant { .. })
        ));
    }

    #[test]
    fn test_out_of_stock_flag() {
        let mut product = new_product(3).validate().unwrap();
        product.in_stock = false;
        assert!(matches!(
            product.check_available(1, None, None),
            Err(ShopError::OutOfStock { .. })
        ));
    }

    #[test]
    fn test_variant_take_and_restore_keep_sum() {
        let mut product = variant_product();
        assert!(product
            .check_available(4, Some(Size::M), Some(Color::Black))
            .is_err());
        assert!(product
            .check_available(1, Some(Size::M), Some(Color::White))
            .is_err());
        assert!(matches!(
            product.check_available(1, None, None),
            Err(ShopError::InvalidVariant { .. })
        ));

        product.take(2, Some(Size::M), Some(Color::Black));
        assert_eq!(product.available(Some(Size::M), Some(Color::Black)), 1);
        assert_eq!(product.product_stock, 3);

        product.restore(2, Some(Size::M), Some(Color::Black));
        assert_eq!(product.available(Some(Size::M), Some(Color::Black)), 3);
        assert_eq!(product.product_stock, 5);
    }

    #[test]
    fn test_update_recomputes_flat_stock() {
        let mut product = variant_product();
        let update = ProductUpdate {
            stock: Some(vec![VariantStock {
                size: Size::M,
                color: Color::Black,
                quantity: 0,
            }]),
            ..Default::default()
        };
        update.apply(&mut product).unwrap();
        assert_eq!(product.product_stock, 0);
        assert!(!product.in_stock);

        let err = ProductUpdate::default().apply(&mut product).unwrap_err();
        assert_eq!(err.to_string(), "Product data is required");
    }

    #[test]
    fn test_reviews() {
        let mut product = new_product(3).validate().unwrap();
        let review = |rating| NewReview {
            title: "Great fit".to_string(),
            description: "Comfortable all day long".to_string(),
            rating,
        };

        product.add_review("u1", review(5)).unwrap();
        product.add_review("u2", review(2)).unwrap();
        assert_eq!(product.total_reviews, 2);
        assert!((product.ratings - 3.5).abs() < f64::EPSILON);

        assert!(matches!(
            product.add_review("u1", review(4)),
            Err(ShopError::Conflict(_))
        ));
        assert!(product.add_review("u3", review(6)).is_err());
    }
}
