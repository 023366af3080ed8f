//! # Document Store
//!
//! Repository traits for every collection plus [`InMemoryStore`], which
//! implements all of them. Each collection sits behind its own `RwLock`.
//!
//! Stock mutations for a whole order happen under one write lock on the
//! product collection: every line is checked against a scratch copy first
//! and nothing is written unless all lines pass.

use crate::blog::{Blog, BlogCounter};
use crate::cart::{Cart, Wishlist};
use crate::category::Category;
use crate::error::{ShopError, ShopResult};
use crate::order::{Order, StockRequest};
use crate::product::{NewReview, Product, ProductUpdate};
use crate::user::{Address, User};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A line that could not be fully taken during best-effort decrement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortfall {
    pub product_id: String,
    pub requested: u32,
    pub available: u32,
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Newest first
    async fn list_products(&self) -> ShopResult<Vec<Product>>;

    async fn get_product(&self, id: &str) -> ShopResult<Product>;

    async fn insert_product(&self, product: Product) -> ShopResult<Product>;

    /// Apply a partial update under the write lock
    async fn update_product(&self, id: &str, update: ProductUpdate) -> ShopResult<Product>;

    async fn set_in_stock(&self, id: &str, in_stock: bool) -> ShopResult<Product>;

    async fn add_review(&self, id: &str, author: &str, review: NewReview) -> ShopResult<Product>;

    async fn delete_product(&self, id: &str) -> ShopResult<()>;

    /// Verify every line without changing stock.
    ///
    /// Returns one product snapshot per request, in order.
    async fn check_stock(&self, requests: &[StockRequest]) -> ShopResult<Vec<Product>>;

    /// Check and decrement every line atomically; all or nothing.
    ///
    /// Returns one product snapshot per request, in order.
    async fn reserve_stock(&self, requests: &[StockRequest]) -> ShopResult<Vec<Product>>;

    /// Decrement what can be decremented; lines that no longer fit are
    /// skipped and reported.
    async fn take_stock(&self, requests: &[StockRequest]) -> ShopResult<Vec<StockShortfall>>;

    /// Give units back; products deleted since are skipped.
    async fn release_stock(&self, requests: &[StockRequest]) -> ShopResult<()>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list_categories(&self) -> ShopResult<Vec<Category>>;
    async fn get_category(&self, id: &str) -> ShopResult<Category>;
    /// Conflict when the name is already taken (case-insensitive)
    async fn insert_category(&self, category: Category) -> ShopResult<Category>;
    /// Returns the existing category with this name, creating it if absent
    async fn ensure_category(&self, name: &str) -> ShopResult<Category>;
    async fn rename_category(&self, id: &str, name: &str) -> ShopResult<Category>;
    async fn delete_category(&self, id: &str) -> ShopResult<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Conflict when the email is already registered
    async fn insert_user(&self, user: User) -> ShopResult<User>;
    async fn get_user(&self, id: &str) -> ShopResult<User>;
    async fn find_user_by_email(&self, email: &str) -> ShopResult<Option<User>>;
    async fn save_user(&self, user: User) -> ShopResult<User>;
}

#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn insert_address(&self, address: Address) -> ShopResult<Address>;
    async fn list_addresses(&self, user_id: &str) -> ShopResult<Vec<Address>>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn find_cart(&self, user_id: &str) -> ShopResult<Option<Cart>>;
    async fn save_cart(&self, cart: Cart) -> ShopResult<Cart>;
}

#[async_trait]
pub trait WishlistRepository: Send + Sync {
    async fn find_wishlist(&self, user_id: &str) -> ShopResult<Option<Wishlist>>;
    async fn save_wishlist(&self, wishlist: Wishlist) -> ShopResult<Wishlist>;
}

#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Newest first
    async fn list_blogs(&self) -> ShopResult<Vec<Blog>>;
    async fn get_blog(&self, id: &str) -> ShopResult<Blog>;
    async fn insert_blog(&self, blog: Blog) -> ShopResult<Blog>;
    async fn delete_blog(&self, id: &str) -> ShopResult<()>;
    /// Returns the new counter value
    async fn increment_blog(&self, id: &str, counter: BlogCounter) -> ShopResult<u64>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert_order(&self, order: Order) -> ShopResult<Order>;
    async fn get_order(&self, id: &str) -> ShopResult<Order>;
    async fn find_order_by_session(&self, session_id: &str) -> ShopResult<Option<Order>>;
    async fn save_order(&self, order: Order) -> ShopResult<Order>;
    /// Newest first
    async fn list_orders_for_user(&self, user_id: &str) -> ShopResult<Vec<Order>>;
    /// Newest first
    async fn list_orders(&self) -> ShopResult<Vec<Order>>;
}

/// Processed webhook event ids
#[async_trait]
pub trait EventLedger: Send + Sync {
    /// Returns false when the event was already recorded
    async fn record_event(&self, event_id: &str) -> ShopResult<bool>;
    /// Undo a record so the provider's retry is processed
    async fn forget_event(&self, event_id: &str) -> ShopResult<()>;
}

/// Every collection the shop needs
pub trait Store:
    ProductRepository
    + CategoryRepository
    + UserRepository
    + AddressRepository
    + CartRepository
    + WishlistRepository
    + BlogRepository
    + OrderRepository
    + EventLedger
{
}

impl<T> Store for T where
    T: ProductRepository
        + CategoryRepository
        + UserRepository
        + AddressRepository
        + CartRepository
        + WishlistRepository
        + BlogRepository
        + OrderRepository
        + EventLedger
{
}

pub type SharedStore = Arc<dyn Store>;

/// In-memory implementation of every repository.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    products: RwLock<HashMap<String, Product>>,
    categories: RwLock<HashMap<String, Category>>,
    users: RwLock<HashMap<String, User>>,
    addresses: RwLock<HashMap<String, Address>>,
    carts: RwLock<HashMap<String, Cart>>,
    wishlists: RwLock<HashMap<String, Wishlist>>,
    blogs: RwLock<HashMap<String, Blog>>,
    orders: RwLock<HashMap<String, Order>>,
    events: RwLock<HashSet<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedStore {
        Arc::new(self)
    }
}

/// Run every request against scratch copies of the products involved.
/// On success the copies hold the decremented stock.
fn plan_stock(
    products: &HashMap<String, Product>,
    requests: &[StockRequest],
) -> ShopResult<(HashMap<String, Product>, Vec<Product>)> {
    let mut scratch: HashMap<String, Product> = HashMap::new();
    let mut snapshots = Vec::with_capacity(requests.len());

    for request in requests {
        if !scratch.contains_key(&request.product_id) {
            let product = products
                .get(&request.product_id)
                .ok_or_else(|| ShopError::not_found("Product", &request.product_id))?;
            scratch.insert(request.product_id.clone(), product.clone());
        }
        let product = scratch
            .get_mut(&request.product_id)
            .ok_or_else(|| ShopError::not_found("Product", &request.product_id))?;
        product.check_available(request.quantity, request.size, request.color)?;
        snapshots.push(product.clone());
        product.take(request.quantity, request.size, request.color);
    }

    Ok((scratch, snapshots))
}

fn newest_first<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
    items
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn list_products(&self) -> ShopResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(newest_first(products.values().cloned().collect(), |p| {
            p.created_at
        }))
    }

    async fn get_product(&self, id: &str) -> ShopResult<Product> {
        self.products
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ShopError::not_found("Product", id))
    }

    async fn insert_product(&self, product: Product) -> ShopResult<Product> {
        let mut products = self.products.write().await;
        if products
            .values()
            .any(|p| p.product_number == product.product_number)
        {
            return Err(ShopError::Conflict(format!(
                "Product number {} already exists",
                product.product_number
            )));
        }
        products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: &str, update: ProductUpdate) -> ShopResult<Product> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(id)
            .ok_or_else(|| ShopError::not_found("Product", id))?;
        let mut updated = product.clone();
        update.apply(&mut updated)?;
        *product = updated.clone();
        Ok(updated)
    }

    async fn set_in_stock(&self, id: &str, in_stock: bool) -> ShopResult<Product> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(id)
            .ok_or_else(|| ShopError::not_found("Product", id))?;
        product.in_stock = in_stock;
        product.updated_at = chrono::Utc::now();
        Ok(product.clone())
    }

    async fn add_review(&self, id: &str, author: &str, review: NewReview) -> ShopResult<Product> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(id)
            .ok_or_else(|| ShopError::not_found("Product", id))?;
        product.add_review(author, review)?;
        Ok(product.clone())
    }

    async fn delete_product(&self, id: &str) -> ShopResult<()> {
        self.products
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ShopError::not_found("Product", id))
    }

    async fn check_stock(&self, requests: &[StockRequest]) -> ShopResult<Vec<Product>> {
        let products = self.products.read().await;
        let (_, snapshots) = plan_stock(&products, requests)?;
        Ok(snapshots)
    }

    async fn reserve_stock(&self, requests: &[StockRequest]) -> ShopResult<Vec<Product>> {
        let mut products = self.products.write().await;
        let (decremented, snapshots) = plan_stock(&products, requests)?;
        products.extend(decremented);
        Ok(snapshots)
    }

    async fn take_stock(&self, requests: &[StockRequest]) -> ShopResult<Vec<StockShortfall>> {
        let mut products = self.products.write().await;
        let mut shortfalls = Vec::new();

        for request in requests {
            let Some(product) = products.get_mut(&request.product_id) else {
                shortfalls.push(StockShortfall {
                    product_id: request.product_id.clone(),
                    requested: request.quantity,
                    available: 0,
                });
                continue;
            };
            let available = product.available(request.size, request.color);
            if available < request.quantity {
                shortfalls.push(StockShortfall {
                    product_id: request.product_id.clone(),
                    requested: request.quantity,
                    available,
                });
                continue;
            }
            product.take(request.quantity, request.size, request.color);
        }

        Ok(shortfalls)
    }

    async fn release_stock(&self, requests: &[StockRequest]) -> ShopResult<()> {
        let mut products = self.products.write().await;
        for request in requests {
            match products.get_mut(&request.product_id) {
                Some(product) => product.restore(request.quantity, request.size, request.color),
                None => tracing::warn!(
                    product_id = %request.product_id,
                    quantity = request.quantity,
                    "Product no longer exists; stock not restored"
                ),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn list_categories(&self) -> ShopResult<Vec<Category>> {
        let mut categories: Vec<Category> =
            self.categories.read().await.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: &str) -> ShopResult<Category> {
        self.categories
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ShopError::not_found("Category", id))
    }

    async fn insert_category(&self, category: Category) -> ShopResult<Category> {
        let mut categories = self.categories.write().await;
        if categories
            .values()
            .any(|c| c.name.eq_ignore_ascii_case(&category.name))
        {
            return Err(ShopError::Conflict(format!(
                "Category {} already exists",
                category.name
            )));
        }
        categories.insert(category.id.clone(), category.clone());
        Ok(category)
    }

    async fn ensure_category(&self, name: &str) -> ShopResult<Category> {
        let mut categories = self.categories.write().await;
        if let Some(existing) = categories
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
        {
            return Ok(existing.clone());
        }
        let category = Category::new(name)?;
        categories.insert(category.id.clone(), category.clone());
        Ok(category)
    }

    async fn rename_category(&self, id: &str, name: &str) -> ShopResult<Category> {
        let mut categories = self.categories.write().await;
        if categories
            .values()
            .any(|c| c.id != id && c.name.eq_ignore_ascii_case(name.trim()))
        {
            return Err(ShopError::Conflict(format!("Category {} already exists", name.trim())));
        }
        let category = categories
            .get_mut(id)
            .ok_or_else(|| ShopError::not_found("Category", id))?;
        category.rename(name)?;
        Ok(category.clone())
    }

    async fn delete_category(&self, id: &str) -> ShopResult<()> {
        self.categories
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ShopError::not_found("Category", id))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_user(&self, user: User) -> ShopResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(ShopError::Conflict("User already exists".to_string()));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> ShopResult<User> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ShopError::not_found("User", id))
    }

    async fn find_user_by_email(&self, email: &str) -> ShopResult<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn save_user(&self, user: User) -> ShopResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(ShopError::not_found("User", &user.id));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }
}

#[async_trait]
impl AddressRepository for InMemoryStore {
    async fn insert_address(&self, address: Address) -> ShopResult<Address> {
        self.addresses
            .write()
            .await
            .insert(address.id.clone(), address.clone());
        Ok(address)
    }

    async fn list_addresses(&self, user_id: &str) -> ShopResult<Vec<Address>> {
        let addresses = self.addresses.read().await;
        Ok(newest_first(
            addresses
                .values()
                .filter(|a| a.user_id == user_id)
                .cloned()
                .collect(),
            |a| a.created_at,
        ))
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn find_cart(&self, user_id: &str) -> ShopResult<Option<Cart>> {
        Ok(self.carts.read().await.get(user_id).cloned())
    }

    async fn save_cart(&self, cart: Cart) -> ShopResult<Cart> {
        self.carts
            .write()
            .await
            .insert(cart.user_id.clone(), cart.clone());
        Ok(cart)
    }
}

#[async_trait]
impl WishlistRepository for InMemoryStore {
    async fn find_wishlist(&self, user_id: &str) -> ShopResult<Option<Wishlist>> {
        Ok(self.wishlists.read().await.get(user_id).cloned())
    }

    async fn save_wishlist(&self, wishlist: Wishlist) -> ShopResult<Wishlist> {
        self.wishlists
            .write()
            .await
            .insert(wishlist.user_id.clone(), wishlist.clone());
        Ok(wishlist)
    }
}

#[async_trait]
impl BlogRepository for InMemoryStore {
    async fn list_blogs(&self) -> ShopResult<Vec<Blog>> {
        let blogs = self.blogs.read().await;
        Ok(newest_first(blogs.values().cloned().collect(), |b| {
            b.created_at
        }))
    }

    async fn get_blog(&self, id: &str) -> ShopResult<Blog> {
        self.blogs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ShopError::not_found("Blog", id))
    }

    async fn insert_blog(&self, blog: Blog) -> ShopResult<Blog> {
        self.blogs.write().await.insert(blog.id.clone(), blog.clone());
        Ok(blog)
    }

    async fn delete_blog(&self, id: &str) -> ShopResult<()> {
        self.blogs
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ShopError::not_found("Blog", id))
    }

    async fn increment_blog(&self, id: &str, counter: BlogCounter) -> ShopResult<u64> {
        let mut blogs = self.blogs.write().await;
        let blog = blogs
            .get_mut(id)
            .ok_or_else(|| ShopError::not_found("Blog", id))?;
        Ok(blog.increment(counter))
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn insert_order(&self, order: Order) -> ShopResult<Order> {
        self.orders
            .write()
            .await
            .insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: &str) -> ShopResult<Order> {
        self.orders
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ShopError::not_found("Order", id))
    }

    async fn find_order_by_session(&self, session_id: &str) -> ShopResult<Option<Order>> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .find(|o| o.stripe_session_id.as_deref() == Some(session_id))
            .cloned())
    }

    async fn save_order(&self, order: Order) -> ShopResult<Order> {
        let mut orders = self.orders.write().await;
        if !orders.contains_key(&order.id) {
            return Err(ShopError::not_found("Order", &order.id));
        }
        orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn list_orders_for_user(&self, user_id: &str) -> ShopResult<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(newest_first(
            orders
                .values()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect(),
            |o| o.created_at,
        ))
    }

    async fn list_orders(&self) -> ShopResult<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(newest_first(orders.values().cloned().collect(), |o| {
            o.created_at
        }))
    }
}

#[async_trait]
impl EventLedger for InMemoryStore {
    async fn record_event(&self, event_id: &str) -> ShopResult<bool> {
        Ok(self.events.write().await.insert(event_id.to_string()))
    }

    async fn forget_event(&self, event_id: &str) -> ShopResult<()> {
        self.events.write().await.remove(event_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::tests::{new_product, variant_product};
    use crate::product::{Color, Size};

    fn request(product_id: &str, quantity: u32) -> StockRequest {
        StockRequest {
            product_id: product_id.to_string(),
            quantity,
            size: None,
            color: None,
        }
    }

    async fn store_with(stocks: &[u32]) -> (InMemoryStore, Vec<String>) {
        let store = InMemoryStore::new();
        let mut ids = Vec::new();
        for (i, stock) in stocks.iter().enumerate() {
            let mut input = new_product(*stock);
            input.product_number = format!("BYC-{:03}", i);
            let product = store.insert_product(input.validate().unwrap()).await.unwrap();
            ids.push(product.id);
        }
        (store, ids)
    }

    #[tokio::test]
    async fn test_reserve_is_all_or_nothing() {
        let (store, ids) = store_with(&[5, 1]).await;

        let err = store
            .reserve_stock(&[request(&ids[0], 2), request(&ids[1], 2)])
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::InsufficientStock { .. }));
        assert_eq!(store.get_product(&ids[0]).await.unwrap().product_stock, 5);
        assert_eq!(store.get_product(&ids[1]).await.unwrap().product_stock, 1);

        store
            .reserve_stock(&[request(&ids[0], 2), request(&ids[1], 1)])
            .await
            .unwrap();
        assert_eq!(store.get_product(&ids[0]).await.unwrap().product_stock, 3);
        assert_eq!(store.get_product(&ids[1]).await.unwrap().product_stock, 0);
    }

    #[tokio::test]
    async fn test_reserve_counts_repeated_lines() {
        let (store, ids) = store_with(&[3]).await;
        let err = store
            .reserve_stock(&[request(&ids[0], 2), request(&ids[0], 2)])
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::InsufficientStock { available: 1, .. }));
        assert_eq!(store.get_product(&ids[0]).await.unwrap().product_stock, 3);
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let (store, _) = store_with(&[3]).await;
        let err = store.check_stock(&[request("nope", 1)]).await.unwrap_err();
        assert!(matches!(err, ShopError::NotFound { entity: "Product", .. }));
    }

    #[tokio::test]
    async fn test_check_stock_does_not_mutate() {
        let (store, ids) = store_with(&[3]).await;
        let snapshots = store.check_stock(&[request(&ids[0], 3)]).await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(store.get_product(&ids[0]).await.unwrap().product_stock, 3);
    }

    #[tokio::test]
    async fn test_take_stock_is_best_effort() {
        let (store, ids) = store_with(&[3, 1]).await;
        let shortfalls = store
            .take_stock(&[request(&ids[0], 2), request(&ids[1], 4)])
            .await
            .unwrap();
        assert_eq!(
            shortfalls,
            vec![StockShortfall {
                product_id: ids[1].clone(),
                requested: 4,
                available: 1,
            }]
        );
        assert_eq!(store.get_product(&ids[0]).await.unwrap().product_stock, 1);
        assert_eq!(store.get_product(&ids[1]).await.unwrap().product_stock, 1);
    }

    #[tokio::test]
    async fn test_variant_reserve_and_release() {
        let store = InMemoryStore::new();
        let product = store.insert_product(variant_product()).await.unwrap();
        let line = StockRequest {
            product_id: product.id.clone(),
            quantity: 2,
            size: Some(Size::M),
            color: Some(Color::Black),
        };

        store.reserve_stock(std::slice::from_ref(&line)).await.unwrap();
        let after = store.get_product(&product.id).await.unwrap();
        assert_eq!(after.available(Some(Size::M), Some(Color::Black)), 1);
        assert_eq!(after.product_stock, 3);

        store.release_stock(&[line]).await.unwrap();
        let restored = store.get_product(&product.id).await.unwrap();
        assert_eq!(restored.available(Some(Size::M), Some(Color::Black)), 3);
        assert_eq!(restored.product_stock, 5);
    }

    #[tokio::test]
    async fn test_event_ledger() {
        let store = InMemoryStore::new();
        assert!(store.record_event("evt_1").await.unwrap());
        assert!(!store.record_event("evt_1").await.unwrap());
        store.forget_event("evt_1").await.unwrap();
        assert!(store.record_event("evt_1").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = InMemoryStore::new();
        store
            .insert_user(User::new("Ada".into(), "ada@example.com".into(), "h".into()))
            .await
            .unwrap();
        let err = store
            .insert_user(User::new("Ada 2".into(), "ada@example.com".into(), "h".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Conflict(_)));
        assert!(store
            .find_user_by_email(" ADA@example.com ")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_ensure_category_reuses_existing() {
        let store = InMemoryStore::new();
        let first = store.ensure_category("Women").await.unwrap();
        let again = store.ensure_category("women").await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(store.list_categories().await.unwrap().len(), 1);
    }
}
