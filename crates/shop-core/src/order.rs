//! # Order Types
//!
//! Orders and their lifecycle.
//!
//! The lifecycle is one tagged [`OrderState`]; the legacy `status` and
//! `paymentStatus` fields clients see are derived from it, and a stored
//! document with an impossible combination of the two is rejected when
//! it is deserialized.
//!
//! ```text
//!   AwaitingPayment ──confirm / mark paid──▶ Confirmed
//!        │    ╲
//!        │     ╲──cancel / session expired──▶ Cancelled
//!   Placed ──cancel──────────────────────────▶ Cancelled
//! ```

use crate::error::{ShopError, ShopResult};
use crate::money::Currency;
use crate::product::{Color, Product, Size};
use crate::user::AddressDetails;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the customer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    #[serde(rename = "Pay On Delivery")]
    PayOnDelivery,
    #[serde(rename = "Online Payment")]
    OnlinePayment,
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentType::BankTransfer => "Bank Transfer",
            PaymentType::PayOnDelivery => "Pay On Delivery",
            PaymentType::OnlinePayment => "Online Payment",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// Order lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderState {
    /// Waiting for a bank transfer or an online payment
    AwaitingPayment,
    /// Placed without up-front payment (pay on delivery)
    Placed,
    /// Paid and confirmed; terminal
    Confirmed,
    /// Cancelled or expired; terminal
    Cancelled,
}

impl OrderState {
    pub fn initial(payment_type: PaymentType) -> Self {
        match payment_type {
            PaymentType::BankTransfer | PaymentType::OnlinePayment => OrderState::AwaitingPayment,
            PaymentType::PayOnDelivery => OrderState::Placed,
        }
    }

    pub fn status(&self) -> OrderStatus {
        match self {
            OrderState::AwaitingPayment | OrderState::Placed => OrderStatus::Pending,
            OrderState::Confirmed => OrderStatus::Confirmed,
            OrderState::Cancelled => OrderStatus::Cancelled,
        }
    }

    pub fn payment_status(&self) -> PaymentStatus {
        match self {
            OrderState::AwaitingPayment => PaymentStatus::Pending,
            OrderState::Placed | OrderState::Confirmed => PaymentStatus::Completed,
            OrderState::Cancelled => PaymentStatus::Failed,
        }
    }

    pub fn from_parts(status: OrderStatus, payment: PaymentStatus) -> ShopResult<Self> {
        match (status, payment) {
            (OrderStatus::Pending, PaymentStatus::Pending) => Ok(OrderState::AwaitingPayment),
            (OrderStatus::Pending, PaymentStatus::Completed) => Ok(OrderState::Placed),
            (OrderStatus::Confirmed, PaymentStatus::Completed) => Ok(OrderState::Confirmed),
            (OrderStatus::Cancelled, PaymentStatus::Failed) => Ok(OrderState::Cancelled),
            (s, p) => Err(ShopError::InvalidState(format!(
                "status {:?} cannot have payment status {:?}",
                s, p
            ))),
        }
    }
}

/// A line item; immutable once the order exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product id
    pub product: String,
    /// Product name at order time
    pub name: String,
    /// Unit price at order time (smallest currency unit)
    pub price: i64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl LineItem {
    pub fn from_product(product: &Product, request: &StockRequest) -> Self {
        Self {
            product: product.id.clone(),
            name: product.product_name.clone(),
            price: product.product_price,
            quantity: request.quantity,
            size: request.size,
            color: request.color,
        }
    }

    pub fn total(&self) -> ShopResult<i64> {
        self.price
            .checked_mul(self.quantity as i64)
            .ok_or_else(|| ShopError::validation(format!("Line total for {} is too large", self.name)))
    }

    pub fn stock_request(&self) -> StockRequest {
        StockRequest {
            product_id: self.product.clone(),
            quantity: self.quantity,
            size: self.size,
            color: self.color,
        }
    }
}

/// Units of one product variant to check, take or give back
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StockRequest {
    #[serde(rename = "product")]
    pub product_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub color: Option<Color>,
}

/// Kind of an order note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    PaymentConfirmed,
    ManualConfirmation,
    Cancellation,
    CheckoutExpired,
    CheckoutFailed,
    StockShortfall,
}

/// Append-only audit note
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNote {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
}

/// Request body for placing an order
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<StockRequest>,
    pub address: AddressDetails,
    pub payment_type: PaymentType,
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub total: i64,
}

impl NewOrder {
    /// Shape checks that need no store access
    pub fn validate(self) -> ShopResult<Self> {
        if self.items.is_empty() {
            return Err(ShopError::validation("Order has no items"));
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity == 0) {
            return Err(ShopError::validation(format!(
                "Quantity for product {} must be at least 1",
                item.product_id
            )));
        }
        if self.subtotal < 0 || self.delivery_fee < 0 {
            return Err(ShopError::validation("Amounts must be non-negative"));
        }
        let expected = self
            .subtotal
            .checked_add(self.delivery_fee)
            .ok_or_else(|| ShopError::validation("Order amounts are too large"))?;
        if self.total != expected {
            return Err(ShopError::validation(format!(
                "Total ({}) must equal subtotal ({}) plus delivery fee ({})",
                self.total, self.subtotal, self.delivery_fee
            )));
        }
        Ok(Self {
            address: self.address.validate()?,
            ..self
        })
    }
}

/// A customer order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "OrderDocument", try_from = "OrderDocument")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<LineItem>,
    pub address: AddressDetails,
    pub payment_type: PaymentType,
    pub currency: Currency,
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub total: i64,
    state: OrderState,
    /// Whether this order currently holds stock
    pub stock_reserved: bool,
    pub stripe_session_id: Option<String>,
    notes: Vec<OrderNote>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build an order from validated input and product snapshots
    pub fn new(
        user_id: &str,
        input: NewOrder,
        items: Vec<LineItem>,
        currency: Currency,
        stock_reserved: bool,
    ) -> ShopResult<Self> {
        let computed = items.iter().try_fold(0i64, |acc, item| {
            acc.checked_add(item.total()?)
                .ok_or_else(|| ShopError::validation("Order amounts are too large"))
        })?;
        if computed != input.subtotal {
            return Err(ShopError::validation(format!(
                "Subtotal ({}) does not match line items ({})",
                input.subtotal, computed
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            items,
            address: input.address,
            payment_type: input.payment_type,
            currency,
            subtotal: input.subtotal,
            delivery_fee: input.delivery_fee,
            total: input.total,
            state: OrderState::initial(input.payment_type),
            stock_reserved,
            stripe_session_id: None,
            notes: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn status(&self) -> OrderStatus {
        self.state.status()
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.state.payment_status()
    }

    pub fn notes(&self) -> &[OrderNote] {
        &self.notes
    }

    pub fn add_note(&mut self, kind: NoteKind, message: impl Into<String>, admin_id: Option<&str>) {
        self.notes.push(OrderNote {
            message: message.into(),
            timestamp: Utc::now(),
            kind,
            admin_id: admin_id.map(String::from),
        });
        self.updated_at = Utc::now();
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn stock_requests(&self) -> Vec<StockRequest> {
        self.items.iter().map(LineItem::stock_request).collect()
    }

    fn transition(&mut self, to: OrderState) {
        self.state = to;
        self.updated_at = Utc::now();
    }

    /// Record a provider-confirmed payment.
    ///
    /// Returns `Ok(false)` when payment was already completed.
    pub fn confirm_payment(&mut self) -> ShopResult<bool> {
        match self.state {
            OrderState::AwaitingPayment => {
                self.transition(OrderState::Confirmed);
                Ok(true)
            }
            OrderState::Placed | OrderState::Confirmed => Ok(false),
            OrderState::Cancelled => Err(ShopError::InvalidState(format!(
                "order {} is cancelled",
                self.id
            ))),
        }
    }

    /// Admin confirmation of a received bank transfer
    pub fn mark_paid(&mut self, admin_id: Option<&str>) -> ShopResult<()> {
        if self.payment_type != PaymentType::BankTransfer {
            return Err(ShopError::InvalidState(format!(
                "only Bank Transfer orders can be marked as paid (order uses {})",
                self.payment_type
            )));
        }
        if self.state != OrderState::AwaitingPayment {
            return Err(ShopError::InvalidState(format!(
                "payment status is {:?}, expected pending",
                self.payment_status()
            )));
        }
        self.transition(OrderState::Confirmed);
        self.add_note(
            NoteKind::ManualConfirmation,
            "Bank transfer confirmed by admin",
            admin_id,
        );
        Ok(())
    }

    /// Cancel a pending order.
    ///
    /// Returns the stock to give back (empty when none is held).
    pub fn cancel(&mut self, reason: &str, admin_id: Option<&str>) -> ShopResult<Vec<StockRequest>> {
        if self.status() != OrderStatus::Pending {
            return Err(ShopError::InvalidState(format!(
                "order {} is {:?}, only pending orders can be cancelled",
                self.id,
                self.status()
            )));
        }
        let release = if self.stock_reserved {
            self.stock_requests()
        } else {
            Vec::new()
        };
        self.stock_reserved = false;
        self.transition(OrderState::Cancelled);
        self.add_note(NoteKind::Cancellation, reason, admin_id);
        Ok(release)
    }

    /// Provider session expired before payment.
    ///
    /// Returns `false` when the order is no longer awaiting payment.
    pub fn expire(&mut self) -> bool {
        if self.state != OrderState::AwaitingPayment {
            return false;
        }
        self.transition(OrderState::Cancelled);
        self.add_note(NoteKind::CheckoutExpired, "Checkout session expired", None);
        true
    }
}

/// Stored/wire form of an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDocument {
    #[serde(rename = "_id")]
    id: String,
    user_id: String,
    items: Vec<LineItem>,
    address: AddressDetails,
    payment_type: PaymentType,
    #[serde(default)]
    currency: Currency,
    subtotal: i64,
    delivery_fee: i64,
    total: i64,
    status: OrderStatus,
    payment_status: PaymentStatus,
    #[serde(default)]
    stock_reserved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stripe_session_id: Option<String>,
    #[serde(default)]
    notes: Vec<OrderNote>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Order> for OrderDocument {
    fn from(order: Order) -> Self {
        Self {
            status: order.state.status(),
            payment_status: order.state.payment_status(),
            id: order.id,
            user_id: order.user_id,
            items: order.items,
            address: order.address,
            payment_type: order.payment_type,
            currency: order.currency,
            subtotal: order.subtotal,
            delivery_fee: order.delivery_fee,
            total: order.total,
            stock_reserved: order.stock_reserved,
            stripe_session_id: order.stripe_session_id,
            notes: order.notes,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

impl TryFrom<OrderDocument> for Order {
    type Error = ShopError;

    fn try_from(doc: OrderDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            state: OrderState::from_parts(doc.status, doc.payment_status)?,
            id: doc.id,
            user_id: doc.user_id,
            items: doc.items,
            address: doc.address,
            payment_type: doc.payment_type,
            currency: doc.currency,
            subtotal: doc.subtotal,
            delivery_fee: doc.delivery_fee,
            total: doc.total,
            stock_reserved: doc.stock_reserved,
            stripe_session_id: doc.stripe_session_id,
            notes: doc.notes,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::user::tests::address;

    pub(crate) fn new_order(payment_type: PaymentType, quantity: u32) -> NewOrder {
        NewOrder {
            items: vec![StockRequest {
                product_id: "p1".to_string(),
                quantity,
                size: None,
                color: None,
            }],
            address: address(),
            payment_type,
            subtotal: 1_000 * quantity as i64,
            delivery_fee: 500,
            total: 1_000 * quantity as i64 + 500,
        }
    }

    fn order(payment_type: PaymentType) -> Order {
        let input = new_order(payment_type, 2).validate().unwrap();
        let items = vec![LineItem {
            product: "p1".into(),
            name: "Classic Boxer".into(),
            price: 1_000,
            quantity: 2,
            size: None,
            color: None,
        }];
        Order::new("u1", input, items, Currency::NGN, true).unwrap()
    }

    #[test]
    fn test_initial_states() {
        let bank = order(PaymentType::BankTransfer);
        assert_eq!(bank.status(), OrderStatus::Pending);
        assert_eq!(bank.payment_status(), PaymentStatus::Pending);

        let pod = order(PaymentType::PayOnDelivery);
        assert_eq!(pod.status(), OrderStatus::Pending);
        assert_eq!(pod.payment_status(), PaymentStatus::Completed);
    }

    #[test]
    fn test_validate_amounts() {
        let mut input = new_order(PaymentType::BankTransfer, 1);
        input.total += 1;
        assert!(input.validate().is_err());

        let input = NewOrder {
            items: Vec::new(),
            ..new_order(PaymentType::BankTransfer, 1)
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_amount_overflow() {
        let input = NewOrder {
            subtotal: i64::MAX,
            delivery_fee: 1,
            total: 0,
            ..new_order(PaymentType::BankTransfer, 1)
        };
        assert!(matches!(input.validate(), Err(ShopError::Validation(_))));

        let input = new_order(PaymentType::BankTransfer, 2).validate().unwrap();
        let items = vec![LineItem {
            product: "p1".into(),
            name: "Classic Boxer".into(),
            price: i64::MAX,
            quantity: 2,
            size: None,
            color: None,
        }];
        assert!(matches!(
            Order::new("u1", input, items, Currency::NGN, true),
            Err(ShopError::Validation(_))
        ));
    }

    #[test]
    fn test_subtotal_must_match_snapshots() {
        let input = new_order(PaymentType::BankTransfer, 2).validate().unwrap();
        let items = vec![LineItem {
            product: "p1".into(),
            name: "Classic Boxer".into(),
            price: 900,
            quantity: 2,
            size: None,
            color: None,
        }];
        assert!(Order::new("u1", input, items, Currency::NGN, true).is_err());
    }

    #[test]
    fn test_confirm_is_idempotent() {
        let mut order = order(PaymentType::OnlinePayment);
        assert!(order.confirm_payment().unwrap());
        assert!(!order.confirm_payment().unwrap());
        assert_eq!(order.status(), OrderStatus::Confirmed);
        assert_eq!(order.payment_status(), PaymentStatus::Completed);
    }

    #[test]
    fn test_mark_paid_preconditions() {
        let mut online = order(PaymentType::OnlinePayment);
        assert!(matches!(online.mark_paid(None), Err(ShopError::InvalidState(_))));

        let mut bank = order(PaymentType::BankTransfer);
        bank.mark_paid(Some("admin")).unwrap();
        assert_eq!(bank.status(), OrderStatus::Confirmed);
        assert_eq!(bank.notes().len(), 1);
        assert_eq!(bank.notes()[0].admin_id.as_deref(), Some("admin"));
        assert!(matches!(bank.mark_paid(None), Err(ShopError::InvalidState(_))));
    }

    #[test]
    fn test_cancel_releases_reserved_stock_once() {
        let mut order = order(PaymentType::BankTransfer);
        let release = order.cancel("Cancelled by customer", None).unwrap();
        assert_eq!(release.len(), 1);
        assert_eq!(release[0].quantity, 2);
        assert_eq!(order.payment_status(), PaymentStatus::Failed);
        assert!(!order.stock_reserved);

        assert!(matches!(
            order.cancel("again", None),
            Err(ShopError::InvalidState(_))
        ));
        assert!(order.confirm_payment().is_err());
    }

    #[test]
    fn test_confirmed_orders_cannot_be_cancelled_or_expired() {
        let mut order = order(PaymentType::OnlinePayment);
        order.confirm_payment().unwrap();
        assert!(order.cancel("late", None).is_err());
        assert!(!order.expire());
        assert_eq!(order.status(), OrderStatus::Confirmed);
    }

    #[test]
    fn test_wire_format() {
        let order = order(PaymentType::BankTransfer);
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["paymentStatus"], "pending");
        assert_eq!(json["paymentType"], "Bank Transfer");
        assert_eq!(json["items"][0]["product"], "p1");

        let back: Order = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back.state(), OrderState::AwaitingPayment);

        let mut broken = json;
        broken["status"] = "confirmed".into();
        assert!(serde_json::from_value::<Order>(broken).is_err());
    }
}
