//! # Order Service
//!
//! Order lifecycle operations: placing orders, hosted checkout, payment
//! confirmation (client-polled and webhook), manual confirmation and
//! cancellation.
//!
//! State transitions are serialized through one mutex so a webhook and a
//! client poll confirming the same session cannot both decrement stock.

use crate::error::{ShopError, ShopResult};
use crate::money::Currency;
use crate::order::{
    LineItem, NewOrder, NoteKind, Order, OrderState, PaymentStatus, PaymentType,
};
use crate::payment::{
    BoxedPaymentStrategy, CheckoutSession, CheckoutUrls, SessionPaymentStatus, WebhookEvent,
    WebhookEventType,
};
use crate::product::Product;
use crate::store::{EventLedger, OrderRepository, ProductRepository, SharedStore};
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

/// Who is asking; admins may act on any order
#[derive(Debug, Clone)]
pub struct Requester {
    pub user_id: String,
    pub is_admin: bool,
}

impl Requester {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: false,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: true,
        }
    }

    fn can_access(&self, order: &Order) -> bool {
        self.is_admin || order.user_id == self.user_id
    }
}

/// What happened to a webhook event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Processed,
    /// Event id seen before; not reprocessed
    Duplicate,
    /// Event type or state we do not act on
    Ignored,
}

pub struct OrderService {
    store: SharedStore,
    payments: Option<BoxedPaymentStrategy>,
    urls: CheckoutUrls,
    currency: Currency,
    transitions: Mutex<()>,
}

impl OrderService {
    pub fn new(store: SharedStore, urls: CheckoutUrls, currency: Currency) -> Self {
        Self {
            store,
            payments: None,
            urls,
            currency,
            transitions: Mutex::new(()),
        }
    }

    pub fn with_payments(mut self, strategy: BoxedPaymentStrategy) -> Self {
        self.payments = Some(strategy);
        self
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn online_payments_enabled(&self) -> bool {
        self.payments.is_some()
    }

    fn payments(&self) -> ShopResult<&BoxedPaymentStrategy> {
        self.payments.as_ref().ok_or_else(|| {
            ShopError::Configuration("online payments are not configured".to_string())
        })
    }

    /// Place a bank-transfer or pay-on-delivery order, taking stock now
    #[instrument(skip(self, input), fields(payment_type = %input.payment_type))]
    pub async fn place_order(&self, user_id: &str, input: NewOrder) -> ShopResult<Order> {
        let input = input.validate()?;
        if input.payment_type == PaymentType::OnlinePayment {
            return Err(ShopError::validation(
                "Online Payment orders must go through checkout",
            ));
        }

        let requests = input.items.clone();
        let snapshots = self.store.reserve_stock(&requests).await?;
        let items = line_items(&snapshots, &input);
        let order = match Order::new(user_id, input, items, self.currency, true) {
            Ok(order) => order,
            Err(e) => {
                self.store.release_stock(&requests).await?;
                return Err(e);
            }
        };

        let order = self.store.insert_order(order).await?;
        info!(
            order_id = %order.id,
            items = order.item_count(),
            total = %self.currency.display(order.total),
            "Order placed"
        );
        Ok(order)
    }

    /// Create an online-payment order and a hosted checkout session for it.
    ///
    /// Stock is checked but only taken once payment is confirmed.
    #[instrument(skip(self, input))]
    pub async fn start_checkout(
        &self,
        user_id: &str,
        input: NewOrder,
    ) -> ShopResult<(Order, CheckoutSession)> {
        let payments = self.payments()?;
        let mut input = input.validate()?;
        input.payment_type = PaymentType::OnlinePayment;

        let snapshots = self.store.check_stock(&input.items).await?;
        let items = line_items(&snapshots, &input);
        let order = Order::new(user_id, input, items, self.currency, false)?;
        let mut order = self.store.insert_order(order).await?;

        let success_url = self.urls.success_url(&order.id);
        let cancel_url = self.urls.cancel_url(&order.id);
        match payments.create_checkout(&order, &success_url, &cancel_url).await {
            Ok(session) => {
                order.stripe_session_id = Some(session.session_id.clone());
                let order = self.store.save_order(order).await?;
                info!(
                    order_id = %order.id,
                    session_id = %session.session_id,
                    provider = payments.provider_name(),
                    "Checkout session created"
                );
                Ok((order, session))
            }
            Err(e) => {
                error!(order_id = %order.id, error = %e, "Checkout session creation failed");
                let _guard = self.transitions.lock().await;
                order.cancel("Checkout session could not be created", None)?;
                order.add_note(NoteKind::CheckoutFailed, e.to_string(), None);
                self.store.save_order(order).await?;
                Err(e)
            }
        }
    }

    /// Client-polled confirmation after the provider redirect
    #[instrument(skip(self, requester), fields(user_id = %requester.user_id))]
    pub async fn confirm_payment(
        &self,
        requester: &Requester,
        session_id: &str,
        order_id: &str,
    ) -> ShopResult<Order> {
        let payments = self.payments()?;
        let session = payments.retrieve_session(session_id).await?;
        if !session.is_paid() {
            return Err(ShopError::PaymentIncomplete {
                session_id: session_id.to_string(),
            });
        }
        if let Some(owner) = session.order_id.as_deref() {
            if owner != order_id {
                return Err(ShopError::validation(
                    "Checkout session does not belong to this order",
                ));
            }
        }

        let order = self.store.get_order(order_id).await?;
        if !requester.can_access(&order) {
            return Err(ShopError::Forbidden(
                "You can only verify your own orders".to_string(),
            ));
        }
        self.complete_payment(order_id, session_id).await
    }

    /// Take stock best-effort and confirm; a no-op when already paid
    async fn complete_payment(&self, order_id: &str, session_id: &str) -> ShopResult<Order> {
        let _guard = self.transitions.lock().await;
        let mut order = self.store.get_order(order_id).await?;
        if order.payment_status() == PaymentStatus::Completed {
            info!(order_id = %order.id, "Payment already confirmed");
            return Ok(order);
        }
        if order.state() == OrderState::Cancelled {
            return Err(ShopError::InvalidState(format!(
                "order {} is cancelled",
                order.id
            )));
        }

        if !order.stock_reserved {
            let shortfalls = self.store.take_stock(&order.stock_requests()).await?;
            for s in &shortfalls {
                warn!(
                    order_id = %order.id,
                    product_id = %s.product_id,
                    requested = s.requested,
                    available = s.available,
                    "Insufficient stock at payment confirmation"
                );
                order.add_note(
                    NoteKind::StockShortfall,
                    format!(
                        "Stock for product {} not decremented: {} requested, {} available",
                        s.product_id, s.requested, s.available
                    ),
                    None,
                );
            }
            order.stock_reserved = true;
        }

        order.confirm_payment()?;
        if order.stripe_session_id.is_none() {
            order.stripe_session_id = Some(session_id.to_string());
        }
        order.add_note(
            NoteKind::PaymentConfirmed,
            format!("Payment confirmed for session {}", session_id),
            None,
        );
        let order = self.store.save_order(order).await?;
        info!(order_id = %order.id, session_id, "Payment confirmed");
        Ok(order)
    }

    /// Apply a verified provider event, at most once per event id
    #[instrument(skip(self, event), fields(event_id = %event.event_id, event_type = ?event.event_type))]
    pub async fn handle_webhook_event(&self, event: WebhookEvent) -> ShopResult<WebhookOutcome> {
        if !self.store.record_event(&event.event_id).await? {
            info!("Webhook event already processed");
            return Ok(WebhookOutcome::Duplicate);
        }

        let result = match &event.event_type {
            WebhookEventType::CheckoutCompleted => self.on_checkout_completed(&event).await,
            WebhookEventType::CheckoutExpired => self.on_checkout_expired(&event).await,
            other => {
                info!(event_type = ?other, "Ignoring webhook event");
                Ok(WebhookOutcome::Ignored)
            }
        };

        if result.is_err() {
            self.store.forget_event(&event.event_id).await?;
        }
        result
    }

    async fn order_for_event(&self, event: &WebhookEvent) -> ShopResult<Option<Order>> {
        if let Some(order_id) = event.order_id.as_deref() {
            return match self.store.get_order(order_id).await {
                Ok(order) => Ok(Some(order)),
                Err(ShopError::NotFound { .. }) => Ok(None),
                Err(e) => Err(e),
            };
        }
        match event.session_id.as_deref() {
            Some(session_id) => self.store.find_order_by_session(session_id).await,
            None => Ok(None),
        }
    }

    async fn on_checkout_completed(&self, event: &WebhookEvent) -> ShopResult<WebhookOutcome> {
        if event.payment_status == SessionPaymentStatus::Unpaid {
            info!("Checkout completed without payment yet; waiting");
            return Ok(WebhookOutcome::Ignored);
        }
        let Some(order) = self.order_for_event(event).await? else {
            warn!(session_id = ?event.session_id, "No order for completed checkout");
            return Ok(WebhookOutcome::Ignored);
        };
        let session_id = event
            .session_id
            .clone()
            .or_else(|| order.stripe_session_id.clone())
            .unwrap_or_default();
        match self.complete_payment(&order.id, &session_id).await {
            Ok(_) => Ok(WebhookOutcome::Processed),
            Err(ShopError::InvalidState(reason)) => {
                error!(order_id = %order.id, %reason, "Paid checkout for an order that is no longer payable");
                Ok(WebhookOutcome::Ignored)
            }
            Err(e) => Err(e),
        }
    }

    async fn on_checkout_expired(&self, event: &WebhookEvent) -> ShopResult<WebhookOutcome> {
        let Some(order) = self.order_for_event(event).await? else {
            warn!(session_id = ?event.session_id, "No order for expired checkout");
            return Ok(WebhookOutcome::Ignored);
        };

        let _guard = self.transitions.lock().await;
        let mut order = self.store.get_order(&order.id).await?;
        if !order.expire() {
            return Ok(WebhookOutcome::Ignored);
        }
        // online orders hold no stock until paid
        if order.stock_reserved {
            self.store.release_stock(&order.stock_requests()).await?;
            order.stock_reserved = false;
        }
        let order = self.store.save_order(order).await?;
        info!(order_id = %order.id, "Order cancelled after checkout expiry");
        Ok(WebhookOutcome::Processed)
    }

    /// Admin confirmation of a received bank transfer
    #[instrument(skip(self))]
    pub async fn mark_paid(&self, order_id: &str, admin_id: &str) -> ShopResult<Order> {
        let _guard = self.transitions.lock().await;
        let mut order = self.store.get_order(order_id).await?;
        order.mark_paid(Some(admin_id))?;
        let order = self.store.save_order(order).await?;
        info!(order_id = %order.id, "Bank transfer marked as paid");
        Ok(order)
    }

    /// Cancel a pending order and give back any stock it holds
    #[instrument(skip(self, requester), fields(user_id = %requester.user_id))]
    pub async fn cancel(&self, order_id: &str, requester: &Requester) -> ShopResult<Order> {
        let _guard = self.transitions.lock().await;
        let mut order = self.store.get_order(order_id).await?;
        if !requester.can_access(&order) {
            return Err(ShopError::Forbidden(
                "You can only cancel your own orders".to_string(),
            ));
        }

        let (reason, admin_id) = if requester.is_admin {
            ("Cancelled by admin", Some(requester.user_id.as_str()))
        } else {
            ("Cancelled by customer", None)
        };
        let release = order.cancel(reason, admin_id)?;
        self.store.release_stock(&release).await?;
        let order = self.store.save_order(order).await?;
        info!(order_id = %order.id, restored_lines = release.len(), "Order cancelled");
        Ok(order)
    }

    pub async fn get_order(&self, order_id: &str, requester: &Requester) -> ShopResult<Order> {
        let order = self.store.get_order(order_id).await?;
        if !requester.can_access(&order) {
            return Err(ShopError::not_found("Order", order_id));
        }
        Ok(order)
    }

    pub async fn orders_for_user(&self, user_id: &str) -> ShopResult<Vec<Order>> {
        self.store.list_orders_for_user(user_id).await
    }

    pub async fn all_orders(&self) -> ShopResult<Vec<Order>> {
        self.store.list_orders().await
    }
}

fn line_items(snapshots: &[Product], input: &NewOrder) -> Vec<LineItem> {
    snapshots
        .iter()
        .zip(&input.items)
        .map(|(product, request)| LineItem::from_product(product, request))
        .collect()
}
