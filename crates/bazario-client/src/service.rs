//! # Cart Service
//!
//! The dispatch surface the mobile shell calls.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Service Operation Flow                               │
//! │                                                                         │
//! │  Shell call                                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. validate request input (bazario_core::validation)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. apply the reducer operation under the state lock (synchronous)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. enqueue the matching SyncTask (non-blocking, after commit)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. return the updated CartView                                         │
//! │                                                                         │
//! │  The shell never waits on the network for a cart mutation. Checkout    │
//! │  is the exception: create_order is awaited because the order id is     │
//! │  required to proceed to payment.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use bazario_core::cart::{Cart, CartTotals};
use bazario_core::catalog::{normalize_coupon, RawCoupon};
use bazario_core::coupon::AppliedCoupon;
use bazario_core::error::CoreError;
use bazario_core::order::{assemble, CheckoutSelection, OrderPayload};
use bazario_core::types::{Customer, LineItem, NewLineItem};
use bazario_core::validation::{
    validate_cart_size, validate_coupon_code, validate_product_name, validate_quantity,
    validate_unit_price,
};
use bazario_core::MAX_ITEM_QUANTITY;
use bazario_sync::{CartSyncBackend, SyncAgentHandle, SyncEnvelope, SyncTask};

use crate::error::{ServiceError, ServiceResult};
use crate::state::CartState;

// =============================================================================
// Coupon Catalog Boundary
// =============================================================================

/// Resolves a human-entered code to a raw catalog document.
///
/// Implemented over the remote catalog SDK outside this repository. The
/// raw document is normalized before the core ever sees it.
#[async_trait]
pub trait CouponCatalog: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Option<RawCoupon>;
}

// =============================================================================
// Responses
// =============================================================================

/// Cart response including items, coupon and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<LineItem>,
    pub applied_coupon: Option<AppliedCoupon>,
    pub totals: CartTotals,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        CartView {
            items: cart.items().to_vec(),
            applied_coupon: cart.applied_coupon().cloned(),
            totals: CartTotals::from(cart),
        }
    }
}

/// What checkout hands back to the shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: String,
    pub order: OrderPayload,
}

// =============================================================================
// Cart Service
// =============================================================================

/// Session-scoped cart operations.
///
/// One instance per signed-in user session. Local state commits first;
/// remote persistence trails behind on the sync queue.
pub struct CartService {
    customer: Customer,
    state: CartState,
    sync: SyncAgentHandle,
    backend: Arc<dyn CartSyncBackend>,
    catalog: Arc<dyn CouponCatalog>,
    cart_id: Mutex<Option<String>>,
}

impl CartService {
    /// Creates a service with a fresh empty cart.
    pub fn new(
        customer: Customer,
        backend: Arc<dyn CartSyncBackend>,
        catalog: Arc<dyn CouponCatalog>,
        sync: SyncAgentHandle,
    ) -> Self {
        CartService {
            customer,
            state: CartState::new(),
            sync,
            backend,
            catalog,
            cart_id: Mutex::new(None),
        }
    }

    /// The current cart contents.
    pub fn view(&self) -> CartView {
        self.state.with_cart(|cart| CartView::from(cart))
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    /// Reconciles local state with the remote cart document.
    ///
    /// An active remote cart replaces the local aggregate wholesale; a
    /// missing or inactive one tears the local cart down and creates a
    /// fresh remote document. Remote failures are logged and the session
    /// continues offline-first with local state.
    pub async fn hydrate(&self) -> ServiceResult<CartView> {
        debug!(user_id = %self.customer.id, "hydrate");

        match self.backend.get_active_cart(&self.customer.id).await {
            Ok(Some(snapshot)) if snapshot.is_active => {
                self.set_cart_id(snapshot.cart_id.clone());
                let now = Utc::now();
                self.state
                    .with_cart_mut(|cart| cart.set_items(snapshot.items, snapshot.coupon, now));
            }
            Ok(_) => {
                let now = Utc::now();
                self.state.with_cart_mut(|cart| cart.clear(now));
                match self.backend.create_cart(&self.customer.id).await {
                    Ok(cart_id) => self.set_cart_id(cart_id),
                    Err(e) => {
                        warn!(error = %e, "Could not create remote cart, continuing offline")
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not fetch remote cart, continuing with local state")
            }
        }

        Ok(self.view())
    }

    // =========================================================================
    // Cart Mutations
    // =========================================================================

    /// Adds a product to the cart (quantity +1, merged by product).
    pub fn add_to_cart(&self, product: NewLineItem) -> ServiceResult<CartView> {
        debug!(product_id = %product.product_id, "add_to_cart");
        validate_product_name(&product.name)?;
        validate_unit_price(product.unit_price)?;

        let now = Utc::now();
        let product_id = product.product_id.clone();

        let synced_row = self.state.with_cart_mut(|cart| {
            match cart.items().iter().find(|i| i.product_id == product_id) {
                Some(existing) => {
                    if existing.quantity >= MAX_ITEM_QUANTITY {
                        return Err(CoreError::QuantityTooLarge {
                            requested: existing.quantity + 1,
                            max: MAX_ITEM_QUANTITY,
                        });
                    }
                }
                None => validate_cart_size(cart.item_count())?,
            }

            cart.add_item(product, now);
            Ok(cart
                .items()
                .iter()
                .find(|i| i.product_id == product_id)
                .cloned())
        })?;

        // The replayed row carries the merged quantity, so the remote
        // document converges even if an earlier add was dropped
        if let Some(item) = synced_row {
            self.enqueue(SyncTask::ItemAdded { item });
        }
        Ok(self.view())
    }

    /// Sets a row's quantity; zero or negative removes the row.
    pub fn update_quantity(&self, id: &str, quantity: i64) -> ServiceResult<CartView> {
        debug!(id = %id, quantity = %quantity, "update_quantity");
        validate_quantity(quantity)?;

        let now = Utc::now();
        self.state
            .with_cart_mut(|cart| cart.update_quantity(id, quantity, now));

        self.enqueue(SyncTask::QuantityChanged {
            item_id: id.to_string(),
            quantity: quantity.max(0),
        });
        Ok(self.view())
    }

    /// Removes a row by identity. Missing ids are a no-op.
    pub fn remove_from_cart(&self, id: &str) -> ServiceResult<CartView> {
        debug!(id = %id, "remove_from_cart");

        let now = Utc::now();
        self.state.with_cart_mut(|cart| cart.remove_item(id, now));

        self.enqueue(SyncTask::ItemRemoved {
            item_id: id.to_string(),
        });
        Ok(self.view())
    }

    /// Clears the cart.
    pub fn clear_cart(&self) -> ServiceResult<CartView> {
        debug!("clear_cart");

        let now = Utc::now();
        self.state.with_cart_mut(|cart| cart.clear(now));

        self.enqueue(SyncTask::CartCleared);
        Ok(self.view())
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    /// Resolves a code through the catalog and applies it to the cart.
    ///
    /// ## Soft Failure
    /// A coupon that exists but computes to a zero discount is reported as
    /// `COUPON_NOT_APPLICABLE`; the aggregate does not retain it and the
    /// cart is unchanged. The shell turns this into its "coupon not
    /// applicable" message.
    pub async fn apply_coupon(&self, code: &str) -> ServiceResult<CartView> {
        let code = validate_coupon_code(code)?;
        debug!(code = %code, "apply_coupon");

        let raw = self
            .catalog
            .find_by_code(&code)
            .await
            .ok_or_else(|| ServiceError::not_found("Coupon", &code))?;
        let coupon = normalize_coupon(raw);

        let now = Utc::now();
        let discount = self
            .state
            .with_cart_mut(|cart| cart.apply_coupon(coupon, now));

        if discount.is_zero() {
            return Err(ServiceError::coupon_not_applicable(&code));
        }

        info!(code = %code, discount = %discount, "Coupon applied");
        if let Some(applied) = self.state.with_cart(|cart| cart.applied_coupon().cloned()) {
            self.enqueue(SyncTask::CouponApplied { coupon: applied });
        }
        Ok(self.view())
    }

    /// Detaches the applied coupon.
    pub fn remove_coupon(&self) -> ServiceResult<CartView> {
        debug!("remove_coupon");

        let now = Utc::now();
        self.state.with_cart_mut(|cart| cart.remove_coupon(now));

        self.enqueue(SyncTask::CouponRemoved);
        Ok(self.view())
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Assembles the order payload and submits it.
    ///
    /// The one network call the shell awaits: the order id gates the
    /// payment flow. On success the local cart is cleared and the clear is
    /// replayed remotely like any other mutation.
    pub async fn checkout(&self, selection: CheckoutSelection) -> ServiceResult<OrderReceipt> {
        debug!("checkout");

        let now = Utc::now();
        let order = self.state.with_cart(|cart| assemble(cart, &selection, now));

        let Some(order) = order else {
            let reason = if self.state.with_cart(|cart| cart.is_empty()) {
                "cart is empty"
            } else {
                "no customer identity resolved"
            };
            return Err(ServiceError::checkout_incomplete(reason));
        };

        let order_id = self
            .backend
            .create_order(&order)
            .await
            .map_err(|e| ServiceError::sync(format!("Order submission failed: {}", e)))?;

        info!(
            order_id = %order_id,
            final_amount = %order.final_amount,
            items = order.items.len(),
            "Order created"
        );

        self.state.with_cart_mut(|cart| cart.clear(Utc::now()));
        self.enqueue(SyncTask::CartCleared);

        Ok(OrderReceipt { order_id, order })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn set_cart_id(&self, cart_id: String) {
        let mut guard = self.cart_id.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(cart_id);
    }

    /// The remote cart id, minting a session-local one before hydration
    /// has produced a real one.
    fn cart_id_or_local(&self) -> String {
        let mut guard = self.cart_id.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }

    fn enqueue(&self, task: SyncTask) {
        self.sync.enqueue(SyncEnvelope {
            user_id: self.customer.id.clone(),
            cart_id: self.cart_id_or_local(),
            task,
        });
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
