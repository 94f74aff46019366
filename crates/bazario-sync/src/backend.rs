//! # Cart Sync Backend
//!
//! The boundary trait for the remote document store that persists carts,
//! coupons and orders.
//!
//! The actual store SDK lives outside this repository; the core treats
//! every call below as best-effort except `create_order`, which checkout
//! awaits because the returned order id is required to proceed.
//!
//! Two implementations ship with the crate: [`NoopBackend`] for offline
//! mode and [`InMemoryBackend`] for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use bazario_core::coupon::AppliedCoupon;
use bazario_core::order::OrderPayload;
use bazario_core::types::LineItem;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Cart Snapshot
// =============================================================================

/// A remote cart document, as returned by `get_active_cart`.
///
/// The session reconciles this into the local aggregate via `SetItems`;
/// derived amounts are recomputed locally and never trusted from the wire.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub cart_id: String,
    pub items: Vec<LineItem>,
    pub coupon: Option<AppliedCoupon>,
    pub is_active: bool,
}

// =============================================================================
// Backend Trait
// =============================================================================

/// Remote persistence operations for carts and orders.
///
/// All mutation calls are best-effort from the caller's perspective: the
/// sync agent retries and then drops them, and local state remains the
/// source of truth. Implementations must be safe to call from the agent's
/// worker task.
#[async_trait]
pub trait CartSyncBackend: Send + Sync {
    /// Returns the user's active cart document, if one exists.
    async fn get_active_cart(&self, user_id: &str) -> SyncResult<Option<CartSnapshot>>;

    /// Creates an empty cart document and returns its id.
    async fn create_cart(&self, user_id: &str) -> SyncResult<String>;

    async fn add_item(&self, user_id: &str, cart_id: &str, item: &LineItem) -> SyncResult<()>;

    async fn remove_item(&self, user_id: &str, cart_id: &str, item_id: &str) -> SyncResult<()>;

    async fn update_quantity(
        &self,
        user_id: &str,
        cart_id: &str,
        item_id: &str,
        quantity: i64,
    ) -> SyncResult<()>;

    async fn clear_cart(&self, user_id: &str, cart_id: &str) -> SyncResult<()>;

    async fn apply_coupon(
        &self,
        user_id: &str,
        cart_id: &str,
        coupon: &AppliedCoupon,
    ) -> SyncResult<()>;

    async fn remove_coupon(&self, user_id: &str, cart_id: &str) -> SyncResult<()>;

    /// Persists an order payload and returns the new order id.
    ///
    /// The one call checkout awaits; everything else goes through the
    /// fire-and-forget queue.
    async fn create_order(&self, order: &OrderPayload) -> SyncResult<String>;
}

// =============================================================================
// Noop Backend
// =============================================================================

/// A backend that accepts everything and stores nothing.
///
/// Used in offline mode so the session wiring stays identical whether or
/// not a remote store is reachable.
#[derive(Debug, Default)]
pub struct NoopBackend;

#[async_trait]
impl CartSyncBackend for NoopBackend {
    async fn get_active_cart(&self, _user_id: &str) -> SyncResult<Option<CartSnapshot>> {
        Ok(None)
    }

    async fn create_cart(&self, _user_id: &str) -> SyncResult<String> {
        Ok(Uuid::new_v4().to_string())
    }

    async fn add_item(&self, _user_id: &str, _cart_id: &str, _item: &LineItem) -> SyncResult<()> {
        Ok(())
    }

    async fn remove_item(&self, _user_id: &str, _cart_id: &str, _item_id: &str) -> SyncResult<()> {
        Ok(())
    }

    async fn update_quantity(
        &self,
        _user_id: &str,
        _cart_id: &str,
        _item_id: &str,
        _quantity: i64,
    ) -> SyncResult<()> {
        Ok(())
    }

    async fn clear_cart(&self, _user_id: &str, _cart_id: &str) -> SyncResult<()> {
        Ok(())
    }

    async fn apply_coupon(
        &self,
        _user_id: &str,
        _cart_id: &str,
        _coupon: &AppliedCoupon,
    ) -> SyncResult<()> {
        Ok(())
    }

    async fn remove_coupon(&self, _user_id: &str, _cart_id: &str) -> SyncResult<()> {
        Ok(())
    }

    async fn create_order(&self, _order: &OrderPayload) -> SyncResult<String> {
        Ok(Uuid::new_v4().to_string())
    }
}

// =============================================================================
// In-Memory Backend
// =============================================================================

#[derive(Debug, Clone, Default)]
struct StoredCart {
    cart_id: String,
    items: Vec<LineItem>,
    coupon: Option<AppliedCoupon>,
    is_active: bool,
}

/// An in-memory backend for agent and service tests.
///
/// Holds one cart document per user and a list of submitted orders.
/// `set_failing(true)` makes every mutation call fail, for exercising the
/// retry-then-drop policy.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    carts: Mutex<HashMap<String, StoredCart>>,
    orders: Mutex<Vec<OrderPayload>>,
    failing: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles failure injection for mutation calls.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_failing(&self) -> SyncResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SyncError::Backend("injected failure".into()));
        }
        Ok(())
    }

    /// The stored items for a user's cart (test assertions).
    pub async fn items(&self, user_id: &str) -> Vec<LineItem> {
        self.carts
            .lock()
            .await
            .get(user_id)
            .map(|c| c.items.clone())
            .unwrap_or_default()
    }

    /// The stored coupon for a user's cart (test assertions).
    pub async fn coupon(&self, user_id: &str) -> Option<AppliedCoupon> {
        self.carts.lock().await.get(user_id).and_then(|c| c.coupon.clone())
    }

    /// Orders submitted through `create_order` (test assertions).
    pub async fn orders(&self) -> Vec<OrderPayload> {
        self.orders.lock().await.clone()
    }

    /// Seeds a remote cart document for hydration tests.
    pub async fn seed_cart(
        &self,
        user_id: &str,
        items: Vec<LineItem>,
        coupon: Option<AppliedCoupon>,
    ) -> String {
        let cart_id = Uuid::new_v4().to_string();
        self.carts.lock().await.insert(
            user_id.to_string(),
            StoredCart {
                cart_id: cart_id.clone(),
                items,
                coupon,
                is_active: true,
            },
        );
        cart_id
    }
}

#[async_trait]
impl CartSyncBackend for InMemoryBackend {
    async fn get_active_cart(&self, user_id: &str) -> SyncResult<Option<CartSnapshot>> {
        let carts = self.carts.lock().await;
        Ok(carts.get(user_id).filter(|c| c.is_active).map(|c| CartSnapshot {
            cart_id: c.cart_id.clone(),
            items: c.items.clone(),
            coupon: c.coupon.clone(),
            is_active: c.is_active,
        }))
    }

    async fn create_cart(&self, user_id: &str) -> SyncResult<String> {
        self.check_failing()?;
        let cart_id = Uuid::new_v4().to_string();
        self.carts.lock().await.insert(
            user_id.to_string(),
            StoredCart {
                cart_id: cart_id.clone(),
                is_active: true,
                ..StoredCart::default()
            },
        );
        Ok(cart_id)
    }

    async fn add_item(&self, user_id: &str, _cart_id: &str, item: &LineItem) -> SyncResult<()> {
        self.check_failing()?;
        let mut carts = self.carts.lock().await;
        let cart = carts.entry(user_id.to_string()).or_default();
        if let Some(existing) = cart.items.iter_mut().find(|i| i.id == item.id) {
            *existing = item.clone();
        } else {
            cart.items.push(item.clone());
        }
        Ok(())
    }

    async fn remove_item(&self, user_id: &str, _cart_id: &str, item_id: &str) -> SyncResult<()> {
        self.check_failing()?;
        let mut carts = self.carts.lock().await;
        if let Some(cart) = carts.get_mut(user_id) {
            cart.items.retain(|i| i.id != item_id);
        }
        Ok(())
    }

    async fn update_quantity(
        &self,
        user_id: &str,
        _cart_id: &str,
        item_id: &str,
        quantity: i64,
    ) -> SyncResult<()> {
        self.check_failing()?;
        let mut carts = self.carts.lock().await;
        if let Some(cart) = carts.get_mut(user_id) {
            if quantity <= 0 {
                cart.items.retain(|i| i.id != item_id);
            } else if let Some(item) = cart.items.iter_mut().find(|i| i.id == item_id) {
                item.quantity = quantity;
            }
        }
        Ok(())
    }

    async fn clear_cart(&self, user_id: &str, _cart_id: &str) -> SyncResult<()> {
        self.check_failing()?;
        let mut carts = self.carts.lock().await;
        if let Some(cart) = carts.get_mut(user_id) {
            cart.items.clear();
            cart.coupon = None;
        }
        Ok(())
    }

    async fn apply_coupon(
        &self,
        user_id: &str,
        _cart_id: &str,
        coupon: &AppliedCoupon,
    ) -> SyncResult<()> {
        self.check_failing()?;
        let mut carts = self.carts.lock().await;
        if let Some(cart) = carts.get_mut(user_id) {
            cart.coupon = Some(coupon.clone());
        }
        Ok(())
    }

    async fn remove_coupon(&self, user_id: &str, _cart_id: &str) -> SyncResult<()> {
        self.check_failing()?;
        let mut carts = self.carts.lock().await;
        if let Some(cart) = carts.get_mut(user_id) {
            cart.coupon = None;
        }
        Ok(())
    }

    async fn create_order(&self, order: &OrderPayload) -> SyncResult<String> {
        self.check_failing()?;
        self.orders.lock().await.push(order.clone());
        Ok(Uuid::new_v4().to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bazario_core::money::Money;
    use bazario_core::types::{NewLineItem, ProviderKind};
    use chrono::Utc;

    fn item(product_id: &str) -> LineItem {
        LineItem::new(
            NewLineItem {
                product_id: product_id.to_string(),
                name: "Item".to_string(),
                unit_price: Money::from_cents(500),
                image: None,
                provider_id: "prov".to_string(),
                provider_kind: ProviderKind::Warehouse,
                service_id: "svc".to_string(),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_noop_backend_accepts_everything() {
        let backend = NoopBackend;
        assert!(backend.get_active_cart("u1").await.unwrap().is_none());
        let cart_id = backend.create_cart("u1").await.unwrap();
        assert!(backend.add_item("u1", &cart_id, &item("p1")).await.is_ok());
        assert!(backend.clear_cart("u1", &cart_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let backend = InMemoryBackend::new();
        let cart_id = backend.create_cart("u1").await.unwrap();

        let line = item("p1");
        backend.add_item("u1", &cart_id, &line).await.unwrap();
        backend
            .update_quantity("u1", &cart_id, &line.id, 3)
            .await
            .unwrap();

        let snapshot = backend.get_active_cart("u1").await.unwrap().unwrap();
        assert_eq!(snapshot.cart_id, cart_id);
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].quantity, 3);

        backend.remove_item("u1", &cart_id, &line.id).await.unwrap();
        assert!(backend.items("u1").await.is_empty());
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let backend = InMemoryBackend::new();
        let cart_id = backend.create_cart("u1").await.unwrap();

        backend.set_failing(true);
        assert!(backend.add_item("u1", &cart_id, &item("p1")).await.is_err());

        backend.set_failing(false);
        assert!(backend.add_item("u1", &cart_id, &item("p1")).await.is_ok());
    }
}
