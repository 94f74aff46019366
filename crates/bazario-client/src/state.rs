//! # Cart State
//!
//! Owns the session's cart aggregate.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because:
//! 1. Service methods may run from different shell callbacks
//! 2. Only one operation may mutate the cart at a time
//! 3. Each operation is one atomic state transition under the lock,
//!    applied in dispatch order
//!
//! The aggregate itself is owned exclusively by the session that created
//! it; nothing outside this state wrapper holds a reference to it.

use std::sync::{Arc, Mutex};

use bazario_core::cart::Cart;
use chrono::Utc;

/// Session-owned cart state.
///
/// ## Why Not RwLock?
/// Cart operations are quick, and most operations modify state. A RwLock
/// would add complexity with minimal benefit.
#[derive(Debug, Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new(Utc::now()))),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = cart_state.with_cart(|cart| CartTotals::from(cart));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        // A poisoned lock still holds a consistent aggregate: every
        // transition recomputes deriveds before returning, so recover
        // instead of propagating the panic
        let cart = self.cart.lock().unwrap_or_else(|e| e.into_inner());
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.add_item(product, now));
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut cart)
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
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

    fn product(id: &str) -> NewLineItem {
        NewLineItem {
            product_id: id.to_string(),
            name: format!("Product {}", id),
            unit_price: Money::from_cents(999),
            image: None,
            provider_id: "prov".to_string(),
            provider_kind: ProviderKind::Warehouse,
            service_id: "svc".to_string(),
        }
    }

    #[test]
    fn test_mutations_visible_to_reads() {
        let state = CartState::new();
        let now = Utc::now();

        state.with_cart_mut(|cart| cart.add_item(product("a"), now));

        let (count, subtotal) = state.with_cart(|cart| (cart.total_items(), cart.subtotal()));
        assert_eq!(count, 1);
        assert_eq!(subtotal.cents(), 999);
    }

    #[test]
    fn test_clones_share_the_same_cart() {
        let state = CartState::new();
        let alias = state.clone();
        let now = Utc::now();

        state.with_cart_mut(|cart| cart.add_item(product("a"), now));

        assert_eq!(alias.with_cart(|cart| cart.total_items()), 1);
    }
}
