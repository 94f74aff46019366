//! # Cart Aggregate
//!
//! The shopping cart aggregate and its reducer.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Shell Action             CartAction               State Change         │
//! │  ────────────             ──────────               ────────────         │
//! │                                                                         │
//! │  Tap product ───────────► AddItem ────────────────► merge or push       │
//! │                                                                         │
//! │  Change quantity ───────► UpdateQuantity ─────────► set / remove row    │
//! │                                                                         │
//! │  Tap remove ────────────► RemoveItem ─────────────► retain others       │
//! │                                                                         │
//! │  Enter coupon code ─────► ApplyCoupon ────────────► evaluate + attach   │
//! │                                                                         │
//! │  Remote snapshot ───────► SetItems ───────────────► bulk replace        │
//! │                                                                         │
//! │  Tap clear ─────────────► Clear ──────────────────► empty aggregate     │
//! │                                                                         │
//! │  EVERY operation recomputes the derived totals before returning, so     │
//! │  the invariants below hold at every observable point.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! After every operation:
//! 1. `total_items == Σ quantity`
//! 2. `subtotal == Σ unit_price × quantity`
//! 3. `discount == evaluate(applied_coupon, subtotal, items, now)`
//! 4. `total_amount == max(0, subtotal − discount)`
//! 5. no line item has `quantity <= 0`
//! 6. an applied coupon whose discount recomputes to zero is cleared
//!
//! Operations are synchronous and total: invalid input degrades to a safe
//! default (negative quantity removes the row) instead of returning errors.
//! Remote persistence is the caller's concern, dispatched after the local
//! transition completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coupon::{evaluate, AppliedCoupon, Coupon};
use crate::money::Money;
use crate::types::{LineItem, NewLineItem};

// =============================================================================
// Cart Action
// =============================================================================

/// One cart state transition.
///
/// The shell dispatches actions; the aggregate is never mutated directly.
#[derive(Debug, Clone)]
pub enum CartAction {
    /// Add a product; merges by `product_id` with quantity +1.
    AddItem(NewLineItem),
    /// Remove the row with this identity. No-op if absent.
    RemoveItem { id: String },
    /// Set a row's quantity; zero or negative removes the row.
    UpdateQuantity { id: String, quantity: i64 },
    /// Attach a coupon, recomputing its discount immediately.
    ApplyCoupon(Coupon),
    /// Detach the applied coupon.
    RemoveCoupon,
    /// Bulk-replace items and coupon atomically (remote reconciliation).
    SetItems {
        items: Vec<LineItem>,
        coupon: Option<AppliedCoupon>,
    },
    /// Reset to the empty aggregate.
    Clear,
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart aggregate.
///
/// Fields are private: the only way to change the cart is through the
/// operations below, which keep the derived totals consistent. The
/// aggregate is owned exclusively by the session that created it.
#[derive(Debug, Clone)]
pub struct Cart {
    items: Vec<LineItem>,
    applied_coupon: Option<AppliedCoupon>,

    // Derived fields, recomputed after every mutation.
    total_items: i64,
    subtotal: Money,
    discount: Money,
    total_amount: Money,

    updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new(now: DateTime<Utc>) -> Self {
        Cart {
            items: Vec::new(),
            applied_coupon: None,
            total_items: 0,
            subtotal: Money::zero(),
            discount: Money::zero(),
            total_amount: Money::zero(),
            updated_at: now,
        }
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    /// The current line items.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The currently applied coupon, if any.
    pub fn applied_coupon(&self) -> Option<&AppliedCoupon> {
        self.applied_coupon.as_ref()
    }

    /// Total quantity across all rows.
    pub fn total_items(&self) -> i64 {
        self.total_items
    }

    /// Sum of line totals before discount.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// The materialized coupon discount, zero when none applies.
    pub fn discount(&self) -> Money {
        self.discount
    }

    /// `max(0, subtotal − discount)`.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// When the cart last changed.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Number of distinct rows.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Applies one action to the aggregate.
    ///
    /// Dispatch is the single entry point the shell uses; the named methods
    /// below exist for callers that need a return value (apply_coupon).
    pub fn dispatch(&mut self, action: CartAction, now: DateTime<Utc>) {
        match action {
            CartAction::AddItem(product) => self.add_item(product, now),
            CartAction::RemoveItem { id } => self.remove_item(&id, now),
            CartAction::UpdateQuantity { id, quantity } => {
                self.update_quantity(&id, quantity, now)
            }
            CartAction::ApplyCoupon(coupon) => {
                self.apply_coupon(coupon, now);
            }
            CartAction::RemoveCoupon => self.remove_coupon(now),
            CartAction::SetItems { items, coupon } => self.set_items(items, coupon, now),
            CartAction::Clear => self.clear(now),
        }
    }

    /// Adds a product to the cart.
    ///
    /// ## Behavior
    /// - same `product_id` already present: quantity +1 (the cart never
    ///   holds two rows for one product)
    /// - otherwise: new row with quantity 1 and a fresh identity
    pub fn add_item(&mut self, product: NewLineItem, now: DateTime<Utc>) {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product.product_id)
        {
            item.quantity += 1;
        } else {
            self.items.push(LineItem::new(product, now));
        }
        self.recompute(now);
    }

    /// Removes the row matching `id` (row identity, not product identity).
    ///
    /// A missing id is a no-op, not an error.
    pub fn remove_item(&mut self, id: &str, now: DateTime<Utc>) {
        self.items.retain(|i| i.id != id);
        self.recompute(now);
    }

    /// Sets a row's quantity.
    ///
    /// ## Behavior
    /// - quantity is clamped to >= 0 first
    /// - a resulting quantity of 0 removes the row entirely
    /// - a missing id is a no-op
    pub fn update_quantity(&mut self, id: &str, quantity: i64, now: DateTime<Utc>) {
        let quantity = quantity.max(0);
        if quantity == 0 {
            self.items.retain(|i| i.id != id);
        } else if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.quantity = quantity;
        }
        self.recompute(now);
    }

    /// Attaches a coupon and returns the discount it computes right now.
    ///
    /// A zero result means the coupon was not retained; the caller can
    /// compare the requested coupon against the returned amount to surface
    /// "coupon not applicable" without the aggregate raising an error.
    pub fn apply_coupon(&mut self, coupon: Coupon, now: DateTime<Utc>) -> Money {
        self.applied_coupon = Some(AppliedCoupon {
            coupon,
            applied_at: now,
            discount: Money::zero(),
        });
        self.recompute(now);
        self.discount
    }

    /// Detaches the applied coupon; the discount returns to zero.
    pub fn remove_coupon(&mut self, now: DateTime<Utc>) {
        self.applied_coupon = None;
        self.recompute(now);
    }

    /// Bulk-replaces items and coupon in one transition.
    ///
    /// Used when reconciling with the remote store. Rows without a positive
    /// quantity are dropped on the way in; the coupon's discount is
    /// recomputed against the replaced contents.
    pub fn set_items(
        &mut self,
        items: Vec<LineItem>,
        coupon: Option<AppliedCoupon>,
        now: DateTime<Utc>,
    ) {
        self.items = items.into_iter().filter(|i| i.quantity > 0).collect();
        self.applied_coupon = coupon;
        self.recompute(now);
    }

    /// Resets to the empty aggregate.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.items.clear();
        self.applied_coupon = None;
        self.recompute(now);
    }

    // =========================================================================
    // Derived State
    // =========================================================================

    /// Recomputes every derived field and re-evaluates the applied coupon.
    ///
    /// An applied coupon whose discount comes out zero is cleared here, so
    /// the aggregate never carries a dead coupon.
    fn recompute(&mut self, now: DateTime<Utc>) {
        self.total_items = self.items.iter().map(|i| i.quantity).sum();
        self.subtotal = self
            .items
            .iter()
            .fold(Money::zero(), |acc, i| acc + i.line_total());

        if let Some(applied) = self.applied_coupon.take() {
            let discount = evaluate(Some(&applied.coupon), self.subtotal, &self.items, now);
            if !discount.is_zero() {
                self.applied_coupon = Some(AppliedCoupon {
                    discount,
                    ..applied
                });
            }
        }

        self.discount = self
            .applied_coupon
            .as_ref()
            .map(|a| a.discount)
            .unwrap_or_default();
        self.total_amount = self.subtotal.sub_or_zero(self.discount);
        self.updated_at = now;
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart totals summary for shell responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub total_items: i64,
    pub subtotal: Money,
    pub discount: Money,
    pub total_amount: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            total_items: cart.total_items(),
            subtotal: cart.subtotal(),
            discount: cart.discount(),
            total_amount: cart.total_amount(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coupon::DiscountRule;
    use crate::money::Rate;
    use crate::types::ProviderKind;

    fn product(id: &str, price_cents: i64) -> NewLineItem {
        NewLineItem {
            product_id: id.to_string(),
            name: format!("Product {}", id),
            unit_price: Money::from_cents(price_cents),
            image: None,
            provider_id: "prov-1".to_string(),
            provider_kind: ProviderKind::Warehouse,
            service_id: "svc-1".to_string(),
        }
    }

    fn percent_coupon(pct: f64, min_amount_cents: i64) -> Coupon {
        Coupon {
            code: "SAVE".to_string(),
            discount: DiscountRule::Percentage {
                rate: Rate::from_percent(pct),
                max_discount: None,
            },
            min_order_amount: Money::from_cents(min_amount_cents),
            min_order_count: 0,
            valid_from: None,
            valid_till: None,
            per_user_limit: None,
            max_uses: None,
            used_count: 0,
            is_active: true,
        }
    }

    fn fixed_coupon(amount_cents: i64) -> Coupon {
        Coupon {
            code: "FLAT".to_string(),
            discount: DiscountRule::Fixed {
                amount: Money::from_cents(amount_cents),
            },
            min_order_amount: Money::zero(),
            min_order_count: 0,
            valid_from: None,
            valid_till: None,
            per_user_limit: None,
            max_uses: None,
            used_count: 0,
            is_active: true,
        }
    }

    fn assert_invariants(cart: &Cart) {
        let expected_count: i64 = cart.items().iter().map(|i| i.quantity).sum();
        let expected_subtotal = cart
            .items()
            .iter()
            .fold(Money::zero(), |acc, i| acc + i.line_total());

        assert_eq!(cart.total_items(), expected_count);
        assert_eq!(cart.subtotal(), expected_subtotal);
        assert_eq!(
            cart.total_amount(),
            cart.subtotal().sub_or_zero(cart.discount())
        );
        assert!(cart.items().iter().all(|i| i.quantity > 0));
        assert!(!cart.discount().is_negative());
        assert!(cart.discount() <= cart.subtotal());
    }

    #[test]
    fn test_add_same_product_merges() {
        let now = Utc::now();
        let mut cart = Cart::new(now);

        // Product at 100.00 added twice → one row, qty 2, subtotal 200.00
        cart.add_item(product("a", 10_000), now);
        cart.add_item(product("a", 10_000), now);

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.subtotal().cents(), 20_000);
        assert_invariants(&cart);
    }

    #[test]
    fn test_add_distinct_products() {
        let now = Utc::now();
        let mut cart = Cart::new(now);

        cart.add_item(product("a", 500), now);
        cart.add_item(product("b", 750), now);

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.subtotal().cents(), 1_250);
        assert_invariants(&cart);
    }

    #[test]
    fn test_remove_item_by_row_identity() {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        cart.add_item(product("a", 500), now);
        cart.add_item(product("b", 750), now);

        let id = cart.items()[0].id.clone();
        cart.remove_item(&id, now);

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].product_id, "b");
        assert_invariants(&cart);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        cart.add_item(product("a", 500), now);

        cart.remove_item("no-such-row", now);

        assert_eq!(cart.item_count(), 1);
        assert_invariants(&cart);
    }

    #[test]
    fn test_update_quantity() {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        cart.add_item(product("a", 500), now);

        let id = cart.items()[0].id.clone();
        cart.update_quantity(&id, 4, now);

        assert_eq!(cart.total_items(), 4);
        assert_eq!(cart.subtotal().cents(), 2_000);
        assert_invariants(&cart);
    }

    #[test]
    fn test_update_quantity_to_zero_removes() {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        cart.add_item(product("a", 500), now);

        let id = cart.items()[0].id.clone();
        cart.update_quantity(&id, 0, now);

        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_invariants(&cart);
    }

    #[test]
    fn test_negative_quantity_clamps_to_removal() {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        cart.add_item(product("a", 500), now);

        let id = cart.items()[0].id.clone();
        cart.update_quantity(&id, -3, now);

        assert!(cart.is_empty());
        assert_invariants(&cart);
    }

    #[test]
    fn test_apply_percentage_coupon() {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        cart.add_item(product("a", 10_000), now);
        cart.add_item(product("a", 10_000), now);

        // 20% min 150.00 against subtotal 200.00 → 40.00 off
        let applied = cart.apply_coupon(percent_coupon(20.0, 15_000), now);

        assert_eq!(applied.cents(), 4_000);
        assert_eq!(cart.discount().cents(), 4_000);
        assert_eq!(cart.total_amount().cents(), 16_000);
        assert!(cart.applied_coupon().is_some());
        assert_invariants(&cart);
    }

    #[test]
    fn test_ineligible_coupon_not_retained() {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        cart.add_item(product("a", 10_000), now);

        // Subtotal 100.00 is below the 150.00 minimum
        let applied = cart.apply_coupon(percent_coupon(20.0, 15_000), now);

        assert_eq!(applied, Money::zero());
        assert!(cart.applied_coupon().is_none());
        assert_eq!(cart.discount(), Money::zero());
        assert_eq!(cart.total_amount().cents(), 10_000);
        assert_invariants(&cart);
    }

    #[test]
    fn test_fixed_coupon_capped_at_subtotal() {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        cart.add_item(product("a", 3_000), now);

        // Flat 50.00 against subtotal 30.00 → total goes to zero
        let applied = cart.apply_coupon(fixed_coupon(5_000), now);

        assert_eq!(applied.cents(), 3_000);
        assert_eq!(cart.total_amount(), Money::zero());
        assert_invariants(&cart);
    }

    #[test]
    fn test_coupon_cleared_when_cart_drains() {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        cart.add_item(product("a", 10_000), now);
        cart.add_item(product("a", 10_000), now);
        cart.apply_coupon(percent_coupon(20.0, 15_000), now);
        assert!(cart.applied_coupon().is_some());

        // Dropping the only row to zero drains the cart; the discount
        // recomputes to zero and the coupon is cleared, not kept at zero.
        let id = cart.items()[0].id.clone();
        cart.update_quantity(&id, 0, now);

        assert!(cart.is_empty());
        assert!(cart.applied_coupon().is_none());
        assert_eq!(cart.discount(), Money::zero());
        assert_eq!(cart.total_amount(), Money::zero());
        assert_invariants(&cart);
    }

    #[test]
    fn test_coupon_cleared_when_subtotal_falls_below_minimum() {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        cart.add_item(product("a", 10_000), now);
        cart.add_item(product("a", 10_000), now);
        cart.apply_coupon(percent_coupon(20.0, 15_000), now);

        let id = cart.items()[0].id.clone();
        cart.update_quantity(&id, 1, now);

        // Subtotal 100.00 no longer meets the 150.00 floor
        assert!(cart.applied_coupon().is_none());
        assert_eq!(cart.discount(), Money::zero());
        assert_invariants(&cart);
    }

    #[test]
    fn test_remove_coupon() {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        cart.add_item(product("a", 20_000), now);
        cart.apply_coupon(percent_coupon(10.0, 0), now);
        assert_eq!(cart.discount().cents(), 2_000);

        cart.remove_coupon(now);

        assert!(cart.applied_coupon().is_none());
        assert_eq!(cart.discount(), Money::zero());
        assert_eq!(cart.total_amount().cents(), 20_000);
        assert_invariants(&cart);
    }

    #[test]
    fn test_set_items_replaces_atomically() {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        cart.add_item(product("a", 500), now);

        let mut replacement = vec![
            LineItem::new(product("x", 1_000), now),
            LineItem::new(product("y", 2_000), now),
        ];
        replacement[0].quantity = 2;
        // A zero-quantity row from the remote snapshot must not survive
        let mut dead = LineItem::new(product("z", 999), now);
        dead.quantity = 0;
        replacement.push(dead);

        cart.set_items(replacement, None, now);

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.subtotal().cents(), 4_000);
        assert_invariants(&cart);
    }

    #[test]
    fn test_set_items_reevaluates_coupon() {
        let now = Utc::now();
        let mut cart = Cart::new(now);

        let applied = AppliedCoupon {
            coupon: percent_coupon(10.0, 0),
            applied_at: now,
            // Remote snapshots can carry stale amounts; it must be rederived
            discount: Money::from_cents(12_345),
        };

        let mut item = LineItem::new(product("x", 10_000), now);
        item.quantity = 2;
        cart.set_items(vec![item], Some(applied), now);

        assert_eq!(cart.discount().cents(), 2_000);
        assert_invariants(&cart);
    }

    #[test]
    fn test_clear() {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        cart.add_item(product("a", 500), now);
        cart.apply_coupon(fixed_coupon(100), now);

        cart.clear(now);

        assert!(cart.is_empty());
        assert!(cart.applied_coupon().is_none());
        assert_eq!(cart.total_amount(), Money::zero());
        assert_invariants(&cart);
    }

    #[test]
    fn test_dispatch_routes_actions() {
        let now = Utc::now();
        let mut cart = Cart::new(now);

        cart.dispatch(CartAction::AddItem(product("a", 10_000)), now);
        cart.dispatch(CartAction::AddItem(product("a", 10_000)), now);
        cart.dispatch(CartAction::ApplyCoupon(percent_coupon(20.0, 15_000)), now);

        assert_eq!(cart.total_amount().cents(), 16_000);

        cart.dispatch(CartAction::RemoveCoupon, now);
        assert_eq!(cart.total_amount().cents(), 20_000);

        cart.dispatch(CartAction::Clear, now);
        assert!(cart.is_empty());
        assert_invariants(&cart);
    }

    #[test]
    fn test_invariants_across_operation_sequence() {
        let now = Utc::now();
        let mut cart = Cart::new(now);

        cart.add_item(product("a", 999), now);
        assert_invariants(&cart);
        cart.add_item(product("b", 2_499), now);
        assert_invariants(&cart);
        cart.add_item(product("a", 999), now);
        assert_invariants(&cart);
        cart.apply_coupon(fixed_coupon(1_000), now);
        assert_invariants(&cart);

        let id = cart.items()[1].id.clone();
        cart.update_quantity(&id, 5, now);
        assert_invariants(&cart);
        cart.remove_item(&id, now);
        assert_invariants(&cart);
        cart.clear(now);
        assert_invariants(&cart);
    }

    #[test]
    fn test_totals_dto() {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        cart.add_item(product("a", 10_000), now);

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.total_items, 1);
        assert_eq!(totals.subtotal.cents(), 10_000);
        assert_eq!(totals.discount, Money::zero());
        assert_eq!(totals.total_amount.cents(), 10_000);
    }
}
