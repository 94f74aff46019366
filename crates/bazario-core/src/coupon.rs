//! # Coupon Module
//!
//! Coupon definitions and the eligibility evaluator.
//!
//! ## Evaluation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Coupon Eligibility Evaluation                        │
//! │                                                                         │
//! │  evaluate(coupon, subtotal, items, now)                                 │
//! │       │                                                                 │
//! │       ├── 1. is_active?                ── no ──► 0                      │
//! │       ├── 2. subtotal ≥ min_order_amount?  no ──► 0                     │
//! │       ├── 3. Σ quantity ≥ min_order_count? no ──► 0                     │
//! │       ├── 4. now ≥ valid_from?         ── no ──► 0                      │
//! │       ├── 5. now ≤ valid_till?         ── no ──► 0                      │
//! │       ├── 6. used_count < per_user_limit?  no ──► 0                     │
//! │       ├── 7. used_count < max_uses?    ── no ──► 0                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Percentage: subtotal × rate, clamp to max_discount                     │
//! │  Fixed:      amount                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  min(result, subtotal)  ── a discount never exceeds what it discounts   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The evaluator is a pure function: the clock is injected, no catalog or
//! remote store is consulted, and the same inputs always produce the same
//! amount. It never panics and never returns an error; ineligibility is
//! simply a zero discount.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, Rate};
use crate::types::LineItem;

// =============================================================================
// Discount Rule
// =============================================================================

/// How a coupon computes its discount once eligible.
///
/// The per-rule fields live on the variants so an impossible combination
/// (a cap on a fixed discount) cannot be represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscountRule {
    /// A percentage of the cart subtotal, optionally capped.
    Percentage {
        rate: Rate,
        /// Upper bound on the computed amount. `None` means uncapped.
        max_discount: Option<Money>,
    },
    /// A flat amount off the subtotal.
    Fixed { amount: Money },
}

// =============================================================================
// Coupon
// =============================================================================

/// A discount rule definition, owned by the catalog backend.
///
/// This is the single normalized shape; the backend's duck-typed field
/// aliases are resolved in [`crate::catalog`] before a `Coupon` exists.
/// Read-only from the cart's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Unique match key, case-sensitive.
    pub code: String,

    /// Discount computation rule.
    pub discount: DiscountRule,

    /// Minimum cart subtotal for eligibility.
    pub min_order_amount: Money,

    /// Minimum total item quantity for eligibility.
    pub min_order_count: i64,

    /// Start of the validity window, if bounded.
    pub valid_from: Option<DateTime<Utc>>,

    /// End of the validity window, if bounded.
    pub valid_till: Option<DateTime<Utc>>,

    /// Per-user redemption cap. Reaching the cap disqualifies.
    pub per_user_limit: Option<i64>,

    /// Global redemption cap. Reaching the cap disqualifies.
    pub max_uses: Option<i64>,

    /// Redemptions recorded against whichever cap applies.
    pub used_count: i64,

    /// Catalog-level kill switch.
    pub is_active: bool,
}

// =============================================================================
// Applied Coupon
// =============================================================================

/// A coupon attached to the cart, with its discount materialized.
///
/// ## Invariant
/// `discount` is always derived via [`evaluate`], never set independently.
/// If recomputation yields zero the applied coupon is cleared by the cart,
/// not retained with a zero amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    /// Snapshot of the coupon definition at apply time.
    pub coupon: Coupon,

    /// When the coupon was attached to the cart.
    pub applied_at: DateTime<Utc>,

    /// The discount computed against the current cart contents.
    pub discount: Money,
}

// =============================================================================
// Eligibility Evaluator
// =============================================================================

/// Evaluates a coupon against a cart snapshot and returns the discount.
///
/// ## Contract
/// - `coupon` absent → zero immediately
/// - predicates run in a fixed order and short-circuit to zero on the
///   first failure (see the module diagram)
/// - usage caps use strict less-than: reaching the limit disqualifies
/// - the result is capped at `subtotal` for every rule kind, so the
///   discount can never exceed the amount it applies to
///
/// ## Example
/// ```rust
/// use bazario_core::coupon::{evaluate, Coupon, DiscountRule};
/// use bazario_core::money::{Money, Rate};
/// use chrono::Utc;
///
/// let coupon = Coupon {
///     code: "SAVE20".into(),
///     discount: DiscountRule::Percentage { rate: Rate::from_percent(20.0), max_discount: None },
///     min_order_amount: Money::from_cents(15_000),
///     min_order_count: 0,
///     valid_from: None,
///     valid_till: None,
///     per_user_limit: None,
///     max_uses: None,
///     used_count: 0,
///     is_active: true,
/// };
///
/// // 20% of 200.00 = 40.00
/// let discount = evaluate(Some(&coupon), Money::from_cents(20_000), &[], Utc::now());
/// assert_eq!(discount.cents(), 4_000);
/// ```
pub fn evaluate(
    coupon: Option<&Coupon>,
    subtotal: Money,
    items: &[LineItem],
    now: DateTime<Utc>,
) -> Money {
    let Some(coupon) = coupon else {
        return Money::zero();
    };

    // Predicate 1: catalog kill switch.
    if !coupon.is_active {
        return Money::zero();
    }

    // Predicate 2: minimum order amount.
    if subtotal < coupon.min_order_amount {
        return Money::zero();
    }

    // Predicate 3: minimum item count across all rows.
    let total_quantity: i64 = items.iter().map(|i| i.quantity).sum();
    if total_quantity < coupon.min_order_count {
        return Money::zero();
    }

    // Predicates 4 and 5: validity window, both bounds inclusive.
    if let Some(from) = coupon.valid_from {
        if now < from {
            return Money::zero();
        }
    }
    if let Some(till) = coupon.valid_till {
        if now > till {
            return Money::zero();
        }
    }

    // Predicates 6 and 7: usage caps, strict less-than.
    if let Some(per_user) = coupon.per_user_limit {
        if coupon.used_count >= per_user {
            return Money::zero();
        }
    }
    if let Some(max_uses) = coupon.max_uses {
        if coupon.used_count >= max_uses {
            return Money::zero();
        }
    }

    let raw = match &coupon.discount {
        DiscountRule::Percentage { rate, max_discount } => {
            let amount = subtotal.apply_rate(*rate);
            match max_discount {
                Some(cap) => amount.min(*cap),
                None => amount,
            }
        }
        DiscountRule::Fixed { amount } => *amount,
    };

    raw.min(subtotal)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewLineItem, ProviderKind};
    use chrono::Duration;

    fn percent_coupon(pct: f64, min_amount: i64) -> Coupon {
        Coupon {
            code: "SAVE".to_string(),
            discount: DiscountRule::Percentage {
                rate: Rate::from_percent(pct),
                max_discount: None,
            },
            min_order_amount: Money::from_cents(min_amount),
            min_order_count: 0,
            valid_from: None,
            valid_till: None,
            per_user_limit: None,
            max_uses: None,
            used_count: 0,
            is_active: true,
        }
    }

    fn fixed_coupon(amount: i64) -> Coupon {
        Coupon {
            code: "FLAT".to_string(),
            discount: DiscountRule::Fixed {
                amount: Money::from_cents(amount),
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

    fn items_with_quantity(qty: i64) -> Vec<LineItem> {
        let mut item = LineItem::new(
            NewLineItem {
                product_id: "p1".to_string(),
                name: "Item".to_string(),
                unit_price: Money::from_cents(100),
                image: None,
                provider_id: "prov".to_string(),
                provider_kind: ProviderKind::Warehouse,
                service_id: "svc".to_string(),
            },
            Utc::now(),
        );
        item.quantity = qty;
        vec![item]
    }

    #[test]
    fn test_no_coupon_is_zero() {
        assert_eq!(
            evaluate(None, Money::from_cents(10_000), &[], Utc::now()),
            Money::zero()
        );
    }

    #[test]
    fn test_percentage_above_minimum() {
        // 20% min 150.00 against subtotal 200.00 → 40.00
        let coupon = percent_coupon(20.0, 15_000);
        let discount = evaluate(Some(&coupon), Money::from_cents(20_000), &[], Utc::now());
        assert_eq!(discount.cents(), 4_000);
    }

    #[test]
    fn test_percentage_below_minimum_is_zero() {
        // Same coupon against subtotal 100.00 → ineligible
        let coupon = percent_coupon(20.0, 15_000);
        let discount = evaluate(Some(&coupon), Money::from_cents(10_000), &[], Utc::now());
        assert_eq!(discount, Money::zero());
    }

    #[test]
    fn test_fixed_capped_at_subtotal() {
        // Flat 50.00 against subtotal 30.00 → 30.00
        let coupon = fixed_coupon(5_000);
        let discount = evaluate(Some(&coupon), Money::from_cents(3_000), &[], Utc::now());
        assert_eq!(discount.cents(), 3_000);
    }

    #[test]
    fn test_percentage_over_hundred_capped_at_subtotal() {
        let coupon = percent_coupon(150.0, 0);
        let discount = evaluate(Some(&coupon), Money::from_cents(2_000), &[], Utc::now());
        assert_eq!(discount.cents(), 2_000);
    }

    #[test]
    fn test_max_discount_cap() {
        let mut coupon = percent_coupon(20.0, 0);
        coupon.discount = DiscountRule::Percentage {
            rate: Rate::from_percent(20.0),
            max_discount: Some(Money::from_cents(1_500)),
        };
        // 20% of 200.00 = 40.00, capped to 15.00
        let discount = evaluate(Some(&coupon), Money::from_cents(20_000), &[], Utc::now());
        assert_eq!(discount.cents(), 1_500);
    }

    #[test]
    fn test_inactive_is_zero() {
        let mut coupon = percent_coupon(20.0, 0);
        coupon.is_active = false;
        let discount = evaluate(Some(&coupon), Money::from_cents(20_000), &[], Utc::now());
        assert_eq!(discount, Money::zero());
    }

    #[test]
    fn test_min_order_count() {
        let mut coupon = fixed_coupon(500);
        coupon.min_order_count = 3;

        let two = items_with_quantity(2);
        assert_eq!(
            evaluate(Some(&coupon), Money::from_cents(10_000), &two, Utc::now()),
            Money::zero()
        );

        let three = items_with_quantity(3);
        assert_eq!(
            evaluate(Some(&coupon), Money::from_cents(10_000), &three, Utc::now()).cents(),
            500
        );
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let mut coupon = fixed_coupon(500);

        coupon.valid_from = Some(now + Duration::hours(1));
        assert_eq!(
            evaluate(Some(&coupon), Money::from_cents(10_000), &[], now),
            Money::zero()
        );

        coupon.valid_from = Some(now - Duration::hours(1));
        coupon.valid_till = Some(now - Duration::minutes(1));
        assert_eq!(
            evaluate(Some(&coupon), Money::from_cents(10_000), &[], now),
            Money::zero()
        );

        // Bounds are inclusive
        coupon.valid_from = Some(now);
        coupon.valid_till = Some(now);
        assert_eq!(
            evaluate(Some(&coupon), Money::from_cents(10_000), &[], now).cents(),
            500
        );
    }

    #[test]
    fn test_usage_limits_strict() {
        let mut coupon = fixed_coupon(500);
        coupon.per_user_limit = Some(2);

        coupon.used_count = 1;
        assert_eq!(
            evaluate(Some(&coupon), Money::from_cents(10_000), &[], Utc::now()).cents(),
            500
        );

        // Reaching the limit disqualifies
        coupon.used_count = 2;
        assert_eq!(
            evaluate(Some(&coupon), Money::from_cents(10_000), &[], Utc::now()),
            Money::zero()
        );

        coupon.per_user_limit = None;
        coupon.max_uses = Some(2);
        assert_eq!(
            evaluate(Some(&coupon), Money::from_cents(10_000), &[], Utc::now()),
            Money::zero()
        );
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let coupon = percent_coupon(12.5, 0);
        let now = Utc::now();
        let first = evaluate(Some(&coupon), Money::from_cents(19_999), &[], now);
        let second = evaluate(Some(&coupon), Money::from_cents(19_999), &[], now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_discount_never_negative() {
        let coupon = percent_coupon(0.0, 0);
        let discount = evaluate(Some(&coupon), Money::from_cents(10_000), &[], Utc::now());
        assert!(!discount.is_negative());
    }
}
