//! # Catalog Boundary Adapter
//!
//! Normalizes raw coupon documents from the catalog backend into the single
//! canonical [`Coupon`] shape.
//!
//! ## Why an Adapter?
//! The backend's coupon documents are duck-typed: the same concept appears
//! under several field names depending on which admin tool wrote it
//! (`discountType` vs `type`, `discountValue` vs `value`, `validTill` vs
//! `validUntil`). That ambiguity stops here. Everything past this module
//! sees one field name per concept, and the eligibility evaluator never
//! touches a raw document.
//!
//! ## Degradation Policy
//! Malformed documents never error: a missing discount value normalizes to
//! zero, an unknown discount type normalizes to a zero fixed discount, and
//! negative amounts clamp to zero. The evaluator then naturally produces a
//! zero discount for such coupons.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coupon::{Coupon, DiscountRule};
use crate::money::{Money, Rate};

// =============================================================================
// Decimal Conversion
// =============================================================================

/// Converts a decimal amount from a backend document into [`Money`].
///
/// This is the single site where decimal JSON numbers become integer minor
/// units; everything downstream is exact integer math. Negative inputs
/// clamp to zero, since no catalog amount is meaningfully negative.
pub fn money_from_decimal(value: f64) -> Money {
    if !value.is_finite() || value <= 0.0 {
        return Money::zero();
    }
    Money::from_cents((value * 100.0).round() as i64)
}

// =============================================================================
// Raw Coupon Document
// =============================================================================

fn default_true() -> bool {
    true
}

/// Usage limits as stored on the raw document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUsageLimit {
    #[serde(default)]
    pub per_user_limit: Option<i64>,

    #[serde(default)]
    pub max_uses: Option<i64>,
}

/// A coupon document exactly as the catalog backend stores it.
///
/// Field aliases mirror the shapes observed in production documents; this
/// type exists only to be fed to [`normalize_coupon`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCoupon {
    pub code: String,

    /// "percentage" or "fixed"; older documents use `type`.
    #[serde(default, alias = "type")]
    pub discount_type: Option<String>,

    /// Percentage points or a flat decimal amount, depending on the type.
    /// Older documents use `value`. Missing means zero.
    #[serde(default, alias = "value")]
    pub discount_value: Option<f64>,

    #[serde(default)]
    pub min_order_amount: Option<f64>,

    #[serde(default)]
    pub min_order_count: Option<i64>,

    /// Cap on percentage discounts. Ignored for fixed discounts.
    #[serde(default)]
    pub max_discount_amount: Option<f64>,

    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,

    #[serde(default, alias = "validUntil")]
    pub valid_till: Option<DateTime<Utc>>,

    #[serde(default)]
    pub usage_limit: Option<RawUsageLimit>,

    /// Some documents keep the global cap at the top level.
    #[serde(default)]
    pub max_uses: Option<i64>,

    #[serde(default)]
    pub used_count: Option<i64>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

// =============================================================================
// Normalization
// =============================================================================

/// Normalizes a raw catalog document into the canonical [`Coupon`].
///
/// ## Example
/// ```rust
/// use bazario_core::catalog::{normalize_coupon, RawCoupon};
/// use bazario_core::coupon::DiscountRule;
/// use bazario_core::money::Money;
///
/// let raw: RawCoupon = serde_json::from_str(
///     r#"{"code": "SAVE20", "type": "percentage", "value": 20.0}"#,
/// ).unwrap();
///
/// let coupon = normalize_coupon(raw);
/// assert_eq!(coupon.code, "SAVE20");
/// assert!(matches!(coupon.discount, DiscountRule::Percentage { .. }));
/// assert_eq!(coupon.min_order_amount, Money::zero());
/// ```
pub fn normalize_coupon(raw: RawCoupon) -> Coupon {
    let value = raw.discount_value.unwrap_or(0.0);

    let discount = match raw
        .discount_type
        .as_deref()
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("percentage") | Some("percent") => DiscountRule::Percentage {
            rate: Rate::from_percent(value),
            max_discount: raw.max_discount_amount.map(money_from_decimal),
        },
        Some("fixed") | Some("flat") => DiscountRule::Fixed {
            amount: money_from_decimal(value),
        },
        // Unknown or missing type degrades to a zero fixed discount.
        _ => DiscountRule::Fixed {
            amount: Money::zero(),
        },
    };

    let usage = raw.usage_limit.unwrap_or_default();

    Coupon {
        code: raw.code,
        discount,
        min_order_amount: raw.min_order_amount.map(money_from_decimal).unwrap_or_default(),
        min_order_count: raw.min_order_count.unwrap_or(0).max(0),
        valid_from: raw.valid_from,
        valid_till: raw.valid_till,
        per_user_limit: usage.per_user_limit,
        // Top-level maxUses wins over the nested form when both are present.
        max_uses: raw.max_uses.or(usage.max_uses),
        used_count: raw.used_count.unwrap_or(0).max(0),
        is_active: raw.is_active,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_decimal() {
        assert_eq!(money_from_decimal(10.99).cents(), 1099);
        assert_eq!(money_from_decimal(100.0).cents(), 10_000);
        assert_eq!(money_from_decimal(0.005).cents(), 1);
        assert_eq!(money_from_decimal(-5.0), Money::zero());
        assert_eq!(money_from_decimal(f64::NAN), Money::zero());
    }

    #[test]
    fn test_normalize_canonical_fields() {
        let raw: RawCoupon = serde_json::from_str(
            r#"{
                "code": "SAVE20",
                "discountType": "percentage",
                "discountValue": 20.0,
                "minOrderAmount": 150.0,
                "maxDiscountAmount": 30.0,
                "usageLimit": {"perUserLimit": 2},
                "usedCount": 1,
                "isActive": true
            }"#,
        )
        .unwrap();

        let coupon = normalize_coupon(raw);
        assert_eq!(coupon.code, "SAVE20");
        assert_eq!(
            coupon.discount,
            DiscountRule::Percentage {
                rate: Rate::from_percent(20.0),
                max_discount: Some(Money::from_cents(3_000)),
            }
        );
        assert_eq!(coupon.min_order_amount.cents(), 15_000);
        assert_eq!(coupon.per_user_limit, Some(2));
        assert_eq!(coupon.used_count, 1);
        assert!(coupon.is_active);
    }

    #[test]
    fn test_normalize_aliased_fields() {
        let raw: RawCoupon = serde_json::from_str(
            r#"{
                "code": "FLAT50",
                "type": "fixed",
                "value": 50.0,
                "validUntil": "2026-12-31T23:59:59Z"
            }"#,
        )
        .unwrap();

        let coupon = normalize_coupon(raw);
        assert_eq!(
            coupon.discount,
            DiscountRule::Fixed {
                amount: Money::from_cents(5_000)
            }
        );
        assert!(coupon.valid_till.is_some());
    }

    #[test]
    fn test_missing_value_degrades_to_zero() {
        let raw: RawCoupon =
            serde_json::from_str(r#"{"code": "BROKEN", "discountType": "percentage"}"#).unwrap();

        let coupon = normalize_coupon(raw);
        assert_eq!(
            coupon.discount,
            DiscountRule::Percentage {
                rate: Rate::zero(),
                max_discount: None,
            }
        );
    }

    #[test]
    fn test_unknown_type_degrades_to_zero_fixed() {
        let raw: RawCoupon =
            serde_json::from_str(r#"{"code": "WEIRD", "discountType": "bogo", "value": 10.0}"#)
                .unwrap();

        let coupon = normalize_coupon(raw);
        assert_eq!(
            coupon.discount,
            DiscountRule::Fixed {
                amount: Money::zero()
            }
        );
    }

    #[test]
    fn test_top_level_max_uses_wins() {
        let raw: RawCoupon = serde_json::from_str(
            r#"{
                "code": "CAPPED",
                "discountType": "fixed",
                "discountValue": 5.0,
                "maxUses": 100,
                "usageLimit": {"maxUses": 7}
            }"#,
        )
        .unwrap();

        assert_eq!(normalize_coupon(raw).max_uses, Some(100));
    }

    #[test]
    fn test_missing_is_active_defaults_true() {
        let raw: RawCoupon = serde_json::from_str(r#"{"code": "LIVE"}"#).unwrap();
        assert!(normalize_coupon(raw).is_active);
    }
}
