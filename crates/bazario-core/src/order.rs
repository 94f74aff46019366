//! # Order Assembler
//!
//! Assembles an immutable order payload from the cart aggregate and the
//! caller-supplied delivery/payment selections.
//!
//! ## Assembly Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Assembly                                    │
//! │                                                                         │
//! │  Cart Aggregate          CheckoutSelection                              │
//! │  (items, totals)         (customer, address, slot, charge)              │
//! │        │                        │                                       │
//! │        └────────┬───────────────┘                                       │
//! │                 ▼                                                       │
//! │  assemble(cart, checkout, now)                                          │
//! │                 │                                                       │
//! │                 ├── cart empty or no customer? ──► None                 │
//! │                 │                                                       │
//! │                 ├── 1. defensive copy of items + totals                 │
//! │                 ├── 2. resolve address (structured > heuristics)        │
//! │                 ├── 3. taxes = total_amount × 5%                        │
//! │                 ├── 4. final = total + delivery_charge + taxes          │
//! │                 ├── 5. coupon → single-element list                     │
//! │                 └── 6. stamp timestamps, pending statuses               │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  OrderPayload (never mutated after this point)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::money::{Money, Rate};
use crate::types::{Customer, LineItem, OrderStatus, PaymentStatus, ProviderKind};

// =============================================================================
// Policy Constants
// =============================================================================

/// Flat order tax applied to the discounted total.
///
/// A fixed policy constant, not configurable per item or category.
pub const TAX_RATE: Rate = Rate::from_bps(500); // 5%

// =============================================================================
// Delivery Selection
// =============================================================================

/// A geographic point from the address picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A delivery time slot from the slot picker. Opaque to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub date: String,
    pub window: String,
}

/// Address fields as supplied by the UI-level picker.
///
/// Structured fields are preferred; the free-text line is the fallback
/// source for the heuristics below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    /// Free-text address line, always present.
    pub full_address: String,

    /// Structured pincode, when the picker captured one.
    pub pincode: Option<String>,

    /// Structured city, when the picker captured one.
    pub city: Option<String>,

    pub geo_point: Option<GeoPoint>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
}

/// Everything checkout needs beyond the cart itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSelection {
    /// The resolved user identity; checkout cannot proceed without one.
    pub customer: Option<Customer>,

    pub address: AddressInput,
    pub slot: Option<TimeSlot>,

    /// Opaque payment method label from the payment picker.
    pub payment_method: Option<String>,

    /// Delivery charge quoted by the delivery collaborator.
    pub delivery_charge: Money,
}

// =============================================================================
// Order Payload
// =============================================================================

/// Resolved delivery fields carried on the order payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
    pub address: String,
    pub pincode: Option<String>,
    pub city: Option<String>,
    pub geo_point: Option<GeoPoint>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub slot: Option<TimeSlot>,
}

/// A line item frozen into an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub line_total: Money,
    pub image: Option<String>,
    pub provider_id: String,
    pub provider_kind: ProviderKind,
    pub service_id: String,
}

impl From<&LineItem> for OrderItem {
    fn from(item: &LineItem) -> Self {
        OrderItem {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            line_total: item.line_total(),
            image: item.image.clone(),
            provider_id: item.provider_id.clone(),
            provider_kind: item.provider_kind,
            service_id: item.service_id.clone(),
        }
    }
}

/// A coupon frozen into an order.
///
/// Orders carry a list even though the cart holds at most one coupon, so a
/// future stacking feature does not change the payload shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCoupon {
    pub code: String,
    pub discount: Money,
    pub applied_at: DateTime<Utc>,
}

/// The immutable snapshot submitted at checkout.
///
/// ## Guarantee
/// The payload is internally consistent: re-deriving `subtotal`,
/// `discount` and `total_amount` from its own `items` and
/// `applied_coupons` reproduces the stored values exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub discount: Money,
    pub total_amount: Money,

    pub applied_coupons: Vec<OrderCoupon>,

    pub delivery: DeliveryDetails,
    pub delivery_charge: Money,
    pub taxes: Money,
    pub final_amount: Money,

    pub customer: Customer,
    pub payment_method: Option<String>,

    pub status: OrderStatus,
    pub payment_status: PaymentStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Address Heuristics
// =============================================================================

/// Extracts a pincode as the first run of 6 consecutive digits.
///
/// Best-effort fallback for free-text addresses; a structured pincode
/// always wins. The window match keeps the behavior of a plain `[0-9]{6}`
/// pattern: a longer digit run still yields its first 6 digits.
fn extract_pincode(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut run_start = None;

    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            let start = *run_start.get_or_insert(i);
            if i + 1 - start == 6 {
                // Safe: the window is all ASCII digits
                return Some(text[start..=i].to_string());
            }
        } else {
            run_start = None;
        }
    }
    None
}

/// Extracts a city as the third comma-token from the end.
///
/// Known heuristic with no correctness guarantee for arbitrary address
/// strings ("street, area, city, state, pincode" shapes put the city third
/// from the end). Structured input always wins.
fn extract_city(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.len() < 3 {
        return None;
    }
    Some(tokens[tokens.len() - 3].to_string())
}

fn resolve_delivery(address: &AddressInput, slot: Option<TimeSlot>) -> DeliveryDetails {
    DeliveryDetails {
        address: address.full_address.clone(),
        pincode: address
            .pincode
            .clone()
            .or_else(|| extract_pincode(&address.full_address)),
        city: address
            .city
            .clone()
            .or_else(|| extract_city(&address.full_address)),
        geo_point: address.geo_point.clone(),
        contact_name: address.contact_name.clone(),
        contact_phone: address.contact_phone.clone(),
        slot,
    }
}

// =============================================================================
// Assembly
// =============================================================================

/// Assembles an order payload from the cart and checkout selections.
///
/// Returns `None` when the cart is empty or no customer identity is
/// resolved. Both are expected outcomes the caller prompts the user about,
/// not failures.
///
/// The cart is read, never modified: the payload owns defensive copies and
/// stays valid while the live cart keeps mutating.
pub fn assemble(
    cart: &Cart,
    checkout: &CheckoutSelection,
    now: DateTime<Utc>,
) -> Option<OrderPayload> {
    if cart.is_empty() {
        return None;
    }
    let customer = checkout.customer.clone()?;

    let items: Vec<OrderItem> = cart.items().iter().map(OrderItem::from).collect();

    let applied_coupons: Vec<OrderCoupon> = cart
        .applied_coupon()
        .map(|a| OrderCoupon {
            code: a.coupon.code.clone(),
            discount: a.discount,
            applied_at: a.applied_at,
        })
        .into_iter()
        .collect();

    let taxes = cart.total_amount().apply_rate(TAX_RATE);
    let final_amount = cart.total_amount() + checkout.delivery_charge + taxes;

    Some(OrderPayload {
        items,
        subtotal: cart.subtotal(),
        discount: cart.discount(),
        total_amount: cart.total_amount(),
        applied_coupons,
        delivery: resolve_delivery(&checkout.address, checkout.slot.clone()),
        delivery_charge: checkout.delivery_charge,
        taxes,
        final_amount,
        customer,
        payment_method: checkout.payment_method.clone(),
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        created_at: now,
        updated_at: now,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
