//! # Domain Types
//!
//! Core domain types used throughout Bazario.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │   │    Customer     │   │  ProviderKind   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id             │   │  Restaurant     │       │
//! │  │  product_id     │   │  name           │   │  Warehouse      │       │
//! │  │  unit_price     │   │  phone          │   └─────────────────┘       │
//! │  │  quantity       │   └─────────────────┘                             │
//! │  └─────────────────┘                                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   OrderStatus   │   │  PaymentStatus  │                             │
//! │  │  Pending/...    │   │  Pending/...    │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! A line item has:
//! - `id`: UUID v4 - immutable row identity, stable across quantity updates
//! - `product_id`: catalog identity, the merge key when the same product
//!   is added again

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Provider Kind
// =============================================================================

/// The kind of provider a line item was sourced from.
///
/// The storefront sells from restaurant menus and warehouse (grocery)
/// catalogs through the same cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Prepared-food provider.
    Restaurant,
    /// Grocery/dark-store provider.
    Warehouse,
}

// =============================================================================
// Line Item
// =============================================================================

/// One product/quantity row in the cart.
///
/// ## Design Notes
/// - `product_id`: catalog reference, the merge key on add
/// - price and name are frozen at add time (snapshot pattern), so the cart
///   displays consistent data even if the catalog document changes later
///
/// ## Invariant
/// `quantity > 0`. A row that would reach quantity zero is removed from the
/// cart, never retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Row identity (UUID v4), stable across quantity updates.
    pub id: String,

    /// Catalog product this row refers to.
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Unit price at time of adding (frozen, non-negative).
    pub unit_price: Money,

    /// Quantity in cart, always > 0 while the row exists.
    pub quantity: i64,

    /// Product image reference for the cart screen.
    pub image: Option<String>,

    /// Provider that fulfills this row.
    pub provider_id: String,

    /// Whether the provider is a restaurant or a warehouse.
    pub provider_kind: ProviderKind,

    /// Delivery service the provider belongs to.
    pub service_id: String,

    /// When this row was first added to the cart.
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    /// Creates a new cart row from catalog data with quantity 1.
    ///
    /// ## Price Freezing
    /// The price is captured at this moment. If the catalog price changes,
    /// this row retains the original price.
    pub fn new(product: NewLineItem, now: DateTime<Utc>) -> Self {
        LineItem {
            id: Uuid::new_v4().to_string(),
            product_id: product.product_id,
            name: product.name,
            unit_price: product.unit_price,
            quantity: 1,
            image: product.image,
            provider_id: product.provider_id,
            provider_kind: product.provider_kind,
            service_id: product.service_id,
            added_at: now,
        }
    }

    /// Calculates the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// Catalog data for a product about to enter the cart.
///
/// The cart owns row identity and quantity; callers only supply what the
/// catalog knows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub image: Option<String>,
    pub provider_id: String,
    pub provider_kind: ProviderKind,
    pub service_id: String,
}

// =============================================================================
// Customer
// =============================================================================

/// The resolved identity an order is placed under.
///
/// Authentication is an external collaborator; the core only needs the
/// resolved identity fields the order payload carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The fulfillment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order submitted, awaiting confirmation.
    Pending,
    /// Provider accepted the order.
    Confirmed,
    /// Order handed to the customer.
    Delivered,
    /// Order cancelled before delivery.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// The payment status of an order.
///
/// Gateway protocol details (checksums, redirects) belong to the external
/// payment collaborator; the core only stamps the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment not yet captured.
    Pending,
    /// Gateway confirmed the payment.
    Paid,
    /// Gateway reported a failure.
    Failed,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
