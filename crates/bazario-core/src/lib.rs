//! # bazario-core: Pure Business Logic for Bazario
//!
//! This crate is the **heart** of the Bazario storefront. It owns the cart
//! aggregate, the coupon eligibility rules, and order assembly, all as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazario Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile Shell (UI)                            │   │
//! │  │    Catalog UI ──► Cart UI ──► Checkout UI ──► Tracking UI      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bazario-client                               │   │
//! │  │    CartService: validate ──► dispatch ──► enqueue sync          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bazario-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │   cart    │  │  coupon   │  │   order   │  │   │
//! │  │   │   Money   │  │   Cart    │  │  evaluate │  │  assemble │  │   │
//! │  │   │   Rate    │  │ LineItem  │  │  Coupon   │  │  Payload  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO REMOTE STORE • NO CLOCK READS • PURE FUNCTIONS   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 bazario-sync (Remote Boundary)                  │   │
//! │  │         CartSyncBackend trait, serialized task queue            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money and Rate types with integer arithmetic (no floats!)
//! - [`types`] - Domain types (LineItem, Customer, statuses)
//! - [`coupon`] - Coupon model and the eligibility evaluator
//! - [`catalog`] - Normalization of raw catalog coupon documents
//! - [`cart`] - The cart aggregate and its reducer
//! - [`order`] - Order payload assembly for checkout
//! - [`error`] - Domain error types
//! - [`validation`] - Request validation helpers
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input =
//!    same output. The clock is always an injected parameter.
//! 2. **No I/O**: Remote store, network and file system access is
//!    FORBIDDEN here.
//! 3. **Integer Money**: All monetary values are minor units (i64) to
//!    avoid float errors.
//! 4. **Total Operations**: Cart operations never throw; bad input
//!    degrades to a safe default and ineligible coupons are a zero
//!    discount, not an error.
//!
//! ## Example Usage
//!
//! ```rust
//! use bazario_core::cart::Cart;
//! use bazario_core::money::Money;
//! use bazario_core::types::{NewLineItem, ProviderKind};
//! use chrono::Utc;
//!
//! let now = Utc::now();
//! let mut cart = Cart::new(now);
//!
//! cart.add_item(NewLineItem {
//!     product_id: "prod-1".into(),
//!     name: "Paneer Roll".into(),
//!     unit_price: Money::from_cents(14_900),
//!     image: None,
//!     provider_id: "rest-4".into(),
//!     provider_kind: ProviderKind::Restaurant,
//!     service_id: "svc-food".into(),
//! }, now);
//!
//! assert_eq!(cart.total_items(), 1);
//! assert_eq!(cart.subtotal().cents(), 14_900);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod error;
pub mod money;
pub mod order;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bazario_core::Cart` instead of
// `use bazario_core::cart::Cart`

pub use cart::{Cart, CartAction, CartTotals};
pub use coupon::{evaluate, AppliedCoupon, Coupon, DiscountRule};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Rate};
pub use order::{assemble, CheckoutSelection, OrderPayload};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct rows allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and keeps remote cart documents a sane size.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single row in the cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
