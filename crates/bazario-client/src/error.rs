//! # Service Error Type
//!
//! Unified error type for the shell-facing service layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Bazario                                │
//! │                                                                         │
//! │  Mobile Shell                 Rust Session                              │
//! │  ────────────                 ────────────                              │
//! │                                                                         │
//! │  cartService.applyCoupon("SAVE20")                                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  CartService method                                              │  │
//! │  │  Result<T, ServiceError>                                         │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Unknown code? ─── COUPON not in catalog ── NOT_FOUND ─────────► │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Discount zero? ── coupon dropped ── COUPON_NOT_APPLICABLE ────► │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────► │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The shell maps `code` to a human message; `message` is the fallback.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Remote sync failures never appear here: they are retried and swallowed
//! inside the sync agent. The one exception is checkout, where the order
//! id is required and a backend failure is surfaced as `SYNC_ERROR`.

use serde::Serialize;

use bazario_core::{CoreError, ValidationError};

/// Error returned from service methods.
///
/// ## Serialization
/// This is what the shell receives when a call fails:
/// ```json
/// {
///   "code": "COUPON_NOT_APPLICABLE",
///   "message": "Coupon SAVE20 is not applicable to this cart"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for service responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (coupon code, line item)
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Cart operation rejected (capacity limits)
    CartError,

    /// Coupon exists but computes to a zero discount for this cart
    CouponNotApplicable,

    /// Checkout preconditions unmet (empty cart, no identity)
    CheckoutIncomplete,

    /// Remote store failure on the awaited checkout path
    SyncError,

    /// Internal error
    Internal,
}

impl ServiceError {
    /// Creates a new service error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ServiceError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ServiceError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::ValidationError, message)
    }

    /// Creates the soft failure for a coupon that computed to zero.
    pub fn coupon_not_applicable(code: &str) -> Self {
        ServiceError::new(
            ErrorCode::CouponNotApplicable,
            format!("Coupon {} is not applicable to this cart", code),
        )
    }

    /// Creates a checkout precondition error.
    pub fn checkout_incomplete(reason: &str) -> Self {
        ServiceError::new(
            ErrorCode::CheckoutIncomplete,
            format!("Cannot checkout: {}", reason),
        )
    }

    /// Creates a sync error for the awaited checkout path.
    pub fn sync(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::SyncError, message)
    }
}

/// Converts core errors to service errors.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CouponNotFound(code) => ServiceError::not_found("Coupon", &code),
            CoreError::CartTooLarge { max } => ServiceError::new(
                ErrorCode::CartError,
                format!("Cart cannot have more than {} items", max),
            ),
            CoreError::QuantityTooLarge { requested, max } => ServiceError::new(
                ErrorCode::ValidationError,
                format!("Quantity {} exceeds maximum allowed ({})", requested, max),
            ),
            CoreError::CheckoutIncomplete { reason } => {
                ServiceError::checkout_incomplete(&reason)
            }
            CoreError::Validation(e) => ServiceError::validation(e.to_string()),
        }
    }
}

/// Converts validation errors to service errors.
impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::validation(err.to_string())
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Convenience type alias for Results with ServiceError.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================
