//! # bazario-client: Session & Service Layer for Bazario
//!
//! The crate the mobile shell links against. It wires the pure core to the
//! sync boundary and exposes one service object per signed-in session.
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Session Wiring                                  │
//! │                                                                         │
//! │  let config = SyncConfig::load();                                       │
//! │  let backend: Arc<dyn CartSyncBackend> = ...;   // store SDK adapter    │
//! │  let catalog: Arc<dyn CouponCatalog> = ...;     // catalog SDK adapter  │
//! │                                                                         │
//! │  let (sync, _join) = SyncAgent::spawn(config, backend.clone());         │
//! │  let service = CartService::new(customer, backend, catalog, sync);      │
//! │                                                                         │
//! │  service.hydrate().await?;          // reconcile with remote cart       │
//! │  service.add_to_cart(product)?;     // local commit + queued sync       │
//! │  service.apply_coupon("SAVE20").await?;                                 │
//! │  let receipt = service.checkout(selection).await?;                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod service;
pub mod state;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use service::{CartService, CartView, CouponCatalog, OrderReceipt};
pub use state::CartState;

// =============================================================================
// Telemetry
// =============================================================================

/// Initializes the tracing subscriber for the session process.
///
/// Called once by the shell at startup. Filtering follows `RUST_LOG`
/// (e.g. `RUST_LOG=bazario_sync=debug`), defaulting to `info`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (e.g. shell hot-restart) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
