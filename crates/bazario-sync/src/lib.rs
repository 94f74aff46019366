//! # bazario-sync: Remote Sync Boundary for Bazario
//!
//! This crate owns the boundary between the local cart session and the
//! remote document store that persists carts, coupons and orders.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bazario Sync Layer                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    bazario-sync (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────────┐  ┌──────────────────┐  ┌───────────────────┐  │   │
//! │  │  │ SyncAgent   │  │ CartSyncBackend  │  │ SyncConfig        │  │   │
//! │  │  │ (agent.rs)  │  │ (backend.rs)     │  │ (config.rs)       │  │   │
//! │  │  │             │  │                  │  │                   │  │   │
//! │  │  │ Serialized  │  │ Trait over the   │  │ TOML + env        │  │   │
//! │  │  │ queue with  │◄─│ remote store SDK │  │ queue/retry/      │  │   │
//! │  │  │ retry+drop  │  │ Noop + InMemory  │  │ timeout knobs     │  │   │
//! │  │  └─────────────┘  └──────────────────┘  └───────────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  DEPENDENCIES:                                                         │
//! │  • bazario-core: pure types (LineItem, AppliedCoupon, OrderPayload)   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delivery Contract
//! Cart mutations are fire-and-forget: the session enqueues a task after
//! its local transition commits and never waits on the network. The single
//! worker drains the queue serially, retries each task a bounded number of
//! times, and then drops it with a log line. Local state is the source of
//! truth; the remote store is eventually consistent with it.
//!
//! `create_order` is the exception: checkout awaits it directly on the
//! backend because the returned order id is required to proceed.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod agent;
pub mod backend;
pub mod config;
pub mod error;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use agent::{SyncAgent, SyncAgentHandle, SyncEnvelope, SyncTask};
pub use backend::{CartSnapshot, CartSyncBackend, InMemoryBackend, NoopBackend};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
