//! # Sync Agent
//!
//! Background worker that replays local cart transitions against the
//! remote store.
//!
//! ## Task Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Agent Flow                                   │
//! │                                                                         │
//! │  CartService (after a local transition commits)                         │
//! │       │                                                                 │
//! │       │  handle.enqueue(envelope)     ── non-blocking try_send          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            bounded mpsc queue (capacity from config)            │   │
//! │  └──────────────────────────────┬──────────────────────────────────┘   │
//! │                                 │  one worker, tasks drained serially   │
//! │                                 ▼                                       │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SyncAgent worker                                               │   │
//! │  │                                                                 │   │
//! │  │  1. map task → CartSyncBackend call                            │   │
//! │  │  2. apply per-call timeout                                      │   │
//! │  │  3. on failure: retry up to max_attempts, doubling delay        │   │
//! │  │  4. still failing: log and DROP (local state stays truth)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  The single worker is what makes remote calls for a cart apply in      │
//! │  dispatch order; independent fire-and-forget tasks would not.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use bazario_core::coupon::AppliedCoupon;
use bazario_core::types::LineItem;

use crate::backend::CartSyncBackend;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};

// =============================================================================
// Sync Tasks
// =============================================================================

/// One remote mutation to replay, mirroring a reducer operation.
#[derive(Debug, Clone)]
pub enum SyncTask {
    ItemAdded { item: LineItem },
    ItemRemoved { item_id: String },
    QuantityChanged { item_id: String, quantity: i64 },
    CouponApplied { coupon: AppliedCoupon },
    CouponRemoved,
    CartCleared,
}

impl SyncTask {
    /// Short label for log lines.
    fn label(&self) -> &'static str {
        match self {
            SyncTask::ItemAdded { .. } => "item_added",
            SyncTask::ItemRemoved { .. } => "item_removed",
            SyncTask::QuantityChanged { .. } => "quantity_changed",
            SyncTask::CouponApplied { .. } => "coupon_applied",
            SyncTask::CouponRemoved => "coupon_removed",
            SyncTask::CartCleared => "cart_cleared",
        }
    }
}

/// A task addressed to a specific user's remote cart document.
#[derive(Debug, Clone)]
pub struct SyncEnvelope {
    pub user_id: String,
    pub cart_id: String,
    pub task: SyncTask,
}

// =============================================================================
// Sync Agent
// =============================================================================

/// The queue worker. Constructed and started through [`SyncAgent::spawn`].
pub struct SyncAgent {
    config: SyncConfig,
    backend: Arc<dyn CartSyncBackend>,
    task_rx: mpsc::Receiver<SyncEnvelope>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl SyncAgent {
    /// Spawns the worker task and returns its control handle.
    ///
    /// The returned `JoinHandle` completes once the agent has drained and
    /// exited; production callers usually only keep the control handle.
    pub fn spawn(
        config: SyncConfig,
        backend: Arc<dyn CartSyncBackend>,
    ) -> (SyncAgentHandle, JoinHandle<()>) {
        let (task_tx, task_rx) = mpsc::channel(config.queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let agent = SyncAgent {
            config,
            backend,
            task_rx,
            shutdown_rx,
        };
        let join = tokio::spawn(agent.run());

        (
            SyncAgentHandle {
                task_tx,
                shutdown_tx,
            },
            join,
        )
    }

    async fn run(mut self) {
        debug!("Sync agent started");
        loop {
            tokio::select! {
                maybe = self.task_rx.recv() => match maybe {
                    Some(envelope) => self.deliver(envelope).await,
                    // Every handle dropped: nothing more can arrive
                    None => break,
                },
                _ = self.shutdown_rx.recv() => {
                    // Graceful shutdown drains what was already enqueued
                    while let Ok(envelope) = self.task_rx.try_recv() {
                        self.deliver(envelope).await;
                    }
                    break;
                }
            }
        }
        debug!("Sync agent stopped");
    }

    /// Delivers one envelope with bounded retry, then drops it.
    ///
    /// Failures never propagate: the local aggregate already committed and
    /// remains authoritative, the remote store is eventually consistent.
    async fn deliver(&self, envelope: SyncEnvelope) {
        if self.config.offline {
            debug!(task = envelope.task.label(), "Offline, dropping sync task");
            return;
        }

        for attempt in 1..=self.config.max_attempts {
            match self.call_backend(&envelope).await {
                Ok(()) => {
                    debug!(
                        task = envelope.task.label(),
                        cart_id = %envelope.cart_id,
                        attempt,
                        "Sync task delivered"
                    );
                    return;
                }
                Err(e) => {
                    warn!(
                        task = envelope.task.label(),
                        cart_id = %envelope.cart_id,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        error = %e,
                        "Sync task attempt failed"
                    );
                    if attempt < self.config.max_attempts {
                        let delay = self.config.base_delay_ms << (attempt - 1);
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                }
            }
        }

        error!(
            task = envelope.task.label(),
            cart_id = %envelope.cart_id,
            "Sync task dropped after exhausting retries"
        );
    }

    async fn call_backend(&self, envelope: &SyncEnvelope) -> SyncResult<()> {
        let timeout = Duration::from_secs(self.config.request_timeout_secs);
        let user = envelope.user_id.as_str();
        let cart = envelope.cart_id.as_str();

        let call = async {
            match &envelope.task {
                SyncTask::ItemAdded { item } => self.backend.add_item(user, cart, item).await,
                SyncTask::ItemRemoved { item_id } => {
                    self.backend.remove_item(user, cart, item_id).await
                }
                SyncTask::QuantityChanged { item_id, quantity } => {
                    self.backend
                        .update_quantity(user, cart, item_id, *quantity)
                        .await
                }
                SyncTask::CouponApplied { coupon } => {
                    self.backend.apply_coupon(user, cart, coupon).await
                }
                SyncTask::CouponRemoved => self.backend.remove_coupon(user, cart).await,
                SyncTask::CartCleared => self.backend.clear_cart(user, cart).await,
            }
        };

        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| SyncError::Timeout(self.config.request_timeout_secs))?
    }
}

// =============================================================================
// Sync Agent Handle
// =============================================================================

/// Handle for enqueueing tasks and stopping the agent.
#[derive(Clone)]
pub struct SyncAgentHandle {
    task_tx: mpsc::Sender<SyncEnvelope>,
    shutdown_tx: mpsc::Sender<()>,
}

impl SyncAgentHandle {
    /// Enqueues a task without blocking.
    ///
    /// The fire-and-forget contract: a full queue or a stopped agent drops
    /// the task with a warning, and the caller's flow is never held up.
    pub fn enqueue(&self, envelope: SyncEnvelope) {
        match self.task_tx.try_send(envelope) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(envelope)) => {
                warn!(
                    task = envelope.task.label(),
                    cart_id = %envelope.cart_id,
                    "Sync queue full, dropping task"
                );
            }
            Err(mpsc::error::TrySendError::Closed(envelope)) => {
                warn!(
                    task = envelope.task.label(),
                    cart_id = %envelope.cart_id,
                    "Sync agent stopped, dropping task"
                );
            }
        }
    }

    /// Triggers graceful shutdown; already-enqueued tasks are drained.
    pub async fn shutdown(&self) {
        if self.shutdown_tx.send(()).await.is_err() {
            debug!("Sync agent already stopped");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use bazario_core::money::Money;
    use bazario_core::types::{NewLineItem, ProviderKind};
    use chrono::Utc;

    fn test_config() -> SyncConfig {
        SyncConfig {
            queue_capacity: 16,
            max_attempts: 2,
            base_delay_ms: 1,
            request_timeout_secs: 5,
            offline: false,
        }
    }

    fn item(product_id: &str) -> LineItem {
        LineItem::new(
            NewLineItem {
                product_id: product_id.to_string(),
                name: "Item".to_string(),
                unit_price: Money::from_cents(500),
                image: None,
                provider_id: "prov".to_string(),
                provider_kind: ProviderKind::Warehouse,
                service_id: "svc".to_string(),
            },
            Utc::now(),
        )
    }

    fn envelope(user: &str, cart: &str, task: SyncTask) -> SyncEnvelope {
        SyncEnvelope {
            user_id: user.to_string(),
            cart_id: cart.to_string(),
            task,
        }
    }

    #[tokio::test]
    async fn test_tasks_apply_in_dispatch_order() {
        let backend = Arc::new(InMemoryBackend::new());
        let cart_id = backend.create_cart("u1").await.unwrap();

        let (handle, join) = SyncAgent::spawn(test_config(), backend.clone());

        let line = item("p1");
        handle.enqueue(envelope("u1", &cart_id, SyncTask::ItemAdded { item: line.clone() }));
        handle.enqueue(envelope(
            "u1",
            &cart_id,
            SyncTask::QuantityChanged {
                item_id: line.id.clone(),
                quantity: 4,
            },
        ));
        let second = item("p2");
        handle.enqueue(envelope("u1", &cart_id, SyncTask::ItemAdded { item: second.clone() }));
        handle.enqueue(envelope(
            "u1",
            &cart_id,
            SyncTask::ItemRemoved {
                item_id: second.id.clone(),
            },
        ));

        handle.shutdown().await;
        join.await.unwrap();

        // The quantity update landed after the add, the removal after the
        // second add: final state reflects dispatch order
        let items = backend.items("u1").await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, line.id);
        assert_eq!(items[0].quantity, 4);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let backend = Arc::new(InMemoryBackend::new());
        let cart_id = backend.create_cart("u1").await.unwrap();
        backend.set_failing(true);

        let (handle, join) = SyncAgent::spawn(test_config(), backend.clone());
        handle.enqueue(envelope("u1", &cart_id, SyncTask::ItemAdded { item: item("p1") }));
        handle.shutdown().await;

        // The worker exits cleanly even though every attempt failed
        join.await.unwrap();
        assert!(backend.items("u1").await.is_empty());
    }

    #[tokio::test]
    async fn test_offline_drops_everything() {
        let backend = Arc::new(InMemoryBackend::new());
        let cart_id = backend.create_cart("u1").await.unwrap();

        let mut config = test_config();
        config.offline = true;

        let (handle, join) = SyncAgent::spawn(config, backend.clone());
        handle.enqueue(envelope("u1", &cart_id, SyncTask::ItemAdded { item: item("p1") }));
        handle.shutdown().await;
        join.await.unwrap();

        assert!(backend.items("u1").await.is_empty());
    }

    #[tokio::test]
    async fn test_enqueue_after_stop_does_not_panic() {
        let backend = Arc::new(InMemoryBackend::new());
        let (handle, join) = SyncAgent::spawn(test_config(), backend.clone());

        handle.shutdown().await;
        join.await.unwrap();

        // try_send hits a closed channel; the task is dropped with a warning
        handle.enqueue(envelope("u1", "c1", SyncTask::CartCleared));
    }

    #[tokio::test]
    async fn test_coupon_tasks() {
        let backend = Arc::new(InMemoryBackend::new());
        let cart_id = backend.create_cart("u1").await.unwrap();
        let (handle, join) = SyncAgent::spawn(test_config(), backend.clone());

        let applied = AppliedCoupon {
            coupon: bazario_core::coupon::Coupon {
                code: "SAVE".to_string(),
                discount: bazario_core::coupon::DiscountRule::Fixed {
                    amount: Money::from_cents(500),
                },
                min_order_amount: Money::zero(),
                min_order_count: 0,
                valid_from: None,
                valid_till: None,
                per_user_limit: None,
                max_uses: None,
                used_count: 0,
                is_active: true,
            },
            applied_at: Utc::now(),
            discount: Money::from_cents(500),
        };

        handle.enqueue(envelope("u1", &cart_id, SyncTask::CouponApplied { coupon: applied }));
        handle.shutdown().await;
        join.await.unwrap();

        assert!(backend.coupon("u1").await.is_some());
    }
}
