//! # Sync Error Types
//!
//! Error types for remote sync operations.
//!
//! Every error here is swallowed inside the sync agent after the bounded
//! retry runs out; nothing in this module ever reaches the reducer path.
//! The one caller-visible surface is `create_order`, which the checkout
//! flow awaits explicitly.

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering queue, config and backend failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Queue Errors
    // =========================================================================
    /// The bounded task queue is full; the task was dropped.
    #[error("Sync queue full, task dropped")]
    QueueFull,

    /// The agent is no longer running.
    #[error("Sync agent channel closed")]
    ChannelClosed,

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// The remote store rejected or failed the call.
    #[error("Backend call failed: {0}")]
    Backend(String),

    /// The remote store did not answer within the configured timeout.
    #[error("Backend call timed out after {0} seconds")]
    Timeout(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SyncError::Timeout(10).to_string(),
            "Backend call timed out after 10 seconds"
        );
        assert_eq!(
            SyncError::Backend("cart document missing".into()).to_string(),
            "Backend call failed: cart document missing"
        );
    }
}
