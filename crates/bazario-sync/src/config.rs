//! # Sync Configuration
//!
//! Configuration for the sync agent.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BAZARIO_SYNC_OFFLINE=1                                             │
//! │     BAZARIO_SYNC_MAX_ATTEMPTS=5                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/bazario/sync.toml (Linux)                                │
//! │     ~/Library/Application Support/com.bazario.app/sync.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     queue 64, 3 attempts, 200ms base delay, 10s timeout                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! [queue]
//! capacity = 64
//!
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 200
//!
//! [request]
//! timeout_secs = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Sync Config
// =============================================================================

/// Runtime configuration for the sync agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Bounded queue capacity; a full queue drops new tasks with a warning.
    pub queue_capacity: usize,

    /// Delivery attempts per task before it is logged and dropped.
    pub max_attempts: u32,

    /// Base retry delay; doubles per attempt.
    pub base_delay_ms: u64,

    /// Per-call timeout against the remote store.
    pub request_timeout_secs: u64,

    /// Disables remote sync entirely; tasks are dropped on arrival.
    pub offline: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            queue_capacity: 64,
            max_attempts: 3,
            base_delay_ms: 200,
            request_timeout_secs: 10,
            offline: false,
        }
    }
}

// =============================================================================
// File Format
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    queue: QueueSection,
    #[serde(default)]
    retry: RetrySection,
    #[serde(default)]
    request: RequestSection,
    #[serde(default)]
    offline: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct QueueSection {
    capacity: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RetrySection {
    max_attempts: Option<u32>,
    base_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RequestSection {
    timeout_secs: Option<u64>,
}

// =============================================================================
// Loading
// =============================================================================

impl SyncConfig {
    /// Loads configuration with defaults < file < environment precedence.
    pub fn load() -> Self {
        let mut config = SyncConfig::default();

        if let Some(path) = Self::config_file_path() {
            match Self::load_file(&path) {
                Ok(Some(file)) => config.apply_file(file),
                Ok(None) => debug!(?path, "No sync.toml, using defaults"),
                Err(e) => warn!(?path, error = %e, "Ignoring unreadable sync.toml"),
            }
        }

        config.apply_env();
        config
    }

    /// Platform config file location, `<config dir>/bazario/sync.toml`.
    fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bazario", "bazario")
            .map(|dirs| dirs.config_dir().join("sync.toml"))
    }

    fn load_file(path: &PathBuf) -> SyncResult<Option<ConfigFile>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SyncError::ConfigLoadFailed(e.to_string()))?;
        let file: ConfigFile =
            toml::from_str(&raw).map_err(|e| SyncError::ConfigLoadFailed(e.to_string()))?;
        Ok(Some(file))
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(capacity) = file.queue.capacity {
            self.queue_capacity = capacity;
        }
        if let Some(max_attempts) = file.retry.max_attempts {
            self.max_attempts = max_attempts;
        }
        if let Some(base_delay_ms) = file.retry.base_delay_ms {
            self.base_delay_ms = base_delay_ms;
        }
        if let Some(timeout_secs) = file.request.timeout_secs {
            self.request_timeout_secs = timeout_secs;
        }
        if let Some(offline) = file.offline {
            self.offline = offline;
        }
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("BAZARIO_SYNC_OFFLINE") {
            self.offline = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = std::env::var("BAZARIO_SYNC_MAX_ATTEMPTS") {
            match v.parse() {
                Ok(n) => self.max_attempts = n,
                Err(_) => warn!(value = %v, "Ignoring invalid BAZARIO_SYNC_MAX_ATTEMPTS"),
            }
        }
        if let Ok(v) = std::env::var("BAZARIO_SYNC_QUEUE_CAPACITY") {
            match v.parse() {
                Ok(n) => self.queue_capacity = n,
                Err(_) => warn!(value = %v, "Ignoring invalid BAZARIO_SYNC_QUEUE_CAPACITY"),
            }
        }
    }

    /// Validates the configuration before the agent starts.
    pub fn validate(&self) -> SyncResult<()> {
        if self.queue_capacity == 0 {
            return Err(SyncError::InvalidConfig(
                "queue_capacity must be at least 1".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(SyncError::InvalidConfig(
                "max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.queue_capacity, 64);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay_ms, 200);
        assert_eq!(config.request_timeout_secs, 10);
        assert!(!config.offline);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_sections_override_defaults() {
        let file: ConfigFile = toml::from_str(
            r#"
            [queue]
            capacity = 16

            [retry]
            max_attempts = 5
            "#,
        )
        .unwrap();

        let mut config = SyncConfig::default();
        config.apply_file(file);

        assert_eq!(config.queue_capacity, 16);
        assert_eq!(config.max_attempts, 5);
        // Untouched sections keep their defaults
        assert_eq!(config.base_delay_ms, 200);
    }

    #[test]
    fn test_validate_rejects_zeroes() {
        let mut config = SyncConfig::default();
        config.queue_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = SyncConfig::default();
        config.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
