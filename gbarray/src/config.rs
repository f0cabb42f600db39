//! Engine configuration
//!
//! A process-wide [`EngineConfig`] decides how new engine handles behave. It
//! follows the builder style used throughout the crate: start from
//! `EngineConfig::default()` and adjust with `with_*` methods.

use gbarray_core::StorageOrder;
use parking_lot::{const_rwlock, RwLock};

/// Configuration applied to newly created engine handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Storage order of new handles
    pub default_order: StorageOrder,
    /// Defer single-element writes until the next settle
    pub nonblocking: bool,
    /// Pending writes that force an automatic settle
    pub pending_limit: usize,
}

impl EngineConfig {
    /// Default configuration: column-major, deferred writes settled every 4096
    pub const fn new() -> Self {
        Self {
            default_order: StorageOrder::ByCol,
            nonblocking: true,
            pending_limit: 4096,
        }
    }

    /// Blocking configuration: every write lands immediately
    pub const fn blocking() -> Self {
        Self {
            default_order: StorageOrder::ByCol,
            nonblocking: false,
            pending_limit: 0,
        }
    }

    /// Set the storage order of new handles
    pub const fn with_default_order(mut self, order: StorageOrder) -> Self {
        self.default_order = order;
        self
    }

    /// Enable or disable deferred single-element writes
    pub const fn with_nonblocking(mut self, nonblocking: bool) -> Self {
        self.nonblocking = nonblocking;
        self
    }

    /// Set the pending-write threshold
    pub const fn with_pending_limit(mut self, limit: usize) -> Self {
        self.pending_limit = limit;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: RwLock<EngineConfig> = const_rwlock(EngineConfig::new());

/// The configuration new handles are created with
pub fn global_config() -> EngineConfig {
    *GLOBAL.read()
}

/// Replace the process-wide configuration, returning the previous one
pub fn set_global_config(config: EngineConfig) -> EngineConfig {
    let previous = std::mem::replace(&mut *GLOBAL.write(), config);
    log::debug!("engine configuration replaced: {config:?}");
    previous
}
