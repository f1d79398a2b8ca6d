//! Device identity: session handles to stable identifiers.
//!
//! The platform tags every raw record with a [`DeviceHandle`] that is only
//! meaningful for the current session.  The rest of the application needs a
//! key that survives reconnects and reboots, so each handle is resolved once
//! to a [`DeviceIdentifier`] (derived from the device path) and cached.
//!
//! # Cache rules
//!
//! - Entries are never evicted; the cache is bounded by the number of
//!   physically distinct devices seen during the session.
//! - A miss queries the [`DevicePathSource`] exactly once.  If the source has
//!   no path (virtual devices, or a transient failure), nothing is inserted
//!   and the next record from the same handle retries.
//! - The cache itself is not synchronized; its owner wraps it together with
//!   the motion aggregator behind a single lock.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Opaque per-session device handle supplied by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceHandle(pub u64);

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Stable, cross-session device key (typically the device path).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceIdentifier(String);

impl DeviceIdentifier {
    /// Wraps `value`; returns `None` for an empty or whitespace-only string.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The platform could not be asked for a device path.
#[derive(Debug, Error)]
#[error("failed to query device path for handle {handle}: {reason}")]
pub struct DeviceResolutionError {
    pub handle: DeviceHandle,
    pub reason: String,
}

/// Platform query for the path-derived identifier of a device.
pub trait DevicePathSource: Send + Sync {
    /// Returns the device path, or `Ok(None)` if the device has none.
    fn device_path(&self, handle: DeviceHandle) -> Result<Option<String>, DeviceResolutionError>;
}

/// Lazily populated handle → identifier map.
#[derive(Debug, Default)]
pub struct DeviceIdentityCache {
    entries: HashMap<DeviceHandle, DeviceIdentifier>,
}

impl DeviceIdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `handle` to its identifier, querying `source` on a miss.
    ///
    /// Never fails: absence is an expected outcome.
    pub fn resolve(
        &mut self,
        handle: DeviceHandle,
        source: &dyn DevicePathSource,
    ) -> Option<DeviceIdentifier> {
        if let Some(identifier) = self.entries.get(&handle) {
            return Some(identifier.clone());
        }

        let path = match source.device_path(handle) {
            Ok(path) => path?,
            Err(e) => {
                warn!("{e}");
                return None;
            }
        };
        let identifier = DeviceIdentifier::new(path)?;

        self.entries.insert(handle, identifier.clone());
        Some(identifier)
    }

    /// Returns the cached identifier without querying the platform.
    pub fn get(&self, handle: DeviceHandle) -> Option<&DeviceIdentifier> {
        self.entries.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.  Only called when the owning provider is torn down.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
