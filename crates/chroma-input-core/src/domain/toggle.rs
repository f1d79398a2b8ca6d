//! Lock-key toggle state.
//!
//! [`ToggleStatus`] is an immutable snapshot of NumLock, CapsLock and
//! ScrollLock.  A fresh snapshot is taken after every accepted keyboard event
//! and whenever a collaborator asks for one; consumers always receive all
//! three flags, never a delta.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The three lock keys that carry toggle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockKey {
    NumLock,
    CapsLock,
    ScrollLock,
}

/// Snapshot of the lock-key toggle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToggleStatus {
    pub num_lock: bool,
    pub caps_lock: bool,
    pub scroll_lock: bool,
}

impl ToggleStatus {
    pub fn new(num_lock: bool, caps_lock: bool, scroll_lock: bool) -> Self {
        Self {
            num_lock,
            caps_lock,
            scroll_lock,
        }
    }
}

/// Reads the current global toggle state of a lock key.
pub trait LockKeyProbe: Send + Sync {
    fn is_toggled(&self, key: LockKey) -> bool;
}

/// Packages probe readings into [`ToggleStatus`] snapshots.
#[derive(Clone)]
pub struct ToggleStateTracker {
    probe: Arc<dyn LockKeyProbe>,
}

impl ToggleStateTracker {
    pub fn new(probe: Arc<dyn LockKeyProbe>) -> Self {
        Self { probe }
    }

    /// Reads all three lock keys.  Side-effect free.
    pub fn snapshot(&self) -> ToggleStatus {
        ToggleStatus {
            num_lock: self.probe.is_toggled(LockKey::NumLock),
            caps_lock: self.probe.is_toggled(LockKey::CapsLock),
            scroll_lock: self.probe.is_toggled(LockKey::ScrollLock),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct FlagProbe {
        num: AtomicBool,
        caps: AtomicBool,
        scroll: AtomicBool,
    }

    impl LockKeyProbe for FlagProbe {
        fn is_toggled(&self, key: LockKey) -> bool {
            match key {
                LockKey::NumLock => self.num.load(Ordering::SeqCst),
                LockKey::CapsLock => self.caps.load(Ordering::SeqCst),
                LockKey::ScrollLock => self.scroll.load(Ordering::SeqCst),
            }
        }
    }

    #[test]
    fn test_snapshot_reflects_each_lock_key() {
        let probe = Arc::new(FlagProbe::default());
        probe.num.store(true, Ordering::SeqCst);
        probe.scroll.store(true, Ordering::SeqCst);
        let tracker = ToggleStateTracker::new(probe);

        assert_eq!(tracker.snapshot(), ToggleStatus::new(true, false, true));
    }

    #[test]
    fn test_flipping_caps_lock_changes_only_caps_field() {
        // Arrange
        let probe = Arc::new(FlagProbe::default());
        probe.num.store(true, Ordering::SeqCst);
        probe.caps.store(true, Ordering::SeqCst);
        let tracker = ToggleStateTracker::new(Arc::clone(&probe) as Arc<dyn LockKeyProbe>);
        let before = tracker.snapshot();

        // Act
        probe.caps.store(false, Ordering::SeqCst);
        let after = tracker.snapshot();

        // Assert
        assert!(before.caps_lock);
        assert!(!after.caps_lock);
        assert_eq!(before.num_lock, after.num_lock);
        assert_eq!(before.scroll_lock, after.scroll_lock);
    }

    #[test]
    fn test_snapshot_is_repeatable_without_changes() {
        let tracker = ToggleStateTracker::new(Arc::new(FlagProbe::default()));
        assert_eq!(tracker.snapshot(), tracker.snapshot());
        assert_eq!(tracker.snapshot(), ToggleStatus::default());
    }
}
