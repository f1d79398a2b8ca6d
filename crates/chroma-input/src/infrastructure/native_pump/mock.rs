//! Mock message pump for unit and integration testing.
//!
//! Allows tests to deliver synthetic [`RawInputRecord`]s as if they had come
//! from the OS, and to observe install/uninstall calls.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chroma_input_core::RawInputRecord;

use super::{NativeCallback, NativeHookError, NativeMessagePump};

/// A mock implementation of [`NativeMessagePump`].
#[derive(Default)]
pub struct MockMessagePump {
    callback: Mutex<Option<Arc<NativeCallback>>>,
    installs: AtomicUsize,
    uninstalls: AtomicUsize,
    forwarded: AtomicUsize,
    fail_install: AtomicBool,
    fail_uninstall: AtomicBool,
}

impl MockMessagePump {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `record` to the installed callback.
    ///
    /// Returns `false` when nothing is installed.  Either way the message
    /// counts as forwarded to the original handler.
    pub fn deliver(&self, record: RawInputRecord) -> bool {
        self.forwarded.fetch_add(1, Ordering::SeqCst);
        // Clone out so a callback that uninstalls cannot deadlock.
        let callback = self.callback.lock().expect("lock poisoned").clone();
        match callback {
            Some(callback) => {
                callback(record);
                true
            }
            None => false,
        }
    }

    /// Simulates a non-input message passing through the window procedure.
    pub fn deliver_other_message(&self) {
        self.forwarded.fetch_add(1, Ordering::SeqCst);
    }

    /// Makes the next `install` fail with [`NativeHookError::Registration`].
    pub fn fail_next_install(&self) {
        self.fail_install.store(true, Ordering::SeqCst);
    }

    /// Makes the next `uninstall` fail with [`NativeHookError::Restore`].
    pub fn fail_next_uninstall(&self) {
        self.fail_uninstall.store(true, Ordering::SeqCst);
    }

    pub fn install_count(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    pub fn uninstall_count(&self) -> usize {
        self.uninstalls.load(Ordering::SeqCst)
    }

    /// Number of messages passed on to the original window procedure.
    pub fn forwarded_count(&self) -> usize {
        self.forwarded.load(Ordering::SeqCst)
    }
}

impl NativeMessagePump for MockMessagePump {
    fn install(&self, callback: NativeCallback) -> Result<(), NativeHookError> {
        if self.fail_install.swap(false, Ordering::SeqCst) {
            return Err(NativeHookError::Registration("mock install failure".into()));
        }
        let mut slot = self.callback.lock().expect("lock poisoned");
        if slot.is_some() {
            return Err(NativeHookError::AlreadyInstalled);
        }
        *slot = Some(Arc::new(callback));
        self.installs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn uninstall(&self) -> Result<(), NativeHookError> {
        let mut slot = self.callback.lock().expect("lock poisoned");
        if slot.is_none() {
            return Ok(());
        }
        *slot = None;
        self.uninstalls.fetch_add(1, Ordering::SeqCst);
        if self.fail_uninstall.swap(false, Ordering::SeqCst) {
            return Err(NativeHookError::Restore("mock uninstall failure".into()));
        }
        Ok(())
    }

    fn is_installed(&self) -> bool {
        self.callback.lock().expect("lock poisoned").is_some()
    }
}
