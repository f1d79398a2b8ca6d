//! Scriptable platform for unit and integration testing.
//!
//! [`MockPlatform`] implements every platform probe the hub needs.  Tests set
//! device paths, lock-key state, the cursor position and a foreground process
//! sequence, then read back how often each probe was queried.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use chroma_input_core::{
    DeviceHandle, DevicePathSource, DeviceResolutionError, LockKey, LockKeyProbe,
};

use crate::application::dispatch_input::CursorPosition;
use crate::application::focus_monitor::{ForegroundProcessProbe, ProbeError};

/// In-memory stand-in for the OS.
#[derive(Default)]
pub struct MockPlatform {
    device_paths: Mutex<HashMap<DeviceHandle, String>>,
    path_queries: AtomicUsize,
    fail_device_paths: AtomicBool,

    num_lock: AtomicBool,
    caps_lock: AtomicBool,
    scroll_lock: AtomicBool,
    lock_queries: AtomicUsize,

    cursor: Mutex<Option<(i32, i32)>>,
    cursor_queries: AtomicUsize,

    foreground: Mutex<ForegroundScript>,
    process_names: Mutex<HashMap<u32, String>>,
    panic_on_foreground: AtomicBool,
}

#[derive(Default)]
struct ForegroundScript {
    queued: VecDeque<u32>,
    current: u32,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Device paths ─────────────────────────────────────────────────────────

    pub fn set_device_path(&self, handle: DeviceHandle, path: impl Into<String>) {
        self.device_paths
            .lock()
            .expect("lock poisoned")
            .insert(handle, path.into());
    }

    /// Makes every device-path query fail until cleared.
    pub fn set_device_paths_failing(&self, failing: bool) {
        self.fail_device_paths.store(failing, Ordering::SeqCst);
    }

    pub fn path_query_count(&self) -> usize {
        self.path_queries.load(Ordering::SeqCst)
    }

    // ── Lock keys ────────────────────────────────────────────────────────────

    pub fn set_toggles(&self, num_lock: bool, caps_lock: bool, scroll_lock: bool) {
        self.num_lock.store(num_lock, Ordering::SeqCst);
        self.caps_lock.store(caps_lock, Ordering::SeqCst);
        self.scroll_lock.store(scroll_lock, Ordering::SeqCst);
    }

    pub fn lock_query_count(&self) -> usize {
        self.lock_queries.load(Ordering::SeqCst)
    }

    // ── Cursor ───────────────────────────────────────────────────────────────

    pub fn set_cursor(&self, x: i32, y: i32) {
        *self.cursor.lock().expect("lock poisoned") = Some((x, y));
    }

    pub fn cursor_query_count(&self) -> usize {
        self.cursor_queries.load(Ordering::SeqCst)
    }

    // ── Foreground process ───────────────────────────────────────────────────

    pub fn name_process(&self, pid: u32, name: impl Into<String>) {
        self.process_names
            .lock()
            .expect("lock poisoned")
            .insert(pid, name.into());
    }

    /// Queues `pid` as the foreground process for one future poll.
    ///
    /// Once the queue is empty the last dequeued pid keeps being reported.
    pub fn push_foreground(&self, pid: u32) {
        self.foreground
            .lock()
            .expect("lock poisoned")
            .queued
            .push_back(pid);
    }

    /// Number of foreground pids not yet consumed by a poll.
    pub fn queued_foreground_count(&self) -> usize {
        self.foreground.lock().expect("lock poisoned").queued.len()
    }

    /// Makes the next foreground query panic.
    pub fn panic_on_next_foreground_query(&self) {
        self.panic_on_foreground.store(true, Ordering::SeqCst);
    }
}

impl DevicePathSource for MockPlatform {
    fn device_path(&self, handle: DeviceHandle) -> Result<Option<String>, DeviceResolutionError> {
        self.path_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_device_paths.load(Ordering::SeqCst) {
            return Err(DeviceResolutionError {
                handle,
                reason: "mock device path failure".into(),
            });
        }
        Ok(self
            .device_paths
            .lock()
            .expect("lock poisoned")
            .get(&handle)
            .cloned())
    }
}

impl LockKeyProbe for MockPlatform {
    fn is_toggled(&self, key: LockKey) -> bool {
        self.lock_queries.fetch_add(1, Ordering::SeqCst);
        let flag = match key {
            LockKey::NumLock => &self.num_lock,
            LockKey::CapsLock => &self.caps_lock,
            LockKey::ScrollLock => &self.scroll_lock,
        };
        flag.load(Ordering::SeqCst)
    }
}

impl CursorPosition for MockPlatform {
    fn cursor_position(&self) -> Option<(i32, i32)> {
        self.cursor_queries.fetch_add(1, Ordering::SeqCst);
        *self.cursor.lock().expect("lock poisoned")
    }
}

impl ForegroundProcessProbe for MockPlatform {
    fn foreground_process_id(&self) -> Result<u32, ProbeError> {
        if self.panic_on_foreground.swap(false, Ordering::SeqCst) {
            panic!("mock foreground query panic");
        }
        let mut script = self.foreground.lock().expect("lock poisoned");
        if let Some(pid) = script.queued.pop_front() {
            script.current = pid;
        }
        Ok(script.current)
    }

    fn process_name(&self, pid: u32) -> Result<Option<String>, ProbeError> {
        Ok(self
            .process_names
            .lock()
            .expect("lock poisoned")
            .get(&pid)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreground_script_repeats_last_pid() {
        // Arrange
        let platform = MockPlatform::new();
        platform.push_foreground(4);
        platform.push_foreground(9);

        // Act
        let pids: Vec<u32> = (0..4)
            .map(|_| platform.foreground_process_id().expect("pid"))
            .collect();

        // Assert
        assert_eq!(pids, vec![4, 9, 9, 9]);
        assert_eq!(platform.queued_foreground_count(), 0);
    }

    #[test]
    fn test_device_path_queries_are_counted() {
        let platform = MockPlatform::new();
        platform.set_device_path(DeviceHandle(1), "kbd");

        assert_eq!(platform.device_path(DeviceHandle(1)).unwrap().as_deref(), Some("kbd"));
        assert_eq!(platform.device_path(DeviceHandle(2)).unwrap(), None);
        assert_eq!(platform.path_query_count(), 2);
    }

    #[test]
    fn test_failing_device_paths_return_error() {
        let platform = MockPlatform::new();
        platform.set_device_paths_failing(true);

        assert!(platform.device_path(DeviceHandle(1)).is_err());
    }

    #[test]
    fn test_toggles_reported_per_key() {
        let platform = MockPlatform::new();
        platform.set_toggles(false, true, false);

        assert!(!platform.is_toggled(LockKey::NumLock));
        assert!(platform.is_toggled(LockKey::CapsLock));
        assert!(!platform.is_toggled(LockKey::ScrollLock));
    }

    #[test]
    fn test_cursor_absent_until_set() {
        let platform = MockPlatform::new();
        assert_eq!(platform.cursor_position(), None);

        platform.set_cursor(5, 6);

        assert_eq!(platform.cursor_position(), Some((5, 6)));
        assert_eq!(platform.cursor_query_count(), 2);
    }
}
