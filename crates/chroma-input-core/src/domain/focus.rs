//! Foreground-process tracking for focus-loss detection.
//!
//! When certain processes take the foreground (Task Manager, or the idle
//! process shown while the secure desktop is up after Ctrl+Alt+Del) the OS
//! stops delivering key-up events to everyone else.  Keys held at that moment
//! would stay "down" forever.  The tracker detects the transition so the
//! owner of held-input state can release everything.
//!
//! ```text
//! Idle ──poll──► Unchanged (same pid)
//!              └► Changed ──name on denylist?──► FocusLost
//! ```

use serde::{Deserialize, Serialize};

/// Process names that trigger a release-all when they gain focus.
pub const DEFAULT_FOCUS_DENYLIST: &[&str] = &["Taskmgr", "Idle"];

/// A focus transition that requires held input to be released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusLost {
    pub pid: u32,
    pub process_name: String,
}

/// Remembers the last foreground process id and matches names against a denylist.
#[derive(Debug, Clone)]
pub struct ForegroundTracker {
    last_pid: Option<u32>,
    denylist: Vec<String>,
}

impl ForegroundTracker {
    pub fn new<I, S>(denylist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            last_pid: None,
            denylist: denylist.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if `pid` differs from the last recorded foreground process.
    pub fn is_change(&self, pid: u32) -> bool {
        self.last_pid != Some(pid)
    }

    /// Records `pid` as the foreground process; returns `true` if it changed.
    pub fn observe(&mut self, pid: u32) -> bool {
        if self.last_pid == Some(pid) {
            return false;
        }
        self.last_pid = Some(pid);
        true
    }

    /// Case-insensitive match of `process_name` against the denylist.
    ///
    /// A trailing `.exe` is ignored.
    pub fn is_denylisted(&self, process_name: &str) -> bool {
        let name = strip_exe(process_name);
        self.denylist
            .iter()
            .any(|denied| strip_exe(denied).eq_ignore_ascii_case(name))
    }

    pub fn last_pid(&self) -> Option<u32> {
        self.last_pid
    }
}

impl Default for ForegroundTracker {
    fn default() -> Self {
        Self::new(DEFAULT_FOCUS_DENYLIST.iter().copied())
    }
}

fn strip_exe(name: &str) -> &str {
    let len = name.len();
    if len > 4 && name.is_char_boundary(len - 4) && name[len - 4..].eq_ignore_ascii_case(".exe") {
        &name[..len - 4]
    } else {
        name
    }
}
