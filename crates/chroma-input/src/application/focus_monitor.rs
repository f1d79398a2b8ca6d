//! Focus-loss monitor: releases held input when a denylisted process takes focus.
//!
//! While Task Manager or the secure desktop (Ctrl+Alt+Del, reported as the
//! `Idle` process) is in the foreground, the OS withholds key-up events from
//! every other application.  Keys held when focus moved would otherwise stay
//! "down" indefinitely.
//!
//! # Threads
//!
//! ```text
//! chroma-focus-monitor          chroma-release-relay
//!   every poll_interval:           for notice in rx:
//!     tick() ── FocusLost ──mpsc──►  InputStateOwner::release_all()
//! ```
//!
//! The monitor never touches the hub's pipeline state and never blocks event
//! dispatch; its only output is the [`FocusLost`] notice sent over the
//! channel.  A failing or panicking poll is logged and the next tick
//! proceeds normally.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chroma_input_core::{FocusLost, ForegroundTracker};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::dispatch_input::InputStateOwner;

/// Default foreground poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A foreground-process query failed.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("foreground window query failed: {0}")]
    Foreground(String),
    #[error("process {pid} could not be inspected: {reason}")]
    Process { pid: u32, reason: String },
}

/// Platform query for the process that owns the foreground window.
pub trait ForegroundProcessProbe: Send + Sync {
    /// Returns the id of the process owning the foreground window.
    fn foreground_process_id(&self) -> Result<u32, ProbeError>;

    /// Returns the executable name of `pid` (without directory), if known.
    fn process_name(&self, pid: u32) -> Result<Option<String>, ProbeError>;
}

/// Polls the foreground process and reports transitions to denylisted processes.
pub struct FocusLossMonitor {
    tracker: ForegroundTracker,
    probe: Arc<dyn ForegroundProcessProbe>,
}

impl FocusLossMonitor {
    pub fn new(probe: Arc<dyn ForegroundProcessProbe>, tracker: ForegroundTracker) -> Self {
        Self { tracker, probe }
    }

    /// Takes one sample.
    ///
    /// Returns `Ok(Some(_))` only on the transition *into* a denylisted
    /// process; repeated samples of the same process yield `Ok(None)`.
    /// A pid is only recorded once its name query has succeeded, so a failed
    /// sample is retried on the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] if the platform query fails.
    pub fn tick(&mut self) -> Result<Option<FocusLost>, ProbeError> {
        let pid = self.probe.foreground_process_id()?;
        if !self.tracker.is_change(pid) {
            return Ok(None);
        }

        let name = self.probe.process_name(pid)?;
        self.tracker.observe(pid);
        let Some(process_name) = name else {
            debug!("foreground changed to pid {pid} with no process name");
            return Ok(None);
        };
        debug!("foreground changed to {process_name} (pid {pid})");

        if self.tracker.is_denylisted(&process_name) {
            Ok(Some(FocusLost { pid, process_name }))
        } else {
            Ok(None)
        }
    }

    /// Moves the monitor onto its own thread, polling every `interval`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(
        self,
        interval: Duration,
        notices: Sender<FocusLost>,
    ) -> std::io::Result<FocusMonitorHandle> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("chroma-focus-monitor".to_string())
            .spawn(move || run_monitor_loop(self, interval, stop_rx, notices))?;

        Ok(FocusMonitorHandle {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        })
    }
}

/// Owner handle for the monitor thread.  Dropping it stops the thread.
pub struct FocusMonitorHandle {
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl FocusMonitorHandle {
    /// Signals the thread to exit and waits for it.  Idempotent.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("focus monitor thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }
}

impl Drop for FocusMonitorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_monitor_loop(
    mut monitor: FocusLossMonitor,
    interval: Duration,
    stop_rx: Receiver<()>,
    notices: Sender<FocusLost>,
) {
    info!("focus monitor polling every {interval:?}");

    loop {
        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }

        match panic::catch_unwind(AssertUnwindSafe(|| monitor.tick())) {
            Ok(Ok(Some(notice))) => {
                info!(
                    "{} (pid {}) took focus, releasing held input",
                    notice.process_name, notice.pid
                );
                if notices.send(notice).is_err() {
                    // Relay gone – the hub is shutting down.
                    break;
                }
            }
            Ok(Ok(None)) => {}
            Ok(Err(e)) => warn!("focus poll failed: {e}"),
            Err(_) => error!("focus poll panicked, continuing with next tick"),
        }
    }

    info!("focus monitor stopped");
}

/// Spawns the thread that turns [`FocusLost`] notices into release-all calls.
///
/// The thread exits once every sender for `notices` has been dropped.
///
/// # Errors
///
/// Returns the OS error if the thread cannot be spawned.
pub fn spawn_release_relay(
    notices: Receiver<FocusLost>,
    owner: Arc<dyn InputStateOwner>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("chroma-release-relay".to_string())
        .spawn(move || {
            for notice in notices {
                debug!("release-all for focus loss to {}", notice.process_name);
                if panic::catch_unwind(AssertUnwindSafe(|| owner.release_all())).is_err() {
                    error!("release-all panicked");
                }
            }
        })
}
