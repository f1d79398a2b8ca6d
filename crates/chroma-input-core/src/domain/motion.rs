//! Mouse motion aggregation and throttling.
//!
//! Raw mouse records arrive at the device's polling rate (often 500–1000 Hz).
//! Downstream animation consumers only need a fraction of that, so relative
//! deltas are accumulated between publishes and movement is published at most
//! `max_publish_hz` times per second.
//!
//! Published deltas are *not* the accumulated relative deltas.  They are the
//! difference between the current absolute cursor position and the position
//! reported by the previous publish, so dropped or coalesced raw samples can
//! never make the reported motion drift from where the cursor really is.  The
//! accumulated relative delta is only used for the very first publish, when
//! there is no previous absolute position yet.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::input::events::MouseMoveEvent;

/// Default publish cap, in events per second.
pub const DEFAULT_MAX_PUBLISH_HZ: u32 = 25;

/// Relative motion received since the last publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulatedMotion {
    pub pending_dx: i32,
    pub pending_dy: i32,
}

/// Accumulates raw deltas and produces throttled, cursor-accurate move events.
#[derive(Debug)]
pub struct MotionAggregator {
    pending: AccumulatedMotion,
    last_position: Option<(i32, i32)>,
    min_interval: Option<Duration>,
    last_publish: Option<Instant>,
}

impl MotionAggregator {
    /// Creates an aggregator capped at `max_publish_hz`; `0` disables the cap.
    pub fn new(max_publish_hz: u32) -> Self {
        let min_interval = (max_publish_hz > 0)
            .then(|| Duration::from_secs(1) / max_publish_hz);
        Self {
            pending: AccumulatedMotion::default(),
            last_position: None,
            min_interval,
            last_publish: None,
        }
    }

    /// Adds a raw relative delta to the pending totals.
    pub fn accumulate(&mut self, delta_x: i32, delta_y: i32) {
        self.pending.pending_dx = self.pending.pending_dx.saturating_add(delta_x);
        self.pending.pending_dy = self.pending.pending_dy.saturating_add(delta_y);
    }

    pub fn pending(&self) -> AccumulatedMotion {
        self.pending
    }

    /// Returns `true` when enough time has passed since the previous publish.
    pub fn publish_due(&self, now: Instant) -> bool {
        match (self.min_interval, self.last_publish) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        }
    }

    /// Builds a move event for the cursor at `(x, y)` and resets pending totals.
    ///
    /// The returned event has no device attached.
    pub fn publish(&mut self, x: i32, y: i32) -> MouseMoveEvent {
        let (dx, dy) = match self.last_position {
            Some((last_x, last_y)) => (x.saturating_sub(last_x), y.saturating_sub(last_y)),
            None => (self.pending.pending_dx, self.pending.pending_dy),
        };

        self.last_position = Some((x, y));
        self.pending = AccumulatedMotion::default();

        MouseMoveEvent {
            device: None,
            x,
            y,
            dx,
            dy,
        }
    }

    /// Publishes if due, reading the cursor only when a publish will happen.
    ///
    /// When `cursor` yields nothing the pending totals are kept for the next
    /// attempt.
    pub fn try_publish(
        &mut self,
        now: Instant,
        cursor: impl FnOnce() -> Option<(i32, i32)>,
    ) -> Option<MouseMoveEvent> {
        if !self.publish_due(now) {
            return None;
        }
        let (x, y) = cursor()?;
        self.last_publish = Some(now);
        Some(self.publish(x, y))
    }
}

impl Default for MotionAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PUBLISH_HZ)
    }
}
