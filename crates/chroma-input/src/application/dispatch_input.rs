//! Input Event Hub: turns raw records into normalized events for subscribers.
//!
//! This is the hot path.  Every keystroke and every mouse report passes
//! through [`InputHub::dispatch`], on whatever thread the native pump
//! delivers it.
//!
//! # Dispatch flow
//!
//! ```text
//! RawInputRecord
//!   ├─ Keyboard ─► translate ─► resolve identity ─► IdentifierReceived?
//!   │                         ─► KeyEvent ─► ToggleStatus
//!   └─ Mouse ────► resolve identity + device lookup
//!        ├─ no button flags ─► accumulate ─► MouseMove (if due)
//!        └─ otherwise ─► IdentifierReceived? ─► MouseScroll | MouseButton
//! ```
//!
//! # Lifecycle
//!
//! `Uninitialized ──start()──► Registered ──dispose()──► Disposed`
//!
//! Records delivered outside `Registered` are ignored.  `dispose` is
//! idempotent and also runs on drop.
//!
//! # Locking
//!
//! The identity cache and the motion aggregator share one mutex.  It is never
//! held while subscribers or the device lookup run, so a subscriber may call
//! back into the hub.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use chroma_input_core::keymap::key_is_down;
use chroma_input_core::{
    translate, Device, DeviceHandle, DeviceIdentifier, DeviceIdentityCache, DevicePathSource,
    ForegroundTracker, InputDeviceType, InputEvent, KeyEvent, LockKeyProbe, MotionAggregator,
    MouseButtonEvent, MouseMoveEvent, MouseScrollEvent, ProviderId, RawInputRecord,
    RawKeyboardRecord, RawMouseRecord, ToggleStateTracker, DEFAULT_FOCUS_DENYLIST,
    DEFAULT_MAX_PUBLISH_HZ, RAW_INPUT_PROVIDER_ID,
};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use super::focus_monitor::{
    spawn_release_relay, FocusLossMonitor, FocusMonitorHandle, ForegroundProcessProbe,
    DEFAULT_POLL_INTERVAL,
};
use crate::infrastructure::native_pump::{NativeHookError, NativeMessagePump};

// ── Collaborator traits ───────────────────────────────────────────────────────

/// Receives every event the hub publishes, in publish order.
///
/// Implemented for any `Fn(&InputEvent) + Send + Sync` closure.
pub trait InputSubscriber: Send + Sync {
    fn on_input_event(&self, event: &InputEvent);
}

impl<F> InputSubscriber for F
where
    F: Fn(&InputEvent) + Send + Sync,
{
    fn on_input_event(&self, event: &InputEvent) {
        self(event)
    }
}

/// The device lookup service failed.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("unknown provider {0}")]
    UnknownProvider(ProviderId),
    #[error("device lookup unavailable: {0}")]
    Unavailable(String),
}

/// Maps a stable identifier to the collaborator-side device.
pub trait DeviceLookup: Send + Sync {
    fn device_by_identifier(
        &self,
        provider: ProviderId,
        identifier: &DeviceIdentifier,
        device_type: InputDeviceType,
    ) -> Result<Option<Device>, LookupError>;
}

/// Owner of "currently held" input state.
pub trait InputStateOwner: Send + Sync {
    /// Releases every held key and button.
    fn release_all(&self);
}

/// Reads the absolute cursor position.
pub trait CursorPosition: Send + Sync {
    fn cursor_position(&self) -> Option<(i32, i32)>;
}

// ── Construction ──────────────────────────────────────────────────────────────

/// Tunables for the hub, usually built from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubSettings {
    pub focus_poll_interval: Duration,
    pub focus_denylist: Vec<String>,
    /// Maximum mouse-move publishes per second; `0` publishes every movement record.
    pub max_publish_hz: u32,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            focus_poll_interval: DEFAULT_POLL_INTERVAL,
            focus_denylist: DEFAULT_FOCUS_DENYLIST.iter().map(|s| s.to_string()).collect(),
            max_publish_hz: DEFAULT_MAX_PUBLISH_HZ,
        }
    }
}

/// Everything the hub talks to outside itself.
#[derive(Clone)]
pub struct HubServices {
    pub pump: Arc<dyn NativeMessagePump>,
    pub device_paths: Arc<dyn DevicePathSource>,
    pub lock_keys: Arc<dyn LockKeyProbe>,
    pub cursor: Arc<dyn CursorPosition>,
    pub foreground: Arc<dyn ForegroundProcessProbe>,
    pub devices: Arc<dyn DeviceLookup>,
    pub input_state: Arc<dyn InputStateOwner>,
}

/// Error type for hub lifecycle operations.
#[derive(Debug, Error)]
pub enum HubError {
    #[error(transparent)]
    Hook(#[from] NativeHookError),
    #[error("input hub has already been started")]
    AlreadyStarted,
    #[error("input hub has been disposed")]
    Disposed,
    #[error("failed to spawn focus monitor: {0}")]
    FocusMonitor(#[source] std::io::Error),
}

/// Lifecycle state of an [`InputHub`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubState {
    Uninitialized,
    Registered,
    Disposed,
}

impl HubState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => HubState::Uninitialized,
            1 => HubState::Registered,
            _ => HubState::Disposed,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            HubState::Uninitialized => 0,
            HubState::Registered => 1,
            HubState::Disposed => 2,
        }
    }
}

/// Mutable dispatch state; always locked as one unit.
struct Pipeline {
    identities: DeviceIdentityCache,
    motion: MotionAggregator,
}

/// Background threads owned while registered.
#[derive(Default)]
struct Workers {
    focus: Option<FocusMonitorHandle>,
    relay: Option<JoinHandle<()>>,
}

// ── InputHub ──────────────────────────────────────────────────────────────────

/// The provider's central dispatcher.
pub struct InputHub {
    services: HubServices,
    settings: HubSettings,
    toggles: ToggleStateTracker,
    state: AtomicU8,
    pipeline: Mutex<Pipeline>,
    subscribers: RwLock<Vec<Arc<dyn InputSubscriber>>>,
    workers: Mutex<Workers>,
}

impl InputHub {
    pub fn new(services: HubServices, settings: HubSettings) -> Arc<Self> {
        let toggles = ToggleStateTracker::new(Arc::clone(&services.lock_keys));
        let motion = MotionAggregator::new(settings.max_publish_hz);
        Arc::new(Self {
            services,
            settings,
            toggles,
            state: AtomicU8::new(HubState::Uninitialized.as_u8()),
            pipeline: Mutex::new(Pipeline {
                identities: DeviceIdentityCache::new(),
                motion,
            }),
            subscribers: RwLock::new(Vec::new()),
            workers: Mutex::new(Workers::default()),
        })
    }

    pub fn state(&self) -> HubState {
        HubState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Registers a subscriber.  Subscribers are never removed.
    pub fn subscribe(&self, subscriber: Arc<dyn InputSubscriber>) {
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(subscriber);
    }

    /// Installs the native hook, publishes the initial toggle status and
    /// starts the focus-loss monitor.
    ///
    /// # Errors
    ///
    /// - [`HubError::AlreadyStarted`] / [`HubError::Disposed`] outside `Uninitialized`.
    /// - [`HubError::Hook`] if the pump cannot be installed; the hub stays
    ///   `Uninitialized`.
    /// - [`HubError::FocusMonitor`] if a worker thread cannot be spawned; the
    ///   pump is uninstalled again.
    pub fn start(self: &Arc<Self>) -> Result<(), HubError> {
        let mut workers = lock(&self.workers);
        match self.state() {
            HubState::Uninitialized => {}
            HubState::Registered => return Err(HubError::AlreadyStarted),
            HubState::Disposed => return Err(HubError::Disposed),
        }

        // Weak so the pump never keeps a dropped hub alive.
        let hub = Arc::downgrade(self);
        self.services.pump.install(Box::new(move |record| {
            if let Some(hub) = hub.upgrade() {
                hub.dispatch(record);
            }
        }))?;
        self.set_state(HubState::Registered);
        info!("input hub registered");

        self.publish_toggle_status();

        match self.spawn_workers() {
            Ok(spawned) => {
                *workers = spawned;
                Ok(())
            }
            Err(e) => {
                self.set_state(HubState::Uninitialized);
                if let Err(hook) = self.services.pump.uninstall() {
                    error!("failed to uninstall native hook after start failure: {hook}");
                }
                Err(e)
            }
        }
    }

    fn spawn_workers(&self) -> Result<Workers, HubError> {
        let (notices_tx, notices_rx) = mpsc::channel();
        let relay = spawn_release_relay(notices_rx, Arc::clone(&self.services.input_state))
            .map_err(HubError::FocusMonitor)?;

        let monitor = FocusLossMonitor::new(
            Arc::clone(&self.services.foreground),
            ForegroundTracker::new(self.settings.focus_denylist.iter().cloned()),
        );
        // On failure the sender is dropped, which ends the relay thread.
        let focus = monitor
            .spawn(self.settings.focus_poll_interval, notices_tx)
            .map_err(HubError::FocusMonitor)?;

        Ok(Workers {
            focus: Some(focus),
            relay: Some(relay),
        })
    }

    /// Processes one raw record.  Never fails; problems are logged.
    pub fn dispatch(&self, record: RawInputRecord) {
        if self.state() != HubState::Registered {
            trace!("ignoring record from {} outside registered state", record.device());
            return;
        }

        match record {
            RawInputRecord::Keyboard(keyboard) => self.dispatch_keyboard(keyboard),
            RawInputRecord::Mouse(mouse) => self.dispatch_mouse(mouse),
        }
    }

    /// Publishes a fresh toggle-status snapshot on request.
    pub fn on_keyboard_toggle_status_requested(&self) {
        if self.state() == HubState::Disposed {
            return;
        }
        self.publish_toggle_status();
    }

    /// Number of device handles resolved so far.
    pub fn resolved_device_count(&self) -> usize {
        lock(&self.pipeline).identities.len()
    }

    /// Stops the focus monitor, removes the native hook and clears the
    /// identity cache.  Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Hook`] if the hook could not be removed cleanly; the
    /// hub is disposed regardless.
    pub fn dispose(&self) -> Result<(), HubError> {
        let mut workers = lock(&self.workers);
        let previous = HubState::from_u8(
            self.state.swap(HubState::Disposed.as_u8(), Ordering::SeqCst),
        );
        if previous == HubState::Disposed {
            return Ok(());
        }

        // Focus monitor first: nothing may call release_all after teardown.
        if let Some(mut focus) = workers.focus.take() {
            focus.stop();
        }
        if let Some(relay) = workers.relay.take() {
            if relay.join().is_err() {
                error!("release relay thread panicked");
            }
        }

        let result = if previous == HubState::Registered {
            self.services.pump.uninstall()
        } else {
            Ok(())
        };

        lock(&self.pipeline).identities.clear();
        info!("input hub disposed");

        result.map_err(HubError::from)
    }

    // ── Keyboard ─────────────────────────────────────────────────────────────

    fn dispatch_keyboard(&self, record: RawKeyboardRecord) {
        let key = match translate(record.virtual_code, record.scan_code, record.flags) {
            Ok(key) => key,
            Err(e) => {
                error!(
                    scan_code = record.scan_code,
                    virtual_key = record.virtual_code,
                    flags = record.flags,
                    "failed to translate keyboard record: {e}"
                );
                return;
            }
        };
        if key.is_none() {
            trace!("dropping synthetic key vk={:#04x}", record.virtual_code);
            return;
        }

        let identifier = self.resolve_identifier(record.device);
        let device = match identifier {
            Some(identifier) => {
                let device = self.lookup_device(&identifier, InputDeviceType::Keyboard);
                self.publish(&InputEvent::IdentifierReceived {
                    identifier,
                    device_type: InputDeviceType::Keyboard,
                });
                device
            }
            None => None,
        };

        self.publish(&InputEvent::Key(KeyEvent {
            device,
            key,
            is_down: key_is_down(record.flags),
        }));
        self.publish_toggle_status();
    }

    // ── Mouse ────────────────────────────────────────────────────────────────

    fn dispatch_mouse(&self, record: RawMouseRecord) {
        let identifier = self.resolve_identifier(record.device);
        let device = identifier
            .as_ref()
            .and_then(|identifier| self.lookup_device(identifier, InputDeviceType::Mouse));

        if record.is_movement_only() {
            self.dispatch_movement(record, device);
            return;
        }

        if let Some(identifier) = identifier {
            self.publish(&InputEvent::IdentifierReceived {
                identifier,
                device_type: InputDeviceType::Mouse,
            });
        }

        if record.button_data != 0 {
            match record.scroll_axis() {
                Some(axis) => self.publish(&InputEvent::MouseScroll(MouseScrollEvent {
                    device,
                    axis,
                    magnitude: record.button_data,
                })),
                None => debug!(
                    "ignoring mouse record with data {} and flags {:#06x}",
                    record.button_data, record.button_flags
                ),
            }
            return;
        }

        match record.button_transition() {
            Some((button, is_down)) => self.publish(&InputEvent::MouseButton(MouseButtonEvent {
                device,
                button,
                is_down,
            })),
            None => debug!("ignoring mouse button flags {:#06x}", record.button_flags),
        }
    }

    fn dispatch_movement(&self, record: RawMouseRecord, device: Option<Device>) {
        let moved = {
            let mut pipeline = lock(&self.pipeline);
            pipeline.motion.accumulate(record.delta_x, record.delta_y);
            pipeline
                .motion
                .try_publish(Instant::now(), || self.services.cursor.cursor_position())
        };

        if let Some(moved) = moved {
            self.publish(&InputEvent::MouseMove(MouseMoveEvent { device, ..moved }));
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn resolve_identifier(&self, handle: DeviceHandle) -> Option<DeviceIdentifier> {
        lock(&self.pipeline)
            .identities
            .resolve(handle, self.services.device_paths.as_ref())
    }

    fn lookup_device(
        &self,
        identifier: &DeviceIdentifier,
        device_type: InputDeviceType,
    ) -> Option<Device> {
        match self
            .services
            .devices
            .device_by_identifier(RAW_INPUT_PROVIDER_ID, identifier, device_type)
        {
            Ok(device) => device,
            Err(e) => {
                warn!("device lookup for {identifier} failed: {e}");
                None
            }
        }
    }

    fn publish_toggle_status(&self) {
        self.publish(&InputEvent::ToggleStatus(self.toggles.snapshot()));
    }

    fn publish(&self, event: &InputEvent) {
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for subscriber in subscribers {
            if panic::catch_unwind(AssertUnwindSafe(|| subscriber.on_input_event(event))).is_err() {
                error!("input subscriber panicked while handling {event:?}");
            }
        }
    }

    fn set_state(&self, state: HubState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }
}

impl Drop for InputHub {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            error!("input hub teardown failed: {e}");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
