//! Held-input tracking and release-all.
//!
//! [`HeldInputTracker`] watches the hub's event stream and remembers which
//! keys and mouse buttons are currently down, per device.  When the focus
//! monitor reports a switch to a process that swallows key-ups, the relay
//! calls [`InputStateOwner::release_all`], which sends a synthetic release for
//! everything still held to the downstream consumer and forgets it.
//!
//! Forwarding and release-all are serialized on one delivery lock, so a
//! key-down racing a release-all always reaches downstream after the
//! synthetic release and stays recorded as held.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chroma_input_core::{
    Device, InputEvent, KeyEvent, LogicalKey, MouseButton, MouseButtonEvent,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::dispatch_input::{InputStateOwner, InputSubscriber};

/// Keys and buttons that are down right now, keyed by `(device id, input)`.
#[derive(Default)]
struct HeldSet {
    keys: HashMap<(Option<Uuid>, LogicalKey), Option<Device>>,
    buttons: HashMap<(Option<Uuid>, MouseButton), Option<Device>>,
}

/// Subscriber that forwards events downstream and tracks what is held.
pub struct HeldInputTracker {
    held: Mutex<HeldSet>,
    delivery: Mutex<()>,
    downstream: Arc<dyn InputSubscriber>,
}

impl HeldInputTracker {
    pub fn new(downstream: Arc<dyn InputSubscriber>) -> Self {
        Self {
            held: Mutex::new(HeldSet::default()),
            delivery: Mutex::new(()),
            downstream,
        }
    }

    /// Number of keys currently held across all devices.
    pub fn held_key_count(&self) -> usize {
        self.lock().keys.len()
    }

    /// Number of mouse buttons currently held across all devices.
    pub fn held_button_count(&self) -> usize {
        self.lock().buttons.len()
    }

    pub fn is_key_held(&self, key: LogicalKey) -> bool {
        self.lock().keys.keys().any(|(_, held)| *held == key)
    }

    fn lock(&self) -> MutexGuard<'_, HeldSet> {
        self.held.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn deliver(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, event: &InputEvent) {
        let mut held = self.lock();
        match event {
            InputEvent::Key(key) => {
                let slot = (device_id(&key.device), key.key);
                if key.is_down {
                    held.keys.insert(slot, key.device.clone());
                } else {
                    held.keys.remove(&slot);
                }
            }
            InputEvent::MouseButton(button) => {
                let slot = (device_id(&button.device), button.button);
                if button.is_down {
                    held.buttons.insert(slot, button.device.clone());
                } else {
                    held.buttons.remove(&slot);
                }
            }
            _ => {}
        }
    }
}

impl InputSubscriber for HeldInputTracker {
    fn on_input_event(&self, event: &InputEvent) {
        let _delivery = self.deliver();
        self.record(event);
        self.downstream.on_input_event(event);
    }
}

impl InputStateOwner for HeldInputTracker {
    fn release_all(&self) {
        let _delivery = self.deliver();
        let HeldSet { keys, buttons } = std::mem::take(&mut *self.lock());
        if keys.is_empty() && buttons.is_empty() {
            debug!("release-all with nothing held");
            return;
        }
        info!(
            "releasing {} held key(s) and {} held button(s)",
            keys.len(),
            buttons.len()
        );

        for ((_, key), device) in keys {
            self.downstream.on_input_event(&InputEvent::Key(KeyEvent {
                device,
                key,
                is_down: false,
            }));
        }
        for ((_, button), device) in buttons {
            self.downstream
                .on_input_event(&InputEvent::MouseButton(MouseButtonEvent {
                    device,
                    button,
                    is_down: false,
                }));
        }
    }
}

fn device_id(device: &Option<Device>) -> Option<Uuid> {
    device.as_ref().map(|d| d.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_input_core::{InputDeviceType, ToggleStatus};
    use std::sync::OnceLock;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    fn recording_tracker() -> (HeldInputTracker, Arc<Mutex<Vec<InputEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let tracker =
            HeldInputTracker::new(Arc::new(move |e: &InputEvent| sink.lock().unwrap().push(e.clone())));
        (tracker, seen)
    }

    fn key(key: LogicalKey, is_down: bool) -> InputEvent {
        InputEvent::Key(KeyEvent {
            device: None,
            key,
            is_down,
        })
    }

    #[test]
    fn test_events_are_forwarded_downstream() {
        let (tracker, seen) = recording_tracker();

        tracker.on_input_event(&InputEvent::ToggleStatus(ToggleStatus::default()));

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_key_down_then_up_is_not_held() {
        let (tracker, _) = recording_tracker();

        tracker.on_input_event(&key(LogicalKey::A, true));
        assert!(tracker.is_key_held(LogicalKey::A));
        tracker.on_input_event(&key(LogicalKey::A, false));

        assert_eq!(tracker.held_key_count(), 0);
    }

    #[test]
    fn test_release_all_emits_synthetic_releases_and_clears() {
        // Arrange
        let (tracker, seen) = recording_tracker();
        let mouse = Device {
            id: Uuid::new_v4(),
            name: "Mouse".into(),
            device_type: InputDeviceType::Mouse,
        };
        tracker.on_input_event(&key(LogicalKey::LeftCtrl, true));
        tracker.on_input_event(&key(LogicalKey::LeftAlt, true));
        tracker.on_input_event(&InputEvent::MouseButton(MouseButtonEvent {
            device: Some(mouse.clone()),
            button: MouseButton::Left,
            is_down: true,
        }));
        seen.lock().unwrap().clear();

        // Act
        tracker.release_all();

        // Assert
        let released = seen.lock().unwrap().clone();
        assert_eq!(released.len(), 3);
        assert!(released.contains(&key(LogicalKey::LeftCtrl, false)));
        assert!(released.contains(&key(LogicalKey::LeftAlt, false)));
        assert!(released.contains(&InputEvent::MouseButton(MouseButtonEvent {
            device: Some(mouse),
            button: MouseButton::Left,
            is_down: false,
        })));
        assert_eq!(tracker.held_key_count(), 0);
        assert_eq!(tracker.held_button_count(), 0);
    }

    #[test]
    fn test_release_all_with_nothing_held_emits_nothing() {
        let (tracker, seen) = recording_tracker();

        tracker.release_all();

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_same_key_on_two_devices_is_held_twice() {
        let (tracker, _) = recording_tracker();
        let other = Device {
            id: Uuid::new_v4(),
            name: "Second keyboard".into(),
            device_type: InputDeviceType::Keyboard,
        };

        tracker.on_input_event(&key(LogicalKey::W, true));
        tracker.on_input_event(&InputEvent::Key(KeyEvent {
            device: Some(other),
            key: LogicalKey::W,
            is_down: true,
        }));

        assert_eq!(tracker.held_key_count(), 2);
    }

    #[test]
    fn test_key_down_during_release_all_is_delivered_after_release() {
        // Arrange – downstream that injects a Ctrl autorepeat from another
        // thread while the synthetic Ctrl release is being delivered.
        let tracker_slot: Arc<OnceLock<Arc<HeldInputTracker>>> = Arc::new(OnceLock::new());
        let repeat: Arc<Mutex<Option<JoinHandle<()>>>> = Arc::new(Mutex::new(None));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let slot = Arc::clone(&tracker_slot);
        let pending = Arc::clone(&repeat);
        let sink = Arc::clone(&seen);
        let tracker = Arc::new(HeldInputTracker::new(Arc::new(move |e: &InputEvent| {
            sink.lock().unwrap().push(e.clone());
            if *e == key(LogicalKey::LeftCtrl, false) && pending.lock().unwrap().is_none() {
                let tracker = Arc::clone(slot.get().expect("tracker set"));
                *pending.lock().unwrap() = Some(thread::spawn(move || {
                    tracker.on_input_event(&key(LogicalKey::LeftCtrl, true));
                }));
                thread::sleep(Duration::from_millis(20));
            }
        })));
        let _ = tracker_slot.set(Arc::clone(&tracker));
        tracker.on_input_event(&key(LogicalKey::LeftCtrl, true));
        seen.lock().unwrap().clear();

        // Act
        tracker.release_all();
        let handle = repeat.lock().unwrap().take().expect("repeat thread spawned");
        handle.join().expect("repeat thread");

        // Assert
        assert_eq!(
            *seen.lock().unwrap(),
            vec![key(LogicalKey::LeftCtrl, false), key(LogicalKey::LeftCtrl, true)]
        );
        assert!(tracker.is_key_held(LogicalKey::LeftCtrl));
    }
}
