//! Integration tests for the dispatch pipeline.
//!
//! These tests exercise the application layer end-to-end: `InputHub` +
//! `DeviceRegistry` + `HeldInputTracker` driven through the mock pump and the
//! mock platform, exactly as `main.rs` wires the real adapters.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chroma_input_core::input::records::{
    MOUSE_HWHEEL, MOUSE_LEFT_DOWN, MOUSE_RIGHT_DOWN, MOUSE_RIGHT_UP, MOUSE_WHEEL,
};
use chroma_input_core::{
    Device, DeviceHandle, DeviceIdentifier, InputDeviceType, InputEvent, KeyEvent, LogicalKey,
    MouseButton, MouseButtonEvent, MouseMoveEvent, MouseScrollEvent, RawInputRecord, RawKeyboardRecord,
    RawMouseRecord, ScrollAxis, ToggleStatus, RAW_INPUT_PROVIDER_ID,
};
use uuid::Uuid;

use chroma_input::application::dispatch_input::{HubServices, HubSettings, InputHub};
use chroma_input::infrastructure::native_pump::NativeMessagePump;
use chroma_input::application::held_input::HeldInputTracker;
use chroma_input::application::manage_devices::DeviceRegistry;
use chroma_input::infrastructure::native_pump::mock::MockMessagePump;
use chroma_input::infrastructure::platform::mock::MockPlatform;

const KEYBOARD: DeviceHandle = DeviceHandle(0x1001);
const MOUSE: DeviceHandle = DeviceHandle(0x2002);
const KEYBOARD_PATH: &str = r"\\?\HID#VID_1532&PID_0226&MI_00#kbd";
const MOUSE_PATH: &str = r"\\?\HID#VID_1532&PID_0084&MI_00#mouse";

// ── Harness ───────────────────────────────────────────────────────────────────

struct Provider {
    hub: Arc<InputHub>,
    pump: Arc<MockMessagePump>,
    platform: Arc<MockPlatform>,
    registry: Arc<DeviceRegistry>,
    held: Arc<HeldInputTracker>,
    events: Arc<Mutex<Vec<InputEvent>>>,
    keyboard: Device,
}

impl Provider {
    fn start() -> Self {
        let keyboard = Device {
            id: Uuid::new_v4(),
            name: "Main keyboard".to_string(),
            device_type: InputDeviceType::Keyboard,
        };
        let registry = Arc::new(DeviceRegistry::with_bindings(
            RAW_INPUT_PROVIDER_ID,
            [(identifier(KEYBOARD_PATH), keyboard.clone())],
        ));

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let held = Arc::new(HeldInputTracker::new(Arc::new(move |e: &InputEvent| {
            sink.lock().unwrap().push(e.clone())
        })));

        let pump = Arc::new(MockMessagePump::new());
        let platform = Arc::new(MockPlatform::new());
        platform.set_device_path(KEYBOARD, KEYBOARD_PATH);
        platform.set_device_path(MOUSE, MOUSE_PATH);

        let hub = InputHub::new(
            HubServices {
                pump: pump.clone(),
                device_paths: platform.clone(),
                lock_keys: platform.clone(),
                cursor: platform.clone(),
                foreground: platform.clone(),
                devices: registry.clone(),
                input_state: held.clone(),
            },
            HubSettings {
                focus_poll_interval: Duration::from_secs(60),
                max_publish_hz: 0,
                ..HubSettings::default()
            },
        );
        hub.subscribe(held.clone());
        hub.subscribe(registry.clone());
        hub.start().expect("hub must start with the mock pump");

        let provider = Self {
            hub,
            pump,
            platform,
            registry,
            held,
            events,
            keyboard,
        };
        provider.drain();
        provider
    }

    fn drain(&self) -> Vec<InputEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    fn key(&self, virtual_code: u16, scan_code: u16, flags: u16) {
        self.pump.deliver(RawInputRecord::Keyboard(RawKeyboardRecord {
            device: KEYBOARD,
            virtual_code,
            scan_code,
            flags,
        }));
    }

    fn mouse(&self, button_flags: u16, button_data: i16, delta_x: i32, delta_y: i32) {
        self.pump.deliver(RawInputRecord::Mouse(RawMouseRecord {
            device: MOUSE,
            button_flags,
            button_data,
            delta_x,
            delta_y,
        }));
    }
}

fn identifier(path: &str) -> DeviceIdentifier {
    DeviceIdentifier::new(path).expect("non-empty path")
}

fn without_identifiers(events: Vec<InputEvent>) -> Vec<InputEvent> {
    events
        .into_iter()
        .filter(|e| !matches!(e, InputEvent::IdentifierReceived { .. }))
        .collect()
}

// ── Keyboard ──────────────────────────────────────────────────────────────────

#[test]
fn test_left_shift_down_emits_key_then_toggle_status() {
    // Arrange
    let provider = Provider::start();
    provider.platform.set_toggles(true, false, false);

    // Act – VK_SHIFT, scan 0x2A, key-down
    provider.key(0x10, 0x2A, 0);

    // Assert
    assert_eq!(
        without_identifiers(provider.drain()),
        vec![
            InputEvent::Key(KeyEvent {
                device: Some(provider.keyboard.clone()),
                key: LogicalKey::LeftShift,
                is_down: true,
            }),
            InputEvent::ToggleStatus(ToggleStatus::new(true, false, false)),
        ]
    );
}

#[test]
fn test_right_side_modifiers_stay_distinct() {
    // Arrange
    let provider = Provider::start();

    // Act – right shift, right ctrl (E0), right alt (E0)
    provider.key(0x10, 0x36, 0);
    provider.key(0x11, 0x1D, 2);
    provider.key(0x12, 0x38, 2);

    // Assert
    let keys: Vec<LogicalKey> = provider
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            InputEvent::Key(k) => Some(k.key),
            _ => None,
        })
        .collect();
    assert_eq!(
        keys,
        vec![LogicalKey::RightShift, LogicalKey::RightCtrl, LogicalKey::RightAlt]
    );
}

#[test]
fn test_known_keyboard_reports_identifier_before_key() {
    let provider = Provider::start();

    provider.key(0x41, 0x1E, 0);

    let events = provider.drain();
    assert_eq!(
        events[0],
        InputEvent::IdentifierReceived {
            identifier: identifier(KEYBOARD_PATH),
            device_type: InputDeviceType::Keyboard,
        }
    );
    assert!(matches!(events[1], InputEvent::Key(KeyEvent { key: LogicalKey::A, .. })));
}

#[test]
fn test_device_path_resolved_once_per_handle() {
    // Arrange
    let provider = Provider::start();

    // Act
    for _ in 0..5 {
        provider.key(0x41, 0x1E, 0);
        provider.key(0x41, 0x1E, 1);
    }

    // Assert
    assert_eq!(provider.platform.path_query_count(), 1);
    assert_eq!(provider.hub.resolved_device_count(), 1);
}

#[test]
fn test_failed_device_path_still_emits_device_less_key() {
    // Arrange
    let provider = Provider::start();
    provider.platform.set_device_paths_failing(true);

    // Act
    provider.key(0x41, 0x1E, 0);

    // Assert
    let events = provider.drain();
    assert_eq!(
        events[0],
        InputEvent::Key(KeyEvent { device: None, key: LogicalKey::A, is_down: true })
    );
    assert_eq!(provider.hub.resolved_device_count(), 0);
}

// ── Mouse ─────────────────────────────────────────────────────────────────────

#[test]
fn test_wheel_emits_vertical_scroll_and_no_motion() {
    // Arrange
    let provider = Provider::start();
    provider.platform.set_cursor(500, 500);

    // Act
    provider.mouse(MOUSE_WHEEL, 120, 0, 0);

    // Assert
    let events = without_identifiers(provider.drain());
    assert_eq!(
        events,
        vec![InputEvent::MouseScroll(MouseScrollEvent {
            device: None,
            axis: ScrollAxis::Vertical,
            magnitude: 120,
        })]
    );
    assert_eq!(provider.platform.cursor_query_count(), 0);
}

#[test]
fn test_horizontal_wheel_keeps_sign() {
    let provider = Provider::start();

    provider.mouse(MOUSE_HWHEEL, -240, 0, 0);

    assert_eq!(
        without_identifiers(provider.drain()),
        vec![InputEvent::MouseScroll(MouseScrollEvent {
            device: None,
            axis: ScrollAxis::Horizontal,
            magnitude: -240,
        })]
    );
}

#[test]
fn test_unbound_mouse_is_reported_to_registry() {
    let provider = Provider::start();

    provider.mouse(MOUSE_RIGHT_DOWN, 0, 0, 0);

    assert_eq!(
        provider.registry.unbound_identifiers(),
        vec![(InputDeviceType::Mouse, identifier(MOUSE_PATH))]
    );
}

#[test]
fn test_pure_movement_never_reports_identifier() {
    let provider = Provider::start();
    provider.platform.set_cursor(10, 10);

    provider.mouse(0, 0, 4, 4);

    let events = provider.drain();
    assert!(events
        .iter()
        .all(|e| !matches!(e, InputEvent::IdentifierReceived { .. })));
    assert!(matches!(events.as_slice(), [InputEvent::MouseMove(_)]));
    assert!(provider.registry.unbound_identifiers().is_empty());
}

#[test]
fn test_movement_carried_by_button_record_is_not_aggregated() {
    // Arrange
    let provider = Provider::start();
    provider.platform.set_cursor(100, 100);

    // Act – left press while dragging, then plain movement
    provider.mouse(MOUSE_LEFT_DOWN, 0, 50, 50);
    let press_events = provider.drain();
    provider.mouse(0, 0, 3, 4);

    // Assert
    assert!(press_events
        .iter()
        .all(|e| !matches!(e, InputEvent::MouseMove(_))));
    assert!(press_events.contains(&InputEvent::MouseButton(MouseButtonEvent {
        device: None,
        button: MouseButton::Left,
        is_down: true,
    })));
    assert_eq!(
        provider.drain(),
        vec![InputEvent::MouseMove(MouseMoveEvent {
            device: None,
            x: 100,
            y: 100,
            dx: 3,
            dy: 4,
        })]
    );
}

// ── Held input ────────────────────────────────────────────────────────────────

#[test]
fn test_release_all_releases_keys_and_buttons_held_through_hub() {
    // Arrange
    let provider = Provider::start();
    provider.key(0x11, 0x1D, 0);
    provider.mouse(MOUSE_RIGHT_DOWN, 0, 0, 0);
    provider.drain();

    // Act
    use chroma_input::application::dispatch_input::InputStateOwner;
    provider.held.release_all();

    // Assert
    let released = provider.drain();
    assert_eq!(released.len(), 2);
    assert!(released.contains(&InputEvent::Key(KeyEvent {
        device: Some(provider.keyboard.clone()),
        key: LogicalKey::LeftCtrl,
        is_down: false,
    })));
    assert!(released.contains(&InputEvent::MouseButton(MouseButtonEvent {
        device: None,
        button: MouseButton::Right,
        is_down: false,
    })));
}

#[test]
fn test_released_button_is_not_released_again() {
    use chroma_input::application::dispatch_input::InputStateOwner;

    let provider = Provider::start();
    provider.mouse(MOUSE_RIGHT_DOWN, 0, 0, 0);
    provider.mouse(MOUSE_RIGHT_UP, 0, 0, 0);
    provider.drain();

    provider.held.release_all();

    assert!(provider.drain().is_empty());
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[test]
fn test_records_after_dispose_are_ignored_and_hook_removed() {
    // Arrange
    let provider = Provider::start();

    // Act
    provider.hub.dispose().expect("dispose");
    let handled = provider.pump.deliver(RawInputRecord::Keyboard(RawKeyboardRecord {
        device: KEYBOARD,
        virtual_code: 0x41,
        scan_code: 0x1E,
        flags: 0,
    }));

    // Assert
    assert!(!handled);
    assert!(!provider.pump.is_installed());
    assert!(provider.drain().is_empty());
}

#[test]
fn test_hub_dispatch_after_dispose_is_ignored() {
    let provider = Provider::start();
    provider.hub.dispose().expect("dispose");

    provider.hub.dispatch(RawInputRecord::Mouse(RawMouseRecord {
        device: MOUSE,
        button_flags: MOUSE_WHEEL,
        button_data: 120,
        delta_x: 0,
        delta_y: 0,
    }));

    assert!(provider.drain().is_empty());
}
