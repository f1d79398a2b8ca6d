//! Chroma Input provider entry point.
//!
//! Wires the platform adapters into the Input Event Hub, logs the normalized
//! event stream, and runs until Ctrl-C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load config               -- TOML, defaults on first run
//!  └─ DeviceRegistry            -- [[devices]] bindings
//!  └─ HeldInputTracker          -- release-all on focus loss
//!  └─ InputHub::start()
//!       ├─ raw input pump       (Windows message thread)
//!       ├─ focus monitor        (poll thread + release relay)
//!       └─ subscribers: held-input tracker → event log, device registry
//! ```

use std::sync::Arc;

use chroma_input_core::{InputEvent, RAW_INPUT_PROVIDER_ID};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use chroma_input::application::dispatch_input::{HubServices, InputHub, InputSubscriber};
use chroma_input::application::held_input::HeldInputTracker;
use chroma_input::application::manage_devices::DeviceRegistry;
use chroma_input::infrastructure::storage::config::{self, AppConfig};

/// Downstream consumer that writes every event to the log.
struct EventLog;

impl InputSubscriber for EventLog {
    fn on_input_event(&self, event: &InputEvent) {
        match event {
            InputEvent::MouseMove(_) => debug!("{event:?}"),
            _ => info!("{event:?}"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config first so its log level can seed the filter.
    let (config, config_error) = match config::load_config() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.provider.log_level)),
        )
        .init();

    info!("Chroma Input starting");
    if let Some(e) = config_error {
        warn!("using default config: {e}");
    }

    let registry = Arc::new(DeviceRegistry::with_bindings(
        RAW_INPUT_PROVIDER_ID,
        config.device_bindings(),
    ));
    info!("{} device identifier(s) bound", registry.binding_count());

    let held = Arc::new(HeldInputTracker::new(Arc::new(EventLog)));

    let hub = InputHub::new(
        platform_services(Arc::clone(&registry), Arc::clone(&held))?,
        config.hub_settings(),
    );
    hub.subscribe(held);
    hub.subscribe(registry.clone());
    hub.start()?;

    info!("Chroma Input ready.  Press Ctrl-C to exit.");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    hub.dispose()?;

    for (device_type, identifier) in registry.unbound_identifiers() {
        info!("unbound {device_type:?} seen this session: {identifier}");
    }
    info!("Chroma Input stopped");
    Ok(())
}

#[cfg(target_os = "windows")]
fn platform_services(
    registry: Arc<DeviceRegistry>,
    held: Arc<HeldInputTracker>,
) -> anyhow::Result<HubServices> {
    use chroma_input::infrastructure::native_pump::windows::RawInputWindowPump;
    use chroma_input::infrastructure::platform::windows::WindowsPlatform;

    let platform = Arc::new(WindowsPlatform::new());
    Ok(HubServices {
        pump: Arc::new(RawInputWindowPump::new()),
        device_paths: platform.clone(),
        lock_keys: platform.clone(),
        cursor: platform.clone(),
        foreground: platform,
        devices: registry,
        input_state: held,
    })
}

#[cfg(not(target_os = "windows"))]
fn platform_services(
    _registry: Arc<DeviceRegistry>,
    _held: Arc<HeldInputTracker>,
) -> anyhow::Result<HubServices> {
    use chroma_input::infrastructure::native_pump::NativeHookError;

    Err(NativeHookError::UnsupportedPlatform(std::env::consts::OS.to_string()).into())
}
