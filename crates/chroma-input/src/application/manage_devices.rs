//! Device registry: the device lookup service behind the hub.
//!
//! The hub only knows stable [`DeviceIdentifier`]s.  The registry binds those
//! identifiers to [`Device`]s the rest of the application knows about (from
//! the `[[devices]]` section of the config file) and answers the hub's
//! lookups.
//!
//! # Unbound identifiers
//!
//! Every identifier the hub reports through `IdentifierReceived` that has no
//! binding is remembered, so the host can list "devices seen but not
//! configured" and offer to bind them:
//!
//! ```text
//! IdentifierReceived ──bound?──► yes: nothing to do
//!                             └► no:  added to unbound set (logged once)
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use chroma_input_core::{Device, DeviceIdentifier, InputDeviceType, InputEvent, ProviderId};
use tracing::{debug, info};

use super::dispatch_input::{DeviceLookup, InputSubscriber, LookupError};

type BindingKey = (InputDeviceType, DeviceIdentifier);

/// In-memory identifier → device map for one provider.
pub struct DeviceRegistry {
    provider: ProviderId,
    bindings: RwLock<HashMap<BindingKey, Device>>,
    unbound: Mutex<HashSet<BindingKey>>,
}

impl DeviceRegistry {
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            bindings: RwLock::new(HashMap::new()),
            unbound: Mutex::new(HashSet::new()),
        }
    }

    /// Creates a registry pre-populated with `bindings`.
    pub fn with_bindings<I>(provider: ProviderId, bindings: I) -> Self
    where
        I: IntoIterator<Item = (DeviceIdentifier, Device)>,
    {
        let registry = Self::new(provider);
        for (identifier, device) in bindings {
            registry.bind(identifier, device);
        }
        registry
    }

    /// Binds `identifier` to `device`, replacing any earlier binding.
    pub fn bind(&self, identifier: DeviceIdentifier, device: Device) {
        let key = (device.device_type, identifier);
        self.unbound
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&key);
        debug!("bound {} to device {}", key.1, device.name);
        self.bindings
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, device);
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Identifiers seen by the hub that have no device bound, sorted.
    pub fn unbound_identifiers(&self) -> Vec<(InputDeviceType, DeviceIdentifier)> {
        let mut unbound: Vec<_> = self
            .unbound
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect();
        unbound.sort_by(|a, b| a.1.cmp(&b.1));
        unbound
    }

    fn is_bound(&self, key: &BindingKey) -> bool {
        self.bindings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }
}

impl DeviceLookup for DeviceRegistry {
    fn device_by_identifier(
        &self,
        provider: ProviderId,
        identifier: &DeviceIdentifier,
        device_type: InputDeviceType,
    ) -> Result<Option<Device>, LookupError> {
        if provider != self.provider {
            return Err(LookupError::UnknownProvider(provider));
        }
        Ok(self
            .bindings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(device_type, identifier.clone()))
            .cloned())
    }
}

impl InputSubscriber for DeviceRegistry {
    fn on_input_event(&self, event: &InputEvent) {
        let InputEvent::IdentifierReceived {
            identifier,
            device_type,
        } = event
        else {
            return;
        };

        let key = (*device_type, identifier.clone());
        if self.is_bound(&key) {
            return;
        }
        let newly_seen = self
            .unbound
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key);
        if newly_seen {
            info!("unbound {device_type:?} device seen: {identifier}");
        }
    }
}
