use std::collections::HashMap;

use tracing::{debug, info};

use crate::input::provider::{DeviceEvent, DeviceId, DeviceProvider, RawButton, RawDeviceState};

// Per-device lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Connected,
    Disconnected,
}

/// Latest known raw state of one input device.
#[derive(Debug, Clone)]
pub struct Device {
    pub id: DeviceId,
    pub axes: Vec<f32>,
    pub buttons: Vec<RawButton>,
    /// Device-clock timestamp of the state, non-decreasing.
    pub last_seen: f64,
    pub connection: Connection,
}

impl Device {
    fn from_raw(state: RawDeviceState) -> Self {
        Self {
            id: state.id,
            axes: state.axes,
            buttons: state.buttons,
            last_seen: state.timestamp,
            connection: Connection::Connected,
        }
    }
}

/// Authoritative view of connected input devices.
///
/// Reconciles the provider's two discovery mechanisms (pushed
/// connect/disconnect events and pull-based enumeration) into one mapping
/// from device identifier to latest raw state. Owns its provider and all
/// `Device` records; reads never fail, absence is `None`.
pub struct DeviceRegistry {
    provider: Box<dyn DeviceProvider>,
    devices: HashMap<DeviceId, Device>,
    // Registration order; the first still-connected entry is the primary slot
    order: Vec<DeviceId>,
}

impl DeviceRegistry {
    pub fn new(provider: Box<dyn DeviceProvider>) -> Self {
        Self {
            provider,
            devices: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Runs one full reconciliation cycle: drains pushed lifecycle events,
    /// then refreshes state from enumeration.
    pub fn poll(&mut self) {
        for event in self.provider.poll_events() {
            match event {
                DeviceEvent::Connected { id, state } => self.on_connect(id, state),
                DeviceEvent::Disconnected { id } => self.on_disconnect(&id),
            }
        }
        self.discover();
    }

    /// Pulls all currently known devices from the capability layer and
    /// refreshes the mapping. Devices whose timestamp has not moved since
    /// the previous poll are left untouched. Never fails; an unsupported
    /// capability yields an empty enumeration.
    pub fn discover(&mut self) {
        for state in self.provider.enumerate() {
            match self.devices.get(&state.id) {
                Some(existing)
                    if existing.connection == Connection::Connected
                        && existing.last_seen == state.timestamp =>
                {
                    // Unchanged snapshot
                    continue;
                }
                _ => {}
            }
            self.on_connect(state.id.clone(), state);
        }
    }

    /// Registers a new device or refreshes an existing one. A reconnect
    /// after a disconnect installs a completely fresh record; no prior
    /// axis or button values survive.
    pub fn on_connect(&mut self, id: DeviceId, initial: RawDeviceState) {
        let was_idle = !self.is_active();
        let fresh = Device::from_raw(initial);
        if self.devices.insert(id.clone(), fresh).is_none() {
            info!("Registered device {}", id);
        } else {
            debug!("Refreshed device {}", id);
        }
        if !self.order.contains(&id) {
            self.order.push(id);
        }
        if was_idle {
            info!("Input active: at least one device connected");
        }
    }

    /// Marks a device absent. Unknown ids are ignored.
    pub fn on_disconnect(&mut self, id: &DeviceId) {
        if let Some(device) = self.devices.get_mut(id) {
            device.connection = Connection::Disconnected;
            info!("Device {} marked disconnected", id);
            if !self.is_active() {
                info!("Input idle: no devices connected");
            }
        } else {
            debug!("Disconnect for unknown device {} ignored", id);
        }
    }

    /// Current state of one device. `None` for unknown or disconnected ids.
    pub fn snapshot(&self, id: &DeviceId) -> Option<&Device> {
        self.devices
            .get(id)
            .filter(|d| d.connection == Connection::Connected)
    }

    /// The primary device: first still-connected device in registration
    /// order. This is the slot the sampler reads each tick.
    pub fn primary(&self) -> Option<&Device> {
        self.order.iter().find_map(|id| self.snapshot(id))
    }

    /// True while at least one device is connected.
    pub fn is_active(&self) -> bool {
        self.devices
            .values()
            .any(|d| d.connection == Connection::Connected)
    }

    pub fn connected_count(&self) -> usize {
        self.devices
            .values()
            .filter(|d| d.connection == Connection::Connected)
            .count()
    }
}
