use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use gilrs::{Axis, Button, EventType, Gilrs};
use tracing::{debug, info, warn};

/// Stable identifier for one input device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub String);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// Raw button state as reported by the device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawButton {
    pub pressed: bool,
    pub value: f32,
}

// One device's raw state as pulled from the capability layer
#[derive(Debug, Clone, PartialEq)]
pub struct RawDeviceState {
    pub id: DeviceId,
    pub axes: Vec<f32>,
    pub buttons: Vec<RawButton>,
    /// Device-clock timestamp, non-decreasing per device. Unchanged between
    /// two polls means the snapshot is unchanged.
    pub timestamp: f64,
}

// Pushed device lifecycle notifications
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    Connected {
        id: DeviceId,
        state: RawDeviceState,
    },
    Disconnected {
        id: DeviceId,
    },
}

/// Access to the host's input-device capability.
///
/// The registry treats both sources as equally valid: pushed
/// connect/disconnect events and pull-based enumeration feed the same view.
/// Implementations never fail; an unsupported capability simply yields no
/// events and an empty enumeration.
pub trait DeviceProvider: Send {
    /// Drains pending connect/disconnect notifications.
    fn poll_events(&mut self) -> Vec<DeviceEvent>;

    /// Pulls the raw state of every currently connected device.
    fn enumerate(&mut self) -> Vec<RawDeviceState>;
}

/// Fixed 6-slot axis order: pan x/y/z then roll x/y/z.
const AXIS_ORDER: [Axis; 6] = [
    Axis::LeftStickX,  // Pan  X
    Axis::LeftStickY,  // Pan  Y
    Axis::RightStickX, // Pan  Z
    Axis::RightStickY, // Roll X
    Axis::LeftZ,       // Roll Y
    Axis::RightZ,      // Roll Z
];

// Stable button order so sample indices are deterministic per device
const BUTTON_ORDER: [Button; 17] = [
    Button::South,
    Button::East,
    Button::North,
    Button::West,
    Button::LeftTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::Mode,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
];

/// Production provider over the gilrs gamepad stack.
///
/// Capability absence is not an error: if gilrs fails to initialize the
/// provider logs one warning and behaves as if no devices exist.
pub struct GilrsProvider {
    inner: Option<Gilrs>,
    // Last event time per device, device-clock seconds. Drives the
    // unchanged-snapshot detection in the registry.
    last_event: HashMap<gilrs::GamepadId, f64>,
}

impl GilrsProvider {
    pub fn new() -> Self {
        let inner = match Gilrs::new() {
            Ok(g) => {
                info!("Initialized gilrs device capability");
                Some(g)
            }
            Err(e) => {
                warn!("Device capability unavailable, running without input devices: {}", e);
                None
            }
        };

        Self {
            inner,
            last_event: HashMap::new(),
        }
    }
}

impl Default for GilrsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceProvider for GilrsProvider {
    fn poll_events(&mut self) -> Vec<DeviceEvent> {
        let Some(gilrs) = self.inner.as_mut() else {
            return Vec::new();
        };

        // Drain first; connect snapshots need the context immutably afterwards.
        // Relative order of lifecycle events is preserved.
        let mut pending: Vec<(gilrs::GamepadId, bool)> = Vec::new();
        while let Some(event) = gilrs.next_event() {
            let stamp = epoch_seconds(event.time);
            self.last_event.insert(event.id, stamp);
            match event.event {
                EventType::Connected => pending.push((event.id, true)),
                EventType::Disconnected => pending.push((event.id, false)),
                other => {
                    debug!("State event from {:?}: {:?}", event.id, other);
                }
            }
        }

        let Some(gilrs) = self.inner.as_ref() else {
            return Vec::new();
        };
        let mut events = Vec::with_capacity(pending.len());
        for (id, is_connect) in pending {
            if is_connect {
                let gamepad = gilrs.gamepad(id);
                info!("Device connected: {} ({})", gamepad.name(), id);
                let stamp = self.last_event.get(&id).copied().unwrap_or(0.0);
                events.push(DeviceEvent::Connected {
                    id: DeviceId(id.to_string()),
                    state: read_raw_state(id, &gamepad, stamp),
                });
            } else {
                info!("Device disconnected: {}", id);
                events.push(DeviceEvent::Disconnected {
                    id: DeviceId(id.to_string()),
                });
            }
        }
        events
    }

    fn enumerate(&mut self) -> Vec<RawDeviceState> {
        let Some(gilrs) = self.inner.as_ref() else {
            return Vec::new();
        };

        gilrs
            .gamepads()
            .filter(|(_, gamepad)| gamepad.is_connected())
            .map(|(id, gamepad)| {
                let stamp = self.last_event.get(&id).copied().unwrap_or(0.0);
                read_raw_state(id, &gamepad, stamp)
            })
            .collect()
    }
}

fn read_raw_state(id: gilrs::GamepadId, gamepad: &gilrs::Gamepad<'_>, timestamp: f64) -> RawDeviceState {
    let axes = AXIS_ORDER
        .iter()
        .map(|&axis| gamepad.axis_data(axis).map(|d| d.value()).unwrap_or(0.0))
        .collect();

    let buttons = fixed_buttons(|button| {
        gamepad.button_data(button).map(|data| RawButton {
            pressed: data.is_pressed(),
            value: data.value(),
        })
    });

    RawDeviceState {
        id: DeviceId(id.to_string()),
        axes,
        buttons,
        timestamp,
    }
}

// Always one entry per BUTTON_ORDER slot. gilrs caches button data lazily,
// so an untouched button reads as released rather than shifting the
// indices of every button behind it.
fn fixed_buttons(lookup: impl Fn(Button) -> Option<RawButton>) -> Vec<RawButton> {
    BUTTON_ORDER
        .iter()
        .map(|&button| {
            lookup(button).unwrap_or(RawButton {
                pressed: false,
                value: 0.0,
            })
        })
        .collect()
}

fn epoch_seconds(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
