//! Input subsystem for 6-axis motion device handling
//!
//! Implements the device-side half of the recorder:
//!
//! 1. [`provider`] - Device capability access (enumeration + connect/disconnect events)
//! 2. [`registry`] - Authoritative view of connected devices and their raw state
//! 3. [`normalizer`] - Deadzone filtering into timestamped motion samples
//!
//! # Architecture
//!
//! ```text
//! Hardware ──► DeviceProvider ──► DeviceRegistry ──► normalize() ──► MotionSample
//!              (raw snapshots)    (latest state)     (deadzone)
//! ```
//!
//! Everything here is synchronous and non-blocking; the session layer drives
//! one poll+normalize cycle per timer tick.

pub mod normalizer;
pub mod provider;
pub mod registry;

pub use normalizer::{normalize, AxisThresholds, ButtonSample, MotionSample, ThresholdError, Vec3};
pub use provider::{DeviceEvent, DeviceId, DeviceProvider, GilrsProvider, RawButton, RawDeviceState};
pub use registry::{Connection, Device, DeviceRegistry};
