//! Deadzone filtering of raw device state into motion samples.
//!
//! The six raw axes map onto two logical 3-axis groups, pan (translation)
//! and roll (rotation). Each channel is clamped to exactly zero inside its
//! group's deadzone band and passed through unchanged outside it; there is
//! no rescaling. Buttons pass through verbatim.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::input::registry::Device;

/// Deadzone magnitude per channel group, on the same normalized [-1, 1]
/// scale as the axis values. Immutable for the process lifetime.
///
/// The default applies one shared magnitude to both groups, matching the
/// original tuning; the two fields exist so pan and roll can be tuned
/// independently without a contract change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisThresholds {
    pub pan: f32,
    pub roll: f32,
}

impl Default for AxisThresholds {
    fn default() -> Self {
        // 5 / 32767, the SpaceMouse deadzone inherited from the original
        Self {
            pan: 5.0 / 32767.0,
            roll: 5.0 / 32767.0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ThresholdError {
    #[error("{group} threshold {value} is out of range, must be finite and in [0, 1)")]
    OutOfRange { group: &'static str, value: f32 },
}

impl AxisThresholds {
    /// Fails fast on malformed configuration; called once at startup,
    /// never per tick.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        for (group, value) in [("pan", self.pan), ("roll", self.roll)] {
            if !value.is_finite() || !(0.0..1.0).contains(&value) {
                return Err(ThresholdError::OutOfRange { group, value });
            }
        }
        Ok(())
    }
}

/// One 3-axis channel group of a motion sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Discrete button state, index = position in the device's button order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSample {
    pub index: usize,
    pub pressed: bool,
}

/// One normalized, timestamped snapshot of pan, roll and button state.
///
/// Field order is the wire contract: `timestamp`, `pan`, `roll`, `buttons`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// ISO-8601 wall-clock capture time, not the device clock.
    pub timestamp: String,
    pub pan: Vec3,
    pub roll: Vec3,
    pub buttons: Vec<ButtonSample>,
}

/// Converts one device's raw snapshot into a motion sample.
///
/// Axis slots 0..2 feed pan x/y/z, slots 3..5 feed roll x/y/z; missing
/// slots read as 0. The caller guarantees a connected device; absence is
/// handled by not calling this at all.
pub fn normalize(device: &Device, thresholds: &AxisThresholds) -> MotionSample {
    let pan = Vec3 {
        x: channel(&device.axes, 0, thresholds.pan),
        y: channel(&device.axes, 1, thresholds.pan),
        z: channel(&device.axes, 2, thresholds.pan),
    };
    let roll = Vec3 {
        x: channel(&device.axes, 3, thresholds.roll),
        y: channel(&device.axes, 4, thresholds.roll),
        z: channel(&device.axes, 5, thresholds.roll),
    };

    let buttons = device
        .buttons
        .iter()
        .enumerate()
        .map(|(index, button)| ButtonSample {
            index,
            pressed: button.pressed,
        })
        .collect();

    MotionSample {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        pan,
        roll,
        buttons,
    }
}

// Hard zero inside the band, identity outside. No rescale.
fn channel(axes: &[f32], slot: usize, threshold: f32) -> f32 {
    let v = axes.get(slot).copied().unwrap_or(0.0);
    if (-threshold..=threshold).contains(&v) {
        0.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::provider::{DeviceId, RawButton};
    use crate::input::registry::Connection;

    fn device(axes: Vec<f32>, buttons: Vec<RawButton>) -> Device {
        Device {
            id: DeviceId("0".into()),
            axes,
            buttons,
            last_seen: 1.0,
            connection: Connection::Connected,
        }
    }

    fn thresholds(t: f32) -> AxisThresholds {
        AxisThresholds { pan: t, roll: t }
    }

    #[test]
    fn test_values_inside_deadzone_clamp_to_zero() {
        let dev = device(vec![0.05, -0.05, 0.1, -0.1, 0.0, 0.09], Vec::new());
        let sample = normalize(&dev, &thresholds(0.1));

        assert_eq!(sample.pan, Vec3 { x: 0.0, y: 0.0, z: 0.0 });
        assert_eq!(sample.roll, Vec3 { x: 0.0, y: 0.0, z: 0.0 });
    }

    #[test]
    fn test_values_outside_deadzone_pass_through_unscaled() {
        let dev = device(vec![0.5, -0.8, 0.11, -0.11, 1.0, -1.0], Vec::new());
        let sample = normalize(&dev, &thresholds(0.1));

        assert_eq!(sample.pan, Vec3 { x: 0.5, y: -0.8, z: 0.11 });
        assert_eq!(sample.roll, Vec3 { x: -0.11, y: 1.0, z: -1.0 });
    }

    #[test]
    fn test_reference_scenario() {
        // threshold 0.1, axes [0.05, -0.15, 0.0, 0.2, -0.05, 0.3]
        let dev = device(
            vec![0.05, -0.15, 0.0, 0.2, -0.05, 0.3],
            vec![RawButton { pressed: true, value: 1.0 }],
        );
        let sample = normalize(&dev, &thresholds(0.1));

        assert_eq!(sample.pan, Vec3 { x: 0.0, y: -0.15, z: 0.0 });
        assert_eq!(sample.roll, Vec3 { x: 0.2, y: 0.0, z: 0.3 });
        assert_eq!(sample.buttons, vec![ButtonSample { index: 0, pressed: true }]);
    }

    #[test]
    fn test_fewer_than_six_axes_reads_as_zero() {
        let dev = device(vec![0.4, -0.4], Vec::new());
        let sample = normalize(&dev, &thresholds(0.1));

        assert_eq!(sample.pan, Vec3 { x: 0.4, y: -0.4, z: 0.0 });
        assert_eq!(sample.roll, Vec3 { x: 0.0, y: 0.0, z: 0.0 });
    }

    #[test]
    fn test_per_group_thresholds() {
        let dev = device(vec![0.2, 0.2, 0.2, 0.2, 0.2, 0.2], Vec::new());
        let sample = normalize(
            &dev,
            &AxisThresholds { pan: 0.3, roll: 0.1 },
        );

        assert_eq!(sample.pan, Vec3 { x: 0.0, y: 0.0, z: 0.0 });
        assert_eq!(sample.roll, Vec3 { x: 0.2, y: 0.2, z: 0.2 });
    }

    #[test]
    fn test_buttons_pass_through_in_order() {
        let dev = device(
            Vec::new(),
            vec![
                RawButton { pressed: true, value: 1.0 },
                RawButton { pressed: false, value: 0.0 },
                RawButton { pressed: true, value: 0.7 },
            ],
        );
        let sample = normalize(&dev, &thresholds(0.1));

        assert_eq!(
            sample.buttons,
            vec![
                ButtonSample { index: 0, pressed: true },
                ButtonSample { index: 1, pressed: false },
                ButtonSample { index: 2, pressed: true },
            ]
        );
    }

    #[test]
    fn test_normalize_is_idempotent_for_unchanged_snapshot() {
        let dev = device(vec![0.3, 0.0, -0.5, 0.2, 0.01, 0.0], Vec::new());
        let t = thresholds(0.1);
        let a = normalize(&dev, &t);
        let b = normalize(&dev, &t);

        assert_eq!(a.pan, b.pan);
        assert_eq!(a.roll, b.roll);
        assert_eq!(a.buttons, b.buttons);
    }

    #[test]
    fn test_threshold_validation_rejects_malformed_config() {
        assert!(thresholds(0.0).validate().is_ok());
        assert!(thresholds(0.99).validate().is_ok());
        assert!(thresholds(-0.1).validate().is_err());
        assert!(thresholds(1.0).validate().is_err());
        assert!(thresholds(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_sample_serializes_with_contract_keys() {
        let dev = device(
            vec![0.5; 6],
            vec![RawButton { pressed: true, value: 1.0 }],
        );
        let json = serde_json::to_value(normalize(&dev, &thresholds(0.1))).unwrap();

        assert!(json["timestamp"].is_string());
        assert_eq!(json["pan"]["x"], 0.5);
        assert_eq!(json["roll"]["z"], 0.5);
        assert_eq!(json["buttons"][0]["index"], 0);
        assert_eq!(json["buttons"][0]["pressed"], true);
    }
}
