//! Axis binding tracking
//!
//! Each gamepad axis in use gets one entry with two action slots, one per
//! direction, plus a dead zone and the concrete device currently driving it.
//! The tracker also buffers the latest raw sample per `(device, axis)` pair
//! so the mapper's per-frame pass works from state, not from event timing.

use rustc_hash::FxHashMap;

use crate::binding::{AxisDirection, DeviceClass, GamepadAxis};
use crate::input::device::DeviceId;

/// Dead zone applied to a new axis entry unless the application changes it.
pub const DEFAULT_DEAD_ZONE: f32 = 0.3;

/// One direction slot of an axis entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSlot {
    /// Action bound to this direction
    pub action: String,
    /// Device class the binding expects
    pub class: DeviceClass,
    /// Concrete device currently driving the slot, if one is connected
    pub device: Option<DeviceId>,
}

/// An axis with its direction slots and dead zone.
#[derive(Debug, Clone)]
pub struct AxisBinding {
    axis: GamepadAxis,
    dead_zone: f32,
    positive: Option<AxisSlot>,
    negative: Option<AxisSlot>,
}

impl AxisBinding {
    fn new(axis: GamepadAxis, dead_zone: f32) -> Self {
        Self {
            axis,
            dead_zone,
            positive: None,
            negative: None,
        }
    }

    /// The axis this entry tracks.
    pub fn axis(&self) -> GamepadAxis {
        self.axis
    }

    /// The dead zone for this axis.
    pub fn dead_zone(&self) -> f32 {
        self.dead_zone
    }

    /// The slot for a direction, if an action is bound there.
    pub fn slot(&self, direction: AxisDirection) -> Option<&AxisSlot> {
        match direction {
            AxisDirection::Positive => self.positive.as_ref(),
            AxisDirection::Negative => self.negative.as_ref(),
        }
    }

    fn slot_mut(&mut self, direction: AxisDirection) -> &mut Option<AxisSlot> {
        match direction {
            AxisDirection::Positive => &mut self.positive,
            AxisDirection::Negative => &mut self.negative,
        }
    }

    fn is_empty(&self) -> bool {
        self.positive.is_none() && self.negative.is_none()
    }
}

/// A unit of work for the mapper's per-frame axis pass: one bound action and
/// the half-axis value currently applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSample {
    /// The bound action
    pub action: String,
    /// Raw value clamped to the slot's half of the axis
    pub value: f32,
    /// The axis's dead zone
    pub dead_zone: f32,
}

/// All axis entries in use, plus buffered raw samples.
#[derive(Debug, Default)]
pub struct AxisTracker {
    axes: Vec<AxisBinding>,
    values: FxHashMap<(DeviceId, GamepadAxis), f32>,
}

impl AxisTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer the latest raw sample for a device axis.
    pub fn record_sample(&mut self, device: DeviceId, axis: GamepadAxis, value: f32) {
        self.values.insert((device, axis), value);
    }

    /// The latest raw sample for a device axis (`0.0` if none seen).
    pub fn sample(&self, device: DeviceId, axis: GamepadAxis) -> f32 {
        self.values.get(&(device, axis)).copied().unwrap_or(0.0)
    }

    /// Snapshot of all buffered samples, used as rebind-capture baselines.
    pub fn samples(&self) -> impl Iterator<Item = ((DeviceId, GamepadAxis), f32)> + '_ {
        self.values.iter().map(|(&key, &value)| (key, value))
    }

    /// Bind an action to one direction of an axis.
    ///
    /// Creates the axis entry with `default_dead_zone` if this axis was not
    /// in use yet; an existing entry keeps its dead zone. Whatever action
    /// held the slot before is replaced.
    pub fn bind_direction(
        &mut self,
        axis: GamepadAxis,
        direction: AxisDirection,
        action: &str,
        class: DeviceClass,
        device: Option<DeviceId>,
        default_dead_zone: f32,
    ) {
        let index = match self.axes.iter().position(|a| a.axis == axis) {
            Some(index) => index,
            None => {
                self.axes.push(AxisBinding::new(axis, default_dead_zone));
                self.axes.len() - 1
            }
        };
        *self.axes[index].slot_mut(direction) = Some(AxisSlot {
            action: action.to_string(),
            class,
            device,
        });
    }

    /// Clear one direction slot, returning the action that held it.
    ///
    /// Axis entries with no remaining slots are dropped.
    pub fn clear_direction(
        &mut self,
        axis: GamepadAxis,
        direction: AxisDirection,
    ) -> Option<String> {
        let entry = self.axes.iter_mut().find(|a| a.axis == axis)?;
        let removed = entry.slot_mut(direction).take().map(|slot| slot.action);
        self.prune();
        removed
    }

    /// Remove an action from any slot that names it.
    pub fn remove_action(&mut self, action: &str) {
        for entry in &mut self.axes {
            if entry.positive.as_ref().is_some_and(|s| s.action == action) {
                entry.positive = None;
            }
            if entry.negative.as_ref().is_some_and(|s| s.action == action) {
                entry.negative = None;
            }
        }
        self.prune();
    }

    /// Drop all axis entries (buffered samples are kept).
    pub fn clear_bindings(&mut self) {
        self.axes.clear();
    }

    /// Set the dead zone for one axis. Returns whether the axis was in use.
    pub fn set_dead_zone(&mut self, axis: GamepadAxis, dead_zone: f32) -> bool {
        match self.axes.iter_mut().find(|a| a.axis == axis) {
            Some(entry) => {
                entry.dead_zone = dead_zone;
                true
            }
            None => false,
        }
    }

    /// Set the dead zone for every axis currently in use.
    pub fn set_dead_zone_all(&mut self, dead_zone: f32) {
        for entry in &mut self.axes {
            entry.dead_zone = dead_zone;
        }
    }

    /// Fill empty slots expecting this device's class.
    pub fn device_connected(&mut self, id: DeviceId, class: DeviceClass) {
        for entry in &mut self.axes {
            for slot in [&mut entry.positive, &mut entry.negative] {
                if let Some(slot) = slot.as_mut()
                    && slot.device.is_none()
                    && slot.class == class
                {
                    slot.device = Some(id);
                }
            }
        }
    }

    /// Detach a disconnected device from its slots and drop its samples.
    pub fn device_disconnected(&mut self, id: DeviceId) {
        for entry in &mut self.axes {
            for slot in [&mut entry.positive, &mut entry.negative] {
                if let Some(slot) = slot.as_mut()
                    && slot.device == Some(id)
                {
                    slot.device = None;
                }
            }
        }
        self.values.retain(|(device, _), _| *device != id);
    }

    /// The direction an action is bound on, if it is an axis binding.
    pub fn direction_of(&self, action: &str) -> Option<AxisDirection> {
        for entry in &self.axes {
            if entry.positive.as_ref().is_some_and(|s| s.action == action) {
                return Some(AxisDirection::Positive);
            }
            if entry.negative.as_ref().is_some_and(|s| s.action == action) {
                return Some(AxisDirection::Negative);
            }
        }
        None
    }

    /// Axis entries currently in use.
    pub fn bindings(&self) -> &[AxisBinding] {
        &self.axes
    }

    /// Collect the per-frame pass: each bound slot with its half-axis value.
    ///
    /// Positive slots see `max(0, sample)`, negative slots `min(0, sample)`,
    /// so a stick pushed left never drives the steer-right action.
    pub fn collect_pass(&self) -> Vec<AxisSample> {
        let mut out = Vec::new();
        for entry in &self.axes {
            for direction in [AxisDirection::Positive, AxisDirection::Negative] {
                let Some(slot) = entry.slot(direction) else {
                    continue;
                };
                let raw = slot
                    .device
                    .map(|id| self.sample(id, entry.axis))
                    .unwrap_or(0.0);
                let value = match direction {
                    AxisDirection::Positive => raw.max(0.0),
                    AxisDirection::Negative => raw.min(0.0),
                };
                out.push(AxisSample {
                    action: slot.action.clone(),
                    value,
                    dead_zone: entry.dead_zone,
                });
            }
        }
        out
    }

    fn prune(&mut self) {
        self.axes.retain(|entry| !entry.is_empty());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PAD: DeviceId = DeviceId(1);

    fn tracker_with_steering() -> AxisTracker {
        let mut tracker = AxisTracker::new();
        tracker.bind_direction(
            GamepadAxis::LeftStickX,
            AxisDirection::Positive,
            "steer_right",
            DeviceClass::Gamepad,
            Some(PAD),
            DEFAULT_DEAD_ZONE,
        );
        tracker.bind_direction(
            GamepadAxis::LeftStickX,
            AxisDirection::Negative,
            "steer_left",
            DeviceClass::Gamepad,
            Some(PAD),
            DEFAULT_DEAD_ZONE,
        );
        tracker
    }

    #[test]
    fn test_directions_share_one_entry() {
        let tracker = tracker_with_steering();
        assert_eq!(tracker.bindings().len(), 1);
        assert_eq!(
            tracker.direction_of("steer_right"),
            Some(AxisDirection::Positive)
        );
        assert_eq!(
            tracker.direction_of("steer_left"),
            Some(AxisDirection::Negative)
        );
    }

    #[test]
    fn test_pass_clamps_to_half_axis() {
        let mut tracker = tracker_with_steering();
        tracker.record_sample(PAD, GamepadAxis::LeftStickX, -0.8);

        let pass = tracker.collect_pass();
        let right = pass.iter().find(|s| s.action == "steer_right").unwrap();
        let left = pass.iter().find(|s| s.action == "steer_left").unwrap();

        assert_eq!(right.value, 0.0);
        assert_eq!(left.value, -0.8);
    }

    #[test]
    fn test_slot_without_device_reads_zero() {
        let mut tracker = AxisTracker::new();
        tracker.bind_direction(
            GamepadAxis::RightTrigger,
            AxisDirection::Positive,
            "accelerate",
            DeviceClass::Gamepad,
            None,
            DEFAULT_DEAD_ZONE,
        );
        tracker.record_sample(PAD, GamepadAxis::RightTrigger, 1.0);

        let pass = tracker.collect_pass();
        assert_eq!(pass[0].value, 0.0);
    }

    #[test]
    fn test_clear_direction_prunes_empty_entries() {
        let mut tracker = tracker_with_steering();

        assert_eq!(
            tracker.clear_direction(GamepadAxis::LeftStickX, AxisDirection::Positive),
            Some("steer_right".to_string())
        );
        assert_eq!(tracker.bindings().len(), 1);

        assert_eq!(
            tracker.clear_direction(GamepadAxis::LeftStickX, AxisDirection::Negative),
            Some("steer_left".to_string())
        );
        assert!(tracker.bindings().is_empty());
    }

    #[test]
    fn test_dead_zone_preserved_on_rebind() {
        let mut tracker = tracker_with_steering();
        tracker.set_dead_zone(GamepadAxis::LeftStickX, 0.5);

        // Rebinding a slot on an in-use axis keeps the tuned dead zone
        tracker.bind_direction(
            GamepadAxis::LeftStickX,
            AxisDirection::Positive,
            "lean_right",
            DeviceClass::Gamepad,
            Some(PAD),
            DEFAULT_DEAD_ZONE,
        );
        assert_eq!(tracker.bindings()[0].dead_zone(), 0.5);
    }

    #[test]
    fn test_device_lifecycle() {
        let mut tracker = AxisTracker::new();
        tracker.bind_direction(
            GamepadAxis::LeftStickX,
            AxisDirection::Positive,
            "steer_right",
            DeviceClass::Gamepad,
            None,
            DEFAULT_DEAD_ZONE,
        );

        tracker.device_connected(PAD, DeviceClass::Gamepad);
        assert_eq!(
            tracker.bindings()[0]
                .slot(AxisDirection::Positive)
                .unwrap()
                .device,
            Some(PAD)
        );

        tracker.record_sample(PAD, GamepadAxis::LeftStickX, 0.9);
        tracker.device_disconnected(PAD);

        assert_eq!(
            tracker.bindings()[0]
                .slot(AxisDirection::Positive)
                .unwrap()
                .device,
            None
        );
        assert_eq!(tracker.sample(PAD, GamepadAxis::LeftStickX), 0.0);
        assert_eq!(tracker.collect_pass()[0].value, 0.0);
    }

    #[test]
    fn test_wrong_class_device_not_adopted() {
        let mut tracker = AxisTracker::new();
        tracker.bind_direction(
            GamepadAxis::LeftStickX,
            AxisDirection::Positive,
            "roll",
            DeviceClass::FlightStick,
            None,
            DEFAULT_DEAD_ZONE,
        );

        tracker.device_connected(PAD, DeviceClass::Gamepad);
        assert_eq!(
            tracker.bindings()[0]
                .slot(AxisDirection::Positive)
                .unwrap()
                .device,
            None
        );
    }
}
