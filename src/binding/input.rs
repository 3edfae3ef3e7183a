//! Physical input identifiers
//!
//! A [`PhysicalInput`] names the concrete thing a player touches: a keyboard
//! key (optionally with a modifier chord), a mouse button, a gamepad button,
//! or one direction of a gamepad axis. These are the values stored in the
//! binding table and produced by the interactive capture flow.

use serde::{Deserialize, Serialize};
use winit::event::MouseButton;
use winit::keyboard::{KeyCode, ModifiersState};

// ============================================================================
// Device Classes
// ============================================================================

/// The class of device a binding expects its input from.
///
/// Stored alongside each bound input, independent of the input value itself:
/// the same button identity can arrive from different device classes (a
/// flight stick and a gamepad both report a "south" button), and axis slots
/// use the class to pick which connected device drives them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DeviceClass {
    /// Keyboard keys
    Keyboard,
    /// Mouse buttons
    Mouse,
    /// Standard gamepad
    Gamepad,
    /// Flight stick / HOTAS
    FlightStick,
    /// Steering wheel
    SteeringWheel,
}

impl DeviceClass {
    /// Short lowercase label, used in binding displays and logs.
    pub fn label(&self) -> &'static str {
        match self {
            DeviceClass::Keyboard => "keyboard",
            DeviceClass::Mouse => "mouse",
            DeviceClass::Gamepad => "gamepad",
            DeviceClass::FlightStick => "flight_stick",
            DeviceClass::SteeringWheel => "steering_wheel",
        }
    }
}

// ============================================================================
// Gamepad Inputs
// ============================================================================

/// Buttons on a gamepad-class device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamepadButton {
    /// Bottom face button (A on Xbox-style pads)
    South,
    /// Right face button
    East,
    /// Left face button
    West,
    /// Top face button
    North,
    /// Left bumper
    LeftShoulder,
    /// Right bumper
    RightShoulder,
    /// Left trigger treated as a button
    LeftTrigger,
    /// Right trigger treated as a button
    RightTrigger,
    /// Left stick click
    LeftStick,
    /// Right stick click
    RightStick,
    /// D-pad up
    DPadUp,
    /// D-pad down
    DPadDown,
    /// D-pad left
    DPadLeft,
    /// D-pad right
    DPadRight,
    /// Start / menu button
    Start,
    /// Back / select button
    Back,
}

/// Analog axes on a gamepad-class device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamepadAxis {
    /// Left stick, horizontal
    LeftStickX,
    /// Left stick, vertical
    LeftStickY,
    /// Right stick, horizontal
    RightStickX,
    /// Right stick, vertical
    RightStickY,
    /// Left trigger as an analog axis
    LeftTrigger,
    /// Right trigger as an analog axis
    RightTrigger,
}

impl GamepadAxis {
    /// Short label for binding displays.
    pub fn label(&self) -> &'static str {
        match self {
            GamepadAxis::LeftStickX => "left stick X",
            GamepadAxis::LeftStickY => "left stick Y",
            GamepadAxis::RightStickX => "right stick X",
            GamepadAxis::RightStickY => "right stick Y",
            GamepadAxis::LeftTrigger => "left trigger",
            GamepadAxis::RightTrigger => "right trigger",
        }
    }
}

/// Which half of an axis a binding refers to.
///
/// An axis reports values in roughly `-1.0..=1.0`; each half can be bound to
/// a different action (steer left / steer right on one stick axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisDirection {
    /// Values below zero
    Negative,
    /// Values above zero
    Positive,
}

impl AxisDirection {
    /// The sign this direction contributes: `-1.0` or `1.0`.
    pub fn sign(&self) -> f32 {
        match self {
            AxisDirection::Negative => -1.0,
            AxisDirection::Positive => 1.0,
        }
    }

    /// Whether a raw axis value falls on this direction's half.
    pub fn matches(&self, value: f32) -> bool {
        match self {
            AxisDirection::Negative => value < 0.0,
            AxisDirection::Positive => value > 0.0,
        }
    }

    /// Direction for a raw sample, or `None` at exactly zero.
    pub fn of(value: f32) -> Option<AxisDirection> {
        if value > 0.0 {
            Some(AxisDirection::Positive)
        } else if value < 0.0 {
            Some(AxisDirection::Negative)
        } else {
            None
        }
    }

    /// Suffix used in binding displays: `" +"` or `" -"`.
    pub fn suffix(&self) -> &'static str {
        match self {
            AxisDirection::Negative => " -",
            AxisDirection::Positive => " +",
        }
    }
}

// ============================================================================
// Physical Input
// ============================================================================

/// A single physical input a logical action can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalInput {
    /// A keyboard key, with the modifier chord that must be held.
    ///
    /// The chord is always empty unless key combinations are enabled on the
    /// mapper; matching is exact either way.
    Key {
        /// Physical key code
        code: KeyCode,
        /// Modifiers held as part of the chord
        #[serde(default)]
        mods: ModifiersState,
    },
    /// A mouse button
    MouseButton(MouseButton),
    /// A gamepad button
    GamepadButton(GamepadButton),
    /// One direction of a gamepad axis
    Axis {
        /// The axis in question
        axis: GamepadAxis,
        /// Which half of the axis
        direction: AxisDirection,
    },
}

impl PhysicalInput {
    /// A bare key with no modifier chord.
    pub fn key(code: KeyCode) -> Self {
        PhysicalInput::Key {
            code,
            mods: ModifiersState::empty(),
        }
    }

    /// The device class this input naturally belongs to.
    ///
    /// Gamepad buttons and axes default to [`DeviceClass::Gamepad`]; a
    /// binding may still record a different class for them (flight sticks
    /// share the button/axis vocabulary).
    pub fn natural_class(&self) -> DeviceClass {
        match self {
            PhysicalInput::Key { .. } => DeviceClass::Keyboard,
            PhysicalInput::MouseButton(_) => DeviceClass::Mouse,
            PhysicalInput::GamepadButton(_) | PhysicalInput::Axis { .. } => DeviceClass::Gamepad,
        }
    }

    /// Whether this input is an axis direction.
    pub fn is_axis(&self) -> bool {
        matches!(self, PhysicalInput::Axis { .. })
    }

    /// The axis direction, if this input is one.
    pub fn axis_direction(&self) -> Option<AxisDirection> {
        match self {
            PhysicalInput::Axis { direction, .. } => Some(*direction),
            _ => None,
        }
    }

    /// Human-readable name for binding lists and rebind prompts.
    pub fn display_name(&self) -> String {
        match self {
            PhysicalInput::Key { code, mods } => {
                let mut name = String::new();
                if mods.control_key() {
                    name.push_str("Ctrl+");
                }
                if mods.alt_key() {
                    name.push_str("Alt+");
                }
                if mods.shift_key() {
                    name.push_str("Shift+");
                }
                if mods.super_key() {
                    name.push_str("Super+");
                }
                name.push_str(&key_name(*code));
                name
            }
            PhysicalInput::MouseButton(button) => match button {
                MouseButton::Left => String::from("Mouse Left"),
                MouseButton::Right => String::from("Mouse Right"),
                MouseButton::Middle => String::from("Mouse Middle"),
                MouseButton::Back => String::from("Mouse Back"),
                MouseButton::Forward => String::from("Mouse Forward"),
                MouseButton::Other(n) => format!("Mouse {}", n),
            },
            PhysicalInput::GamepadButton(button) => format!("{:?}", button),
            PhysicalInput::Axis { axis, direction } => {
                format!("{}{}", axis.label(), direction.suffix())
            }
        }
    }
}

/// Readable name for a key code.
///
/// Strips the `Key`/`Digit` prefixes from the code's debug form so bindings
/// read as "W" and "1" rather than "KeyW" and "Digit1".
fn key_name(code: KeyCode) -> String {
    let debug = format!("{:?}", code);
    if let Some(stripped) = debug.strip_prefix("Key")
        && stripped.len() == 1
    {
        return stripped.to_string();
    }
    if let Some(stripped) = debug.strip_prefix("Digit")
        && stripped.len() == 1
    {
        return stripped.to_string();
    }
    debug
}

/// The chord a key press participates in, with the key's own modifier bit
/// removed.
///
/// When the shift key itself goes down winit already reports SHIFT in the
/// modifier state; without this the bare shift key could never match a
/// binding.
pub fn effective_mods(code: KeyCode, mods: ModifiersState) -> ModifiersState {
    let own = match code {
        KeyCode::ShiftLeft | KeyCode::ShiftRight => ModifiersState::SHIFT,
        KeyCode::ControlLeft | KeyCode::ControlRight => ModifiersState::CONTROL,
        KeyCode::AltLeft | KeyCode::AltRight => ModifiersState::ALT,
        KeyCode::SuperLeft | KeyCode::SuperRight => ModifiersState::SUPER,
        _ => ModifiersState::empty(),
    };
    mods & !own
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_strips_prefixes() {
        assert_eq!(PhysicalInput::key(KeyCode::KeyW).display_name(), "W");
        assert_eq!(PhysicalInput::key(KeyCode::Digit3).display_name(), "3");
        assert_eq!(PhysicalInput::key(KeyCode::Space).display_name(), "Space");
        assert_eq!(PhysicalInput::key(KeyCode::Escape).display_name(), "Escape");
    }

    #[test]
    fn test_chord_display() {
        let input = PhysicalInput::Key {
            code: KeyCode::KeyQ,
            mods: ModifiersState::SHIFT | ModifiersState::CONTROL,
        };
        assert_eq!(input.display_name(), "Ctrl+Shift+Q");
    }

    #[test]
    fn test_axis_display_has_direction_suffix() {
        let input = PhysicalInput::Axis {
            axis: GamepadAxis::LeftStickX,
            direction: AxisDirection::Negative,
        };
        assert_eq!(input.display_name(), "left stick X -");
    }

    #[test]
    fn test_axis_direction_of() {
        assert_eq!(AxisDirection::of(0.7), Some(AxisDirection::Positive));
        assert_eq!(AxisDirection::of(-0.2), Some(AxisDirection::Negative));
        assert_eq!(AxisDirection::of(0.0), None);
    }

    #[test]
    fn test_effective_mods_removes_own_bit() {
        let mods = ModifiersState::SHIFT | ModifiersState::CONTROL;
        assert_eq!(
            effective_mods(KeyCode::ShiftLeft, mods),
            ModifiersState::CONTROL
        );
        assert_eq!(effective_mods(KeyCode::KeyA, mods), mods);
    }

    #[test]
    fn test_natural_class() {
        assert_eq!(
            PhysicalInput::key(KeyCode::KeyA).natural_class(),
            DeviceClass::Keyboard
        );
        assert_eq!(
            PhysicalInput::MouseButton(MouseButton::Left).natural_class(),
            DeviceClass::Mouse
        );
        assert_eq!(
            PhysicalInput::GamepadButton(GamepadButton::South).natural_class(),
            DeviceClass::Gamepad
        );
    }
}
