//! A control-binding helper for winit-based game engines
//!
//! This crate provides:
//! - A binding table mapping logical action names to physical inputs
//! - Four binding kinds: press events, release events, both edges, or a
//!   pollable held value
//! - An interactive "press a key to bind" capture flow with conflict
//!   detection
//! - Gamepad axis bindings with per-axis dead zones
//! - Serializable mapping snapshots (persistence stays with the application)

pub mod binding;
pub mod core;
pub mod input;
pub mod profile;

// Re-exports for convenience
pub use winit;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::binding::{
        AxisDirection, Binding, BindingKind, BoundInput, DeviceClass, GamepadAxis, GamepadButton,
        GroupMask, PhysicalInput,
    };
    pub use crate::core::{ActionEvent, KeyMapper, MapperError, MapperOptions};
    pub use crate::input::{DeviceId, DeviceInfo, RebindState};
    pub use crate::profile::{MappingSnapshot, ProfileSet};
    pub use winit::event::MouseButton;
    pub use winit::keyboard::{KeyCode, ModifiersState};
}
