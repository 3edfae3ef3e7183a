//! Binding table module
//!
//! Physical input identifiers, binding kinds, and the table relating
//! logical action names to the inputs that drive them.

mod input;
mod kind;
mod table;

pub use input::{
    AxisDirection, DeviceClass, GamepadAxis, GamepadButton, PhysicalInput, effective_mods,
};
pub use kind::BindingKind;
pub use table::{Binding, BindingTable, BoundInput, GroupMask};
