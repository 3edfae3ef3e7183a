//! Connected device bookkeeping
//!
//! The host engine tells the mapper when controllers arrive and leave; axis
//! bindings use this registry to resolve a device class ("gamepad") to the
//! concrete device currently driving each axis slot.

use crate::binding::DeviceClass;

/// Identifier for a connected input device, assigned by the host engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

/// A connected device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Host-assigned identifier
    pub id: DeviceId,
    /// The device's class
    pub class: DeviceClass,
}

/// Registry of currently connected devices, in connection order.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    connected: Vec<DeviceInfo>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a device connection. Reconnecting a known id is a no-op.
    pub fn connect(&mut self, info: DeviceInfo) {
        if !self.connected.iter().any(|d| d.id == info.id) {
            self.connected.push(info);
        }
    }

    /// Record a device disconnection, returning its info if it was known.
    pub fn disconnect(&mut self, id: DeviceId) -> Option<DeviceInfo> {
        let index = self.connected.iter().position(|d| d.id == id)?;
        Some(self.connected.remove(index))
    }

    /// The earliest-connected device of a class, if any.
    pub fn first_of_class(&self, class: DeviceClass) -> Option<DeviceId> {
        self.connected
            .iter()
            .find(|d| d.class == class)
            .map(|d| d.id)
    }

    /// The class of a connected device.
    pub fn class_of(&self, id: DeviceId) -> Option<DeviceClass> {
        self.connected.iter().find(|d| d.id == id).map(|d| d.class)
    }

    /// Whether a device is currently connected.
    pub fn is_connected(&self, id: DeviceId) -> bool {
        self.connected.iter().any(|d| d.id == id)
    }

    /// Iterate over connected devices in connection order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceInfo> {
        self.connected.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_disconnect() {
        let mut devices = DeviceRegistry::new();
        devices.connect(DeviceInfo {
            id: DeviceId(7),
            class: DeviceClass::Gamepad,
        });

        assert!(devices.is_connected(DeviceId(7)));
        assert_eq!(devices.class_of(DeviceId(7)), Some(DeviceClass::Gamepad));

        let info = devices.disconnect(DeviceId(7)).unwrap();
        assert_eq!(info.class, DeviceClass::Gamepad);
        assert!(!devices.is_connected(DeviceId(7)));
        assert!(devices.disconnect(DeviceId(7)).is_none());
    }

    #[test]
    fn test_first_of_class_prefers_earliest() {
        let mut devices = DeviceRegistry::new();
        devices.connect(DeviceInfo {
            id: DeviceId(1),
            class: DeviceClass::Gamepad,
        });
        devices.connect(DeviceInfo {
            id: DeviceId(2),
            class: DeviceClass::Gamepad,
        });
        devices.connect(DeviceInfo {
            id: DeviceId(3),
            class: DeviceClass::FlightStick,
        });

        assert_eq!(devices.first_of_class(DeviceClass::Gamepad), Some(DeviceId(1)));
        assert_eq!(
            devices.first_of_class(DeviceClass::FlightStick),
            Some(DeviceId(3))
        );
        assert_eq!(devices.first_of_class(DeviceClass::SteeringWheel), None);
    }

    #[test]
    fn test_duplicate_connect_ignored() {
        let mut devices = DeviceRegistry::new();
        let info = DeviceInfo {
            id: DeviceId(1),
            class: DeviceClass::Gamepad,
        };
        devices.connect(info);
        devices.connect(info);
        assert_eq!(devices.iter().count(), 1);
    }
}
