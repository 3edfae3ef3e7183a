//! Mapping snapshots and named profiles
//!
//! A snapshot is the whole current mapping as a plain serde value. The
//! library never touches the filesystem: the embedding application decides
//! where snapshots live (a RON file next to the save games, a settings
//! database, nowhere at all) and hands them back to be applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::binding::{BoundInput, GamepadAxis};
use crate::core::MapperError;

/// One action's bound inputs, as stored in a snapshot.
///
/// An empty input list records a deliberately unbound action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingRecord {
    /// The action name
    pub action: String,
    /// The inputs bound to it
    pub inputs: Vec<BoundInput>,
}

/// Tuning for one axis in use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisRecord {
    /// The axis
    pub axis: GamepadAxis,
    /// Its dead zone
    pub dead_zone: f32,
}

/// The full mapping, ready to serialize or apply.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MappingSnapshot {
    /// Every registered action with its current inputs
    pub bindings: Vec<BindingRecord>,
    /// Dead-zone tuning for axes in use
    pub axes: Vec<AxisRecord>,
}

/// An in-memory registry of named snapshots.
///
/// Applications fill this from wherever they persist profiles and offer the
/// names in a selection menu. A `BTreeMap` keeps the listing order stable.
#[derive(Debug, Clone, Default)]
pub struct ProfileSet {
    profiles: BTreeMap<String, MappingSnapshot>,
}

impl ProfileSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a named profile.
    pub fn insert(&mut self, name: &str, snapshot: MappingSnapshot) {
        self.profiles.insert(name.to_string(), snapshot);
    }

    /// Look up a profile by name.
    pub fn get(&self, name: &str) -> Option<&MappingSnapshot> {
        self.profiles.get(name)
    }

    /// Look up a profile by name, erroring on unknown names.
    pub fn lookup(&self, name: &str) -> Result<&MappingSnapshot, MapperError> {
        self.profiles
            .get(name)
            .ok_or_else(|| MapperError::UnknownProfile(name.to_string()))
    }

    /// Remove a profile, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<MappingSnapshot> {
        self.profiles.remove(name)
    }

    /// Profile names in stable (sorted) order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(|s| s.as_str())
    }

    /// Number of profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::PhysicalInput;
    use winit::keyboard::KeyCode;

    fn snapshot_with(action: &str, code: KeyCode) -> MappingSnapshot {
        MappingSnapshot {
            bindings: vec![BindingRecord {
                action: action.to_string(),
                inputs: vec![BoundInput::natural(PhysicalInput::key(code))],
            }],
            axes: Vec::new(),
        }
    }

    #[test]
    fn test_profile_set_lookup() {
        let mut profiles = ProfileSet::new();
        profiles.insert("lefty", snapshot_with("jump", KeyCode::Numpad0));

        assert!(profiles.get("lefty").is_some());
        assert_eq!(
            profiles.lookup("righty").unwrap_err(),
            MapperError::UnknownProfile("righty".into())
        );
    }

    #[test]
    fn test_names_are_sorted() {
        let mut profiles = ProfileSet::new();
        profiles.insert("zeta", MappingSnapshot::default());
        profiles.insert("alpha", MappingSnapshot::default());

        let names: Vec<&str> = profiles.names().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_snapshot_ron_round_trip() {
        let snapshot = snapshot_with("jump", KeyCode::Space);
        let text = ron::to_string(&snapshot).unwrap();
        let back: MappingSnapshot = ron::from_str(&text).unwrap();
        assert_eq!(back, snapshot);
    }
}
