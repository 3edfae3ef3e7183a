//! Binding table
//!
//! The table relates logical action names to the physical inputs that drive
//! them. Each action carries a binding kind, a default input, a conflict
//! group, and the set of inputs currently bound to it. A forward index from
//! input to action names keeps dispatch lookups O(1).
//!
//! # Conflict groups
//!
//! Two actions conflict over an input only if their group masks intersect.
//! Disjoint groups let an application intentionally share a button between,
//! say, on-foot and in-vehicle controls that are never active together.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::binding::input::{DeviceClass, PhysicalInput};
use crate::binding::kind::BindingKind;
use crate::core::MapperError;

// ============================================================================
// Group Masks
// ============================================================================

/// Conflict group for an action, as a 32-bit mask.
///
/// Masks are compared with a bitwise intersection test; an action may belong
/// to several groups at once by setting several bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupMask(pub u32);

impl GroupMask {
    /// The group actions belong to unless told otherwise.
    pub const DEFAULT: GroupMask = GroupMask(1);

    /// A mask intersecting every non-empty group.
    pub const ALL: GroupMask = GroupMask(u32::MAX);

    /// Whether two masks share any bit.
    pub fn intersects(&self, other: GroupMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for GroupMask {
    fn default() -> Self {
        GroupMask::DEFAULT
    }
}

impl std::ops::BitOr for GroupMask {
    type Output = GroupMask;

    fn bitor(self, rhs: GroupMask) -> GroupMask {
        GroupMask(self.0 | rhs.0)
    }
}

// ============================================================================
// Bindings
// ============================================================================

/// A physical input together with the device class it is expected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundInput {
    /// The physical input
    pub input: PhysicalInput,
    /// The class of device the input should come from
    pub device: DeviceClass,
}

impl BoundInput {
    /// Pair an input with its natural device class.
    pub fn natural(input: PhysicalInput) -> Self {
        BoundInput {
            device: input.natural_class(),
            input,
        }
    }
}

/// One action's entry in the binding table.
#[derive(Debug, Clone)]
pub struct Binding {
    action: String,
    kind: BindingKind,
    group: GroupMask,
    inputs: SmallVec<[BoundInput; 2]>,
    default_input: BoundInput,
}

impl Binding {
    /// The action name.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The binding kind.
    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    /// The conflict group.
    pub fn group(&self) -> GroupMask {
        self.group
    }

    /// The inputs currently bound to this action.
    pub fn inputs(&self) -> &[BoundInput] {
        &self.inputs
    }

    /// The input this action falls back to on a defaults reset.
    pub fn default_input(&self) -> BoundInput {
        self.default_input
    }

    /// Whether any input is currently bound.
    pub fn is_bound(&self) -> bool {
        !self.inputs.is_empty()
    }

    /// Display text for the current binding, e.g. for a controls menu.
    ///
    /// Unbound actions render as `<none set>`.
    pub fn display_label(&self) -> String {
        if self.inputs.is_empty() {
            return String::from("<none set>");
        }
        let names: Vec<String> = self
            .inputs
            .iter()
            .map(|bound| bound.input.display_name())
            .collect();
        names.join(", ")
    }
}

// ============================================================================
// Table
// ============================================================================

/// The action-to-input binding table.
#[derive(Debug, Default, Clone)]
pub struct BindingTable {
    /// Action name to binding entry
    entries: FxHashMap<String, Binding>,
    /// Input to the action names it currently drives
    by_input: FxHashMap<PhysicalInput, SmallVec<[String; 1]>>,
    /// Registration order, for stable listing in UIs
    order: Vec<String>,
}

impl BindingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action with its default input.
    ///
    /// The default becomes the initial current binding. Action names must be
    /// unique.
    pub fn register(
        &mut self,
        action: &str,
        kind: BindingKind,
        default_input: BoundInput,
        group: GroupMask,
    ) -> Result<(), MapperError> {
        if self.entries.contains_key(action) {
            return Err(MapperError::DuplicateAction(action.to_string()));
        }

        self.entries.insert(
            action.to_string(),
            Binding {
                action: action.to_string(),
                kind,
                group,
                inputs: smallvec![default_input],
                default_input,
            },
        );
        self.index_add(default_input.input, action);
        self.order.push(action.to_string());
        Ok(())
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an action's entry.
    pub fn get(&self, action: &str) -> Option<&Binding> {
        self.entries.get(action)
    }

    /// Look up an action's entry, erroring on unknown names.
    pub fn lookup(&self, action: &str) -> Result<&Binding, MapperError> {
        self.entries
            .get(action)
            .ok_or_else(|| MapperError::UnknownAction(action.to_string()))
    }

    /// The action names a physical input currently drives.
    ///
    /// More than one name appears only when actions in disjoint groups share
    /// the input.
    pub fn actions_for(&self, input: &PhysicalInput) -> &[String] {
        self.by_input.get(input).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Find the action that would conflict with binding `input` to `action`.
    ///
    /// Returns another action that currently holds the input and whose group
    /// intersects `action`'s, if any.
    pub fn conflict_for(&self, input: &PhysicalInput, action: &str) -> Option<&str> {
        let group = self.entries.get(action)?.group;
        self.by_input
            .get(input)?
            .iter()
            .find(|other| {
                other.as_str() != action
                    && self
                        .entries
                        .get(other.as_str())
                        .is_some_and(|b| b.group.intersects(group))
            })
            .map(|s| s.as_str())
    }

    /// Remove `input` from every action whose group intersects `group`.
    ///
    /// Returns the names of the actions that lost the input. Actions in
    /// disjoint groups keep it.
    pub fn unbind_physical(&mut self, input: &PhysicalInput, group: GroupMask) -> Vec<String> {
        let holders: Vec<String> = self
            .by_input
            .get(input)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default();

        let mut displaced = Vec::new();
        for name in holders {
            let Some(entry) = self.entries.get_mut(&name) else {
                continue;
            };
            if !entry.group.intersects(group) {
                continue;
            }
            entry.inputs.retain(|bound| bound.input != *input);
            self.index_remove(input, &name);
            displaced.push(name);
        }
        displaced
    }

    /// Add an input to an action's binding set.
    ///
    /// Any action in an intersecting group currently holding the input loses
    /// it first; the displaced action names are returned. Attaching an input
    /// the action already holds is a no-op.
    pub fn attach_input(
        &mut self,
        action: &str,
        bound: BoundInput,
    ) -> Result<Vec<String>, MapperError> {
        let group = self.lookup(action)?.group;
        if self
            .entries
            .get(action)
            .is_some_and(|b| b.inputs.contains(&bound))
        {
            return Ok(Vec::new());
        }

        let mut displaced = self.unbind_physical(&bound.input, group);
        displaced.retain(|name| name != action);

        let entry = self
            .entries
            .get_mut(action)
            .ok_or_else(|| MapperError::UnknownAction(action.to_string()))?;
        entry.inputs.push(bound);
        self.index_add(bound.input, action);
        Ok(displaced)
    }

    /// Replace an action's entire binding set.
    ///
    /// Returns the previous set so callers can release axis slots the old
    /// inputs held. No conflict stealing is performed; callers that need it
    /// use [`BindingTable::unbind_physical`] first.
    pub fn replace_inputs(
        &mut self,
        action: &str,
        new_inputs: impl IntoIterator<Item = BoundInput>,
    ) -> Result<SmallVec<[BoundInput; 2]>, MapperError> {
        let new_set: SmallVec<[BoundInput; 2]> = new_inputs.into_iter().collect();

        let entry = self
            .entries
            .get_mut(action)
            .ok_or_else(|| MapperError::UnknownAction(action.to_string()))?;
        let old = std::mem::replace(&mut entry.inputs, new_set.clone());

        for bound in &old {
            self.index_remove(&bound.input, action);
        }
        for bound in &new_set {
            self.index_add(bound.input, action);
        }
        Ok(old)
    }

    /// Remove a single input from an action.
    ///
    /// Returns whether the input was present.
    pub fn detach_input(
        &mut self,
        action: &str,
        input: &PhysicalInput,
    ) -> Result<bool, MapperError> {
        let entry = self
            .entries
            .get_mut(action)
            .ok_or_else(|| MapperError::UnknownAction(action.to_string()))?;
        let before = entry.inputs.len();
        entry.inputs.retain(|bound| bound.input != *input);
        let removed = entry.inputs.len() != before;
        if removed {
            self.index_remove(input, action);
        }
        Ok(removed)
    }

    /// Remove all inputs from an action, returning the old set.
    pub fn clear_inputs(
        &mut self,
        action: &str,
    ) -> Result<SmallVec<[BoundInput; 2]>, MapperError> {
        self.replace_inputs(action, std::iter::empty())
    }

    /// Reset every action to its single default input.
    pub fn reset_to_defaults(&mut self) {
        self.by_input.clear();
        let order = self.order.clone();
        for name in &order {
            if let Some(entry) = self.entries.get_mut(name) {
                entry.inputs = smallvec![entry.default_input];
            }
        }
        for name in &order {
            if let Some(default_input) = self.entries.get(name).map(|e| e.default_input) {
                self.index_add(default_input.input, name);
            }
        }
    }

    /// Iterate over entries in registration order.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &Binding> {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }

    fn index_add(&mut self, input: PhysicalInput, action: &str) {
        let names = self.by_input.entry(input).or_default();
        if !names.iter().any(|n| n == action) {
            names.push(action.to_string());
        }
    }

    fn index_remove(&mut self, input: &PhysicalInput, action: &str) {
        if let Some(names) = self.by_input.get_mut(input) {
            names.retain(|n| n != action);
            if names.is_empty() {
                self.by_input.remove(input);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    fn key(code: KeyCode) -> BoundInput {
        BoundInput::natural(PhysicalInput::key(code))
    }

    fn table_with(actions: &[(&str, KeyCode)]) -> BindingTable {
        let mut table = BindingTable::new();
        for (name, code) in actions {
            table
                .register(name, BindingKind::Held, key(*code), GroupMask::DEFAULT)
                .unwrap();
        }
        table
    }

    #[test]
    fn test_register_binds_default() {
        let table = table_with(&[("jump", KeyCode::Space)]);

        let entry = table.get("jump").unwrap();
        assert!(entry.is_bound());
        assert_eq!(entry.inputs()[0], key(KeyCode::Space));
        assert_eq!(
            table.actions_for(&PhysicalInput::key(KeyCode::Space)),
            &["jump".to_string()]
        );
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut table = table_with(&[("jump", KeyCode::Space)]);
        let result = table.register(
            "jump",
            BindingKind::Pressed,
            key(KeyCode::KeyJ),
            GroupMask::DEFAULT,
        );
        assert_eq!(result, Err(MapperError::DuplicateAction("jump".into())));
    }

    #[test]
    fn test_attach_steals_from_same_group() {
        let mut table = table_with(&[("jump", KeyCode::Space), ("crouch", KeyCode::KeyC)]);

        let displaced = table.attach_input("crouch", key(KeyCode::Space)).unwrap();
        assert_eq!(displaced, vec!["jump".to_string()]);
        assert!(!table.get("jump").unwrap().is_bound());

        let crouch = table.get("crouch").unwrap();
        assert_eq!(crouch.inputs().len(), 2);
    }

    #[test]
    fn test_disjoint_groups_share_input() {
        let mut table = BindingTable::new();
        table
            .register("walk", BindingKind::Held, key(KeyCode::KeyE), GroupMask(1))
            .unwrap();
        table
            .register("drive", BindingKind::Held, key(KeyCode::KeyQ), GroupMask(2))
            .unwrap();

        let displaced = table.attach_input("drive", key(KeyCode::KeyE)).unwrap();
        assert!(displaced.is_empty());
        assert!(table.get("walk").unwrap().is_bound());

        let mut holders: Vec<&str> = table
            .actions_for(&PhysicalInput::key(KeyCode::KeyE))
            .iter()
            .map(|s| s.as_str())
            .collect();
        holders.sort();
        assert_eq!(holders, vec!["drive", "walk"]);
    }

    #[test]
    fn test_conflict_respects_groups() {
        let mut table = BindingTable::new();
        table
            .register("walk", BindingKind::Held, key(KeyCode::KeyE), GroupMask(1))
            .unwrap();
        table
            .register("drive", BindingKind::Held, key(KeyCode::KeyQ), GroupMask(2))
            .unwrap();
        table
            .register("use", BindingKind::Pressed, key(KeyCode::KeyU), GroupMask(1))
            .unwrap();

        // Same group: conflict reported
        assert_eq!(
            table.conflict_for(&PhysicalInput::key(KeyCode::KeyE), "use"),
            Some("walk")
        );
        // Disjoint group: no conflict
        assert_eq!(
            table.conflict_for(&PhysicalInput::key(KeyCode::KeyE), "drive"),
            None
        );
        // An action never conflicts with itself
        assert_eq!(
            table.conflict_for(&PhysicalInput::key(KeyCode::KeyE), "walk"),
            None
        );
    }

    #[test]
    fn test_replace_inputs_returns_old_set() {
        let mut table = table_with(&[("jump", KeyCode::Space)]);

        let old = table
            .replace_inputs("jump", [key(KeyCode::KeyJ)])
            .unwrap();
        assert_eq!(old.as_slice(), &[key(KeyCode::Space)]);
        assert!(table
            .actions_for(&PhysicalInput::key(KeyCode::Space))
            .is_empty());
        assert_eq!(
            table.actions_for(&PhysicalInput::key(KeyCode::KeyJ)),
            &["jump".to_string()]
        );
    }

    #[test]
    fn test_detach_and_clear() {
        let mut table = table_with(&[("jump", KeyCode::Space)]);
        table.attach_input("jump", key(KeyCode::KeyJ)).unwrap();

        assert!(table
            .detach_input("jump", &PhysicalInput::key(KeyCode::Space))
            .unwrap());
        assert!(!table
            .detach_input("jump", &PhysicalInput::key(KeyCode::Space))
            .unwrap());
        assert!(table.get("jump").unwrap().is_bound());

        table.clear_inputs("jump").unwrap();
        assert!(!table.get("jump").unwrap().is_bound());
        assert_eq!(table.get("jump").unwrap().display_label(), "<none set>");
    }

    #[test]
    fn test_reset_to_defaults() {
        let mut table = table_with(&[("jump", KeyCode::Space), ("crouch", KeyCode::KeyC)]);
        table.attach_input("crouch", key(KeyCode::Space)).unwrap();
        table.clear_inputs("jump").unwrap();

        table.reset_to_defaults();

        assert_eq!(
            table.get("jump").unwrap().inputs(),
            &[key(KeyCode::Space)]
        );
        assert_eq!(
            table.get("crouch").unwrap().inputs(),
            &[key(KeyCode::KeyC)]
        );
    }

    #[test]
    fn test_iteration_keeps_registration_order() {
        let table = table_with(&[
            ("up", KeyCode::KeyW),
            ("down", KeyCode::KeyS),
            ("left", KeyCode::KeyA),
        ]);
        let names: Vec<&str> = table.iter_ordered().map(|b| b.action()).collect();
        assert_eq!(names, vec!["up", "down", "left"]);
    }

    #[test]
    fn test_unknown_action_errors() {
        let mut table = BindingTable::new();
        assert_eq!(
            table.lookup("nope").unwrap_err(),
            MapperError::UnknownAction("nope".into())
        );
        assert!(table.attach_input("nope", key(KeyCode::KeyA)).is_err());
        assert!(table.clear_inputs("nope").is_err());
    }
}
