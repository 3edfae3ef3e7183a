//! Held action state
//!
//! Pollable per-action values. Every registered action gets a slot; held
//! bindings drive theirs between 0.0 and 1.0 (or negative values when the
//! signed-axis option is on), and the axis pass uses the slots of edge-kind
//! actions as its edge-detection memory.

use rustc_hash::FxHashMap;

/// Threshold above which a value counts as "held".
pub const HELD_THRESHOLD: f32 = 0.5;

/// Per-action value store.
///
/// Applications poll this through the mapper rather than receiving a
/// callback per change: `value()` for analog reads, `is_held()` for the
/// common binary question.
#[derive(Debug, Default)]
pub struct ActionState {
    values: FxHashMap<String, f32>,
}

impl ActionState {
    /// Create an empty state store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slot for an action, starting at zero.
    pub fn register(&mut self, action: &str) {
        self.values.entry(action.to_string()).or_insert(0.0);
    }

    /// Set an action's value, returning the previous one.
    ///
    /// Unregistered actions are ignored and report `0.0`.
    pub fn set(&mut self, action: &str, value: f32) -> f32 {
        match self.values.get_mut(action) {
            Some(slot) => std::mem::replace(slot, value),
            None => 0.0,
        }
    }

    /// The current value for an action (`0.0` if unknown).
    #[must_use]
    pub fn value(&self, action: &str) -> f32 {
        self.values.get(action).copied().unwrap_or(0.0)
    }

    /// Whether an action counts as held (absolute value above 0.5).
    #[must_use]
    pub fn is_held(&self, action: &str) -> bool {
        self.value(action).abs() > HELD_THRESHOLD
    }

    /// Set every value to zero, e.g. on window focus loss.
    pub fn cancel_all(&mut self) {
        for value in self.values.values_mut() {
            *value = 0.0;
        }
    }

    /// Iterate over `(action, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(name, &value)| (name.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_returns_previous() {
        let mut state = ActionState::new();
        state.register("thrust");

        assert_eq!(state.set("thrust", 1.0), 0.0);
        assert_eq!(state.set("thrust", 0.25), 1.0);
        assert_eq!(state.value("thrust"), 0.25);
    }

    #[test]
    fn test_held_threshold() {
        let mut state = ActionState::new();
        state.register("thrust");

        state.set("thrust", 0.4);
        assert!(!state.is_held("thrust"));

        state.set("thrust", 0.9);
        assert!(state.is_held("thrust"));

        // Signed values still count as held by magnitude
        state.set("thrust", -0.9);
        assert!(state.is_held("thrust"));
    }

    #[test]
    fn test_unregistered_actions_read_zero() {
        let mut state = ActionState::new();
        assert_eq!(state.value("ghost"), 0.0);
        assert!(!state.is_held("ghost"));
        assert_eq!(state.set("ghost", 1.0), 0.0);
        assert_eq!(state.value("ghost"), 0.0);
    }

    #[test]
    fn test_cancel_all() {
        let mut state = ActionState::new();
        state.register("up");
        state.register("down");
        state.set("up", 1.0);
        state.set("down", -0.7);

        state.cancel_all();

        assert_eq!(state.value("up"), 0.0);
        assert_eq!(state.value("down"), 0.0);
    }
}
