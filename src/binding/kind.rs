//! Binding kinds
//!
//! The four ways a bound input can drive its action: raise an event on
//! press, on release, on both edges, or maintain a pollable held value.

/// How a binding turns raw input edges into action behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// An action event is raised when the input is pressed.
    Pressed,
    /// An action event is raised when the input is released.
    Released,
    /// Action events are raised on both press and release.
    PressedAndReleased,
    /// No edge events; instead a per-action value is maintained (1.0 while a
    /// button is held, the analog magnitude for an axis) which the
    /// application polls at will.
    Held,
}

impl BindingKind {
    /// Whether this kind raises an event on the press edge.
    pub fn raises_on_press(&self) -> bool {
        matches!(self, BindingKind::Pressed | BindingKind::PressedAndReleased)
    }

    /// Whether this kind raises an event on the release edge.
    pub fn raises_on_release(&self) -> bool {
        matches!(self, BindingKind::Released | BindingKind::PressedAndReleased)
    }

    /// Whether this kind maintains a pollable value instead of edge events.
    pub fn is_held(&self) -> bool {
        matches!(self, BindingKind::Held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_coverage() {
        assert!(BindingKind::Pressed.raises_on_press());
        assert!(!BindingKind::Pressed.raises_on_release());
        assert!(!BindingKind::Released.raises_on_press());
        assert!(BindingKind::Released.raises_on_release());
        assert!(BindingKind::PressedAndReleased.raises_on_press());
        assert!(BindingKind::PressedAndReleased.raises_on_release());
        assert!(!BindingKind::Held.raises_on_press());
        assert!(!BindingKind::Held.raises_on_release());
        assert!(BindingKind::Held.is_held());
    }
}
