//! Input state: the set of controls currently held down.
//!
//! # Invariants
//! - A control is held iff its most recent event was a press not yet
//!   followed by a release.
//! - Only the event-delivery path mutates the set; the frame path reads it.

use std::collections::HashSet;

/// A recognized viewer control. Window key codes are mapped to these before
/// they reach [`InputState`]; unrecognized keys never get this far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    Ascend,
    Descend,
    /// Speed modifier: movement runs at the fast rate while held.
    Precision,
}

/// Membership-only record of currently-held controls.
///
/// Created empty at startup and mutated solely by press/release events.
/// There is no timeout or implicit clearing.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Control>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Pressing an already-held control is a no-op.
    pub fn press(&mut self, control: Control) {
        self.held.insert(control);
    }

    /// Record a release. Releasing a control that is not held is a no-op.
    pub fn release(&mut self, control: Control) {
        self.held.remove(&control);
    }

    /// Pure membership query.
    pub fn is_held(&self, control: Control) -> bool {
        self.held.contains(&control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let input = InputState::new();
        assert!(!input.is_held(Control::Forward));
        assert!(!input.is_held(Control::Precision));
    }

    #[test]
    fn press_then_release() {
        let mut input = InputState::new();
        input.press(Control::Forward);
        assert!(input.is_held(Control::Forward));
        input.release(Control::Forward);
        assert!(!input.is_held(Control::Forward));
    }

    #[test]
    fn press_is_idempotent() {
        let mut input = InputState::new();
        input.press(Control::Ascend);
        input.press(Control::Ascend);
        assert!(input.is_held(Control::Ascend));
        // One release undoes any number of presses.
        input.release(Control::Ascend);
        assert!(!input.is_held(Control::Ascend));
    }

    #[test]
    fn double_release_is_safe() {
        let mut input = InputState::new();
        input.press(Control::Back);
        input.release(Control::Back);
        input.release(Control::Back);
        assert!(!input.is_held(Control::Back));
    }

    #[test]
    fn controls_are_independent() {
        let mut input = InputState::new();
        input.press(Control::Forward);
        input.press(Control::StrafeRight);
        input.release(Control::Forward);
        assert!(!input.is_held(Control::Forward));
        assert!(input.is_held(Control::StrafeRight));
    }
}
