//! Held-control tracking fed by keyboard events

use crate::sim::TickInput;

/// Named controls the simulation reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Left,
    Right,
    Fire,
}

impl Control {
    /// Map a browser `KeyboardEvent.key` value to a control
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Control::Left),
            "ArrowRight" | "d" | "D" => Some(Control::Right),
            " " | "Spacebar" => Some(Control::Fire),
            _ => None,
        }
    }
}

/// Which controls are currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    left: bool,
    right: bool,
    fire: bool,
    /// Demo mode toggled by the host
    pub idle_mode: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, control: Control, held: bool) {
        match control {
            Control::Left => self.left = held,
            Control::Right => self.right = held,
            Control::Fire => self.fire = held,
        }
    }

    /// Record a key press. Returns true if the key maps to a control.
    pub fn key_down(&mut self, key: &str) -> bool {
        match Control::from_key(key) {
            Some(control) => {
                self.set(control, true);
                true
            }
            None => false,
        }
    }

    /// Record a key release. Returns true if the key maps to a control.
    pub fn key_up(&mut self, key: &str) -> bool {
        match Control::from_key(key) {
            Some(control) => {
                self.set(control, false);
                true
            }
            None => false,
        }
    }

    /// Drop every held control (e.g. when the window loses focus)
    pub fn release_all(&mut self) {
        self.left = false;
        self.right = false;
        self.fire = false;
    }

    /// Controls for the next tick
    pub fn snapshot(&self) -> TickInput {
        TickInput {
            left: self.left,
            right: self.right,
            fire: self.fire,
            idle_mode: self.idle_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Control::from_key("ArrowLeft"), Some(Control::Left));
        assert_eq!(Control::from_key("ArrowRight"), Some(Control::Right));
        assert_eq!(Control::from_key(" "), Some(Control::Fire));
        assert_eq!(Control::from_key("Enter"), None);
    }

    #[test]
    fn test_press_and_release() {
        let mut input = InputState::new();
        assert!(input.key_down("ArrowLeft"));
        assert!(input.key_down(" "));
        assert!(!input.key_down("q"));

        let tick = input.snapshot();
        assert!(tick.left && tick.fire && !tick.right);

        input.key_up("ArrowLeft");
        let tick = input.snapshot();
        assert!(!tick.left && tick.fire);

        input.release_all();
        assert_eq!(input.snapshot(), TickInput::default());
    }
}
