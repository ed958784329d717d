// Per-player input state management

use super::action::{Action, InputEvent};
use std::collections::HashSet;

/// Horizontal movement requested for the current tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveIntent {
    /// No direction held
    Idle,
    /// First tick of a press: a short discrete step in this direction
    Step(f32),
    /// Direction held for more than one tick: continuous movement
    Hold(f32),
}

/// Represents the input state for the single local player
#[derive(Debug, Default)]
pub struct PlayerInput {
    /// Actions that are currently pressed this frame
    pressed: HashSet<Action>,

    /// Actions pressed during this frame, kept even if released again
    just_pressed: HashSet<Action>,

    /// Actions that were pressed in the previous frame
    previous_pressed: HashSet<Action>,
}

impl PlayerInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an action is currently pressed
    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Check if an action was pressed this frame
    pub fn just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Check if an action is held (pressed for multiple frames)
    pub fn is_held(&self, action: Action) -> bool {
        self.pressed.contains(&action) && self.previous_pressed.contains(&action)
    }

    /// Feed one host event
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::Press(action) => {
                if self.pressed.insert(action) {
                    self.just_pressed.insert(action);
                }
            }
            InputEvent::Release(action) => {
                self.pressed.remove(&action);
            }
        }
    }

    /// Update input state for a new frame
    /// Call this once per frame after the tick consumed the input
    pub fn update(&mut self) {
        self.just_pressed.clear();
        self.previous_pressed = self.pressed.clone();
    }

    /// Resolve left/right state into this tick's movement intent
    ///
    /// Opposing directions cancel. A direction pressed this frame yields a
    /// step, even when it was released again before the tick; one carried
    /// over from the previous frame yields a hold.
    pub fn move_intent(&self) -> MoveIntent {
        let mut direction = 0.0;
        let mut holding = false;

        for action in [Action::MoveLeft, Action::MoveRight] {
            if self.is_pressed(action) || self.just_pressed(action) {
                direction += action.direction();
                holding |= self.is_held(action);
            }
        }

        if direction == 0.0 {
            MoveIntent::Idle
        } else if holding {
            MoveIntent::Hold(direction)
        } else {
            MoveIntent::Step(direction)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_action() {
        let mut input = PlayerInput::new();
        input.handle(InputEvent::Press(Action::MoveLeft));
        assert!(input.is_pressed(Action::MoveLeft));
        assert!(input.just_pressed(Action::MoveLeft));
    }

    #[test]
    fn test_release_action() {
        let mut input = PlayerInput::new();
        input.handle(InputEvent::Press(Action::MoveLeft));
        input.update();
        input.handle(InputEvent::Release(Action::MoveLeft));
        assert!(!input.is_pressed(Action::MoveLeft));
        assert_eq!(input.move_intent(), MoveIntent::Idle);
    }

    #[test]
    fn test_press_then_hold_intent() {
        let mut input = PlayerInput::new();
        assert_eq!(input.move_intent(), MoveIntent::Idle);

        input.handle(InputEvent::Press(Action::MoveRight));
        assert_eq!(input.move_intent(), MoveIntent::Step(1.0));

        input.update();
        assert!(input.is_held(Action::MoveRight));
        assert_eq!(input.move_intent(), MoveIntent::Hold(1.0));
    }

    #[test]
    fn test_tap_within_one_frame_still_steps() {
        let mut input = PlayerInput::new();
        input.handle(InputEvent::Press(Action::MoveLeft));
        input.handle(InputEvent::Release(Action::MoveLeft));
        assert_eq!(input.move_intent(), MoveIntent::Step(-1.0));

        input.update();
        assert_eq!(input.move_intent(), MoveIntent::Idle);
    }

    #[test]
    fn test_opposing_directions_cancel() {
        let mut input = PlayerInput::new();
        input.handle(InputEvent::Press(Action::MoveLeft));
        input.handle(InputEvent::Press(Action::MoveRight));
        assert_eq!(input.move_intent(), MoveIntent::Idle);
    }

    #[test]
    fn test_release_unpressed_action() {
        let mut input = PlayerInput::new();
        input.handle(InputEvent::Release(Action::MoveLeft));
        assert!(!input.is_pressed(Action::MoveLeft));
        assert_eq!(input.move_intent(), MoveIntent::Idle);
    }
}
