// Game action definitions

/// Everything the player can ask the game to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Pause,
}

impl Action {
    /// Horizontal sign of a movement action, zero for everything else
    pub fn direction(&self) -> f32 {
        match self {
            Self::MoveLeft => -1.0,
            Self::MoveRight => 1.0,
            Self::Pause => 0.0,
        }
    }
}

/// Input event delivered by the host (touch buttons, keys)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Press(Action),
    Release(Action),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_equality() {
        assert_eq!(Action::MoveLeft, Action::MoveLeft);
        assert_ne!(Action::MoveLeft, Action::MoveRight);
    }

    #[test]
    fn test_direction_signs() {
        assert_eq!(Action::MoveLeft.direction(), -1.0);
        assert_eq!(Action::MoveRight.direction(), 1.0);
        assert_eq!(Action::Pause.direction(), 0.0);
    }
}
