// Screen flow between the welcome, selection and game screens

use log::info;

use super::player::PlayerToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Welcome,
    Selection,
    Game,
}

impl Screen {
    /// Where "back" leads from this screen
    pub fn back(&self) -> Screen {
        match self {
            Screen::Welcome | Screen::Selection => Screen::Welcome,
            Screen::Game => Screen::Selection,
        }
    }
}

/// Parameters passed along with a navigation request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavParams {
    pub selected_player: Option<PlayerToken>,
}

impl NavParams {
    pub fn with_player(token: PlayerToken) -> Self {
        Self {
            selected_player: Some(token),
        }
    }
}

/// Host-side screen switcher the game asks to change screens
pub trait Navigator {
    fn navigate_to(&mut self, screen: Screen, params: NavParams);
}

/// Navigator that only records where it was sent
#[derive(Debug, Default)]
pub struct ScreenStack {
    history: Vec<(Screen, NavParams)>,
}

impl ScreenStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Screen {
        self.history.last().map_or(Screen::Welcome, |(screen, _)| *screen)
    }

    pub fn history(&self) -> &[(Screen, NavParams)] {
        &self.history
    }
}

impl Navigator for ScreenStack {
    fn navigate_to(&mut self, screen: Screen, params: NavParams) {
        info!("Navigating to {:?} ({:?})", screen, params.selected_player);
        self.history.push((screen, params));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_targets() {
        assert_eq!(Screen::Game.back(), Screen::Selection);
        assert_eq!(Screen::Selection.back(), Screen::Welcome);
        assert_eq!(Screen::Welcome.back(), Screen::Welcome);
    }

    #[test]
    fn test_screen_stack_records_params() {
        let mut nav = ScreenStack::new();
        assert_eq!(nav.current(), Screen::Welcome);

        nav.navigate_to(Screen::Game, NavParams::with_player(PlayerToken::new("player2")));
        assert_eq!(nav.current(), Screen::Game);
        assert_eq!(
            nav.history()[0].1.selected_player,
            Some(PlayerToken::new("player2"))
        );
    }
}
