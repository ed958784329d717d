// Session state - lives, score and the play/pause/game-over state machine

use log::{debug, info};

use crate::core::config::SessionConfig;
use crate::core::math::clamp_lives;

/// Top-level phase of a play session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    /// Simulation advancing every tick
    #[default]
    Playing,
    /// Simulation frozen until resumed
    Paused,
    /// Terminal; only leaving the session gets out of it
    GameOver,
}

impl GamePhase {
    /// Whether the update pipeline should run
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Playing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GameOver)
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    OutOfLives,
    /// The player left the play field
    FellOut,
}

/// Lives, score, clock and phase for one play session
#[derive(Debug)]
pub struct SessionState {
    phase: GamePhase,
    lives: u8,
    max_lives: u8,
    score: u32,
    /// Unpaused play time in milliseconds; cooldowns are measured against it
    play_time_ms: f64,
    score_interval_ms: f64,
    reason: Option<GameOverReason>,
}

impl SessionState {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            phase: GamePhase::Playing,
            lives: config.starting_lives.min(config.max_lives),
            max_lives: config.max_lives,
            score: 0,
            play_time_ms: 0.0,
            score_interval_ms: config.score_interval_ms,
            reason: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current simulation time in milliseconds
    pub fn now_ms(&self) -> f64 {
        self.play_time_ms
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.reason
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    fn transition(&mut self, phase: GamePhase) {
        if self.phase != phase {
            debug!("Session {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Flip between playing and paused; no effect once the game is over
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => {
                self.transition(GamePhase::Paused);
                info!("Game paused");
            }
            GamePhase::Paused => {
                self.transition(GamePhase::Playing);
                info!("Game resumed");
            }
            GamePhase::GameOver => {}
        }
    }

    /// Advance the play clock and award score; returns the new time
    pub fn advance_clock(&mut self, delta_ms: f64) -> f64 {
        if !self.phase.is_running() {
            return self.play_time_ms;
        }

        self.play_time_ms += delta_ms.max(0.0);
        let earned = (self.play_time_ms / self.score_interval_ms).floor() as u32;
        // Score never moves backwards
        self.score = self.score.max(earned);
        self.play_time_ms
    }

    /// Add lives up to the cap; returns true if anything changed
    pub fn heal(&mut self, amount: u8) -> bool {
        if self.is_over() {
            return false;
        }
        let before = self.lives;
        self.lives = clamp_lives(self.lives as i32 + amount as i32, self.max_lives);
        self.lives != before
    }

    /// Remove lives, never going below zero; ends the session at zero
    pub fn damage(&mut self, amount: u8) -> u8 {
        if self.is_over() {
            return self.lives;
        }
        self.lives = clamp_lives(self.lives as i32 - amount as i32, self.max_lives);
        if self.lives == 0 {
            self.end(GameOverReason::OutOfLives);
        }
        self.lives
    }

    /// Enter the terminal state; returns true only on the first call
    pub fn end(&mut self, reason: GameOverReason) -> bool {
        if self.is_over() {
            return false;
        }
        self.transition(GamePhase::GameOver);
        self.reason = Some(reason);
        info!("Game over ({:?}) with score {}", reason, self.score);
        true
    }
}
