// Input handling
//
// - `action`: game actions and the host-facing press/release events
// - `player`: per-frame pressed/held bookkeeping and movement intent

pub mod action;
pub mod player;

pub use action::{Action, InputEvent};
pub use player::{MoveIntent, PlayerInput};
