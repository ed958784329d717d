// Gameplay systems
//
// The controller owns everything below and drives it once per tick:
// - `session`: lives, score and the Playing/Paused/GameOver machine
// - `player`: the player body plus its contact and cooldown status
// - `generator`: weighted platform placement ahead of the scroll front
// - `scroll`: world translation and off-screen culling
// - `projectile`: fireballs integrated outside the physics engine
// - `resolver`: contact effects for surfaces, walls and fireball hits
// - `navigation`: screen flow into and out of a session

pub mod controller;
pub mod generator;
pub mod navigation;
pub mod player;
pub mod projectile;
pub mod resolver;
pub mod scroll;
pub mod session;

// Re-export commonly used types
pub use controller::{GameController, TickOutcome};
pub use navigation::{NavParams, Navigator, Screen, ScreenStack};
pub use player::PlayerToken;
