// Engine modules: physics, frame timing, input

pub mod game_loop;
pub mod input;
pub mod physics;
