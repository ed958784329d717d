// Core utilities shared by the engine and game layers

pub mod config;
pub mod error;
pub mod math;

pub use config::GameConfig;
