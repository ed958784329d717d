// Physics system using rapier2d

pub mod body;
mod collision;
mod registry;
mod world;

pub use collision::ContactEvent;
pub use registry::{BoundarySide, Category, EntityId, SurfaceKind};
pub use world::PhysicsWorld;
