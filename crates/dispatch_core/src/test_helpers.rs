//! Shared test setup: worlds pre-loaded with the engine's resources.

use bevy_ecs::prelude::World;

use crate::clock::DispatchClock;
use crate::config::DispatchParams;
use crate::ecs::{DriverIndex, IdSequence, RideIndex};
use crate::provisioner::ResourcePool;

/// A world with every engine resource installed, using default parameters.
/// For the full engine (schedule, tick draining), use
/// [crate::engine::DispatchEngine] instead.
pub fn create_test_world() -> World {
    create_test_world_with(DispatchParams::default())
}

/// Same as [create_test_world] with explicit parameters.
pub fn create_test_world_with(params: DispatchParams) -> World {
    let mut world = World::new();
    world.insert_resource(DispatchClock::default());
    world.insert_resource(IdSequence::default());
    world.insert_resource(RideIndex::default());
    world.insert_resource(DriverIndex::default());
    world.insert_resource(ResourcePool::new(&params));
    world.insert_resource(params);
    world
}
