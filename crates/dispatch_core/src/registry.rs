//! Driver identity, declared location and presence, driven by explicit
//! online/offline calls and heartbeats. The heartbeat sweep system handles
//! timeout demotion; the matcher and completion path use the internal
//! `mark_on_trip`/`mark_idle` transitions.

use bevy_ecs::prelude::{Entity, Mut, World};

use crate::clock::DispatchClock;
use crate::ecs::{Driver, DriverId, DriverIndex, DriverPresence, IdSequence, RideId};
use crate::error::DispatchError;

fn lookup(world: &World, driver_id: DriverId) -> Result<Entity, DispatchError> {
    world
        .resource::<DriverIndex>()
        .0
        .get(&driver_id)
        .copied()
        .ok_or(DispatchError::DriverNotFound { id: driver_id })
}

fn get_mut<'w>(
    world: &'w mut World,
    driver_id: DriverId,
) -> Result<Mut<'w, Driver>, DispatchError> {
    let entity = lookup(world, driver_id)?;
    world
        .get_mut::<Driver>(entity)
        .ok_or(DispatchError::DriverNotFound { id: driver_id })
}

/// Registers a new driver, starting Offline.
pub fn register(
    world: &mut World,
    name: impl Into<String>,
    location: impl Into<String>,
) -> DriverId {
    let now = world.resource::<DispatchClock>().now_ms();
    let id = world.resource_mut::<IdSequence>().next_driver_id();
    let entity = world
        .spawn(Driver {
            id,
            name: name.into(),
            location: location.into(),
            presence: DriverPresence::Offline,
            last_heartbeat_ms: now,
            active_ride: None,
        })
        .id();
    world.resource_mut::<DriverIndex>().0.insert(id, entity);
    tracing::debug!(driver = id.0, "driver registered");
    id
}

pub fn get(world: &World, driver_id: DriverId) -> Result<Driver, DispatchError> {
    let entity = lookup(world, driver_id)?;
    world
        .get::<Driver>(entity)
        .cloned()
        .ok_or(DispatchError::DriverNotFound { id: driver_id })
}

/// Declares the driver reachable and eligible for matching. Idempotent while
/// Online. A driver currently OnTrip keeps that state (they return Online
/// through ride completion, never through this call); the heartbeat still
/// refreshes.
pub fn go_online(world: &mut World, driver_id: DriverId) -> Result<(), DispatchError> {
    let now = world.resource::<DispatchClock>().now_ms();
    let mut driver = get_mut(world, driver_id)?;
    driver.last_heartbeat_ms = now;
    if driver.presence == DriverPresence::Offline {
        driver.presence = DriverPresence::Online;
        tracing::info!(driver = driver_id.0, "driver online");
    }
    Ok(())
}

/// Unconditional offline override, used by the manual toggle and the
/// disconnect beacon alike. Kills matching eligibility immediately but never
/// touches a ride already bound to the driver.
pub fn go_offline(world: &mut World, driver_id: DriverId) -> Result<(), DispatchError> {
    let mut driver = get_mut(world, driver_id)?;
    if driver.presence != DriverPresence::Offline {
        driver.presence = DriverPresence::Offline;
        tracing::info!(driver = driver_id.0, "driver offline");
    }
    Ok(())
}

/// Refreshes the liveness window. A heartbeat while Offline is a no-op:
/// heartbeats alone never promote a driver, re-declaring online is explicit.
pub fn heartbeat(world: &mut World, driver_id: DriverId) -> Result<(), DispatchError> {
    let now = world.resource::<DispatchClock>().now_ms();
    let mut driver = get_mut(world, driver_id)?;
    if driver.presence != DriverPresence::Offline {
        driver.last_heartbeat_ms = now;
    }
    Ok(())
}

/// Drivers eligible for matching (Online), ascending by id for deterministic
/// selection.
pub fn list_available(world: &World) -> Vec<Driver> {
    world
        .resource::<DriverIndex>()
        .0
        .values()
        .filter_map(|entity| world.get::<Driver>(*entity))
        .filter(|driver| driver.presence == DriverPresence::Online)
        .cloned()
        .collect()
}

/// Internal matcher transition: Online -> OnTrip, binding the active ride.
pub fn mark_on_trip(
    world: &mut World,
    driver_id: DriverId,
    ride_id: RideId,
) -> Result<(), DispatchError> {
    let mut driver = get_mut(world, driver_id)?;
    if driver.presence != DriverPresence::Online {
        return Err(DispatchError::InvalidDriverTransition {
            id: driver_id,
            from: driver.presence,
            to: DriverPresence::OnTrip,
        });
    }
    driver.presence = DriverPresence::OnTrip;
    driver.active_ride = Some(ride_id);
    Ok(())
}

/// Internal completion/rollback transition. OnTrip -> Online with a fresh
/// heartbeat; a driver who separately went Offline mid-trip stays Offline.
pub fn mark_idle(world: &mut World, driver_id: DriverId) -> Result<(), DispatchError> {
    let now = world.resource::<DispatchClock>().now_ms();
    let mut driver = get_mut(world, driver_id)?;
    driver.active_ride = None;
    if driver.presence == DriverPresence::OnTrip {
        driver.presence = DriverPresence::Online;
        driver.last_heartbeat_ms = now;
    }
    Ok(())
}
