//! The authoritative ride store: free functions over the ECS world, mirroring
//! how the registry owns drivers. Only the matcher assigns and only the
//! explicit completion path completes; everything else is a read.

use bevy_ecs::prelude::{Entity, World};

use crate::clock::DispatchClock;
use crate::ecs::{DriverId, IdSequence, Ride, RideId, RideIndex, RideResource, RideStatus};
use crate::error::DispatchError;

fn lookup(world: &World, ride_id: RideId) -> Result<Entity, DispatchError> {
    world
        .resource::<RideIndex>()
        .0
        .get(&ride_id)
        .copied()
        .ok_or(DispatchError::RideNotFound { id: ride_id })
}

/// Creates a pending ride with a fresh id. The ride is visible to the matcher
/// immediately; field validation is the caller's concern.
pub fn enqueue(
    world: &mut World,
    user_id: impl Into<String>,
    start: impl Into<String>,
    destination: impl Into<String>,
) -> RideId {
    let now = world.resource::<DispatchClock>().now_ms();
    let id = world.resource_mut::<IdSequence>().next_ride_id();
    let entity = world
        .spawn(Ride {
            id,
            user_id: user_id.into(),
            start: start.into(),
            destination: destination.into(),
            status: RideStatus::Pending,
            driver: None,
            resource: None,
            created_at_ms: now,
            assigned_at_ms: None,
            completed_at_ms: None,
        })
        .id();
    world.resource_mut::<RideIndex>().0.insert(id, entity);
    tracing::debug!(ride = id.0, "ride enqueued");
    id
}

/// Snapshot of every ride, ascending by id (stable insertion order).
pub fn list(world: &World) -> Vec<Ride> {
    world
        .resource::<RideIndex>()
        .0
        .values()
        .filter_map(|entity| world.get::<Ride>(*entity))
        .cloned()
        .collect()
}

pub fn get(world: &World, ride_id: RideId) -> Result<Ride, DispatchError> {
    let entity = lookup(world, ride_id)?;
    world
        .get::<Ride>(entity)
        .cloned()
        .ok_or(DispatchError::RideNotFound { id: ride_id })
}

/// Peeks at the oldest pending ride without removing it from the queue.
pub fn next_pending(world: &World) -> Option<Ride> {
    world
        .resource::<RideIndex>()
        .0
        .values()
        .filter_map(|entity| world.get::<Ride>(*entity))
        .find(|ride| ride.status == RideStatus::Pending)
        .cloned()
}

/// Pending -> Assigned, fixing the driver and resource. Any other prior state
/// is an [DispatchError::InvalidRideTransition], which is what prevents a
/// double assignment.
pub fn mark_assigned(
    world: &mut World,
    ride_id: RideId,
    driver_id: DriverId,
    resource: RideResource,
) -> Result<(), DispatchError> {
    let entity = lookup(world, ride_id)?;
    let now = world.resource::<DispatchClock>().now_ms();
    let mut ride = world
        .get_mut::<Ride>(entity)
        .ok_or(DispatchError::RideNotFound { id: ride_id })?;
    if !ride.status.can_advance_to(RideStatus::Assigned) {
        return Err(DispatchError::InvalidRideTransition {
            id: ride_id,
            from: ride.status,
            to: RideStatus::Assigned,
        });
    }
    ride.status = RideStatus::Assigned;
    ride.driver = Some(driver_id);
    ride.resource = Some(resource);
    ride.assigned_at_ms = Some(now);
    tracing::info!(ride = ride_id.0, driver = driver_id.0, "ride assigned");
    Ok(())
}

/// Assigned -> Completed. The driver and resource fields stay on the record.
pub fn mark_completed(world: &mut World, ride_id: RideId) -> Result<(), DispatchError> {
    let entity = lookup(world, ride_id)?;
    let now = world.resource::<DispatchClock>().now_ms();
    let mut ride = world
        .get_mut::<Ride>(entity)
        .ok_or(DispatchError::RideNotFound { id: ride_id })?;
    if !ride.status.can_advance_to(RideStatus::Completed) {
        return Err(DispatchError::InvalidRideTransition {
            id: ride_id,
            from: ride.status,
            to: RideStatus::Completed,
        });
    }
    ride.status = RideStatus::Completed;
    ride.completed_at_ms = Some(now);
    tracing::info!(ride = ride_id.0, "ride completed");
    Ok(())
}
