//! The match pass: pair pending rides with available drivers and provision
//! the per-ride endpoint.
//!
//! Runs as an exclusive system so the driver lock, resource allocation and
//! ride assignment land inside one schedule run; concurrent callers are
//! already serialized at the engine boundary, so no reader can observe a
//! partial transition.

use bevy_ecs::prelude::World;

use crate::clock::{CurrentTick, DispatchClock, TickKind};
use crate::config::DispatchParams;
use crate::ecs::{Driver, Ride};
use crate::error::DispatchError;
use crate::provisioner::ResourcePool;
use crate::{queue, registry};

/// Scans pending rides in FIFO order and assigns each to the lowest-id
/// available driver until either side runs out. A failed attempt rolls back
/// and ends the pass; the ride stays pending for the next trigger.
pub fn matching_system(world: &mut World) {
    let Some(tick) = world.get_resource::<CurrentTick>().map(|t| t.0) else {
        return;
    };
    if tick.kind != TickKind::TryMatch {
        return;
    }

    loop {
        let Some(ride) = queue::next_pending(world) else {
            break;
        };
        let Some(driver) = registry::list_available(world).into_iter().next() else {
            break;
        };
        if let Err(err) = assign(world, &ride, &driver) {
            tracing::warn!(
                ride = ride.id.0,
                driver = driver.id.0,
                error = %err,
                "match attempt rolled back"
            );
            break;
        }
    }

    // The periodic retry tick re-arms itself; immediate triggers do not, or
    // every booking would spawn another retry chain.
    if tick.periodic {
        let interval = world.resource::<DispatchParams>().match_retry_interval_ms;
        world
            .resource_mut::<DispatchClock>()
            .schedule_in(interval, TickKind::TryMatch, true);
    }
}

/// The three-step transition of one match: driver OnTrip, resource allocated,
/// ride assigned. All-or-nothing; any failure after step one puts the driver
/// back Online and leaves the ride untouched.
fn assign(world: &mut World, ride: &Ride, driver: &Driver) -> Result<(), DispatchError> {
    registry::mark_on_trip(world, driver.id, ride.id)?;

    let resource = match world.resource_mut::<ResourcePool>().allocate(ride.id) {
        Ok(resource) => resource,
        Err(err) => {
            registry::mark_idle(world, driver.id)?;
            return Err(err);
        }
    };

    if let Err(err) = queue::mark_assigned(world, ride.id, driver.id, resource.clone()) {
        if let Err(release_err) = world.resource_mut::<ResourcePool>().release(ride.id) {
            tracing::warn!(ride = ride.id.0, error = %release_err, "rollback release failed");
        }
        registry::mark_idle(world, driver.id)?;
        return Err(err);
    }

    tracing::info!(
        ride = ride.id.0,
        driver = driver.id.0,
        port = resource.port,
        "ride matched"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use bevy_ecs::prelude::{Schedule, World};

    use super::*;
    use crate::clock::Tick;
    use crate::ecs::{DriverPresence, RideStatus};
    use crate::test_helpers::create_test_world;

    fn run_match_tick(world: &mut World) {
        world.insert_resource(CurrentTick(Tick {
            at_ms: world.resource::<DispatchClock>().now_ms(),
            kind: TickKind::TryMatch,
            periodic: false,
        }));
        let mut schedule = Schedule::default();
        schedule.add_systems(matching_system);
        schedule.run(world);
    }

    #[test]
    fn assigns_oldest_pending_ride_to_lowest_id_driver() {
        let mut world = create_test_world();
        let d1 = registry::register(&mut world, "d1", "north");
        let d2 = registry::register(&mut world, "d2", "south");
        registry::go_online(&mut world, d2).expect("online");
        registry::go_online(&mut world, d1).expect("online");
        let r1 = queue::enqueue(&mut world, "u1", "A", "B");

        run_match_tick(&mut world);

        let ride = queue::get(&world, r1).expect("ride");
        assert_eq!(ride.status, RideStatus::Assigned);
        assert_eq!(ride.driver, Some(d1), "lowest-id driver wins");
        assert!(ride.resource.is_some());
        let driver = registry::get(&world, d1).expect("driver");
        assert_eq!(driver.presence, DriverPresence::OnTrip);
        assert_eq!(driver.active_ride, Some(r1));
        assert_eq!(
            registry::get(&world, d2).expect("driver").presence,
            DriverPresence::Online
        );
    }

    #[test]
    fn matches_as_many_pairs_as_supply_allows() {
        let mut world = create_test_world();
        let d1 = registry::register(&mut world, "d1", "north");
        let d2 = registry::register(&mut world, "d2", "south");
        registry::go_online(&mut world, d1).expect("online");
        registry::go_online(&mut world, d2).expect("online");
        let r1 = queue::enqueue(&mut world, "u1", "A", "B");
        let r2 = queue::enqueue(&mut world, "u2", "C", "D");
        let r3 = queue::enqueue(&mut world, "u3", "E", "F");

        run_match_tick(&mut world);

        assert_eq!(queue::get(&world, r1).expect("r1").driver, Some(d1));
        assert_eq!(queue::get(&world, r2).expect("r2").driver, Some(d2));
        assert_eq!(
            queue::get(&world, r3).expect("r3").status,
            RideStatus::Pending
        );
    }

    #[test]
    fn no_available_driver_leaves_rides_pending() {
        let mut world = create_test_world();
        let offline = registry::register(&mut world, "d1", "north");
        let r1 = queue::enqueue(&mut world, "u1", "A", "B");

        run_match_tick(&mut world);

        assert_eq!(
            queue::get(&world, r1).expect("ride").status,
            RideStatus::Pending
        );
        assert_eq!(
            registry::get(&world, offline).expect("driver").presence,
            DriverPresence::Offline
        );
    }

    #[test]
    fn empty_queue_is_a_no_op() {
        let mut world = create_test_world();
        let d1 = registry::register(&mut world, "d1", "north");
        registry::go_online(&mut world, d1).expect("online");

        run_match_tick(&mut world);
        run_match_tick(&mut world);

        assert_eq!(
            registry::get(&world, d1).expect("driver").presence,
            DriverPresence::Online
        );
    }

    #[test]
    fn exhausted_pool_rolls_the_driver_back_online() {
        let mut world = crate::test_helpers::create_test_world_with(DispatchParams {
            port_capacity: 0,
            ..Default::default()
        });
        let d1 = registry::register(&mut world, "d1", "north");
        registry::go_online(&mut world, d1).expect("online");
        let r1 = queue::enqueue(&mut world, "u1", "A", "B");

        run_match_tick(&mut world);

        let ride = queue::get(&world, r1).expect("ride");
        assert_eq!(ride.status, RideStatus::Pending);
        assert_eq!(ride.driver, None);
        let driver = registry::get(&world, d1).expect("driver");
        assert_eq!(driver.presence, DriverPresence::Online);
        assert_eq!(driver.active_ride, None);
        assert_eq!(world.resource::<ResourcePool>().live_bindings(), 0);
    }

    #[test]
    fn periodic_tick_reschedules_itself_and_immediate_does_not() {
        let mut world = create_test_world();

        world.insert_resource(CurrentTick(Tick {
            at_ms: 0,
            kind: TickKind::TryMatch,
            periodic: true,
        }));
        let mut schedule = Schedule::default();
        schedule.add_systems(matching_system);
        schedule.run(&mut world);
        assert_eq!(
            world.resource::<DispatchClock>().next_tick_at(),
            Some(DispatchParams::default().match_retry_interval_ms)
        );

        let mut world = create_test_world();
        run_match_tick(&mut world);
        assert!(world.resource::<DispatchClock>().is_empty());
    }
}
