//! The engine facade: owns the world and the schedule, drains due ticks
//! through the systems, and exposes the dispatch operations as single
//! critical sections.
//!
//! Every mutating call takes `&mut self`, which is the one-writer-at-a-time
//! boundary the concurrency model asks for; wrap the engine in a mutex to
//! share it across threads.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::{CurrentTick, DispatchClock, TickKind};
use crate::config::DispatchParams;
use crate::ecs::{Driver, DriverId, DriverIndex, IdSequence, Ride, RideId, RideIndex};
use crate::error::DispatchError;
use crate::provisioner::ResourcePool;
use crate::systems::heartbeat_sweep::heartbeat_sweep_system;
use crate::systems::matching::matching_system;
use crate::{queue, registry};

fn is_try_match(tick: Option<Res<CurrentTick>>) -> bool {
    tick.map(|t| t.0.kind == TickKind::TryMatch).unwrap_or(false)
}

fn is_heartbeat_sweep(tick: Option<Res<CurrentTick>>) -> bool {
    tick.map(|t| t.0.kind == TickKind::HeartbeatSweep)
        .unwrap_or(false)
}

/// Builds the dispatch schedule: the match pass and the heartbeat sweep,
/// each gated on its tick kind.
fn dispatch_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        matching_system.run_if(is_try_match),
        heartbeat_sweep_system.run_if(is_heartbeat_sweep),
    ));
    schedule
}

pub struct DispatchEngine {
    world: World,
    schedule: Schedule,
}

impl DispatchEngine {
    pub fn new(params: DispatchParams) -> Self {
        debug_assert!(
            params.liveness_timeout_ms > params.heartbeat_period_ms,
            "liveness window must exceed the heartbeat period"
        );

        let mut world = World::new();
        world.insert_resource(DispatchClock::default());
        world.insert_resource(IdSequence::default());
        world.insert_resource(RideIndex::default());
        world.insert_resource(DriverIndex::default());
        world.insert_resource(ResourcePool::new(&params));

        {
            let mut clock = world.resource_mut::<DispatchClock>();
            clock.schedule_in(params.sweep_interval_ms, TickKind::HeartbeatSweep, true);
            clock.schedule_in(params.match_retry_interval_ms, TickKind::TryMatch, true);
        }
        world.insert_resource(params);

        Self {
            world,
            schedule: dispatch_schedule(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.world.resource::<DispatchClock>().now_ms()
    }

    /// Moves the engine clock forward and runs every tick that became due:
    /// heartbeat sweeps and periodic match retries.
    pub fn advance_to(&mut self, now_ms: u64) {
        self.world
            .resource_mut::<DispatchClock>()
            .advance_to(now_ms);
        self.run_due_ticks();
    }

    fn run_due_ticks(&mut self) {
        loop {
            let tick = match self.world.resource_mut::<DispatchClock>().pop_due() {
                Some(tick) => tick,
                None => break,
            };
            self.world.insert_resource(CurrentTick(tick));
            self.schedule.run(&mut self.world);
        }
        self.world.remove_resource::<CurrentTick>();
    }

    /// Schedules an immediate match pass and drains it synchronously, so the
    /// caller observes any assignment it produced.
    fn trigger_match(&mut self) {
        let now = self.now_ms();
        self.world
            .resource_mut::<DispatchClock>()
            .schedule_at(now, TickKind::TryMatch, false);
        self.run_due_ticks();
    }

    // ---- driver surface ----

    pub fn register_driver(
        &mut self,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> DriverId {
        registry::register(&mut self.world, name, location)
    }

    /// Declares the driver eligible and immediately tries to drain the
    /// pending backlog onto them.
    pub fn go_online(&mut self, driver_id: DriverId) -> Result<(), DispatchError> {
        registry::go_online(&mut self.world, driver_id)?;
        self.trigger_match();
        Ok(())
    }

    pub fn go_offline(&mut self, driver_id: DriverId) -> Result<(), DispatchError> {
        registry::go_offline(&mut self.world, driver_id)
    }

    pub fn heartbeat(&mut self, driver_id: DriverId) -> Result<(), DispatchError> {
        registry::heartbeat(&mut self.world, driver_id)
    }

    pub fn driver(&self, driver_id: DriverId) -> Result<Driver, DispatchError> {
        registry::get(&self.world, driver_id)
    }

    pub fn available_drivers(&self) -> Vec<Driver> {
        registry::list_available(&self.world)
    }

    // ---- ride surface ----

    /// Enqueues a ride and runs a match pass; the returned record carries the
    /// driver and resource when a driver was already available.
    pub fn book_ride(
        &mut self,
        user_id: impl Into<String>,
        start: impl Into<String>,
        destination: impl Into<String>,
    ) -> Result<Ride, DispatchError> {
        let ride_id = queue::enqueue(&mut self.world, user_id, start, destination);
        self.trigger_match();
        queue::get(&self.world, ride_id)
    }

    /// Assigned -> Completed: releases the resource, returns the driver to
    /// the eligible pool (unless they separately went offline), then runs a
    /// match pass so the freed driver can pick up the oldest pending ride.
    pub fn complete_ride(&mut self, ride_id: RideId) -> Result<Ride, DispatchError> {
        queue::mark_completed(&mut self.world, ride_id)?;
        let ride = queue::get(&self.world, ride_id)?;

        self.world.resource_mut::<ResourcePool>().release(ride_id)?;
        if let Some(driver_id) = ride.driver {
            registry::mark_idle(&mut self.world, driver_id)?;
        }
        self.trigger_match();
        queue::get(&self.world, ride_id)
    }

    pub fn ride(&self, ride_id: RideId) -> Result<Ride, DispatchError> {
        queue::get(&self.world, ride_id)
    }

    /// All rides, all statuses, ascending by id.
    pub fn queue(&self) -> Vec<Ride> {
        queue::list(&self.world)
    }

    /// Peek at the oldest pending ride without dequeuing it.
    pub fn next_ride(&self) -> Option<Ride> {
        queue::next_pending(&self.world)
    }

    #[cfg(any(test, feature = "test-helpers"))]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
