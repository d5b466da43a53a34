//! Periodic liveness sweep over the driver registry.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentTick, DispatchClock, TickKind};
use crate::config::DispatchParams;
use crate::ecs::{Driver, DriverPresence};

/// Demotes every Online driver whose last heartbeat is older than the
/// liveness window. OnTrip drivers are exempt: an active trip is not
/// abandoned because heartbeats paused; they leave OnTrip only via ride
/// completion or an explicit go-offline.
pub fn heartbeat_sweep_system(
    mut clock: ResMut<DispatchClock>,
    params: Res<DispatchParams>,
    tick: Res<CurrentTick>,
    mut drivers: Query<&mut Driver>,
) {
    if tick.0.kind != TickKind::HeartbeatSweep {
        return;
    }

    let now = clock.now_ms();
    for mut driver in drivers.iter_mut() {
        if driver.presence != DriverPresence::Online {
            continue;
        }
        if now.saturating_sub(driver.last_heartbeat_ms) > params.liveness_timeout_ms {
            driver.presence = DriverPresence::Offline;
            tracing::info!(
                driver = driver.id.0,
                last_heartbeat_ms = driver.last_heartbeat_ms,
                "driver demoted offline after missed heartbeats"
            );
        }
    }

    clock.schedule_in(params.sweep_interval_ms, TickKind::HeartbeatSweep, true);
}
