use std::collections::BTreeMap;
use std::fmt;

use bevy_ecs::prelude::{Component, Entity, Resource};
use serde::{Deserialize, Serialize};

/// Monotonically assigned ride identifier, starting at 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RideId(pub u64);

/// Monotonically assigned driver identifier, starting at 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DriverId(pub u64);

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Pending,
    Assigned,
    Completed,
}

impl RideStatus {
    /// The only legal moves are pending -> assigned -> completed.
    pub fn can_advance_to(self, next: RideStatus) -> bool {
        matches!(
            (self, next),
            (RideStatus::Pending, RideStatus::Assigned)
                | (RideStatus::Assigned, RideStatus::Completed)
        )
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RideStatus::Pending => "pending",
            RideStatus::Assigned => "assigned",
            RideStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverPresence {
    Offline,
    Online,
    OnTrip,
}

impl fmt::Display for DriverPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DriverPresence::Offline => "offline",
            DriverPresence::Online => "online",
            DriverPresence::OnTrip => "on_trip",
        };
        f.write_str(s)
    }
}

/// The ephemeral endpoint bound to an assigned ride: a port from the
/// provisioning pool plus an opaque container handle. The handle is minted by
/// the pool and is not derivable from the ride id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideResource {
    pub port: u16,
    pub container_handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Component)]
pub struct Ride {
    pub id: RideId,
    pub user_id: String,
    pub start: String,
    pub destination: String,
    pub status: RideStatus,
    /// Set on the transition to Assigned, never changed afterwards.
    pub driver: Option<DriverId>,
    /// Set on the transition to Assigned; retained on the completed record
    /// while the port itself returns to the pool.
    pub resource: Option<RideResource>,
    pub created_at_ms: u64,
    pub assigned_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Component)]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    pub location: String,
    pub presence: DriverPresence,
    /// Meaningful only while the driver is not Offline.
    pub last_heartbeat_ms: u64,
    /// The ride currently served, set while OnTrip.
    pub active_ride: Option<RideId>,
}

/// Lookup from public ride id to ECS entity. BTreeMap iteration gives the
/// ascending-id order the queue snapshot and the FIFO matcher scan rely on.
#[derive(Debug, Default, Resource)]
pub struct RideIndex(pub BTreeMap<RideId, Entity>);

/// Lookup from public driver id to ECS entity, ascending-id iteration.
#[derive(Debug, Default, Resource)]
pub struct DriverIndex(pub BTreeMap<DriverId, Entity>);

/// Allocator for the public ride/driver id sequences.
#[derive(Debug, Resource)]
pub struct IdSequence {
    next_ride: u64,
    next_driver: u64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self {
            next_ride: 1,
            next_driver: 1,
        }
    }
}

impl IdSequence {
    pub fn next_ride_id(&mut self) -> RideId {
        let id = RideId(self.next_ride);
        self.next_ride += 1;
        id
    }

    pub fn next_driver_id(&mut self) -> DriverId {
        let id = DriverId(self.next_driver);
        self.next_driver += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ride_status_transition_table() {
        assert!(RideStatus::Pending.can_advance_to(RideStatus::Assigned));
        assert!(RideStatus::Assigned.can_advance_to(RideStatus::Completed));

        // No skipping, no going backwards, no leaving the terminal state.
        assert!(!RideStatus::Pending.can_advance_to(RideStatus::Completed));
        assert!(!RideStatus::Assigned.can_advance_to(RideStatus::Pending));
        assert!(!RideStatus::Completed.can_advance_to(RideStatus::Assigned));
        assert!(!RideStatus::Completed.can_advance_to(RideStatus::Pending));
        assert!(!RideStatus::Pending.can_advance_to(RideStatus::Pending));
    }

    #[test]
    fn id_sequences_start_at_one_and_increase() {
        let mut seq = IdSequence::default();
        assert_eq!(seq.next_ride_id(), RideId(1));
        assert_eq!(seq.next_ride_id(), RideId(2));
        assert_eq!(seq.next_driver_id(), DriverId(1));
        assert_eq!(seq.next_driver_id(), DriverId(2));
        // The two sequences are independent.
        assert_eq!(seq.next_ride_id(), RideId(3));
    }
}
