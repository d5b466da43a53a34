//! Request and response bodies. Field names follow the shapes the client
//! revisions already send (`user_id`, `start`, `destination`, ...); the views
//! are flattened snapshots of the engine records.

use dispatch_core::ecs::{Driver, DriverId, DriverPresence, Ride, RideId, RideStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRideRequest {
    pub user_id: String,
    pub start: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRideResponse {
    pub ride_id: RideId,
    pub status: RideStatus,
    /// Present when a driver was available at booking time.
    pub driver: Option<DriverSummary>,
    /// The allocated endpoint, present iff `driver` is.
    pub resource: Option<ResourceSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverSummary {
    pub driver_id: DriverId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub port: u16,
    pub container_handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDriverRequest {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDriverResponse {
    pub driver_id: DriverId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverIdRequest {
    pub driver_id: DriverId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideIdRequest {
    pub ride_id: RideId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteRideResponse {
    pub ride_id: RideId,
    pub status: RideStatus,
}

/// One ride as the clients see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideView {
    pub ride_id: RideId,
    pub user_id: String,
    pub start: String,
    pub destination: String,
    pub status: RideStatus,
    pub driver_id: Option<DriverId>,
    pub resource: Option<ResourceSummary>,
    pub created_at_ms: u64,
    pub assigned_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
}

impl From<Ride> for RideView {
    fn from(ride: Ride) -> Self {
        Self {
            ride_id: ride.id,
            user_id: ride.user_id,
            start: ride.start,
            destination: ride.destination,
            status: ride.status,
            driver_id: ride.driver,
            resource: ride.resource.map(|r| ResourceSummary {
                port: r.port,
                container_handle: r.container_handle,
            }),
            created_at_ms: ride.created_at_ms,
            assigned_at_ms: ride.assigned_at_ms,
            completed_at_ms: ride.completed_at_ms,
        }
    }
}

/// One driver as the clients see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverView {
    pub driver_id: DriverId,
    pub name: String,
    pub location: String,
    pub presence: DriverPresence,
    pub last_heartbeat_ms: u64,
}

impl From<Driver> for DriverView {
    fn from(driver: Driver) -> Self {
        Self {
            driver_id: driver.id,
            name: driver.name,
            location: driver.location,
            presence: driver.presence,
            last_heartbeat_ms: driver.last_heartbeat_ms,
        }
    }
}
