use thiserror::Error;

use crate::ecs::{DriverId, DriverPresence, RideId, RideStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("ride {id} not found")]
    RideNotFound { id: RideId },

    #[error("driver {id} not found")]
    DriverNotFound { id: DriverId },

    #[error("ride {id} cannot move from {from} to {to}")]
    InvalidRideTransition {
        id: RideId,
        from: RideStatus,
        to: RideStatus,
    },

    #[error("driver {id} cannot move from {from} to {to}")]
    InvalidDriverTransition {
        id: DriverId,
        from: DriverPresence,
        to: DriverPresence,
    },

    #[error("no free port left in the provisioning pool")]
    PortPoolExhausted,

    #[error("ride {id} already holds an allocated resource")]
    ResourceAlreadyAllocated { id: RideId },

    #[error("no resource allocated for ride {id}")]
    ResourceNotAllocated { id: RideId },
}
