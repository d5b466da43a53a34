use std::collections::{BTreeMap, BTreeSet};

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DispatchParams;
use crate::ecs::{RideId, RideResource};
use crate::error::DispatchError;

/// Owns the port/container pool. Ports come from a bounded free list
/// (lowest free port first); container handles are opaque nonces, so neither
/// is derivable from the ride id by a client.
///
/// `allocate`/`release` must alternate per ride; the matcher's
/// single-assignment guarantee is what keeps that contract.
#[derive(Debug, Resource)]
pub struct ResourcePool {
    free_ports: BTreeSet<u16>,
    bindings: BTreeMap<RideId, RideResource>,
    rng: StdRng,
}

impl ResourcePool {
    pub fn new(params: &DispatchParams) -> Self {
        let free_ports = (0..params.port_capacity)
            .filter_map(|i| params.base_port.checked_add(i))
            .collect();
        Self {
            free_ports,
            bindings: BTreeMap::new(),
            rng: StdRng::seed_from_u64(params.seed),
        }
    }

    /// Binds the lowest free port plus a fresh container handle to the ride.
    pub fn allocate(&mut self, ride_id: RideId) -> Result<RideResource, DispatchError> {
        if self.bindings.contains_key(&ride_id) {
            return Err(DispatchError::ResourceAlreadyAllocated { id: ride_id });
        }
        let port = self
            .free_ports
            .pop_first()
            .ok_or(DispatchError::PortPoolExhausted)?;
        let resource = RideResource {
            port,
            container_handle: format!("ride-ct-{:08x}{:08x}", self.rng.gen::<u32>(), port),
        };
        self.bindings.insert(ride_id, resource.clone());
        tracing::debug!(ride = ride_id.0, port, "resource allocated");
        Ok(resource)
    }

    /// Returns the ride's port to the free list. Exactly one release per
    /// allocate; a second release reports [DispatchError::ResourceNotAllocated].
    pub fn release(&mut self, ride_id: RideId) -> Result<RideResource, DispatchError> {
        let resource = self
            .bindings
            .remove(&ride_id)
            .ok_or(DispatchError::ResourceNotAllocated { id: ride_id })?;
        self.free_ports.insert(resource.port);
        tracing::debug!(ride = ride_id.0, port = resource.port, "resource released");
        Ok(resource)
    }

    pub fn binding(&self, ride_id: RideId) -> Option<&RideResource> {
        self.bindings.get(&ride_id)
    }

    pub fn live_bindings(&self) -> usize {
        self.bindings.len()
    }

    pub fn free_port_count(&self) -> usize {
        self.free_ports.len()
    }
}
