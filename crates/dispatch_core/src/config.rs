use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::clock::ONE_SEC_MS;

/// Engine configuration. Everything time-based is in engine-clock
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchParams {
    /// Maximum allowed gap between heartbeats before an Online driver is
    /// presumed unreachable and demoted by the sweep. Must stay strictly
    /// greater than [DispatchParams::heartbeat_period_ms] to tolerate jitter.
    pub liveness_timeout_ms: u64,
    /// Heartbeat period the clients are expected to use. The engine does not
    /// enforce it; it documents what the liveness timeout is sized against.
    pub heartbeat_period_ms: u64,
    /// Interval between heartbeat sweeps.
    pub sweep_interval_ms: u64,
    /// Interval between periodic match retries, catching rides left pending
    /// because no driver was available at booking time.
    pub match_retry_interval_ms: u64,
    /// First port handed out by the resource pool.
    pub base_port: u16,
    /// Number of ports in the pool, i.e. the cap on concurrently live rides.
    pub port_capacity: u16,
    /// Seed for the container-handle nonce generator, for reproducible tests.
    pub seed: u64,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            liveness_timeout_ms: 30 * ONE_SEC_MS,
            heartbeat_period_ms: 10 * ONE_SEC_MS,
            sweep_interval_ms: 10 * ONE_SEC_MS,
            match_retry_interval_ms: 5 * ONE_SEC_MS,
            base_port: 7100,
            port_capacity: 64,
            seed: 0,
        }
    }
}
