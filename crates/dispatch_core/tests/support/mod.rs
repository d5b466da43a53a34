#![allow(dead_code)]

use dispatch_core::config::DispatchParams;
use dispatch_core::ecs::DriverId;
use dispatch_core::engine::DispatchEngine;

/// Short, test-friendly intervals; liveness window still exceeds the
/// heartbeat period as the engine requires.
pub fn test_params() -> DispatchParams {
    DispatchParams {
        liveness_timeout_ms: 3_000,
        heartbeat_period_ms: 1_000,
        sweep_interval_ms: 1_000,
        match_retry_interval_ms: 500,
        base_port: 7100,
        port_capacity: 4,
        seed: 42,
    }
}

pub fn engine() -> DispatchEngine {
    DispatchEngine::new(test_params())
}

pub fn engine_with(params: DispatchParams) -> DispatchEngine {
    DispatchEngine::new(params)
}

/// Registers a driver and puts them online in one step.
pub fn online_driver(engine: &mut DispatchEngine, name: &str) -> DriverId {
    let id = engine.register_driver(name, "midtown");
    engine.go_online(id).expect("driver online");
    id
}
