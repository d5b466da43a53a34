pub mod clock;
pub mod config;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod provisioner;
pub mod queue;
pub mod registry;
pub mod systems;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
