pub mod heartbeat_sweep;
pub mod matching;
